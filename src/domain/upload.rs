use bytes::Bytes;

use super::StoragePath;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Source video as received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

impl Upload {
    pub fn new(filename: impl Into<String>, content_type: Option<&str>, data: Bytes) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.unwrap_or(DEFAULT_CONTENT_TYPE).to_string(),
            data,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Handle to an upload after the store has taken it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedUpload {
    pub path: StoragePath,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: u64,
}
