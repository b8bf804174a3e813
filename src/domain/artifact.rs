use std::time::Duration;

use chrono::{DateTime, Utc};

use super::StoragePath;

/// Content type of everything this relay produces.
pub const MEDIA_CONTENT_TYPE: &str = "video/mp4";

/// How a client reaches a persisted artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactReference {
    /// Served by this process under `/stream/{name}`.
    File(String),
    /// Served by a remote media host.
    Url(String),
}

impl ArtifactReference {
    pub fn as_str(&self) -> &str {
        match self {
            ArtifactReference::File(name) => name,
            ArtifactReference::Url(url) => url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: StoragePath,
    pub reference: ArtifactReference,
    pub size_bytes: Option<u64>,
    pub created_at: DateTime<Utc>,
}

impl Artifact {
    pub fn new(path: StoragePath, reference: ArtifactReference, size_bytes: Option<u64>) -> Self {
        Self {
            path,
            reference,
            size_bytes,
            created_at: Utc::now(),
        }
    }

    pub fn expires_at(&self, retention: Duration) -> DateTime<Utc> {
        chrono::Duration::from_std(retention)
            .ok()
            .and_then(|d| self.created_at.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// What the store is told about dubbed bytes it is asked to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactMetadata {
    pub source_filename: String,
    pub target_lang: String,
    pub content_type: &'static str,
}

impl ArtifactMetadata {
    pub fn new(source_filename: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self {
            source_filename: source_filename.into(),
            target_lang: target_lang.into(),
            content_type: MEDIA_CONTENT_TYPE,
        }
    }
}
