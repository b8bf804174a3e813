use std::fmt;

use chrono::Utc;
use uuid::Uuid;

pub const UPLOAD_PREFIX: &str = "uploads";
pub const ARTIFACT_PREFIX: &str = "dubs";
pub const ARTIFACT_EXTENSION: &str = "mp4";

/// Backend key of a staged upload or a dubbed artifact, `<prefix>/<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoragePath(String);

impl StoragePath {
    pub fn for_upload(original_filename: &str) -> Self {
        Self(format!(
            "{}/{}",
            UPLOAD_PREFIX,
            unique_name(&sanitize_filename(original_filename))
        ))
    }

    /// Fresh artifact key, `dubs/dubbed-<millis>-<uuid8>-<stem>.mp4`.
    pub fn for_artifact(source_filename: &str) -> Self {
        let sanitized = sanitize_filename(source_filename);
        let stem = match sanitized.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => sanitized.as_str(),
        };
        Self(format!(
            "{}/dubbed-{}.{}",
            ARTIFACT_PREFIX,
            unique_name(stem),
            ARTIFACT_EXTENSION
        ))
    }

    /// Resolves a served file name back to its artifact key.
    pub fn artifact(filename: &str) -> Option<Self> {
        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..")
        {
            return None;
        }
        Some(Self(format!("{}/{}", ARTIFACT_PREFIX, filename)))
    }

    pub fn from_raw(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    pub fn is_upload(&self) -> bool {
        self.0.starts_with(UPLOAD_PREFIX) && self.0[UPLOAD_PREFIX.len()..].starts_with('/')
    }

    pub fn is_artifact(&self) -> bool {
        self.0.starts_with(ARTIFACT_PREFIX) && self.0[ARTIFACT_PREFIX.len()..].starts_with('/')
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn unique_name(base: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", Utc::now().timestamp_millis(), &suffix[..8], base)
}

fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.').replace("..", "_");
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}
