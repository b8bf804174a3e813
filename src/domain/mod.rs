mod artifact;
mod byte_range;
mod dub_job;
mod dub_status;
mod storage_path;
mod upload;

pub use artifact::{Artifact, ArtifactMetadata, ArtifactReference, MEDIA_CONTENT_TYPE};
pub use byte_range::{ByteRange, RangeError, ResolvedRange};
pub use dub_job::{DubJob, RemoteJobId};
pub use dub_status::DubStatus;
pub use storage_path::{ARTIFACT_EXTENSION, ARTIFACT_PREFIX, StoragePath, UPLOAD_PREFIX};
pub use upload::{StagedUpload, Upload};
