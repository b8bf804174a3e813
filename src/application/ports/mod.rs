mod byte_stream;
mod dubbing_client;
mod media_store;

pub use byte_stream::{ByteStream, collect_bytes, single_chunk};
pub use dubbing_client::{DubbingClient, DubbingClientError, MediaSubmission};
pub use media_store::{DeleteOutcome, MediaRead, MediaStore, StorageError};
