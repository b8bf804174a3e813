mod dubbing_service;
mod poll_policy;
mod retention_scheduler;

pub use dubbing_service::{DubbingError, DubbingOutcome, DubbingService};
pub use poll_policy::{DEFAULT_POLL_INTERVAL, PollPolicy};
pub use retention_scheduler::{
    DEFAULT_HOSTED_RETENTION, DEFAULT_LOCAL_RETENTION, PURGE_TIMEOUT, RetentionError,
    RetentionScheduler, RetentionWorker,
};
