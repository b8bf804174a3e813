pub mod dubbing;
pub mod http_timeouts;
pub mod observability;
pub mod storage;

pub use http_timeouts::HttpTimeouts;
