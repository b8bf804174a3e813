mod dub;
mod health;
mod stream;

pub use dub::{DubErrorResponse, DubResponse, dub_handler};
pub use health::health_handler;
pub use stream::stream_handler;
