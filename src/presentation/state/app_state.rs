use std::sync::Arc;

use crate::application::ports::MediaStore;
use crate::application::services::DubbingService;

#[derive(Clone)]
pub struct AppState {
    pub dubbing_service: Arc<DubbingService>,
    pub media_store: Arc<dyn MediaStore>,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Serves artifacts from the same store the service persists into.
    pub fn new(dubbing_service: Arc<DubbingService>, max_upload_bytes: usize) -> Self {
        let media_store = Arc::clone(dubbing_service.media_store());
        Self {
            dubbing_service,
            media_store,
            max_upload_bytes,
        }
    }
}
