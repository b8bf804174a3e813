use std::sync::Arc;

use crate::application::ports::{DubbingClient, DubbingClientError};
use crate::presentation::config::{DubbingProviderSetting, DubbingSettings};

use super::elevenlabs_client::ElevenLabsClient;
use super::mock_dubbing_client::MockDubbingClient;

pub struct DubbingClientFactory;

impl DubbingClientFactory {
    pub fn create(settings: &DubbingSettings) -> Result<Arc<dyn DubbingClient>, DubbingClientError> {
        match settings.provider {
            DubbingProviderSetting::ElevenLabs => {
                if settings.api_key.trim().is_empty() {
                    return Err(DubbingClientError::Submission(
                        "dubbing.api_key required for ElevenLabs".to_string(),
                    ));
                }
                let client = ElevenLabsClient::new(
                    settings.api_key.clone(),
                    Some(settings.base_url.clone()),
                    settings.timeouts(),
                )?
                .with_watermark(settings.watermark);
                Ok(Arc::new(client))
            }
            DubbingProviderSetting::Mock => {
                tracing::warn!("Using mock dubbing client; uploads are echoed back undubbed");
                Ok(Arc::new(MockDubbingClient::echo().without_recording()))
            }
        }
    }
}
