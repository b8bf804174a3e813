use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::{MediaStore, StorageError};
use crate::presentation::config::{CloudinarySettings, StorageProviderSetting, StorageSettings};

use super::cloudinary_store::{CloudinaryCredentials, CloudinaryMediaStore};
use super::local_store::LocalMediaStore;
use super::memory_store::InMemoryMediaStore;

pub struct MediaStoreFactory;

impl MediaStoreFactory {
    pub fn create(settings: &StorageSettings) -> Result<Arc<dyn MediaStore>, StorageError> {
        match settings.provider {
            StorageProviderSetting::Local => {
                let store = LocalMediaStore::new(PathBuf::from(&settings.local_path))?;
                Ok(Arc::new(store))
            }
            StorageProviderSetting::Cloudinary => {
                let store = Self::cloudinary(settings.cloudinary.as_ref())?;
                Ok(Arc::new(store))
            }
            StorageProviderSetting::Memory => {
                let host = Self::cloudinary(settings.cloudinary.as_ref())?;
                Ok(Arc::new(InMemoryMediaStore::new(Arc::new(host))))
            }
        }
    }

    fn cloudinary(
        settings: Option<&CloudinarySettings>,
    ) -> Result<CloudinaryMediaStore, StorageError> {
        let settings = settings.ok_or_else(|| {
            StorageError::Misconfigured("storage.cloudinary section required".into())
        })?;
        let required = |value: &str, name: &str| {
            if value.trim().is_empty() {
                Err(StorageError::Misconfigured(format!(
                    "storage.cloudinary.{} required",
                    name
                )))
            } else {
                Ok(value.to_string())
            }
        };

        let credentials = CloudinaryCredentials {
            cloud_name: required(&settings.cloud_name, "cloud_name")?,
            api_key: required(&settings.api_key, "api_key")?,
            api_secret: required(&settings.api_secret, "api_secret")?,
        };

        CloudinaryMediaStore::new(
            credentials,
            settings.folder.clone(),
            settings.api_base_url.clone(),
            settings.delivery_base_url.clone(),
            settings.timeouts(),
        )
    }
}
