mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    CloudinarySettings, DubbingProviderSetting, DubbingSettings, LoggingSettings, ServerSettings,
    Settings, StorageProviderSetting, StorageSettings,
};
