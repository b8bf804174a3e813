use dubrelay::application::ports::DubbingClientError;
use dubrelay::infrastructure::dubbing::DubbingClientFactory;
use dubrelay::presentation::config::{DubbingProviderSetting, DubbingSettings};

#[test]
fn given_elevenlabs_without_api_key_when_creating_then_returns_error() {
    let settings = DubbingSettings::default();

    let result = DubbingClientFactory::create(&settings);

    assert!(matches!(result, Err(DubbingClientError::Submission(_))));
}

#[test]
fn given_elevenlabs_with_api_key_when_creating_then_succeeds() {
    let settings = DubbingSettings {
        api_key: "xi-test".to_string(),
        ..DubbingSettings::default()
    };

    assert!(DubbingClientFactory::create(&settings).is_ok());
}

#[test]
fn given_mock_provider_when_creating_then_no_api_key_is_needed() {
    let settings = DubbingSettings {
        provider: DubbingProviderSetting::Mock,
        ..DubbingSettings::default()
    };

    assert!(DubbingClientFactory::create(&settings).is_ok());
}
