mod dubbing_client_factory;
mod elevenlabs_client;
mod mock_dubbing_client;

pub use dubbing_client_factory::DubbingClientFactory;
pub use elevenlabs_client::ElevenLabsClient;
pub use mock_dubbing_client::{MockDubbingClient, RecordedSubmission};
