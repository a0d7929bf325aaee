pub mod audio;
pub mod config;
pub mod languages;
pub mod live;
pub mod session;
pub mod translate;

pub use audio::{
    encode_block, encode_bytes, AudioBackend, AudioBackendFactory, AudioBlock, AudioEnvelope,
    AudioSource, CaptureConfig, MicrophoneBackend, WavFileBackend,
};
pub use config::Config;
pub use languages::{Language, SOURCE_LANGUAGE_LIMIT, SUPPORTED_LANGUAGES};
pub use live::{ChannelConfig, GeminiLiveConnector, LiveChannel, LiveConnector, LiveEvent};
pub use session::{History, LiveSession, SessionConfig, SessionStats, Transcription};
pub use translate::{process_turn, GeminiTextModel, TextModel, TRANSLATION_FAILED, UNKNOWN_LANGUAGE};
