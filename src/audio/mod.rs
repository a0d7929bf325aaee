pub mod backend;
pub mod capture;
pub mod encode;
pub mod file;

pub use backend::{AudioBackend, AudioBackendFactory, AudioBlock, AudioSource, CaptureConfig};
pub use capture::MicrophoneBackend;
pub use encode::{encode_block, encode_bytes, AudioEnvelope, PCM_MIME_TYPE};
pub use file::WavFileBackend;
