use anyhow::Result;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// One capture callback's worth of audio (mono f32 samples)
#[derive(Debug, Clone)]
pub struct AudioBlock {
    /// Linear PCM samples, nominally in [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Configuration for audio capture backends
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Target sample rate (backends decimate if the device runs faster)
    pub target_sample_rate: u32,
    /// Number of samples per delivered block
    pub block_size: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: 16000, // what the live transcription service expects
            block_size: 4096,
        }
    }
}

/// Audio capture backend trait
///
/// Implementations:
/// - Microphone: cpal default input device
/// - File: WAV replay (testing / batch processing)
#[async_trait::async_trait]
pub trait AudioBackend: Send + Sync {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive audio blocks
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioBlock>>;

    /// Stop capturing audio and release the device
    async fn stop(&mut self) -> Result<()>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Audio source type
#[derive(Debug, Clone)]
pub enum AudioSource {
    /// Default microphone input
    Microphone,
    /// WAV file replay (for testing/batch processing)
    File(PathBuf),
}

/// Audio backend factory
pub struct AudioBackendFactory;

impl AudioBackendFactory {
    /// Create an audio backend for the given source
    pub fn create(source: AudioSource, config: CaptureConfig) -> Result<Box<dyn AudioBackend>> {
        match source {
            AudioSource::Microphone => Ok(Box::new(super::capture::MicrophoneBackend::new(config))),
            AudioSource::File(path) => {
                // Replay is paced at real time so the service segments
                // turns the same way it would for a microphone.
                let backend = super::file::WavFileBackend::open(path, config)?.realtime(true);
                Ok(Box::new(backend))
            }
        }
    }
}
