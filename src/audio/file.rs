//! WAV file capture backend.
//!
//! Replays a WAV file through the same interface as the microphone backend,
//! which makes the session runnable in tests and usable for replaying a
//! saved recording through the live service.

use anyhow::{bail, Context, Result};
use hound::WavReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use super::backend::{AudioBackend, AudioBlock, CaptureConfig};

/// Streams blocks read from a WAV file.
pub struct WavFileBackend {
    path: PathBuf,
    config: CaptureConfig,
    /// Pace block delivery at the block's real-time duration. Off by
    /// default so tests run fast; the replay CLI turns it on.
    realtime: bool,
    samples: Vec<f32>,
    capturing: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl WavFileBackend {
    /// Open a WAV file, downmix to mono and decimate to the target rate.
    pub fn open(path: impl AsRef<Path>, config: CaptureConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let reader = WavReader::open(&path).context("Failed to open WAV file")?;
        let spec = reader.spec();

        let raw: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<Result<Vec<_>, _>>()
                .context("Failed to read audio samples")?,
            hound::SampleFormat::Int => {
                if spec.bits_per_sample != 16 {
                    bail!(
                        "Unsupported WAV bit depth: {} (expected 16)",
                        spec.bits_per_sample
                    );
                }
                reader
                    .into_samples::<i16>()
                    .collect::<Result<Vec<_>, _>>()
                    .context("Failed to read audio samples")?
                    .into_iter()
                    .map(|s| f32::from(s) / 32768.0)
                    .collect()
            }
        };

        let channels = spec.channels.max(1) as usize;
        let mono: Vec<f32> = raw
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();

        let decimation = (spec.sample_rate / config.target_sample_rate).max(1) as usize;
        let samples: Vec<f32> = mono.into_iter().step_by(decimation).collect();

        info!(
            "WAV file loaded: {} ({:.1}s at {}Hz after conversion)",
            path.display(),
            samples.len() as f64 / f64::from(config.target_sample_rate),
            config.target_sample_rate
        );

        Ok(Self {
            path,
            config,
            realtime: false,
            samples,
            capturing: Arc::new(AtomicBool::new(false)),
            task: None,
        })
    }

    pub fn realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl AudioBackend for WavFileBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioBlock>> {
        let (tx, rx) = mpsc::channel(100);

        self.capturing.store(true, Ordering::SeqCst);
        let capturing = Arc::clone(&self.capturing);
        let samples = self.samples.clone();
        let sample_rate = self.config.target_sample_rate;
        let block_size = self.config.block_size;
        let realtime = self.realtime;

        let task = tokio::spawn(async move {
            let block_duration =
                Duration::from_millis(block_size as u64 * 1000 / u64::from(sample_rate));
            let mut emitted: u64 = 0;

            for chunk in samples.chunks(block_size) {
                if !capturing.load(Ordering::SeqCst) {
                    break;
                }

                let block = AudioBlock {
                    samples: chunk.to_vec(),
                    sample_rate,
                    timestamp_ms: emitted * 1000 / u64::from(sample_rate),
                };
                emitted += chunk.len() as u64;

                if tx.send(block).await.is_err() {
                    break;
                }

                if realtime {
                    tokio::time::sleep(block_duration).await;
                }
            }

            capturing.store(false, Ordering::SeqCst);
        });

        self.task = Some(task);
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.capturing.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "wav-file"
    }
}
