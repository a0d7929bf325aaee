//! Microphone capture backend built on cpal.
//!
//! The cpal stream is not `Send`, so it lives on a dedicated worker thread.
//! The data callback downmixes to mono, decimates to the target sample rate
//! and accumulates fixed-size blocks which are handed to the session over an
//! mpsc channel.

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::backend::{AudioBackend, AudioBlock, CaptureConfig};

/// Captures audio from the system's default input device.
pub struct MicrophoneBackend {
    config: CaptureConfig,
    capturing: Arc<AtomicBool>,
    worker: Option<std::thread::JoinHandle<()>>,
}

impl MicrophoneBackend {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            capturing: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }
}

#[async_trait::async_trait]
impl AudioBackend for MicrophoneBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioBlock>> {
        let (tx, rx) = mpsc::channel(100);

        self.capturing.store(true, Ordering::SeqCst);
        let capturing = Arc::clone(&self.capturing);
        let config = self.config.clone();

        // The worker reports whether the device could be opened before we
        // return from start().
        let (ready_tx, ready_rx) = std::sync::mpsc::channel::<Result<()>>();

        let worker = std::thread::spawn(move || {
            let stream = match build_stream(&config, tx, Arc::clone(&capturing)) {
                Ok(stream) => stream,
                Err(e) => {
                    capturing.store(false, Ordering::SeqCst);
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };

            if let Err(e) = stream.play() {
                capturing.store(false, Ordering::SeqCst);
                let _ = ready_tx.send(Err(anyhow!("Failed to start audio stream: {}", e)));
                return;
            }

            let _ = ready_tx.send(Ok(()));

            // Keep the stream alive until the session stops capturing.
            while capturing.load(Ordering::SeqCst) {
                std::thread::sleep(Duration::from_millis(50));
            }
            drop(stream);
        });

        let startup = tokio::task::spawn_blocking(move || ready_rx.recv())
            .await
            .context("Capture worker startup task failed")?
            .context("Capture worker exited before reporting readiness")?;

        match startup {
            Ok(()) => {
                self.worker = Some(worker);
                Ok(rx)
            }
            Err(e) => {
                self.capturing.store(false, Ordering::SeqCst);
                Err(e).context("Failed to acquire microphone")
            }
        }
    }

    async fn stop(&mut self) -> Result<()> {
        self.capturing.store(false, Ordering::SeqCst);

        if let Some(worker) = self.worker.take() {
            tokio::task::spawn_blocking(move || {
                if worker.join().is_err() {
                    error!("Capture worker thread panicked");
                }
            })
            .await
            .context("Failed to join capture worker")?;
        }

        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "microphone"
    }
}

fn build_stream(
    config: &CaptureConfig,
    tx: mpsc::Sender<AudioBlock>,
    capturing: Arc<AtomicBool>,
) -> Result<cpal::Stream> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("No audio input device available"))?;

    let device_name = device
        .name()
        .unwrap_or_else(|_| "Unknown device".to_string());

    let device_config = device
        .default_input_config()
        .context("Failed to read input device configuration")?;

    let device_rate = device_config.sample_rate().0;
    let channels = device_config.channels() as usize;

    info!(
        "Capture device: {} ({}Hz, {} channels)",
        device_name, device_rate, channels
    );

    if device_rate != config.target_sample_rate && device_rate % config.target_sample_rate != 0 {
        warn!(
            "Device rate {}Hz is not a multiple of target {}Hz; decimation will be approximate",
            device_rate, config.target_sample_rate
        );
    }

    let decimation = (device_rate / config.target_sample_rate).max(1) as usize;
    let shaper = BlockShaper::new(config.block_size, channels, decimation, config.target_sample_rate);

    let sample_format = device_config.sample_format();
    let stream_config: cpal::StreamConfig = device_config.into();

    match sample_format {
        SampleFormat::F32 => build_typed_stream::<f32>(&device, &stream_config, shaper, tx, capturing),
        SampleFormat::I16 => build_typed_stream::<i16>(&device, &stream_config, shaper, tx, capturing),
        SampleFormat::U16 => build_typed_stream::<u16>(&device, &stream_config, shaper, tx, capturing),
        format => Err(anyhow!("Unsupported input sample format: {}", format)),
    }
}

fn build_typed_stream<T>(
    device: &cpal::Device,
    stream_config: &cpal::StreamConfig,
    mut shaper: BlockShaper,
    tx: mpsc::Sender<AudioBlock>,
    capturing: Arc<AtomicBool>,
) -> Result<cpal::Stream>
where
    T: cpal::SizedSample,
    f32: cpal::FromSample<T>,
{
    let mut scratch: Vec<f32> = Vec::new();

    let stream = device
        .build_input_stream(
            stream_config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                if !capturing.load(Ordering::SeqCst) {
                    return;
                }
                scratch.clear();
                scratch.extend(data.iter().map(|s| s.to_sample::<f32>()));
                shaper.push(&scratch, &tx);
            },
            |err| {
                error!("Audio stream error: {}", err);
            },
            None,
        )
        .context("Failed to build audio input stream")?;

    Ok(stream)
}

/// Downmixes interleaved device frames to mono, decimates to the target
/// rate and emits fixed-size blocks.
struct BlockShaper {
    block: Vec<f32>,
    block_size: usize,
    channels: usize,
    decimation: usize,
    phase: usize,
    sample_rate: u32,
    samples_emitted: u64,
}

impl BlockShaper {
    fn new(block_size: usize, channels: usize, decimation: usize, sample_rate: u32) -> Self {
        Self {
            block: Vec::with_capacity(block_size),
            block_size,
            channels: channels.max(1),
            decimation: decimation.max(1),
            phase: 0,
            sample_rate,
            samples_emitted: 0,
        }
    }

    fn push(&mut self, interleaved: &[f32], tx: &mpsc::Sender<AudioBlock>) {
        for frame in interleaved.chunks_exact(self.channels) {
            if self.phase == 0 {
                let mono = frame.iter().sum::<f32>() / self.channels as f32;
                self.block.push(mono);

                if self.block.len() >= self.block_size {
                    self.emit(tx);
                }
            }
            self.phase = (self.phase + 1) % self.decimation;
        }
    }

    fn emit(&mut self, tx: &mpsc::Sender<AudioBlock>) {
        let timestamp_ms = self.samples_emitted * 1000 / u64::from(self.sample_rate);
        self.samples_emitted += self.block.len() as u64;

        let block = AudioBlock {
            samples: std::mem::replace(&mut self.block, Vec::with_capacity(self.block_size)),
            sample_rate: self.sample_rate,
            timestamp_ms,
        };

        // Never block the audio callback; drop the block if the session is
        // not keeping up.
        if tx.try_send(block).is_err() {
            warn!("Audio block dropped (session not consuming)");
        }
    }
}
