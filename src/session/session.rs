use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::config::SessionConfig;
use super::history::{History, Transcription};
use super::stats::SessionStats;
use crate::audio::{encode_block, AudioBackend, AudioEnvelope};
use crate::languages::Language;
use crate::live::{ChannelConfig, LiveChannel, LiveConnector, LiveEvent};
use crate::translate::{process_turn, TextModel};

/// Microphone or capture setup failed; the session never became active.
pub const STATUS_MIC_ERROR: &str = "マイクへのアクセスに失敗しました。アクセスを許可してください。";
/// The live channel could not be opened.
pub const STATUS_CONNECT_ERROR: &str =
    "APIへの接続に失敗しました。キーが有効か、ネットワーク接続を確認してください。";
/// The live channel reported an error while active.
pub const STATUS_CHANNEL_ERROR: &str = "API接続中にエラーが発生しました。";
/// An audio envelope could not be sent.
pub const STATUS_SEND_ERROR: &str = "音声データの送信中にエラーが発生しました。録音を停止します。";
/// The remote side closed the channel unexpectedly.
pub const STATUS_CLOSED_ERROR: &str = "接続が予期せず終了しました。";

/// Control queue consumed by the session task alongside the channel's
/// event stream. Channel events are always drained ahead of these, so a
/// stop never outruns a fragment the service already delivered.
enum SessionEvent {
    Audio(AudioEnvelope),
    Stop,
}

/// A live transcription session.
///
/// At most one recording is active at a time; `start` while active is a
/// no-op. All resources (capture backend, live channel) are owned by the
/// session task and released in a fixed teardown order on stop or on any
/// fatal channel error.
pub struct LiveSession {
    config: SessionConfig,
    model: Arc<dyn TextModel>,
    active: Arc<AtomicBool>,
    started_at: DateTime<Utc>,
    history: Arc<Mutex<History>>,
    last_error: Arc<Mutex<Option<String>>>,
    events_tx: Mutex<Option<mpsc::Sender<SessionEvent>>>,
    loop_handle: Mutex<Option<JoinHandle<()>>>,
    pipeline_tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
    running: Arc<watch::Sender<bool>>,
}

impl LiveSession {
    pub fn new(config: SessionConfig, model: Arc<dyn TextModel>) -> Self {
        let (running, _) = watch::channel(false);

        Self {
            config,
            model,
            active: Arc::new(AtomicBool::new(false)),
            started_at: Utc::now(),
            history: Arc::new(Mutex::new(History::new())),
            last_error: Arc::new(Mutex::new(None)),
            events_tx: Mutex::new(None),
            loop_handle: Mutex::new(None),
            pipeline_tasks: Arc::new(Mutex::new(Vec::new())),
            running: Arc::new(running),
        }
    }

    /// Start recording: acquire the capture backend, open the live channel
    /// and spawn the session task.
    ///
    /// Acquisition and connection failures return the session to idle with
    /// a user-facing status and no leaked resources.
    pub async fn start(
        &self,
        mut backend: Box<dyn AudioBackend>,
        connector: &dyn LiveConnector,
    ) -> Result<()> {
        if self.active.swap(true, Ordering::SeqCst) {
            warn!("Recording already active");
            return Ok(());
        }

        info!("Starting live session: {}", self.config.session_id);
        *self.last_error.lock().await = None;

        let mut audio_rx = match backend.start().await {
            Ok(rx) => rx,
            Err(e) => {
                self.active.store(false, Ordering::SeqCst);
                set_error(&self.last_error, STATUS_MIC_ERROR).await;
                return Err(e.context("Failed to start audio capture"));
            }
        };

        // A stop issued while the backend was starting wins; release the
        // device and return without going active.
        if !self.active.load(Ordering::SeqCst) {
            if let Err(e) = backend.stop().await {
                warn!("Failed to stop audio backend: {:#}", e);
            }
            return Ok(());
        }

        let (live_tx, live_rx) = mpsc::channel(100);
        let channel_config = ChannelConfig {
            system_instruction: self.config.system_instruction(),
        };

        let mut channel = match connector.connect(&channel_config, live_tx).await {
            Ok(channel) => channel,
            Err(e) => {
                if let Err(stop_err) = backend.stop().await {
                    warn!("Failed to stop audio backend: {:#}", stop_err);
                }
                self.active.store(false, Ordering::SeqCst);
                set_error(&self.last_error, STATUS_CONNECT_ERROR).await;
                return Err(e.context("Failed to open live channel"));
            }
        };

        // Same check after the connect await.
        if !self.active.load(Ordering::SeqCst) {
            if let Err(e) = backend.stop().await {
                warn!("Failed to stop audio backend: {:#}", e);
            }
            channel.close().await;
            return Ok(());
        }

        let (events_tx, events_rx) = mpsc::channel(100);

        // Audio pump: convert each captured block and queue the envelope.
        let pump_tx = events_tx.clone();
        let pump_active = Arc::clone(&self.active);
        tokio::spawn(async move {
            while let Some(block) = audio_rx.recv().await {
                if !pump_active.load(Ordering::SeqCst) {
                    break;
                }
                let envelope = encode_block(&block.samples);
                if pump_tx.send(SessionEvent::Audio(envelope)).await.is_err() {
                    break;
                }
            }
        });

        let task = SessionTask {
            events_rx,
            live_rx,
            channel,
            backend,
            active: Arc::clone(&self.active),
            history: Arc::clone(&self.history),
            model: Arc::clone(&self.model),
            target: self.config.target_language,
            last_error: Arc::clone(&self.last_error),
            pipeline_tasks: Arc::clone(&self.pipeline_tasks),
            running: Arc::clone(&self.running),
        };

        let _ = self.running.send(true);
        let handle = tokio::spawn(task.run());

        *self.events_tx.lock().await = Some(events_tx);
        *self.loop_handle.lock().await = Some(handle);

        // A stop that landed between the checks above and publishing the
        // queue found no sender; honor it now that the task exists.
        if !self.active.load(Ordering::SeqCst) {
            if let Some(events_tx) = self.events_tx.lock().await.take() {
                let _ = events_tx.send(SessionEvent::Stop).await;
            }
            if let Some(handle) = self.loop_handle.lock().await.take() {
                if let Err(e) = handle.await {
                    error!("Session task panicked: {}", e);
                }
            }
        }

        Ok(())
    }

    /// Stop recording and wait for teardown to finish.
    ///
    /// A non-empty turn buffer is flushed into the pipeline as a final
    /// transcription; the pipeline itself is not awaited (see
    /// [`LiveSession::wait_for_pipeline`]).
    pub async fn stop(&self) -> Result<()> {
        // Clearing the flag first also covers a stop that arrives while
        // start() is still awaiting the backend or the connector: start()
        // re-checks the flag after each await and releases whatever it
        // acquired.
        let was_active = self.active.swap(false, Ordering::SeqCst);
        let events_tx = self.events_tx.lock().await.take();

        if !was_active && events_tx.is_none() {
            warn!("Recording not active");
            return Ok(());
        }

        info!("Stopping live session: {}", self.config.session_id);

        // Send may fail if the session already tore down on an error; the
        // task has exited either way.
        if let Some(events_tx) = events_tx {
            let _ = events_tx.send(SessionEvent::Stop).await;
        }

        if let Some(handle) = self.loop_handle.lock().await.take() {
            if let Err(e) = handle.await {
                error!("Session task panicked: {}", e);
            }
        }

        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Completed transcriptions, newest first.
    pub async fn history(&self) -> Vec<Transcription> {
        self.history.lock().await.records().to_vec()
    }

    /// Latest user-facing error; replaced, never accumulated.
    pub async fn last_error(&self) -> Option<String> {
        self.last_error.lock().await.clone()
    }

    pub async fn stats(&self) -> SessionStats {
        let duration = Utc::now().signed_duration_since(self.started_at);

        SessionStats {
            is_active: self.is_active(),
            started_at: self.started_at,
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
            turns_completed: self.history.lock().await.len(),
            last_error: self.last_error.lock().await.clone(),
        }
    }

    /// Wait for all in-flight post-processing tasks to finish.
    pub async fn wait_for_pipeline(&self) {
        let handles: Vec<_> = self.pipeline_tasks.lock().await.drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }
    }

    /// Resolves when the session leaves the active state (user stop or
    /// fatal channel error).
    pub async fn closed(&self) {
        let mut rx = self.running.subscribe();
        while *rx.borrow() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

/// The session task: owns the channel and the capture backend, consumes
/// the event streams and runs the turn-accumulation state machine.
struct SessionTask {
    events_rx: mpsc::Receiver<SessionEvent>,
    live_rx: mpsc::Receiver<LiveEvent>,
    channel: Box<dyn LiveChannel>,
    backend: Box<dyn AudioBackend>,
    active: Arc<AtomicBool>,
    history: Arc<Mutex<History>>,
    model: Arc<dyn TextModel>,
    target: Language,
    last_error: Arc<Mutex<Option<String>>>,
    pipeline_tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
    running: Arc<watch::Sender<bool>>,
}

impl SessionTask {
    async fn run(mut self) {
        let mut turn = String::new();
        let mut opened = false;
        // Blocks captured before the service acknowledges setup are held
        // back and sent once the channel opens.
        let mut pending: Vec<AudioEnvelope> = Vec::new();

        loop {
            // Biased towards the channel stream: fragments and turn
            // boundaries already delivered are consumed before a stop.
            tokio::select! {
                biased;
                event = self.live_rx.recv() => {
                    let Some(event) = event else { break };
                    match event {
                        LiveEvent::Opened => {
                            info!("Live channel open");
                            opened = true;
                            let backlog = std::mem::take(&mut pending);
                            if !self.send_all(backlog).await {
                                break;
                            }
                        }
                        LiveEvent::Fragment(text) => {
                            debug!("Fragment received: {:?}", text);
                            turn.push_str(&text);
                        }
                        LiveEvent::TurnComplete => {
                            self.flush_turn(&mut turn).await;
                        }
                        LiveEvent::Error(message) => {
                            error!("Live channel error: {}", message);
                            set_error(&self.last_error, STATUS_CHANNEL_ERROR).await;
                            break;
                        }
                        LiveEvent::Closed => {
                            warn!("Live channel closed by remote side");
                            set_error(&self.last_error, STATUS_CLOSED_ERROR).await;
                            break;
                        }
                    }
                }
                event = self.events_rx.recv() => {
                    match event {
                        Some(SessionEvent::Audio(envelope)) => {
                            if !opened {
                                pending.push(envelope);
                            } else if !self.send_all(vec![envelope]).await {
                                break;
                            }
                        }
                        Some(SessionEvent::Stop) | None => {
                            self.drain_channel(&mut turn).await;
                            break;
                        }
                    }
                }
            }
        }

        self.teardown(&mut turn).await;
    }

    /// Consume channel events that were delivered before the stop but not
    /// yet pulled off the stream, so the final turn is complete.
    async fn drain_channel(&mut self, turn: &mut String) {
        while let Ok(event) = self.live_rx.try_recv() {
            match event {
                LiveEvent::Fragment(text) => turn.push_str(&text),
                LiveEvent::TurnComplete => self.flush_turn(turn).await,
                _ => {}
            }
        }
    }

    /// Send envelopes in order; on failure record the send error and
    /// report false so the caller begins teardown.
    async fn send_all(&mut self, envelopes: Vec<AudioEnvelope>) -> bool {
        for envelope in envelopes {
            if let Err(e) = self.channel.send_audio(&envelope).await {
                error!("Failed to send audio envelope: {:#}", e);
                set_error(&self.last_error, STATUS_SEND_ERROR).await;
                return false;
            }
        }
        true
    }

    /// Flush the accumulated turn into the post-processing pipeline and
    /// clear the buffer. Whitespace-only turns are discarded.
    ///
    /// Pipeline tasks are not serialized across turns; history order is
    /// completion order of the model calls.
    async fn flush_turn(&self, turn: &mut String) {
        let text = std::mem::take(turn);
        if text.trim().is_empty() {
            return;
        }

        let model = Arc::clone(&self.model);
        let history = Arc::clone(&self.history);
        let target = self.target;

        let handle = tokio::spawn(async move {
            let record = process_turn(model.as_ref(), &text, target).await;
            info!(
                "Turn recorded ({}): {}",
                record.source_lang, record.original_text
            );
            history.lock().await.prepend(record);
        });

        self.pipeline_tasks.lock().await.push(handle);
    }

    /// Release everything in a fixed order: mark inactive so in-flight
    /// callbacks become no-ops, stop capture, close the channel, flush a
    /// non-empty turn buffer, then signal idle.
    async fn teardown(&mut self, turn: &mut String) {
        self.active.store(false, Ordering::SeqCst);

        if let Err(e) = self.backend.stop().await {
            warn!("Failed to stop audio backend: {:#}", e);
        }

        self.channel.close().await;
        self.flush_turn(turn).await;

        let _ = self.running.send(false);
        info!("Live session stopped");
    }
}

async fn set_error(slot: &Mutex<Option<String>>, message: &str) {
    *slot.lock().await = Some(message.to_string());
}
