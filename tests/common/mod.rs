#![allow(dead_code)]

// Test doubles for the session's external collaborators: the capture
// backend, the live channel and the text model.

use anyhow::{anyhow, bail, Result};
use lingua_live::audio::{AudioBackend, AudioBlock, AudioEnvelope};
use lingua_live::live::{ChannelConfig, LiveChannel, LiveConnector, LiveEvent};
use lingua_live::{LiveSession, TextModel};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelCall {
    Identify(String),
    Translate {
        text: String,
        source: String,
        target: String,
    },
}

/// Text model with canned responses. `None` makes the corresponding call
/// fail.
pub struct MockTextModel {
    pub identify_response: Option<String>,
    pub translate_response: Option<String>,
    calls: Mutex<Vec<ModelCall>>,
}

impl MockTextModel {
    pub fn new(identify: Option<&str>, translate: Option<&str>) -> Self {
        Self {
            identify_response: identify.map(str::to_string),
            translate_response: translate.map(str::to_string),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<ModelCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TextModel for MockTextModel {
    async fn identify_language(&self, text: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push(ModelCall::Identify(text.to_string()));
        self.identify_response
            .clone()
            .ok_or_else(|| anyhow!("identification unavailable"))
    }

    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        self.calls.lock().unwrap().push(ModelCall::Translate {
            text: text.to_string(),
            source: source_lang.to_string(),
            target: target_lang.to_string(),
        });
        self.translate_response
            .clone()
            .ok_or_else(|| anyhow!("translation unavailable"))
    }
}

/// Connector that hands out a scripted channel and captures the inbound
/// event sender so tests can inject fragments and turn boundaries.
pub struct MockConnector {
    events: Mutex<Option<mpsc::Sender<LiveEvent>>>,
    pub sent: Arc<Mutex<Vec<AudioEnvelope>>>,
    pub closed: Arc<AtomicBool>,
    pub connect_started: Arc<AtomicBool>,
    gate: Option<Arc<tokio::sync::Notify>>,
    pub fail_connect: bool,
    pub fail_send: bool,
}

impl MockConnector {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(None),
            sent: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(AtomicBool::new(false)),
            connect_started: Arc::new(AtomicBool::new(false)),
            gate: None,
            fail_connect: false,
            fail_send: false,
        }
    }

    pub fn failing_connect() -> Self {
        Self {
            fail_connect: true,
            ..Self::new()
        }
    }

    pub fn failing_send() -> Self {
        Self {
            fail_send: true,
            ..Self::new()
        }
    }

    /// Connector whose `connect` blocks until the returned gate is
    /// notified, for driving stop-while-connecting flows.
    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(tokio::sync::Notify::new())),
            ..Self::new()
        }
    }

    pub fn gate(&self) -> Arc<tokio::sync::Notify> {
        Arc::clone(self.gate.as_ref().expect("connector was not gated"))
    }

    /// Inject an inbound channel event into the session.
    pub async fn emit(&self, event: LiveEvent) {
        let tx = self
            .events
            .lock()
            .unwrap()
            .clone()
            .expect("channel was never connected");
        tx.send(event).await.expect("session dropped event queue");
    }

    pub fn sent_envelopes(&self) -> Vec<AudioEnvelope> {
        self.sent.lock().unwrap().clone()
    }

    pub fn was_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LiveConnector for MockConnector {
    async fn connect(
        &self,
        _config: &ChannelConfig,
        events: mpsc::Sender<LiveEvent>,
    ) -> Result<Box<dyn LiveChannel>> {
        self.connect_started.store(true, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail_connect {
            bail!("connection refused");
        }
        *self.events.lock().unwrap() = Some(events);
        Ok(Box::new(MockChannel {
            sent: Arc::clone(&self.sent),
            closed: Arc::clone(&self.closed),
            fail_send: self.fail_send,
        }))
    }
}

pub struct MockChannel {
    sent: Arc<Mutex<Vec<AudioEnvelope>>>,
    closed: Arc<AtomicBool>,
    fail_send: bool,
}

#[async_trait::async_trait]
impl LiveChannel for MockChannel {
    async fn send_audio(&mut self, envelope: &AudioEnvelope) -> Result<()> {
        if self.fail_send {
            bail!("socket went away");
        }
        self.sent.lock().unwrap().push(envelope.clone());
        Ok(())
    }

    async fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Capture backend that delivers a fixed set of blocks and records
/// start/stop calls.
pub struct MockBackend {
    blocks: Vec<AudioBlock>,
    pub started: Arc<AtomicBool>,
    pub stopped: Arc<AtomicBool>,
    pub fail_start: bool,
}

impl MockBackend {
    pub fn new(blocks: Vec<AudioBlock>) -> Self {
        Self {
            blocks,
            started: Arc::new(AtomicBool::new(false)),
            stopped: Arc::new(AtomicBool::new(false)),
            fail_start: false,
        }
    }

    pub fn silent() -> Self {
        Self::new(Vec::new())
    }

    pub fn failing() -> Self {
        Self {
            fail_start: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn block(samples: Vec<f32>) -> AudioBlock {
        AudioBlock {
            samples,
            sample_rate: 16000,
            timestamp_ms: 0,
        }
    }
}

#[async_trait::async_trait]
impl AudioBackend for MockBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioBlock>> {
        if self.fail_start {
            bail!("microphone permission denied");
        }
        self.started.store(true, Ordering::SeqCst);

        let (tx, rx) = mpsc::channel(100);
        for block in self.blocks.clone() {
            tx.send(block).await.expect("fresh channel");
        }
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.stopped.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.started.load(Ordering::SeqCst) && !self.stopped.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Poll until the history holds at least `len` records.
pub async fn wait_for_history(session: &LiveSession, len: usize) {
    for _ in 0..500 {
        if session.history().await.len() >= len {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {} history records", len);
}

/// Poll until the session leaves the active state.
pub async fn wait_for_idle(session: &LiveSession) {
    for _ in 0..500 {
        if !session.is_active() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for session to go idle");
}

/// Poll an arbitrary condition.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for condition");
}
