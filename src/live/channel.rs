use anyhow::Result;
use tokio::sync::mpsc;

use crate::audio::AudioEnvelope;

/// Inbound events from the live transcription service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveEvent {
    /// Channel setup acknowledged; the service is ready for audio.
    Opened,
    /// Partial transcript fragment (may arrive multiple times per turn).
    Fragment(String),
    /// The service detected the end of an utterance.
    TurnComplete,
    /// Channel-level failure.
    Error(String),
    /// The remote side closed the channel.
    Closed,
}

/// Configuration carried into channel setup.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// System instruction embedding the allowed source-language names.
    pub system_instruction: String,
}

/// Outbound half of an open live channel.
#[async_trait::async_trait]
pub trait LiveChannel: Send + Sync {
    /// Send one audio envelope. Fire-and-forget from the service's point of
    /// view; an error here is fatal to the session.
    async fn send_audio(&mut self, envelope: &AudioEnvelope) -> Result<()>;

    /// Close the channel. Best-effort; errors are swallowed.
    async fn close(&mut self);
}

/// Opens live channels. Behind a trait so the session state machine can be
/// driven in tests without a network.
#[async_trait::async_trait]
pub trait LiveConnector: Send + Sync {
    /// Open a channel. Inbound events are delivered through `events` until
    /// the channel closes or the receiver is dropped.
    async fn connect(
        &self,
        config: &ChannelConfig,
        events: mpsc::Sender<LiveEvent>,
    ) -> Result<Box<dyn LiveChannel>>;
}
