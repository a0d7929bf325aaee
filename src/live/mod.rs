//! Live transcription channel
//!
//! A long-lived bidirectional channel to the speech service: outbound
//! audio envelopes, inbound transcript fragments and turn boundaries.

pub mod channel;
pub mod gemini;

pub use channel::{ChannelConfig, LiveChannel, LiveConnector, LiveEvent};
pub use gemini::{GeminiLiveConnector, LIVE_MODEL};
