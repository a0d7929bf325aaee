//! Live transcription session
//!
//! This module provides the `LiveSession` abstraction that manages:
//! - Audio capture and conversion to transport envelopes
//! - The live channel to the transcription service
//! - Turn accumulation and flushing into the post-processing pipeline
//! - In-memory history of completed transcriptions
//! - Session state and the latest user-facing error

mod config;
mod history;
mod session;
mod stats;

pub use config::SessionConfig;
pub use history::{History, Transcription};
pub use session::{
    LiveSession, STATUS_CHANNEL_ERROR, STATUS_CLOSED_ERROR, STATUS_CONNECT_ERROR, STATUS_MIC_ERROR,
    STATUS_SEND_ERROR,
};
pub use stats::SessionStats;
