//! Conversion of captured f32 blocks into the transport envelope sent over
//! the live channel.

use base64::Engine;
use serde::{Deserialize, Serialize};

/// MIME type of the PCM payload expected by the live transcription service
pub const PCM_MIME_TYPE: &str = "audio/pcm;rate=16000";

/// Transport-ready audio chunk: base64 of little-endian 16-bit PCM.
///
/// Constructed once per captured block, sent, and discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioEnvelope {
    pub data: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

/// Base64-encode raw PCM bytes (standard alphabet, padded).
pub fn encode_bytes(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Convert a block of f32 samples into a transport envelope.
///
/// Each sample is scaled by 32768 and narrowed with two's-complement
/// wraparound. No clamping: a sample at exactly 1.0 becomes the 0x8000 bit
/// pattern (reads back as i16::MIN), and anything beyond [-1.0, 1.0] wraps.
/// Pure function; an empty block yields an empty data string.
pub fn encode_block(samples: &[f32]) -> AudioEnvelope {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let value = (f64::from(sample) * 32768.0) as i64 as i16;
        bytes.extend_from_slice(&value.to_le_bytes());
    }

    AudioEnvelope {
        data: encode_bytes(&bytes),
        mime_type: PCM_MIME_TYPE.to_string(),
    }
}
