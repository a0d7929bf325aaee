// Unit tests for the sample converter
//
// These verify the byte-exact transport encoding: f32 samples scaled by
// 32768 with two's-complement wraparound, little-endian bytes, base64.

use lingua_live::audio::{encode_block, encode_bytes, PCM_MIME_TYPE};
use base64::Engine;

fn decode_samples(data: &str) -> Vec<i16> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data)
        .expect("envelope data should be valid base64");
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

#[test]
fn test_encode_bytes_known_vector() {
    // "Hello"
    assert_eq!(encode_bytes(&[72, 101, 108, 108, 111]), "SGVsbG8=");
}

#[test]
fn test_encode_bytes_empty() {
    assert_eq!(encode_bytes(&[]), "");
}

#[test]
fn test_encode_bytes_single_byte() {
    assert_eq!(encode_bytes(&[65]), "QQ==");
}

#[test]
fn test_empty_block_yields_empty_data() {
    let envelope = encode_block(&[]);
    assert_eq!(envelope.data, "");
    assert_eq!(envelope.mime_type, PCM_MIME_TYPE);
}

#[test]
fn test_mime_type_is_fixed() {
    let envelope = encode_block(&[0.5, -0.5]);
    assert_eq!(envelope.mime_type, "audio/pcm;rate=16000");
}

#[test]
fn test_scaling_of_in_range_samples() {
    let envelope = encode_block(&[0.5, -0.5, 0.25, -0.25, 0.0]);
    assert_eq!(
        decode_samples(&envelope.data),
        vec![16384, -16384, 8192, -8192, 0]
    );
}

#[test]
fn test_positive_full_scale_wraps() {
    // 1.0 * 32768 does not fit a signed 16-bit container; the raw 0x8000
    // bit pattern is stored, which reads back as i16::MIN.
    let envelope = encode_block(&[1.0]);
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(&envelope.data)
        .unwrap();
    assert_eq!(bytes, vec![0x00, 0x80]);
    assert_eq!(decode_samples(&envelope.data), vec![i16::MIN]);
}

#[test]
fn test_negative_full_scale() {
    let envelope = encode_block(&[-1.0]);
    assert_eq!(decode_samples(&envelope.data), vec![-32768]);
}

#[test]
fn test_out_of_range_samples_wrap() {
    // 1.5 * 32768 = 49152 -> wraps to -16384
    let envelope = encode_block(&[1.5]);
    assert_eq!(decode_samples(&envelope.data), vec![-16384]);
}

#[test]
fn test_conversion_is_pure() {
    let block: Vec<f32> = (0..4096).map(|i| (i as f32 / 10.0).sin() * 0.5).collect();
    let first = encode_block(&block);
    let second = encode_block(&block);
    assert_eq!(first, second);
}

#[test]
fn test_typical_block_size() {
    let block = vec![0.1f32; 4096];
    let envelope = encode_block(&block);
    // 4096 samples * 2 bytes, base64-expanded
    assert_eq!(decode_samples(&envelope.data).len(), 4096);
}

#[test]
fn test_envelope_serializes_with_camel_case_mime_type() {
    let envelope = encode_block(&[0.0]);
    let json = serde_json::to_value(&envelope).unwrap();
    assert!(json.get("mimeType").is_some());
    assert!(json.get("mime_type").is_none());
}
