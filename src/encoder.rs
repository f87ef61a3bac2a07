//! Sample encoding: normalized float audio to 16-bit PCM.
//!
//! The transcription backend consumes raw little-endian PCM16 frames, one
//! per captured block. Negative and positive samples are scaled by 32768 and
//! 32767 respectively so the full signed 16-bit range is used without
//! overflowing at +1.0.

/// Encode one normalized sample (clamped to [-1.0, 1.0]) as a signed 16-bit
/// integer.
pub fn encode_sample(sample: f32) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    if clamped < 0.0 {
        (clamped * 32768.0).round() as i16
    } else {
        (clamped * 32767.0).round() as i16
    }
}

/// Encode a block of normalized samples. Output length equals input length.
pub fn encode_samples(block: &[f32]) -> Vec<i16> {
    block.iter().map(|&s| encode_sample(s)).collect()
}

/// Encode a block directly to its wire representation: little-endian bytes,
/// two per sample.
pub fn encode_frame(block: &[f32]) -> Vec<u8> {
    block
        .iter()
        .flat_map(|&s| encode_sample(s).to_le_bytes())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(value: i16) -> f32 {
        if value < 0 {
            value as f32 / 32768.0
        } else {
            value as f32 / 32767.0
        }
    }

    #[test]
    fn test_encode_extremes() {
        assert_eq!(encode_sample(0.0), 0);
        assert_eq!(encode_sample(1.0), i16::MAX);
        assert_eq!(encode_sample(-1.0), i16::MIN);
    }

    #[test]
    fn test_encode_clamps_out_of_range() {
        assert_eq!(encode_sample(2.0), i16::MAX);
        assert_eq!(encode_sample(-2.0), i16::MIN);
    }

    #[test]
    fn test_asymmetric_scaling() {
        assert_eq!(encode_sample(0.5), 16384); // round(0.5 * 32767)
        assert_eq!(encode_sample(-0.5), -16384); // -0.5 * 32768
    }

    #[test]
    fn test_length_preserved() {
        for len in [0, 1, 7, 800] {
            let block = vec![0.25f32; len];
            assert_eq!(encode_samples(&block).len(), len);
            assert_eq!(encode_frame(&block).len(), len * 2);
        }
    }

    #[test]
    fn test_round_trip_within_one_quantization_step() {
        let step = 1.0 / 32768.0;
        for &s in &[-1.0f32, -0.73, -0.5, -0.001, 0.0, 0.001, 0.33, 0.5, 0.999, 1.0] {
            let decoded = decode(encode_sample(s));
            assert!(
                (decoded - s).abs() <= step,
                "sample {} decoded to {} (off by {})",
                s,
                decoded,
                (decoded - s).abs()
            );
        }
    }

    #[test]
    fn test_frame_bytes_are_little_endian() {
        // 0.5 encodes to 16384 = 0x4000 -> [0x00, 0x40]
        let frame = encode_frame(&[0.5]);
        assert_eq!(frame, vec![0x00, 0x40]);
    }
}
