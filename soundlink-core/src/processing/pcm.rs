//! Sample/byte conversions at the audio callback boundary.
//!
//! The transport moves waveforms as raw little-endian bytes: i16 toward the
//! playback device, f32 from the capture device. These helpers are the only
//! place the byte layout is spelled out.

/// Convert f32 samples `[-1.0, 1.0]` to i16 little-endian bytes, clamping
/// out-of-range values.
pub fn f32_to_i16_bytes(samples: &[f32]) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let clamped = sample.clamp(-1.0, 1.0);
        let value = (clamped * i16::MAX as f32) as i16;
        data.extend_from_slice(&value.to_le_bytes());
    }
    data
}

/// Convert f32 samples to their little-endian byte representation.
pub fn f32_to_bytes(samples: &[f32]) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples.len() * 4);
    for &sample in samples {
        data.extend_from_slice(&sample.to_le_bytes());
    }
    data
}

/// Reinterpret little-endian bytes as f32 samples. Trailing bytes that do
/// not fill a sample are ignored.
pub fn bytes_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Reinterpret little-endian bytes as i16 samples. Trailing bytes that do
/// not fill a sample are ignored.
pub fn bytes_to_i16(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|c| i16::from_le_bytes([c[0], c[1]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn f32_to_i16_full_scale() {
        let bytes = f32_to_i16_bytes(&[0.0, 1.0, -1.0]);
        let samples = bytes_to_i16(&bytes);

        assert_eq!(samples, vec![0, i16::MAX, -i16::MAX]);
    }

    #[test]
    fn f32_to_i16_clamps_out_of_range() {
        let bytes = f32_to_i16_bytes(&[2.0, -3.0]);
        let samples = bytes_to_i16(&bytes);

        assert_eq!(samples, vec![i16::MAX, -i16::MAX]);
    }

    #[test]
    fn f32_bytes_round_trip() {
        let original = vec![0.0f32, 0.25, -0.5, 1.0];
        let back = bytes_to_f32(&f32_to_bytes(&original));

        assert_eq!(back.len(), original.len());
        for (a, b) in back.iter().zip(&original) {
            assert_relative_eq!(a, b);
        }
    }

    #[test]
    fn trailing_bytes_ignored() {
        assert_eq!(bytes_to_f32(&[0, 0, 0]).len(), 0);
        assert_eq!(bytes_to_i16(&[0, 0, 0]).len(), 1);
    }
}
