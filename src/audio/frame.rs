use chrono::{DateTime, Utc};

/// Speaker identity as delivered by the voice transport.
pub type SpeakerId = u64;

/// Fixed capture format: interleaved stereo PCM16 at 48 kHz.
pub const SAMPLE_RATE: u32 = 48_000;
pub const CHANNELS: u16 = 2;
pub const BITS_PER_SAMPLE: u16 = 16;

/// Bytes per interleaved sample pair (one point in time across channels).
pub const BLOCK_ALIGN: usize = CHANNELS as usize * (BITS_PER_SAMPLE as usize / 8);

/// Nominal frame duration from the transport (~20 ms packets).
pub const FRAME_DURATION_MS: u64 = 20;

/// Size of one nominal frame: 960 sample pairs of stereo PCM16.
pub const FRAME_BYTES: usize =
    (SAMPLE_RATE as u64 * FRAME_DURATION_MS / 1000) as usize * BLOCK_ALIGN;

/// One decoded audio packet for one speaker.
///
/// Frames are moved, never shared: each frame is routed into exactly one
/// track queue and consumed by exactly one writer task.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Who was speaking
    pub speaker_id: SpeakerId,
    /// Raw PCM bytes (16-bit little-endian, interleaved stereo, 48 kHz)
    pub pcm: Vec<u8>,
    /// When the transport delivered the packet
    pub captured_at: DateTime<Utc>,
}

impl Frame {
    pub fn new(speaker_id: SpeakerId, pcm: Vec<u8>) -> Self {
        Self {
            speaker_id,
            pcm,
            captured_at: Utc::now(),
        }
    }

    /// Synthesize one 20 ms frame of a pure tone, phase-continuous across
    /// consecutive `index` values. Used by the demo binary and tests.
    pub fn tone(speaker_id: SpeakerId, frequency_hz: f32, index: u32) -> Self {
        let samples_per_channel = (SAMPLE_RATE as u64 * FRAME_DURATION_MS / 1000) as u32;
        let mut pcm = Vec::with_capacity(FRAME_BYTES);

        for n in 0..samples_per_channel {
            let t = (index * samples_per_channel + n) as f32 / SAMPLE_RATE as f32;
            let value = ((t * frequency_hz * std::f32::consts::TAU).sin()
                * 0.3
                * i16::MAX as f32) as i16;
            let bytes = value.to_le_bytes();
            // Same signal on both channels
            pcm.extend_from_slice(&bytes);
            pcm.extend_from_slice(&bytes);
        }

        Self::new(speaker_id, pcm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_constants() {
        assert_eq!(BLOCK_ALIGN, 4);
        assert_eq!(FRAME_BYTES, 3840); // 960 stereo sample pairs
    }

    #[test]
    fn test_tone_frame_size() {
        let frame = Frame::tone(1, 220.0, 0);
        assert_eq!(frame.speaker_id, 1);
        assert_eq!(frame.pcm.len(), FRAME_BYTES);
    }

    #[test]
    fn test_tone_frame_is_deterministic() {
        let a = Frame::tone(1, 330.0, 7);
        let b = Frame::tone(1, 330.0, 7);
        assert_eq!(a.pcm, b.pcm);
    }

    #[test]
    fn test_tone_frame_channels_match() {
        let frame = Frame::tone(1, 220.0, 3);
        for pair in frame.pcm.chunks_exact(BLOCK_ALIGN) {
            assert_eq!(pair[0..2], pair[2..4], "left and right should carry the same signal");
        }
    }
}
