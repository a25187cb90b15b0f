use anyhow::{ensure, Context, Result};
use hound::{SampleFormat, WavReader};
use std::path::{Path, PathBuf};

use super::frame::{BITS_PER_SAMPLE, CHANNELS, SAMPLE_RATE};

/// A recording read back from disk, used to verify finished artifacts.
pub struct AudioFile {
    pub path: PathBuf,
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub duration_seconds: f64,
    pub samples: Vec<i16>,
}

impl AudioFile {
    /// Decode a finished WAV. Rejects non-integer PCM up front; everything
    /// this engine writes is 16-bit integer samples.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let reader = WavReader::open(path)
            .with_context(|| format!("Failed to open WAV file {:?}", path))?;
        let spec = reader.spec();
        ensure!(
            spec.sample_format == SampleFormat::Int,
            "{:?} holds float samples, expected integer PCM",
            path
        );

        let samples = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Failed to decode samples from {:?}", path))?;
        let samples_per_second = spec.sample_rate as f64 * spec.channels as f64;

        Ok(Self {
            path: path.to_path_buf(),
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            bits_per_sample: spec.bits_per_sample,
            duration_seconds: samples.len() as f64 / samples_per_second,
            samples,
        })
    }

    /// Whether the container carries the engine's fixed capture format
    /// (48 kHz, stereo, 16-bit).
    pub fn is_capture_format(&self) -> bool {
        self.sample_rate == SAMPLE_RATE
            && self.channels == CHANNELS
            && self.bits_per_sample == BITS_PER_SAMPLE
    }
}
