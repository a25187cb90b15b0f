use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::frame::{BITS_PER_SAMPLE, BLOCK_ALIGN, CHANNELS, SAMPLE_RATE};

/// A finalized, playable output file produced by one writer.
#[derive(Debug, Clone)]
pub struct WaveformArtifact {
    pub file_path: PathBuf,
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub duration_seconds: f64,
    /// Frames appended to this file
    pub frames_written: u64,
    /// Frames dropped at the queue because the writer fell behind
    pub frames_dropped: u64,
}

/// Owns exactly one open WAV file and its header/flush/close lifecycle.
///
/// `append` writes raw PCM bytes verbatim; no resampling, no mixing.
/// `close` finalizes the RIFF header and is idempotent. Dropping an open
/// writer also finalizes, so a force-terminated writer task still leaves a
/// playable partial file behind.
pub struct WaveformWriter {
    writer: Option<hound::WavWriter<BufWriter<File>>>,
    file_path: PathBuf,
    frames_written: u64,
    samples_written: u64,
    finalized: Option<WaveformArtifact>,
}

impl WaveformWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let spec = hound::WavSpec {
            channels: CHANNELS,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: BITS_PER_SAMPLE,
            sample_format: hound::SampleFormat::Int,
        };

        let writer = hound::WavWriter::create(path, spec)
            .with_context(|| format!("Failed to create WAV file: {:?}", path))?;

        Ok(Self {
            writer: Some(writer),
            file_path: path.to_path_buf(),
            frames_written: 0,
            samples_written: 0,
            finalized: None,
        })
    }

    /// Append one frame of PCM16LE bytes.
    ///
    /// Trailing bytes that do not fill a whole interleaved sample pair are
    /// truncated; the transport occasionally delivers ragged packets.
    pub fn append(&mut self, pcm: &[u8]) -> Result<()> {
        if pcm.is_empty() {
            return Ok(());
        }

        let aligned = pcm.len() - pcm.len() % BLOCK_ALIGN;
        if aligned < pcm.len() {
            debug!(
                "Truncating {} trailing byte(s) of misaligned PCM for {:?}",
                pcm.len() - aligned,
                self.file_path
            );
        }
        if aligned == 0 {
            return Ok(());
        }

        let writer = self
            .writer
            .as_mut()
            .context("WAV writer already finalized")?;

        for chunk in pcm[..aligned].chunks_exact(2) {
            writer
                .write_sample(i16::from_le_bytes([chunk[0], chunk[1]]))
                .context("Failed to write sample to WAV")?;
        }

        self.samples_written += (aligned / 2) as u64;
        self.frames_written += 1;

        Ok(())
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Finalize the header and return the artifact. Safe to call twice:
    /// repeat calls return the same artifact without touching the file.
    pub fn close(&mut self) -> Result<WaveformArtifact> {
        if let Some(artifact) = &self.finalized {
            return Ok(artifact.clone());
        }

        if let Some(writer) = self.writer.take() {
            writer.finalize().context("Failed to finalize WAV file")?;
        }

        let duration_seconds =
            self.samples_written as f64 / (SAMPLE_RATE as f64 * CHANNELS as f64);

        let artifact = WaveformArtifact {
            file_path: self.file_path.clone(),
            sample_rate: SAMPLE_RATE,
            channels: CHANNELS,
            bits_per_sample: BITS_PER_SAMPLE,
            duration_seconds,
            frames_written: self.frames_written,
            frames_dropped: 0,
        };

        self.finalized = Some(artifact.clone());
        Ok(artifact)
    }
}

impl Drop for WaveformWriter {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.take() {
            if let Err(e) = writer.finalize() {
                warn!("Failed to finalize WAV writer on drop: {}", e);
            }
        }
    }
}
