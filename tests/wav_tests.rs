// Integration tests for the WAV writer lifecycle
//
// These verify that PCM bytes written through WaveformWriter come back
// byte-identical, that the container carries the fixed capture format,
// and that close() is idempotent.

use anyhow::Result;
use meeting_capture::audio::{
    AudioFile, Frame, WaveformWriter, BITS_PER_SAMPLE, CHANNELS, SAMPLE_RATE,
};
use tempfile::TempDir;

#[test]
fn test_round_trip_preserves_bytes() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("round-trip.wav");

    // Ten frames of a known tone
    let frames: Vec<Frame> = (0..10).map(|i| Frame::tone(1, 220.0, i)).collect();

    let mut writer = WaveformWriter::create(&path)?;
    for frame in &frames {
        writer.append(&frame.pcm)?;
    }
    let artifact = writer.close()?;

    assert_eq!(artifact.sample_rate, SAMPLE_RATE);
    assert_eq!(artifact.channels, CHANNELS);
    assert_eq!(artifact.bits_per_sample, BITS_PER_SAMPLE);
    assert_eq!(artifact.frames_written, 10);

    // 10 frames * 20ms = 0.2s
    assert!((artifact.duration_seconds - 0.2).abs() < 1e-9);

    let audio = AudioFile::open(&path)?;
    assert_eq!(audio.sample_rate, 48000);
    assert_eq!(audio.channels, 2);
    assert_eq!(audio.bits_per_sample, 16);
    assert!(audio.is_capture_format());
    assert_eq!(audio.path, path);

    let expected: Vec<i16> = frames
        .iter()
        .flat_map(|f| f.pcm.chunks_exact(2))
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect();
    assert_eq!(audio.samples, expected, "read-back should be byte-identical");

    Ok(())
}

#[test]
fn test_close_is_idempotent() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("idempotent.wav");

    let mut writer = WaveformWriter::create(&path)?;
    writer.append(&Frame::tone(1, 220.0, 0).pcm)?;

    let first = writer.close()?;
    let second = writer.close()?;

    assert_eq!(first.file_path, second.file_path);
    assert_eq!(first.frames_written, second.frames_written);
    assert_eq!(first.duration_seconds, second.duration_seconds);

    // File must still be readable after the repeat close
    let audio = AudioFile::open(&path)?;
    assert_eq!(audio.samples.len(), 1920);

    Ok(())
}

#[test]
fn test_misaligned_tail_is_truncated() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("misaligned.wav");

    let mut writer = WaveformWriter::create(&path)?;

    // 6 bytes: one full stereo sample pair plus 2 ragged bytes
    writer.append(&[0x01, 0x00, 0x02, 0x00, 0xff, 0xff])?;
    let artifact = writer.close()?;

    let audio = AudioFile::open(&path)?;
    assert_eq!(audio.samples, vec![1i16, 2]);
    assert_eq!(artifact.frames_written, 1);

    Ok(())
}

#[test]
fn test_empty_append_is_ignored() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("empty.wav");

    let mut writer = WaveformWriter::create(&path)?;
    writer.append(&[])?;
    let artifact = writer.close()?;

    assert_eq!(artifact.frames_written, 0);
    assert_eq!(artifact.duration_seconds, 0.0);

    Ok(())
}
