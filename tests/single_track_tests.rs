// Integration tests for single-track recording
//
// All speakers share one queue, one writer, and one output file; frames
// land in the file in arrival order.

use anyhow::Result;
use meeting_capture::audio::{AudioFile, Frame};
use meeting_capture::sink::{RecordingSink, SingleTrackSink, TrackId};
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn test_overlapping_speakers_share_one_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let sink = SingleTrackSink::new(temp_dir.path(), 256, Duration::from_secs(5));

    // Two fully overlapping ~1s speakers
    for i in 0..50 {
        sink.accept(Frame::tone(1, 220.0, i));
        sink.accept(Frame::tone(2, 330.0, i));
    }

    assert_eq!(sink.speaker_count(), 2);

    let outcomes = sink.stop().await;
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].track, TrackId::Mixed);

    let artifact = outcomes[0]
        .result
        .as_ref()
        .expect("shared track should succeed")
        .as_ref()
        .expect("shared track should have frames");

    assert!(artifact.file_path.ends_with("meeting_recording.wav"));
    assert_eq!(artifact.frames_written, 100);

    // Arrival-order interleave: duration lands between max(a, b) and a + b;
    // with no drops it is exactly the sum.
    assert!(artifact.duration_seconds >= 1.0);
    assert!(artifact.duration_seconds <= 2.0 + 0.001);
    assert!((artifact.duration_seconds - 2.0).abs() < 0.001);

    let audio = AudioFile::open(&artifact.file_path)?;
    assert_eq!(audio.sample_rate, 48000);
    assert_eq!(audio.channels, 2);

    Ok(())
}

#[tokio::test]
async fn test_frames_written_in_arrival_order() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let sink = SingleTrackSink::new(temp_dir.path(), 256, Duration::from_secs(5));

    // Alternate strictly so the expected byte layout is deterministic
    let mut expected = Vec::new();
    for i in 0..10 {
        let a = Frame::tone(1, 220.0, i);
        let b = Frame::tone(2, 330.0, i);
        expected.extend_from_slice(&a.pcm);
        expected.extend_from_slice(&b.pcm);
        sink.accept(a);
        sink.accept(b);
    }

    let outcomes = sink.stop().await;
    let artifact = outcomes[0]
        .result
        .as_ref()
        .expect("shared track should succeed")
        .as_ref()
        .expect("shared track should have frames");

    let audio = AudioFile::open(&artifact.file_path)?;
    let expected_samples: Vec<i16> = expected
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect();
    assert_eq!(audio.samples, expected_samples);

    Ok(())
}

#[tokio::test]
async fn test_release_keeps_shared_track_open() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let sink = SingleTrackSink::new(temp_dir.path(), 256, Duration::from_secs(5));

    sink.accept(Frame::tone(1, 220.0, 0));
    sink.accept(Frame::tone(2, 330.0, 0));
    sink.release(1);

    assert_eq!(sink.speaker_count(), 1);

    // The shared track still records after a speaker leaves
    sink.accept(Frame::tone(2, 330.0, 1));

    let outcomes = sink.stop().await;
    let artifact = outcomes[0]
        .result
        .as_ref()
        .expect("shared track should succeed")
        .as_ref()
        .expect("shared track should have frames");
    assert_eq!(artifact.frames_written, 3);

    Ok(())
}
