use anyhow::Result;
use clap::Parser;
use meeting_capture::audio::FRAME_DURATION_MS;
use meeting_capture::config::RecordingConfig;
use meeting_capture::{AudioFile, Config, Frame, SessionRegistry, TrackMode};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Demo driver: records two synthetic overlapping speakers and verifies
/// the resulting files.
#[derive(Parser)]
#[command(name = "meeting-capture")]
struct Args {
    /// Config file name without extension (e.g. config/meeting-capture)
    #[arg(long)]
    config: Option<String>,

    /// Session identifier; generated when omitted
    #[arg(long)]
    session_id: Option<String>,

    /// Recording mode
    #[arg(long, value_enum)]
    mode: Option<TrackMode>,

    /// Seconds of synthetic audio to record
    #[arg(long, default_value_t = 2)]
    seconds: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let recording = match &args.config {
        Some(path) => Config::load(path)?.recording,
        None => RecordingConfig::default(),
    };

    let session_id = args
        .session_id
        .unwrap_or_else(|| format!("meeting-{}", uuid::Uuid::new_v4()));

    let mut session = recording.session_config(session_id.clone());
    if let Some(mode) = args.mode {
        session.mode = mode;
    }

    info!(
        "Starting session {} ({:?}, {} s of synthetic audio)",
        session_id, session.mode, args.seconds
    );

    let registry = SessionRegistry::new();
    let recorder = registry.start(session)?;

    // Two speakers talking over each other, 50 frames per second each
    let frames = args.seconds * 1000 / FRAME_DURATION_MS;
    let mut producers = Vec::new();

    for (speaker, frequency) in [(1u64, 220.0f32), (2, 330.0)] {
        let recorder = Arc::clone(&recorder);
        producers.push(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(FRAME_DURATION_MS));
            for i in 0..frames {
                ticker.tick().await;
                recorder.accept(Frame::tone(speaker, frequency, i as u32));
            }
        }));
    }

    for producer in producers {
        producer.await?;
    }

    let status = recorder.status();
    info!(
        "Session status: {:?}, {} speaker(s), {:.1}s elapsed",
        status.state, status.speaker_count, status.elapsed_seconds
    );

    let artifacts = registry.stop(&session_id).await?;

    for artifact in &artifacts {
        let audio = AudioFile::open(&artifact.file_path)?;
        anyhow::ensure!(
            audio.is_capture_format(),
            "artifact {:?} does not carry the capture format",
            artifact.file_path
        );
        info!(
            "Artifact {}: {:.2}s, {} Hz, {} channel(s), {} frame(s) dropped",
            artifact.file_path.display(),
            audio.duration_seconds,
            audio.sample_rate,
            audio.channels,
            artifact.frames_dropped
        );
    }

    info!("Done: {} artifact(s)", artifacts.len());

    Ok(())
}
