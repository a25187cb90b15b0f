use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Which output layout a session records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TrackMode {
    /// One `user_<speaker>.wav` per speaker
    #[default]
    MultiTrack,
    /// One shared `meeting_recording.wav`
    SingleTrack,
}

/// Configuration for a recording session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier (e.g., "meeting-2026-08-30-standup")
    pub session_id: String,

    /// Root directory session output directories are created under
    pub output_dir: PathBuf,

    /// Multi-track (one file per speaker) or single-track (one shared file)
    pub mode: TrackMode,

    /// Bounded capacity of each track's frame queue; at ~20 ms per frame
    /// the default 256 holds about five seconds of backlog
    pub queue_capacity: usize,

    /// How long `stop()` waits for writers to drain before force-closing
    pub drain_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("meeting-{}", uuid::Uuid::new_v4()),
            output_dir: PathBuf::from("recordings"),
            mode: TrackMode::MultiTrack,
            queue_capacity: 256,
            drain_timeout: Duration::from_secs(5),
        }
    }
}
