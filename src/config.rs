use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::session::{SessionConfig, TrackMode};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub recording: RecordingConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

/// Recording defaults applied to every session this process starts.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordingConfig {
    pub recordings_path: String,

    #[serde(default)]
    pub mode: TrackMode,

    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    #[serde(default = "default_drain_timeout_secs")]
    pub drain_timeout_secs: u64,
}

fn default_queue_capacity() -> usize {
    256
}

fn default_drain_timeout_secs() -> u64 {
    5
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            recordings_path: "recordings".to_string(),
            mode: TrackMode::default(),
            queue_capacity: default_queue_capacity(),
            drain_timeout_secs: default_drain_timeout_secs(),
        }
    }
}

impl RecordingConfig {
    pub fn session_config(&self, session_id: String) -> SessionConfig {
        SessionConfig {
            session_id,
            output_dir: PathBuf::from(&self.recordings_path),
            mode: self.mode,
            queue_capacity: self.queue_capacity,
            drain_timeout: Duration::from_secs(self.drain_timeout_secs),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
