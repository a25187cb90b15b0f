use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tracing::{debug, error, info};

use crate::audio::{Frame, SpeakerId, WaveformArtifact};
use crate::error::RecorderError;
use crate::sink::{MultiTrackSink, RecordingSink, SingleTrackSink};

use super::config::{SessionConfig, TrackMode};
use super::status::{SessionState, SessionStatus};

/// Session controller: one instance per meeting recording.
///
/// State machine: Idle → Recording → Stopping → Stopped. Owns the sink
/// for its lifetime and assembles the artifact list on stop. `accept` and
/// `status` are cheap and safe to call concurrently with each other; the
/// start/stop transitions are serialized.
pub struct MeetingRecorder {
    config: SessionConfig,
    state: RwLock<SessionState>,
    started_at: RwLock<Option<DateTime<Utc>>>,
    stopped_at: RwLock<Option<DateTime<Utc>>>,
    session_dir: RwLock<Option<PathBuf>>,
    sink: RwLock<Option<Arc<dyn RecordingSink>>>,
    /// Cached by the first successful stop; repeat stops return this
    /// without further I/O
    stop_result: tokio::sync::Mutex<Option<Vec<WaveformArtifact>>>,
}

impl std::fmt::Debug for MeetingRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeetingRecorder")
            .field("session_id", &self.config.session_id)
            .field("state", &*self.state.read().expect("state lock poisoned"))
            .finish_non_exhaustive()
    }
}

impl MeetingRecorder {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: RwLock::new(SessionState::Idle),
            started_at: RwLock::new(None),
            stopped_at: RwLock::new(None),
            session_dir: RwLock::new(None),
            sink: RwLock::new(None),
            stop_result: tokio::sync::Mutex::new(None),
        }
    }

    /// Transition Idle → Recording: create the session output directory
    /// and construct the sink for the configured mode. A recorder is
    /// single-shot; any state other than Idle is rejected.
    pub fn start(&self) -> Result<(), RecorderError> {
        let mut state = self.state.write().expect("state lock poisoned");

        if *state != SessionState::Idle {
            return Err(RecorderError::AlreadyRecording {
                session_id: self.config.session_id.clone(),
            });
        }

        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let session_dir = self
            .config
            .output_dir
            .join(format!("recording_{}_{}", self.config.session_id, timestamp));
        std::fs::create_dir_all(&session_dir)?;

        let sink: Arc<dyn RecordingSink> = match self.config.mode {
            TrackMode::MultiTrack => Arc::new(MultiTrackSink::new(
                session_dir.clone(),
                self.config.queue_capacity,
                self.config.drain_timeout,
            )),
            TrackMode::SingleTrack => Arc::new(SingleTrackSink::new(
                &session_dir,
                self.config.queue_capacity,
                self.config.drain_timeout,
            )),
        };

        info!(
            "Recording session {} started ({:?} mode): {}",
            self.config.session_id,
            self.config.mode,
            session_dir.display()
        );

        *self.session_dir.write().expect("session dir lock poisoned") = Some(session_dir);
        *self.started_at.write().expect("started_at lock poisoned") = Some(Utc::now());
        *self.sink.write().expect("sink lock poisoned") = Some(sink);
        *state = SessionState::Recording;

        Ok(())
    }

    /// Route one frame from the transport. No-op unless recording.
    pub fn accept(&self, frame: Frame) {
        let sink = {
            let sink = self.sink.read().expect("sink lock poisoned");
            sink.as_ref().map(Arc::clone)
        };

        if let Some(sink) = sink {
            sink.accept(frame);
        }
    }

    /// Close one speaker's track early (speaker left the meeting).
    pub fn release(&self, speaker: SpeakerId) {
        let sink = {
            let sink = self.sink.read().expect("sink lock poisoned");
            sink.as_ref().map(Arc::clone)
        };

        if let Some(sink) = sink {
            sink.release(speaker);
        }
    }

    /// Transition Recording → Stopping → Stopped: drain all writers within
    /// the drain timeout and collect one artifact per track that produced
    /// at least one frame. Idempotent; a repeat call returns the artifacts
    /// collected the first time.
    pub async fn stop(&self) -> Result<Vec<WaveformArtifact>, RecorderError> {
        // Serializes concurrent stops and backs the idempotence guarantee
        let mut cached = self.stop_result.lock().await;
        if let Some(artifacts) = cached.as_ref() {
            debug!(
                "Session {} already stopped, returning {} cached artifact(s)",
                self.config.session_id,
                artifacts.len()
            );
            return Ok(artifacts.clone());
        }

        {
            let mut state = self.state.write().expect("state lock poisoned");
            if *state != SessionState::Recording {
                return Err(RecorderError::NotRecording {
                    session_id: self.config.session_id.clone(),
                });
            }
            *state = SessionState::Stopping;
        }

        info!("Stopping recording session {}", self.config.session_id);

        let sink = self.sink.write().expect("sink lock poisoned").take();
        let outcomes = match sink {
            Some(sink) => sink.stop().await,
            None => Vec::new(),
        };

        let mut artifacts = Vec::new();
        for outcome in outcomes {
            match outcome.result {
                Ok(Some(artifact)) => {
                    info!(
                        "{}: {:.2}s written to {} ({} dropped)",
                        outcome.track,
                        artifact.duration_seconds,
                        artifact.file_path.display(),
                        artifact.frames_dropped
                    );
                    artifacts.push(artifact);
                }
                Ok(None) => debug!("{} produced no frames", outcome.track),
                // Confined to the affected track; the session still stops
                Err(e) => error!("{} failed: {}", outcome.track, e),
            }
        }

        *self.stopped_at.write().expect("stopped_at lock poisoned") = Some(Utc::now());
        *self.state.write().expect("state lock poisoned") = SessionState::Stopped;
        *cached = Some(artifacts.clone());

        info!(
            "Session {} stopped: {} artifact(s)",
            self.config.session_id,
            artifacts.len()
        );

        Ok(artifacts)
    }

    /// Cheap snapshot; never blocks on writer work.
    pub fn status(&self) -> SessionStatus {
        let state = *self.state.read().expect("state lock poisoned");
        let started_at = *self.started_at.read().expect("started_at lock poisoned");
        let stopped_at = *self.stopped_at.read().expect("stopped_at lock poisoned");

        let speaker_count = {
            let sink = self.sink.read().expect("sink lock poisoned");
            sink.as_ref().map(|s| s.speaker_count()).unwrap_or(0)
        };

        let elapsed_seconds = match started_at {
            Some(start) => {
                let end = stopped_at.unwrap_or_else(Utc::now);
                end.signed_duration_since(start).num_milliseconds() as f64 / 1000.0
            }
            None => 0.0,
        };

        SessionStatus {
            state,
            speaker_count,
            elapsed_seconds,
            started_at,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.config.session_id
    }

    /// Output directory for this session, once started.
    pub fn session_dir(&self) -> Option<PathBuf> {
        self.session_dir
            .read()
            .expect("session dir lock poisoned")
            .clone()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}
