use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::audio::WaveformArtifact;
use crate::error::RecorderError;

use super::config::SessionConfig;
use super::recorder::MeetingRecorder;
use super::status::SessionStatus;

/// Process-wide registry of active recording sessions, keyed by session id.
///
/// Entries live from `start` to `stop`; the recorder handle returned by
/// `start` stays valid after removal, so a caller holding it can still
/// read the cached artifacts.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Arc<MeetingRecorder>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Create and start a session. Fails with `AlreadyRecording` if a
    /// session with this id is already active.
    pub fn start(&self, config: SessionConfig) -> Result<Arc<MeetingRecorder>, RecorderError> {
        let mut sessions = self.sessions.lock().expect("session map lock poisoned");

        if sessions.contains_key(&config.session_id) {
            return Err(RecorderError::AlreadyRecording {
                session_id: config.session_id,
            });
        }

        let session_id = config.session_id.clone();
        let recorder = Arc::new(MeetingRecorder::new(config));
        recorder.start()?;

        sessions.insert(session_id.clone(), Arc::clone(&recorder));
        info!("Registered session {} ({} active)", session_id, sessions.len());

        Ok(recorder)
    }

    /// Stop a session and remove it from the registry.
    pub async fn stop(&self, session_id: &str) -> Result<Vec<WaveformArtifact>, RecorderError> {
        let recorder = {
            let sessions = self.sessions.lock().expect("session map lock poisoned");
            sessions.get(session_id).map(Arc::clone)
        };

        let recorder = recorder.ok_or_else(|| RecorderError::NotRecording {
            session_id: session_id.to_string(),
        })?;

        let artifacts = recorder.stop().await?;

        self.sessions
            .lock()
            .expect("session map lock poisoned")
            .remove(session_id);
        info!("Unregistered session {}", session_id);

        Ok(artifacts)
    }

    /// Snapshot of one active session's status.
    pub fn status(&self, session_id: &str) -> Result<SessionStatus, RecorderError> {
        let sessions = self.sessions.lock().expect("session map lock poisoned");

        sessions
            .get(session_id)
            .map(|recorder| recorder.status())
            .ok_or_else(|| RecorderError::NotRecording {
                session_id: session_id.to_string(),
            })
    }

    /// Handle to an active session, if registered.
    pub fn get(&self, session_id: &str) -> Option<Arc<MeetingRecorder>> {
        self.sessions
            .lock()
            .expect("session map lock poisoned")
            .get(session_id)
            .map(Arc::clone)
    }

    pub fn active_count(&self) -> usize {
        self.sessions.lock().expect("session map lock poisoned").len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
