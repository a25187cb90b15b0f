use thiserror::Error;

use crate::sink::TrackId;

/// Boxed underlying cause of a track write failure (hound, io, task join).
pub type TrackFailure = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by the recording engine.
///
/// None of these are allowed to take the host process down: write failures
/// and drain timeouts stay confined to the affected track, and the control
/// errors are reported back to the caller.
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("recording already active for session {session_id}")]
    AlreadyRecording { session_id: String },

    #[error("no active recording for session {session_id}")]
    NotRecording { session_id: String },

    #[error("write failure on {track}: {source}")]
    WriteFailure {
        track: TrackId,
        #[source]
        source: TrackFailure,
    },

    #[error("{track} writer did not drain within {timeout_ms} ms")]
    DrainTimeout { track: TrackId, timeout_ms: u64 },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl RecorderError {
    pub fn write_failure(track: TrackId, source: impl Into<TrackFailure>) -> Self {
        Self::WriteFailure {
            track,
            source: source.into(),
        }
    }
}
