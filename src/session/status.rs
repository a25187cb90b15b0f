use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Idle,
    Recording,
    Stopping,
    Stopped,
}

/// Point-in-time snapshot of a session, safe to take while frames are
/// being accepted.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    /// Current lifecycle state
    pub state: SessionState,

    /// Speakers currently known to the sink
    pub speaker_count: usize,

    /// Seconds since the session started (frozen once stopped)
    pub elapsed_seconds: f64,

    /// When the session started, if it has
    pub started_at: Option<DateTime<Utc>>,
}
