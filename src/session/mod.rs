//! Recording session management
//!
//! This module provides the session-level control surface:
//! - `MeetingRecorder` — per-session state machine around one sink
//! - `SessionRegistry` — process-wide lookup of active sessions
//! - `SessionConfig` / `SessionStatus` — configuration and snapshots

mod config;
mod recorder;
mod registry;
mod status;

pub use config::{SessionConfig, TrackMode};
pub use recorder::MeetingRecorder;
pub use registry::SessionRegistry;
pub use status::{SessionState, SessionStatus};
