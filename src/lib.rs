pub mod audio;
pub mod config;
pub mod error;
pub mod session;
pub mod sink;

pub use audio::{AudioFile, Frame, SpeakerId, WaveformArtifact, WaveformWriter};
pub use config::Config;
pub use error::RecorderError;
pub use session::{
    MeetingRecorder, SessionConfig, SessionRegistry, SessionState, SessionStatus, TrackMode,
};
pub use sink::{MultiTrackSink, RecordingSink, SingleTrackSink, TrackBuffer, TrackId, TrackOutcome};
