//! Sink implementations for routing live frames to disk
//!
//! A sink accepts frames on the transport's delivery context and owns the
//! writer tasks that perform all file I/O:
//! - `MultiTrackSink` — one file and one writer task per speaker
//! - `SingleTrackSink` — one shared file fed by a single writer task

mod buffer;
mod multi_track;
mod single_track;

pub use buffer::TrackBuffer;
pub use multi_track::MultiTrackSink;
pub use single_track::SingleTrackSink;

use std::fmt;

use crate::audio::{Frame, SpeakerId, WaveformArtifact};
use crate::error::RecorderError;

/// Identifies one output track within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackId {
    /// One speaker's own track (multi-track mode)
    Speaker(SpeakerId),
    /// The shared track combining all speakers (single-track mode)
    Mixed,
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackId::Speaker(id) => write!(f, "speaker {}", id),
            TrackId::Mixed => write!(f, "mixed track"),
        }
    }
}

/// Final result of one writer task after drain.
///
/// `Ok(None)` means the track never received a frame and produced no file.
#[derive(Debug)]
pub struct TrackOutcome {
    pub track: TrackId,
    pub result: Result<Option<WaveformArtifact>, RecorderError>,
}

/// Capability interface consumed by the voice transport.
///
/// `accept` runs on the transport's delivery context and must return fast:
/// it never performs I/O and never waits on I/O. `stop` drains every writer
/// within the sink's drain budget and finalizes all files.
#[async_trait::async_trait]
pub trait RecordingSink: Send + Sync {
    /// Route one frame to its track queue. Fire-and-forget: a full queue
    /// drops the frame, a stopped sink ignores it.
    fn accept(&self, frame: Frame);

    /// Close one speaker's track early (speaker left the meeting) while the
    /// session keeps recording. No-op in single-track mode.
    fn release(&self, speaker: SpeakerId);

    /// Signal all writers to drain and exit, then collect one outcome per
    /// track. Bounded by the drain timeout; a stuck writer is force-closed.
    async fn stop(&self) -> Vec<TrackOutcome>;

    /// Number of speakers currently known to the sink.
    fn speaker_count(&self) -> usize;
}
