use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use std::time::Duration;
use tracing::{debug, info};

use crate::audio::{Frame, SpeakerId};

use super::{RecordingSink, TrackBuffer, TrackId, TrackOutcome};

/// Mixing variant: every speaker funnels into one shared bounded queue
/// feeding a single writer task and one output file.
///
/// Frames are interleaved into the file in arrival order; there is no
/// sample-level summation. Producers contend only the queue push, never
/// the I/O behind it.
pub struct SingleTrackSink {
    lane: TrackBuffer,
    drain_timeout: Duration,
    stopped: AtomicBool,
    speakers: RwLock<HashSet<SpeakerId>>,
}

impl SingleTrackSink {
    pub fn new(output_dir: &Path, queue_capacity: usize, drain_timeout: Duration) -> Self {
        let lane = TrackBuffer::new(
            TrackId::Mixed,
            output_dir.join("meeting_recording.wav"),
            queue_capacity,
        );
        lane.spawn_writer();

        Self {
            lane,
            drain_timeout,
            stopped: AtomicBool::new(false),
            speakers: RwLock::new(HashSet::new()),
        }
    }
}

#[async_trait::async_trait]
impl RecordingSink for SingleTrackSink {
    fn accept(&self, frame: Frame) {
        if self.stopped.load(Ordering::Acquire) {
            return;
        }

        let known = {
            let speakers = self.speakers.read().expect("speaker set lock poisoned");
            speakers.contains(&frame.speaker_id)
        };
        if !known {
            let mut speakers = self.speakers.write().expect("speaker set lock poisoned");
            if speakers.insert(frame.speaker_id) {
                info!("Speaker {} joined the shared track", frame.speaker_id);
            }
        }

        self.lane.push(frame);
    }

    fn release(&self, speaker: SpeakerId) {
        // No per-speaker resource to tear down on the shared track
        let removed = self
            .speakers
            .write()
            .expect("speaker set lock poisoned")
            .remove(&speaker);
        if removed {
            debug!("Speaker {} left the shared track", speaker);
        }
    }

    async fn stop(&self) -> Vec<TrackOutcome> {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return Vec::new();
        }

        info!("Stopping shared track");
        self.lane.signal_stop();
        vec![self.lane.join(self.drain_timeout).await]
    }

    fn speaker_count(&self) -> usize {
        self.speakers.read().expect("speaker set lock poisoned").len()
    }
}
