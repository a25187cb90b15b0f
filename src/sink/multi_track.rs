use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, RwLock};
use std::time::Duration;
use tracing::{debug, info};

use crate::audio::{Frame, SpeakerId};

use super::{RecordingSink, TrackBuffer, TrackId, TrackOutcome};

/// Demultiplexer for multi-track mode: one `TrackBuffer` per speaker,
/// created lazily on the first frame from a new voice.
///
/// The speaker map is guarded by a read/write lock, but the hot path only
/// takes the shared read side to clone the lane handle and pushes outside
/// the lock; the exclusive side is taken once per speaker, on creation,
/// and once on teardown. Per-frame contention is scoped to one speaker's
/// queue.
pub struct MultiTrackSink {
    output_dir: PathBuf,
    queue_capacity: usize,
    drain_timeout: Duration,
    stopped: AtomicBool,
    lanes: RwLock<HashMap<SpeakerId, Arc<TrackBuffer>>>,
    /// Lanes closed early by `release`; their writers drain on their own,
    /// and `stop` reaps them so their artifacts still make the final list.
    retired: StdMutex<Vec<Arc<TrackBuffer>>>,
    /// Lanes created per speaker so far. A rejoin after `release` opens a
    /// numbered segment file instead of truncating the first one.
    lane_counts: StdMutex<HashMap<SpeakerId, u32>>,
}

impl MultiTrackSink {
    pub fn new(output_dir: PathBuf, queue_capacity: usize, drain_timeout: Duration) -> Self {
        Self {
            output_dir,
            queue_capacity,
            drain_timeout,
            stopped: AtomicBool::new(false),
            lanes: RwLock::new(HashMap::new()),
            retired: StdMutex::new(Vec::new()),
            lane_counts: StdMutex::new(HashMap::new()),
        }
    }

    fn lane_for(&self, speaker: SpeakerId) -> Option<Arc<TrackBuffer>> {
        let mut lanes = self.lanes.write().expect("speaker map lock poisoned");

        // stop() flips the flag before draining the map; re-checking under
        // the exclusive lock keeps a racing delivery from inserting a lane
        // nobody will ever join.
        if self.stopped.load(Ordering::Acquire) {
            return None;
        }

        // Double-checked: another delivery may have won the race
        if let Some(lane) = lanes.get(&speaker) {
            return Some(Arc::clone(lane));
        }

        let segment = {
            let mut counts = self.lane_counts.lock().expect("lane count lock poisoned");
            let count = counts.entry(speaker).or_insert(0);
            *count += 1;
            *count
        };
        let file_name = if segment == 1 {
            format!("user_{}.wav", speaker)
        } else {
            format!("user_{}_{}.wav", speaker, segment)
        };

        let lane = Arc::new(TrackBuffer::new(
            TrackId::Speaker(speaker),
            self.output_dir.join(file_name),
            self.queue_capacity,
        ));
        lane.spawn_writer();

        info!("Started recording track for speaker {}", speaker);
        lanes.insert(speaker, Arc::clone(&lane));
        Some(lane)
    }
}

#[async_trait::async_trait]
impl RecordingSink for MultiTrackSink {
    fn accept(&self, frame: Frame) {
        if self.stopped.load(Ordering::Acquire) {
            return;
        }

        let lane = {
            let lanes = self.lanes.read().expect("speaker map lock poisoned");
            lanes.get(&frame.speaker_id).map(Arc::clone)
        };

        let lane = match lane {
            Some(lane) => lane,
            None => match self.lane_for(frame.speaker_id) {
                Some(lane) => lane,
                None => return,
            },
        };

        lane.push(frame);
    }

    fn release(&self, speaker: SpeakerId) {
        let lane = self
            .lanes
            .write()
            .expect("speaker map lock poisoned")
            .remove(&speaker);

        let Some(lane) = lane else {
            debug!("Release for unknown speaker {}", speaker);
            return;
        };

        info!("Speaker {} left, draining their track", speaker);

        // The writer drains and closes the file on its own; the lane is
        // parked so stop() can reap its outcome into the final list.
        lane.signal_stop();
        self.retired
            .lock()
            .expect("retired lane lock poisoned")
            .push(lane);
    }

    async fn stop(&self) -> Vec<TrackOutcome> {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return Vec::new();
        }

        let mut lanes: Vec<Arc<TrackBuffer>> = {
            let mut map = self.lanes.write().expect("speaker map lock poisoned");
            map.drain().map(|(_, lane)| lane).collect()
        };

        // Signal everyone first so all writers drain concurrently, then
        // join against one shared deadline. Retired lanes were signalled
        // at release time and are normally already finished.
        for lane in &lanes {
            lane.signal_stop();
        }
        lanes.extend(
            self.retired
                .lock()
                .expect("retired lane lock poisoned")
                .drain(..),
        );

        info!("Stopping {} speaker track(s)", lanes.len());

        let deadline = tokio::time::Instant::now() + self.drain_timeout;
        let mut outcomes = Vec::with_capacity(lanes.len());

        for lane in lanes {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            outcomes.push(lane.join(remaining).await);
        }

        outcomes
    }

    fn speaker_count(&self) -> usize {
        self.lanes.read().expect("speaker map lock poisoned").len()
    }
}
