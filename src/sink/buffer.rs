use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::audio::{Frame, WaveformArtifact, WaveformWriter};
use crate::error::RecorderError;

use super::{TrackId, TrackOutcome};

/// How long the writer blocks on an empty queue before re-checking the
/// stop flag.
const DEQUEUE_TICK: Duration = Duration::from_millis(50);

/// Overflow drops are logged on the first drop and then once per this many.
const DROP_LOG_INTERVAL: u64 = 50;

/// Bounded frame queue plus the writer task that drains it into one file.
///
/// Single-producer/single-consumer by construction: the demultiplexer is
/// the only pusher and the writer task the only consumer. On a full queue
/// the incoming frame is dropped (drop-newest) and counted; the push path
/// never blocks and never grows the queue unbounded.
pub struct TrackBuffer {
    track: TrackId,
    file_path: PathBuf,
    tx: mpsc::Sender<Frame>,
    /// Receiver parked here until the writer task is spawned
    rx_slot: StdMutex<Option<mpsc::Receiver<Frame>>>,
    stopping: Arc<AtomicBool>,
    frames_enqueued: AtomicU64,
    frames_dropped: Arc<AtomicU64>,
    writer_handle: StdMutex<Option<JoinHandle<Result<Option<WaveformArtifact>, RecorderError>>>>,
}

impl TrackBuffer {
    /// Create the queue without starting the writer. Call `spawn_writer`
    /// to begin draining; until then frames accumulate (and overflow) as
    /// they would behind a stalled writer.
    pub fn new(track: TrackId, file_path: PathBuf, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);

        Self {
            track,
            file_path,
            tx,
            rx_slot: StdMutex::new(Some(rx)),
            stopping: Arc::new(AtomicBool::new(false)),
            frames_enqueued: AtomicU64::new(0),
            frames_dropped: Arc::new(AtomicU64::new(0)),
            writer_handle: StdMutex::new(None),
        }
    }

    /// Start the dedicated writer task. Must be called from within the
    /// runtime. Idempotent: a second call is ignored.
    pub fn spawn_writer(&self) {
        let rx = self
            .rx_slot
            .lock()
            .expect("receiver slot lock poisoned")
            .take();

        let Some(rx) = rx else {
            warn!("Writer for {} already spawned", self.track);
            return;
        };

        let handle = tokio::spawn(write_loop(
            self.track,
            self.file_path.clone(),
            rx,
            Arc::clone(&self.stopping),
            Arc::clone(&self.frames_dropped),
        ));

        *self
            .writer_handle
            .lock()
            .expect("writer handle lock poisoned") = Some(handle);
    }

    /// Non-blocking enqueue. Empty frames are ignored; a full queue drops
    /// the newest frame and increments the drop counter.
    pub fn push(&self, frame: Frame) {
        if frame.pcm.is_empty() {
            return;
        }

        match self.tx.try_send(frame) {
            Ok(()) => {
                self.frames_enqueued.fetch_add(1, Ordering::Relaxed);
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                let dropped = self.frames_dropped.fetch_add(1, Ordering::Relaxed) + 1;
                // ~one line per second of sustained overflow at 20 ms frames
                if dropped == 1 || dropped % DROP_LOG_INTERVAL == 0 {
                    warn!("{} queue full, {} frame(s) dropped so far", self.track, dropped);
                }
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.frames_dropped.fetch_add(1, Ordering::Relaxed);
                debug!("{} writer gone, frame discarded", self.track);
            }
        }
    }

    /// Tell the writer to drain whatever is queued and exit.
    pub fn signal_stop(&self) {
        self.stopping.store(true, Ordering::Release);
    }

    /// Wait for the writer to finish, bounded by `budget`. A writer that
    /// misses the deadline is aborted; its partial file stays on disk with
    /// a finalized header.
    pub async fn join(&self, budget: Duration) -> TrackOutcome {
        let handle = self
            .writer_handle
            .lock()
            .expect("writer handle lock poisoned")
            .take();

        let Some(mut handle) = handle else {
            return TrackOutcome {
                track: self.track,
                result: Ok(None),
            };
        };

        match tokio::time::timeout(budget, &mut handle).await {
            Ok(Ok(result)) => TrackOutcome {
                track: self.track,
                result,
            },
            Ok(Err(join_err)) => {
                error!("Writer task for {} panicked: {}", self.track, join_err);
                TrackOutcome {
                    track: self.track,
                    result: Err(RecorderError::write_failure(self.track, join_err)),
                }
            }
            Err(_) => {
                warn!(
                    "{} writer did not drain within {} ms, force-closing",
                    self.track,
                    budget.as_millis()
                );
                handle.abort();
                TrackOutcome {
                    track: self.track,
                    result: Err(RecorderError::DrainTimeout {
                        track: self.track,
                        timeout_ms: budget.as_millis() as u64,
                    }),
                }
            }
        }
    }

    pub fn track(&self) -> TrackId {
        self.track
    }

    pub fn frames_enqueued(&self) -> u64 {
        self.frames_enqueued.load(Ordering::Relaxed)
    }

    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped.load(Ordering::Relaxed)
    }
}

/// Writer loop: dequeue with timeout, append to the WAV file, exit once
/// the stop flag is set and the queue has gone quiet (or all senders are
/// gone). The file is created lazily on the first frame so tracks that
/// never receive audio leave nothing behind.
async fn write_loop(
    track: TrackId,
    file_path: PathBuf,
    mut rx: mpsc::Receiver<Frame>,
    stopping: Arc<AtomicBool>,
    frames_dropped: Arc<AtomicU64>,
) -> Result<Option<WaveformArtifact>, RecorderError> {
    let mut writer: Option<WaveformWriter> = None;
    let mut write_error: Option<RecorderError> = None;

    loop {
        match tokio::time::timeout(DEQUEUE_TICK, rx.recv()).await {
            Ok(Some(frame)) => {
                // After a write failure this track only drains and discards;
                // other tracks are unaffected.
                if write_error.is_some() {
                    continue;
                }

                if writer.is_none() {
                    match WaveformWriter::create(&file_path) {
                        Ok(w) => writer = Some(w),
                        Err(e) => {
                            error!("Failed to open output for {}: {:#}", track, e);
                            write_error = Some(RecorderError::write_failure(track, e));
                            continue;
                        }
                    }
                }

                if let Some(w) = writer.as_mut() {
                    if let Err(e) = w.append(&frame.pcm) {
                        error!("Write failure on {}: {:#}", track, e);
                        write_error = Some(RecorderError::write_failure(track, e));
                    }
                }
            }
            // All senders dropped: nothing more can arrive
            Ok(None) => break,
            // Queue idle: exit once stop has been signalled
            Err(_) => {
                if stopping.load(Ordering::Acquire) {
                    break;
                }
            }
        }
    }

    let artifact = match writer {
        Some(mut w) => match w.close() {
            Ok(mut artifact) => {
                artifact.frames_dropped = frames_dropped.load(Ordering::Relaxed);
                debug!(
                    "{} finalized: {:.2}s, {} frames written, {} dropped",
                    track, artifact.duration_seconds, artifact.frames_written, artifact.frames_dropped
                );
                Some(artifact)
            }
            Err(e) => {
                if write_error.is_none() {
                    write_error = Some(RecorderError::write_failure(track, e));
                }
                None
            }
        },
        None => None,
    };

    match write_error {
        Some(e) => Err(e),
        None => Ok(artifact),
    }
}
