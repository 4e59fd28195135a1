//! Bounded supply buffer and refill controller.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::prober::{CodeStore, UniquenessProber};
use super::random::RandomCodeGenerator;

/// Sizing and timing of the supply pipeline.
///
/// `Default` carries the production reference sizing; tests shrink it.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Length of generated codes in characters.
    pub code_length: usize,
    /// Maximum number of verified codes held in the buffer.
    pub capacity: usize,
    /// Occupancy below which the periodic monitor triggers a refill.
    pub low_water: usize,
    /// How often the monitor samples buffer occupancy.
    pub monitor_interval: Duration,
    /// Pause after a randomness failure before the next candidate attempt.
    pub retry_backoff: Duration,
    /// Generate-and-probe cycles per candidate slot before giving up on it.
    pub max_probe_attempts: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            code_length: 7,
            capacity: 1000,
            low_water: 100,
            monitor_interval: Duration::from_secs(5),
            retry_backoff: Duration::from_millis(100),
            max_probe_attempts: 10,
        }
    }
}

/// Errors surfaced to consumers of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// The pipeline was stopped and its buffer has drained.
    #[error("code supply pipeline is stopped")]
    Stopped,
}

/// Hands out verified-unique short codes from a bounded buffer that is
/// topped up in the background.
///
/// A code returned by [`take`](Self::take) was unique against the durable
/// store at the moment it was verified. It is not re-verified at consumption
/// time; the narrow window between verification and the caller's insert is
/// handled at the insert site by retrying with a fresh code on a
/// unique-constraint rejection.
///
/// Cloning is cheap and shares the same buffer.
#[derive(Clone)]
pub struct CodePipeline {
    inner: Arc<PipelineInner>,
}

struct PipelineInner {
    generator: RandomCodeGenerator,
    prober: UniquenessProber,
    config: PipelineConfig,
    slots_tx: mpsc::Sender<String>,
    slots_rx: Mutex<mpsc::Receiver<String>>,
    /// Single-flight latch: at most one refill pass runs at a time.
    refilling: AtomicBool,
    started: AtomicBool,
    stop_tx: watch::Sender<bool>,
}

impl CodePipeline {
    /// Creates a pipeline over the given store.
    ///
    /// The buffer starts empty; nothing happens until [`start`](Self::start).
    pub fn new(store: Arc<dyn CodeStore>, config: PipelineConfig) -> Self {
        let (slots_tx, slots_rx) = mpsc::channel(config.capacity);
        let (stop_tx, _) = watch::channel(false);

        Self {
            inner: Arc::new(PipelineInner {
                generator: RandomCodeGenerator::new(config.code_length),
                prober: UniquenessProber::new(store),
                config,
                slots_tx,
                slots_rx: Mutex::new(slots_rx),
                refilling: AtomicBool::new(false),
                started: AtomicBool::new(false),
                stop_tx,
            }),
        }
    }

    /// Launches the background activities: an immediate refill pass and a
    /// periodic monitor that refills whenever occupancy falls below the
    /// low-water mark.
    ///
    /// Calling `start` a second time is a no-op.
    pub fn start(&self) {
        if self.inner.started.swap(true, Ordering::AcqRel) {
            warn!("code supply pipeline already started");
            return;
        }

        info!(
            capacity = self.inner.config.capacity,
            low_water = self.inner.config.low_water,
            code_length = self.inner.config.code_length,
            "starting code supply pipeline"
        );

        let refill_inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            PipelineInner::refill(&refill_inner).await;
        });

        let monitor_inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            PipelineInner::monitor(monitor_inner).await;
        });
    }

    /// Signals termination.
    ///
    /// An in-progress refill pass exits before its next candidate attempt and
    /// the monitor wakes from its wait immediately. Terminal: the pipeline
    /// cannot be restarted. Codes already buffered are still served by
    /// [`take`](Self::take) until the buffer drains.
    pub fn stop(&self) {
        info!("stopping code supply pipeline");
        let _ = self.inner.stop_tx.send(true);
    }

    /// Pops one verified-unique code, waiting if the buffer is empty.
    ///
    /// There is no upper bound on the wait: a correct code is worth more
    /// than a fast answer.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Stopped`] once the pipeline has been stopped
    /// and every buffered code has been consumed.
    pub async fn take(&self) -> Result<String, PipelineError> {
        let mut slots = self.inner.slots_rx.lock().await;
        let mut stop_rx = self.inner.stop_tx.subscribe();

        loop {
            // Serve buffered codes first so a stopped pipeline drains
            // instead of abandoning verified work.
            match slots.try_recv() {
                Ok(code) => return Ok(code),
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => return Err(PipelineError::Stopped),
            }

            if self.inner.is_stopped() {
                return Err(PipelineError::Stopped);
            }

            tokio::select! {
                received = slots.recv() => match received {
                    Some(code) => return Ok(code),
                    None => return Err(PipelineError::Stopped),
                },
                _ = stop_rx.changed() => {}
            }
        }
    }

    /// Triggers a refill pass immediately.
    ///
    /// Safe to call from multiple tasks: concurrent triggers collapse into
    /// the single in-flight pass.
    pub async fn refill_now(&self) {
        PipelineInner::refill(&self.inner).await;
    }

    /// Number of verified codes currently buffered.
    pub fn occupancy(&self) -> usize {
        self.inner.occupancy()
    }

    /// Configured buffer capacity.
    pub fn capacity(&self) -> usize {
        self.inner.config.capacity
    }

    /// Whether the stop signal has been sent.
    pub fn is_stopped(&self) -> bool {
        self.inner.is_stopped()
    }
}

impl PipelineInner {
    fn occupancy(&self) -> usize {
        self.slots_tx.max_capacity() - self.slots_tx.capacity()
    }

    fn is_stopped(&self) -> bool {
        *self.stop_tx.borrow()
    }

    /// Periodic occupancy watcher. Exits on the stop signal.
    async fn monitor(inner: Arc<Self>) {
        let mut ticker = tokio::time::interval(inner.config.monitor_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut stop_rx = inner.stop_tx.subscribe();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if inner.is_stopped() {
                        break;
                    }
                    if inner.occupancy() < inner.config.low_water {
                        Self::refill(&inner).await;
                    }
                }
                _ = stop_rx.changed() => break,
            }
        }

        info!("code supply monitor stopped");
    }

    /// One refill pass: fill the buffer to capacity or until stopped.
    ///
    /// The pass holds the single-flight latch for its whole duration; a
    /// trigger that finds the latch held returns immediately instead of
    /// queueing duplicate work. The latch is released by the guard's `Drop`,
    /// so an abnormal exit cannot starve future passes.
    async fn refill(inner: &Arc<Self>) {
        let Some(_guard) = RefillGuard::try_acquire(&inner.refilling) else {
            debug!("refill already in progress, skipping trigger");
            return;
        };

        info!(
            occupancy = inner.occupancy(),
            capacity = inner.config.capacity,
            "refilling code supply"
        );

        while inner.occupancy() < inner.config.capacity {
            if inner.is_stopped() {
                info!("refill interrupted by stop signal");
                return;
            }

            match inner.next_unique_code().await {
                Ok(Some(code)) => {
                    if inner.slots_tx.try_send(code).is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    warn!(
                        attempts = inner.config.max_probe_attempts,
                        "every candidate collided, yielding this slot"
                    );
                }
                Err(err) => {
                    warn!(error = %err, "candidate generation failed, backing off");
                    tokio::time::sleep(inner.config.retry_backoff).await;
                }
            }
        }

        debug!(occupancy = inner.occupancy(), "code supply buffer full");
    }

    /// One bounded generate-and-probe cycle.
    ///
    /// `Ok(None)` means every candidate within the attempt bound collided
    /// (or the store could not be queried, which counts as a collision);
    /// the slot yields nothing and the refill loop moves on.
    async fn next_unique_code(&self) -> Result<Option<String>, super::random::CodeGenError> {
        for _ in 0..self.config.max_probe_attempts {
            let candidate = self.generator.generate()?;

            if !self.prober.is_taken(&candidate).await {
                return Ok(Some(candidate));
            }
        }

        Ok(None)
    }
}

/// Scope guard for the single-flight refill latch.
struct RefillGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RefillGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            .then_some(Self { flag })
    }
}

impl Drop for RefillGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
