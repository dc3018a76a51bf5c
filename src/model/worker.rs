//! Background directory sizing.
//!
//! Sizes are computed on a rayon pool by the data source's
//! [`DirectorySizer`] and delivered through a channel so the view never
//! blocks on a deep walk. At most one computation per path is in
//! flight; [`SizeWorker::cancel_all`] starts a new generation, which stops
//! running walks early and discards anything they would have reported.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::error::Result;

use super::source::DirectorySizer;
use super::walker::SizeReport;

/// A finished background computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeResult {
    pub path: PathBuf,
    pub report: SizeReport,
    generation: u64,
}

pub struct SizeWorker {
    pool: rayon::ThreadPool,
    generation: Arc<AtomicU64>,
    in_flight: Arc<Mutex<HashMap<PathBuf, u64>>>,
    tx: Sender<SizeResult>,
    rx: Receiver<SizeResult>,
}

impl SizeWorker {
    /// Build a worker with `threads` threads (0 = one per CPU).
    pub fn new(threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("dirview-size-{}", i))
            .build()?;
        let (tx, rx) = mpsc::channel();

        Ok(Self {
            pool,
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            tx,
            rx,
        })
    }

    /// Queue a size computation for `path` on `sizer`.
    ///
    /// Returns false if one is already running for the current generation.
    pub fn request(&self, path: &Path, sizer: Arc<dyn DirectorySizer>) -> bool {
        let generation = self.generation.load(Ordering::SeqCst);
        {
            let Ok(mut in_flight) = self.in_flight.lock() else {
                return false;
            };
            if in_flight.get(path) == Some(&generation) {
                return false;
            }
            in_flight.insert(path.to_path_buf(), generation);
        }

        let path = path.to_path_buf();
        let current = Arc::clone(&self.generation);
        let in_flight = Arc::clone(&self.in_flight);
        let tx = self.tx.clone();

        tracing::trace!(path = %path.display(), generation, "Queued size request");

        self.pool.spawn(move || {
            let outcome =
                sizer.size_until(&path, &|| current.load(Ordering::SeqCst) != generation);

            // Send before clearing the in-flight mark so `pending() == 0`
            // means every result is already in the channel.
            match outcome {
                Some(report) => {
                    let _ = tx.send(SizeResult {
                        path: path.clone(),
                        report,
                        generation,
                    });
                }
                None => tracing::trace!(path = %path.display(), "Size request cancelled"),
            }

            if let Ok(mut in_flight) = in_flight.lock() {
                if in_flight.get(&path) == Some(&generation) {
                    in_flight.remove(&path);
                }
            }
        });

        true
    }

    /// Abandon every outstanding request.
    pub fn cancel_all(&self) {
        let previous = self.generation.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut in_flight) = self.in_flight.lock() {
            in_flight.clear();
        }
        tracing::debug!(generation = previous + 1, "Cancelled outstanding size requests");
    }

    /// Number of requests still running in the current generation.
    pub fn pending(&self) -> usize {
        self.in_flight.lock().map(|m| m.len()).unwrap_or(0)
    }

    /// Drain finished results without blocking.
    pub fn poll(&self) -> Vec<SizeResult> {
        let generation = self.generation.load(Ordering::SeqCst);
        self.rx
            .try_iter()
            .filter(|r| r.generation == generation)
            .collect()
    }

    /// Block up to `timeout` for the next current-generation result.
    pub fn wait(&self, timeout: Duration) -> Option<SizeResult> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.checked_duration_since(Instant::now())?;
            match self.rx.recv_timeout(remaining) {
                Ok(result) if result.generation == self.generation.load(Ordering::SeqCst) => {
                    return Some(result)
                }
                Ok(_) => continue,
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return None
                }
            }
        }
    }
}
