use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::alignment::AlignedSeries;
use crate::indicator::IndicatorKind;
use crate::output::IndicatorResult;

/// A published result and the submission it came from.
#[derive(Debug)]
pub struct Computed {
    pub generation: u64,
    pub result: IndicatorResult,
}

/// Runs recomputations off the async runtime and publishes only the newest.
///
/// Every [`submit`](Self::submit) takes a new generation number. A finished
/// computation is published only if no later submission exists, so a slow,
/// stale computation never overwrites a newer one.
#[derive(Clone)]
pub struct Recomputer {
    generation: Arc<AtomicU64>,
    tx: Arc<watch::Sender<Option<Arc<Computed>>>>,
}

impl Default for Recomputer {
    fn default() -> Self {
        Self::new()
    }
}

impl Recomputer {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            generation: Arc::new(AtomicU64::new(0)),
            tx: Arc::new(tx),
        }
    }

    /// Schedule a recomputation. The handle resolves to whether the result
    /// was published.
    pub fn submit(&self, series: Arc<AlignedSeries>, kind: IndicatorKind) -> JoinHandle<bool> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = Arc::clone(&self.generation);
        let tx = Arc::clone(&self.tx);

        tokio::task::spawn_blocking(move || {
            let result = kind.recompute(&series);
            let published = tx.send_if_modified(|slot| {
                if latest.load(Ordering::SeqCst) != generation {
                    return false;
                }
                *slot = Some(Arc::new(Computed { generation, result }));
                true
            });
            if !published {
                tracing::debug!(indicator = %kind, generation, "stale recomputation discarded");
            }
            published
        })
    }

    /// Generation of the most recent submission.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn latest(&self) -> Option<Arc<Computed>> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Computed>>> {
        self.tx.subscribe()
    }
}
