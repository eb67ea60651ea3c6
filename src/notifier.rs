pub mod terminal;

use crate::output::IndicatorResult;

/// Observer of recomputed indicator results.
pub trait Notifier: Send + Sync {
    fn notify(&self, label: &str, revision: u64, result: &IndicatorResult);
}
