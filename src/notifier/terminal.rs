use crate::notifier::Notifier;
use crate::output::IndicatorResult;

/// Logs the formatted line values of each result at one sample.
///
/// Without an explicit sample the last sample is reported.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalNotifier {
    sample: Option<usize>,
}

impl TerminalNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(sample: usize) -> Self {
        Self {
            sample: Some(sample),
        }
    }

    fn sample_for(&self, result: &IndicatorResult) -> Option<usize> {
        let len = result.lines().first()?.len();
        match self.sample {
            Some(index) if index < len => Some(index),
            Some(_) => None,
            None => len.checked_sub(1),
        }
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, label: &str, revision: u64, result: &IndicatorResult) {
        if result.is_empty() {
            tracing::warn!(indicator = label, revision, "indicator has nothing to draw");
            return;
        }

        let Some(index) = self.sample_for(result) else {
            tracing::warn!(
                indicator = label,
                revision,
                sample = ?self.sample,
                "sample index out of range"
            );
            return;
        };

        for (line, value) in result.values_at(index) {
            tracing::info!(
                indicator = label,
                revision,
                sample = index,
                line = %line,
                value = %value,
                "{label} {line} = {value}",
            );
        }
    }
}
