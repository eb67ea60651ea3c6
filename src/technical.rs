use std::sync::Arc;

use crate::alignment::{SourceRecord, align};
use crate::indicator::{Indicator, IndicatorKind};
use crate::model::{AxisAssociation, Field, FieldBindings};
use crate::notifier::Notifier;
use crate::output::IndicatorResult;

/// A configured indicator attached to a chart.
///
/// Owns the indicator parameters, the field bindings that feed them, the axis
/// association used for drawing, and the most recent result. Changing the
/// kind or any binding drops the result; changing the axes does not.
pub struct TechnicalIndicator {
    label: String,
    kind: IndicatorKind,
    bindings: FieldBindings,
    axes: AxisAssociation,
    notifiers: Vec<Arc<dyn Notifier>>,
    revision: u64,
    last: Option<IndicatorResult>,
}

impl TechnicalIndicator {
    pub fn new(label: impl Into<String>, kind: IndicatorKind) -> Self {
        Self {
            label: label.into(),
            kind,
            bindings: FieldBindings::ohlcv(),
            axes: AxisAssociation::default(),
            notifiers: Vec::new(),
            revision: 0,
            last: None,
        }
    }

    #[must_use]
    pub fn with_bindings(mut self, bindings: FieldBindings) -> Self {
        self.bindings = bindings;
        self
    }

    #[must_use]
    pub fn with_axes(mut self, axes: AxisAssociation) -> Self {
        self.axes = axes;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> &IndicatorKind {
        &self.kind
    }

    pub fn bindings(&self) -> &FieldBindings {
        &self.bindings
    }

    pub fn axes(&self) -> &AxisAssociation {
        &self.axes
    }

    /// Incremented every time the previous result is invalidated.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The result of the last [`refresh`](Self::refresh), unless it has been
    /// invalidated since.
    pub fn result(&self) -> Option<&IndicatorResult> {
        self.last.as_ref()
    }

    pub fn subscribe(&mut self, notifier: Arc<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    pub fn set_kind(&mut self, kind: IndicatorKind) {
        if self.kind != kind {
            self.kind = kind;
            self.invalidate();
        }
    }

    pub fn set_binding(&mut self, field: Field, name: Option<String>) {
        if self.bindings.get(field) != name.as_deref().filter(|n| !n.is_empty()) {
            self.bindings.set(field, name);
            self.invalidate();
        }
    }

    pub fn set_x_binding(&mut self, name: Option<String>) {
        if self.bindings.x != name {
            self.bindings.x = name;
            self.invalidate();
        }
    }

    /// Axis association only affects drawing; the result is kept.
    pub fn set_axes(&mut self, axes: AxisAssociation) {
        self.axes = axes;
    }

    fn invalidate(&mut self) {
        self.last = None;
        self.revision += 1;
        tracing::debug!(indicator = %self.label, revision = self.revision, "result invalidated");
    }

    /// Align `records`, recompute from scratch, store the result and notify
    /// every subscriber.
    pub fn refresh<R: SourceRecord>(&mut self, records: &[R]) -> &IndicatorResult {
        let series = align(records, &self.bindings, self.kind.required_fields());
        let result = self.kind.recompute(&series);
        tracing::debug!(
            indicator = %self.label,
            kind = self.kind.name(),
            params = %self.kind,
            revision = self.revision,
            data_count = series.len(),
            lines = result.lines().len(),
            "indicator refreshed"
        );
        for notifier in &self.notifiers {
            notifier.notify(&self.label, self.revision, &result);
        }
        self.last.insert(result)
    }
}
