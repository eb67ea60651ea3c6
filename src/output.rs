use std::fmt;

use serde::Serialize;

/// Label text for a sample that has no value.
pub const NO_VALUE: &str = "N/A";

/// Format a sample for display next to the pointer: two decimal places, or
/// [`NO_VALUE`] for undefined samples.
pub fn format_value(y: f64) -> String {
    if y.is_finite() {
        format!("{y:.2}")
    } else {
        NO_VALUE.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn is_defined(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Points aligned 1:1 with the input samples. Undefined samples keep their
/// slot with `y = NaN`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PointSeries {
    points: Vec<Point>,
}

impl PointSeries {
    pub fn from_xy(x: &[f64], y: Vec<f64>) -> Self {
        Self {
            points: x.iter().zip(y).map(|(&x, y)| Point { x, y }).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied()
    }

    pub fn as_slice(&self) -> &[Point] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }

    pub fn y_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.y)
    }
}

/// Bounding box of the defined points of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Range {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Range {
    /// Range over the finite points, or `None` with fewer than two of them.
    pub fn of(points: &PointSeries) -> Option<Self> {
        let mut defined = points.iter().filter(|p| p.is_defined());
        let first = defined.next()?;
        let mut range = Range {
            x_min: first.x,
            x_max: first.x,
            y_min: first.y,
            y_max: first.y,
        };
        let mut count = 1usize;
        for p in defined {
            range.x_min = range.x_min.min(p.x);
            range.x_max = range.x_max.max(p.x);
            range.y_min = range.y_min.min(p.y);
            range.y_max = range.y_max.max(p.y);
            count += 1;
        }
        (count >= 2).then_some(range)
    }

    #[must_use]
    pub fn union(self, other: Range) -> Range {
        Range {
            x_min: self.x_min.min(other.x_min),
            x_max: self.x_max.max(other.x_max),
            y_min: self.y_min.min(other.y_min),
            y_max: self.y_max.max(other.y_max),
        }
    }
}

/// Name of an output line within an [`IndicatorResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LineName {
    Signal,
    Upper,
    Lower,
    Center,
    PeriodLine,
    MacdLine,
    SignalLine,
    HistogramTop,
    HistogramBase,
}

impl LineName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Signal => "signal",
            Self::Upper => "upper",
            Self::Lower => "lower",
            Self::Center => "center",
            Self::PeriodLine => "periodLine",
            Self::MacdLine => "macdLine",
            Self::SignalLine => "signalLine",
            Self::HistogramTop => "histogramTop",
            Self::HistogramBase => "histogramBase",
        }
    }
}

impl fmt::Display for LineName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the rendering layer should draw a line's points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    #[default]
    Line,
    /// Vertical bars; drawn pairwise with a matching base line.
    Bar,
}

/// One output line: points, their range, and the warm-up index before which
/// every sample is undefined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    name: LineName,
    kind: LineKind,
    warm_up: usize,
    range: Option<Range>,
    points: PointSeries,
}

impl Line {
    /// Build a line from per-sample values. Samples before `warm_up` are
    /// forced to NaN.
    pub fn new(name: LineName, x: &[f64], mut values: Vec<f64>, warm_up: usize) -> Self {
        for v in values.iter_mut().take(warm_up) {
            *v = f64::NAN;
        }
        let points = PointSeries::from_xy(x, values);
        let range = Range::of(&points);
        Self {
            name,
            kind: LineKind::Line,
            warm_up: warm_up.min(points.len()),
            range,
            points,
        }
    }

    /// A fixed reference line (threshold or center) spanning every sample.
    pub fn constant(name: LineName, x: &[f64], value: f64) -> Self {
        Self::new(name, x, vec![value; x.len()], 0)
    }

    #[must_use]
    pub fn as_bars(mut self) -> Self {
        self.kind = LineKind::Bar;
        self
    }

    pub fn name(&self) -> LineName {
        self.name
    }

    pub fn kind(&self) -> LineKind {
        self.kind
    }

    pub fn warm_up(&self) -> usize {
        self.warm_up
    }

    pub fn range(&self) -> Option<Range> {
        self.range
    }

    pub fn points(&self) -> &PointSeries {
        &self.points
    }

    /// Number of samples, warm-up included.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.points.get(index).map(|p| p.y)
    }

    /// Points from the warm-up index onward.
    pub fn visible_points(&self) -> &[Point] {
        &self.points.as_slice()[self.warm_up..]
    }

    /// `(x, y)` pairs in screen order: swapped when the axes are transposed.
    pub fn oriented_points(&self, transposed: bool) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points
            .iter()
            .map(move |p| if transposed { (p.y, p.x) } else { (p.x, p.y) })
    }
}

/// All lines produced by one computation, redrawn together.
///
/// Empty when the indicator is not drawable (insufficient data, invalid
/// parameters, unbound fields).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndicatorResult {
    lines: Vec<Line>,
}

impl IndicatorResult {
    pub fn new(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line(&self, name: LineName) -> Option<&Line> {
        self.lines.iter().find(|l| l.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = LineName> + '_ {
        self.lines.iter().map(|l| l.name)
    }

    /// Union of every line's range.
    pub fn range(&self) -> Option<Range> {
        self.lines
            .iter()
            .filter_map(Line::range)
            .reduce(Range::union)
    }

    /// Index of the sample whose X is nearest to `x`.
    pub fn sample_index(&self, x: f64) -> Option<usize> {
        let points = self.lines.first()?.points().as_slice();
        if points.is_empty() || x.is_nan() {
            return None;
        }
        let after = points.partition_point(|p| p.x < x);
        if after == 0 {
            return Some(0);
        }
        if after == points.len() {
            return Some(points.len() - 1);
        }
        let before = after - 1;
        if x - points[before].x <= points[after].x - x {
            Some(before)
        } else {
            Some(after)
        }
    }

    /// Formatted value of every line at `index`, for pointer labels.
    pub fn values_at(&self, index: usize) -> Vec<(LineName, String)> {
        self.lines
            .iter()
            .filter_map(|l| l.value_at(index).map(|y| (l.name, format_value(y))))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_rounds_to_two_places() {
        assert_eq!(format_value(12.345_6), "12.35");
        assert_eq!(format_value(-0.5), "-0.50");
        assert_eq!(format_value(f64::NAN), NO_VALUE);
        assert_eq!(format_value(f64::INFINITY), NO_VALUE);
    }

    #[test]
    fn line_masks_warm_up() {
        let line = Line::new(LineName::Signal, &[0.0, 1.0, 2.0], vec![5.0, 6.0, 7.0], 1);
        assert!(line.value_at(0).unwrap().is_nan());
        assert_eq!(line.value_at(1), Some(6.0));
        assert_eq!(line.warm_up(), 1);
        assert_eq!(line.visible_points().len(), 2);
    }

    #[test]
    fn range_skips_undefined_points() {
        let line = Line::new(
            LineName::Signal,
            &[0.0, 1.0, 2.0, 3.0],
            vec![f64::NAN, 4.0, f64::NAN, -2.0],
            0,
        );
        let range = line.range().unwrap();
        assert_eq!(range.x_min, 1.0);
        assert_eq!(range.x_max, 3.0);
        assert_eq!(range.y_min, -2.0);
        assert_eq!(range.y_max, 4.0);
    }

    #[test]
    fn range_needs_two_points() {
        let line = Line::new(LineName::Signal, &[0.0, 1.0], vec![f64::NAN, 4.0], 0);
        assert_eq!(line.range(), None);
    }

    #[test]
    fn result_range_is_union() {
        let x = [0.0, 1.0, 2.0];
        let result = IndicatorResult::new(vec![
            Line::new(LineName::Signal, &x, vec![1.0, 2.0, 3.0], 0),
            Line::constant(LineName::Upper, &x, 70.0),
        ]);
        let range = result.range().unwrap();
        assert_eq!(range.y_min, 1.0);
        assert_eq!(range.y_max, 70.0);
    }

    #[test]
    fn sample_index_picks_nearest() {
        let x = [10.0, 20.0, 30.0];
        let result = IndicatorResult::new(vec![Line::constant(LineName::Center, &x, 0.0)]);
        assert_eq!(result.sample_index(0.0), Some(0));
        assert_eq!(result.sample_index(14.0), Some(0));
        assert_eq!(result.sample_index(16.0), Some(1));
        assert_eq!(result.sample_index(99.0), Some(2));
        assert_eq!(IndicatorResult::empty().sample_index(1.0), None);
    }

    #[test]
    fn values_at_formats_each_line() {
        let x = [0.0, 1.0];
        let result = IndicatorResult::new(vec![
            Line::new(LineName::Signal, &x, vec![1.0, 2.346], 1),
            Line::constant(LineName::Upper, &x, 70.0),
        ]);
        assert_eq!(
            result.values_at(0),
            vec![
                (LineName::Signal, NO_VALUE.to_string()),
                (LineName::Upper, "70.00".to_string())
            ]
        );
        assert_eq!(result.values_at(1)[0].1, "2.35");
        assert!(result.values_at(5).is_empty());
    }

    #[test]
    fn oriented_points_swap_when_transposed() {
        let line = Line::new(LineName::Signal, &[1.0], vec![9.0], 0);
        assert_eq!(line.oriented_points(true).next(), Some((9.0, 1.0)));
        assert_eq!(line.oriented_points(false).next(), Some((1.0, 9.0)));
    }

    #[test]
    fn serializes_undefined_as_null() {
        let line = Line::new(LineName::SignalLine, &[0.0], vec![1.0], 1);
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["name"], "signalLine");
        assert!(json["points"][0]["y"].is_null());
    }
}
