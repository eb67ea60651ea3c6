use crate::alignment::AlignedSeries;
use crate::model::Field;

/// Assert two values agree to within `1e-9`, relative for large magnitudes.
#[track_caller]
pub fn assert_near(actual: f64, expected: f64) {
    let tolerance = 1e-9 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected:.12}, got {actual:.12}"
    );
}

#[track_caller]
pub fn assert_undefined(actual: f64) {
    assert!(actual.is_nan(), "expected undefined sample, got {actual}");
}

/// Index-keyed series with only a close field.
pub fn closes(values: &[f64]) -> AlignedSeries {
    AlignedSeries::indexed(values.len())
        .with(Field::Close, values.to_vec())
        .build()
        .unwrap()
}

/// Index-keyed series with high, low and close fields.
pub fn hlc(bars: &[(f64, f64, f64)]) -> AlignedSeries {
    AlignedSeries::indexed(bars.len())
        .with(Field::High, bars.iter().map(|b| b.0).collect())
        .with(Field::Low, bars.iter().map(|b| b.1).collect())
        .with(Field::Close, bars.iter().map(|b| b.2).collect())
        .build()
        .unwrap()
}

/// Index-keyed series with high, low, close and volume fields.
pub fn hlcv(bars: &[(f64, f64, f64, f64)]) -> AlignedSeries {
    AlignedSeries::indexed(bars.len())
        .with(Field::High, bars.iter().map(|b| b.0).collect())
        .with(Field::Low, bars.iter().map(|b| b.1).collect())
        .with(Field::Close, bars.iter().map(|b| b.2).collect())
        .with(Field::Volume, bars.iter().map(|b| b.3).collect())
        .build()
        .unwrap()
}

/// Deterministic, gently trending price path of length `n`.
pub fn wave(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.3)
        .collect()
}

/// Bars built around [`wave`] closes with a spread that varies per bar.
pub fn wave_bars(n: usize) -> Vec<(f64, f64, f64, f64)> {
    wave(n)
        .into_iter()
        .enumerate()
        .map(|(i, close)| {
            let spread = 1.0 + (i % 4) as f64 * 0.5;
            (close + spread, close - spread * 0.8, close, 1_000.0 + i as f64 * 10.0)
        })
        .collect()
}
