use crate::models::{DailyMetricPoint, DataQualityAssessment};

pub const DEFAULT_MIN_POPULATED_DAYS: usize = 7;

/// Decides whether a daily series is dense enough to support directional claims.
///
/// A day counts as populated when it was observed with a non-zero value. The
/// threshold is absolute, independent of how long the requested window is, so
/// a 90-day window with five readings is still unreliable.
pub fn assess_series(
    metric: &str,
    points: &[DailyMetricPoint],
    window_days: usize,
    min_populated_days: usize,
) -> DataQualityAssessment {
    let populated_days = points
        .iter()
        .filter(|point| point.value != 0.0 && point.value.is_finite())
        .count();
    let reliable = populated_days >= min_populated_days;

    let mut warnings = Vec::new();
    if !reliable {
        warnings.push(format!(
            "{metric} tracking is sparse: only {populated_days} of {window_days} days have data \
             (at least {min_populated_days} needed). Zero or flat {metric} readings reflect \
             incomplete collection, not real performance; do not report zero growth or weak \
             retention from this series."
        ));
    }
    if points.len() > populated_days && populated_days > 0 {
        let empty = points.len() - populated_days;
        warnings.push(format!(
            "{empty} {metric} readings are exactly zero and may be missing collections."
        ));
    }

    DataQualityAssessment {
        metric: metric.to_string(),
        window_days,
        populated_days,
        min_populated_days,
        reliable,
        warnings,
    }
}

pub fn assess(metric: &str, points: &[DailyMetricPoint], window_days: usize) -> DataQualityAssessment {
    assess_series(metric, points, window_days, DEFAULT_MIN_POPULATED_DAYS)
}
