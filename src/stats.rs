use crate::models::{CorrelationResult, Strength};

pub const STRONG_THRESHOLD: f64 = 0.7;
pub const MODERATE_THRESHOLD: f64 = 0.4;
pub const WEAK_THRESHOLD: f64 = 0.2;

/// Pearson product-moment correlation.
///
/// Returns `0.0` for mismatched lengths, fewer than two samples, or a series
/// with zero variance. Callers must read `0.0` together with the sample size.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    if n != y.len() || n < 2 {
        return 0.0;
    }

    let n_f = n as f64;
    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
    let sum_x2: f64 = x.iter().map(|a| a * a).sum();
    let sum_y2: f64 = y.iter().map(|b| b * b).sum();

    let numerator = n_f * sum_xy - sum_x * sum_y;
    let denominator = ((n_f * sum_x2 - sum_x * sum_x) * (n_f * sum_y2 - sum_y * sum_y)).sqrt();

    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }

    (numerator / denominator).clamp(-1.0, 1.0)
}

pub fn correlation_strength(coefficient: f64) -> Strength {
    let magnitude = coefficient.abs();
    if magnitude >= STRONG_THRESHOLD {
        Strength::Strong
    } else if magnitude >= MODERATE_THRESHOLD {
        Strength::Moderate
    } else if magnitude >= WEAK_THRESHOLD {
        Strength::Weak
    } else {
        Strength::None
    }
}

pub fn correlation_insight(factor_a: &str, factor_b: &str, coefficient: f64) -> String {
    let strength = correlation_strength(coefficient);
    if strength == Strength::None {
        return format!("No significant correlation between {factor_a} and {factor_b}.");
    }

    let direction = if coefficient > 0.0 {
        "positive"
    } else {
        "negative"
    };
    format!(
        "{} {} correlation ({:.2}) between {} and {}.",
        strength.label(),
        direction,
        coefficient,
        factor_a,
        factor_b
    )
}

/// Correlates two aligned series and labels the result.
pub fn correlate(factor_a: &str, factor_b: &str, x: &[f64], y: &[f64]) -> CorrelationResult {
    let coefficient = pearson_correlation(x, y);
    CorrelationResult {
        coefficient,
        strength: correlation_strength(coefficient),
        sample_size: x.len().min(y.len()),
        insight: correlation_insight(factor_a, factor_b, coefficient),
    }
}

pub fn percentage_change(old_value: f64, new_value: f64) -> f64 {
    if old_value == 0.0 {
        return if new_value > 0.0 { 100.0 } else { 0.0 };
    }
    (new_value - old_value) / old_value * 100.0
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn identical_series_correlate_perfectly() {
        let x = [1.0, 4.0, 2.0, 8.0, 5.0];
        assert!(close(pearson_correlation(&x, &x), 1.0));
    }

    #[test]
    fn negated_series_correlate_negatively() {
        let x = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0];
        let y: Vec<f64> = x.iter().map(|v| -v).collect();
        assert!(close(pearson_correlation(&x, &y), -1.0));
    }

    #[test]
    fn short_or_mismatched_series_yield_zero() {
        assert_eq!(pearson_correlation(&[], &[]), 0.0);
        assert_eq!(pearson_correlation(&[1.0], &[2.0]), 0.0);
        assert_eq!(pearson_correlation(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn constant_series_yield_zero() {
        let flat = [5.0; 6];
        let moving = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        assert_eq!(pearson_correlation(&flat, &moving), 0.0);
        assert_eq!(pearson_correlation(&moving, &flat), 0.0);
    }

    #[test]
    fn strength_thresholds_include_boundaries() {
        assert_eq!(correlation_strength(0.75), Strength::Strong);
        assert_eq!(correlation_strength(0.45), Strength::Moderate);
        assert_eq!(correlation_strength(0.25), Strength::Weak);
        assert_eq!(correlation_strength(0.05), Strength::None);
        assert_eq!(correlation_strength(0.7), Strength::Strong);
        assert_eq!(correlation_strength(0.4), Strength::Moderate);
        assert_eq!(correlation_strength(0.2), Strength::Weak);
        assert_eq!(correlation_strength(-0.8), Strength::Strong);
    }

    #[test]
    fn strength_is_monotonic_in_magnitude() {
        let mut previous = Strength::None;
        for step in 0..=100 {
            let current = correlation_strength(step as f64 / 100.0);
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn insight_wording_follows_direction() {
        assert_eq!(
            correlation_insight("temperature", "engagement", 0.8123),
            "Strong positive correlation (0.81) between temperature and engagement."
        );
        assert_eq!(
            correlation_insight("rain", "reach", -0.5),
            "Moderate negative correlation (-0.50) between rain and reach."
        );
        assert_eq!(
            correlation_insight("rain", "reach", 0.1),
            "No significant correlation between rain and reach."
        );
    }

    #[test]
    fn percentage_change_handles_zero_base() {
        assert_eq!(percentage_change(0.0, 5.0), 100.0);
        assert_eq!(percentage_change(0.0, 0.0), 0.0);
        assert_eq!(percentage_change(100.0, 150.0), 50.0);
        assert_eq!(percentage_change(100.0, 50.0), -50.0);
    }

    #[test]
    fn correlate_reports_sample_size() {
        let result = correlate("a", "b", &[1.0], &[1.0]);
        assert_eq!(result.sample_size, 1);
        assert_eq!(result.coefficient, 0.0);
        assert_eq!(result.strength, Strength::None);
    }
}
