//! Guarded ratios shared by every view.

/// Percentage change from `previous` to `current`. Zero when there is no
/// positive baseline to compare against.
pub fn percent_delta(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

/// `part` as a percentage of `whole`, or zero when `whole` is not positive.
pub fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_against_zero_baseline_is_zero() {
        assert_eq!(percent_delta(0.0, 0.0), 0.0);
        assert_eq!(percent_delta(125.0, 0.0), 0.0);
    }

    #[test]
    fn delta_growth_and_decline() {
        assert_eq!(percent_delta(150.0, 100.0), 50.0);
        assert_eq!(percent_delta(50.0, 100.0), -50.0);
        assert_eq!(percent_delta(0.0, 80.0), -100.0);
        assert_eq!(percent_delta(80.0, 80.0), 0.0);
    }

    #[test]
    fn percent_of_guards_zero_whole() {
        assert_eq!(percent_of(3.0, 0.0), 0.0);
        assert_eq!(percent_of(0.0, 0.0), 0.0);
        assert_eq!(percent_of(1.0, 4.0), 25.0);
    }
}
