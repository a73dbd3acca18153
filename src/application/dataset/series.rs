//! Aligned series helpers with pandas-style semantics: `None` marks an
//! undefined cell, rolling windows are row-based with a minimum observation
//! count.

use statrs::statistics::{Data, Distribution};

/// Percent change over `periods` rows. The first `periods` cells are `None`,
/// as is any change that is not finite (a zero denominator).
pub fn pct_change(values: &[f64], periods: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if periods == 0 || i < periods {
                return None;
            }
            let prev = values[i - periods];
            let change = (values[i] - prev) / prev;
            change.is_finite().then_some(change)
        })
        .collect()
}

fn rolling<F>(values: &[Option<f64>], window: usize, min_periods: usize, agg: F) -> Vec<Option<f64>>
where
    F: Fn(Vec<f64>) -> Option<f64>,
{
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let present: Vec<f64> = values[start..=i].iter().flatten().copied().collect();
            if present.is_empty() || present.len() < min_periods {
                return None;
            }
            agg(present).filter(|v| v.is_finite())
        })
        .collect()
}

/// Mean of the trailing `window` rows, once at least `min_periods` are defined.
pub fn rolling_mean(values: &[Option<f64>], window: usize, min_periods: usize) -> Vec<Option<f64>> {
    rolling(values, window, min_periods, |v| Data::new(v).mean())
}

/// Sample standard deviation of the trailing `window` rows, once at least
/// `min_periods` (and never fewer than two) are defined.
pub fn rolling_std(values: &[Option<f64>], window: usize, min_periods: usize) -> Vec<Option<f64>> {
    rolling(values, window, min_periods.max(2), |v| Data::new(v).std_dev())
}

/// Value `periods` rows later; the last `periods` cells are `None`.
pub fn shift_back(values: &[Option<f64>], periods: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| values.get(i + periods).copied().flatten())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-9)
    }

    #[test]
    fn test_pct_change_scenario() {
        let ret = pct_change(&[100.0, 102.0, 101.0], 1);
        assert_eq!(ret[0], None);
        assert!(close(ret[1], 0.02));
        assert!(close(ret[2], -1.0 / 102.0));
    }

    #[test]
    fn test_pct_change_zero_denominator_is_undefined() {
        let ret = pct_change(&[0.0, 5.0, 0.0, 0.0], 1);
        assert_eq!(ret, vec![None, None, Some(-1.0), None]);
    }

    #[test]
    fn test_pct_change_longer_period() {
        let ret = pct_change(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 5);
        assert_eq!(ret[..5], [None; 5]);
        assert!(close(ret[5], 5.0));
    }

    #[test]
    fn test_rolling_mean_min_periods() {
        let v = [Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        let three = rolling_mean(&v, 3, 1);
        assert_eq!(three, vec![Some(1.0), Some(1.5), Some(2.0), Some(3.0)]);

        let seven = rolling_mean(&v, 7, 3);
        assert_eq!(seven, vec![None, None, Some(2.0), Some(2.5)]);
    }

    #[test]
    fn test_rolling_skips_missing_cells() {
        let v = [None, Some(2.0), None, Some(4.0)];
        assert_eq!(rolling_mean(&v, 3, 1), vec![None, Some(2.0), Some(2.0), Some(3.0)]);
        assert_eq!(rolling_mean(&v, 4, 3), vec![None; 4]);
    }

    #[test]
    fn test_rolling_std_is_sample_std() {
        let v: Vec<Option<f64>> = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]
            .into_iter()
            .map(Some)
            .collect();
        let std = rolling_std(&v, 20, 8);
        assert!(std[..7].iter().all(Option::is_none));
        // Population std of this set is 2.0; sample std is sqrt(32/7)
        assert!(close(std[7], (32.0f64 / 7.0).sqrt()));
    }

    #[test]
    fn test_shift_back() {
        let v = [Some(1.0), None, Some(3.0)];
        assert_eq!(shift_back(&v, 1), vec![None, Some(3.0), None]);
    }
}
