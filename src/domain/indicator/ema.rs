//! Exponential moving average.
//!
//! Seeded with the simple mean of the first `period` values, then
//! `ema = value * k + prev * (1 - k)` with `k = 2 / (period + 1)`.
//! Warmup: first `period - 1` values are `None`.

pub fn ema(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 || values.len() < period {
        return vec![None; values.len()];
    }

    let mut out = vec![None; values.len()];
    let k = 2.0 / (period as f64 + 1.0);

    let mut current = values[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = Some(current);

    for i in period..values.len() {
        current = values[i] * k + current * (1.0 - k);
        out[i] = Some(current);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn too_few_values_all_none() {
        assert_eq!(ema(&[1.0, 2.0], 3), vec![None, None]);
    }

    #[test]
    fn zero_period_all_none() {
        assert_eq!(ema(&[1.0, 2.0], 0), vec![None, None]);
    }

    #[test]
    fn sma_seed() {
        let out = ema(&[1.0, 2.0, 3.0], 3);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert_relative_eq!(out[2].unwrap(), 2.0);
    }

    #[test]
    fn smoothing_after_seed() {
        // k = 0.5 for period 3
        let out = ema(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_relative_eq!(out[3].unwrap(), 4.0 * 0.5 + 2.0 * 0.5);
    }

    #[test]
    fn constant_series_stays_flat() {
        let out = ema(&[5.0; 10], 4);
        for v in out.iter().skip(3) {
            assert_relative_eq!(v.unwrap(), 5.0);
        }
    }
}
