// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// The SMA at index i is the arithmetic mean of the `period` prices ending at
// i.  The output is aligned with the input: the first `period - 1` positions
// have no full window behind them and carry `None`.

/// Compute the SMA series for the given `prices` and look-back `period`.
///
/// The returned vector always has the same length as `prices`.
///
/// # Edge cases
/// - `period == 0` => all `None` (division by zero guard)
/// - `period > prices.len()` => all `None`
/// - `period == 1` => every entry equals the corresponding price
pub fn calculate_sma(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; prices.len()];
    }

    let mut sma = Vec::with_capacity(prices.len());
    for i in 0..prices.len() {
        if i + 1 < period {
            sma.push(None);
        } else {
            let window = &prices[i + 1 - period..=i];
            sma.push(Some(window.iter().sum::<f64>() / period as f64));
        }
    }
    sma
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_known_values() {
        let prices: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let sma = calculate_sma(&prices, 3);

        assert_eq!(sma.len(), 10);
        assert_eq!(sma[0], None);
        assert_eq!(sma[1], None);
        let expected = [2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        for (i, &e) in expected.iter().enumerate() {
            let got = sma[i + 2].expect("defined from index 2");
            assert!((got - e).abs() < 1e-10, "index {}: got {got}, expected {e}", i + 2);
        }
    }

    #[test]
    fn sma_period_longer_than_series() {
        let sma = calculate_sma(&[1.0, 2.0, 3.0], 5);
        assert_eq!(sma, vec![None, None, None]);
    }

    #[test]
    fn sma_period_one_is_identity() {
        let prices = vec![100.0, 101.5, 99.25];
        let sma = calculate_sma(&prices, 1);
        for (p, s) in prices.iter().zip(&sma) {
            assert_eq!(Some(*p), *s);
        }
    }

    #[test]
    fn sma_period_zero() {
        assert_eq!(calculate_sma(&[1.0, 2.0], 0), vec![None, None]);
    }

    #[test]
    fn sma_empty_input() {
        assert!(calculate_sma(&[], 3).is_empty());
    }

    #[test]
    fn sma_defined_count() {
        // With period w and n prices, exactly n - w + 1 entries are defined.
        let prices: Vec<f64> = (1..=25).map(|x| x as f64).collect();
        let sma = calculate_sma(&prices, 7);
        let defined = sma.iter().filter(|v| v.is_some()).count();
        assert_eq!(defined, 25 - 7 + 1);
    }
}
