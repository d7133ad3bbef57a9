// =============================================================================
// Synthetic Price History
// =============================================================================
//
// Random-walk price generator used for demos and as the fallback when no
// persisted history exists, plus the date-range filter applied before
// indicator computation.  The walk has a small upward drift so multi-year
// demo charts trend the way real equity benchmarks do.

use chrono::{Duration, NaiveDate, Utc};
use rand::Rng;

use crate::chart::PricePoint;

/// Daily upward drift applied on top of the random shock.
const DRIFT: f64 = 0.0005;

/// Generate `days` of synthetic daily prices ending yesterday.
///
/// Each step multiplies the running price by `1 + drift + shock`, where the
/// shock is uniform in `[-volatility, +volatility]`.  Prices are rounded to
/// cents, matching what a persisted price table would hold.
pub fn generate_mock_price_history(
    start_price: f64,
    days: usize,
    volatility: f64,
) -> Vec<PricePoint> {
    let mut rng = rand::thread_rng();
    let today = Utc::now().date_naive();

    let mut price = start_price;
    let mut data = Vec::with_capacity(days);

    for i in 0..days {
        let date = today - Duration::days((days - i) as i64);
        let shock = (rng.gen::<f64>() - 0.5) * 2.0 * volatility;
        price *= 1.0 + DRIFT + shock;

        data.push(PricePoint {
            date,
            price: (price * 100.0).round() / 100.0,
        });
    }

    data
}

/// Keep only the points whose date falls in `[start, end]` (inclusive).
pub fn filter_by_date_range(
    data: &[PricePoint],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<PricePoint> {
    data.iter()
        .filter(|p| p.date >= start && p.date <= end)
        .copied()
        .collect()
}
