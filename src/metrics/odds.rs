/// American -> decimal odds conversion.
///
///   o > 0:  d = 1 + o / 100
///   o < 0:  d = 1 + 100 / |o|
///   o = 0:  no price
///
/// Pure function. Non-finite input and zero have no decimal equivalent.
#[inline]
pub fn american_to_decimal(odds: f64) -> Option<f64> {
    if !odds.is_finite() || odds == 0.0 {
        return None;
    }
    if odds > 0.0 {
        Some(1.0 + odds / 100.0)
    } else {
        Some(1.0 + 100.0 / odds.abs())
    }
}

/// Same as [`american_to_decimal`] for a value that may be missing.
#[inline]
pub fn decimal_odds(odds: Option<f64>) -> Option<f64> {
    odds.and_then(american_to_decimal)
}
