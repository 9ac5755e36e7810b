//! Client-side valuation helpers.

/// Estimate the payout for redeeming `share` claim tokens.
///
/// Mirrors the on-chain rounding: `floor(pool * share / original_supply)`,
/// where the denominator is the bundle's original supply regardless of how
/// much has been burned since. Returns `None` when the supply is zero or
/// the product overflows.
pub fn redemption_estimate(pool: u128, share: u128, original_supply: u128) -> Option<u128> {
    if original_supply == 0 {
        return None;
    }
    pool.checked_mul(share).map(|gross| gross / original_supply)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_floors() {
        // 140 * 80 / 1000 = 11.2
        assert_eq!(redemption_estimate(140, 80, 1000), Some(11));
        assert_eq!(redemption_estimate(140, 20, 1000), Some(2));
    }

    #[test]
    fn test_estimate_full_share() {
        assert_eq!(redemption_estimate(140, 1000, 1000), Some(140));
    }

    #[test]
    fn test_estimate_degenerate_inputs() {
        assert_eq!(redemption_estimate(140, 0, 1000), Some(0));
        assert_eq!(redemption_estimate(140, 80, 0), None);
        assert_eq!(redemption_estimate(u128::MAX, 2, 1000), None);
    }
}
