use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::Cents;

/// Commission rates are stored in basis points, so 10_000 corresponds to a rate of 1.0.
pub const BASIS_POINTS_SCALE: i64 = 10_000;

//--------------------------------------   CommissionRate     ---------------------------------------------------------
/// The fraction of an item's sale value retained by the platform, in basis points.
///
/// The seller receives `1 - rate` of the gross. Keeping the rate in basis points lets settlement run on
/// integer arithmetic end to end, with a single rounding step per seller per settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct CommissionRate(i64);

#[derive(Debug, Clone, Error)]
#[error("Commission rate must lie in [0, {BASIS_POINTS_SCALE}] basis points. Got {0}")]
pub struct CommissionRateError(i64);

impl CommissionRate {
    /// The rate applied when a product's owner has no seller profile: 10%.
    pub const DEFAULT: CommissionRate = CommissionRate(1_000);

    pub fn from_basis_points(bps: i64) -> Result<Self, CommissionRateError> {
        if (0..=BASIS_POINTS_SCALE).contains(&bps) {
            Ok(Self(bps))
        } else {
            Err(CommissionRateError(bps))
        }
    }

    pub fn basis_points(&self) -> i64 {
        self.0
    }

    pub fn as_fraction(&self) -> f64 {
        self.0 as f64 / BASIS_POINTS_SCALE as f64
    }

    /// The seller's share of `gross` after commission, rounded to the minor unit half-to-even.
    pub fn net_of(&self, gross: Cents) -> Cents {
        let num = i128::from(gross.value()) * i128::from(BASIS_POINTS_SCALE - self.0);
        let net = div_round_half_even(num, i128::from(BASIS_POINTS_SCALE));
        #[allow(clippy::cast_possible_truncation)]
        Cents::from(net as i64)
    }
}

impl Default for CommissionRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Integer division rounding to the nearest quotient, ties to even. `den` must be positive.
fn div_round_half_even(num: i128, den: i128) -> i128 {
    let q = num.div_euclid(den);
    let r = num.rem_euclid(den);
    match (2 * r).cmp(&den) {
        Ordering::Less => q,
        Ordering::Greater => q + 1,
        Ordering::Equal => {
            if q % 2 == 0 {
                q
            } else {
                q + 1
            }
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rejects_out_of_range_rates() {
        assert!(CommissionRate::from_basis_points(-1).is_err());
        assert!(CommissionRate::from_basis_points(10_001).is_err());
        assert!(CommissionRate::from_basis_points(0).is_ok());
        assert!(CommissionRate::from_basis_points(10_000).is_ok());
    }

    #[test]
    fn default_rate_is_ten_percent() {
        let rate = CommissionRate::DEFAULT;
        assert_eq!(rate.basis_points(), 1_000);
        assert_eq!(rate.net_of(Cents::from(200_000)), Cents::from(180_000));
    }

    #[test]
    fn full_commission_nets_nothing() {
        let rate = CommissionRate::from_basis_points(10_000).unwrap();
        assert_eq!(rate.net_of(Cents::from(123_456)), Cents::from(0));
    }

    #[test]
    fn zero_commission_nets_everything() {
        let rate = CommissionRate::from_basis_points(0).unwrap();
        assert_eq!(rate.net_of(Cents::from(123_456)), Cents::from(123_456));
    }

    #[test]
    fn rounds_half_to_even() {
        // 15% of 110 = 93.5 net: ties round to the even neighbour, 94.
        let rate = CommissionRate::from_basis_points(1_500).unwrap();
        assert_eq!(rate.net_of(Cents::from(110)), Cents::from(94));
        // 15% of 30 = 25.5 net: 26 is even, rounds up.
        assert_eq!(rate.net_of(Cents::from(30)), Cents::from(26));
        // 15% of 50 = 42.5 net: 42 is even, rounds down.
        assert_eq!(rate.net_of(Cents::from(50)), Cents::from(42));
    }

    #[test]
    fn rounding_is_applied_once_on_the_total() {
        // 3 units at 33 each with 10% commission: net of the 99 gross is 89.1 -> 89,
        // not 3 * round(29.7) = 90.
        let rate = CommissionRate::DEFAULT;
        let gross = Cents::from(33) * 3;
        assert_eq!(rate.net_of(gross), Cents::from(89));
    }
}
