//! Smoothed fee price estimate.
//!
//! Every observation moves the estimate by `(observed - price) / inertia`, clamped to
//! `max_impact` in either direction. `inertia` is non-zero and `max_impact <= inertia`.

use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use polkadot_sdk::sp_runtime::traits::{AtLeast32BitUnsigned, SaturatedConversion};
use scale_info::TypeInfo;

#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  PartialEq,
  TypeInfo,
  MaxEncodedLen,
)]
pub struct FeePriceTracker<Balance> {
  pub price: Balance,
  pub inertia: u64,
  pub max_impact: u64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FeePriceError {
  ZeroInertia,
  ImpactExceedsInertia,
}

impl<Balance: AtLeast32BitUnsigned + Copy> FeePriceTracker<Balance> {
  pub fn check_params(inertia: u64, max_impact: u64) -> Result<(), FeePriceError> {
    if inertia == 0 {
      return Err(FeePriceError::ZeroInertia);
    }
    if max_impact > inertia {
      return Err(FeePriceError::ImpactExceedsInertia);
    }
    Ok(())
  }

  pub fn configure(&mut self, inertia: u64, max_impact: u64) -> Result<(), FeePriceError> {
    Self::check_params(inertia, max_impact)?;
    self.inertia = inertia;
    self.max_impact = max_impact;
    Ok(())
  }

  /// Nudges the estimate toward `observed` and returns the new estimate.
  pub fn observe(&mut self, observed: Balance) -> Balance {
    let inertia: Balance = self.inertia.max(1).saturated_into();
    let max_impact: Balance = self.max_impact.saturated_into();
    if observed >= self.price {
      let delta = ((observed - self.price) / inertia).min(max_impact);
      self.price = self.price.saturating_add(delta);
    } else {
      let delta = ((self.price - observed) / inertia).min(max_impact);
      self.price = self.price.saturating_sub(delta);
    }
    self.price
  }

  /// Native value of `units` fee units at the current estimate.
  pub fn cost_of(&self, units: u64) -> Balance {
    price_units(self.price, units)
  }
}

/// Native value of `units` fee units at `price`.
pub fn price_units<Balance: AtLeast32BitUnsigned + Copy>(price: Balance, units: u64) -> Balance {
  price.saturating_mul(units.saturated_into())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn tracker(price: u128, inertia: u64, max_impact: u64) -> FeePriceTracker<u128> {
    let mut t = FeePriceTracker {
      price,
      inertia: 1,
      max_impact: 0,
    };
    t.configure(inertia, max_impact).unwrap();
    t
  }

  #[test]
  fn params_are_validated() {
    assert_eq!(
      FeePriceTracker::<u128>::check_params(0, 0),
      Err(FeePriceError::ZeroInertia)
    );
    assert_eq!(
      FeePriceTracker::<u128>::check_params(5, 6),
      Err(FeePriceError::ImpactExceedsInertia)
    );
    assert!(FeePriceTracker::<u128>::check_params(5, 5).is_ok());

    let mut t = tracker(10, 5, 5);
    assert_eq!(t.configure(4, 5), Err(FeePriceError::ImpactExceedsInertia));
    assert_eq!((t.inertia, t.max_impact), (5, 5));
    assert_eq!(t.configure(8, 2), Ok(()));
    assert_eq!((t.inertia, t.max_impact), (8, 2));
  }

  #[test]
  fn small_moves_follow_the_smoothing_divisor() {
    let mut t = tracker(1_000, 10, 10);
    assert_eq!(t.observe(1_050), 1_005);
    assert_eq!(t.observe(1_005), 1_005);
    assert_eq!(t.observe(955), 1_000);
  }

  #[test]
  fn large_moves_are_clamped_both_ways() {
    let mut t = tracker(1_000, 10, 3);
    assert_eq!(t.observe(1_000_000), 1_003);
    assert_eq!(t.observe(0), 1_000);
  }

  #[test]
  fn estimate_converges_monotonically() {
    let mut t = tracker(100, 4, 4);
    let mut last = t.price;
    for _ in 0..100 {
      let next = t.observe(200);
      assert!(next >= last && next <= 200);
      last = next;
    }
    assert!(last > 190);
  }

  #[test]
  fn cost_scales_with_units() {
    let t = tracker(7, 1, 1);
    assert_eq!(t.cost_of(0), 0);
    assert_eq!(t.cost_of(1_000), 7_000);
    assert_eq!(price_units(u128::MAX, 2), u128::MAX);
  }
}
