//! Ecosystem constants for the delayed exchange.
//!
//! Pallet IDs and the default timing/fee parameters shared by the pallet's runtime
//! configuration and its tests.

/// Balance type alias for consistency across ecosystem
pub type Balance = u128;

/// Unix timestamp in seconds.
pub type Moment = u64;

/// Pallet identifiers for deriving pallet-owned accounts.
///
/// Used by `PalletId::into_account_truncating()` to derive the account that escrows
/// queued principal and prepaid fees.
pub mod pallet_ids {
  /// Delayed exchange pallet ID (order escrow)
  pub const DELAYED_EXCHANGE_PALLET_ID: &[u8; 8] = b"dlyexch0";
}

/// Default scheduling and fee parameters.
pub mod params {
  use super::Moment;
  use sp_arithmetic::Permill;

  /// Minimum time between submission and eligibility (5 minutes).
  pub const DEFAULT_DELAY: Moment = 300;

  /// Keeper priority window as a multiple of the delay.
  pub const BOT_WINDOW_DELAY_MULTIPLIER: Moment = 4;

  /// Time past eligibility after which the submitter may cancel (24 hours).
  pub const ORDER_CANCEL_TIME: Moment = 24 * 60 * 60;

  /// Time past eligibility after which a stuck refund may be escaped to the owner (365 days).
  pub const REFUND_ESCAPE_TIME: Moment = 365 * 24 * 60 * 60;

  /// Fee units charged for any execution regardless of kind.
  pub const BASE_EXECUTION_COST: u64 = 100_000;

  /// Default smoothing divisor of the fee price tracker.
  pub const DEFAULT_FEE_PRICE_INERTIA: u64 = 20;

  /// Default per-observation clamp of the fee price tracker.
  pub const DEFAULT_MAX_FEE_PRICE_IMPACT: u64 = 10;

  /// Default bounds for the per-order fee budget, in fee units.
  pub const DEFAULT_MIN_FEE_LIMIT: u64 = 100_000;
  pub const DEFAULT_MAX_FEE_LIMIT: u64 = 10_000_000;

  /// Relative reserve ratio change below which a deposit skips its rebalancing swap (0.1%).
  pub const MIN_RATIO_CHANGE_TO_SWAP: Permill = Permill::from_parts(1_000);
}
