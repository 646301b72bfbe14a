//! Adapter traits for the delayed exchange.
//!
//! The pallet never touches balances or pool math directly. Runtimes wire these traits to
//! their asset pallets and AMM; the unit `()` impls are inert and reject every mutation.

use frame::prelude::*;
use polkadot_sdk::sp_runtime::FixedU128;
use primitives::AssetPair;

/// Asset transfers and balance queries, native currency included.
pub trait AssetOps<AccountId, AssetId, Balance> {
  fn transfer(
    from: &AccountId,
    to: &AccountId,
    asset: AssetId,
    amount: Balance,
  ) -> Result<(), DispatchError>;

  fn balance(who: &AccountId, asset: AssetId) -> Balance;
}

/// Conversion between the native currency and its wrapped fungible representation.
///
/// Both operations act on `who`'s own balances.
pub trait NativeWrapper<AccountId, Balance> {
  fn wrap(who: &AccountId, amount: Balance) -> Result<(), DispatchError>;

  fn unwrap(who: &AccountId, amount: Balance) -> Result<(), DispatchError>;
}

/// The AMM pool collaborator.
///
/// Pools are addressed by an unordered asset pair. Amounts and reserves are always given
/// in the `(first, second)` order of that pair.
pub trait PoolOps<AccountId, AssetId, Balance> {
  /// LP token of the pool, `None` if the pool does not exist.
  fn lp_asset(pair: &AssetPair<AssetId>) -> Option<AssetId>;

  fn reserves(pair: &AssetPair<AssetId>) -> Option<(Balance, Balance)>;

  /// Oracle price of one unit of `first` expressed in units of `second`.
  fn spot_price(pair: &AssetPair<AssetId>) -> Option<FixedU128>;

  /// Brings the pool's oracle up to date before a trade settles.
  fn sync_with_oracle(pair: &AssetPair<AssetId>) -> Result<(), DispatchError>;

  /// Adds liquidity from `who`, minting LP tokens to `to`.
  /// Returns `(used_first, used_second, liquidity)`.
  fn mint(
    who: &AccountId,
    pair: &AssetPair<AssetId>,
    amount_first: Balance,
    amount_second: Balance,
    to: &AccountId,
  ) -> Result<(Balance, Balance, Balance), DispatchError>;

  /// Burns `liquidity` LP tokens held by `who`, sending the underlying assets to `to`.
  /// Returns `(amount_first, amount_second)`.
  fn burn(
    who: &AccountId,
    pair: &AssetPair<AssetId>,
    liquidity: Balance,
    to: &AccountId,
  ) -> Result<(Balance, Balance), DispatchError>;

  /// Swaps exactly `amount_in` from `who` for exactly `amount_out`, sent to `to`.
  fn swap(
    who: &AccountId,
    asset_in: AssetId,
    asset_out: AssetId,
    amount_in: Balance,
    amount_out: Balance,
    to: &AccountId,
  ) -> Result<(), DispatchError>;

  fn swap_amount_out(
    asset_in: AssetId,
    asset_out: AssetId,
    amount_in: Balance,
  ) -> Result<Balance, DispatchError>;

  fn swap_amount_in(
    asset_in: AssetId,
    asset_out: AssetId,
    amount_out: Balance,
  ) -> Result<Balance, DispatchError>;
}

impl<AccountId, AssetId, Balance: Default> AssetOps<AccountId, AssetId, Balance> for () {
  fn transfer(
    _from: &AccountId,
    _to: &AccountId,
    _asset: AssetId,
    _amount: Balance,
  ) -> Result<(), DispatchError> {
    Err(DispatchError::Other("AssetOps not configured"))
  }

  fn balance(_who: &AccountId, _asset: AssetId) -> Balance {
    Balance::default()
  }
}

impl<AccountId, Balance> NativeWrapper<AccountId, Balance> for () {
  fn wrap(_who: &AccountId, _amount: Balance) -> Result<(), DispatchError> {
    Err(DispatchError::Other("NativeWrapper not configured"))
  }

  fn unwrap(_who: &AccountId, _amount: Balance) -> Result<(), DispatchError> {
    Err(DispatchError::Other("NativeWrapper not configured"))
  }
}

impl<AccountId, AssetId, Balance> PoolOps<AccountId, AssetId, Balance> for () {
  fn lp_asset(_pair: &AssetPair<AssetId>) -> Option<AssetId> {
    None
  }

  fn reserves(_pair: &AssetPair<AssetId>) -> Option<(Balance, Balance)> {
    None
  }

  fn spot_price(_pair: &AssetPair<AssetId>) -> Option<FixedU128> {
    None
  }

  fn sync_with_oracle(_pair: &AssetPair<AssetId>) -> Result<(), DispatchError> {
    Err(DispatchError::Other("PoolOps not configured"))
  }

  fn mint(
    _who: &AccountId,
    _pair: &AssetPair<AssetId>,
    _amount_first: Balance,
    _amount_second: Balance,
    _to: &AccountId,
  ) -> Result<(Balance, Balance, Balance), DispatchError> {
    Err(DispatchError::Other("PoolOps not configured"))
  }

  fn burn(
    _who: &AccountId,
    _pair: &AssetPair<AssetId>,
    _liquidity: Balance,
    _to: &AccountId,
  ) -> Result<(Balance, Balance), DispatchError> {
    Err(DispatchError::Other("PoolOps not configured"))
  }

  fn swap(
    _who: &AccountId,
    _asset_in: AssetId,
    _asset_out: AssetId,
    _amount_in: Balance,
    _amount_out: Balance,
    _to: &AccountId,
  ) -> Result<(), DispatchError> {
    Err(DispatchError::Other("PoolOps not configured"))
  }

  fn swap_amount_out(
    _asset_in: AssetId,
    _asset_out: AssetId,
    _amount_in: Balance,
  ) -> Result<Balance, DispatchError> {
    Err(DispatchError::Other("PoolOps not configured"))
  }

  fn swap_amount_in(
    _asset_in: AssetId,
    _asset_out: AssetId,
    _amount_out: Balance,
  ) -> Result<Balance, DispatchError> {
    Err(DispatchError::Other("PoolOps not configured"))
  }
}
