use crate as pallet_delayed_exchange;
use frame::prelude::*;
use polkadot_sdk::{
  frame_support::{
    PalletId, construct_runtime,
    storage::unhashed,
    traits::{ConstU32, ConstU64, ConstU128, Currency, ExistenceRequirement, Get, UnixTime},
  },
  frame_system::EnsureRoot,
  sp_runtime::{
    BuildStorage, FixedPointNumber, FixedU128, Permill, TokenError,
    traits::{BlakeTwo256, IdentityLookup},
  },
};

use alloc::{vec, vec::Vec};
use core::cell::RefCell;

use crate::{AssetOps, NativeWrapper, PoolOps};
use primitives::{
  AssetKind, AssetPair,
  pallet_ids::DELAYED_EXCHANGE_PALLET_ID,
  params::{
    DEFAULT_DELAY, DEFAULT_FEE_PRICE_INERTIA, DEFAULT_MAX_FEE_PRICE_IMPACT, ORDER_CANCEL_TIME,
    REFUND_ESCAPE_TIME,
  },
};

type Block = polkadot_sdk::frame_system::mocking::MockBlock<Test>;
pub type AccountId = u64;
pub type Balance = u128;
pub type TestAsset = AssetKind;

pub const ALICE: AccountId = 1;
pub const BOB: AccountId = 2;
pub const KEEPER: AccountId = 3;
pub const CHARLIE: AccountId = 4;
pub const OWNER: AccountId = 5;

pub const POOL_AB: AccountId = 1_001;
pub const POOL_AW: AccountId = 1_002;
pub const WRAPPER: AccountId = 2_000;
pub const LP_RESERVE: AccountId = 9_999;

pub const NATIVE: TestAsset = AssetKind::Native;
pub const TOKEN_A: TestAsset = AssetKind::Local(1);
pub const TOKEN_B: TestAsset = AssetKind::Local(2);
pub const TOKEN_C: TestAsset = AssetKind::Local(3);
pub const WNATIVE: TestAsset = AssetKind::Local(100);
pub const LP_AB: TestAsset = AssetKind::Local(1_001);
pub const LP_AW: TestAsset = AssetKind::Local(1_002);

pub const START_TIME: u64 = 1_700_000_000;
pub const INITIAL_NATIVE: Balance = 10_000_000_000_000;
pub const INITIAL_TOKENS: Balance = 1_000_000_000_000;
pub const INITIAL_LP: Balance = 1_000_000;
pub const POOL_RESERVE: Balance = 1_000_000_000;
pub const TRANSFER_COST: u64 = 5_000;
pub const BASE_COST: u64 = 10_000;

construct_runtime!(
  pub enum Test {
    System: polkadot_sdk::frame_system,
    Balances: polkadot_sdk::pallet_balances,
    DelayedExchange: pallet_delayed_exchange,
  }
);

impl polkadot_sdk::frame_system::Config for Test {
  type BaseCallFilter = polkadot_sdk::frame_support::traits::Everything;
  type BlockWeights = ();
  type BlockLength = ();
  type DbWeight = ();
  type RuntimeOrigin = RuntimeOrigin;
  type RuntimeCall = RuntimeCall;
  type Nonce = u64;
  type Hash = polkadot_sdk::sp_core::H256;
  type Hashing = BlakeTwo256;
  type AccountId = AccountId;
  type Lookup = IdentityLookup<Self::AccountId>;
  type Block = Block;
  type RuntimeEvent = RuntimeEvent;
  type BlockHashCount = ConstU64<250>;
  type Version = ();
  type PalletInfo = PalletInfo;
  type AccountData = polkadot_sdk::pallet_balances::AccountData<Balance>;
  type OnNewAccount = ();
  type OnKilledAccount = ();
  type SystemWeightInfo = ();
  type SS58Prefix = ();
  type OnSetCode = ();
  type MaxConsumers = ConstU32<16>;
  type RuntimeTask = ();
  type ExtensionsWeightInfo = ();
  type SingleBlockMigrations = ();
  type MultiBlockMigrator = ();
  type PreInherents = ();
  type PostInherents = ();
  type PostTransactions = ();
}

impl polkadot_sdk::pallet_balances::Config for Test {
  type MaxLocks = ConstU32<50>;
  type MaxReserves = ();
  type ReserveIdentifier = [u8; 8];
  type Balance = Balance;
  type RuntimeEvent = RuntimeEvent;
  type DustRemoval = ();
  type ExistentialDeposit = ConstU128<1>;
  type AccountStore = System;
  type WeightInfo = ();
  type FreezeIdentifier = ();
  type MaxFreezes = ();
  type RuntimeHoldReason = RuntimeHoldReason;
  type RuntimeFreezeReason = RuntimeFreezeReason;
  type DoneSlashHandler = ();
}

pub struct ExchangePalletId;
impl Get<PalletId> for ExchangePalletId {
  fn get() -> PalletId {
    PalletId(*DELAYED_EXCHANGE_PALLET_ID)
  }
}

pub struct NativeAsset;
impl Get<TestAsset> for NativeAsset {
  fn get() -> TestAsset {
    NATIVE
  }
}

pub struct WrappedNativeAsset;
impl Get<TestAsset> for WrappedNativeAsset {
  fn get() -> TestAsset {
    WNATIVE
  }
}

pub struct TestMinRatioChange;
impl Get<Permill> for TestMinRatioChange {
  fn get() -> Permill {
    Permill::from_percent(1)
  }
}

// Flags and clock only. Balances and pools live in storage so that storage layers roll
// them back together with the pallet's own state.
thread_local! {
  static NOW: RefCell<u64> = const { RefCell::new(START_TIME) };
  static OBSERVED_FEE_PRICE: RefCell<Balance> = const { RefCell::new(1) };
  static FROZEN: RefCell<alloc::collections::BTreeSet<TestAsset>> =
    const { RefCell::new(alloc::collections::BTreeSet::new()) };
  static BLOCKED: RefCell<alloc::collections::BTreeSet<AccountId>> =
    const { RefCell::new(alloc::collections::BTreeSet::new()) };
  static UNWRAP_FAILS: RefCell<bool> = const { RefCell::new(false) };
  static ORACLE_PRICE: RefCell<Option<FixedU128>> = const { RefCell::new(None) };
}

pub fn reset_mock_adapters() {
  NOW.with(|n| *n.borrow_mut() = START_TIME);
  OBSERVED_FEE_PRICE.with(|p| *p.borrow_mut() = 1);
  FROZEN.with(|f| f.borrow_mut().clear());
  BLOCKED.with(|b| b.borrow_mut().clear());
  UNWRAP_FAILS.with(|u| *u.borrow_mut() = false);
  ORACLE_PRICE.with(|o| *o.borrow_mut() = None);
}

pub fn now() -> u64 {
  NOW.with(|n| *n.borrow())
}

pub fn set_now(secs: u64) {
  NOW.with(|n| *n.borrow_mut() = secs);
}

pub fn advance_time(secs: u64) {
  NOW.with(|n| *n.borrow_mut() += secs);
}

pub fn set_observed_fee_price(price: Balance) {
  OBSERVED_FEE_PRICE.with(|p| *p.borrow_mut() = price);
}

/// Every transfer of a frozen asset fails.
pub fn set_frozen(asset: TestAsset, frozen: bool) {
  FROZEN.with(|f| {
    if frozen {
      f.borrow_mut().insert(asset);
    } else {
      f.borrow_mut().remove(&asset);
    }
  });
}

/// Every transfer to a blocked account fails.
pub fn set_blocked(who: AccountId, blocked: bool) {
  BLOCKED.with(|b| {
    if blocked {
      b.borrow_mut().insert(who);
    } else {
      b.borrow_mut().remove(&who);
    }
  });
}

pub fn set_unwrap_fails(fails: bool) {
  UNWRAP_FAILS.with(|u| *u.borrow_mut() = fails);
}

pub fn set_oracle_price(price: Option<FixedU128>) {
  ORACLE_PRICE.with(|o| *o.borrow_mut() = price);
}

fn balance_key(who: AccountId, asset: TestAsset) -> Vec<u8> {
  (b"mock:balance", who, asset).encode()
}

fn pool_key(pair: &AssetPair<TestAsset>) -> Vec<u8> {
  (b"mock:pool", pair).encode()
}

fn supply_key(lp_asset: TestAsset) -> Vec<u8> {
  (b"mock:supply", lp_asset).encode()
}

pub fn set_asset_balance(who: AccountId, asset: TestAsset, amount: Balance) {
  unhashed::put(&balance_key(who, asset), &amount);
}

/// Balance of any asset, native included.
pub fn balance_of(who: AccountId, asset: TestAsset) -> Balance {
  MockAssetOps::balance(&who, asset)
}

pub fn lp_supply(lp_asset: TestAsset) -> Balance {
  unhashed::get_or_default(&supply_key(lp_asset))
}

fn set_lp_supply(lp_asset: TestAsset, supply: Balance) {
  unhashed::put(&supply_key(lp_asset), &supply);
}

/// Registers a pool holding the given reserves. The initial LP supply is split between
/// `LP_RESERVE` and `INITIAL_LP` for ALICE.
pub fn create_pool(
  asset_a: TestAsset,
  asset_b: TestAsset,
  lp_asset: TestAsset,
  account: AccountId,
  reserve_a: Balance,
  reserve_b: Balance,
) {
  let pair = AssetPair::new(asset_a, asset_b).unwrap();
  unhashed::put(&pool_key(&pair), &(lp_asset, account));
  set_asset_balance(account, asset_a, reserve_a);
  set_asset_balance(account, asset_b, reserve_b);
  let supply = integer_sqrt(reserve_a.saturating_mul(reserve_b));
  set_lp_supply(lp_asset, supply);
  set_asset_balance(ALICE, lp_asset, INITIAL_LP);
  set_asset_balance(LP_RESERVE, lp_asset, supply - INITIAL_LP);
}

fn pool(pair: &AssetPair<TestAsset>) -> Option<(TestAsset, AccountId)> {
  unhashed::get(&pool_key(pair))
}

pub fn pool_account(pair: &AssetPair<TestAsset>) -> Option<AccountId> {
  pool(pair).map(|(_, account)| account)
}

pub struct MockAssetOps;

impl AssetOps<AccountId, TestAsset, Balance> for MockAssetOps {
  fn transfer(
    from: &AccountId,
    to: &AccountId,
    asset: TestAsset,
    amount: Balance,
  ) -> Result<(), DispatchError> {
    if FROZEN.with(|f| f.borrow().contains(&asset)) {
      return Err(DispatchError::Token(TokenError::Frozen));
    }
    if BLOCKED.with(|b| b.borrow().contains(to)) {
      return Err(DispatchError::Token(TokenError::Blocked));
    }
    match asset {
      AssetKind::Native => <Balances as Currency<AccountId>>::transfer(
        from,
        to,
        amount,
        ExistenceRequirement::AllowDeath,
      ),
      _ => {
        let src = Self::balance(from, asset);
        if src < amount {
          return Err(DispatchError::Token(TokenError::FundsUnavailable));
        }
        set_asset_balance(*from, asset, src - amount);
        let dst = Self::balance(to, asset);
        set_asset_balance(*to, asset, dst + amount);
        Ok(())
      },
    }
  }

  fn balance(who: &AccountId, asset: TestAsset) -> Balance {
    match asset {
      AssetKind::Native => <Balances as Currency<AccountId>>::free_balance(who),
      _ => unhashed::get_or_default(&balance_key(*who, asset)),
    }
  }
}

/// Wrapped native is backed one to one by native held in `WRAPPER`.
pub struct MockNativeWrapper;

impl NativeWrapper<AccountId, Balance> for MockNativeWrapper {
  fn wrap(who: &AccountId, amount: Balance) -> Result<(), DispatchError> {
    MockAssetOps::transfer(who, &WRAPPER, NATIVE, amount)?;
    let held = MockAssetOps::balance(who, WNATIVE);
    set_asset_balance(*who, WNATIVE, held + amount);
    Ok(())
  }

  fn unwrap(who: &AccountId, amount: Balance) -> Result<(), DispatchError> {
    if UNWRAP_FAILS.with(|u| *u.borrow()) {
      return Err(DispatchError::Other("UnwrapDisabled"));
    }
    let held = MockAssetOps::balance(who, WNATIVE);
    if held < amount {
      return Err(DispatchError::Token(TokenError::FundsUnavailable));
    }
    set_asset_balance(*who, WNATIVE, held - amount);
    MockAssetOps::transfer(&WRAPPER, who, NATIVE, amount)
  }
}

/// Constant product pools without swap fees.
pub struct MockPoolOps;

impl MockPoolOps {
  fn oriented_reserves(
    asset_in: TestAsset,
    asset_out: TestAsset,
  ) -> Result<(Balance, Balance, AccountId), DispatchError> {
    let pair = AssetPair::new(asset_in, asset_out).ok_or(DispatchError::Other("SameAsset"))?;
    let (_, account) = pool(&pair).ok_or(DispatchError::Other("NoPool"))?;
    Ok((
      MockAssetOps::balance(&account, asset_in),
      MockAssetOps::balance(&account, asset_out),
      account,
    ))
  }
}

impl PoolOps<AccountId, TestAsset, Balance> for MockPoolOps {
  fn lp_asset(pair: &AssetPair<TestAsset>) -> Option<TestAsset> {
    pool(pair).map(|(lp_asset, _)| lp_asset)
  }

  fn reserves(pair: &AssetPair<TestAsset>) -> Option<(Balance, Balance)> {
    let (_, account) = pool(pair)?;
    let first = MockAssetOps::balance(&account, pair.first());
    let second = MockAssetOps::balance(&account, pair.second());
    (first > 0 && second > 0).then_some((first, second))
  }

  fn spot_price(pair: &AssetPair<TestAsset>) -> Option<FixedU128> {
    if let Some(price) = ORACLE_PRICE.with(|o| *o.borrow()) {
      return Some(price);
    }
    let (first, second) = Self::reserves(pair)?;
    FixedU128::checked_from_rational(second, first)
  }

  fn sync_with_oracle(pair: &AssetPair<TestAsset>) -> Result<(), DispatchError> {
    pool(pair).map(|_| ()).ok_or(DispatchError::Other("NoPool"))
  }

  fn mint(
    who: &AccountId,
    pair: &AssetPair<TestAsset>,
    amount_first: Balance,
    amount_second: Balance,
    to: &AccountId,
  ) -> Result<(Balance, Balance, Balance), DispatchError> {
    let (lp_asset, account) = pool(pair).ok_or(DispatchError::Other("NoPool"))?;
    let (reserve_first, reserve_second) =
      Self::reserves(pair).ok_or(DispatchError::Other("EmptyPool"))?;
    let supply = lp_supply(lp_asset);

    let optimal_second = amount_first * reserve_second / reserve_first;
    let (used_first, used_second) = if optimal_second <= amount_second {
      (amount_first, optimal_second)
    } else {
      (amount_second * reserve_first / reserve_second, amount_second)
    };
    let liquidity = core::cmp::min(
      used_first * supply / reserve_first,
      used_second * supply / reserve_second,
    );
    if liquidity == 0 {
      return Err(DispatchError::Other("InsufficientLiquidityMinted"));
    }

    MockAssetOps::transfer(who, &account, pair.first(), used_first)?;
    MockAssetOps::transfer(who, &account, pair.second(), used_second)?;
    let held = MockAssetOps::balance(to, lp_asset);
    set_asset_balance(*to, lp_asset, held + liquidity);
    set_lp_supply(lp_asset, supply + liquidity);
    Ok((used_first, used_second, liquidity))
  }

  fn burn(
    who: &AccountId,
    pair: &AssetPair<TestAsset>,
    liquidity: Balance,
    to: &AccountId,
  ) -> Result<(Balance, Balance), DispatchError> {
    let (lp_asset, account) = pool(pair).ok_or(DispatchError::Other("NoPool"))?;
    let (reserve_first, reserve_second) =
      Self::reserves(pair).ok_or(DispatchError::Other("EmptyPool"))?;
    let supply = lp_supply(lp_asset);
    let held = MockAssetOps::balance(who, lp_asset);
    if held < liquidity || supply == 0 {
      return Err(DispatchError::Token(TokenError::FundsUnavailable));
    }

    let amount_first = liquidity * reserve_first / supply;
    let amount_second = liquidity * reserve_second / supply;
    set_asset_balance(*who, lp_asset, held - liquidity);
    set_lp_supply(lp_asset, supply - liquidity);
    MockAssetOps::transfer(&account, to, pair.first(), amount_first)?;
    MockAssetOps::transfer(&account, to, pair.second(), amount_second)?;
    Ok((amount_first, amount_second))
  }

  fn swap(
    who: &AccountId,
    asset_in: TestAsset,
    asset_out: TestAsset,
    amount_in: Balance,
    amount_out: Balance,
    to: &AccountId,
  ) -> Result<(), DispatchError> {
    let (_, _, account) = Self::oriented_reserves(asset_in, asset_out)?;
    if amount_out > Self::swap_amount_out(asset_in, asset_out, amount_in)? {
      return Err(DispatchError::Other("InvariantViolated"));
    }
    MockAssetOps::transfer(who, &account, asset_in, amount_in)?;
    MockAssetOps::transfer(&account, to, asset_out, amount_out)
  }

  fn swap_amount_out(
    asset_in: TestAsset,
    asset_out: TestAsset,
    amount_in: Balance,
  ) -> Result<Balance, DispatchError> {
    let (reserve_in, reserve_out, _) = Self::oriented_reserves(asset_in, asset_out)?;
    Ok(amount_in.saturating_mul(reserve_out) / reserve_in.saturating_add(amount_in))
  }

  fn swap_amount_in(
    asset_in: TestAsset,
    asset_out: TestAsset,
    amount_out: Balance,
  ) -> Result<Balance, DispatchError> {
    let (reserve_in, reserve_out, _) = Self::oriented_reserves(asset_in, asset_out)?;
    if amount_out >= reserve_out {
      return Err(DispatchError::Other("InsufficientLiquidity"));
    }
    Ok(
      reserve_in
        .saturating_mul(amount_out)
        .div_ceil(reserve_out - amount_out),
    )
  }
}

fn integer_sqrt(n: u128) -> u128 {
  if n == 0 {
    return 0;
  }
  let mut x = n;
  let mut y = x.div_ceil(2);
  while y < x {
    x = y;
    y = (x + n / x) / 2;
  }
  x
}

pub struct MockTime;
impl UnixTime for MockTime {
  fn now() -> core::time::Duration {
    core::time::Duration::from_secs(now())
  }
}

pub struct ObservedFeePrice;
impl Get<Balance> for ObservedFeePrice {
  fn get() -> Balance {
    OBSERVED_FEE_PRICE.with(|p| *p.borrow())
  }
}

/// One fee unit per thousand units of reference time.
pub struct TestWeightToFeeUnits;
impl polkadot_sdk::sp_weights::WeightToFee for TestWeightToFeeUnits {
  type Balance = u64;
  fn weight_to_fee(weight: &polkadot_sdk::sp_weights::Weight) -> Self::Balance {
    weight.ref_time() / 1_000
  }
}

#[cfg(feature = "runtime-benchmarks")]
pub struct MockBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl crate::BenchmarkHelper<AccountId, TestAsset, Balance> for MockBenchmarkHelper {
  fn setup_pool() -> (TestAsset, TestAsset) {
    if MockPoolOps::lp_asset(&AssetPair::new(TOKEN_A, TOKEN_B).unwrap()).is_none() {
      create_pool(TOKEN_A, TOKEN_B, LP_AB, POOL_AB, POOL_RESERVE, POOL_RESERVE);
    }
    (TOKEN_A, TOKEN_B)
  }

  fn fund(who: &AccountId, asset: TestAsset, amount: Balance) {
    match asset {
      AssetKind::Native => {
        let _ = <Balances as Currency<AccountId>>::deposit_creating(who, amount);
      },
      _ => set_asset_balance(*who, asset, MockAssetOps::balance(who, asset) + amount),
    }
  }

  fn advance_time(seconds: u64) {
    advance_time(seconds);
  }
}

impl pallet_delayed_exchange::Config for Test {
  type AssetId = TestAsset;
  type Balance = Balance;
  type NativeAssetId = NativeAsset;
  type WrappedNativeAssetId = WrappedNativeAsset;
  type AssetOps = MockAssetOps;
  type NativeWrapper = MockNativeWrapper;
  type PoolOps = MockPoolOps;
  type UnixTime = MockTime;
  type ObservedFeePrice = ObservedFeePrice;
  type WeightToFeeUnits = TestWeightToFeeUnits;
  type AdminOrigin = EnsureRoot<AccountId>;
  type PalletId = ExchangePalletId;
  type DefaultDelay = ConstU64<DEFAULT_DELAY>;
  type OrderCancelTime = ConstU64<ORDER_CANCEL_TIME>;
  type RefundEscapeTime = ConstU64<REFUND_ESCAPE_TIME>;
  type BaseExecutionCost = ConstU64<BASE_COST>;
  type DefaultFeePriceInertia = ConstU64<DEFAULT_FEE_PRICE_INERTIA>;
  type DefaultMaxFeePriceImpact = ConstU64<DEFAULT_MAX_FEE_PRICE_IMPACT>;
  type DefaultMinFeeLimit = ConstU64<20_000>;
  type DefaultMaxFeeLimit = ConstU64<1_000_000>;
  type DefaultMinRatioChange = TestMinRatioChange;
  type WeightInfo = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = MockBenchmarkHelper;
}

pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  let mut t = polkadot_sdk::frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();

  polkadot_sdk::pallet_balances::GenesisConfig::<Test> {
    balances: vec![
      (ALICE, INITIAL_NATIVE),
      (BOB, INITIAL_NATIVE),
      (KEEPER, INITIAL_NATIVE),
      (CHARLIE, INITIAL_NATIVE),
      (OWNER, INITIAL_NATIVE),
      (WRAPPER, INITIAL_NATIVE),
    ],
    dev_accounts: None,
  }
  .assimilate_storage(&mut t)
  .unwrap();

  pallet_delayed_exchange::GenesisConfig::<Test> {
    owner: Some(OWNER),
    keepers: vec![KEEPER],
    transfer_costs: vec![
      (TOKEN_A, TRANSFER_COST),
      (TOKEN_B, TRANSFER_COST),
      (WNATIVE, TRANSFER_COST),
    ],
    fee_price: 1,
    open_execution: false,
  }
  .assimilate_storage(&mut t)
  .unwrap();

  let mut ext = polkadot_sdk::sp_io::TestExternalities::new(t);
  ext.execute_with(|| {
    reset_mock_adapters();
    polkadot_sdk::frame_system::Pallet::<Test>::set_block_number(1);
    for who in [ALICE, BOB, CHARLIE] {
      set_asset_balance(who, TOKEN_A, INITIAL_TOKENS);
      set_asset_balance(who, TOKEN_B, INITIAL_TOKENS);
      set_asset_balance(who, TOKEN_C, INITIAL_TOKENS);
    }
    create_pool(TOKEN_A, TOKEN_B, LP_AB, POOL_AB, POOL_RESERVE, POOL_RESERVE);
    create_pool(TOKEN_A, WNATIVE, LP_AW, POOL_AW, POOL_RESERVE, POOL_RESERVE);
  });
  ext
}
