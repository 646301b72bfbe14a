#![cfg(feature = "runtime-benchmarks")]

use crate::*;
use frame::prelude::*;
use polkadot_sdk::frame_benchmarking::v2::*;
use polkadot_sdk::frame_system::RawOrigin;
use polkadot_sdk::sp_runtime::{
  FixedU128, Permill,
  traits::{Saturating, Zero},
};
use primitives::{AssetPair, Moment};

struct Setup<T: Config> {
  caller: T::AccountId,
  asset_a: T::AssetId,
  asset_b: T::AssetId,
  value: BalanceOf<T>,
  amount: BalanceOf<T>,
}

/// Funds a caller against a liquid pool with zero transfer costs and no keeper window.
fn setup<T: Config>() -> Setup<T> {
  let caller: T::AccountId = whitelisted_caller();
  let (asset_a, asset_b) = T::BenchmarkHelper::setup_pool();
  TransferCosts::<T>::insert(asset_a, 0);
  TransferCosts::<T>::insert(asset_b, 0);
  BotWindow::<T>::put(0);
  FeePrice::<T>::mutate(|tracker| tracker.price = 1u32.into());

  let value = fee_price::price_units(FeePrice::<T>::get().price, FeeLimits::<T>::get().max);
  let amount: BalanceOf<T> = 1_000_000u32.into();
  let float: BalanceOf<T> = 1_000_000_000u32.into();
  T::BenchmarkHelper::fund(&caller, T::NativeAssetId::get(), value.saturating_add(float));
  T::BenchmarkHelper::fund(&caller, asset_a, amount);
  T::BenchmarkHelper::fund(&caller, asset_b, amount);
  Setup {
    caller,
    asset_a,
    asset_b,
    value,
    amount,
  }
}

fn terms<T: Config>(to: &T::AccountId) -> SubmitTerms<T::AccountId> {
  let now = Pallet::<T>::now();
  SubmitTerms {
    to: to.clone(),
    fee_limit: FeeLimits::<T>::get().max,
    submit_deadline: now,
    execution_deadline: now
      .saturating_add(Pallet::<T>::delay())
      .saturating_add(T::RefundEscapeTime::get()),
  }
}

fn deposit_request<T: Config>(s: &Setup<T>) -> DepositRequestOf<T> {
  DepositRequest {
    asset_a: s.asset_a,
    asset_b: s.asset_b,
    amount_a: s.amount,
    amount_b: s.amount,
    swap: true,
    min_swap_price: FixedU128::from_u32(0),
    max_swap_price: FixedU128::from_u32(1_000),
    wrap: false,
    terms: terms::<T>(&s.caller),
  }
}

fn sell_request<T: Config>(s: &Setup<T>) -> SellRequestOf<T> {
  SellRequest {
    asset_in: s.asset_a,
    asset_out: s.asset_b,
    amount_in: s.amount,
    amount_out_min: Zero::zero(),
    wrap: false,
    unwrap: false,
    terms: terms::<T>(&s.caller),
  }
}

/// Submits a sell and takes it out of the queue, leaving it refund-pending.
fn refund_pending<T: Config>() -> Setup<T> {
  let s = setup::<T>();
  let order_id = Pallet::<T>::do_submit_sell(s.caller.clone(), sell_request::<T>(&s), s.value)
    .expect("sell is submittable");
  Queue::<T>::mutate(|queue| queue.advance(order_id)).expect("order is next due");
  Headers::<T>::remove(order_id);
  s
}

fn now_eligible<T: Config>() {
  T::BenchmarkHelper::advance_time(Pallet::<T>::delay());
}

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn submit_deposit() {
    let s = setup::<T>();
    let request = deposit_request::<T>(&s);
    #[extrinsic_call]
    submit_deposit(RawOrigin::Signed(s.caller.clone()), request, s.value);
    assert_eq!(Pallet::<T>::newest_order_id(), 1);
  }

  #[benchmark]
  fn submit_withdraw() {
    let s = setup::<T>();
    let pair = AssetPair::new(s.asset_a, s.asset_b).expect("distinct assets");
    let lp_asset = T::PoolOps::lp_asset(&pair).expect("pool exists");
    let liquidity: BalanceOf<T> = 1_000u32.into();
    T::BenchmarkHelper::fund(&s.caller, lp_asset, liquidity);
    let request = WithdrawRequest {
      asset_a: s.asset_a,
      asset_b: s.asset_b,
      liquidity,
      amount_a_min: Zero::zero(),
      amount_b_min: Zero::zero(),
      unwrap: false,
      terms: terms::<T>(&s.caller),
    };
    #[extrinsic_call]
    submit_withdraw(RawOrigin::Signed(s.caller.clone()), request, s.value);
    assert_eq!(Pallet::<T>::newest_order_id(), 1);
  }

  #[benchmark]
  fn submit_sell() {
    let s = setup::<T>();
    let request = sell_request::<T>(&s);
    #[extrinsic_call]
    submit_sell(RawOrigin::Signed(s.caller.clone()), request, s.value);
    assert_eq!(Pallet::<T>::newest_order_id(), 1);
  }

  #[benchmark]
  fn submit_buy() {
    let s = setup::<T>();
    let request = BuyRequest {
      asset_in: s.asset_a,
      asset_out: s.asset_b,
      amount_in_max: s.amount,
      amount_out: 1_000u32.into(),
      wrap: false,
      unwrap: false,
      terms: terms::<T>(&s.caller),
    };
    #[extrinsic_call]
    submit_buy(RawOrigin::Signed(s.caller.clone()), request, s.value);
    assert_eq!(Pallet::<T>::newest_order_id(), 1);
  }

  #[benchmark]
  fn execute() {
    let s = setup::<T>();
    Pallet::<T>::do_submit_deposit(s.caller.clone(), deposit_request::<T>(&s), s.value)
      .expect("deposit is submittable");
    now_eligible::<T>();
    #[extrinsic_call]
    execute(RawOrigin::Signed(s.caller.clone()), 1);
    assert_eq!(Pallet::<T>::last_processed_order_id(), 1);
  }

  #[benchmark]
  fn cancel_order() {
    let s = setup::<T>();
    Pallet::<T>::do_submit_deposit(s.caller.clone(), deposit_request::<T>(&s), s.value)
      .expect("deposit is submittable");
    T::BenchmarkHelper::advance_time(
      Pallet::<T>::delay().saturating_add(T::OrderCancelTime::get()),
    );
    #[extrinsic_call]
    cancel_order(RawOrigin::Signed(s.caller.clone()), 1);
    assert_eq!(Pallet::<T>::order_status(1), OrderStatus::Settled);
  }

  #[benchmark]
  fn retry_refund() {
    let s = refund_pending::<T>();
    #[extrinsic_call]
    retry_refund(RawOrigin::Signed(s.caller.clone()), 1);
    assert_eq!(Pallet::<T>::order_status(1), OrderStatus::Settled);
  }

  #[benchmark]
  fn escape_refund() {
    let s = refund_pending::<T>();
    Owner::<T>::put(s.caller.clone());
    T::BenchmarkHelper::advance_time(
      Pallet::<T>::delay().saturating_add(T::RefundEscapeTime::get()),
    );
    #[extrinsic_call]
    escape_refund(RawOrigin::Root, 1);
    assert_eq!(Pallet::<T>::order_status(1), OrderStatus::Settled);
  }

  #[benchmark]
  fn set_owner() {
    let owner: T::AccountId = whitelisted_caller();
    #[extrinsic_call]
    set_owner(RawOrigin::Root, owner.clone());
    assert_eq!(Owner::<T>::get(), Some(owner));
  }

  #[benchmark]
  fn set_delay() {
    let delay: Moment = 600;
    #[extrinsic_call]
    set_delay(RawOrigin::Root, delay);
    assert_eq!(Pallet::<T>::delay(), delay);
  }

  #[benchmark]
  fn set_bot_window() {
    #[extrinsic_call]
    set_bot_window(RawOrigin::Root, 600);
    assert_eq!(Pallet::<T>::bot_window(), 600);
  }

  #[benchmark]
  fn set_fee_price() {
    let price: BalanceOf<T> = 7u32.into();
    #[extrinsic_call]
    set_fee_price(RawOrigin::Root, price);
    assert_eq!(FeePrice::<T>::get().price, price);
  }

  #[benchmark]
  fn set_fee_price_params() {
    #[extrinsic_call]
    set_fee_price_params(RawOrigin::Root, 8, 2);
    assert_eq!(FeePrice::<T>::get().inertia, 8);
  }

  #[benchmark]
  fn set_fee_limit_bounds() {
    #[extrinsic_call]
    set_fee_limit_bounds(RawOrigin::Root, 1, 2);
    assert_eq!(FeeLimits::<T>::get(), FeeLimitBounds { min: 1, max: 2 });
  }

  #[benchmark]
  fn set_keeper() {
    let keeper: T::AccountId = whitelisted_caller();
    #[extrinsic_call]
    set_keeper(RawOrigin::Root, keeper.clone(), true);
    assert!(Keepers::<T>::get(&keeper));
  }

  #[benchmark]
  fn set_open_execution() {
    #[extrinsic_call]
    set_open_execution(RawOrigin::Root, true);
    assert!(OpenExecution::<T>::get());
  }

  #[benchmark]
  fn set_transfer_cost() {
    let asset = T::NativeAssetId::get();
    #[extrinsic_call]
    set_transfer_cost(RawOrigin::Root, asset, 1_000);
    assert_eq!(TransferCosts::<T>::get(asset), Some(1_000));
  }

  #[benchmark]
  fn set_order_kind_disabled() {
    let (asset_a, asset_b) = T::BenchmarkHelper::setup_pool();
    #[extrinsic_call]
    set_order_kind_disabled(RawOrigin::Root, asset_a, asset_b, OrderKind::Buy, true);
    let pair = AssetPair::new(asset_a, asset_b).expect("distinct assets");
    assert!(DisabledKinds::<T>::get(pair).contains(OrderKind::Buy));
  }

  #[benchmark]
  fn set_min_ratio_change() {
    let threshold = Permill::from_percent(5);
    #[extrinsic_call]
    set_min_ratio_change(RawOrigin::Root, threshold);
    assert_eq!(MinRatioChangeToSwap::<T>::get(), threshold);
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
