//! Submission, execution and refund flows.

use crate::{
  AssetOps, LOG_TARGET, NativeWrapper, PoolOps, WeightInfo,
  fee_price::price_units,
  pallet::*,
  queue::OrderId,
  schedule::{self, ExecutionWindow},
  types::*,
};
use alloc::vec::Vec;
use codec::Decode;
use frame::prelude::*;
use polkadot_sdk::{
  frame_support::storage::with_storage_layer,
  sp_runtime::{
    FixedPointNumber, FixedU128,
    traits::{CheckedAdd, CheckedDiv, Saturating, TrailingZeroInput, Zero},
  },
  sp_weights::WeightToFee,
};
use primitives::{AssetPair, CompactAmount, Moment};

/// Native value attached to a submission, split into what funds wrapped principal and what
/// stays escrowed for fees.
struct Prepaid<Balance> {
  value: Balance,
  wrapped: Balance,
}

impl<T: Config> Pallet<T> {
  pub(crate) fn do_submit_deposit(
    who: T::AccountId,
    request: DepositRequestOf<T>,
    value: BalanceOf<T>,
  ) -> Result<OrderId, DispatchError> {
    ensure!(
      !request.amount_a.is_zero() || !request.amount_b.is_zero(),
      Error::<T>::ZeroAmount
    );
    let pair =
      AssetPair::new(request.asset_a, request.asset_b).ok_or(Error::<T>::IdenticalAssets)?;
    ensure!(
      request.min_swap_price <= request.max_swap_price,
      Error::<T>::InvalidPriceBounds
    );
    let min_swap_price = CompactAmount::try_from(request.min_swap_price.into_inner())
      .map_err(|_| Error::<T>::PriceNotRepresentable)?;
    let max_swap_price = match request.max_swap_price.into_inner() {
      u128::MAX => None,
      inner => Some(
        CompactAmount::try_from(inner).map_err(|_| Error::<T>::PriceNotRepresentable)?,
      ),
    };

    let wrapped_native = T::WrappedNativeAssetId::get();
    let wrapped = if request.wrap {
      if request.asset_a == wrapped_native {
        request.amount_a
      } else if request.asset_b == wrapped_native {
        request.amount_b
      } else {
        return Err(Error::<T>::WrapNotApplicable.into());
      }
    } else {
      Zero::zero()
    };

    let terms = Self::prepare_terms(
      &who,
      &request.terms,
      &pair,
      OrderKind::Deposit,
      Prepaid { value, wrapped },
      request.wrap,
    )?;
    let ratio_at_submission =
      Self::reserve_ratio(request.asset_a, request.asset_b).unwrap_or_default();

    Self::collect_principal(&who, request.asset_a, request.amount_a, request.wrap)?;
    Self::collect_principal(&who, request.asset_b, request.amount_b, request.wrap)?;

    Self::enqueue(OrderPayload::Deposit(DepositOrder {
      terms,
      asset_a: request.asset_a,
      asset_b: request.asset_b,
      amount_a: request.amount_a,
      amount_b: request.amount_b,
      swap: request.swap,
      min_swap_price,
      max_swap_price,
      ratio_at_submission,
    }))
  }

  pub(crate) fn do_submit_withdraw(
    who: T::AccountId,
    request: WithdrawRequestOf<T>,
    value: BalanceOf<T>,
  ) -> Result<OrderId, DispatchError> {
    ensure!(!request.liquidity.is_zero(), Error::<T>::ZeroAmount);
    let pair =
      AssetPair::new(request.asset_a, request.asset_b).ok_or(Error::<T>::IdenticalAssets)?;
    let terms = Self::prepare_terms(
      &who,
      &request.terms,
      &pair,
      OrderKind::Withdraw,
      Prepaid {
        value,
        wrapped: Zero::zero(),
      },
      request.unwrap,
    )?;
    let lp_asset = T::PoolOps::lp_asset(&pair).ok_or(Error::<T>::PoolNotFound)?;

    Self::collect_principal(&who, lp_asset, request.liquidity, false)?;

    Self::enqueue(OrderPayload::Withdraw(WithdrawOrder {
      terms,
      asset_a: request.asset_a,
      asset_b: request.asset_b,
      lp_asset,
      liquidity: request.liquidity,
      amount_a_min: request.amount_a_min,
      amount_b_min: request.amount_b_min,
    }))
  }

  pub(crate) fn do_submit_sell(
    who: T::AccountId,
    request: SellRequestOf<T>,
    value: BalanceOf<T>,
  ) -> Result<OrderId, DispatchError> {
    ensure!(!request.amount_in.is_zero(), Error::<T>::ZeroAmount);
    let pair =
      AssetPair::new(request.asset_in, request.asset_out).ok_or(Error::<T>::IdenticalAssets)?;
    let wrapped = Self::wrapped_input(request.wrap, request.asset_in, request.amount_in)?;
    let terms = Self::prepare_terms(
      &who,
      &request.terms,
      &pair,
      OrderKind::Sell,
      Prepaid { value, wrapped },
      request.wrap || request.unwrap,
    )?;

    Self::collect_principal(&who, request.asset_in, request.amount_in, request.wrap)?;

    Self::enqueue(OrderPayload::Sell(SellOrder {
      terms,
      asset_in: request.asset_in,
      asset_out: request.asset_out,
      amount_in: request.amount_in,
      amount_out_min: request.amount_out_min,
    }))
  }

  pub(crate) fn do_submit_buy(
    who: T::AccountId,
    request: BuyRequestOf<T>,
    value: BalanceOf<T>,
  ) -> Result<OrderId, DispatchError> {
    ensure!(
      !request.amount_out.is_zero() && !request.amount_in_max.is_zero(),
      Error::<T>::ZeroAmount
    );
    let pair =
      AssetPair::new(request.asset_in, request.asset_out).ok_or(Error::<T>::IdenticalAssets)?;
    let wrapped = Self::wrapped_input(request.wrap, request.asset_in, request.amount_in_max)?;
    let terms = Self::prepare_terms(
      &who,
      &request.terms,
      &pair,
      OrderKind::Buy,
      Prepaid { value, wrapped },
      request.wrap || request.unwrap,
    )?;

    Self::collect_principal(&who, request.asset_in, request.amount_in_max, request.wrap)?;

    Self::enqueue(OrderPayload::Buy(BuyOrder {
      terms,
      asset_in: request.asset_in,
      asset_out: request.asset_out,
      amount_in_max: request.amount_in_max,
      amount_out: request.amount_out,
    }))
  }

  fn wrapped_input(
    wrap: bool,
    asset_in: T::AssetId,
    amount_in: BalanceOf<T>,
  ) -> Result<BalanceOf<T>, DispatchError> {
    if !wrap {
      return Ok(Zero::zero());
    }
    ensure!(
      asset_in == T::WrappedNativeAssetId::get(),
      Error::<T>::WrapNotApplicable
    );
    Ok(amount_in)
  }

  /// Validates the parts of a submission shared by all kinds, takes the attached native
  /// value into escrow and wraps the native-funded principal.
  fn prepare_terms(
    who: &T::AccountId,
    request: &SubmitTerms<T::AccountId>,
    pair: &AssetPair<T::AssetId>,
    kind: OrderKind,
    prepaid: Prepaid<BalanceOf<T>>,
    unwrap: bool,
  ) -> Result<OrderTermsOf<T>, DispatchError> {
    Self::ensure_valid_destination(&request.to)?;
    ensure!(
      FeeLimits::<T>::get().contains(request.fee_limit),
      Error::<T>::FeeLimitOutOfBounds
    );
    let floor = Self::execution_cost_floor(pair).ok_or(Error::<T>::TransferCostNotSet)?;
    ensure!(
      request.fee_limit >= floor,
      Error::<T>::FeeLimitBelowExecutionCost
    );
    ensure!(
      T::PoolOps::lp_asset(pair).is_some(),
      Error::<T>::PoolNotFound
    );
    ensure!(
      !DisabledKinds::<T>::get(pair).contains(kind),
      Error::<T>::OrderKindDisabled
    );

    let now = Self::now();
    let eligible_at = schedule::schedule_submission(
      now,
      Self::delay(),
      request.submit_deadline,
      request.execution_deadline,
    )
    .map_err(Error::<T>::from)?;

    let tracker = FeePrice::<T>::get();
    let fee_price = tracker.price;
    let required = tracker
      .cost_of(request.fee_limit)
      .checked_add(&prepaid.wrapped)
      .ok_or(Error::<T>::InsufficientPrepaidValue)?;
    ensure!(prepaid.value >= required, Error::<T>::InsufficientPrepaidValue);

    let account = Self::account_id();
    if !prepaid.value.is_zero() {
      T::AssetOps::transfer(who, &account, T::NativeAssetId::get(), prepaid.value)?;
    }
    if !prepaid.wrapped.is_zero() {
      T::NativeWrapper::wrap(&account, prepaid.wrapped)?;
    }

    Ok(OrderTerms {
      submitter: who.clone(),
      to: request.to.clone(),
      fee_limit: request.fee_limit,
      fee_price,
      escrow: prepaid.value - prepaid.wrapped,
      submitted_at: now,
      submit_deadline: request.submit_deadline,
      eligible_at,
      deadline: request.execution_deadline,
      unwrap,
    })
  }

  /// Moves a principal leg from the submitter into escrow. Wrapped native legs funded by
  /// the attached value are already held.
  fn collect_principal(
    who: &T::AccountId,
    asset: T::AssetId,
    amount: BalanceOf<T>,
    wrap: bool,
  ) -> DispatchResult {
    if amount.is_zero() || (wrap && asset == T::WrappedNativeAssetId::get()) {
      return Ok(());
    }
    T::AssetOps::transfer(who, &Self::account_id(), asset, amount)
  }

  fn ensure_valid_destination(to: &T::AccountId) -> DispatchResult {
    let zero = T::AccountId::decode(&mut TrailingZeroInput::zeroes()).ok();
    ensure!(zero.as_ref() != Some(to), Error::<T>::InvalidDestination);
    ensure!(*to != Self::account_id(), Error::<T>::InvalidDestination);
    Ok(())
  }

  fn enqueue(payload: OrderPayloadOf<T>) -> Result<OrderId, DispatchError> {
    let kind = payload.kind();
    let eligible_at = payload.terms().eligible_at;
    let fee_price = payload.terms().fee_price;

    let order_id = Queue::<T>::try_mutate(|queue| queue.enqueue()).map_err(Error::<T>::from)?;
    Headers::<T>::insert(order_id, OrderHeader { kind, eligible_at });
    let event = match &payload {
      OrderPayload::Deposit(_) => Event::DepositEnqueued {
        order_id,
        eligible_at,
        fee_price,
      },
      OrderPayload::Withdraw(_) => Event::WithdrawEnqueued {
        order_id,
        eligible_at,
        fee_price,
      },
      OrderPayload::Sell(_) => Event::SellEnqueued {
        order_id,
        eligible_at,
        fee_price,
      },
      OrderPayload::Buy(_) => Event::BuyEnqueued {
        order_id,
        eligible_at,
        fee_price,
      },
    };
    Payloads::<T>::insert(order_id, payload);

    Self::deposit_event(event);
    Ok(order_id)
  }

  /// Base cost plus the transfer cost of both pool assets. `None` if a cost is missing.
  pub fn execution_cost_floor(pair: &AssetPair<T::AssetId>) -> Option<u64> {
    let first = TransferCosts::<T>::get(pair.first())?;
    let second = TransferCosts::<T>::get(pair.second())?;
    Some(
      T::BaseExecutionCost::get()
        .saturating_add(first)
        .saturating_add(second),
    )
  }

  /// Fee units reimbursed to the executor: the floor plus the metered execution weight,
  /// capped by the order's budget.
  pub fn keeper_fee_units(fee_limit: u64, floor: u64) -> u64 {
    let metered = T::WeightToFeeUnits::weight_to_fee(&T::WeightInfo::execute());
    floor.saturating_add(metered).min(fee_limit)
  }

  pub(crate) fn do_execute(caller: T::AccountId, order_id: OrderId) -> DispatchResult {
    let now = Self::now();
    let mut queue = Queue::<T>::get();
    ensure!(
      queue.next_due() == Some(order_id),
      Error::<T>::OrderOutOfSequence
    );
    let header = Headers::<T>::get(order_id);
    ensure!(header.kind != OrderKind::Empty, Error::<T>::OrderNotFound);
    let payload = Payloads::<T>::get(order_id).ok_or(Error::<T>::OrderNotFound)?;
    ensure!(payload.kind() == header.kind, Error::<T>::OrderKindMismatch);

    ExecutionWindow::new(header.eligible_at, Self::bot_window())
      .authorize(now, Self::is_keeper(&caller))
      .map_err(Error::<T>::from)?;

    queue.advance(order_id).map_err(Error::<T>::from)?;
    Queue::<T>::put(queue);
    Headers::<T>::remove(order_id);

    let outcome = with_storage_layer(|| Self::apply(&payload, now));

    let terms = payload.terms();
    let (fee_spent, refunded_to_submitter) = Self::settle_fees(&caller, terms, &payload)?;

    match outcome {
      Ok(()) => {
        Payloads::<T>::remove(order_id);
        Self::deposit_event(Event::OrderExecuted {
          order_id,
          success: true,
          error: None,
          fee_spent,
          refunded_to_submitter,
        });
      },
      Err(error) => {
        log::debug!(
          target: LOG_TARGET,
          "order {} failed: {:?}",
          order_id,
          error
        );
        Self::deposit_event(Event::OrderExecuted {
          order_id,
          success: false,
          error: Some(error),
          fee_spent,
          refunded_to_submitter,
        });
        if Self::refund_principal(order_id, &payload, &terms.to).is_ok() {
          Payloads::<T>::remove(order_id);
        }
      },
    }

    let fee_price = FeePrice::<T>::mutate(|tracker| tracker.observe(T::ObservedFeePrice::get()));
    log::debug!(target: LOG_TARGET, "fee price now {:?}", fee_price);
    Ok(())
  }

  /// Pays the executor from escrow and returns the rest to the submitter best-effort.
  fn settle_fees(
    caller: &T::AccountId,
    terms: &OrderTermsOf<T>,
    payload: &OrderPayloadOf<T>,
  ) -> Result<(BalanceOf<T>, BalanceOf<T>), DispatchError> {
    let floor = payload
      .pair()
      .and_then(|pair| Self::execution_cost_floor(&pair))
      .unwrap_or_else(T::BaseExecutionCost::get);
    let units = Self::keeper_fee_units(terms.fee_limit, floor);
    let fee = price_units(terms.fee_price, units).min(terms.escrow);
    if !fee.is_zero() {
      T::AssetOps::transfer(&Self::account_id(), caller, T::NativeAssetId::get(), fee)?;
    }
    let refunded = Self::refund_native(&terms.submitter, terms.escrow - fee);
    Ok((fee, refunded))
  }

  /// Best-effort native payment from escrow. Returns the amount actually paid.
  fn refund_native(to: &T::AccountId, amount: BalanceOf<T>) -> BalanceOf<T> {
    if amount.is_zero() {
      return amount;
    }
    let result = with_storage_layer(|| {
      T::AssetOps::transfer(&Self::account_id(), to, T::NativeAssetId::get(), amount)
    });
    let success = result.is_ok();
    if let Err(error) = result {
      log::warn!(
        target: LOG_TARGET,
        "native refund of {:?} to {:?} failed: {:?}",
        amount,
        to,
        error
      );
    }
    Self::deposit_event(Event::NativeRefund {
      to: to.clone(),
      success,
      amount,
    });
    if success { amount } else { Zero::zero() }
  }

  /// Returns every principal leg to `to` atomically. On failure nothing moves and one
  /// `RefundFailed` is emitted per leg.
  fn refund_principal(
    order_id: OrderId,
    payload: &OrderPayloadOf<T>,
    to: &T::AccountId,
  ) -> DispatchResult {
    let legs = payload.principal();
    let unwrap = payload.terms().unwrap;
    let result = with_storage_layer(|| -> DispatchResult {
      for (asset, amount) in legs.iter() {
        Self::deliver(*asset, *amount, to, unwrap)?;
      }
      Ok(())
    });
    if let Err(error) = result {
      log::warn!(
        target: LOG_TARGET,
        "refund of order {} to {:?} failed: {:?}",
        order_id,
        to,
        error
      );
      for (asset, amount) in legs {
        Self::deposit_event(Event::RefundFailed {
          order_id,
          to: to.clone(),
          asset,
          amount,
          error,
        });
      }
    }
    result
  }

  /// Sends `amount` of `asset` from escrow to `to`. With `unwrap`, the wrapped native asset
  /// is delivered as native currency, falling back to the wrapped asset if unwrapping fails.
  fn deliver(
    asset: T::AssetId,
    amount: BalanceOf<T>,
    to: &T::AccountId,
    unwrap: bool,
  ) -> DispatchResult {
    if amount.is_zero() {
      return Ok(());
    }
    let account = Self::account_id();
    if unwrap && asset == T::WrappedNativeAssetId::get() {
      let unwrapped = with_storage_layer(|| {
        T::NativeWrapper::unwrap(&account, amount)?;
        T::AssetOps::transfer(&account, to, T::NativeAssetId::get(), amount)
      });
      match unwrapped {
        Ok(()) => return Ok(()),
        Err(error) => {
          log::warn!(
            target: LOG_TARGET,
            "unwrap of {:?} for {:?} failed: {:?}",
            amount,
            to,
            error
          );
          Self::deposit_event(Event::UnwrapFailed {
            to: to.clone(),
            amount,
          });
        },
      }
    }
    T::AssetOps::transfer(&account, to, asset, amount)
  }

  fn apply(payload: &OrderPayloadOf<T>, now: Moment) -> DispatchResult {
    ensure!(
      !schedule::is_expired(now, payload.terms().deadline),
      Error::<T>::OrderExpired
    );
    let pair = payload.pair().ok_or(Error::<T>::IdenticalAssets)?;
    T::PoolOps::sync_with_oracle(&pair)?;
    match payload {
      OrderPayload::Deposit(order) => Self::apply_deposit(order, &pair),
      OrderPayload::Withdraw(order) => Self::apply_withdraw(order, &pair),
      OrderPayload::Sell(order) => Self::apply_sell(order),
      OrderPayload::Buy(order) => Self::apply_buy(order),
    }
  }

  fn apply_deposit(order: &DepositOrderOf<T>, pair: &AssetPair<T::AssetId>) -> DispatchResult {
    let account = Self::account_id();
    let (mut amount_a, mut amount_b) = (order.amount_a, order.amount_b);

    if order.swap && Self::ratio_moved(order) {
      let price = Self::oracle_price(order.asset_a, order.asset_b)
        .ok_or(Error::<T>::PriceUnavailable)?;
      let min = Self::decode_price(&order.min_swap_price)?;
      let below_max = match &order.max_swap_price {
        Some(max) => price <= Self::decode_price(max)?,
        None => true,
      };
      ensure!(price >= min && below_max, Error::<T>::PriceOutOfBounds);
      (amount_a, amount_b) = Self::rebalance(order.asset_a, order.asset_b, amount_a, amount_b)?;
    }

    let a_first = pair.is_first(&order.asset_a);
    let (first, second) = if a_first {
      (amount_a, amount_b)
    } else {
      (amount_b, amount_a)
    };
    let (used_first, used_second, _liquidity) =
      T::PoolOps::mint(&account, pair, first, second, &order.terms.to)?;
    let (used_a, used_b) = if a_first {
      (used_first, used_second)
    } else {
      (used_second, used_first)
    };

    let unwrap = order.terms.unwrap;
    Self::deliver(
      order.asset_a,
      amount_a.saturating_sub(used_a),
      &order.terms.to,
      unwrap,
    )?;
    Self::deliver(
      order.asset_b,
      amount_b.saturating_sub(used_b),
      &order.terms.to,
      unwrap,
    )
  }

  /// Whether the pool ratio drifted enough since submission to justify a rebalancing swap.
  fn ratio_moved(order: &DepositOrderOf<T>) -> bool {
    let Some(current) = Self::reserve_ratio(order.asset_a, order.asset_b) else {
      return false;
    };
    let recorded = order.ratio_at_submission;
    if recorded.is_zero() {
      return true;
    }
    let drift = if current > recorded {
      current - recorded
    } else {
      recorded - current
    };
    let threshold = FixedU128::from(Self::min_ratio_change_to_swap());
    drift
      .checked_div(&recorded)
      .map_or(true, |change| change >= threshold)
  }

  fn decode_price(price: &CompactAmount) -> Result<FixedU128, DispatchError> {
    let inner = price.decode_exact().ok_or(Error::<T>::InvalidPriceBounds)?;
    Ok(FixedU128::from_inner(inner))
  }

  /// Swaps half of the surplus side into the other so both sides match the pool ratio.
  fn rebalance(
    asset_a: T::AssetId,
    asset_b: T::AssetId,
    amount_a: BalanceOf<T>,
    amount_b: BalanceOf<T>,
  ) -> Result<(BalanceOf<T>, BalanceOf<T>), DispatchError> {
    let ratio = Self::reserve_ratio(asset_a, asset_b).ok_or(Error::<T>::PriceUnavailable)?;
    let a_in_b = ratio.saturating_mul_int(amount_a);
    let account = Self::account_id();
    let two: BalanceOf<T> = 2u32.into();

    if a_in_b > amount_b {
      let surplus_b = a_in_b - amount_b;
      let surplus_a = ratio
        .reciprocal()
        .ok_or(Error::<T>::PriceUnavailable)?
        .saturating_mul_int(surplus_b)
        .min(amount_a);
      let swap_in = surplus_a / two;
      if swap_in.is_zero() {
        return Ok((amount_a, amount_b));
      }
      let swap_out = T::PoolOps::swap_amount_out(asset_a, asset_b, swap_in)?;
      T::PoolOps::swap(&account, asset_a, asset_b, swap_in, swap_out, &account)?;
      Ok((amount_a - swap_in, amount_b.saturating_add(swap_out)))
    } else {
      let surplus_b = amount_b - a_in_b;
      let swap_in = surplus_b / two;
      if swap_in.is_zero() {
        return Ok((amount_a, amount_b));
      }
      let swap_out = T::PoolOps::swap_amount_out(asset_b, asset_a, swap_in)?;
      T::PoolOps::swap(&account, asset_b, asset_a, swap_in, swap_out, &account)?;
      Ok((amount_a.saturating_add(swap_out), amount_b - swap_in))
    }
  }

  fn apply_withdraw(order: &WithdrawOrderOf<T>, pair: &AssetPair<T::AssetId>) -> DispatchResult {
    let account = Self::account_id();
    let (first, second) = T::PoolOps::burn(&account, pair, order.liquidity, &account)?;
    let (out_a, out_b) = if pair.is_first(&order.asset_a) {
      (first, second)
    } else {
      (second, first)
    };
    ensure!(
      out_a >= order.amount_a_min && out_b >= order.amount_b_min,
      Error::<T>::InsufficientOutputAmount
    );
    let to = &order.terms.to;
    Self::deliver(order.asset_a, out_a, to, order.terms.unwrap)?;
    Self::deliver(order.asset_b, out_b, to, order.terms.unwrap)
  }

  fn apply_sell(order: &SellOrderOf<T>) -> DispatchResult {
    let account = Self::account_id();
    let amount_out = T::PoolOps::swap_amount_out(order.asset_in, order.asset_out, order.amount_in)?;
    ensure!(
      amount_out >= order.amount_out_min,
      Error::<T>::InsufficientOutputAmount
    );
    T::PoolOps::swap(
      &account,
      order.asset_in,
      order.asset_out,
      order.amount_in,
      amount_out,
      &account,
    )?;
    Self::deliver(order.asset_out, amount_out, &order.terms.to, order.terms.unwrap)
  }

  fn apply_buy(order: &BuyOrderOf<T>) -> DispatchResult {
    let account = Self::account_id();
    let amount_in = T::PoolOps::swap_amount_in(order.asset_in, order.asset_out, order.amount_out)?;
    ensure!(
      amount_in <= order.amount_in_max,
      Error::<T>::ExcessiveInputAmount
    );
    T::PoolOps::swap(
      &account,
      order.asset_in,
      order.asset_out,
      amount_in,
      order.amount_out,
      &account,
    )?;
    let to = &order.terms.to;
    Self::deliver(order.asset_out, order.amount_out, to, order.terms.unwrap)?;
    Self::deliver(
      order.asset_in,
      order.amount_in_max - amount_in,
      to,
      order.terms.unwrap,
    )
  }

  pub(crate) fn do_cancel(who: T::AccountId, order_id: OrderId) -> DispatchResult {
    let mut queue = Queue::<T>::get();
    ensure!(
      queue.next_due() == Some(order_id),
      Error::<T>::OrderOutOfSequence
    );
    let payload = Payloads::<T>::get(order_id).ok_or(Error::<T>::OrderNotFound)?;
    let terms = payload.terms();
    ensure!(terms.submitter == who, Error::<T>::NotSubmitter);
    let header = Headers::<T>::get(order_id);
    ensure!(
      schedule::has_elapsed(Self::now(), header.eligible_at, T::OrderCancelTime::get()),
      Error::<T>::CancelTooEarly
    );

    queue.advance(order_id).map_err(Error::<T>::from)?;
    Queue::<T>::put(queue);
    Headers::<T>::remove(order_id);

    Self::refund_principal(order_id, &payload, &who)?;
    Self::refund_native(&who, terms.escrow);
    Payloads::<T>::remove(order_id);

    Self::deposit_event(Event::OrderCanceled {
      order_id,
      submitter: who,
    });
    Ok(())
  }

  /// Loads an order that left the queue but still holds principal.
  fn refund_pending(order_id: OrderId) -> Result<OrderPayloadOf<T>, DispatchError> {
    ensure!(
      Queue::<T>::get().is_processed(order_id),
      Error::<T>::NoRefundPending
    );
    Payloads::<T>::get(order_id).ok_or_else(|| Error::<T>::NoRefundPending.into())
  }

  pub(crate) fn do_retry_refund(order_id: OrderId) -> DispatchResult {
    let payload = Self::refund_pending(order_id)?;
    let to = payload.terms().to.clone();
    Self::refund_principal(order_id, &payload, &to)?;
    Payloads::<T>::remove(order_id);
    Self::deposit_event(Event::RefundRetried { order_id, to });
    Ok(())
  }

  pub(crate) fn do_escape_refund(order_id: OrderId) -> DispatchResult {
    let payload = Self::refund_pending(order_id)?;
    ensure!(
      schedule::has_elapsed(
        Self::now(),
        payload.terms().eligible_at,
        T::RefundEscapeTime::get()
      ),
      Error::<T>::EscapeTooEarly
    );
    let owner = Self::owner().ok_or(Error::<T>::OwnerNotSet)?;
    Self::refund_principal(order_id, &payload, &owner)?;
    Payloads::<T>::remove(order_id);
    Self::deposit_event(Event::RefundEscaped {
      order_id,
      to: owner,
    });
    Ok(())
  }

  /// Principal legs of every refund-pending order, summed per asset.
  pub fn pending_principal() -> Vec<(T::AssetId, BalanceOf<T>)> {
    let mut totals: Vec<(T::AssetId, BalanceOf<T>)> = Vec::new();
    for order_id in Self::refund_pending_orders() {
      let Some(payload) = Payloads::<T>::get(order_id) else {
        continue;
      };
      for (asset, amount) in payload.principal() {
        match totals.iter_mut().find(|(a, _)| *a == asset) {
          Some((_, total)) => *total = total.saturating_add(amount),
          None => totals.push((asset, amount)),
        }
      }
    }
    totals
  }
}
