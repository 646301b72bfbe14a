//! Delayed Exchange Pallet
//!
//! Queues AMM deposits, withdrawals, sells and buys and lets keepers execute them in strict
//! FIFO order once a mandatory delay has passed. Principal and prepaid keeper fees are
//! escrowed in the pallet account until the order settles, and a failed execution returns
//! the principal or keeps it retryable until it can be returned.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

pub mod adapters;
pub use adapters::{AssetOps, NativeWrapper, PoolOps};

pub mod fee_price;
pub use fee_price::FeePriceTracker;

pub mod queue;
pub use queue::{OrderId, OrderQueue};

pub mod schedule;

pub mod types;
pub use types::*;

mod execution;

pub mod weights;
pub use weights::WeightInfo;

#[cfg(test)]
mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub(crate) const LOG_TARGET: &str = "runtime::delayed-exchange";

#[cfg(feature = "runtime-benchmarks")]
pub trait BenchmarkHelper<AccountId, AssetId, Balance> {
  /// Creates a liquid pool and returns its two assets.
  fn setup_pool() -> (AssetId, AssetId);

  fn fund(who: &AccountId, asset: AssetId, amount: Balance);

  /// Moves the clock read through `UnixTime` forward.
  fn advance_time(seconds: primitives::Moment);
}

#[frame::pallet]
pub mod pallet {
  use super::{
    AssetOps, NativeWrapper, PoolOps, WeightInfo,
    fee_price::{FeePriceError, FeePriceTracker},
    queue::{OrderId, OrderQueue, QueueError},
    schedule::ScheduleError,
    types::*,
  };
  use alloc::vec::Vec;
  use frame::prelude::*;
  use polkadot_sdk::{
    frame_support::{
      PalletId,
      traits::{EnsureOrigin, UnixTime},
    },
    sp_runtime::{
      FixedPointNumber, FixedPointOperand, FixedU128, Permill,
      traits::{AccountIdConversion, Zero},
    },
    sp_weights::WeightToFee,
  };
  use primitives::{AssetPair, Moment, params::BOT_WINDOW_DELAY_MULTIPLIER};

  #[pallet::config]
  pub trait Config: frame_system::Config {
    type AssetId: Parameter + Member + Copy + Ord + MaybeSerializeDeserialize + MaxEncodedLen;

    type Balance: Parameter
      + Member
      + AtLeast32BitUnsigned
      + FixedPointOperand
      + Default
      + Copy
      + MaybeSerializeDeserialize
      + MaxEncodedLen;

    /// Asset used for prepaid fees and native deliveries.
    #[pallet::constant]
    type NativeAssetId: Get<Self::AssetId>;

    /// Fungible representation of the native currency handled by `NativeWrapper`.
    #[pallet::constant]
    type WrappedNativeAssetId: Get<Self::AssetId>;

    type AssetOps: AssetOps<Self::AccountId, Self::AssetId, Self::Balance>;
    type NativeWrapper: NativeWrapper<Self::AccountId, Self::Balance>;
    type PoolOps: PoolOps<Self::AccountId, Self::AssetId, Self::Balance>;

    type UnixTime: UnixTime;

    /// Prevailing fee price the tracker is nudged toward after each execution.
    type ObservedFeePrice: Get<Self::Balance>;

    /// Converts the execution weight into fee units for keeper reimbursement.
    type WeightToFeeUnits: WeightToFee<Balance = u64>;

    /// Origin allowed to administer the exchange besides the stored owner.
    type AdminOrigin: EnsureOrigin<Self::RuntimeOrigin>;

    #[pallet::constant]
    type PalletId: Get<PalletId>;

    #[pallet::constant]
    type DefaultDelay: Get<Moment>;
    /// Time past eligibility after which the submitter may cancel a stuck order.
    #[pallet::constant]
    type OrderCancelTime: Get<Moment>;
    /// Time past eligibility after which the owner may take over a stuck refund.
    #[pallet::constant]
    type RefundEscapeTime: Get<Moment>;

    /// Fee units charged for every execution.
    #[pallet::constant]
    type BaseExecutionCost: Get<u64>;
    #[pallet::constant]
    type DefaultFeePriceInertia: Get<u64>;
    #[pallet::constant]
    type DefaultMaxFeePriceImpact: Get<u64>;
    #[pallet::constant]
    type DefaultMinFeeLimit: Get<u64>;
    #[pallet::constant]
    type DefaultMaxFeeLimit: Get<u64>;
    #[pallet::constant]
    type DefaultMinRatioChange: Get<Permill>;

    type WeightInfo: WeightInfo;

    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper: crate::BenchmarkHelper<Self::AccountId, Self::AssetId, Self::Balance>;
  }

  pub type BalanceOf<T> = <T as Config>::Balance;
  pub type AssetIdOf<T> = <T as Config>::AssetId;
  pub type AccountIdOf<T> = <T as frame_system::Config>::AccountId;

  pub type OrderTermsOf<T> = OrderTerms<AccountIdOf<T>, BalanceOf<T>>;
  pub type OrderPayloadOf<T> = OrderPayload<AccountIdOf<T>, AssetIdOf<T>, BalanceOf<T>>;
  pub type DepositOrderOf<T> = DepositOrder<AccountIdOf<T>, AssetIdOf<T>, BalanceOf<T>>;
  pub type WithdrawOrderOf<T> = WithdrawOrder<AccountIdOf<T>, AssetIdOf<T>, BalanceOf<T>>;
  pub type SellOrderOf<T> = SellOrder<AccountIdOf<T>, AssetIdOf<T>, BalanceOf<T>>;
  pub type BuyOrderOf<T> = BuyOrder<AccountIdOf<T>, AssetIdOf<T>, BalanceOf<T>>;

  pub type DepositRequestOf<T> = DepositRequest<AccountIdOf<T>, AssetIdOf<T>, BalanceOf<T>>;
  pub type WithdrawRequestOf<T> = WithdrawRequest<AccountIdOf<T>, AssetIdOf<T>, BalanceOf<T>>;
  pub type SellRequestOf<T> = SellRequest<AccountIdOf<T>, AssetIdOf<T>, BalanceOf<T>>;
  pub type BuyRequestOf<T> = BuyRequest<AccountIdOf<T>, AssetIdOf<T>, BalanceOf<T>>;

  pub type FeePriceTrackerOf<T> = FeePriceTracker<BalanceOf<T>>;

  #[pallet::pallet]
  pub struct Pallet<T>(_);

  #[pallet::type_value]
  pub fn DefaultBotWindow<T: Config>() -> Moment {
    T::DefaultDelay::get().saturating_mul(BOT_WINDOW_DELAY_MULTIPLIER)
  }

  #[pallet::type_value]
  pub fn DefaultFeePrice<T: Config>() -> FeePriceTrackerOf<T> {
    FeePriceTracker {
      price: Zero::zero(),
      inertia: T::DefaultFeePriceInertia::get(),
      max_impact: T::DefaultMaxFeePriceImpact::get(),
    }
  }

  #[pallet::type_value]
  pub fn DefaultFeeLimits<T: Config>() -> FeeLimitBounds {
    FeeLimitBounds {
      min: T::DefaultMinFeeLimit::get(),
      max: T::DefaultMaxFeeLimit::get(),
    }
  }

  #[pallet::storage]
  #[pallet::getter(fn order_queue)]
  pub type Queue<T> = StorageValue<_, OrderQueue, ValueQuery>;

  /// Headers of queued orders. Cleared on dequeue.
  #[pallet::storage]
  pub type Headers<T> = StorageMap<_, Blake2_128Concat, OrderId, OrderHeader, ValueQuery>;

  /// Payloads of queued and refund-pending orders.
  #[pallet::storage]
  pub type Payloads<T: Config> =
    StorageMap<_, Blake2_128Concat, OrderId, OrderPayloadOf<T>, OptionQuery>;

  #[pallet::storage]
  #[pallet::getter(fn owner)]
  pub type Owner<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

  #[pallet::storage]
  #[pallet::getter(fn delay)]
  pub type Delay<T: Config> = StorageValue<_, Moment, ValueQuery, T::DefaultDelay>;

  /// Length of the keeper priority window following eligibility.
  #[pallet::storage]
  #[pallet::getter(fn bot_window)]
  pub type BotWindow<T: Config> = StorageValue<_, Moment, ValueQuery, DefaultBotWindow<T>>;

  #[pallet::storage]
  #[pallet::getter(fn fee_price_tracker)]
  pub type FeePrice<T: Config> = StorageValue<_, FeePriceTrackerOf<T>, ValueQuery, DefaultFeePrice<T>>;

  #[pallet::storage]
  #[pallet::getter(fn fee_limits)]
  pub type FeeLimits<T: Config> = StorageValue<_, FeeLimitBounds, ValueQuery, DefaultFeeLimits<T>>;

  #[pallet::storage]
  pub type Keepers<T: Config> = StorageMap<_, Blake2_128Concat, T::AccountId, bool, ValueQuery>;

  /// When set, every caller counts as a keeper inside the priority window.
  #[pallet::storage]
  #[pallet::getter(fn open_execution)]
  pub type OpenExecution<T> = StorageValue<_, bool, ValueQuery>;

  /// Estimated fee units of a single transfer of an asset.
  #[pallet::storage]
  pub type TransferCosts<T: Config> =
    StorageMap<_, Blake2_128Concat, T::AssetId, u64, OptionQuery>;

  #[pallet::storage]
  pub type DisabledKinds<T: Config> =
    StorageMap<_, Blake2_128Concat, AssetPair<T::AssetId>, OrderKindSet, ValueQuery>;

  #[pallet::storage]
  #[pallet::getter(fn min_ratio_change_to_swap)]
  pub type MinRatioChangeToSwap<T: Config> =
    StorageValue<_, Permill, ValueQuery, T::DefaultMinRatioChange>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    DepositEnqueued {
      order_id: OrderId,
      eligible_at: Moment,
      fee_price: BalanceOf<T>,
    },
    WithdrawEnqueued {
      order_id: OrderId,
      eligible_at: Moment,
      fee_price: BalanceOf<T>,
    },
    SellEnqueued {
      order_id: OrderId,
      eligible_at: Moment,
      fee_price: BalanceOf<T>,
    },
    BuyEnqueued {
      order_id: OrderId,
      eligible_at: Moment,
      fee_price: BalanceOf<T>,
    },
    /// An order left the queue. `error` is set when the operation failed.
    OrderExecuted {
      order_id: OrderId,
      success: bool,
      error: Option<DispatchError>,
      fee_spent: BalanceOf<T>,
      refunded_to_submitter: BalanceOf<T>,
    },
    OrderCanceled {
      order_id: OrderId,
      submitter: T::AccountId,
    },
    /// Principal could not be returned; the order stays refund-pending.
    RefundFailed {
      order_id: OrderId,
      to: T::AccountId,
      asset: T::AssetId,
      amount: BalanceOf<T>,
      error: DispatchError,
    },
    RefundRetried {
      order_id: OrderId,
      to: T::AccountId,
    },
    RefundEscaped {
      order_id: OrderId,
      to: T::AccountId,
    },
    NativeRefund {
      to: T::AccountId,
      success: bool,
      amount: BalanceOf<T>,
    },
    /// Wrapped native could not be unwrapped and was delivered as is.
    UnwrapFailed {
      to: T::AccountId,
      amount: BalanceOf<T>,
    },
    OwnerSet {
      owner: T::AccountId,
    },
    DelaySet {
      delay: Moment,
    },
    BotWindowSet {
      bot_window: Moment,
    },
    FeePriceSet {
      fee_price: BalanceOf<T>,
    },
    FeePriceParamsSet {
      inertia: u64,
      max_impact: u64,
    },
    FeeLimitBoundsSet {
      min: u64,
      max: u64,
    },
    KeeperSet {
      keeper: T::AccountId,
      enabled: bool,
    },
    OpenExecutionSet {
      enabled: bool,
    },
    TransferCostSet {
      asset: T::AssetId,
      cost: u64,
    },
    OrderKindDisabledSet {
      pair: AssetPair<T::AssetId>,
      kind: OrderKind,
      disabled: bool,
    },
    MinRatioChangeSet {
      threshold: Permill,
    },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// A required amount is zero
    ZeroAmount,
    /// Destination is the zero account or the pallet account
    InvalidDestination,
    /// Both sides of the order are the same asset
    IdenticalAssets,
    /// No pool exists for the asset pair
    PoolNotFound,
    /// No transfer cost is configured for one of the assets
    TransferCostNotSet,
    /// Fee budget outside the configured bounds
    FeeLimitOutOfBounds,
    /// Fee budget cannot cover the minimum execution cost
    FeeLimitBelowExecutionCost,
    /// Attached value does not cover fees and wrapped principal
    InsufficientPrepaidValue,
    /// Submission deadline has passed
    SubmissionExpired,
    /// Execution deadline is earlier than the eligibility time
    DeadlineTooSoon,
    /// The order kind is disabled for this pool
    OrderKindDisabled,
    /// A price bound cannot be stored exactly
    PriceNotRepresentable,
    /// Minimum price bound exceeds the maximum
    InvalidPriceBounds,
    /// Wrapping requested but no side of the order is the wrapped native asset
    WrapNotApplicable,
    /// Order id space exhausted
    OrderIdOverflow,
    /// Timestamp arithmetic overflowed
    TimeOverflow,
    /// Only the oldest queued order may be processed
    OrderOutOfSequence,
    OrderNotFound,
    /// Header and payload disagree on the order kind
    OrderKindMismatch,
    /// Payload exists but is of another kind
    InvalidOrderKind,
    /// The order's eligibility time has not been reached
    OrderNotEligible,
    /// Only keepers may execute during the priority window
    NotKeeper,
    NotSubmitter,
    /// The cancellation threshold has not elapsed
    CancelTooEarly,
    /// The order has no refund outstanding
    NoRefundPending,
    /// The escape threshold has not elapsed
    EscapeTooEarly,
    OwnerNotSet,
    NotOwner,
    /// Inertia must be non-zero
    ZeroInertia,
    /// Max impact must not exceed inertia
    MaxImpactExceedsInertia,
    InvalidFeeLimitBounds,
    InvalidDelay,
    /// Execution deadline has passed
    OrderExpired,
    /// Oracle price outside the order's bounds
    PriceOutOfBounds,
    /// Received less than the order's minimum
    InsufficientOutputAmount,
    /// Required input exceeds the order's maximum
    ExcessiveInputAmount,
    /// Pool reserves or oracle price unavailable
    PriceUnavailable,
  }

  impl<T> From<QueueError> for Error<T> {
    fn from(e: QueueError) -> Self {
      match e {
        QueueError::IdOverflow => Error::<T>::OrderIdOverflow,
        QueueError::OutOfSequence => Error::<T>::OrderOutOfSequence,
      }
    }
  }

  impl<T> From<ScheduleError> for Error<T> {
    fn from(e: ScheduleError) -> Self {
      match e {
        ScheduleError::SubmissionExpired => Error::<T>::SubmissionExpired,
        ScheduleError::DeadlineTooSoon => Error::<T>::DeadlineTooSoon,
        ScheduleError::NotYetEligible => Error::<T>::OrderNotEligible,
        ScheduleError::KeeperWindow => Error::<T>::NotKeeper,
        ScheduleError::TimeOverflow => Error::<T>::TimeOverflow,
      }
    }
  }

  impl<T> From<FeePriceError> for Error<T> {
    fn from(e: FeePriceError) -> Self {
      match e {
        FeePriceError::ZeroInertia => Error::<T>::ZeroInertia,
        FeePriceError::ImpactExceedsInertia => Error::<T>::MaxImpactExceedsInertia,
      }
    }
  }

  #[pallet::hooks]
  impl<T: Config> Hooks<BlockNumberFor<T>> for Pallet<T> {
    fn integrity_test() {
      assert!(
        FeePriceTrackerOf::<T>::check_params(
          T::DefaultFeePriceInertia::get(),
          T::DefaultMaxFeePriceImpact::get()
        )
        .is_ok(),
        "Default fee price inertia must be non-zero and at least the max impact"
      );
      assert!(
        T::DefaultMinFeeLimit::get() <= T::DefaultMaxFeeLimit::get(),
        "Default fee limit bounds are inverted"
      );
      assert!(T::DefaultDelay::get() > 0, "Default delay must be non-zero");
    }
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Queue a liquidity deposit. `value` is the native amount attached for keeper fees and,
    /// with `wrap`, the wrapped native side.
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::submit_deposit())]
    pub fn submit_deposit(
      origin: OriginFor<T>,
      request: DepositRequestOf<T>,
      value: BalanceOf<T>,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_submit_deposit(who, request, value).map(|_| ())
    }

    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::submit_withdraw())]
    pub fn submit_withdraw(
      origin: OriginFor<T>,
      request: WithdrawRequestOf<T>,
      value: BalanceOf<T>,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_submit_withdraw(who, request, value).map(|_| ())
    }

    #[pallet::call_index(2)]
    #[pallet::weight(T::WeightInfo::submit_sell())]
    pub fn submit_sell(
      origin: OriginFor<T>,
      request: SellRequestOf<T>,
      value: BalanceOf<T>,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_submit_sell(who, request, value).map(|_| ())
    }

    #[pallet::call_index(3)]
    #[pallet::weight(T::WeightInfo::submit_buy())]
    pub fn submit_buy(
      origin: OriginFor<T>,
      request: BuyRequestOf<T>,
      value: BalanceOf<T>,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_submit_buy(who, request, value).map(|_| ())
    }

    /// Execute the next due order. Keepers only inside the priority window.
    #[pallet::call_index(4)]
    #[pallet::weight(T::WeightInfo::execute())]
    pub fn execute(origin: OriginFor<T>, order_id: OrderId) -> DispatchResult {
      let caller = ensure_signed(origin)?;
      Self::do_execute(caller, order_id)
    }

    /// Cancel the next due order once it has been stuck past the cancellation threshold.
    #[pallet::call_index(5)]
    #[pallet::weight(T::WeightInfo::cancel_order())]
    pub fn cancel_order(origin: OriginFor<T>, order_id: OrderId) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_cancel(who, order_id)
    }

    #[pallet::call_index(6)]
    #[pallet::weight(T::WeightInfo::retry_refund())]
    pub fn retry_refund(origin: OriginFor<T>, order_id: OrderId) -> DispatchResult {
      ensure_signed(origin)?;
      Self::do_retry_refund(order_id)
    }

    /// Send the principal of a long stuck refund to the owner.
    ///
    /// The transfer to the owner is atomic. If the owner's account rejects it the call fails
    /// with the delivery error and the order stays refund-pending, so it can be escaped again
    /// once `set_owner` points at an account that accepts the assets.
    #[pallet::call_index(7)]
    #[pallet::weight(T::WeightInfo::escape_refund())]
    pub fn escape_refund(origin: OriginFor<T>, order_id: OrderId) -> DispatchResult {
      Self::ensure_owner(origin)?;
      Self::do_escape_refund(order_id)
    }

    #[pallet::call_index(8)]
    #[pallet::weight(T::WeightInfo::set_owner())]
    pub fn set_owner(origin: OriginFor<T>, owner: T::AccountId) -> DispatchResult {
      Self::ensure_owner(origin)?;
      Owner::<T>::put(owner.clone());
      Self::deposit_event(Event::OwnerSet { owner });
      Ok(())
    }

    #[pallet::call_index(9)]
    #[pallet::weight(T::WeightInfo::set_delay())]
    pub fn set_delay(origin: OriginFor<T>, delay: Moment) -> DispatchResult {
      Self::ensure_owner(origin)?;
      ensure!(delay > 0, Error::<T>::InvalidDelay);
      Delay::<T>::put(delay);
      Self::deposit_event(Event::DelaySet { delay });
      Ok(())
    }

    #[pallet::call_index(10)]
    #[pallet::weight(T::WeightInfo::set_bot_window())]
    pub fn set_bot_window(origin: OriginFor<T>, bot_window: Moment) -> DispatchResult {
      Self::ensure_owner(origin)?;
      BotWindow::<T>::put(bot_window);
      Self::deposit_event(Event::BotWindowSet { bot_window });
      Ok(())
    }

    #[pallet::call_index(11)]
    #[pallet::weight(T::WeightInfo::set_fee_price())]
    pub fn set_fee_price(origin: OriginFor<T>, fee_price: BalanceOf<T>) -> DispatchResult {
      Self::ensure_owner(origin)?;
      FeePrice::<T>::mutate(|tracker| tracker.price = fee_price);
      Self::deposit_event(Event::FeePriceSet { fee_price });
      Ok(())
    }

    #[pallet::call_index(12)]
    #[pallet::weight(T::WeightInfo::set_fee_price_params())]
    pub fn set_fee_price_params(
      origin: OriginFor<T>,
      inertia: u64,
      max_impact: u64,
    ) -> DispatchResult {
      Self::ensure_owner(origin)?;
      FeePrice::<T>::try_mutate(|tracker| tracker.configure(inertia, max_impact))
        .map_err(Error::<T>::from)?;
      Self::deposit_event(Event::FeePriceParamsSet {
        inertia,
        max_impact,
      });
      Ok(())
    }

    #[pallet::call_index(13)]
    #[pallet::weight(T::WeightInfo::set_fee_limit_bounds())]
    pub fn set_fee_limit_bounds(origin: OriginFor<T>, min: u64, max: u64) -> DispatchResult {
      Self::ensure_owner(origin)?;
      ensure!(max > 0 && min <= max, Error::<T>::InvalidFeeLimitBounds);
      FeeLimits::<T>::put(FeeLimitBounds { min, max });
      Self::deposit_event(Event::FeeLimitBoundsSet { min, max });
      Ok(())
    }

    #[pallet::call_index(14)]
    #[pallet::weight(T::WeightInfo::set_keeper())]
    pub fn set_keeper(origin: OriginFor<T>, keeper: T::AccountId, enabled: bool) -> DispatchResult {
      Self::ensure_owner(origin)?;
      if enabled {
        Keepers::<T>::insert(&keeper, true);
      } else {
        Keepers::<T>::remove(&keeper);
      }
      Self::deposit_event(Event::KeeperSet { keeper, enabled });
      Ok(())
    }

    #[pallet::call_index(15)]
    #[pallet::weight(T::WeightInfo::set_open_execution())]
    pub fn set_open_execution(origin: OriginFor<T>, enabled: bool) -> DispatchResult {
      Self::ensure_owner(origin)?;
      OpenExecution::<T>::put(enabled);
      Self::deposit_event(Event::OpenExecutionSet { enabled });
      Ok(())
    }

    #[pallet::call_index(16)]
    #[pallet::weight(T::WeightInfo::set_transfer_cost())]
    pub fn set_transfer_cost(origin: OriginFor<T>, asset: T::AssetId, cost: u64) -> DispatchResult {
      Self::ensure_owner(origin)?;
      TransferCosts::<T>::insert(asset, cost);
      Self::deposit_event(Event::TransferCostSet { asset, cost });
      Ok(())
    }

    #[pallet::call_index(17)]
    #[pallet::weight(T::WeightInfo::set_order_kind_disabled())]
    pub fn set_order_kind_disabled(
      origin: OriginFor<T>,
      asset_a: T::AssetId,
      asset_b: T::AssetId,
      kind: OrderKind,
      disabled: bool,
    ) -> DispatchResult {
      Self::ensure_owner(origin)?;
      ensure!(kind != OrderKind::Empty, Error::<T>::InvalidOrderKind);
      let pair = AssetPair::new(asset_a, asset_b).ok_or(Error::<T>::IdenticalAssets)?;
      DisabledKinds::<T>::mutate_exists(pair, |maybe| {
        let mut set = maybe.unwrap_or_default();
        set.set(kind, disabled);
        *maybe = (!set.is_empty()).then_some(set);
      });
      Self::deposit_event(Event::OrderKindDisabledSet {
        pair,
        kind,
        disabled,
      });
      Ok(())
    }

    #[pallet::call_index(18)]
    #[pallet::weight(T::WeightInfo::set_min_ratio_change())]
    pub fn set_min_ratio_change(origin: OriginFor<T>, threshold: Permill) -> DispatchResult {
      Self::ensure_owner(origin)?;
      MinRatioChangeToSwap::<T>::put(threshold);
      Self::deposit_event(Event::MinRatioChangeSet { threshold });
      Ok(())
    }
  }

  impl<T: Config> Pallet<T> {
    /// Account escrowing principal and prepaid fees.
    pub fn account_id() -> T::AccountId {
      T::PalletId::get().into_account_truncating()
    }

    pub fn now() -> Moment {
      T::UnixTime::now().as_secs()
    }

    pub fn newest_order_id() -> OrderId {
      Queue::<T>::get().newest_order_id
    }

    pub fn last_processed_order_id() -> OrderId {
      Queue::<T>::get().last_processed_order_id
    }

    /// The oldest queued order, if any.
    pub fn peek_next() -> Option<(OrderId, OrderHeader)> {
      let order_id = Queue::<T>::get().next_due()?;
      Some((order_id, Headers::<T>::get(order_id)))
    }

    /// `(Empty, 0)` once the order has left the queue.
    pub fn order(order_id: OrderId) -> OrderHeader {
      Headers::<T>::get(order_id)
    }

    pub fn order_status(order_id: OrderId) -> OrderStatus {
      let queue = Queue::<T>::get();
      if queue.is_queued(order_id) {
        if Self::now() < Headers::<T>::get(order_id).eligible_at {
          OrderStatus::Pending
        } else {
          OrderStatus::Eligible
        }
      } else if queue.is_processed(order_id) {
        if Payloads::<T>::contains_key(order_id) {
          OrderStatus::RefundPending
        } else {
          OrderStatus::Settled
        }
      } else {
        OrderStatus::Unknown
      }
    }

    pub fn is_keeper(who: &T::AccountId) -> bool {
      OpenExecution::<T>::get() || Keepers::<T>::get(who)
    }

    pub fn deposit_order(order_id: OrderId) -> Result<DepositOrderOf<T>, DispatchError> {
      match Self::checked_payload(order_id, OrderKind::Deposit)? {
        OrderPayload::Deposit(order) => Ok(order),
        _ => Err(Error::<T>::InvalidOrderKind.into()),
      }
    }

    pub fn withdraw_order(order_id: OrderId) -> Result<WithdrawOrderOf<T>, DispatchError> {
      match Self::checked_payload(order_id, OrderKind::Withdraw)? {
        OrderPayload::Withdraw(order) => Ok(order),
        _ => Err(Error::<T>::InvalidOrderKind.into()),
      }
    }

    pub fn sell_order(order_id: OrderId) -> Result<SellOrderOf<T>, DispatchError> {
      match Self::checked_payload(order_id, OrderKind::Sell)? {
        OrderPayload::Sell(order) => Ok(order),
        _ => Err(Error::<T>::InvalidOrderKind.into()),
      }
    }

    pub fn buy_order(order_id: OrderId) -> Result<BuyOrderOf<T>, DispatchError> {
      match Self::checked_payload(order_id, OrderKind::Buy)? {
        OrderPayload::Buy(order) => Ok(order),
        _ => Err(Error::<T>::InvalidOrderKind.into()),
      }
    }

    /// Loads a payload, requiring it to be of `kind` and, while queued, to agree with its
    /// header.
    fn checked_payload(order_id: OrderId, kind: OrderKind) -> Result<OrderPayloadOf<T>, DispatchError> {
      let payload = Payloads::<T>::get(order_id).ok_or(Error::<T>::OrderNotFound)?;
      ensure!(payload.kind() == kind, Error::<T>::InvalidOrderKind);
      if Queue::<T>::get().is_queued(order_id) {
        ensure!(
          Headers::<T>::get(order_id).kind == kind,
          Error::<T>::OrderKindMismatch
        );
      }
      Ok(payload)
    }

    /// Accepts the admin origin or a signed call from the stored owner.
    pub(crate) fn ensure_owner(origin: OriginFor<T>) -> DispatchResult {
      if let Ok(who) = ensure_signed(origin.clone()) {
        ensure!(Owner::<T>::get().as_ref() == Some(&who), Error::<T>::NotOwner);
        return Ok(());
      }
      T::AdminOrigin::ensure_origin(origin)?;
      Ok(())
    }

    /// Price of one unit of `asset_a` in units of `asset_b` from pool reserves.
    pub fn reserve_ratio(asset_a: T::AssetId, asset_b: T::AssetId) -> Option<FixedU128> {
      let pair = AssetPair::new(asset_a, asset_b)?;
      let (first, second) = T::PoolOps::reserves(&pair)?;
      let (reserve_a, reserve_b) = if pair.is_first(&asset_a) {
        (first, second)
      } else {
        (second, first)
      };
      FixedU128::checked_from_rational(reserve_b, reserve_a)
    }

    /// Oracle price of one unit of `asset_a` in units of `asset_b`.
    pub fn oracle_price(asset_a: T::AssetId, asset_b: T::AssetId) -> Option<FixedU128> {
      let pair = AssetPair::new(asset_a, asset_b)?;
      let price = T::PoolOps::spot_price(&pair)?;
      if pair.is_first(&asset_a) {
        Some(price)
      } else {
        price.reciprocal()
      }
    }

    /// Ids of refund-pending orders, oldest first.
    pub fn refund_pending_orders() -> Vec<OrderId> {
      let queue = Queue::<T>::get();
      let mut ids: Vec<OrderId> = Payloads::<T>::iter_keys()
        .filter(|id| queue.is_processed(*id))
        .collect();
      ids.sort_unstable();
      ids
    }
  }

  #[pallet::genesis_config]
  pub struct GenesisConfig<T: Config> {
    pub owner: Option<T::AccountId>,
    pub keepers: Vec<T::AccountId>,
    pub transfer_costs: Vec<(T::AssetId, u64)>,
    pub fee_price: BalanceOf<T>,
    pub open_execution: bool,
  }

  impl<T: Config> Default for GenesisConfig<T> {
    fn default() -> Self {
      Self {
        owner: None,
        keepers: Vec::new(),
        transfer_costs: Vec::new(),
        fee_price: Zero::zero(),
        open_execution: false,
      }
    }
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      if let Some(owner) = &self.owner {
        Owner::<T>::put(owner);
      }
      for keeper in &self.keepers {
        Keepers::<T>::insert(keeper, true);
      }
      for (asset, cost) in &self.transfer_costs {
        TransferCosts::<T>::insert(asset, cost);
      }
      FeePrice::<T>::mutate(|tracker| tracker.price = self.fee_price);
      OpenExecution::<T>::put(self.open_execution);
      // Escrow account survives zero native balance via provider reference
      frame_system::Pallet::<T>::inc_providers(&Pallet::<T>::account_id());
    }
  }
}
