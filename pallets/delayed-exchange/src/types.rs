use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use polkadot_sdk::sp_runtime::FixedU128;
use primitives::{AssetPair, CompactAmount, Moment};
use scale_info::{TypeInfo, prelude::vec::Vec};

#[derive(
  Clone,
  Copy,
  Debug,
  Default,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  PartialEq,
  TypeInfo,
  MaxEncodedLen,
)]
pub enum OrderKind {
  #[default]
  Empty,
  Deposit,
  Withdraw,
  Sell,
  Buy,
}

impl OrderKind {
  fn bit(self) -> u8 {
    match self {
      OrderKind::Empty => 0,
      OrderKind::Deposit => 1 << 0,
      OrderKind::Withdraw => 1 << 1,
      OrderKind::Sell => 1 << 2,
      OrderKind::Buy => 1 << 3,
    }
  }
}

/// Queue entry. A cleared or unknown id reads as `(Empty, 0)`.
#[derive(
  Clone,
  Copy,
  Debug,
  Default,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  PartialEq,
  TypeInfo,
  MaxEncodedLen,
)]
pub struct OrderHeader {
  pub kind: OrderKind,
  pub eligible_at: Moment,
}

/// Order kinds switched off for a pool.
#[derive(
  Clone,
  Copy,
  Debug,
  Default,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  PartialEq,
  TypeInfo,
  MaxEncodedLen,
)]
pub struct OrderKindSet(u8);

impl OrderKindSet {
  pub fn contains(&self, kind: OrderKind) -> bool {
    kind != OrderKind::Empty && self.0 & kind.bit() != 0
  }

  pub fn set(&mut self, kind: OrderKind, enabled: bool) {
    if enabled {
      self.0 |= kind.bit();
    } else {
      self.0 &= !kind.bit();
    }
  }

  pub fn is_empty(&self) -> bool {
    self.0 == 0
  }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Encode, Decode, TypeInfo)]
pub enum OrderStatus {
  Unknown,
  /// Queued, not yet eligible.
  Pending,
  /// Queued and executable.
  Eligible,
  /// Dequeued, principal still held after a failed return.
  RefundPending,
  /// Dequeued and fully settled.
  Settled,
}

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
pub struct FeeLimitBounds {
  pub min: u64,
  pub max: u64,
}

impl FeeLimitBounds {
  pub fn contains(&self, fee_limit: u64) -> bool {
    fee_limit >= self.min && fee_limit <= self.max
  }
}

/// Fields captured at submission that every order carries.
#[derive(
  Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen,
)]
pub struct OrderTerms<AccountId, Balance> {
  pub submitter: AccountId,
  pub to: AccountId,
  /// Fee budget in fee units.
  pub fee_limit: u64,
  /// Fee price locked in at submission.
  pub fee_price: Balance,
  /// Prepaid native value reserved for keeper fees.
  pub escrow: Balance,
  pub submitted_at: Moment,
  pub submit_deadline: Moment,
  pub eligible_at: Moment,
  pub deadline: Moment,
  /// Deliver the wrapped native asset as native currency.
  pub unwrap: bool,
}

#[derive(
  Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen,
)]
pub struct DepositOrder<AccountId, AssetId, Balance> {
  pub terms: OrderTerms<AccountId, Balance>,
  pub asset_a: AssetId,
  pub asset_b: AssetId,
  pub amount_a: Balance,
  pub amount_b: Balance,
  pub swap: bool,
  /// Bounds on the price of `asset_a` in units of `asset_b`, as raw `FixedU128` inners.
  pub min_swap_price: CompactAmount,
  /// `None` leaves the price unbounded above.
  pub max_swap_price: Option<CompactAmount>,
  /// `reserve_b / reserve_a` when the order was submitted.
  pub ratio_at_submission: FixedU128,
}

#[derive(
  Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen,
)]
pub struct WithdrawOrder<AccountId, AssetId, Balance> {
  pub terms: OrderTerms<AccountId, Balance>,
  pub asset_a: AssetId,
  pub asset_b: AssetId,
  pub lp_asset: AssetId,
  pub liquidity: Balance,
  pub amount_a_min: Balance,
  pub amount_b_min: Balance,
}

#[derive(
  Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen,
)]
pub struct SellOrder<AccountId, AssetId, Balance> {
  pub terms: OrderTerms<AccountId, Balance>,
  pub asset_in: AssetId,
  pub asset_out: AssetId,
  pub amount_in: Balance,
  pub amount_out_min: Balance,
}

#[derive(
  Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen,
)]
pub struct BuyOrder<AccountId, AssetId, Balance> {
  pub terms: OrderTerms<AccountId, Balance>,
  pub asset_in: AssetId,
  pub asset_out: AssetId,
  pub amount_in_max: Balance,
  pub amount_out: Balance,
}

#[derive(
  Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen,
)]
pub enum OrderPayload<AccountId, AssetId, Balance> {
  Deposit(DepositOrder<AccountId, AssetId, Balance>),
  Withdraw(WithdrawOrder<AccountId, AssetId, Balance>),
  Sell(SellOrder<AccountId, AssetId, Balance>),
  Buy(BuyOrder<AccountId, AssetId, Balance>),
}

impl<AccountId, AssetId: Copy + Ord, Balance: Copy + PartialEq + Default>
  OrderPayload<AccountId, AssetId, Balance>
{
  pub fn kind(&self) -> OrderKind {
    match self {
      OrderPayload::Deposit(_) => OrderKind::Deposit,
      OrderPayload::Withdraw(_) => OrderKind::Withdraw,
      OrderPayload::Sell(_) => OrderKind::Sell,
      OrderPayload::Buy(_) => OrderKind::Buy,
    }
  }

  pub fn terms(&self) -> &OrderTerms<AccountId, Balance> {
    match self {
      OrderPayload::Deposit(o) => &o.terms,
      OrderPayload::Withdraw(o) => &o.terms,
      OrderPayload::Sell(o) => &o.terms,
      OrderPayload::Buy(o) => &o.terms,
    }
  }

  /// The pool the order trades against.
  pub fn pair(&self) -> Option<AssetPair<AssetId>> {
    match self {
      OrderPayload::Deposit(o) => AssetPair::new(o.asset_a, o.asset_b),
      OrderPayload::Withdraw(o) => AssetPair::new(o.asset_a, o.asset_b),
      OrderPayload::Sell(o) => AssetPair::new(o.asset_in, o.asset_out),
      OrderPayload::Buy(o) => AssetPair::new(o.asset_in, o.asset_out),
    }
  }

  /// Assets held in escrow on behalf of the order, zero legs omitted.
  pub fn principal(&self) -> Vec<(AssetId, Balance)> {
    let legs = match self {
      OrderPayload::Deposit(o) => [Some((o.asset_a, o.amount_a)), Some((o.asset_b, o.amount_b))],
      OrderPayload::Withdraw(o) => [Some((o.lp_asset, o.liquidity)), None],
      OrderPayload::Sell(o) => [Some((o.asset_in, o.amount_in)), None],
      OrderPayload::Buy(o) => [Some((o.asset_in, o.amount_in_max)), None],
    };
    legs
      .into_iter()
      .flatten()
      .filter(|(_, amount)| *amount != Balance::default())
      .collect()
  }
}

/// Fields shared by every submission request.
#[derive(
  Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen,
)]
pub struct SubmitTerms<AccountId> {
  pub to: AccountId,
  pub fee_limit: u64,
  pub submit_deadline: Moment,
  pub execution_deadline: Moment,
}

#[derive(
  Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen,
)]
pub struct DepositRequest<AccountId, AssetId, Balance> {
  pub asset_a: AssetId,
  pub asset_b: AssetId,
  pub amount_a: Balance,
  pub amount_b: Balance,
  /// Rebalance through a swap before adding liquidity.
  pub swap: bool,
  pub min_swap_price: FixedU128,
  /// `FixedU128::from_inner(u128::MAX)` places no upper bound. Any other value must be
  /// exactly representable as a `CompactAmount`.
  pub max_swap_price: FixedU128,
  /// Fund the wrapped native side from the attached value.
  pub wrap: bool,
  pub terms: SubmitTerms<AccountId>,
}

#[derive(
  Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen,
)]
pub struct WithdrawRequest<AccountId, AssetId, Balance> {
  pub asset_a: AssetId,
  pub asset_b: AssetId,
  pub liquidity: Balance,
  pub amount_a_min: Balance,
  pub amount_b_min: Balance,
  pub unwrap: bool,
  pub terms: SubmitTerms<AccountId>,
}

#[derive(
  Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen,
)]
pub struct SellRequest<AccountId, AssetId, Balance> {
  pub asset_in: AssetId,
  pub asset_out: AssetId,
  pub amount_in: Balance,
  pub amount_out_min: Balance,
  pub wrap: bool,
  pub unwrap: bool,
  pub terms: SubmitTerms<AccountId>,
}

#[derive(
  Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen,
)]
pub struct BuyRequest<AccountId, AssetId, Balance> {
  pub asset_in: AssetId,
  pub asset_out: AssetId,
  pub amount_in_max: Balance,
  pub amount_out: Balance,
  pub wrap: bool,
  pub unwrap: bool,
  pub terms: SubmitTerms<AccountId>,
}
