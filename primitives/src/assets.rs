use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// Asset identifier shared by the exchange and its collaborators.
///
/// - `Native`: The system's native token (managed by pallet-balances).
/// - `Local(u32)`: Fungible assets (managed by pallet-assets), including wrapped native and LP tokens.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Default,
  Encode,
  Eq,
  MaxEncodedLen,
  Ord,
  PartialEq,
  PartialOrd,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub enum AssetKind {
  #[default]
  Native,
  Local(u32),
}

impl AssetKind {
  pub fn is_native(&self) -> bool {
    matches!(self, AssetKind::Native)
  }
}

impl From<u32> for AssetKind {
  fn from(asset_id: u32) -> Self {
    AssetKind::Local(asset_id)
  }
}

/// Unordered pool key. The two assets are always stored sorted, so `(a, b)` and `(b, a)`
/// address the same pool.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  MaxEncodedLen,
  Ord,
  PartialEq,
  PartialOrd,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub struct AssetPair<AssetId> {
  first: AssetId,
  second: AssetId,
}

impl<AssetId: Ord + Copy> AssetPair<AssetId> {
  /// Returns `None` when both sides are the same asset.
  pub fn new(a: AssetId, b: AssetId) -> Option<Self> {
    match a.cmp(&b) {
      core::cmp::Ordering::Less => Some(Self { first: a, second: b }),
      core::cmp::Ordering::Greater => Some(Self { first: b, second: a }),
      core::cmp::Ordering::Equal => None,
    }
  }

  pub fn first(&self) -> AssetId {
    self.first
  }

  pub fn second(&self) -> AssetId {
    self.second
  }

  pub fn contains(&self, asset: &AssetId) -> bool {
    self.first == *asset || self.second == *asset
  }

  /// Whether `asset` is the first (sorted) side of the pair.
  pub fn is_first(&self, asset: &AssetId) -> bool {
    self.first == *asset
  }
}
