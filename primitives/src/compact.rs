//! Exact-or-reject mantissa/exponent encoding.
//!
//! A magnitude `x` is stored as `(x >> tz, tz)` where `tz` is the number of trailing zero bits
//! of `x`. Encoding never rounds: if the significant bits left after removing trailing zeros do
//! not fit the mantissa, encoding fails.

use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// Width of [`CompactAmount::mantissa`] in bits.
pub const MANTISSA_BITS: u32 = u64::BITS;

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
  PartialEq,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub struct CompactAmount {
  pub mantissa: u64,
  pub exponent: u8,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompactError {
  /// The value has significant bits beyond the mantissa width.
  PrecisionLoss,
}

impl CompactAmount {
  pub fn encode_exact(value: u128) -> Result<Self, CompactError> {
    if value == 0 {
      return Ok(Self::default());
    }
    let exponent = value.trailing_zeros();
    let mantissa = u64::try_from(value >> exponent).map_err(|_| CompactError::PrecisionLoss)?;
    Ok(Self {
      mantissa,
      // trailing_zeros of a non-zero u128 is at most 127
      exponent: exponent as u8,
    })
  }

  /// Reconstructs the magnitude. `None` if the pair does not fit `u128`, which can only
  /// happen for pairs not produced by [`Self::encode_exact`].
  pub fn decode_exact(&self) -> Option<u128> {
    let mantissa = self.mantissa as u128;
    if mantissa == 0 {
      return Some(0);
    }
    let exponent = self.exponent as u32;
    if exponent > mantissa.leading_zeros() {
      return None;
    }
    Some(mantissa << exponent)
  }
}

impl TryFrom<u128> for CompactAmount {
  type Error = CompactError;

  fn try_from(value: u128) -> Result<Self, Self::Error> {
    Self::encode_exact(value)
  }
}
