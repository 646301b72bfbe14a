#![cfg_attr(rustfmt, rustfmt_skip)]
#![allow(unused_parens)]
#![allow(unused_imports)]
#![allow(missing_docs)]

use core::marker::PhantomData;
use polkadot_sdk::frame_support::{
  traits::Get,
  weights::{constants::RocksDbWeight, Weight},
};

pub trait WeightInfo {
  fn submit_deposit() -> Weight;
  fn submit_withdraw() -> Weight;
  fn submit_sell() -> Weight;
  fn submit_buy() -> Weight;
  fn execute() -> Weight;
  fn cancel_order() -> Weight;
  fn retry_refund() -> Weight;
  fn escape_refund() -> Weight;
  fn set_owner() -> Weight;
  fn set_delay() -> Weight;
  fn set_bot_window() -> Weight;
  fn set_fee_price() -> Weight;
  fn set_fee_price_params() -> Weight;
  fn set_fee_limit_bounds() -> Weight;
  fn set_keeper() -> Weight;
  fn set_open_execution() -> Weight;
  fn set_transfer_cost() -> Weight;
  fn set_order_kind_disabled() -> Weight;
  fn set_min_ratio_change() -> Weight;
}

pub struct SubstrateWeight<T>(PhantomData<T>);
impl<T: polkadot_sdk::frame_system::Config + crate::Config> WeightInfo for SubstrateWeight<T> {
  fn submit_deposit() -> Weight {
    Weight::from_parts(55_000_000, 3600)
      .saturating_add(T::DbWeight::get().reads(11))
      .saturating_add(T::DbWeight::get().writes(7))
  }

  fn submit_withdraw() -> Weight {
    Weight::from_parts(45_000_000, 3400)
      .saturating_add(T::DbWeight::get().reads(10))
      .saturating_add(T::DbWeight::get().writes(6))
  }

  fn submit_sell() -> Weight {
    Weight::from_parts(45_000_000, 3400)
      .saturating_add(T::DbWeight::get().reads(10))
      .saturating_add(T::DbWeight::get().writes(6))
  }

  fn submit_buy() -> Weight {
    Weight::from_parts(45_000_000, 3400)
      .saturating_add(T::DbWeight::get().reads(10))
      .saturating_add(T::DbWeight::get().writes(6))
  }

  // Worst case is a failed rebalancing deposit followed by a principal refund.
  fn execute() -> Weight {
    Weight::from_parts(90_000_000, 4200)
      .saturating_add(T::DbWeight::get().reads_writes(16, 14))
  }

  fn cancel_order() -> Weight {
    Weight::from_parts(40_000_000, 3000)
      .saturating_add(T::DbWeight::get().reads_writes(6, 8))
  }

  fn retry_refund() -> Weight {
    Weight::from_parts(30_000_000, 2600)
      .saturating_add(T::DbWeight::get().reads_writes(4, 5))
  }

  fn escape_refund() -> Weight {
    Weight::from_parts(30_000_000, 2600)
      .saturating_add(T::DbWeight::get().reads_writes(5, 5))
  }

  fn set_owner() -> Weight {
    Weight::from_parts(8_000_000, 600)
      .saturating_add(T::DbWeight::get().reads_writes(1, 1))
  }

  fn set_delay() -> Weight {
    Weight::from_parts(8_000_000, 600)
      .saturating_add(T::DbWeight::get().reads_writes(1, 1))
  }

  fn set_bot_window() -> Weight {
    Weight::from_parts(8_000_000, 600)
      .saturating_add(T::DbWeight::get().reads_writes(1, 1))
  }

  fn set_fee_price() -> Weight {
    Weight::from_parts(9_000_000, 700)
      .saturating_add(T::DbWeight::get().reads_writes(2, 1))
  }

  fn set_fee_price_params() -> Weight {
    Weight::from_parts(9_000_000, 700)
      .saturating_add(T::DbWeight::get().reads_writes(2, 1))
  }

  fn set_fee_limit_bounds() -> Weight {
    Weight::from_parts(8_000_000, 600)
      .saturating_add(T::DbWeight::get().reads_writes(1, 1))
  }

  fn set_keeper() -> Weight {
    Weight::from_parts(9_000_000, 800)
      .saturating_add(T::DbWeight::get().reads_writes(1, 1))
  }

  fn set_open_execution() -> Weight {
    Weight::from_parts(8_000_000, 600)
      .saturating_add(T::DbWeight::get().reads_writes(1, 1))
  }

  fn set_transfer_cost() -> Weight {
    Weight::from_parts(9_000_000, 800)
      .saturating_add(T::DbWeight::get().reads_writes(1, 1))
  }

  fn set_order_kind_disabled() -> Weight {
    Weight::from_parts(10_000_000, 900)
      .saturating_add(T::DbWeight::get().reads_writes(2, 1))
  }

  fn set_min_ratio_change() -> Weight {
    Weight::from_parts(8_000_000, 600)
      .saturating_add(T::DbWeight::get().reads_writes(1, 1))
  }
}

impl WeightInfo for () {
  fn submit_deposit() -> Weight { Weight::from_parts(55_000_000, 3600) }
  fn submit_withdraw() -> Weight { Weight::from_parts(45_000_000, 3400) }
  fn submit_sell() -> Weight { Weight::from_parts(45_000_000, 3400) }
  fn submit_buy() -> Weight { Weight::from_parts(45_000_000, 3400) }
  fn execute() -> Weight { Weight::from_parts(90_000_000, 4200) }
  fn cancel_order() -> Weight { Weight::from_parts(40_000_000, 3000) }
  fn retry_refund() -> Weight { Weight::from_parts(30_000_000, 2600) }
  fn escape_refund() -> Weight { Weight::from_parts(30_000_000, 2600) }
  fn set_owner() -> Weight { Weight::from_parts(8_000_000, 600) }
  fn set_delay() -> Weight { Weight::from_parts(8_000_000, 600) }
  fn set_bot_window() -> Weight { Weight::from_parts(8_000_000, 600) }
  fn set_fee_price() -> Weight { Weight::from_parts(9_000_000, 700) }
  fn set_fee_price_params() -> Weight { Weight::from_parts(9_000_000, 700) }
  fn set_fee_limit_bounds() -> Weight { Weight::from_parts(8_000_000, 600) }
  fn set_keeper() -> Weight { Weight::from_parts(9_000_000, 800) }
  fn set_open_execution() -> Weight { Weight::from_parts(8_000_000, 600) }
  fn set_transfer_cost() -> Weight { Weight::from_parts(9_000_000, 800) }
  fn set_order_kind_disabled() -> Weight { Weight::from_parts(10_000_000, 900) }
  fn set_min_ratio_change() -> Weight { Weight::from_parts(8_000_000, 600) }
}
