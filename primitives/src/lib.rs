#![cfg_attr(not(feature = "std"), no_std)]

pub mod assets;
pub mod compact;
pub mod ecosystem;

pub use assets::*;
pub use compact::*;
pub use ecosystem::*;
