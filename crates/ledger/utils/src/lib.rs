#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod env;
pub mod parse;
mod tx;
pub mod units;

pub use tx::*;
