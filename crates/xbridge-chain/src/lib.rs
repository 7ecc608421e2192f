//! EVM chain access for bridge deposits.
//!
//! - `client`: one ethers HTTP provider per bridge network, behind the
//!   [`ChainReader`] trait
//! - `multicall`: batched read-only calls through Multicall3
//! - `queries`: aggregator liquidity limits
//! - `transactions`: unsigned deposit calls and receipt polling

pub mod client;
pub mod config;
pub mod error;
pub mod multicall;
pub mod queries;
pub mod transactions;

pub use client::*;
pub use config::*;
pub use error::*;
pub use multicall::{multi_call, MultiCallData};
pub use queries::aggregator::{aggregator_balance_calls, load_aggregator_limits, AggregatorLimits};
pub use transactions::{
    build_deposit, encode_for_qr, parse_tx_hash, wait_for_receipt, UnsignedCall, UnsignedDeposit,
};
