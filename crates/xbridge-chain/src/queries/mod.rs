//! Chain queries built on [`crate::multicall`].

pub mod aggregator;
