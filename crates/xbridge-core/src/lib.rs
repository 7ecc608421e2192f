//! Core domain logic for cross-chain bridge deposits.
//!
//! This crate provides:
//! - Domain types: chains and asset identifiers (`types` module)
//! - The deposit wizard state and reducer (`deposit` module)
//! - Validation of wizard entry from the wallet page (`entry` module)
//! - Static bridge and network dictionaries (`dictionary` module)
//! - Token amount parsing and formatting (`amount` module)
//!
//! With the `persistence` feature enabled:
//! - Configuration management (`config` module)

pub mod amount;
pub mod deposit;
pub mod dictionary;
pub mod entry;
pub mod types;

#[cfg(feature = "persistence")]
pub mod config;

pub use amount::*;
pub use deposit::*;
pub use dictionary::*;
pub use entry::*;
pub use types::*;

#[cfg(feature = "persistence")]
pub use config::{AppConfig, ConfigError, ThemeConfig};
