//! Error types for chain operations.

use thiserror::Error;
use xbridge_core::Chain;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("Failed to connect to chain: {0}")]
    Connection(String),

    #[error("No endpoint configured for {0}")]
    UnknownChain(Chain),

    #[error("Provider error: {0}")]
    Provider(#[from] ethers::providers::ProviderError),

    #[error("ABI error: {0}")]
    Abi(#[from] ethers::abi::Error),

    #[error("ABI parse error: {0}")]
    AbiParse(#[from] ethers::abi::ParseError),

    #[error("Invalid address '{0}'")]
    InvalidAddress(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
