//! Endpoint configuration for chain connections.
//!
//! The bridge dictionary carries one default RPC URL per chain. These public
//! endpoints are tried after it when the default does not answer.

use xbridge_core::Chain;

/// Multicall3, deployed at the same address on every supported chain.
pub const MULTICALL3_ADDRESS: &str = "0xcA11bde05977b3631167028862bE2a173976CA11";

/// Seconds to wait for an endpoint to answer a probe.
pub const PROBE_TIMEOUT_SECS: u64 = 10;

/// Get fallback JSON-RPC endpoints for a chain.
pub fn get_rpc_endpoints(chain: Chain) -> &'static [&'static str] {
    match chain {
        Chain::Rsk => &["https://public-node.rsk.co", "https://mycrypto.rsk.co"],
        Chain::Eth => &[
            "https://ethereum-rpc.publicnode.com",
            "https://eth.llamarpc.com",
            "https://rpc.ankr.com/eth",
        ],
        Chain::Bsc => &[
            "https://bsc-dataseed.binance.org",
            "https://bsc-dataseed1.defibit.io",
            "https://bsc-rpc.publicnode.com",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_chain_has_fallbacks() {
        for chain in Chain::all() {
            let endpoints = get_rpc_endpoints(*chain);
            assert!(!endpoints.is_empty());
            assert!(endpoints.iter().all(|e| e.starts_with("https://")));
        }
    }

    #[test]
    fn test_multicall_address_parses() {
        assert!(MULTICALL3_ADDRESS.parse::<ethers::types::Address>().is_ok());
    }
}
