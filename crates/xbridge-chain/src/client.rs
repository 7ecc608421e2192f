//! JSON-RPC access to the bridge networks using ethers.
//!
//! One HTTP provider per chain. Each chain is connected independently, so a
//! dead BSC endpoint does not keep RSK reads from working.

use crate::config::{get_rpc_endpoints, PROBE_TIMEOUT_SECS};
use crate::error::ChainError;
use xbridge_core::{BridgeNetworkDictionary, Chain, ConnectionStatus};

use async_trait::async_trait;
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::{Address, Bytes, TransactionRequest, H256};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;

/// Per-chain RPC endpoint overrides.
#[derive(Debug, Clone, Default)]
pub struct RpcEndpoints {
    pub rsk: Option<String>,
    pub eth: Option<String>,
    pub bsc: Option<String>,
}

impl RpcEndpoints {
    pub fn get(&self, chain: Chain) -> Option<&str> {
        match chain {
            Chain::Rsk => self.rsk.as_deref(),
            Chain::Eth => self.eth.as_deref(),
            Chain::Bsc => self.bsc.as_deref(),
        }
    }

    pub fn set(&mut self, chain: Chain, url: String) {
        match chain {
            Chain::Rsk => self.rsk = Some(url),
            Chain::Eth => self.eth = Some(url),
            Chain::Bsc => self.bsc = Some(url),
        }
    }
}

/// Outcome of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    Success { block: u64 },
    Reverted { block: u64 },
}

/// Read-only chain access used by the multicall and receipt helpers.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Execute an `eth_call` against `to` with raw calldata.
    async fn call(&self, chain: Chain, to: Address, data: Bytes) -> Result<Bytes, ChainError>;

    /// Receipt of a transaction, `None` while it is not mined.
    async fn transaction_receipt(
        &self,
        chain: Chain,
        hash: H256,
    ) -> Result<Option<ReceiptStatus>, ChainError>;
}

/// Connected providers for every reachable bridge network.
#[derive(Debug, Clone, Default)]
pub struct BridgeNetwork {
    providers: HashMap<Chain, Provider<Http>>,
}

impl BridgeNetwork {
    /// Connect to all networks concurrently.
    ///
    /// Endpoints are tried in order: CLI/config override, dictionary default,
    /// then the built-in fallbacks. A chain with no answering endpoint is left
    /// out and reported as `ConnectionStatus::Error`.
    pub async fn connect(
        networks: &BridgeNetworkDictionary,
        overrides: &RpcEndpoints,
        status_tx: mpsc::Sender<(Chain, ConnectionStatus)>,
    ) -> Self {
        let attempts = Chain::all().iter().map(|&chain| {
            let mut endpoints: Vec<String> = Vec::new();
            if let Some(url) = overrides.get(chain) {
                endpoints.push(url.to_string());
            } else {
                if let Some(network) = networks.get(chain) {
                    endpoints.push(network.rpc_url.clone());
                }
                for fallback in get_rpc_endpoints(chain) {
                    if !endpoints.iter().any(|e| e == fallback) {
                        endpoints.push(fallback.to_string());
                    }
                }
            }
            let status_tx = status_tx.clone();
            async move {
                let _ = status_tx.send((chain, ConnectionStatus::Connecting)).await;
                match connect_chain(chain, &endpoints).await {
                    Ok((provider, block)) => {
                        let _ = status_tx
                            .send((chain, ConnectionStatus::Connected { block }))
                            .await;
                        Some((chain, provider))
                    }
                    Err(e) => {
                        tracing::error!("Could not connect to {}: {}", chain, e);
                        let _ = status_tx
                            .send((chain, ConnectionStatus::Error(e.to_string())))
                            .await;
                        None
                    }
                }
            }
        });

        let providers = futures::future::join_all(attempts)
            .await
            .into_iter()
            .flatten()
            .collect();
        Self { providers }
    }

    pub fn is_connected(&self, chain: Chain) -> bool {
        self.providers.contains_key(&chain)
    }

    fn provider(&self, chain: Chain) -> Result<&Provider<Http>, ChainError> {
        self.providers
            .get(&chain)
            .ok_or(ChainError::UnknownChain(chain))
    }

    pub async fn block_number(&self, chain: Chain) -> Result<u64, ChainError> {
        let block = self.provider(chain)?.get_block_number().await?;
        Ok(block.as_u64())
    }
}

async fn connect_chain(chain: Chain, endpoints: &[String]) -> Result<(Provider<Http>, u64), ChainError> {
    if endpoints.is_empty() {
        return Err(ChainError::Connection(
            "No RPC endpoints configured".to_string(),
        ));
    }

    let mut last_error = None;
    for endpoint in endpoints {
        tracing::info!("Trying {} via {}", chain, endpoint);

        let provider = match Provider::<Http>::try_from(endpoint.as_str()) {
            Ok(provider) => provider,
            Err(e) => {
                tracing::warn!("Invalid endpoint {}: {}", endpoint, e);
                last_error = Some(e.to_string());
                continue;
            }
        };

        let probe = tokio::time::timeout(
            Duration::from_secs(PROBE_TIMEOUT_SECS),
            provider.get_chainid(),
        )
        .await;
        match probe {
            Ok(Ok(id)) if id.as_u64() == chain.chain_id() => {}
            Ok(Ok(id)) => {
                tracing::warn!(
                    "{} reports chain id {}, expected {}",
                    endpoint,
                    id,
                    chain.chain_id()
                );
                last_error = Some(format!("wrong chain id {}", id));
                continue;
            }
            Ok(Err(e)) => {
                tracing::warn!("Failed to query {}: {}", endpoint, e);
                last_error = Some(e.to_string());
                continue;
            }
            Err(_) => {
                tracing::warn!("{} did not answer within {}s", endpoint, PROBE_TIMEOUT_SECS);
                last_error = Some("timeout".to_string());
                continue;
            }
        }

        match provider.get_block_number().await {
            Ok(block) => {
                tracing::info!("Connected to {} via {} at block {}", chain, endpoint, block);
                return Ok((provider, block.as_u64()));
            }
            Err(e) => {
                tracing::warn!("Failed to read block number from {}: {}", endpoint, e);
                last_error = Some(e.to_string());
            }
        }
    }

    Err(ChainError::Connection(
        last_error.unwrap_or_else(|| "All endpoints failed".to_string()),
    ))
}

#[async_trait]
impl ChainReader for BridgeNetwork {
    async fn call(&self, chain: Chain, to: Address, data: Bytes) -> Result<Bytes, ChainError> {
        let tx = TransactionRequest::new().to(to).data(data).into();
        let result = self.provider(chain)?.call(&tx, None).await?;
        Ok(result)
    }

    async fn transaction_receipt(
        &self,
        chain: Chain,
        hash: H256,
    ) -> Result<Option<ReceiptStatus>, ChainError> {
        let Some(receipt) = self.provider(chain)?.get_transaction_receipt(hash).await? else {
            return Ok(None);
        };
        // Mined receipts always carry a block number; pending ones are skipped.
        let Some(block) = receipt.block_number.map(|b| b.as_u64()) else {
            return Ok(None);
        };
        let status = match receipt.status.map(|s| s.as_u64()) {
            Some(0) => ReceiptStatus::Reverted { block },
            _ => ReceiptStatus::Success { block },
        };
        Ok(Some(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_endpoints_get_set() {
        let mut endpoints = RpcEndpoints::default();
        assert_eq!(endpoints.get(Chain::Eth), None);
        endpoints.set(Chain::Eth, "http://localhost:8545".to_string());
        assert_eq!(endpoints.get(Chain::Eth), Some("http://localhost:8545"));
        assert_eq!(endpoints.get(Chain::Rsk), None);
    }

    #[test]
    fn test_unconnected_chain_is_an_error() {
        let network = BridgeNetwork::default();
        assert!(!network.is_connected(Chain::Rsk));
        assert!(matches!(
            network.provider(Chain::Rsk),
            Err(ChainError::UnknownChain(Chain::Rsk))
        ));
    }

    #[tokio::test]
    async fn test_connect_chain_without_endpoints() {
        let result = connect_chain(Chain::Bsc, &[]).await;
        assert!(matches!(result, Err(ChainError::Connection(_))));
    }

    #[tokio::test]
    async fn test_connect_chain_rejects_malformed_url() {
        let result = connect_chain(Chain::Eth, &["not a url".to_string()]).await;
        assert!(matches!(result, Err(ChainError::Connection(_))));
    }
}
