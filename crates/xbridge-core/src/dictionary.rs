//! Static bridge dictionaries.
//!
//! Networks, bridges and the source assets each bridge accepts. Loaded once
//! (bundled JSON or an override file) and read-only afterwards.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

use crate::amount::parse_amount;
use crate::types::{Balance, Chain, CrossBridgeAsset};

const BUNDLED_DICTIONARY: &str = include_str!("../data/bridges.json");

/// Largest supported token decimals.
const MAX_DECIMALS: u8 = 36;

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid dictionary: {0}")]
    Invalid(String),
}

/// Chain network description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkModel {
    pub chain: Chain,
    pub name: String,
    pub chain_id: u64,
    /// Default JSON-RPC endpoint.
    pub rpc_url: String,
    pub explorer_url: String,
    /// Multicall3 contract used for batched reads.
    pub multicall_address: String,
}

impl NetworkModel {
    pub fn tx_url(&self, hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), hash)
    }
}

/// A source asset accepted by a bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetModel {
    pub asset: CrossBridgeAsset,
    pub symbol: String,
    pub decimals: u8,
    /// Token contract on the source chain (zero address for native coins).
    pub token_contract_address: String,
    #[serde(default)]
    pub is_native: bool,
    /// Target-chain assets this source asset ends up as.
    pub aggregated_tokens: Vec<CrossBridgeAsset>,
    /// Deposits are routed through an aggregator contract on the target chain.
    #[serde(default)]
    pub uses_aggregator: bool,
    /// The aggregator mints the target asset, so it has no liquidity limit.
    #[serde(default)]
    pub aggregator_mints: bool,
    #[serde(default)]
    pub aggregator_contract_address: Option<String>,
    /// Bridged token address on the target chain, per aggregated asset.
    #[serde(default)]
    pub bridge_token_addresses: HashMap<CrossBridgeAsset, String>,
    /// Minimum deposit in whole tokens.
    #[serde(default)]
    pub min_amount: Option<String>,
    /// Maximum deposit in whole tokens.
    #[serde(default)]
    pub max_amount: Option<String>,
}

impl AssetModel {
    pub fn min_amount_units(&self) -> Option<Balance> {
        self.min_amount
            .as_deref()
            .and_then(|m| parse_amount(m, self.decimals).ok())
    }

    pub fn max_amount_units(&self) -> Option<Balance> {
        self.max_amount
            .as_deref()
            .and_then(|m| parse_amount(m, self.decimals).ok())
    }

    /// Its liquidity on the target chain is limited by what the aggregator holds.
    pub fn has_aggregator_limit(&self) -> bool {
        self.uses_aggregator && !self.aggregator_mints
    }

    /// Address whose aggregator balance bounds deposits into `target_asset`.
    pub fn limit_token_address(&self, target_asset: CrossBridgeAsset) -> &str {
        self.bridge_token_addresses
            .get(&target_asset)
            .map(String::as_str)
            .unwrap_or(&self.token_contract_address)
    }
}

/// A bridge between two chains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeModel {
    pub source: Chain,
    pub target: Chain,
    /// Bridge contract on the source chain.
    pub bridge_contract_address: String,
    pub assets: Vec<AssetModel>,
}

impl BridgeModel {
    pub fn asset(&self, asset: CrossBridgeAsset) -> Option<&AssetModel> {
        self.assets.iter().find(|a| a.asset == asset)
    }
}

/// Lookup of network descriptions by chain.
#[derive(Debug, Clone, Default)]
pub struct BridgeNetworkDictionary {
    networks: Vec<NetworkModel>,
}

impl BridgeNetworkDictionary {
    pub fn get(&self, chain: Chain) -> Option<&NetworkModel> {
        self.networks.iter().find(|n| n.chain == chain)
    }

    pub fn all(&self) -> &[NetworkModel] {
        &self.networks
    }
}

/// Lookup of bridges by (source, target) chain pair.
#[derive(Debug, Clone, Default)]
pub struct BridgeDictionary {
    bridges: Vec<BridgeModel>,
}

impl BridgeDictionary {
    pub fn get(&self, source: Chain, target: Chain) -> Option<&BridgeModel> {
        self.bridges
            .iter()
            .find(|b| b.source == source && b.target == target)
    }

    /// Source assets that end up as `target_asset`; empty when no bridge exists.
    pub fn source_assets(
        &self,
        source: Chain,
        target: Chain,
        target_asset: CrossBridgeAsset,
    ) -> Vec<&AssetModel> {
        self.get(source, target)
            .map(|bridge| {
                bridge
                    .assets
                    .iter()
                    .filter(|a| a.aggregated_tokens.contains(&target_asset))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Source chains with a bridge into `target`.
    pub fn sources_for(&self, target: Chain) -> Vec<Chain> {
        let mut sources: Vec<Chain> = self
            .bridges
            .iter()
            .filter(|b| b.target == target)
            .map(|b| b.source)
            .collect();
        sources.sort();
        sources.dedup();
        sources
    }
}

#[derive(Debug, Deserialize)]
struct DictionaryFile {
    networks: Vec<NetworkModel>,
    bridges: Vec<BridgeModel>,
}

/// Both dictionaries, loaded together.
#[derive(Debug, Clone, Default)]
pub struct Dictionaries {
    pub networks: BridgeNetworkDictionary,
    pub bridges: BridgeDictionary,
}

impl Dictionaries {
    /// Dictionaries compiled into the binary.
    pub fn bundled() -> Result<Self, DictionaryError> {
        Self::from_json(BUNDLED_DICTIONARY)
    }

    /// Load an override file.
    pub fn load(path: &Path) -> Result<Self, DictionaryError> {
        let content = std::fs::read_to_string(path)?;
        let dictionaries = Self::from_json(&content)?;
        tracing::info!(
            "Loaded {} bridge(s) from {}",
            dictionaries.bridges.bridges.len(),
            path.display()
        );
        Ok(dictionaries)
    }

    pub fn from_json(content: &str) -> Result<Self, DictionaryError> {
        let file: DictionaryFile = serde_json::from_str(content)?;
        validate(&file)?;
        Ok(Self {
            networks: BridgeNetworkDictionary {
                networks: file.networks,
            },
            bridges: BridgeDictionary {
                bridges: file.bridges,
            },
        })
    }
}

fn validate(file: &DictionaryFile) -> Result<(), DictionaryError> {
    let invalid = |msg: String| -> Result<(), DictionaryError> { Err(DictionaryError::Invalid(msg)) };

    let mut chains = HashSet::new();
    for network in &file.networks {
        if !chains.insert(network.chain) {
            return invalid(format!("duplicate network {}", network.chain));
        }
        if network.chain_id != network.chain.chain_id() {
            return invalid(format!(
                "{} has chain id {}, expected {}",
                network.chain,
                network.chain_id,
                network.chain.chain_id()
            ));
        }
    }

    let mut pairs = HashSet::new();
    for bridge in &file.bridges {
        let pair = (bridge.source, bridge.target);
        if !pairs.insert(pair) {
            return invalid(format!("duplicate bridge {} -> {}", pair.0, pair.1));
        }
        for chain in [bridge.source, bridge.target] {
            if !chains.contains(&chain) {
                return invalid(format!("bridge uses unknown network {}", chain));
            }
        }
        for asset in &bridge.assets {
            let name = format!("{} on {} -> {}", asset.symbol, bridge.source, bridge.target);
            if asset.decimals > MAX_DECIMALS {
                return invalid(format!("{}: {} decimals", name, asset.decimals));
            }
            if asset.aggregated_tokens.is_empty() {
                return invalid(format!("{}: no aggregated tokens", name));
            }
            if asset.uses_aggregator && asset.aggregator_contract_address.is_none() {
                return invalid(format!("{}: aggregator address missing", name));
            }
            if asset.is_native && asset.has_aggregator_limit() {
                // Native coins have no token contract on the target chain.
                for target_asset in &asset.aggregated_tokens {
                    if !asset.bridge_token_addresses.contains_key(target_asset) {
                        return invalid(format!(
                            "{}: bridged token address for {} missing",
                            name, target_asset
                        ));
                    }
                }
            }
            for (label, amount) in [("min", &asset.min_amount), ("max", &asset.max_amount)] {
                if let Some(amount) = amount
                    && parse_amount(amount, asset.decimals).is_err()
                {
                    return invalid(format!("{}: bad {} amount '{}'", name, label, amount));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundled() -> Dictionaries {
        Dictionaries::bundled().expect("bundled dictionary is valid")
    }

    #[test]
    fn test_bundled_has_every_chain() {
        let dict = bundled();
        for chain in Chain::all() {
            let network = dict.networks.get(*chain).unwrap();
            assert_eq!(network.chain_id, chain.chain_id());
        }
    }

    #[test]
    fn test_bridges_into_home_chain() {
        let dict = bundled();
        assert_eq!(dict.bridges.sources_for(Chain::Rsk), vec![Chain::Eth, Chain::Bsc]);
        assert!(dict.bridges.get(Chain::Rsk, Chain::Eth).is_none());
    }

    #[test]
    fn test_source_assets_filter_by_target() {
        let dict = bundled();
        let xusd: Vec<_> = dict
            .bridges
            .source_assets(Chain::Eth, Chain::Rsk, CrossBridgeAsset::Xusd)
            .iter()
            .map(|a| a.asset)
            .collect();
        assert_eq!(
            xusd,
            vec![CrossBridgeAsset::Usdt, CrossBridgeAsset::Usdc, CrossBridgeAsset::Dai]
        );

        let eths = dict
            .bridges
            .source_assets(Chain::Bsc, Chain::Rsk, CrossBridgeAsset::Eths);
        assert_eq!(eths.len(), 1);
        assert_eq!(eths[0].asset, CrossBridgeAsset::Eth);
    }

    #[test]
    fn test_source_assets_empty_without_bridge() {
        let dict = bundled();
        assert!(dict
            .bridges
            .source_assets(Chain::Rsk, Chain::Bsc, CrossBridgeAsset::Eths)
            .is_empty());
        assert!(dict
            .bridges
            .source_assets(Chain::Eth, Chain::Rsk, CrossBridgeAsset::Bnbs)
            .is_empty());
    }

    #[test]
    fn test_limit_token_address_prefers_bridged_token() {
        let dict = bundled();
        let bridge = dict.bridges.get(Chain::Eth, Chain::Rsk).unwrap();
        let eth = bridge.asset(CrossBridgeAsset::Eth).unwrap();
        assert!(eth.has_aggregator_limit());
        assert_eq!(
            eth.limit_token_address(CrossBridgeAsset::Eths),
            "0xFe878227c8F334038DAb20a99fC3B373fFe0a755"
        );
        let sov = bridge.asset(CrossBridgeAsset::Sov).unwrap();
        assert_eq!(
            sov.limit_token_address(CrossBridgeAsset::Sov),
            sov.token_contract_address
        );
    }

    #[test]
    fn test_amount_bounds() {
        let dict = bundled();
        let usdt = dict
            .bridges
            .get(Chain::Eth, Chain::Rsk)
            .and_then(|b| b.asset(CrossBridgeAsset::Usdt))
            .unwrap();
        assert_eq!(usdt.min_amount_units(), Some(10_000_000));
        assert_eq!(usdt.max_amount_units(), Some(75_000_000_000));
    }

    const MINIMAL: &str = r#"{
        "networks": [
            {"chain": "RSK", "name": "RSK", "chain_id": 30, "rpc_url": "http://localhost:4444",
             "explorer_url": "http://explorer/", "multicall_address": "0x01"},
            {"chain": "ETH", "name": "ETH", "chain_id": 1, "rpc_url": "http://localhost:8545",
             "explorer_url": "http://etherscan", "multicall_address": "0x01"}
        ],
        "bridges": [
            {"source": "ETH", "target": "RSK", "bridge_contract_address": "0x02",
             "assets": [
                {"asset": "USDT", "symbol": "USDT", "decimals": 6,
                 "token_contract_address": "0x03", "aggregated_tokens": ["XUSD"]}
             ]}
        ]
    }"#;

    #[test]
    fn test_from_json_defaults() {
        let dict = Dictionaries::from_json(MINIMAL).unwrap();
        let asset = &dict.bridges.source_assets(Chain::Eth, Chain::Rsk, CrossBridgeAsset::Xusd)[0];
        assert!(!asset.uses_aggregator);
        assert!(!asset.is_native);
        assert_eq!(asset.min_amount_units(), None);
        let rsk = dict.networks.get(Chain::Rsk).unwrap();
        assert_eq!(rsk.tx_url("0xabc"), "http://explorer/tx/0xabc");
    }

    #[test]
    fn test_rejects_unknown_network() {
        let json = MINIMAL.replace(r#""source": "ETH""#, r#""source": "BSC""#);
        assert!(matches!(
            Dictionaries::from_json(&json),
            Err(DictionaryError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_wrong_chain_id() {
        let json = MINIMAL.replace(r#""chain_id": 1,"#, r#""chain_id": 5,"#);
        assert!(matches!(
            Dictionaries::from_json(&json),
            Err(DictionaryError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_aggregator_without_address() {
        let json = MINIMAL.replace(
            r#""aggregated_tokens": ["XUSD"]"#,
            r#""aggregated_tokens": ["XUSD"], "uses_aggregator": true"#,
        );
        assert!(matches!(
            Dictionaries::from_json(&json),
            Err(DictionaryError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Dictionaries::from_json("{"),
            Err(DictionaryError::Json(_))
        ));
    }
}
