//! Core domain types for bridge deposits.

use serde::{Deserialize, Serialize};

/// Amount in token base units.
pub type Balance = u128;

/// Chains the bridge connects - exhaustive match required (no default case).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Chain {
    Rsk,
    Eth,
    Bsc,
}

impl Chain {
    /// EIP-155 chain id.
    pub fn chain_id(&self) -> u64 {
        match self {
            Chain::Rsk => 30,
            Chain::Eth => 1,
            Chain::Bsc => 56,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Chain::Rsk => "RSK",
            Chain::Eth => "Ethereum",
            Chain::Bsc => "BSC",
        }
    }

    /// Symbol of the chain's native coin.
    pub fn native_symbol(&self) -> &'static str {
        match self {
            Chain::Rsk => "RBTC",
            Chain::Eth => "ETH",
            Chain::Bsc => "BNB",
        }
    }

    /// The chain every deposit lands on.
    pub fn home() -> Chain {
        Chain::Rsk
    }

    /// Returns all known chains.
    pub fn all() -> &'static [Chain] {
        &[Chain::Rsk, Chain::Eth, Chain::Bsc]
    }

    /// Chains a deposit can start from.
    pub fn deposit_sources() -> &'static [Chain] {
        &[Chain::Eth, Chain::Bsc]
    }
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for Chain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rsk" | "rootstock" => Ok(Chain::Rsk),
            "eth" | "ethereum" => Ok(Chain::Eth),
            "bsc" | "bnb" | "binance" => Ok(Chain::Bsc),
            _ => Err(format!(
                "Unknown chain '{}'. Valid options: rsk, eth, bsc",
                s
            )),
        }
    }
}

/// Wallet-side asset identifiers, as handed over by the wallet page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Asset {
    Rbtc,
    Sov,
    Xusd,
    Eth,
    Bnb,
    Doc,
    Usdt,
    Bpro,
    Fish,
    Moc,
}

impl Asset {
    pub fn symbol(&self) -> &'static str {
        match self {
            Asset::Rbtc => "RBTC",
            Asset::Sov => "SOV",
            Asset::Xusd => "XUSD",
            Asset::Eth => "ETH",
            Asset::Bnb => "BNB",
            Asset::Doc => "DOC",
            Asset::Usdt => "USDT",
            Asset::Bpro => "BPRO",
            Asset::Fish => "FISH",
            Asset::Moc => "MOC",
        }
    }

    pub fn all() -> &'static [Asset] {
        &[
            Asset::Rbtc,
            Asset::Sov,
            Asset::Xusd,
            Asset::Eth,
            Asset::Bnb,
            Asset::Doc,
            Asset::Usdt,
            Asset::Bpro,
            Asset::Fish,
            Asset::Moc,
        ]
    }
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl std::str::FromStr for Asset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Asset::all()
            .iter()
            .find(|a| a.symbol().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("Unknown asset '{}'", s))
    }
}

/// Asset identifiers used by the bridge dictionaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CrossBridgeAsset {
    Rbtc,
    Sov,
    Xusd,
    Eth,
    Eths,
    Bnb,
    Bnbs,
    Usdt,
    Usdc,
    Dai,
    Busd,
}

impl CrossBridgeAsset {
    pub fn symbol(&self) -> &'static str {
        match self {
            CrossBridgeAsset::Rbtc => "RBTC",
            CrossBridgeAsset::Sov => "SOV",
            CrossBridgeAsset::Xusd => "XUSD",
            CrossBridgeAsset::Eth => "ETH",
            CrossBridgeAsset::Eths => "ETHs",
            CrossBridgeAsset::Bnb => "BNB",
            CrossBridgeAsset::Bnbs => "BNBs",
            CrossBridgeAsset::Usdt => "USDT",
            CrossBridgeAsset::Usdc => "USDC",
            CrossBridgeAsset::Dai => "DAI",
            CrossBridgeAsset::Busd => "BUSD",
        }
    }

    /// Counterpart of a wallet asset with the same symbol, if the bridge knows it.
    pub fn from_asset(asset: Asset) -> Option<CrossBridgeAsset> {
        match asset {
            Asset::Rbtc => Some(CrossBridgeAsset::Rbtc),
            Asset::Sov => Some(CrossBridgeAsset::Sov),
            Asset::Xusd => Some(CrossBridgeAsset::Xusd),
            Asset::Eth => Some(CrossBridgeAsset::Eth),
            Asset::Bnb => Some(CrossBridgeAsset::Bnb),
            Asset::Usdt => Some(CrossBridgeAsset::Usdt),
            Asset::Doc | Asset::Bpro | Asset::Fish | Asset::Moc => None,
        }
    }
}

impl std::fmt::Display for CrossBridgeAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Connection status for a chain endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected { block: u64 },
    Error(String),
}
