//! Entering the deposit wizard from the wallet page.

use thiserror::Error;

use crate::deposit::DepositAction;
use crate::types::{Asset, CrossBridgeAsset};

/// Compatibility remapping applied to incoming assets before the generic
/// symbol mapping. The wallet still calls ETHs "ETH".
const DIRTY_DEPOSIT_ASSETS: &[(Asset, CrossBridgeAsset)] = &[(Asset::Eth, CrossBridgeAsset::Eths)];

/// State handed over by the page that opens the wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    pub receiver: Option<String>,
    pub asset: Option<Asset>,
}

impl NavigationState {
    pub fn new(receiver: impl Into<String>, asset: Asset) -> Self {
        Self {
            receiver: Some(receiver.into()),
            asset: Some(asset),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("Deposit needs both a receiver and an asset")]
    MissingPrecondition,

    #[error("{0} cannot be deposited through the bridge")]
    UnsupportedAsset(Asset),
}

/// Validated wizard entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositEntry {
    pub receiver: String,
    pub target_asset: CrossBridgeAsset,
}

impl DepositEntry {
    /// Transition requests that open the wizard for this entry.
    pub fn actions(&self) -> [DepositAction; 3] {
        [
            DepositAction::Init,
            DepositAction::SelectReceiver(self.receiver.clone()),
            DepositAction::SelectTargetAsset(self.target_asset),
        ]
    }
}

/// Map a wallet asset to the bridge asset it is deposited as.
pub fn deposit_target_asset(asset: Asset) -> Option<CrossBridgeAsset> {
    DIRTY_DEPOSIT_ASSETS
        .iter()
        .find(|(dirty, _)| *dirty == asset)
        .map(|(_, clean)| *clean)
        .or_else(|| CrossBridgeAsset::from_asset(asset))
}

/// Validate navigation state. Any error means the caller goes back to the
/// wallet page instead of showing a wizard step.
pub fn enter(navigation: &NavigationState) -> Result<DepositEntry, EntryError> {
    let receiver = navigation
        .receiver
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or(EntryError::MissingPrecondition)?;
    let asset = navigation.asset.ok_or(EntryError::MissingPrecondition)?;

    let target_asset = deposit_target_asset(asset).ok_or(EntryError::UnsupportedAsset(asset))?;
    if CrossBridgeAsset::from_asset(asset) != Some(target_asset) {
        tracing::debug!("Remapped deposit asset {} to {}", asset, target_asset);
    }

    Ok(DepositEntry {
        receiver: receiver.to_string(),
        target_asset,
    })
}
