//! Aggregator liquidity limits for the token selector.
//!
//! A source asset routed through an aggregator that does not mint can only
//! be deposited up to what the aggregator holds of the bridged token on the
//! target chain.

use crate::client::ChainReader;
use crate::error::ChainError;
use crate::multicall::{multi_call, MultiCallData};
use xbridge_core::{AssetModel, Balance, CrossBridgeAsset, Dictionaries, LimitsContext};

use ethers::abi::{parse_abi, Token};
use ethers::types::{Address, U256};
use std::collections::HashMap;

const ERC20_BALANCE_ABI: &[&str] = &["function balanceOf(address owner) view returns (uint256)"];

/// Aggregator balance per source asset symbol, in base units.
pub type AggregatorLimits = HashMap<String, Balance>;

fn parse_address(value: &str) -> Result<Address, ChainError> {
    value
        .parse()
        .map_err(|_| ChainError::InvalidAddress(value.to_string()))
}

/// One `balanceOf(aggregator)` call per asset whose deposits are limited by
/// aggregator liquidity.
pub fn aggregator_balance_calls(
    assets: &[&AssetModel],
    target_asset: CrossBridgeAsset,
) -> Result<Vec<MultiCallData>, ChainError> {
    let abi = parse_abi(ERC20_BALANCE_ABI)?;
    let mut calls = Vec::new();
    for asset in assets.iter().filter(|a| a.has_aggregator_limit()) {
        let Some(aggregator) = asset.aggregator_contract_address.as_deref() else {
            continue;
        };
        calls.push(MultiCallData {
            address: parse_address(asset.limit_token_address(target_asset))?,
            abi: abi.clone(),
            fn_name: "balanceOf".to_string(),
            args: vec![Token::Address(parse_address(aggregator)?)],
            key: asset.symbol.clone(),
        });
    }
    Ok(calls)
}

fn to_balance(value: U256) -> Balance {
    if value.bits() > 128 {
        Balance::MAX
    } else {
        value.low_u128()
    }
}

async fn query_limits(
    reader: &dyn ChainReader,
    dictionaries: &Dictionaries,
    context: LimitsContext,
) -> Result<AggregatorLimits, ChainError> {
    let assets =
        dictionaries
            .bridges
            .source_assets(context.chain, context.target_chain, context.target_asset);
    let calls = aggregator_balance_calls(&assets, context.target_asset)?;
    if calls.is_empty() {
        return Ok(AggregatorLimits::new());
    }

    let network = dictionaries
        .networks
        .get(context.target_chain)
        .ok_or(ChainError::UnknownChain(context.target_chain))?;
    let results = multi_call(reader, context.target_chain, network, calls).await?;

    Ok(results
        .into_iter()
        .filter_map(|(symbol, tokens)| match tokens.first() {
            Some(Token::Uint(value)) => Some((symbol, to_balance(*value))),
            _ => None,
        })
        .collect())
}

/// Fetch aggregator limits for the token selector. Never fails: an error is
/// logged and yields no limits.
pub async fn load_aggregator_limits(
    reader: &dyn ChainReader,
    dictionaries: &Dictionaries,
    context: LimitsContext,
) -> AggregatorLimits {
    match query_limits(reader, dictionaries, context).await {
        Ok(limits) => {
            tracing::debug!(
                "Loaded {} aggregator limit(s) for {} -> {} {}",
                limits.len(),
                context.chain,
                context.target_chain,
                context.target_asset
            );
            limits
        }
        Err(e) => {
            tracing::warn!(
                "Failed to load aggregator limits for {} -> {}: {}",
                context.chain,
                context.target_chain,
                e
            );
            AggregatorLimits::new()
        }
    }
}
