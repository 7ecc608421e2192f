//! Unsigned deposit transactions and receipt tracking.
//!
//! Deposits are signed in an external wallet. This module only builds the
//! calls to sign and follows the resulting transaction until it is mined.

use crate::client::{ChainReader, ReceiptStatus};
use crate::error::ChainError;
use xbridge_core::{format_amount, AssetModel, BridgeModel, Chain, DepositSelection};

use ethers::abi::{encode, parse_abi, Abi, Token};
use ethers::types::{Address, Bytes, H256, U256};
use serde::Serialize;
use std::time::Duration;

const BRIDGE_ABI: &[&str] = &[
    "function receiveEthAt(address receiver, bytes extraData) payable",
    "function receiveTokensAt(address tokenToUse, uint256 amount, address receiver, bytes extraData)",
];

const ERC20_APPROVE_ABI: &[&str] = &["function approve(address spender, uint256 amount) returns (bool)"];

/// A single call for the external wallet to sign and send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnsignedCall {
    pub to: Address,
    pub data: Bytes,
    /// Native coin sent along, in wei.
    pub value: U256,
    /// Human-readable description of the call.
    pub description: String,
}

/// Calls making up one deposit, in signing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnsignedDeposit {
    pub chain_id: u64,
    pub calls: Vec<UnsignedCall>,
}

fn parse_address(value: &str) -> Result<Address, ChainError> {
    value
        .trim()
        .parse()
        .map_err(|_| ChainError::InvalidAddress(value.to_string()))
}

fn encode_call(abi: &Abi, name: &str, args: &[Token]) -> Result<Bytes, ChainError> {
    Ok(Bytes::from(abi.function(name)?.encode_input(args)?))
}

/// Build the calls for depositing `selection.amount` of `asset` over `bridge`.
///
/// When the asset goes through an aggregator, the bridge pays the aggregator
/// and the user receiver travels ABI-encoded in `extraData`.
pub fn build_deposit(
    bridge: &BridgeModel,
    asset: &AssetModel,
    selection: &DepositSelection,
) -> Result<UnsignedDeposit, ChainError> {
    let receiver = selection
        .receiver
        .as_deref()
        .ok_or_else(|| ChainError::InvalidData("no receiver selected".to_string()))?;
    let receiver = parse_address(receiver)?;
    let amount = selection
        .amount
        .filter(|a| *a > 0)
        .ok_or_else(|| ChainError::InvalidData("no amount selected".to_string()))?;

    let (bridge_receiver, extra_data) = if asset.uses_aggregator {
        let aggregator = asset.aggregator_contract_address.as_deref().ok_or_else(|| {
            ChainError::InvalidData(format!("{} has no aggregator address", asset.symbol))
        })?;
        (parse_address(aggregator)?, encode(&[Token::Address(receiver)]))
    } else {
        (receiver, Vec::new())
    };

    let bridge_address = parse_address(&bridge.bridge_contract_address)?;
    let bridge_abi = parse_abi(BRIDGE_ABI)?;
    let amount_label = format!("{} {}", format_amount(amount, asset.decimals, 8), asset.symbol);
    let target = bridge.target;

    let calls = if asset.is_native {
        vec![UnsignedCall {
            to: bridge_address,
            data: encode_call(
                &bridge_abi,
                "receiveEthAt",
                &[Token::Address(bridge_receiver), Token::Bytes(extra_data)],
            )?,
            value: U256::from(amount),
            description: format!("Deposit {} to {}", amount_label, target),
        }]
    } else {
        let token = parse_address(&asset.token_contract_address)?;
        let erc20 = parse_abi(ERC20_APPROVE_ABI)?;
        vec![
            UnsignedCall {
                to: token,
                data: encode_call(
                    &erc20,
                    "approve",
                    &[Token::Address(bridge_address), Token::Uint(U256::from(amount))],
                )?,
                value: U256::zero(),
                description: format!("Approve {} for the bridge", amount_label),
            },
            UnsignedCall {
                to: bridge_address,
                data: encode_call(
                    &bridge_abi,
                    "receiveTokensAt",
                    &[
                        Token::Address(token),
                        Token::Uint(U256::from(amount)),
                        Token::Address(bridge_receiver),
                        Token::Bytes(extra_data),
                    ],
                )?,
                value: U256::zero(),
                description: format!("Deposit {} to {}", amount_label, target),
            },
        ]
    };

    tracing::info!(
        "Built {} call(s) depositing {} from {} to {}",
        calls.len(),
        amount_label,
        bridge.source,
        target
    );
    Ok(UnsignedDeposit {
        chain_id: bridge.source.chain_id(),
        calls,
    })
}

/// Encode a deposit for display as a QR code (JSON).
pub fn encode_for_qr(deposit: &UnsignedDeposit) -> Result<Vec<u8>, ChainError> {
    Ok(serde_json::to_vec(deposit)?)
}

/// Parse a `0x`-prefixed transaction hash.
pub fn parse_tx_hash(text: &str) -> Result<H256, ChainError> {
    let text = text.trim();
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    let bytes = hex::decode(digits)
        .map_err(|e| ChainError::InvalidData(format!("bad transaction hash: {}", e)))?;
    if bytes.len() != 32 {
        return Err(ChainError::InvalidData(format!(
            "transaction hash has {} bytes, expected 32",
            bytes.len()
        )));
    }
    Ok(H256::from_slice(&bytes))
}

/// Poll for a receipt until the transaction is mined.
///
/// RPC errors while polling count as a missed attempt.
pub async fn wait_for_receipt(
    reader: &dyn ChainReader,
    chain: Chain,
    hash: H256,
    attempts: u32,
    interval: Duration,
) -> Result<ReceiptStatus, ChainError> {
    for attempt in 1..=attempts {
        match reader.transaction_receipt(chain, hash).await {
            Ok(Some(status)) => {
                tracing::info!("Transaction {:?} mined: {:?}", hash, status);
                return Ok(status);
            }
            Ok(None) => tracing::debug!("Transaction {:?} pending ({}/{})", hash, attempt, attempts),
            Err(e) => tracing::warn!("Receipt query for {:?} failed: {}", hash, e),
        }
        if attempt < attempts {
            tokio::time::sleep(interval).await;
        }
    }
    Err(ChainError::Timeout(format!(
        "no receipt for {:?} after {} attempts",
        hash, attempts
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multicall::tests::MockReader;
    use ethers::abi::decode;
    use ethers::abi::ParamType;
    use pretty_assertions::assert_eq;
    use xbridge_core::{CrossBridgeAsset, Dictionaries};

    const RECEIVER: &str = "0x00000000000000000000000000000000000000AB";

    fn bridge(source: Chain) -> BridgeModel {
        Dictionaries::bundled()
            .unwrap()
            .bridges
            .get(source, Chain::Rsk)
            .unwrap()
            .clone()
    }

    fn selection(amount: u128) -> DepositSelection {
        DepositSelection {
            chain: Some(Chain::Eth),
            target_chain: Some(Chain::Rsk),
            target_asset: Some(CrossBridgeAsset::Eths),
            source_asset: Some(CrossBridgeAsset::Eth),
            receiver: Some(RECEIVER.to_string()),
            amount: Some(amount),
        }
    }

    #[test]
    fn test_native_deposit_through_aggregator() {
        let bridge = bridge(Chain::Eth);
        let asset = bridge.asset(CrossBridgeAsset::Eth).unwrap();
        let deposit = build_deposit(&bridge, asset, &selection(10u128.pow(17))).unwrap();

        assert_eq!(deposit.chain_id, 1);
        assert_eq!(deposit.calls.len(), 1);
        let call = &deposit.calls[0];
        assert_eq!(call.to, parse_address(&bridge.bridge_contract_address).unwrap());
        assert_eq!(call.value, U256::from(10u128.pow(17)));
        assert_eq!(call.description, "Deposit 0.1 ETH to RSK");

        let tokens = decode(&[ParamType::Address, ParamType::Bytes], &call.data[4..]).unwrap();
        let aggregator = parse_address(asset.aggregator_contract_address.as_deref().unwrap()).unwrap();
        assert_eq!(tokens[0], Token::Address(aggregator));
        let user = encode(&[Token::Address(parse_address(RECEIVER).unwrap())]);
        assert_eq!(tokens[1], Token::Bytes(user));
    }

    #[test]
    fn test_token_deposit_approves_first() {
        let bridge = bridge(Chain::Eth);
        let asset = bridge.asset(CrossBridgeAsset::Sov).unwrap();
        let mut sel = selection(5 * 10u128.pow(18));
        sel.target_asset = Some(CrossBridgeAsset::Sov);
        sel.source_asset = Some(CrossBridgeAsset::Sov);
        let deposit = build_deposit(&bridge, asset, &sel).unwrap();

        assert_eq!(deposit.calls.len(), 2);
        let (approve, receive) = (&deposit.calls[0], &deposit.calls[1]);
        let token = parse_address(&asset.token_contract_address).unwrap();
        assert_eq!(approve.to, token);
        assert_eq!(approve.value, U256::zero());
        assert_eq!(receive.value, U256::zero());

        let tokens = decode(
            &[
                ParamType::Address,
                ParamType::Uint(256),
                ParamType::Address,
                ParamType::Bytes,
            ],
            &receive.data[4..],
        )
        .unwrap();
        assert_eq!(tokens[0], Token::Address(token));
        assert_eq!(tokens[1], Token::Uint(U256::from(5 * 10u128.pow(18))));
        // No aggregator: the user receives directly.
        assert_eq!(tokens[2], Token::Address(parse_address(RECEIVER).unwrap()));
        assert_eq!(tokens[3], Token::Bytes(vec![]));
    }

    #[test]
    fn test_missing_receiver_or_amount() {
        let bridge = bridge(Chain::Eth);
        let asset = bridge.asset(CrossBridgeAsset::Eth).unwrap();

        let mut sel = selection(1);
        sel.receiver = None;
        assert!(matches!(
            build_deposit(&bridge, asset, &sel),
            Err(ChainError::InvalidData(_))
        ));

        let mut sel = selection(1);
        sel.amount = None;
        assert!(matches!(
            build_deposit(&bridge, asset, &sel),
            Err(ChainError::InvalidData(_))
        ));

        let mut sel = selection(1);
        sel.receiver = Some("not-an-address".to_string());
        assert!(matches!(
            build_deposit(&bridge, asset, &sel),
            Err(ChainError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_encode_for_qr_is_json() {
        let bridge = bridge(Chain::Bsc);
        let asset = bridge.asset(CrossBridgeAsset::Bnb).unwrap();
        let mut sel = selection(10u128.pow(18));
        sel.chain = Some(Chain::Bsc);
        sel.source_asset = Some(CrossBridgeAsset::Bnb);
        sel.target_asset = Some(CrossBridgeAsset::Bnbs);
        let deposit = build_deposit(&bridge, asset, &sel).unwrap();

        let bytes = encode_for_qr(&deposit).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["chain_id"], 56);
        assert_eq!(value["calls"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_parse_tx_hash() {
        let hash = format!("0x{}", "ab".repeat(32));
        assert_eq!(parse_tx_hash(&hash).unwrap(), H256::repeat_byte(0xab));
        assert_eq!(
            parse_tx_hash(&format!("  {}  ", "cd".repeat(32))).unwrap(),
            H256::repeat_byte(0xcd)
        );
        assert!(parse_tx_hash("0x1234").is_err());
        assert!(parse_tx_hash("0xzz").is_err());
    }

    #[tokio::test]
    async fn test_wait_for_receipt_polls_until_mined() {
        let reader = MockReader::default();
        *reader.receipts.lock().unwrap() = vec![None, None, Some(ReceiptStatus::Success { block: 9 })];

        let status = wait_for_receipt(&reader, Chain::Eth, H256::zero(), 5, Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(status, ReceiptStatus::Success { block: 9 });
    }

    #[tokio::test]
    async fn test_wait_for_receipt_reports_revert() {
        let reader = MockReader::default();
        *reader.receipts.lock().unwrap() = vec![Some(ReceiptStatus::Reverted { block: 3 })];

        let status = wait_for_receipt(&reader, Chain::Eth, H256::zero(), 1, Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(status, ReceiptStatus::Reverted { block: 3 });
    }

    #[tokio::test]
    async fn test_wait_for_receipt_times_out() {
        let reader = MockReader::default();
        let result = wait_for_receipt(&reader, Chain::Eth, H256::zero(), 3, Duration::ZERO).await;
        assert!(matches!(result, Err(ChainError::Timeout(_))));
    }
}
