//! Batched read-only calls through Multicall3.

use crate::client::ChainReader;
use crate::error::ChainError;
use xbridge_core::{Chain, NetworkModel};

use ethers::abi::{parse_abi, Abi, Function, Token};
use ethers::types::{Address, Bytes};
use std::collections::HashMap;

const MULTICALL3_ABI: &[&str] = &[
    "function aggregate3((address,bool,bytes)[] calls) payable returns ((bool,bytes)[] returnData)",
];

/// One read-only call in a batch.
#[derive(Debug, Clone)]
pub struct MultiCallData {
    /// Contract to call.
    pub address: Address,
    /// ABI holding `fn_name`, used to encode `args` and decode the return.
    pub abi: Abi,
    pub fn_name: String,
    pub args: Vec<Token>,
    /// Key of the decoded return in the result map.
    pub key: String,
}

fn aggregate3() -> Result<Function, ChainError> {
    let abi = parse_abi(MULTICALL3_ABI)?;
    Ok(abi.function("aggregate3")?.clone())
}

/// Run `calls` on `chain` in one `eth_call`.
///
/// Sub-calls that revert, or whose return does not decode, are left out of
/// the result. An RPC or encoding error fails the whole batch.
pub async fn multi_call(
    reader: &dyn ChainReader,
    chain: Chain,
    network: &NetworkModel,
    calls: Vec<MultiCallData>,
) -> Result<HashMap<String, Vec<Token>>, ChainError> {
    if calls.is_empty() {
        return Ok(HashMap::new());
    }

    let multicall: Address = network
        .multicall_address
        .parse()
        .map_err(|_| ChainError::InvalidAddress(network.multicall_address.clone()))?;

    let mut functions = Vec::with_capacity(calls.len());
    let mut encoded = Vec::with_capacity(calls.len());
    for call in &calls {
        let function = call.abi.function(&call.fn_name)?;
        let data = function.encode_input(&call.args)?;
        encoded.push(Token::Tuple(vec![
            Token::Address(call.address),
            Token::Bool(true),
            Token::Bytes(data),
        ]));
        functions.push(function);
    }

    let aggregate = aggregate3()?;
    let data = aggregate.encode_input(&[Token::Array(encoded)])?;
    tracing::debug!("multicall of {} call(s) on {}", calls.len(), chain);
    let raw = reader.call(chain, multicall, Bytes::from(data)).await?;

    let decoded = aggregate.decode_output(&raw)?;
    let Some(Token::Array(results)) = decoded.into_iter().next() else {
        return Err(ChainError::InvalidData(
            "aggregate3 did not return an array".to_string(),
        ));
    };
    if results.len() != calls.len() {
        return Err(ChainError::InvalidData(format!(
            "aggregate3 returned {} results for {} calls",
            results.len(),
            calls.len()
        )));
    }

    let mut out = HashMap::new();
    for ((call, function), result) in calls.iter().zip(functions).zip(results) {
        let (success, return_data) = match result {
            Token::Tuple(fields) => match fields.as_slice() {
                [Token::Bool(success), Token::Bytes(data)] => (*success, data.clone()),
                _ => continue,
            },
            _ => continue,
        };
        if !success {
            tracing::debug!("{} ({}) reverted", call.key, call.fn_name);
            continue;
        }
        match function.decode_output(&return_data) {
            Ok(tokens) => {
                out.insert(call.key.clone(), tokens);
            }
            Err(e) => tracing::debug!("Could not decode {}: {}", call.key, e),
        }
    }
    Ok(out)
}
