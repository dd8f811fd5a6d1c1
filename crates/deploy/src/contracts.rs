//! Call encodings for the sender and receiver contracts.

use alloy_core::{
    primitives::{Address, B256, Bytes, U256},
    sol,
    sol_types::{SolCall, SolValue},
};

use crate::{BridgeInfra, CourierError};

sol! {
    /// Sender side of the cross-chain messaging pair.
    interface ICrossChainSender {
        function quoteCrossChainCost(uint16 targetChain) external view returns (uint256 cost);
        function sendMessage(uint16 targetChain, address targetAddress, string message) external payable;
    }

    /// Receiver side of the cross-chain messaging pair.
    interface ICrossChainReceiver {
        function setRegisteredSender(uint16 sourceChain, bytes32 sourceAddress) external;
    }
}

pub use ICrossChainReceiver::setRegisteredSenderCall;
pub use ICrossChainSender::{quoteCrossChainCostCall, sendMessageCall};

/// Creation code followed by the ABI-encoded `(relayer, tokenBridge, coreBridge)` constructor args.
pub fn deploy_code(bytecode: &Bytes, infra: &BridgeInfra) -> Bytes {
    let args = (infra.relayer, infra.token_bridge, infra.core_bridge).abi_encode_params();
    let mut code = Vec::with_capacity(bytecode.len() + args.len());
    code.extend_from_slice(bytecode);
    code.extend_from_slice(&args);
    Bytes::from(code)
}

pub fn quote_calldata(target_chain: u16) -> Bytes {
    quoteCrossChainCostCall {
        targetChain: target_chain,
    }
    .abi_encode()
    .into()
}

pub fn send_calldata(target_chain: u16, target_address: Address, message: &str) -> Bytes {
    sendMessageCall {
        targetChain: target_chain,
        targetAddress: target_address,
        message: message.to_string(),
    }
    .abi_encode()
    .into()
}

pub fn register_calldata(source_chain: u16, source_address: B256) -> Bytes {
    setRegisteredSenderCall {
        sourceChain: source_chain,
        sourceAddress: source_address,
    }
    .abi_encode()
    .into()
}

/// Decode the single `uint256` returned by `quoteCrossChainCost`.
pub fn decode_quote(output: &[u8]) -> Result<U256, CourierError> {
    if output.len() != 32 {
        return Err(CourierError::Contract(format!(
            "quoteCrossChainCost returned {} bytes, expected 32",
            output.len()
        )));
    }
    Ok(U256::from_be_slice(output))
}
