//! Capability traits over the chain client.
//!
//! The workflows never talk to an RPC client directly. They go through these
//! per-contract capabilities, implemented by [`crate::EvmChainClient`] for real
//! networks and by in-memory doubles in tests.

use std::future::Future;

use alloy_core::primitives::{Address, B256, U256};

use crate::{BridgeInfra, ChainDescriptor, ContractArtifact, CourierError};

/// An included, successful transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
}

/// Publish a contract and capture its address once included.
pub trait Deployable {
    fn deploy(
        &self,
        artifact: &ContractArtifact,
        infra: &BridgeInfra,
    ) -> impl Future<Output = Result<Address, CourierError>> + Send;
}

/// Bind a remote sender to a receiver contract.
pub trait Registrable {
    /// Submit `setRegisteredSender(source_chain, sender)` on `receiver` and await confirmation.
    fn set_registered_sender(
        &self,
        receiver: Address,
        source_chain: u16,
        sender: B256,
    ) -> impl Future<Output = Result<Confirmation, CourierError>> + Send;
}

/// Quote and submit cross-chain messages through a sender contract.
pub trait Sendable {
    /// Read-only delivery cost for one message to `target_chain`.
    fn quote_cross_chain_cost(
        &self,
        sender: Address,
        target_chain: u16,
    ) -> impl Future<Output = Result<U256, CourierError>> + Send;

    /// Native balance of the signing account.
    fn balance(&self) -> impl Future<Output = Result<U256, CourierError>> + Send;

    /// Submit `sendMessage` attaching exactly `value` and await confirmation.
    fn send_message(
        &self,
        sender: Address,
        target_chain: u16,
        target_address: Address,
        payload: &str,
        value: U256,
    ) -> impl Future<Output = Result<Confirmation, CourierError>> + Send;
}

/// Opens a signer-backed client for one network.
///
/// Every call returns a fresh client bound to the same operator credential.
pub trait ChainConnector {
    type Client: Deployable + Registrable + Sendable + Send + Sync;

    fn connect(
        &self,
        chain: &ChainDescriptor,
    ) -> impl Future<Output = Result<Self::Client, CourierError>> + Send;
}
