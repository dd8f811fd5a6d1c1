//! Trust bootstrap between a receiver and its remote sender.
//!
//! Until `setRegisteredSender` succeeds the receiver rejects every message
//! claiming to come from the source chain. Only one sender is registered per
//! source chain id; registering again silently replaces the previous one.

use alloy_core::primitives::{Address, B256};

use crate::{Confirmation, CourierError, Registrable};

/// Left-pad a 20-byte address into the 32-byte form used by message envelopes.
pub fn pad_address(address: Address) -> B256 {
    address.into_word()
}

pub struct RegistrationService;

impl RegistrationService {
    /// Register `sender` (deployed on `source_chain_id`) on the `receiver` contract.
    pub async fn register_sender<R: Registrable>(
        target_client: &R,
        receiver: Address,
        source_chain_id: u16,
        sender: Address,
    ) -> Result<Confirmation, CourierError> {
        tracing::info!(
            sender = %sender,
            receiver = %receiver,
            source_chain_id,
            "Registering sender as a valid emitter on the receiver..."
        );

        let confirmation = target_client
            .set_registered_sender(receiver, source_chain_id, pad_address(sender))
            .await?;

        tracing::info!(
            tx_hash = %confirmation.tx_hash,
            source_chain_id,
            "Sender registered"
        );

        Ok(confirmation)
    }
}
