// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::{str::FromStr, sync::Arc};

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::Message;
use crate::{
    derive::{compute_output_id, DerivationCache},
    error::Error,
    model::{
        output::{Address, Ed25519Address, Output},
        ProtocolParameters,
    },
    wire::{from_wire, Response},
};

/// Answers [`Message`]s against a snapshot of the protocol parameters.
///
/// The snapshot is only replaced by [`Message::SetProtocolParameters`]; operations in flight keep the snapshot they
/// started with.
#[derive(Debug)]
pub struct MessageHandler {
    protocol_parameters: RwLock<Arc<ProtocolParameters>>,
    cache: DerivationCache,
}

impl Default for MessageHandler {
    fn default() -> Self {
        Self::new(ProtocolParameters::default(), DerivationCache::DEFAULT_CAPACITY)
    }
}

impl MessageHandler {
    /// Creates a handler with the given parameters and a derivation cache of `cache_capacity` entries.
    pub fn new(protocol_parameters: ProtocolParameters, cache_capacity: usize) -> Self {
        Self {
            protocol_parameters: RwLock::new(Arc::new(protocol_parameters)),
            cache: DerivationCache::new(cache_capacity),
        }
    }

    /// The current protocol parameters snapshot.
    pub fn protocol_parameters(&self) -> Arc<ProtocolParameters> {
        self.protocol_parameters.read().clone()
    }

    /// Installs a new protocol parameters snapshot.
    pub fn set_protocol_parameters(&self, protocol_parameters: ProtocolParameters) {
        debug!(
            "installing protocol parameters version {} for network `{}`",
            protocol_parameters.version, protocol_parameters.network_name
        );
        *self.protocol_parameters.write() = Arc::new(protocol_parameters);
    }

    /// Answers a message given as JSON. Malformed messages are answered with an error response.
    pub fn handle_json(&self, message: Value) -> Response {
        match from_wire::<Message>(message) {
            Ok(message) => self.handle(message),
            Err(e) => {
                warn!("rejecting malformed message: {e}");
                Response::Error(Error::from(e).into_operation_error("parseMessage"))
            }
        }
    }

    /// Answers a message. Failures are reported as [`Response::Error`].
    #[instrument(skip_all, fields(operation = message.name()), level = "debug")]
    pub fn handle(&self, message: Message) -> Response {
        let operation = message.name();
        match self.try_handle(message) {
            Ok(response) => response,
            Err(e) => {
                warn!("{operation} failed: {e}");
                Response::Error(e.into_operation_error(operation))
            }
        }
    }

    fn try_handle(&self, message: Message) -> Result<Response, Error> {
        Ok(match message {
            Message::ComputeAliasId { output_id } => Response::ComputeAliasId(self.cache.alias_id(&output_id)),
            Message::ComputeNftId { output_id } => Response::ComputeNftId(self.cache.nft_id(&output_id)),
            Message::ComputeFoundryId {
                alias_address,
                serial_number,
                token_scheme_kind,
            } => Response::ComputeFoundryId(
                self.cache
                    .foundry_id(&alias_address, serial_number, token_scheme_kind)?,
            ),
            Message::ComputeOutputId {
                transaction_id,
                output_index,
            } => Response::ComputeOutputId(compute_output_id(transaction_id, output_index)?),
            Message::BuildBasicOutput(params) => {
                Response::BuildBasicOutput(params.finish(&self.protocol_parameters())?)
            }
            Message::BuildAliasOutput(params) => {
                Response::BuildAliasOutput(params.finish(&self.protocol_parameters())?)
            }
            Message::BuildFoundryOutput(params) => {
                Response::BuildFoundryOutput(params.finish(&self.protocol_parameters())?)
            }
            Message::BuildNftOutput(params) => Response::BuildNftOutput(params.finish(&self.protocol_parameters())?),
            Message::PackOutput { output } => Response::PackOutput(output.encode()?.into_boxed_slice()),
            Message::UnpackOutput { bytes } => Response::UnpackOutput(Output::decode(bytes)?),
            Message::MinimumStorageDeposit { output } => Response::MinimumStorageDeposit(
                self.protocol_parameters()
                    .rent_structure
                    .rent_cost(&output)?
                    .into(),
            ),
            Message::GetProtocolParameters => Response::ProtocolParameters(self.protocol_parameters().as_ref().clone()),
            Message::SetProtocolParameters(protocol_parameters) => {
                self.set_protocol_parameters(protocol_parameters);
                Response::ProtocolParameters(self.protocol_parameters().as_ref().clone())
            }
            Message::HexToBech32 { hex, bech32_hrp } => {
                let address = Address::Ed25519(Ed25519Address::from_str(&hex)?);
                let hrp = match bech32_hrp {
                    Some(hrp) => hrp,
                    None => self.protocol_parameters().bech32_hrp.clone(),
                };
                Response::HexToBech32(address.to_bech32(&hrp)?)
            }
            Message::Bech32ToHex { bech32 } => {
                let (_hrp, address) = Address::try_from_bech32(&bech32)?;
                Response::Bech32ToHex(match address {
                    Address::Ed25519(address) => address.to_hex(),
                    Address::Alias(alias_id) => alias_id.to_hex(),
                    Address::Nft(nft_id) => nft_id.to_hex(),
                })
            }
        })
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::{
        derive::{derive_alias_id, derive_foundry_id, derive_nft_id},
        model::{
            output::{AliasId, OutputId, UnlockCondition},
            TransactionId,
        },
        wire::BasicOutputBuilderParams,
    };

    #[test]
    fn identifier_operations() {
        let handler = MessageHandler::default();
        let output_id = OutputId::rand();
        assert_eq!(
            handler.handle(Message::ComputeAliasId { output_id }),
            Response::ComputeAliasId(derive_alias_id(&output_id))
        );
        assert_eq!(
            handler.handle(Message::ComputeNftId { output_id }),
            Response::ComputeNftId(derive_nft_id(&output_id))
        );

        let alias_address = Address::Alias(AliasId::rand());
        assert_eq!(
            handler.handle(Message::ComputeFoundryId {
                alias_address,
                serial_number: 5,
                token_scheme_kind: 0,
            }),
            Response::ComputeFoundryId(derive_foundry_id(&alias_address, 5, 0).unwrap())
        );

        let transaction_id = TransactionId::rand();
        assert_eq!(
            handler.handle(Message::ComputeOutputId {
                transaction_id,
                output_index: 3,
            }),
            Response::ComputeOutputId(OutputId::new(transaction_id, 3).unwrap())
        );
    }

    #[test]
    fn failures_become_operation_errors() {
        let handler = MessageHandler::default();
        let response = handler.handle(Message::ComputeOutputId {
            transaction_id: TransactionId::rand(),
            output_index: 1000,
        });
        match response {
            Response::Error(e) => {
                assert_eq!(e.operation, "computeOutputId");
                assert!(e.message.contains("1000"), "{}", e.message);
            }
            other => panic!("unexpected response {other:?}"),
        }

        match handler.handle_json(json!({ "name": "computeAliasId", "data": {} })) {
            Response::Error(e) => assert_eq!(e.operation, "parseMessage"),
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[test]
    fn pack_unpack_and_deposit() {
        let handler = MessageHandler::default();
        let output = match handler.handle(Message::BuildBasicOutput(
            BasicOutputBuilderParams::new()
                .with_unlock_condition(UnlockCondition::Address(Address::Ed25519(Ed25519Address::new([0; 32])))),
        )) {
            Response::BuildBasicOutput(output) => output,
            other => panic!("unexpected response {other:?}"),
        };
        assert_eq!(
            handler.handle(Message::MinimumStorageDeposit { output: output.clone() }),
            Response::MinimumStorageDeposit(42600u64.into())
        );

        let bytes = match handler.handle(Message::PackOutput { output: output.clone() }) {
            Response::PackOutput(bytes) => bytes,
            other => panic!("unexpected response {other:?}"),
        };
        assert_eq!(bytes.len(), 46);
        assert_eq!(
            handler.handle(Message::UnpackOutput { bytes }),
            Response::UnpackOutput(output)
        );
    }

    #[test]
    fn protocol_parameters_refresh() {
        let handler = MessageHandler::default();
        let hex = format!("0x{}", "00".repeat(32));
        let bech32 = match handler.handle(Message::HexToBech32 {
            hex: hex.clone(),
            bech32_hrp: None,
        }) {
            Response::HexToBech32(bech32) => bech32,
            other => panic!("unexpected response {other:?}"),
        };
        assert!(bech32.starts_with("smr1"));
        assert_eq!(
            handler.handle(Message::Bech32ToHex { bech32 }),
            Response::Bech32ToHex(hex.clone())
        );

        let mut params = ProtocolParameters::default();
        params.bech32_hrp = "rms".to_owned();
        params.network_name = "testnet".to_owned();
        assert_eq!(
            handler.handle(Message::SetProtocolParameters(params.clone())),
            Response::ProtocolParameters(params.clone())
        );
        assert_eq!(handler.handle(Message::GetProtocolParameters), Response::ProtocolParameters(params));
        match handler.handle(Message::HexToBech32 { hex, bech32_hrp: None }) {
            Response::HexToBech32(bech32) => assert!(bech32.starts_with("rms1")),
            other => panic!("unexpected response {other:?}"),
        }
    }
}
