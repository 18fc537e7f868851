// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! A JSON message interface over the encoder, the deriver and the marshaling layer.
//!
//! Every [`Message`] is answered by exactly one [`Response`](crate::wire::Response).

mod handler;

use serde::{Deserialize, Serialize};

pub use self::handler::MessageHandler;
use crate::{
    model::{
        output::{Address, Output, OutputId, OutputIndex},
        ProtocolParameters, TransactionId,
    },
    wire::{AliasOutputBuilderParams, BasicOutputBuilderParams, FoundryOutputBuilderParams, NftOutputBuilderParams},
};

/// The operations a [`MessageHandler`] answers, as `{ "name": <operation>, "data": <arguments> }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", content = "data", rename_all = "camelCase")]
pub enum Message {
    /// Derives the alias ID created by an output.
    /// Expected response: [`ComputeAliasId`](crate::wire::Response::ComputeAliasId)
    #[serde(rename_all = "camelCase")]
    ComputeAliasId {
        /// Output ID
        output_id: OutputId,
    },
    /// Derives the NFT ID minted by an output.
    /// Expected response: [`ComputeNftId`](crate::wire::Response::ComputeNftId)
    #[serde(rename_all = "camelCase")]
    ComputeNftId {
        /// Output ID
        output_id: OutputId,
    },
    /// Derives a foundry ID.
    /// Expected response: [`ComputeFoundryId`](crate::wire::Response::ComputeFoundryId)
    #[serde(rename_all = "camelCase")]
    ComputeFoundryId {
        /// The controlling alias address
        alias_address: Address,
        /// Serial number, at most `u32::MAX`
        serial_number: u64,
        /// Token scheme kind
        token_scheme_kind: u8,
    },
    /// Builds an output ID.
    /// Expected response: [`ComputeOutputId`](crate::wire::Response::ComputeOutputId)
    #[serde(rename_all = "camelCase")]
    ComputeOutputId {
        /// Transaction ID
        transaction_id: TransactionId,
        /// Index of the output in the transaction
        output_index: OutputIndex,
    },
    /// Expected response: [`BuildBasicOutput`](crate::wire::Response::BuildBasicOutput)
    BuildBasicOutput(BasicOutputBuilderParams),
    /// Expected response: [`BuildAliasOutput`](crate::wire::Response::BuildAliasOutput)
    BuildAliasOutput(AliasOutputBuilderParams),
    /// Expected response: [`BuildFoundryOutput`](crate::wire::Response::BuildFoundryOutput)
    BuildFoundryOutput(FoundryOutputBuilderParams),
    /// Expected response: [`BuildNftOutput`](crate::wire::Response::BuildNftOutput)
    BuildNftOutput(NftOutputBuilderParams),
    /// Encodes an output.
    /// Expected response: [`PackOutput`](crate::wire::Response::PackOutput)
    PackOutput {
        /// The output to encode
        output: Output,
    },
    /// Decodes an output.
    /// Expected response: [`UnpackOutput`](crate::wire::Response::UnpackOutput)
    UnpackOutput {
        /// The canonical bytes as hex
        #[serde(with = "crate::model::util::hex_bytes")]
        bytes: Box<[u8]>,
    },
    /// Computes the storage deposit an output requires.
    /// Expected response: [`MinimumStorageDeposit`](crate::wire::Response::MinimumStorageDeposit)
    MinimumStorageDeposit {
        /// The output
        output: Output,
    },
    /// Expected response: [`ProtocolParameters`](crate::wire::Response::ProtocolParameters)
    GetProtocolParameters,
    /// Replaces the protocol parameters snapshot.
    /// Expected response: [`ProtocolParameters`](crate::wire::Response::ProtocolParameters)
    SetProtocolParameters(ProtocolParameters),
    /// Transforms a hex encoded Ed25519 address to bech32.
    /// Expected response: [`HexToBech32`](crate::wire::Response::HexToBech32)
    #[serde(rename_all = "camelCase")]
    HexToBech32 {
        /// Hex encoded address
        hex: String,
        /// Human readable part, the one of the protocol parameters if unset
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bech32_hrp: Option<String>,
    },
    /// Transforms a bech32 address to the hex of its identifier.
    /// Expected response: [`Bech32ToHex`](crate::wire::Response::Bech32ToHex)
    Bech32ToHex {
        /// Bech32 encoded address
        bech32: String,
    },
}

impl Message {
    /// The operation name, as written in the `name` field.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ComputeAliasId { .. } => "computeAliasId",
            Self::ComputeNftId { .. } => "computeNftId",
            Self::ComputeFoundryId { .. } => "computeFoundryId",
            Self::ComputeOutputId { .. } => "computeOutputId",
            Self::BuildBasicOutput(_) => "buildBasicOutput",
            Self::BuildAliasOutput(_) => "buildAliasOutput",
            Self::BuildFoundryOutput(_) => "buildFoundryOutput",
            Self::BuildNftOutput(_) => "buildNftOutput",
            Self::PackOutput { .. } => "packOutput",
            Self::UnpackOutput { .. } => "unpackOutput",
            Self::MinimumStorageDeposit { .. } => "minimumStorageDeposit",
            Self::GetProtocolParameters => "getProtocolParameters",
            Self::SetProtocolParameters(_) => "setProtocolParameters",
            Self::HexToBech32 { .. } => "hexToBech32",
            Self::Bech32ToHex { .. } => "bech32ToHex",
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn message_shapes() {
        let output_id = OutputId::rand();
        let message: Message =
            serde_json::from_value(json!({ "name": "computeAliasId", "data": { "outputId": output_id } })).unwrap();
        assert_eq!(message, Message::ComputeAliasId { output_id });
        assert_eq!(message.name(), "computeAliasId");

        let message: Message = serde_json::from_value(json!({ "name": "getProtocolParameters" })).unwrap();
        assert_eq!(message, Message::GetProtocolParameters);

        let message: Message = serde_json::from_value(json!({
            "name": "computeFoundryId",
            "data": {
                "aliasAddress": { "type": 8, "aliasId": format!("0x{}", "11".repeat(32)) },
                "serialNumber": 1,
                "tokenSchemeKind": 0,
            },
        }))
        .unwrap();
        assert_eq!(message.name(), "computeFoundryId");

        let message = Message::BuildBasicOutput(BasicOutputBuilderParams::new().with_amount(5u64));
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({ "name": "buildBasicOutput", "data": { "amount": "5", "unlockConditions": [] } })
        );
    }

    #[test]
    fn unknown_operations_are_rejected() {
        assert!(serde_json::from_value::<Message>(json!({ "name": "sendTransaction", "data": {} })).is_err());
    }
}
