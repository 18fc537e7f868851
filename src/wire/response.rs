// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{from_wire, to_wire};
use crate::{
    error::{DecodingError, Error, OperationError, UnknownResponseTypeError},
    model::{
        output::{AliasId, FoundryId, NftId, Output, OutputId},
        ProtocolParameters, TokenAmount,
    },
};

/// The envelope `{ "type": <discriminator>, "payload": <value> }` returned for every operation.
///
/// The discriminator alone determines the payload schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum Response {
    /// Response of `computeAliasId`.
    #[serde(rename = "computeAliasIdResponse")]
    ComputeAliasId(AliasId),
    /// Response of `computeNftId`.
    #[serde(rename = "computeNftIdResponse")]
    ComputeNftId(NftId),
    /// Response of `computeFoundryId`.
    #[serde(rename = "computeFoundryIdResponse")]
    ComputeFoundryId(FoundryId),
    /// Response of `computeOutputId`.
    #[serde(rename = "computeOutputIdResponse")]
    ComputeOutputId(OutputId),
    /// Response of `buildBasicOutput`.
    #[serde(rename = "buildBasicOutputResponse")]
    BuildBasicOutput(Output),
    /// Response of `buildAliasOutput`.
    #[serde(rename = "buildAliasOutputResponse")]
    BuildAliasOutput(Output),
    /// Response of `buildFoundryOutput`.
    #[serde(rename = "buildFoundryOutputResponse")]
    BuildFoundryOutput(Output),
    /// Response of `buildNftOutput`.
    #[serde(rename = "buildNftOutputResponse")]
    BuildNftOutput(Output),
    /// Response of `packOutput`: the canonical bytes as hex.
    #[serde(rename = "packOutputResponse")]
    PackOutput(#[serde(with = "crate::model::util::hex_bytes")] Box<[u8]>),
    /// Response of `unpackOutput`.
    #[serde(rename = "unpackOutputResponse")]
    UnpackOutput(Output),
    /// Response of `minimumStorageDeposit`.
    #[serde(rename = "minimumStorageDepositResponse")]
    MinimumStorageDeposit(TokenAmount),
    /// Response of `getProtocolParameters` and `setProtocolParameters`.
    #[serde(rename = "protocolParametersResponse")]
    ProtocolParameters(ProtocolParameters),
    /// Response of `hexToBech32`.
    #[serde(rename = "hexToBech32Response")]
    HexToBech32(String),
    /// Response of `bech32ToHex`.
    #[serde(rename = "bech32ToHexResponse")]
    Bech32ToHex(String),
    /// Any operation that failed.
    #[serde(rename = "error")]
    Error(OperationError),
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

impl Response {
    /// Returns the `type` discriminator of the response.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ComputeAliasId(_) => "computeAliasIdResponse",
            Self::ComputeNftId(_) => "computeNftIdResponse",
            Self::ComputeFoundryId(_) => "computeFoundryIdResponse",
            Self::ComputeOutputId(_) => "computeOutputIdResponse",
            Self::BuildBasicOutput(_) => "buildBasicOutputResponse",
            Self::BuildAliasOutput(_) => "buildAliasOutputResponse",
            Self::BuildFoundryOutput(_) => "buildFoundryOutputResponse",
            Self::BuildNftOutput(_) => "buildNftOutputResponse",
            Self::PackOutput(_) => "packOutputResponse",
            Self::UnpackOutput(_) => "unpackOutputResponse",
            Self::MinimumStorageDeposit(_) => "minimumStorageDepositResponse",
            Self::ProtocolParameters(_) => "protocolParametersResponse",
            Self::HexToBech32(_) => "hexToBech32Response",
            Self::Bech32ToHex(_) => "bech32ToHexResponse",
            Self::Error(_) => "error",
        }
    }

    /// Reads a response envelope, selecting the payload schema by the discriminator before looking at the payload.
    ///
    /// An unrecognized discriminator yields [`Error::UnknownResponseType`] with the payload untouched.
    pub fn from_wire(value: Value) -> Result<Self, Error> {
        let Envelope { kind, payload } = serde_json::from_value(value).map_err(DecodingError::from)?;
        Ok(match kind.as_str() {
            "computeAliasIdResponse" => Self::ComputeAliasId(from_wire(payload)?),
            "computeNftIdResponse" => Self::ComputeNftId(from_wire(payload)?),
            "computeFoundryIdResponse" => Self::ComputeFoundryId(from_wire(payload)?),
            "computeOutputIdResponse" => Self::ComputeOutputId(from_wire(payload)?),
            "buildBasicOutputResponse" => Self::BuildBasicOutput(from_wire(payload)?),
            "buildAliasOutputResponse" => Self::BuildAliasOutput(from_wire(payload)?),
            "buildFoundryOutputResponse" => Self::BuildFoundryOutput(from_wire(payload)?),
            "buildNftOutputResponse" => Self::BuildNftOutput(from_wire(payload)?),
            "packOutputResponse" => {
                let hex = from_wire::<String>(payload)?;
                let bytes = prefix_hex::decode::<Vec<u8>>(&hex).map_err(|e| DecodingError::InvalidHex {
                    what: "packed output",
                    reason: format!("{e:?}"),
                })?;
                Self::PackOutput(bytes.into_boxed_slice())
            }
            "unpackOutputResponse" => Self::UnpackOutput(from_wire(payload)?),
            "minimumStorageDepositResponse" => Self::MinimumStorageDeposit(from_wire(payload)?),
            "protocolParametersResponse" => Self::ProtocolParameters(from_wire(payload)?),
            "hexToBech32Response" => Self::HexToBech32(from_wire(payload)?),
            "bech32ToHexResponse" => Self::Bech32ToHex(from_wire(payload)?),
            "error" => Self::Error(from_wire(payload)?),
            _ => return Err(UnknownResponseTypeError { kind, payload }.into()),
        })
    }

    /// Writes the response envelope.
    pub fn to_wire(&self) -> Result<Value, DecodingError> {
        to_wire(self)
    }
}

impl<'de> Deserialize<'de> for Response {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Self::from_wire(Value::deserialize(deserializer)?).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::output::BasicOutput;

    #[test]
    fn unknown_discriminator_keeps_payload() {
        let payload = json!({ "anything": [1, "two"] });
        let err = Response::from_wire(json!({ "type": "unknownOpResponse", "payload": payload })).unwrap_err();
        match err {
            Error::UnknownResponseType(UnknownResponseTypeError { kind, payload: raw }) => {
                assert_eq!(kind, "unknownOpResponse");
                assert_eq!(raw, payload);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn dispatch_happens_before_payload_inspection() {
        // A payload that matches no schema at all still reports the unknown discriminator.
        assert!(matches!(
            Response::from_wire(json!({ "type": "unknownOpResponse", "payload": 42 })),
            Err(Error::UnknownResponseType(_))
        ));
        // A known discriminator with a broken payload is a decoding failure.
        assert!(matches!(
            Response::from_wire(json!({ "type": "computeAliasIdResponse", "payload": 42 })),
            Err(Error::Decoding(_))
        ));
        assert!(matches!(
            Response::from_wire(json!({ "payload": "0x00" })),
            Err(Error::Decoding(_))
        ));
    }

    #[test]
    fn recognized_responses_round_trip() {
        let id = format!("0x{}", "ab".repeat(32));
        let basic = to_wire(&Output::Basic(BasicOutput::rand())).unwrap();
        let params = to_wire(&ProtocolParameters::default()).unwrap();
        for value in [
            json!({ "type": "computeAliasIdResponse", "payload": id }),
            json!({ "type": "computeNftIdResponse", "payload": id }),
            json!({ "type": "computeFoundryIdResponse", "payload": format!("0x08{}0100000000", "ab".repeat(32)) }),
            json!({ "type": "computeOutputIdResponse", "payload": format!("{id}0100") }),
            json!({ "type": "packOutputResponse", "payload": "0x0301" }),
            json!({ "type": "minimumStorageDepositResponse", "payload": "42600" }),
            json!({ "type": "hexToBech32Response", "payload": "smr1qqqq" }),
            json!({ "type": "error", "payload": { "operation": "packOutput", "message": "boom" } }),
            json!({ "type": "buildBasicOutputResponse", "payload": basic }),
            json!({ "type": "protocolParametersResponse", "payload": params }),
        ] {
            let response = Response::from_wire(value.clone()).unwrap();
            assert_eq!(response.to_wire().unwrap(), value);
            assert_eq!(response.kind(), value["type"]);
        }
    }

    #[test]
    fn deserialize_goes_through_dispatch() {
        let response: Response =
            serde_json::from_str(r#"{"type":"minimumStorageDepositResponse","payload":"18446744073709551616"}"#)
                .unwrap();
        assert_eq!(
            response,
            Response::MinimumStorageDeposit("18446744073709551616".parse().unwrap())
        );
        assert!(serde_json::from_str::<Response>(r#"{"type":"unknownOpResponse","payload":null}"#).is_err());
    }
}
