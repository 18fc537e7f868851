// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Parameters for building outputs, as accepted by the `build*Output` operations.
//!
//! Unset optional fields never appear in the JSON. An unset amount resolves to the minimum storage deposit of the
//! finished output.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::to_wire;
use crate::{
    error::{DecodingError, Error},
    model::{
        output::{
            AliasId, AliasOutput, BasicOutput, Feature, Features, FoundryOutput, NativeToken, NativeTokens, NftId,
            NftOutput, Output, TokenScheme, UnlockCondition, UnlockConditions,
        },
        ProtocolParameters, TokenAmount,
    },
};

fn native_tokens(tokens: &Option<Vec<NativeToken>>) -> Result<NativeTokens, Error> {
    Ok(NativeTokens::new(tokens.iter().flatten().copied())?)
}

fn features(features: &Option<Vec<Feature>>) -> Result<Features, Error> {
    Ok(Features::new(features.iter().flatten().cloned())?)
}

fn finish_output(
    mut output: Output,
    amount: Option<&TokenAmount>,
    params: &ProtocolParameters,
) -> Result<Output, Error> {
    let amount = match amount {
        Some(amount) => amount.clone(),
        None => params.rent_structure.rent_cost(&output)?.into(),
    };
    params.verify_amount(&amount)?;
    if let Some(slot) = output.amount_mut() {
        *slot = amount;
    }
    output.verify()?;
    Ok(output)
}

/// Parameters of a [`BasicOutput`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicOutputBuilderParams {
    /// The amount; the minimum storage deposit if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<TokenAmount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[allow(missing_docs)]
    pub native_tokens: Option<Vec<NativeToken>>,
    #[serde(default)]
    #[allow(missing_docs)]
    pub unlock_conditions: Vec<UnlockCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[allow(missing_docs)]
    pub features: Option<Vec<Feature>>,
}

impl BasicOutputBuilderParams {
    /// Creates empty parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the amount.
    pub fn with_amount(mut self, amount: impl Into<TokenAmount>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    /// Adds a native token.
    pub fn with_native_token(mut self, native_token: NativeToken) -> Self {
        self.native_tokens.get_or_insert_with(Vec::new).push(native_token);
        self
    }

    /// Adds an unlock condition.
    pub fn with_unlock_condition(mut self, unlock_condition: UnlockCondition) -> Self {
        self.unlock_conditions.push(unlock_condition);
        self
    }

    /// Adds a feature.
    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.get_or_insert_with(Vec::new).push(feature);
        self
    }

    /// Produces the JSON of the parameters.
    pub fn to_wire(&self) -> Result<Value, DecodingError> {
        to_wire(self)
    }

    /// Builds the output under `params`.
    pub fn finish(&self, params: &ProtocolParameters) -> Result<Output, Error> {
        let output = BasicOutput {
            amount: TokenAmount::zero(),
            native_tokens: native_tokens(&self.native_tokens)?,
            unlock_conditions: UnlockConditions::new(self.unlock_conditions.iter().cloned())?,
            features: features(&self.features)?,
        };
        finish_output(output.into(), self.amount.as_ref(), params)
    }
}

/// Parameters of an [`AliasOutput`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct AliasOutputBuilderParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<TokenAmount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_tokens: Option<Vec<NativeToken>>,
    /// The null ID for a newly created alias.
    pub alias_id: AliasId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_index: Option<u32>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "optional_hex_bytes"
    )]
    pub state_metadata: Option<Box<[u8]>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foundry_counter: Option<u32>,
    #[serde(default)]
    pub unlock_conditions: Vec<UnlockCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<Feature>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub immutable_features: Option<Vec<Feature>>,
}

#[allow(missing_docs)]
impl AliasOutputBuilderParams {
    /// Creates parameters for the alias `alias_id`.
    pub fn new(alias_id: AliasId) -> Self {
        Self {
            amount: None,
            native_tokens: None,
            alias_id,
            state_index: None,
            state_metadata: None,
            foundry_counter: None,
            unlock_conditions: Vec::new(),
            features: None,
            immutable_features: None,
        }
    }

    pub fn with_amount(mut self, amount: impl Into<TokenAmount>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    pub fn with_native_token(mut self, native_token: NativeToken) -> Self {
        self.native_tokens.get_or_insert_with(Vec::new).push(native_token);
        self
    }

    pub fn with_state_index(mut self, state_index: u32) -> Self {
        self.state_index = Some(state_index);
        self
    }

    pub fn with_state_metadata(mut self, state_metadata: impl Into<Box<[u8]>>) -> Self {
        self.state_metadata = Some(state_metadata.into());
        self
    }

    pub fn with_foundry_counter(mut self, foundry_counter: u32) -> Self {
        self.foundry_counter = Some(foundry_counter);
        self
    }

    pub fn with_unlock_condition(mut self, unlock_condition: UnlockCondition) -> Self {
        self.unlock_conditions.push(unlock_condition);
        self
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.get_or_insert_with(Vec::new).push(feature);
        self
    }

    pub fn with_immutable_feature(mut self, feature: Feature) -> Self {
        self.immutable_features.get_or_insert_with(Vec::new).push(feature);
        self
    }

    pub fn to_wire(&self) -> Result<Value, DecodingError> {
        to_wire(self)
    }

    /// Builds the output under `params`.
    pub fn finish(&self, params: &ProtocolParameters) -> Result<Output, Error> {
        let output = AliasOutput {
            amount: TokenAmount::zero(),
            native_tokens: native_tokens(&self.native_tokens)?,
            alias_id: self.alias_id,
            state_index: self.state_index.unwrap_or_default(),
            state_metadata: self.state_metadata.clone().unwrap_or_default(),
            foundry_counter: self.foundry_counter.unwrap_or_default(),
            unlock_conditions: UnlockConditions::new(self.unlock_conditions.iter().cloned())?,
            features: features(&self.features)?,
            immutable_features: features(&self.immutable_features)?,
        };
        finish_output(output.into(), self.amount.as_ref(), params)
    }
}

/// Parameters of a [`FoundryOutput`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct FoundryOutputBuilderParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<TokenAmount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_tokens: Option<Vec<NativeToken>>,
    pub serial_number: u32,
    pub token_scheme: TokenScheme,
    #[serde(default)]
    pub unlock_conditions: Vec<UnlockCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<Feature>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub immutable_features: Option<Vec<Feature>>,
}

#[allow(missing_docs)]
impl FoundryOutputBuilderParams {
    /// Creates parameters for the foundry with `serial_number`.
    pub fn new(serial_number: u32, token_scheme: TokenScheme) -> Self {
        Self {
            amount: None,
            native_tokens: None,
            serial_number,
            token_scheme,
            unlock_conditions: Vec::new(),
            features: None,
            immutable_features: None,
        }
    }

    pub fn with_amount(mut self, amount: impl Into<TokenAmount>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    pub fn with_native_token(mut self, native_token: NativeToken) -> Self {
        self.native_tokens.get_or_insert_with(Vec::new).push(native_token);
        self
    }

    pub fn with_unlock_condition(mut self, unlock_condition: UnlockCondition) -> Self {
        self.unlock_conditions.push(unlock_condition);
        self
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.get_or_insert_with(Vec::new).push(feature);
        self
    }

    pub fn with_immutable_feature(mut self, feature: Feature) -> Self {
        self.immutable_features.get_or_insert_with(Vec::new).push(feature);
        self
    }

    pub fn to_wire(&self) -> Result<Value, DecodingError> {
        to_wire(self)
    }

    /// Builds the output under `params`.
    pub fn finish(&self, params: &ProtocolParameters) -> Result<Output, Error> {
        let output = FoundryOutput {
            amount: TokenAmount::zero(),
            native_tokens: native_tokens(&self.native_tokens)?,
            serial_number: self.serial_number,
            token_scheme: self.token_scheme.clone(),
            unlock_conditions: UnlockConditions::new(self.unlock_conditions.iter().cloned())?,
            features: features(&self.features)?,
            immutable_features: features(&self.immutable_features)?,
        };
        finish_output(output.into(), self.amount.as_ref(), params)
    }
}

/// Parameters of an [`NftOutput`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct NftOutputBuilderParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<TokenAmount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_tokens: Option<Vec<NativeToken>>,
    /// The null ID for a newly minted NFT.
    pub nft_id: NftId,
    #[serde(default)]
    pub unlock_conditions: Vec<UnlockCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<Feature>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub immutable_features: Option<Vec<Feature>>,
}

#[allow(missing_docs)]
impl NftOutputBuilderParams {
    /// Creates parameters for the NFT `nft_id`.
    pub fn new(nft_id: NftId) -> Self {
        Self {
            amount: None,
            native_tokens: None,
            nft_id,
            unlock_conditions: Vec::new(),
            features: None,
            immutable_features: None,
        }
    }

    pub fn with_amount(mut self, amount: impl Into<TokenAmount>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    pub fn with_native_token(mut self, native_token: NativeToken) -> Self {
        self.native_tokens.get_or_insert_with(Vec::new).push(native_token);
        self
    }

    pub fn with_unlock_condition(mut self, unlock_condition: UnlockCondition) -> Self {
        self.unlock_conditions.push(unlock_condition);
        self
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.get_or_insert_with(Vec::new).push(feature);
        self
    }

    pub fn with_immutable_feature(mut self, feature: Feature) -> Self {
        self.immutable_features.get_or_insert_with(Vec::new).push(feature);
        self
    }

    pub fn to_wire(&self) -> Result<Value, DecodingError> {
        to_wire(self)
    }

    /// Builds the output under `params`.
    pub fn finish(&self, params: &ProtocolParameters) -> Result<Output, Error> {
        let output = NftOutput {
            amount: TokenAmount::zero(),
            native_tokens: native_tokens(&self.native_tokens)?,
            nft_id: self.nft_id,
            unlock_conditions: UnlockConditions::new(self.unlock_conditions.iter().cloned())?,
            features: features(&self.features)?,
            immutable_features: features(&self.immutable_features)?,
        };
        finish_output(output.into(), self.amount.as_ref(), params)
    }
}

mod optional_hex_bytes {
    use serde::{Deserializer, Serializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Box<[u8]>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        crate::model::util::hex_bytes::deserialize(deserializer).map(Some)
    }

    pub fn serialize<S>(bytes: &Option<Box<[u8]>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match bytes {
            Some(bytes) => crate::model::util::hex_bytes::serialize(bytes, serializer),
            None => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use primitive_types::U256;
    use serde_json::json;

    use super::*;
    use crate::{
        error::EncodingError,
        model::output::{
            Address, Ed25519Address, FoundryId, SimpleTokenScheme, TimelockUnlockCondition,
        },
    };

    fn owner() -> Address {
        Address::Ed25519(Ed25519Address::new([0; 32]))
    }

    #[test]
    fn omitted_fields_are_absent() {
        let params = BasicOutputBuilderParams::new().with_unlock_condition(UnlockCondition::Address(owner()));
        assert_eq!(
            params.to_wire().unwrap(),
            json!({
                "unlockConditions": [{
                    "type": 0,
                    "address": { "type": 0, "pubKeyHash": format!("0x{}", "00".repeat(32)) },
                }],
            })
        );

        let params = AliasOutputBuilderParams::new(AliasId::null()).with_state_metadata(vec![1, 2]);
        let value = params.to_wire().unwrap();
        assert_eq!(value["stateMetadata"], json!("0x0102"));
        assert!(value.get("stateIndex").is_none());
        assert!(value.get("amount").is_none());
        assert_eq!(serde_json::from_value::<AliasOutputBuilderParams>(value).unwrap(), params);
    }

    #[test]
    fn missing_amount_is_the_minimum_deposit() {
        let output = BasicOutputBuilderParams::new()
            .with_unlock_condition(UnlockCondition::Address(owner()))
            .finish(&ProtocolParameters::default())
            .unwrap();
        assert_eq!(output.amount(), Some(&42600u64.into()));
    }

    #[test]
    fn amount_must_be_in_supply() {
        let params = BasicOutputBuilderParams::new().with_unlock_condition(UnlockCondition::Address(owner()));
        assert!(matches!(
            params.clone().with_amount(0u64).finish(&ProtocolParameters::default()),
            Err(Error::Encoding(EncodingError::AmountNotInSupply { .. }))
        ));
        assert!(matches!(
            params
                .clone()
                .with_amount(1_813_620_509_061_366u64)
                .finish(&ProtocolParameters::default()),
            Err(Error::Encoding(EncodingError::AmountNotInSupply { .. }))
        ));
        assert!(params.with_amount(1_000_000u64).finish(&ProtocolParameters::default()).is_ok());
    }

    #[test]
    fn insertion_order_does_not_change_the_encoding() {
        let token_a = NativeToken::new(FoundryId::new([1; 38]), U256::from(5u64)).unwrap();
        let token_b = NativeToken::new(FoundryId::new([2; 38]), U256::from(7u64)).unwrap();
        let timelock = UnlockCondition::Timelock(TimelockUnlockCondition { unix_time: 100 });
        let tag = Feature::Tag(vec![1].into_boxed_slice());
        let sender = Feature::Sender(owner());

        let forward = BasicOutputBuilderParams::new()
            .with_amount(1_000_000u64)
            .with_native_token(token_a)
            .with_native_token(token_b)
            .with_unlock_condition(UnlockCondition::Address(owner()))
            .with_unlock_condition(timelock.clone())
            .with_feature(sender.clone())
            .with_feature(tag.clone());
        let backward = BasicOutputBuilderParams::new()
            .with_amount(1_000_000u64)
            .with_native_token(token_b)
            .with_native_token(token_a)
            .with_unlock_condition(timelock)
            .with_unlock_condition(UnlockCondition::Address(owner()))
            .with_feature(tag)
            .with_feature(sender);

        let params = ProtocolParameters::default();
        assert_eq!(
            forward.finish(&params).unwrap().encode().unwrap(),
            backward.finish(&params).unwrap().encode().unwrap()
        );
    }

    #[test]
    fn output_rules_apply() {
        // A basic output needs an address unlock condition.
        assert!(matches!(
            BasicOutputBuilderParams::new().finish(&ProtocolParameters::default()),
            Err(Error::Encoding(EncodingError::Missing { .. }))
        ));

        let alias_address = Address::Alias(AliasId::new([3; 32]));
        let scheme = TokenScheme::Simple(
            SimpleTokenScheme::new(U256::from(10u64), U256::zero(), U256::from(100u64)).unwrap(),
        );
        let foundry = FoundryOutputBuilderParams::new(1, scheme)
            .with_unlock_condition(UnlockCondition::ImmutableAliasAddress(alias_address))
            .finish(&ProtocolParameters::default())
            .unwrap();
        assert!(matches!(foundry, Output::Foundry(_)));

        let nft = NftOutputBuilderParams::new(NftId::null())
            .with_unlock_condition(UnlockCondition::Address(owner()))
            .with_immutable_feature(Feature::Issuer(owner()))
            .finish(&ProtocolParameters::default())
            .unwrap();
        assert!(matches!(nft, Output::Nft(_)));

        let alias = AliasOutputBuilderParams::new(AliasId::null())
            .with_state_index(3)
            .with_unlock_condition(UnlockCondition::StateControllerAddress(owner()))
            .with_unlock_condition(UnlockCondition::GovernorAddress(owner()))
            .finish(&ProtocolParameters::default())
            .unwrap();
        match alias {
            Output::Alias(alias) => assert_eq!(alias.state_index, 3),
            other => panic!("unexpected output {other:?}"),
        }
    }
}
