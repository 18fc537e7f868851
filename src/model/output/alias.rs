// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use packable::{packer::Packer, unpacker::Unpacker, Packable};
use serde::{Deserialize, Serialize};

use super::{
    feature::Feature, unlock_condition::UnlockCondition, Features, NativeTokens, OutputRules, UnlockConditions,
};
use crate::{
    error::{DecodingError, EncodingError},
    model::{
        identifier::impl_id,
        packing::{pack_u16_prefixed, unpack_int, unpack_u16_prefixed, verified, UnpackResult},
        util::is_empty_bytes,
        TokenAmount,
    },
};

impl_id!(
    /// Uniquely identifies an alias chain. The null ID stands for "derive it from the creating output".
    pub struct AliasId([u8; 32]),
    "alias id"
);

/// Represents an alias in the UTXO model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[allow(missing_docs)]
pub struct AliasOutput {
    pub amount: TokenAmount,
    #[serde(default, skip_serializing_if = "NativeTokens::is_empty")]
    pub native_tokens: NativeTokens,
    pub alias_id: AliasId,
    pub state_index: u32,
    #[serde(default, skip_serializing_if = "is_empty_bytes", with = "crate::model::util::hex_bytes")]
    pub state_metadata: Box<[u8]>,
    pub foundry_counter: u32,
    pub unlock_conditions: UnlockConditions,
    #[serde(default, skip_serializing_if = "Features::is_empty")]
    pub features: Features,
    #[serde(default, skip_serializing_if = "Features::is_empty")]
    pub immutable_features: Features,
}

impl AliasOutput {
    /// A `u8` representing the output kind.
    pub const KIND: u8 = 4;
    /// The maximum length of the state metadata.
    pub const STATE_METADATA_LENGTH_MAX: usize = 8192;

    pub(crate) const RULES: OutputRules = OutputRules {
        output: "alias",
        required_conditions: &[
            UnlockCondition::STATE_CONTROLLER_ADDRESS_KIND,
            UnlockCondition::GOVERNOR_ADDRESS_KIND,
        ],
        allowed_conditions: &[
            UnlockCondition::STATE_CONTROLLER_ADDRESS_KIND,
            UnlockCondition::GOVERNOR_ADDRESS_KIND,
        ],
        allowed_features: &[Feature::SENDER_KIND, Feature::METADATA_KIND],
        allowed_immutable_features: &[Feature::ISSUER_KIND, Feature::METADATA_KIND],
    };

    /// Checks the per-kind rules of an alias output.
    pub fn verify(&self) -> Result<(), EncodingError> {
        self.amount.to_u64()?;
        self.native_tokens.verify()?;
        if self.state_metadata.len() > Self::STATE_METADATA_LENGTH_MAX {
            return Err(EncodingError::InvalidLength {
                what: "state metadata",
                len: self.state_metadata.len(),
                min: 0,
                max: Self::STATE_METADATA_LENGTH_MAX,
            });
        }
        Self::RULES.verify(&self.unlock_conditions, &self.features, &self.immutable_features)
    }
}

const STATE_METADATA_PREFIX_MAX: u16 = AliasOutput::STATE_METADATA_LENGTH_MAX as u16;

impl Packable for AliasOutput {
    type UnpackError = DecodingError;
    type UnpackVisitor = ();

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        self.amount.pack(packer)?;
        self.native_tokens.pack(packer)?;
        self.alias_id.pack(packer)?;
        self.state_index.pack(packer)?;
        pack_u16_prefixed(&self.state_metadata, packer)?;
        self.foundry_counter.pack(packer)?;
        self.unlock_conditions.pack(packer)?;
        self.features.pack(packer)?;
        self.immutable_features.pack(packer)
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(unpacker: &mut U, _: &()) -> UnpackResult<Self, U> {
        let output = Self {
            amount: TokenAmount::unpack::<_, VERIFY>(unpacker, &())?,
            native_tokens: NativeTokens::unpack::<_, VERIFY>(unpacker, &())?,
            alias_id: AliasId::unpack::<_, VERIFY>(unpacker, &())?,
            state_index: unpack_int::<u32, _, VERIFY>(unpacker)?,
            state_metadata: unpack_u16_prefixed::<_, VERIFY, 0, STATE_METADATA_PREFIX_MAX>(
                unpacker,
                "state metadata",
            )?,
            foundry_counter: unpack_int::<u32, _, VERIFY>(unpacker)?,
            unlock_conditions: UnlockConditions::unpack::<_, VERIFY>(unpacker, &())?,
            features: Features::unpack::<_, VERIFY>(unpacker, &())?,
            immutable_features: Features::unpack::<_, VERIFY>(unpacker, &())?,
        };
        if VERIFY {
            verified::<U>(output.verify())?;
        }
        Ok(output)
    }
}

#[cfg(any(test, feature = "rand"))]
mod rand {
    use super::*;
    use crate::model::output::Address;

    impl AliasId {
        /// Generates a random [`AliasId`].
        pub fn rand() -> Self {
            Self(::rand::random())
        }
    }

    impl AliasOutput {
        /// Generates a random, valid [`AliasOutput`].
        pub fn rand() -> Self {
            Self {
                amount: (u64::from(::rand::random::<u32>()) + 1).into(),
                native_tokens: NativeTokens::rand(2),
                alias_id: AliasId::rand(),
                state_index: ::rand::random(),
                state_metadata: ::rand::random::<[u8; 16]>().to_vec().into_boxed_slice(),
                foundry_counter: ::rand::random(),
                unlock_conditions: UnlockConditions::new([
                    UnlockCondition::StateControllerAddress(Address::rand_ed25519()),
                    UnlockCondition::GovernorAddress(Address::rand_ed25519()),
                ])
                .expect("valid unlock conditions"),
                features: Features::new([Feature::Sender(Address::rand())]).expect("valid features"),
                immutable_features: Features::new([Feature::Issuer(Address::rand())]).expect("valid features"),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use packable::PackableExt;

    use super::*;
    use crate::model::unpack_exact;

    #[test]
    fn binary_round_trip() {
        let output = AliasOutput::rand();
        assert_eq!(unpack_exact::<AliasOutput>(output.pack_to_vec()).unwrap(), output);
    }

    #[test]
    fn empty_state_metadata_is_a_zero_prefix() {
        let mut output = AliasOutput::rand();
        output.state_metadata = Box::default();
        let bytes = output.pack_to_vec();
        assert_eq!(unpack_exact::<AliasOutput>(&bytes).unwrap(), output);
    }

    #[test]
    fn json_round_trip_omits_empty_collections() {
        let mut output = AliasOutput::rand();
        output.native_tokens = NativeTokens::default();
        output.state_metadata = Box::default();
        let value = serde_json::to_value(&output).unwrap();
        assert!(value.get("nativeTokens").is_none());
        assert!(value.get("stateMetadata").is_none());
        assert!(value.get("unlockConditions").is_some());
        assert_eq!(value["stateIndex"], output.state_index);
        assert_eq!(serde_json::from_value::<AliasOutput>(value).unwrap(), output);
    }

    #[test]
    fn governor_is_required() {
        let mut output = AliasOutput::rand();
        output.unlock_conditions = UnlockConditions::new([UnlockCondition::StateControllerAddress(
            crate::model::output::Address::rand_ed25519(),
        )])
        .unwrap();
        assert_eq!(
            output.verify(),
            Err(EncodingError::Missing {
                output: "alias",
                what: "unlock condition",
                kind: 5
            })
        );
    }

    #[test]
    fn tag_feature_is_not_allowed() {
        let mut output = AliasOutput::rand();
        output.features = Features::new([Feature::Tag(b"tag".to_vec().into_boxed_slice())]).unwrap();
        assert!(matches!(
            output.verify(),
            Err(EncodingError::Disallowed {
                output: "alias",
                what: "feature",
                kind: 3
            })
        ));
    }

    #[test]
    fn unknown_json_fields_are_rejected() {
        let mut value = serde_json::to_value(AliasOutput::rand()).unwrap();
        value["stateControler"] = serde_json::json!("typo");
        assert!(serde_json::from_value::<AliasOutput>(value).is_err());
    }
}
