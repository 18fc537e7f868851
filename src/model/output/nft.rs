// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use packable::{packer::Packer, unpacker::Unpacker, Packable};
use serde::{Deserialize, Serialize};

use super::{feature::Feature, unlock_condition::UnlockCondition, Features, NativeTokens, OutputRules, UnlockConditions};
use crate::{
    error::{DecodingError, EncodingError},
    model::{
        identifier::impl_id,
        packing::{verified, UnpackResult},
        TokenAmount,
    },
};

impl_id!(
    /// Uniquely identifies an NFT. The null ID stands for "derive it from the minting output".
    pub struct NftId([u8; 32]),
    "nft id"
);

/// Represents an NFT in the UTXO model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[allow(missing_docs)]
pub struct NftOutput {
    pub amount: TokenAmount,
    #[serde(default, skip_serializing_if = "NativeTokens::is_empty")]
    pub native_tokens: NativeTokens,
    pub nft_id: NftId,
    pub unlock_conditions: UnlockConditions,
    #[serde(default, skip_serializing_if = "Features::is_empty")]
    pub features: Features,
    #[serde(default, skip_serializing_if = "Features::is_empty")]
    pub immutable_features: Features,
}

impl NftOutput {
    /// A `u8` representing the output kind.
    pub const KIND: u8 = 6;

    pub(crate) const RULES: OutputRules = OutputRules {
        output: "nft",
        required_conditions: &[UnlockCondition::ADDRESS_KIND],
        allowed_conditions: &[
            UnlockCondition::ADDRESS_KIND,
            UnlockCondition::STORAGE_DEPOSIT_RETURN_KIND,
            UnlockCondition::TIMELOCK_KIND,
            UnlockCondition::EXPIRATION_KIND,
        ],
        allowed_features: &[Feature::SENDER_KIND, Feature::METADATA_KIND, Feature::TAG_KIND],
        allowed_immutable_features: &[Feature::ISSUER_KIND, Feature::METADATA_KIND],
    };

    /// Checks the per-kind rules of an NFT output.
    pub fn verify(&self) -> Result<(), EncodingError> {
        self.amount.to_u64()?;
        self.native_tokens.verify()?;
        Self::RULES.verify(&self.unlock_conditions, &self.features, &self.immutable_features)
    }
}

impl Packable for NftOutput {
    type UnpackError = DecodingError;
    type UnpackVisitor = ();

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        self.amount.pack(packer)?;
        self.native_tokens.pack(packer)?;
        self.nft_id.pack(packer)?;
        self.unlock_conditions.pack(packer)?;
        self.features.pack(packer)?;
        self.immutable_features.pack(packer)
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(unpacker: &mut U, _: &()) -> UnpackResult<Self, U> {
        let output = Self {
            amount: TokenAmount::unpack::<_, VERIFY>(unpacker, &())?,
            native_tokens: NativeTokens::unpack::<_, VERIFY>(unpacker, &())?,
            nft_id: NftId::unpack::<_, VERIFY>(unpacker, &())?,
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
    use crate::model::output::{
        unlock_condition::{ExpirationUnlockCondition, StorageDepositReturnUnlockCondition},
        Address,
    };

    impl NftId {
        /// Generates a random [`NftId`].
        pub fn rand() -> Self {
            Self(::rand::random())
        }
    }

    impl NftOutput {
        /// Generates a random, valid [`NftOutput`].
        pub fn rand() -> Self {
            Self {
                amount: (u64::from(::rand::random::<u32>()) + 1).into(),
                native_tokens: NativeTokens::rand(1),
                nft_id: NftId::rand(),
                unlock_conditions: UnlockConditions::new([
                    UnlockCondition::Address(Address::rand()),
                    UnlockCondition::StorageDepositReturn(StorageDepositReturnUnlockCondition {
                        return_address: Address::rand_ed25519(),
                        amount: u64::from(::rand::random::<u16>()).into(),
                    }),
                    UnlockCondition::Expiration(ExpirationUnlockCondition {
                        return_address: Address::rand_ed25519(),
                        unix_time: ::rand::random::<u32>().max(1),
                    }),
                ])
                .expect("valid unlock conditions"),
                features: Features::new([Feature::Metadata(
                    ::rand::random::<[u8; 32]>().to_vec().into_boxed_slice(),
                )])
                .expect("valid features"),
                immutable_features: Features::new([
                    Feature::Issuer(Address::rand()),
                    Feature::Metadata(::rand::random::<[u8; 32]>().to_vec().into_boxed_slice()),
                ])
                .expect("valid features"),
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
        let output = NftOutput::rand();
        assert_eq!(unpack_exact::<NftOutput>(output.pack_to_vec()).unwrap(), output);
    }

    #[test]
    fn json_round_trip() {
        let output = NftOutput::rand();
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["nftId"], output.nft_id.to_hex());
        assert_eq!(value["immutableFeatures"].as_array().map(Vec::len), Some(2));
        assert_eq!(serde_json::from_value::<NftOutput>(value).unwrap(), output);
    }

    #[test]
    fn sender_is_not_immutable() {
        let mut output = NftOutput::rand();
        output.immutable_features =
            Features::new([Feature::Sender(crate::model::output::Address::rand_ed25519())]).unwrap();
        assert!(matches!(
            output.verify(),
            Err(EncodingError::Disallowed {
                what: "immutable feature",
                kind: 0,
                ..
            })
        ));
    }
}
