// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use packable::{packer::Packer, unpacker::Unpacker, Packable};
use serde::{Deserialize, Serialize};

use super::{feature::Feature, unlock_condition::UnlockCondition, Features, NativeTokens, OutputRules, UnlockConditions};
use crate::{
    error::{DecodingError, EncodingError},
    model::{
        packing::{verified, UnpackResult},
        TokenAmount,
    },
};

/// Represents a basic output in the UTXO model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BasicOutput {
    /// The output amount.
    pub amount: TokenAmount,
    /// The list of [`NativeToken`](super::NativeToken)s.
    #[serde(default, skip_serializing_if = "NativeTokens::is_empty")]
    pub native_tokens: NativeTokens,
    /// The unlock conditions, always including an address.
    pub unlock_conditions: UnlockConditions,
    /// The corresponding list of [`Feature`]s for this output.
    #[serde(default, skip_serializing_if = "Features::is_empty")]
    pub features: Features,
}

impl BasicOutput {
    /// A `u8` representing the output kind.
    pub const KIND: u8 = 3;

    pub(crate) const RULES: OutputRules = OutputRules {
        output: "basic",
        required_conditions: &[UnlockCondition::ADDRESS_KIND],
        allowed_conditions: &[
            UnlockCondition::ADDRESS_KIND,
            UnlockCondition::STORAGE_DEPOSIT_RETURN_KIND,
            UnlockCondition::TIMELOCK_KIND,
            UnlockCondition::EXPIRATION_KIND,
        ],
        allowed_features: &[Feature::SENDER_KIND, Feature::METADATA_KIND, Feature::TAG_KIND],
        allowed_immutable_features: &[],
    };

    /// Checks the per-kind rules of a basic output.
    pub fn verify(&self) -> Result<(), EncodingError> {
        self.amount.to_u64()?;
        self.native_tokens.verify()?;
        Self::RULES.verify(&self.unlock_conditions, &self.features, &Features::default())
    }
}

impl Packable for BasicOutput {
    type UnpackError = DecodingError;
    type UnpackVisitor = ();

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        self.amount.pack(packer)?;
        self.native_tokens.pack(packer)?;
        self.unlock_conditions.pack(packer)?;
        self.features.pack(packer)
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(unpacker: &mut U, _: &()) -> UnpackResult<Self, U> {
        let output = Self {
            amount: TokenAmount::unpack::<_, VERIFY>(unpacker, &())?,
            native_tokens: NativeTokens::unpack::<_, VERIFY>(unpacker, &())?,
            unlock_conditions: UnlockConditions::unpack::<_, VERIFY>(unpacker, &())?,
            features: Features::unpack::<_, VERIFY>(unpacker, &())?,
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
    use crate::model::output::{unlock_condition::TimelockUnlockCondition, Address};

    impl BasicOutput {
        /// Generates a random, valid [`BasicOutput`].
        pub fn rand() -> Self {
            Self {
                amount: (u64::from(::rand::random::<u32>()) + 1).into(),
                native_tokens: NativeTokens::rand(3),
                unlock_conditions: UnlockConditions::new([
                    UnlockCondition::Address(Address::rand()),
                    UnlockCondition::Timelock(TimelockUnlockCondition {
                        unix_time: ::rand::random::<u32>().max(1),
                    }),
                ])
                .expect("valid unlock conditions"),
                features: Features::new([
                    Feature::Sender(Address::rand()),
                    Feature::Tag(::rand::random::<[u8; 8]>().to_vec().into_boxed_slice()),
                ])
                .expect("valid features"),
            }
        }
    }
}
