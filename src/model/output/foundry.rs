// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use packable::{packer::Packer, unpacker::Unpacker, Packable};
use primitive_types::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{
    feature::Feature, unknown::Unrecognized, unlock_condition::UnlockCondition, Address, AliasId, Features,
    NativeTokens, OutputRules, UnlockConditions,
};
use crate::{
    error::{DecodingError, EncodingError},
    model::{
        identifier::impl_id,
        packing::{pack_u256, unknown_kind, unpack_int, unpack_kind, unpack_u256, verified, UnpackResult},
        util::tagged::{self, Tagged},
        TokenAmount,
    },
};

impl_id!(
    /// Identifies a foundry and, by extension, the native token it controls.
    ///
    /// The bytes are the packed alias address of the controlling alias, followed by the serial number and the token
    /// scheme kind.
    pub struct FoundryId([u8; 38]),
    "foundry id"
);

impl FoundryId {
    /// Builds the identifier of the foundry with `serial_number` controlled by `alias_id`.
    pub fn build(alias_id: &AliasId, serial_number: u32, token_scheme_kind: u8) -> Self {
        let mut bytes = [0; Self::LENGTH];
        bytes[0] = Address::ALIAS_KIND;
        bytes[1..33].copy_from_slice(alias_id.as_ref());
        bytes[33..37].copy_from_slice(&serial_number.to_le_bytes());
        bytes[37] = token_scheme_kind;
        Self(bytes)
    }

    /// The alias controlling the foundry.
    pub fn alias_id(&self) -> AliasId {
        let mut bytes = [0; AliasId::LENGTH];
        bytes.copy_from_slice(&self.0[1..33]);
        AliasId::new(bytes)
    }

    /// The serial number of the foundry.
    pub fn serial_number(&self) -> u32 {
        let mut bytes = [0; 4];
        bytes.copy_from_slice(&self.0[33..37]);
        u32::from_le_bytes(bytes)
    }

    /// The kind of the token scheme.
    pub fn token_scheme_kind(&self) -> u8 {
        self.0[37]
    }
}

/// A token scheme with fixed maximum supply and explicit minting and melting.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct SimpleTokenScheme {
    #[serde(with = "crate::model::util::hex_u256")]
    pub minted_tokens: U256,
    #[serde(with = "crate::model::util::hex_u256")]
    pub melted_tokens: U256,
    #[serde(with = "crate::model::util::hex_u256")]
    pub maximum_supply: U256,
}

impl SimpleTokenScheme {
    /// Creates a [`SimpleTokenScheme`], checking the supply invariants.
    pub fn new(minted_tokens: U256, melted_tokens: U256, maximum_supply: U256) -> Result<Self, EncodingError> {
        let scheme = Self {
            minted_tokens,
            melted_tokens,
            maximum_supply,
        };
        scheme.verify()?;
        Ok(scheme)
    }

    /// The tokens currently in circulation.
    pub fn circulating_supply(&self) -> U256 {
        self.minted_tokens.saturating_sub(self.melted_tokens)
    }

    /// Checks the supply invariants.
    pub fn verify(&self) -> Result<(), EncodingError> {
        if self.maximum_supply.is_zero() {
            Err(EncodingError::InvalidTokenScheme("maximum supply must not be zero"))
        } else if self.melted_tokens > self.minted_tokens {
            Err(EncodingError::InvalidTokenScheme("melted tokens exceed minted tokens"))
        } else if self.minted_tokens - self.melted_tokens > self.maximum_supply {
            Err(EncodingError::InvalidTokenScheme("circulating supply exceeds maximum supply"))
        } else {
            Ok(())
        }
    }
}

/// The different token schemes of a foundry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenScheme {
    /// The simple token scheme.
    Simple(SimpleTokenScheme),
    /// A scheme of an unknown kind.
    Unknown(Unrecognized),
}

#[allow(missing_docs)]
impl TokenScheme {
    pub const SIMPLE_KIND: u8 = 0;

    /// Returns the kind discriminator.
    pub fn kind(&self) -> u8 {
        match self {
            Self::Simple(_) => Self::SIMPLE_KIND,
            Self::Unknown(u) => u.kind,
        }
    }

    /// Checks that the scheme is known and consistent.
    pub fn verify(&self) -> Result<(), EncodingError> {
        match self {
            Self::Simple(scheme) => scheme.verify(),
            Self::Unknown(u) => Err(EncodingError::UnrecognizedKind {
                what: "token scheme",
                kind: u.kind,
            }),
        }
    }
}

impl Packable for TokenScheme {
    type UnpackError = DecodingError;
    type UnpackVisitor = ();

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        match self {
            Self::Simple(scheme) => {
                Self::SIMPLE_KIND.pack(packer)?;
                pack_u256(&scheme.minted_tokens, packer)?;
                pack_u256(&scheme.melted_tokens, packer)?;
                pack_u256(&scheme.maximum_supply, packer)
            }
            Self::Unknown(u) => u.pack(packer),
        }
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(unpacker: &mut U, _: &()) -> UnpackResult<Self, U> {
        match unpack_kind::<_, VERIFY>(unpacker)? {
            Self::SIMPLE_KIND => {
                let scheme = SimpleTokenScheme {
                    minted_tokens: unpack_u256(unpacker)?,
                    melted_tokens: unpack_u256(unpacker)?,
                    maximum_supply: unpack_u256(unpacker)?,
                };
                if VERIFY {
                    verified::<U>(scheme.verify())?;
                }
                Ok(Self::Simple(scheme))
            }
            kind => unknown_kind::<_, U>("token scheme", kind),
        }
    }
}

impl Serialize for TokenScheme {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Simple(body) => Tagged {
                kind: Self::SIMPLE_KIND,
                body,
            }
            .serialize(serializer),
            Self::Unknown(unknown) => unknown.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for TokenScheme {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (kind, map) = tagged::split(deserializer, "token scheme")?;
        Ok(match kind {
            Self::SIMPLE_KIND => Self::Simple(map.parse()?),
            kind => Self::Unknown(Unrecognized::from_json(kind, map.into_inner())),
        })
    }
}

/// Represents a foundry in the UTXO model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[allow(missing_docs)]
pub struct FoundryOutput {
    pub amount: TokenAmount,
    #[serde(default, skip_serializing_if = "NativeTokens::is_empty")]
    pub native_tokens: NativeTokens,
    pub serial_number: u32,
    pub token_scheme: TokenScheme,
    pub unlock_conditions: UnlockConditions,
    #[serde(default, skip_serializing_if = "Features::is_empty")]
    pub features: Features,
    #[serde(default, skip_serializing_if = "Features::is_empty")]
    pub immutable_features: Features,
}

impl FoundryOutput {
    /// A `u8` representing the output kind.
    pub const KIND: u8 = 5;

    pub(crate) const RULES: OutputRules = OutputRules {
        output: "foundry",
        required_conditions: &[UnlockCondition::IMMUTABLE_ALIAS_ADDRESS_KIND],
        allowed_conditions: &[UnlockCondition::IMMUTABLE_ALIAS_ADDRESS_KIND],
        allowed_features: &[Feature::METADATA_KIND],
        allowed_immutable_features: &[Feature::METADATA_KIND],
    };

    /// Checks the per-kind rules of a foundry output.
    pub fn verify(&self) -> Result<(), EncodingError> {
        self.amount.to_u64()?;
        self.native_tokens.verify()?;
        self.token_scheme.verify()?;
        Self::RULES.verify(&self.unlock_conditions, &self.features, &self.immutable_features)
    }

    /// The alias controlling this foundry, if its condition is present.
    pub fn alias_id(&self) -> Option<AliasId> {
        match self.unlock_conditions.immutable_alias_address() {
            Some(Address::Alias(alias_id)) => Some(*alias_id),
            _ => None,
        }
    }
}

impl Packable for FoundryOutput {
    type UnpackError = DecodingError;
    type UnpackVisitor = ();

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        self.amount.pack(packer)?;
        self.native_tokens.pack(packer)?;
        self.serial_number.pack(packer)?;
        self.token_scheme.pack(packer)?;
        self.unlock_conditions.pack(packer)?;
        self.features.pack(packer)?;
        self.immutable_features.pack(packer)
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(unpacker: &mut U, _: &()) -> UnpackResult<Self, U> {
        let output = Self {
            amount: TokenAmount::unpack::<_, VERIFY>(unpacker, &())?,
            native_tokens: NativeTokens::unpack::<_, VERIFY>(unpacker, &())?,
            serial_number: unpack_int::<u32, _, VERIFY>(unpacker)?,
            token_scheme: TokenScheme::unpack::<_, VERIFY>(unpacker, &())?,
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

    impl FoundryId {
        /// Generates a random [`FoundryId`].
        pub fn rand() -> Self {
            Self::build(&AliasId::rand(), ::rand::random(), TokenScheme::SIMPLE_KIND)
        }
    }

    impl SimpleTokenScheme {
        /// Generates a random, consistent [`SimpleTokenScheme`].
        pub fn rand() -> Self {
            let maximum_supply = U256::from(::rand::random::<u64>()) + 1;
            let minted_tokens = maximum_supply / 2;
            let melted_tokens = minted_tokens / 2;
            Self {
                minted_tokens,
                melted_tokens,
                maximum_supply,
            }
        }
    }

    impl FoundryOutput {
        /// Generates a random, valid [`FoundryOutput`].
        pub fn rand() -> Self {
            Self {
                amount: (u64::from(::rand::random::<u32>()) + 1).into(),
                native_tokens: NativeTokens::rand(1),
                serial_number: ::rand::random(),
                token_scheme: TokenScheme::Simple(SimpleTokenScheme::rand()),
                unlock_conditions: UnlockConditions::new([UnlockCondition::ImmutableAliasAddress(Address::Alias(
                    AliasId::rand(),
                ))])
                .expect("valid unlock conditions"),
                features: Features::default(),
                immutable_features: Features::new([Feature::Metadata(b"foundry".to_vec().into_boxed_slice())])
                    .expect("valid features"),
            }
        }
    }
}
