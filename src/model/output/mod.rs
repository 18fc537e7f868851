// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the Stardust output types.

mod address;
mod feature;
mod native_token;
mod output_id;
mod unknown;
mod unlock_condition;

/// The alias output and its chain identifier.
pub mod alias;
/// The basic output.
pub mod basic;
/// The foundry output, its identifier and token schemes.
pub mod foundry;
/// The NFT output and its chain identifier.
pub mod nft;
/// The treasury output.
pub mod treasury;

use packable::{packer::Packer, unpacker::Unpacker, Packable, PackableExt};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

pub use self::{
    address::{Address, Ed25519Address},
    alias::{AliasId, AliasOutput},
    basic::BasicOutput,
    feature::{Feature, Features},
    foundry::{FoundryId, FoundryOutput, SimpleTokenScheme, TokenScheme},
    native_token::{NativeToken, NativeTokens, TokenId},
    nft::{NftId, NftOutput},
    output_id::{OutputId, OutputIndex},
    treasury::TreasuryOutput,
    unknown::{Unrecognized, UnrecognizedBody},
    unlock_condition::{
        ExpirationUnlockCondition, StorageDepositReturnUnlockCondition, TimelockUnlockCondition, UnlockCondition,
        UnlockConditions,
    },
};
use super::{
    packing::{unknown_kind, unpack_kind, UnpackResult},
    unpack_exact,
    util::tagged::{self, Tagged},
    TokenAmount,
};
use crate::error::{DecodingError, EncodingError};

/// The unlock conditions and features an output kind requires or accepts.
pub(crate) struct OutputRules {
    pub(crate) output: &'static str,
    pub(crate) required_conditions: &'static [u8],
    pub(crate) allowed_conditions: &'static [u8],
    pub(crate) allowed_features: &'static [u8],
    pub(crate) allowed_immutable_features: &'static [u8],
}

impl OutputRules {
    pub(crate) fn verify(
        &self,
        unlock_conditions: &UnlockConditions,
        features: &Features,
        immutable_features: &Features,
    ) -> Result<(), EncodingError> {
        unlock_conditions.verify()?;
        features.verify()?;
        immutable_features.verify()?;
        for condition in unlock_conditions.iter() {
            self.check_allowed("unlock condition", condition.kind(), self.allowed_conditions)?;
        }
        for feature in features.iter() {
            self.check_allowed("feature", feature.kind(), self.allowed_features)?;
        }
        for feature in immutable_features.iter() {
            self.check_allowed("immutable feature", feature.kind(), self.allowed_immutable_features)?;
        }
        for &kind in self.required_conditions {
            if !unlock_conditions.kinds().any(|k| k == kind) {
                return Err(EncodingError::Missing {
                    output: self.output,
                    what: "unlock condition",
                    kind,
                });
            }
        }
        Ok(())
    }

    fn check_allowed(&self, what: &'static str, kind: u8, allowed: &[u8]) -> Result<(), EncodingError> {
        if allowed.contains(&kind) {
            Ok(())
        } else {
            Err(EncodingError::Disallowed {
                output: self.output,
                what,
                kind,
            })
        }
    }
}

/// Represents the different output types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output {
    /// The treasury output.
    Treasury(TreasuryOutput),
    /// The basic output.
    Basic(BasicOutput),
    /// The alias output.
    Alias(AliasOutput),
    /// The foundry output.
    Foundry(FoundryOutput),
    /// The nft output.
    Nft(NftOutput),
    /// An output of a future protocol version, or one containing such an element.
    Unknown(Unrecognized),
}

impl Output {
    /// Returns the kind discriminator.
    pub fn kind(&self) -> u8 {
        match self {
            Self::Treasury(_) => TreasuryOutput::KIND,
            Self::Basic(_) => BasicOutput::KIND,
            Self::Alias(_) => AliasOutput::KIND,
            Self::Foundry(_) => FoundryOutput::KIND,
            Self::Nft(_) => NftOutput::KIND,
            Self::Unknown(u) => u.kind,
        }
    }

    /// Returns a human readable name of the kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Treasury(_) => "treasury",
            Self::Basic(_) => "basic",
            Self::Alias(_) => "alias",
            Self::Foundry(_) => "foundry",
            Self::Nft(_) => "nft",
            Self::Unknown(_) => "unknown",
        }
    }

    /// Returns the amount of base tokens, if the kind is known.
    pub fn amount(&self) -> Option<&TokenAmount> {
        Some(match self {
            Self::Treasury(TreasuryOutput { amount }) => amount,
            Self::Basic(BasicOutput { amount, .. }) => amount,
            Self::Alias(AliasOutput { amount, .. }) => amount,
            Self::Foundry(FoundryOutput { amount, .. }) => amount,
            Self::Nft(NftOutput { amount, .. }) => amount,
            Self::Unknown(_) => return None,
        })
    }

    pub(crate) fn amount_mut(&mut self) -> Option<&mut TokenAmount> {
        Some(match self {
            Self::Treasury(TreasuryOutput { amount }) => amount,
            Self::Basic(BasicOutput { amount, .. }) => amount,
            Self::Alias(AliasOutput { amount, .. }) => amount,
            Self::Foundry(FoundryOutput { amount, .. }) => amount,
            Self::Nft(NftOutput { amount, .. }) => amount,
            Self::Unknown(_) => return None,
        })
    }

    /// Checks the per-kind rules of the output.
    ///
    /// A retained binary body is accepted only if decoding it as its kind still fails on an unknown nested kind.
    pub fn verify(&self) -> Result<(), EncodingError> {
        match self {
            Self::Treasury(output) => output.verify(),
            Self::Basic(output) => output.verify(),
            Self::Alias(output) => output.verify(),
            Self::Foundry(output) => output.verify(),
            Self::Nft(output) => output.verify(),
            Self::Unknown(Unrecognized {
                kind,
                body: UnrecognizedBody::Packed(body),
            }) => Self::verify_opaque(*kind, body),
            Self::Unknown(Unrecognized { kind, .. }) => Err(EncodingError::UnrecognizedKind {
                what: "output",
                kind: *kind,
            }),
        }
    }

    fn is_known_kind(kind: u8) -> bool {
        matches!(
            kind,
            TreasuryOutput::KIND | BasicOutput::KIND | AliasOutput::KIND | FoundryOutput::KIND | NftOutput::KIND
        )
    }

    fn verify_opaque(kind: u8, body: &[u8]) -> Result<(), EncodingError> {
        if !Self::is_known_kind(kind) {
            return Ok(());
        }
        match unpack_exact::<Self>([&[kind][..], body].concat()) {
            Err(DecodingError::UnknownKind { .. }) => Ok(()),
            _ => Err(EncodingError::InvalidOpaqueBody(kind)),
        }
    }

    /// Checks every rule, then packs the output behind its kind byte.
    pub fn encode(&self) -> Result<Vec<u8>, EncodingError> {
        self.verify()?;
        Ok(self.pack_to_vec())
    }

    /// Unpacks an output that spans `bytes` exactly.
    ///
    /// An output whose kind, or any nested kind, is not known is kept as [`UnrecognizedBody::Packed`] so it can be
    /// packed again byte for byte.
    pub fn decode(bytes: impl AsRef<[u8]>) -> Result<Self, DecodingError> {
        let bytes = bytes.as_ref();
        match unpack_exact::<Self>(bytes) {
            Err(DecodingError::UnknownKind { what, kind: nested }) => {
                let (&kind, body) = bytes.split_first().ok_or(DecodingError::UnexpectedEof)?;
                debug!("keeping output of kind {kind} opaque: unknown {what} kind {nested}");
                Ok(Self::Unknown(Unrecognized {
                    kind,
                    body: UnrecognizedBody::Packed(body.into()),
                }))
            }
            result => result,
        }
    }
}

impl Packable for Output {
    type UnpackError = DecodingError;
    type UnpackVisitor = ();

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        if let Self::Unknown(u) = self {
            return u.pack(packer);
        }
        self.kind().pack(packer)?;
        match self {
            Self::Treasury(output) => output.pack(packer),
            Self::Basic(output) => output.pack(packer),
            Self::Alias(output) => output.pack(packer),
            Self::Foundry(output) => output.pack(packer),
            Self::Nft(output) => output.pack(packer),
            Self::Unknown(_) => Ok(()),
        }
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(unpacker: &mut U, _: &()) -> UnpackResult<Self, U> {
        Ok(match unpack_kind::<_, VERIFY>(unpacker)? {
            TreasuryOutput::KIND => Self::Treasury(TreasuryOutput::unpack::<_, VERIFY>(unpacker, &())?),
            BasicOutput::KIND => Self::Basic(BasicOutput::unpack::<_, VERIFY>(unpacker, &())?),
            AliasOutput::KIND => Self::Alias(AliasOutput::unpack::<_, VERIFY>(unpacker, &())?),
            FoundryOutput::KIND => Self::Foundry(FoundryOutput::unpack::<_, VERIFY>(unpacker, &())?),
            NftOutput::KIND => Self::Nft(NftOutput::unpack::<_, VERIFY>(unpacker, &())?),
            kind => return unknown_kind::<_, U>("output", kind),
        })
    }
}

impl Serialize for Output {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let kind = self.kind();
        match self {
            Self::Treasury(body) => Tagged { kind, body }.serialize(serializer),
            Self::Basic(body) => Tagged { kind, body }.serialize(serializer),
            Self::Alias(body) => Tagged { kind, body }.serialize(serializer),
            Self::Foundry(body) => Tagged { kind, body }.serialize(serializer),
            Self::Nft(body) => Tagged { kind, body }.serialize(serializer),
            Self::Unknown(unknown) => unknown.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Output {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (kind, mut map) = tagged::split(deserializer, "output")?;
        if let Some(opaque) = map.remove("opaque") {
            if let Some(field) = map.into_inner().keys().next() {
                return Err(<D::Error as serde::de::Error>::custom(format!(
                    "opaque output body cannot be combined with `{field}`"
                )));
            }
            let hex = opaque
                .as_str()
                .ok_or_else(|| <D::Error as serde::de::Error>::custom("opaque output body must be a hex string"))?;
            let bytes = prefix_hex::decode::<Vec<u8>>(hex)
                .map_err(|e| <D::Error as serde::de::Error>::custom(format!("invalid opaque output body: {e:?}")))?;
            Self::verify_opaque(kind, &bytes).map_err(<D::Error as serde::de::Error>::custom)?;
            return Ok(Self::Unknown(Unrecognized {
                kind,
                body: UnrecognizedBody::Packed(bytes.into_boxed_slice()),
            }));
        }
        Ok(match kind {
            TreasuryOutput::KIND => Self::Treasury(map.parse()?),
            BasicOutput::KIND => Self::Basic(map.parse()?),
            AliasOutput::KIND => Self::Alias(map.parse()?),
            FoundryOutput::KIND => Self::Foundry(map.parse()?),
            NftOutput::KIND => Self::Nft(map.parse()?),
            kind => Self::Unknown(Unrecognized::from_json(kind, map.into_inner())),
        })
    }
}

macro_rules! impl_from_output {
    ($($variant:ident($ty:ty)),*) => {
        $(
            impl From<$ty> for Output {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_output!(
    Treasury(TreasuryOutput),
    Basic(BasicOutput),
    Alias(AliasOutput),
    Foundry(FoundryOutput),
    Nft(NftOutput)
);

#[cfg(any(test, feature = "rand"))]
mod rand {
    use ::rand::Rng;

    use super::*;

    impl Output {
        /// Generates a random, valid [`Output`] of a known kind other than treasury.
        pub fn rand() -> Self {
            match ::rand::thread_rng().gen_range(0..4) {
                0 => Self::Basic(BasicOutput::rand()),
                1 => Self::Alias(AliasOutput::rand()),
                2 => Self::Foundry(FoundryOutput::rand()),
                _ => Self::Nft(NftOutput::rand()),
            }
        }
    }
}
