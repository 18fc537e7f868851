// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the [`Address`] types.

use bech32::{FromBase32, ToBase32, Variant};
use packable::{packer::Packer, unpacker::Unpacker, Packable, PackableExt};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{AliasId, NftId};
use crate::{
    error::{DecodingError, EncodingError},
    model::{
        identifier::impl_id,
        packing::{unknown_kind, unpack_kind, UnpackResult},
        unpack_exact,
        util::tagged::{self, Tagged},
    },
};

impl_id!(
    /// The BLAKE2b-256 hash of an Ed25519 public key.
    pub struct Ed25519Address([u8; 32]),
    "ed25519 address"
);

/// An address that can own outputs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Address {
    /// An address backed by an Ed25519 key pair.
    Ed25519(Ed25519Address),
    /// The address of an alias chain.
    Alias(AliasId),
    /// The address of an NFT chain.
    Nft(NftId),
}

impl Address {
    /// The kind of an [`Address::Ed25519`].
    pub const ED25519_KIND: u8 = 0;
    /// The kind of an [`Address::Alias`].
    pub const ALIAS_KIND: u8 = 8;
    /// The kind of an [`Address::Nft`].
    pub const NFT_KIND: u8 = 16;

    /// Returns the kind discriminator.
    pub fn kind(&self) -> u8 {
        match self {
            Self::Ed25519(_) => Self::ED25519_KIND,
            Self::Alias(_) => Self::ALIAS_KIND,
            Self::Nft(_) => Self::NFT_KIND,
        }
    }

    /// Returns a human readable name of the kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Ed25519(_) => "ed25519",
            Self::Alias(_) => "alias",
            Self::Nft(_) => "nft",
        }
    }

    /// Encodes the packed address as bech32 with the given human readable part.
    pub fn to_bech32(&self, hrp: &str) -> Result<String, EncodingError> {
        let bytes = self.pack_to_vec();
        bech32::encode(hrp, bytes.to_base32(), Variant::Bech32).map_err(|e| EncodingError::Bech32(e.to_string()))
    }

    /// Decodes a bech32 address, returning its human readable part alongside.
    pub fn try_from_bech32(bech32: &str) -> Result<(String, Self), DecodingError> {
        let (hrp, data, variant) = bech32::decode(bech32).map_err(|e| EncodingError::Bech32(e.to_string()))?;
        if variant != Variant::Bech32 {
            return Err(EncodingError::Bech32("expected the bech32 variant, found bech32m".to_owned()).into());
        }
        let bytes = Vec::<u8>::from_base32(&data).map_err(|e| EncodingError::Bech32(e.to_string()))?;
        Ok((hrp, unpack_exact(bytes)?))
    }
}

impl From<Ed25519Address> for Address {
    fn from(value: Ed25519Address) -> Self {
        Self::Ed25519(value)
    }
}

impl From<AliasId> for Address {
    fn from(value: AliasId) -> Self {
        Self::Alias(value)
    }
}

impl From<NftId> for Address {
    fn from(value: NftId) -> Self {
        Self::Nft(value)
    }
}

impl Packable for Address {
    type UnpackError = DecodingError;
    type UnpackVisitor = ();

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        self.kind().pack(packer)?;
        match self {
            Self::Ed25519(a) => a.pack(packer),
            Self::Alias(a) => a.pack(packer),
            Self::Nft(a) => a.pack(packer),
        }
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(unpacker: &mut U, _: &()) -> UnpackResult<Self, U> {
        Ok(match unpack_kind::<_, VERIFY>(unpacker)? {
            Self::ED25519_KIND => Self::Ed25519(Ed25519Address::unpack::<_, VERIFY>(unpacker, &())?),
            Self::ALIAS_KIND => Self::Alias(AliasId::unpack::<_, VERIFY>(unpacker, &())?),
            Self::NFT_KIND => Self::Nft(NftId::unpack::<_, VERIFY>(unpacker, &())?),
            kind => return unknown_kind::<_, U>("address", kind),
        })
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ed25519Dto {
    pub_key_hash: Ed25519Address,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AliasDto {
    alias_id: AliasId,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NftDto {
    nft_id: NftId,
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let kind = self.kind();
        match *self {
            Self::Ed25519(pub_key_hash) => Tagged {
                kind,
                body: &Ed25519Dto { pub_key_hash },
            }
            .serialize(serializer),
            Self::Alias(alias_id) => Tagged {
                kind,
                body: &AliasDto { alias_id },
            }
            .serialize(serializer),
            Self::Nft(nft_id) => Tagged {
                kind,
                body: &NftDto { nft_id },
            }
            .serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (kind, map) = tagged::split(deserializer, "address")?;
        Ok(match kind {
            Self::ED25519_KIND => Self::Ed25519(map.parse::<Ed25519Dto>()?.pub_key_hash),
            Self::ALIAS_KIND => Self::Alias(map.parse::<AliasDto>()?.alias_id),
            Self::NFT_KIND => Self::Nft(map.parse::<NftDto>()?.nft_id),
            kind => {
                return Err(serde::de::Error::custom(format!("unknown address type {kind}")));
            }
        })
    }
}

#[cfg(any(test, feature = "rand"))]
mod rand {
    use ::rand::Rng;

    use super::*;

    impl Address {
        /// Generates a random [`Address`] of any kind.
        pub fn rand() -> Self {
            match ::rand::thread_rng().gen_range(0..3) {
                0 => Self::rand_ed25519(),
                1 => Self::Alias(AliasId::rand()),
                _ => Self::Nft(NftId::rand()),
            }
        }

        /// Generates a random Ed25519 [`Address`].
        pub fn rand_ed25519() -> Self {
            Self::Ed25519(Ed25519Address(::rand::random()))
        }
    }
}
