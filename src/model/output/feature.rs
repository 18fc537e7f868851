// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the [`Feature`] types.

use derive_more::Deref;
use packable::{packer::Packer, unpacker::Unpacker, Packable};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{unknown::Unrecognized, unlock_condition::verify_sorted_kinds, Address};
use crate::{
    error::{DecodingError, EncodingError},
    model::{
        packing::{
            pack_u16_prefixed, pack_u8_counted, pack_u8_prefixed, unknown_kind, unpack_kind, unpack_u16_prefixed,
            unpack_u8_counted, unpack_u8_prefixed, verified, UnpackResult,
        },
        util::tagged::{self, Tagged},
    },
};

/// The different [`Feature`] variants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Feature {
    /// The sender feature.
    Sender(Address),
    /// The issuer feature.
    Issuer(Address),
    /// The metadata feature.
    Metadata(Box<[u8]>),
    /// The tag feature.
    Tag(Box<[u8]>),
    /// A feature of an unknown kind.
    Unknown(Unrecognized),
}

#[derive(Serialize, Deserialize)]
struct AddressDto {
    address: Address,
}

#[derive(Serialize, Deserialize)]
struct MetadataDto {
    #[serde(with = "crate::model::util::hex_bytes")]
    data: Box<[u8]>,
}

#[derive(Serialize, Deserialize)]
struct TagDto {
    #[serde(with = "crate::model::util::hex_bytes")]
    tag: Box<[u8]>,
}

#[allow(missing_docs)]
impl Feature {
    pub const SENDER_KIND: u8 = 0;
    pub const ISSUER_KIND: u8 = 1;
    pub const METADATA_KIND: u8 = 2;
    pub const TAG_KIND: u8 = 3;

    /// The maximum length of the metadata.
    pub const METADATA_LENGTH_MAX: usize = 8192;
    /// The maximum length of a tag.
    pub const TAG_LENGTH_MAX: usize = 64;

    /// Returns the kind discriminator.
    pub fn kind(&self) -> u8 {
        match self {
            Self::Sender(_) => Self::SENDER_KIND,
            Self::Issuer(_) => Self::ISSUER_KIND,
            Self::Metadata(_) => Self::METADATA_KIND,
            Self::Tag(_) => Self::TAG_KIND,
            Self::Unknown(u) => u.kind,
        }
    }

    /// Checks the rules a single feature must follow to have a canonical encoding.
    pub fn verify(&self) -> Result<(), EncodingError> {
        match self {
            Self::Metadata(data) => verify_length("metadata", data, Self::METADATA_LENGTH_MAX),
            Self::Tag(tag) => verify_length("tag", tag, Self::TAG_LENGTH_MAX),
            Self::Unknown(u) => Err(EncodingError::UnrecognizedKind {
                what: "feature",
                kind: u.kind,
            }),
            _ => Ok(()),
        }
    }
}

fn verify_length(what: &'static str, bytes: &[u8], max: usize) -> Result<(), EncodingError> {
    if (1..=max).contains(&bytes.len()) {
        Ok(())
    } else {
        Err(EncodingError::InvalidLength {
            what,
            len: bytes.len(),
            min: 1,
            max,
        })
    }
}

const METADATA_PREFIX_MAX: u16 = Feature::METADATA_LENGTH_MAX as u16;
const TAG_PREFIX_MAX: u8 = Feature::TAG_LENGTH_MAX as u8;

impl Packable for Feature {
    type UnpackError = DecodingError;
    type UnpackVisitor = ();

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        if let Self::Unknown(u) = self {
            return u.pack(packer);
        }
        self.kind().pack(packer)?;
        match self {
            Self::Sender(address) | Self::Issuer(address) => address.pack(packer),
            Self::Metadata(data) => pack_u16_prefixed(data, packer),
            Self::Tag(tag) => pack_u8_prefixed(tag, packer),
            Self::Unknown(_) => Ok(()),
        }
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(unpacker: &mut U, _: &()) -> UnpackResult<Self, U> {
        Ok(match unpack_kind::<_, VERIFY>(unpacker)? {
            Self::SENDER_KIND => Self::Sender(Address::unpack::<_, VERIFY>(unpacker, &())?),
            Self::ISSUER_KIND => Self::Issuer(Address::unpack::<_, VERIFY>(unpacker, &())?),
            Self::METADATA_KIND => {
                Self::Metadata(unpack_u16_prefixed::<_, VERIFY, 1, METADATA_PREFIX_MAX>(unpacker, "metadata")?)
            }
            Self::TAG_KIND => Self::Tag(unpack_u8_prefixed::<_, VERIFY, 1, TAG_PREFIX_MAX>(unpacker, "tag")?),
            kind => return unknown_kind::<_, U>("feature", kind),
        })
    }
}

impl Serialize for Feature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let kind = self.kind();
        match self {
            Self::Sender(address) | Self::Issuer(address) => Tagged {
                kind,
                body: &AddressDto { address: *address },
            }
            .serialize(serializer),
            Self::Metadata(data) => Tagged {
                kind,
                body: &MetadataDto { data: data.clone() },
            }
            .serialize(serializer),
            Self::Tag(tag) => Tagged {
                kind,
                body: &TagDto { tag: tag.clone() },
            }
            .serialize(serializer),
            Self::Unknown(unknown) => unknown.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Feature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (kind, map) = tagged::split(deserializer, "feature")?;
        Ok(match kind {
            Self::SENDER_KIND => Self::Sender(map.parse::<AddressDto>()?.address),
            Self::ISSUER_KIND => Self::Issuer(map.parse::<AddressDto>()?.address),
            Self::METADATA_KIND => Self::Metadata(map.parse::<MetadataDto>()?.data),
            Self::TAG_KIND => Self::Tag(map.parse::<TagDto>()?.tag),
            kind => Self::Unknown(Unrecognized::from_json(kind, map.into_inner())),
        })
    }
}

/// The features of an output: at most one per kind, sorted by kind.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deref, Serialize)]
#[serde(transparent)]
pub struct Features(Vec<Feature>);

impl Features {
    /// The maximum number of features.
    pub const COUNT_MAX: usize = 4;

    /// Sorts `features` by kind and checks the count and uniqueness.
    pub fn new(features: impl IntoIterator<Item = Feature>) -> Result<Self, EncodingError> {
        let mut features = features.into_iter().collect::<Vec<_>>();
        features.sort_by_key(Feature::kind);
        verify_sorted_kinds(&features, Feature::kind, "feature", Self::COUNT_MAX)?;
        Ok(Self(features))
    }

    /// Whether there are no features.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the issuer, if any.
    pub fn issuer(&self) -> Option<&Address> {
        self.0.iter().find_map(|f| match f {
            Feature::Issuer(a) => Some(a),
            _ => None,
        })
    }

    /// Returns the metadata, if any.
    pub fn metadata(&self) -> Option<&[u8]> {
        self.0.iter().find_map(|f| match f {
            Feature::Metadata(data) => Some(&**data),
            _ => None,
        })
    }

    pub(crate) fn kinds(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().map(Feature::kind)
    }

    /// Checks the count, the order and every feature.
    pub fn verify(&self) -> Result<(), EncodingError> {
        verify_sorted_kinds(&self.0, Feature::kind, "feature", Self::COUNT_MAX)?;
        self.0.iter().try_for_each(Feature::verify)
    }
}

impl Packable for Features {
    type UnpackError = DecodingError;
    type UnpackVisitor = ();

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        pack_u8_counted(self.0.iter(), packer)
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(unpacker: &mut U, _: &()) -> UnpackResult<Self, U> {
        let features =
            unpack_u8_counted::<Feature, _, VERIFY, { Self::COUNT_MAX as u8 }>(unpacker, "features")?;
        if VERIFY {
            verified::<U>(verify_sorted_kinds(&features, Feature::kind, "feature", Self::COUNT_MAX))?;
        }
        Ok(Self(features))
    }
}

impl<'de> Deserialize<'de> for Features {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Self::new(Vec::<Feature>::deserialize(deserializer)?).map_err(serde::de::Error::custom)
    }
}
