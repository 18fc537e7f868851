// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::{fmt, str::FromStr};

use packable::{packer::Packer, unpacker::Unpacker, Packable};

use crate::{
    error::{DecodingError, EncodingError},
    model::{
        identifier::{decode_fixed_hex, TransactionId},
        packing::{unpack_int, verified, UnpackResult},
        unpack_exact,
    },
};

/// The position of an output within its transaction.
pub type OutputIndex = u16;

/// Identifies an output: the transaction that created it and its position among the transaction's outputs.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub struct OutputId {
    pub transaction_id: TransactionId,
    pub index: OutputIndex,
}

impl OutputId {
    /// The number of bytes of a packed output ID.
    pub const LENGTH: usize = TransactionId::LENGTH + std::mem::size_of::<OutputIndex>();
    /// The highest valid output index.
    pub const INDEX_MAX: OutputIndex = 127;

    /// Creates an [`OutputId`], checking the index range.
    pub fn new(transaction_id: TransactionId, index: OutputIndex) -> Result<Self, EncodingError> {
        let output_id = Self { transaction_id, index };
        output_id.verify()?;
        Ok(output_id)
    }

    /// Checks the index range.
    pub fn verify(&self) -> Result<(), EncodingError> {
        if self.index > Self::INDEX_MAX {
            Err(EncodingError::InvalidOutputIndex(self.index))
        } else {
            Ok(())
        }
    }

    /// Returns the 34 bytes of the packed output ID.
    pub fn to_bytes(&self) -> [u8; OutputId::LENGTH] {
        let mut bytes = [0; OutputId::LENGTH];
        bytes[..TransactionId::LENGTH].copy_from_slice(self.transaction_id.as_ref());
        bytes[TransactionId::LENGTH..].copy_from_slice(&self.index.to_le_bytes());
        bytes
    }

    /// Converts the output ID to its `0x`-prefixed hex representation.
    pub fn to_hex(&self) -> String {
        prefix_hex::encode(&self.to_bytes()[..])
    }
}

impl Packable for OutputId {
    type UnpackError = DecodingError;
    type UnpackVisitor = ();

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        self.transaction_id.pack(packer)?;
        self.index.pack(packer)
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(unpacker: &mut U, _: &()) -> UnpackResult<Self, U> {
        let output_id = Self {
            transaction_id: TransactionId::unpack::<_, VERIFY>(unpacker, &())?,
            index: unpack_int::<OutputIndex, _, VERIFY>(unpacker)?,
        };
        if VERIFY {
            verified::<U>(output_id.verify())?;
        }
        Ok(output_id)
    }
}

impl FromStr for OutputId {
    type Err = DecodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        unpack_exact(decode_fixed_hex::<{ OutputId::LENGTH }>("output id", s)?)
    }
}

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OutputId({})", self.to_hex())
    }
}

impl serde::Serialize for OutputId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        crate::model::util::stringify::serialize(self, serializer)
    }
}

impl<'de> serde::Deserialize<'de> for OutputId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        crate::model::util::stringify::deserialize(deserializer)
    }
}

#[cfg(any(test, feature = "rand"))]
mod rand {
    use ::rand::Rng;

    use super::*;

    impl OutputId {
        /// Generates a random [`OutputId`].
        pub fn rand() -> Self {
            Self {
                transaction_id: TransactionId::rand(),
                index: ::rand::thread_rng().gen_range(0..=Self::INDEX_MAX),
            }
        }
    }
}
