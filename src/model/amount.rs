// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the [`TokenAmount`] type.

use std::{fmt, str::FromStr};

use packable::{packer::Packer, unpacker::Unpacker, Packable};
use serde::{Deserialize, Serialize};

use super::packing::{unpack_int, UnpackResult};
use crate::error::{DecodingError, EncodingError};

/// An arbitrary-precision unsigned amount of base tokens.
///
/// The value is kept as its canonical decimal string so amounts beyond 64 bits survive marshaling untouched. The
/// binary encoding requires the value to fit into a `u64`, see [`TokenAmount::to_u64`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenAmount(#[serde(with = "super::util::stringify")] Canonical);

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct Canonical(String);

impl FromStr for Canonical {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let well_formed =
            !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) && (s == "0" || !s.starts_with('0'));
        if well_formed {
            Ok(Self(s.to_owned()))
        } else {
            Err(EncodingError::MalformedAmount(s.to_owned()))
        }
    }
}

impl fmt::Display for Canonical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TokenAmount {
    /// The zero amount.
    pub fn zero() -> Self {
        Self(Canonical("0".to_owned()))
    }

    /// Returns the decimal representation.
    pub fn as_str(&self) -> &str {
        &self.0 .0
    }

    /// Narrows the amount to the fixed width used on the wire.
    pub fn to_u64(&self) -> Result<u64, EncodingError> {
        self.as_str()
            .parse()
            .map_err(|_| EncodingError::AmountOutOfRange(self.as_str().to_owned()))
    }
}

impl From<u64> for TokenAmount {
    fn from(value: u64) -> Self {
        Self(Canonical(value.to_string()))
    }
}

impl FromStr for TokenAmount {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Packable for TokenAmount {
    type UnpackError = DecodingError;
    type UnpackVisitor = ();

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        // Only verified amounts are packed, and those fit into 64 bits.
        self.to_u64().unwrap_or(u64::MAX).pack(packer)
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(unpacker: &mut U, _: &()) -> UnpackResult<Self, U> {
        unpack_int::<u64, _, VERIFY>(unpacker).map(Self::from)
    }
}
