// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use packable::{packer::Packer, unpacker::Unpacker, Packable};
use serde::{Deserialize, Serialize};

use crate::{
    error::{DecodingError, EncodingError},
    model::{
        packing::{verified, UnpackResult},
        TokenAmount,
    },
};

/// Holds the funds of the legacy network migration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[allow(missing_docs)]
pub struct TreasuryOutput {
    pub amount: TokenAmount,
}

impl TreasuryOutput {
    /// A `u8` representing the output kind.
    pub const KIND: u8 = 2;

    /// Checks that the amount has a binary encoding.
    pub fn verify(&self) -> Result<(), EncodingError> {
        self.amount.to_u64().map(drop)
    }
}

impl Packable for TreasuryOutput {
    type UnpackError = DecodingError;
    type UnpackVisitor = ();

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        self.amount.pack(packer)
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(unpacker: &mut U, _: &()) -> UnpackResult<Self, U> {
        let output = Self {
            amount: TokenAmount::unpack::<_, VERIFY>(unpacker, &())?,
        };
        if VERIFY {
            verified::<U>(output.verify())?;
        }
        Ok(output)
    }
}
