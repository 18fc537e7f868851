// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use packable::{packer::Packer, Packable};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::model::util::tagged::Tagged;

/// The retained content of an element whose kind this crate does not know.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnrecognizedBody {
    /// The remaining fields of a JSON object, without its `type`.
    Json(Map<String, Value>),
    /// The raw bytes following the kind byte.
    Packed(Box<[u8]>),
}

/// An element of a future protocol version, kept verbatim so it survives a round trip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unrecognized {
    /// The kind discriminator.
    pub kind: u8,
    /// The retained body.
    pub body: UnrecognizedBody,
}

#[derive(Serialize)]
struct Opaque<'a> {
    #[serde(with = "crate::model::util::hex_bytes")]
    opaque: &'a [u8],
}

impl Unrecognized {
    pub(crate) fn from_json(kind: u8, map: Map<String, Value>) -> Self {
        Self {
            kind,
            body: UnrecognizedBody::Json(map),
        }
    }

    /// Writes the kind byte followed by a retained binary body. A JSON body has no binary form.
    pub(crate) fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        self.kind.pack(packer)?;
        match &self.body {
            UnrecognizedBody::Packed(bytes) => packer.pack_bytes(bytes),
            UnrecognizedBody::Json(_) => Ok(()),
        }
    }
}

impl Serialize for Unrecognized {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.body {
            UnrecognizedBody::Json(map) => Tagged { kind: self.kind, body: map }.serialize(serializer),
            UnrecognizedBody::Packed(bytes) => Tagged {
                kind: self.kind,
                body: &Opaque { opaque: bytes },
            }
            .serialize(serializer),
        }
    }
}
