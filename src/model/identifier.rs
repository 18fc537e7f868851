// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Fixed-length identifiers.

use crate::error::DecodingError;

/// Decodes a `0x`-prefixed hex string of exactly `N` bytes.
pub(crate) fn decode_fixed_hex<const N: usize>(what: &'static str, hex: &str) -> Result<[u8; N], DecodingError> {
    let bytes = prefix_hex::decode::<Vec<u8>>(hex).map_err(|e| DecodingError::InvalidHex {
        what,
        reason: format!("{e:?}"),
    })?;
    let actual = bytes.len();
    bytes.try_into().map_err(|_| DecodingError::InvalidIdLength {
        what,
        expected: N,
        actual,
    })
}

/// Declares a fixed-length identifier with hex display, parsing, serde and packing.
macro_rules! impl_id {
    ($(#[$meta:meta])* $vis:vis struct $name:ident([u8; $len:expr]), $what:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis struct $name(pub [u8; $len]);

        impl $name {
            /// The number of bytes of the identifier.
            pub const LENGTH: usize = $len;

            /// Creates the identifier from its raw bytes.
            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// The all-zero identifier.
            pub const fn null() -> Self {
                Self([0; $len])
            }

            /// Whether every byte is zero.
            pub fn is_null(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }

            /// Converts the identifier to its `0x`-prefixed hex representation.
            pub fn to_hex(&self) -> String {
                prefix_hex::encode(&self.0[..])
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::DecodingError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $crate::model::identifier::decode_fixed_hex::<$len>($what, s).map(Self)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                $crate::model::util::stringify::serialize(self, serializer)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                $crate::model::util::stringify::deserialize(deserializer)
            }
        }

        impl packable::Packable for $name {
            type UnpackError = $crate::error::DecodingError;
            type UnpackVisitor = ();

            fn pack<P: packable::packer::Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
                packer.pack_bytes(&self.0)
            }

            fn unpack<U: packable::unpacker::Unpacker, const VERIFY: bool>(
                unpacker: &mut U,
                _: &(),
            ) -> Result<Self, packable::error::UnpackError<Self::UnpackError, U::Error>> {
                $crate::model::packing::unpack_array::<_, $len>(unpacker).map(Self)
            }
        }
    };
}

pub(crate) use impl_id;

impl_id!(
    /// The identifier of a transaction: the BLAKE2b-256 hash of its essence.
    pub struct TransactionId([u8; 32]),
    "transaction id"
);

#[cfg(any(test, feature = "rand"))]
mod rand {
    use super::*;

    impl TransactionId {
        /// Generates a random [`TransactionId`].
        pub fn rand() -> Self {
            Self(::rand::random())
        }
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn hex_is_lowercase_and_prefixed() {
        let id = TransactionId::new([0xab; 32]);
        assert_eq!(id.to_hex(), format!("0x{}", "ab".repeat(32)));
        assert_eq!(id.to_string().parse::<TransactionId>().unwrap(), id);
        assert_eq!(format!("0x{}", "AB".repeat(32)).parse::<TransactionId>().unwrap(), id);
    }

    #[test]
    fn parsing_validates_length() {
        assert!(matches!(
            "0x0102".parse::<TransactionId>(),
            Err(DecodingError::InvalidIdLength {
                expected: 32,
                actual: 2,
                ..
            })
        ));
        assert!(matches!(
            "0xzz".parse::<TransactionId>(),
            Err(DecodingError::InvalidHex { .. })
        ));
    }

    #[test]
    fn equality_is_by_bytes() {
        let lower: TransactionId = format!("0x{}", "cd".repeat(32)).parse().unwrap();
        let upper: TransactionId = format!("0x{}", "CD".repeat(32)).parse().unwrap();
        assert_eq!(lower, upper);
        assert_eq!(HashSet::from([lower, upper]).len(), 1);
    }
}
