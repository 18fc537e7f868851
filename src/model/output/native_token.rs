// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use derive_more::Deref;
use packable::{packer::Packer, unpacker::Unpacker, Packable};
use primitive_types::U256;
use serde::{Deserialize, Deserializer, Serialize};

use super::FoundryId;
use crate::{
    error::{DecodingError, EncodingError},
    model::packing::{pack_u256, pack_u8_counted, unpack_u256, unpack_u8_counted, verified, UnpackResult},
};

/// Native tokens are identified by the foundry that controls their supply.
pub type TokenId = FoundryId;

/// An amount of a user defined token carried by an output.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NativeToken {
    /// The identifier of the token.
    pub id: TokenId,
    /// The amount, never zero.
    #[serde(with = "crate::model::util::hex_u256")]
    pub amount: U256,
}

impl NativeToken {
    /// Creates a [`NativeToken`], rejecting a zero amount.
    pub fn new(id: TokenId, amount: U256) -> Result<Self, EncodingError> {
        let token = Self { id, amount };
        token.verify()?;
        Ok(token)
    }

    /// Checks that the amount is not zero.
    pub fn verify(&self) -> Result<(), EncodingError> {
        if self.amount.is_zero() {
            Err(EncodingError::NullNativeTokenAmount)
        } else {
            Ok(())
        }
    }
}

impl Packable for NativeToken {
    type UnpackError = DecodingError;
    type UnpackVisitor = ();

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        self.id.pack(packer)?;
        pack_u256(&self.amount, packer)
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(unpacker: &mut U, _: &()) -> UnpackResult<Self, U> {
        let token = Self {
            id: TokenId::unpack::<_, VERIFY>(unpacker, &())?,
            amount: unpack_u256(unpacker)?,
        };
        if VERIFY {
            verified::<U>(token.verify())?;
        }
        Ok(token)
    }
}

/// The native tokens of an output: at most [`NativeTokens::COUNT_MAX`], sorted by token ID, without duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deref, Serialize)]
#[serde(transparent)]
pub struct NativeTokens(Vec<NativeToken>);

impl NativeTokens {
    /// The maximum number of distinct native tokens.
    pub const COUNT_MAX: usize = 64;

    /// Sorts `tokens` and checks the count and uniqueness.
    pub fn new(tokens: impl IntoIterator<Item = NativeToken>) -> Result<Self, EncodingError> {
        let mut tokens = tokens.into_iter().collect::<Vec<_>>();
        tokens.sort_by_key(|t| t.id);
        Self::verify_tokens(&tokens)?;
        Ok(Self(tokens))
    }

    /// Whether there are no native tokens.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Checks the count, the order and every amount.
    pub fn verify(&self) -> Result<(), EncodingError> {
        Self::verify_tokens(&self.0)
    }

    fn verify_tokens(tokens: &[NativeToken]) -> Result<(), EncodingError> {
        if tokens.len() > Self::COUNT_MAX {
            return Err(EncodingError::InvalidCount {
                what: "native tokens",
                count: tokens.len(),
                max: Self::COUNT_MAX,
            });
        }
        tokens.iter().try_for_each(NativeToken::verify)?;
        for pair in tokens.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(EncodingError::Duplicate {
                    what: "native token",
                    id: pair[0].id.to_hex(),
                });
            }
            if pair[0].id > pair[1].id {
                return Err(EncodingError::Unsorted { what: "native tokens" });
            }
        }
        Ok(())
    }
}

impl Packable for NativeTokens {
    type UnpackError = DecodingError;
    type UnpackVisitor = ();

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        pack_u8_counted(self.0.iter(), packer)
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(unpacker: &mut U, _: &()) -> UnpackResult<Self, U> {
        let tokens =
            unpack_u8_counted::<NativeToken, _, VERIFY, { Self::COUNT_MAX as u8 }>(unpacker, "native tokens")?;
        if VERIFY {
            verified::<U>(Self::verify_tokens(&tokens))?;
        }
        Ok(Self(tokens))
    }
}

impl<'de> Deserialize<'de> for NativeTokens {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Self::new(Vec::<NativeToken>::deserialize(deserializer)?).map_err(serde::de::Error::custom)
    }
}

#[cfg(any(test, feature = "rand"))]
mod rand {
    use super::*;

    impl NativeToken {
        /// Generates a random [`NativeToken`].
        pub fn rand() -> Self {
            Self {
                id: TokenId::rand(),
                amount: U256::from(::rand::random::<u64>()) + 1,
            }
        }
    }

    impl NativeTokens {
        /// Generates a set of `len` random [`NativeToken`]s.
        pub fn rand(len: usize) -> Self {
            Self((0..len).map(|_| NativeToken::rand()).collect()).sorted()
        }

        fn sorted(mut self) -> Self {
            self.0.sort_by_key(|t| t.id);
            self.0.dedup_by_key(|t| t.id);
            self
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use packable::PackableExt;

    use super::*;
    use crate::model::unpack_exact;

    fn token(byte: u8, amount: u64) -> NativeToken {
        NativeToken::new(TokenId::new([byte; 38]), amount.into()).unwrap()
    }

    #[test]
    fn empty_set_is_a_zero_count() {
        let tokens = NativeTokens::default();
        assert_eq!(tokens.pack_to_vec(), vec![0]);
        assert_eq!(unpack_exact::<NativeTokens>([0u8]).unwrap(), tokens);
    }

    #[test]
    fn construction_sorts_by_id() {
        let a = NativeTokens::new([token(2, 1), token(1, 1)]).unwrap();
        let b = NativeTokens::new([token(1, 1), token(2, 1)]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.pack_to_vec(), b.pack_to_vec());
        assert_eq!(a[0].id, TokenId::new([1; 38]));
    }

    #[test]
    fn duplicates_are_rejected() {
        assert!(matches!(
            NativeTokens::new([token(1, 1), token(1, 2)]),
            Err(EncodingError::Duplicate { .. })
        ));
    }

    #[test]
    fn zero_amount_is_rejected() {
        assert_eq!(
            NativeToken::new(TokenId::new([1; 38]), U256::zero()),
            Err(EncodingError::NullNativeTokenAmount)
        );
    }

    #[test]
    fn unsorted_binary_is_rejected() {
        let bytes = [vec![2], token(2, 1).pack_to_vec(), token(1, 1).pack_to_vec()].concat();
        assert!(matches!(
            unpack_exact::<NativeTokens>(bytes),
            Err(DecodingError::Invalid(EncodingError::Unsorted { .. }))
        ));
    }

    #[test]
    fn json_shape() {
        let tokens = NativeTokens::new([token(1, 1000)]).unwrap();
        let value = serde_json::to_value(&tokens).unwrap();
        assert_eq!(
            value,
            json!([{ "id": format!("0x{}", "01".repeat(38)), "amount": "0x3e8" }])
        );
        assert_eq!(serde_json::from_value::<NativeTokens>(value).unwrap(), tokens);
    }

    #[test]
    fn random_sets_are_valid() {
        let tokens = NativeTokens::rand(5);
        assert_eq!(unpack_exact::<NativeTokens>(tokens.pack_to_vec()).unwrap(), tokens);
    }

    #[test]
    fn zero_amount_binary_is_rejected() {
        let bytes = [vec![1], TokenId::new([1; 38]).pack_to_vec(), vec![0; 32]].concat();
        assert!(matches!(
            unpack_exact::<NativeTokens>(bytes),
            Err(DecodingError::Invalid(EncodingError::NullNativeTokenAmount))
        ));
    }

    #[test]
    fn count_prefix_is_bounded() {
        assert!(matches!(
            unpack_exact::<NativeTokens>([65u8]),
            Err(DecodingError::Invalid(EncodingError::InvalidCount { count: 65, max: 64, .. }))
        ));
    }
}
