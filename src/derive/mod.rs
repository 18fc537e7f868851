// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Derivation of the identifiers that track alias, foundry and NFT chains.

mod cache;

use crypto::hashes::{blake2b::Blake2b256, Digest};
use serde::Serialize;

pub use self::cache::DerivationCache;
use crate::{
    error::InvalidInputError,
    model::{
        output::{Address, AliasId, FoundryId, NftId, Output, OutputId, OutputIndex, TokenScheme},
        TransactionId,
    },
};

fn hash_output_id(output_id: &OutputId) -> [u8; 32] {
    Blake2b256::digest(output_id.to_bytes()).into()
}

/// Derives the ID of the alias created by the output `output_id`.
pub fn derive_alias_id(output_id: &OutputId) -> AliasId {
    AliasId::new(hash_output_id(output_id))
}

/// Derives the ID of the NFT minted by the output `output_id`.
pub fn derive_nft_id(output_id: &OutputId) -> NftId {
    NftId::new(hash_output_id(output_id))
}

/// Derives the ID of the foundry with `serial_number` controlled by `alias_address`.
///
/// The packed alias address, the serial number and the token scheme kind are concatenated; no hash is applied.
pub fn derive_foundry_id(
    alias_address: &Address,
    serial_number: u64,
    token_scheme_kind: u8,
) -> Result<FoundryId, InvalidInputError> {
    let alias_id = match alias_address {
        Address::Alias(alias_id) => alias_id,
        other => return Err(InvalidInputError::NotAnAliasAddress(other.kind_name())),
    };
    let serial_number =
        u32::try_from(serial_number).map_err(|_| InvalidInputError::SerialNumberOutOfRange(serial_number))?;
    if token_scheme_kind != TokenScheme::SIMPLE_KIND {
        return Err(InvalidInputError::UnknownTokenScheme(token_scheme_kind));
    }
    Ok(FoundryId::build(alias_id, serial_number, token_scheme_kind))
}

/// Builds the ID of the output at `index` of the transaction `transaction_id`.
pub fn compute_output_id(transaction_id: TransactionId, index: OutputIndex) -> Result<OutputId, InvalidInputError> {
    OutputId::new(transaction_id, index).map_err(|_| InvalidInputError::OutputIndexOutOfRange(index))
}

/// The identifier of a chain of outputs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
#[allow(missing_docs)]
pub enum ChainId {
    Alias(AliasId),
    Nft(NftId),
    Foundry(FoundryId),
}

impl ChainId {
    /// Returns the `0x`-prefixed hex representation.
    pub fn to_hex(&self) -> String {
        match self {
            Self::Alias(id) => id.to_hex(),
            Self::Nft(id) => id.to_hex(),
            Self::Foundry(id) => id.to_hex(),
        }
    }
}

/// Resolves the chain ID of `output`, which was created as `output_id`.
///
/// Alias and NFT outputs carrying the null ID are the first of their chain, so their ID is derived from `output_id`.
pub fn derive_chain_id(output: &Output, output_id: &OutputId) -> Result<ChainId, InvalidInputError> {
    match output {
        Output::Alias(alias) if alias.alias_id.is_null() => Ok(ChainId::Alias(derive_alias_id(output_id))),
        Output::Alias(alias) => Ok(ChainId::Alias(alias.alias_id)),
        Output::Nft(nft) if nft.nft_id.is_null() => Ok(ChainId::Nft(derive_nft_id(output_id))),
        Output::Nft(nft) => Ok(ChainId::Nft(nft.nft_id)),
        Output::Foundry(foundry) => {
            let address = foundry
                .unlock_conditions
                .immutable_alias_address()
                .ok_or(InvalidInputError::NotAChainOutput("foundry without alias"))?;
            derive_foundry_id(address, foundry.serial_number.into(), foundry.token_scheme.kind())
                .map(ChainId::Foundry)
        }
        other => Err(InvalidInputError::NotAChainOutput(other.kind_name())),
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::output::{AliasOutput, BasicOutput, Ed25519Address, NftOutput};

    #[test]
    fn alias_id_is_the_hash_of_the_output_id() {
        let output_id = OutputId::rand();
        let expected: [u8; 32] = Blake2b256::digest(output_id.to_bytes()).into();
        assert_eq!(derive_alias_id(&output_id).0, expected);
        assert_eq!(derive_alias_id(&output_id), derive_alias_id(&output_id));
        assert_eq!(derive_nft_id(&output_id).0, expected);
    }

    #[test]
    fn foundry_id_inputs_are_checked() {
        let alias = Address::Alias(AliasId::new([1; 32]));
        assert!(derive_foundry_id(&alias, u32::MAX.into(), 0).is_ok());
        assert_eq!(
            derive_foundry_id(&alias, u64::from(u32::MAX) + 1, 0),
            Err(InvalidInputError::SerialNumberOutOfRange(u64::from(u32::MAX) + 1))
        );
        assert_eq!(
            derive_foundry_id(&alias, 1, 1),
            Err(InvalidInputError::UnknownTokenScheme(1))
        );
        assert_eq!(
            derive_foundry_id(&Address::Ed25519(Ed25519Address::new([1; 32])), 1, 0),
            Err(InvalidInputError::NotAnAliasAddress("ed25519"))
        );
    }

    #[test]
    fn output_index_is_checked() {
        let transaction_id = TransactionId::rand();
        assert_eq!(compute_output_id(transaction_id, 127).unwrap().index, 127);
        assert_eq!(
            compute_output_id(transaction_id, 128),
            Err(InvalidInputError::OutputIndexOutOfRange(128))
        );
    }

    #[test]
    fn chain_ids() {
        let output_id = OutputId::rand();

        let mut alias = AliasOutput::rand();
        assert_eq!(
            derive_chain_id(&Output::Alias(alias.clone()), &output_id),
            Ok(ChainId::Alias(alias.alias_id))
        );
        alias.alias_id = AliasId::null();
        assert_eq!(
            derive_chain_id(&Output::Alias(alias), &output_id),
            Ok(ChainId::Alias(derive_alias_id(&output_id)))
        );

        let mut nft = NftOutput::rand();
        nft.nft_id = NftId::null();
        assert_eq!(
            derive_chain_id(&Output::Nft(nft), &output_id),
            Ok(ChainId::Nft(derive_nft_id(&output_id)))
        );

        assert_eq!(
            derive_chain_id(&Output::Basic(BasicOutput::rand()), &output_id),
            Err(InvalidInputError::NotAChainOutput("basic"))
        );
    }
}
