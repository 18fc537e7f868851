// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use pretty_assertions::assert_eq;
use stardust_codec::{
    derive::{compute_output_id, derive_alias_id, derive_foundry_id, derive_nft_id, DerivationCache},
    error::InvalidInputError,
    model::{
        output::{Address, AliasId, Ed25519Address, FoundryId, OutputId},
        ProtocolParameters, TransactionId,
    },
};

const OUTPUT_ID: &str = "0x52fdfc072182654f163f5f0f9a621d729566c74d10037c4d7bbb0407d1e2c6490000";
const CHAIN_ID: &str = "0xfe80c2eb7c736da2f7c98ecf135ee9e34e4e076afe6e1dfebc9ec578b8f56d2f";

#[test]
fn alias_and_nft_ids_from_output_id() {
    let output_id: OutputId = OUTPUT_ID.parse().unwrap();
    assert_eq!(derive_alias_id(&output_id).to_hex(), CHAIN_ID);
    assert_eq!(derive_nft_id(&output_id).to_hex(), CHAIN_ID);

    let cache = DerivationCache::new(8);
    assert_eq!(cache.alias_id(&output_id).to_hex(), CHAIN_ID);
    assert_eq!(cache.alias_id(&output_id).to_hex(), CHAIN_ID);
}

#[test]
fn foundry_id_is_the_packed_concatenation() {
    let alias_address = Address::Alias(AliasId::new([0x11; 32]));
    let foundry_id = derive_foundry_id(&alias_address, 1, 0).unwrap();
    assert_eq!(
        foundry_id.to_hex(),
        format!("0x08{}{}{}", "11".repeat(32), "01000000", "00")
    );
    assert_eq!(foundry_id.alias_id(), AliasId::new([0x11; 32]));
    assert_eq!(foundry_id.serial_number(), 1);
    assert_eq!(foundry_id.token_scheme_kind(), 0);
    assert_eq!(foundry_id.to_hex().parse::<FoundryId>().unwrap(), foundry_id);
}

#[test]
fn foundry_id_with_serial_number_zero() {
    let alias_address = Address::Alias(AliasId::new([0x11; 32]));
    let expected = format!("0x08{}0000000000", "11".repeat(32));
    assert_eq!(derive_foundry_id(&alias_address, 0, 0).unwrap().to_hex(), expected);
    assert_eq!(
        DerivationCache::default().foundry_id(&alias_address, 0, 0).unwrap().to_hex(),
        expected
    );
}

#[test]
fn foundry_id_needs_an_alias_address() {
    let address = Address::Ed25519(Ed25519Address::new([0; 32]));
    assert_eq!(
        derive_foundry_id(&address, 1, 0),
        Err(InvalidInputError::NotAnAliasAddress("ed25519"))
    );
}

#[test]
fn output_index_above_127_is_rejected() {
    let transaction_id: TransactionId = format!("0x{}", "52".repeat(32)).parse().unwrap();
    assert_eq!(
        compute_output_id(transaction_id, 1000),
        Err(InvalidInputError::OutputIndexOutOfRange(1000))
    );
    let output_id = compute_output_id(transaction_id, 127).unwrap();
    assert_eq!(output_id.to_hex(), format!("0x{}7f00", "52".repeat(32)));
}

#[test]
fn shimmer_network_id_and_bech32() {
    let params = ProtocolParameters::default();
    assert_eq!(params.network_id(), 14364762045254553490);

    let address = Address::Ed25519(Ed25519Address::new([0; 32]));
    let bech32 = address.to_bech32(&params.bech32_hrp).unwrap();
    assert_eq!(bech32, "smr1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqy8f002");
    assert_eq!(Address::try_from_bech32(&bech32).unwrap(), ("smr".to_owned(), address));

    let alias = Address::Alias(AliasId::new([0x11; 32]));
    assert_eq!(
        alias.to_bech32("smr").unwrap(),
        "smr1pqg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3z6hlw3v"
    );
}
