// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use packable::PackableExt;
use pretty_assertions::assert_eq;
use primitive_types::U256;
use stardust_codec::{
    error::{DecodingError, EncodingError},
    model::{
        output::{
            Address, BasicOutput, Ed25519Address, Feature, Features, FoundryId, NativeToken, NativeTokens, Output,
            UnlockCondition, UnlockConditions, UnrecognizedBody,
        },
        ProtocolParameters,
    },
};

fn basic_output(native_tokens: NativeTokens) -> Output {
    Output::Basic(BasicOutput {
        amount: 1_000_000u64.into(),
        native_tokens,
        unlock_conditions: UnlockConditions::new([UnlockCondition::Address(Address::Ed25519(Ed25519Address::new(
            [0x22; 32],
        )))])
        .unwrap(),
        features: Features::new([Feature::Tag(b"abc".to_vec().into_boxed_slice())]).unwrap(),
    })
}

#[test]
fn basic_output_layout() {
    let token = NativeToken::new(FoundryId::new([0x08; 38]), U256::from(16u64)).unwrap();
    let output = basic_output(NativeTokens::new([token]).unwrap());
    let bytes = output.encode().unwrap();

    let mut expected = vec![3u8];
    expected.extend_from_slice(&1_000_000u64.to_le_bytes());
    expected.push(1);
    expected.extend_from_slice(&[0x08; 38]);
    expected.push(16);
    expected.extend_from_slice(&[0; 31]);
    expected.push(1);
    expected.extend_from_slice(&[0, 0]);
    expected.extend_from_slice(&[0x22; 32]);
    expected.push(1);
    expected.extend_from_slice(&[3, 3, b'a', b'b', b'c']);
    assert_eq!(bytes, expected);
    assert_eq!(output.packed_len(), expected.len());

    assert_eq!(Output::decode(&bytes).unwrap(), output);
}

#[test]
fn empty_native_tokens_encode_a_zero_count() {
    let output = basic_output(NativeTokens::default());
    let bytes = output.encode().unwrap();
    assert_eq!(bytes[9], 0);
    match Output::decode(&bytes).unwrap() {
        Output::Basic(basic) => assert!(basic.native_tokens.is_empty()),
        other => panic!("unexpected output {other:?}"),
    }
}

#[test]
fn duplicate_native_tokens_are_rejected() {
    let token = NativeToken::new(FoundryId::new([0x08; 38]), U256::from(16u64)).unwrap();
    assert!(matches!(
        NativeTokens::new([token, token]),
        Err(EncodingError::Duplicate { .. })
    ));
}

#[test]
fn unknown_output_kinds_stay_opaque() {
    let bytes = [42u8, 1, 2, 3];
    let output = Output::decode(bytes).unwrap();
    match &output {
        Output::Unknown(unknown) => {
            assert_eq!(unknown.kind, 42);
            assert_eq!(unknown.body, UnrecognizedBody::Packed(vec![1, 2, 3].into_boxed_slice()));
        }
        other => panic!("unexpected output {other:?}"),
    }
    assert_eq!(output.encode().unwrap(), bytes);
}

#[test]
fn truncated_input_is_reported() {
    let bytes = basic_output(NativeTokens::default()).encode().unwrap();
    assert!(matches!(Output::decode(&bytes[..20]), Err(DecodingError::UnexpectedEof)));
}

#[test]
fn minimum_storage_deposit_under_shimmer() {
    let output = Output::Basic(BasicOutput {
        amount: 1u64.into(),
        native_tokens: NativeTokens::default(),
        unlock_conditions: UnlockConditions::new([UnlockCondition::Address(Address::Ed25519(Ed25519Address::new(
            [0; 32],
        )))])
        .unwrap(),
        features: Features::default(),
    });
    let params = ProtocolParameters::default();
    assert_eq!(params.rent_structure.rent_cost(&output).unwrap(), 42600);
}
