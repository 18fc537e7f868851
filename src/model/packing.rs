// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Glue between the model and the [`packable`] traits.
//!
//! Every integer is little-endian at its protocol width. Collections carry a count prefix, byte strings a length
//! prefix, and every tagged variant starts with its kind byte.

use std::convert::Infallible;

use packable::{
    bounded::{BoundedU16, BoundedU8},
    error::{UnpackError, UnpackErrorExt},
    packer::Packer,
    prefix::{BoxedSlicePrefix, UnpackPrefixError, VecPrefix},
    unpacker::Unpacker,
    Packable, PackableExt,
};
use primitive_types::U256;

use crate::error::{DecodingError, EncodingError};

pub(crate) type UnpackResult<T, U> = Result<T, UnpackError<DecodingError, <U as Unpacker>::Error>>;

/// Unpacks a value that must span `bytes` exactly, checking every syntactic rule on the way.
pub fn unpack_exact<T>(bytes: impl AsRef<[u8]>) -> Result<T, DecodingError>
where
    T: Packable<UnpackError = DecodingError, UnpackVisitor = ()>,
{
    let bytes = bytes.as_ref();
    let value = T::unpack_verified(bytes, &())?;
    match bytes.len().saturating_sub(value.packed_len()) {
        0 => Ok(value),
        trailing => Err(DecodingError::TrailingBytes(trailing)),
    }
}

pub(crate) fn unpack_kind<U: Unpacker, const VERIFY: bool>(unpacker: &mut U) -> UnpackResult<u8, U> {
    unpack_int::<u8, _, VERIFY>(unpacker)
}

pub(crate) fn unpack_int<T, U, const VERIFY: bool>(unpacker: &mut U) -> UnpackResult<T, U>
where
    T: Packable<UnpackError = Infallible, UnpackVisitor = ()>,
    U: Unpacker,
{
    T::unpack::<_, VERIFY>(unpacker, &()).coerce()
}

/// Lifts the outcome of a semantic check into an unpacking result.
pub(crate) fn verified<U: Unpacker>(result: Result<(), EncodingError>) -> UnpackResult<(), U> {
    result.map_err(|e| UnpackError::Packable(e.into()))
}

pub(crate) fn unknown_kind<T, U: Unpacker>(what: &'static str, kind: u8) -> UnpackResult<T, U> {
    Err(UnpackError::Packable(DecodingError::UnknownKind { what, kind }))
}

/// 256-bit integers occupy 32 little-endian bytes.
pub(crate) fn pack_u256<P: Packer>(value: &U256, packer: &mut P) -> Result<(), P::Error> {
    let mut bytes = [0; 32];
    value.to_little_endian(&mut bytes);
    packer.pack_bytes(bytes)
}

pub(crate) fn unpack_u256<U: Unpacker>(unpacker: &mut U) -> UnpackResult<U256, U> {
    let mut bytes = [0; 32];
    unpacker.unpack_bytes(&mut bytes).map_err(UnpackError::Unpacker)?;
    Ok(U256::from_little_endian(&bytes))
}

pub(crate) fn unpack_array<U: Unpacker, const N: usize>(unpacker: &mut U) -> UnpackResult<[u8; N], U> {
    let mut bytes = [0; N];
    unpacker.unpack_bytes(&mut bytes).map_err(UnpackError::Unpacker)?;
    Ok(bytes)
}

/// Packs a verified byte string behind a `u8` length prefix.
pub(crate) fn pack_u8_prefixed<P: Packer>(bytes: &[u8], packer: &mut P) -> Result<(), P::Error> {
    (bytes.len() as u8).pack(packer)?;
    packer.pack_bytes(bytes)
}

/// Packs a verified byte string behind a `u16` length prefix.
pub(crate) fn pack_u16_prefixed<P: Packer>(bytes: &[u8], packer: &mut P) -> Result<(), P::Error> {
    (bytes.len() as u16).pack(packer)?;
    packer.pack_bytes(bytes)
}

/// Packs a verified collection behind a `u8` count prefix.
pub(crate) fn pack_u8_counted<'a, T, P>(
    items: impl ExactSizeIterator<Item = &'a T>,
    packer: &mut P,
) -> Result<(), P::Error>
where
    T: Packable + 'a,
    P: Packer,
{
    (items.len() as u8).pack(packer)?;
    for item in items {
        item.pack(packer)?;
    }
    Ok(())
}

/// Unpacks a collection behind a `u8` count prefix of at most `MAX`.
pub(crate) fn unpack_u8_counted<T, U, const VERIFY: bool, const MAX: u8>(
    unpacker: &mut U,
    what: &'static str,
) -> UnpackResult<Vec<T>, U>
where
    T: Packable<UnpackError = DecodingError, UnpackVisitor = ()>,
    U: Unpacker,
{
    VecPrefix::<T, BoundedU8<0, MAX>>::unpack::<_, VERIFY>(unpacker, &())
        .map_err(|e| match e {
            UnpackError::Packable(UnpackPrefixError::Item(e)) => UnpackError::Packable(e),
            UnpackError::Packable(UnpackPrefixError::Prefix(p)) => {
                UnpackError::Packable(invalid_count(what, p.0 as usize, MAX as usize))
            }
            UnpackError::Unpacker(e) => UnpackError::Unpacker(e),
        })
        .map(Vec::from)
}

/// Unpacks a byte string behind a `u8` length prefix within `MIN..=MAX`.
pub(crate) fn unpack_u8_prefixed<U, const VERIFY: bool, const MIN: u8, const MAX: u8>(
    unpacker: &mut U,
    what: &'static str,
) -> UnpackResult<Box<[u8]>, U>
where
    U: Unpacker,
{
    BoxedSlicePrefix::<u8, BoundedU8<MIN, MAX>>::unpack::<_, VERIFY>(unpacker, &())
        .map_err(|e| match e {
            UnpackError::Packable(UnpackPrefixError::Item(e)) => match e {},
            UnpackError::Packable(UnpackPrefixError::Prefix(p)) => {
                UnpackError::Packable(invalid_length(what, p.0 as usize, MIN as usize, MAX as usize))
            }
            UnpackError::Unpacker(e) => UnpackError::Unpacker(e),
        })
        .map(Box::from)
}

/// Unpacks a byte string behind a `u16` length prefix within `MIN..=MAX`.
pub(crate) fn unpack_u16_prefixed<U, const VERIFY: bool, const MIN: u16, const MAX: u16>(
    unpacker: &mut U,
    what: &'static str,
) -> UnpackResult<Box<[u8]>, U>
where
    U: Unpacker,
{
    BoxedSlicePrefix::<u8, BoundedU16<MIN, MAX>>::unpack::<_, VERIFY>(unpacker, &())
        .map_err(|e| match e {
            UnpackError::Packable(UnpackPrefixError::Item(e)) => match e {},
            UnpackError::Packable(UnpackPrefixError::Prefix(p)) => {
                UnpackError::Packable(invalid_length(what, p.0 as usize, MIN as usize, MAX as usize))
            }
            UnpackError::Unpacker(e) => UnpackError::Unpacker(e),
        })
        .map(Box::from)
}

/// The error of a prefix that is outside of its bounds.
pub(crate) fn invalid_length(what: &'static str, len: usize, min: usize, max: usize) -> DecodingError {
    EncodingError::InvalidLength { what, len, min, max }.into()
}

/// The error of a count prefix that is outside of its bounds.
pub(crate) fn invalid_count(what: &'static str, count: usize, max: usize) -> DecodingError {
    EncodingError::InvalidCount { what, count, max }.into()
}
