// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Error types shared by the encoder, the deriver and the marshaling layer.

use std::convert::Infallible;

use packable::error::UnpackError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Malformed or out-of-range numeric or structural input.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum EncodingError {
    #[error("malformed decimal amount `{0}`")]
    MalformedAmount(String),
    #[error("amount `{0}` does not fit into 64 bits")]
    AmountOutOfRange(String),
    #[error("amount `{amount}` is not within 1..={token_supply}")]
    AmountNotInSupply { amount: String, token_supply: String },
    #[error("{what} length {len} is not within {min}..={max}")]
    InvalidLength {
        what: &'static str,
        len: usize,
        min: usize,
        max: usize,
    },
    #[error("too many {what}: {count} > {max}")]
    InvalidCount { what: &'static str, count: usize, max: usize },
    #[error("{what} are not sorted")]
    Unsorted { what: &'static str },
    #[error("duplicate {what} {id}")]
    Duplicate { what: &'static str, id: String },
    #[error("{what} kind {kind} is not recognized and has no canonical encoding")]
    UnrecognizedKind { what: &'static str, kind: u8 },
    #[error("{output} output does not allow {what} kind {kind}")]
    Disallowed {
        output: &'static str,
        what: &'static str,
        kind: u8,
    },
    #[error("{output} output is missing the {what} of kind {kind}")]
    Missing {
        output: &'static str,
        what: &'static str,
        kind: u8,
    },
    #[error("native token amount must not be zero")]
    NullNativeTokenAmount,
    #[error("invalid token scheme: {0}")]
    InvalidTokenScheme(&'static str),
    #[error("{0} timestamp must not be zero")]
    NullTimestamp(&'static str),
    #[error("output index {0} is not within 0..=127")]
    InvalidOutputIndex(u16),
    #[error("invalid bech32: {0}")]
    Bech32(String),
    #[error("storage deposit computation overflowed")]
    RentOverflow,
    #[error("opaque body of output kind {0} is not a layout with an unrecognized element")]
    InvalidOpaqueBody(u8),
}

/// Malformed wire input: missing field, wrong JSON type, truncated or trailing bytes.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum DecodingError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("{0} trailing byte(s) after the value")]
    TrailingBytes(usize),
    #[error("unknown {what} kind {kind}")]
    UnknownKind { what: &'static str, kind: u8 },
    #[error("invalid hex for {what}: {reason}")]
    InvalidHex { what: &'static str, reason: String },
    #[error("{what} must be {expected} bytes, got {actual}")]
    InvalidIdLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("invalid value: {0}")]
    Invalid(#[from] EncodingError),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<Infallible> for DecodingError {
    fn from(value: Infallible) -> Self {
        match value {}
    }
}

impl<E> From<UnpackError<DecodingError, E>> for DecodingError {
    fn from(value: UnpackError<DecodingError, E>) -> Self {
        match value {
            UnpackError::Packable(e) => e,
            UnpackError::Unpacker(_) => Self::UnexpectedEof,
        }
    }
}

/// Semantically wrong input for a derivation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum InvalidInputError {
    #[error("{0} outputs have no chain identifier")]
    NotAChainOutput(&'static str),
    #[error("expected an alias address, found a {0} address")]
    NotAnAliasAddress(&'static str),
    #[error("serial number {0} exceeds 32 bits")]
    SerialNumberOutOfRange(u64),
    #[error("unknown token scheme kind {0}")]
    UnknownTokenScheme(u8),
    #[error("output index {0} is not within 0..=127")]
    OutputIndexOutOfRange(u16),
}

/// A response envelope carried a discriminator this crate does not know.
///
/// The payload is kept as received so callers can still inspect it.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown response type `{kind}`")]
pub struct UnknownResponseTypeError {
    /// The unrecognized `type` discriminator.
    pub kind: String,
    /// The untouched `payload`.
    pub payload: Value,
}

/// Umbrella error of the crate.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum Error {
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Decoding(#[from] DecodingError),
    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),
    #[error(transparent)]
    UnknownResponseType(#[from] UnknownResponseTypeError),
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Decoding(value.into())
    }
}

impl Error {
    /// Attaches the name of the failed operation, producing the error shape reported to hosts.
    pub fn into_operation_error(self, operation: impl Into<String>) -> OperationError {
        OperationError {
            operation: operation.into(),
            message: self.to_string(),
        }
    }
}

/// The single error shape exposed to a wrapping layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{operation} failed: {message}")]
pub struct OperationError {
    /// Name of the operation that failed, e.g. `computeFoundryId`.
    pub operation: String,
    /// Human readable cause.
    pub message: String,
}
