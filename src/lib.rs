// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Canonical binary encoding, chain identifier derivation and node JSON marshaling of IOTA Stardust outputs.

pub mod derive;
pub mod error;
pub mod message_interface;
pub mod model;
pub mod wire;
