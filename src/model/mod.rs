// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module that contains the Stardust types.

mod amount;
pub(crate) mod identifier;
mod milestone;
pub mod output;
pub(crate) mod packing;
mod protocol;
pub(crate) mod util;

pub use self::{
    amount::TokenAmount,
    identifier::TransactionId,
    milestone::{MilestoneId, MilestoneIndex},
    packing::unpack_exact,
    protocol::{ProtocolParameters, RentStructure},
};
