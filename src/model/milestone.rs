// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing milestone identifiers.

use derive_more::{Deref, From};
use serde::{Deserialize, Serialize};

use super::identifier::impl_id;

impl_id!(
    /// The BLAKE2b-256 hash of a milestone essence.
    pub struct MilestoneId([u8; 32]),
    "milestone id"
);

/// The index of a milestone, carried as a plain number.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Deref, From)]
#[serde(transparent)]
pub struct MilestoneIndex(pub u32);
