// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module that contains the protocol parameters and the storage deposit computation.

use crypto::hashes::{blake2b::Blake2b256, Digest};
use packable::PackableExt;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{output::Output, TokenAmount};
use crate::{error::EncodingError, model::output::OutputId};

/// Parameters relevant to byte cost calculations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct RentStructure {
    pub v_byte_cost: u32,
    pub v_byte_factor_data: u8,
    pub v_byte_factor_key: u8,
    /// Fields of newer protocol versions, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for RentStructure {
    fn default() -> Self {
        Self {
            v_byte_cost: 100,
            v_byte_factor_data: 1,
            v_byte_factor_key: 10,
            extra: Map::new(),
        }
    }
}

/// Bytes a node stores next to every output: its ID as key, plus the including block ID, the booked milestone index
/// and the milestone timestamp as data.
const KEY_BYTES: u64 = OutputId::LENGTH as u64;
const DATA_BYTES: u64 = 32 + 4 + 4;

impl RentStructure {
    /// The minimum amount of base tokens `output` must carry to cover its storage.
    pub fn rent_cost(&self, output: &Output) -> Result<u64, EncodingError> {
        output.verify()?;
        let len = output.packed_len() as u64;
        let factor_data = u64::from(self.v_byte_factor_data);
        let factor_key = u64::from(self.v_byte_factor_key);
        let weighted = len
            .checked_mul(factor_data)
            .and_then(|v| v.checked_add(KEY_BYTES * factor_key))
            .and_then(|v| v.checked_add(DATA_BYTES * factor_data))
            .ok_or(EncodingError::RentOverflow)?;
        weighted
            .checked_mul(u64::from(self.v_byte_cost))
            .ok_or(EncodingError::RentOverflow)
    }
}

/// Protocol parameters.
///
/// A snapshot is immutable once fetched; a new version has to be installed explicitly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct ProtocolParameters {
    pub version: u8,
    pub network_name: String,
    pub bech32_hrp: String,
    pub min_pow_score: u32,
    pub below_max_depth: u8,
    pub rent_structure: RentStructure,
    pub token_supply: TokenAmount,
    /// Fields of newer protocol versions, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ProtocolParameters {
    fn default() -> Self {
        Self {
            version: 2,
            network_name: "shimmer".to_owned(),
            bech32_hrp: "smr".to_owned(),
            min_pow_score: 1500,
            below_max_depth: 15,
            rent_structure: RentStructure::default(),
            token_supply: 1_813_620_509_061_365u64.into(),
            extra: Map::new(),
        }
    }
}

impl ProtocolParameters {
    /// The network ID: the first eight bytes of the BLAKE2b-256 hash of the network name, read as little-endian.
    pub fn network_id(&self) -> u64 {
        let hash: [u8; 32] = Blake2b256::digest(self.network_name.as_bytes()).into();
        let mut bytes = [0; 8];
        bytes.copy_from_slice(&hash[..8]);
        u64::from_le_bytes(bytes)
    }

    /// Checks that `amount` lies within `1..=token_supply`.
    pub fn verify_amount(&self, amount: &TokenAmount) -> Result<u64, EncodingError> {
        let not_in_supply = || EncodingError::AmountNotInSupply {
            amount: amount.to_string(),
            token_supply: self.token_supply.to_string(),
        };
        let value = amount.to_u64().map_err(|_| not_in_supply())?;
        let token_supply = self.token_supply.to_u64()?;
        if (1..=token_supply).contains(&value) {
            Ok(value)
        } else {
            Err(not_in_supply())
        }
    }
}
