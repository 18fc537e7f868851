// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::{collections::HashMap, convert::Infallible, hash::Hash};

use packable::PackableExt;
use parking_lot::RwLock;
use tracing::trace;

use super::{derive_alias_id, derive_foundry_id, derive_nft_id};
use crate::{
    error::{Error, InvalidInputError},
    model::output::{Address, AliasId, FoundryId, NftId, OutputId},
};

/// The canonical input of a foundry derivation: the packed address, the 32-bit serial number and the scheme kind.
type FoundryKey = [u8; FoundryId::LENGTH];

/// A map that holds at most `capacity` entries. Once full, an arbitrary entry makes room for the next.
#[derive(Debug)]
struct BoundedMap<K, V> {
    what: &'static str,
    capacity: usize,
    entries: RwLock<HashMap<K, V>>,
}

impl<K: Eq + Hash + Clone, V: Copy> BoundedMap<K, V> {
    fn new(what: &'static str, capacity: usize) -> Self {
        Self {
            what,
            capacity,
            entries: RwLock::new(HashMap::with_capacity(capacity.min(DerivationCache::DEFAULT_CAPACITY))),
        }
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }

    fn get_or_insert_with(&self, key: K, derive: impl FnOnce() -> V) -> V {
        match self.get_or_try_insert_with(key, || Ok::<_, Infallible>(derive())) {
            Ok(value) => value,
            Err(e) => match e {},
        }
    }

    fn get_or_try_insert_with<E>(&self, key: K, derive: impl FnOnce() -> Result<V, E>) -> Result<V, E> {
        if let Some(value) = self.entries.read().get(&key) {
            trace!("derivation cache hit for {}", self.what);
            return Ok(*value);
        }
        let value = derive()?;
        if self.capacity > 0 {
            let mut entries = self.entries.write();
            if entries.len() >= self.capacity && !entries.contains_key(&key) {
                if let Some(evicted) = entries.keys().next().cloned() {
                    entries.remove(&evicted);
                }
            }
            entries.insert(key, value);
        }
        Ok(value)
    }
}

/// A process-wide cache of derived identifiers.
///
/// Entries are keyed by the canonical derivation input, separately per derivation, and each derivation keeps at most
/// `capacity` identifiers. Lookups only take a read lock, so concurrent readers never wait for each other.
#[derive(Debug)]
pub struct DerivationCache {
    alias_ids: BoundedMap<OutputId, AliasId>,
    nft_ids: BoundedMap<OutputId, NftId>,
    foundry_ids: BoundedMap<FoundryKey, FoundryId>,
}

impl Default for DerivationCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl DerivationCache {
    /// The capacity used by [`DerivationCache::default`].
    pub const DEFAULT_CAPACITY: usize = 4096;

    /// Creates a cache holding at most `capacity` identifiers per derivation. A capacity of zero disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            alias_ids: BoundedMap::new("alias id", capacity),
            nft_ids: BoundedMap::new("nft id", capacity),
            foundry_ids: BoundedMap::new("foundry id", capacity),
        }
    }

    /// The number of cached identifiers.
    pub fn len(&self) -> usize {
        self.alias_ids.len() + self.nft_ids.len() + self.foundry_ids.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Derives the alias ID for `output_id`, consulting the cache first.
    pub fn alias_id(&self, output_id: &OutputId) -> AliasId {
        self.alias_ids.get_or_insert_with(*output_id, || derive_alias_id(output_id))
    }

    /// Derives the NFT ID for `output_id`, consulting the cache first.
    pub fn nft_id(&self, output_id: &OutputId) -> NftId {
        self.nft_ids.get_or_insert_with(*output_id, || derive_nft_id(output_id))
    }

    /// Derives a foundry ID, consulting the cache first. Failed derivations are not cached.
    pub fn foundry_id(
        &self,
        alias_address: &Address,
        serial_number: u64,
        token_scheme_kind: u8,
    ) -> Result<FoundryId, Error> {
        let narrowed =
            u32::try_from(serial_number).map_err(|_| InvalidInputError::SerialNumberOutOfRange(serial_number))?;
        let mut key = [0; FoundryId::LENGTH];
        key[..33].copy_from_slice(&alias_address.pack_to_vec());
        key[33..37].copy_from_slice(&narrowed.to_le_bytes());
        key[37] = token_scheme_kind;
        Ok(self.foundry_ids.get_or_try_insert_with(key, || {
            derive_foundry_id(alias_address, serial_number, token_scheme_kind)
        })?)
    }
}
