// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::actors::Version;
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use fvm_ipld_hamt::{BytesKey, Hamt};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A version-dispatched HAMT.
///
/// The bit width and hash function used to open a map must exactly match the
/// ones used when the snapshot was written, or lookups silently miss. Both are
/// configuration of the owning state's version and are passed in by the state
/// adapters, never defaulted here.
pub enum Map<'bs, BS, V> {
    V8(Hamt<&'bs BS, V>),
    V9(Hamt<&'bs BS, V>),
}

impl<'bs, BS, V> Map<'bs, BS, V>
where
    BS: Blockstore,
    V: Serialize + DeserializeOwned + PartialEq,
{
    /// Creates an empty map for the given version.
    pub fn empty(store: &'bs BS, version: Version, bit_width: u32) -> Self {
        match version {
            Version::V8 => Map::V8(Hamt::new_with_bit_width(store, bit_width)),
            Version::V9 => Map::V9(Hamt::new_with_bit_width(store, bit_width)),
        }
    }

    /// Loads a map from its root.
    pub fn load(cid: &Cid, store: &'bs BS, version: Version, bit_width: u32) -> anyhow::Result<Self> {
        Ok(match version {
            Version::V8 => Map::V8(Hamt::load_with_bit_width(cid, store, bit_width)?),
            Version::V9 => Map::V9(Hamt::load_with_bit_width(cid, store, bit_width)?),
        })
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get(&self, key: &BytesKey) -> anyhow::Result<Option<&V>> {
        Ok(match self {
            Map::V8(m) => m.get(key)?,
            Map::V9(m) => m.get(key)?,
        })
    }

    /// Inserts a key-value pair into the map.
    pub fn set(&mut self, key: BytesKey, value: V) -> anyhow::Result<()> {
        match self {
            Map::V8(m) => m.set(key, value)?,
            Map::V9(m) => m.set(key, value)?,
        };
        Ok(())
    }

    /// Flushes any cached nodes and returns the root.
    pub fn flush(&mut self) -> anyhow::Result<Cid> {
        Ok(match self {
            Map::V8(m) => m.flush()?,
            Map::V9(m) => m.flush()?,
        })
    }

    /// Iterates over every key-value pair in the map's native order, exactly
    /// once each. An error from the callback aborts iteration and propagates.
    pub fn for_each<F>(&self, f: F) -> anyhow::Result<()>
    where
        F: FnMut(&BytesKey, &V) -> anyhow::Result<()>,
    {
        match self {
            Map::V8(m) => m.for_each(f)?,
            Map::V9(m) => m.for_each(f)?,
        }
        Ok(())
    }
}
