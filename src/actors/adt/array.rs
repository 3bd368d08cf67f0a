// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::actors::Version;
use cid::Cid;
use fvm_ipld_amt::Amt;
use fvm_ipld_blockstore::Blockstore;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A version-dispatched AMT. Unlike HAMTs, the branching width is recorded in
/// the root node, so loading only needs the version tag.
pub enum Array<'bs, BS, V> {
    V8(Amt<V, &'bs BS>),
    V9(Amt<V, &'bs BS>),
}

impl<'bs, BS, V> Array<'bs, BS, V>
where
    BS: Blockstore,
    V: Serialize + DeserializeOwned,
{
    /// Creates an empty array for the given version.
    pub fn empty(store: &'bs BS, version: Version, bit_width: u32) -> Self {
        match version {
            Version::V8 => Array::V8(Amt::new_with_bit_width(store, bit_width)),
            Version::V9 => Array::V9(Amt::new_with_bit_width(store, bit_width)),
        }
    }

    /// Loads an array from its root.
    pub fn load(cid: &Cid, store: &'bs BS, version: Version) -> anyhow::Result<Self> {
        Ok(match version {
            Version::V8 => Array::V8(Amt::load(cid, store)?),
            Version::V9 => Array::V9(Amt::load(cid, store)?),
        })
    }

    /// Returns a reference to the value at the given index.
    pub fn get(&self, index: u64) -> anyhow::Result<Option<&V>> {
        Ok(match self {
            Array::V8(a) => a.get(index)?,
            Array::V9(a) => a.get(index)?,
        })
    }

    /// Sets the value at the given index.
    pub fn set(&mut self, index: u64, value: V) -> anyhow::Result<()> {
        match self {
            Array::V8(a) => a.set(index, value)?,
            Array::V9(a) => a.set(index, value)?,
        }
        Ok(())
    }

    /// Flushes any cached nodes and returns the root.
    pub fn flush(&mut self) -> anyhow::Result<Cid> {
        Ok(match self {
            Array::V8(a) => a.flush()?,
            Array::V9(a) => a.flush()?,
        })
    }

    /// Iterates over every stored value in index order. An error from the
    /// callback aborts iteration and propagates.
    pub fn for_each<F>(&self, f: F) -> anyhow::Result<()>
    where
        F: FnMut(u64, &V) -> anyhow::Result<()>,
    {
        match self {
            Array::V8(a) => a.for_each(f)?,
            Array::V9(a) => a.for_each(f)?,
        }
        Ok(())
    }
}
