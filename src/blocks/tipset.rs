// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::fmt;

use cid::Cid;
use fvm_shared::clock::ChainEpoch;
use serde::{Deserialize, Serialize};

/// A set of block CIDs forming the unique identity of a tipset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TipsetKeys {
    pub cids: Vec<Cid>,
}

impl TipsetKeys {
    pub fn new(cids: Vec<Cid>) -> Self {
        Self { cids }
    }
}

impl fmt::Display for TipsetKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cids: Vec<_> = self.cids.iter().map(Cid::to_string).collect();
        write!(f, "{{{}}}", cids.join(", "))
    }
}

/// A finalized group of blocks at one chain height, treated as a single
/// consistent point in chain history. Only the identity and height are carried
/// here; block contents belong to the chain-walking collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tipset {
    key: TipsetKeys,
    epoch: ChainEpoch,
}

impl Tipset {
    pub fn new(key: TipsetKeys, epoch: ChainEpoch) -> Self {
        Self { key, epoch }
    }

    /// Returns the tipset's key.
    pub fn key(&self) -> &TipsetKeys {
        &self.key
    }

    /// Returns the tipset's chain height.
    pub fn epoch(&self) -> ChainEpoch {
        self.epoch
    }
}
