// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Extraction tasks turn on-chain actor state into flat model records. Each
//! task reads through [`ActorStateAPI`], an injected view of the chain, so
//! the same extractor runs against a live node or a test fixture.

pub mod miner;

use std::sync::Arc;

use fvm_ipld_blockstore::Blockstore;
use fvm_shared::address::Address;

use crate::actors::ActorState;
use crate::blocks::{Tipset, TipsetKeys};
use crate::message::TipsetMessages;

/// The actor under extraction and where it sits on chain.
///
/// `current` is the tipset whose state root contains the actor's state;
/// `executed` is its parent, whose messages produced that state.
#[derive(Clone)]
pub struct ActorInfo {
    pub actor: ActorState,
    pub address: Address,
    pub current: Arc<Tipset>,
    pub executed: Arc<Tipset>,
}

/// Chain access an extractor needs. Implementations must answer every call
/// from the same immutable snapshot so one extraction sees one chain view.
pub trait ActorStateAPI {
    type Store: Blockstore;

    /// The blockstore holding state trees and actor substructures.
    fn store(&self) -> &Self::Store;

    /// Looks up an actor's header in the state tree of the given tipset.
    /// Returns `Ok(None)` when the actor does not exist there.
    fn actor(&self, address: &Address, key: &TipsetKeys) -> anyhow::Result<Option<ActorState>>;

    /// The messages executed while producing `current`'s state, which are the
    /// messages contained in `executed`, paired with their receipts.
    fn executed_and_block_messages(
        &self,
        current: &Tipset,
        executed: &Tipset,
    ) -> anyhow::Result<TipsetMessages>;
}

/// A single derived-fact extraction over one actor at one tipset.
pub trait Extractor {
    type Model;

    fn extract<API: ActorStateAPI>(a: &ActorInfo, node: &API) -> anyhow::Result<Self::Model>;
}
