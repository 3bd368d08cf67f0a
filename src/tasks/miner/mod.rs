// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod post;

pub use post::PoStExtractor;

use std::sync::Arc;

use anyhow::Context as _;
use thiserror::Error;

use crate::actors::builtin::miner;
use crate::blocks::Tipset;
use crate::tasks::{ActorInfo, ActorStateAPI};

/// The extractor asked for the previous state of a miner that has none,
/// either because the current tipset is genesis or because the miner was
/// created in it.
#[derive(Debug, Error)]
#[error("miner has no previous state")]
pub struct NoPreviousState;

/// Current and previous miner state, loaded once and shared by the miner
/// extractors. The previous pair is absent at genesis and for miners created
/// in the current tipset.
pub struct MinerStateExtractionContext {
    prev_state: Option<miner::State>,
    prev_ts: Option<Arc<Tipset>>,
    pub curr_state: miner::State,
    pub curr_ts: Arc<Tipset>,
}

impl MinerStateExtractionContext {
    pub fn new<API: ActorStateAPI>(a: &ActorInfo, node: &API) -> anyhow::Result<Self> {
        let curr_state = miner::State::load(node.store(), &a.actor.code, &a.actor.state)
            .context("loading current miner state")?;

        let mut prev_state = None;
        let mut prev_ts = None;
        if a.current.epoch() != 0 {
            if let Some(prev_actor) = node
                .actor(&a.address, a.executed.key())
                .context("loading previous miner actor")?
            {
                prev_state = Some(
                    miner::State::load(node.store(), &prev_actor.code, &prev_actor.state)
                        .context("loading previous miner state")?,
                );
                prev_ts = Some(a.executed.clone());
            }
        }

        Ok(Self {
            prev_state,
            prev_ts,
            curr_state,
            curr_ts: a.current.clone(),
        })
    }

    pub fn has_previous_state(&self) -> bool {
        self.prev_state.is_some()
    }

    /// The previous state and the tipset it was read at.
    pub fn previous(&self) -> Result<(&miner::State, &Arc<Tipset>), NoPreviousState> {
        match (&self.prev_state, &self.prev_ts) {
            (Some(state), Some(ts)) => Ok((state, ts)),
            _ => Err(NoPreviousState),
        }
    }
}
