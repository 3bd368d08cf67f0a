// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use ahash::HashMap;
use anyhow::Context as _;
use fvm_ipld_blockstore::Blockstore;
use fvm_shared::clock::ChainEpoch;
use tracing::debug;

use crate::actors::builtin::miner::{self, submit_windowed_post_method};
use crate::model::miner::{MinerSectorPost, MinerSectorPostList};
use crate::tasks::miner::MinerStateExtractionContext;
use crate::tasks::{ActorInfo, ActorStateAPI, Extractor};

/// Extracts the sectors proven by each windowed proof submitted to a miner.
///
/// Works over parent messages: the submissions live in the executed tipset
/// and were applied to the state as of that tipset, so partitions are read
/// from the previous state at the previous height and records carry the
/// previous height.
pub struct PoStExtractor;

impl Extractor for PoStExtractor {
    type Model = MinerSectorPostList;

    fn extract<API: ActorStateAPI>(a: &ActorInfo, node: &API) -> anyhow::Result<Self::Model> {
        debug!(extractor = "PoStExtractor", address = %a.address, epoch = a.current.epoch(), "extract");

        let ec = MinerStateExtractionContext::new(a, node)
            .context("creating miner state extraction context")?;

        // No submissions can precede the miner's first state.
        if !ec.has_previous_state() {
            return Ok(Vec::new());
        }
        let (prev_state, prev_ts) = ec.previous()?;
        let method = submit_windowed_post_method(prev_state.actor_version());

        let messages = node
            .executed_and_block_messages(&a.current, &a.executed)
            .context("getting executed and block messages")?;

        // Decode first. A failed submission changed no state and is skipped
        // without decoding; a submission that cannot be decoded poisons the
        // whole extraction, since silently dropping it would under-report.
        let mut submissions = Vec::new();
        for msg in &messages.executed {
            if msg.message.to != a.address || msg.message.method_num != method {
                continue;
            }
            if !msg.succeeded() {
                continue;
            }
            let proven = prev_state
                .decode_submit_windowed_post(&msg.message.params)
                .with_context(|| format!("bad windowed post params in message {}", msg.cid))?;
            submissions.push((msg, proven));
        }
        if submissions.is_empty() {
            return Ok(Vec::new());
        }

        // All surviving submissions target the window that was open at the
        // previous height, so one partition map serves them all.
        let partitions = load_partitions(prev_state, prev_ts.epoch(), node.store())?;

        let miner_id = a.address.to_string();
        let mut posts = Vec::new();
        for (msg, proven) in submissions {
            for post in proven {
                let partition = partitions
                    .get(&post.index)
                    .with_context(|| format!("no partition {} in open deadline", post.index))?;
                let proven_sectors = partition.all_sectors() - &post.skipped;
                for sector_id in proven_sectors.iter() {
                    posts.push(MinerSectorPost {
                        height: prev_ts.epoch(),
                        miner_id: miner_id.clone(),
                        sector_id,
                        post_message_cid: msg.cid.to_string(),
                    });
                }
            }
        }
        Ok(posts)
    }
}

/// Reads every partition of the deadline open at `epoch` from `state`.
fn load_partitions<BS: Blockstore>(
    state: &miner::State,
    epoch: ChainEpoch,
    store: &BS,
) -> anyhow::Result<HashMap<u64, miner::Partition>> {
    let info = state.deadline_info(epoch);
    let deadline = state
        .load_deadline(store, info.index)
        .context("loading open deadline")?;
    let mut partitions = HashMap::default();
    deadline.for_each_partition(store, |index, partition| {
        partitions.insert(index, partition);
        Ok(())
    })?;
    Ok(partitions)
}
