// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use fvm_shared::clock::ChainEpoch;
use serde::Serialize;

/// One sector proven by a windowed proof submission.
///
/// Records are tagged with the epoch whose messages produced them, which is
/// the parent tipset's epoch, not the tipset in which the messages appear
/// executed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MinerSectorPost {
    pub height: ChainEpoch,
    pub miner_id: String,
    pub sector_id: u64,
    pub post_message_cid: String,
}

pub type MinerSectorPostList = Vec<MinerSectorPost>;
