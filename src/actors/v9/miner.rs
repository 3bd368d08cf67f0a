// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::bitfield::BitField;
use cid::Cid;
use fvm_ipld_encoding::tuple::*;
use fvm_shared::METHOD_CONSTRUCTOR;
use fvm_shared::address::Address;
use fvm_shared::clock::ChainEpoch;
use fvm_shared::econ::TokenAmount;
use fvm_shared::randomness::Randomness;
use fvm_shared::sector::{PoStProof, SectorSize};
use num_derive::FromPrimitive;

pub const WPOST_PERIOD_DEADLINES: u64 = 48;
pub const WPOST_PROVING_PERIOD: ChainEpoch = 2880;
pub const WPOST_CHALLENGE_WINDOW: ChainEpoch = 60;
pub const PARTITIONS_AMT_BIT_WIDTH: u32 = 3;

#[derive(Clone, Debug, Serialize_tuple, Deserialize_tuple)]
pub struct State {
    pub info: Cid,
    pub pre_commit_deposits: TokenAmount,
    pub locked_funds: TokenAmount,
    pub initial_pledge: TokenAmount,
    pub fee_debt: TokenAmount,
    pub sectors: Cid,
    pub proving_period_start: ChainEpoch,
    pub current_deadline: u64,
    pub deadlines: Cid,
    pub early_terminations: BitField,
    /// Whether the deadline cron is registered. Added at this version so
    /// miners with no sectors stop paying for cron ticks.
    pub deadline_cron_active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize_tuple, Deserialize_tuple)]
pub struct MinerInfo {
    pub owner: Address,
    pub worker: Address,
    pub window_post_partition_sectors: u64,
    pub sector_size: SectorSize,
}

#[derive(Clone, Debug, Serialize_tuple, Deserialize_tuple)]
pub struct Deadlines {
    pub due: Vec<Cid>,
}

#[derive(Clone, Debug, Serialize_tuple, Deserialize_tuple)]
pub struct Deadline {
    pub partitions: Cid,
    pub live_sectors: u64,
    pub total_sectors: u64,
    /// Partitions with a proof accepted in the current proving period.
    pub partitions_posted: BitField,
}

#[derive(Clone, Debug, Serialize_tuple, Deserialize_tuple)]
pub struct Partition {
    pub sectors: BitField,
    /// Sectors with failed sync, excluded from proving requirements. New at
    /// this version.
    pub unproven: BitField,
    pub faults: BitField,
    pub recoveries: BitField,
    pub terminated: BitField,
}

impl Partition {
    pub fn live_sectors(&self) -> BitField {
        &self.sectors - &self.terminated
    }
}

#[derive(Clone, Debug, Serialize_tuple, Deserialize_tuple)]
pub struct PoStPartition {
    pub index: u64,
    pub skipped: BitField,
}

#[derive(Clone, Debug, Serialize_tuple, Deserialize_tuple)]
pub struct SubmitWindowedPoStParams {
    pub deadline: u64,
    pub partitions: Vec<PoStPartition>,
    pub proofs: Vec<PoStProof>,
    pub chain_commit_epoch: ChainEpoch,
    pub chain_commit_rand: Randomness,
}

/// Storage miner actor methods at this version.
#[derive(FromPrimitive)]
#[repr(u64)]
pub enum Method {
    Constructor = METHOD_CONSTRUCTOR,
    ControlAddresses = 2,
    ChangeWorkerAddress = 3,
    ChangePeerID = 4,
    SubmitWindowedPoSt = 5,
    PreCommitSector = 6,
    ProveCommitSector = 7,
    ExtendSectorExpiration = 8,
    TerminateSectors = 9,
    DeclareFaults = 10,
    DeclareFaultsRecovered = 11,
    OnDeferredCronEvent = 12,
    CheckSectorProven = 13,
    ApplyRewards = 14,
    ReportConsensusFault = 15,
    WithdrawBalance = 16,
    ConfirmSectorProofsValid = 17,
    ChangeMultiaddrs = 18,
    CompactPartitions = 19,
    CompactSectorNumbers = 20,
    ConfirmUpdateWorkerKey = 21,
    RepayDebt = 22,
    ChangeOwnerAddress = 23,
    DisputeWindowedPoSt = 24,
    PreCommitSectorBatch = 25,
    ProveCommitAggregate = 26,
    ProveReplicaUpdates = 27,
    PreCommitSectorBatch2 = 28,
    ProveReplicaUpdates2 = 29,
    ChangeBeneficiary = 30,
    GetBeneficiary = 31,
    ExtendSectorExpiration2 = 32,
}
