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

/// The number of proof windows in a proving period.
pub const WPOST_PERIOD_DEADLINES: u64 = 48;
/// The epochs in a full proving period.
pub const WPOST_PROVING_PERIOD: ChainEpoch = 2880;
/// The epochs each proof window stays open.
pub const WPOST_CHALLENGE_WINDOW: ChainEpoch = 60;
/// AMT branching width of partition arrays.
pub const PARTITIONS_AMT_BIT_WIDTH: u32 = 3;

#[derive(Clone, Debug, Serialize_tuple, Deserialize_tuple)]
pub struct State {
    /// CBOR-encoded [`MinerInfo`].
    pub info: Cid,
    pub pre_commit_deposits: TokenAmount,
    pub locked_funds: TokenAmount,
    pub initial_pledge: TokenAmount,
    pub fee_debt: TokenAmount,
    /// AMT of sector on-chain infos.
    pub sectors: Cid,
    /// The first epoch of this miner's current proving period.
    pub proving_period_start: ChainEpoch,
    /// The index of the deadline whose window was open at the last state
    /// transition. Trailing, see `deadline_info` on the adapter.
    pub current_deadline: u64,
    /// CBOR-encoded [`Deadlines`].
    pub deadlines: Cid,
    pub early_terminations: BitField,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize_tuple, Deserialize_tuple)]
pub struct MinerInfo {
    pub owner: Address,
    pub worker: Address,
    pub window_post_partition_sectors: u64,
    pub sector_size: SectorSize,
}

/// One CID per proof window of the proving period, always
/// [`WPOST_PERIOD_DEADLINES`] entries.
#[derive(Clone, Debug, Serialize_tuple, Deserialize_tuple)]
pub struct Deadlines {
    pub due: Vec<Cid>,
}

#[derive(Clone, Debug, Serialize_tuple, Deserialize_tuple)]
pub struct Deadline {
    /// AMT of [`Partition`]s, indexed from zero within the deadline.
    pub partitions: Cid,
    pub live_sectors: u64,
    pub total_sectors: u64,
}

#[derive(Clone, Debug, Serialize_tuple, Deserialize_tuple)]
pub struct Partition {
    /// All sector numbers ever assigned to this partition, terminated or not.
    pub sectors: BitField,
    pub faults: BitField,
    pub recoveries: BitField,
    pub terminated: BitField,
}

impl Partition {
    /// Sectors assigned to the partition and not yet terminated.
    pub fn live_sectors(&self) -> BitField {
        &self.sectors - &self.terminated
    }
}

#[derive(Clone, Debug, Serialize_tuple, Deserialize_tuple)]
pub struct PoStPartition {
    /// Partitions are numbered per-deadline, from zero.
    pub index: u64,
    /// Sectors skipped while proving that weren't already declared faulty.
    pub skipped: BitField,
}

/// Information submitted to prove one open proof window.
#[derive(Clone, Debug, Serialize_tuple, Deserialize_tuple)]
pub struct SubmitWindowedPoStParams {
    /// The deadline index which the submission targets.
    pub deadline: u64,
    /// The partitions being proven.
    pub partitions: Vec<PoStPartition>,
    pub proofs: Vec<PoStProof>,
    /// The epoch at which these proofs are committed to a particular chain.
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
}
