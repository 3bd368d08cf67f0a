// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod deadline;

pub use deadline::{DeadlineInfo, FAULT_DECLARATION_CUTOFF, WPOST_CHALLENGE_LOOKBACK};

use anyhow::Context as _;
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use fvm_ipld_encoding::{CborStore, RawBytes, from_slice};
use fvm_shared::MethodNum;
use fvm_shared::address::Address;
use fvm_shared::clock::ChainEpoch;
use fvm_shared::econ::TokenAmount;
use fvm_shared::sector::SectorSize;
use multihash_codetable::Code;
use num_traits::Zero as _;

use crate::actors::adt;
use crate::actors::{MINER_KEY, UnknownCodeError, Version, actor_code_id, code_info, v8, v9};
use crate::bitfield::BitField;

/// Version-independent view of a storage miner's state.
pub enum State {
    V8(v8::miner::State),
    V9(v9::miner::State),
}

/// Static configuration of a miner, identical across supported versions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MinerInfo {
    pub owner: Address,
    pub worker: Address,
    pub window_post_partition_sectors: u64,
    pub sector_size: SectorSize,
}

impl From<v8::miner::MinerInfo> for MinerInfo {
    fn from(info: v8::miner::MinerInfo) -> Self {
        Self {
            owner: info.owner,
            worker: info.worker,
            window_post_partition_sectors: info.window_post_partition_sectors,
            sector_size: info.sector_size,
        }
    }
}

impl From<v9::miner::MinerInfo> for MinerInfo {
    fn from(info: v9::miner::MinerInfo) -> Self {
        Self {
            owner: info.owner,
            worker: info.worker,
            window_post_partition_sectors: info.window_post_partition_sectors,
            sector_size: info.sector_size,
        }
    }
}

/// One proven partition of a windowed-proof submission, reduced to the
/// fields shared by every version's parameter layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoStPartition {
    pub index: u64,
    pub skipped: BitField,
}

/// The method number of `SubmitWindowedPoSt` at the given version. Method
/// tables are per-version; callers must never hard-code the number.
pub fn submit_windowed_post_method(version: Version) -> MethodNum {
    match version {
        Version::V8 => v8::miner::Method::SubmitWindowedPoSt as MethodNum,
        Version::V9 => v9::miner::Method::SubmitWindowedPoSt as MethodNum,
    }
}

impl State {
    /// Loads the adapter from an actor's code and state root, dispatching on
    /// the code CID. Rejects codes that belong to other actor families.
    pub fn load<BS: Blockstore>(store: &BS, code: &Cid, state: &Cid) -> anyhow::Result<Self> {
        match code_info(code) {
            Some((Version::V8, MINER_KEY)) => Ok(State::V8(
                store
                    .get_cbor(state)?
                    .context("miner actor state not found")?,
            )),
            Some((Version::V9, MINER_KEY)) => Ok(State::V9(
                store
                    .get_cbor(state)?
                    .context("miner actor state not found")?,
            )),
            _ => anyhow::bail!("unknown miner actor code {code}"),
        }
    }

    /// Builds a miner with no sectors and a full complement of empty
    /// deadlines, everything already flushed to the store.
    pub fn construct<BS: Blockstore>(
        store: &BS,
        version: Version,
        info: MinerInfo,
        proving_period_start: ChainEpoch,
    ) -> anyhow::Result<Self> {
        match version {
            Version::V8 => {
                let mut partitions = adt::Array::<BS, v8::miner::Partition>::empty(
                    store,
                    version,
                    v8::miner::PARTITIONS_AMT_BIT_WIDTH,
                );
                let empty_partitions = partitions.flush()?;
                let empty_deadline = store.put_cbor(
                    &v8::miner::Deadline {
                        partitions: empty_partitions,
                        live_sectors: 0,
                        total_sectors: 0,
                    },
                    Code::Blake2b256,
                )?;
                let deadlines = store.put_cbor(
                    &v8::miner::Deadlines {
                        due: vec![empty_deadline; v8::miner::WPOST_PERIOD_DEADLINES as usize],
                    },
                    Code::Blake2b256,
                )?;
                let info = store.put_cbor(
                    &v8::miner::MinerInfo {
                        owner: info.owner,
                        worker: info.worker,
                        window_post_partition_sectors: info.window_post_partition_sectors,
                        sector_size: info.sector_size,
                    },
                    Code::Blake2b256,
                )?;
                Ok(State::V8(v8::miner::State {
                    info,
                    pre_commit_deposits: TokenAmount::zero(),
                    locked_funds: TokenAmount::zero(),
                    initial_pledge: TokenAmount::zero(),
                    fee_debt: TokenAmount::zero(),
                    sectors: empty_partitions,
                    proving_period_start,
                    current_deadline: 0,
                    deadlines,
                    early_terminations: BitField::new(),
                }))
            }
            Version::V9 => {
                let mut partitions = adt::Array::<BS, v9::miner::Partition>::empty(
                    store,
                    version,
                    v9::miner::PARTITIONS_AMT_BIT_WIDTH,
                );
                let empty_partitions = partitions.flush()?;
                let empty_deadline = store.put_cbor(
                    &v9::miner::Deadline {
                        partitions: empty_partitions,
                        live_sectors: 0,
                        total_sectors: 0,
                        partitions_posted: BitField::new(),
                    },
                    Code::Blake2b256,
                )?;
                let deadlines = store.put_cbor(
                    &v9::miner::Deadlines {
                        due: vec![empty_deadline; v9::miner::WPOST_PERIOD_DEADLINES as usize],
                    },
                    Code::Blake2b256,
                )?;
                let info = store.put_cbor(
                    &v9::miner::MinerInfo {
                        owner: info.owner,
                        worker: info.worker,
                        window_post_partition_sectors: info.window_post_partition_sectors,
                        sector_size: info.sector_size,
                    },
                    Code::Blake2b256,
                )?;
                Ok(State::V9(v9::miner::State {
                    info,
                    pre_commit_deposits: TokenAmount::zero(),
                    locked_funds: TokenAmount::zero(),
                    initial_pledge: TokenAmount::zero(),
                    fee_debt: TokenAmount::zero(),
                    sectors: empty_partitions,
                    proving_period_start,
                    current_deadline: 0,
                    deadlines,
                    early_terminations: BitField::new(),
                    deadline_cron_active: false,
                }))
            }
        }
    }

    /// Writes the raw state to the store and returns its root.
    pub fn save<BS: Blockstore>(&self, store: &BS) -> anyhow::Result<Cid> {
        Ok(match self {
            State::V8(st) => store.put_cbor(st, Code::Blake2b256)?,
            State::V9(st) => store.put_cbor(st, Code::Blake2b256)?,
        })
    }

    pub fn actor_key(&self) -> &'static str {
        MINER_KEY
    }

    pub fn actor_version(&self) -> Version {
        match self {
            State::V8(_) => Version::V8,
            State::V9(_) => Version::V9,
        }
    }

    /// The canonical code CID of this state's (type, version) pair.
    pub fn code(&self) -> Result<Cid, UnknownCodeError> {
        actor_code_id(self.actor_version(), MINER_KEY)
    }

    /// Loads the static miner configuration.
    pub fn info<BS: Blockstore>(&self, store: &BS) -> anyhow::Result<MinerInfo> {
        Ok(match self {
            State::V8(st) => store
                .get_cbor::<v8::miner::MinerInfo>(&st.info)?
                .context("miner info not found")?
                .into(),
            State::V9(st) => store
                .get_cbor::<v9::miner::MinerInfo>(&st.info)?
                .context("miner info not found")?
                .into(),
        })
    }

    /// The deadline whose proof window is open (or next to open) at `epoch`,
    /// per this state's recorded proving period.
    pub fn deadline_info(&self, epoch: ChainEpoch) -> DeadlineInfo {
        match self {
            State::V8(st) => DeadlineInfo::new(
                st.proving_period_start,
                st.current_deadline,
                epoch,
                v8::miner::WPOST_PERIOD_DEADLINES,
                v8::miner::WPOST_PROVING_PERIOD,
                v8::miner::WPOST_CHALLENGE_WINDOW,
            ),
            State::V9(st) => DeadlineInfo::new(
                st.proving_period_start,
                st.current_deadline,
                epoch,
                v9::miner::WPOST_PERIOD_DEADLINES,
                v9::miner::WPOST_PROVING_PERIOD,
                v9::miner::WPOST_CHALLENGE_WINDOW,
            ),
        }
        .next_not_elapsed()
    }

    /// Loads one deadline of the proving period by index.
    pub fn load_deadline<BS: Blockstore>(
        &self,
        store: &BS,
        index: u64,
    ) -> anyhow::Result<Deadline> {
        match self {
            State::V8(st) => {
                let deadlines: v8::miner::Deadlines = store
                    .get_cbor(&st.deadlines)?
                    .context("miner deadlines not found")?;
                let due = deadlines
                    .due
                    .get(index as usize)
                    .with_context(|| format!("no deadline at index {index}"))?;
                Ok(Deadline::V8(
                    store.get_cbor(due)?.context("deadline not found")?,
                ))
            }
            State::V9(st) => {
                let deadlines: v9::miner::Deadlines = store
                    .get_cbor(&st.deadlines)?
                    .context("miner deadlines not found")?;
                let due = deadlines
                    .due
                    .get(index as usize)
                    .with_context(|| format!("no deadline at index {index}"))?;
                Ok(Deadline::V9(
                    store.get_cbor(due)?.context("deadline not found")?,
                ))
            }
        }
    }

    /// Decodes `SubmitWindowedPoSt` parameters with this version's layout and
    /// reduces them to the proven partitions. Malformed parameters are an
    /// error; a transform reading them cannot guess at intent.
    pub fn decode_submit_windowed_post(
        &self,
        params: &RawBytes,
    ) -> anyhow::Result<Vec<PoStPartition>> {
        match self {
            State::V8(_) => {
                let params: v8::miner::SubmitWindowedPoStParams =
                    from_slice(params).context("decoding windowed post params")?;
                Ok(params
                    .partitions
                    .into_iter()
                    .map(|p| PoStPartition {
                        index: p.index,
                        skipped: p.skipped,
                    })
                    .collect())
            }
            State::V9(_) => {
                let params: v9::miner::SubmitWindowedPoStParams =
                    from_slice(params).context("decoding windowed post params")?;
                Ok(params
                    .partitions
                    .into_iter()
                    .map(|p| PoStPartition {
                        index: p.index,
                        skipped: p.skipped,
                    })
                    .collect())
            }
        }
    }
}

/// One deadline of the proving period.
pub enum Deadline {
    V8(v8::miner::Deadline),
    V9(v9::miner::Deadline),
}

impl Deadline {
    /// Visits each partition of the deadline in index order, exactly once.
    pub fn for_each_partition<BS, F>(&self, store: &BS, mut f: F) -> anyhow::Result<()>
    where
        BS: Blockstore,
        F: FnMut(u64, Partition) -> anyhow::Result<()>,
    {
        match self {
            Deadline::V8(dl) => {
                let partitions = adt::Array::<BS, v8::miner::Partition>::load(
                    &dl.partitions,
                    store,
                    Version::V8,
                )?;
                partitions.for_each(|index, partition| f(index, Partition::V8(partition.clone())))
            }
            Deadline::V9(dl) => {
                let partitions = adt::Array::<BS, v9::miner::Partition>::load(
                    &dl.partitions,
                    store,
                    Version::V9,
                )?;
                partitions.for_each(|index, partition| f(index, Partition::V9(partition.clone())))
            }
        }
    }
}

/// One partition of sectors within a deadline.
pub enum Partition {
    V8(v8::miner::Partition),
    V9(v9::miner::Partition),
}

impl Partition {
    /// All sector numbers ever assigned to the partition.
    pub fn all_sectors(&self) -> &BitField {
        match self {
            Partition::V8(p) => &p.sectors,
            Partition::V9(p) => &p.sectors,
        }
    }

    /// Live sectors currently declared faulty.
    pub fn faulty_sectors(&self) -> BitField {
        let faults = match self {
            Partition::V8(p) => &p.faults,
            Partition::V9(p) => &p.faults,
        };
        faults & &self.live_sectors()
    }

    /// Faulty sectors declared recovered but not yet proven.
    pub fn recovering_sectors(&self) -> &BitField {
        match self {
            Partition::V8(p) => &p.recoveries,
            Partition::V9(p) => &p.recoveries,
        }
    }

    /// Sectors assigned and not yet terminated.
    pub fn live_sectors(&self) -> BitField {
        match self {
            Partition::V8(p) => p.live_sectors(),
            Partition::V9(p) => p.live_sectors(),
        }
    }
}
