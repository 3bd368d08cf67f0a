// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! End-to-end extraction of windowed-proof records from a fixture chain view.

use std::cell::Cell;
use std::sync::Arc;

use ahash::HashMap;
use aster::actors::builtin::miner;
use aster::actors::{ActorState, MINER_KEY, Version, actor_code_id, adt, v8, v9};
use aster::bitfield::BitField;
use aster::blocks::{Tipset, TipsetKeys};
use aster::message::{ExecutedMessage, TipsetMessages};
use aster::model::miner::MinerSectorPost;
use aster::tasks::miner::PoStExtractor;
use aster::tasks::{ActorInfo, ActorStateAPI, Extractor};
use cid::Cid;
use cid::multihash::Multihash;
use fvm_ipld_blockstore::MemoryBlockstore;
use fvm_ipld_encoding::{CborStore, RawBytes, to_vec};
use fvm_shared::address::Address;
use fvm_shared::clock::ChainEpoch;
use fvm_shared::econ::TokenAmount;
use fvm_shared::error::ExitCode;
use fvm_shared::message::Message;
use fvm_shared::randomness::Randomness;
use fvm_shared::receipt::Receipt;
use fvm_shared::sector::SectorSize;
use multihash_codetable::Code;
use num_traits::Zero as _;

const MINER_ID: u64 = 1000;
const PREV_EPOCH: ChainEpoch = 100;

struct TestNode {
    store: MemoryBlockstore,
    actors: HashMap<(Address, TipsetKeys), ActorState>,
    messages: TipsetMessages,
    message_fetches: Cell<u32>,
}

impl ActorStateAPI for TestNode {
    type Store = MemoryBlockstore;

    fn store(&self) -> &MemoryBlockstore {
        &self.store
    }

    fn actor(
        &self,
        address: &Address,
        key: &TipsetKeys,
    ) -> anyhow::Result<Option<ActorState>> {
        Ok(self.actors.get(&(*address, key.clone())).cloned())
    }

    fn executed_and_block_messages(
        &self,
        _current: &Tipset,
        _executed: &Tipset,
    ) -> anyhow::Result<TipsetMessages> {
        self.message_fetches.set(self.message_fetches.get() + 1);
        Ok(self.messages.clone())
    }
}

fn tipset(epoch: ChainEpoch, tag: u64) -> Arc<Tipset> {
    let mh = Multihash::wrap(0, &tag.to_be_bytes()).unwrap();
    let cid = Cid::new_v1(0x55, mh);
    Arc::new(Tipset::new(TipsetKeys::new(vec![cid]), epoch))
}

fn miner_info() -> miner::MinerInfo {
    miner::MinerInfo {
        owner: Address::new_id(MINER_ID + 1),
        worker: Address::new_id(MINER_ID + 2),
        window_post_partition_sectors: 2349,
        sector_size: SectorSize::_32GiB,
    }
}

/// Builds a miner whose deadline open at [`PREV_EPOCH`] holds one partition
/// of the given sectors, returning its state root and the proven deadline's
/// index.
fn miner_with_partition(
    store: &MemoryBlockstore,
    version: Version,
    sectors: &BitField,
) -> (Cid, u64) {
    let state = miner::State::construct(store, version, miner_info(), 0).unwrap();
    let open = state.deadline_info(PREV_EPOCH);
    let root = match state {
        miner::State::V8(mut st) => {
            let mut partitions = adt::Array::<_, v8::miner::Partition>::empty(
                store,
                Version::V8,
                v8::miner::PARTITIONS_AMT_BIT_WIDTH,
            );
            partitions
                .set(
                    0,
                    v8::miner::Partition {
                        sectors: sectors.clone(),
                        faults: BitField::new(),
                        recoveries: BitField::new(),
                        terminated: BitField::new(),
                    },
                )
                .unwrap();
            let deadline = store
                .put_cbor(
                    &v8::miner::Deadline {
                        partitions: partitions.flush().unwrap(),
                        live_sectors: sectors.len(),
                        total_sectors: sectors.len(),
                    },
                    Code::Blake2b256,
                )
                .unwrap();
            let mut deadlines: v8::miner::Deadlines =
                store.get_cbor(&st.deadlines).unwrap().unwrap();
            deadlines.due[open.index as usize] = deadline;
            st.deadlines = store.put_cbor(&deadlines, Code::Blake2b256).unwrap();
            store.put_cbor(&st, Code::Blake2b256).unwrap()
        }
        miner::State::V9(mut st) => {
            let mut partitions = adt::Array::<_, v9::miner::Partition>::empty(
                store,
                Version::V9,
                v9::miner::PARTITIONS_AMT_BIT_WIDTH,
            );
            partitions
                .set(
                    0,
                    v9::miner::Partition {
                        sectors: sectors.clone(),
                        unproven: BitField::new(),
                        faults: BitField::new(),
                        recoveries: BitField::new(),
                        terminated: BitField::new(),
                    },
                )
                .unwrap();
            let deadline = store
                .put_cbor(
                    &v9::miner::Deadline {
                        partitions: partitions.flush().unwrap(),
                        live_sectors: sectors.len(),
                        total_sectors: sectors.len(),
                        partitions_posted: BitField::new(),
                    },
                    Code::Blake2b256,
                )
                .unwrap();
            let mut deadlines: v9::miner::Deadlines =
                store.get_cbor(&st.deadlines).unwrap().unwrap();
            deadlines.due[open.index as usize] = deadline;
            st.deadlines = store.put_cbor(&deadlines, Code::Blake2b256).unwrap();
            store.put_cbor(&st, Code::Blake2b256).unwrap()
        }
    };
    (root, open.index)
}

fn post_params(version: Version, deadline: u64, skipped: BitField) -> RawBytes {
    let bytes = match version {
        Version::V8 => to_vec(&v8::miner::SubmitWindowedPoStParams {
            deadline,
            partitions: vec![v8::miner::PoStPartition { index: 0, skipped }],
            proofs: Vec::new(),
            chain_commit_epoch: PREV_EPOCH - 10,
            chain_commit_rand: Randomness(vec![7; 32]),
        })
        .unwrap(),
        Version::V9 => to_vec(&v9::miner::SubmitWindowedPoStParams {
            deadline,
            partitions: vec![v9::miner::PoStPartition { index: 0, skipped }],
            proofs: Vec::new(),
            chain_commit_epoch: PREV_EPOCH - 10,
            chain_commit_rand: Randomness(vec![7; 32]),
        })
        .unwrap(),
    };
    RawBytes::new(bytes)
}

fn post_message(version: Version, tag: u64, params: RawBytes, exit_code: ExitCode) -> ExecutedMessage {
    let mh = Multihash::wrap(0, &(0x4d00 + tag).to_be_bytes()).unwrap();
    ExecutedMessage {
        cid: Cid::new_v1(0x71, mh),
        message: Message {
            version: 0,
            from: Address::new_id(MINER_ID + 2),
            to: Address::new_id(MINER_ID),
            sequence: tag,
            value: TokenAmount::zero(),
            method_num: miner::submit_windowed_post_method(version),
            params,
            gas_limit: 1 << 30,
            gas_fee_cap: TokenAmount::zero(),
            gas_premium: TokenAmount::zero(),
        },
        receipt: Receipt {
            exit_code,
            return_data: RawBytes::default(),
            gas_used: 0,
            events_root: None,
        },
    }
}

/// A node with the same miner state at both tipsets and the given messages
/// attributed to the current tipset.
fn setup(version: Version, sectors: &BitField) -> (TestNode, ActorInfo, u64) {
    let store = MemoryBlockstore::new();
    let (state_root, open_index) = miner_with_partition(&store, version, sectors);
    let code = actor_code_id(version, MINER_KEY).unwrap();
    let actor = ActorState::new(code, state_root, 0, TokenAmount::zero());

    let executed = tipset(PREV_EPOCH, 1);
    let current = tipset(PREV_EPOCH + 1, 2);

    let mut actors = HashMap::default();
    actors.insert(
        (Address::new_id(MINER_ID), executed.key().clone()),
        actor.clone(),
    );

    let node = TestNode {
        store,
        actors,
        messages: TipsetMessages::default(),
        message_fetches: Cell::new(0),
    };
    let info = ActorInfo {
        actor,
        address: Address::new_id(MINER_ID),
        current,
        executed,
    };
    (node, info, open_index)
}

#[test]
fn proven_sectors_are_all_but_the_skipped() {
    for &version in aster::actors::VERSIONS {
        let full = BitField::from_bits([1, 2, 3]);
        let (mut node, info, open_index) = setup(version, &full);
        node.messages.executed.push(post_message(
            version,
            0,
            post_params(version, open_index, BitField::from_bits([2])),
            ExitCode::OK,
        ));

        let posts = PoStExtractor::extract(&info, &node).unwrap();
        let message_cid = node.messages.executed[0].cid.to_string();
        let expected: Vec<MinerSectorPost> = [1, 3]
            .into_iter()
            .map(|sector_id| MinerSectorPost {
                height: PREV_EPOCH,
                miner_id: info.address.to_string(),
                sector_id,
                post_message_cid: message_cid.clone(),
            })
            .collect();
        assert_eq!(posts, expected);
    }
}

#[test]
fn failed_submissions_yield_no_records() {
    let full = BitField::from_bits([1, 2, 3]);
    let (mut node, info, open_index) = setup(Version::V9, &full);
    node.messages.executed.push(post_message(
        Version::V9,
        0,
        post_params(Version::V9, open_index, BitField::new()),
        ExitCode::USR_ILLEGAL_ARGUMENT,
    ));

    let posts = PoStExtractor::extract(&info, &node).unwrap();
    assert!(posts.is_empty());
}

#[test]
fn skipping_every_sector_yields_no_records() {
    let full = BitField::from_bits([1, 2, 3]);
    let (mut node, info, open_index) = setup(Version::V9, &full);
    node.messages.executed.push(post_message(
        Version::V9,
        0,
        post_params(Version::V9, open_index, full.clone()),
        ExitCode::OK,
    ));

    let posts = PoStExtractor::extract(&info, &node).unwrap();
    assert!(posts.is_empty());
}

#[test]
fn malformed_params_fail_the_whole_extraction() {
    let full = BitField::from_bits([1, 2, 3]);
    let (mut node, info, _) = setup(Version::V9, &full);
    node.messages.executed.push(post_message(
        Version::V9,
        0,
        RawBytes::new(vec![0xde, 0xad, 0xbe, 0xef]),
        ExitCode::OK,
    ));

    assert!(PoStExtractor::extract(&info, &node).is_err());
}

#[test]
fn other_messages_to_the_miner_are_ignored() {
    let full = BitField::from_bits([1, 2, 3]);
    let (mut node, info, open_index) = setup(Version::V9, &full);
    let mut declare_faults = post_message(
        Version::V9,
        0,
        post_params(Version::V9, open_index, BitField::new()),
        ExitCode::OK,
    );
    declare_faults.message.method_num = v9::miner::Method::DeclareFaults as u64;
    node.messages.executed.push(declare_faults);

    let posts = PoStExtractor::extract(&info, &node).unwrap();
    assert!(posts.is_empty());
}

#[test]
fn genesis_extraction_is_empty_and_fetches_no_messages() {
    let store = MemoryBlockstore::new();
    let (state_root, _) = miner_with_partition(&store, Version::V8, &BitField::from_bits([1]));
    let code = actor_code_id(Version::V8, MINER_KEY).unwrap();
    let actor = ActorState::new(code, state_root, 0, TokenAmount::zero());

    let genesis = tipset(0, 0);
    let node = TestNode {
        store,
        actors: HashMap::default(),
        messages: TipsetMessages::default(),
        message_fetches: Cell::new(0),
    };
    let info = ActorInfo {
        actor,
        address: Address::new_id(MINER_ID),
        current: genesis.clone(),
        executed: genesis,
    };

    let posts = PoStExtractor::extract(&info, &node).unwrap();
    assert!(posts.is_empty());
    assert_eq!(node.message_fetches.get(), 0);
}

#[test]
fn miner_created_in_the_current_tipset_is_empty() {
    let full = BitField::from_bits([1]);
    let (mut node, info, open_index) = setup(Version::V9, &full);
    // The miner does not exist at the executed tipset.
    node.actors.clear();
    node.messages.executed.push(post_message(
        Version::V9,
        0,
        post_params(Version::V9, open_index, BitField::new()),
        ExitCode::OK,
    ));

    let posts = PoStExtractor::extract(&info, &node).unwrap();
    assert!(posts.is_empty());
}

#[test]
fn unknown_partition_index_is_an_error() {
    let full = BitField::from_bits([1, 2, 3]);
    let (mut node, info, open_index) = setup(Version::V9, &full);
    let params = v9::miner::SubmitWindowedPoStParams {
        deadline: open_index,
        partitions: vec![v9::miner::PoStPartition {
            index: 7,
            skipped: BitField::new(),
        }],
        proofs: Vec::new(),
        chain_commit_epoch: PREV_EPOCH - 10,
        chain_commit_rand: Randomness(vec![7; 32]),
    };
    node.messages.executed.push(post_message(
        Version::V9,
        0,
        RawBytes::new(to_vec(&params).unwrap()),
        ExitCode::OK,
    ));

    assert!(PoStExtractor::extract(&info, &node).is_err());
}

#[test]
fn two_submissions_in_one_tipset_both_produce_records() {
    let full = BitField::from_bits([1, 2, 3, 4]);
    let (mut node, info, open_index) = setup(Version::V8, &full);
    node.messages.executed.push(post_message(
        Version::V8,
        0,
        post_params(Version::V8, open_index, BitField::from_bits([1, 2])),
        ExitCode::OK,
    ));
    node.messages.executed.push(post_message(
        Version::V8,
        1,
        post_params(Version::V8, open_index, BitField::from_bits([3, 4])),
        ExitCode::OK,
    ));

    let posts = PoStExtractor::extract(&info, &node).unwrap();
    let sectors: Vec<u64> = posts.iter().map(|p| p.sector_id).collect();
    assert_eq!(sectors, vec![3, 4, 1, 2]);
    let first_cid = node.messages.executed[0].cid.to_string();
    let second_cid = node.messages.executed[1].cid.to_string();
    assert!(posts[..2].iter().all(|p| p.post_message_cid == first_cid));
    assert!(posts[2..].iter().all(|p| p.post_message_cid == second_cid));
}
