// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use anyhow::Context as _;
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use fvm_ipld_encoding::CborStore;
use fvm_ipld_hamt::BytesKey;
use fvm_shared::address::Address;
use fvm_shared::bigint::bigint_ser::BigIntDe;
use fvm_shared::sector::StoragePower;
use multihash_codetable::Code;
use sha2::{Digest as _, Sha256};

use crate::actors::adt;
use crate::actors::{DATACAP_KEY, UnknownCodeError, Version, actor_code_id, code_info, v8, v9};

/// Version-independent view of the verified-client registry.
///
/// Before version 9 the registry was a bare clients map with a fixed bit
/// width. Version 9 moved it into a fungible-token layout whose bit width is
/// recorded in the state itself, so the two variants differ in how the map
/// must be opened, not just in field names.
pub enum State {
    V8(v8::datacap::State),
    V9(v9::datacap::State),
}

impl State {
    /// Loads the adapter from an actor's code and state root, dispatching on
    /// the code CID. Rejects codes that belong to other actor families.
    pub fn load<BS: Blockstore>(store: &BS, code: &Cid, state: &Cid) -> anyhow::Result<Self> {
        match code_info(code) {
            Some((Version::V8, DATACAP_KEY)) => Ok(State::V8(
                store
                    .get_cbor(state)?
                    .context("datacap actor state not found")?,
            )),
            Some((Version::V9, DATACAP_KEY)) => Ok(State::V9(
                store
                    .get_cbor(state)?
                    .context("datacap actor state not found")?,
            )),
            _ => anyhow::bail!("unknown datacap actor code {code}"),
        }
    }

    /// Builds an empty registry at the given version, with its clients map
    /// already flushed to the store.
    pub fn construct<BS: Blockstore>(
        store: &BS,
        version: Version,
        governor: Address,
    ) -> anyhow::Result<Self> {
        match version {
            Version::V8 => {
                let mut clients = adt::Map::<BS, BigIntDe>::empty(
                    store,
                    version,
                    v8::datacap::CLIENTS_HAMT_BIT_WIDTH,
                );
                let empty = clients.flush()?;
                Ok(State::V8(v8::datacap::State {
                    governor,
                    verified_clients: empty,
                    remove_data_cap_proposal_ids: empty,
                }))
            }
            Version::V9 => {
                let mut balances = adt::Map::<BS, BigIntDe>::empty(
                    store,
                    version,
                    v9::datacap::TOKEN_HAMT_BIT_WIDTH,
                );
                let empty = balances.flush()?;
                Ok(State::V9(v9::datacap::State {
                    governor,
                    token: v9::datacap::TokenState {
                        balances: empty,
                        allowances: empty,
                        ..Default::default()
                    },
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
        DATACAP_KEY
    }

    pub fn actor_version(&self) -> Version {
        match self {
            State::V8(_) => Version::V8,
            State::V9(_) => Version::V9,
        }
    }

    /// The canonical code CID of this state's (type, version) pair.
    pub fn code(&self) -> Result<Cid, UnknownCodeError> {
        actor_code_id(self.actor_version(), DATACAP_KEY)
    }

    pub fn governor(&self) -> Address {
        match self {
            State::V8(st) => st.governor,
            State::V9(st) => st.governor,
        }
    }

    /// Opens the clients map, using whichever bit width this version's layout
    /// dictates. Keys are serialized client addresses.
    pub fn verified_clients<'bs, BS: Blockstore>(
        &self,
        store: &'bs BS,
    ) -> anyhow::Result<adt::Map<'bs, BS, BigIntDe>> {
        match self {
            State::V8(st) => adt::Map::load(
                &st.verified_clients,
                store,
                Version::V8,
                v8::datacap::CLIENTS_HAMT_BIT_WIDTH,
            ),
            State::V9(st) => adt::Map::load(
                &st.token.balances,
                store,
                Version::V9,
                st.token.hamt_bit_width,
            ),
        }
    }

    /// The remaining datacap of a single client, or `None` when the address
    /// holds no allowance. The address must already be in its registry form;
    /// no resolution happens here.
    pub fn verified_client_data_cap<BS: Blockstore>(
        &self,
        store: &BS,
        client: Address,
    ) -> anyhow::Result<Option<StoragePower>> {
        let clients = self.verified_clients(store)?;
        let found = clients.get(&BytesKey(client.to_bytes()))?;
        Ok(found.map(|BigIntDe(power)| power.clone()))
    }

    /// Visits every client and its allowance, in the map's native order.
    pub fn for_each_client<BS, F>(&self, store: &BS, mut f: F) -> anyhow::Result<()>
    where
        BS: Blockstore,
        F: FnMut(Address, &StoragePower) -> anyhow::Result<()>,
    {
        let clients = self.verified_clients(store)?;
        clients.for_each(|key, BigIntDe(power)| {
            let client = Address::from_bytes(&key.0)?;
            f(client, power)
        })
    }

    /// The bit width needed to open this version's clients map.
    pub fn verified_clients_map_bit_width(&self) -> u32 {
        match self {
            State::V8(_) => v8::datacap::CLIENTS_HAMT_BIT_WIDTH,
            State::V9(st) => st.token.hamt_bit_width,
        }
    }

    /// The hash function the clients map applies to keys. Both supported
    /// versions use sha256.
    pub fn verified_clients_map_hash_function(&self) -> fn(&[u8]) -> Vec<u8> {
        fn sha256(input: &[u8]) -> Vec<u8> {
            Sha256::digest(input).to_vec()
        }
        sha256
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fvm_ipld_blockstore::MemoryBlockstore;
    use fvm_shared::bigint::BigInt;

    fn with_client(
        store: &MemoryBlockstore,
        version: Version,
        client: Address,
        cap: u64,
    ) -> State {
        let state = State::construct(store, version, Address::new_id(100)).unwrap();
        let mut clients = state.verified_clients(store).unwrap();
        clients
            .set(BytesKey(client.to_bytes()), BigIntDe(BigInt::from(cap)))
            .unwrap();
        let root = clients.flush().unwrap();
        match state {
            State::V8(mut st) => {
                st.verified_clients = root;
                State::V8(st)
            }
            State::V9(mut st) => {
                st.token.balances = root;
                State::V9(st)
            }
        }
    }

    #[test]
    fn client_data_cap_lookup_per_version() {
        let store = MemoryBlockstore::new();
        let client = Address::new_id(1001);
        for &version in crate::actors::VERSIONS {
            let state = with_client(&store, version, client, 32 << 30);
            assert_eq!(
                state.verified_client_data_cap(&store, client).unwrap(),
                Some(BigInt::from(32u64 << 30)),
            );
            assert_eq!(
                state
                    .verified_client_data_cap(&store, Address::new_id(9999))
                    .unwrap(),
                None,
            );
        }
    }

    #[test]
    fn for_each_client_visits_every_entry_once() {
        let store = MemoryBlockstore::new();
        let state = with_client(&store, Version::V9, Address::new_id(1001), 2048);
        let mut seen = Vec::new();
        state
            .for_each_client(&store, |client, power| {
                seen.push((client, power.clone()));
                Ok(())
            })
            .unwrap();
        assert_eq!(seen, vec![(Address::new_id(1001), BigInt::from(2048))]);
    }

    #[test]
    fn load_dispatches_on_code_and_rejects_other_families() {
        let store = MemoryBlockstore::new();
        let state = State::construct(&store, Version::V9, Address::new_id(100)).unwrap();
        let root = state.save(&store).unwrap();

        let code = state.code().unwrap();
        let loaded = State::load(&store, &code, &root).unwrap();
        assert_eq!(loaded.actor_version(), Version::V9);
        assert_eq!(loaded.governor(), Address::new_id(100));

        let miner_code = actor_code_id(Version::V9, crate::actors::MINER_KEY).unwrap();
        assert!(State::load(&store, &miner_code, &root).is_err());
    }

    #[test]
    fn map_parameters_match_the_layout() {
        let store = MemoryBlockstore::new();
        let v8 = State::construct(&store, Version::V8, Address::new_id(100)).unwrap();
        let v9 = State::construct(&store, Version::V9, Address::new_id(100)).unwrap();
        assert_eq!(v8.verified_clients_map_bit_width(), 5);
        assert_eq!(v9.verified_clients_map_bit_width(), 3);

        let hash = v9.verified_clients_map_hash_function();
        assert_eq!(hash(b"").len(), 32);
    }
}
