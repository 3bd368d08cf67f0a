// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! The versioned state-access layer. Each supported protocol version keeps its
//! own raw state layouts (`v8`, `v9`); the `builtin` modules adapt them to one
//! stable query surface per actor family.

pub mod adt;
pub mod builtin;
pub mod v8;
pub mod v9;

use std::fmt;
use std::sync::LazyLock;

use ahash::HashMap;
use cid::Cid;
use cid::multihash::Multihash;
use fvm_ipld_encoding::tuple::*;
use fvm_shared::econ::TokenAmount;
use thiserror::Error;

/// The protocol versions with distinct actor-state encodings.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Version {
    V8,
    V9,
}

/// All versions the crate supports, in ascending order.
pub const VERSIONS: &[Version] = &[Version::V8, Version::V9];

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n: u32 = match self {
            Version::V8 => 8,
            Version::V9 => 9,
        };
        write!(f, "{n}")
    }
}

/// Actor-type key of the storage miner family.
pub const MINER_KEY: &str = "storageminer";
/// Actor-type key of the verified-client (datacap) family.
pub const DATACAP_KEY: &str = "datacap";

const ACTOR_KEYS: &[&str] = &[MINER_KEY, DATACAP_KEY];

// Multicodec for raw data.
const RAW: u64 = 0x55;

/// Builds the identity-hashed `fil/<version>/<key>` code CID.
fn make_code_cid(version: Version, key: &str) -> Cid {
    let name = format!("fil/{version}/{key}");
    let mh = Multihash::wrap(0, name.as_bytes()).expect("code name exceeds multihash capacity");
    Cid::new_v1(RAW, mh)
}

static CODE_IDS: LazyLock<HashMap<Cid, (Version, &'static str)>> = LazyLock::new(|| {
    VERSIONS
        .iter()
        .flat_map(|&version| {
            ACTOR_KEYS
                .iter()
                .map(move |&key| (make_code_cid(version, key), (version, key)))
        })
        .collect()
});

/// The (type, version) pair has no registered canonical code identifier. This
/// legitimately happens when a new protocol version ships before the mapping
/// table is extended, so it is an error value rather than a panic.
#[derive(Debug, PartialEq, Eq, Error)]
#[error("no registered code id for actor {key} version {version}")]
pub struct UnknownCodeError {
    pub version: Version,
    pub key: String,
}

/// Returns the canonical code CID for an actor type and version.
pub fn actor_code_id(version: Version, key: &str) -> Result<Cid, UnknownCodeError> {
    if ACTOR_KEYS.contains(&key) {
        Ok(make_code_cid(version, key))
    } else {
        Err(UnknownCodeError {
            version,
            key: key.to_owned(),
        })
    }
}

/// Resolves a code CID back to the actor type and version it belongs to.
pub fn code_info(code: &Cid) -> Option<(Version, &'static str)> {
    CODE_IDS.get(code).copied()
}

/// The on-chain header of a single actor: its code, the content hash of its
/// state root, and the account bookkeeping fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize_tuple, Deserialize_tuple)]
pub struct ActorState {
    pub code: Cid,
    pub state: Cid,
    pub sequence: u64,
    pub balance: TokenAmount,
}

impl ActorState {
    pub fn new(code: Cid, state: Cid, sequence: u64, balance: TokenAmount) -> Self {
        Self {
            code,
            state,
            sequence,
            balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_ids_roundtrip_for_every_supported_version() {
        for &version in VERSIONS {
            for &key in ACTOR_KEYS {
                let code = actor_code_id(version, key).unwrap();
                assert_eq!(code_info(&code), Some((version, key)));
            }
        }
    }

    #[test]
    fn unknown_actor_key_is_an_error_not_a_panic() {
        let err = actor_code_id(Version::V9, "paymentchannel").unwrap_err();
        assert_eq!(err.key, "paymentchannel");
    }

    #[test]
    fn foreign_code_resolves_to_none() {
        let code = make_code_cid(Version::V8, "no-such-actor");
        assert_eq!(code_info(&code), None);
    }
}
