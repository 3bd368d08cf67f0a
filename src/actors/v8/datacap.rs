// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use cid::Cid;
use fvm_ipld_encoding::tuple::*;
use fvm_shared::address::Address;
use fvm_shared::{HAMT_BIT_WIDTH, METHOD_CONSTRUCTOR};
use num_derive::FromPrimitive;

/// Bit width of the verified-clients HAMT. Fixed for this version; later
/// versions record the width in state instead.
pub const CLIENTS_HAMT_BIT_WIDTH: u32 = HAMT_BIT_WIDTH;

#[derive(Clone, Debug, Serialize_tuple, Deserialize_tuple)]
pub struct State {
    pub governor: Address,
    /// HAMT[Address]StoragePower, keyed at [`CLIENTS_HAMT_BIT_WIDTH`].
    pub verified_clients: Cid,
    pub remove_data_cap_proposal_ids: Cid,
}

/// Verified-client actor methods at this version.
#[derive(FromPrimitive)]
#[repr(u64)]
pub enum Method {
    Constructor = METHOD_CONSTRUCTOR,
    AddVerifiedClient = 2,
    UseBytes = 3,
    RestoreBytes = 4,
    RemoveVerifiedClientDataCap = 5,
}
