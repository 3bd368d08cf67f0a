// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use cid::Cid;
use fvm_ipld_encoding::tuple::*;
use fvm_shared::METHOD_CONSTRUCTOR;
use fvm_shared::address::Address;
use fvm_shared::bigint::{BigInt, bigint_ser};
use num_derive::FromPrimitive;

/// HAMT bit width the token layout records in its state. Fixed at
/// construction but stored on chain, so readers must use the stored value.
pub const TOKEN_HAMT_BIT_WIDTH: u32 = 3;

#[derive(Clone, Debug, Serialize_tuple, Deserialize_tuple)]
pub struct State {
    pub governor: Address,
    pub token: TokenState,
}

/// Embedded fungible-token state. Client allowances are tracked per actor in
/// `balances`, keyed by actor ID.
#[derive(Clone, Debug, Serialize_tuple, Deserialize_tuple)]
pub struct TokenState {
    #[serde(with = "bigint_ser")]
    pub supply: BigInt,
    /// HAMT of actor ID to token balance.
    pub balances: Cid,
    /// HAMT of owner ID to a map of operator allowances.
    pub allowances: Cid,
    /// Bit width of the two HAMTs above.
    pub hamt_bit_width: u32,
}

#[derive(Clone, Debug, Serialize_tuple, Deserialize_tuple)]
pub struct ConstructorParams {
    pub governor: Address,
}

/// Datacap actor methods at this version.
#[derive(FromPrimitive)]
#[repr(u64)]
pub enum Method {
    Constructor = METHOD_CONSTRUCTOR,
    Mint = 2,
    Destroy = 3,
    Name = 10,
    Symbol = 11,
    TotalSupply = 12,
    Balance = 13,
    Transfer = 14,
    TransferFrom = 15,
    IncreaseAllowance = 16,
    DecreaseAllowance = 17,
    RevokeAllowance = 18,
    Burn = 19,
    BurnFrom = 20,
    Allowance = 21,
}

impl Default for TokenState {
    fn default() -> Self {
        Self {
            supply: BigInt::default(),
            balances: Cid::default(),
            allowances: Cid::default(),
            hamt_bit_width: TOKEN_HAMT_BIT_WIDTH,
        }
    }
}
