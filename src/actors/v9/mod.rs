// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Raw on-chain state layouts at actors version 9.
//!
//! The datacap actor switched to the fungible-token layout at this version,
//! nesting balances under a token state with a recorded HAMT bit width.

pub mod datacap;
pub mod miner;
