// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Flat record types produced by the extraction tasks. These are the rows a
//! downstream sink persists; they hold only owned, display-ready values so a
//! sink never needs chain types to store them.

pub mod miner;
