// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Raw state layouts as they were encoded on chain at protocol version 8.
//! These mirror the on-disk tuple encodings exactly and share nothing with
//! other versions.

pub mod datacap;
pub mod miner;
