// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Version-independent adapters over the raw actor states. Each family
//! exposes one `State` enum with a variant per supported version and answers
//! queries by matching on it, so callers never branch on a version tag.

pub mod datacap;
pub mod miner;
