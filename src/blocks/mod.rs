// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod tipset;

pub use tipset::{Tipset, TipsetKeys};
