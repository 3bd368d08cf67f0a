// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod array;
mod map;

pub use array::Array;
pub use map::Map;
