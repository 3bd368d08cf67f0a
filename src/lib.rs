// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Chain-indexing primitives: a stable query surface over historically
//! incompatible actor-state encodings, and extractors that turn executed
//! messages plus state snapshots into flat, persistable facts.

pub mod actors;
pub mod bitfield;
pub mod blocks;
pub mod message;
pub mod model;
pub mod tasks;
