// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use cid::Cid;
use fvm_shared::message::Message;
use fvm_shared::receipt::Receipt;

/// A finalized message together with its execution receipt.
///
/// A message's side effects finalize in the tipset *following* the one whose
/// blocks included it, so executed messages are always attributed to the
/// including tipset's child.
#[derive(Clone, Debug)]
pub struct ExecutedMessage {
    pub cid: Cid,
    pub message: Message,
    pub receipt: Receipt,
}

impl ExecutedMessage {
    /// Returns `true` if the receipt reports successful execution.
    pub fn succeeded(&self) -> bool {
        self.receipt.exit_code.is_success()
    }
}

/// The executed messages attributed to one tipset.
#[derive(Clone, Debug, Default)]
pub struct TipsetMessages {
    pub executed: Vec<ExecutedMessage>,
}
