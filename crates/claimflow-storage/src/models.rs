// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `claimflow-core::types` for use across
//! crate boundaries. This module re-exports them for convenience within the
//! storage crate.

pub use claimflow_core::types::{
    Claim, ClaimDetail, ClaimPatch, ClientRecord, HistoryEntry, Message, RefRecord, Sender,
    SenderKind,
};
