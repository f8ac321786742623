// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Claim-scoped messaging subsystem.
//!
//! [`MessageService`] owns the access policy, sender resolution, and message
//! persistence; [`RoomRegistry`] owns the ephemeral per-connection room
//! membership used by the gateway's WebSocket layer for broadcast.

pub mod rooms;
pub mod service;

pub use rooms::RoomRegistry;
pub use service::{ensure_thread_access, MessageService, FALLBACK_SENDER_NAME};
