// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per entity family.

pub mod claims;
pub mod messages;
pub mod refs;
pub mod stats;

/// Shared soft-delete filter.
///
/// Every read of a soft-deletable entity appends this predicate instead of
/// restating the column check inline.
pub(crate) const NOT_DELETED: &str = "deleted_at IS NULL";
