// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits decoupling the domain crates from each other.
//!
//! Each trait is the narrowest surface one side of a former service cycle
//! actually needs, so the concrete services can depend on these instead of
//! on each other.

pub mod claims;
pub mod directory;
pub mod identity;

pub use claims::ClaimLookup;
pub use directory::ClientDirectory;
pub use identity::IdentityResolver;
