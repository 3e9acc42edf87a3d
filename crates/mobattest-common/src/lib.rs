// ============================================
// File: crates/mobattest-common/src/lib.rs
// ============================================
//! # Mobattest Common - Shared Types Library
//!
//! ## Creation Reason
//! Provides the identifier types and base error enum shared by every
//! crate of the attested-channel client, so that core, transport and
//! client agree on how responders, measurements and channels are named.
//!
//! ## Main Functionality
//! - [`types`]: `ResponderId`, `Measurement`, `ChannelId`
//! - [`error`]: Common error types and result aliases
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              mobattest-client                       │
//! │                    │                                │
//! │         ┌──────────┴──────────┐                    │
//! │         ▼                     ▼                    │
//! │   mobattest-core      mobattest-transport          │
//! │         │                     │                    │
//! │         └──────────┬──────────┘                    │
//! │                    ▼                               │
//! │            mobattest-common  ◄── You are here      │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - This crate is the foundation - changes affect everything
//! - Keep dependencies minimal (no crypto, no async)
//! - Identifier types must stay cheap to clone and safe to log
//!
//! ## Last Modified
//! v0.1.0 - Initial implementation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{CommonError, Result};
pub use types::{ChannelId, Measurement, ResponderId};
