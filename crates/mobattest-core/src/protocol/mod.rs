// ============================================
// File: crates/mobattest-core/src/protocol/mod.rs
// ============================================
//! # Protocol Module
//!
//! ## Creation Reason
//! Defines what goes over the wire between an initiator and an enclave
//! service: the handshake frames and the protobuf envelopes around them.
//!
//! ### Submodules
//! - [`messages`]: Handshake frame structures
//! - [`codec`]: Binary serialization of handshake frames
//! - [`envelope`]: `AuthMessage` / `AttestedMessage` protobuf types
//!
//! ## Protocol Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Handshake Phase                          │
//! │                                                             │
//! │  Client ──── AuthMessage(AuthRequestFrame) ────────► Enclave│
//! │  Client ◄─── AuthMessage(AuthResponseFrame) ──────── Enclave│
//! │                                                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    Attested Phase                           │
//! │                                                             │
//! │  Client ════ AttestedMessage(aad, channel, data) ═══ Enclave│
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - ANY frame layout change requires a `HANDSHAKE_VERSION` bump
//! - Little-endian for every multi-byte integer
//!
//! ## Last Modified
//! v0.1.0 - Initial protocol definitions

pub mod codec;
pub mod envelope;
pub mod messages;

pub use codec::{Codec, HandshakeCodec};
pub use envelope::{AttestedMessage, AuthMessage};
pub use messages::{AuthRequestFrame, AuthResponseFrame, MessageType, HANDSHAKE_VERSION};
