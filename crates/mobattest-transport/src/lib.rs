// ============================================
// File: crates/mobattest-transport/src/lib.rs
// ============================================
//! # mobattest Transport - Request/Response Layer
//!
//! ## Creation Reason
//! Defines the outbound transport capability attested connections are
//! built on, plus the deadline wrapper and an in-memory mock.
//!
//! ## Main Functionality
//!
//! ### Modules
//! - [`traits`]: `Transport`, `CallOptions`, `BasicCredentials`
//! - [`timeout`]: `TimeoutTransport` deadline wrapper
//! - [`error`]: Transport-specific error types
//! - `mock`: `MockTransport` (feature `mock`)
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              mobattest-client                       │
//! │                    │                                │
//! │         ┌──────────┴──────────┐                    │
//! │         ▼                     ▼                    │
//! │   mobattest-core        mobattest-transport        │
//! │                         You are here ◄──           │
//! │         │                     │                    │
//! │         └──────────┬──────────┘                    │
//! │                    ▼                               │
//! │             mobattest-common                       │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Always use the trait for testability
//! - Mock implementations available with `mock` feature
//!
//! ## Last Modified
//! v0.1.0 - Initial transport layer implementation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod timeout;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export primary types
pub use error::{Result, TransportError};
pub use timeout::TimeoutTransport;
pub use traits::{BasicCredentials, CallOptions, Transport};
