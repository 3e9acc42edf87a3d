// ============================================
// File: crates/mobattest-client/src/services/mod.rs
// ============================================
//! # Client Services
//!
//! ## Creation Reason
//! Connection machinery shared by every service client, separated from
//! the per-API request types.
//!
//! ## Main Functionality
//!
//! ### Submodules
//! - [`connection`]: Attested connection with single re-attestation retry
//! - [`unattested`]: Plain connection for non-enclave endpoints
//! - [`report_cache`]: Per-endpoint report cache with FIFO single-flight
//!
//! ## Service Architecture
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     Service Layer                        │
//! ├──────────────────────────────────────────────────────────┤
//! │                                                          │
//! │  ┌────────────────────┐     ┌─────────────────────────┐  │
//! │  │ AttestedConnection │     │  ReportServerRegistry   │  │
//! │  │ - AKE state        │     │  - one server/endpoint  │  │
//! │  │ - seal / open      │     └───────────┬─────────────┘  │
//! │  │ - retry once       │                 │                │
//! │  └─────────┬──────────┘     ┌───────────▼─────────────┐  │
//! │            │                │      ReportServer       │  │
//! │            │                │  - cache + FIFO queue   │  │
//! │            │                └───────────┬─────────────┘  │
//! │            │                ┌───────────▼─────────────┐  │
//! │            │                │  UnattestedConnection   │  │
//! │            │                └───────────┬─────────────┘  │
//! │            └───────────┬────────────────┘                │
//! │                        ▼                                 │
//! │                 dyn Transport                            │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Nothing here holds a lock across an application request
//! - Thread-safe (Send + Sync); share connections behind `Arc`
//!
//! ## Last Modified
//! v0.1.0 - Initial services structure

pub mod connection;
pub mod report_cache;
pub mod unattested;

// Re-export primary types
pub use connection::{AttestedConnection, ServiceDescriptor, MAX_ATTEMPTS};
pub use report_cache::{
    satisfies, EndpointId, ReportRequirement, ReportServer, ReportServerRegistry,
};
pub use unattested::UnattestedConnection;
