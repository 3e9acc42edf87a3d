// ============================================
// File: crates/mobattest-core/src/ake/mod.rs
// ============================================
//! # Authenticated Key Exchange
//!
//! ## Creation Reason
//! Drives the attestation handshake for one logical connection and
//! produces the session cipher once the enclave has been verified.
//!
//! ## Main Functionality
//! - [`state`]: `AkeStateMachine` (initiator side) and `SessionState`
//! - [`responder`]: `EnclaveResponder`, the enclave side of the exchange
//! - [`transcript_hash`]: Hash both sides bind the session to
//!
//! ## State Transitions
//! ```text
//!              auth_begin_request           auth_end (ok)
//!  Unattested ───────────────────► Pending ───────────────► Attested
//!      ▲                              │ ▲                       │
//!      │      auth_end (error)        │ │ auth_begin_request    │
//!      ├──────────────────────────────┘ └──(overwrite)          │
//!      │                                                        │
//!      └──────────────────────── deattest ──────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Both sides MUST hash exactly the same bytes, in the same order
//! - A failed `auth_end` consumes the pending context; never reuse it
//!
//! ## Last Modified
//! v0.1.0 - Initial AKE implementation

pub mod responder;
pub mod state;

pub use responder::EnclaveResponder;
pub use state::{AkeStateMachine, HandshakeContext, SessionState};

use sha2::{Digest, Sha256};

use crate::crypto::kdf::TRANSCRIPT_HASH_SIZE;
use crate::protocol::AuthResponseFrame;

/// Domain label prefixed to every handshake transcript.
pub const TRANSCRIPT_LABEL: &[u8] = b"mobattest-transcript-v1";

/// Hashes the handshake transcript.
///
/// ```text
/// SHA-256(label || request || responder_static || responder_ephemeral || evidence)
/// ```
///
/// The confirmation field is excluded because it is computed from this
/// hash.
#[must_use]
pub fn transcript_hash(request: &[u8], response: &AuthResponseFrame) -> [u8; TRANSCRIPT_HASH_SIZE] {
    let mut hasher = Sha256::new();
    hasher.update(TRANSCRIPT_LABEL);
    hasher.update(request);
    hasher.update(response.responder_static);
    hasher.update(response.responder_ephemeral);
    hasher.update(&response.evidence);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::HANDSHAKE_VERSION;

    fn frame() -> AuthResponseFrame {
        AuthResponseFrame {
            version: HANDSHAKE_VERSION,
            responder_static: [1; 32],
            responder_ephemeral: [2; 32],
            evidence: vec![3; 16],
            confirmation: Vec::new(),
        }
    }

    #[test]
    fn test_transcript_ignores_confirmation() {
        let mut confirmed = frame();
        confirmed.confirmation = vec![9; 28];
        assert_eq!(transcript_hash(b"req", &frame()), transcript_hash(b"req", &confirmed));
    }

    #[test]
    fn test_transcript_covers_keys() {
        let mut other = frame();
        other.responder_static = [4; 32];
        assert_ne!(transcript_hash(b"req", &frame()), transcript_hash(b"req", &other));
        assert_ne!(transcript_hash(b"req", &frame()), transcript_hash(b"reQ", &frame()));
    }
}
