// ============================================
// File: crates/mobattest-core/src/attest/report.rs
// ============================================
//! # Enclave Reports and Signed Evidence
//!
//! ## Creation Reason
//! Defines what a remote enclave presents as proof of identity: a report
//! of its measurements and security state, signed by the attestation
//! authority.
//!
//! ## Main Functionality
//! - `QuoteStatus`: Platform security state reported with the quote
//! - `EnclaveReport`: Measurements, product data, advisories, report data
//! - `SignedEvidence`: Encoded report plus authority signature
//!
//! ## Wire Format (Little Endian)
//! ```text
//! EnclaveReport  = mr_enclave[32] | mr_signer[32] | product_id:u16
//!                | security_version:u16 | quote_status:u8
//!                | report_data[32] | advisory_count:u16
//!                | (advisory_len:u8 | advisory:utf8)*
//! SignedEvidence = report_len:u16 | EnclaveReport | signature[64]
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - The signature covers the exact report bytes received; verify before
//!   trusting any decoded field
//! - `report_data` binds the enclave's static key: SHA-256(static key)
//!
//! ## Last Modified
//! v0.1.0 - Initial report definitions

use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use mobattest_common::types::MEASUREMENT_SIZE;
use mobattest_common::Measurement;

use crate::crypto::{AuthoritySigningKey, ED25519_SIGNATURE_SIZE};
use crate::error::{CoreError, Result};

// ============================================
// Constants
// ============================================

/// Size of the report data field.
pub const REPORT_DATA_SIZE: usize = 32;

/// Size of the fixed part of an encoded report.
pub const REPORT_FIXED_SIZE: usize =
    MEASUREMENT_SIZE * 2 + 2 + 2 + 1 + REPORT_DATA_SIZE + 2;

/// Maximum number of advisories accepted in one report.
pub const MAX_ADVISORIES: usize = 256;

// ============================================
// QuoteStatus
// ============================================

/// Platform security state attached to an attestation quote.
///
/// | Value | Status | Acceptable |
/// |-------|--------|------------|
/// | 0 | Ok | always |
/// | 1 | ConfigurationNeeded | if advisories allowed as config |
/// | 2 | SwHardeningNeeded | if advisories allowed as hardening |
/// | 3 | ConfigurationAndSwHardeningNeeded | if allowed as both |
/// | 4 | OutOfDate | never |
/// | 5 | Revoked | never |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum QuoteStatus {
    /// Platform is up to date.
    Ok = 0,
    /// Platform needs a configuration change.
    ConfigurationNeeded = 1,
    /// Enclave software needs hardening against an advisory.
    SwHardeningNeeded = 2,
    /// Both of the above.
    ConfigurationAndSwHardeningNeeded = 3,
    /// Platform TCB is out of date.
    OutOfDate = 4,
    /// Platform has been revoked.
    Revoked = 5,
}

impl QuoteStatus {
    /// Converts a byte to a status.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Ok),
            1 => Some(Self::ConfigurationNeeded),
            2 => Some(Self::SwHardeningNeeded),
            3 => Some(Self::ConfigurationAndSwHardeningNeeded),
            4 => Some(Self::OutOfDate),
            5 => Some(Self::Revoked),
            _ => None,
        }
    }

    /// Returns the wire byte.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Returns `true` for statuses no policy may accept.
    #[must_use]
    pub const fn is_never_acceptable(self) -> bool {
        matches!(self, Self::OutOfDate | Self::Revoked)
    }

    /// Returns the status name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::ConfigurationNeeded => "configuration_needed",
            Self::SwHardeningNeeded => "sw_hardening_needed",
            Self::ConfigurationAndSwHardeningNeeded => "configuration_and_sw_hardening_needed",
            Self::OutOfDate => "out_of_date",
            Self::Revoked => "revoked",
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================
// EnclaveReport
// ============================================

/// Identity and security state of a remote enclave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnclaveReport {
    /// Code identity (MRENCLAVE).
    pub mr_enclave: Measurement,
    /// Signer identity (MRSIGNER).
    pub mr_signer: Measurement,
    /// ISV product id.
    pub product_id: u16,
    /// ISV security version.
    pub security_version: u16,
    /// Platform security state.
    pub quote_status: QuoteStatus,
    /// Advisory ids the platform reported (e.g. `INTEL-SA-00334`).
    pub advisory_ids: Vec<String>,
    /// Enclave-chosen data; binds the enclave's static key.
    pub report_data: [u8; REPORT_DATA_SIZE],
}

impl EnclaveReport {
    /// Creates a clean report (status `Ok`, no advisories).
    #[must_use]
    pub fn new(mr_enclave: Measurement, mr_signer: Measurement) -> Self {
        Self {
            mr_enclave,
            mr_signer,
            product_id: 0,
            security_version: 0,
            quote_status: QuoteStatus::Ok,
            advisory_ids: Vec::new(),
            report_data: [0u8; REPORT_DATA_SIZE],
        }
    }

    /// Returns the report data that binds `key`.
    #[must_use]
    pub fn report_data_for(key: &[u8]) -> [u8; REPORT_DATA_SIZE] {
        Sha256::digest(key).into()
    }

    /// Sets `report_data` so that this report binds `key`.
    pub fn bind_key(&mut self, key: &[u8]) {
        self.report_data = Self::report_data_for(key);
    }

    /// Returns `true` if this report binds `key`.
    #[must_use]
    pub fn binds_key(&self, key: &[u8]) -> bool {
        self.report_data == Self::report_data_for(key)
    }

    /// Encodes the report.
    ///
    /// # Errors
    /// Returns `MessageTooLarge` for too many or too long advisories.
    pub fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        if self.advisory_ids.len() > MAX_ADVISORIES {
            return Err(CoreError::too_large(MAX_ADVISORIES, self.advisory_ids.len()));
        }
        buf.reserve(REPORT_FIXED_SIZE);
        buf.put_slice(self.mr_enclave.as_bytes());
        buf.put_slice(self.mr_signer.as_bytes());
        buf.put_u16_le(self.product_id);
        buf.put_u16_le(self.security_version);
        buf.put_u8(self.quote_status.as_byte());
        buf.put_slice(&self.report_data);
        let count = u16::try_from(self.advisory_ids.len())
            .map_err(|_| CoreError::too_large(MAX_ADVISORIES, self.advisory_ids.len()))?;
        buf.put_u16_le(count);
        for advisory in &self.advisory_ids {
            let len = u8::try_from(advisory.len())
                .map_err(|_| CoreError::too_large(usize::from(u8::MAX), advisory.len()))?;
            buf.put_u8(len);
            buf.put_slice(advisory.as_bytes());
        }
        Ok(())
    }

    /// Encodes the report into a fresh buffer.
    ///
    /// # Errors
    /// See [`EnclaveReport::encode`].
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        self.encode(&mut buf)?;
        Ok(buf.freeze())
    }

    /// Decodes a report, consuming exactly its bytes.
    ///
    /// # Errors
    /// Returns a framing error for truncated or invalid input.
    pub fn decode(buf: &mut Bytes) -> Result<Self> {
        if buf.len() < REPORT_FIXED_SIZE {
            return Err(CoreError::too_short(REPORT_FIXED_SIZE, buf.len()));
        }

        let mut mr_enclave = [0u8; MEASUREMENT_SIZE];
        buf.copy_to_slice(&mut mr_enclave);
        let mut mr_signer = [0u8; MEASUREMENT_SIZE];
        buf.copy_to_slice(&mut mr_signer);
        let product_id = buf.get_u16_le();
        let security_version = buf.get_u16_le();
        let status_byte = buf.get_u8();
        let quote_status = QuoteStatus::from_byte(status_byte)
            .ok_or_else(|| CoreError::malformed(format!("unknown quote status {status_byte}")))?;
        let mut report_data = [0u8; REPORT_DATA_SIZE];
        buf.copy_to_slice(&mut report_data);

        let count = usize::from(buf.get_u16_le());
        if count > MAX_ADVISORIES {
            return Err(CoreError::too_large(MAX_ADVISORIES, count));
        }
        let mut advisory_ids = Vec::with_capacity(count);
        for _ in 0..count {
            if buf.is_empty() {
                return Err(CoreError::malformed("truncated advisory list"));
            }
            let len = usize::from(buf.get_u8());
            if buf.len() < len {
                return Err(CoreError::too_short(len, buf.len()));
            }
            let raw = buf.split_to(len);
            let advisory = std::str::from_utf8(&raw)
                .map_err(|_| CoreError::malformed("advisory id is not UTF-8"))?;
            advisory_ids.push(advisory.to_owned());
        }

        Ok(Self {
            mr_enclave: Measurement::new(mr_enclave),
            mr_signer: Measurement::new(mr_signer),
            product_id,
            security_version,
            quote_status,
            advisory_ids,
            report_data,
        })
    }
}

// ============================================
// SignedEvidence
// ============================================

/// An encoded enclave report together with the authority's signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEvidence {
    report_bytes: Bytes,
    signature: [u8; ED25519_SIGNATURE_SIZE],
}

impl SignedEvidence {
    /// Encodes and signs a report.
    ///
    /// # Errors
    /// Returns an error if the report cannot be encoded.
    pub fn sign(report: &EnclaveReport, authority: &AuthoritySigningKey) -> Result<Self> {
        let report_bytes = report.to_bytes()?;
        if report_bytes.len() > usize::from(u16::MAX) {
            return Err(CoreError::too_large(usize::from(u16::MAX), report_bytes.len()));
        }
        let signature = authority.sign(&report_bytes);
        Ok(Self {
            report_bytes,
            signature,
        })
    }

    /// Returns the signed report bytes.
    #[must_use]
    pub fn report_bytes(&self) -> &[u8] {
        &self.report_bytes
    }

    /// Returns the authority signature.
    #[must_use]
    pub const fn signature(&self) -> &[u8; ED25519_SIGNATURE_SIZE] {
        &self.signature
    }

    /// Decodes the report. Only meaningful after the signature verified.
    ///
    /// # Errors
    /// Returns a framing error for a malformed report or trailing bytes.
    pub fn report(&self) -> Result<EnclaveReport> {
        let mut buf = self.report_bytes.clone();
        let report = EnclaveReport::decode(&mut buf)?;
        if !buf.is_empty() {
            return Err(CoreError::malformed("trailing bytes after report"));
        }
        Ok(report)
    }

    /// Encodes the evidence.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 + self.report_bytes.len() + ED25519_SIGNATURE_SIZE);
        #[allow(clippy::cast_possible_truncation)]
        out.extend_from_slice(&(self.report_bytes.len() as u16).to_le_bytes());
        out.extend_from_slice(&self.report_bytes);
        out.extend_from_slice(&self.signature);
        out
    }

    /// Decodes evidence bytes.
    ///
    /// # Errors
    /// Returns a framing error if lengths do not add up.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut buf = Bytes::copy_from_slice(data);
        if buf.len() < 2 {
            return Err(CoreError::too_short(2, buf.len()));
        }
        let report_len = usize::from(buf.get_u16_le());
        let expected = report_len + ED25519_SIGNATURE_SIZE;
        if buf.len() != expected {
            return Err(CoreError::malformed(format!(
                "evidence length {} does not match declared {}",
                buf.len(),
                expected
            )));
        }
        let report_bytes = buf.split_to(report_len);
        let mut signature = [0u8; ED25519_SIGNATURE_SIZE];
        buf.copy_to_slice(&mut signature);
        Ok(Self {
            report_bytes,
            signature,
        })
    }
}

// ============================================
// Tests
// ============================================
