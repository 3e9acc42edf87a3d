// ============================================
// File: crates/mobattest-client/src/services/report_cache.rs
// ============================================
//! # Report Cache
//!
//! ## Creation Reason
//! Fog reports are fetched by every transaction build that pays a fog
//! user. Concurrent callers for one report server must share a single
//! fetch, and a fresh enough cached response must not be fetched again.
//!
//! ## Main Functionality
//! - `EndpointId`: host + path identity of a report server
//! - `ReportRequirement`: `(report id, minimum pubkey expiry)` pair
//! - `ReportServer`: per-endpoint cache with FIFO single-flight fetch
//! - `ReportServerRegistry`: lazily creates one server per endpoint
//!
//! ## Fetch Algorithm
//! ```text
//! reports(reqs)
//!   ├─ cache satisfies reqs? ──────────────────────────► return cached
//!   ├─ wait for the queue (FIFO)
//!   ├─ cache satisfies reqs now? (earlier fetch done) ─► return cached
//!   ├─ fetch ─ error ──────────────────────────────────► return error
//!   └─ overwrite cache, release queue ─────────────────► return fresh
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - The queue is a `tokio::sync::Mutex`, which grants the lock in
//!   request order; the recheck depends on that ordering
//! - A failed fetch leaves the cache as it was; every queued caller
//!   makes its own attempt
//! - No requirements means "any cached response", without expiry checks
//!
//! ## Last Modified
//! v0.1.0 - Initial report cache

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, info, info_span, trace, Instrument, Span};

use crate::api::paths::FOG_REPORT_GET_REPORTS;
use crate::api::report::{ReportRequest, ReportResponse};
use crate::error::{ClientError, Result};
use crate::services::unattested::UnattestedConnection;

// ============================================
// EndpointId
// ============================================

/// Identity of a report server: host and path, scheme ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointId {
    host: String,
    path: String,
}

impl EndpointId {
    /// Creates an endpoint identity.
    pub fn new(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
        }
    }

    /// Parses `scheme://host[:port][/path]`.
    ///
    /// # Errors
    /// Returns `ConfigInvalid` if the uri has no host.
    pub fn from_uri(uri: &str) -> Result<Self> {
        let rest = uri.trim().split_once("://").map_or(uri.trim(), |(_, rest)| rest);
        let (host, path) = match rest.find('/') {
            Some(i) => rest.split_at(i),
            None => (rest, "/"),
        };
        if host.is_empty() {
            return Err(ClientError::config_invalid(
                "fog_report.uri",
                format!("no host in '{uri}'"),
            ));
        }
        Ok(Self::new(host, path))
    }

    /// Returns the host (with port, if any).
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.host, self.path)
    }
}

// ============================================
// ReportRequirement
// ============================================

/// A report the caller needs, valid until at least a given block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReportRequirement {
    /// Report id.
    pub report_id: String,
    /// Lowest acceptable `pubkey_expiry`.
    pub minimum_pubkey_expiry: u64,
}

impl ReportRequirement {
    /// Creates a requirement.
    pub fn new(report_id: impl Into<String>, minimum_pubkey_expiry: u64) -> Self {
        Self {
            report_id: report_id.into(),
            minimum_pubkey_expiry,
        }
    }

    /// Returns `true` if `response` carries this report, fresh enough.
    #[must_use]
    pub fn is_satisfied_by(&self, response: &ReportResponse) -> bool {
        response
            .find(&self.report_id)
            .is_some_and(|r| r.pubkey_expiry >= self.minimum_pubkey_expiry)
    }
}

/// Returns `true` if `response` satisfies every requirement.
#[must_use]
pub fn satisfies(response: &ReportResponse, requirements: &[ReportRequirement]) -> bool {
    requirements.iter().all(|r| r.is_satisfied_by(response))
}

// ============================================
// ReportServer
// ============================================

/// Cached, single-flight access to one report server.
pub struct ReportServer {
    endpoint: EndpointId,
    connection: UnattestedConnection,
    cache: RwLock<Option<Arc<ReportResponse>>>,
    queue: tokio::sync::Mutex<()>,
    span: Span,
}

impl ReportServer {
    /// Creates a server with an empty cache.
    pub fn new(endpoint: EndpointId, connection: UnattestedConnection) -> Self {
        let span = info_span!("report_server", endpoint = %endpoint);
        Self {
            endpoint,
            connection,
            cache: RwLock::new(None),
            queue: tokio::sync::Mutex::new(()),
            span,
        }
    }

    /// Returns the endpoint identity.
    #[must_use]
    pub const fn endpoint(&self) -> &EndpointId {
        &self.endpoint
    }

    /// Returns the underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &UnattestedConnection {
        &self.connection
    }

    /// Returns the most recently fetched response.
    #[must_use]
    pub fn cached(&self) -> Option<Arc<ReportResponse>> {
        self.cache.read().clone()
    }

    fn lookup(&self, requirements: Option<&[ReportRequirement]>) -> Option<Arc<ReportResponse>> {
        let cached = self.cached()?;
        match requirements {
            Some(reqs) if !satisfies(&cached, reqs) => None,
            _ => Some(cached),
        }
    }

    /// Returns a report response satisfying `requirements`.
    ///
    /// With `None`, any cached response is returned. A fetched response is
    /// returned as is; it may still lack a requested report.
    ///
    /// # Errors
    /// Propagates the fetch failure of this caller's own attempt.
    pub async fn reports(
        &self,
        requirements: Option<&[ReportRequirement]>,
    ) -> Result<Arc<ReportResponse>> {
        if let Some(hit) = self.lookup(requirements) {
            trace!(parent: &self.span, "Report cache hit");
            return Ok(hit);
        }

        let _slot = self.queue.lock().instrument(self.span.clone()).await;
        if let Some(hit) = self.lookup(requirements) {
            debug!(parent: &self.span, "Report cache filled by a queued fetch");
            return Ok(hit);
        }

        debug!(parent: &self.span, "Fetching reports");
        let response: ReportResponse = self
            .connection
            .call(FOG_REPORT_GET_REPORTS, &ReportRequest {})
            .instrument(self.span.clone())
            .await?;

        let response = Arc::new(response);
        *self.cache.write() = Some(Arc::clone(&response));
        info!(
            parent: &self.span,
            reports = response.reports.len(),
            "Report cache refreshed"
        );
        Ok(response)
    }
}

impl fmt::Debug for ReportServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportServer")
            .field("endpoint", &self.endpoint)
            .field("cached", &self.cache.read().is_some())
            .finish_non_exhaustive()
    }
}

// ============================================
// ReportServerRegistry
// ============================================

/// One `ReportServer` per endpoint, created on first use.
#[derive(Debug, Default)]
pub struct ReportServerRegistry {
    servers: DashMap<EndpointId, Arc<ReportServer>>,
}

impl ReportServerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the server for `endpoint`, creating it with `connect` if
    /// this is the first request for it.
    pub fn server<F>(&self, endpoint: &EndpointId, connect: F) -> Arc<ReportServer>
    where
        F: FnOnce() -> UnattestedConnection,
    {
        let entry = self
            .servers
            .entry(endpoint.clone())
            .or_insert_with(|| Arc::new(ReportServer::new(endpoint.clone(), connect())));
        Arc::clone(entry.value())
    }

    /// Returns how many endpoints have a server.
    #[must_use]
    pub fn len(&self) -> usize {
        self.servers.len()
    }

    /// Returns `true` if no server was created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use prost::Message;

    use super::*;
    use crate::api::report::Report;
    use mobattest_transport::mock::MockTransport;
    use mobattest_transport::TransportError;

    fn report(id: &str, expiry: u64) -> Report {
        Report {
            fog_report_id: id.into(),
            attestation_evidence: vec![],
            pubkey_expiry: expiry,
            pubkey: vec![0x42; 32],
        }
    }

    fn serving(response: ReportResponse) -> Arc<MockTransport> {
        let bytes = response.encode_to_vec();
        Arc::new(MockTransport::new(move |_, _| Ok(bytes.clone())))
    }

    fn server(mock: &Arc<MockTransport>) -> ReportServer {
        ReportServer::new(
            EndpointId::new("fog.example.com", "/"),
            UnattestedConnection::new("fog_report", mock.clone()),
        )
    }

    #[tokio::test]
    async fn test_cache_serves_satisfied_requirements() {
        let mock = serving(ReportResponse {
            reports: vec![report("A", 10)],
        });
        let server = server(&mock);

        server
            .reports(Some(&[ReportRequirement::new("A", 10)]))
            .await
            .unwrap();
        assert_eq!(mock.total_calls(), 1);

        server
            .reports(Some(&[ReportRequirement::new("A", 10)]))
            .await
            .unwrap();
        server
            .reports(Some(&[ReportRequirement::new("A", 5)]))
            .await
            .unwrap();
        server.reports(None).await.unwrap();
        assert_eq!(mock.total_calls(), 1);

        server
            .reports(Some(&[ReportRequirement::new("A", 20)]))
            .await
            .unwrap();
        assert_eq!(mock.total_calls(), 2);

        server
            .reports(Some(&[ReportRequirement::new("B", 0)]))
            .await
            .unwrap();
        assert_eq!(mock.total_calls(), 3);
    }

    #[tokio::test]
    async fn test_no_requirements_fetches_when_empty() {
        let mock = serving(ReportResponse {
            reports: vec![report("A", 10)],
        });
        let server = server(&mock);
        assert!(server.cached().is_none());

        let response = server.reports(None).await.unwrap();
        assert_eq!(response.reports.len(), 1);
        assert_eq!(mock.total_calls(), 1);
        assert!(Arc::ptr_eq(&response, &server.cached().unwrap()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_fetch() {
        let bytes = ReportResponse {
            reports: vec![report("A", 10), report("B", 7)],
        }
        .encode_to_vec();
        let mock = Arc::new(
            MockTransport::new(move |_, _| Ok(bytes.clone())).with_latency(Duration::from_millis(20)),
        );
        let server = Arc::new(server(&mock));

        let tasks: Vec<_> = (0..16u64)
            .map(|i| {
                let server = Arc::clone(&server);
                tokio::spawn(async move {
                    let reqs = [ReportRequirement::new("A", i % 10), ReportRequirement::new("B", 7)];
                    server.reports(Some(&reqs)).await
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap().reports.len(), 2);
        }
        assert_eq!(mock.total_calls(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_failed_fetch_does_not_poison_queue() {
        let bytes = ReportResponse {
            reports: vec![report("A", 10)],
        }
        .encode_to_vec();
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let mock = Arc::new(
            MockTransport::new(move |path, _| {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(TransportError::network(path, "connection refused"))
                } else {
                    Ok(bytes.clone())
                }
            })
            .with_latency(Duration::from_millis(20)),
        );
        let server = Arc::new(server(&mock));

        let tasks: Vec<_> = (0..2)
            .map(|_| {
                let server = Arc::clone(&server);
                tokio::spawn(async move { server.reports(None).await })
            })
            .collect();

        let mut failures = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(response) => assert_eq!(response.reports.len(), 1),
                Err(e) => {
                    assert!(e.is_retryable());
                    failures += 1;
                }
            }
        }
        assert_eq!(failures, 1);
        assert_eq!(mock.total_calls(), 2);
        assert!(server.cached().is_some());
    }

    #[test]
    fn test_registry_memoizes_per_endpoint() {
        let mock = serving(ReportResponse::default());
        let registry = ReportServerRegistry::new();
        let a = EndpointId::from_uri("https://fog.example.com:443/").unwrap();
        let b = EndpointId::from_uri("fog://fog.example.com:443").unwrap();
        let c = EndpointId::from_uri("https://other.example.com").unwrap();

        let connect = || UnattestedConnection::new("fog_report", mock.clone());
        let first = registry.server(&a, connect);
        let second = registry.server(&b, || panic!("endpoint should be memoized"));
        let third = registry.server(&c, connect);

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_endpoint_from_uri() {
        let ep = EndpointId::from_uri("https://fog.example.com:443/report").unwrap();
        assert_eq!(ep.host(), "fog.example.com:443");
        assert_eq!(ep.path(), "/report");
        assert_eq!(ep.to_string(), "fog.example.com:443/report");

        assert_eq!(EndpointId::from_uri("fog.example.com").unwrap().path(), "/");
        assert!(EndpointId::from_uri("https:///report").is_err());
        assert!(EndpointId::from_uri("").is_err());
    }

    #[test]
    fn test_requirements() {
        let response = ReportResponse {
            reports: vec![report("A", 10), report("B", 3)],
        };
        assert!(satisfies(&response, &[]));
        assert!(satisfies(
            &response,
            &[ReportRequirement::new("A", 10), ReportRequirement::new("B", 3)]
        ));
        assert!(!satisfies(
            &response,
            &[ReportRequirement::new("A", 10), ReportRequirement::new("B", 4)]
        ));
        assert!(!ReportRequirement::new("C", 0).is_satisfied_by(&response));
    }
}
