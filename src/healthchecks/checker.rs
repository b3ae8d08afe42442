//! Health-check reconciliation.
//!
//! # Responsibilities
//! - Build the desired health check for a backend port
//! - Read the current remote health check
//! - Create or replace it so remote state matches the desired value
//! - Remove unified and legacy health checks
//!
//! # Design Decisions
//! - No internal retries; every failure carries name, port or operation back
//!   to the caller, which owns backoff
//! - `sync` replaces the whole object; callers that want to keep remote
//!   fields read with `get`, mutate, then sync
//! - Optimistic concurrency only: the fingerprint of the object just read is
//!   sent with the replace, and a stale one surfaces as a provider error

use std::sync::Arc;

use crate::cloud::wire::Fingerprinted;
use crate::cloud::{ApiError, ApiResult, HealthCheckProvider};
use crate::config::HealthCheckDefaults;
use crate::healthchecks::errors::{HealthCheckError, HealthCheckResult, Operation};
use crate::healthchecks::surface::{AlphaSurface, ApiSurface, StableSurface};
use crate::healthchecks::value::{HealthCheck, PortBinding, Protocol};
use crate::namer::Namer;
use crate::observability::metrics;

/// Reconciles health-check resources for backend ports.
#[derive(Clone)]
pub struct HealthChecker {
    cloud: Arc<dyn HealthCheckProvider>,
    namer: Arc<dyn Namer>,
    defaults: HealthCheckDefaults,
}

impl HealthChecker {
    pub fn new(
        cloud: Arc<dyn HealthCheckProvider>,
        namer: Arc<dyn Namer>,
        defaults: HealthCheckDefaults,
    ) -> Self {
        Self {
            cloud,
            namer,
            defaults,
        }
    }

    pub fn defaults(&self) -> &HealthCheckDefaults {
        &self.defaults
    }

    /// A fixed-port check with this checker's defaults and no name.
    pub fn default_health_check(&self, port: i64, protocol: Protocol) -> HealthCheck {
        HealthCheck::default_for(port, protocol, &self.defaults)
    }

    /// Desired health check for `port`. Makes no remote call.
    pub fn new_check(&self, port: i64, protocol: Protocol, use_serving_port: bool) -> HealthCheck {
        let mut hc = self.default_health_check(port, protocol);
        hc.name = self.namer.name_for_port(port);
        if use_serving_port {
            hc.port_binding = PortBinding::UseServingPort;
        }
        hc
    }

    /// Current health check for `port`.
    ///
    /// `use_serving_port` reads through the advanced API, the only one that
    /// reports the port specification.
    pub fn get(&self, port: i64, use_serving_port: bool) -> HealthCheckResult<HealthCheck> {
        let name = self.namer.name_for_port(port);
        let result = if use_serving_port {
            self.get_via(&AlphaSurface(self.cloud.as_ref()), &name, port)
        } else {
            self.get_via(&StableSurface(self.cloud.as_ref()), &name, port)
        };
        metrics::record_result("get", &result);
        result
    }

    fn get_via<S: ApiSurface>(&self, surface: &S, name: &str, port: i64) -> HealthCheckResult<HealthCheck> {
        tracing::debug!(name = %name, port, api = S::VERSION, "Getting health check");
        surface
            .fetch(name)
            .map(S::decode)
            .map_err(|e| HealthCheckError::from_api(name, port, Operation::Get, e))
    }

    /// Create `desired` remotely, or replace the existing object with it.
    ///
    /// Returns `true` when the health check was created.
    pub fn sync(&self, desired: &HealthCheck) -> HealthCheckResult<bool> {
        let result = if desired.uses_serving_port() {
            self.sync_via(&AlphaSurface(self.cloud.as_ref()), desired)
        } else {
            self.sync_via(&StableSurface(self.cloud.as_ref()), desired)
        };
        metrics::record_result("sync", &result);
        if let Ok(created) = result {
            metrics::record_sync(created);
        }
        result
    }

    fn sync_via<S: ApiSurface>(&self, surface: &S, desired: &HealthCheck) -> HealthCheckResult<bool> {
        let name = desired.name.as_str();
        let port = desired.port();
        let provider_err = |operation: Operation, source: ApiError| HealthCheckError::Provider {
            name: name.to_string(),
            port,
            operation,
            source,
        };

        let mut wire = S::encode(desired).map_err(|source| HealthCheckError::Conversion {
            name: name.to_string(),
            port,
            source,
        })?;
        // Fingerprints come from the remote side only.
        wire.set_fingerprint(None);

        match surface.fetch(name) {
            Err(err) if err.is_not_found() => {
                tracing::info!(
                    name = %name,
                    protocol = %desired.protocol,
                    port,
                    api = S::VERSION,
                    "Creating health check"
                );
                surface
                    .insert(&wire)
                    .map_err(|e| provider_err(Operation::Create, e))?;
                Ok(true)
            }
            Err(err) => Err(provider_err(Operation::Get, err)),
            Ok(existing) => {
                let existing_fingerprint = existing.fingerprint().map(str::to_string);
                let current = S::decode(existing);
                if current.protocol != desired.protocol {
                    tracing::info!(
                        name = %name,
                        from = %current.protocol,
                        to = %desired.protocol,
                        "Health check protocol changed"
                    );
                }
                tracing::info!(
                    name = %name,
                    protocol = %desired.protocol,
                    request_path = %desired.request_path,
                    api = S::VERSION,
                    "Updating health check"
                );

                wire.set_fingerprint(existing_fingerprint);
                surface
                    .replace(name, &wire)
                    .map_err(|e| provider_err(Operation::Update, e))?;
                Ok(false)
            }
        }
    }

    /// Delete the health check for `port`.
    ///
    /// Not idempotent: a missing check is [`HealthCheckError::NotFound`].
    pub fn delete(&self, port: i64) -> HealthCheckResult<()> {
        let name = self.namer.name_for_port(port);
        tracing::info!(name = %name, port, "Deleting health check");

        let result = self
            .cloud
            .delete_health_check(&name)
            .map_err(|e| HealthCheckError::from_api(&name, port, Operation::Delete, e));
        metrics::record_result("delete", &result);
        result
    }

    /// Delete both legacy kinds (HTTP and HTTPS) for `port`.
    ///
    /// Both deletions are always attempted. A failure other than not-found
    /// wins (HTTP reported first); if neither kind existed the result is
    /// [`HealthCheckError::NotFound`]; otherwise it succeeds.
    pub fn delete_legacy(&self, port: i64) -> HealthCheckResult<()> {
        let name = self.namer.legacy_name_for_port(port);
        tracing::info!(name = %name, port, "Deleting legacy health checks");

        let http = self.cloud.delete_legacy_http_health_check(&name);
        let https = self.cloud.delete_legacy_https_health_check(&name);

        let result = blend_legacy_deletes(&name, port, http, https);
        metrics::record_result("delete_legacy", &result);
        result
    }
}

fn blend_legacy_deletes(
    name: &str,
    port: i64,
    http: ApiResult<()>,
    https: ApiResult<()>,
) -> HealthCheckResult<()> {
    let mut removed = false;

    for (operation, attempt) in [
        (Operation::DeleteLegacyHttp, http),
        (Operation::DeleteLegacyHttps, https),
    ] {
        match attempt {
            Ok(()) => {
                tracing::debug!(name = %name, operation = %operation, "Legacy health check removed");
                removed = true;
            }
            Err(err) if err.is_not_found() => {
                tracing::debug!(name = %name, operation = %operation, "Legacy health check absent");
            }
            Err(source) => {
                return Err(HealthCheckError::Provider {
                    name: name.to_string(),
                    port,
                    operation,
                    source,
                });
            }
        }
    }

    if removed {
        Ok(())
    } else {
        Err(HealthCheckError::NotFound {
            name: name.to_string(),
            port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::{MemoryProvider, ResourceKind};
    use crate::namer::ClusterNamer;

    fn checker() -> (HealthChecker, Arc<MemoryProvider>) {
        let cloud = Arc::new(MemoryProvider::new());
        let checker = HealthChecker::new(
            cloud.clone(),
            Arc::new(ClusterNamer::new("uid1")),
            HealthCheckDefaults::default(),
        );
        (checker, cloud)
    }

    fn missing(kind: ResourceKind) -> ApiError {
        ApiError::NotFound {
            kind,
            name: "k8s-be-80".into(),
        }
    }

    #[test]
    fn test_new_check_fixed_port() {
        let (checker, _) = checker();
        let hc = checker.new_check(80, Protocol::Http, false);
        assert_eq!(hc.name, "k8s-be-80--uid1");
        assert_eq!(hc.port_binding, PortBinding::Fixed(80));
        assert_eq!(hc.request_path, checker.defaults().request_path);
        assert_eq!(hc.check_interval_sec, checker.defaults().check_interval_sec);
    }

    #[test]
    fn test_new_check_serving_port() {
        let (checker, _) = checker();
        let hc = checker.new_check(8000, Protocol::Http, true);
        assert_eq!(hc.port_binding, PortBinding::UseServingPort);
        assert_eq!(hc.port(), 0);
        assert_eq!(hc.name, "k8s-be-8000--uid1");
    }

    #[test]
    fn test_sync_conversion_error_makes_no_call() {
        let (checker, cloud) = checker();
        let hc = checker.new_check(80, Protocol::Unsupported("TCP".into()), false);

        let err = checker.sync(&hc).unwrap_err();
        assert!(matches!(err, HealthCheckError::Conversion { port: 80, .. }));
        assert!(cloud.is_empty());
    }

    #[test]
    fn test_sync_never_sends_stale_fingerprint_on_create() {
        let (checker, cloud) = checker();
        let hc = checker.new_check(80, Protocol::Http, false);
        checker.sync(&hc).unwrap();

        let read = checker.get(80, false).unwrap();
        assert!(read.fingerprint().is_some());
        checker.delete(80).unwrap();

        // Re-create from a value that still remembers the deleted object.
        assert!(checker.sync(&read).unwrap());
        assert_ne!(
            cloud.get_health_check(&read.name).unwrap().fingerprint.as_deref(),
            read.fingerprint()
        );
    }

    #[test]
    fn test_blend_legacy_deletes() {
        let http = ResourceKind::LegacyHttpHealthCheck;
        let https = ResourceKind::LegacyHttpsHealthCheck;

        assert!(blend_legacy_deletes("n", 80, Ok(()), Ok(())).is_ok());
        assert!(blend_legacy_deletes("n", 80, Ok(()), Err(missing(https))).is_ok());
        assert!(blend_legacy_deletes("n", 80, Err(missing(http)), Ok(())).is_ok());

        let err = blend_legacy_deletes("n", 80, Err(missing(http)), Err(missing(https))).unwrap_err();
        assert_eq!(
            err,
            HealthCheckError::NotFound {
                name: "n".into(),
                port: 80
            }
        );

        let err = blend_legacy_deletes(
            "n",
            80,
            Ok(()),
            Err(ApiError::Transport("timeout".into())),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            HealthCheckError::Provider {
                operation: Operation::DeleteLegacyHttps,
                ..
            }
        ));

        let err = blend_legacy_deletes(
            "n",
            80,
            Err(ApiError::Transport("a".into())),
            Err(ApiError::Transport("b".into())),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            HealthCheckError::Provider {
                operation: Operation::DeleteLegacyHttp,
                ..
            }
        ));
    }
}
