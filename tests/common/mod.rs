//! Shared utilities for integration tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use ingress_healthchecks::cloud::wire::{AlphaHealthCheck, HealthCheck, LegacyHealthCheck};
use ingress_healthchecks::cloud::{ApiError, ApiResult, HealthCheckProvider, MemoryProvider};
use ingress_healthchecks::config::HealthCheckDefaults;
use ingress_healthchecks::{ClusterNamer, HealthChecker};

/// Provider calls that can be observed and failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(dead_code)]
pub enum Call {
    Get,
    Create,
    Update,
    AlphaGet,
    AlphaCreate,
    AlphaUpdate,
    Delete,
    DeleteLegacyHttp,
    DeleteLegacyHttps,
}

/// Wraps a [`MemoryProvider`], recording calls and failing injected ones once.
#[derive(Default)]
pub struct FaultyProvider {
    pub inner: MemoryProvider,
    faults: Mutex<HashMap<Call, ApiError>>,
    calls: Mutex<Vec<Call>>,
}

#[allow(dead_code)]
impl FaultyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `call` fail with `err`.
    pub fn inject(&self, call: Call, err: ApiError) {
        self.faults.lock().unwrap().insert(call, err);
    }

    /// Calls made so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn enter(&self, call: Call) -> ApiResult<()> {
        self.calls.lock().unwrap().push(call);
        match self.faults.lock().unwrap().remove(&call) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl HealthCheckProvider for FaultyProvider {
    fn get_health_check(&self, name: &str) -> ApiResult<HealthCheck> {
        self.enter(Call::Get)?;
        self.inner.get_health_check(name)
    }

    fn get_alpha_health_check(&self, name: &str) -> ApiResult<AlphaHealthCheck> {
        self.enter(Call::AlphaGet)?;
        self.inner.get_alpha_health_check(name)
    }

    fn create_health_check(&self, hc: &HealthCheck) -> ApiResult<()> {
        self.enter(Call::Create)?;
        self.inner.create_health_check(hc)
    }

    fn create_alpha_health_check(&self, hc: &AlphaHealthCheck) -> ApiResult<()> {
        self.enter(Call::AlphaCreate)?;
        self.inner.create_alpha_health_check(hc)
    }

    fn update_health_check(&self, name: &str, hc: &HealthCheck) -> ApiResult<()> {
        self.enter(Call::Update)?;
        self.inner.update_health_check(name, hc)
    }

    fn update_alpha_health_check(&self, name: &str, hc: &AlphaHealthCheck) -> ApiResult<()> {
        self.enter(Call::AlphaUpdate)?;
        self.inner.update_alpha_health_check(name, hc)
    }

    fn delete_health_check(&self, name: &str) -> ApiResult<()> {
        self.enter(Call::Delete)?;
        self.inner.delete_health_check(name)
    }

    fn list_health_checks(&self) -> ApiResult<Vec<AlphaHealthCheck>> {
        self.inner.list_health_checks()
    }

    fn create_legacy_http_health_check(&self, hc: &LegacyHealthCheck) -> ApiResult<()> {
        self.inner.create_legacy_http_health_check(hc)
    }

    fn create_legacy_https_health_check(&self, hc: &LegacyHealthCheck) -> ApiResult<()> {
        self.inner.create_legacy_https_health_check(hc)
    }

    fn delete_legacy_http_health_check(&self, name: &str) -> ApiResult<()> {
        self.enter(Call::DeleteLegacyHttp)?;
        self.inner.delete_legacy_http_health_check(name)
    }

    fn delete_legacy_https_health_check(&self, name: &str) -> ApiResult<()> {
        self.enter(Call::DeleteLegacyHttps)?;
        self.inner.delete_legacy_https_health_check(name)
    }
}

/// Checker with probe path "/" and an unsuffixed namer.
#[allow(dead_code)]
pub fn checker(cloud: Arc<dyn HealthCheckProvider>) -> HealthChecker {
    HealthChecker::new(
        cloud,
        Arc::new(ClusterNamer::default()),
        HealthCheckDefaults::with_request_path("/"),
    )
}

/// Checker with a cluster-suffixed namer.
#[allow(dead_code)]
pub fn cluster_checker(cloud: Arc<dyn HealthCheckProvider>, cluster: &str) -> HealthChecker {
    HealthChecker::new(
        cloud,
        Arc::new(ClusterNamer::new(cluster)),
        HealthCheckDefaults::with_request_path("/"),
    )
}
