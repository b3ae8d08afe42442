//! In-memory health-check provider.
//!
//! Behaves like the compute API as far as the reconciler can observe: names
//! are unique per collection, every write assigns a fresh fingerprint, and an
//! update must present the fingerprint of the object it replaces.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::cloud::provider::{ApiError, ApiResult, HealthCheckProvider, ResourceKind};
use crate::cloud::wire::{AlphaHealthCheck, HealthCheck, LegacyHealthCheck};

/// Serializable copy of a provider's contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreSnapshot {
    /// Last fingerprint generation handed out.
    pub generation: u64,
    pub health_checks: Vec<AlphaHealthCheck>,
    pub http_health_checks: Vec<LegacyHealthCheck>,
    pub https_health_checks: Vec<LegacyHealthCheck>,
}

/// A thread-safe provider backed by concurrent maps.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    health_checks: Arc<DashMap<String, AlphaHealthCheck>>,
    legacy_http: Arc<DashMap<String, LegacyHealthCheck>>,
    legacy_https: Arc<DashMap<String, LegacyHealthCheck>>,
    generation: Arc<AtomicU64>,
}

impl MemoryProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a provider holding the contents of `snapshot`.
    pub fn restore(snapshot: StoreSnapshot) -> Self {
        let provider = Self::new();
        provider.reset(snapshot);
        provider
    }

    /// Replace every collection with the contents of `snapshot`.
    pub fn reset(&self, snapshot: StoreSnapshot) {
        self.health_checks.clear();
        self.legacy_http.clear();
        self.legacy_https.clear();
        self.generation.store(snapshot.generation, Ordering::SeqCst);
        for hc in snapshot.health_checks {
            self.health_checks.insert(hc.name.clone(), hc);
        }
        for hc in snapshot.http_health_checks {
            self.legacy_http.insert(hc.name.clone(), hc);
        }
        for hc in snapshot.https_health_checks {
            self.legacy_https.insert(hc.name.clone(), hc);
        }
    }

    /// Copy out the current contents, each collection sorted by name.
    pub fn snapshot(&self) -> StoreSnapshot {
        fn sorted<T: Clone>(map: &DashMap<String, T>) -> Vec<T> {
            let mut entries: Vec<(String, T)> = map
                .iter()
                .map(|r| (r.key().clone(), r.value().clone()))
                .collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            entries.into_iter().map(|(_, v)| v).collect()
        }

        StoreSnapshot {
            generation: self.generation.load(Ordering::SeqCst),
            health_checks: sorted(&self.health_checks),
            http_health_checks: sorted(&self.legacy_http),
            https_health_checks: sorted(&self.legacy_https),
        }
    }

    /// Legacy HTTP-kind check by name, if present.
    pub fn legacy_http_health_check(&self, name: &str) -> Option<LegacyHealthCheck> {
        self.legacy_http.get(name).map(|r| r.value().clone())
    }

    /// Legacy HTTPS-kind check by name, if present.
    pub fn legacy_https_health_check(&self, name: &str) -> Option<LegacyHealthCheck> {
        self.legacy_https.get(name).map(|r| r.value().clone())
    }

    /// Number of unified health checks stored.
    pub fn len(&self) -> usize {
        self.health_checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.health_checks.is_empty()
    }

    fn next_fingerprint(&self) -> String {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{:016x}", generation)
    }

    fn insert(&self, hc: AlphaHealthCheck) -> ApiResult<()> {
        check_union(&hc)?;
        match self.health_checks.entry(hc.name.clone()) {
            Entry::Occupied(_) => Err(ApiError::AlreadyExists {
                kind: ResourceKind::HealthCheck,
                name: hc.name,
            }),
            Entry::Vacant(slot) => {
                let mut stored = hc;
                stored.fingerprint = Some(self.next_fingerprint());
                tracing::debug!(name = %stored.name, protocol = %stored.r#type, "Stored health check");
                slot.insert(stored);
                Ok(())
            }
        }
    }

    fn replace(&self, name: &str, hc: AlphaHealthCheck) -> ApiResult<()> {
        check_union(&hc)?;
        if hc.name != name {
            return Err(ApiError::Invalid {
                kind: ResourceKind::HealthCheck,
                name: name.to_string(),
                reason: format!("body names {:?}", hc.name),
            });
        }

        let mut current = self.health_checks.get_mut(name).ok_or_else(|| ApiError::NotFound {
            kind: ResourceKind::HealthCheck,
            name: name.to_string(),
        })?;

        if hc.fingerprint.is_none() || current.fingerprint != hc.fingerprint {
            return Err(ApiError::FingerprintMismatch {
                kind: ResourceKind::HealthCheck,
                name: name.to_string(),
            });
        }

        let mut stored = hc;
        stored.fingerprint = Some(self.next_fingerprint());
        tracing::debug!(name = %name, protocol = %stored.r#type, "Replaced health check");
        *current = stored;
        Ok(())
    }
}

// The compute API rejects bodies with more than one probe sub-object.
fn check_union(hc: &AlphaHealthCheck) -> ApiResult<()> {
    if hc.name.is_empty() {
        return Err(ApiError::Invalid {
            kind: ResourceKind::HealthCheck,
            name: String::new(),
            reason: "name is required".to_string(),
        });
    }

    let populated = [
        hc.http_health_check.is_some(),
        hc.https_health_check.is_some(),
        hc.http2_health_check.is_some(),
    ]
    .iter()
    .filter(|set| **set)
    .count();

    if populated > 1 {
        return Err(ApiError::Invalid {
            kind: ResourceKind::HealthCheck,
            name: hc.name.clone(),
            reason: format!("{} probe sub-objects set, at most one allowed", populated),
        });
    }
    Ok(())
}

fn insert_legacy(
    map: &DashMap<String, LegacyHealthCheck>,
    kind: ResourceKind,
    hc: &LegacyHealthCheck,
) -> ApiResult<()> {
    match map.entry(hc.name.clone()) {
        Entry::Occupied(_) => Err(ApiError::AlreadyExists {
            kind,
            name: hc.name.clone(),
        }),
        Entry::Vacant(slot) => {
            slot.insert(hc.clone());
            Ok(())
        }
    }
}

fn remove<T>(map: &DashMap<String, T>, kind: ResourceKind, name: &str) -> ApiResult<()> {
    match map.remove(name) {
        Some(_) => Ok(()),
        None => Err(ApiError::NotFound {
            kind,
            name: name.to_string(),
        }),
    }
}

impl HealthCheckProvider for MemoryProvider {
    fn get_health_check(&self, name: &str) -> ApiResult<HealthCheck> {
        self.get_alpha_health_check(name).map(HealthCheck::from)
    }

    fn get_alpha_health_check(&self, name: &str) -> ApiResult<AlphaHealthCheck> {
        self.health_checks
            .get(name)
            .map(|r| r.value().clone())
            .ok_or_else(|| ApiError::NotFound {
                kind: ResourceKind::HealthCheck,
                name: name.to_string(),
            })
    }

    fn create_health_check(&self, hc: &HealthCheck) -> ApiResult<()> {
        self.insert(hc.clone().into())
    }

    fn create_alpha_health_check(&self, hc: &AlphaHealthCheck) -> ApiResult<()> {
        self.insert(hc.clone())
    }

    fn update_health_check(&self, name: &str, hc: &HealthCheck) -> ApiResult<()> {
        self.replace(name, hc.clone().into())
    }

    fn update_alpha_health_check(&self, name: &str, hc: &AlphaHealthCheck) -> ApiResult<()> {
        self.replace(name, hc.clone())
    }

    fn delete_health_check(&self, name: &str) -> ApiResult<()> {
        remove(
            &self.health_checks,
            ResourceKind::HealthCheck,
            name,
        )
    }

    fn list_health_checks(&self) -> ApiResult<Vec<AlphaHealthCheck>> {
        Ok(self.snapshot().health_checks)
    }

    fn create_legacy_http_health_check(&self, hc: &LegacyHealthCheck) -> ApiResult<()> {
        insert_legacy(&self.legacy_http, ResourceKind::LegacyHttpHealthCheck, hc)
    }

    fn create_legacy_https_health_check(&self, hc: &LegacyHealthCheck) -> ApiResult<()> {
        insert_legacy(&self.legacy_https, ResourceKind::LegacyHttpsHealthCheck, hc)
    }

    fn delete_legacy_http_health_check(&self, name: &str) -> ApiResult<()> {
        remove(
            &self.legacy_http,
            ResourceKind::LegacyHttpHealthCheck,
            name,
        )
    }

    fn delete_legacy_https_health_check(&self, name: &str) -> ApiResult<()> {
        remove(
            &self.legacy_https,
            ResourceKind::LegacyHttpsHealthCheck,
            name,
        )
    }
}
