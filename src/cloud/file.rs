//! File-backed health-check provider.
//!
//! # Responsibilities
//! - Serve the provider API from a [`MemoryProvider`]
//! - Persist the whole store as JSON after every successful mutation
//!
//! # Design Decisions
//! - A missing file is an empty store
//! - Writes go to a sibling temp file and are renamed into place
//! - A mutation that cannot be persisted is rolled back in memory and
//!   reported as a transport error, so callers never observe it
//! - Mutations are serialized; reads go straight to the in-memory maps

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;

use crate::cloud::memory::{MemoryProvider, StoreSnapshot};
use crate::cloud::provider::{ApiError, ApiResult, HealthCheckProvider};
use crate::cloud::wire::{AlphaHealthCheck, HealthCheck, LegacyHealthCheck};

/// Errors opening or saving a store file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Provider persisted to a JSON document on disk.
#[derive(Debug)]
pub struct FileProvider {
    inner: MemoryProvider,
    path: PathBuf,
    save_lock: Mutex<()>,
}

impl FileProvider {
    /// Open the store at `path`, loading it if it exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let inner = if path.exists() {
            let file = File::open(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            let snapshot: StoreSnapshot = serde_json::from_reader(BufReader::new(file))
                .map_err(|source| StoreError::Json {
                    path: path.clone(),
                    source,
                })?;
            tracing::info!(
                path = %path.display(),
                health_checks = snapshot.health_checks.len(),
                legacy_http = snapshot.http_health_checks.len(),
                legacy_https = snapshot.https_health_checks.len(),
                "Loaded health check store"
            );
            MemoryProvider::restore(snapshot)
        } else {
            tracing::info!(path = %path.display(), "Health check store not found, starting empty");
            MemoryProvider::new()
        };

        Ok(Self {
            inner,
            path,
            save_lock: Mutex::new(()),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current contents to disk.
    pub fn save(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock();
        self.write_snapshot(&self.inner.snapshot())
    }

    fn write_lock(&self) -> MutexGuard<'_, ()> {
        self.save_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn write_snapshot(&self, snapshot: &StoreSnapshot) -> Result<(), StoreError> {
        let tmp = self.path.with_extension("json.tmp");
        if let Err(e) = write_json(&tmp, snapshot).and_then(|()| {
            fs::rename(&tmp, &self.path).map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })
        }) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }

        tracing::debug!(
            path = %self.path.display(),
            health_checks = snapshot.health_checks.len(),
            "Saved health check store"
        );
        Ok(())
    }

    /// Apply `mutation` and persist the result, or leave the store untouched.
    fn commit(&self, mutation: impl FnOnce(&MemoryProvider) -> ApiResult<()>) -> ApiResult<()> {
        let _guard = self.write_lock();
        let before = self.inner.snapshot();
        mutation(&self.inner)?;

        if let Err(e) = self.write_snapshot(&self.inner.snapshot()) {
            self.inner.reset(before);
            tracing::warn!(path = %self.path.display(), error = %e, "Store write failed, change rolled back");
            return Err(ApiError::Transport(e.to_string()));
        }
        Ok(())
    }
}

fn write_json(path: &Path, snapshot: &StoreSnapshot) -> Result<(), StoreError> {
    let io_err = |source: std::io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
    serde_json::to_writer_pretty(&mut writer, snapshot).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_err)
}

impl HealthCheckProvider for FileProvider {
    fn get_health_check(&self, name: &str) -> ApiResult<HealthCheck> {
        self.inner.get_health_check(name)
    }

    fn get_alpha_health_check(&self, name: &str) -> ApiResult<AlphaHealthCheck> {
        self.inner.get_alpha_health_check(name)
    }

    fn create_health_check(&self, hc: &HealthCheck) -> ApiResult<()> {
        self.commit(|store| store.create_health_check(hc))
    }

    fn create_alpha_health_check(&self, hc: &AlphaHealthCheck) -> ApiResult<()> {
        self.commit(|store| store.create_alpha_health_check(hc))
    }

    fn update_health_check(&self, name: &str, hc: &HealthCheck) -> ApiResult<()> {
        self.commit(|store| store.update_health_check(name, hc))
    }

    fn update_alpha_health_check(&self, name: &str, hc: &AlphaHealthCheck) -> ApiResult<()> {
        self.commit(|store| store.update_alpha_health_check(name, hc))
    }

    fn delete_health_check(&self, name: &str) -> ApiResult<()> {
        self.commit(|store| store.delete_health_check(name))
    }

    fn list_health_checks(&self) -> ApiResult<Vec<AlphaHealthCheck>> {
        self.inner.list_health_checks()
    }

    fn create_legacy_http_health_check(&self, hc: &LegacyHealthCheck) -> ApiResult<()> {
        self.commit(|store| store.create_legacy_http_health_check(hc))
    }

    fn create_legacy_https_health_check(&self, hc: &LegacyHealthCheck) -> ApiResult<()> {
        self.commit(|store| store.create_legacy_https_health_check(hc))
    }

    fn delete_legacy_http_health_check(&self, name: &str) -> ApiResult<()> {
        self.commit(|store| store.delete_legacy_http_health_check(name))
    }

    fn delete_legacy_https_health_check(&self, name: &str) -> ApiResult<()> {
        self.commit(|store| store.delete_legacy_https_health_check(name))
    }
}
