//! Resource naming.
//!
//! Names must be stable for the lifetime of a cluster and distinct per port,
//! since the name is the only key the reconciler uses to find a health check.

/// Maximum length of a compute resource name.
pub const MAX_NAME_LEN: usize = 63;

const BACKEND_PREFIX: &str = "k8s-be";
const CLUSTER_DELIMITER: &str = "--";

/// Maps a backend port to a resource name.
pub trait Namer: Send + Sync {
    /// Name of the unified health check for `port`.
    fn name_for_port(&self, port: i64) -> String;

    /// Name shared by the legacy HTTP and HTTPS health checks for `port`.
    fn legacy_name_for_port(&self, port: i64) -> String {
        self.name_for_port(port)
    }
}

/// Names resources `k8s-be-<port>--<cluster>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterNamer {
    cluster_name: String,
}

impl ClusterNamer {
    pub fn new(cluster_name: impl Into<String>) -> Self {
        Self {
            cluster_name: cluster_name.into(),
        }
    }

    pub fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    fn decorate(&self, name: String) -> String {
        if self.cluster_name.is_empty() {
            return name;
        }
        truncate(format!("{}{}{}", name, CLUSTER_DELIMITER, self.cluster_name))
    }
}

impl Namer for ClusterNamer {
    fn name_for_port(&self, port: i64) -> String {
        self.decorate(format!("{}-{}", BACKEND_PREFIX, port))
    }
}

// Names are ASCII, so byte truncation is safe. A trailing '-' is not a valid
// last character.
fn truncate(mut name: String) -> String {
    if name.len() > MAX_NAME_LEN {
        name.truncate(MAX_NAME_LEN);
        while name.ends_with('-') {
            name.pop();
        }
    }
    name
}
