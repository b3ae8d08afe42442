//! Remote wire representations of health-check resources.
//!
//! These mirror the JSON bodies of the compute API. The unified resource is a
//! discriminated union keyed by `type`: the remote side expects exactly one of
//! `httpHealthCheck`, `httpsHealthCheck` or `http2HealthCheck` to be set.
//! Nothing in this module enforces that; the domain conversion in
//! `healthchecks::value` does.
//!
//! # Surfaces
//! - [`HealthCheck`]: stable API.
//! - [`AlphaHealthCheck`]: advanced API, adds `portSpecification` to each probe.
//! - [`LegacyHealthCheck`]: the protocol-specific `httpHealthChecks` and
//!   `httpsHealthChecks` collections that predate the unified resource.

use serde::{Deserialize, Serialize};

use crate::healthchecks::Protocol;

/// Port specification value that binds a probe to the backend's serving port.
pub const USE_SERVING_PORT: &str = "USE_SERVING_PORT";

/// Port specification value that binds a probe to its `port` field.
pub const USE_FIXED_PORT: &str = "USE_FIXED_PORT";

fn is_zero(n: &i64) -> bool {
    *n == 0
}

/// Probe settings of an HTTP, HTTPS or HTTP/2 sub-object (stable API).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpProbe {
    #[serde(skip_serializing_if = "is_zero")]
    pub port: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub request_path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub host: String,
}

/// Probe settings on the advanced API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlphaHttpProbe {
    #[serde(skip_serializing_if = "is_zero")]
    pub port: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub port_specification: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub request_path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub host: String,
}

/// Unified health check, stable API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthCheck {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "type")]
    pub r#type: String,
    pub check_interval_sec: i64,
    pub timeout_sec: i64,
    pub healthy_threshold: i64,
    pub unhealthy_threshold: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_health_check: Option<HttpProbe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub https_health_check: Option<HttpProbe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http2_health_check: Option<HttpProbe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

/// Unified health check, advanced API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlphaHealthCheck {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "type")]
    pub r#type: String,
    pub check_interval_sec: i64,
    pub timeout_sec: i64,
    pub healthy_threshold: i64,
    pub unhealthy_threshold: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_health_check: Option<AlphaHttpProbe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub https_health_check: Option<AlphaHttpProbe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http2_health_check: Option<AlphaHttpProbe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

/// Legacy protocol-specific health check. The HTTP and HTTPS kinds share this shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegacyHealthCheck {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub host: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub port: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub request_path: String,
    pub check_interval_sec: i64,
    pub timeout_sec: i64,
    pub healthy_threshold: i64,
    pub unhealthy_threshold: i64,
}

impl HealthCheck {
    /// Protocol declared by the `type` discriminator.
    pub fn protocol(&self) -> Protocol {
        Protocol::from_wire_type(&self.r#type)
    }
}

impl AlphaHealthCheck {
    /// Protocol declared by the `type` discriminator.
    pub fn protocol(&self) -> Protocol {
        Protocol::from_wire_type(&self.r#type)
    }
}

/// Access to the fields every unified wire object carries for optimistic concurrency.
pub trait Fingerprinted {
    fn name(&self) -> &str;
    fn fingerprint(&self) -> Option<&str>;
    fn set_fingerprint(&mut self, fingerprint: Option<String>);
}

impl Fingerprinted for HealthCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    fn set_fingerprint(&mut self, fingerprint: Option<String>) {
        self.fingerprint = fingerprint;
    }
}

impl Fingerprinted for AlphaHealthCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    fn set_fingerprint(&mut self, fingerprint: Option<String>) {
        self.fingerprint = fingerprint;
    }
}

impl From<HttpProbe> for AlphaHttpProbe {
    fn from(probe: HttpProbe) -> Self {
        Self {
            port: probe.port,
            port_specification: String::new(),
            request_path: probe.request_path,
            host: probe.host,
        }
    }
}

// Drops the port specification: the stable API has no field for it.
impl From<AlphaHttpProbe> for HttpProbe {
    fn from(probe: AlphaHttpProbe) -> Self {
        Self {
            port: probe.port,
            request_path: probe.request_path,
            host: probe.host,
        }
    }
}

impl From<HealthCheck> for AlphaHealthCheck {
    fn from(hc: HealthCheck) -> Self {
        Self {
            name: hc.name,
            description: hc.description,
            r#type: hc.r#type,
            check_interval_sec: hc.check_interval_sec,
            timeout_sec: hc.timeout_sec,
            healthy_threshold: hc.healthy_threshold,
            unhealthy_threshold: hc.unhealthy_threshold,
            http_health_check: hc.http_health_check.map(Into::into),
            https_health_check: hc.https_health_check.map(Into::into),
            http2_health_check: hc.http2_health_check.map(Into::into),
            fingerprint: hc.fingerprint,
        }
    }
}

impl From<AlphaHealthCheck> for HealthCheck {
    fn from(hc: AlphaHealthCheck) -> Self {
        Self {
            name: hc.name,
            description: hc.description,
            r#type: hc.r#type,
            check_interval_sec: hc.check_interval_sec,
            timeout_sec: hc.timeout_sec,
            healthy_threshold: hc.healthy_threshold,
            unhealthy_threshold: hc.unhealthy_threshold,
            http_health_check: hc.http_health_check.map(Into::into),
            https_health_check: hc.https_health_check.map(Into::into),
            http2_health_check: hc.http2_health_check.map(Into::into),
            fingerprint: hc.fingerprint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_compute_body() {
        let body = r#"{
            "name": "k8s-be-80--uid",
            "type": "HTTPS",
            "checkIntervalSec": 60,
            "timeoutSec": 60,
            "healthyThreshold": 1,
            "unhealthyThreshold": 10,
            "httpsHealthCheck": {"port": 80, "requestPath": "/healthz"},
            "fingerprint": "abc123",
            "selfLink": "ignored"
        }"#;
        let hc: HealthCheck = serde_json::from_str(body).unwrap();
        assert_eq!(hc.protocol(), Protocol::Https);
        assert_eq!(hc.https_health_check.as_ref().unwrap().request_path, "/healthz");
        assert!(hc.http_health_check.is_none());
        assert_eq!(hc.fingerprint(), Some("abc123"));
    }

    #[test]
    fn test_serialize_omits_empty_sub_objects() {
        let hc = AlphaHealthCheck {
            name: "hc".into(),
            r#type: "HTTP2".into(),
            http2_health_check: Some(AlphaHttpProbe {
                port_specification: USE_SERVING_PORT.into(),
                request_path: "/".into(),
                ..Default::default()
            }),
            ..Default::default()
        };
        let json = serde_json::to_value(&hc).unwrap();
        assert_eq!(json["type"], "HTTP2");
        assert_eq!(json["http2HealthCheck"]["portSpecification"], USE_SERVING_PORT);
        assert!(json.get("httpHealthCheck").is_none());
        assert!(json.get("httpsHealthCheck").is_none());
        assert!(json["http2HealthCheck"].get("port").is_none());
    }

    #[test]
    fn test_stable_view_drops_port_specification() {
        let alpha = AlphaHealthCheck {
            name: "hc".into(),
            r#type: "HTTP".into(),
            http_health_check: Some(AlphaHttpProbe {
                port: 0,
                port_specification: USE_SERVING_PORT.into(),
                request_path: "/".into(),
                host: String::new(),
            }),
            ..Default::default()
        };
        let stable = HealthCheck::from(alpha.clone());
        assert_eq!(stable.http_health_check.as_ref().unwrap().request_path, "/");

        let back = AlphaHealthCheck::from(stable);
        assert!(back.http_health_check.unwrap().port_specification.is_empty());
    }
}
