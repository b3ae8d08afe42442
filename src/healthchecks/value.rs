//! Domain representation of a health check and its wire conversion.
//!
//! # Responsibilities
//! - Hold one health check as the reconciler reasons about it
//! - Encode it onto the stable or advanced wire format
//! - Decode remote objects tolerantly
//!
//! # Design Decisions
//! - The probe sub-object is chosen by `protocol` alone; encoding fills exactly
//!   one slot and decoding reads exactly one slot
//! - `PortBinding` makes "fixed port" and "serving port" mutually exclusive
//! - The fingerprint is only ever set from a remote read

use std::fmt;
use std::str::FromStr;

use crate::cloud::wire::{self, AlphaHealthCheck, AlphaHttpProbe, USE_FIXED_PORT, USE_SERVING_PORT};
use crate::config::HealthCheckDefaults;
use crate::healthchecks::errors::ConversionError;

/// Application protocol probed by a health check.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Protocol {
    Http,
    Https,
    Http2,
    /// Any other wire `type`, kept verbatim so reads never fail.
    Unsupported(String),
}

impl Protocol {
    /// Wire value of the `type` discriminator.
    pub fn as_str(&self) -> &str {
        match self {
            Protocol::Http => "HTTP",
            Protocol::Https => "HTTPS",
            Protocol::Http2 => "HTTP2",
            Protocol::Unsupported(other) => other,
        }
    }

    /// Interpret a wire `type`. Unknown values become [`Protocol::Unsupported`].
    pub fn from_wire_type(s: &str) -> Self {
        match s {
            "HTTP" => Protocol::Http,
            "HTTPS" => Protocol::Https,
            "HTTP2" => Protocol::Http2,
            other => Protocol::Unsupported(other.to_string()),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Protocol::from_wire_type(&s.to_ascii_uppercase()) {
            Protocol::Unsupported(_) => Err(ConversionError::UnsupportedProtocol(s.to_string())),
            protocol => Ok(protocol),
        }
    }
}

/// How the probe picks the port it connects to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortBinding {
    /// Probe a statically configured port.
    Fixed(i64),
    /// Probe whatever port the backend is serving on.
    UseServingPort,
}

/// One health check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheck {
    pub name: String,
    pub description: String,
    pub protocol: Protocol,
    pub port_binding: PortBinding,
    pub request_path: String,
    /// Host header sent with the probe; empty means the backend's IP.
    pub host: String,
    pub check_interval_sec: i64,
    pub timeout_sec: i64,
    pub healthy_threshold: i64,
    pub unhealthy_threshold: i64,
    fingerprint: Option<String>,
}

impl HealthCheck {
    /// A fixed-port check with the configured defaults and no name.
    pub fn default_for(port: i64, protocol: Protocol, defaults: &HealthCheckDefaults) -> Self {
        Self {
            name: String::new(),
            description: defaults.description.clone(),
            protocol,
            port_binding: PortBinding::Fixed(port),
            request_path: defaults.request_path.clone(),
            host: String::new(),
            check_interval_sec: defaults.check_interval_sec,
            timeout_sec: defaults.timeout_sec,
            healthy_threshold: defaults.healthy_threshold,
            unhealthy_threshold: defaults.unhealthy_threshold,
            fingerprint: None,
        }
    }

    pub fn protocol(&self) -> &Protocol {
        &self.protocol
    }

    /// Probed port, `0` when bound to the serving port.
    pub fn port(&self) -> i64 {
        match self.port_binding {
            PortBinding::Fixed(port) => port,
            PortBinding::UseServingPort => 0,
        }
    }

    /// True when the check only exists on the advanced API.
    pub fn uses_serving_port(&self) -> bool {
        self.port_binding == PortBinding::UseServingPort
    }

    /// Fingerprint of the remote object this value was read from.
    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    pub(crate) fn set_fingerprint(&mut self, fingerprint: Option<String>) {
        self.fingerprint = fingerprint;
    }

    /// Encode for the advanced API.
    pub fn to_alpha_wire(&self) -> Result<AlphaHealthCheck, ConversionError> {
        if self.timeout_sec > self.check_interval_sec {
            return Err(ConversionError::TimeoutExceedsInterval {
                timeout_sec: self.timeout_sec,
                check_interval_sec: self.check_interval_sec,
            });
        }

        let probe = match self.port_binding {
            PortBinding::Fixed(port) => AlphaHttpProbe {
                port,
                port_specification: String::new(),
                request_path: self.request_path.clone(),
                host: self.host.clone(),
            },
            PortBinding::UseServingPort => AlphaHttpProbe {
                port: 0,
                port_specification: USE_SERVING_PORT.to_string(),
                request_path: self.request_path.clone(),
                host: self.host.clone(),
            },
        };
        let (http, https, http2) = union_slots(&self.protocol, probe)?;

        Ok(AlphaHealthCheck {
            name: self.name.clone(),
            description: self.description.clone(),
            r#type: self.protocol.as_str().to_string(),
            check_interval_sec: self.check_interval_sec,
            timeout_sec: self.timeout_sec,
            healthy_threshold: self.healthy_threshold,
            unhealthy_threshold: self.unhealthy_threshold,
            http_health_check: http,
            https_health_check: https,
            http2_health_check: http2,
            fingerprint: self.fingerprint.clone(),
        })
    }

    /// Encode for the stable API.
    pub fn to_wire(&self) -> Result<wire::HealthCheck, ConversionError> {
        if self.uses_serving_port() {
            return Err(ConversionError::PortSpecificationRequiresAlpha);
        }
        self.to_alpha_wire().map(wire::HealthCheck::from)
    }

    /// Decode an advanced API object.
    pub fn from_alpha_wire(hc: AlphaHealthCheck) -> Self {
        let protocol = Protocol::from_wire_type(&hc.r#type);
        let probe = active_slot(
            &protocol,
            hc.http_health_check,
            hc.https_health_check,
            hc.http2_health_check,
        )
        .unwrap_or_default();

        let port_binding = match probe.port_specification.as_str() {
            USE_SERVING_PORT => PortBinding::UseServingPort,
            "" | USE_FIXED_PORT => PortBinding::Fixed(probe.port),
            other => {
                // Writing this value back replaces the specification with a fixed port.
                tracing::warn!(
                    name = %hc.name,
                    port_specification = other,
                    port = probe.port,
                    "Unrecognized port specification, reading as fixed port"
                );
                PortBinding::Fixed(probe.port)
            }
        };

        Self {
            name: hc.name,
            description: hc.description,
            protocol,
            port_binding,
            request_path: probe.request_path,
            host: probe.host,
            check_interval_sec: hc.check_interval_sec,
            timeout_sec: hc.timeout_sec,
            healthy_threshold: hc.healthy_threshold,
            unhealthy_threshold: hc.unhealthy_threshold,
            fingerprint: hc.fingerprint,
        }
    }

    /// Decode a stable API object.
    pub fn from_wire(hc: wire::HealthCheck) -> Self {
        Self::from_alpha_wire(hc.into())
    }
}

/// Put `probe` in the slot for `protocol` and leave the other two empty.
fn union_slots<T>(
    protocol: &Protocol,
    probe: T,
) -> Result<(Option<T>, Option<T>, Option<T>), ConversionError> {
    match protocol {
        Protocol::Http => Ok((Some(probe), None, None)),
        Protocol::Https => Ok((None, Some(probe), None)),
        Protocol::Http2 => Ok((None, None, Some(probe))),
        Protocol::Unsupported(other) => Err(ConversionError::UnsupportedProtocol(other.clone())),
    }
}

fn active_slot<T>(
    protocol: &Protocol,
    http: Option<T>,
    https: Option<T>,
    http2: Option<T>,
) -> Option<T> {
    match protocol {
        Protocol::Http => http,
        Protocol::Https => https,
        Protocol::Http2 => http2,
        Protocol::Unsupported(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::wire::HttpProbe;

    const PROTOCOLS: [Protocol; 3] = [Protocol::Http, Protocol::Https, Protocol::Http2];

    fn named(port: i64, protocol: Protocol) -> HealthCheck {
        let mut hc = HealthCheck::default_for(port, protocol, &HealthCheckDefaults::default());
        hc.name = format!("k8s-be-{}", port);
        hc
    }

    #[test]
    fn test_default_for() {
        let hc = HealthCheck::default_for(
            3000,
            Protocol::Https,
            &HealthCheckDefaults::with_request_path("/healthz"),
        );
        assert!(hc.name.is_empty());
        assert_eq!(hc.port(), 3000);
        assert_eq!(hc.protocol(), &Protocol::Https);
        assert_eq!(hc.request_path, "/healthz");
        assert_eq!(hc.check_interval_sec, 60);
        assert_eq!(hc.timeout_sec, 60);
        assert_eq!(hc.healthy_threshold, 1);
        assert_eq!(hc.unhealthy_threshold, 10);
        assert!(hc.fingerprint().is_none());
    }

    #[test]
    fn test_round_trip_stable() {
        for protocol in PROTOCOLS {
            let mut hc = named(8080, protocol);
            hc.host = "example.com".into();
            let wire = hc.to_wire().unwrap();
            assert_eq!(HealthCheck::from_wire(wire), hc);
        }
    }

    #[test]
    fn test_round_trip_alpha_serving_port() {
        for protocol in PROTOCOLS {
            let mut hc = named(8000, protocol);
            hc.port_binding = PortBinding::UseServingPort;
            let wire = hc.to_alpha_wire().unwrap();
            assert_eq!(HealthCheck::from_alpha_wire(wire), hc);
        }
    }

    #[test]
    fn test_exactly_one_sub_object() {
        let wire = named(80, Protocol::Https).to_wire().unwrap();
        assert_eq!(wire.r#type, "HTTPS");
        assert!(wire.http_health_check.is_none());
        assert!(wire.http2_health_check.is_none());
        let probe = wire.https_health_check.unwrap();
        assert_eq!(probe.port, 80);
        assert_eq!(probe.request_path, "/");

        let wire = named(80, Protocol::Http2).to_alpha_wire().unwrap();
        assert!(wire.http_health_check.is_none());
        assert!(wire.https_health_check.is_none());
        assert!(wire.http2_health_check.is_some());
    }

    #[test]
    fn test_protocol_change_moves_probe() {
        let mut hc = named(80, Protocol::Http);
        hc.request_path = "/my-probes-health".into();
        hc.protocol = Protocol::Https;

        let wire = hc.to_wire().unwrap();
        assert!(wire.http_health_check.is_none());
        assert_eq!(wire.https_health_check.unwrap().request_path, "/my-probes-health");
    }

    #[test]
    fn test_serving_port_encoding() {
        let mut hc = named(8000, Protocol::Http);
        hc.port_binding = PortBinding::UseServingPort;

        let alpha = hc.to_alpha_wire().unwrap();
        let probe = alpha.http_health_check.unwrap();
        assert_eq!(probe.port, 0);
        assert_eq!(probe.port_specification, USE_SERVING_PORT);

        assert_eq!(hc.to_wire(), Err(ConversionError::PortSpecificationRequiresAlpha));
    }

    #[test]
    fn test_unsupported_protocol() {
        let hc = named(80, Protocol::Unsupported("TCP".into()));
        assert_eq!(
            hc.to_wire(),
            Err(ConversionError::UnsupportedProtocol("TCP".into()))
        );
    }

    #[test]
    fn test_timeout_exceeds_interval() {
        let mut hc = named(80, Protocol::Http);
        hc.timeout_sec = 120;
        assert!(matches!(
            hc.to_alpha_wire(),
            Err(ConversionError::TimeoutExceedsInterval { timeout_sec: 120, .. })
        ));
    }

    #[test]
    fn test_tolerant_read() {
        // Declared HTTPS but only the HTTP sub-object present.
        let wire = wire::HealthCheck {
            name: "hc".into(),
            r#type: "HTTPS".into(),
            check_interval_sec: 5,
            timeout_sec: 5,
            http_health_check: Some(HttpProbe {
                port: 80,
                request_path: "/ignored".into(),
                host: String::new(),
            }),
            fingerprint: Some("f1".into()),
            ..Default::default()
        };
        let hc = HealthCheck::from_wire(wire);
        assert_eq!(hc.protocol(), &Protocol::Https);
        assert_eq!(hc.port(), 0);
        assert!(hc.request_path.is_empty());
        assert_eq!(hc.check_interval_sec, 5);
        assert_eq!(hc.fingerprint(), Some("f1"));

        let hc = HealthCheck::from_wire(wire::HealthCheck {
            r#type: "TCP".into(),
            ..Default::default()
        });
        assert_eq!(hc.protocol(), &Protocol::Unsupported("TCP".into()));
    }

    #[test]
    fn test_other_port_specifications_read_as_fixed() {
        for spec in [USE_FIXED_PORT, "USE_NAMED_PORT"] {
            let hc = HealthCheck::from_alpha_wire(AlphaHealthCheck {
                name: "hc".into(),
                r#type: "HTTP".into(),
                http_health_check: Some(AlphaHttpProbe {
                    port: 8080,
                    port_specification: spec.into(),
                    ..Default::default()
                }),
                ..Default::default()
            });
            assert_eq!(hc.port_binding, PortBinding::Fixed(8080));
            assert!(!hc.uses_serving_port());
        }
    }

    #[test]
    fn test_fingerprint_carried_to_wire() {
        let mut hc = named(80, Protocol::Http);
        hc.set_fingerprint(Some("abc".into()));
        assert_eq!(hc.to_wire().unwrap().fingerprint.as_deref(), Some("abc"));
    }

    #[test]
    fn test_protocol_parse() {
        assert_eq!("https".parse::<Protocol>().unwrap(), Protocol::Https);
        assert_eq!("HTTP2".parse::<Protocol>().unwrap(), Protocol::Http2);
        assert!("tcp".parse::<Protocol>().is_err());
        assert_eq!(Protocol::Http.to_string(), "HTTP");
    }
}
