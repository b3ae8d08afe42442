//! Stable and advanced API surfaces behind one interface.
//!
//! `Get` and `Sync` are written once, generic over [`ApiSurface`]; the
//! checker picks the implementation from the port binding.

use crate::cloud::wire::{self, AlphaHealthCheck, Fingerprinted};
use crate::cloud::{ApiResult, HealthCheckProvider};
use crate::healthchecks::errors::ConversionError;
use crate::healthchecks::value::HealthCheck;

pub(crate) trait ApiSurface {
    type Wire: Fingerprinted;

    /// Label used in logs.
    const VERSION: &'static str;

    fn encode(hc: &HealthCheck) -> Result<Self::Wire, ConversionError>;
    fn decode(wire: Self::Wire) -> HealthCheck;

    fn fetch(&self, name: &str) -> ApiResult<Self::Wire>;
    fn insert(&self, wire: &Self::Wire) -> ApiResult<()>;
    fn replace(&self, name: &str, wire: &Self::Wire) -> ApiResult<()>;
}

pub(crate) struct StableSurface<'a>(pub &'a dyn HealthCheckProvider);

pub(crate) struct AlphaSurface<'a>(pub &'a dyn HealthCheckProvider);

impl ApiSurface for StableSurface<'_> {
    type Wire = wire::HealthCheck;
    const VERSION: &'static str = "v1";

    fn encode(hc: &HealthCheck) -> Result<Self::Wire, ConversionError> {
        hc.to_wire()
    }

    fn decode(wire: Self::Wire) -> HealthCheck {
        HealthCheck::from_wire(wire)
    }

    fn fetch(&self, name: &str) -> ApiResult<Self::Wire> {
        self.0.get_health_check(name)
    }

    fn insert(&self, wire: &Self::Wire) -> ApiResult<()> {
        self.0.create_health_check(wire)
    }

    fn replace(&self, name: &str, wire: &Self::Wire) -> ApiResult<()> {
        self.0.update_health_check(name, wire)
    }
}

impl ApiSurface for AlphaSurface<'_> {
    type Wire = AlphaHealthCheck;
    const VERSION: &'static str = "alpha";

    fn encode(hc: &HealthCheck) -> Result<Self::Wire, ConversionError> {
        hc.to_alpha_wire()
    }

    fn decode(wire: Self::Wire) -> HealthCheck {
        HealthCheck::from_alpha_wire(wire)
    }

    fn fetch(&self, name: &str) -> ApiResult<Self::Wire> {
        self.0.get_alpha_health_check(name)
    }

    fn insert(&self, wire: &Self::Wire) -> ApiResult<()> {
        self.0.create_alpha_health_check(wire)
    }

    fn replace(&self, name: &str, wire: &Self::Wire) -> ApiResult<()> {
        self.0.update_alpha_health_check(name, wire)
    }
}
