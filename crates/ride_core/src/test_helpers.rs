//! Test helpers for common test setup and utilities.

use crate::error::RoutingError;
use crate::geo::{GeoPoint, Route};
use crate::render::RecordingRenderer;
use crate::routing::RouteProvider;
use crate::scenario::ScenarioParams;
use crate::session::RideSession;

/// Hyderabad city centre, the demo's default map view.
pub const TEST_PICKUP: GeoPoint = GeoPoint::new(17.3850, 78.4867);

/// A drop a couple of kilometres north-east of [`TEST_PICKUP`].
pub const TEST_DROP: GeoPoint = GeoPoint::new(17.4050, 78.5000);

/// Routes along a fixed polyline regardless of the requested endpoints.
pub struct FixedRouteProvider(pub Route);

impl RouteProvider for FixedRouteProvider {
    fn route(&self, _from: GeoPoint, _to: GeoPoint) -> Result<Route, RoutingError> {
        Ok(self.0.clone())
    }
}

/// Always fails, like a backend that finds no road connection.
pub struct UnroutableProvider;

impl RouteProvider for UnroutableProvider {
    fn route(&self, from: GeoPoint, to: GeoPoint) -> Result<Route, RoutingError> {
        Err(RoutingError::NoRoute { from, to })
    }
}

/// Deterministic params: fixed seed, demo speeds and dwell.
pub fn test_params() -> ScenarioParams {
    ScenarioParams::default().with_seed(42)
}

/// Session wired to a recording renderer; the returned handle shares its log.
///
/// # Panics
///
/// Panics if [`test_params`] stops validating (should never happen).
pub fn test_session() -> (RideSession, RecordingRenderer) {
    let renderer = RecordingRenderer::new();
    let session = RideSession::new(&test_params(), Box::new(renderer.clone()))
        .expect("test params should be valid");
    (session, renderer)
}
