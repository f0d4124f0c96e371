#![allow(dead_code)]

use ride_core::geo::GeoPoint;
use ride_core::render::RecordingRenderer;
use ride_core::routing::RouteProvider;
use ride_core::scenario::ScenarioParams;
use ride_core::session::RideSession;
use ride_core::test_helpers::{test_params, TEST_DROP, TEST_PICKUP};

/// Upper bound on processed events for a whole demo ride.
pub const MAX_STEPS: usize = 1_000_000;

/// Builder for sessions used across integration tests.
pub struct TestSessionBuilder {
    params: ScenarioParams,
    provider: Option<Box<dyn RouteProvider>>,
}

impl Default for TestSessionBuilder {
    fn default() -> Self {
        Self {
            params: test_params(),
            provider: None,
        }
    }
}

impl TestSessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(mut self, params: ScenarioParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_frame_interval_ms(mut self, frame_interval_ms: u64) -> Self {
        self.params.frame_interval_ms = frame_interval_ms;
        self
    }

    pub fn with_route_provider(mut self, provider: Box<dyn RouteProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn build(self) -> (RideSession, RecordingRenderer) {
        let renderer = RecordingRenderer::new();
        let mut session =
            RideSession::new(&self.params, Box::new(renderer.clone())).expect("valid params");
        if let Some(provider) = self.provider {
            session = session.with_route_provider(provider);
        }
        (session, renderer)
    }
}

/// Select the standard pickup and drop.
pub fn select_test_points(session: &mut RideSession) {
    session.select_point(TEST_PICKUP);
    session.select_point(TEST_DROP);
}

/// Session with points selected, route calculated and ride confirmed.
pub fn confirmed_session(builder: TestSessionBuilder) -> (RideSession, RecordingRenderer) {
    let (mut session, renderer) = builder.build();
    select_test_points(&mut session);
    session.calculate_route().expect("route");
    session.confirm_ride("bike").expect("confirmation");
    (session, renderer)
}

pub fn approx_eq(a: GeoPoint, b: GeoPoint) -> bool {
    (a.lat - b.lat).abs() < 1e-9 && (a.lng - b.lng).abs() < 1e-9
}
