pub mod animation;
pub mod clock;
pub mod ecs;
pub mod error;
pub mod geo;
pub mod phase;
pub mod pricing;
pub mod render;
pub mod routing;
pub mod runner;
pub mod scenario;
pub mod session;
pub mod start;
pub mod systems;
pub mod telemetry;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
