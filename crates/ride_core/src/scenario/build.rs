use bevy_ecs::prelude::World;

use crate::clock::SimulationClock;
use crate::render::{MarkerRenderer, RendererResource};
use crate::routing::{build_route_provider, RouteProviderResource};
use crate::scenario::params::{ScenarioParams, SimulationEndTimeMs};
use crate::start::StartPointSampler;
use crate::telemetry::RideTelemetry;

/// Insert every resource the ride systems need.
///
/// Existing resources of the same types are replaced, so the same world can be
/// rebuilt with new params.
pub fn build_world(world: &mut World, params: &ScenarioParams, renderer: Box<dyn MarkerRenderer>) {
    world.insert_resource(SimulationClock::default());
    world.insert_resource(params.motion());
    world.insert_resource(params.fare);
    world.insert_resource(StartPointSampler::with_offset(
        params.seed,
        params.start_offset,
    ));
    world.insert_resource(RouteProviderResource(build_route_provider(
        &params.route_provider_kind,
    )));
    world.insert_resource(RendererResource(renderer));
    world.insert_resource(RideTelemetry::default());
    match params.simulation_end_time_ms {
        Some(end_ms) => world.insert_resource(SimulationEndTimeMs(end_ms)),
        None => {
            world.remove_resource::<SimulationEndTimeMs>();
        }
    }
}
