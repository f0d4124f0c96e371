//! Session setup: motion constants, fare rates, routing backend and start-point
//! sampling, all inserted into the ECS world as resources.

mod build;
mod params;

pub use build::build_world;
pub use params::{MotionConfig, ScenarioParams, SimulationEndTimeMs};
