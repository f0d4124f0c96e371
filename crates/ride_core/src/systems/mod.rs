pub mod animation_tick;
pub mod ride_phase;
