//! Shared-ride board: drivers post rides, riders book seats.

pub mod board;
pub mod error;
pub mod model;

pub use board::RideBoard;
pub use error::BoardError;
pub use model::{Booking, BookingId, BookingView, NewBooking, NewRide, Ride, RideFilter, RideId};
