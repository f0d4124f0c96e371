//! In-memory ride board with JSON snapshots.
//!
//! Drivers post rides, riders book seats. Listings are newest first; a booking
//! takes one seat and fails once none are left.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::BoardError;
use crate::model::{Booking, BookingId, BookingView, NewBooking, NewRide, Ride, RideFilter, RideId};

const RIDE_REQUIRED_FIELDS: &str = "driverName, pickup, dest";
const BOOKING_REQUIRED_FIELDS: &str = "rideId, riderName";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RideBoard {
    next_id: u64,
    rides: Vec<Ride>,
    bookings: Vec<Booking>,
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

impl RideBoard {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn create_ride(&mut self, input: NewRide) -> Result<Ride, BoardError> {
        if is_blank(&input.driver_name) || is_blank(&input.pickup) || is_blank(&input.dest) {
            return Err(BoardError::MissingFields(RIDE_REQUIRED_FIELDS.to_string()));
        }
        let ride = Ride {
            id: RideId(self.allocate_id()),
            driver_name: input.driver_name,
            vehicle: input.vehicle,
            contact: input.contact,
            pickup: input.pickup,
            dest: input.dest,
            time: input.time,
            seats_available: input.seats_available.unwrap_or(1),
            notes: input.notes,
            created_at: Utc::now(),
        };
        info!(id = %ride.id, pickup = %ride.pickup, dest = %ride.dest, "ride posted");
        self.rides.push(ride.clone());
        Ok(ride)
    }

    pub fn ride(&self, id: RideId) -> Option<&Ride> {
        self.rides.iter().find(|r| r.id == id)
    }

    /// Rides matching `filter`, newest first.
    pub fn list_rides(&self, filter: &RideFilter) -> Vec<Ride> {
        let mut rides: Vec<Ride> = self
            .rides
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        rides.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rides
    }

    /// Reserve one seat on a ride.
    pub fn create_booking(&mut self, input: NewBooking) -> Result<Booking, BoardError> {
        let ride_id = match input.ride_id {
            Some(id) if !is_blank(&input.rider_name) => id,
            _ => return Err(BoardError::MissingFields(BOOKING_REQUIRED_FIELDS.to_string())),
        };
        let ride = self
            .rides
            .iter_mut()
            .find(|r| r.id == ride_id)
            .ok_or(BoardError::RideNotFound(ride_id))?;
        if ride.seats_available == 0 {
            debug!(ride = %ride_id, "booking refused, ride is full");
            return Err(BoardError::NoSeatsAvailable);
        }
        ride.seats_available = ride.seats_available.saturating_sub(1);
        let seats_left = ride.seats_available;

        let booking = Booking {
            id: BookingId(self.allocate_id()),
            ride_id,
            rider_name: input.rider_name,
            rider_contact: input.rider_contact,
            created_at: Utc::now(),
        };
        info!(id = %booking.id, ride = %ride_id, seats_left, "seat booked");
        self.bookings.push(booking.clone());
        Ok(booking)
    }

    /// Every booking, newest first, with its ride when it still exists.
    pub fn list_bookings(&self) -> Vec<BookingView> {
        let mut bookings: Vec<&Booking> = self.bookings.iter().collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        bookings
            .into_iter()
            .map(|booking| BookingView {
                booking: booking.clone(),
                ride: self.ride(booking.ride_id).cloned(),
            })
            .collect()
    }

    /// Post a handful of rides around Hyderabad so an empty board has something to show.
    pub fn seed_demo(&mut self) -> Result<Vec<Ride>, BoardError> {
        let demo = [
            NewRide::new("Ravi", "Hitech City", "Charminar")
                .with_vehicle("Car")
                .with_time("08:30")
                .with_seats(3),
            NewRide::new("Asha", "Secunderabad", "Gachibowli")
                .with_vehicle("Bike")
                .with_time("09:15"),
            NewRide::new("Imran", "Banjara Hills", "RGIA Airport")
                .with_vehicle("Auto")
                .with_time("18:00")
                .with_seats(2)
                .with_notes("Space for one suitcase"),
        ];
        demo.into_iter().map(|ride| self.create_ride(ride)).collect()
    }

    pub fn rides_len(&self) -> usize {
        self.rides.len()
    }

    pub fn bookings_len(&self) -> usize {
        self.bookings.len()
    }

    pub fn load(path: &Path) -> Result<Self, BoardError> {
        let contents = fs::read_to_string(path)?;
        let mut board: Self = serde_json::from_str(&contents)?;
        // Snapshots may omit `nextId`; never hand out an id already in use.
        let highest = board
            .rides
            .iter()
            .map(|r| r.id.0)
            .chain(board.bookings.iter().map(|b| b.id.0))
            .max()
            .unwrap_or(0);
        board.next_id = board.next_id.max(highest);
        debug!(path = %path.display(), rides = board.rides.len(), "board loaded");
        Ok(board)
    }

    /// Like [`Self::load`], but a missing file gives an empty board.
    pub fn load_or_default(path: &Path) -> Result<Self, BoardError> {
        match Self::load(path) {
            Err(BoardError::Io(err)) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            other => other,
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), BoardError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        debug!(path = %path.display(), rides = self.rides.len(), "board saved");
        Ok(())
    }
}
