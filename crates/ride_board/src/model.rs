use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RideId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(pub u64);

impl fmt::Display for RideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A shared ride offered by a driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    pub id: RideId,
    pub driver_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    pub pickup: String,
    pub dest: String,
    /// Free text, usually `hh:mm` or an ISO timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub seats_available: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for [`crate::RideBoard::create_ride`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewRide {
    pub driver_name: String,
    pub vehicle: Option<String>,
    pub contact: Option<String>,
    pub pickup: String,
    pub dest: String,
    pub time: Option<String>,
    /// Defaults to one seat.
    pub seats_available: Option<u32>,
    pub notes: Option<String>,
}

impl NewRide {
    pub fn new(driver_name: impl Into<String>, pickup: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            driver_name: driver_name.into(),
            pickup: pickup.into(),
            dest: dest.into(),
            ..Default::default()
        }
    }

    pub fn with_vehicle(mut self, vehicle: impl Into<String>) -> Self {
        self.vehicle = Some(vehicle.into());
        self
    }

    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = Some(contact.into());
        self
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn with_seats(mut self, seats: u32) -> Self {
        self.seats_available = Some(seats);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub ride_id: RideId,
    pub rider_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rider_contact: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for [`crate::RideBoard::create_booking`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewBooking {
    pub ride_id: Option<RideId>,
    pub rider_name: String,
    pub rider_contact: Option<String>,
}

impl NewBooking {
    pub fn new(ride_id: RideId, rider_name: impl Into<String>) -> Self {
        Self {
            ride_id: Some(ride_id),
            rider_name: rider_name.into(),
            rider_contact: None,
        }
    }

    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.rider_contact = Some(contact.into());
        self
    }
}

/// Booking joined with the ride it reserves a seat on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: Booking,
    /// `None` once the ride is gone from the board.
    pub ride: Option<Ride>,
}

/// Search terms for [`crate::RideBoard::list_rides`]. Empty terms match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RideFilter {
    pub pickup: Option<String>,
    pub dest: Option<String>,
}

impl RideFilter {
    pub fn pickup(mut self, term: impl Into<String>) -> Self {
        self.pickup = Some(term.into());
        self
    }

    pub fn dest(mut self, term: impl Into<String>) -> Self {
        self.dest = Some(term.into());
        self
    }

    pub fn matches(&self, ride: &Ride) -> bool {
        field_matches(self.pickup.as_deref(), &ride.pickup)
            && field_matches(self.dest.as_deref(), &ride.dest)
    }
}

fn field_matches(term: Option<&str>, value: &str) -> bool {
    match term.map(str::trim) {
        None | Some("") => true,
        Some(term) => value.to_lowercase().contains(&term.to_lowercase()),
    }
}
