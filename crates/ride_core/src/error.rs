//! Errors surfaced to the person driving the session.
//!
//! `Display` of [`RideError`] is the message shown to the user.

use thiserror::Error;

use crate::geo::GeoPoint;

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("no route between {from} and {to}")]
    NoRoute { from: GeoPoint, to: GeoPoint },
    #[error("invalid coordinate {0}")]
    InvalidCoordinate(GeoPoint),
    #[error("routing backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum RideError {
    #[error("Please select both pickup and drop points on the map.")]
    MissingWaypoints,
    #[error("Routing error. Please try again or adjust points.")]
    Routing(#[from] RoutingError),
    #[error("Calculate route first.")]
    RouteNotCalculated,
    #[error("The route has no points; nothing to simulate.")]
    EmptyRoute,
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl RideError {
    /// Lower-level cause, for logs.
    pub fn detail(&self) -> Option<String> {
        match self {
            RideError::Routing(inner) => Some(inner.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(
            RideError::MissingWaypoints.to_string(),
            "Please select both pickup and drop points on the map."
        );
        assert_eq!(RideError::RouteNotCalculated.to_string(), "Calculate route first.");

        let err: RideError = RoutingError::Backend("timeout".into()).into();
        assert_eq!(err.to_string(), "Routing error. Please try again or adjust points.");
        assert_eq!(err.detail().as_deref(), Some("routing backend error: timeout"));
    }
}
