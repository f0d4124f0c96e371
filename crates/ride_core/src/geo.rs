//! Geographic primitives: points, great-circle distance and routes.
//!
//! Coordinates are WGS84 degrees. Distances use the haversine formula on a
//! sphere of radius [`EARTH_RADIUS_M`], which matches what map widgets report
//! for marker-to-marker distances.

use std::fmt;

use h3o::{CellIndex, LatLng, Resolution};
use serde::{Deserialize, Serialize};

/// Mean earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Haversine distance to `other` in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        let (lat1, lon1) = (self.lat.to_radians(), self.lng.to_radians());
        let (lat2, lon2) = (other.lat.to_radians(), other.lng.to_radians());
        let sin_dlat = ((lat2 - lat1) * 0.5).sin();
        let sin_dlon = ((lon2 - lon1) * 0.5).sin();
        let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
        let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
        EARTH_RADIUS_M * c
    }

    /// Linear interpolation in lat/lng space; `ratio` 0 yields `self`, 1 yields `to`.
    pub fn lerp(self, to: GeoPoint, ratio: f64) -> GeoPoint {
        GeoPoint {
            lat: self.lat + (to.lat - self.lat) * ratio,
            lng: self.lng + (to.lng - self.lng) * ratio,
        }
    }

    /// Shift by the given number of degrees.
    pub fn offset(self, dlat: f64, dlng: f64) -> GeoPoint {
        GeoPoint {
            lat: self.lat + dlat,
            lng: self.lng + dlng,
        }
    }

    /// Snap to the H3 cell containing this point. `None` for non-finite coordinates.
    pub fn to_cell(self, resolution: Resolution) -> Option<CellIndex> {
        LatLng::new(self.lat, self.lng)
            .ok()
            .map(|ll| ll.to_cell(resolution))
    }
}

impl From<LatLng> for GeoPoint {
    fn from(ll: LatLng) -> Self {
        Self::new(ll.lat(), ll.lng())
    }
}

impl From<CellIndex> for GeoPoint {
    fn from(cell: CellIndex) -> Self {
        LatLng::from(cell).into()
    }
}

/// Five decimals, the precision shown next to the pickup/drop pickers.
impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lng)
    }
}

/// Sum of haversine segment lengths along `points`.
pub fn path_length_m(points: &[GeoPoint]) -> f64 {
    points.windows(2).map(|w| w[0].distance_m(w[1])).sum()
}

/// Directional path from pickup to drop as produced by a routing backend.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Waypoints, pickup first.
    pub points: Vec<GeoPoint>,
    /// Road distance reported by the backend, in metres.
    pub distance_m: f64,
}

impl Route {
    /// Build a route whose distance is the geometric length of `points`.
    pub fn from_points(points: Vec<GeoPoint>) -> Self {
        let distance_m = path_length_m(&points);
        Self { points, distance_m }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn start(&self) -> Option<GeoPoint> {
        self.points.first().copied()
    }

    pub fn end(&self) -> Option<GeoPoint> {
        self.points.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_symmetric_and_zero_on_self() {
        let a = GeoPoint::new(17.3850, 78.4867);
        let b = GeoPoint::new(17.4000, 78.5000);
        assert_eq!(a.distance_m(a), 0.0);
        assert!((a.distance_m(b) - b.distance_m(a)).abs() < 1e-9);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 0.0);
        let d = a.distance_m(b);
        assert!((d - 111_195.0).abs() < 10.0, "got {d}");
    }

    #[test]
    fn lerp_hits_endpoints_and_midpoint() {
        let a = GeoPoint::new(10.0, 20.0);
        let b = GeoPoint::new(12.0, 24.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), GeoPoint::new(11.0, 22.0));
    }

    #[test]
    fn route_from_points_sums_segments() {
        let pts = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.01),
            GeoPoint::new(0.01, 0.01),
        ];
        let expected = pts[0].distance_m(pts[1]) + pts[1].distance_m(pts[2]);
        let route = Route::from_points(pts);
        assert!((route.distance_m - expected).abs() < 1e-9);
        assert_eq!(route.start(), Some(GeoPoint::new(0.0, 0.0)));
        assert_eq!(route.end(), Some(GeoPoint::new(0.01, 0.01)));
    }

    #[test]
    fn display_uses_five_decimals() {
        assert_eq!(GeoPoint::new(17.385, 78.4867).to_string(), "17.38500, 78.48670");
    }
}
