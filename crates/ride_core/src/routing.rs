//! Pluggable route providers: trait abstraction for routing backends.
//!
//! Implementations, selectable via [`RouteProviderKind`]:
//!
//! - **`H3GridRouteProvider`**: walks the H3 grid between pickup and drop and
//!   uses cell centres as waypoints. Offline, no dependencies.
//! - **`OsrmRouteProvider`** (feature `osrm`): calls a local/remote OSRM HTTP endpoint.
//!
//! [`CachedRouteProvider`] wraps any provider with an LRU cache and an optional
//! fallback to the grid provider.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use bevy_ecs::prelude::Resource;
use h3o::Resolution;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::RoutingError;
use crate::geo::{GeoPoint, Route};

/// Which routing backend to use.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub enum RouteProviderKind {
    /// H3 grid path, zero external dependencies.
    #[default]
    H3Grid,
    /// OSRM HTTP endpoint (e.g. `"https://router.project-osrm.org"`).
    #[cfg(feature = "osrm")]
    Osrm { endpoint: String },
}

/// Routing backend. Must be `Send + Sync` so it can live in the ECS world.
pub trait RouteProvider: Send + Sync {
    /// Directional route from `from` to `to`, `from` first.
    fn route(&self, from: GeoPoint, to: GeoPoint) -> Result<Route, RoutingError>;
}

/// ECS resource wrapping a boxed route provider.
#[derive(Resource)]
pub struct RouteProviderResource(pub Box<dyn RouteProvider>);

// ---------------------------------------------------------------------------
// H3 Grid provider (always available)
// ---------------------------------------------------------------------------

/// Routes along the H3 hexagonal grid.
///
/// The waypoints are the exact pickup, the centres of the intermediate cells on
/// the grid path, and the exact drop. Distance is the haversine length of that
/// polyline.
#[derive(Debug, Clone, Copy)]
pub struct H3GridRouteProvider {
    resolution: Resolution,
}

impl Default for H3GridRouteProvider {
    fn default() -> Self {
        // ~170 m edges: fine enough to look like streets at city zoom.
        Self {
            resolution: Resolution::Nine,
        }
    }
}

impl H3GridRouteProvider {
    pub fn new(resolution: Resolution) -> Self {
        Self { resolution }
    }
}

impl RouteProvider for H3GridRouteProvider {
    fn route(&self, from: GeoPoint, to: GeoPoint) -> Result<Route, RoutingError> {
        let from_cell = from
            .to_cell(self.resolution)
            .ok_or(RoutingError::InvalidCoordinate(from))?;
        let to_cell = to
            .to_cell(self.resolution)
            .ok_or(RoutingError::InvalidCoordinate(to))?;

        let cells = from_cell
            .grid_path_cells(to_cell)
            .map_err(|_| RoutingError::NoRoute { from, to })?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| RoutingError::NoRoute { from, to })?;

        let mut points = Vec::with_capacity(cells.len() + 2);
        points.push(from);
        if cells.len() > 2 {
            points.extend(cells[1..cells.len() - 1].iter().map(|&c| GeoPoint::from(c)));
        }
        points.push(to);
        Ok(Route::from_points(points))
    }
}

// ---------------------------------------------------------------------------
// OSRM provider (behind `osrm` feature)
// ---------------------------------------------------------------------------

#[cfg(feature = "osrm")]
pub mod osrm {
    use super::*;
    use reqwest::blocking::Client;
    use std::time::Duration;

    const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

    /// Routes via an OSRM HTTP endpoint.
    pub struct OsrmRouteProvider {
        client: Client,
        endpoint: String,
    }

    impl OsrmRouteProvider {
        pub fn new(endpoint: &str) -> Result<Self, RoutingError> {
            let client = Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .map_err(|err| RoutingError::Backend(err.to_string()))?;
            Ok(Self {
                client,
                endpoint: endpoint.trim_end_matches('/').to_string(),
            })
        }
    }

    /// Minimal OSRM JSON response structures.
    #[derive(Deserialize)]
    struct OsrmResponse {
        code: String,
        routes: Option<Vec<OsrmRoute>>,
    }

    #[derive(Deserialize)]
    struct OsrmRoute {
        distance: f64, // metres
        geometry: OsrmGeometry,
    }

    #[derive(Deserialize)]
    struct OsrmGeometry {
        coordinates: Vec<Vec<f64>>, // [lng, lat]
    }

    impl RouteProvider for OsrmRouteProvider {
        fn route(&self, from: GeoPoint, to: GeoPoint) -> Result<Route, RoutingError> {
            let url = format!(
                "{}/route/v1/driving/{},{};{},{}?overview=full&geometries=geojson",
                self.endpoint, from.lng, from.lat, to.lng, to.lat,
            );

            let resp: OsrmResponse = self
                .client
                .get(&url)
                .send()
                .and_then(|r| r.json())
                .map_err(|err| RoutingError::Backend(err.to_string()))?;

            if resp.code != "Ok" {
                return Err(RoutingError::NoRoute { from, to });
            }

            let route = resp
                .routes
                .and_then(|routes| routes.into_iter().next())
                .ok_or(RoutingError::NoRoute { from, to })?;

            let points = route
                .geometry
                .coordinates
                .iter()
                .filter(|c| c.len() >= 2)
                .map(|c| GeoPoint::new(c[1], c[0])) // OSRM returns [lng, lat]
                .collect();

            Ok(Route {
                points,
                distance_m: route.distance,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Caching wrapper
// ---------------------------------------------------------------------------

type RouteKey = (u64, u64, u64, u64);

fn route_key(from: GeoPoint, to: GeoPoint) -> RouteKey {
    (
        from.lat.to_bits(),
        from.lng.to_bits(),
        to.lat.to_bits(),
        to.lng.to_bits(),
    )
}

/// LRU-cached wrapper around any [`RouteProvider`].
///
/// Cache key is the exact `(from, to)` coordinate pair (directional). On inner
/// failure the optional fallback ([`H3GridRouteProvider`]) is tried. Failures
/// are not cached.
pub struct CachedRouteProvider {
    inner: Box<dyn RouteProvider>,
    cache: Mutex<LruCache<RouteKey, Route>>,
    fallback_to_h3: bool,
}

impl CachedRouteProvider {
    pub fn new(inner: Box<dyn RouteProvider>, capacity: usize, fallback_to_h3: bool) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
            fallback_to_h3,
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl RouteProvider for CachedRouteProvider {
    fn route(&self, from: GeoPoint, to: GeoPoint) -> Result<Route, RoutingError> {
        let key = route_key(from, to);

        if let Ok(mut cache) = self.cache.lock() {
            if let Some(cached) = cache.get(&key) {
                return Ok(cached.clone());
            }
        }

        let result = match self.inner.route(from, to) {
            Ok(route) => Ok(route),
            Err(err) if self.fallback_to_h3 => {
                warn!(error = %err, "route provider failed, falling back to H3 grid");
                H3GridRouteProvider::default().route(from, to)
            }
            Err(err) => Err(err),
        };

        if let Ok(ref route) = result {
            if let Ok(mut cache) = self.cache.lock() {
                cache.put(key, route.clone());
            }
        }

        result
    }
}

// ---------------------------------------------------------------------------
// Factory: build a provider from RouteProviderKind
// ---------------------------------------------------------------------------

/// Default route cache capacity for remote providers.
#[cfg(feature = "osrm")]
const DEFAULT_ROUTE_CACHE_CAPACITY: usize = 1_000;

/// Construct a boxed [`RouteProvider`] from a [`RouteProviderKind`] descriptor.
///
/// `Osrm` is wrapped in a [`CachedRouteProvider`] with H3 fallback; if the HTTP
/// client cannot be built the grid provider is used instead.
pub fn build_route_provider(kind: &RouteProviderKind) -> Box<dyn RouteProvider> {
    match kind {
        RouteProviderKind::H3Grid => Box::new(H3GridRouteProvider::default()),

        #[cfg(feature = "osrm")]
        RouteProviderKind::Osrm { endpoint } => match osrm::OsrmRouteProvider::new(endpoint) {
            Ok(provider) => Box::new(CachedRouteProvider::new(
                Box::new(provider),
                DEFAULT_ROUTE_CACHE_CAPACITY,
                true,
            )),
            Err(err) => {
                warn!(error = %err, endpoint = %endpoint, "failed to build OSRM client, using H3 grid");
                Box::new(H3GridRouteProvider::default())
            }
        },
    }
}
