//! Straight-line distance estimates (fallback when routing is unavailable).
//!
//! Uses great-circle distance and an assumed travel speed. Less accurate than
//! a routing service (ignores roads and harbour crossings) but always available.

use crate::error::DistanceUnavailable;
use crate::model::{GeoPoint, TravelEstimate};
use crate::traits::DistanceProvider;

/// Average urban travel speed assumption for time estimation.
pub const DEFAULT_SPEED_KMH: f64 = 30.0;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometers.
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Haversine-based distance provider.
#[derive(Debug, Clone)]
pub struct StraightLine {
    /// Assumed average travel speed in km/h.
    pub speed_kmh: f64,
}

impl Default for StraightLine {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

impl StraightLine {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    pub fn leg(&self, from: GeoPoint, to: GeoPoint) -> TravelEstimate {
        let km = haversine_km(from, to);
        TravelEstimate {
            distance_km: km,
            duration_min: self.km_to_minutes(km),
        }
    }

    fn km_to_minutes(&self, km: f64) -> f64 {
        if self.speed_kmh <= 0.0 {
            return 0.0;
        }
        km / self.speed_kmh * 60.0
    }
}

impl DistanceProvider for StraightLine {
    fn estimate(&self, from: GeoPoint, to: GeoPoint) -> Result<TravelEstimate, DistanceUnavailable> {
        Ok(self.leg(from, to))
    }
}

/// Provider that never answers; every leg falls back to straight-line.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRouting;

impl DistanceProvider for NoRouting {
    fn estimate(&self, _from: GeoPoint, _to: GeoPoint) -> Result<TravelEstimate, DistanceUnavailable> {
        Err(DistanceUnavailable::new("no routing service configured"))
    }
}
