//! Geodesic primitives.
//!
//! Distance, bearing and point-to-segment projection on WGS84
//! coordinates (lat/lon in degrees). Distances use the haversine
//! formula on a spherical earth; projection uses a local planar
//! approximation scaled by latitude cosine.

use serde::{Deserialize, Serialize};

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// Earth radius in meters (WGS84 mean).
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Haversine distance between two coordinates in meters.
pub fn distance(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

    // Rounding can push h a hair above 1 for antipodal points
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Initial bearing from `from` toward `to` in degrees [0, 360).
///
/// 0 is north, clockwise positive. Returns 0 when both points coincide.
pub fn bearing(from: &Coordinate, to: &Coordinate) -> f64 {
    if from == to {
        return 0.0;
    }

    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let dlon = (to.lon - from.lon).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();

    let bearing = y.atan2(x).to_degrees();
    let normalized = (bearing + 360.0) % 360.0;
    // (-tiny + 360) % 360 rounds to exactly 360.0
    if normalized >= 360.0 { 0.0 } else { normalized }
}

/// Project `p` onto the segment `a`-`b`.
///
/// Returns the nearest point on the segment and the haversine distance
/// from `p` to it. The projection parameter is clamped to [0, 1], so the
/// result never lies on the segment's extension. A zero-length segment
/// yields `a` and the point-to-point distance.
pub fn closest_point_on_segment(
    p: &Coordinate,
    a: &Coordinate,
    b: &Coordinate,
) -> (Coordinate, f64) {
    let cos_lat = ((a.lat + b.lat) / 2.0).to_radians().cos();

    let dx = (b.lon - a.lon) * cos_lat;
    let dy = b.lat - a.lat;
    let px = (p.lon - a.lon) * cos_lat;
    let py = p.lat - a.lat;

    let seg_len_sq = dx * dx + dy * dy;

    if seg_len_sq < 1e-20 {
        return (*a, distance(p, a));
    }

    let t = ((px * dx + py * dy) / seg_len_sq).clamp(0.0, 1.0);

    let projected = Coordinate {
        lat: a.lat + t * (b.lat - a.lat),
        lon: a.lon + t * (b.lon - a.lon),
    };
    (projected, distance(p, &projected))
}
