//! Off-route detection.

use crate::geo::Coordinate;
use crate::matcher::{self, RouteMatch};
use crate::route::Route;

/// Default lateral distance beyond which the rider counts as off-route.
pub const DEFAULT_OFF_ROUTE_THRESHOLD_M: f64 = 50.0;

/// True iff the position is more than `threshold_m` meters from the
/// nearest route segment.
pub fn is_off_route(position: &Coordinate, route: &Route, threshold_m: f64) -> bool {
    is_match_off_route(&matcher::match_position(position, route), threshold_m)
}

/// Off-route check for a position that has already been matched.
pub fn is_match_off_route(route_match: &RouteMatch, threshold_m: f64) -> bool {
    debug_assert!(threshold_m >= 0.0, "negative off-route threshold {threshold_m}");
    route_match.distance_m > threshold_m
}
