//! Route matching.
//!
//! Projects a live position onto the nearest segment of a route and
//! reports the perpendicular offset and the distance travelled along
//! the route.

use serde::Serialize;

use crate::geo::{self, Coordinate};
use crate::route::Route;

/// Result of projecting a position onto a route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteMatch {
    /// Nearest point on the route.
    pub point: Coordinate,
    /// Index of the start point of the matched segment (0-based).
    pub segment_index: usize,
    /// Distance from the position to the nearest point, in meters.
    pub distance_m: f64,
    /// Distance along the route from the start to the projected point, in meters.
    pub distance_along_m: f64,
}

/// Project a position onto the nearest segment of a route.
///
/// Every segment is tested; ties go to the lowest segment index.
pub fn match_position(position: &Coordinate, route: &Route) -> RouteMatch {
    let (segment_index, point, distance_m) = closest_segment(position, route);
    let start = route.point(segment_index);

    RouteMatch {
        point,
        segment_index,
        distance_m,
        distance_along_m: route.distance_at(segment_index) + geo::distance(start, &point),
    }
}

/// Index of the segment nearest to `position`.
pub fn find_closest_segment_index(position: &Coordinate, route: &Route) -> usize {
    closest_segment(position, route).0
}

/// Distance-along-route of `position` once projected onto the route.
pub fn distance_along(position: &Coordinate, route: &Route) -> f64 {
    match_position(position, route).distance_along_m
}

fn closest_segment(position: &Coordinate, route: &Route) -> (usize, Coordinate, f64) {
    let points = route.points();
    let mut best = (0, points[0], f64::INFINITY);

    for (i, segment) in points.windows(2).enumerate() {
        let (projected, dist) = geo::closest_point_on_segment(position, &segment[0], &segment[1]);
        if dist < best.2 {
            best = (i, projected, dist);
        }
    }

    best
}
