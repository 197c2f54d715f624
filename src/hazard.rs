//! Hazards along a route corridor.
//!
//! Community-reported point hazards are kept when they lie within a
//! lateral buffer of the route. A bounding-box pre-filter rejects far
//! away hazards before the per-segment projection runs.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{check_distance, Result};
use crate::geo::Coordinate;
use crate::matcher;
use crate::route::Route;

/// Default corridor half-width in meters.
pub const DEFAULT_HAZARD_BUFFER_M: f64 = 75.0;

/// Default number of hazards returned by [`get_upcoming_hazards`].
pub const DEFAULT_MAX_UPCOMING_HAZARDS: usize = 5;

/// Margin added around the route bounding box (~1 km).
const BBOX_MARGIN_DEG: f64 = 0.01;

/// Opaque hazard identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HazardId(pub String);

impl From<&str> for HazardId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardStatus {
    #[default]
    Active,
    Inactive,
}

/// A community-reported point hazard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    /// `None` means the hazard can never be announced.
    #[serde(default)]
    pub id: Option<HazardId>,
    pub position: Coordinate,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub status: HazardStatus,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub title: String,
}

impl Hazard {
    pub fn is_active(&self) -> bool {
        self.status == HazardStatus::Active
    }
}

/// A hazard bound to a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteHazard {
    pub hazard: Hazard,
    /// Distance along the route to the hazard's projection, in meters.
    pub distance_along_m: f64,
    /// Perpendicular offset from the route, in meters.
    pub offset_m: f64,
}

/// Hazards within `buffer_m` of the route, sorted by distance along it.
pub fn detect_hazards_on_route(
    route: &Route,
    hazards: &[Hazard],
    buffer_m: f64,
) -> Result<Vec<RouteHazard>> {
    check_distance("hazard buffer", buffer_m)?;

    let bbox = route.bounding_box().expanded(BBOX_MARGIN_DEG);

    let mut on_route: Vec<RouteHazard> = hazards
        .iter()
        .filter(|h| h.position.is_finite() && bbox.contains(&h.position))
        .filter_map(|h| {
            let m = matcher::match_position(&h.position, route);
            (m.distance_m <= buffer_m).then(|| RouteHazard {
                hazard: h.clone(),
                distance_along_m: m.distance_along_m,
                offset_m: m.distance_m,
            })
        })
        .collect();

    on_route.sort_by(|a, b| a.distance_along_m.total_cmp(&b.distance_along_m));

    debug!(
        "{} of {} hazards within {buffer_m} m of route",
        on_route.len(),
        hazards.len()
    );

    Ok(on_route)
}

/// Up to `max_count` hazards strictly ahead of `current_position`.
pub fn get_upcoming_hazards<'a>(
    route_hazards: &'a [RouteHazard],
    current_position: &Coordinate,
    route: &Route,
    max_count: usize,
) -> Vec<&'a RouteHazard> {
    let along = matcher::distance_along(current_position, route);
    hazards_ahead_of(route_hazards, along, max_count)
}

/// Up to `max_count` hazards strictly beyond `distance_along_m`.
pub(crate) fn hazards_ahead_of(
    route_hazards: &[RouteHazard],
    distance_along_m: f64,
    max_count: usize,
) -> Vec<&RouteHazard> {
    route_hazards
        .iter()
        .filter(|h| h.distance_along_m > distance_along_m)
        .take(max_count)
        .collect()
}
