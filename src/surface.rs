//! Surface quality warnings.
//!
//! Maps raw surface tags from the routing provider onto quality tiers and
//! turns the non-good ranges of a route into ordered warnings.

use serde::Serialize;

use crate::geo::Coordinate;
use crate::matcher;
use crate::route::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceTier {
    Good,
    Poor,
    Unknown,
}

/// Classify a raw surface tag.
///
/// Case, surrounding whitespace, and `-` versus `_` are ignored. Empty
/// and unrecognized tags are [`SurfaceTier::Unknown`].
pub fn classify_surface(tag: &str) -> SurfaceTier {
    let normalized = tag.trim().to_ascii_lowercase().replace(&['-', ' '][..], "_");

    match normalized.as_str() {
        "asphalt" | "concrete" | "paved" => SurfaceTier::Good,
        "compacted" | "fine_gravel" => SurfaceTier::Good,
        "gravel" | "unpaved" | "dirt" | "sand" | "grass" | "mud" | "cobble" | "cobblestone"
        | "sett" => SurfaceTier::Poor,
        _ => SurfaceTier::Unknown,
    }
}

/// A poor or unknown surface range on the route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteWarning {
    pub tier: SurfaceTier,
    /// Distance along the route to the start of the range, in meters.
    pub distance_along_m: f64,
    pub length_m: f64,
    /// Raw surface tag.
    pub surface: String,
    pub start_index: usize,
    pub end_index: usize,
    /// Distance from the rider to the start of the range, when a
    /// position was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_from_user_m: Option<f64>,
}

/// Warnings for every non-good surface range, sorted by distance along
/// the route.
///
/// With a current position, ranges starting behind the rider are left
/// out and the rest carry their distance from the rider.
pub fn analyze_route_surface(route: &Route, current_position: Option<&Coordinate>) -> Vec<RouteWarning> {
    let details = route.segment_details();
    if details.is_empty() {
        return Vec::new();
    }

    let user_along = current_position.map(|p| matcher::distance_along(p, route));

    let mut warnings: Vec<RouteWarning> = details
        .iter()
        .filter_map(|detail| {
            let tier = classify_surface(&detail.surface);
            if tier == SurfaceTier::Good {
                return None;
            }

            let start = route.distance_at(detail.start_index);
            let end = route.distance_at(detail.end_index);

            let distance_from_user_m = match user_along {
                Some(along) if start < along => return None,
                Some(along) => Some(start - along),
                None => None,
            };

            Some(RouteWarning {
                tier,
                distance_along_m: start,
                length_m: end - start,
                surface: detail.surface.clone(),
                start_index: detail.start_index,
                end_index: detail.end_index,
                distance_from_user_m,
            })
        })
        .collect();

    warnings.sort_by(|a, b| a.distance_along_m.total_cmp(&b.distance_along_m));
    warnings
}
