//! JSON boundary for the host app.
//!
//! Requests and responses cross the JNI boundary as JSON strings; these
//! functions do the (de)serialization so the JNI layer stays thin and
//! the behavior can be tested without a JVM.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geo::Coordinate;
use crate::hazard::{self, Hazard, RouteHazard};
use crate::maneuver::{self, ManeuverInstruction};
use crate::route::{Route, SegmentDetail};
use crate::session::NavigationConfig;
use crate::surface::{self, RouteWarning};

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    points: Vec<Coordinate>,
    #[serde(default)]
    segments: Vec<SegmentDetail>,
    #[serde(default)]
    hazards: Vec<Hazard>,
    #[serde(default)]
    config: NavigationConfig,
    /// Rider position; surface warnings behind it are dropped.
    #[serde(default)]
    position: Option<Coordinate>,
}

#[derive(Debug, Serialize)]
struct AnalyzeResponse {
    length_m: f64,
    maneuvers: Vec<ManeuverInstruction>,
    hazards: Vec<RouteHazard>,
    surface_warnings: Vec<RouteWarning>,
}

/// Run the per-route analysis (maneuvers, hazard corridor, surface
/// warnings) on a JSON request and return the JSON response.
pub fn analyze_route_json(request: &str) -> Result<String> {
    let request: AnalyzeRequest = serde_json::from_str(request)?;
    request.config.validate()?;

    let route = Route::new(request.points)?.with_segment_details(request.segments)?;

    let response = AnalyzeResponse {
        length_m: route.total_length(),
        maneuvers: maneuver::detect_maneuvers_with(&route, request.config.min_segment_length_m),
        hazards: hazard::detect_hazards_on_route(&route, &request.hazards, request.config.hazard_buffer_m)?,
        surface_warnings: surface::analyze_route_surface(&route, request.position.as_ref()),
    };

    Ok(serde_json::to_string(&response)?)
}

/// Parse GPX bytes and return the route's coordinates as a JSON array.
pub fn gpx_to_route_json(data: &[u8]) -> Result<String> {
    let route = crate::gpx::parse_route_bytes(data)?;
    Ok(serde_json::to_string(route.points())?)
}

/// Render an error the way the host expects it: `{"error": "..."}`.
pub fn error_json(err: &crate::Error) -> String {
    serde_json::json!({ "error": err.to_string() }).to_string()
}
