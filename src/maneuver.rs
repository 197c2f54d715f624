//! Turn-by-turn maneuvers.
//!
//! Offline pass over a route that classifies the bearing change at each
//! interior point into a turn instruction, plus the online queries used
//! while riding: next maneuver, distance to it, and time remaining.

use log::debug;
use serde::Serialize;

use crate::geo::{self, Coordinate};
use crate::route::Route;

/// Interior points next to a segment shorter than this are skipped.
pub const DEFAULT_MIN_SEGMENT_LENGTH_M: f64 = 10.0;

/// Speed substituted when the rider is stopped (15 km/h).
pub const DEFAULT_CYCLING_SPEED_MPS: f64 = 4.17;

/// Below this speed the rider counts as stopped.
pub const STOPPED_SPEED_MPS: f64 = 0.5;

/// Turn direction categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ManeuverKind {
    Depart,
    /// Classified but never emitted as an instruction.
    Straight,
    SlightLeft,
    Left,
    SharpLeft,
    SlightRight,
    Right,
    SharpRight,
    UTurn,
    Arrive,
}

impl ManeuverKind {
    pub fn text(self) -> &'static str {
        match self {
            Self::Depart => "Depart",
            Self::Straight => "Continue straight",
            Self::SlightLeft => "Keep slightly left",
            Self::Left => "Turn left",
            Self::SharpLeft => "Turn sharp left",
            Self::SlightRight => "Keep slightly right",
            Self::Right => "Turn right",
            Self::SharpRight => "Turn sharp right",
            Self::UTurn => "Make a U-turn",
            Self::Arrive => "Arrive at destination",
        }
    }

    pub fn is_turn(self) -> bool {
        !matches!(self, Self::Depart | Self::Straight | Self::Arrive)
    }
}

/// A single turn-by-turn instruction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManeuverInstruction {
    pub kind: ManeuverKind,
    /// Human-readable instruction text.
    pub text: String,
    /// Path length from the route start to the anchor point, in meters.
    pub distance_from_start_m: f64,
    pub location: Coordinate,
    /// Route point index this instruction is anchored to.
    pub point_index: usize,
}

impl ManeuverInstruction {
    fn new(kind: ManeuverKind, route: &Route, point_index: usize, distance_from_start_m: f64) -> Self {
        Self {
            kind,
            text: kind.text().to_string(),
            distance_from_start_m,
            location: *route.point(point_index),
            point_index,
        }
    }
}

/// Generate instructions with the default minimum segment length.
pub fn detect_maneuvers(route: &Route) -> Vec<ManeuverInstruction> {
    detect_maneuvers_with(route, DEFAULT_MIN_SEGMENT_LENGTH_M)
}

/// Generate turn-by-turn instructions for a route.
///
/// Always starts with a depart at index 0 and ends with an arrive at
/// the last index. Straight passages are not emitted.
pub fn detect_maneuvers_with(route: &Route, min_segment_length_m: f64) -> Vec<ManeuverInstruction> {
    let last = route.last_index();

    if route.len() == 2 {
        return vec![
            ManeuverInstruction::new(ManeuverKind::Depart, route, 0, 0.0),
            ManeuverInstruction::new(ManeuverKind::Arrive, route, last, 0.0),
        ];
    }

    let mut instructions = vec![ManeuverInstruction::new(ManeuverKind::Depart, route, 0, 0.0)];

    for i in 1..last {
        let shortest = route.segment_length(i - 1).min(route.segment_length(i));
        // Duplicate points have no bearing, even with no minimum length
        if shortest <= f64::EPSILON || shortest < min_segment_length_m {
            continue;
        }

        let kind = compute_turn(route.point(i - 1), route.point(i), route.point(i + 1));
        if kind == ManeuverKind::Straight {
            continue;
        }

        instructions.push(ManeuverInstruction::new(kind, route, i, route.distance_at(i)));
    }

    instructions.push(ManeuverInstruction::new(
        ManeuverKind::Arrive,
        route,
        last,
        route.total_length(),
    ));

    debug!(
        "detected {} maneuvers over {} points ({:.0} m)",
        instructions.len(),
        route.len(),
        route.total_length()
    );

    instructions
}

/// Compute the turn at point B given the approach from A and the exit toward C.
fn compute_turn(a: &Coordinate, b: &Coordinate, c: &Coordinate) -> ManeuverKind {
    let bearing_in = geo::bearing(a, b);
    let bearing_out = geo::bearing(b, c);

    // Positive = counter-clockwise = left turn
    classify_turn(normalize_delta(bearing_in - bearing_out))
}

/// Normalize an angle difference to (-180, 180].
fn normalize_delta(angle: f64) -> f64 {
    let a = angle % 360.0;
    if a > 180.0 {
        a - 360.0
    } else if a <= -180.0 {
        a + 360.0
    } else {
        a
    }
}

/// Classify a signed bearing change (positive = left) into a turn.
fn classify_turn(delta: f64) -> ManeuverKind {
    let abs = delta.abs();

    if abs < 20.0 {
        ManeuverKind::Straight
    } else if abs > 150.0 {
        ManeuverKind::UTurn
    } else if delta > 0.0 {
        if abs > 120.0 {
            ManeuverKind::SharpLeft
        } else if abs > 45.0 {
            ManeuverKind::Left
        } else {
            ManeuverKind::SlightLeft
        }
    } else if abs > 120.0 {
        ManeuverKind::SharpRight
    } else if abs > 45.0 {
        ManeuverKind::Right
    } else {
        ManeuverKind::SlightRight
    }
}

/// First maneuver anchored beyond `current_segment_index`, or the last
/// (arrival) maneuver when every anchor is behind.
pub fn find_next_maneuver(
    maneuvers: &[ManeuverInstruction],
    current_segment_index: usize,
) -> Option<&ManeuverInstruction> {
    maneuvers
        .iter()
        .find(|m| m.point_index > current_segment_index)
        .or_else(|| maneuvers.last())
}

/// Distance from `position` to the maneuver's anchor point: straight to
/// the end of the current segment, then along the route.
pub fn distance_to_maneuver(
    position: &Coordinate,
    route: &Route,
    current_segment_index: usize,
    maneuver: &ManeuverInstruction,
) -> f64 {
    let next_index = (current_segment_index + 1).min(route.last_index());
    let anchor = maneuver.point_index.min(route.last_index());

    let to_next = geo::distance(position, route.point(next_index));
    let along = (route.distance_at(anchor) - route.distance_at(next_index)).max(0.0);
    to_next + along
}

/// Seconds to cover `distance_m` at `speed_mps`, falling back to a
/// default cycling speed when the rider is stopped.
pub fn estimate_time_remaining(distance_m: f64, speed_mps: f64) -> u64 {
    estimate_time_remaining_with(distance_m, speed_mps, DEFAULT_CYCLING_SPEED_MPS)
}

pub fn estimate_time_remaining_with(distance_m: f64, speed_mps: f64, fallback_speed_mps: f64) -> u64 {
    let speed = if speed_mps >= STOPPED_SPEED_MPS {
        speed_mps
    } else {
        fallback_speed_mps
    };
    (distance_m.max(0.0) / speed).round() as u64
}
