//! Navigation session.
//!
//! Owns one active route together with everything derived from it and
//! the announcement tracker for that activation. Each position update
//! runs matching, off-route detection, the next-maneuver query, the
//! look-ahead over hazards and surfaces, and finally decides which
//! announcements are newly due.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::announce::{
    AnnouncementTracker, TurnId, TurnStage, ARRIVAL_ANNOUNCE_DISTANCE_M,
    HAZARD_ANNOUNCE_DISTANCE_M, TURN_ANNOUNCE_DISTANCE_M, TURN_REMINDER_DISTANCE_M,
};
use crate::error::{check_distance, Error, Result};
use crate::geo::Coordinate;
use crate::hazard::{self, Hazard, RouteHazard, DEFAULT_HAZARD_BUFFER_M, DEFAULT_MAX_UPCOMING_HAZARDS};
use crate::maneuver::{
    self, ManeuverInstruction, ManeuverKind, DEFAULT_CYCLING_SPEED_MPS, DEFAULT_MIN_SEGMENT_LENGTH_M,
};
use crate::matcher::{self, RouteMatch};
use crate::offroute::{self, DEFAULT_OFF_ROUTE_THRESHOLD_M};
use crate::route::Route;
use crate::surface::{self, RouteWarning};

/// Tunable distances and speeds. Missing JSON fields take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub off_route_threshold_m: f64,
    pub hazard_buffer_m: f64,
    pub min_segment_length_m: f64,
    pub max_upcoming_hazards: usize,
    pub hazard_announce_m: f64,
    pub turn_announce_m: f64,
    pub turn_reminder_m: f64,
    pub arrival_announce_m: f64,
    /// Used for the ETA when the rider is stopped.
    pub fallback_speed_mps: f64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            off_route_threshold_m: DEFAULT_OFF_ROUTE_THRESHOLD_M,
            hazard_buffer_m: DEFAULT_HAZARD_BUFFER_M,
            min_segment_length_m: DEFAULT_MIN_SEGMENT_LENGTH_M,
            max_upcoming_hazards: DEFAULT_MAX_UPCOMING_HAZARDS,
            hazard_announce_m: HAZARD_ANNOUNCE_DISTANCE_M,
            turn_announce_m: TURN_ANNOUNCE_DISTANCE_M,
            turn_reminder_m: TURN_REMINDER_DISTANCE_M,
            arrival_announce_m: ARRIVAL_ANNOUNCE_DISTANCE_M,
            fallback_speed_mps: DEFAULT_CYCLING_SPEED_MPS,
        }
    }
}

impl NavigationConfig {
    pub fn validate(&self) -> Result<()> {
        check_distance("off-route threshold", self.off_route_threshold_m)?;
        check_distance("hazard buffer", self.hazard_buffer_m)?;
        check_distance("minimum segment length", self.min_segment_length_m)?;
        check_distance("hazard announce distance", self.hazard_announce_m)?;
        check_distance("turn announce distance", self.turn_announce_m)?;
        check_distance("turn reminder distance", self.turn_reminder_m)?;
        check_distance("arrival announce distance", self.arrival_announce_m)?;
        if self.turn_reminder_m > self.turn_announce_m {
            return Err(Error::InvalidDistance {
                name: "turn reminder distance",
                value: self.turn_reminder_m,
            });
        }
        if self.fallback_speed_mps.is_nan() || self.fallback_speed_mps <= 0.0 {
            return Err(Error::InvalidDistance {
                name: "fallback speed",
                value: self.fallback_speed_mps,
            });
        }
        Ok(())
    }
}

/// An event the announcer should speak. Phrasing is up to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Announcement {
    Hazard {
        hazard: RouteHazard,
        distance_m: f64,
    },
    Turn {
        maneuver: ManeuverInstruction,
        stage: TurnStage,
        distance_m: f64,
    },
    Arrival {
        distance_m: f64,
    },
}

/// Everything the host needs after one position update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationUpdate {
    pub route_match: RouteMatch,
    pub off_route: bool,
    pub next_maneuver: Option<ManeuverInstruction>,
    pub distance_to_maneuver_m: Option<f64>,
    pub distance_remaining_m: f64,
    pub time_remaining_s: u64,
    pub upcoming_hazards: Vec<RouteHazard>,
    pub surface_warnings: Vec<RouteWarning>,
    pub announcements: Vec<Announcement>,
}

pub struct NavigationSession {
    config: NavigationConfig,
    route: Route,
    maneuvers: Vec<ManeuverInstruction>,
    hazards: Vec<RouteHazard>,
    warnings: Vec<RouteWarning>,
    tracker: AnnouncementTracker,
    off_route: bool,
}

impl NavigationSession {
    pub fn new(route: Route, hazards: &[Hazard], config: NavigationConfig) -> Result<Self> {
        config.validate()?;

        let mut session = Self {
            maneuvers: Vec::new(),
            hazards: Vec::new(),
            warnings: Vec::new(),
            tracker: AnnouncementTracker::new(),
            off_route: false,
            config,
            route,
        };
        session.recompute(hazards)?;
        Ok(session)
    }

    /// Activate a new route. Derived data is rebuilt and the
    /// announcement history is cleared.
    pub fn set_route(&mut self, route: Route, hazards: &[Hazard]) -> Result<()> {
        self.route = route;
        self.recompute(hazards)?;
        self.restart();
        Ok(())
    }

    /// Replace the hazard set for the current route.
    pub fn set_hazards(&mut self, hazards: &[Hazard]) -> Result<()> {
        self.hazards =
            hazard::detect_hazards_on_route(&self.route, hazards, self.config.hazard_buffer_m)?;
        Ok(())
    }

    /// Forget everything announced so far.
    pub fn restart(&mut self) {
        self.tracker.clear();
        self.off_route = false;
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    pub fn maneuvers(&self) -> &[ManeuverInstruction] {
        &self.maneuvers
    }

    pub fn route_hazards(&self) -> &[RouteHazard] {
        &self.hazards
    }

    pub fn surface_warnings(&self) -> &[RouteWarning] {
        &self.warnings
    }

    fn recompute(&mut self, hazards: &[Hazard]) -> Result<()> {
        self.maneuvers = maneuver::detect_maneuvers_with(&self.route, self.config.min_segment_length_m);
        self.hazards =
            hazard::detect_hazards_on_route(&self.route, hazards, self.config.hazard_buffer_m)?;
        self.warnings = surface::analyze_route_surface(&self.route, None);

        info!(
            "route activated: {} points, {:.0} m, {} maneuvers, {} hazards, {} surface warnings",
            self.route.len(),
            self.route.total_length(),
            self.maneuvers.len(),
            self.hazards.len(),
            self.warnings.len()
        );
        Ok(())
    }

    /// Process one position fix. `speed_mps` is the GPS speed if known.
    pub fn update(&mut self, position: &Coordinate, speed_mps: Option<f64>) -> NavigationUpdate {
        let route_match = matcher::match_position(position, &self.route);
        let along = route_match.distance_along_m;

        let off_route = offroute::is_match_off_route(&route_match, self.config.off_route_threshold_m);
        if off_route != self.off_route {
            info!(
                "rider {} route ({:.0} m from nearest segment)",
                if off_route { "left" } else { "rejoined" },
                route_match.distance_m
            );
            self.off_route = off_route;
        }

        let next_maneuver =
            maneuver::find_next_maneuver(&self.maneuvers, route_match.segment_index).cloned();
        let distance_to_maneuver_m = next_maneuver.as_ref().map(|m| {
            maneuver::distance_to_maneuver(position, &self.route, route_match.segment_index, m)
        });

        let distance_remaining_m = (self.route.total_length() - along).max(0.0);
        let time_remaining_s = maneuver::estimate_time_remaining_with(
            distance_remaining_m,
            speed_mps.unwrap_or(0.0),
            self.config.fallback_speed_mps,
        );

        let upcoming_hazards: Vec<RouteHazard> =
            hazard::hazards_ahead_of(&self.hazards, along, self.config.max_upcoming_hazards)
                .into_iter()
                .cloned()
                .collect();

        let surface_warnings: Vec<RouteWarning> = self
            .warnings
            .iter()
            .filter(|w| w.distance_along_m >= along)
            .map(|w| RouteWarning {
                distance_from_user_m: Some(w.distance_along_m - along),
                ..w.clone()
            })
            .collect();

        let mut announcements = self.hazard_announcements(along);
        if let (Some(m), Some(d)) = (&next_maneuver, distance_to_maneuver_m) {
            announcements.extend(self.maneuver_announcement(m, d));
        }
        if !announcements.is_empty() {
            debug!("{} announcements due at {:.0} m", announcements.len(), along);
        }

        NavigationUpdate {
            route_match,
            off_route,
            next_maneuver,
            distance_to_maneuver_m,
            distance_remaining_m,
            time_remaining_s,
            upcoming_hazards,
            surface_warnings,
            announcements,
        }
    }

    /// Scans every hazard ahead, not just the display window, so hazards
    /// that can never be announced do not hide one that can.
    fn hazard_announcements(&mut self, along: f64) -> Vec<Announcement> {
        let mut due = Vec::new();
        for h in self.hazards.iter().filter(|h| h.distance_along_m > along) {
            let distance_m = h.distance_along_m - along;
            if distance_m > self.config.hazard_announce_m {
                // Sorted by distance along the route
                break;
            }
            if !self.tracker.should_announce_hazard(&h.hazard) {
                continue;
            }
            if let Some(id) = &h.hazard.id {
                self.tracker.mark_hazard_announced(id);
            }
            due.push(Announcement::Hazard {
                hazard: h.clone(),
                distance_m,
            });
        }
        due
    }

    fn maneuver_announcement(&mut self, m: &ManeuverInstruction, distance_m: f64) -> Option<Announcement> {
        match m.kind {
            ManeuverKind::Arrive => {
                let id = TurnId::new(m.point_index, TurnStage::Arrival);
                if distance_m > self.config.arrival_announce_m || self.tracker.is_turn_announced(id) {
                    return None;
                }
                self.tracker.mark_turn_announced(id);
                Some(Announcement::Arrival { distance_m })
            }
            kind if kind.is_turn() => {
                let approach = TurnId::new(m.point_index, TurnStage::Approach);
                let reminder = TurnId::new(m.point_index, TurnStage::Reminder);

                let stage = if distance_m <= self.config.turn_reminder_m {
                    if self.tracker.is_turn_announced(reminder) {
                        return None;
                    }
                    self.tracker.mark_turn_announced(approach);
                    self.tracker.mark_turn_announced(reminder);
                    TurnStage::Reminder
                } else if distance_m <= self.config.turn_announce_m {
                    if self.tracker.is_turn_announced(approach) {
                        return None;
                    }
                    self.tracker.mark_turn_announced(approach);
                    TurnStage::Approach
                } else {
                    return None;
                };

                Some(Announcement::Turn {
                    maneuver: m.clone(),
                    stage,
                    distance_m,
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hazard::{HazardId, HazardStatus};
    use crate::route::SegmentDetail;

    fn pt(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon)
    }

    /// ~556 m east along the equator, then ~556 m north.
    fn l_route() -> Route {
        Route::new(vec![pt(0.0, 0.0), pt(0.0, 0.005), pt(0.005, 0.005)])
            .unwrap()
            .with_segment_details(vec![SegmentDetail {
                start_index: 1,
                end_index: 2,
                surface: "gravel".into(),
            }])
            .unwrap()
    }

    fn hazard(id: Option<&str>, lat: f64, lon: f64) -> Hazard {
        Hazard {
            id: id.map(Into::into),
            position: pt(lat, lon),
            category: "pothole".into(),
            severity: "high".into(),
            status: HazardStatus::Active,
            verified: true,
            title: String::new(),
        }
    }

    fn session(hazards: &[Hazard]) -> NavigationSession {
        NavigationSession::new(l_route(), hazards, NavigationConfig::default()).unwrap()
    }

    fn turn_stages(update: &NavigationUpdate) -> Vec<TurnStage> {
        update
            .announcements
            .iter()
            .filter_map(|a| match a {
                Announcement::Turn { stage, .. } => Some(*stage),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn precomputes_derived_data() {
        let s = session(&[hazard(Some("h"), 0.0001, 0.003)]);
        assert_eq!(s.maneuvers().len(), 3);
        assert_eq!(s.maneuvers()[1].kind, ManeuverKind::Left);
        assert_eq!(s.route_hazards().len(), 1);
        assert_eq!(s.surface_warnings().len(), 1);
    }

    #[test]
    fn rejects_invalid_config() {
        let config = NavigationConfig {
            hazard_buffer_m: -5.0,
            ..NavigationConfig::default()
        };
        assert!(NavigationSession::new(l_route(), &[], config).is_err());

        let config = NavigationConfig {
            turn_reminder_m: 300.0,
            ..NavigationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_from_partial_json() {
        let config: NavigationConfig =
            serde_json::from_str(r#"{"off_route_threshold_m": 30.0}"#).unwrap();
        assert_eq!(config.off_route_threshold_m, 30.0);
        assert_eq!(config.hazard_buffer_m, 75.0);
        assert_eq!(config.turn_announce_m, 200.0);
    }

    #[test]
    fn update_reports_position_and_next_turn() {
        let mut s = session(&[]);
        let update = s.update(&pt(0.0, 0.001), Some(5.0));

        assert!(!update.off_route);
        assert_eq!(update.route_match.segment_index, 0);
        let next = update.next_maneuver.unwrap();
        assert_eq!(next.kind, ManeuverKind::Left);
        let d = update.distance_to_maneuver_m.unwrap();
        assert!((d - 444.8).abs() < 1.0, "got {d}");
        assert!(update.announcements.is_empty());
        assert_eq!(update.surface_warnings.len(), 1);
        assert!(update.time_remaining_s > 0);
    }

    #[test]
    fn turn_announced_then_reminded_once() {
        let mut s = session(&[]);

        // ~167 m before the corner
        let first = s.update(&pt(0.0, 0.0035), None);
        assert_eq!(turn_stages(&first), vec![TurnStage::Approach]);

        let again = s.update(&pt(0.0, 0.0036), None);
        assert!(turn_stages(&again).is_empty());

        // ~33 m before the corner
        let close = s.update(&pt(0.0, 0.0047), None);
        assert_eq!(turn_stages(&close), vec![TurnStage::Reminder]);

        let closer = s.update(&pt(0.0, 0.0048), None);
        assert!(turn_stages(&closer).is_empty());
    }

    #[test]
    fn reminder_alone_when_first_fix_is_close() {
        let mut s = session(&[]);
        let update = s.update(&pt(0.0, 0.0047), None);
        assert_eq!(turn_stages(&update), vec![TurnStage::Reminder]);
        assert!(turn_stages(&s.update(&pt(0.0, 0.0048), None)).is_empty());
    }

    #[test]
    fn hazards_announced_once_per_activation() {
        let hazards = [
            hazard(Some("pothole"), 0.0001, 0.003),
            hazard(None, 0.0001, 0.0031),
        ];
        let mut s = session(&hazards);
        assert_eq!(s.route_hazards().len(), 2);

        // ~222 m before: too far
        assert!(s.update(&pt(0.0, 0.001), None).announcements.is_empty());

        // ~56 m before: only the identified hazard is announced
        let update = s.update(&pt(0.0, 0.0025), None);
        let announced: Vec<_> = update
            .announcements
            .iter()
            .filter(|a| matches!(a, Announcement::Hazard { .. }))
            .collect();
        assert_eq!(announced.len(), 1);

        assert!(s.update(&pt(0.0, 0.0026), None).announcements.is_empty());

        s.restart();
        assert_eq!(s.update(&pt(0.0, 0.0026), None).announcements.len(), 1);
    }

    #[test]
    fn hazards_announced_with_empty_display_window() {
        let config = NavigationConfig {
            max_upcoming_hazards: 0,
            ..NavigationConfig::default()
        };
        let mut s =
            NavigationSession::new(l_route(), &[hazard(Some("glass"), 0.0001, 0.003)], config).unwrap();

        let update = s.update(&pt(0.0, 0.0025), None);
        assert!(update.upcoming_hazards.is_empty());
        assert_eq!(update.announcements.len(), 1);
        assert!(matches!(update.announcements[0], Announcement::Hazard { .. }));
    }

    #[test]
    fn silent_hazards_do_not_hide_announceable_one() {
        let mut hazards: Vec<Hazard> = (0..5)
            .map(|i| {
                let mut h = hazard(None, 0.0001, 0.0026 + i as f64 * 0.0001);
                if i % 2 == 1 {
                    h.id = Some(format!("closed-{i}").as_str().into());
                    h.status = HazardStatus::Inactive;
                }
                h
            })
            .collect();
        // ~89 m ahead of the rider, behind the five silent ones
        hazards.push(hazard(Some("curb"), 0.0001, 0.0033));
        let mut s = session(&hazards);
        assert_eq!(s.route_hazards().len(), 6);

        let update = s.update(&pt(0.0, 0.0025), None);
        assert_eq!(update.upcoming_hazards.len(), 5);
        assert!(update
            .upcoming_hazards
            .iter()
            .all(|h| h.hazard.id.as_ref().map(|id| id.0.as_str()) != Some("curb")));

        let announced: Vec<_> = update
            .announcements
            .iter()
            .filter_map(|a| match a {
                Announcement::Hazard { hazard, .. } => hazard.hazard.id.clone(),
                _ => None,
            })
            .collect();
        assert_eq!(announced, vec![HazardId::from("curb")]);
    }

    #[test]
    fn arrival_announced_near_end() {
        let mut s = session(&[]);
        let update = s.update(&pt(0.0049, 0.005), None);
        assert!(update
            .announcements
            .iter()
            .any(|a| matches!(a, Announcement::Arrival { .. })));
        assert!(s.update(&pt(0.00495, 0.005), None).announcements.is_empty());
    }

    #[test]
    fn off_route_flag() {
        let mut s = session(&[]);
        assert!(s.update(&pt(0.001, 0.002), None).off_route);
        assert!(!s.update(&pt(0.0, 0.002), None).off_route);
    }

    #[test]
    fn set_route_clears_announcements() {
        let mut s = session(&[]);
        assert_eq!(turn_stages(&s.update(&pt(0.0, 0.0035), None)).len(), 1);

        s.set_route(l_route(), &[]).unwrap();
        assert_eq!(turn_stages(&s.update(&pt(0.0, 0.0035), None)).len(), 1);
    }

    #[test]
    fn set_hazards_recomputes_corridor() {
        let mut s = session(&[]);
        assert!(s.route_hazards().is_empty());

        s.set_hazards(&[hazard(Some("new"), 0.0001, 0.004)]).unwrap();
        assert_eq!(s.route_hazards().len(), 1);
        assert_eq!(s.maneuvers().len(), 3);
    }

    #[test]
    fn update_serializes_to_json() {
        let mut s = session(&[hazard(Some("h"), 0.0001, 0.003)]);
        let update = s.update(&pt(0.0, 0.0025), Some(4.0));
        let json = serde_json::to_value(&update).unwrap();
        assert!(json["upcoming_hazards"].is_array());
        assert_eq!(json["announcements"][0]["type"], "hazard");
        assert_eq!(json["next_maneuver"]["kind"], "left");
    }
}
