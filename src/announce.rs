//! Announcement deduplication.
//!
//! The tracker remembers which hazards and turn prompts have already been
//! surfaced during the current navigation session. It has no expiry: the
//! owner calls [`AnnouncementTracker::clear`] when a route is activated or
//! navigation restarts.

use std::collections::HashSet;

use serde::Serialize;

use crate::hazard::{Hazard, HazardId};

/// Hazards are announced once the rider is this close.
pub const HAZARD_ANNOUNCE_DISTANCE_M: f64 = 100.0;
/// First announcement of an upcoming turn.
pub const TURN_ANNOUNCE_DISTANCE_M: f64 = 200.0;
/// Reminder right before the turn.
pub const TURN_REMINDER_DISTANCE_M: f64 = 50.0;
pub const ARRIVAL_ANNOUNCE_DISTANCE_M: f64 = 20.0;

/// Which prompt for a maneuver has been spoken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStage {
    Approach,
    Reminder,
    Arrival,
}

/// Identifies one prompt for the maneuver anchored at `point_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TurnId {
    pub point_index: usize,
    pub stage: TurnStage,
}

impl TurnId {
    pub fn new(point_index: usize, stage: TurnStage) -> Self {
        Self { point_index, stage }
    }
}

/// Not thread-safe; owned by a single navigation session.
#[derive(Debug, Default)]
pub struct AnnouncementTracker {
    hazards: HashSet<HazardId>,
    turns: HashSet<TurnId>,
}

impl AnnouncementTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff the hazard has an id, is active and was not announced yet.
    pub fn should_announce_hazard(&self, hazard: &Hazard) -> bool {
        match &hazard.id {
            Some(id) => hazard.is_active() && !self.hazards.contains(id),
            None => false,
        }
    }

    pub fn mark_hazard_announced(&mut self, id: &HazardId) {
        self.hazards.insert(id.clone());
    }

    pub fn is_turn_announced(&self, turn: TurnId) -> bool {
        self.turns.contains(&turn)
    }

    pub fn mark_turn_announced(&mut self, turn: TurnId) {
        self.turns.insert(turn);
    }

    pub fn clear(&mut self) {
        self.hazards.clear();
        self.turns.clear();
    }
}
