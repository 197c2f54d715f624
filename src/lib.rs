//! Route geometry and proximity analysis for turn-by-turn cycling
//! navigation.
//!
//! Given a route polyline and live GPS fixes, works out where the rider
//! is on the route, the next maneuver and its distance, whether the
//! rider is off-route, which hazards and poor surfaces lie ahead, and
//! which of these events are due for announcement.

pub mod android_jni;
pub mod announce;
pub mod bridge;
pub mod error;
pub mod geo;
pub mod gpx;
pub mod hazard;
pub mod maneuver;
pub mod matcher;
pub mod offroute;
pub mod route;
pub mod session;
pub mod surface;

pub use error::{Error, Result};
pub use geo::Coordinate;
pub use route::{Route, SegmentDetail};
pub use session::{NavigationConfig, NavigationSession, NavigationUpdate};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
