//! Error types shared by the whole crate.

use thiserror::Error;

/// Convenient result alias for ridenav.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A route needs at least two points to have any geometry.
    #[error("route needs at least 2 points, got {count}")]
    TooFewPoints { count: usize },

    #[error("invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// Segment detail ranges must be ordered, non-overlapping and start <= end.
    #[error("invalid segment detail range {start}..={end}")]
    InvalidSegmentDetail { start: usize, end: usize },

    /// A distance parameter (buffer, threshold) was negative or NaN.
    #[error("invalid {name}: {value}")]
    InvalidDistance { name: &'static str, value: f64 },

    #[error("GPX parse error: {0}")]
    Gpx(#[from] ::gpx::errors::GpxError),

    #[error("GPX file contains no route or track")]
    NoRouteInGpx,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The host passed something unreadable across the JNI boundary.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Reject negative and NaN distances.
pub(crate) fn check_distance(name: &'static str, value: f64) -> Result<()> {
    if value.is_nan() || value < 0.0 {
        return Err(Error::InvalidDistance { name, value });
    }
    Ok(())
}
