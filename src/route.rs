//! Immutable route polyline.
//!
//! A [`Route`] owns its points, optional per-range surface details and a
//! cumulative-distance prefix array computed once at construction, so
//! distance-along-route lookups by point index are O(1) everywhere.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geo::{self, Coordinate};

/// Surface metadata for a contiguous range of route point indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentDetail {
    pub start_index: usize,
    pub end_index: usize,
    /// Raw surface tag as supplied by the routing provider.
    pub surface: String,
}

/// Axis-aligned bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Grow the box by `margin_deg` on every side.
    pub fn expanded(&self, margin_deg: f64) -> Self {
        Self {
            min_lat: self.min_lat - margin_deg,
            max_lat: self.max_lat + margin_deg,
            min_lon: self.min_lon - margin_deg,
            max_lon: self.max_lon + margin_deg,
        }
    }

    pub fn contains(&self, c: &Coordinate) -> bool {
        c.lat >= self.min_lat
            && c.lat <= self.max_lat
            && c.lon >= self.min_lon
            && c.lon <= self.max_lon
    }
}

#[derive(Debug, Clone)]
pub struct Route {
    name: Option<String>,
    points: Vec<Coordinate>,
    /// `cumulative[i]` is the path length from the start to point `i`.
    cumulative: Vec<f64>,
    segments: Vec<SegmentDetail>,
}

impl Route {
    /// Build a route from at least two finite coordinates.
    pub fn new(points: Vec<Coordinate>) -> Result<Self> {
        if points.len() < 2 {
            return Err(Error::TooFewPoints { count: points.len() });
        }
        if let Some(bad) = points.iter().find(|p| !p.is_finite()) {
            return Err(Error::InvalidCoordinate { lat: bad.lat, lon: bad.lon });
        }

        let mut cumulative = Vec::with_capacity(points.len());
        let mut total = 0.0;
        cumulative.push(total);
        for w in points.windows(2) {
            total += geo::distance(&w[0], &w[1]);
            cumulative.push(total);
        }

        Ok(Self {
            name: None,
            points,
            cumulative,
            segments: Vec::new(),
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach surface details.
    ///
    /// Ranges must be sorted and non-overlapping with `start <= end`.
    /// End indices past the last point are clamped; ranges starting past
    /// the last point are dropped.
    pub fn with_segment_details(mut self, details: Vec<SegmentDetail>) -> Result<Self> {
        let last = self.points.len() - 1;
        let mut prev_end: Option<usize> = None;
        let mut kept = Vec::with_capacity(details.len());

        for mut detail in details {
            if detail.start_index > detail.end_index
                || prev_end.is_some_and(|end| detail.start_index < end)
            {
                return Err(Error::InvalidSegmentDetail {
                    start: detail.start_index,
                    end: detail.end_index,
                });
            }
            prev_end = Some(detail.end_index);

            if detail.start_index > last {
                warn!(
                    "dropping surface range {}..={} beyond route end {last}",
                    detail.start_index, detail.end_index
                );
                continue;
            }
            detail.end_index = detail.end_index.min(last);
            kept.push(detail);
        }

        self.segments = kept;
        Ok(self)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false: a route has at least two points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point at `index`, clamped to the last point.
    pub fn point(&self, index: usize) -> &Coordinate {
        &self.points[index.min(self.points.len() - 1)]
    }

    pub fn last_index(&self) -> usize {
        self.points.len() - 1
    }

    pub fn segment_count(&self) -> usize {
        self.points.len() - 1
    }

    pub fn segment_details(&self) -> &[SegmentDetail] {
        &self.segments
    }

    /// Total length in meters.
    pub fn total_length(&self) -> f64 {
        self.cumulative[self.cumulative.len() - 1]
    }

    /// Distance along the route from the start to point `index`,
    /// clamped to the last point.
    pub fn distance_at(&self, index: usize) -> f64 {
        self.cumulative[index.min(self.cumulative.len() - 1)]
    }

    /// Length of segment `index` (point `index` to `index + 1`).
    /// Out-of-range indices yield 0.
    pub fn segment_length(&self, index: usize) -> f64 {
        if index + 1 >= self.points.len() {
            return 0.0;
        }
        self.cumulative[index + 1] - self.cumulative[index]
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let first = self.points[0];
        self.points.iter().fold(
            BoundingBox {
                min_lat: first.lat,
                max_lat: first.lat,
                min_lon: first.lon,
                max_lon: first.lon,
            },
            |bb, p| BoundingBox {
                min_lat: bb.min_lat.min(p.lat),
                max_lat: bb.max_lat.max(p.lat),
                min_lon: bb.min_lon.min(p.lon),
                max_lon: bb.max_lon.max(p.lon),
            },
        )
    }
}
