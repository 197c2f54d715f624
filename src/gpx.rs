//! GPX route import.
//!
//! Wraps the `gpx` crate to turn a planned route (or, failing that, a
//! recorded track) from a GPX 1.1 document into a [`Route`].

use std::io::Read;

use log::debug;

use crate::error::{Error, Result};
use crate::geo::Coordinate;
use crate::route::Route;

fn to_coordinate(wp: &gpx::Waypoint) -> Coordinate {
    Coordinate {
        lat: wp.point().y(),
        lon: wp.point().x(),
    }
}

/// Read the first `<rte>` of a GPX document, or the first `<trk>` with
/// its segments flattened when the file has no route.
pub fn parse_route<R: Read>(reader: R) -> Result<Route> {
    let gpx = gpx::read(reader)?;

    let (name, points): (Option<String>, Vec<Coordinate>) =
        if let Some(rte) = gpx.routes.iter().find(|r| !r.points.is_empty()) {
            (rte.name.clone(), rte.points.iter().map(to_coordinate).collect())
        } else if let Some(trk) = gpx
            .tracks
            .iter()
            .find(|t| t.segments.iter().any(|s| !s.points.is_empty()))
        {
            let points = trk
                .segments
                .iter()
                .flat_map(|seg| seg.points.iter())
                .map(to_coordinate)
                .collect();
            (trk.name.clone(), points)
        } else {
            return Err(Error::NoRouteInGpx);
        };

    debug!("GPX route {:?} with {} points", name, points.len());

    let route = Route::new(points)?;
    Ok(match name {
        Some(name) => route.with_name(name),
        None => route,
    })
}

/// Parse a GPX route from a byte slice. Convenience wrapper for JNI.
pub fn parse_route_bytes(data: &[u8]) -> Result<Route> {
    parse_route(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUTE_AND_TRACK_GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test"
     xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <name>Test Track</name>
    <trkseg>
      <trkpt lat="48.2082" lon="16.3738"><ele>171</ele></trkpt>
      <trkpt lat="48.2090" lon="16.3750"><ele>173</ele></trkpt>
      <trkpt lat="48.2100" lon="16.3760"><ele>170</ele></trkpt>
    </trkseg>
  </trk>
  <rte>
    <name>Test Route</name>
    <rtept lat="48.2000" lon="16.3500"></rtept>
    <rtept lat="48.2100" lon="16.3600"></rtept>
  </rte>
</gpx>"#;

    #[test]
    fn route_is_preferred_over_track() {
        let route = parse_route_bytes(ROUTE_AND_TRACK_GPX.as_bytes()).unwrap();

        assert_eq!(route.name(), Some("Test Route"));
        assert_eq!(route.len(), 2);
        let p = route.point(0);
        assert!((p.lat - 48.2).abs() < 1e-6);
        assert!((p.lon - 16.35).abs() < 1e-6);
    }

    #[test]
    fn multi_segment_track_is_flattened() {
        let gpx = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test"
     xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <name>Multi Segment</name>
    <trkseg>
      <trkpt lat="48.0" lon="16.0"></trkpt>
      <trkpt lat="48.1" lon="16.1"></trkpt>
    </trkseg>
    <trkseg>
      <trkpt lat="48.2" lon="16.2"></trkpt>
      <trkpt lat="48.3" lon="16.3"></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

        let route = parse_route_bytes(gpx.as_bytes()).unwrap();
        assert_eq!(route.name(), Some("Multi Segment"));
        assert_eq!(route.len(), 4);
    }

    #[test]
    fn empty_gpx_has_no_route() {
        let empty = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test"
     xmlns="http://www.topografix.com/GPX/1/1">
</gpx>"#;

        assert!(matches!(parse_route_bytes(empty.as_bytes()), Err(Error::NoRouteInGpx)));
    }

    #[test]
    fn single_point_route_is_rejected() {
        let gpx = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test"
     xmlns="http://www.topografix.com/GPX/1/1">
  <rte>
    <rtept lat="48.0" lon="16.0"></rtept>
  </rte>
</gpx>"#;

        assert!(matches!(
            parse_route_bytes(gpx.as_bytes()),
            Err(Error::TooFewPoints { count: 1 })
        ));
    }

    #[test]
    fn invalid_xml_returns_error() {
        assert!(matches!(parse_route_bytes(b"not xml at all"), Err(Error::Gpx(_))));
    }
}
