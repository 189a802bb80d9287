//! WKT / EWKT rendering and parsing, plus the JSON representation.

use std::fmt;

use geozero::wkt::Wkt;
use geozero::GeozeroGeometry;
use serde::Serialize;

use crate::error::{Result, SpatialError};
use crate::geometry::{Coordinates, Spatial};
use crate::raw::{RawGeometry, RawGeometryBuilder};

/// Write `TAG(body)`, or `TAG EMPTY` for a container without members.
pub(crate) fn write_wkt<S: Spatial + ?Sized>(geometry: &S, out: &mut dyn fmt::Write) -> fmt::Result {
    let tag = geometry.type_tag();
    if geometry.is_empty() {
        return write!(out, "{tag} EMPTY");
    }
    write!(out, "{tag}(")?;
    geometry.write_wkt_body(out)?;
    out.write_char(')')
}

/// [`fmt::Display`] adapter rendering a geometry as WKT.
pub struct WktDisplay<'a, S: ?Sized>(pub &'a S);

impl<S: Spatial + ?Sized> fmt::Display for WktDisplay<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_wkt(self.0, f)
    }
}

/// Render as WKT. The SRID is never included.
///
/// # Example
///
/// ```
/// use geocolumn_core::{wkt::to_wkt, Cartesian, LineString, Point3D};
///
/// let line = LineString::<Cartesian>::from_positions([[0, 0], [1, 1]]).unwrap();
/// assert_eq!(to_wkt(&line), "LINESTRING(0 0,1 1)");
///
/// let p = Point3D::<Cartesian>::new(1, 2, 3.0).unwrap().with_srid(Some(4326));
/// assert_eq!(to_wkt(&p), "POINT Z(1 2 3)");
/// ```
pub fn to_wkt<S: Spatial + ?Sized>(geometry: &S) -> String {
    WktDisplay(geometry).to_string()
}

/// Render as EWKT: WKT prefixed by `SRID=<n>;` when the geometry has one.
///
/// # Example
///
/// ```
/// use geocolumn_core::{wkt::to_ewkt, Geodetic, Point};
///
/// let p = Point::<Geodetic>::from_lon_lat(-73.5, 45.5).unwrap();
/// assert_eq!(to_ewkt(&p), "POINT(-73.5 45.5)");
/// assert_eq!(to_ewkt(&p.with_srid(Some(4326))), "SRID=4326;POINT(-73.5 45.5)");
/// ```
pub fn to_ewkt<S: Spatial + ?Sized>(geometry: &S) -> String {
    with_srid_prefix(geometry, geometry.srid())
}

/// Render as EWKT with an explicit SRID instead of the geometry's own.
pub(crate) fn with_srid_prefix<S: Spatial + ?Sized>(geometry: &S, srid: Option<i32>) -> String {
    match srid {
        Some(srid) => format!("SRID={srid};{}", WktDisplay(geometry)),
        None => to_wkt(geometry),
    }
}

/// Split an optional leading `SRID=<n>;`.
fn split_srid(text: &str) -> Result<(Option<i32>, &str)> {
    let has_prefix = text
        .get(..5)
        .is_some_and(|head| head.eq_ignore_ascii_case("SRID="));
    if !has_prefix {
        return Ok((None, text));
    }

    let rest = &text[5..];
    let (value, geometry) = rest
        .split_once(';')
        .ok_or_else(|| SpatialError::InvalidSrid(rest.to_string()))?;
    let value = value.trim();
    let srid = value
        .parse::<i32>()
        .map_err(|_| SpatialError::InvalidSrid(value.to_string()))?;
    Ok((Some(srid), geometry.trim_start()))
}

/// Parse WKT or EWKT into the structured value handed to the dispatcher.
///
/// # Example
///
/// ```
/// use geocolumn_core::wkt::parse_ewkt;
///
/// let raw = parse_ewkt("SRID=3857;LINESTRING(0 0,1 1)").unwrap();
/// assert_eq!(raw.type_tag, "LINESTRING");
/// assert_eq!(raw.srid, Some(3857));
///
/// assert!(parse_ewkt("SRID=abc;POINT(1 2)").is_err());
/// ```
pub fn parse_ewkt(text: &str) -> Result<RawGeometry> {
    let (srid, wkt) = split_srid(text.trim())?;
    let mut builder = RawGeometryBuilder::default();
    Wkt(wkt.as_bytes()).process_geom(&mut builder)?;

    let mut raw = builder.finish()?;
    raw.srid = srid;
    Ok(raw)
}

#[derive(Serialize)]
struct JsonGeometry {
    #[serde(rename = "type")]
    kind: &'static str,
    coordinates: Coordinates,
    srid: Option<i32>,
}

/// Render as `{"type": ..., "coordinates": ..., "srid": ...}`.
///
/// # Example
///
/// ```
/// use geocolumn_core::{wkt::to_json, Geodetic, Point};
///
/// let p = Point::<Geodetic>::from_lon_lat("73°30'W", "45°30'N").unwrap();
/// assert_eq!(
///     to_json(&p).unwrap(),
///     r#"{"type":"Point","coordinates":[-73.5,45.5],"srid":null}"#
/// );
/// ```
pub fn to_json<S: Spatial + ?Sized>(geometry: &S) -> Result<String> {
    let json = JsonGeometry {
        kind: geometry.type_tag().name(),
        coordinates: geometry.coordinates(),
        srid: geometry.srid(),
    };
    Ok(serde_json::to_string(&json)?)
}
