//! Conversion between geometries and their database-bound representations.
//!
//! Outbound values carry the SRID the database should see: the geometry's
//! own, or [`DEFAULT_GEOGRAPHY_SRID`] for a geography without one. Inbound
//! values may be EWKT text or EWKB bytes; the first byte decides which.

use crate::dispatch::{construct_as, construct_raw, SpatialValue};
use crate::error::{Result, SpatialError};
use crate::ewkb::{parse_ewkb, write_ewkb};
use crate::family::{Family, FamilyKind};
use crate::geometry::{Geometry, Spatial};
use crate::raw::RawGeometry;
use crate::wkt::{parse_ewkt, with_srid_prefix};

/// WGS 84.
pub const DEFAULT_GEOGRAPHY_SRID: i32 = 4326;

/// SRID written to the database. The geometry itself is left untouched.
///
/// # Example
///
/// ```
/// use geocolumn_core::conversion::database_srid;
/// use geocolumn_core::{Cartesian, Geodetic, Point, Spatial};
///
/// let geography = Point::<Geodetic>::from_lon_lat(1, 2).unwrap();
/// assert_eq!(database_srid(&geography), Some(4326));
/// assert_eq!(geography.srid(), None);
///
/// let geometry = Point::<Cartesian>::new(1, 2).unwrap();
/// assert_eq!(database_srid(&geometry), None);
/// ```
pub fn database_srid<S: Spatial + ?Sized>(geometry: &S) -> Option<i32> {
    match (geometry.srid(), geometry.family()) {
        (Some(srid), _) => Some(srid),
        (None, FamilyKind::Geography) => Some(DEFAULT_GEOGRAPHY_SRID),
        (None, FamilyKind::Geometry) => None,
    }
}

/// EWKT with the database SRID.
///
/// # Example
///
/// ```
/// use geocolumn_core::conversion::to_database_text;
/// use geocolumn_core::{Geodetic, Point};
///
/// let p = Point::<Geodetic>::from_lon_lat(-73.5, 45.5).unwrap();
/// assert_eq!(to_database_text(&p), "SRID=4326;POINT(-73.5 45.5)");
/// ```
pub fn to_database_text<S: Spatial + ?Sized>(geometry: &S) -> String {
    with_srid_prefix(geometry, database_srid(geometry))
}

/// EWKB with the database SRID.
pub fn to_database_binary<F: Family>(geometry: &Geometry<F>) -> Result<Vec<u8>> {
    write_ewkb(geometry, database_srid(geometry))
}

fn looks_like_text(bytes: &[u8]) -> bool {
    bytes.first().is_some_and(u8::is_ascii_alphabetic)
}

fn decode(bytes: &[u8]) -> Result<RawGeometry> {
    if looks_like_text(bytes) {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| SpatialError::InvalidEwkb("text value is not valid UTF-8"))?;
        log::debug!("decoding database value as EWKT ({} bytes)", bytes.len());
        parse_ewkt(text)
    } else {
        log::debug!("decoding database value as EWKB ({} bytes)", bytes.len());
        parse_ewkb(bytes)
    }
}

/// Decode EWKT returned by the database.
pub fn from_database_text(family: FamilyKind, text: &str) -> Result<SpatialValue> {
    construct_raw(family, parse_ewkt(text)?)
}

/// Decode EWKB returned by the database.
pub fn from_database_binary(family: FamilyKind, blob: &[u8]) -> Result<SpatialValue> {
    construct_raw(family, parse_ewkb(blob)?)
}

/// Decode a database value that may be either EWKT or EWKB.
///
/// # Example
///
/// ```
/// use geocolumn_core::conversion::from_database_value;
/// use geocolumn_core::dispatch::SpatialValue;
/// use geocolumn_core::FamilyKind;
///
/// let value = from_database_value(FamilyKind::Geography, b"SRID=4326;POINT(10 20)").unwrap();
/// assert_eq!(value.family(), FamilyKind::Geography);
/// assert_eq!(value.srid(), Some(4326));
/// ```
pub fn from_database_value(family: FamilyKind, bytes: &[u8]) -> Result<SpatialValue> {
    construct_raw(family, decode(bytes)?)
}

/// Decode a database value into a geometry of a statically known family.
pub fn geometry_from_database<F: Family>(bytes: &[u8]) -> Result<Geometry<F>> {
    let raw = decode(bytes)?;
    construct_as::<F>(&raw.type_tag, raw.value, raw.srid)
}
