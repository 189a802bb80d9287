//! EWKB (Extended Well-Known Binary) parser and writer.
//!
//! Wire format:
//!   [0x01|0x00]   byte order marker (little-endian or big-endian)
//!   [u32]         geometry type with flags (in the declared byte order)
//!                   Bit 29 (0x20000000): SRID present
//!                   Bit 31 (0x80000000): Z dimension
//!                   Bit 30 (0x40000000): M dimension
//!                   Bits 0-28: geometry type (1=Point, 2=LineString, ...)
//!   [i32]         SRID (only when SRID flag set, in declared byte order)
//!   ...           WKB geometry payload
//!
//! `POINT ZM` stores its moment in the M ordinate as Unix seconds.

use geozero::wkb::Ewkb;
use geozero::{CoordDimensions, GeomProcessor, GeozeroGeometry, ToWkb};

use crate::error::{Result, SpatialError};
use crate::family::Family;
use crate::geometry::{Geometry, TypeTag};
use crate::line_string::LineString;
use crate::point::moment_to_timestamp;
use crate::polygon::Polygon;
use crate::raw::{RawGeometry, RawGeometryBuilder};

// ── EWKB flag constants ───────────────────────────────────────────────────────
pub const EWKB_SRID_FLAG: u32 = 0x20000000;
pub const EWKB_Z_FLAG: u32 = 0x80000000;
pub const EWKB_M_FLAG: u32 = 0x40000000;

// ── Geometry type codes (ISO WKB) ─────────────────────────────────────────────
pub const WKB_POINT: u32 = 1;
pub const WKB_LINESTRING: u32 = 2;
pub const WKB_POLYGON: u32 = 3;
pub const WKB_MULTIPOINT: u32 = 4;
pub const WKB_MULTILINESTRING: u32 = 5;
pub const WKB_MULTIPOLYGON: u32 = 6;
pub const WKB_GEOMETRYCOLLECTION: u32 = 7;

fn dimensions_label(has_z: bool, has_m: bool) -> &'static str {
    match (has_z, has_m) {
        (true, true) => "ZM",
        (true, false) => "Z",
        (false, true) => "M",
        (false, false) => "XY",
    }
}

/// Parsed EWKB header metadata.
#[derive(Debug, Clone)]
pub struct EwkbHeader {
    /// Base geometry type code (1=Point, 2=LineString, ..., 7=GeometryCollection).
    pub geom_type: u32,
    /// SRID embedded in the EWKB, if the SRID flag is set.
    pub srid: Option<i32>,
    /// Whether the geometry has Z coordinates.
    pub has_z: bool,
    /// Whether the geometry has M coordinates.
    pub has_m: bool,
    /// Byte offset where the geometry payload starts (after header + optional SRID).
    pub data_offset: usize,
    /// Whether numeric header fields are encoded in little-endian order.
    pub little_endian: bool,
}

impl EwkbHeader {
    /// The shape announced by the header. Z and M are only meaningful on
    /// points; any other combination yields `None`.
    pub fn type_tag(&self) -> Option<TypeTag> {
        let tag = match (self.geom_type, self.has_z, self.has_m) {
            (WKB_POINT, false, false) => TypeTag::Point,
            (WKB_POINT, true, false) => TypeTag::PointZ,
            (WKB_POINT, true, true) => TypeTag::PointZM,
            (WKB_LINESTRING, false, false) => TypeTag::LineString,
            (WKB_POLYGON, false, false) => TypeTag::Polygon,
            (WKB_MULTIPOINT, false, false) => TypeTag::MultiPoint,
            (WKB_MULTILINESTRING, false, false) => TypeTag::MultiLineString,
            (WKB_MULTIPOLYGON, false, false) => TypeTag::MultiPolygon,
            (WKB_GEOMETRYCOLLECTION, false, false) => TypeTag::GeometryCollection,
            _ => return None,
        };
        Some(tag)
    }
}

/// Peek at the EWKB header without fully parsing the geometry.
///
/// # Example
///
/// ```
/// use geocolumn_core::ewkb::{parse_ewkb_header, write_ewkb, WKB_POINT};
/// use geocolumn_core::{Cartesian, Geometry, Point};
///
/// let point: Geometry = Point::<Cartesian>::new(1, 2).unwrap().into();
/// let blob = write_ewkb(&point, Some(4326)).unwrap();
/// let hdr = parse_ewkb_header(&blob).unwrap();
/// assert_eq!(hdr.geom_type, WKB_POINT);
/// assert_eq!(hdr.srid, Some(4326));
/// ```
pub fn parse_ewkb_header(blob: &[u8]) -> Result<EwkbHeader> {
    let little_endian = match blob.first() {
        Some(0x01) => true,
        Some(0x00) => false,
        Some(_) => return Err(SpatialError::InvalidEwkb("invalid byte order marker")),
        None => return Err(SpatialError::InvalidEwkb("blob too short")),
    };
    let word_at = |offset: usize| -> Option<u32> {
        let bytes: [u8; 4] = blob.get(offset..offset + 4)?.try_into().ok()?;
        Some(match little_endian {
            true => u32::from_le_bytes(bytes),
            false => u32::from_be_bytes(bytes),
        })
    };

    let type_word = word_at(1).ok_or(SpatialError::InvalidEwkb("blob too short"))?;
    let srid = match type_word & EWKB_SRID_FLAG {
        0 => None,
        _ => {
            let word = word_at(5).ok_or(SpatialError::InvalidEwkb(
                "SRID flag set but blob too short",
            ))?;
            Some(word as i32)
        }
    };

    Ok(EwkbHeader {
        geom_type: type_word & !(EWKB_SRID_FLAG | EWKB_Z_FLAG | EWKB_M_FLAG),
        srid,
        has_z: type_word & EWKB_Z_FLAG != 0,
        has_m: type_word & EWKB_M_FLAG != 0,
        data_offset: if srid.is_some() { 9 } else { 5 },
        little_endian,
    })
}

/// Extract only the SRID from an EWKB blob (cheap, no geometry parsing).
pub fn extract_srid(blob: &[u8]) -> Option<i32> {
    parse_ewkb_header(blob).ok().and_then(|h| h.srid)
}

/// Parse an EWKB blob into the structured value handed to the dispatcher.
///
/// # Example
///
/// ```
/// use geocolumn_core::ewkb::{parse_ewkb, write_ewkb};
/// use geocolumn_core::{Cartesian, Geometry, LineString};
///
/// let line: Geometry = LineString::<Cartesian>::from_positions([[0, 0], [1, 1]]).unwrap().into();
/// let raw = parse_ewkb(&write_ewkb(&line, Some(3857)).unwrap()).unwrap();
/// assert_eq!(raw.type_tag, "LINESTRING");
/// assert_eq!(raw.srid, Some(3857));
/// ```
pub fn parse_ewkb(blob: &[u8]) -> Result<RawGeometry> {
    let header = parse_ewkb_header(blob)?;
    if header.type_tag().is_none() {
        return Err(if header.has_z || header.has_m {
            SpatialError::UnsupportedDimensions {
                dimensions: dimensions_label(header.has_z, header.has_m),
            }
        } else {
            SpatialError::InvalidEwkb("unsupported geometry type")
        });
    }

    let mut builder = RawGeometryBuilder::default();
    Ewkb(blob).process_geom(&mut builder)?;
    let mut raw = builder.finish()?;
    raw.srid = header.srid;
    Ok(raw)
}

/// Serialise a geometry to EWKB with an optional SRID.
///
/// If `srid` is `None`, no SRID flag is written. `POINT Z` and `POINT ZM`
/// set the Z and M flags; every other shape is written in XY.
///
/// A collection holding a `POINT Z` or `POINT ZM` member at any depth fails
/// with [`SpatialError::UnsupportedDimensions`]: EWKB declares dimensions
/// per geometry and the reader rejects flagged members of an XY collection.
pub fn write_ewkb<F: Family>(geometry: &Geometry<F>, srid: Option<i32>) -> Result<Vec<u8>> {
    let dims = match geometry {
        Geometry::PointZ(_) => CoordDimensions::xyz(),
        Geometry::PointZM(_) => CoordDimensions::xyzm(),
        Geometry::GeometryCollection(collection) => {
            if let Some(dimensions) = collection.geometries().iter().find_map(extra_dimensions) {
                return Err(SpatialError::UnsupportedDimensions { dimensions });
            }
            CoordDimensions::xy()
        }
        _ => CoordDimensions::xy(),
    };
    Ok(geometry.to_ewkb(dims, srid)?)
}

fn extra_dimensions<F: Family>(geometry: &Geometry<F>) -> Option<&'static str> {
    match geometry {
        Geometry::PointZ(_) => Some(dimensions_label(true, false)),
        Geometry::PointZM(_) => Some(dimensions_label(true, true)),
        Geometry::GeometryCollection(collection) => {
            collection.geometries().iter().find_map(extra_dimensions)
        }
        _ => None,
    }
}

impl<F: Family> GeozeroGeometry for Geometry<F> {
    fn process_geom<P: GeomProcessor>(&self, processor: &mut P) -> geozero::error::Result<()> {
        process_geometry(self, 0, processor)
    }
}

fn process_geometry<F: Family, P: GeomProcessor>(
    geometry: &Geometry<F>,
    idx: usize,
    processor: &mut P,
) -> geozero::error::Result<()> {
    match geometry {
        Geometry::Point(point) => {
            processor.point_begin(idx)?;
            processor.xy(point.x(), point.y(), 0)?;
            processor.point_end(idx)
        }
        Geometry::PointZ(point) => {
            processor.point_begin(idx)?;
            processor.coordinate(point.x(), point.y(), Some(point.z()), None, None, None, 0)?;
            processor.point_end(idx)
        }
        Geometry::PointZM(point) => {
            let m = moment_to_timestamp(&point.moment());
            processor.point_begin(idx)?;
            processor.coordinate(point.x(), point.y(), Some(point.z()), Some(m), None, None, 0)?;
            processor.point_end(idx)
        }
        Geometry::LineString(line) => process_line_string(line, true, idx, processor),
        Geometry::Polygon(polygon) => process_polygon(polygon, true, idx, processor),
        Geometry::MultiPoint(points) => {
            processor.multipoint_begin(points.len(), idx)?;
            for (i, point) in points.points().iter().enumerate() {
                processor.xy(point.x(), point.y(), i)?;
            }
            processor.multipoint_end(idx)
        }
        Geometry::MultiLineString(lines) => {
            processor.multilinestring_begin(lines.len(), idx)?;
            for (i, line) in lines.line_strings().iter().enumerate() {
                process_line_string(line, false, i, processor)?;
            }
            processor.multilinestring_end(idx)
        }
        Geometry::MultiPolygon(polygons) => {
            processor.multipolygon_begin(polygons.len(), idx)?;
            for (i, polygon) in polygons.polygons().iter().enumerate() {
                process_polygon(polygon, false, i, processor)?;
            }
            processor.multipolygon_end(idx)
        }
        Geometry::GeometryCollection(collection) => {
            processor.geometrycollection_begin(collection.len(), idx)?;
            for (i, member) in collection.geometries().iter().enumerate() {
                process_geometry(member, i, processor)?;
            }
            processor.geometrycollection_end(idx)
        }
    }
}

fn process_line_string<F: Family, P: GeomProcessor>(
    line: &LineString<F>,
    tagged: bool,
    idx: usize,
    processor: &mut P,
) -> geozero::error::Result<()> {
    processor.linestring_begin(tagged, line.len(), idx)?;
    for (i, point) in line.points().iter().enumerate() {
        processor.xy(point.x(), point.y(), i)?;
    }
    processor.linestring_end(tagged, idx)
}

fn process_polygon<F: Family, P: GeomProcessor>(
    polygon: &Polygon<F>,
    tagged: bool,
    idx: usize,
    processor: &mut P,
) -> geozero::error::Result<()> {
    processor.polygon_begin(tagged, polygon.rings().len(), idx)?;
    for (i, ring) in polygon.rings().iter().enumerate() {
        process_line_string(ring, false, i, processor)?;
    }
    processor.polygon_end(tagged, idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::GeometryCollection;
    use crate::family::{Cartesian, Geodetic};
    use crate::multi::{MultiLineString, MultiPoint, MultiPolygon};
    use crate::point::{Point, Point3D, Point4D};
    use crate::raw::RawValue;

    fn point_blob(srid: Option<i32>) -> Vec<u8> {
        let point: Geometry = Point::<Cartesian>::new(1, 2).unwrap().into();
        write_ewkb(&point, srid).unwrap()
    }

    /// Header bytes followed by `payload` doubles, in the requested order.
    fn encode(little_endian: bool, type_word: u32, srid: Option<i32>, payload: &[f64]) -> Vec<u8> {
        let mut blob = vec![u8::from(little_endian)];
        let type_word = type_word | srid.map_or(0, |_| EWKB_SRID_FLAG);
        match little_endian {
            true => blob.extend_from_slice(&type_word.to_le_bytes()),
            false => blob.extend_from_slice(&type_word.to_be_bytes()),
        }
        if let Some(srid) = srid {
            match little_endian {
                true => blob.extend_from_slice(&srid.to_le_bytes()),
                false => blob.extend_from_slice(&srid.to_be_bytes()),
            }
        }
        for v in payload {
            match little_endian {
                true => blob.extend_from_slice(&v.to_le_bytes()),
                false => blob.extend_from_slice(&v.to_be_bytes()),
            }
        }
        blob
    }

    #[test]
    fn header_reads_both_byte_orders() {
        for little_endian in [true, false] {
            let plain = parse_ewkb_header(&encode(little_endian, WKB_LINESTRING, None, &[])).unwrap();
            assert_eq!(plain.geom_type, WKB_LINESTRING);
            assert_eq!(plain.srid, None);
            assert_eq!(plain.data_offset, 5);
            assert_eq!(plain.little_endian, little_endian);

            let tagged =
                parse_ewkb_header(&encode(little_endian, WKB_POLYGON, Some(-1), &[])).unwrap();
            assert_eq!(tagged.srid, Some(-1));
            assert_eq!(tagged.data_offset, 9);
            assert_eq!(tagged.type_tag(), Some(TypeTag::Polygon));
        }
    }

    #[test]
    fn header_flags_map_to_point_tags() {
        let cases = [
            (WKB_POINT, Some(TypeTag::Point)),
            (WKB_POINT | EWKB_Z_FLAG, Some(TypeTag::PointZ)),
            (WKB_POINT | EWKB_Z_FLAG | EWKB_M_FLAG, Some(TypeTag::PointZM)),
            (WKB_POINT | EWKB_M_FLAG, None),
            (WKB_MULTIPOINT | EWKB_Z_FLAG, None),
            (WKB_GEOMETRYCOLLECTION, Some(TypeTag::GeometryCollection)),
        ];
        for (type_word, expected) in cases {
            let header = parse_ewkb_header(&encode(true, type_word, Some(4326), &[])).unwrap();
            assert_eq!(header.type_tag(), expected, "type word {type_word:#x}");
        }
    }

    #[test]
    fn header_rejects_malformed_prefixes() {
        let srid_without_room = encode(true, WKB_POINT | EWKB_SRID_FLAG, None, &[]);
        let cases: [(&[u8], &str); 4] = [
            (&[], "blob too short"),
            (&[0x01, 0x02], "blob too short"),
            (&[0x02, 0x01, 0x00, 0x00, 0x00], "invalid byte order marker"),
            (srid_without_room.as_slice(), "SRID flag set but blob too short"),
        ];
        for (blob, reason) in cases {
            match parse_ewkb_header(blob) {
                Err(SpatialError::InvalidEwkb(found)) => assert_eq!(found, reason),
                other => panic!("{blob:?} gave {other:?}"),
            }
        }
    }

    #[test]
    fn extract_srid_malformed_blob() {
        assert_eq!(extract_srid(&[]), None);
        assert_eq!(extract_srid(&[0xFF, 0xFF]), None);
    }

    #[test]
    fn write_ewkb_without_srid() {
        let blob = point_blob(None);
        assert_eq!(extract_srid(&blob), None);
        // byte order(1) + type(4) + x(8) + y(8)
        assert_eq!(blob.len(), 21);
    }

    #[test]
    fn write_ewkb_with_srid() {
        let blob = point_blob(Some(4326));
        assert_eq!(extract_srid(&blob), Some(4326));
        // byte order(1) + type(4) + srid(4) + x(8) + y(8)
        assert_eq!(blob.len(), 25);
    }

    #[test]
    fn point_z_sets_the_z_flag() {
        let point: Geometry = Point3D::<Cartesian>::new(1, 2, 3.0).unwrap().into();
        let blob = write_ewkb(&point, Some(4326)).unwrap();
        let hdr = parse_ewkb_header(&blob).unwrap();
        assert!(hdr.has_z);
        assert!(!hdr.has_m);
        assert_eq!(hdr.type_tag(), Some(TypeTag::PointZ));
        assert_eq!(blob.len(), 33);

        let raw = parse_ewkb(&blob).unwrap();
        assert_eq!(raw, RawGeometry::new("POINT Z", [1.0, 2.0, 3.0], Some(4326)));
    }

    #[test]
    fn point_zm_carries_the_moment_in_m() {
        let moment = chrono::DateTime::from_timestamp(86_400, 0).unwrap();
        let point: Geometry<Geodetic> = Point4D::from_lon_lat(10, 20, 30.0, moment).unwrap().into();
        let blob = write_ewkb(&point, None).unwrap();
        let hdr = parse_ewkb_header(&blob).unwrap();
        assert_eq!(hdr.type_tag(), Some(TypeTag::PointZM));

        let raw = parse_ewkb(&blob).unwrap();
        assert_eq!(raw.value, RawValue::Coordinates(vec![10.0, 20.0, 30.0, 86_400.0]));
    }

    #[test]
    fn measure_only_points_are_rejected() {
        let blob = encode(true, WKB_POINT | EWKB_M_FLAG, None, &[1.0, 2.0, 3.0]);
        let err = parse_ewkb(&blob).expect_err("XYM payloads are not representable");
        assert_eq!(err.to_string(), "unsupported coordinate dimensions: M");
    }

    #[test]
    fn unknown_type_code_is_rejected() {
        let mut blob = vec![0x01];
        blob.extend_from_slice(&42u32.to_le_bytes());
        assert!(matches!(parse_ewkb(&blob), Err(SpatialError::InvalidEwkb(_))));
    }

    #[test]
    fn parse_big_endian_ewkb_point() {
        let blob = encode(false, WKB_POINT, Some(4326), &[10.0, -20.0]);
        let raw = parse_ewkb(&blob).unwrap();
        assert_eq!(raw, RawGeometry::new("POINT", [10.0, -20.0], Some(4326)));
    }

    #[test]
    fn truncated_payload_is_an_error() {
        let mut truncated = vec![0x01];
        truncated.extend_from_slice(&WKB_LINESTRING.to_le_bytes());
        truncated.extend_from_slice(&1u32.to_le_bytes());
        assert!(parse_ewkb(&truncated).is_err());
    }

    #[test]
    fn hostile_element_counts_fail_without_allocating() {
        // Line string announcing u32::MAX points with no payload behind it.
        assert!(parse_ewkb(&[0x01, 2, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF]).is_err());

        for code in [WKB_POLYGON, WKB_MULTIPOINT, WKB_MULTIPOLYGON, WKB_GEOMETRYCOLLECTION] {
            let mut blob = encode(true, code, Some(4326), &[]);
            blob.extend_from_slice(&u32::MAX.to_le_bytes());
            blob.extend_from_slice(&[0x01, 0x01, 0x00]);
            assert!(parse_ewkb(&blob).is_err(), "type code {code}");
        }
    }

    #[test]
    fn collections_with_z_members_are_refused() {
        let z: Geometry = Point3D::<Cartesian>::new(1, 2, 3.0).unwrap().into();
        let flat = GeometryCollection::new(vec![Point::new(0, 0).unwrap().into(), z]);
        let err = write_ewkb(&Geometry::from(flat.clone()), None).unwrap_err();
        assert!(matches!(err, SpatialError::UnsupportedDimensions { dimensions: "Z" }));

        let moment = chrono::DateTime::from_timestamp(0, 0).unwrap();
        let zm: Geometry = Point4D::<Cartesian>::new(1, 2, 3.0, moment).unwrap().into();
        let nested = GeometryCollection::new(vec![GeometryCollection::new(vec![zm]).into()]);
        let err = write_ewkb(&Geometry::from(nested), Some(4326)).unwrap_err();
        assert_eq!(err.to_string(), "unsupported coordinate dimensions: ZM");

        // The text form keeps every ordinate.
        assert_eq!(
            crate::wkt::to_ewkt(&flat.with_srid(Some(3857))),
            "SRID=3857;GEOMETRYCOLLECTION(POINT(0 0),POINT Z(1 2 3))"
        );
    }

    #[test]
    fn containers_round_trip_through_raw_values() {
        let ring = LineString::<Cartesian>::from_positions([[0, 0], [4, 0], [4, 4], [0, 0]]).unwrap();
        let polygon = Polygon::new(vec![ring.clone()]);
        let shapes: Vec<Geometry> = vec![
            ring.clone().into(),
            polygon.clone().into(),
            MultiPoint::<Cartesian>::from_positions([[1, 2], [3, 4]]).unwrap().into(),
            MultiLineString::new(vec![ring.clone(), ring]).into(),
            MultiPolygon::new(vec![polygon.clone(), polygon]).into(),
            GeometryCollection::new(vec![Point::new(5, 6).unwrap().into()]).into(),
        ];

        for shape in shapes {
            let raw = parse_ewkb(&write_ewkb(&shape, Some(3857)).unwrap()).unwrap();
            assert_eq!(raw.srid, Some(3857));
            let rebuilt = crate::dispatch::construct_as::<Cartesian>(&raw.type_tag, raw.value, raw.srid)
                .unwrap();
            assert_eq!(rebuilt, {
                let mut expected = shape.clone();
                crate::geometry::Spatial::set_srid(&mut expected, Some(3857));
                expected
            });
        }
    }
}
