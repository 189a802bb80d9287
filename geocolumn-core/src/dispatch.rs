//! Turn a `(family, tag, value, srid)` request into a typed geometry.
//!
//! The family picks the validation policy, the tag picks the shape, and the
//! value must have the nesting depth the shape expects:
//!
//! | tag                  | value                                       |
//! |----------------------|---------------------------------------------|
//! | `POINT`              | `[x, y]`                                    |
//! | `POINT Z`            | `[x, y, z]`                                 |
//! | `POINT ZM`           | `[x, y, z, unix_seconds]`                   |
//! | `LINESTRING`         | `[[x, y], ...]`                             |
//! | `POLYGON`            | `[[[x, y], ...], ...]`                      |
//! | `MULTIPOINT`         | `[[x, y], ...]`                             |
//! | `MULTILINESTRING`    | `[[[x, y], ...], ...]`                      |
//! | `MULTIPOLYGON`       | `[[[[x, y], ...], ...], ...]`               |
//! | `GEOMETRYCOLLECTION` | `[<tagged geometry>, ...]`                  |

use crate::collection::GeometryCollection;
use crate::error::{Result, SpatialError};
use crate::family::{Cartesian, Family, FamilyKind, Geodetic};
use crate::geometry::{Geometry, Spatial, TypeTag};
use crate::line_string::LineString;
use crate::multi::{MultiLineString, MultiPoint, MultiPolygon};
use crate::point::{moment_from_timestamp, Point, Point3D, Point4D};
use crate::polygon::Polygon;
use crate::raw::{RawGeometry, RawValue};

/// A geometry of either family, as produced by the runtime dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum SpatialValue {
    Geometry(Geometry<Cartesian>),
    Geography(Geometry<Geodetic>),
}

impl SpatialValue {
    pub fn family(&self) -> FamilyKind {
        match self {
            SpatialValue::Geometry(_) => FamilyKind::Geometry,
            SpatialValue::Geography(_) => FamilyKind::Geography,
        }
    }

    pub fn type_tag(&self) -> TypeTag {
        match self {
            SpatialValue::Geometry(g) => g.type_tag(),
            SpatialValue::Geography(g) => g.type_tag(),
        }
    }

    pub fn srid(&self) -> Option<i32> {
        match self {
            SpatialValue::Geometry(g) => g.srid(),
            SpatialValue::Geography(g) => g.srid(),
        }
    }

    pub fn into_geometry(self) -> Option<Geometry<Cartesian>> {
        match self {
            SpatialValue::Geometry(g) => Some(g),
            SpatialValue::Geography(_) => None,
        }
    }

    pub fn into_geography(self) -> Option<Geometry<Geodetic>> {
        match self {
            SpatialValue::Geography(g) => Some(g),
            SpatialValue::Geometry(_) => None,
        }
    }
}

/// Build a geometry of the family named at runtime.
///
/// # Example
///
/// ```
/// use geocolumn_core::dispatch::{construct, SpatialValue};
/// use geocolumn_core::{FamilyKind, Spatial};
///
/// let value = construct(FamilyKind::Geometry, "POINT", vec![2.0, 3.0].into(), None).unwrap();
/// let SpatialValue::Geometry(point) = value else { unreachable!() };
/// assert_eq!(point.to_string(), "2 3");
/// assert_eq!(point.srid(), None);
///
/// let err = construct(FamilyKind::Geometry, "BLOB", vec![2.0, 3.0].into(), None).unwrap_err();
/// assert_eq!(err.to_string(), "Unsupported Geometry type \"BLOB\".");
/// ```
pub fn construct(
    family: FamilyKind,
    tag: &str,
    value: RawValue,
    srid: Option<i32>,
) -> Result<SpatialValue> {
    match family {
        FamilyKind::Geometry => construct_as::<Cartesian>(tag, value, srid).map(SpatialValue::Geometry),
        FamilyKind::Geography => construct_as::<Geodetic>(tag, value, srid).map(SpatialValue::Geography),
    }
}

/// Build a decoded geometry for the family named at runtime.
pub fn construct_raw(family: FamilyKind, raw: RawGeometry) -> Result<SpatialValue> {
    construct(family, &raw.type_tag, raw.value, raw.srid)
}

/// Build a geometry whose family is known statically.
pub fn construct_as<F: Family>(tag: &str, value: RawValue, srid: Option<i32>) -> Result<Geometry<F>> {
    let type_tag = TypeTag::parse(tag).ok_or_else(|| SpatialError::UnsupportedType {
        family: F::KIND,
        tag: tag.to_string(),
    })?;
    log::debug!("constructing {} {type_tag} with SRID {srid:?}", F::KIND);

    let mut geometry = build::<F>(type_tag, value)?;
    geometry.set_srid(srid);
    Ok(geometry)
}

fn build<F: Family>(tag: TypeTag, value: RawValue) -> Result<Geometry<F>> {
    let geometry = match tag {
        TypeTag::Point => Geometry::Point(point(tag, value)?),
        TypeTag::PointZ => {
            let [x, y, z] = ordinates::<3>(tag, value, "three ordinates")?;
            Geometry::PointZ(Point3D::new(x, y, z)?)
        }
        TypeTag::PointZM => {
            let [x, y, z, t] = ordinates::<4>(tag, value, "four ordinates")?;
            Geometry::PointZM(Point4D::new(x, y, z, moment_from_timestamp(t)?)?)
        }
        TypeTag::LineString => Geometry::LineString(line_string(tag, value)?),
        TypeTag::Polygon => Geometry::Polygon(polygon(tag, value)?),
        TypeTag::MultiPoint => Geometry::MultiPoint(MultiPoint::new(points(tag, value)?)),
        TypeTag::MultiLineString => Geometry::MultiLineString(MultiLineString::new(
            sequence(tag, value, "a list of point lists")?
                .into_iter()
                .map(|item| line_string(tag, item))
                .collect::<Result<_>>()?,
        )),
        TypeTag::MultiPolygon => Geometry::MultiPolygon(MultiPolygon::new(
            sequence(tag, value, "a list of ring lists")?
                .into_iter()
                .map(|item| polygon(tag, item))
                .collect::<Result<_>>()?,
        )),
        TypeTag::GeometryCollection => Geometry::GeometryCollection(GeometryCollection::new(
            sequence(tag, value, "a list of geometries")?
                .into_iter()
                .map(|item| match item {
                    RawValue::Geometry(raw) => construct_as::<F>(&raw.type_tag, raw.value, raw.srid),
                    _ => Err(shape_error(tag, "a list of geometries")),
                })
                .collect::<Result<_>>()?,
        )),
    };
    Ok(geometry)
}

fn shape_error(tag: TypeTag, expected: &'static str) -> SpatialError {
    SpatialError::InvalidShape { tag, expected }
}

fn ordinates<const N: usize>(tag: TypeTag, value: RawValue, expected: &'static str) -> Result<[f64; N]> {
    match value {
        RawValue::Coordinates(values) => values
            .try_into()
            .map_err(|_| shape_error(tag, expected)),
        _ => Err(shape_error(tag, expected)),
    }
}

fn sequence(tag: TypeTag, value: RawValue, expected: &'static str) -> Result<Vec<RawValue>> {
    match value {
        RawValue::Sequence(items) => Ok(items),
        _ => Err(shape_error(tag, expected)),
    }
}

fn point<F: Family>(tag: TypeTag, value: RawValue) -> Result<Point<F>> {
    let [x, y] = ordinates::<2>(tag, value, "a pair of ordinates")?;
    Point::new(x, y)
}

fn points<F: Family>(tag: TypeTag, value: RawValue) -> Result<Vec<Point<F>>> {
    sequence(tag, value, "a list of ordinate pairs")?
        .into_iter()
        .map(|item| point(tag, item))
        .collect()
}

fn line_string<F: Family>(tag: TypeTag, value: RawValue) -> Result<LineString<F>> {
    Ok(LineString::new(points(tag, value)?))
}

fn polygon<F: Family>(tag: TypeTag, value: RawValue) -> Result<Polygon<F>> {
    Ok(Polygon::new(
        sequence(tag, value, "a list of rings")?
            .into_iter()
            .map(|ring| line_string(tag, ring))
            .collect::<Result<_>>()?,
    ))
}
