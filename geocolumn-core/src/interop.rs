//! Conversion to and from [`geo`] types.
//!
//! `geo` is planar and two dimensional: elevation and moment are dropped on
//! the way out, and polygon rings come back closed.

use crate::collection::GeometryCollection;
use crate::error::Result;
use crate::family::Family;
use crate::geometry::{Geometry, Spatial};
use crate::line_string::LineString;
use crate::multi::{MultiLineString, MultiPoint, MultiPolygon};
use crate::point::Point;
use crate::polygon::Polygon;

fn point_to_geo<F: Family>(point: &Point<F>) -> geo::Point<f64> {
    geo::Point::new(point.x(), point.y())
}

fn line_to_geo<F: Family>(line: &LineString<F>) -> geo::LineString<f64> {
    line.points()
        .iter()
        .map(|p| geo::Coord { x: p.x(), y: p.y() })
        .collect()
}

fn polygon_to_geo<F: Family>(polygon: &Polygon<F>) -> geo::Polygon<f64> {
    let mut rings = polygon.rings().iter().map(line_to_geo);
    let exterior = rings.next().unwrap_or_else(|| geo::LineString(Vec::new()));
    geo::Polygon::new(exterior, rings.collect())
}

/// Project onto a `geo` geometry. The SRID is not carried.
///
/// # Example
///
/// ```
/// use geocolumn_core::interop::to_geo;
/// use geocolumn_core::{Cartesian, Geometry, Point3D};
///
/// let p: Geometry = Point3D::<Cartesian>::new(1, 2, 3.0).unwrap().into();
/// assert_eq!(to_geo(&p), geo::Geometry::Point(geo::Point::new(1.0, 2.0)));
/// ```
pub fn to_geo<F: Family>(geometry: &Geometry<F>) -> geo::Geometry<f64> {
    match geometry {
        Geometry::Point(p) => geo::Geometry::Point(point_to_geo(p)),
        Geometry::PointZ(p) => geo::Geometry::Point(point_to_geo(&p.xy())),
        Geometry::PointZM(p) => geo::Geometry::Point(point_to_geo(&p.xyz().xy())),
        Geometry::LineString(line) => geo::Geometry::LineString(line_to_geo(line)),
        Geometry::Polygon(polygon) => geo::Geometry::Polygon(polygon_to_geo(polygon)),
        Geometry::MultiPoint(points) => geo::Geometry::MultiPoint(geo::MultiPoint(
            points.points().iter().map(point_to_geo).collect(),
        )),
        Geometry::MultiLineString(lines) => geo::Geometry::MultiLineString(geo::MultiLineString(
            lines.line_strings().iter().map(line_to_geo).collect(),
        )),
        Geometry::MultiPolygon(polygons) => geo::Geometry::MultiPolygon(geo::MultiPolygon(
            polygons.polygons().iter().map(polygon_to_geo).collect(),
        )),
        Geometry::GeometryCollection(collection) => {
            geo::Geometry::GeometryCollection(geo::GeometryCollection(
                collection.geometries().iter().map(to_geo).collect(),
            ))
        }
    }
}

fn point_from_geo<F: Family>(coord: geo::Coord<f64>) -> Result<Point<F>> {
    Point::new(coord.x, coord.y)
}

fn line_from_geo<F: Family>(line: &geo::LineString<f64>) -> Result<LineString<F>> {
    line.0.iter().map(|c| point_from_geo(*c)).collect::<Result<Vec<_>>>().map(LineString::new)
}

fn polygon_from_geo<F: Family>(polygon: &geo::Polygon<f64>) -> Result<Polygon<F>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(line_from_geo)
        .collect::<Result<Vec<_>>>()
        .map(Polygon::new)
}

/// Build from a `geo` geometry, running the family validation on every
/// ordinate. `Line` becomes a two-point line string, `Rect` and `Triangle`
/// become polygons.
///
/// # Example
///
/// ```
/// use geocolumn_core::interop::from_geo;
/// use geocolumn_core::{Geodetic, Spatial};
///
/// let rect = geo::Geometry::Rect(geo::Rect::new((0.0, 0.0), (1.0, 1.0)));
/// let polygon = from_geo::<Geodetic>(rect, Some(4326)).unwrap();
/// assert_eq!(polygon.srid(), Some(4326));
///
/// let far = geo::Geometry::Point(geo::Point::new(0.0, 95.0));
/// assert!(from_geo::<Geodetic>(far, None).is_err());
/// ```
pub fn from_geo<F: Family>(geometry: geo::Geometry<f64>, srid: Option<i32>) -> Result<Geometry<F>> {
    let mut converted = match geometry {
        geo::Geometry::Point(p) => Geometry::Point(point_from_geo(p.0)?),
        geo::Geometry::Line(line) => Geometry::LineString(LineString::new(vec![
            point_from_geo(line.start)?,
            point_from_geo(line.end)?,
        ])),
        geo::Geometry::LineString(line) => Geometry::LineString(line_from_geo(&line)?),
        geo::Geometry::Polygon(polygon) => Geometry::Polygon(polygon_from_geo(&polygon)?),
        geo::Geometry::MultiPoint(points) => Geometry::MultiPoint(MultiPoint::new(
            points
                .0
                .iter()
                .map(|p| point_from_geo(p.0))
                .collect::<Result<_>>()?,
        )),
        geo::Geometry::MultiLineString(lines) => Geometry::MultiLineString(MultiLineString::new(
            lines.0.iter().map(line_from_geo).collect::<Result<_>>()?,
        )),
        geo::Geometry::MultiPolygon(polygons) => Geometry::MultiPolygon(MultiPolygon::new(
            polygons.0.iter().map(polygon_from_geo).collect::<Result<_>>()?,
        )),
        geo::Geometry::GeometryCollection(collection) => {
            Geometry::GeometryCollection(GeometryCollection::new(
                collection
                    .0
                    .into_iter()
                    .map(|member| from_geo::<F>(member, None))
                    .collect::<Result<_>>()?,
            ))
        }
        geo::Geometry::Rect(rect) => Geometry::Polygon(polygon_from_geo(&rect.to_polygon())?),
        geo::Geometry::Triangle(triangle) => {
            Geometry::Polygon(polygon_from_geo(&triangle.to_polygon())?)
        }
    };
    converted.set_srid(srid);
    Ok(converted)
}
