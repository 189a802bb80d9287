//! The geometry value model: type tags, the `Spatial` capability set shared
//! by every shape, and the `Geometry` sum type the dispatcher produces.

use std::fmt;

use serde::Serialize;

use crate::collection::GeometryCollection;
use crate::family::{Cartesian, Family, FamilyKind};
use crate::line_string::LineString;
use crate::multi::{MultiLineString, MultiPoint, MultiPolygon};
use crate::point::{Point, Point3D, Point4D};
use crate::polygon::Polygon;

/// Closed set of shapes understood by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
    PointZ,
    PointZM,
}

impl TypeTag {
    pub const ALL: [TypeTag; 9] = [
        TypeTag::Point,
        TypeTag::LineString,
        TypeTag::Polygon,
        TypeTag::MultiPoint,
        TypeTag::MultiLineString,
        TypeTag::MultiPolygon,
        TypeTag::GeometryCollection,
        TypeTag::PointZ,
        TypeTag::PointZM,
    ];

    /// Upper-case WKT keyword, e.g. `POINT Z`.
    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::Point => "POINT",
            TypeTag::LineString => "LINESTRING",
            TypeTag::Polygon => "POLYGON",
            TypeTag::MultiPoint => "MULTIPOINT",
            TypeTag::MultiLineString => "MULTILINESTRING",
            TypeTag::MultiPolygon => "MULTIPOLYGON",
            TypeTag::GeometryCollection => "GEOMETRYCOLLECTION",
            TypeTag::PointZ => "POINT Z",
            TypeTag::PointZM => "POINT ZM",
        }
    }

    /// Mixed-case name used by the JSON representation, e.g. `LineString`.
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Point => "Point",
            TypeTag::LineString => "LineString",
            TypeTag::Polygon => "Polygon",
            TypeTag::MultiPoint => "MultiPoint",
            TypeTag::MultiLineString => "MultiLineString",
            TypeTag::MultiPolygon => "MultiPolygon",
            TypeTag::GeometryCollection => "GeometryCollection",
            TypeTag::PointZ => "PointZ",
            TypeTag::PointZM => "PointZM",
        }
    }

    /// Resolve a tag case-insensitively. Spaces and underscores are ignored,
    /// so `POINT Z`, `POINTZ` and `point_z` all resolve to [`TypeTag::PointZ`].
    ///
    /// # Example
    ///
    /// ```
    /// use geocolumn_core::TypeTag;
    ///
    /// assert_eq!(TypeTag::parse("POINT_ZM"), Some(TypeTag::PointZM));
    /// assert_eq!(TypeTag::parse("LineString"), Some(TypeTag::LineString));
    /// assert_eq!(TypeTag::parse("BLOB"), None);
    /// ```
    pub fn parse(tag: &str) -> Option<TypeTag> {
        let compact: String = tag
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        TypeTag::ALL
            .into_iter()
            .find(|t| t.as_str().replace(' ', "") == compact)
    }

    pub fn is_point(self) -> bool {
        matches!(self, TypeTag::Point | TypeTag::PointZ | TypeTag::PointZM)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Array representation of a geometry: a position for points, nested
/// sequences for everything else.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Coordinates {
    Position(Vec<f64>),
    Nested(Vec<Coordinates>),
}

/// Capabilities shared by every shape.
pub trait Spatial {
    fn type_tag(&self) -> TypeTag;

    fn family(&self) -> FamilyKind;

    fn srid(&self) -> Option<i32>;

    /// `None` clears the SRID.
    fn set_srid(&mut self, srid: Option<i32>);

    fn coordinates(&self) -> Coordinates;

    /// Containers with no element render as `TAG EMPTY`.
    fn is_empty(&self) -> bool {
        false
    }

    /// Write the text between the parentheses of `TAG(...)`.
    fn write_wkt_body(&self, out: &mut dyn fmt::Write) -> fmt::Result;
}

/// Any shape of a single family.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry<F: Family = Cartesian> {
    Point(Point<F>),
    PointZ(Point3D<F>),
    PointZM(Point4D<F>),
    LineString(LineString<F>),
    Polygon(Polygon<F>),
    MultiPoint(MultiPoint<F>),
    MultiLineString(MultiLineString<F>),
    MultiPolygon(MultiPolygon<F>),
    GeometryCollection(GeometryCollection<F>),
}

macro_rules! each_variant {
    ($value:expr, $inner:ident => $body:expr) => {
        match $value {
            Geometry::Point($inner) => $body,
            Geometry::PointZ($inner) => $body,
            Geometry::PointZM($inner) => $body,
            Geometry::LineString($inner) => $body,
            Geometry::Polygon($inner) => $body,
            Geometry::MultiPoint($inner) => $body,
            Geometry::MultiLineString($inner) => $body,
            Geometry::MultiPolygon($inner) => $body,
            Geometry::GeometryCollection($inner) => $body,
        }
    };
}

impl<F: Family> Spatial for Geometry<F> {
    fn type_tag(&self) -> TypeTag {
        each_variant!(self, g => g.type_tag())
    }

    fn family(&self) -> FamilyKind {
        F::KIND
    }

    fn srid(&self) -> Option<i32> {
        each_variant!(self, g => g.srid())
    }

    fn set_srid(&mut self, srid: Option<i32>) {
        each_variant!(self, g => g.set_srid(srid))
    }

    fn coordinates(&self) -> Coordinates {
        each_variant!(self, g => g.coordinates())
    }

    fn is_empty(&self) -> bool {
        each_variant!(self, g => g.is_empty())
    }

    fn write_wkt_body(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        each_variant!(self, g => g.write_wkt_body(out))
    }
}

impl<F: Family> fmt::Display for Geometry<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        each_variant!(self, g => fmt::Display::fmt(g, f))
    }
}

macro_rules! impl_from_shape {
    ($($variant:ident($shape:ident)),* $(,)?) => {
        $(
            impl<F: Family> From<$shape<F>> for Geometry<F> {
                fn from(value: $shape<F>) -> Self {
                    Geometry::$variant(value)
                }
            }
        )*
    };
}

impl_from_shape!(
    Point(Point),
    PointZ(Point3D),
    PointZM(Point4D),
    LineString(LineString),
    Polygon(Polygon),
    MultiPoint(MultiPoint),
    MultiLineString(MultiLineString),
    MultiPolygon(MultiPolygon),
    GeometryCollection(GeometryCollection),
);

/// Strip the SRID of a value about to become a member of a container.
/// Members never carry their own SRID; the container's applies to them.
pub(crate) fn detached<S: Spatial>(mut member: S) -> S {
    member.set_srid(None);
    member
}

/// Write `items` separated by commas, each rendered by `write`.
pub(crate) fn write_joined<T>(
    out: &mut dyn fmt::Write,
    items: &[T],
    mut write: impl FnMut(&T, &mut dyn fmt::Write) -> fmt::Result,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.write_char(',')?;
        }
        write(item, out)?;
    }
    Ok(())
}

/// Write `items` separated by commas, each wrapped in parentheses.
pub(crate) fn write_parenthesized<T: Spatial>(out: &mut dyn fmt::Write, items: &[T]) -> fmt::Result {
    write_joined(out, items, |item, out| {
        out.write_char('(')?;
        item.write_wkt_body(out)?;
        out.write_char(')')
    })
}
