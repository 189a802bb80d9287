//! Homogeneous collections of single geometries.

use std::fmt;

use crate::coordinate::Ordinate;
use crate::error::Result;
use crate::family::{Cartesian, Family, FamilyKind};
use crate::geometry::{detached, write_joined, write_parenthesized, Coordinates, Spatial, TypeTag};
use crate::line_string::LineString;
use crate::point::Point;
use crate::polygon::Polygon;

macro_rules! impl_multi {
    ($name:ident, $item:ident, $field:ident, $tag:expr) => {
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name<F: Family = Cartesian> {
            $field: Vec<$item<F>>,
            srid: Option<i32>,
        }

        impl<F: Family> Default for $name<F> {
            fn default() -> Self {
                Self {
                    $field: Vec::new(),
                    srid: None,
                }
            }
        }

        impl<F: Family> $name<F> {
            /// Members lose any SRID of their own.
            pub fn new($field: Vec<$item<F>>) -> Self {
                Self {
                    $field: $field.into_iter().map(detached).collect(),
                    srid: None,
                }
            }

            pub fn with_srid(mut self, srid: Option<i32>) -> Self {
                self.srid = srid;
                self
            }

            pub fn len(&self) -> usize {
                self.$field.len()
            }

            pub fn is_empty(&self) -> bool {
                self.$field.is_empty()
            }
        }

        impl<F: Family> Spatial for $name<F> {
            fn type_tag(&self) -> TypeTag {
                $tag
            }

            fn family(&self) -> FamilyKind {
                F::KIND
            }

            fn srid(&self) -> Option<i32> {
                self.srid
            }

            fn set_srid(&mut self, srid: Option<i32>) {
                self.srid = srid;
            }

            fn coordinates(&self) -> Coordinates {
                Coordinates::Nested(self.$field.iter().map(Spatial::coordinates).collect())
            }

            fn is_empty(&self) -> bool {
                self.$field.is_empty()
            }

            fn write_wkt_body(&self, out: &mut dyn fmt::Write) -> fmt::Result {
                self.write_members(out)
            }
        }

        impl<F: Family> fmt::Display for $name<F> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.write_wkt_body(f)
            }
        }

        impl<F: Family> FromIterator<$item<F>> for $name<F> {
            fn from_iter<I: IntoIterator<Item = $item<F>>>(iter: I) -> Self {
                Self::new(iter.into_iter().collect())
            }
        }
    };
}

impl_multi!(MultiPoint, Point, points, TypeTag::MultiPoint);
impl_multi!(MultiLineString, LineString, line_strings, TypeTag::MultiLineString);
impl_multi!(MultiPolygon, Polygon, polygons, TypeTag::MultiPolygon);

impl<F: Family> MultiPoint<F> {
    /// # Example
    ///
    /// ```
    /// use geocolumn_core::{Cartesian, MultiPoint};
    ///
    /// let points = MultiPoint::<Cartesian>::from_positions([[1, 2], [3, 4]]).unwrap();
    /// assert_eq!(points.to_string(), "1 2,3 4");
    /// ```
    pub fn from_positions<'a, O, I>(positions: I) -> Result<Self>
    where
        O: Into<Ordinate<'a>>,
        I: IntoIterator<Item = [O; 2]>,
    {
        let points = positions
            .into_iter()
            .map(|[first, second]| Point::new(first, second))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(points))
    }

    pub fn add_point(&mut self, point: Point<F>) -> &mut Self {
        self.points.push(detached(point));
        self
    }

    pub fn points(&self) -> &[Point<F>] {
        &self.points
    }

    pub fn point(&self, index: usize) -> Option<&Point<F>> {
        self.points.get(index)
    }

    fn write_members(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write_joined(out, &self.points, |p, out| p.write_wkt_body(out))
    }
}

impl<F: Family> MultiLineString<F> {
    pub fn add_line_string(&mut self, line_string: LineString<F>) -> &mut Self {
        self.line_strings.push(detached(line_string));
        self
    }

    pub fn line_strings(&self) -> &[LineString<F>] {
        &self.line_strings
    }

    pub fn line_string(&self, index: usize) -> Option<&LineString<F>> {
        self.line_strings.get(index)
    }

    fn write_members(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write_parenthesized(out, &self.line_strings)
    }
}

impl<F: Family> MultiPolygon<F> {
    pub fn add_polygon(&mut self, polygon: Polygon<F>) -> &mut Self {
        self.polygons.push(detached(polygon));
        self
    }

    pub fn polygons(&self) -> &[Polygon<F>] {
        &self.polygons
    }

    pub fn polygon(&self, index: usize) -> Option<&Polygon<F>> {
        self.polygons.get(index)
    }

    fn write_members(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write_parenthesized(out, &self.polygons)
    }
}
