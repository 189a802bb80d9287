use std::fmt;

use crate::family::{Cartesian, Family, FamilyKind};
use crate::geometry::{detached, write_parenthesized, Coordinates, Spatial, TypeTag};
use crate::line_string::LineString;

/// Rings of a polygon: ring 0 is the exterior boundary, the rest are holes.
///
/// Purely structural: ring closure and self-intersection are not checked.
///
/// # Example
///
/// ```
/// use geocolumn_core::{Cartesian, LineString, Polygon, Spatial, TypeTag};
///
/// let ring = LineString::<Cartesian>::from_positions([[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]).unwrap();
/// let polygon = Polygon::new(vec![ring.clone()]);
/// assert_eq!(polygon.type_tag(), TypeTag::Polygon);
/// assert_eq!(polygon.exterior(), Some(&ring));
/// assert_eq!(polygon.to_string(), "(0 0,10 0,10 10,0 10,0 0)");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon<F: Family = Cartesian> {
    rings: Vec<LineString<F>>,
    srid: Option<i32>,
}

impl<F: Family> Default for Polygon<F> {
    fn default() -> Self {
        Self {
            rings: Vec::new(),
            srid: None,
        }
    }
}

impl<F: Family> Polygon<F> {
    pub fn new(rings: Vec<LineString<F>>) -> Self {
        Self {
            rings: rings.into_iter().map(detached).collect(),
            srid: None,
        }
    }

    pub fn with_srid(mut self, srid: Option<i32>) -> Self {
        self.srid = srid;
        self
    }

    pub fn add_ring(&mut self, ring: LineString<F>) -> &mut Self {
        self.rings.push(detached(ring));
        self
    }

    pub fn rings(&self) -> &[LineString<F>] {
        &self.rings
    }

    pub fn ring(&self, index: usize) -> Option<&LineString<F>> {
        self.rings.get(index)
    }

    pub fn exterior(&self) -> Option<&LineString<F>> {
        self.rings.first()
    }

    pub fn interiors(&self) -> &[LineString<F>] {
        self.rings.get(1..).unwrap_or_default()
    }
}

impl<F: Family> Spatial for Polygon<F> {
    fn type_tag(&self) -> TypeTag {
        TypeTag::Polygon
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
        Coordinates::Nested(self.rings.iter().map(Spatial::coordinates).collect())
    }

    fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    fn write_wkt_body(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write_parenthesized(out, &self.rings)
    }
}

impl<F: Family> fmt::Display for Polygon<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_wkt_body(f)
    }
}
