use std::fmt;

use crate::family::{Cartesian, Family, FamilyKind};
use crate::geometry::{detached, write_joined, Coordinates, Geometry, Spatial, TypeTag};
use crate::wkt::write_wkt;

/// A heterogeneous collection of geometries of one family.
///
/// Members render with their own tag: `POINT(1 2),LINESTRING(0 0,1 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryCollection<F: Family = Cartesian> {
    geometries: Vec<Geometry<F>>,
    srid: Option<i32>,
}

impl<F: Family> Default for GeometryCollection<F> {
    fn default() -> Self {
        Self {
            geometries: Vec::new(),
            srid: None,
        }
    }
}

impl<F: Family> GeometryCollection<F> {
    /// Members lose any SRID of their own.
    pub fn new(geometries: Vec<Geometry<F>>) -> Self {
        Self {
            geometries: geometries.into_iter().map(detached).collect(),
            srid: None,
        }
    }

    pub fn with_srid(mut self, srid: Option<i32>) -> Self {
        self.srid = srid;
        self
    }

    pub fn add_geometry(&mut self, geometry: impl Into<Geometry<F>>) -> &mut Self {
        self.geometries.push(detached(geometry.into()));
        self
    }

    pub fn geometries(&self) -> &[Geometry<F>] {
        &self.geometries
    }

    pub fn geometry(&self, index: usize) -> Option<&Geometry<F>> {
        self.geometries.get(index)
    }

    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }
}

impl<F: Family> Spatial for GeometryCollection<F> {
    fn type_tag(&self) -> TypeTag {
        TypeTag::GeometryCollection
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
        Coordinates::Nested(self.geometries.iter().map(Spatial::coordinates).collect())
    }

    fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    fn write_wkt_body(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write_joined(out, &self.geometries, |g, out| write_wkt(g, out))
    }
}

impl<F: Family> fmt::Display for GeometryCollection<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_wkt_body(f)
    }
}

impl<F: Family> FromIterator<Geometry<F>> for GeometryCollection<F> {
    fn from_iter<I: IntoIterator<Item = Geometry<F>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
