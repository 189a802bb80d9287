use std::fmt;

use crate::coordinate::Ordinate;
use crate::error::Result;
use crate::family::{Cartesian, Family, FamilyKind};
use crate::geometry::{detached, write_joined, Coordinates, Spatial, TypeTag};
use crate::point::Point;

/// An ordered path of points. Closure is not enforced.
#[derive(Debug, Clone, PartialEq)]
pub struct LineString<F: Family = Cartesian> {
    points: Vec<Point<F>>,
    srid: Option<i32>,
}

impl<F: Family> Default for LineString<F> {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            srid: None,
        }
    }
}

impl<F: Family> LineString<F> {
    /// Points lose any SRID of their own.
    pub fn new(points: Vec<Point<F>>) -> Self {
        Self {
            points: points.into_iter().map(detached).collect(),
            srid: None,
        }
    }

    /// Build from ordinate pairs, validating each through the family policy.
    ///
    /// # Example
    ///
    /// ```
    /// use geocolumn_core::{Cartesian, LineString};
    ///
    /// let line = LineString::<Cartesian>::from_positions([[0.0, 0.0], [1.0, 1.0], [0.0, 0.0]]).unwrap();
    /// assert_eq!(line.len(), 3);
    /// assert!(line.is_closed());
    /// assert_eq!(line.to_string(), "0 0,1 1,0 0");
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

    pub fn with_srid(mut self, srid: Option<i32>) -> Self {
        self.srid = srid;
        self
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

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True when the first and last points share the same ordinates.
    /// An empty line is not closed.
    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => first.to_array() == last.to_array(),
            _ => false,
        }
    }
}

impl<F: Family> Spatial for LineString<F> {
    fn type_tag(&self) -> TypeTag {
        TypeTag::LineString
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
        Coordinates::Nested(self.points.iter().map(Spatial::coordinates).collect())
    }

    fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn write_wkt_body(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write_joined(out, &self.points, |p, out| p.write_wkt_body(out))
    }
}

impl<F: Family> fmt::Display for LineString<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_wkt_body(f)
    }
}

impl<F: Family> FromIterator<Point<F>> for LineString<F> {
    fn from_iter<I: IntoIterator<Item = Point<F>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::Geodetic;

    #[test]
    fn empty_line_string() {
        let line = LineString::<Cartesian>::default();
        assert!(line.is_empty());
        assert!(!line.is_closed());
        assert_eq!(line.point(0), None);
        assert_eq!(line.coordinates(), Coordinates::Nested(vec![]));
    }

    #[test]
    fn add_point_keeps_order() {
        let mut line = LineString::<Cartesian>::default();
        line.add_point(Point::new(0, 0).unwrap())
            .add_point(Point::new(1, 0).unwrap())
            .add_point(Point::new(1, 1).unwrap());
        assert_eq!(line.len(), 3);
        assert_eq!(line.point(1).map(Point::to_array), Some([1.0, 0.0]));
        assert!(!line.is_closed());
        assert_eq!(line.to_string(), "0 0,1 0,1 1");
    }

    #[test]
    fn geodetic_positions_are_validated() {
        let err = LineString::<Geodetic>::from_positions([[0.0, 0.0], [0.0, 91.0]]).unwrap_err();
        assert!(err.to_string().starts_with("Out of range latitude value"));
    }

    #[test]
    fn equality_includes_srid() {
        let a = LineString::<Cartesian>::from_positions([[0, 0], [1, 1]]).unwrap();
        let b = a.clone().with_srid(Some(4326));
        assert_ne!(a, b);
        assert_eq!(b, a.with_srid(Some(4326)));
    }
}
