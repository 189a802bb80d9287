//! Geometry families: the validation policy shared by every value of a
//! geometry tree.
//!
//! `Cartesian` values carry planar X/Y ordinates with no range restriction.
//! `Geodetic` values carry longitude/latitude checked against
//! [-180, 180] and [-90, 90]. Containers are generic over the family, so a
//! cartesian polygon can never hold a geodetic ring.

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use crate::coordinate::{cartesian_coordinate, geodesic_coordinate, Axis, Ordinate};
use crate::error::{Result, SpatialError};

/// Runtime family discriminator, as named by database column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FamilyKind {
    Geometry,
    Geography,
}

impl FamilyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FamilyKind::Geometry => "Geometry",
            FamilyKind::Geography => "Geography",
        }
    }
}

impl fmt::Display for FamilyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FamilyKind {
    type Err = SpatialError;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("geometry") {
            Ok(FamilyKind::Geometry)
        } else if s.eq_ignore_ascii_case("geography") {
            Ok(FamilyKind::Geography)
        } else {
            Err(SpatialError::UnsupportedFamily(s.to_string()))
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Cartesian {}
    impl Sealed for super::Geodetic {}
}

/// Validation policy for the two mandatory ordinates of a point.
pub trait Family:
    sealed::Sealed + Copy + fmt::Debug + Default + PartialEq + Eq + Hash + Send + Sync + 'static
{
    const KIND: FamilyKind;

    /// Validate the first ordinate (X or longitude).
    fn first_ordinate(ordinate: Ordinate<'_>) -> Result<f64>;

    /// Validate the second ordinate (Y or latitude).
    fn second_ordinate(ordinate: Ordinate<'_>) -> Result<f64>;
}

/// Planar geometries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Cartesian;

/// Geodetic geographies on WGS84-like longitude/latitude.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Geodetic;

impl Family for Cartesian {
    const KIND: FamilyKind = FamilyKind::Geometry;

    fn first_ordinate(ordinate: Ordinate<'_>) -> Result<f64> {
        cartesian_coordinate(ordinate)
    }

    fn second_ordinate(ordinate: Ordinate<'_>) -> Result<f64> {
        cartesian_coordinate(ordinate)
    }
}

impl Family for Geodetic {
    const KIND: FamilyKind = FamilyKind::Geography;

    fn first_ordinate(ordinate: Ordinate<'_>) -> Result<f64> {
        geodesic_coordinate(ordinate, Axis::Longitude)
    }

    fn second_ordinate(ordinate: Ordinate<'_>) -> Result<f64> {
        geodesic_coordinate(ordinate, Axis::Latitude)
    }
}
