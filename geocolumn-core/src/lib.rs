#![doc = include_str!("../../README.md")]
//! Crate-specific API surface for `geocolumn-core`.

pub mod collection;
pub mod conversion;
pub mod coordinate;
pub mod dispatch;
pub mod error;
pub mod ewkb;
pub mod family;
pub mod geometry;
pub mod interop;
pub mod line_string;
pub mod multi;
pub mod point;
pub mod polygon;
pub mod raw;
pub mod wkt;

pub use collection::GeometryCollection;
pub use dispatch::SpatialValue;
pub use error::{Result, SpatialError};
pub use family::{Cartesian, Family, FamilyKind, Geodetic};
pub use geometry::{Coordinates, Geometry, Spatial, TypeTag};
pub use line_string::LineString;
pub use multi::{MultiLineString, MultiPoint, MultiPolygon};
pub use point::{Point, Point3D, Point4D};
pub use polygon::Polygon;
pub use raw::{RawGeometry, RawValue};
