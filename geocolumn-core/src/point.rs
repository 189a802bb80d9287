//! Points in two, three and four dimensions.
//!
//! The two mandatory ordinates are validated through the family policy on
//! construction and on every setter. Elevation and moment are stored as
//! given.

use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::coordinate::{geodesic_coordinate, Axis, Ordinate};
use crate::error::{Result, SpatialError};
use crate::family::{Cartesian, Family, FamilyKind, Geodetic};
use crate::geometry::{Coordinates, Spatial, TypeTag};

/// Convert a Unix timestamp in seconds into a UTC instant.
pub fn moment_from_timestamp(timestamp: f64) -> Result<DateTime<Utc>> {
    if !timestamp.is_finite() {
        return Err(SpatialError::InvalidMoment(timestamp));
    }
    let secs = timestamp.floor();
    let nanos = ((timestamp - secs) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(secs as i64, nanos).ok_or(SpatialError::InvalidMoment(timestamp))
}

/// Unix timestamp in seconds, with sub-second precision.
///
/// An `f64` holds present-day timestamps to about a quarter of a
/// microsecond, so nanoseconds do not survive a round trip through this
/// form. Whole seconds always do.
pub fn moment_to_timestamp(moment: &DateTime<Utc>) -> f64 {
    moment.timestamp() as f64 + f64::from(moment.timestamp_subsec_nanos()) / 1e9
}

/// A two dimensional point.
///
/// # Example
///
/// ```
/// use geocolumn_core::{Cartesian, Point};
///
/// let p = Point::<Cartesian>::new(1, 1).unwrap();
/// assert_eq!(p.to_string(), "1 1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point<F: Family = Cartesian> {
    x: f64,
    y: f64,
    srid: Option<i32>,
    family: PhantomData<F>,
}

impl<F: Family> Point<F> {
    /// Build from the first (X or longitude) and second (Y or latitude)
    /// ordinates.
    pub fn new<'a>(first: impl Into<Ordinate<'a>>, second: impl Into<Ordinate<'a>>) -> Result<Self> {
        let x = F::first_ordinate(first.into())?;
        let y = F::second_ordinate(second.into())?;
        Ok(Self {
            x,
            y,
            srid: None,
            family: PhantomData,
        })
    }

    pub fn with_srid(mut self, srid: Option<i32>) -> Self {
        self.srid = srid;
        self
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn longitude(&self) -> f64 {
        self.x
    }

    pub fn latitude(&self) -> f64 {
        self.y
    }

    pub fn set_x<'a>(&mut self, x: impl Into<Ordinate<'a>>) -> Result<()> {
        self.x = F::first_ordinate(x.into())?;
        Ok(())
    }

    pub fn set_y<'a>(&mut self, y: impl Into<Ordinate<'a>>) -> Result<()> {
        self.y = F::second_ordinate(y.into())?;
        Ok(())
    }

    /// Always checked against [-180, 180], whatever the family.
    pub fn set_longitude<'a>(&mut self, longitude: impl Into<Ordinate<'a>>) -> Result<()> {
        self.x = geodesic_coordinate(longitude.into(), Axis::Longitude)?;
        Ok(())
    }

    /// Always checked against [-90, 90], whatever the family.
    pub fn set_latitude<'a>(&mut self, latitude: impl Into<Ordinate<'a>>) -> Result<()> {
        self.y = geodesic_coordinate(latitude.into(), Axis::Latitude)?;
        Ok(())
    }

    pub fn to_array(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl Point<Geodetic> {
    /// # Example
    ///
    /// ```
    /// use geocolumn_core::{Geodetic, Point};
    ///
    /// let p = Point::<Geodetic>::from_lon_lat("79:56:55W", "40:26:46N").unwrap();
    /// assert!((p.longitude() + 79.9486111111111).abs() < 1e-12);
    /// assert!((p.latitude() - 40.44611111111111).abs() < 1e-12);
    /// ```
    pub fn from_lon_lat<'a>(
        longitude: impl Into<Ordinate<'a>>,
        latitude: impl Into<Ordinate<'a>>,
    ) -> Result<Self> {
        Self::new(longitude, latitude)
    }

    pub fn from_lat_lon<'a>(
        latitude: impl Into<Ordinate<'a>>,
        longitude: impl Into<Ordinate<'a>>,
    ) -> Result<Self> {
        let latitude = latitude.into();
        let longitude = longitude.into();
        let y = Geodetic::second_ordinate(latitude)?;
        let x = Geodetic::first_ordinate(longitude)?;
        Ok(Self {
            x,
            y,
            srid: None,
            family: PhantomData,
        })
    }
}

impl<F: Family> Spatial for Point<F> {
    fn type_tag(&self) -> TypeTag {
        TypeTag::Point
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
        Coordinates::Position(self.to_array().to_vec())
    }

    fn write_wkt_body(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "{} {}", self.x, self.y)
    }
}

impl<F: Family> fmt::Display for Point<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_wkt_body(f)
    }
}

/// A point with elevation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point3D<F: Family = Cartesian> {
    point: Point<F>,
    z: f64,
}

impl<F: Family> Point3D<F> {
    pub fn new<'a>(
        first: impl Into<Ordinate<'a>>,
        second: impl Into<Ordinate<'a>>,
        z: f64,
    ) -> Result<Self> {
        Ok(Self {
            point: Point::new(first, second)?,
            z,
        })
    }

    pub fn with_srid(mut self, srid: Option<i32>) -> Self {
        self.point.srid = srid;
        self
    }

    pub fn x(&self) -> f64 {
        self.point.x
    }

    pub fn y(&self) -> f64 {
        self.point.y
    }

    pub fn longitude(&self) -> f64 {
        self.point.x
    }

    pub fn latitude(&self) -> f64 {
        self.point.y
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    pub fn set_x<'a>(&mut self, x: impl Into<Ordinate<'a>>) -> Result<()> {
        self.point.set_x(x)
    }

    pub fn set_y<'a>(&mut self, y: impl Into<Ordinate<'a>>) -> Result<()> {
        self.point.set_y(y)
    }

    pub fn set_longitude<'a>(&mut self, longitude: impl Into<Ordinate<'a>>) -> Result<()> {
        self.point.set_longitude(longitude)
    }

    pub fn set_latitude<'a>(&mut self, latitude: impl Into<Ordinate<'a>>) -> Result<()> {
        self.point.set_latitude(latitude)
    }

    pub fn set_z(&mut self, z: f64) {
        self.z = z;
    }

    /// The planar projection, keeping the SRID.
    pub fn xy(&self) -> Point<F> {
        self.point
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.point.x, self.point.y, self.z]
    }
}

impl Point3D<Geodetic> {
    pub fn from_lon_lat<'a>(
        longitude: impl Into<Ordinate<'a>>,
        latitude: impl Into<Ordinate<'a>>,
        z: f64,
    ) -> Result<Self> {
        Self::new(longitude, latitude, z)
    }

    pub fn from_lat_lon<'a>(
        latitude: impl Into<Ordinate<'a>>,
        longitude: impl Into<Ordinate<'a>>,
        z: f64,
    ) -> Result<Self> {
        Ok(Self {
            point: Point::from_lat_lon(latitude, longitude)?,
            z,
        })
    }
}

impl<F: Family> Spatial for Point3D<F> {
    fn type_tag(&self) -> TypeTag {
        TypeTag::PointZ
    }

    fn family(&self) -> FamilyKind {
        F::KIND
    }

    fn srid(&self) -> Option<i32> {
        self.point.srid
    }

    fn set_srid(&mut self, srid: Option<i32>) {
        self.point.srid = srid;
    }

    fn coordinates(&self) -> Coordinates {
        Coordinates::Position(self.to_array().to_vec())
    }

    fn write_wkt_body(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "{} {} {}", self.point.x, self.point.y, self.z)
    }
}

/// `x y z`, or `POINT Z(SRID=<srid>;x y z)` once an SRID is set.
impl<F: Family> fmt::Display for Point3D<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.point.srid {
            Some(srid) => {
                write!(f, "{}(SRID={srid};", TypeTag::PointZ)?;
                self.write_wkt_body(f)?;
                f.write_str(")")
            }
            None => self.write_wkt_body(f),
        }
    }
}

/// A point with elevation and a moment in time.
///
/// WKT, EWKB and the array form carry the moment as Unix seconds in an
/// `f64` (see [`moment_to_timestamp`]): a value read back may differ from the
/// original by less than a microsecond.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point4D<F: Family = Cartesian> {
    point: Point3D<F>,
    moment: DateTime<Utc>,
}

impl<F: Family> Point4D<F> {
    pub fn new<'a>(
        first: impl Into<Ordinate<'a>>,
        second: impl Into<Ordinate<'a>>,
        z: f64,
        moment: DateTime<Utc>,
    ) -> Result<Self> {
        Ok(Self {
            point: Point3D::new(first, second, z)?,
            moment,
        })
    }

    pub fn with_srid(mut self, srid: Option<i32>) -> Self {
        self.point.point.srid = srid;
        self
    }

    pub fn x(&self) -> f64 {
        self.point.x()
    }

    pub fn y(&self) -> f64 {
        self.point.y()
    }

    pub fn longitude(&self) -> f64 {
        self.point.x()
    }

    pub fn latitude(&self) -> f64 {
        self.point.y()
    }

    pub fn z(&self) -> f64 {
        self.point.z
    }

    pub fn moment(&self) -> DateTime<Utc> {
        self.moment
    }

    pub fn set_x<'a>(&mut self, x: impl Into<Ordinate<'a>>) -> Result<()> {
        self.point.set_x(x)
    }

    pub fn set_y<'a>(&mut self, y: impl Into<Ordinate<'a>>) -> Result<()> {
        self.point.set_y(y)
    }

    pub fn set_longitude<'a>(&mut self, longitude: impl Into<Ordinate<'a>>) -> Result<()> {
        self.point.set_longitude(longitude)
    }

    pub fn set_latitude<'a>(&mut self, latitude: impl Into<Ordinate<'a>>) -> Result<()> {
        self.point.set_latitude(latitude)
    }

    pub fn set_z(&mut self, z: f64) {
        self.point.z = z;
    }

    pub fn set_moment(&mut self, moment: DateTime<Utc>) {
        self.moment = moment;
    }

    pub fn xyz(&self) -> Point3D<F> {
        self.point
    }

    /// The moment is exposed as a Unix timestamp in seconds.
    pub fn to_array(&self) -> [f64; 4] {
        let [x, y, z] = self.point.to_array();
        [x, y, z, moment_to_timestamp(&self.moment)]
    }
}

impl Point4D<Geodetic> {
    pub fn from_lon_lat<'a>(
        longitude: impl Into<Ordinate<'a>>,
        latitude: impl Into<Ordinate<'a>>,
        z: f64,
        moment: DateTime<Utc>,
    ) -> Result<Self> {
        Self::new(longitude, latitude, z, moment)
    }

    pub fn from_lat_lon<'a>(
        latitude: impl Into<Ordinate<'a>>,
        longitude: impl Into<Ordinate<'a>>,
        z: f64,
        moment: DateTime<Utc>,
    ) -> Result<Self> {
        Ok(Self {
            point: Point3D::from_lat_lon(latitude, longitude, z)?,
            moment,
        })
    }
}

impl<F: Family> Spatial for Point4D<F> {
    fn type_tag(&self) -> TypeTag {
        TypeTag::PointZM
    }

    fn family(&self) -> FamilyKind {
        F::KIND
    }

    fn srid(&self) -> Option<i32> {
        self.point.srid()
    }

    fn set_srid(&mut self, srid: Option<i32>) {
        self.point.set_srid(srid);
    }

    fn coordinates(&self) -> Coordinates {
        Coordinates::Position(self.to_array().to_vec())
    }

    fn write_wkt_body(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        self.point.write_wkt_body(out)?;
        write!(out, " {}", moment_to_timestamp(&self.moment))
    }
}

/// `x y z <instant>`, or `POINT ZM(SRID=<srid>;x y z <instant>)` once an SRID
/// is set. The instant is RFC 3339 in UTC.
impl<F: Family> fmt::Display for Point4D<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let instant = self.moment.to_rfc3339_opts(SecondsFormat::AutoSi, true);
        match self.srid() {
            Some(srid) => {
                write!(f, "{}(SRID={srid};", TypeTag::PointZM)?;
                self.point.write_wkt_body(f)?;
                write!(f, " {instant})")
            }
            None => {
                self.point.write_wkt_body(f)?;
                write!(f, " {instant}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn moment() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn cartesian_point_renders_without_fraction() {
        let p = Point::<Cartesian>::new(1, 1).unwrap();
        assert_eq!(p.to_string(), "1 1");
        assert_eq!(Point::<Cartesian>::new(1.5, -2).unwrap().to_string(), "1.5 -2");
    }

    #[test]
    fn two_dimensional_display_never_shows_srid() {
        let p = Point::<Cartesian>::new(42, 43).unwrap().with_srid(Some(3857));
        assert_eq!(p.to_string(), "42 43");
        assert_eq!(p.srid(), Some(3857));
    }

    #[test]
    fn cartesian_is_unbounded() {
        let p = Point::<Cartesian>::new(1.0e12, -1.0e12).unwrap();
        assert_eq!(p.to_array(), [1.0e12, -1.0e12]);
    }

    #[test]
    fn geodetic_longitude_out_of_range() {
        let err = Point::<Geodetic>::new(180.134, 54).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Out of range longitude value, longitude must be between -180 and 180, got \"180.134\"."
        );
    }

    #[test]
    fn geodetic_latitude_out_of_range() {
        let err = Point::<Geodetic>::from_lon_lat(54, -90.5).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Out of range latitude value, latitude must be between -90 and 90, got \"-90.5\"."
        );
    }

    #[test]
    fn lat_lon_order_is_explicit() {
        let a = Point::<Geodetic>::from_lat_lon(40.5, -79.5).unwrap();
        let b = Point::<Geodetic>::from_lon_lat(-79.5, 40.5).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.longitude(), -79.5);
        assert_eq!(a.latitude(), 40.5);
        assert!(Point::<Geodetic>::from_lat_lon(-79.5, 40.5).is_err());
    }

    #[test]
    fn string_ordinates_are_parsed() {
        let p = Point::<Geodetic>::from_lon_lat("79:56:55W", "40:26:46N").unwrap();
        assert_abs_diff_eq!(p.longitude(), -79.9486111111111, epsilon = 1e-12);
        assert_abs_diff_eq!(p.latitude(), 40.44611111111111, epsilon = 1e-12);

        let c = Point::<Cartesian>::new("10", "-20.5").unwrap();
        assert_eq!(c.to_array(), [10.0, -20.5]);
    }

    #[test]
    fn failed_setter_leaves_point_unchanged() {
        let mut p = Point::<Geodetic>::from_lon_lat(10, 20).unwrap();
        assert!(p.set_latitude(95).is_err());
        assert!(p.set_x(-181).is_err());
        assert_eq!(p.to_array(), [10.0, 20.0]);

        p.set_y("45N").unwrap();
        assert_eq!(p.latitude(), 45.0);
    }

    #[test]
    fn cartesian_geodesic_setters_are_checked() {
        let mut p = Point::<Cartesian>::new(500, 500).unwrap();
        p.set_x(1000).unwrap();
        assert!(p.set_longitude(1000).is_err());
        assert!(p.set_latitude(91).is_err());
        p.set_latitude(45).unwrap();
        assert_eq!(p.to_array(), [1000.0, 45.0]);
    }

    #[test]
    fn srid_can_be_cleared() {
        let mut p = Point::<Cartesian>::new(1, 2).unwrap().with_srid(Some(4326));
        p.set_srid(None);
        assert_eq!(p.srid(), None);
    }

    #[test]
    fn point3d_display_embeds_srid() {
        let p = Point3D::<Cartesian>::new(1, 2, 3.5).unwrap();
        assert_eq!(p.to_string(), "1 2 3.5");
        assert_eq!(p.type_tag(), TypeTag::PointZ);

        let p = p.with_srid(Some(4326));
        assert_eq!(p.to_string(), "POINT Z(SRID=4326;1 2 3.5)");
        assert_eq!(p.xy().srid(), Some(4326));
    }

    #[test]
    fn point3d_geodetic_checks_range_but_not_elevation() {
        assert!(Point3D::<Geodetic>::from_lon_lat(10, 20, 1.0e6).is_ok());
        assert!(Point3D::<Geodetic>::from_lat_lon(100, 20, 0.0).is_err());
    }

    #[test]
    fn point4d_display_and_array() {
        let p = Point4D::<Cartesian>::new(1, 2, 3.0, moment()).unwrap();
        assert_eq!(p.to_string(), "1 2 3 2023-11-14T22:13:20Z");
        assert_eq!(p.to_array(), [1.0, 2.0, 3.0, 1_700_000_000.0]);

        let p = p.with_srid(Some(4326));
        assert_eq!(p.to_string(), "POINT ZM(SRID=4326;1 2 3 2023-11-14T22:13:20Z)");
    }

    #[test]
    fn point4d_setters() {
        let mut p = Point4D::<Geodetic>::from_lat_lon(10, 20, 3.0, moment()).unwrap();
        p.set_z(-12.5);
        p.set_moment(DateTime::from_timestamp(0, 0).unwrap());
        assert!(p.set_longitude(200).is_err());
        assert_eq!(p.to_array(), [20.0, 10.0, -12.5, 0.0]);
        assert_eq!(p.xyz().z(), -12.5);
    }

    #[test]
    fn moments_from_timestamps() {
        assert_eq!(moment_from_timestamp(1_700_000_000.0).unwrap(), moment());
        let half = moment_from_timestamp(1.5).unwrap();
        assert_eq!(half.timestamp_subsec_millis(), 500);
        assert_abs_diff_eq!(moment_to_timestamp(&half), 1.5);
        assert!(moment_from_timestamp(f64::NAN).is_err());
        assert!(moment_from_timestamp(f64::INFINITY).is_err());
    }

    #[test]
    fn timestamp_round_trip_precision() {
        let whole = moment_from_timestamp(moment_to_timestamp(&moment())).unwrap();
        assert_eq!(whole, moment());

        let fine = DateTime::from_timestamp(1_700_000_000, 123_456_789).unwrap();
        let back = moment_from_timestamp(moment_to_timestamp(&fine)).unwrap();
        assert_eq!(back.timestamp(), fine.timestamp());
        let drift = (i64::from(back.timestamp_subsec_nanos()) - 123_456_789).abs();
        assert!(drift < 1_000, "drifted {drift}ns");
    }
}
