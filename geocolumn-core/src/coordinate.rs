//! Coordinate range checks and coordinate string parsing.
//!
//! Accepted textual forms:
//!   `40.446`, `-79.9486`      decimal degrees, optionally signed
//!   `40:26:46N`               colon separated degrees, minutes, seconds
//!   `40°26'46"N`              symbol separated, optionally with spaces
//!   `40° 26′ 46″ N`           prime / double prime symbols
//!
//! A trailing compass letter sets the sign (`S` and `W` are negative) and
//! cannot be combined with a leading sign.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::error::{Result, SpatialError};

/// Component named in out-of-range errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Latitude,
    Longitude,
    Minute,
    Second,
}

impl Axis {
    /// Inclusive bounds reported for this component.
    pub fn bounds(self) -> (i32, i32) {
        match self {
            Axis::Latitude => (-90, 90),
            Axis::Longitude => (-180, 180),
            Axis::Minute | Axis::Second => (0, 59),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Axis::Latitude => "latitude",
            Axis::Longitude => "longitude",
            Axis::Minute => "minute",
            Axis::Second => "second",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An ordinate as handed to a point constructor or setter: either a trusted
/// number or a human-written string that still has to be parsed.
///
/// # Example
///
/// ```
/// use geocolumn_core::coordinate::Ordinate;
///
/// assert_eq!(Ordinate::from(42), Ordinate::Number(42.0));
/// assert_eq!(Ordinate::from("40:26:46N"), Ordinate::Text("40:26:46N"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ordinate<'a> {
    Number(f64),
    Text(&'a str),
}

impl fmt::Display for Ordinate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ordinate::Number(v) => write!(f, "{v}"),
            Ordinate::Text(t) => f.write_str(t),
        }
    }
}

impl From<f64> for Ordinate<'_> {
    fn from(value: f64) -> Self {
        Ordinate::Number(value)
    }
}

impl From<f32> for Ordinate<'_> {
    fn from(value: f32) -> Self {
        Ordinate::Number(f64::from(value))
    }
}

impl From<i32> for Ordinate<'_> {
    fn from(value: i32) -> Self {
        Ordinate::Number(f64::from(value))
    }
}

impl From<u32> for Ordinate<'_> {
    fn from(value: u32) -> Self {
        Ordinate::Number(f64::from(value))
    }
}

impl From<i64> for Ordinate<'_> {
    fn from(value: i64) -> Self {
        Ordinate::Number(value as f64)
    }
}

impl<'a> From<&'a str> for Ordinate<'a> {
    fn from(value: &'a str) -> Self {
        Ordinate::Text(value)
    }
}

impl<'a> From<&'a String> for Ordinate<'a> {
    fn from(value: &'a String) -> Self {
        Ordinate::Text(value.as_str())
    }
}

/// A value fell outside an inclusive bound. Always converted into
/// [`SpatialError::OutOfRange`] before reaching callers.
#[derive(Debug, Error)]
#[error("Coordinate must be comprised between {min} and {max}, got \"{value}\".")]
pub(crate) struct RangeError {
    min: f64,
    max: f64,
    value: f64,
}

/// Return `value` when it lies in `[min, max]`. NaN is never in range.
pub(crate) fn check_range(value: f64, min: f64, max: f64) -> std::result::Result<f64, RangeError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(RangeError { min, max, value })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'N' => Some(Direction::North),
            'S' => Some(Direction::South),
            'E' => Some(Direction::East),
            'W' => Some(Direction::West),
            _ => None,
        }
    }

    fn is_negative(self) -> bool {
        matches!(self, Direction::South | Direction::West)
    }

    fn axis(self) -> Axis {
        match self {
            Direction::North | Direction::South => Axis::Latitude,
            Direction::East | Direction::West => Axis::Longitude,
        }
    }
}

/// Whole-string grammar for a coordinate: sign, degrees, then optional
/// minutes and seconds, each introduced by its mark, then a compass letter.
/// A `:` mark must be followed by the next component.
static COORDINATE_PATTERN: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| {
        Regex::new(
            r#"(?x)
            ^\s*
            (?P<sign>[-+])?
            (?P<deg>\d+(?:\.\d+)?)
            (?:
                \s*(?P<dmark>[:°])\s*
                (?:
                    (?P<min>\d+(?:\.\d+)?)
                    (?:
                        \s*(?P<mmark>[:'′])\s*
                        (?:
                            (?P<sec>\d+(?:\.\d+)?)
                            \s*(?:''|"|″)?
                        )?
                    )?
                )?
            )?
            \s*(?P<dir>[[:alpha:]])?
            \s*$
            "#,
        )
    });

/// Parse a human-written coordinate into signed decimal degrees.
///
/// # Example
///
/// ```
/// use geocolumn_core::coordinate::parse_coordinate;
///
/// let lon = parse_coordinate("79:56:55W").unwrap();
/// assert!((lon + 79.9486111111111).abs() < 1e-12);
/// assert_eq!(parse_coordinate("-12.5").unwrap(), -12.5);
/// assert!(parse_coordinate("84:26:46Q").is_err());
/// ```
pub fn parse_coordinate(text: &str) -> Result<f64> {
    log::trace!("parsing coordinate {text:?}");
    let invalid = || SpatialError::InvalidCoordinate(text.to_string());

    let pattern = COORDINATE_PATTERN.as_ref().map_err(|_| invalid())?;
    let captures = pattern.captures(text).ok_or_else(invalid)?;
    let group = |name: &str| captures.name(name).map(|m| m.as_str());
    let number = |name: &str| -> Result<Option<f64>> {
        group(name)
            .map(|digits| digits.parse::<f64>().map_err(|_| invalid()))
            .transpose()
    };

    let degrees = number("deg")?.ok_or_else(invalid)?;
    let minutes = number("min")?;
    let seconds = number("sec")?;
    if (group("dmark") == Some(":") && minutes.is_none())
        || (group("mmark") == Some(":") && seconds.is_none())
    {
        return Err(invalid());
    }

    let direction = group("dir")
        .map(|letter| letter.chars().next().and_then(Direction::from_char).ok_or_else(invalid))
        .transpose()?;
    let sign = group("sign");
    if sign.is_some() && direction.is_some() {
        return Err(invalid());
    }

    let minutes = minutes.unwrap_or(0.0);
    let seconds = seconds.unwrap_or(0.0);
    if minutes >= 60.0 {
        return Err(SpatialError::out_of_range(Axis::Minute, text));
    }
    if seconds >= 60.0 {
        return Err(SpatialError::out_of_range(Axis::Second, text));
    }

    let magnitude = degrees + minutes / 60.0 + seconds / 3600.0;
    let negative = match direction {
        Some(direction) => {
            let axis = direction.axis();
            let (_, max) = axis.bounds();
            if magnitude > f64::from(max) {
                return Err(SpatialError::out_of_range(axis, text));
            }
            direction.is_negative()
        }
        None => sign == Some("-"),
    };

    Ok(if negative { -magnitude } else { magnitude })
}

/// Validate a latitude or longitude. Numbers are range checked directly,
/// strings are parsed first.
///
/// # Example
///
/// ```
/// use geocolumn_core::coordinate::{geodesic_coordinate, Axis, Ordinate};
///
/// assert_eq!(geodesic_coordinate(Ordinate::Number(45.0), Axis::Latitude).unwrap(), 45.0);
/// let err = geodesic_coordinate(Ordinate::Number(-230.0), Axis::Longitude).unwrap_err();
/// assert_eq!(
///     err.to_string(),
///     "Out of range longitude value, longitude must be between -180 and 180, got \"-230\"."
/// );
/// ```
pub fn geodesic_coordinate(ordinate: Ordinate<'_>, axis: Axis) -> Result<f64> {
    let (min, max) = axis.bounds();
    let value = match ordinate {
        Ordinate::Number(v) => v,
        Ordinate::Text(t) => parse_coordinate(t)?,
    };
    check_range(value, f64::from(min), f64::from(max))
        .map_err(|_| SpatialError::out_of_range(axis, ordinate))
}

/// Validate a cartesian ordinate. Numbers pass through unchanged; strings are
/// parsed with no range restriction beyond the one implied by a compass
/// letter.
pub fn cartesian_coordinate(ordinate: Ordinate<'_>) -> Result<f64> {
    match ordinate {
        Ordinate::Number(v) => Ok(v),
        Ordinate::Text(t) => parse_coordinate(t),
    }
}
