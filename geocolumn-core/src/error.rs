use thiserror::Error;

use crate::coordinate::Axis;
use crate::family::FamilyKind;
use crate::geometry::TypeTag;

#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("Out of range {axis} value, {axis} must be between {min} and {max}, got \"{value}\".")]
    OutOfRange {
        axis: Axis,
        min: i32,
        max: i32,
        value: String,
    },

    #[error("Invalid coordinate value, got \"{0}\".")]
    InvalidCoordinate(String),

    #[error("Invalid SRID value, SRID must be an integer or absent, got \"{0}\".")]
    InvalidSrid(String),

    #[error("Unsupported {family} type \"{tag}\".")]
    UnsupportedType { family: FamilyKind, tag: String },

    #[error("Unsupported family \"{0}\", expected Geometry or Geography.")]
    UnsupportedFamily(String),

    #[error("Invalid {tag} value, expected {expected}.")]
    InvalidShape {
        tag: TypeTag,
        expected: &'static str,
    },

    #[error("Invalid moment value, got \"{0}\".")]
    InvalidMoment(f64),

    #[error("unsupported coordinate dimensions: {dimensions}")]
    UnsupportedDimensions { dimensions: &'static str },

    #[error("invalid EWKB: {0}")]
    InvalidEwkb(&'static str),

    #[error("geozero error: {0}")]
    Geozero(#[from] geozero::error::GeozeroError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SpatialError {
    pub(crate) fn out_of_range(axis: Axis, value: impl ToString) -> Self {
        let (min, max) = axis.bounds();
        SpatialError::OutOfRange {
            axis,
            min,
            max,
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SpatialError>;
