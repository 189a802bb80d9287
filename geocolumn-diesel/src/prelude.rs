//! Convenience re-exports for geocolumn-diesel.
//!
//! ```rust,ignore
//! use geocolumn_diesel::prelude::*;
//! ```

pub use crate::types::{Geography, Geometry};
pub use geocolumn_core::{Cartesian, Geodetic, Spatial};
