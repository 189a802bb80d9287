//! Diesel SQL type definitions and `FromSql` / `ToSql` implementations.
//!
//! Both `Geometry` and `Geography` map to `Binary` (BLOB) in SQLite and
//! to PostGIS's native `geometry` / `geography` types in PostgreSQL.
//! Values are written as EWKB; reads accept EWKB or EWKT text.

use geocolumn_core::{Cartesian, Geodetic};

// ── SQL types ─────────────────────────────────────────────────────────────────

/// Diesel SQL type for a geometry column (stored as EWKB BLOB).
///
/// Maps to [`geocolumn_core::Geometry<Cartesian>`].
///
/// ```rust,ignore
/// table! {
///     features (id) {
///         id   -> Integer,
///         geom -> geocolumn_diesel::Geometry,
///     }
/// }
/// ```
#[derive(diesel::sql_types::SqlType, diesel::query_builder::QueryId, Debug, Clone, Copy)]
#[diesel(sqlite_type(name = "Binary"))]
#[diesel(postgres_type(name = "geometry"))]
pub struct Geometry;

/// Diesel SQL type for a geography column (stored as EWKB BLOB).
///
/// Maps to [`geocolumn_core::Geometry<Geodetic>`]. Values without an SRID
/// are written with SRID 4326; ordinates read back are range checked.
#[derive(diesel::sql_types::SqlType, diesel::query_builder::QueryId, Debug, Clone, Copy)]
#[diesel(sqlite_type(name = "Binary"))]
#[diesel(postgres_type(name = "geography"))]
pub struct Geography;

/// A cartesian value bound to a [`Geometry`] column.
pub type GeometryValue = geocolumn_core::Geometry<Cartesian>;

/// A geodetic value bound to a [`Geography`] column.
pub type GeographyValue = geocolumn_core::Geometry<Geodetic>;

#[cfg(any(feature = "sqlite", feature = "postgres"))]
type BoxedError = Box<dyn std::error::Error + Send + Sync>;

#[cfg(any(feature = "sqlite", feature = "postgres"))]
fn decode<F: geocolumn_core::Family>(
    bytes: &[u8],
) -> std::result::Result<geocolumn_core::Geometry<F>, BoxedError> {
    geocolumn_core::conversion::geometry_from_database::<F>(bytes)
        .map_err(|e| Box::new(e) as BoxedError)
}

#[cfg(any(feature = "sqlite", feature = "postgres"))]
fn encode<F: geocolumn_core::Family>(
    geometry: &geocolumn_core::Geometry<F>,
) -> std::result::Result<Vec<u8>, BoxedError> {
    geocolumn_core::conversion::to_database_binary(geometry).map_err(|e| Box::new(e) as BoxedError)
}

// ── SQLite FromSql / ToSql ────────────────────────────────────────────────────

#[cfg(feature = "sqlite")]
mod sqlite_impls {
    use super::*;
    use diesel::deserialize::{self, FromSql};
    use diesel::serialize::{self, IsNull, Output, ToSql};
    use diesel::sql_types::Binary;
    use diesel::sqlite::Sqlite;
    // SQLite Output does NOT implement std::io::Write.
    // Binary values are passed via `out.set_value(value)`.

    macro_rules! impl_raw_bytes {
        ($sql_type:ty) => {
            impl FromSql<$sql_type, Sqlite> for Vec<u8> {
                fn from_sql(
                    bytes: <Sqlite as diesel::backend::Backend>::RawValue<'_>,
                ) -> deserialize::Result<Self> {
                    <Vec<u8> as FromSql<Binary, Sqlite>>::from_sql(bytes)
                }
            }

            impl ToSql<$sql_type, Sqlite> for Vec<u8> {
                fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
                    out.set_value(self.as_slice());
                    Ok(IsNull::No)
                }
            }

            impl ToSql<$sql_type, Sqlite> for [u8] {
                fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
                    out.set_value(self);
                    Ok(IsNull::No)
                }
            }
        };
    }

    macro_rules! impl_value {
        ($sql_type:ty, $value:ty) => {
            impl FromSql<$sql_type, Sqlite> for $value {
                fn from_sql(
                    bytes: <Sqlite as diesel::backend::Backend>::RawValue<'_>,
                ) -> deserialize::Result<Self> {
                    // Text values come back through the same blob accessor.
                    let blob = <Vec<u8> as FromSql<Binary, Sqlite>>::from_sql(bytes)?;
                    decode(&blob)
                }
            }

            impl ToSql<$sql_type, Sqlite> for $value {
                fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
                    out.set_value(encode(self)?);
                    Ok(IsNull::No)
                }
            }
        };
    }

    impl_raw_bytes!(Geometry);
    impl_raw_bytes!(Geography);
    impl_value!(Geometry, GeometryValue);
    impl_value!(Geography, GeographyValue);
}

// ── PostgreSQL FromSql / ToSql ────────────────────────────────────────────────

#[cfg(feature = "postgres")]
mod postgres_impls {
    use super::*;
    use diesel::deserialize::{self, FromSql};
    use diesel::pg::Pg;
    use diesel::serialize::{self, IsNull, Output, ToSql};
    use std::io::Write as IoWrite;

    // PostgreSQL Output implements std::io::Write, so binary data is written
    // via `IoWrite::write_all(out, &bytes)`.

    macro_rules! impl_raw_bytes_pg {
        ($sql_type:ty) => {
            impl FromSql<$sql_type, Pg> for Vec<u8> {
                fn from_sql(
                    bytes: <Pg as diesel::backend::Backend>::RawValue<'_>,
                ) -> deserialize::Result<Self> {
                    Ok(bytes.as_bytes().to_vec())
                }
            }

            impl ToSql<$sql_type, Pg> for Vec<u8> {
                fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
                    IoWrite::write_all(out, self)?;
                    Ok(IsNull::No)
                }
            }

            impl ToSql<$sql_type, Pg> for [u8] {
                fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
                    IoWrite::write_all(out, self)?;
                    Ok(IsNull::No)
                }
            }
        };
    }

    macro_rules! impl_value_pg {
        ($sql_type:ty, $value:ty) => {
            impl FromSql<$sql_type, Pg> for $value {
                fn from_sql(
                    bytes: <Pg as diesel::backend::Backend>::RawValue<'_>,
                ) -> deserialize::Result<Self> {
                    decode(bytes.as_bytes())
                }
            }

            impl ToSql<$sql_type, Pg> for $value {
                fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
                    IoWrite::write_all(out, &encode(self)?)?;
                    Ok(IsNull::No)
                }
            }
        };
    }

    impl_raw_bytes_pg!(Geometry);
    impl_raw_bytes_pg!(Geography);
    impl_value_pg!(Geometry, GeometryValue);
    impl_value_pg!(Geography, GeographyValue);
}
