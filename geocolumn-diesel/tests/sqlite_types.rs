#![cfg(feature = "sqlite")]
#![allow(dead_code)]

use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Integer, Nullable, Text};
use geocolumn_core::ewkb::{extract_srid, write_ewkb};
use geocolumn_core::point::moment_from_timestamp;
use geocolumn_core::{
    Cartesian, Geodetic, LineString, Point, Point3D, Point4D, Polygon, Spatial,
};
use geocolumn_diesel::types::{Geography, GeographyValue, Geometry, GeometryValue};

// ── Helper to create an in-memory connection ─────────────────────────────────

fn conn() -> SqliteConnection {
    let mut c = SqliteConnection::establish(":memory:").unwrap();
    diesel::sql_query("CREATE TABLE t (id INTEGER PRIMARY KEY, geom BLOB)")
        .execute(&mut c)
        .unwrap();
    c
}

// ── QueryableByName row types ────────────────────────────────────────────────

#[derive(QueryableByName, Debug)]
struct GeomBytesRow {
    #[diesel(sql_type = Integer)]
    id: i32,
    #[diesel(sql_type = Nullable<Geometry>)]
    geom: Option<Vec<u8>>,
}

#[derive(QueryableByName, Debug)]
struct GeogBytesRow {
    #[diesel(sql_type = Integer)]
    id: i32,
    #[diesel(sql_type = Nullable<Geography>)]
    geom: Option<Vec<u8>>,
}

#[derive(QueryableByName, Debug)]
struct GeomRow {
    #[diesel(sql_type = Integer)]
    id: i32,
    #[diesel(sql_type = Nullable<Geometry>)]
    geom: Option<GeometryValue>,
}

#[derive(QueryableByName, Debug)]
struct GeogRow {
    #[diesel(sql_type = Integer)]
    id: i32,
    #[diesel(sql_type = Nullable<Geography>)]
    geom: Option<GeographyValue>,
}

fn select_geometry(c: &mut SqliteConnection) -> GeomRow {
    sql_query("SELECT id, geom FROM t WHERE id = 1")
        .get_result(c)
        .unwrap()
}

fn select_geography(c: &mut SqliteConnection) -> GeogRow {
    sql_query("SELECT id, geom FROM t WHERE id = 1")
        .get_result(c)
        .unwrap()
}

// ── Vec<u8> roundtrips ───────────────────────────────────────────────────────

#[test]
fn vec_u8_roundtrip_geometry() {
    let mut c = conn();

    let point: GeometryValue = Point::new(1, 2).unwrap().into();
    let ewkb = write_ewkb(&point, None).unwrap();

    sql_query("INSERT INTO t (id, geom) VALUES (1, ?)")
        .bind::<Geometry, _>(&ewkb)
        .execute(&mut c)
        .unwrap();

    let row: GeomBytesRow = sql_query("SELECT id, geom FROM t WHERE id = 1")
        .get_result(&mut c)
        .unwrap();

    assert_eq!(row.id, 1);
    let blob = row.geom.expect("geom should not be NULL");
    assert_eq!(blob, ewkb);
}

#[test]
fn slice_tosql_geography() {
    let mut c = conn();

    let point: GeographyValue = Point::from_lon_lat(10, 20).unwrap().into();
    let ewkb = write_ewkb(&point, Some(4326)).unwrap();

    sql_query("INSERT INTO t (id, geom) VALUES (1, ?)")
        .bind::<Geography, _>(ewkb.as_slice())
        .execute(&mut c)
        .unwrap();

    let row: GeogBytesRow = sql_query("SELECT id, geom FROM t WHERE id = 1")
        .get_result(&mut c)
        .unwrap();
    assert_eq!(row.geom.as_deref(), Some(ewkb.as_slice()));
}

// ── Value roundtrips ─────────────────────────────────────────────────────────

#[test]
fn geometry_roundtrip_without_srid() {
    let mut c = conn();

    let line: GeometryValue = LineString::from_positions([[0, 0], [500, 1], [1000, -2]])
        .unwrap()
        .into();

    sql_query("INSERT INTO t (id, geom) VALUES (1, ?)")
        .bind::<Geometry, _>(&line)
        .execute(&mut c)
        .unwrap();

    let bytes: GeomBytesRow = sql_query("SELECT id, geom FROM t WHERE id = 1")
        .get_result(&mut c)
        .unwrap();
    assert_eq!(extract_srid(&bytes.geom.unwrap()), None);

    let row = select_geometry(&mut c);
    assert_eq!(row.geom, Some(line));
}

#[test]
fn geometry_roundtrip_keeps_srid_and_dimensions() {
    let mut c = conn();

    let point: GeometryValue = Point3D::<Cartesian>::new(1, 2, 3.5)
        .unwrap()
        .with_srid(Some(3857))
        .into();

    sql_query("INSERT INTO t (id, geom) VALUES (1, ?)")
        .bind::<Geometry, _>(&point)
        .execute(&mut c)
        .unwrap();

    let back = select_geometry(&mut c).geom.unwrap();
    assert_eq!(back, point);
    assert_eq!(back.srid(), Some(3857));
    assert_eq!(back.to_string(), "POINT Z(SRID=3857;1 2 3.5)");
}

#[test]
fn moment_survives_the_database() {
    let mut c = conn();

    let moment = moment_from_timestamp(1_700_000_000.0).unwrap();
    let point: GeometryValue = Point4D::<Cartesian>::new(1, 2, 3.0, moment)
        .unwrap()
        .into();

    sql_query("INSERT INTO t (id, geom) VALUES (1, ?)")
        .bind::<Geometry, _>(&point)
        .execute(&mut c)
        .unwrap();

    assert_eq!(select_geometry(&mut c).geom, Some(point));
}

#[test]
fn geography_tosql_defaults_to_wgs84() {
    let mut c = conn();

    let ring = LineString::<Geodetic>::from_positions([[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]])
        .unwrap();
    let polygon: GeographyValue = Polygon::new(vec![ring]).into();
    assert_eq!(polygon.srid(), None);

    sql_query("INSERT INTO t (id, geom) VALUES (1, ?)")
        .bind::<Geography, _>(&polygon)
        .execute(&mut c)
        .unwrap();

    let bytes: GeogBytesRow = sql_query("SELECT id, geom FROM t WHERE id = 1")
        .get_result(&mut c)
        .unwrap();
    assert_eq!(extract_srid(&bytes.geom.unwrap()), Some(4326));

    let back = select_geography(&mut c).geom.unwrap();
    assert_eq!(back.srid(), Some(4326));
    assert_eq!(back.to_string(), polygon.to_string());
}

#[test]
fn geography_keeps_explicit_srid() {
    let mut c = conn();

    let point: GeographyValue = Point::from_lon_lat(-73.5, 45.5)
        .unwrap()
        .with_srid(Some(4269))
        .into();

    sql_query("INSERT INTO t (id, geom) VALUES (1, ?)")
        .bind::<Geography, _>(&point)
        .execute(&mut c)
        .unwrap();

    assert_eq!(select_geography(&mut c).geom, Some(point));
}

// ── Text values ──────────────────────────────────────────────────────────────

#[test]
fn ewkt_text_is_accepted() {
    let mut c = conn();

    sql_query("INSERT INTO t (id, geom) VALUES (1, ?)")
        .bind::<Text, _>("SRID=4326;MULTIPOINT(1 2,3 4)")
        .execute(&mut c)
        .unwrap();

    let back = select_geography(&mut c).geom.unwrap();
    assert_eq!(back.srid(), Some(4326));
    assert_eq!(back.to_string(), "1 2,3 4");
}

#[test]
fn out_of_range_geography_fails_to_load() {
    let mut c = conn();

    sql_query("INSERT INTO t (id, geom) VALUES (1, ?)")
        .bind::<Text, _>("POINT(500 500)")
        .execute(&mut c)
        .unwrap();

    // Fine as a cartesian geometry.
    assert!(select_geometry(&mut c).geom.is_some());

    let result: QueryResult<GeogRow> =
        sql_query("SELECT id, geom FROM t WHERE id = 1").get_result(&mut c);
    let err = result.unwrap_err();
    assert!(err.to_string().contains("Out of range longitude value"), "{err}");
}

#[test]
fn garbage_blob_is_an_error() {
    let mut c = conn();

    sql_query("INSERT INTO t (id, geom) VALUES (1, ?)")
        .bind::<Geometry, _>(&vec![0x01u8, 0xff, 0xff])
        .execute(&mut c)
        .unwrap();

    let result: QueryResult<GeomRow> =
        sql_query("SELECT id, geom FROM t WHERE id = 1").get_result(&mut c);
    assert!(result.is_err());
}

// ── NULL handling ────────────────────────────────────────────────────────────

#[test]
fn null_handling() {
    let mut c = conn();

    sql_query("INSERT INTO t (id, geom) VALUES (1, NULL)")
        .execute(&mut c)
        .unwrap();

    assert_eq!(select_geometry(&mut c).geom, None);
    assert_eq!(select_geography(&mut c).geom, None);
}

#[test]
fn none_binds_as_null() {
    let mut c = conn();

    sql_query("INSERT INTO t (id, geom) VALUES (1, ?)")
        .bind::<Nullable<Geometry>, _>(None::<GeometryValue>)
        .execute(&mut c)
        .unwrap();

    assert_eq!(select_geometry(&mut c).geom, None);
}
