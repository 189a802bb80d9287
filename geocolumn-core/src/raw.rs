//! Structured values decoded from text or binary, before the dispatcher
//! turns them into typed geometries.

use geozero::error::GeozeroError;
use geozero::{CoordDimensions, GeomProcessor};

use crate::error::{Result, SpatialError};

/// A decoded value: an ordinate tuple, a nested sequence, or a tagged child
/// geometry inside a collection.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Coordinates(Vec<f64>),
    Sequence(Vec<RawValue>),
    Geometry(Box<RawGeometry>),
}

impl From<Vec<f64>> for RawValue {
    fn from(value: Vec<f64>) -> Self {
        RawValue::Coordinates(value)
    }
}

impl<const N: usize> From<[f64; N]> for RawValue {
    fn from(value: [f64; N]) -> Self {
        RawValue::Coordinates(value.to_vec())
    }
}

impl From<Vec<RawValue>> for RawValue {
    fn from(value: Vec<RawValue>) -> Self {
        RawValue::Sequence(value)
    }
}

impl From<RawGeometry> for RawValue {
    fn from(value: RawGeometry) -> Self {
        RawValue::Geometry(Box::new(value))
    }
}

/// A tag, its value and the SRID found alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawGeometry {
    pub type_tag: String,
    pub srid: Option<i32>,
    pub value: RawValue,
}

impl RawGeometry {
    pub fn new(type_tag: impl Into<String>, value: impl Into<RawValue>, srid: Option<i32>) -> Self {
        Self {
            type_tag: type_tag.into(),
            srid,
            value: value.into(),
        }
    }
}

#[derive(Debug)]
struct Frame {
    /// `None` for untagged parts such as polygon rings.
    tag: Option<&'static str>,
    items: Vec<RawValue>,
}

/// Collects geozero processing events into a [`RawGeometry`] tree.
#[derive(Debug, Default)]
pub(crate) struct RawGeometryBuilder {
    stack: Vec<Frame>,
    srid: Option<i32>,
    finished: Option<RawGeometry>,
}

fn geometry_error(message: impl Into<String>) -> GeozeroError {
    GeozeroError::Geometry(message.into())
}

impl RawGeometryBuilder {
    pub(crate) fn finish(self) -> Result<RawGeometry> {
        self.finished
            .ok_or_else(|| SpatialError::Geozero(geometry_error("no geometry decoded")))
    }

    /// Sizes declared by the input are not trusted for allocation.
    fn open(&mut self, tag: Option<&'static str>) {
        self.stack.push(Frame {
            tag,
            items: Vec::new(),
        });
    }

    fn push_item(&mut self, item: RawValue) -> geozero::error::Result<()> {
        match self.stack.last_mut() {
            Some(frame) => {
                frame.items.push(item);
                Ok(())
            }
            None => Err(geometry_error("coordinate outside of a geometry")),
        }
    }

    fn close(&mut self) -> geozero::error::Result<Frame> {
        self.stack
            .pop()
            .ok_or_else(|| geometry_error("unbalanced geometry end"))
    }

    /// Attach a finished tagged geometry to its parent collection, or keep
    /// it as the result when it is the outermost one.
    fn complete(&mut self, type_tag: &str, value: RawValue) -> geozero::error::Result<()> {
        let geometry = RawGeometry {
            type_tag: type_tag.to_string(),
            srid: None,
            value,
        };
        if self.stack.is_empty() {
            self.finished = Some(RawGeometry {
                srid: self.srid,
                ..geometry
            });
            Ok(())
        } else {
            self.push_item(geometry.into())
        }
    }

    fn close_sequence(&mut self, tagged: bool) -> geozero::error::Result<()> {
        let frame = self.close()?;
        let value = RawValue::Sequence(frame.items);
        match (tagged, frame.tag) {
            (true, Some(tag)) => self.complete(tag, value),
            _ => self.push_item(value),
        }
    }

    fn unsupported(kind: &str) -> geozero::error::Result<()> {
        Err(geometry_error(format!("unsupported geometry type {kind}")))
    }
}

impl GeomProcessor for RawGeometryBuilder {
    fn dimensions(&self) -> CoordDimensions {
        CoordDimensions::xyzm()
    }

    fn srid(&mut self, srid: Option<i32>) -> geozero::error::Result<()> {
        if srid.is_some() {
            self.srid = srid;
        }
        Ok(())
    }

    fn xy(&mut self, x: f64, y: f64, _idx: usize) -> geozero::error::Result<()> {
        self.push_item(RawValue::Coordinates(vec![x, y]))
    }

    fn coordinate(
        &mut self,
        x: f64,
        y: f64,
        z: Option<f64>,
        m: Option<f64>,
        _t: Option<f64>,
        _tm: Option<u64>,
        _idx: usize,
    ) -> geozero::error::Result<()> {
        let ordinates = match (z, m) {
            (None, None) => vec![x, y],
            (Some(z), None) => vec![x, y, z],
            (Some(z), Some(m)) => vec![x, y, z, m],
            (None, Some(_)) => {
                return Err(geometry_error("unsupported coordinate dimensions: M"));
            }
        };
        self.push_item(RawValue::Coordinates(ordinates))
    }

    fn empty_point(&mut self, _idx: usize) -> geozero::error::Result<()> {
        Err(geometry_error("empty points are not supported"))
    }

    fn point_begin(&mut self, _idx: usize) -> geozero::error::Result<()> {
        self.open(None);
        Ok(())
    }

    fn point_end(&mut self, _idx: usize) -> geozero::error::Result<()> {
        let mut frame = self.close()?;
        let Some(RawValue::Coordinates(ordinates)) = frame.items.pop() else {
            return Err(geometry_error("point without coordinates"));
        };
        let tag = match ordinates.len() {
            2 => "POINT",
            3 => "POINT Z",
            _ => "POINT ZM",
        };
        self.complete(tag, RawValue::Coordinates(ordinates))
    }

    fn multipoint_begin(&mut self, _size: usize, _idx: usize) -> geozero::error::Result<()> {
        self.open(Some("MULTIPOINT"));
        Ok(())
    }

    fn multipoint_end(&mut self, _idx: usize) -> geozero::error::Result<()> {
        self.close_sequence(true)
    }

    fn linestring_begin(&mut self, tagged: bool, _size: usize, _idx: usize) -> geozero::error::Result<()> {
        self.open(tagged.then_some("LINESTRING"));
        Ok(())
    }

    fn linestring_end(&mut self, tagged: bool, _idx: usize) -> geozero::error::Result<()> {
        self.close_sequence(tagged)
    }

    fn multilinestring_begin(&mut self, _size: usize, _idx: usize) -> geozero::error::Result<()> {
        self.open(Some("MULTILINESTRING"));
        Ok(())
    }

    fn multilinestring_end(&mut self, _idx: usize) -> geozero::error::Result<()> {
        self.close_sequence(true)
    }

    fn polygon_begin(&mut self, tagged: bool, _size: usize, _idx: usize) -> geozero::error::Result<()> {
        self.open(tagged.then_some("POLYGON"));
        Ok(())
    }

    fn polygon_end(&mut self, tagged: bool, _idx: usize) -> geozero::error::Result<()> {
        self.close_sequence(tagged)
    }

    fn multipolygon_begin(&mut self, _size: usize, _idx: usize) -> geozero::error::Result<()> {
        self.open(Some("MULTIPOLYGON"));
        Ok(())
    }

    fn multipolygon_end(&mut self, _idx: usize) -> geozero::error::Result<()> {
        self.close_sequence(true)
    }

    fn geometrycollection_begin(&mut self, _size: usize, _idx: usize) -> geozero::error::Result<()> {
        self.open(Some("GEOMETRYCOLLECTION"));
        Ok(())
    }

    fn geometrycollection_end(&mut self, _idx: usize) -> geozero::error::Result<()> {
        self.close_sequence(true)
    }

    fn circularstring_begin(&mut self, _size: usize, _idx: usize) -> geozero::error::Result<()> {
        Self::unsupported("CIRCULARSTRING")
    }

    fn compoundcurve_begin(&mut self, _size: usize, _idx: usize) -> geozero::error::Result<()> {
        Self::unsupported("COMPOUNDCURVE")
    }

    fn curvepolygon_begin(&mut self, _size: usize, _idx: usize) -> geozero::error::Result<()> {
        Self::unsupported("CURVEPOLYGON")
    }

    fn multicurve_begin(&mut self, _size: usize, _idx: usize) -> geozero::error::Result<()> {
        Self::unsupported("MULTICURVE")
    }

    fn multisurface_begin(&mut self, _size: usize, _idx: usize) -> geozero::error::Result<()> {
        Self::unsupported("MULTISURFACE")
    }

    fn triangle_begin(&mut self, _tagged: bool, _size: usize, _idx: usize) -> geozero::error::Result<()> {
        Self::unsupported("TRIANGLE")
    }

    fn polyhedralsurface_begin(&mut self, _size: usize, _idx: usize) -> geozero::error::Result<()> {
        Self::unsupported("POLYHEDRALSURFACE")
    }

    fn tin_begin(&mut self, _size: usize, _idx: usize) -> geozero::error::Result<()> {
        Self::unsupported("TIN")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geozero::wkt::Wkt;
    use geozero::GeozeroGeometry;

    fn decode(wkt: &str) -> Result<RawGeometry> {
        let mut builder = RawGeometryBuilder::default();
        Wkt(wkt.as_bytes()).process_geom(&mut builder)?;
        builder.finish()
    }

    #[test]
    fn point_tags_follow_dimensions() {
        assert_eq!(
            decode("POINT(2 3)").unwrap(),
            RawGeometry::new("POINT", [2.0, 3.0], None)
        );
        assert_eq!(decode("POINT Z(1 2 3)").unwrap().type_tag, "POINT Z");
        assert_eq!(decode("POINT ZM(1 2 3 4)").unwrap().type_tag, "POINT ZM");
    }

    #[test]
    fn polygon_rings_are_untagged_sequences() {
        let raw = decode("POLYGON((0 0,1 0,1 1,0 0))").unwrap();
        assert_eq!(raw.type_tag, "POLYGON");
        assert_eq!(
            raw.value,
            RawValue::Sequence(vec![RawValue::Sequence(vec![
                [0.0, 0.0].into(),
                [1.0, 0.0].into(),
                [1.0, 1.0].into(),
                [0.0, 0.0].into(),
            ])])
        );
    }

    #[test]
    fn collection_members_are_tagged() {
        let raw = decode("GEOMETRYCOLLECTION(POINT(1 2),LINESTRING(0 0,1 1))").unwrap();
        let RawValue::Sequence(members) = raw.value else {
            panic!("expected a sequence");
        };
        let tags: Vec<_> = members
            .iter()
            .map(|m| match m {
                RawValue::Geometry(g) => g.type_tag.as_str(),
                other => panic!("unexpected member {other:?}"),
            })
            .collect();
        assert_eq!(tags, ["POINT", "LINESTRING"]);
    }

    #[test]
    fn empty_point_and_measure_only_are_rejected() {
        assert!(decode("POINT EMPTY").is_err());
        assert!(decode("POINT M(1 2 3)").is_err());
    }

    #[test]
    fn empty_line_string_decodes() {
        assert_eq!(
            decode("LINESTRING EMPTY").unwrap(),
            RawGeometry::new("LINESTRING", Vec::<RawValue>::new(), None)
        );
    }
}
