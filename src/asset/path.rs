use crate::{
    asset::Asset,
    code::CodeRegistry,
    stream::DataCursor,
    ByteString, Error, GameVersion,
};

pub struct Path {
    pub name: ByteString,
    pub connection: ConnectionKind,
    pub closed: bool,

    /// Smoothing precision, 1-8
    pub precision: u32,

    pub points: Vec<Point>,
}

#[derive(Copy, Clone, Eq, PartialEq)]
pub enum ConnectionKind {
    StraightLine,
    SmoothCurve,
}

pub struct Point {
    pub x: f64,
    pub y: f64,
    pub speed: f64,
}

impl Asset for Path {
    fn deserialize(
        cur: &mut DataCursor,
        _version: GameVersion,
        _registry: &mut dyn CodeRegistry,
    ) -> Result<Self, Error> {
        let name = cur.read_pas_string()?;
        cur.skip(4)?; // data version, 530
        let connection = match cur.read_u32()? {
            0 => ConnectionKind::StraightLine,
            _ => ConnectionKind::SmoothCurve,
        };
        let closed = cur.read_bool()?;
        let precision = cur.read_u32()?;

        let count = cur.read_u32()? as usize;
        let mut points = Vec::with_capacity(count.min(cur.remaining() / 24));
        for _ in 0..count {
            points.push(Point { x: cur.read_f64()?, y: cur.read_f64()?, speed: cur.read_f64()? });
        }

        Ok(Path { name, connection, closed, precision, points })
    }
}
