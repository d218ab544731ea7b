use glam::Vec2;
use wad::lumps::VertexRef;

use crate::error::LevelError;
use crate::map_defs::{LineDef, Sector, SideDef};
use crate::vertex_pool::VertexPool;

/// A right sector whose ceiling texture contains this is open to the sky
pub const SKY_MARKER: &str = "SKY";

/// A linedef as a solid edge: where it is, which way it faces, and what lies
/// on either side of it
#[derive(Debug, Clone, PartialEq)]
pub struct Wall {
    pub start: Vec2,
    pub end: Vec2,
    /// `tangent` rotated 90 degrees anticlockwise
    pub normal: Vec2,
    /// Unit vector from `start` to `end`
    pub tangent: Vec2,
    pub length: f32,
    pub two_sided: bool,
    pub sky: bool,
    pub linedef: usize,
    pub right_side: usize,
    pub right_sector: usize,
    pub left_side: Option<usize>,
    pub left_sector: Option<usize>,
}

impl Wall {
    pub fn new(
        num: usize,
        line: &LineDef,
        vertexes: &VertexPool,
        sidedefs: &[SideDef],
        sectors: &[Sector],
    ) -> Result<Self, LevelError> {
        let start = vertexes.resolve(VertexRef::Base(line.start_vertex as u32))?;
        let end = vertexes.resolve(VertexRef::Base(line.end_vertex as u32))?;

        let side_sector = |side: usize| -> Result<usize, LevelError> {
            let sidedef = sidedefs.get(side).ok_or(LevelError::SideDefOutOfRange {
                linedef: num,
                sidedef: side,
                len: sidedefs.len(),
            })?;
            if sidedef.sector >= sectors.len() {
                return Err(LevelError::SectorOutOfRange {
                    sidedef: side,
                    sector: sidedef.sector,
                    len: sectors.len(),
                });
            }
            Ok(sidedef.sector)
        };

        let right_sector = side_sector(line.right_sidedef)?;
        let left_sector = line.left_sidedef.map(side_sector).transpose()?;
        let tangent = (end - start).normalize_or_zero();

        Ok(Self {
            start,
            end,
            normal: tangent.perp(),
            tangent,
            length: start.distance(end),
            two_sided: line.left_sidedef.is_some(),
            sky: sectors[right_sector].ceil_tex.contains(SKY_MARKER),
            linedef: num,
            right_side: line.right_sidedef,
            right_sector,
            left_side: line.left_sidedef,
            left_sector,
        })
    }
}
