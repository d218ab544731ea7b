//! The level's own records, built from the decoded lumps with every index
//! checked against the array it points in to.

use glam::Vec2;
use wad::lumps::{NO_TEXTURE, VertexRef, WadLineDef, WadSector, WadSideDef};

use crate::error::LevelError;
use crate::vertex_pool::VertexPool;

#[derive(Debug, Clone, PartialEq)]
pub struct Sector {
    pub floor_height: f32,
    pub ceil_height: f32,
    pub floor_tex: String,
    pub ceil_tex: String,
    pub light_level: i16,
    pub kind: i16,
    pub tag: i16,
}

impl From<&WadSector> for Sector {
    fn from(s: &WadSector) -> Self {
        Self {
            floor_height: s.floor_height as f32,
            ceil_height: s.ceil_height as f32,
            floor_tex: s.floor_tex.clone(),
            ceil_tex: s.ceil_tex.clone(),
            light_level: s.light_level,
            kind: s.kind,
            tag: s.tag,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SideDef {
    pub x_offset: f32,
    pub y_offset: f32,
    /// `None` where the WAD has `-`
    pub upper_tex: Option<String>,
    pub lower_tex: Option<String>,
    pub middle_tex: Option<String>,
    /// Index in to the level sectors
    pub sector: usize,
}

fn texture(name: &str) -> Option<String> {
    (!name.is_empty() && name != NO_TEXTURE).then(|| name.to_owned())
}

impl SideDef {
    pub(crate) fn new(num: usize, side: &WadSideDef, sector_count: usize) -> Result<Self, LevelError> {
        let sector = side.sector as usize;
        if sector >= sector_count {
            return Err(LevelError::SectorOutOfRange {
                sidedef: num,
                sector,
                len: sector_count,
            });
        }
        Ok(Self {
            x_offset: side.x_offset as f32,
            y_offset: side.y_offset as f32,
            upper_tex: texture(&side.upper_tex),
            lower_tex: texture(&side.lower_tex),
            middle_tex: texture(&side.middle_tex),
            sector,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineDef {
    /// Index in to the base vertex pool
    pub start_vertex: usize,
    pub end_vertex: usize,
    pub flags: u16,
    pub special: u16,
    pub sector_tag: u16,
    pub right_sidedef: usize,
    pub left_sidedef: Option<usize>,
}

impl LineDef {
    pub(crate) fn new(
        num: usize,
        line: &WadLineDef,
        vertexes: &VertexPool,
        sidedef_count: usize,
    ) -> Result<Self, LevelError> {
        vertexes.resolve(VertexRef::Base(line.start_vertex as u32))?;
        vertexes.resolve(VertexRef::Base(line.end_vertex as u32))?;

        let check_side = |side: u16| {
            let side = side as usize;
            if side < sidedef_count {
                Ok(side)
            } else {
                Err(LevelError::SideDefOutOfRange {
                    linedef: num,
                    sidedef: side,
                    len: sidedef_count,
                })
            }
        };

        Ok(Self {
            start_vertex: line.start_vertex as usize,
            end_vertex: line.end_vertex as usize,
            flags: line.flags,
            special: line.special,
            sector_tag: line.sector_tag,
            right_sidedef: check_side(line.right_sidedef)?,
            left_sidedef: line.left_sidedef.map(check_side).transpose()?,
        })
    }

    pub fn is_two_sided(&self) -> bool {
        self.left_sidedef.is_some()
    }
}

/// The area a node keeps for each of its children
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct BBox {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl BBox {
    /// From the WAD order: top, bottom, left, right
    pub fn from_wad(raw: [i16; 4]) -> Self {
        Self {
            top: raw[0] as f32,
            bottom: raw[1] as f32,
            left: raw[2] as f32,
            right: raw[3] as f32,
        }
    }

    /// Strictly inside, a point on an edge is not contained
    pub fn contains(&self, point: Vec2) -> bool {
        point.x > self.left && point.x < self.right && point.y > self.bottom && point.y < self.top
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.left + self.right) * 0.5,
            (self.top + self.bottom) * 0.5,
        )
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use wad::lumps::{WadLineDef, WadSideDef, WadVertex};

    use crate::error::LevelError;
    use crate::map_defs::{BBox, LineDef, SideDef};
    use crate::vertex_pool::VertexPool;

    #[test]
    fn bbox_contains_is_strict() {
        let bbox = BBox::from_wad([128, 0, 0, 64]);
        assert!(bbox.contains(Vec2::new(32.0, 64.0)));
        assert!(!bbox.contains(Vec2::new(64.0, 64.0)));
        assert!(!bbox.contains(Vec2::new(32.0, 0.0)));
        assert!(!bbox.contains(Vec2::new(-1.0, 64.0)));
        assert_eq!(bbox.center(), Vec2::new(32.0, 64.0));
    }

    #[test]
    fn dash_is_no_texture() {
        let side = WadSideDef {
            x_offset: 0,
            y_offset: 0,
            upper_tex: "-".into(),
            lower_tex: "".into(),
            middle_tex: "STARTAN3".into(),
            sector: 0,
        };
        let side = SideDef::new(0, &side, 1).unwrap();
        assert_eq!(side.upper_tex, None);
        assert_eq!(side.lower_tex, None);
        assert_eq!(side.middle_tex.as_deref(), Some("STARTAN3"));
    }

    #[test]
    fn linedef_indexes_checked() {
        let pool = VertexPool::new(&[WadVertex { x: 0, y: 0 }, WadVertex { x: 64, y: 0 }]);
        let mut line = WadLineDef {
            start_vertex: 0,
            end_vertex: 1,
            flags: 0,
            special: 0,
            sector_tag: 0,
            right_sidedef: 0,
            left_sidedef: Some(1),
        };
        let ok = LineDef::new(0, &line, &pool, 2).unwrap();
        assert!(ok.is_two_sided());

        assert!(matches!(
            LineDef::new(3, &line, &pool, 1),
            Err(LevelError::SideDefOutOfRange {
                linedef: 3,
                sidedef: 1,
                len: 1
            })
        ));

        line.end_vertex = 2;
        assert!(matches!(
            LineDef::new(0, &line, &pool, 2),
            Err(LevelError::VertexOutOfRange { .. })
        ));
    }
}
