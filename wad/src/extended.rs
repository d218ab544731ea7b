use crate::error::WadError;
use crate::iterators::decode_records;
use crate::lumps::{
    NodeChild, VERTEX_SIZE, VertexRef, WadNode, WadSubSector, read_i16, read_i32, read_node_head,
    read_u16, read_u32,
};
use crate::wad::GlLump;

/// Leading tag of a version 5 GL_VERT lump
pub const GL_VERTEX_MAGIC: &[u8; 4] = b"gNd5";

pub const GL_VERTEX_SIZE: usize = 8;
pub const GL_SEGMENT_SIZE: usize = 16;
pub const GL_SUBSECTOR_SIZE: usize = 8;
pub const GL_NODE_SIZE: usize = 32;

/// One map unit in 16.16 fixed point
pub const FRACUNIT: f32 = (1 << 16) as f32;

#[inline]
pub fn fixed_to_float(value: i32) -> f32 {
    value as f32 / FRACUNIT
}

/// A vertex from the GL_VERT lump in 16.16 fixed point
///
/// | Field Size | Data Type | Content      |
/// |------------|-----------|--------------|
/// |  0x00-0x03 |    i32    | X Coordinate |
/// |  0x04-0x07 |    i32    | Y Coordinate |
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct GlVertex {
    pub x: i32,
    pub y: i32,
}

impl GlVertex {
    pub fn x_f32(&self) -> f32 {
        fixed_to_float(self.x)
    }

    pub fn y_f32(&self) -> f32 {
        fixed_to_float(self.y)
    }
}

/// A segment from the GL_SEGS lump. GL nodebuilders add segments along
/// partition lines that belong to no linedef so every subsector is closed.
///
/// | Field Size | Data Type | Content                                        |
/// |------------|-----------|------------------------------------------------|
/// |  0x00-0x03 |    u32    | Start vertex, bit 31 set for a GL vertex       |
/// |  0x04-0x07 |    u32    | End vertex, bit 31 set for a GL vertex         |
/// |  0x08-0x09 |    u16    | Linedef, `0xFFFF` for a partition-only segment |
/// |  0x0A-0x0B |    i16    | Side of the linedef, 0 right, 1 left           |
/// |  0x0C-0x0F |    u32    | Partner segment on the other side, or `!0`     |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlSegment {
    pub start_vertex: VertexRef,
    pub end_vertex: VertexRef,
    pub linedef: Option<u16>,
    pub direction: i16,
    pub partner: Option<u32>,
}

/// GL_VERT with the `gNd5` tag is 8 byte fixed point records. Without the
/// tag the lump is read as classic 4 byte vertexes.
pub fn decode_gl_vertexes(bytes: &[u8]) -> Result<Vec<GlVertex>, WadError> {
    match bytes.strip_prefix(GL_VERTEX_MAGIC.as_slice()) {
        Some(records) => decode_records(GlLump::Vertexes.name(), records, GL_VERTEX_SIZE, |b| {
            GlVertex {
                x: read_i32(b, 0),
                y: read_i32(b, 4),
            }
        }),
        None => decode_records(GlLump::Vertexes.name(), bytes, VERTEX_SIZE, |b| {
            GlVertex {
                x: (read_i16(b, 0) as i32) << 16,
                y: (read_i16(b, 2) as i32) << 16,
            }
        }),
    }
}

pub fn decode_gl_segments(bytes: &[u8]) -> Result<Vec<GlSegment>, WadError> {
    decode_records(GlLump::Segs.name(), bytes, GL_SEGMENT_SIZE, |b| {
        let linedef = read_u16(b, 8);
        let partner = read_u32(b, 12);
        GlSegment {
            start_vertex: VertexRef::from_raw(read_u32(b, 0)),
            end_vertex: VertexRef::from_raw(read_u32(b, 4)),
            linedef: (linedef != 0xFFFF).then_some(linedef),
            direction: read_i16(b, 10),
            partner: (partner != u32::MAX).then_some(partner),
        }
    })
}

pub fn decode_gl_subsectors(bytes: &[u8]) -> Result<Vec<WadSubSector>, WadError> {
    decode_records(GlLump::SubSectors.name(), bytes, GL_SUBSECTOR_SIZE, |b| {
        WadSubSector {
            seg_count: read_u32(b, 0),
            start_seg: read_u32(b, 4),
        }
    })
}

pub fn decode_gl_nodes(bytes: &[u8]) -> Result<Vec<WadNode>, WadError> {
    decode_records(GlLump::Nodes.name(), bytes, GL_NODE_SIZE, |b| {
        let (x, y, dx, dy, bounding_boxes) = read_node_head(b);
        WadNode {
            x,
            y,
            dx,
            dy,
            bounding_boxes,
            children: [
                NodeChild::from_extended(read_u32(b, 24)),
                NodeChild::from_extended(read_u32(b, 28)),
            ],
        }
    })
}
