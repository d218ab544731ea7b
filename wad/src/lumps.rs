//! Structures, in WAD order: Thing, LineDef, SideDef, Vertex, Segment (SEGS),
//! SubSector (SSECTORS), Node, Sector. Reject and Blockmap are not decoded.

use crate::error::WadError;
use crate::iterators::decode_records;
use crate::wad::MapLump;

/// A sidedef texture name of `-` means no texture on that part of the wall
pub const NO_TEXTURE: &str = "-";

/// Bit 15 of a classic node child marks a subsector leaf
pub const IS_SSECTOR_MASK_16: u16 = 0x8000;
/// Bit 31 of an extended node child marks a subsector leaf
pub const IS_SSECTOR_MASK: u32 = 0x8000_0000;
/// Bit 31 of an extended vertex reference selects the extended vertex pool
pub const IS_EXTENDED_VERTEX: u32 = 0x8000_0000;
/// A 16-bit side or linedef index of `0xFFFF` means "not present"
pub const NO_INDEX_16: u16 = 0xFFFF;

pub const THING_SIZE: usize = 10;
pub const LINEDEF_SIZE: usize = 14;
pub const SIDEDEF_SIZE: usize = 30;
pub const VERTEX_SIZE: usize = 4;
pub const SEGMENT_SIZE: usize = 12;
pub const SUBSECTOR_SIZE: usize = 4;
pub const NODE_SIZE: usize = 28;
pub const SECTOR_SIZE: usize = 26;

#[inline]
pub fn read_i16(bytes: &[u8], at: usize) -> i16 {
    i16::from_le_bytes([bytes[at], bytes[at + 1]])
}

#[inline]
pub fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

#[inline]
pub fn read_i32(bytes: &[u8], at: usize) -> i32 {
    i32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[inline]
pub fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// An 8 byte ASCII name, cut at the first NUL
pub fn read_name(bytes: &[u8], at: usize) -> String {
    let raw = &bytes[at..at + 8];
    let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

/// Which of the two vertex pools a reference points in to. The extended
/// format steals bit 31 of the index for this; the bit is removed here so
/// nothing downstream can mistake a large index for the flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexRef {
    /// Index in to the VERTEXES lump
    Base(u32),
    /// Index in to the GL_VERT lump
    Extended(u32),
}

impl VertexRef {
    pub const fn from_raw(raw: u32) -> Self {
        if raw & IS_EXTENDED_VERTEX != 0 {
            Self::Extended(raw & !IS_EXTENDED_VERTEX)
        } else {
            Self::Base(raw)
        }
    }

    pub const fn index(self) -> u32 {
        match self {
            VertexRef::Base(i) | VertexRef::Extended(i) => i,
        }
    }
}

/// A node child is either a leaf (subsector) or another node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeChild {
    Leaf(u32),
    Node(u32),
}

impl NodeChild {
    pub const fn from_classic(raw: u16) -> Self {
        if raw & IS_SSECTOR_MASK_16 != 0 {
            Self::Leaf((raw & !IS_SSECTOR_MASK_16) as u32)
        } else {
            Self::Node(raw as u32)
        }
    }

    pub const fn from_extended(raw: u32) -> Self {
        if raw & IS_SSECTOR_MASK != 0 {
            Self::Leaf(raw & !IS_SSECTOR_MASK)
        } else {
            Self::Node(raw)
        }
    }

    pub const fn is_leaf(self) -> bool {
        matches!(self, NodeChild::Leaf(_))
    }
}

/// A `Thing` describes only the position, type, and angle + spawn flags
///
/// The data in the WAD lump is structured as follows:
///
/// | Field Size | Data Type | Content    |
/// |------------|-----------|------------|
/// |  0x00-0x01 |    i16    | X Position |
/// |  0x02-0x03 |    i16    | Y Position |
/// |  0x04-0x05 |    i16    | Angle      |
/// |  0x06-0x07 |    i16    | Type       |
/// |  0x08-0x09 |    i16    | Flags      |
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WadThing {
    pub x: i16,
    pub y: i16,
    pub angle: i16,
    pub kind: i16,
    pub flags: i16,
}

/// A `Vertex` is the basic struct used for any type of coordinate in a level
///
/// | Field Size | Data Type | Content      |
/// |------------|-----------|--------------|
/// |  0x00-0x01 |    i16    | X Coordinate |
/// |  0x02-0x03 |    i16    | Y Coordinate |
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct WadVertex {
    pub x: i16,
    pub y: i16,
}

/// Each linedef represents a line from one of the VERTEXES to another.
///
/// The data in the WAD lump is structured as follows:
///
///| Field Size | Data Type      | Content                                   |
///|------------|----------------|-------------------------------------------|
///|  0x00-0x01 | Unsigned short | Start vertex                              |
///|  0x02-0x03 | Unsigned short | End vertex                                |
///|  0x04-0x05 | Unsigned short | Flags                                     |
///|  0x06-0x07 | Unsigned short | Line type / Action                        |
///|  0x08-0x09 | Unsigned short | Sector tag                                |
///|  0x0A-0x0B | Unsigned short | Right sidedef                             |
///|  0x0C-0x0D | Unsigned short | Left sidedef ( 0xFFFF side not present )  |
///
/// A Linedef will always have at least one side. This first side is referred to
/// as either front or right. If you imagine a linedef starting from the bottom
/// of the screen travelling upwards then the right side of this line is the first
/// valid side (and is the front).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WadLineDef {
    /// The line starts from this point
    pub start_vertex: u16,
    /// The line ends at this point
    pub end_vertex: u16,
    pub flags: u16,
    pub special: u16,
    /// Ties this line's effect to all SECTORS with the same tag
    pub sector_tag: u16,
    /// Pointer to the front (right) `SideDef` for this line
    pub right_sidedef: u16,
    /// Pointer to the back (left) `SideDef`, `None` if the line is one-sided
    pub left_sidedef: Option<u16>,
}

impl WadLineDef {
    pub fn is_two_sided(&self) -> bool {
        self.left_sidedef.is_some()
    }
}

/// A sidedef is a definition of what wall texture(s) to draw along a
/// `LineDef`, and a group of sidedefs outline the space of a `Sector`
///
/// | Field Size | Data Type    | Content               |
/// |------------|--------------|-----------------------|
/// |  0x00-0x01 |    i16       | X offset              |
/// |  0x02-0x03 |    i16       | Y offset              |
/// |  0x04-0x0B | 8 ASCII char | Upper texture         |
/// |  0x0C-0x13 | 8 ASCII char | Lower texture         |
/// |  0x14-0x1B | 8 ASCII char | Middle texture        |
/// |  0x1C-0x1D |    u16       | Sector this side faces|
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WadSideDef {
    pub x_offset: i16,
    pub y_offset: i16,
    /// Name of upper texture used for example in the upper of a window
    pub upper_tex: String,
    /// Name of lower texture used for example in the front of a step
    pub lower_tex: String,
    /// The regular part of a wall
    pub middle_tex: String,
    /// Sector that this sidedef faces or helps to surround
    pub sector: u16,
}

/// A `Sector` is a horizontal (east-west and north-south) area of the level
/// where a floor height and ceiling height is defined.
///
/// | Field Size | Data Type    | Content          |
/// |------------|--------------|------------------|
/// |  0x00-0x01 |    i16       | Floor height     |
/// |  0x02-0x03 |    i16       | Ceiling height   |
/// |  0x04-0x0B | 8 ASCII char | Floor texture    |
/// |  0x0C-0x13 | 8 ASCII char | Ceiling texture  |
/// |  0x14-0x15 |    i16       | Light level      |
/// |  0x16-0x17 |    i16       | Special type     |
/// |  0x18-0x19 |    i16       | Tag              |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WadSector {
    pub floor_height: i16,
    pub ceil_height: i16,
    pub floor_tex: String,
    pub ceil_tex: String,
    /// Light level from 0-255
    pub light_level: i16,
    /// This determines some area-effects called special sectors
    pub kind: i16,
    /// A "tag" number corresponding to LINEDEF(s) with the same tag
    pub tag: i16,
}

/// The Segments (SEGS) are in a sequential order determined by the `SubSector`
/// (SSECTOR), which are part of the NODES recursive tree
///
/// | Field Size | Data Type | Content                                          |
/// |------------|-----------|--------------------------------------------------|
/// |  0x00-0x01 |    u16    | Index to vertex the line starts from             |
/// |  0x02-0x03 |    u16    | Index to vertex the line ends with               |
/// |  0x04-0x05 |    i16    | Angle in Binary Angle Measurement (BAMS)         |
/// |  0x06-0x07 |    u16    | Index to the linedef this seg travels along      |
/// |  0x08-0x09 |    i16    | Direction along line. 0 == same as linedef       |
/// |  0x0A-0x0B |    i16    | Distance along the linedef this seg starts at    |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WadSegment {
    pub start_vertex: VertexRef,
    pub end_vertex: VertexRef,
    /// Binary Angle Measurement
    pub angle: i16,
    pub linedef: u16,
    /// The `side`, 0 = front/right, 1 = back/left
    pub direction: i16,
    pub offset: i16,
}

/// A `SubSector` is a run of `Segment`s bounding one convex area. Shared by
/// the classic and extended decoders, classic values are widened.
///
/// | Field Size | Data Type | Content                            |
/// |------------|-----------|------------------------------------|
/// |  0x00-0x01 |    u16    | How many segments line this sector |
/// |  0x02-0x03 |    u16    | Index to the starting segment      |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WadSubSector {
    pub seg_count: u32,
    pub start_seg: u32,
}

/// The partition line used to split the level, a box for each of the right
/// and left regions of the split, and the children of each side.
///
/// **The last node is the root node**
///
/// | Field Size | Content                                          |
/// |------------|--------------------------------------------------|
/// | 0x00-0x01  | X coordinate of the splitter                     |
/// | 0x02-0x03  | Y coordinate of the splitter                     |
/// | 0x04-0x05  | The amount to move in X to reach end of splitter |
/// | 0x06-0x07  | The amount to move in Y to reach end of splitter |
/// | 0x08-0x0F  | Right box: top, bottom, left, right              |
/// | 0x10-0x17  | Left box: top, bottom, left, right               |
/// | 0x18-0x19  | Right child, bit 15 set for a subsector          |
/// | 0x1A-0x1B  | Left child, bit 15 set for a subsector           |
///
/// The extended layout is identical except the two children are 32 bits wide
/// with bit 31 as the subsector flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WadNode {
    /// Where the line used for splitting the level starts
    pub x: i16,
    pub y: i16,
    /// Where the line used for splitting the level ends, relative to start
    pub dx: i16,
    pub dy: i16,
    /// `[right, left]`, each `[top, bottom, left, right]`
    pub bounding_boxes: [[i16; 4]; 2],
    /// `[right, left]`
    pub children: [NodeChild; 2],
}

pub(crate) fn read_node_head(bytes: &[u8]) -> (i16, i16, i16, i16, [[i16; 4]; 2]) {
    let mut bounding_boxes = [[0i16; 4]; 2];
    for (side, bbox) in bounding_boxes.iter_mut().enumerate() {
        for (i, v) in bbox.iter_mut().enumerate() {
            *v = read_i16(bytes, 8 + side * 8 + i * 2);
        }
    }
    (
        read_i16(bytes, 0),
        read_i16(bytes, 2),
        read_i16(bytes, 4),
        read_i16(bytes, 6),
        bounding_boxes,
    )
}

fn opt_index(raw: u16) -> Option<u16> {
    (raw != NO_INDEX_16).then_some(raw)
}

pub fn decode_things(bytes: &[u8]) -> Result<Vec<WadThing>, WadError> {
    decode_records(MapLump::Things.name(), bytes, THING_SIZE, |b| WadThing {
        x: read_i16(b, 0),
        y: read_i16(b, 2),
        angle: read_i16(b, 4),
        kind: read_i16(b, 6),
        flags: read_i16(b, 8),
    })
}

pub fn decode_linedefs(bytes: &[u8]) -> Result<Vec<WadLineDef>, WadError> {
    decode_records(MapLump::LineDefs.name(), bytes, LINEDEF_SIZE, |b| {
        WadLineDef {
            start_vertex: read_u16(b, 0),
            end_vertex: read_u16(b, 2),
            flags: read_u16(b, 4),
            special: read_u16(b, 6),
            sector_tag: read_u16(b, 8),
            right_sidedef: read_u16(b, 10),
            left_sidedef: opt_index(read_u16(b, 12)),
        }
    })
}

pub fn decode_sidedefs(bytes: &[u8]) -> Result<Vec<WadSideDef>, WadError> {
    decode_records(MapLump::SideDefs.name(), bytes, SIDEDEF_SIZE, |b| {
        WadSideDef {
            x_offset: read_i16(b, 0),
            y_offset: read_i16(b, 2),
            upper_tex: read_name(b, 4),
            lower_tex: read_name(b, 12),
            middle_tex: read_name(b, 20),
            sector: read_u16(b, 28),
        }
    })
}

pub fn decode_vertexes(bytes: &[u8]) -> Result<Vec<WadVertex>, WadError> {
    decode_records(MapLump::Vertexes.name(), bytes, VERTEX_SIZE, |b| {
        WadVertex {
            x: read_i16(b, 0),
            y: read_i16(b, 2),
        }
    })
}

pub fn decode_segments(bytes: &[u8]) -> Result<Vec<WadSegment>, WadError> {
    decode_records(MapLump::Segs.name(), bytes, SEGMENT_SIZE, |b| {
        WadSegment {
            start_vertex: VertexRef::Base(read_u16(b, 0) as u32),
            end_vertex: VertexRef::Base(read_u16(b, 2) as u32),
            angle: read_i16(b, 4),
            linedef: read_u16(b, 6),
            direction: read_i16(b, 8),
            offset: read_i16(b, 10),
        }
    })
}

pub fn decode_subsectors(bytes: &[u8]) -> Result<Vec<WadSubSector>, WadError> {
    decode_records(MapLump::SubSectors.name(), bytes, SUBSECTOR_SIZE, |b| {
        WadSubSector {
            seg_count: read_u16(b, 0) as u32,
            start_seg: read_u16(b, 2) as u32,
        }
    })
}

pub fn decode_nodes(bytes: &[u8]) -> Result<Vec<WadNode>, WadError> {
    decode_records(MapLump::Nodes.name(), bytes, NODE_SIZE, |b| {
        let (x, y, dx, dy, bounding_boxes) = read_node_head(b);
        WadNode {
            x,
            y,
            dx,
            dy,
            bounding_boxes,
            children: [
                NodeChild::from_classic(read_u16(b, 24)),
                NodeChild::from_classic(read_u16(b, 26)),
            ],
        }
    })
}

pub fn decode_sectors(bytes: &[u8]) -> Result<Vec<WadSector>, WadError> {
    decode_records(MapLump::Sectors.name(), bytes, SECTOR_SIZE, |b| {
        WadSector {
            floor_height: read_i16(b, 0),
            ceil_height: read_i16(b, 2),
            floor_tex: read_name(b, 4),
            ceil_tex: read_name(b, 12),
            light_level: read_i16(b, 20),
            kind: read_i16(b, 22),
            tag: read_i16(b, 24),
        }
    })
}

#[cfg(test)]
mod tests {
    use crate::error::WadError;
    use crate::lumps::*;

    fn name8(s: &str) -> [u8; 8] {
        let mut n = [0u8; 8];
        n[..s.len()].copy_from_slice(s.as_bytes());
        n
    }

    #[test]
    fn names_cut_at_first_nul() {
        let mut b = name8("STARTAN3").to_vec();
        assert_eq!(read_name(&b, 0), "STARTAN3");
        b[3] = 0;
        b[5] = b'X';
        assert_eq!(read_name(&b, 0), "STA");
        assert_eq!(read_name(&name8("-"), 0), NO_TEXTURE);
    }

    #[test]
    fn tagged_vertex_refs() {
        assert_eq!(VertexRef::from_raw(5), VertexRef::Base(5));
        assert_eq!(VertexRef::from_raw(0x8000_0005), VertexRef::Extended(5));
        assert_eq!(VertexRef::from_raw(0x7FFF_FFFF), VertexRef::Base(0x7FFF_FFFF));
        assert_eq!(VertexRef::from_raw(0x8000_0000).index(), 0);
    }

    #[test]
    fn tagged_node_children() {
        assert_eq!(NodeChild::from_classic(0x8003), NodeChild::Leaf(3));
        assert_eq!(NodeChild::from_classic(0x7FFF), NodeChild::Node(0x7FFF));
        assert_eq!(NodeChild::from_extended(0x8000_0003), NodeChild::Leaf(3));
        // Bit 15 is not a flag in the wide layout
        assert_eq!(NodeChild::from_extended(0x8003), NodeChild::Node(0x8003));
        assert!(NodeChild::Leaf(0).is_leaf());
    }

    #[test]
    fn decode_thing_fields() {
        let mut b = Vec::new();
        for v in [-1056i16, 3616, 270, 3004, 0x0007] {
            b.extend_from_slice(&v.to_le_bytes());
        }
        for v in [1i16, 2, 3, 4, 5] {
            b.extend_from_slice(&v.to_le_bytes());
        }
        let things = decode_things(&b).unwrap();
        assert_eq!(
            things[0],
            WadThing {
                x: -1056,
                y: 3616,
                angle: 270,
                kind: 3004,
                flags: 7,
            }
        );
        assert_eq!(
            things[1],
            WadThing {
                x: 1,
                y: 2,
                angle: 3,
                kind: 4,
                flags: 5,
            }
        );
        assert!(matches!(
            decode_things(&b[..THING_SIZE + 1]),
            Err(WadError::SizeMismatch { len: 11, .. })
        ));
    }

    #[test]
    fn decode_linedef_fields() {
        let mut b = Vec::new();
        for v in [1u16, 2, 0x0004, 11, 7, 0, 0xFFFF] {
            b.extend_from_slice(&v.to_le_bytes());
        }
        for v in [2u16, 3, 0, 0, 0, 1, 2] {
            b.extend_from_slice(&v.to_le_bytes());
        }
        let lines = decode_linedefs(&b).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            WadLineDef {
                start_vertex: 1,
                end_vertex: 2,
                flags: 4,
                special: 11,
                sector_tag: 7,
                right_sidedef: 0,
                left_sidedef: None,
            }
        );
        assert!(!lines[0].is_two_sided());
        assert_eq!(lines[1].left_sidedef, Some(2));
        assert!(lines[1].is_two_sided());
    }

    #[test]
    fn decode_sidedef_and_sector() {
        let mut b = Vec::new();
        b.extend_from_slice(&(-8i16).to_le_bytes());
        b.extend_from_slice(&16i16.to_le_bytes());
        b.extend_from_slice(&name8("-"));
        b.extend_from_slice(&name8("STEP1"));
        b.extend_from_slice(&name8("STARTAN3"));
        b.extend_from_slice(&3u16.to_le_bytes());
        let sides = decode_sidedefs(&b).unwrap();
        assert_eq!(sides[0].x_offset, -8);
        assert_eq!(sides[0].y_offset, 16);
        assert_eq!(sides[0].upper_tex, "-");
        assert_eq!(sides[0].lower_tex, "STEP1");
        assert_eq!(sides[0].middle_tex, "STARTAN3");
        assert_eq!(sides[0].sector, 3);

        let mut b = Vec::new();
        b.extend_from_slice(&0i16.to_le_bytes());
        b.extend_from_slice(&128i16.to_le_bytes());
        b.extend_from_slice(&name8("FLOOR4_8"));
        b.extend_from_slice(&name8("F_SKY1"));
        for v in [160i16, 9, 42] {
            b.extend_from_slice(&v.to_le_bytes());
        }
        let sectors = decode_sectors(&b).unwrap();
        assert_eq!(
            sectors[0],
            WadSector {
                floor_height: 0,
                ceil_height: 128,
                floor_tex: "FLOOR4_8".into(),
                ceil_tex: "F_SKY1".into(),
                light_level: 160,
                kind: 9,
                tag: 42,
            }
        );
    }

    #[test]
    fn decode_node_children() {
        let mut b = Vec::new();
        for v in [64i16, 0, 0, 128, 128, 0, 0, 64, 128, 0, 64, 128] {
            b.extend_from_slice(&v.to_le_bytes());
        }
        b.extend_from_slice(&0x8000u16.to_le_bytes());
        b.extend_from_slice(&0x0002u16.to_le_bytes());
        let nodes = decode_nodes(&b).unwrap();
        assert_eq!(nodes.len(), 1);
        let n = &nodes[0];
        assert_eq!((n.x, n.y, n.dx, n.dy), (64, 0, 0, 128));
        assert_eq!(n.bounding_boxes[0], [128, 0, 0, 64]);
        assert_eq!(n.bounding_boxes[1], [128, 0, 64, 128]);
        assert_eq!(n.children, [NodeChild::Leaf(0), NodeChild::Node(2)]);
    }

    #[test]
    fn decode_segments_and_subsectors() {
        let mut b = Vec::new();
        for v in [0u16, 1, 0x4000, 3, 1, 16] {
            b.extend_from_slice(&v.to_le_bytes());
        }
        let segs = decode_segments(&b).unwrap();
        assert_eq!(segs[0].start_vertex, VertexRef::Base(0));
        assert_eq!(segs[0].end_vertex, VertexRef::Base(1));
        assert_eq!(segs[0].angle, 0x4000);
        assert_eq!(segs[0].linedef, 3);
        assert_eq!(segs[0].direction, 1);
        assert_eq!(segs[0].offset, 16);

        let b = [4, 0, 0xFF, 0xFF];
        let ssect = decode_subsectors(&b).unwrap();
        assert_eq!(
            ssect[0],
            WadSubSector {
                seg_count: 4,
                start_seg: 0xFFFF
            }
        );
    }

    #[test]
    fn size_mismatch_names_the_lump() {
        assert!(matches!(
            decode_things(&[0u8; 11]),
            Err(WadError::SizeMismatch {
                record: "THINGS",
                len: 11,
                record_size: 10
            })
        ));
        assert!(matches!(
            decode_nodes(&[0u8; 27]),
            Err(WadError::SizeMismatch { record: "NODES", .. })
        ));
        assert!(decode_vertexes(&[]).unwrap().is_empty());
    }
}
