use std::ops::Range;
use std::path::{Path, PathBuf};
use std::{fmt, fs};

use log::{debug, info};

use crate::error::WadError;
use crate::lumps::{read_i32, read_name};

/// Size in bytes of the fixed header at the start of every WAD
pub const HEADER_SIZE: usize = 12;
/// Size in bytes of one directory entry
pub const DIR_ENTRY_SIZE: usize = 16;

/// The positional role of each lump following a level marker, for example
/// the lump at `index_of("E1M1") + MapLump::Nodes as usize` is the NODES lump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapLump {
    /// Position and angle for all monster, powerup and spawn location
    Things = 1,
    /// An array of lines referencing two vertices (Two vertexes are connected
    /// by one `LineDef`). Also points to one or two `SideDef` depending on if
    /// this line is a wall or a portal
    LineDefs,
    /// Defines upper, lower, and middle textures. Also defines texture
    /// horizontal and vertical offsets. This is information for a `LineDef`
    SideDefs,
    /// An array of signed short X, Y pairs (`Vertex`). All coordinates in this
    /// map block are indexes into this array
    Vertexes,
    /// Portions of lines cut due to Binary Space Partitioning.
    /// Each `SubSectors`'s geometry is defined by the `Segs` which it contains
    Segs,
    /// Set of segments of a `LineDef` representing a convex subspace
    SubSectors,
    /// BSP with segs, nodes and sub-sector leaves
    Nodes,
    /// Area surrounded by lines, with set ceiling and floor textures/heights
    /// with light level
    Sectors,
}

impl MapLump {
    /// All roles in the order they follow the level marker
    pub const ORDER: [MapLump; 8] = [
        MapLump::Things,
        MapLump::LineDefs,
        MapLump::SideDefs,
        MapLump::Vertexes,
        MapLump::Segs,
        MapLump::SubSectors,
        MapLump::Nodes,
        MapLump::Sectors,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            MapLump::Things => "THINGS",
            MapLump::LineDefs => "LINEDEFS",
            MapLump::SideDefs => "SIDEDEFS",
            MapLump::Vertexes => "VERTEXES",
            MapLump::Segs => "SEGS",
            MapLump::SubSectors => "SSECTORS",
            MapLump::Nodes => "NODES",
            MapLump::Sectors => "SECTORS",
        }
    }
}

/// The positional role of each lump following a `GL_<level>` marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlLump {
    Vertexes = 1,
    Segs,
    SubSectors,
    Nodes,
}

impl GlLump {
    pub const ORDER: [GlLump; 4] = [
        GlLump::Vertexes,
        GlLump::Segs,
        GlLump::SubSectors,
        GlLump::Nodes,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            GlLump::Vertexes => "GL_VERT",
            GlLump::Segs => "GL_SEGS",
            GlLump::SubSectors => "GL_SSECT",
            GlLump::Nodes => "GL_NODES",
        }
    }
}

/// Prefix of the marker lump that starts a level's extended companion lumps
pub const GL_MARKER_PREFIX: &str = "GL_";

/// True if the lump name starts a level: `E<d>M<d>` or `MAP<d><d>`
pub fn is_level_marker(name: &str) -> bool {
    let b = name.as_bytes();
    let episodic = b.len() >= 4
        && b[0] == b'E'
        && b[1].is_ascii_digit()
        && b[2] == b'M'
        && b[3].is_ascii_digit();
    let commercial = b.len() >= 5
        && b.starts_with(b"MAP")
        && b[3].is_ascii_digit()
        && b[4].is_ascii_digit();
    episodic || commercial
}

/// If the lump name is a `GL_<level>` marker, the name of the level it extends
pub fn gl_marker_level(name: &str) -> Option<&str> {
    name.strip_prefix(GL_MARKER_PREFIX)
        .filter(|level| is_level_marker(level))
}

/// Will be either `IWAD` for game, or `PWAD` for patch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WadKind {
    /// Contains all of the game data for a complete game
    Iwad,
    /// Lumps of data created by a user as an add-on
    Pwad,
}

impl WadKind {
    pub fn from_magic(magic: &[u8; 4]) -> Option<Self> {
        match magic {
            b"IWAD" => Some(Self::Iwad),
            b"PWAD" => Some(Self::Pwad),
            _ => None,
        }
    }

    pub const fn magic(self) -> &'static [u8; 4] {
        match self {
            WadKind::Iwad => b"IWAD",
            WadKind::Pwad => b"PWAD",
        }
    }
}

/// Header which tells us the WAD type and where the data is
///
/// The header structure in the WAD is as follows:
///
/// | Field Size | Data Type    | Content                                              |
/// |------------|--------------|------------------------------------------------------|
/// | 0x00-0x03  | 4 ASCII char | *Must* be an ASCII string (either "IWAD" or "PWAD")  |
/// | 0x04-0x07  | signed int   | The number entries in the directory                  |
/// | 0x08-0x0b  | signed int   | Offset in bytes to the directory in the WAD file     |
struct WadHeader {
    kind: WadKind,
    /// The count of "lumps" of data
    dir_count: usize,
    /// Offset in bytes that the directory starts at
    dir_offset: usize,
}

impl WadHeader {
    fn parse(bytes: &[u8]) -> Result<Self, WadError> {
        if bytes.len() < HEADER_SIZE {
            return Err(WadError::TruncatedHeader { len: bytes.len() });
        }
        let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
        let kind = WadKind::from_magic(&magic).ok_or(WadError::BadMagic(magic))?;

        let count = read_i32(bytes, 4) as i64;
        let offset = read_i32(bytes, 8) as i64;
        if offset < HEADER_SIZE as i64 || offset > bytes.len() as i64 {
            return Err(WadError::BadDirectoryOffset {
                offset,
                len: bytes.len(),
            });
        }
        let dir_offset = offset as usize;
        let fits = usize::try_from(count)
            .ok()
            .and_then(|c| c.checked_mul(DIR_ENTRY_SIZE))
            .and_then(|n| n.checked_add(dir_offset))
            .is_some_and(|end| end <= bytes.len());
        if !fits {
            return Err(WadError::TruncatedDirectory {
                count,
                offset: dir_offset,
                len: bytes.len(),
            });
        }

        Ok(Self {
            kind,
            dir_count: count as usize,
            dir_offset,
        })
    }
}

/// Contains the details for a lump of data: where it starts, the size of it, and the name
///
/// The directory structure in the WAD is as follows:
///
/// | Field Size | Data Type    | Content                                                    |
/// |------------|--------------|------------------------------------------------------------|
/// | 0x00-0x03  | signed int   | Offset value to the start of the lump data in the WAD file |
/// | 0x04-0x07  | signed int   | The size of the lump in bytes                              |
/// | 0x08-0x0f  | 8 ASCII char | ASCII holding the name of the lump                         |
#[derive(Clone, PartialEq, Eq)]
pub struct Lump {
    /// Name for the lump data, NUL padding removed
    name: String,
    /// The offset in bytes where the lump data starts in the file
    position: usize,
    /// The size in bytes of the lump referenced
    size: usize,
    /// Where the bytes live in the data region. `None` for a zero-size lump
    range: Option<Range<usize>>,
}

impl fmt::Debug for Lump {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "\nLump {{\n  name: {},\n  size: {},\n  position: {},\n}}",
            &self.name, self.size, self.position
        )
    }
}

impl Lump {
    fn parse(entry: &[u8], data_len: usize) -> Result<Self, WadError> {
        let position = read_i32(entry, 0) as i64;
        let size = read_i32(entry, 4) as i64;
        let name = read_name(entry, 8);

        let out_of_bounds = || WadError::LumpOutOfBounds {
            name: name.clone(),
            position,
            size,
            data_len,
        };
        if size < 0 {
            return Err(out_of_bounds());
        }

        let range = if size == 0 {
            None
        } else {
            let start = position - HEADER_SIZE as i64;
            let end = start + size;
            if start < 0 || end > data_len as i64 {
                return Err(out_of_bounds());
            }
            Some(start as usize..end as usize)
        };

        Ok(Self {
            position: position.max(0) as usize,
            size: size as usize,
            range,
            name,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Offset of the lump data from the start of the file
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Byte range in to the data region, `None` for markers and other empty lumps
    pub fn range(&self) -> Option<Range<usize>> {
        self.range.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_none()
    }
}

/// "Where's All (the) Data": contains the lump data region of a WAD in
/// memory, plus an array of directories telling us where each data lump
/// starts
pub struct WadData {
    path: Option<PathBuf>,
    kind: WadKind,
    /// Everything between the header and the directory
    data: Vec<u8>,
    lumps: Vec<Lump>,
}

impl fmt::Debug for WadData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "\nWadData {{\n  path: {:?},\n  kind: {:?},\n  lumps: {:?},\n}}",
            self.path, self.kind, self.lumps
        )
    }
}

impl WadData {
    /// Read the whole file in one go and parse it
    pub fn new(path: &Path) -> Result<Self, WadError> {
        let bytes = fs::read(path).map_err(|source| WadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Read {} bytes from {:?}", bytes.len(), path);
        let mut wad = Self::from_bytes(bytes)?;
        wad.path = Some(path.to_path_buf());
        Ok(wad)
    }

    /// Parse an archive already in memory
    pub fn from_bytes(mut bytes: Vec<u8>) -> Result<Self, WadError> {
        let header = WadHeader::parse(&bytes)?;
        let data_len = header.dir_offset - HEADER_SIZE;

        let mut lumps = Vec::with_capacity(header.dir_count);
        for entry in bytes[header.dir_offset..]
            .chunks_exact(DIR_ENTRY_SIZE)
            .take(header.dir_count)
        {
            lumps.push(Lump::parse(entry, data_len)?);
        }
        debug!("{:?}: {} lumps in directory", header.kind, lumps.len());

        bytes.truncate(header.dir_offset);
        bytes.drain(..HEADER_SIZE);

        Ok(Self {
            path: None,
            kind: header.kind,
            data: bytes,
            lumps,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn kind(&self) -> WadKind {
        self.kind
    }

    pub fn lumps(&self) -> &[Lump] {
        &self.lumps
    }

    /// The bytes of a lump, empty for a zero-size lump
    pub fn lump_data(&self, lump: &Lump) -> &[u8] {
        lump.range
            .as_ref()
            .and_then(|r| self.data.get(r.clone()))
            .unwrap_or(&[])
    }

    /// Index of the last lump with this name. Later lumps override earlier
    /// ones, which is how patches replace data.
    pub fn find_lump_index(&self, name: &str) -> Option<usize> {
        self.lumps.iter().rposition(|l| l.name == name)
    }

    pub fn lump_exists(&self, name: &str) -> bool {
        self.find_lump_index(name).is_some()
    }

    /// Up to `count` lumps following the lump at `index`
    pub fn lumps_following(&self, index: usize, count: usize) -> &[Lump] {
        let start = (index + 1).min(self.lumps.len());
        let end = start.saturating_add(count).min(self.lumps.len());
        &self.lumps[start..end]
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::WadBuilder;
    use crate::error::WadError;
    use crate::wad::{WadData, WadKind, gl_marker_level, is_level_marker};

    fn three_lumps() -> Vec<u8> {
        WadBuilder::new(WadKind::Iwad)
            .marker("E1M1")
            .lump("THINGS", vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10])
            .lump("PLAYPAL", vec![0xAA; 3])
            .build()
    }

    #[test]
    fn read_header_and_dirs() {
        let wad = WadData::from_bytes(three_lumps()).unwrap();
        assert_eq!(wad.kind(), WadKind::Iwad);
        assert_eq!(wad.lumps().len(), 3);
        assert_eq!(wad.lumps()[0].name(), "E1M1");
        assert!(wad.lumps()[0].is_empty());
        assert_eq!(wad.lumps()[1].name(), "THINGS");
        assert_eq!(wad.lumps()[1].size(), 10);
        assert_eq!(wad.lumps()[1].position(), 12);
        assert_eq!(wad.lump_data(&wad.lumps()[1]), &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        assert_eq!(wad.lump_data(&wad.lumps()[2]), &[0xAA; 3]);
        assert_eq!(wad.lump_data(&wad.lumps()[0]), &[] as &[u8]);
    }

    #[test]
    fn find_e1m1() {
        let wad = WadData::from_bytes(three_lumps()).unwrap();
        let i = wad.find_lump_index("E1M1").unwrap();
        assert_eq!(wad.lumps()[i].name(), "E1M1");
        assert!(wad.lump_exists("PLAYPAL"));
        assert!(!wad.lump_exists("E1M2"));

        let following = wad.lumps_following(i, 8);
        assert_eq!(following.len(), 2);
        assert_eq!(following[0].name(), "THINGS");
    }

    #[test]
    fn bad_magic() {
        let mut bytes = three_lumps();
        bytes[0..4].copy_from_slice(b"ZWAD");
        assert!(matches!(
            WadData::from_bytes(bytes),
            Err(WadError::BadMagic(m)) if &m == b"ZWAD"
        ));
    }

    #[test]
    fn truncated_header() {
        let bytes = three_lumps()[..8].to_vec();
        assert!(matches!(
            WadData::from_bytes(bytes),
            Err(WadError::TruncatedHeader { len: 8 })
        ));
    }

    #[test]
    fn truncated_directory() {
        let mut bytes = three_lumps();
        bytes.truncate(bytes.len() - 4);
        assert!(matches!(
            WadData::from_bytes(bytes),
            Err(WadError::TruncatedDirectory { count: 3, .. })
        ));
    }

    #[test]
    fn directory_offset_past_end() {
        let mut bytes = three_lumps();
        let past = (bytes.len() as i32 + 1).to_le_bytes();
        bytes[8..12].copy_from_slice(&past);
        assert!(matches!(
            WadData::from_bytes(bytes),
            Err(WadError::BadDirectoryOffset { .. })
        ));
    }

    #[test]
    fn lump_outside_data_region() {
        let mut bytes = three_lumps();
        let dir = i32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
        // Second entry's size field
        let size_at = dir + 16 + 4;
        bytes[size_at..size_at + 4].copy_from_slice(&1000i32.to_le_bytes());
        assert!(matches!(
            WadData::from_bytes(bytes),
            Err(WadError::LumpOutOfBounds { ref name, size: 1000, .. }) if name == "THINGS"
        ));
    }

    #[test]
    fn level_marker_names() {
        assert!(is_level_marker("E1M1"));
        assert!(is_level_marker("E4M9"));
        assert!(is_level_marker("MAP01"));
        assert!(is_level_marker("MAP32"));
        assert!(!is_level_marker("MAP1"));
        assert!(!is_level_marker("THINGS"));
        assert!(!is_level_marker("GL_E1M1"));
        assert!(!is_level_marker("EXMY"));

        assert_eq!(gl_marker_level("GL_E1M1"), Some("E1M1"));
        assert_eq!(gl_marker_level("GL_MAP07"), Some("MAP07"));
        assert_eq!(gl_marker_level("GL_VERT"), None);
        assert_eq!(gl_marker_level("E1M1"), None);
    }
}
