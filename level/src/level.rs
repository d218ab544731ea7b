use glam::Vec2;
use log::{debug, info};
use wad::extended::{decode_gl_nodes, decode_gl_segments, decode_gl_subsectors, decode_gl_vertexes};
use wad::lumps::{
    WadThing, decode_linedefs, decode_nodes, decode_sectors, decode_segments, decode_sidedefs,
    decode_subsectors, decode_things, decode_vertexes,
};
use wad::{GlLump, Lump, MapLump, WadData, WadError};

use crate::bsp::{BspKind, BspTree, Node};
use crate::error::{BspError, LevelError};
use crate::map_defs::{LineDef, Sector, SideDef};
use crate::segments::{Segment, Side, assemble_subsectors};
use crate::vertex_pool::VertexPool;
use crate::wall::Wall;

/// The smallest vector and the largest vertex, combined make up a
/// rectangle enclosing the level area
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Extents {
    pub min_vertex: Vec2,
    pub max_vertex: Vec2,
    pub width: f32,
    pub height: f32,
    pub min_floor: f32,
    pub max_ceiling: f32,
}

/// Everything decoded and derived for one level. Built once from the lumps
/// after a level marker, after which the only change allowed is the one-time
/// merge of the extended BSP.
#[derive(Debug, Clone)]
pub struct Level {
    name: String,
    things: Vec<WadThing>,
    vertexes: VertexPool,
    linedefs: Vec<LineDef>,
    sidedefs: Vec<SideDef>,
    sectors: Vec<Sector>,
    walls: Vec<Wall>,
    extents: Extents,
    base_bsp: BspTree,
    extended_bsp: Option<BspTree>,
}

/// Check the lumps following a marker are the expected ones, in order
fn expect_lumps<'a>(
    level: &str,
    lumps: &'a [Lump],
    names: &[&'static str],
) -> Result<&'a [Lump], LevelError> {
    if lumps.len() < names.len() {
        return Err(LevelError::MissingLumps {
            level: level.to_owned(),
            expected: names.len(),
            found: lumps.len(),
        });
    }
    for (lump, expected) in lumps.iter().zip(names) {
        if lump.name() != *expected {
            return Err(LevelError::UnexpectedLump {
                level: level.to_owned(),
                expected: *expected,
                found: lump.name().to_owned(),
            });
        }
    }
    Ok(&lumps[..names.len()])
}

/// Run a decoder over a lump, naming the level and lump on failure
fn decode<T>(
    level: &str,
    wad: &WadData,
    lump: &Lump,
    decoder: fn(&[u8]) -> Result<Vec<T>, WadError>,
) -> Result<Vec<T>, LevelError> {
    decoder(wad.lump_data(lump)).map_err(|source| LevelError::Decode {
        level: level.to_owned(),
        lump: lump.name().to_owned(),
        source,
    })
}

impl Level {
    /// Build a level from the lumps following its marker: THINGS, LINEDEFS,
    /// SIDEDEFS, VERTEXES, SEGS, SSECTORS, NODES, SECTORS. Anything after
    /// those eight is ignored.
    pub fn from_lumps(name: &str, wad: &WadData, lumps: &[Lump]) -> Result<Self, LevelError> {
        let names = MapLump::ORDER.map(|l| l.name());
        let lumps = expect_lumps(name, lumps, &names)?;
        let lump = |role: MapLump| &lumps[role as usize - 1];

        let things = decode(name, wad, lump(MapLump::Things), decode_things)?;
        info!("{}: Loaded {} things", name, things.len());
        let wad_linedefs = decode(name, wad, lump(MapLump::LineDefs), decode_linedefs)?;
        let wad_sidedefs = decode(name, wad, lump(MapLump::SideDefs), decode_sidedefs)?;
        let wad_vertexes = decode(name, wad, lump(MapLump::Vertexes), decode_vertexes)?;
        let wad_segments = decode(name, wad, lump(MapLump::Segs), decode_segments)?;
        let wad_subsectors = decode(name, wad, lump(MapLump::SubSectors), decode_subsectors)?;
        let wad_nodes = decode(name, wad, lump(MapLump::Nodes), decode_nodes)?;
        let wad_sectors = decode(name, wad, lump(MapLump::Sectors), decode_sectors)?;

        let vertexes = VertexPool::new(&wad_vertexes);
        info!("{}: Loaded {} vertexes", name, vertexes.base().len());

        let sectors: Vec<Sector> = wad_sectors.iter().map(Sector::from).collect();
        info!("{}: Loaded {} sectors", name, sectors.len());

        let sidedefs = wad_sidedefs
            .iter()
            .enumerate()
            .map(|(i, s)| SideDef::new(i, s, sectors.len()))
            .collect::<Result<Vec<_>, _>>()?;
        info!("{}: Loaded {} sidedefs", name, sidedefs.len());

        let linedefs = wad_linedefs
            .iter()
            .enumerate()
            .map(|(i, l)| LineDef::new(i, l, &vertexes, sidedefs.len()))
            .collect::<Result<Vec<_>, _>>()?;
        info!("{}: Loaded {} linedefs", name, linedefs.len());

        let segments = wad_segments
            .iter()
            .enumerate()
            .map(|(i, s)| Segment::from_classic(i, s, &vertexes, linedefs.len()))
            .collect::<Result<Vec<_>, _>>()?;
        info!("{}: Loaded {} segments", name, segments.len());

        let subsectors = assemble_subsectors(name, &wad_subsectors, segments.len())?;
        info!("{}: Loaded {} subsectors", name, subsectors.len());

        let nodes: Vec<Node> = wad_nodes.iter().map(Node::from).collect();
        info!("{}: Loaded {} bsp nodes", name, nodes.len());
        let base_bsp = BspTree::new(name, nodes, subsectors, segments)?;

        let walls = linedefs
            .iter()
            .enumerate()
            .map(|(i, l)| Wall::new(i, l, &vertexes, &sidedefs, &sectors))
            .collect::<Result<Vec<_>, _>>()?;
        debug!("{}: Built {} walls", name, walls.len());

        let mut level = Self {
            name: name.to_owned(),
            things,
            vertexes,
            linedefs,
            sidedefs,
            sectors,
            walls,
            extents: Extents::default(),
            base_bsp,
            extended_bsp: None,
        };
        level.set_extents();
        Ok(level)
    }

    /// Merge the GL_VERT, GL_SEGS, GL_SSECT and GL_NODES lumps following a
    /// `GL_<level>` marker. On error the level is left as it was.
    pub fn merge_extended(&mut self, wad: &WadData, lumps: &[Lump]) -> Result<(), LevelError> {
        let name = self.name.as_str();
        if self.extended_bsp.is_some() {
            return Err(LevelError::ExtendedAlreadyMerged {
                level: name.to_owned(),
            });
        }
        let names = GlLump::ORDER.map(|l| l.name());
        let lumps = expect_lumps(name, lumps, &names)?;
        let lump = |role: GlLump| &lumps[role as usize - 1];

        let gl_vertexes = decode(name, wad, lump(GlLump::Vertexes), decode_gl_vertexes)?;
        let gl_segments = decode(name, wad, lump(GlLump::Segs), decode_gl_segments)?;
        let gl_subsectors = decode(name, wad, lump(GlLump::SubSectors), decode_gl_subsectors)?;
        let gl_nodes = decode(name, wad, lump(GlLump::Nodes), decode_gl_nodes)?;

        let vertexes = self.vertexes.clone().with_extended(&gl_vertexes);
        info!("{}: Loaded {} GL vertexes", name, gl_vertexes.len());

        let segments = gl_segments
            .iter()
            .enumerate()
            .map(|(i, s)| {
                Segment::from_extended(i, s, &vertexes, self.linedefs.len(), gl_segments.len())
            })
            .collect::<Result<Vec<_>, _>>()?;
        info!("{}: Loaded {} GL segments", name, segments.len());

        let subsectors = assemble_subsectors(name, &gl_subsectors, segments.len())?;
        info!("{}: Loaded {} GL subsectors", name, subsectors.len());

        let nodes: Vec<Node> = gl_nodes.iter().map(Node::from).collect();
        info!("{}: Loaded {} GL nodes", name, nodes.len());
        let tree = BspTree::new(name, nodes, subsectors, segments)?;

        self.vertexes = vertexes;
        self.extended_bsp = Some(tree);
        Ok(())
    }

    fn set_extents(&mut self) {
        let mut extents = Extents::default();
        let mut points = self.walls.iter().flat_map(|w| [w.start, w.end]);
        if let Some(first) = points.next() {
            let (min, max) = points.fold((first, first), |(min, max), v| (min.min(v), max.max(v)));
            extents.min_vertex = min;
            extents.max_vertex = max;
            extents.width = max.x - min.x;
            extents.height = max.y - min.y;
        }
        if let Some(first) = self.sectors.first() {
            extents.min_floor = self
                .sectors
                .iter()
                .fold(first.floor_height, |m, s| m.min(s.floor_height));
            extents.max_ceiling = self
                .sectors
                .iter()
                .fold(first.ceil_height, |m, s| m.max(s.ceil_height));
        }
        self.extents = extents;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn things(&self) -> &[WadThing] {
        &self.things
    }

    pub fn vertexes(&self) -> &VertexPool {
        &self.vertexes
    }

    pub fn linedefs(&self) -> &[LineDef] {
        &self.linedefs
    }

    pub fn sidedefs(&self) -> &[SideDef] {
        &self.sidedefs
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn extents(&self) -> &Extents {
        &self.extents
    }

    pub fn has_extended(&self) -> bool {
        self.extended_bsp.is_some()
    }

    /// The tree to query when the caller has no preference: the extended one
    /// once merged, as its subsectors are closed
    pub fn preferred_kind(&self) -> BspKind {
        if self.has_extended() {
            BspKind::Extended
        } else {
            BspKind::Base
        }
    }

    pub fn tree(&self, kind: BspKind) -> Result<&BspTree, BspError> {
        match kind {
            BspKind::Base => Ok(&self.base_bsp),
            BspKind::Extended => self.extended_bsp.as_ref().ok_or(BspError::NoExtendedBsp),
        }
    }

    /// The subsector of the chosen tree containing `point`
    pub fn locate(&self, kind: BspKind, point: Vec2) -> Result<usize, BspError> {
        self.tree(kind)?.locate(point)
    }

    /// The sector containing `point`
    pub fn locate_sector(&self, kind: BspKind, point: Vec2) -> Result<usize, BspError> {
        let subsector = self.locate(kind, point)?;
        self.sector_of(kind, subsector)
    }

    /// The sector a subsector lies in, found through the first of its
    /// segments that runs along a linedef. Partition-only segments are
    /// skipped.
    pub fn sector_of(&self, kind: BspKind, subsector: usize) -> Result<usize, BspError> {
        let tree = self.tree(kind)?;
        for seg in tree.subsector_segments(subsector)? {
            let Some(linedef) = seg.linedef else {
                continue;
            };
            let line = self
                .linedefs
                .get(linedef)
                .ok_or(BspError::LineDefOutOfRange {
                    linedef,
                    len: self.linedefs.len(),
                })?;
            let side = match seg.side {
                Side::Right => Some(line.right_sidedef),
                Side::Left => line.left_sidedef,
            };
            return side
                .and_then(|s| self.sidedefs.get(s))
                .map(|s| s.sector)
                .ok_or(BspError::MissingSide { linedef });
        }
        Err(BspError::AmbiguousSector { subsector })
    }

    /// The side of `linedef` facing away from `segment`, `None` for the
    /// back of a one-sided line
    pub fn other_side(&self, linedef: usize, segment: &Segment) -> Option<&SideDef> {
        let line = self.linedefs.get(linedef)?;
        let side = match segment.side {
            Side::Right => line.left_sidedef?,
            Side::Left => line.right_sidedef,
        };
        self.sidedefs.get(side)
    }

    /// Scan every leaf box containing `point` and keep the one whose sector
    /// has the highest floor. Use `locate` unless the tree is known to have
    /// overlapping leaves.
    pub fn locate_highest_floor(&self, kind: BspKind, point: Vec2) -> Result<usize, BspError> {
        let tree = self.tree(kind)?;
        let mut best: Option<(usize, f32)> = None;
        for leaf in tree.leaves() {
            if !leaf.bbox.is_none_or(|b| b.contains(point)) {
                continue;
            }
            let floor = match self
                .sector_of(kind, leaf.subsector)
                .map(|s| self.sectors.get(s).map(|s| s.floor_height))
            {
                Ok(Some(floor)) => floor,
                _ => {
                    debug!(
                        "{}: no sector for subsector {}",
                        self.name, leaf.subsector
                    );
                    continue;
                }
            };
            if best.is_none_or(|(_, f)| floor > f) {
                best = Some((leaf.subsector, floor));
            }
        }
        best.map(|(s, _)| s).ok_or(BspError::NotInAnyLeaf {
            x: point.x,
            y: point.y,
        })
    }
}
