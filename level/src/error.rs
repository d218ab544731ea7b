use thiserror::Error;
use wad::WadError;
use wad::lumps::{NodeChild, VertexRef};

/// Failures while assembling a level. Any of these aborts the one level being
/// built; the archive and other levels in it are unaffected.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("{level}: could not decode {lump}: {source}")]
    Decode {
        level: String,
        lump: String,
        #[source]
        source: WadError,
    },
    #[error("{level}: expected {expected} lumps after the marker, found {found}")]
    MissingLumps {
        level: String,
        expected: usize,
        found: usize,
    },
    #[error("{level}: expected lump {expected}, found {found}")]
    UnexpectedLump {
        level: String,
        expected: &'static str,
        found: String,
    },
    #[error("vertex {reference:?} is outside of a pool of {len}")]
    VertexOutOfRange { reference: VertexRef, len: usize },
    #[error("linedef {linedef} references sidedef {sidedef}, only {len} exist")]
    SideDefOutOfRange {
        linedef: usize,
        sidedef: usize,
        len: usize,
    },
    #[error("sidedef {sidedef} references sector {sector}, only {len} exist")]
    SectorOutOfRange {
        sidedef: usize,
        sector: usize,
        len: usize,
    },
    #[error("segment {segment} references linedef {linedef}, only {len} exist")]
    LineDefOutOfRange {
        segment: usize,
        linedef: usize,
        len: usize,
    },
    #[error("segment {segment} has partner {partner}, only {len} exist")]
    PartnerOutOfRange {
        segment: usize,
        partner: usize,
        len: usize,
    },
    #[error("segment {segment} has direction {direction}, expected 0 or 1")]
    InvalidSegDirection { segment: usize, direction: i16 },
    #[error("subsector {subsector} segments {start}..{start}+{count} exceed {len} segments")]
    SegmentSliceOutOfRange {
        subsector: usize,
        start: usize,
        count: usize,
        len: usize,
    },
    #[error("subsector {subsector} has no segments")]
    EmptySubSector { subsector: usize },
    #[error("subsectors {first} and {second} share segments")]
    OverlappingSubSectors { first: usize, second: usize },
    #[error("node {node} child {child:?} is outside of {len}")]
    NodeChildOutOfRange {
        node: usize,
        child: NodeChild,
        len: usize,
    },
    #[error("{level}: extended BSP data was already merged")]
    ExtendedAlreadyMerged { level: String },
    #[error("{level}: extended lumps without a base level")]
    NoBaseLevel { level: String },
}

/// Failures answering a query against a loaded level
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BspError {
    #[error("level has no extended BSP")]
    NoExtendedBsp,
    #[error("BSP has no nodes and more or less than one subsector")]
    EmptyTree,
    #[error("no leaf reached within {depth} nodes")]
    Malformed { depth: usize },
    #[error("subsector {subsector} is outside of {len}")]
    SubSectorOutOfRange { subsector: usize, len: usize },
    #[error("subsector {subsector} has no segment with a linedef")]
    AmbiguousSector { subsector: usize },
    #[error("linedef {linedef} is outside of {len}")]
    LineDefOutOfRange { linedef: usize, len: usize },
    #[error("linedef {linedef} has no side for a segment running along it")]
    MissingSide { linedef: usize },
    #[error("no leaf bounding box contains ({x}, {y})")]
    NotInAnyLeaf { x: f32, y: f32 },
}
