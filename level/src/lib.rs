//! A level built from the lumps of a WAD: the vertex pools, walls and sectors,
//! and the BSP trees used to find which subsector a point lies in or to visit
//! every subsector once.
//!
//! A level always has the base tree from NODES, SSECTORS and SEGS. If the GL
//! companion lumps are merged it also has the extended tree, whose subsectors
//! are closed polygons and whose segments can reference the GL vertex pool.

pub mod bsp;
pub mod error;
pub mod level;
pub mod map_defs;
pub mod segments;
pub mod store;
pub mod vertex_pool;
pub mod wall;

pub use crate::bsp::{BspKind, BspTree, Leaf, Node};
pub use crate::error::{BspError, LevelError};
pub use crate::level::{Extents, Level};
pub use crate::map_defs::{BBox, LineDef, Sector, SideDef};
pub use crate::segments::{Segment, Side, SubSector};
pub use crate::store::{LevelStore, LoadReport};
pub use crate::vertex_pool::VertexPool;
pub use crate::wall::Wall;

#[cfg(test)]
mod tests;
