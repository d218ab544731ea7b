//! This crate contains the structures and tools for reading WAD archives and
//! decoding the level lumps inside them in to typed records, both the classic
//! layouts and the extended "GL" companion layouts.
//!
//! The structure of a WAD is this:
//!
//! ```text,ignore
//!                        <───── 32 bits ──────>
//!                        ┌────────────────────┐
//!             ┌──── 0x00 |  ASCII WAD Type    | 0x03
//!             |          | ────────────────── |
//!     Header ─┤     0x04 | # of directories   | 0x07
//!             |          | ────────────────── |
//!             └──── 0x08 | offset to listing ───0x0B ──┐
//!             ┌───────── | ────────────────── |        |
//!             |     0x0C | ┌────────────────┐ |        |
//!             |          | |   Lump Bytes   |<─────┐   |
//!     Lumps ──┤          | |       .        | |    |   |
//!             |          | └────────────────┘ |    |   |
//!             |          |         .          |    |   |
//!             └───────── |         .          |    |   |
//!             ┌───────── | ┌────────────────┐<─────────┘
//!             |          | |   Lump Offset  |──────┘
//!             |          | |----------------| |
//!  Directory ─┤          | |   Lump Size    | |
//!     List    |          | |----------------| |
//!             |          | |   Lump Name    | |
//!             |          | └────────────────┘ |
//!             |          |         .          |
//!             |          |         .          |
//!             |          |         .          |
//!             └───────── └────────────────────┘
//! ```
//!
//! Decoders never cross-reference records; an index stored in a record is
//! passed through as-is (or as a tagged reference where the format steals a
//! high bit) and validated later by whoever assembles a level from them.

/// Bring only the WAD structs down to root level
pub use crate::wad::*;

pub use crate::builder::WadBuilder;
pub use crate::error::WadError;

/// The WAD structure and parser
pub mod wad;

/// A Lump is a chunk of data that starts at an offset in the WAD, and ends
/// at a location that is `sizeof<record-in-lump> * num-of-entries`
///
/// The lump module contains the required structures that the lump records
/// need to be parsed in to, and the decoders for the classic level lumps.
pub mod lumps;

/// The companion "GL" lumps: higher precision vertexes, and segments, subsectors
/// and nodes built to make the BSP leaf-complete.
pub mod extended;

pub mod builder;
pub mod error;
pub mod iterators;
