use glam::Vec2;
use wad::extended::GlVertex;
use wad::lumps::{VertexRef, WadVertex};

use crate::error::LevelError;

/// The two vertex arrays of a level. `base` comes from VERTEXES, `extended`
/// from GL_VERT and stays empty until extended data is merged.
#[derive(Debug, Default, Clone)]
pub struct VertexPool {
    base: Vec<Vec2>,
    extended: Vec<Vec2>,
}

impl VertexPool {
    pub fn new(base: &[WadVertex]) -> Self {
        Self {
            base: base
                .iter()
                .map(|v| Vec2::new(v.x as f32, v.y as f32))
                .collect(),
            extended: Vec::new(),
        }
    }

    pub fn with_extended(mut self, extended: &[GlVertex]) -> Self {
        self.extended = extended
            .iter()
            .map(|v| Vec2::new(v.x_f32(), v.y_f32()))
            .collect();
        self
    }

    pub fn base(&self) -> &[Vec2] {
        &self.base
    }

    pub fn extended(&self) -> &[Vec2] {
        &self.extended
    }

    pub fn resolve(&self, reference: VertexRef) -> Result<Vec2, LevelError> {
        let (pool, index) = match reference {
            VertexRef::Base(i) => (&self.base, i),
            VertexRef::Extended(i) => (&self.extended, i),
        };
        pool.get(index as usize)
            .copied()
            .ok_or(LevelError::VertexOutOfRange {
                reference,
                len: pool.len(),
            })
    }

    /// Resolve a raw extended-format reference, bit 31 selecting the pool
    pub fn resolve_raw(&self, raw: u32) -> Result<Vec2, LevelError> {
        self.resolve(VertexRef::from_raw(raw))
    }
}
