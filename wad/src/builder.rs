//! Assemble a WAD in memory. Used to write small patch archives and to build
//! synthetic levels for tests and benchmarks.

use crate::wad::{DIR_ENTRY_SIZE, HEADER_SIZE, WadKind};

#[derive(Debug, Clone)]
pub struct WadBuilder {
    kind: WadKind,
    lumps: Vec<([u8; 8], Vec<u8>)>,
}

impl WadBuilder {
    pub fn new(kind: WadKind) -> Self {
        Self {
            kind,
            lumps: Vec::new(),
        }
    }

    /// Append a lump. Names longer than 8 bytes are truncated.
    pub fn lump(mut self, name: &str, data: Vec<u8>) -> Self {
        let mut padded = [0u8; 8];
        let n = name.len().min(8);
        padded[..n].copy_from_slice(&name.as_bytes()[..n]);
        self.lumps.push((padded, data));
        self
    }

    /// Append a zero-size lump, such as a level marker
    pub fn marker(self, name: &str) -> Self {
        self.lump(name, Vec::new())
    }

    pub fn build(self) -> Vec<u8> {
        let data_len: usize = self.lumps.iter().map(|(_, d)| d.len()).sum();
        let dir_offset = HEADER_SIZE + data_len;

        let mut out = Vec::with_capacity(dir_offset + self.lumps.len() * DIR_ENTRY_SIZE);
        out.extend_from_slice(self.kind.magic());
        out.extend_from_slice(&(self.lumps.len() as i32).to_le_bytes());
        out.extend_from_slice(&(dir_offset as i32).to_le_bytes());

        let mut directory = Vec::with_capacity(self.lumps.len() * DIR_ENTRY_SIZE);
        for (name, data) in &self.lumps {
            let position = if data.is_empty() { 0 } else { out.len() };
            directory.extend_from_slice(&(position as i32).to_le_bytes());
            directory.extend_from_slice(&(data.len() as i32).to_le_bytes());
            directory.extend_from_slice(name);
            out.extend_from_slice(data);
        }
        out.extend_from_slice(&directory);
        out
    }
}
