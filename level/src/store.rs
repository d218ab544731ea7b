use std::collections::BTreeMap;

use log::{error, info, warn};
use wad::{GlLump, MapLump, WadData, gl_marker_level, is_level_marker};

use crate::error::LevelError;
use crate::level::Level;

/// What happened to each level marker seen by `LevelStore::load_wad`
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<String>,
    pub merged: Vec<String>,
    pub skipped: Vec<(String, LevelError)>,
}

/// All levels loaded so far, by name. Archives are loaded in order, so a
/// patch replaces a level of the same name and a `.gwa` adds extended data
/// to levels already loaded.
#[derive(Debug, Default)]
pub struct LevelStore {
    levels: BTreeMap<String, Level>,
}

impl LevelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every level in the archive. A level that fails is logged and
    /// recorded in the report, the rest of the archive is still loaded.
    pub fn load_wad(&mut self, wad: &WadData) -> LoadReport {
        let mut report = LoadReport::default();
        for (i, lump) in wad.lumps().iter().enumerate() {
            let name = lump.name();
            if let Some(level) = gl_marker_level(name) {
                let lumps = wad.lumps_following(i, GlLump::ORDER.len());
                let result = match self.levels.get_mut(level) {
                    Some(existing) => existing.merge_extended(wad, lumps),
                    None => Err(LevelError::NoBaseLevel {
                        level: level.to_owned(),
                    }),
                };
                match result {
                    Ok(()) => {
                        info!("{}: Merged extended BSP", level);
                        report.merged.push(level.to_owned());
                    }
                    Err(e) => {
                        warn!("{}: Skipped extended BSP: {}", level, e);
                        report.skipped.push((name.to_owned(), e));
                    }
                }
            } else if is_level_marker(name) {
                let lumps = wad.lumps_following(i, MapLump::ORDER.len());
                match Level::from_lumps(name, wad, lumps) {
                    Ok(level) => {
                        if self.levels.insert(name.to_owned(), level).is_some() {
                            info!("{}: Replaced by a later archive", name);
                        }
                        report.loaded.push(name.to_owned());
                    }
                    Err(e) => {
                        error!("{}: Skipped level: {}", name, e);
                        report.skipped.push((name.to_owned(), e));
                    }
                }
            }
        }
        report
    }

    pub fn get(&self, name: &str) -> Option<&Level> {
        self.levels.get(name)
    }

    /// Level names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.levels.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Level> {
        self.levels.values()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
