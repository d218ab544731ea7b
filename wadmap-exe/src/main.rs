//! `wadmap` loads the levels from a base WAD, any patch WADs and their GL
//! node companions, then prints a summary of each level or locates a point
//! in one of them.

mod cli;
mod config;

use std::error::Error;
use std::path::{Path, PathBuf};

use glam::Vec2;
use level::{BspKind, Level, LevelStore};
use log::{LevelFilter, error, info, warn};
use simplelog::TermLogger;
use wad::{WadData, WadError};

use crate::cli::CLIOptions;
use crate::config::UserConfig;

const BASE_DIR: &str = "wadmap/";

fn main() -> Result<(), Box<dyn Error>> {
    let mut options: CLIOptions = argh::from_env();

    TermLogger::init(
        LevelFilter::Trace,
        simplelog::ConfigBuilder::default()
            .set_time_level(LevelFilter::Trace)
            .build(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;
    log::set_max_level(options.verbose.unwrap_or(LevelFilter::Warn));

    match UserConfig::load() {
        Ok(mut user_config) => {
            user_config.sync_cli(&mut options);
            if let Err(e) = user_config.write() {
                warn!("Could not write config: {e}");
            }
        }
        Err(e) => warn!("Could not load user config: {e}"),
    }
    log::set_max_level(options.verbose.unwrap_or(LevelFilter::Warn));

    if options.iwad.is_empty() {
        return Err("no IWAD given, pass --iwad or set it in the user config".into());
    }

    let mut store = LevelStore::new();
    let pwads: Vec<PathBuf> = options.pwad.iter().map(PathBuf::from).collect();
    load_archives(
        &mut store,
        Path::new(&options.iwad),
        &pwads,
        !options.no_gwa,
    )?;
    info!("Loaded {} levels", store.len());

    match &options.level {
        Some(name) => {
            let level = store
                .get(&name.to_ascii_uppercase())
                .ok_or_else(|| format!("no level named {name}"))?;
            query(level, Vec2::new(options.x, options.y), options.leaves);
        }
        None => {
            for level in store.iter() {
                print_summary(level);
            }
        }
    }
    Ok(())
}

/// Load the base WAD then each patch, each followed by its `.gwa` if there
/// is one. Only failing to read the base WAD is an error, a bad patch or
/// companion is logged and skipped.
fn load_archives(
    store: &mut LevelStore,
    iwad: &Path,
    pwads: &[PathBuf],
    load_gwa: bool,
) -> Result<(), WadError> {
    load_into(store, iwad)?;
    if load_gwa {
        load_companion(store, iwad);
    }
    for pwad in pwads {
        if let Err(e) = load_into(store, pwad) {
            error!("Skipping {pwad:?}: {e}");
            continue;
        }
        if load_gwa {
            load_companion(store, pwad);
        }
    }
    Ok(())
}

fn load_companion(store: &mut LevelStore, path: &Path) {
    let gwa = path.with_extension("gwa");
    if gwa.exists() {
        if let Err(e) = load_into(store, &gwa) {
            error!("Skipping {gwa:?}: {e}");
        }
    }
}

fn load_into(store: &mut LevelStore, path: &Path) -> Result<(), WadError> {
    let wad = WadData::new(path)?;
    info!("Loading {:?} ({:?})", path, wad.kind());
    let report = store.load_wad(&wad);
    for (name, e) in &report.skipped {
        error!("{name} from {path:?} not loaded: {e}");
    }
    Ok(())
}

fn print_summary(level: &Level) {
    let extents = level.extents();
    println!(
        "{:<6} {:>5} things {:>5} walls {:>4} sectors {:>6.0} x {:<6.0} GL nodes: {}",
        level.name(),
        level.things().len(),
        level.walls().len(),
        level.sectors().len(),
        extents.width,
        extents.height,
        if level.has_extended() { "yes" } else { "no" },
    );
}

fn query(level: &Level, point: Vec2, leaves: bool) {
    let preferred = level.preferred_kind();
    let fallback = match preferred {
        BspKind::Extended => BspKind::Base,
        BspKind::Base => BspKind::Extended,
    };
    for kind in [preferred, fallback] {
        let tree = match level.tree(kind) {
            Ok(tree) => tree,
            Err(e) => {
                println!("{kind:?}: {e}");
                continue;
            }
        };
        match level.locate(kind, point) {
            Ok(subsector) => match level.sector_of(kind, subsector) {
                Ok(sector) => println!(
                    "{kind:?}: ({}, {}) is in subsector {subsector}, sector {sector}",
                    point.x, point.y
                ),
                Err(e) => println!("{kind:?}: subsector {subsector}, {e}"),
            },
            Err(e) => println!("{kind:?}: {e}"),
        }
        if leaves {
            let mut count = 0;
            tree.for_each_leaf(|_| count += 1);
            println!("{kind:?}: {count} leaves, {} nodes", tree.nodes().len());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use level::LevelStore;
    use wad::{MapLump, WadBuilder, WadKind};

    use super::load_archives;

    /// A level marker followed by eight empty lumps, which loads as a level
    /// with no geometry
    fn empty_level(kind: WadKind, name: &str) -> Vec<u8> {
        MapLump::ORDER
            .iter()
            .fold(WadBuilder::new(kind).marker(name), |b, l| {
                b.lump(l.name(), Vec::new())
            })
            .build()
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("wadmap-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn bad_patches_and_companions_are_skipped() {
        let dir = scratch_dir("skip");
        let iwad = dir.join("base.wad");
        fs::write(&iwad, empty_level(WadKind::Iwad, "E1M1")).unwrap();
        // Truncated companion beside the base
        fs::write(dir.join("base.gwa"), b"PWAD\x01\0\0\0").unwrap();
        let bad_magic = dir.join("bad.wad");
        fs::write(&bad_magic, b"ZWAD\0\0\0\0\x0c\0\0\0").unwrap();
        let patch = dir.join("patch.wad");
        fs::write(&patch, empty_level(WadKind::Pwad, "E1M2")).unwrap();

        let pwads = [dir.join("missing.wad"), bad_magic, patch];
        let mut store = LevelStore::new();
        load_archives(&mut store, &iwad, &pwads, true).unwrap();
        assert_eq!(store.names().collect::<Vec<_>>(), ["E1M1", "E1M2"]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn unreadable_base_is_fatal() {
        let dir = scratch_dir("base");
        let patch = dir.join("patch.wad");
        fs::write(&patch, empty_level(WadKind::Pwad, "MAP01")).unwrap();

        let mut store = LevelStore::new();
        assert!(load_archives(&mut store, &dir.join("missing.wad"), &[patch], true).is_err());
        assert!(store.is_empty());

        fs::remove_dir_all(&dir).unwrap();
    }
}
