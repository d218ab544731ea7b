use glam::Vec2;
use wad::WadKind;

use crate::bsp::BspKind;
use crate::error::LevelError;
use crate::store::LevelStore;
use crate::tests::fixtures::{Lumps, wad};

#[test]
fn load_levels_and_companions() {
    let archive = wad(
        WadKind::Iwad,
        vec![
            Lumps::room("E1M1", "CEIL3_5"),
            Lumps::room_gl("E1M1"),
            Lumps::room("E1M2", "F_SKY1"),
        ],
    );
    let mut store = LevelStore::new();
    let report = store.load_wad(&archive);

    assert_eq!(report.loaded, ["E1M1", "E1M2"]);
    assert_eq!(report.merged, ["E1M1"]);
    assert!(report.skipped.is_empty());
    assert_eq!(store.len(), 2);
    assert!(store.get("E1M1").unwrap().has_extended());
    assert!(!store.get("E1M2").unwrap().has_extended());
    assert!(store.get("E1M3").is_none());
}

#[test]
fn failing_level_is_skipped() {
    let archive = wad(
        WadKind::Pwad,
        vec![
            Lumps::room("MAP02", "CEIL3_5").set("NODES", vec![0; 27]),
            Lumps::room("MAP01", "CEIL3_5"),
            Lumps::room_gl("MAP03"),
        ],
    );
    let mut store = LevelStore::new();
    let report = store.load_wad(&archive);

    assert_eq!(report.loaded, ["MAP01"]);
    assert!(report.merged.is_empty());
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(report.skipped[0].0, "MAP02");
    assert!(matches!(
        &report.skipped[0].1,
        LevelError::Decode { lump, .. } if lump == "NODES"
    ));
    assert_eq!(report.skipped[1].0, "GL_MAP03");
    assert!(matches!(
        &report.skipped[1].1,
        LevelError::NoBaseLevel { level } if level == "MAP03"
    ));
    assert_eq!(store.names().collect::<Vec<_>>(), ["MAP01"]);
}

#[test]
fn companion_archive_and_patches() {
    let iwad = wad(WadKind::Iwad, vec![Lumps::room("E1M1", "CEIL3_5")]);
    let gwa = wad(WadKind::Pwad, vec![Lumps::room_gl("E1M1")]);
    let pwad = wad(
        WadKind::Pwad,
        vec![Lumps::room("E1M1", "F_SKY1"), Lumps::room("E1M9", "CEIL3_5")],
    );

    let mut store = LevelStore::new();
    store.load_wad(&iwad);
    let report = store.load_wad(&gwa);
    assert_eq!(report.merged, ["E1M1"]);
    let level = store.get("E1M1").unwrap();
    assert_eq!(level.locate(BspKind::Extended, Vec2::new(100.0, 20.0)), Ok(0));
    assert!(!level.walls()[0].sky);

    // Loading the companion twice is refused and leaves the level as is
    let report = store.load_wad(&gwa);
    assert!(matches!(
        report.skipped[0].1,
        LevelError::ExtendedAlreadyMerged { .. }
    ));
    assert!(store.get("E1M1").unwrap().has_extended());

    // The patch replaces E1M1 entirely, including its extended tree
    store.load_wad(&pwad);
    let level = store.get("E1M1").unwrap();
    assert!(level.walls()[0].sky);
    assert!(!level.has_extended());

    assert_eq!(store.names().collect::<Vec<_>>(), ["E1M1", "E1M9"]);
    assert_eq!(store.iter().count(), 2);
    assert!(!store.is_empty());
}
