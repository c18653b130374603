use std::path::PathBuf;

use icy_icon::{IconError, IconFormat, IconLayer};
use pretty_assertions::assert_eq;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("icy_icon_{}_{name}", std::process::id()))
}

fn create_layer(scale: u32, compressed: bool) -> IconLayer {
    let mut data = Vec::with_capacity((scale * scale * 4) as usize);
    for i in 0..scale * scale {
        data.extend([(i % 256) as u8, 0x80, 0x20, 0xFF]);
    }
    IconLayer::new(scale, compressed, data).unwrap()
}

#[test]
fn save_and_load_ico_file() {
    let path = temp_path("roundtrip.ico");
    let layers = vec![create_layer(16, false), create_layer(32, false), create_layer(256, true)];

    IconFormat::Ico.save(&layers, &path).unwrap();
    let loaded = IconFormat::Ico.load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded.len(), layers.len());
    for (loaded, original) in loaded.iter().zip(&layers) {
        assert_eq!(loaded.scale(), original.scale());
        assert_eq!(loaded.data(), original.data());
    }
}

#[test]
fn save_and_load_icns_file() {
    let path = temp_path("roundtrip.icns");
    let layers = vec![create_layer(16, false), create_layer(512, false)];

    IconFormat::Icns.save(&layers, &path).unwrap();
    let loaded = IconFormat::Icns.load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded.len(), layers.len());
    for (loaded, original) in loaded.iter().zip(&layers) {
        assert_eq!(loaded.scale(), original.scale());
        assert_eq!(loaded.data(), original.data());
    }
}

#[test]
fn save_truncates_previous_file() {
    let path = temp_path("truncate.ico");

    let big = vec![create_layer(16, false), create_layer(32, false), create_layer(256, false)];
    IconFormat::Ico.save(&big, &path).unwrap();
    let big_len = std::fs::metadata(&path).unwrap().len();

    let small = vec![create_layer(16, false)];
    IconFormat::Ico.save(&small, &path).unwrap();
    let small_len = std::fs::metadata(&path).unwrap().len();
    let expected = IconFormat::Ico.to_bytes(&small).unwrap().len() as u64;
    std::fs::remove_file(&path).unwrap();

    assert!(small_len < big_len);
    assert_eq!(small_len, expected);
}

#[test]
fn save_reports_unwritable_destination() {
    let path = temp_path("no_such_directory").join("icon.ico");
    let err = IconFormat::Ico.save(&[create_layer(16, false)], &path).unwrap_err();
    assert!(matches!(err, IconError::DestinationUnwritable { .. }));
}

#[test]
fn failed_export_writes_nothing() {
    let path = temp_path("never_written.icns");
    // 48px has no icns element type, the export must abort before the file exists
    let err = IconFormat::Icns.save(&[create_layer(48, false)], &path).unwrap_err();
    assert!(matches!(err, IconError::UnknownIcnsScale { scale: 48, .. }));
    assert!(!path.exists());
}
