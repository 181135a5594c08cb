mod common;

use std::fs;

use hexmap_core::{decode_snapshot, encode_snapshot, snapshot_digest, SnapshotError};

#[test]
fn snapshot_file_restores_the_map() -> anyhow::Result<()> {
    let (grid, _, _) = common::generated_map(40, 30);

    let path = std::env::temp_dir().join(format!("hexmap_snapshot_{}.bin", std::process::id()));
    fs::write(&path, encode_snapshot(&grid))?;
    let bytes = fs::read(&path)?;
    fs::remove_file(&path)?;

    let restored = decode_snapshot(&bytes)?;
    assert_eq!((restored.width(), restored.height()), (40, 30));
    assert_eq!(snapshot_digest(&restored), snapshot_digest(&grid));
    for index in 0..grid.cell_count() {
        assert_eq!(restored.record(index), grid.record(index));
    }
    Ok(())
}

#[test]
fn damaged_snapshots_are_rejected() {
    let (grid, _, _) = common::generated_map(40, 30);
    let bytes = encode_snapshot(&grid);

    let err = decode_snapshot(&bytes[..bytes.len() / 2]).unwrap_err();
    assert!(matches!(err, SnapshotError::Truncated { .. }));

    let mut wrapped = bytes.clone();
    wrapped[12] = 1;
    assert_eq!(decode_snapshot(&wrapped).unwrap_err(), SnapshotError::UnsupportedWrapping);
}
