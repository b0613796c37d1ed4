use std::fs;
use std::path::Path;
use std::process::Command;

use serde_json::Value;

fn ot_bin() -> String {
    env!("CARGO_BIN_EXE_ot").to_string()
}

/// 17-byte record: 8 LE black, 8 LE white, 1 move byte.
fn record(black: u64, white: u64, mv: u8) -> Vec<u8> {
    let mut out = Vec::with_capacity(17);
    out.extend_from_slice(&black.to_le_bytes());
    out.extend_from_slice(&white.to_le_bytes());
    out.push(mv);
    out
}

fn write_raw(path: &Path, records: &[(u64, u64, u8)]) {
    let mut bytes = Vec::new();
    for &(b, w, m) in records {
        bytes.extend_from_slice(&record(b, w, m));
    }
    fs::write(path, bytes).unwrap();
}

#[test]
fn ingest_then_labels_then_stats() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw.bin");
    let store = dir.path().join("games.store");
    let labels = dir.path().join("games.labels");

    write_raw(&raw, &[(1, 0, 5), (1, 0, 5), (2, 0, 10)]);

    let out = Command::new(ot_bin())
        .args([
            "ingest",
            "--input",
            raw.to_str().unwrap(),
            "--out",
            store.to_str().unwrap(),
            "--manifest",
        ])
        .output()
        .unwrap();
    assert!(out.status.success(), "{:?}", out);
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("Records read:  3"));
    assert!(stdout.contains("Distinct:      2"));
    assert_eq!(fs::metadata(&store).unwrap().len(), 34);

    let manifest: Value =
        serde_json::from_slice(&fs::read(dir.path().join("games.store.meta.json")).unwrap())
            .unwrap();
    assert_eq!(manifest["num_records"], 2);
    assert_eq!(manifest["record_bytes"], 17);
    assert!(manifest["store_hash"].is_string());

    let out = Command::new(ot_bin())
        .args([
            "labels",
            "--store",
            store.to_str().unwrap(),
            "--out",
            labels.to_str().unwrap(),
        ])
        .output()
        .unwrap();
    assert!(out.status.success(), "{:?}", out);
    assert!(labels.exists());
    let meta: Value =
        serde_json::from_slice(&fs::read(dir.path().join("games.labels.meta.json")).unwrap())
            .unwrap();
    assert_eq!(meta["num_samples"], 2);
    assert_eq!(meta["num_classes"], 60);

    let out = Command::new(ot_bin())
        .args([
            "stats",
            "--store",
            store.to_str().unwrap(),
            "--labels",
            labels.to_str().unwrap(),
        ])
        .output()
        .unwrap();
    assert!(out.status.success(), "{:?}", out);
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("Records:  2"));
    assert!(stdout.contains("(paired)"));
}

#[test]
fn ingest_rejects_a_truncated_stream() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw.bin");
    let store = dir.path().join("games.store");

    let mut bytes = record(1, 2, 3);
    bytes.extend_from_slice(&[0xFF; 4]);
    fs::write(&raw, bytes).unwrap();

    let out = Command::new(ot_bin())
        .args([
            "ingest",
            "--input",
            raw.to_str().unwrap(),
            "--out",
            store.to_str().unwrap(),
        ])
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("truncated record"), "{}", stderr);
    assert!(!store.exists());
}

#[test]
fn labels_fail_on_a_corrupt_move_byte() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw.bin");
    let store = dir.path().join("games.store");
    let labels = dir.path().join("games.labels");

    // Move byte 27 is one of the excluded starting squares.
    write_raw(&raw, &[(1, 0, 27)]);
    let out = Command::new(ot_bin())
        .args([
            "ingest",
            "--input",
            raw.to_str().unwrap(),
            "--out",
            store.to_str().unwrap(),
        ])
        .output()
        .unwrap();
    assert!(out.status.success());

    let out = Command::new(ot_bin())
        .args([
            "labels",
            "--store",
            store.to_str().unwrap(),
            "--out",
            labels.to_str().unwrap(),
        ])
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("move-class domain"), "{}", stderr);
    assert!(!labels.exists());
}

#[test]
fn inspect_prints_the_sample_and_board() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw.bin");
    let store = dir.path().join("games.store");

    // Single record: black on square 0, white on square 63, move square 19.
    write_raw(&raw, &[(1, 1u64 << 63, 19)]);
    Command::new(ot_bin())
        .args([
            "ingest",
            "--input",
            raw.to_str().unwrap(),
            "--out",
            store.to_str().unwrap(),
        ])
        .output()
        .unwrap();

    let out = Command::new(ot_bin())
        .args([
            "inspect",
            "--store",
            store.to_str().unwrap(),
            "--ordinal",
            "0",
        ])
        .output()
        .unwrap();
    assert!(out.status.success(), "{:?}", out);
    let stdout = String::from_utf8(out.stdout).unwrap();
    // Square 19 is file d, rank 3; class equals square below the first gap.
    assert!(stdout.contains("19 (d3) -> class 19"), "{}", stdout);
    assert!(stdout.contains("a b c d e f g h"));

    let out = Command::new(ot_bin())
        .args([
            "inspect",
            "--store",
            store.to_str().unwrap(),
            "--ordinal",
            "5",
        ])
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("out of range"), "{}", stderr);
}

#[test]
fn batches_dry_run_drops_the_partial_tail() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw.bin");
    let store = dir.path().join("games.store");
    let labels = dir.path().join("games.labels");
    let config = dir.path().join("dataset.yaml");

    // Seven distinct samples; batch size 3 leaves one dropped at the tail.
    let records: Vec<(u64, u64, u8)> = (0..7).map(|i| (i + 1, 0, (i % 26) as u8)).collect();
    write_raw(&raw, &records);

    for args in [
        vec!["ingest", "--input", raw.to_str().unwrap(), "--out", store.to_str().unwrap()],
        vec!["labels", "--store", store.to_str().unwrap(), "--out", labels.to_str().unwrap()],
    ] {
        let out = Command::new(ot_bin()).args(&args).output().unwrap();
        assert!(out.status.success(), "{:?}", out);
    }

    fs::write(
        &config,
        format!(
            r#"
dataset:
  store: {}
  labels: {}

batching:
  batch_size: 3
  shuffle: false

partitions:
  train: {{ start: 0, end: 7 }}
"#,
            store.display(),
            labels.display()
        ),
    )
    .unwrap();

    let out = Command::new(ot_bin())
        .args(["batches", "--config", config.to_str().unwrap(), "--epochs", "2"])
        .output()
        .unwrap();
    assert!(out.status.success(), "{:?}", out);
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("7 ordinals, 2 batches of 3"), "{}", stdout);
    assert!(stdout.contains("Epoch 0: 2 batches, 6 samples"), "{}", stdout);
    assert!(stdout.contains("Epoch 1: 2 batches, 6 samples"), "{}", stdout);
}

#[test]
fn unknown_command_exits_nonzero() {
    let out = Command::new(ot_bin()).arg("frobnicate").output().unwrap();
    assert!(!out.status.success());
}
