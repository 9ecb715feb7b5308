use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Cursor, Write};
use std::path::Path;
use std::time::Duration;

use lumberjack::core::{rotation, FileSystem, FixedClock, LogFamily, OsFs, Stamps};
use lumberjack::{run_with, Config};
use tempfile::tempdir;
use time::OffsetDateTime;

fn clock() -> FixedClock {
    FixedClock::new(OffsetDateTime::UNIX_EPOCH, Duration::ZERO)
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("read log")
}

fn member_count(dir: &Path) -> usize {
    fs::read_dir(dir).expect("read dir").count()
}

#[test]
fn chain_keeps_newest_generations() {
    let dir = tempdir().expect("tempdir");
    let log = dir.path().join("app.log");
    let mut config = Config::new(&log);
    config.max_lines = 2;
    config.max_files = 3;

    let stats = run_with(&config, Cursor::new("a\nb\nc\nd\ne\n"), OsFs, clock()).expect("run");

    assert_eq!(read(&log), "e\n");
    assert_eq!(read(&dir.path().join("app.log.1")), "c\nd\n");
    assert_eq!(read(&dir.path().join("app.log.2")), "a\nb\n");
    assert!(!dir.path().join("app.log.3").exists());
    assert_eq!(stats.rotations, 2);
}

#[test]
fn oldest_generation_is_dropped() {
    let dir = tempdir().expect("tempdir");
    let log = dir.path().join("app.log");
    let mut config = Config::new(&log);
    config.max_lines = 1;
    config.max_files = 3;

    let input: String = (0..10).map(|i| format!("line{i}\n")).collect();
    run_with(&config, Cursor::new(input.clone()), OsFs, clock()).expect("run");

    assert_eq!(read(&log), "line9\n");
    assert_eq!(read(&dir.path().join("app.log.1")), "line8\n");
    assert_eq!(read(&dir.path().join("app.log.2")), "line7\n");
    assert_eq!(member_count(dir.path()), 3);
}

#[test]
fn bytes_are_conserved_across_family() {
    let dir = tempdir().expect("tempdir");
    let log = dir.path().join("app.log");
    let mut config = Config::new(&log);
    config.max_lines = 3;
    config.max_files = 100;

    let input: String = (0..50)
        .map(|i| format!("{}\n", "x".repeat(i % 7)))
        .collect::<String>()
        + "tail without newline";
    let stats = run_with(&config, Cursor::new(input.clone()), OsFs, clock()).expect("run");

    let mut rebuilt = String::new();
    for index in (1..100).rev() {
        let path = dir.path().join(format!("app.log.{index}"));
        if path.exists() {
            let contents = read(&path);
            assert_eq!(contents.lines().count(), 3, "{} holds a full budget", path.display());
            rebuilt.push_str(&contents);
        }
    }
    rebuilt.push_str(&read(&log));
    assert_eq!(rebuilt, input);
    assert_eq!(stats.bytes_in, input.len() as u64);
    assert_eq!(stats.rotations, 16);
}

#[test]
fn fresh_run_leaves_empty_live_file() {
    let dir = tempdir().expect("tempdir");
    let log = dir.path().join("app.log");
    fs::write(&log, "previous\n").expect("seed");
    let mut config = Config::new(&log);
    config.max_files = 2;

    run_with(&config, Cursor::new(""), OsFs, clock()).expect("run");

    assert_eq!(read(&log), "");
    assert_eq!(read(&dir.path().join("app.log.1")), "previous\n");
}

#[test]
fn single_file_family_only_truncates() {
    let dir = tempdir().expect("tempdir");
    let log = dir.path().join("app.log");
    fs::write(&log, "previous\n").expect("seed");
    let mut config = Config::new(&log);
    config.max_lines = 2;
    config.max_files = 1;

    let stats = run_with(&config, Cursor::new("a\nb\nc\nd\ne"), OsFs, clock()).expect("run");

    assert_eq!(read(&log), "e");
    assert_eq!(stats.rotations, 2);
    assert!(!dir.path().join("app.log.1").exists());
    assert_eq!(member_count(dir.path()), 1);
}

#[test]
fn stale_generations_beyond_retention_are_pruned() {
    let dir = tempdir().expect("tempdir");
    let log = dir.path().join("app.log");
    for index in 1..=6 {
        fs::write(dir.path().join(format!("app.log.{index}")), "old\n").expect("seed");
    }
    fs::write(dir.path().join("unrelated.txt"), "keep").expect("seed");
    let mut config = Config::new(&log);
    config.max_files = 3;

    run_with(&config, Cursor::new("x\n"), OsFs, clock()).expect("run");

    assert_eq!(read(&log), "x\n");
    assert!(dir.path().join("app.log.1").exists() || dir.path().join("app.log.2").exists());
    for index in 3..=7 {
        assert!(
            !dir.path().join(format!("app.log.{index}")).exists(),
            "app.log.{index} should be pruned"
        );
    }
    assert!(dir.path().join("unrelated.txt").exists());
}

#[test]
fn epoch_stamps_survive_rotation() {
    let dir = tempdir().expect("tempdir");
    let log = dir.path().join("app.log");
    let mut config = Config::new(&log);
    config.max_lines = 1;
    config.max_files = 2;
    config.stamps = Stamps {
        datetime: false,
        epoch: true,
    };
    let clock = FixedClock::new(OffsetDateTime::UNIX_EPOCH, Duration::from_micros(7_000_001));

    run_with(&config, Cursor::new("a\nb\n"), OsFs, clock).expect("run");

    assert_eq!(read(&dir.path().join("app.log.1")), "[7.000001]: a\n");
    assert_eq!(read(&log), "[7.000001]: b\n");
}

/// Host filesystem on which directory listing is refused.
struct UnlistableFs;

impl FileSystem for UnlistableFs {
    type File = File;

    fn exists(&self, path: &Path) -> bool {
        OsFs.exists(path)
    }

    fn list_dir(&self, dir: &Path) -> io::Result<Vec<OsString>> {
        Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            format!("listing refused: {}", dir.display()),
        ))
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        OsFs.remove_file(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        OsFs.rename(from, to)
    }

    fn create(&self, path: &Path) -> io::Result<File> {
        OsFs.create(path)
    }

    fn open_append(&self, path: &Path) -> io::Result<File> {
        OsFs.open_append(path)
    }
}

#[test]
fn rotation_survives_unlistable_directory() {
    let dir = tempdir().expect("tempdir");
    let log = dir.path().join("app.log");
    fs::write(&log, "previous\n").expect("seed live");
    fs::write(dir.path().join("app.log.1"), "older\n").expect("seed backup");
    let family = LogFamily::new(&log, 3).expect("family");

    let mut file = rotation::rotate(&UnlistableFs, &family).expect("rotate");
    file.write_all(b"fresh\n").expect("write");
    drop(file);

    assert_eq!(read(&log), "fresh\n");
    assert_eq!(read(&dir.path().join("app.log.1")), "previous\n");
    assert_eq!(read(&dir.path().join("app.log.2")), "older\n");
}
