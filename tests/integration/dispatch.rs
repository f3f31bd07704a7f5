//! Concurrent transfers through the dispatcher

use super::helpers::*;
use haul::models::{Direction, ErrorKind};
use haul::transfer::{sanitize, Dispatcher, FaultInjector, LocalProvider, RemoteTarget};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn nas(root: &Path) -> LocalProvider {
    LocalProvider::new(BTreeMap::from([("nas".to_string(), root.to_path_buf())]))
}

fn mirrored(remote_root: &Path, hostname: &str, local: &Path) -> PathBuf {
    remote_root
        .join("Backups")
        .join(hostname)
        .join(sanitize(&local.display().to_string()))
}

#[test]
fn test_upload_to_named_remote_copies_tree() {
    let local = TempDir::new().expect("Failed to create temp dir");
    let remote = TempDir::new().expect("Failed to create temp dir");

    let docs = local.path().join("docs");
    fs::create_dir_all(docs.join("nested")).unwrap();
    fs::create_dir_all(docs.join("empty")).unwrap();
    fs::write(docs.join("a.txt"), "alpha").unwrap();
    fs::write(docs.join("nested/b.txt"), "beta").unwrap();
    let single = local.path().join("notes.md");
    fs::write(&single, "notes").unwrap();

    let dispatcher = Dispatcher::new(
        nas(remote.path()),
        RemoteTarget::new("nas", "Backups", "workstation"),
    );
    let paths = vec![
        docs.display().to_string(),
        single.display().to_string(),
    ];
    let errors = dispatcher.dispatch(&paths, Direction::Upload, false).drain();
    assert!(errors.is_empty(), "{:?}", errors.errors);
    assert_eq!(errors.slots, 2);

    let docs_copy = mirrored(remote.path(), "workstation", &docs);
    assert_eq!(fs::read_to_string(docs_copy.join("a.txt")).unwrap(), "alpha");
    assert_eq!(fs::read_to_string(docs_copy.join("nested/b.txt")).unwrap(), "beta");
    assert!(docs_copy.join("empty").is_dir());

    // A file lands in the mirror of its parent directory
    let parent_copy = mirrored(remote.path(), "workstation", local.path());
    assert_eq!(fs::read_to_string(parent_copy.join("notes.md")).unwrap(), "notes");
}

#[test]
fn test_download_restores_uploaded_content() {
    let local = TempDir::new().expect("Failed to create temp dir");
    let remote = TempDir::new().expect("Failed to create temp dir");
    let file = local.path().join("settings.conf");
    fs::write(&file, "uploaded").unwrap();
    let paths = vec![file.display().to_string()];

    let target = RemoteTarget::new("nas", "Backups", "laptop");
    let upload = Dispatcher::new(nas(remote.path()), target.clone());
    assert!(upload.dispatch(&paths, Direction::Upload, false).drain().is_empty());

    fs::write(&file, "changed locally").unwrap();

    let download = Dispatcher::new(nas(remote.path()), target);
    let errors = download.dispatch(&paths, Direction::Download, false).drain();
    assert!(errors.is_empty(), "{:?}", errors.errors);
    assert_eq!(fs::read_to_string(&file).unwrap(), "uploaded");
}

#[test]
fn test_unknown_remote_is_a_transfer_error() {
    let local = TempDir::new().expect("Failed to create temp dir");
    let paths = vec![local.path().display().to_string()];

    let dispatcher = Dispatcher::new(
        LocalProvider::default(),
        RemoteTarget::new("nowhere", "Backups", "host"),
    );
    let errors = dispatcher.dispatch(&paths, Direction::Download, false).drain();

    assert_eq!(errors.count(), 1);
    assert_eq!(errors.errors[0].kind, ErrorKind::DownloadError);
    assert_eq!(errors.errors[0].source, paths[0]);
}

#[test]
fn test_duplicates_are_transferred_once_under_concurrency() {
    let local = TempDir::new().expect("Failed to create temp dir");
    let first = local.path().join("first");
    let second = local.path().join("second");
    fs::create_dir_all(&first).unwrap();
    fs::create_dir_all(&second).unwrap();

    let mut paths = vec![first.display().to_string(); 8];
    paths.push(second.display().to_string());
    paths.push(second.display().to_string());

    let dispatcher = Dispatcher::new(
        RecordingProvider::default(),
        RemoteTarget::new("nas", "Backups", "host"),
    );
    let errors = dispatcher.dispatch(&paths, Direction::Upload, false).drain();

    assert!(errors.is_empty());
    assert_eq!(errors.slots, 10);
    assert_eq!(dispatcher.processed().len(), 2);
    assert_eq!(dispatcher.provider().count("copy_dir"), 2);
}

#[test]
fn test_simulation_never_copies() {
    let local = TempDir::new().expect("Failed to create temp dir");
    let paths: Vec<String> = (0..5)
        .map(|n| {
            let dir = local.path().join(format!("dir{n}"));
            fs::create_dir_all(&dir).unwrap();
            dir.display().to_string()
        })
        .collect();

    let dispatcher = Dispatcher::new(
        RecordingProvider::default(),
        RemoteTarget::new("nas", "Backups", "host"),
    )
    .with_faults(FaultInjector::disabled());
    let errors = dispatcher.dispatch(&paths, Direction::Upload, true).drain();

    assert!(errors.is_empty());
    assert_eq!(dispatcher.provider().count("copy_"), 0);
    assert_eq!(dispatcher.provider().count("mkdir"), 5);
}

#[test]
fn test_certain_faults_fail_every_simulated_path() {
    let local = TempDir::new().expect("Failed to create temp dir");
    let paths: Vec<String> = (0..4)
        .map(|n| {
            let file = local.path().join(format!("f{n}.txt"));
            fs::write(&file, "x").unwrap();
            file.display().to_string()
        })
        .collect();

    let dispatcher = Dispatcher::new(
        RecordingProvider::default(),
        RemoteTarget::new("nas", "Backups", "host"),
    )
    .with_faults(FaultInjector::new(1.0));
    let errors = dispatcher.dispatch(&paths, Direction::Upload, true).drain();

    assert_eq!(errors.count(), 4);
    assert!(errors
        .errors
        .iter()
        .all(|e| matches!(e.kind, ErrorKind::Generic | ErrorKind::UploadError)));
    assert!(dispatcher.provider().calls().is_empty());
}

#[test]
fn test_faults_are_ignored_outside_simulation() {
    let local = TempDir::new().expect("Failed to create temp dir");
    let paths = vec![local.path().display().to_string()];

    let dispatcher = Dispatcher::new(
        RecordingProvider::failing(),
        RemoteTarget::new("nas", "Backups", "host"),
    )
    .with_faults(FaultInjector::new(1.0));
    let errors = dispatcher.dispatch(&paths, Direction::Upload, false).drain();

    // The only failure is the provider's own
    assert_eq!(errors.count(), 1);
    assert_eq!(errors.errors[0].kind, ErrorKind::UploadError);
    assert_eq!(dispatcher.provider().count("copy_dir"), 1);
}
