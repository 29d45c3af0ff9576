//! Tests for the catalog cache.

use alarmad::cache::CatalogCache;
use alarmad::loader::SourceDescriptor;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

const CSV: &str = "NUMERO DE ALARMA;ELEMENTO;SEVERIDAD\n1003;AAA Huawei;CRITICA\n";

fn fixture(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("catalogo.csv");
    fs::write(&path, CSV).unwrap();
    path
}

#[tokio::test]
async fn test_get_is_none_before_first_load() {
    let dir = TempDir::new().unwrap();
    let cache = CatalogCache::new(SourceDescriptor::new(fixture(&dir)));
    assert!(cache.get().await.is_none());
    let status = cache.status().await;
    assert!(!status.loaded);
    assert_eq!(status.rows, 0);
}

#[tokio::test]
async fn test_refresh_unchanged_file_returns_same_snapshot_object() {
    let dir = TempDir::new().unwrap();
    let cache = CatalogCache::new(SourceDescriptor::new(fixture(&dir)));

    let first = cache.refresh_if_stale().await.unwrap();
    let second = cache.refresh_if_stale().await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_refresh_picks_up_newer_mtime() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir);
    let cache = CatalogCache::new(SourceDescriptor::new(path.clone()));

    let first = cache.refresh_if_stale().await.unwrap();
    assert_eq!(first.len(), 1);

    fs::write(
        &path,
        "NUMERO DE ALARMA;ELEMENTO;SEVERIDAD\n\
         1003;AAA Huawei;CRITICA\n2047;HLR Ericsson;ALTA\n",
    )
    .unwrap();
    // Push the mtime forward explicitly so the test does not depend on
    // filesystem timestamp granularity.
    let file = OpenOptions::new().append(true).open(&path).unwrap();
    file.set_modified(SystemTime::now() + Duration::from_secs(5))
        .unwrap();

    let second = cache.refresh_if_stale().await.unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(second.len(), 2);
    assert_eq!(cache.get().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_refresh_picks_up_older_mtime() {
    // A restored backup can carry a timestamp older than the loaded
    // snapshot; any mtime change must trigger a reload.
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir);
    let cache = CatalogCache::new(SourceDescriptor::new(path.clone()));

    let first = cache.refresh_if_stale().await.unwrap();
    assert_eq!(first.len(), 1);

    fs::write(
        &path,
        "NUMERO DE ALARMA;ELEMENTO;SEVERIDAD\n\
         1003;AAA Huawei;CRITICA\n2047;HLR Ericsson;ALTA\n",
    )
    .unwrap();
    let file = OpenOptions::new().append(true).open(&path).unwrap();
    file.set_modified(SystemTime::now() - Duration::from_secs(3600))
        .unwrap();

    let second = cache.refresh_if_stale().await.unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(second.len(), 2);
}

#[tokio::test]
async fn test_load_failure_with_no_snapshot_serves_demo_data() {
    let dir = TempDir::new().unwrap();
    let cache = CatalogCache::new(SourceDescriptor::new(dir.path().join("no-existe.csv")));

    let snapshot = cache.refresh_if_stale().await.unwrap();
    assert!(snapshot.is_demo());
    assert_eq!(snapshot.len(), 2);

    let status = cache.status().await;
    assert!(status.loaded);
    assert!(status.demo);
}

#[tokio::test]
async fn test_load_failure_keeps_previous_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir);
    let cache = CatalogCache::new(SourceDescriptor::new(path.clone()));

    let first = cache.refresh_if_stale().await.unwrap();
    fs::remove_file(&path).unwrap();

    let second = cache.force_refresh().await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(!second.is_demo());
}

#[tokio::test]
async fn test_spawned_initial_load_populates_cache() {
    let dir = TempDir::new().unwrap();
    let cache = Arc::new(CatalogCache::new(SourceDescriptor::new(fixture(&dir))));

    let handle = cache.spawn_initial_load();
    handle.await.unwrap();

    let snapshot = cache.get().await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert!(!snapshot.is_demo());
}
