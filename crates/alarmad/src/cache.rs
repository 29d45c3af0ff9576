//! Catalog cache.
//!
//! Holds the current snapshot behind an atomic swap. Readers never block:
//! `get()` returns the last good snapshot (or `None` before the first load
//! completes) while refreshes run serialized on the side. Loader failures
//! degrade to the previous snapshot, or to the built-in demo data when
//! nothing has ever loaded.

use crate::loader::{self, SourceDescriptor};
use alarma_common::columns::ColumnMapping;
use alarma_common::record::CatalogSnapshot;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

pub struct CatalogCache {
    descriptor: SourceDescriptor,
    mapping: ColumnMapping,
    snapshot: RwLock<Option<Arc<CatalogSnapshot>>>,
    refresh_lock: Mutex<()>,
}

/// Health view of the cache, serialized by the transport layer.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub loaded: bool,
    pub rows: usize,
    pub demo: bool,
    pub source: String,
    pub loaded_at: Option<DateTime<Utc>>,
}

impl CatalogCache {
    pub fn new(descriptor: SourceDescriptor) -> Self {
        Self {
            descriptor,
            mapping: ColumnMapping::new(),
            snapshot: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Last successfully installed snapshot. Non-blocking; `None` until the
    /// first load (or fallback) completes.
    pub async fn get(&self) -> Option<Arc<CatalogSnapshot>> {
        self.snapshot.read().await.clone()
    }

    /// Reload the catalog if the source file's modification time advanced.
    /// Reloading an unchanged file is a no-op returning the existing
    /// snapshot object.
    pub async fn refresh_if_stale(&self) -> Option<Arc<CatalogSnapshot>> {
        self.refresh(false).await
    }

    /// Reload regardless of the modification time.
    pub async fn force_refresh(&self) -> Option<Arc<CatalogSnapshot>> {
        self.refresh(true).await
    }

    async fn refresh(&self, force: bool) -> Option<Arc<CatalogSnapshot>> {
        // Serializes concurrent refreshes; get() keeps serving the prior
        // snapshot until the swap below.
        let _guard = self.refresh_lock.lock().await;
        let current = self.get().await;

        if !force {
            if let Some(current) = &current {
                // Any mtime change triggers a reload, not just a newer one,
                // so a restored backup with an older timestamp is picked up.
                let on_disk = self.descriptor.source_mtime();
                if on_disk.is_some() && on_disk == current.source_mtime() {
                    return Some(Arc::clone(current));
                }
            }
        }

        match loader::load(&self.descriptor, &self.mapping) {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                *self.snapshot.write().await = Some(Arc::clone(&snapshot));
                info!("Catalog snapshot swapped: {} records", snapshot.len());
                Some(snapshot)
            }
            Err(e) => {
                warn!("Catalog refresh failed: {e}");
                match current {
                    Some(previous) => {
                        info!(
                            "Keeping previous snapshot ({} records)",
                            previous.len()
                        );
                        Some(previous)
                    }
                    None => {
                        let demo = Arc::new(loader::demo_snapshot());
                        warn!(
                            "No snapshot available, serving built-in demo data ({} records)",
                            demo.len()
                        );
                        *self.snapshot.write().await = Some(Arc::clone(&demo));
                        Some(demo)
                    }
                }
            }
        }
    }

    /// Kick off the first load without blocking startup. Until it finishes,
    /// `get()` stays `None` and callers answer "still loading".
    pub fn spawn_initial_load(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            info!("Starting initial catalog load");
            cache.force_refresh().await;
        })
    }

    pub async fn status(&self) -> CacheStatus {
        match self.get().await {
            Some(snapshot) => CacheStatus {
                loaded: true,
                rows: snapshot.len(),
                demo: snapshot.is_demo(),
                source: snapshot.source_path().display().to_string(),
                loaded_at: Some(snapshot.loaded_at()),
            },
            None => CacheStatus {
                loaded: false,
                rows: 0,
                demo: false,
                source: self.descriptor.path.display().to_string(),
                loaded_at: None,
            },
        }
    }
}
