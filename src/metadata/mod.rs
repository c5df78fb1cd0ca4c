//! Hero and item reference metadata cache.
//!
//! Each index is populated at most once per cache lifetime. Concurrent first
//! callers share a single in-flight fetch. A failed fetch seeds the index
//! from the fallback datasets and that degraded index is kept until
//! [`MetadataCache::invalidate`] is called.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{OnceCell, RwLock};
use tracing::{info, warn};

use crate::fallback;
use crate::models::{HeroMetadata, ItemMetadata};
use crate::source::ExternalSource;

pub type HeroIndex = HashMap<u32, HeroMetadata>;
pub type ItemIndex = HashMap<u32, ItemMetadata>;

/// Where a cached index came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataOrigin {
    Live,
    Fallback,
}

#[derive(Debug)]
struct Loaded<T> {
    entries: Arc<T>,
    origin: MetadataOrigin,
}

/// A lazily populated value that can be reset.
struct Slot<T> {
    cell: RwLock<Arc<OnceCell<Loaded<T>>>>,
}

impl<T> Slot<T> {
    fn new() -> Self {
        Self {
            cell: RwLock::new(Arc::new(OnceCell::new())),
        }
    }

    async fn get_or_load<F, Fut>(&self, load: F) -> Arc<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Loaded<T>>,
    {
        let cell = self.cell.read().await.clone();
        cell.get_or_init(load).await.entries.clone()
    }

    async fn origin(&self) -> Option<MetadataOrigin> {
        self.cell.read().await.get().map(|loaded| loaded.origin)
    }

    async fn reset(&self) {
        *self.cell.write().await = Arc::new(OnceCell::new());
    }
}

/// Process-lifetime cache of hero and item metadata.
pub struct MetadataCache {
    source: Arc<dyn ExternalSource>,
    heroes: Slot<HeroIndex>,
    items: Slot<ItemIndex>,
}

impl MetadataCache {
    pub fn new(source: Arc<dyn ExternalSource>) -> Self {
        Self {
            source,
            heroes: Slot::new(),
            items: Slot::new(),
        }
    }

    /// Hero id to metadata, fetched on first use.
    pub async fn heroes(&self) -> Arc<HeroIndex> {
        self.heroes.get_or_load(|| self.load_heroes()).await
    }

    /// Item id to metadata, fetched on first use.
    pub async fn items(&self) -> Arc<ItemIndex> {
        self.items.get_or_load(|| self.load_items()).await
    }

    /// Origin of the hero index, `None` before the first load.
    pub async fn hero_origin(&self) -> Option<MetadataOrigin> {
        self.heroes.origin().await
    }

    /// Origin of the item index, `None` before the first load.
    pub async fn item_origin(&self) -> Option<MetadataOrigin> {
        self.items.origin().await
    }

    /// Drop both indexes so the next call fetches again.
    ///
    /// Callers already holding an index keep their copy.
    pub async fn invalidate(&self) {
        self.heroes.reset().await;
        self.items.reset().await;
        info!("Metadata cache invalidated");
    }

    async fn load_heroes(&self) -> Loaded<HeroIndex> {
        match self.source.fetch_hero_constants().await {
            Ok(constants) => {
                let entries: HeroIndex = constants
                    .into_values()
                    .map(|hero| (hero.id, hero))
                    .collect();
                info!(count = entries.len(), "Loaded hero constants");
                Loaded {
                    entries: Arc::new(entries),
                    origin: MetadataOrigin::Live,
                }
            }
            Err(e) => {
                warn!(
                    source = self.source.name(),
                    error = %e,
                    "Failed to load hero constants, using fallback names"
                );
                Loaded {
                    entries: Arc::new(
                        fallback::hero_metadata()
                            .into_iter()
                            .map(|hero| (hero.id, hero))
                            .collect(),
                    ),
                    origin: MetadataOrigin::Fallback,
                }
            }
        }
    }

    async fn load_items(&self) -> Loaded<ItemIndex> {
        match self.source.fetch_item_constants().await {
            Ok(constants) => {
                let entries: ItemIndex = constants
                    .into_values()
                    .map(|item| (item.id, item))
                    .collect();
                info!(count = entries.len(), "Loaded item constants");
                Loaded {
                    entries: Arc::new(entries),
                    origin: MetadataOrigin::Live,
                }
            }
            Err(e) => {
                warn!(
                    source = self.source.name(),
                    error = %e,
                    "Failed to load item constants, using fallback names"
                );
                Loaded {
                    entries: Arc::new(
                        fallback::item_metadata()
                            .into_iter()
                            .map(|item| (item.id, item))
                            .collect(),
                    ),
                    origin: MetadataOrigin::Fallback,
                }
            }
        }
    }
}
