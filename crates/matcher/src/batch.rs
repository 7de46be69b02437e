//! Batch matching of many extracted materials against the catalog.
//!
//! The catalog is loaded once per batch rather than once per material,
//! turning O(materials) remote calls into O(1); the captured candidate
//! list is read-only, so intra-chunk concurrency needs no locks.

use crate::fuzzy::{match_material, MatchOptions};
use crate::types::{MaterialMatch, MaterialQuery};
use carbonlens_catalog::{CatalogQuery, CatalogStore, Product};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Materials matched concurrently at a time. Chunks run sequentially so
/// the fan-out stays bounded regardless of model size.
pub const DEFAULT_CHUNK_SIZE: usize = 10;

pub struct BatchMatcher {
    catalog: Arc<dyn CatalogStore>,
    chunk_size: usize,
}

impl BatchMatcher {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self {
            catalog,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Match every material, returning one entry per unique input name.
    ///
    /// Duplicate names collapse to a single lookup. A catalog pre-load
    /// failure degrades to an empty candidate set (every entry resolves
    /// to `None`) instead of aborting the batch.
    pub async fn match_all(
        &self,
        materials: &[MaterialQuery],
        base: &MatchOptions,
    ) -> HashMap<String, Option<MaterialMatch>> {
        let candidates: Arc<Vec<Product>> = match self.catalog.search(&CatalogQuery::all()).await {
            Ok(products) => Arc::new(products),
            Err(err) => {
                log::warn!("Catalog pre-load failed, matching with no candidates: {err}");
                Arc::new(Vec::new())
            }
        };

        let mut seen = HashSet::new();
        let unique: Vec<MaterialQuery> = materials
            .iter()
            .filter(|m| seen.insert(m.name.clone()))
            .cloned()
            .collect();

        log::debug!(
            "Batch matching {} unique materials ({} total) against {} candidates",
            unique.len(),
            materials.len(),
            candidates.len()
        );

        let mut results = HashMap::with_capacity(unique.len());
        for chunk in unique.chunks(self.chunk_size) {
            let mut join = JoinSet::new();
            for query in chunk {
                let query = query.clone();
                let candidates = Arc::clone(&candidates);
                let mut options = base.clone();
                options.category_hint =
                    Some(query.category.clone()).filter(|c| !c.trim().is_empty());
                join.spawn(async move {
                    let matched = match_material(&query.name, &options, &candidates);
                    (query.name, matched)
                });
            }
            while let Some(joined) = join.join_next().await {
                match joined {
                    Ok((name, matched)) => {
                        results.insert(name, matched);
                    }
                    Err(err) => log::warn!("Match task failed: {err}"),
                }
            }
        }

        results
    }
}
