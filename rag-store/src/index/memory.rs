//! In-process index scoring `dense·dense + sparse·sparse`.
//!
//! Mirrors the dot-product ranking of a hosted sparse-dense index closely
//! enough for offline runs and tests. Counts control-plane calls.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::config::IndexSpec;
use crate::embed::BoxFuture;
use crate::errors::RagError;
use crate::index::{VectorDatabase, VectorIndex};
use crate::record::{HybridPoint, HybridQuery, ScoredDocument};

#[derive(Default)]
pub struct MemoryDatabase {
    indexes: Mutex<HashMap<String, Arc<MemoryIndex>>>,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

impl VectorDatabase for MemoryDatabase {
    fn list_indexes<'a>(&'a self) -> BoxFuture<'a, Vec<String>> {
        Box::pin(async move {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            let indexes = self.indexes.lock().unwrap_or_else(PoisonError::into_inner);
            let mut names: Vec<String> = indexes.keys().cloned().collect();
            names.sort();
            Ok(names)
        })
    }

    fn create_index<'a>(&'a self, spec: &'a IndexSpec) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            spec.validate()?;
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            let mut indexes = self.indexes.lock().unwrap_or_else(PoisonError::into_inner);
            indexes
                .entry(spec.name.clone())
                .or_insert_with(|| Arc::new(MemoryIndex::new(&spec.name, spec.dimension)));
            Ok(())
        })
    }

    fn open_index<'a>(&'a self, spec: &'a IndexSpec) -> BoxFuture<'a, Arc<dyn VectorIndex>> {
        Box::pin(async move {
            let indexes = self.indexes.lock().unwrap_or_else(PoisonError::into_inner);
            let index = indexes
                .get(&spec.name)
                .cloned()
                .ok_or_else(|| RagError::IndexNotFound(spec.name.clone()))?;
            Ok(index as Arc<dyn VectorIndex>)
        })
    }
}

pub struct MemoryIndex {
    name: String,
    dim: usize,
    points: RwLock<BTreeMap<String, HybridPoint>>,
}

impl MemoryIndex {
    pub fn new(name: &str, dim: usize) -> Self {
        Self {
            name: name.to_string(),
            dim,
            points: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.points
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_dim(&self, got: usize) -> Result<(), RagError> {
        if got != self.dim {
            return Err(RagError::VectorSizeMismatch {
                got,
                want: self.dim,
            });
        }
        Ok(())
    }
}

impl VectorIndex for MemoryIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn upsert<'a>(&'a self, points: Vec<HybridPoint>) -> BoxFuture<'a, usize> {
        Box::pin(async move {
            for p in &points {
                self.check_dim(p.dense.len())?;
            }
            let n = points.len();
            let mut store = self.points.write().unwrap_or_else(PoisonError::into_inner);
            for p in points {
                store.insert(p.id.clone(), p);
            }
            Ok(n)
        })
    }

    fn query<'a>(&'a self, query: &'a HybridQuery) -> BoxFuture<'a, Vec<ScoredDocument>> {
        Box::pin(async move {
            self.check_dim(query.dense.len())?;
            let store = self.points.read().unwrap_or_else(PoisonError::into_inner);
            let mut scored: Vec<ScoredDocument> = store
                .values()
                .map(|p| {
                    let dense: f32 = p.dense.iter().zip(&query.dense).map(|(a, b)| a * b).sum();
                    ScoredDocument {
                        id: p.id.clone(),
                        score: dense + query.sparse.dot(&p.sparse),
                        content: p.content.clone(),
                    }
                })
                .collect();
            scored.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
            scored.truncate(query.top_k);
            Ok(scored)
        })
    }
}
