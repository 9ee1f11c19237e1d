//! Query evaluation with an optional compile cache.

use rustc_hash::FxHashMap;
use tracing::warn;

use super::predicate::Predicate;
use crate::store::GameObject;

/// Evaluates predicate strings over object collections.
///
/// Without a cache every call parses its predicate. With one, each distinct
/// predicate string is compiled once per engine. The cache holds at most
/// `capacity` entries and is emptied when a new string would exceed it.
#[derive(Clone, Debug, Default)]
pub struct QueryEngine {
    cache: Option<FxHashMap<String, Predicate>>,
    capacity: usize,
}

/// Predicates kept by [`QueryEngine::with_cache`].
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

impl QueryEngine {
    /// Engine that parses on every call.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine that remembers compiled predicates.
    #[must_use]
    pub fn with_cache() -> Self {
        Self::with_cache_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Engine that remembers up to `capacity` compiled predicates.
    #[must_use]
    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            cache: Some(FxHashMap::default()),
            capacity: capacity.max(1),
        }
    }

    #[must_use]
    pub fn is_caching(&self) -> bool {
        self.cache.is_some()
    }

    /// Number of cached predicates.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.as_ref().map_or(0, FxHashMap::len)
    }

    pub fn clear_cache(&mut self) {
        if let Some(cache) = &mut self.cache {
            cache.clear();
        }
    }

    /// Compile a predicate string, consulting the cache if enabled.
    pub fn compile(&mut self, text: &str) -> Predicate {
        if let Some(hit) = self.cache.as_ref().and_then(|c| c.get(text)) {
            return hit.clone();
        }
        let predicate = compile(text);
        if let Some(cache) = &mut self.cache {
            if cache.len() >= self.capacity {
                cache.clear();
            }
            cache.insert(text.to_string(), predicate.clone());
        }
        predicate
    }

    /// Objects satisfying every clause, in input order.
    pub fn find<'a, I>(&mut self, predicate: &str, objects: I) -> Vec<&'a GameObject>
    where
        I: IntoIterator<Item = &'a GameObject>,
    {
        self.compile(predicate).filter(objects)
    }

    pub fn find_first<'a, I>(&mut self, predicate: &str, objects: I) -> Option<&'a GameObject>
    where
        I: IntoIterator<Item = &'a GameObject>,
    {
        self.compile(predicate).first(objects)
    }
}

fn compile(text: &str) -> Predicate {
    let predicate = Predicate::parse(text);
    if predicate.is_malformed() {
        warn!(predicate = text, "malformed predicate matches nothing");
    }
    predicate
}

/// One-off query without an engine.
pub fn find<'a, I>(predicate: &str, objects: I) -> Vec<&'a GameObject>
where
    I: IntoIterator<Item = &'a GameObject>,
{
    compile(predicate).filter(objects)
}

/// One-off first match without an engine.
pub fn find_first<'a, I>(predicate: &str, objects: I) -> Option<&'a GameObject>
where
    I: IntoIterator<Item = &'a GameObject>,
{
    compile(predicate).first(objects)
}
