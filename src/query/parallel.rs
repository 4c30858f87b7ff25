//! Parallel lookups
//!
//! Uses Rayon to run many path lookups at once. The tree is read-only after
//! parsing, so every worker shares the same `&Document`.

use super::cache::PathCache;
use super::path::{CompiledPath, PathError};
use crate::dom::document::Document;
use crate::dom::node::NodeId;
use rayon::prelude::*;

/// Resolve each path from `from`, first match per segment
pub fn find_parallel(doc: &Document<'_>, from: NodeId, paths: &[&str]) -> Vec<Option<NodeId>> {
    paths
        .par_iter()
        .map(|path| doc.find_by_path(from, path))
        .collect()
}

/// Resolve through a shared compiled-path cache
pub fn find_parallel_cached(
    doc: &Document<'_>,
    from: NodeId,
    paths: &[&str],
    cache: &PathCache,
) -> Vec<Result<Option<NodeId>, PathError>> {
    paths
        .par_iter()
        .map(|path| Ok(cache.get_or_compile(path)?.resolve(doc, from)))
        .collect()
}

/// Fetch one attribute per `(path, attribute)` query
pub fn attributes_parallel<'d>(
    doc: &'d Document<'_>,
    from: NodeId,
    queries: &[(&str, &str)],
) -> Vec<Option<&'d str>> {
    queries
        .par_iter()
        .map(|(path, name)| {
            let id = doc.find_by_path(from, path)?;
            doc.get_attribute(id, name)
        })
        .collect()
}

/// Map every element matched by `path` in parallel
pub fn map_matches<F, T>(doc: &Document<'_>, from: NodeId, path: &CompiledPath, mapper: F) -> Vec<T>
where
    F: Fn(NodeId) -> T + Sync + Send,
    T: Send,
{
    path.resolve_all(doc, from).par_iter().map(|&id| mapper(id)).collect()
}
