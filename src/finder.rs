//! Depth-first traversal of backend nodes driven by a glob selector.
//!
//! Supports single-level wildcards only. Depth is bounded by the number of
//! selector segments, so traversal terminates for any backend tree.

use tracing::trace;

use crate::path_resolver::join;
use crate::selector::{self, Segment, Selector};
use crate::{NodeAccessor, RepoError};

/// Finds backend nodes matching a glob selector by walking the tree.
///
/// Selectors are native paths: callers resolve any base path first.
///
/// # Example
///
/// ```rust
/// use cmf_resource::{MemoryBackend, TraversalFinder};
///
/// let backend = MemoryBackend::new();
/// backend.insert("/cmf/a/routes", None)?;
/// backend.insert("/cmf/b/routes", None)?;
///
/// let nodes = TraversalFinder::new(&backend).find("/cmf/*/routes")?;
/// assert_eq!(nodes.len(), 2);
/// # Ok::<(), cmf_resource::RepoError>(())
/// ```
#[derive(Debug)]
pub struct TraversalFinder<'a, B: ?Sized> {
    backend: &'a B,
}

impl<'a, B: NodeAccessor + ?Sized> TraversalFinder<'a, B> {
    /// Create a finder over `backend`.
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// All nodes matching `selector`.
    ///
    /// Missing nodes end a branch silently; any other backend error aborts
    /// the search.
    ///
    /// # Errors
    ///
    /// - [`RepoError::InvalidQuery`] if the selector does not parse
    /// - any backend error raised while walking
    pub fn find(&self, selector: &str) -> Result<Vec<B::Node>, RepoError> {
        let segments = match selector::parse(selector)? {
            Selector::Root => return Ok(self.backend.node_at("/")?.into_iter().collect()),
            Selector::Segments(segments) => segments,
        };

        let mut result = Vec::new();
        self.traverse(None, &segments, &mut result)?;
        trace!(selector, matches = result.len(), "traversal finished");
        Ok(result)
    }

    fn traverse(
        &self,
        node: Option<&B::Node>,
        segments: &[Segment],
        result: &mut Vec<B::Node>,
    ) -> Result<(), RepoError> {
        let mut path = match node {
            Some(node) => self.backend.path(node),
            None => "/".to_string(),
        };

        for (idx, segment) in segments.iter().enumerate() {
            if !segment.is_pattern() {
                path = join(&path, segment.name());
                if segment.is_last() {
                    if let Some(found) = self.backend.node_at(&path)? {
                        result.push(found);
                    }
                    return Ok(());
                }
                continue;
            }

            let Some(parent) = self.backend.node_at(&path)? else {
                trace!(path = %path, "wildcard parent missing");
                return Ok(());
            };

            for child in self.backend.children(&parent)? {
                if !segment.matches(&self.backend.name(&child)) {
                    continue;
                }
                if segment.is_last() {
                    result.push(child);
                } else {
                    self.traverse(Some(&child), &segments[idx + 1..], result)?;
                }
            }
            return Ok(());
        }

        Ok(())
    }
}
