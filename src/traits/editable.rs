//! Mutating operations of a resource repository.

use super::ResourceRepository;
use crate::{RepoError, Resource};

/// A repository whose resources can be added, removed, moved and reordered.
///
/// Every mutating call commits once at the end; partial failures are not
/// rolled back by the repository.
pub trait EditableRepository: ResourceRepository {
    /// Create `resources` as children of the resource at `path`.
    ///
    /// Each resource contributes its [`name`](Resource::name), payload type
    /// and payload.
    ///
    /// # Errors
    ///
    /// - [`RepoError::InvalidPath`] if `path` is invalid
    /// - [`RepoError::InvalidArgument`] if `path` is the root, the parent does
    ///   not exist, or a resource lacks a name or payload type
    fn add(&self, path: &str, resources: &[Resource]) -> Result<(), RepoError>;

    /// Remove every resource matched by `query`.
    ///
    /// Returns the number of directly matched resources, not the size of the
    /// removed subtrees. Zero matches returns `0` without touching the backend.
    ///
    /// # Errors
    ///
    /// - [`RepoError::Repository`] wrapping any backend failure
    fn remove(&self, query: &str, language: &str) -> Result<usize, RepoError>;

    /// Move every resource matched by `query`.
    ///
    /// An exact (non-globbed) query moves its single match to `target_path`.
    /// A globbed query moves each match to `target_path/<name>`. Returns the
    /// number of matched resources.
    ///
    /// # Errors
    ///
    /// - [`RepoError::Repository`] wrapping any backend failure
    fn move_to(&self, query: &str, target_path: &str, language: &str)
    -> Result<usize, RepoError>;

    /// Move the resource at `path` to `position` among its siblings.
    ///
    /// Positions past the end place the resource last.
    ///
    /// # Errors
    ///
    /// - [`RepoError::InvalidArgument`] if `position` is negative
    /// - [`RepoError::NotFound`] if nothing exists at `path`
    fn reorder(&self, path: &str, position: i64) -> Result<(), RepoError>;

    /// Remove everything. Not supported by default.
    fn clear(&self) -> Result<(), RepoError> {
        Err(RepoError::NotSupported { operation: "clear" })
    }
}
