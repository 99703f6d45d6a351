//! Read operations of a resource repository.

use crate::{RepoError, Resource};

/// Uniform, filesystem-like access to resources by path and glob query.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` so that repositories can be
/// mounted into a [`CompositeRepository`](crate::CompositeRepository) and
/// shared behind an `Arc`.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn ResourceRepository`.
pub trait ResourceRepository: Send + Sync {
    /// Fetch the resource at an exact path.
    ///
    /// # Errors
    ///
    /// - [`RepoError::InvalidPath`] if the path is empty or relative
    /// - [`RepoError::NotFound`] if nothing exists at the path
    fn get(&self, path: &str) -> Result<Resource, RepoError>;

    /// All resources matching `query`.
    ///
    /// Zero matches is an empty result, not an error.
    ///
    /// # Errors
    ///
    /// - [`RepoError::UnsupportedLanguage`] if `language` is not `glob`
    /// - [`RepoError::InvalidPath`] / [`RepoError::InvalidQuery`] for malformed queries
    fn find(&self, query: &str, language: &str) -> Result<Vec<Resource>, RepoError>;

    /// Direct children of the resource at `path`.
    ///
    /// # Errors
    ///
    /// - [`RepoError::NotFound`] if nothing exists at the path
    fn list_children(&self, path: &str) -> Result<Vec<Resource>, RepoError>;

    /// `true` if the resource at `path` has at least one child.
    ///
    /// The default materializes the full child list.
    fn has_children(&self, path: &str) -> Result<bool, RepoError> {
        Ok(!self.list_children(path)?.is_empty())
    }

    /// `true` if `query` matches at least one resource.
    fn contains(&self, query: &str, language: &str) -> Result<bool, RepoError> {
        Ok(!self.find(query, language)?.is_empty())
    }
}
