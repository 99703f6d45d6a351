//! Named repositories.
//!
//! Applications usually configure several repositories (one per backend or
//! site) and look them up by name. The registry also remembers a type tag per
//! repository, e.g. `phpcr` or `memory`, so consumers can pick enhancers or
//! editors per kind.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::debug;

use crate::{RepoError, ResourceRepository};

struct Entry {
    kind: String,
    repository: Arc<dyn ResourceRepository>,
}

#[derive(Default)]
struct Inner {
    entries: IndexMap<String, Entry>,
    default: Option<String>,
}

/// Repositories registered under unique names.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use cmf_resource::{BackendRepository, MemoryBackend, RepositoryRegistry};
///
/// let registry = RepositoryRegistry::new();
/// let content = Arc::new(BackendRepository::new(MemoryBackend::new()));
/// registry.register("content", "memory", content.clone());
///
/// let found = registry.get(Some("content"))?;
/// assert_eq!(registry.kind_of(&found)?, "memory");
/// assert!(registry.get(Some("missing")).is_err());
/// # Ok::<(), cmf_resource::RepoError>(())
/// ```
#[derive(Default)]
pub struct RepositoryRegistry {
    inner: RwLock<Inner>,
}

impl std::fmt::Debug for RepositoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("RepositoryRegistry")
            .field("names", &inner.entries.keys().collect::<Vec<_>>())
            .field("default", &inner.default)
            .finish()
    }
}

impl RepositoryRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `repository` as `name`, replacing any previous registration.
    pub fn register(
        &self,
        name: impl Into<String>,
        kind: impl Into<String>,
        repository: Arc<dyn ResourceRepository>,
    ) {
        let name = name.into();
        let kind = kind.into();
        debug!(name = %name, kind = %kind, "registering repository");
        self.inner
            .write()
            .entries
            .insert(name, Entry { kind, repository });
    }

    /// Make `name` the repository returned by `get(None)`.
    ///
    /// # Errors
    ///
    /// - [`RepoError::UnknownRepository`] if `name` is not registered
    pub fn set_default(&self, name: &str) -> Result<(), RepoError> {
        let mut inner = self.inner.write();
        if !inner.entries.contains_key(name) {
            return Err(RepoError::UnknownRepository {
                name: name.to_string(),
            });
        }
        inner.default = Some(name.to_string());
        Ok(())
    }

    /// Name of the default repository.
    ///
    /// The explicit default if one was set, else the first registered name.
    pub fn default_name(&self) -> Option<String> {
        let inner = self.inner.read();
        inner
            .default
            .clone()
            .or_else(|| inner.entries.keys().next().cloned())
    }

    /// Names of all registered repositories, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.inner.read().entries.keys().cloned().collect()
    }

    /// All repositories keyed by name.
    pub fn all(&self) -> IndexMap<String, Arc<dyn ResourceRepository>> {
        self.inner
            .read()
            .entries
            .iter()
            .map(|(name, entry)| (name.clone(), Arc::clone(&entry.repository)))
            .collect()
    }

    /// The repository called `name`, or the default one for `None`.
    ///
    /// # Errors
    ///
    /// - [`RepoError::UnknownRepository`] if no such repository is registered
    pub fn get(&self, name: Option<&str>) -> Result<Arc<dyn ResourceRepository>, RepoError> {
        let name = match name {
            Some(name) => name.to_string(),
            None => self.default_name().ok_or_else(|| RepoError::UnknownRepository {
                name: "default".into(),
            })?,
        };
        self.inner
            .read()
            .entries
            .get(&name)
            .map(|entry| Arc::clone(&entry.repository))
            .ok_or(RepoError::UnknownRepository { name })
    }

    /// The name `repository` is registered under.
    ///
    /// Repositories are compared by identity, not by content.
    ///
    /// # Errors
    ///
    /// - [`RepoError::InvalidArgument`] if the repository is not registered
    pub fn name_of(&self, repository: &Arc<dyn ResourceRepository>) -> Result<String, RepoError> {
        self.lookup(repository, "name_of", |name, _| name.to_string())
    }

    /// The type tag `repository` was registered with.
    ///
    /// # Errors
    ///
    /// - [`RepoError::InvalidArgument`] if the repository is not registered
    pub fn kind_of(&self, repository: &Arc<dyn ResourceRepository>) -> Result<String, RepoError> {
        self.lookup(repository, "kind_of", |_, entry| entry.kind.clone())
    }

    fn lookup(
        &self,
        repository: &Arc<dyn ResourceRepository>,
        operation: &'static str,
        pick: impl Fn(&str, &Entry) -> String,
    ) -> Result<String, RepoError> {
        self.inner
            .read()
            .entries
            .iter()
            .find(|(_, entry)| Arc::ptr_eq(&entry.repository, repository))
            .map(|(name, entry)| pick(name, entry))
            .ok_or(RepoError::InvalidArgument {
                operation,
                details: "the repository is not registered".into(),
            })
    }
}
