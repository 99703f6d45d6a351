//! # Backend Repository
//!
//! [`BackendRepository`] exposes one content-repository backend as a
//! [`ResourceRepository`], optionally rooted at a base path.
//!
//! ## Path Flow
//!
//! ```text
//! caller path ──resolve──▶ native path ──backend──▶ node
//!                                                    │
//! Resource.path ◀──unresolve── backend.path(node) ◀──┘
//! ```
//!
//! Mutating operations hand every item to the backend and then call
//! [`NodeMutator::flush`] exactly once.

use tracing::debug;

use crate::finder::TraversalFinder;
use crate::path_resolver::{join, parent_path, sanitize};
use crate::selector;
use crate::{
    EditableRepository, GLOB, NodeAccessor, NodeMutator, PathResolver, RepoError, Resource,
    ResourceRepository, UnresolveMode,
};

/// Configuration of a [`BackendRepository`].
///
/// # Example
///
/// ```rust
/// use cmf_resource::{BackendRepository, MemoryBackend, RepositoryOptions, ResourceRepository};
///
/// let backend = MemoryBackend::new();
/// backend.insert("/cms/content/about", Some("app:page"))?;
///
/// let options = RepositoryOptions {
///     base_path: Some("/cms/content".into()),
///     ..Default::default()
/// };
/// let repo = BackendRepository::with_options(backend, options)?;
/// assert_eq!(repo.get("/about")?.path(), "/about");
/// # Ok::<(), cmf_resource::RepoError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RepositoryOptions {
    /// Native path that logical `/` maps to. `None` or `/` maps 1:1.
    pub base_path: Option<String>,
    /// How native paths are mapped back to logical paths.
    pub unresolve: UnresolveMode,
}

/// A resource repository over a single backend.
#[derive(Debug)]
pub struct BackendRepository<B> {
    backend: B,
    resolver: PathResolver,
}

impl<B: NodeAccessor> BackendRepository<B> {
    /// Wrap `backend` without a base path.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            resolver: PathResolver::default(),
        }
    }

    /// Wrap `backend` with explicit options.
    ///
    /// # Errors
    ///
    /// - [`RepoError::InvalidPath`] if the base path is empty or relative
    pub fn with_options(backend: B, options: RepositoryOptions) -> Result<Self, RepoError> {
        let resolver =
            PathResolver::new(options.base_path.as_deref())?.with_mode(options.unresolve);
        Ok(Self { backend, resolver })
    }

    /// The wrapped backend.
    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The path resolver in use.
    #[inline]
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    fn to_resource(&self, node: &B::Node) -> Result<Resource, RepoError> {
        let path = self.resolver.unresolve(&self.backend.path(node))?;
        Ok(Resource::new(path)
            .with_payload(self.backend.payload(node), self.backend.payload_type(node))
            .with_metadata(self.backend.metadata(node)))
    }

    fn require_node(&self, native: &str) -> Result<B::Node, RepoError> {
        self.backend
            .node_at(native)?
            .ok_or_else(|| RepoError::NotFound {
                path: native.to_string(),
            })
    }

    fn find_nodes(&self, query: &str, language: &str) -> Result<Vec<B::Node>, RepoError> {
        if language != GLOB {
            return Err(RepoError::UnsupportedLanguage {
                language: language.to_string(),
            });
        }
        let native = self.resolver.resolve(query)?;
        TraversalFinder::new(&self.backend).find(&native)
    }
}

impl<B: NodeAccessor> ResourceRepository for BackendRepository<B> {
    fn get(&self, path: &str) -> Result<Resource, RepoError> {
        let native = self.resolver.resolve(path)?;
        debug!(path, native = %native, "get");
        let node = self.require_node(&native)?;
        self.to_resource(&node)
    }

    fn find(&self, query: &str, language: &str) -> Result<Vec<Resource>, RepoError> {
        let nodes = self.find_nodes(query, language)?;
        debug!(query, count = nodes.len(), "find");
        nodes.iter().map(|node| self.to_resource(node)).collect()
    }

    fn list_children(&self, path: &str) -> Result<Vec<Resource>, RepoError> {
        let native = self.resolver.resolve(path)?;
        let node = self.require_node(&native)?;
        let children = self.backend.children(&node)?;
        debug!(path, count = children.len(), "list children");
        children.iter().map(|child| self.to_resource(child)).collect()
    }
}

impl<B: NodeMutator> EditableRepository for BackendRepository<B> {
    fn add(&self, path: &str, resources: &[Resource]) -> Result<(), RepoError> {
        if sanitize(path)? == "/" {
            return Err(RepoError::InvalidArgument {
                operation: "add",
                details: "resources cannot be added at the root path".into(),
            });
        }
        let native = self.resolver.resolve(path)?;
        let Some(parent) = self.backend.node_at(&native)? else {
            return Err(RepoError::InvalidArgument {
                operation: "add",
                details: format!("the parent node \"{native}\" does not exist"),
            });
        };

        for resource in resources {
            if resource.name().is_empty() {
                return Err(RepoError::InvalidArgument {
                    operation: "add",
                    details: format!("resource \"{}\" has no name", resource.path()),
                });
            }
            let Some(payload_type) = resource.payload_type() else {
                return Err(RepoError::InvalidArgument {
                    operation: "add",
                    details: format!("resource \"{}\" has no payload type", resource.path()),
                });
            };
            self.backend.create_child(
                &parent,
                resource.name(),
                payload_type,
                resource.payload().cloned(),
            )?;
        }

        self.backend.flush()?;
        debug!(path, count = resources.len(), "added resources");
        Ok(())
    }

    fn remove(&self, query: &str, language: &str) -> Result<usize, RepoError> {
        let nodes = self.find_nodes(query, language)?;
        if nodes.is_empty() {
            return Ok(0);
        }

        for node in &nodes {
            self.backend
                .remove_node(node)
                .map_err(|e| RepoError::batch("removing", query, e))?;
        }
        self.backend
            .flush()
            .map_err(|e| RepoError::batch("removing", query, e))?;

        debug!(query, count = nodes.len(), "removed resources");
        Ok(nodes.len())
    }

    fn move_to(
        &self,
        query: &str,
        target_path: &str,
        language: &str,
    ) -> Result<usize, RepoError> {
        let nodes = self.find_nodes(query, language)?;
        let Some(first) = nodes.first() else {
            return Ok(0);
        };
        let target = self.resolver.resolve(target_path)?;

        let moved = if selector::is_globbed(query) {
            nodes.iter().try_for_each(|node| {
                let destination = join(&target, &self.backend.name(node));
                self.backend.move_node(node, &destination)
            })
        } else {
            self.backend.move_node(first, &target)
        };
        moved.map_err(|e| RepoError::batch("moving", query, e))?;
        self.backend
            .flush()
            .map_err(|e| RepoError::batch("moving", query, e))?;

        debug!(query, destination = %target, count = nodes.len(), "moved resources");
        Ok(nodes.len())
    }

    fn reorder(&self, path: &str, position: i64) -> Result<(), RepoError> {
        let Ok(position) = usize::try_from(position) else {
            return Err(RepoError::InvalidArgument {
                operation: "reorder",
                details: format!("position must be 0 or greater, got {position}"),
            });
        };

        let native = self.resolver.resolve(path)?;
        let node = self.require_node(&native)?;
        let Some(parent_native) = parent_path(&native) else {
            return Err(RepoError::InvalidArgument {
                operation: "reorder",
                details: "the root node has no siblings".into(),
            });
        };
        let parent = self.require_node(parent_native)?;
        let name = self.backend.name(&node);
        let siblings: Vec<String> = self
            .backend
            .children(&parent)?
            .iter()
            .map(|child| self.backend.name(child))
            .collect();

        let next = position.checked_add(1).and_then(|idx| siblings.get(idx));
        match (position, next, siblings.first(), siblings.last()) {
            (0, _, Some(first), _) if *first != name => {
                self.backend.reorder_before(&parent, &name, first)?;
            }
            (0, ..) => {}
            (_, Some(next), ..) => self.backend.reorder_before(&parent, &name, next)?,
            (_, None, _, Some(last)) if *last != name => {
                self.backend.reorder_last(&parent, &name, last)?;
            }
            _ => {}
        }
        self.backend.flush()?;

        debug!(path, position, "reordered resource");
        Ok(())
    }
}
