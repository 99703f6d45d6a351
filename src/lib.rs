//! # cmf-resource
//!
//! Path-addressed **resource repositories** over content-repository backends.
//!
//! A repository exposes a tree of resources through a filesystem-like API:
//! fetch by absolute path, list children, or match with a single-level glob
//! query such as `/cms/*/routes`. Repositories over different backends can be
//! mounted into one [`CompositeRepository`], and any resource can be turned
//! into a [`Description`] by a chain of enhancers.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use cmf_resource::{
//!     BackendRepository, CompositeRepository, EditableRepositoryExt, MemoryBackend,
//!     RepositoryExt, ResourceRepository,
//! };
//!
//! let backend = MemoryBackend::new();
//! backend.insert("/cms/pages/home", Some("app:page"))?;
//! backend.insert("/cms/pages/about", Some("app:page"))?;
//! backend.insert("/cms/archive", None)?;
//!
//! let pages = BackendRepository::new(backend);
//! assert_eq!(pages.find_glob("/cms/pages/*")?.len(), 2);
//!
//! pages.move_glob("/cms/pages/about", "/cms/archive/about")?;
//! assert!(pages.exists("/cms/archive/about")?);
//!
//! let site = CompositeRepository::new();
//! site.mount("/content", pages)?;
//! let home = site.get("/content/cms/pages/home")?;
//! assert_eq!(home.repository_path(), "/cms/pages/home");
//! # Ok::<(), cmf_resource::RepoError>(())
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`ResourceRepository`] | Read access: `get`, `find`, `list_children` |
//! | [`EditableRepository`] | Write access: `add`, `remove`, `move_to`, `reorder` |
//! | [`BackendRepository`] | Repository over one backend, optionally under a base path |
//! | [`CompositeRepository`] | Mount table routing paths to repositories |
//! | [`Resource`] | Path + opaque payload + payload type |
//! | [`PathResolver`] | Canonicalizes and rebases paths |
//! | [`TraversalFinder`] | Walks backend nodes for a glob selector |
//! | [`Description`] | Descriptor bag of one resource |
//! | [`RepositoryRegistry`] | Repositories by name |
//! | [`RepoError`] | Error type with path / query context |
//!
//! ---
//!
//! ## Writing a Backend
//!
//! Backends implement [`NodeAccessor`] (and [`NodeMutator`] for writes) over
//! their own node handle type. [`BackendRepository`] turns that into a full
//! repository. [`MemoryBackend`] is a complete reference implementation.
//!
//! ```text
//! NodeAccessor ──▶ BackendRepository<B> ──▶ ResourceRepository
//! NodeMutator  ──▶ BackendRepository<B> ──▶ EditableRepository
//! ```
//!
//! ---
//!
//! ## Query Language
//!
//! Only `glob` ([`GLOB`]) is supported. Each `/`-separated component is
//! either an exact name or a pattern using `*`, `?` or `[...]` that matches
//! exactly one path segment. Recursive `**` is rejected.
//!
//! ---
//!
//! ## Error Handling
//!
//! All operations return `Result<T, RepoError>`:
//!
//! ```rust
//! use cmf_resource::RepoError;
//!
//! let err = RepoError::NotFound { path: "/cms/missing".into() };
//! assert_eq!(err.to_string(), "resource not found: /cms/missing");
//! ```
//!
//! Zero matches from `find`, `remove` or `move_to` is an empty result, never
//! an error. Backend failures during batch writes are wrapped in
//! [`RepoError::Repository`] together with the query.
//!
//! ---
//!
//! ## Logging
//!
//! Operations emit `tracing` events at `debug` level (traversal at `trace`).
//! The crate never installs a subscriber.
//!
//! ---
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync` and take `&self`. Mount tables and the
//! in-memory backend use `parking_lot` locks internally.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Serialization for [`ResourceMetadata`], [`RepositoryOptions`], [`Description`], [`DescriptorValue`], [`MountInfo`]; JSON conversion of descriptors |

// Private modules
mod composite;
mod description;
mod error;
mod ext;
mod finder;
mod memory;
mod path_resolver;
mod registry;
mod repository;
mod traits;
mod types;

pub mod selector;

// Public re-exports - error types
pub use error::RepoError;

// Public re-exports - core types
pub use types::{GLOB, Payload, Resource, ResourceMetadata};

// Public re-exports - traits
pub use traits::{EditableRepository, NodeAccessor, NodeMutator, ResourceRepository};

// Public re-exports - paths and traversal
pub use finder::TraversalFinder;
pub use path_resolver::{PathResolver, UnresolveMode, canonicalize, sanitize};

// Public re-exports - repositories
pub use composite::{CompositeRepository, MountInfo};
pub use memory::{MemoryBackend, MemoryNode};
pub use registry::RepositoryRegistry;
pub use repository::{BackendRepository, RepositoryOptions};

// Public re-exports - descriptions
pub use description::{
    ChildrenTypesEnhancer, Description, DescriptionEnhancer, DescriptionFactory, DescriptorValue,
    descriptor,
};

// Public re-exports - infrastructure
pub use ext::{EditableRepositoryExt, RepositoryExt};
