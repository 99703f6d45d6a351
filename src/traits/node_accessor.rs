//! Read access to backend nodes.

use crate::{Payload, RepoError, ResourceMetadata};

/// Read-only view of a content-repository backend.
///
/// Paths passed to and returned by the accessor are native backend paths
/// (already rebased onto the repository base path).
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`. Methods take `&self`; backends
/// that hold a session use interior mutability. Whether one session may be
/// shared across concurrent traversals is the backend's decision.
///
/// # Example
///
/// ```rust
/// use cmf_resource::{NodeAccessor, RepoError};
///
/// fn describe<B: NodeAccessor>(backend: &B, path: &str) -> Result<Vec<String>, RepoError> {
///     let Some(node) = backend.node_at(path)? else {
///         return Ok(Vec::new());
///     };
///     Ok(backend
///         .children(&node)?
///         .iter()
///         .map(|child| backend.name(child))
///         .collect())
/// }
/// ```
pub trait NodeAccessor: Send + Sync {
    /// Backend-native node handle.
    type Node: Clone + Send + Sync + 'static;

    /// Fetch the node at an exact native path.
    ///
    /// Returns `Ok(None)` when nothing exists there. Errors are reserved for
    /// backend failures.
    fn node_at(&self, path: &str) -> Result<Option<Self::Node>, RepoError>;

    /// Direct children of `node`, in backend order.
    fn children(&self, node: &Self::Node) -> Result<Vec<Self::Node>, RepoError>;

    /// Name of `node` (last path segment; empty for the root).
    fn name(&self, node: &Self::Node) -> String;

    /// Native absolute path of `node`.
    fn path(&self, node: &Self::Node) -> String;

    /// The object handed to callers as the resource payload.
    fn payload(&self, node: &Self::Node) -> Payload;

    /// Type of the payload (node type, document class), if known.
    fn payload_type(&self, node: &Self::Node) -> Option<String>;

    /// Creation and modification times.
    ///
    /// Defaults to `UNIX_EPOCH` for backends that do not track them.
    fn metadata(&self, _node: &Self::Node) -> ResourceMetadata {
        ResourceMetadata::default()
    }
}
