//! In-memory content-repository backend.
//!
//! A rooted tree of named nodes with ordered children. Writes apply
//! immediately; [`flush`](crate::NodeMutator::flush) only counts commits so
//! callers can check that a repository commits once per operation.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::SystemTime;

use parking_lot::RwLock;

use crate::path_resolver::{is_within, join, parent_path, sanitize};
use crate::{NodeAccessor, NodeMutator, Payload, RepoError, ResourceMetadata};

/// Handle to a node of a [`MemoryBackend`].
///
/// Handles are plain paths; a handle outlives the node it names, and
/// lookups through a stale handle report the node as missing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemoryNode {
    path: String,
}

impl MemoryNode {
    /// Native path of the node.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }
}

struct Entry {
    payload: Option<Payload>,
    payload_type: Option<String>,
    metadata: ResourceMetadata,
    children: Vec<String>,
}

impl Entry {
    fn new(payload_type: Option<String>, payload: Option<Payload>) -> Self {
        let now = SystemTime::now();
        Self {
            payload,
            payload_type,
            metadata: ResourceMetadata {
                created: now,
                modified: now,
            },
            children: Vec::new(),
        }
    }
}

/// Thread-safe in-memory backend.
///
/// # Example
///
/// ```rust
/// use cmf_resource::{MemoryBackend, NodeAccessor};
///
/// let backend = MemoryBackend::new();
/// backend.insert("/cmf/pages/home", Some("app:page"))?;
///
/// let pages = backend.node_at("/cmf/pages")?.expect("created as ancestor");
/// let names: Vec<_> = backend.children(&pages)?.iter().map(|n| backend.name(n)).collect();
/// assert_eq!(names, ["home"]);
/// # Ok::<(), cmf_resource::RepoError>(())
/// ```
pub struct MemoryBackend {
    nodes: RwLock<HashMap<String, Entry>>,
    flushes: AtomicUsize,
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("nodes", &self.nodes.read().len())
            .field("flushes", &self.flush_count())
            .finish()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Create a backend holding only the root node.
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert("/".to_string(), Entry::new(None, None));
        Self {
            nodes: RwLock::new(nodes),
            flushes: AtomicUsize::new(0),
        }
    }

    /// Insert a node, creating missing ancestors without a payload type.
    ///
    /// # Errors
    ///
    /// - [`RepoError::InvalidPath`] if `path` is not absolute
    /// - [`RepoError::AlreadyExists`] if the node exists
    pub fn insert(&self, path: &str, payload_type: Option<&str>) -> Result<MemoryNode, RepoError> {
        self.insert_entry(path, Entry::new(payload_type.map(str::to_string), None))
    }

    /// Like [`insert`](Self::insert), storing `payload` as the node payload.
    pub fn insert_with_payload(
        &self,
        path: &str,
        payload_type: Option<&str>,
        payload: Payload,
    ) -> Result<MemoryNode, RepoError> {
        self.insert_entry(
            path,
            Entry::new(payload_type.map(str::to_string), Some(payload)),
        )
    }

    /// Number of nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.read().len()
    }

    /// How many times [`flush`](NodeMutator::flush) has been called.
    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    fn insert_entry(&self, path: &str, entry: Entry) -> Result<MemoryNode, RepoError> {
        let path = sanitize(path)?;
        let mut nodes = self.nodes.write();

        if nodes.contains_key(&path) {
            return Err(RepoError::AlreadyExists {
                path,
                operation: "insert",
            });
        }

        // Walk down from the root, creating what is missing.
        let mut current = "/".to_string();
        for name in path.split('/').filter(|s| !s.is_empty()) {
            let next = join(&current, name);
            if !nodes.contains_key(&next) {
                if let Some(parent) = nodes.get_mut(&current) {
                    parent.children.push(name.to_string());
                }
                nodes.insert(next.clone(), Entry::new(None, None));
            }
            current = next;
        }
        // Replaces the ancestor-style entry created for the leaf above.
        nodes.insert(path.clone(), entry);

        Ok(MemoryNode { path })
    }

    fn missing(path: &str) -> RepoError {
        RepoError::NotFound {
            path: path.to_string(),
        }
    }
}

impl NodeAccessor for MemoryBackend {
    type Node = MemoryNode;

    fn node_at(&self, path: &str) -> Result<Option<MemoryNode>, RepoError> {
        Ok(self.nodes.read().contains_key(path).then(|| MemoryNode {
            path: path.to_string(),
        }))
    }

    fn children(&self, node: &MemoryNode) -> Result<Vec<MemoryNode>, RepoError> {
        let nodes = self.nodes.read();
        let entry = nodes.get(&node.path).ok_or_else(|| Self::missing(&node.path))?;
        Ok(entry
            .children
            .iter()
            .map(|name| MemoryNode {
                path: join(&node.path, name),
            })
            .collect())
    }

    fn name(&self, node: &MemoryNode) -> String {
        node.path.rsplit('/').next().unwrap_or_default().to_string()
    }

    fn path(&self, node: &MemoryNode) -> String {
        node.path.clone()
    }

    fn payload(&self, node: &MemoryNode) -> Payload {
        self.nodes
            .read()
            .get(&node.path)
            .and_then(|entry| entry.payload.clone())
            .unwrap_or_else(|| Arc::new(node.clone()))
    }

    fn payload_type(&self, node: &MemoryNode) -> Option<String> {
        self.nodes
            .read()
            .get(&node.path)
            .and_then(|entry| entry.payload_type.clone())
    }

    fn metadata(&self, node: &MemoryNode) -> ResourceMetadata {
        self.nodes
            .read()
            .get(&node.path)
            .map(|entry| entry.metadata)
            .unwrap_or_default()
    }
}

impl NodeMutator for MemoryBackend {
    fn create_child(
        &self,
        parent: &MemoryNode,
        name: &str,
        payload_type: &str,
        payload: Option<Payload>,
    ) -> Result<MemoryNode, RepoError> {
        if name.is_empty() || name.contains('/') || name == "." || name == ".." {
            return Err(RepoError::InvalidArgument {
                operation: "create_child",
                details: format!("invalid node name \"{name}\""),
            });
        }

        let mut nodes = self.nodes.write();
        let path = join(&parent.path, name);
        if nodes.contains_key(&path) {
            return Err(RepoError::AlreadyExists {
                path,
                operation: "create_child",
            });
        }
        let parent_entry = nodes
            .get_mut(&parent.path)
            .ok_or_else(|| Self::missing(&parent.path))?;
        parent_entry.children.push(name.to_string());
        nodes.insert(
            path.clone(),
            Entry::new(Some(payload_type.to_string()), payload),
        );

        Ok(MemoryNode { path })
    }

    fn remove_node(&self, node: &MemoryNode) -> Result<(), RepoError> {
        let Some(parent) = parent_path(&node.path) else {
            return Err(RepoError::NotSupported {
                operation: "remove root node",
            });
        };

        let mut nodes = self.nodes.write();
        if !nodes.contains_key(&node.path) {
            return Err(Self::missing(&node.path));
        }
        nodes.retain(|path, _| !is_within(&node.path, path));
        let name = self.name(node);
        if let Some(parent) = nodes.get_mut(parent) {
            parent.children.retain(|child| *child != name);
        }
        Ok(())
    }

    fn move_node(&self, node: &MemoryNode, target_path: &str) -> Result<(), RepoError> {
        let target = sanitize(target_path)?;
        let (Some(old_parent), Some(new_parent)) = (parent_path(&node.path), parent_path(&target))
        else {
            return Err(RepoError::InvalidArgument {
                operation: "move_node",
                details: "the root node cannot be moved or replaced".into(),
            });
        };
        if is_within(&node.path, &target) {
            return Err(RepoError::InvalidArgument {
                operation: "move_node",
                details: format!("cannot move \"{}\" into itself", node.path),
            });
        }

        let mut nodes = self.nodes.write();
        if !nodes.contains_key(&node.path) {
            return Err(Self::missing(&node.path));
        }
        if !nodes.contains_key(new_parent) {
            return Err(Self::missing(new_parent));
        }
        if nodes.contains_key(&target) {
            return Err(RepoError::AlreadyExists {
                path: target,
                operation: "move_node",
            });
        }

        let moved: Vec<String> = nodes
            .keys()
            .filter(|path| is_within(&node.path, path))
            .cloned()
            .collect();
        for old in moved {
            if let Some(entry) = nodes.remove(&old) {
                let new = format!("{target}{}", &old[node.path.len()..]);
                nodes.insert(new, entry);
            }
        }

        let old_name = self.name(node);
        if let Some(entry) = nodes.get_mut(old_parent) {
            entry.children.retain(|child| *child != old_name);
        }
        let new_name = target.rsplit('/').next().unwrap_or_default().to_string();
        if let Some(entry) = nodes.get_mut(new_parent) {
            entry.children.push(new_name);
        }
        Ok(())
    }

    fn reorder_before(&self, parent: &MemoryNode, name: &str, sibling: &str) -> Result<(), RepoError> {
        if name == sibling {
            return Ok(());
        }

        let mut nodes = self.nodes.write();
        let entry = nodes
            .get_mut(&parent.path)
            .ok_or_else(|| Self::missing(&parent.path))?;

        let Some(from) = entry.children.iter().position(|c| c == name) else {
            return Err(Self::missing(&join(&parent.path, name)));
        };
        let moving = entry.children.remove(from);
        let Some(to) = entry.children.iter().position(|c| c == sibling) else {
            entry.children.insert(from, moving);
            return Err(Self::missing(&join(&parent.path, sibling)));
        };
        entry.children.insert(to, moving);
        Ok(())
    }

    fn flush(&self) -> Result<(), RepoError> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child_names(backend: &MemoryBackend, path: &str) -> Vec<String> {
        let node = backend.node_at(path).unwrap().unwrap();
        backend
            .children(&node)
            .unwrap()
            .iter()
            .map(|n| backend.name(n))
            .collect()
    }

    #[test]
    fn new_backend_has_root() {
        let backend = MemoryBackend::new();
        assert!(backend.node_at("/").unwrap().is_some());
        assert_eq!(backend.node_count(), 1);
    }

    #[test]
    fn insert_creates_ancestors() {
        let backend = MemoryBackend::new();
        backend.insert("/a/b/c", Some("nt:unstructured")).unwrap();
        assert!(backend.node_at("/a").unwrap().is_some());
        assert!(backend.node_at("/a/b").unwrap().is_some());
        assert_eq!(child_names(&backend, "/a/b"), ["c"]);

        let c = backend.node_at("/a/b/c").unwrap().unwrap();
        assert_eq!(backend.payload_type(&c).as_deref(), Some("nt:unstructured"));
        let b = backend.node_at("/a/b").unwrap().unwrap();
        assert_eq!(backend.payload_type(&b), None);
    }

    #[test]
    fn insert_twice_fails() {
        let backend = MemoryBackend::new();
        backend.insert("/a", None).unwrap();
        assert!(matches!(
            backend.insert("/a", None),
            Err(RepoError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn children_keep_insertion_order() {
        let backend = MemoryBackend::new();
        for name in ["/z", "/a", "/m"] {
            backend.insert(name, None).unwrap();
        }
        assert_eq!(child_names(&backend, "/"), ["z", "a", "m"]);
    }

    #[test]
    fn payload_defaults_to_node_handle() {
        let backend = MemoryBackend::new();
        let node = backend.insert("/a", None).unwrap();
        let payload = backend.payload(&node);
        assert_eq!(payload.downcast_ref::<MemoryNode>(), Some(&node));

        let node = backend
            .insert_with_payload("/b", Some("app:doc"), Arc::new(5_u8))
            .unwrap();
        assert_eq!(backend.payload(&node).downcast_ref::<u8>(), Some(&5));
    }

    #[test]
    fn create_child_appends() {
        let backend = MemoryBackend::new();
        let parent = backend.insert("/p", None).unwrap();
        backend.insert("/p/first", None).unwrap();
        let child = backend.create_child(&parent, "second", "app:page", None).unwrap();
        assert_eq!(child.path(), "/p/second");
        assert_eq!(child_names(&backend, "/p"), ["first", "second"]);
        assert!(matches!(
            backend.create_child(&parent, "second", "app:page", None),
            Err(RepoError::AlreadyExists { .. })
        ));
        assert!(backend.create_child(&parent, "a/b", "t", None).is_err());
    }

    #[test]
    fn remove_drops_subtree() {
        let backend = MemoryBackend::new();
        backend.insert("/a/b/c", None).unwrap();
        backend.insert("/a/d", None).unwrap();
        let b = backend.node_at("/a/b").unwrap().unwrap();
        backend.remove_node(&b).unwrap();

        assert!(backend.node_at("/a/b").unwrap().is_none());
        assert!(backend.node_at("/a/b/c").unwrap().is_none());
        assert_eq!(child_names(&backend, "/a"), ["d"]);
    }

    #[test]
    fn root_cannot_be_removed() {
        let backend = MemoryBackend::new();
        let root = backend.node_at("/").unwrap().unwrap();
        assert!(backend.remove_node(&root).is_err());
    }

    #[test]
    fn move_rekeys_subtree() {
        let backend = MemoryBackend::new();
        backend.insert("/test/path1/leaf", None).unwrap();
        backend.insert("/foo", None).unwrap();
        let node = backend.node_at("/test/path1").unwrap().unwrap();
        backend.move_node(&node, "/foo/bar").unwrap();

        assert!(backend.node_at("/test/path1").unwrap().is_none());
        assert!(backend.node_at("/foo/bar").unwrap().is_some());
        assert!(backend.node_at("/foo/bar/leaf").unwrap().is_some());
        assert_eq!(child_names(&backend, "/foo"), ["bar"]);
        assert!(child_names(&backend, "/test").is_empty());
    }

    #[test]
    fn move_requires_target_parent() {
        let backend = MemoryBackend::new();
        let node = backend.insert("/a", None).unwrap();
        assert!(matches!(
            backend.move_node(&node, "/missing/a"),
            Err(RepoError::NotFound { .. })
        ));
    }

    #[test]
    fn move_into_itself_fails() {
        let backend = MemoryBackend::new();
        let node = backend.insert("/a", None).unwrap();
        assert!(matches!(
            backend.move_node(&node, "/a/b"),
            Err(RepoError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn reorder_before_sibling() {
        let backend = MemoryBackend::new();
        let parent = backend.insert("/test", None).unwrap();
        for name in ["node-1", "node-2", "node-3"] {
            backend.insert(&format!("/test/{name}"), None).unwrap();
        }
        backend.reorder_before(&parent, "node-1", "node-3").unwrap();
        assert_eq!(child_names(&backend, "/test"), ["node-2", "node-1", "node-3"]);

        backend.reorder_last(&parent, "node-2", "node-3").unwrap();
        assert_eq!(child_names(&backend, "/test"), ["node-1", "node-3", "node-2"]);
    }

    #[test]
    fn reorder_unknown_sibling_leaves_order() {
        let backend = MemoryBackend::new();
        let parent = backend.insert("/test", None).unwrap();
        backend.insert("/test/a", None).unwrap();
        backend.insert("/test/b", None).unwrap();
        assert!(backend.reorder_before(&parent, "b", "zzz").is_err());
        assert_eq!(child_names(&backend, "/test"), ["a", "b"]);
    }

    #[test]
    fn flush_is_counted() {
        let backend = MemoryBackend::new();
        backend.flush().unwrap();
        backend.flush().unwrap();
        assert_eq!(backend.flush_count(), 2);
    }

    #[test]
    fn backend_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MemoryBackend>();
        assert_send_sync::<MemoryNode>();
    }
}
