//! Write access to backend nodes.

use super::NodeAccessor;
use crate::{Payload, RepoError};

/// Mutating operations of a content-repository backend.
///
/// Changes may be staged until [`flush`](Self::flush). Repositories call
/// `flush` exactly once per public mutating operation, after every item
/// has been handed to the backend.
pub trait NodeMutator: NodeAccessor {
    /// Create a child named `name` under `parent`.
    ///
    /// # Errors
    ///
    /// - [`RepoError::AlreadyExists`] if `parent` already has such a child
    fn create_child(
        &self,
        parent: &Self::Node,
        name: &str,
        payload_type: &str,
        payload: Option<Payload>,
    ) -> Result<Self::Node, RepoError>;

    /// Remove `node` and its subtree.
    fn remove_node(&self, node: &Self::Node) -> Result<(), RepoError>;

    /// Move `node` (with its subtree) so that it lives at `target_path`.
    fn move_node(&self, node: &Self::Node, target_path: &str) -> Result<(), RepoError>;

    /// Place child `name` of `parent` immediately before child `sibling`.
    fn reorder_before(&self, parent: &Self::Node, name: &str, sibling: &str)
    -> Result<(), RepoError>;

    /// Place child `name` of `parent` after the current last child `last`.
    ///
    /// The default moves `name` before `last`, then `last` before `name`.
    /// Backends with a direct "order after" primitive should override this.
    fn reorder_last(&self, parent: &Self::Node, name: &str, last: &str) -> Result<(), RepoError> {
        self.reorder_before(parent, name, last)?;
        self.reorder_before(parent, last, name)
    }

    /// Commit all staged changes.
    fn flush(&self) -> Result<(), RepoError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    impl NodeAccessor for Recorder {
        type Node = String;

        fn node_at(&self, path: &str) -> Result<Option<String>, RepoError> {
            Ok(Some(path.to_string()))
        }

        fn children(&self, _node: &String) -> Result<Vec<String>, RepoError> {
            Ok(vec![])
        }

        fn name(&self, node: &String) -> String {
            node.rsplit('/').next().unwrap_or_default().to_string()
        }

        fn path(&self, node: &String) -> String {
            node.clone()
        }

        fn payload(&self, node: &String) -> Payload {
            Arc::new(node.clone())
        }

        fn payload_type(&self, _node: &String) -> Option<String> {
            None
        }
    }

    impl NodeMutator for Recorder {
        fn create_child(
            &self,
            parent: &String,
            name: &str,
            _payload_type: &str,
            _payload: Option<Payload>,
        ) -> Result<String, RepoError> {
            Ok(format!("{parent}/{name}"))
        }

        fn remove_node(&self, _node: &String) -> Result<(), RepoError> {
            Ok(())
        }

        fn move_node(&self, _node: &String, _target_path: &str) -> Result<(), RepoError> {
            Ok(())
        }

        fn reorder_before(&self, _parent: &String, name: &str, sibling: &str) -> Result<(), RepoError> {
            self.calls.lock().push(format!("{name}<{sibling}"));
            Ok(())
        }

        fn flush(&self) -> Result<(), RepoError> {
            Ok(())
        }
    }

    #[test]
    fn reorder_last_is_two_step() {
        let backend = Recorder::default();
        let parent = "/test".to_string();
        backend.reorder_last(&parent, "node-1", "node-3").unwrap();
        assert_eq!(*backend.calls.lock(), ["node-1<node-3", "node-3<node-1"]);
    }
}
