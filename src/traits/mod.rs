//! # Repository Traits
//!
//! Two sides meet here: backends implement the node capability traits,
//! repositories implement the resource traits on top of them.
//!
//! ```text
//! Backend side:     NodeAccessor ──▶ NodeMutator
//!                        │               │
//!                        ▼               ▼
//! Repository side:  ResourceRepository ──▶ EditableRepository
//! ```
//!
//! ## Quick Reference
//!
//! | Trait | Implemented by | Methods |
//! |-------|----------------|---------|
//! | [`NodeAccessor`] | backends | `node_at`, `children`, `name`, `path`, `payload`, `payload_type` |
//! | [`NodeMutator`] | writable backends | `create_child`, `remove_node`, `move_node`, `reorder_before`, `flush` |
//! | [`ResourceRepository`] | repositories | `get`, `find`, `list_children`, `has_children`, `contains` |
//! | [`EditableRepository`] | writable repositories | `add`, `remove`, `move_to`, `reorder`, `clear` |
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync` and take `&self`.

mod editable;
mod node_accessor;
mod node_mutator;
mod repository;

// Backend capabilities
pub use node_accessor::NodeAccessor;
pub use node_mutator::NodeMutator;

// Repository interface
pub use editable::EditableRepository;
pub use repository::ResourceRepository;
