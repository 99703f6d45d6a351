//! Child-type descriptors from a static type map.

use indexmap::{IndexMap, IndexSet};

use super::descriptor::{CHILDREN_ALLOW, CHILDREN_TYPES};
use super::{Description, DescriptionEnhancer};
use crate::{RepoError, Resource};

#[derive(Debug, Clone, Default)]
struct TypeRules {
    leaf: bool,
    children: Vec<String>,
}

/// Describes which payload types may be created below a resource.
///
/// Each registered payload type is either a leaf or a container accepting a
/// list of child types. Allowed child types are expanded to every known
/// concrete type that is the type itself or one of its declared subtypes,
/// so `children.types` never lists an abstract parent alone.
///
/// Sets [`CHILDREN_ALLOW`] and [`CHILDREN_TYPES`] for resources whose payload
/// type is registered.
///
/// # Example
///
/// ```rust
/// use cmf_resource::{ChildrenTypesEnhancer, DescriptionFactory, DescriptorValue, Resource};
/// use cmf_resource::descriptor::{CHILDREN_ALLOW, CHILDREN_TYPES};
///
/// let enhancer = ChildrenTypesEnhancer::new()
///     .container("app:folder", ["app:content"])
///     .leaf("app:page")
///     .subtype("app:page", "app:content");
///
/// let factory = DescriptionFactory::new().with_enhancer(enhancer);
/// let folder = Resource::new("/cms").with_payload_type("app:folder");
/// let description = factory.description_for(&folder)?;
///
/// assert_eq!(description.get(CHILDREN_ALLOW)?.as_bool(), Some(true));
/// assert_eq!(description.get(CHILDREN_TYPES)?, &DescriptorValue::from(vec!["app:page"]));
/// # Ok::<(), cmf_resource::RepoError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChildrenTypesEnhancer {
    types: IndexMap<String, TypeRules>,
    supertypes: IndexMap<String, Vec<String>>,
}

impl ChildrenTypesEnhancer {
    /// An enhancer without registered types.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `payload_type` as a leaf: no children allowed.
    pub fn leaf(mut self, payload_type: impl Into<String>) -> Self {
        self.types.insert(
            payload_type.into(),
            TypeRules {
                leaf: true,
                children: Vec::new(),
            },
        );
        self
    }

    /// Register `payload_type` as accepting children of `children` types.
    pub fn container<I, S>(mut self, payload_type: impl Into<String>, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types.insert(
            payload_type.into(),
            TypeRules {
                leaf: false,
                children: children.into_iter().map(Into::into).collect(),
            },
        );
        self
    }

    /// Declare `payload_type` a subtype of `supertype`.
    pub fn subtype(mut self, payload_type: impl Into<String>, supertype: impl Into<String>) -> Self {
        self.supertypes
            .entry(payload_type.into())
            .or_default()
            .push(supertype.into());
        self
    }

    fn is_subtype(&self, candidate: &str, ancestor: &str) -> bool {
        let mut pending = vec![candidate];
        let mut seen = IndexSet::new();
        while let Some(current) = pending.pop() {
            if !seen.insert(current) {
                continue;
            }
            for parent in self.supertypes.get(current).into_iter().flatten() {
                if parent == ancestor {
                    return true;
                }
                pending.push(parent);
            }
        }
        false
    }

    /// Concrete types accepted below `payload_type`.
    pub fn allowed_children(&self, payload_type: &str) -> Vec<String> {
        let Some(rules) = self.types.get(payload_type) else {
            return Vec::new();
        };

        let known: IndexSet<&str> = self
            .types
            .keys()
            .chain(self.supertypes.keys())
            .map(String::as_str)
            .collect();

        known
            .into_iter()
            .filter(|candidate| {
                rules
                    .children
                    .iter()
                    .any(|child| *candidate == child || self.is_subtype(candidate, child))
            })
            .map(str::to_string)
            .collect()
    }
}

impl DescriptionEnhancer for ChildrenTypesEnhancer {
    fn supports(&self, resource: &Resource) -> bool {
        resource
            .payload_type()
            .is_some_and(|ty| self.types.contains_key(ty))
    }

    fn enhance(&self, description: &mut Description, resource: &Resource) -> Result<(), RepoError> {
        let payload_type = resource.payload_type().unwrap_or_default();
        let leaf = self.types.get(payload_type).is_none_or(|rules| rules.leaf);
        description.set(CHILDREN_ALLOW, !leaf);
        description.set(CHILDREN_TYPES, self.allowed_children(payload_type));
        Ok(())
    }
}
