//! # Descriptions
//!
//! A [`Description`] is a bag of descriptors (key/value pairs) attached to a
//! resource: titles, type aliases, links to edit forms, allowed child types.
//! Enhancers fill it in; consumers such as admin UIs and REST layers read it.
//!
//! | Item | Purpose |
//! |------|---------|
//! | [`Description`] | The descriptor bag of one resource |
//! | [`DescriptorValue`] | Scalar or array value |
//! | [`descriptor`] | Well-known keys |
//! | [`DescriptionFactory`] | Runs enhancers in registration order |
//! | [`DescriptionEnhancer`] | Plugin contributing descriptors |
//! | [`ChildrenTypesEnhancer`] | Sets `children.allow` / `children.types` from a type map |
//!
//! Values are validated when they are set, never when they are read.

use std::any::{Any, type_name};

use indexmap::IndexMap;

use crate::{RepoError, Resource};

mod children;
pub mod descriptor;
mod factory;
mod value;

pub use children::ChildrenTypesEnhancer;
pub use factory::{DescriptionEnhancer, DescriptionFactory};
pub use value::DescriptorValue;

/// Descriptors of a single resource.
///
/// # Example
///
/// ```rust
/// use cmf_resource::{Description, Resource};
/// use cmf_resource::descriptor::{LINK_EDIT_HTML, TYPE_ALIAS};
///
/// let mut description = Description::new(&Resource::new("/cms/home"));
/// description.set(TYPE_ALIAS, "page");
/// description.set(LINK_EDIT_HTML, "/admin/page/edit?id=/cms/home");
///
/// assert_eq!(description.get(TYPE_ALIAS)?.as_str(), Some("page"));
/// assert!(description.get("not there").is_err());
/// # Ok::<(), cmf_resource::RepoError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Description {
    resource_path: String,
    payload_type: Option<String>,
    descriptors: IndexMap<String, DescriptorValue>,
}

impl Description {
    /// An empty description of `resource`.
    pub fn new(resource: &Resource) -> Self {
        Self {
            resource_path: resource.path().to_string(),
            payload_type: resource.payload_type().map(str::to_string),
            descriptors: IndexMap::new(),
        }
    }

    /// Path of the described resource.
    #[inline]
    pub fn resource_path(&self) -> &str {
        &self.resource_path
    }

    /// Payload type of the described resource.
    #[inline]
    pub fn payload_type(&self) -> Option<&str> {
        self.payload_type.as_deref()
    }

    /// The value of `descriptor`.
    ///
    /// # Errors
    ///
    /// - [`RepoError::UnknownDescriptor`] naming the resource and every key
    ///   currently set
    pub fn get(&self, descriptor: &str) -> Result<&DescriptorValue, RepoError> {
        self.descriptors
            .get(descriptor)
            .ok_or_else(|| RepoError::UnknownDescriptor {
                descriptor: descriptor.to_string(),
                path: self.resource_path.clone(),
                available: self
                    .descriptors
                    .keys()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join("\", \""),
            })
    }

    /// `true` if `descriptor` has been set.
    pub fn has(&self, descriptor: &str) -> bool {
        self.descriptors.contains_key(descriptor)
    }

    /// Every descriptor, in the order first set.
    pub fn all(&self) -> &IndexMap<String, DescriptorValue> {
        &self.descriptors
    }

    /// Set `descriptor`, overwriting any previous value.
    pub fn set(&mut self, descriptor: impl Into<String>, value: impl Into<DescriptorValue>) {
        self.descriptors.insert(descriptor.into(), value.into());
    }

    /// Set `descriptor` from a dynamically typed value.
    ///
    /// Accepts every value [`DescriptorValue::from_any`] recognizes: `()`
    /// (null), booleans, integers of any width, floats, strings, and lists or
    /// string-keyed maps of those.
    ///
    /// # Errors
    ///
    /// - [`RepoError::InvalidDescriptorValue`] naming the descriptor and the
    ///   offending type for anything else
    pub fn try_set<T: Any>(&mut self, descriptor: &str, value: T) -> Result<(), RepoError> {
        let Some(converted) = DescriptorValue::from_any(&value) else {
            return Err(RepoError::InvalidDescriptorValue {
                descriptor: descriptor.to_string(),
                value_type: type_name::<T>(),
            });
        };

        self.descriptors.insert(descriptor.to_string(), converted);
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl Description {
    /// The descriptors as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.descriptors
                .iter()
                .map(|(k, v)| (k.clone(), v.clone().into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::descriptor::{LINK_EDIT_HTML, TYPE_ALIAS};
    use super::*;
    use std::sync::Arc;

    fn description() -> Description {
        Description::new(&Resource::new("/cms/page").with_payload_type("app:page"))
    }

    #[test]
    fn get_set() {
        let mut d = description();
        d.set(TYPE_ALIAS, "page");
        d.set(LINK_EDIT_HTML, "/path/to/edit");
        d.set("custom.key", "Hello");
        assert_eq!(d.get(TYPE_ALIAS).unwrap().as_str(), Some("page"));
        assert_eq!(d.get("custom.key").unwrap().as_str(), Some("Hello"));
        assert_eq!(d.resource_path(), "/cms/page");
        assert_eq!(d.payload_type(), Some("app:page"));
    }

    #[test]
    fn get_unknown_names_keys_in_order() {
        let mut d = description();
        d.set("foo", "bar");
        d.set("bar", "foo");
        let err = d.get("not there").unwrap_err();
        assert_eq!(
            err.to_string(),
            "descriptor \"not there\" not supported for resource \"/cms/page\". \
             Supported descriptors: \"foo\", \"bar\""
        );
    }

    #[test]
    fn set_overwrites() {
        let mut d = description();
        d.set("k", 1);
        d.set("k", 2);
        assert_eq!(d.get("k").unwrap().as_i64(), Some(2));
        assert_eq!(d.all().len(), 1);
    }

    #[test]
    fn has_and_all() {
        let mut d = description();
        assert!(!d.has("k"));
        d.set("k", true);
        d.set("list", vec!["a", "b"]);
        assert!(d.has("k"));
        let keys: Vec<_> = d.all().keys().map(String::as_str).collect();
        assert_eq!(keys, ["k", "list"]);
    }

    #[test]
    fn try_set_accepts_scalars_and_arrays() {
        let mut d = description();
        d.try_set("b", true).unwrap();
        d.try_set("i", 3_i64).unwrap();
        d.try_set("s", String::from("x")).unwrap();
        d.try_set("l", vec!["a".to_string()]).unwrap();
        d.try_set("n", ()).unwrap();
        assert_eq!(d.get("i").unwrap().as_i64(), Some(3));
        assert_eq!(d.get("l").unwrap().as_array().map(<[_]>::len), Some(1));
        assert!(d.get("n").unwrap().is_null());
    }

    #[test]
    fn try_set_accepts_every_number_width() {
        let mut d = description();
        d.try_set("u8", 5_u8).unwrap();
        d.try_set("i16", -5_i16).unwrap();
        d.try_set("u64", 5_u64).unwrap();
        d.try_set("usize", 5_usize).unwrap();
        d.try_set("isize", -5_isize).unwrap();
        d.try_set("f32", 1.5_f32).unwrap();
        d.try_set("huge", u64::MAX).unwrap();

        assert_eq!(d.get("u8").unwrap().as_i64(), Some(5));
        assert_eq!(d.get("i16").unwrap().as_i64(), Some(-5));
        assert_eq!(d.get("u64").unwrap().as_i64(), Some(5));
        assert_eq!(d.get("usize").unwrap().as_i64(), Some(5));
        assert_eq!(d.get("isize").unwrap().as_i64(), Some(-5));
        assert_eq!(d.get("f32").unwrap().as_f64(), Some(1.5));
        assert_eq!(d.get("huge").unwrap().as_f64(), Some(u64::MAX as f64));
        assert_eq!(d.get("huge").unwrap().as_i64(), None);
    }

    #[test]
    fn try_set_accepts_lists_and_maps_of_scalars() {
        let mut d = description();
        d.try_set("ints", vec![1_i64, 2]).unwrap();
        d.try_set("flags", vec![true, false]).unwrap();
        d.try_set("sizes", vec![3_usize]).unwrap();
        d.try_set("values", vec![DescriptorValue::Null]).unwrap();

        let mut links = IndexMap::new();
        links.insert("app:page".to_string(), "/admin/page/create");
        d.try_set("links", links).unwrap();

        assert_eq!(
            d.get("ints").unwrap(),
            &DescriptorValue::Array(vec![DescriptorValue::Int(1), DescriptorValue::Int(2)])
        );
        assert_eq!(d.get("flags").unwrap().as_array().map(<[_]>::len), Some(2));
        assert_eq!(d.get("sizes").unwrap().as_array().unwrap()[0].as_i64(), Some(3));
        assert!(d.get("values").unwrap().as_array().unwrap()[0].is_null());
        let links = d.get("links").unwrap().as_map().unwrap();
        assert_eq!(links["app:page"].as_str(), Some("/admin/page/create"));
    }

    #[test]
    fn try_set_rejects_objects() {
        let mut d = description();
        let err = d.try_set("payload", Arc::new(5_u8)).unwrap_err();
        let RepoError::InvalidDescriptorValue { descriptor, value_type } = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(descriptor, "payload");
        assert!(value_type.contains("Arc"));
        assert!(!d.has("payload"));
    }
}
