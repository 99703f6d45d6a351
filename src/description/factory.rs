//! Building descriptions from enhancers.

use tracing::trace;

use super::Description;
use crate::{RepoError, Resource};

/// A plugin contributing descriptors to resources it understands.
///
/// Enhancers run in registration order and may overwrite descriptors set by
/// earlier ones.
pub trait DescriptionEnhancer: Send + Sync {
    /// `true` if this enhancer knows how to describe `resource`.
    fn supports(&self, resource: &Resource) -> bool;

    /// Add descriptors for `resource` to `description`.
    fn enhance(&self, description: &mut Description, resource: &Resource)
    -> Result<(), RepoError>;
}

/// Produces [`Description`]s by running every supporting enhancer.
///
/// # Example
///
/// ```rust
/// use cmf_resource::{Description, DescriptionEnhancer, DescriptionFactory, RepoError, Resource};
/// use cmf_resource::descriptor::PAYLOAD_TITLE;
///
/// struct Titles;
///
/// impl DescriptionEnhancer for Titles {
///     fn supports(&self, resource: &Resource) -> bool {
///         resource.payload_type() == Some("app:page")
///     }
///
///     fn enhance(&self, description: &mut Description, resource: &Resource) -> Result<(), RepoError> {
///         description.set(PAYLOAD_TITLE, resource.name());
///         Ok(())
///     }
/// }
///
/// let factory = DescriptionFactory::new().with_enhancer(Titles);
/// let page = Resource::new("/cms/about").with_payload_type("app:page");
/// assert_eq!(factory.description_for(&page)?.get(PAYLOAD_TITLE)?.as_str(), Some("about"));
/// # Ok::<(), RepoError>(())
/// ```
#[derive(Default)]
pub struct DescriptionFactory {
    enhancers: Vec<Box<dyn DescriptionEnhancer>>,
}

impl std::fmt::Debug for DescriptionFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptionFactory")
            .field("enhancers", &self.enhancers.len())
            .finish()
    }
}

impl DescriptionFactory {
    /// A factory without enhancers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an enhancer.
    pub fn with_enhancer(mut self, enhancer: impl DescriptionEnhancer + 'static) -> Self {
        self.register(Box::new(enhancer));
        self
    }

    /// Append an already boxed enhancer.
    pub fn register(&mut self, enhancer: Box<dyn DescriptionEnhancer>) {
        self.enhancers.push(enhancer);
    }

    /// Number of registered enhancers.
    pub fn len(&self) -> usize {
        self.enhancers.len()
    }

    /// `true` if no enhancer is registered.
    pub fn is_empty(&self) -> bool {
        self.enhancers.is_empty()
    }

    /// Describe `resource`.
    ///
    /// # Errors
    ///
    /// The first error returned by an enhancer.
    pub fn description_for(&self, resource: &Resource) -> Result<Description, RepoError> {
        let mut description = Description::new(resource);
        for (idx, enhancer) in self.enhancers.iter().enumerate() {
            if !enhancer.supports(resource) {
                continue;
            }
            enhancer.enhance(&mut description, resource)?;
            trace!(path = resource.path(), enhancer = idx, "enhanced description");
        }
        Ok(description)
    }
}
