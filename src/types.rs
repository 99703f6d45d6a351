//! Core value types: resources, payloads and resource metadata.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

/// The only query language repositories understand.
pub const GLOB: &str = "glob";

/// Opaque backend-native object carried by a [`Resource`].
///
/// Callers that know the backend recover the concrete type with
/// [`Resource::payload_as`].
pub type Payload = Arc<dyn Any + Send + Sync>;

/// Creation and modification times of a backend node.
///
/// Backends that do not track a timestamp report `UNIX_EPOCH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceMetadata {
    /// Creation time.
    #[cfg_attr(feature = "serde", serde(with = "system_time_serde"))]
    pub created: SystemTime,
    /// Last modification time.
    #[cfg_attr(feature = "serde", serde(with = "system_time_serde"))]
    pub modified: SystemTime,
}

impl Default for ResourceMetadata {
    fn default() -> Self {
        Self {
            created: SystemTime::UNIX_EPOCH,
            modified: SystemTime::UNIX_EPOCH,
        }
    }
}

/// A read-time view of a backend node at a logical path.
///
/// Resources are built by repositories on every `get`, `find` and
/// `list_children` call and are not persisted. Changing the payload must go
/// through the owning backend, never through the resource.
///
/// # Example
///
/// ```rust
/// use cmf_resource::Resource;
/// use std::sync::Arc;
///
/// let page = Resource::new("/cmf/pages/home")
///     .with_payload(Arc::new(42_u32), Some("app:page".into()));
/// assert_eq!(page.name(), "home");
/// assert_eq!(page.payload_as::<u32>(), Some(&42));
///
/// let mounted = page.create_reference("/site/pages/home");
/// assert!(mounted.is_reference());
/// assert_eq!(mounted.repository_path(), "/cmf/pages/home");
/// ```
#[derive(Clone)]
pub struct Resource {
    path: String,
    repository_path: Option<String>,
    payload: Option<Payload>,
    payload_type: Option<String>,
    metadata: ResourceMetadata,
}

impl Resource {
    /// Create a resource at `path` without a payload.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            repository_path: None,
            payload: None,
            payload_type: None,
            metadata: ResourceMetadata::default(),
        }
    }

    /// Attach a payload and its type.
    pub fn with_payload(mut self, payload: Payload, payload_type: Option<String>) -> Self {
        self.payload = Some(payload);
        self.payload_type = payload_type;
        self
    }

    /// Set only the payload type, leaving the payload untouched.
    pub fn with_payload_type(mut self, payload_type: impl Into<String>) -> Self {
        self.payload_type = Some(payload_type.into());
        self
    }

    /// Attach node metadata.
    pub fn with_metadata(mut self, metadata: ResourceMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// The logical path of this resource.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last path segment; empty for the root.
    pub fn name(&self) -> &str {
        match self.path.rfind('/') {
            Some(idx) => &self.path[idx + 1..],
            None => &self.path,
        }
    }

    /// The backend-native payload, if any.
    #[inline]
    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    /// Downcast the payload to a concrete type.
    pub fn payload_as<T: Any>(&self) -> Option<&T> {
        self.payload.as_deref().and_then(|p| p.downcast_ref::<T>())
    }

    /// The payload type reported by the backend.
    #[inline]
    pub fn payload_type(&self) -> Option<&str> {
        self.payload_type.as_deref()
    }

    /// Node metadata captured when the resource was built.
    #[inline]
    pub fn metadata(&self) -> &ResourceMetadata {
        &self.metadata
    }

    /// Rebase this resource onto `path`, keeping payload and metadata.
    ///
    /// The original path stays available through
    /// [`repository_path`](Self::repository_path). Referencing a reference
    /// keeps the first repository path.
    pub fn create_reference(&self, path: impl Into<String>) -> Self {
        let mut reference = self.clone();
        reference.repository_path = Some(self.repository_path().to_string());
        reference.path = path.into();
        reference
    }

    /// Returns `true` if this resource was rebased with
    /// [`create_reference`](Self::create_reference).
    #[inline]
    pub fn is_reference(&self) -> bool {
        self.repository_path.is_some()
    }

    /// The path inside the repository that produced the payload.
    pub fn repository_path(&self) -> &str {
        self.repository_path.as_deref().unwrap_or(&self.path)
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("path", &self.path)
            .field("repository_path", &self.repository_path)
            .field("payload_type", &self.payload_type)
            .field("has_payload", &self.payload.is_some())
            .finish()
    }
}

/// Serde support for SystemTime (when serde feature is enabled).
#[cfg(feature = "serde")]
mod system_time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration = time.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
        (duration.as_secs(), duration.subsec_nanos()).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (secs, nanos): (u64, u32) = Deserialize::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::new(secs, nanos))
    }
}
