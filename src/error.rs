//! Error types for resource repositories.

/// Repository error type with contextual variants.
///
/// Every variant carries the path, query or operation that failed.
/// Uses `#[non_exhaustive]` for forward compatibility.
///
/// # Examples
///
/// ```rust
/// use cmf_resource::RepoError;
///
/// let err = RepoError::NotFound { path: "/cmf/missing".into() };
/// assert_eq!(err.to_string(), "resource not found: /cmf/missing");
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    // Caller input
    /// A path failed validation (empty, relative, or outside the base path).
    #[error("invalid path \"{path}\": {reason}")]
    InvalidPath {
        /// The offending path.
        path: String,
        /// Why the path was rejected.
        reason: &'static str,
    },

    /// A query failed validation.
    #[error("invalid query \"{query}\": {reason}")]
    InvalidQuery {
        /// The offending query.
        query: String,
        /// Why the query was rejected.
        reason: String,
    },

    /// A query language other than `glob` was requested.
    #[error("the language \"{language}\" is not supported")]
    UnsupportedLanguage {
        /// The requested language.
        language: String,
    },

    /// An argument failed a precondition.
    #[error("{operation}: invalid argument: {details}")]
    InvalidArgument {
        /// The operation that rejected the argument.
        operation: &'static str,
        /// What was wrong with it.
        details: String,
    },

    // Lookup
    /// No resource exists at the requested path.
    #[error("resource not found: {path}")]
    NotFound {
        /// The path that was not found.
        path: String,
    },

    /// A node already exists where one was to be created.
    #[error("{operation}: already exists: {path}")]
    AlreadyExists {
        /// The path that already exists.
        path: String,
        /// The operation that failed.
        operation: &'static str,
    },

    /// No repository has been registered under this name.
    #[error("no repository with name \"{name}\" has been registered")]
    UnknownRepository {
        /// The requested repository name.
        name: String,
    },

    // Descriptions
    /// A descriptor was read that was never set.
    #[error(
        "descriptor \"{descriptor}\" not supported for resource \"{path}\". Supported descriptors: \"{available}\""
    )]
    UnknownDescriptor {
        /// The requested descriptor key.
        descriptor: String,
        /// Path of the described resource.
        path: String,
        /// Every key currently set, joined for display.
        available: String,
    },

    /// A descriptor value was neither a scalar nor an array.
    #[error(
        "only scalar and array values are allowed as descriptor values, got \"{value_type}\" when setting descriptor \"{descriptor}\""
    )]
    InvalidDescriptorValue {
        /// The descriptor key being set.
        descriptor: String,
        /// Type name of the rejected value.
        value_type: &'static str,
    },

    // Backend / operation
    /// The operation is intentionally unimplemented.
    #[error("operation not supported: {operation}")]
    NotSupported {
        /// The unsupported operation.
        operation: &'static str,
    },

    /// A batch mutation failed in the backend.
    #[error("error encountered when {operation} resource(s) using query \"{query}\"")]
    Repository {
        /// Gerund naming the batch operation (`removing`, `moving`).
        operation: &'static str,
        /// The query the caller issued.
        query: String,
        /// The underlying backend failure.
        #[source]
        source: Box<RepoError>,
    },

    /// Generic backend error.
    #[error("backend error: {0}")]
    Backend(String),
}

impl RepoError {
    /// Wrap a backend failure raised during a batch operation.
    pub(crate) fn batch(operation: &'static str, query: &str, source: RepoError) -> Self {
        RepoError::Repository {
            operation,
            query: query.to_string(),
            source: Box::new(source),
        }
    }

    /// Returns `true` for [`RepoError::NotFound`].
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepoError::NotFound { .. })
    }
}
