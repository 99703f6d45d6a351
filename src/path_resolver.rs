//! # Path Resolver
//!
//! Canonicalizes logical repository paths and rebases them onto a backend
//! base path.
//!
//! ## Responsibility
//! - Validate caller paths (non-empty, absolute)
//! - Collapse `.`, `..` and `//` lexically
//! - Map logical paths to native backend paths and back
//!
//! ## Usage
//!
//! ```rust
//! use cmf_resource::PathResolver;
//!
//! let resolver = PathResolver::new(Some("/site/foo.com"))?;
//! assert_eq!(resolver.resolve("/bar/../foobar")?, "/site/foo.com/foobar");
//! assert_eq!(resolver.unresolve("/site/foo.com/foobar")?, "/foobar");
//! # Ok::<(), cmf_resource::RepoError>(())
//! ```

use crate::RepoError;

/// How [`PathResolver::unresolve`] strips the base path from native paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum UnresolveMode {
    /// The native path must equal the base path or continue it on a `/`
    /// boundary; anything else fails with [`RepoError::InvalidPath`].
    #[default]
    Strict,
    /// Drop as many leading bytes as the base path is long, without checking
    /// them. `/sitemap/x` under base `/site` yields `map/x`.
    Legacy,
}

/// Resolves logical paths against an optional base path.
///
/// A resolver without a base path only validates and canonicalizes.
/// A base path of `/` is the same as no base path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathResolver {
    base_path: Option<String>,
    mode: UnresolveMode,
}

impl PathResolver {
    /// Create a resolver rooted at `base_path`.
    ///
    /// # Errors
    ///
    /// - [`RepoError::InvalidPath`] if the base path is empty or relative
    pub fn new(base_path: Option<&str>) -> Result<Self, RepoError> {
        let base_path = match base_path {
            Some(base) => {
                let base = sanitize(base)?;
                (base != "/").then_some(base)
            }
            None => None,
        };
        Ok(Self {
            base_path,
            mode: UnresolveMode::default(),
        })
    }

    /// Choose how native paths are unresolved.
    pub fn with_mode(mut self, mode: UnresolveMode) -> Self {
        self.mode = mode;
        self
    }

    /// The canonical base path, if one is set.
    #[inline]
    pub fn base_path(&self) -> Option<&str> {
        self.base_path.as_deref()
    }

    /// The configured unresolve mode.
    #[inline]
    pub fn mode(&self) -> UnresolveMode {
        self.mode
    }

    /// Map a logical path to the native backend path.
    ///
    /// The input is canonicalized before the base path is prepended, so `..`
    /// can never climb above the base path.
    ///
    /// # Errors
    ///
    /// - [`RepoError::InvalidPath`] if `path` is empty or not absolute
    pub fn resolve(&self, path: &str) -> Result<String, RepoError> {
        let path = sanitize(path)?;
        match &self.base_path {
            Some(base) => Ok(canonicalize(&format!("{base}{path}"))),
            None => Ok(path),
        }
    }

    /// Map a native backend path back to its logical path.
    ///
    /// # Errors
    ///
    /// - [`RepoError::InvalidPath`] in [`UnresolveMode::Strict`] when
    ///   `native_path` does not lie under the base path
    pub fn unresolve(&self, native_path: &str) -> Result<String, RepoError> {
        let Some(base) = &self.base_path else {
            return Ok(native_path.to_string());
        };

        let rest = match self.mode {
            UnresolveMode::Legacy => native_path.get(base.len()..).unwrap_or(""),
            UnresolveMode::Strict => match native_path.strip_prefix(base.as_str()) {
                Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
                _ => {
                    return Err(RepoError::InvalidPath {
                        path: native_path.to_string(),
                        reason: "path is not under the repository base path",
                    });
                }
            },
        };

        if rest.is_empty() {
            Ok("/".to_string())
        } else {
            Ok(rest.to_string())
        }
    }
}

/// Validate a caller path and canonicalize it.
///
/// # Errors
///
/// - [`RepoError::InvalidPath`] if `path` is empty or does not start with `/`
pub fn sanitize(path: &str) -> Result<String, RepoError> {
    if path.is_empty() {
        return Err(RepoError::InvalidPath {
            path: String::new(),
            reason: "the path must be a non-empty string",
        });
    }
    if !path.starts_with('/') {
        return Err(RepoError::InvalidPath {
            path: path.to_string(),
            reason: "the path is not absolute",
        });
    }
    Ok(canonicalize(path))
}

/// Lexical canonicalization of an absolute path.
///
/// Handles `.`, `..` and repeated slashes. `..` at the root stays at the root.
pub fn canonicalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            name => segments.push(name),
        }
    }

    if segments.is_empty() {
        "/".to_string()
    } else {
        let mut out = String::with_capacity(path.len());
        for segment in segments {
            out.push('/');
            out.push_str(segment);
        }
        out
    }
}

/// Parent of a canonical path; `None` for the root.
pub(crate) fn parent_path(path: &str) -> Option<&str> {
    if path == "/" {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some("/"),
        Some(idx) => Some(&path[..idx]),
        None => None,
    }
}

/// Append a child name to a canonical path.
pub(crate) fn join(parent: &str, name: &str) -> String {
    if parent == "/" {
        format!("/{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// Prefix a repository-relative path with a mount point.
pub(crate) fn rebase(mount: &str, path: &str) -> String {
    match (mount, path) {
        ("/", _) => path.to_string(),
        (_, "/") => mount.to_string(),
        _ => format!("{mount}{path}"),
    }
}

/// `true` if `path` is `ancestor` or lies beneath it on a segment boundary.
pub(crate) fn is_within(ancestor: &str, path: &str) -> bool {
    if ancestor == "/" {
        return true;
    }
    match path.strip_prefix(ancestor) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// The non-empty segments of a path.
pub(crate) fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}
