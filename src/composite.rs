//! # Composite Repository
//!
//! Aggregates several repositories into one tree by mounting each at a path.
//!
//! ```text
//! mount("/",      site)      ─┐
//! mount("/child", assets)    ─┼─▶ /           (site root)
//!                             │   ├── child   (assets root)
//!                             │   │   └── file1.txt
//!                             │   ├── dir2
//!                             │   └── file1.txt
//! ```
//!
//! ## Routing
//!
//! | Request | Served by |
//! |---------|-----------|
//! | exact path | the mount with the longest prefix on a segment boundary |
//! | `/` without a `/` mount | a virtual root listing every top-level mount |
//! | ancestor of a mount point | a virtual directory holding the next path segment |
//! | glob query | every mount whose path the query's leading segments match |
//! | glob query above a mount point | also the virtual directories it matches |
//!
//! A path is always owned by its most specific mount: a mounted repository
//! shadows anything a shallower mount holds at or below the mount point.
//! Resources coming from a mount other than `/` are returned as references
//! rebased onto the mount path.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::path_resolver::{is_within, join, rebase, sanitize, segments};
use crate::selector::{self, Segment, Selector};
use crate::{GLOB, RepoError, Resource, ResourceRepository};

type Mounted = (String, Arc<dyn ResourceRepository>);

/// Information about a mount point.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MountInfo {
    /// The canonical mount path (e.g. `/child`).
    pub path: String,
    /// Number of segments in the mount path; `0` for `/`.
    pub depth: usize,
}

/// Routes repository operations to mounted repositories.
///
/// # Example
///
/// ```rust
/// use cmf_resource::{BackendRepository, CompositeRepository, MemoryBackend, ResourceRepository};
///
/// let pages = MemoryBackend::new();
/// pages.insert("/home", None)?;
/// let media = MemoryBackend::new();
/// media.insert("/logo.png", None)?;
///
/// let composite = CompositeRepository::new();
/// composite.mount("/", BackendRepository::new(pages))?;
/// composite.mount("/media", BackendRepository::new(media))?;
///
/// let logo = composite.get("/media/logo.png")?;
/// assert_eq!(logo.path(), "/media/logo.png");
/// assert_eq!(logo.repository_path(), "/logo.png");
/// # Ok::<(), cmf_resource::RepoError>(())
/// ```
pub struct CompositeRepository {
    mounts: RwLock<BTreeMap<String, Arc<dyn ResourceRepository>>>,
}

impl std::fmt::Debug for CompositeRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeRepository")
            .field("mounts", &self.mounts.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for CompositeRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeRepository {
    /// Create an empty composite.
    pub fn new() -> Self {
        Self {
            mounts: RwLock::new(BTreeMap::new()),
        }
    }

    /// Mount `repository` at `path`, replacing any repository mounted there.
    ///
    /// # Errors
    ///
    /// - [`RepoError::InvalidPath`] if `path` is empty or relative
    pub fn mount(
        &self,
        path: &str,
        repository: impl ResourceRepository + 'static,
    ) -> Result<(), RepoError> {
        self.mount_arc(path, Arc::new(repository))
    }

    /// Mount a repository that is already shared.
    pub fn mount_arc(
        &self,
        path: &str,
        repository: Arc<dyn ResourceRepository>,
    ) -> Result<(), RepoError> {
        let path = sanitize(path)?;
        debug!(mount = %path, "mounting repository");
        self.mounts.write().insert(path, repository);
        Ok(())
    }

    /// Remove the mount at `path`.
    ///
    /// Returns `true` if a repository was mounted there.
    pub fn unmount(&self, path: &str) -> bool {
        let Ok(path) = sanitize(path) else {
            return false;
        };
        let removed = self.mounts.write().remove(&path).is_some();
        debug!(mount = %path, removed, "unmounting repository");
        removed
    }

    /// The repository mounted exactly at `path`.
    pub fn mounted(&self, path: &str) -> Option<Arc<dyn ResourceRepository>> {
        let path = sanitize(path).ok()?;
        self.mounts.read().get(&path).cloned()
    }

    /// All current mounts, ordered by path.
    pub fn mounts(&self) -> Vec<MountInfo> {
        self.mounts
            .read()
            .keys()
            .map(|path| MountInfo {
                path: path.clone(),
                depth: segments(path).count(),
            })
            .collect()
    }

    // Delegated calls run without holding the lock, so a mounted repository
    // may itself use this composite.
    fn snapshot(&self) -> Vec<Mounted> {
        self.mounts
            .read()
            .iter()
            .map(|(path, repo)| (path.clone(), Arc::clone(repo)))
            .collect()
    }
}

/// The mount owning `path`: the longest mount path containing it.
fn owner<'m>(mounts: &'m [Mounted], path: &str) -> Option<&'m Mounted> {
    mounts
        .iter()
        .filter(|(mount, _)| is_within(mount, path))
        .max_by_key(|(mount, _)| segments(mount).count())
}

/// `true` if some mount lies strictly below `path`.
fn has_mount_below(mounts: &[Mounted], path: &str) -> bool {
    mounts
        .iter()
        .any(|(mount, _)| mount != path && is_within(path, mount))
}

/// The part of `path` inside the repository mounted at `mount`.
fn remainder(mount: &str, path: &str) -> String {
    if mount == "/" {
        return path.to_string();
    }
    match &path[mount.len()..] {
        "" => "/".to_string(),
        rest => rest.to_string(),
    }
}

fn rebased(mount: &str, resource: Resource) -> Resource {
    if mount == "/" {
        resource
    } else {
        let path = rebase(mount, resource.path());
        resource.create_reference(path)
    }
}

/// Root resource of the repository mounted at `mount`, rebased onto it.
///
/// An empty mounted repository still yields a virtual entry at the mount.
fn mount_root(mount: &str, repo: &dyn ResourceRepository) -> Result<Resource, RepoError> {
    match repo.get("/") {
        Ok(root) => Ok(rebased(mount, root)),
        Err(e) if e.is_not_found() => Ok(Resource::new(mount)),
        Err(e) => Err(e),
    }
}

/// `true` if the query's leading segments match every segment of `mount`.
fn query_reaches(query: &[Segment], mount: &str) -> bool {
    let mount_segments: Vec<&str> = segments(mount).collect();
    mount_segments.len() <= query.len()
        && mount_segments
            .iter()
            .zip(query)
            .all(|(name, segment)| segment.matches(name))
}

/// The virtual directory a query shorter than `mount` stops at, if the
/// query matches the mount's leading segments.
fn virtual_match(query: &[Segment], mount: &str) -> Option<String> {
    let mount_segments: Vec<&str> = segments(mount).collect();
    if mount_segments.len() <= query.len() {
        return None;
    }
    let leading = &mount_segments[..query.len()];
    leading
        .iter()
        .zip(query)
        .all(|(name, segment)| segment.matches(name))
        .then(|| format!("/{}", leading.join("/")))
}

impl ResourceRepository for CompositeRepository {
    fn get(&self, path: &str) -> Result<Resource, RepoError> {
        let path = sanitize(path)?;
        let mounts = self.snapshot();
        let is_virtual = path == "/" || has_mount_below(&mounts, &path);

        let Some((mount, repo)) = owner(&mounts, &path) else {
            debug!(path = %path, is_virtual, "get without owning mount");
            return if is_virtual {
                Ok(Resource::new(path))
            } else {
                Err(RepoError::NotFound { path })
            };
        };

        debug!(path = %path, mount = %mount, "get");
        match repo.get(&remainder(mount, &path)) {
            Ok(resource) => Ok(rebased(mount, resource)),
            Err(e) if e.is_not_found() && is_virtual => Ok(Resource::new(path)),
            Err(RepoError::NotFound { .. }) => Err(RepoError::NotFound { path }),
            Err(e) => Err(e),
        }
    }

    fn find(&self, query: &str, language: &str) -> Result<Vec<Resource>, RepoError> {
        if language != GLOB {
            return Err(RepoError::UnsupportedLanguage {
                language: language.to_string(),
            });
        }
        let query = sanitize(query)?;
        let query_segments = match selector::parse(&query)? {
            Selector::Root => return Ok(vec![self.get("/")?]),
            Selector::Segments(segments) => segments,
        };

        let mounts = self.snapshot();
        let mut candidates: Vec<Mounted> = mounts
            .iter()
            .filter(|(mount, _)| query_reaches(&query_segments, mount))
            .cloned()
            .collect();
        // Most specific mounts first.
        candidates.sort_by_key(|(mount, _)| std::cmp::Reverse(segments(mount).count()));

        let mut result = Vec::new();
        for (mount, repo) in &candidates {
            let depth = segments(mount).count();
            let found = if depth == query_segments.len() {
                vec![mount_root(mount, repo.as_ref())?]
            } else {
                let rest: Vec<&str> = query_segments[depth..]
                    .iter()
                    .map(Segment::element)
                    .collect();
                repo.find(&format!("/{}", rest.join("/")), GLOB)?
                    .into_iter()
                    .map(|resource| rebased(mount, resource))
                    .collect()
            };

            let before = result.len();
            result.extend(found.into_iter().filter(|resource| {
                owner(&mounts, resource.path()).is_some_and(|(owner, _)| owner == mount)
            }));
            debug!(query = %query, mount = %mount, count = result.len() - before, "find");
        }

        // Ancestors of deeper mounts exist even where no repository holds them.
        let virtuals: BTreeSet<String> = mounts
            .iter()
            .filter_map(|(mount, _)| virtual_match(&query_segments, mount))
            .collect();
        for path in virtuals {
            if !has_path(&result, &path) {
                result.push(Resource::new(path));
            }
        }

        Ok(result)
    }

    fn list_children(&self, path: &str) -> Result<Vec<Resource>, RepoError> {
        let path = sanitize(path)?;
        let mounts = self.snapshot();
        let is_virtual = path == "/" || has_mount_below(&mounts, &path);

        let listed = match owner(&mounts, &path) {
            Some((mount, repo)) => match repo.list_children(&remainder(mount, &path)) {
                Ok(children) => children
                    .into_iter()
                    .map(|child| rebased(mount, child))
                    .collect(),
                Err(e) if e.is_not_found() && is_virtual => Vec::new(),
                Err(RepoError::NotFound { .. }) => return Err(RepoError::NotFound { path }),
                Err(e) => return Err(e),
            },
            None if is_virtual => Vec::new(),
            None => return Err(RepoError::NotFound { path }),
        };

        // Entries contributed by mounts below `path` come first and shadow
        // same-named children of the owning repository.
        let depth = segments(&path).count();
        let mut children: Vec<Resource> = Vec::new();
        for (mount, repo) in &mounts {
            if mount == &path || !is_within(&path, mount) {
                continue;
            }
            let Some(next) = segments(mount).nth(depth) else {
                continue;
            };
            let child = join(&path, next);
            if children.iter().any(|c| c.path() == child) {
                continue;
            }
            if *mount == child {
                children.push(mount_root(mount, repo.as_ref())?);
            } else if let Some(existing) = listed.iter().find(|r| r.path() == child) {
                children.push(existing.clone());
            } else {
                children.push(Resource::new(child));
            }
        }

        let overlaid = children.len();
        let remaining: Vec<Resource> = listed
            .into_iter()
            .filter(|resource| !has_path(&children, resource.path()))
            .collect();
        children.extend(remaining);

        debug!(path = %path, overlaid, count = children.len(), "list children");
        Ok(children)
    }
}

fn has_path(resources: &[Resource], path: &str) -> bool {
    resources.iter().any(|r| r.path() == path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_resolver::parent_path;
    use std::collections::BTreeSet;

    // Fixed set of paths; children are derived from the keys.
    struct PathRepo(BTreeSet<String>);

    impl PathRepo {
        fn new(paths: &[&str]) -> Self {
            let mut set: BTreeSet<String> = paths.iter().map(|p| p.to_string()).collect();
            set.insert("/".into());
            Self(set)
        }
    }

    impl ResourceRepository for PathRepo {
        fn get(&self, path: &str) -> Result<Resource, RepoError> {
            let path = sanitize(path)?;
            if self.0.contains(&path) {
                Ok(Resource::new(path))
            } else {
                Err(RepoError::NotFound { path })
            }
        }

        fn find(&self, query: &str, _language: &str) -> Result<Vec<Resource>, RepoError> {
            let Selector::Segments(query) = selector::parse(query)? else {
                return Ok(vec![Resource::new("/")]);
            };
            Ok(self
                .0
                .iter()
                .filter(|path| {
                    let names: Vec<&str> = segments(path).collect();
                    names.len() == query.len()
                        && names.iter().zip(&query).all(|(n, s)| s.matches(n))
                })
                .map(|path| Resource::new(path.clone()))
                .collect())
        }

        fn list_children(&self, path: &str) -> Result<Vec<Resource>, RepoError> {
            let path = self.get(path)?.path().to_string();
            Ok(self
                .0
                .iter()
                .filter(|p| parent_path(p) == Some(path.as_str()))
                .map(|p| Resource::new(p.clone()))
                .collect())
        }
    }

    fn repo1() -> PathRepo {
        PathRepo::new(&["/dir2", "/dir2/file1.txt", "/file1.txt", "/file2.txt"])
    }

    fn repo2() -> PathRepo {
        PathRepo::new(&["/file1.txt"])
    }

    fn names(resources: &[Resource]) -> Vec<&str> {
        resources.iter().map(Resource::name).collect()
    }

    fn paths(resources: &[Resource]) -> Vec<&str> {
        resources.iter().map(Resource::path).collect()
    }

    #[test]
    fn mount_at_root() {
        let composite = CompositeRepository::new();
        composite.mount("/", repo1()).unwrap();
        let children = composite.list_children("/").unwrap();
        assert_eq!(paths(&children), ["/dir2", "/file1.txt", "/file2.txt"]);
        assert!(children.iter().all(|r| !r.is_reference()));
    }

    #[test]
    fn mount_children_of_root() {
        let composite = CompositeRepository::new();
        composite.mount("/child1", repo1()).unwrap();
        composite.mount("/child2", repo2()).unwrap();

        assert!(composite.has_children("/").unwrap());
        assert_eq!(
            paths(&composite.list_children("/").unwrap()),
            ["/child1", "/child2"]
        );
        assert!(composite.has_children("/child1").unwrap());
        assert_eq!(
            names(&composite.list_children("/child1").unwrap()),
            ["dir2", "file1.txt", "file2.txt"]
        );
        assert_eq!(composite.get("/").unwrap().path(), "/");
    }

    #[test]
    fn mount_within_another() {
        let composite = CompositeRepository::new();
        composite.mount("/", repo1()).unwrap();
        composite.mount("/child", repo2()).unwrap();

        assert_eq!(
            names(&composite.list_children("/").unwrap()),
            ["child", "dir2", "file1.txt", "file2.txt"]
        );
        assert_eq!(names(&composite.list_children("/child").unwrap()), ["file1.txt"]);
    }

    #[test]
    fn get_rewrites_path_with_mount() {
        let composite = CompositeRepository::new();
        composite.mount("/", repo1()).unwrap();
        composite.mount("/child", repo2()).unwrap();

        let resource = composite.get("/child/file1.txt").unwrap();
        assert_eq!(resource.path(), "/child/file1.txt");
        assert_eq!(resource.repository_path(), "/file1.txt");
        assert!(resource.is_reference());

        let root_file = composite.get("/file2.txt").unwrap();
        assert!(!root_file.is_reference());
    }

    #[test]
    fn longest_prefix_wins() {
        let composite = CompositeRepository::new();
        composite.mount("/a", PathRepo::new(&["/b/c"])).unwrap();
        composite.mount("/a/b", PathRepo::new(&["/c"])).unwrap();

        let resource = composite.get("/a/b/c").unwrap();
        assert_eq!(resource.path(), "/a/b/c");
        assert_eq!(resource.repository_path(), "/c");
    }

    #[test]
    fn prefix_match_respects_segments() {
        let composite = CompositeRepository::new();
        composite.mount("/a", PathRepo::new(&["/x"])).unwrap();
        assert!(composite.get("/ab/x").unwrap_err().is_not_found());
    }

    #[test]
    fn mount_overwrites() {
        let composite = CompositeRepository::new();
        composite.mount("/m", repo1()).unwrap();
        composite.mount("/m/", repo2()).unwrap();
        assert_eq!(composite.mounts().len(), 1);
        assert_eq!(names(&composite.list_children("/m").unwrap()), ["file1.txt"]);
    }

    #[test]
    fn mount_rejects_relative_path() {
        let composite = CompositeRepository::new();
        assert!(matches!(
            composite.mount("child", repo1()),
            Err(RepoError::InvalidPath { .. })
        ));
    }

    #[test]
    fn unmount_removes() {
        let composite = CompositeRepository::new();
        composite.mount("/child", repo2()).unwrap();
        assert!(composite.unmount("/child"));
        assert!(!composite.unmount("/child"));
        assert!(composite.get("/child").unwrap_err().is_not_found());
        assert!(composite.list_children("/").unwrap().is_empty());
    }

    #[test]
    fn mounts_lists_paths_in_order() {
        let composite = CompositeRepository::new();
        composite.mount("/b", repo2()).unwrap();
        composite.mount("/", repo1()).unwrap();
        let mounts = composite.mounts();
        assert_eq!(mounts[0], MountInfo { path: "/".into(), depth: 0 });
        assert_eq!(mounts[1], MountInfo { path: "/b".into(), depth: 1 });
        assert!(composite.mounted("/b").is_some());
        assert!(composite.mounted("/c").is_none());
    }

    #[test]
    fn virtual_directories_above_deep_mounts() {
        let composite = CompositeRepository::new();
        composite.mount("/a/b", repo2()).unwrap();

        assert_eq!(paths(&composite.list_children("/").unwrap()), ["/a"]);
        assert_eq!(composite.get("/a").unwrap().path(), "/a");
        assert_eq!(paths(&composite.list_children("/a").unwrap()), ["/a/b"]);
        assert_eq!(paths(&composite.list_children("/a/b").unwrap()), ["/a/b/file1.txt"]);
    }

    #[test]
    fn find_matches_virtual_directories() {
        let composite = CompositeRepository::new();
        composite.mount("/a/b", repo2()).unwrap();
        composite.mount("/a/c/d", repo2()).unwrap();

        assert_eq!(paths(&composite.find("/*", GLOB).unwrap()), ["/a"]);
        assert_eq!(paths(&composite.find("/a", GLOB).unwrap()), ["/a"]);
        assert_eq!(paths(&composite.find("/a/*", GLOB).unwrap()), ["/a/b", "/a/c"]);
        assert!(composite.contains("/a", GLOB).unwrap());
        assert!(!composite.contains("/x", GLOB).unwrap());
        assert!(!composite.contains("/a/x", GLOB).unwrap());
    }

    #[test]
    fn find_prefers_real_resources_over_virtual_ones() {
        let composite = CompositeRepository::new();
        composite.mount("/", PathRepo::new(&["/a", "/z"])).unwrap();
        composite.mount("/a/b", repo2()).unwrap();

        let found = composite.find("/*", GLOB).unwrap();
        assert_eq!(paths(&found), ["/a", "/z"]);
    }

    #[test]
    fn find_fans_out_across_mounts() {
        let composite = CompositeRepository::new();
        composite.mount("/", repo1()).unwrap();
        composite.mount("/child", repo2()).unwrap();

        assert_eq!(
            paths(&composite.find("/*/*", GLOB).unwrap()),
            ["/child/file1.txt", "/dir2/file1.txt"]
        );
        assert_eq!(
            names(&composite.find("/*", GLOB).unwrap()),
            ["child", "dir2", "file1.txt", "file2.txt"]
        );
        assert!(composite.contains("/*/*", GLOB).unwrap());
        assert!(!composite.contains("/idoesnotexist", GLOB).unwrap());
    }

    #[test]
    fn find_drops_shadowed_results() {
        let composite = CompositeRepository::new();
        composite.mount("/", PathRepo::new(&["/child", "/child/hidden"])).unwrap();
        composite.mount("/child", repo2()).unwrap();

        assert_eq!(paths(&composite.find("/child/*", GLOB).unwrap()), ["/child/file1.txt"]);
        let child = composite.find("/child", GLOB).unwrap();
        assert_eq!(child.len(), 1);
        assert!(child[0].is_reference());
    }

    #[test]
    fn find_root_and_language() {
        let composite = CompositeRepository::new();
        composite.mount("/x", repo2()).unwrap();
        assert_eq!(paths(&composite.find("/", GLOB).unwrap()), ["/"]);
        assert!(matches!(
            composite.find("/*", "xpath"),
            Err(RepoError::UnsupportedLanguage { .. })
        ));
    }

    #[test]
    fn composite_mounts_composite() {
        let inner = CompositeRepository::new();
        inner.mount("/files", repo2()).unwrap();
        let outer = CompositeRepository::new();
        outer.mount("/inner", inner).unwrap();

        let resource = outer.get("/inner/files/file1.txt").unwrap();
        assert_eq!(resource.path(), "/inner/files/file1.txt");
        assert_eq!(resource.repository_path(), "/file1.txt");
    }
}
