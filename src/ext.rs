//! # Extension Traits
//!
//! Shorthands for the `glob` query language, which is the only language
//! repositories understand today.
//!
//! | Method | Equivalent |
//! |--------|------------|
//! | [`find_glob`](RepositoryExt::find_glob) | `find(query, GLOB)` |
//! | [`contains_glob`](RepositoryExt::contains_glob) | `contains(query, GLOB)` |
//! | [`exists`](RepositoryExt::exists) | `get(path)` mapped to a boolean |
//! | [`remove_glob`](EditableRepositoryExt::remove_glob) | `remove(query, GLOB)` |
//! | [`move_glob`](EditableRepositoryExt::move_glob) | `move_to(query, target, GLOB)` |
//!
//! Both traits have blanket implementations, including for trait objects.

use crate::{EditableRepository, GLOB, RepoError, Resource, ResourceRepository};

/// Glob shorthands for any [`ResourceRepository`].
///
/// # Example
///
/// ```rust
/// use cmf_resource::{BackendRepository, MemoryBackend, RepositoryExt};
///
/// let backend = MemoryBackend::new();
/// backend.insert("/cms/a", None)?;
/// backend.insert("/cms/b", None)?;
/// let repo = BackendRepository::new(backend);
///
/// assert_eq!(repo.find_glob("/cms/*")?.len(), 2);
/// assert!(repo.exists("/cms/a")?);
/// assert!(!repo.exists("/cms/c")?);
/// # Ok::<(), cmf_resource::RepoError>(())
/// ```
pub trait RepositoryExt: ResourceRepository {
    /// All resources matching a glob `query`.
    fn find_glob(&self, query: &str) -> Result<Vec<Resource>, RepoError> {
        self.find(query, GLOB)
    }

    /// `true` if a glob `query` matches anything.
    fn contains_glob(&self, query: &str) -> Result<bool, RepoError> {
        self.contains(query, GLOB)
    }

    /// `true` if a resource exists at `path`.
    ///
    /// Returns `Ok(false)` instead of [`RepoError::NotFound`]; every other
    /// error is passed through.
    fn exists(&self, path: &str) -> Result<bool, RepoError> {
        match self.get(path) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl<R: ResourceRepository + ?Sized> RepositoryExt for R {}

/// Glob shorthands for any [`EditableRepository`].
pub trait EditableRepositoryExt: EditableRepository {
    /// Remove everything matching a glob `query`.
    fn remove_glob(&self, query: &str) -> Result<usize, RepoError> {
        self.remove(query, GLOB)
    }

    /// Move everything matching a glob `query` to `target_path`.
    fn move_glob(&self, query: &str, target_path: &str) -> Result<usize, RepoError> {
        self.move_to(query, target_path, GLOB)
    }
}

impl<R: EditableRepository + ?Sized> EditableRepositoryExt for R {}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    // Records the language of every call.
    #[derive(Default)]
    struct LanguageRecorder {
        languages: Mutex<Vec<String>>,
        broken: bool,
    }

    impl LanguageRecorder {
        fn seen(&self) -> Vec<String> {
            self.languages.lock().clone()
        }
    }

    impl ResourceRepository for LanguageRecorder {
        fn get(&self, path: &str) -> Result<Resource, RepoError> {
            match path {
                _ if self.broken => Err(RepoError::Backend("connection lost".into())),
                "/present" => Ok(Resource::new(path)),
                _ => Err(RepoError::NotFound { path: path.into() }),
            }
        }

        fn find(&self, query: &str, language: &str) -> Result<Vec<Resource>, RepoError> {
            self.languages.lock().push(language.to_string());
            Ok(vec![Resource::new(query)])
        }

        fn list_children(&self, _path: &str) -> Result<Vec<Resource>, RepoError> {
            Ok(Vec::new())
        }
    }

    impl EditableRepository for LanguageRecorder {
        fn add(&self, _path: &str, _resources: &[Resource]) -> Result<(), RepoError> {
            Ok(())
        }

        fn remove(&self, _query: &str, language: &str) -> Result<usize, RepoError> {
            self.languages.lock().push(language.to_string());
            Ok(1)
        }

        fn move_to(&self, _query: &str, _target: &str, language: &str) -> Result<usize, RepoError> {
            self.languages.lock().push(language.to_string());
            Ok(2)
        }

        fn reorder(&self, _path: &str, _position: i64) -> Result<(), RepoError> {
            Ok(())
        }
    }

    #[test]
    fn shorthands_use_glob() {
        let recorder = LanguageRecorder::default();
        assert_eq!(recorder.find_glob("/a").unwrap().len(), 1);
        assert!(recorder.contains_glob("/a").unwrap());
        assert_eq!(recorder.remove_glob("/a").unwrap(), 1);
        assert_eq!(recorder.move_glob("/a", "/b").unwrap(), 2);
        assert_eq!(recorder.seen(), [GLOB; 4]);
    }

    #[test]
    fn exists_maps_not_found() {
        let recorder = LanguageRecorder::default();
        assert!(recorder.exists("/present").unwrap());
        assert!(!recorder.exists("/absent").unwrap());
    }

    #[test]
    fn exists_passes_other_errors() {
        let recorder = LanguageRecorder {
            broken: true,
            ..Default::default()
        };
        assert!(matches!(recorder.exists("/present"), Err(RepoError::Backend(_))));
    }

    #[test]
    fn works_on_trait_objects() {
        let recorder: Box<dyn EditableRepository> = Box::new(LanguageRecorder::default());
        assert_eq!(recorder.remove_glob("/x").unwrap(), 1);
        assert!(recorder.exists("/present").unwrap());
    }
}
