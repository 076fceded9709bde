use crate::{StageError, WorkingDirectories};
use tweetstage_dolt::VersionedStore;

/// Make sure a local clone of `remote` exists and open it.
///
/// Creates the working directory if needed, clones into the tweets directory
/// when it is absent and opens it otherwise. There is no retry; the first
/// failure is returned.
pub fn ensure_local_clone<S: VersionedStore>(
    dirs: &WorkingDirectories,
    remote: &str,
    store: &S,
) -> Result<S::Repo, StageError> {
    if !dirs.working_directory.exists() {
        tracing::info!(path = %dirs.working_directory.display(), "creating working directory");
        std::fs::create_dir_all(&dirs.working_directory).map_err(|source| {
            StageError::CreateDir {
                path: dirs.working_directory.clone(),
                source,
            }
        })?;
    }

    let repo = if dirs.tweets_directory.exists() {
        tracing::debug!(path = %dirs.tweets_directory.display(), "opening existing clone");
        store.open(&dirs.tweets_directory)?
    } else {
        tracing::info!(%remote, path = %dirs.tweets_directory.display(), "cloning repository");
        store.clone_repo(remote, &dirs.tweets_directory)?
    };
    Ok(repo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::path::{Path, PathBuf};
    use tweetstage_dolt::{Repository, Row, StoreError};

    struct StubRepo(PathBuf);

    impl Repository for StubRepo {
        fn dir(&self) -> &Path {
            &self.0
        }

        fn sql(&self, _query: &str) -> Result<Vec<Row>, StoreError> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct CountingStore {
        clones: Cell<u32>,
        opens: Cell<u32>,
    }

    impl VersionedStore for CountingStore {
        type Repo = StubRepo;

        fn clone_repo(&self, _remote: &str, dir: &Path) -> Result<StubRepo, StoreError> {
            self.clones.set(self.clones.get() + 1);
            std::fs::create_dir_all(dir)?;
            Ok(StubRepo(dir.to_path_buf()))
        }

        fn open(&self, dir: &Path) -> Result<StubRepo, StoreError> {
            self.opens.set(self.opens.get() + 1);
            Ok(StubRepo(dir.to_path_buf()))
        }
    }

    #[test]
    fn second_bootstrap_opens_instead_of_cloning() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = WorkingDirectories::under(tmp.path().join("working"));
        let store = CountingStore::default();

        let first = ensure_local_clone(&dirs, "owner/tweets", &store).unwrap();
        assert!(dirs.working_directory.is_dir());
        assert_eq!(first.dir(), dirs.tweets_directory);

        let second = ensure_local_clone(&dirs, "owner/tweets", &store).unwrap();
        assert_eq!(second.dir(), dirs.tweets_directory);
        assert_eq!(store.clones.get(), 1);
        assert_eq!(store.opens.get(), 1);
    }

    #[test]
    fn existing_clone_is_opened() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = WorkingDirectories::under(tmp.path());
        std::fs::create_dir_all(&dirs.tweets_directory).unwrap();
        let store = CountingStore::default();

        ensure_local_clone(&dirs, "owner/tweets", &store).unwrap();
        assert_eq!(store.clones.get(), 0);
        assert_eq!(store.opens.get(), 1);
    }

    #[test]
    fn unusable_working_directory_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();
        let dirs = WorkingDirectories::under(blocker.join("working"));

        let err = ensure_local_clone(&dirs, "owner/tweets", &CountingStore::default());
        assert!(matches!(err, Err(StageError::CreateDir { .. })));
    }

    #[test]
    fn clone_failure_propagates() {
        struct FailingStore;
        impl VersionedStore for FailingStore {
            type Repo = StubRepo;
            fn clone_repo(&self, _remote: &str, _dir: &Path) -> Result<StubRepo, StoreError> {
                Err(StoreError::CommandFailed {
                    command: "dolt clone".into(),
                    code: Some(1),
                    stderr: "remote not found".into(),
                })
            }
            fn open(&self, dir: &Path) -> Result<StubRepo, StoreError> {
                Ok(StubRepo(dir.to_path_buf()))
            }
        }

        let tmp = tempfile::tempdir().unwrap();
        let dirs = WorkingDirectories::under(tmp.path().join("w"));
        let err = ensure_local_clone(&dirs, "nobody/nothing", &FailingStore);
        assert!(matches!(err, Err(StageError::Store(StoreError::CommandFailed { .. }))));
        assert!(!dirs.tweets_directory.exists());
    }
}
