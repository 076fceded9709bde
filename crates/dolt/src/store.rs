use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One result row: column name to value, rendered as text.
pub type Row = BTreeMap<String, String>;

/// Errors from versioned store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("`{0}` not found on PATH")]
    BinaryNotFound(String),
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with {}: {stderr}", .code.map_or_else(|| "a signal".to_string(), |c| format!("status {c}")))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected query output: {0}")]
    UnexpectedOutput(String),
    #[error("{0} is not a repository")]
    NotARepository(PathBuf),
}

/// A local clone that can answer SQL queries.
pub trait Repository {
    fn dir(&self) -> &Path;

    fn sql(&self, query: &str) -> Result<Vec<Row>, StoreError>;
}

/// Something that can materialize repositories on disk.
pub trait VersionedStore {
    type Repo: Repository;

    /// Clone `remote` (an `owner/name` identifier) into `dir`.
    fn clone_repo(&self, remote: &str, dir: &Path) -> Result<Self::Repo, StoreError>;

    /// Open the existing clone at `dir`.
    fn open(&self, dir: &Path) -> Result<Self::Repo, StoreError>;
}
