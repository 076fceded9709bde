use std::path::PathBuf;

/// Where the local clone lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingDirectories {
    pub working_directory: PathBuf,
    /// Clone target; normally inside `working_directory`.
    pub tweets_directory: PathBuf,
}

impl WorkingDirectories {
    /// `<working>/tweets` under the given working directory.
    pub fn under(working_directory: impl Into<PathBuf>) -> Self {
        let working_directory = working_directory.into();
        let tweets_directory = working_directory.join("tweets");
        Self {
            working_directory,
            tweets_directory,
        }
    }
}

impl Default for WorkingDirectories {
    fn default() -> Self {
        Self::under("working")
    }
}

/// What to show when the tweet query returns no rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EmptyResultPolicy {
    /// Fail startup with `StageError::EmptyResult`.
    #[default]
    Abort,
    /// Show this text instead.
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageConfig {
    pub directories: WorkingDirectories,
    /// `owner/name` of the remote Dolt repository.
    pub remote: String,
    /// Root that asset names such as `models/environment` resolve against.
    pub asset_dir: PathBuf,
    pub on_empty: EmptyResultPolicy,
}

impl StageConfig {
    pub const DEFAULT_REMOTE: &'static str = "alexis-evelyn/presidential-tweets";
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            directories: WorkingDirectories::default(),
            remote: Self::DEFAULT_REMOTE.to_string(),
            asset_dir: PathBuf::from("assets"),
            on_empty: EmptyResultPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn defaults_match_fixed_layout() {
        let config = StageConfig::default();
        assert_eq!(config.directories.working_directory, Path::new("working"));
        assert_eq!(config.directories.tweets_directory, Path::new("working/tweets"));
        assert_eq!(config.remote, "alexis-evelyn/presidential-tweets");
        assert_eq!(config.on_empty, EmptyResultPolicy::Abort);
    }
}
