//! `VersionedStore` backed by the `dolt` command line tool.
//!
//! Commands used:
//! ```text
//! dolt clone <owner/name> <dir>
//! dolt sql -q <query> -r json      (run inside <dir>)
//! ```

use crate::store::{Repository, Row, StoreError, VersionedStore};
use serde_json::Value;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// How to invoke dolt: a program plus arguments placed before the subcommand.
#[derive(Debug, Clone)]
struct Invocation {
    program: PathBuf,
    leading_args: Vec<OsString>,
}

impl Invocation {
    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args);
        cmd
    }

    fn run(&self, args: &[&OsStr], cwd: Option<&Path>) -> Result<Output, StoreError> {
        let mut cmd = self.command();
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let label = format!(
            "dolt {}",
            args.first()
                .map(|a| a.to_string_lossy().into_owned())
                .unwrap_or_default()
        );
        tracing::debug!(command = %label, cwd = ?cwd, "running");

        let output = cmd.output().map_err(|source| StoreError::Spawn {
            command: label.clone(),
            source,
        })?;
        if !output.status.success() {
            return Err(StoreError::CommandFailed {
                command: label,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }
}

/// Dolt client that shells out to the `dolt` binary.
#[derive(Debug, Clone)]
pub struct DoltCli {
    invocation: Invocation,
}

impl DoltCli {
    /// Find `dolt` on `PATH`.
    pub fn locate() -> Result<Self, StoreError> {
        let program =
            which::which("dolt").map_err(|_| StoreError::BinaryNotFound("dolt".into()))?;
        Ok(Self::with_binary(program))
    }

    pub fn with_binary(program: impl Into<PathBuf>) -> Self {
        Self::with_wrapper(program, Vec::<OsString>::new())
    }

    /// Run dolt through another program, e.g. `docker run ... dolt`.
    pub fn with_wrapper(
        program: impl Into<PathBuf>,
        leading_args: impl IntoIterator<Item = impl Into<OsString>>,
    ) -> Self {
        Self {
            invocation: Invocation {
                program: program.into(),
                leading_args: leading_args.into_iter().map(Into::into).collect(),
            },
        }
    }
}

impl VersionedStore for DoltCli {
    type Repo = DoltRepo;

    fn clone_repo(&self, remote: &str, dir: &Path) -> Result<DoltRepo, StoreError> {
        tracing::debug!(%remote, dir = %dir.display(), "dolt clone");
        self.invocation
            .run(&[OsStr::new("clone"), OsStr::new(remote), dir.as_os_str()], None)?;
        self.open(dir)
    }

    fn open(&self, dir: &Path) -> Result<DoltRepo, StoreError> {
        if !dir.join(".dolt").is_dir() {
            return Err(StoreError::NotARepository(dir.to_path_buf()));
        }
        tracing::debug!(dir = %dir.display(), "opened repository");
        Ok(DoltRepo {
            invocation: self.invocation.clone(),
            dir: dir.to_path_buf(),
        })
    }
}

/// A local dolt clone.
#[derive(Debug, Clone)]
pub struct DoltRepo {
    invocation: Invocation,
    dir: PathBuf,
}

impl Repository for DoltRepo {
    fn dir(&self) -> &Path {
        &self.dir
    }

    fn sql(&self, query: &str) -> Result<Vec<Row>, StoreError> {
        let output = self.invocation.run(
            &[
                OsStr::new("sql"),
                OsStr::new("-q"),
                OsStr::new(query.trim()),
                OsStr::new("-r"),
                OsStr::new("json"),
            ],
            Some(&self.dir),
        )?;
        let rows = parse_rows(&String::from_utf8_lossy(&output.stdout))?;
        tracing::debug!(rows = rows.len(), "query returned");
        Ok(rows)
    }
}

/// Parse `dolt sql -r json` output.
///
/// Dolt prints `{"rows": [...]}`; an empty result may print nothing or omit
/// `rows`. Values are rendered as text and `null` becomes the empty string.
pub fn parse_rows(stdout: &str) -> Result<Vec<Row>, StoreError> {
    let stdout = stdout.trim();
    if stdout.is_empty() {
        return Ok(Vec::new());
    }
    let json: Value = serde_json::from_str(stdout)?;
    let Some(obj) = json.as_object() else {
        return Err(StoreError::UnexpectedOutput(truncate(stdout)));
    };
    let Some(rows) = obj.get("rows") else {
        return Ok(Vec::new());
    };
    let rows = rows
        .as_array()
        .ok_or_else(|| StoreError::UnexpectedOutput(truncate(stdout)))?;

    rows.iter()
        .map(|row| -> Result<Row, StoreError> {
            let fields = row
                .as_object()
                .ok_or_else(|| StoreError::UnexpectedOutput(row.to_string()))?;
            Ok(fields
                .iter()
                .map(|(k, v)| (k.clone(), render_value(v)))
                .collect())
        })
        .collect()
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truncate(s: &str) -> String {
    s.chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_as_text() {
        let rows = parse_rows(
            r#"{"rows": [{"id": 42, "text": "Make it so", "retweet": false, "device": null}]}"#,
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], "42");
        assert_eq!(rows[0]["text"], "Make it so");
        assert_eq!(rows[0]["retweet"], "false");
        assert_eq!(rows[0]["device"], "");
    }

    #[test]
    fn empty_output_means_no_rows() {
        assert!(parse_rows("").unwrap().is_empty());
        assert!(parse_rows("  \n").unwrap().is_empty());
        assert!(parse_rows("{}").unwrap().is_empty());
        assert!(parse_rows(r#"{"rows": []}"#).unwrap().is_empty());
    }

    #[test]
    fn malformed_output_is_an_error() {
        assert!(matches!(parse_rows("not json"), Err(StoreError::Json(_))));
        assert!(matches!(
            parse_rows("[1, 2]"),
            Err(StoreError::UnexpectedOutput(_))
        ));
        assert!(matches!(
            parse_rows(r#"{"rows": [1]}"#),
            Err(StoreError::UnexpectedOutput(_))
        ));
    }

    #[test]
    fn open_requires_dolt_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let cli = DoltCli::with_binary("dolt");
        assert!(matches!(
            cli.open(tmp.path()),
            Err(StoreError::NotARepository(_))
        ));
        std::fs::create_dir(tmp.path().join(".dolt")).unwrap();
        let repo = cli.open(tmp.path()).unwrap();
        assert_eq!(repo.dir(), tmp.path());
    }

    #[test]
    fn missing_binary_fails_to_spawn() {
        let tmp = tempfile::tempdir().unwrap();
        let cli = DoltCli::with_binary(tmp.path().join("no-such-dolt"));
        assert!(matches!(
            cli.clone_repo("owner/data", &tmp.path().join("clone")),
            Err(StoreError::Spawn { .. })
        ));
    }

    /// A stand-in for dolt, run through `sh` so the script is never exec'd
    /// directly.
    #[cfg(unix)]
    fn fake_dolt(dir: &Path) -> (DoltCli, PathBuf) {
        let log = dir.join("calls.log");
        let script = dir.join("fake-dolt.sh");
        std::fs::write(
            &script,
            format!(
                r#"echo "$@" >> "{log}"
case "$1" in
  clone) mkdir -p "$3/.dolt" ;;
  sql) echo '{{"rows": [{{"id": 7, "text": "hello from dolt"}}]}}' ;;
  *) echo "unknown command $1" >&2; exit 3 ;;
esac
"#,
                log = log.display()
            ),
        )
        .unwrap();
        (DoltCli::with_wrapper("sh", [script]), log)
    }

    #[cfg(unix)]
    #[test]
    fn clone_then_query_through_cli() {
        let tmp = tempfile::tempdir().unwrap();
        let (cli, log) = fake_dolt(tmp.path());
        let dir = tmp.path().join("tweets");

        let repo = cli.clone_repo("alexis-evelyn/presidential-tweets", &dir).unwrap();
        assert!(dir.join(".dolt").is_dir());

        let rows = repo
            .sql("select * from tweets order by rand() limit 1;")
            .unwrap();
        assert_eq!(rows[0]["text"], "hello from dolt");

        let calls = std::fs::read_to_string(log).unwrap();
        let lines: Vec<&str> = calls.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("clone alexis-evelyn/presidential-tweets"));
        assert!(lines[1].starts_with("sql -q select * from tweets"));
        assert!(lines[1].ends_with("-r json"));
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_reports_stderr() {
        let tmp = tempfile::tempdir().unwrap();
        let script = tmp.path().join("broken.sh");
        std::fs::write(&script, "echo 'remote not found' >&2\nexit 1\n").unwrap();
        let cli = DoltCli::with_wrapper("sh", [script]);

        match cli.clone_repo("nobody/nothing", &tmp.path().join("x")) {
            Err(StoreError::CommandFailed { command, code, stderr }) => {
                assert_eq!(command, "dolt clone");
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "remote not found");
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }
}
