use std::{
    io::Write,
    path::PathBuf,
    process::{Command, Stdio},
};

use anyhow::Context;

use crate::{common::Error, statement::Statement};

/// Outcome of one statement submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// `None` when the collaborator was terminated by a signal.
    pub exit_code: Option<i32>,
    pub output: String,
}

impl Invocation {
    #[must_use]
    pub const fn succeeded(output: String) -> Self {
        Self {
            exit_code: Some(0),
            output,
        }
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Submits a single statement and waits for it to finish.
///
/// A failing statement is reported through [`Invocation::exit_code`]. `Err` is reserved for
/// not being able to submit at all.
pub trait Invoker {
    /// # Errors
    ///
    /// When the statement could not be submitted.
    fn invoke(&mut self, statement: &Statement) -> Result<Invocation, Error>;
}

/// Runs `<executable> [args...] <statement>` as a child process per statement.
pub struct ProcessInvoker {
    executable: PathBuf,
    args: Vec<String>,
}

impl ProcessInvoker {
    #[must_use]
    pub const fn new(executable: PathBuf, args: Vec<String>) -> Self {
        Self { executable, args }
    }
}

impl Invoker for ProcessInvoker {
    fn invoke(&mut self, statement: &Statement) -> Result<Invocation, Error> {
        let output = Command::new(&self.executable)
            .args(&self.args)
            .arg(&statement.text)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .with_context(|| format!("Failed to start {}", self.executable.display()))?;

        Ok(Invocation {
            exit_code: output.status.code(),
            output: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

/// Executes statements in-process against SQLite.
///
/// Success maps to exit code 0, any SQLite error to exit code 1 with the error as output.
/// Result rows are captured one per line, values separated by `|`.
pub struct SqliteInvoker {
    connection: sqlite::Connection,
}

impl SqliteInvoker {
    /// # Errors
    ///
    /// When the database cannot be opened.
    pub fn open(path: &str) -> Result<Self, Error> {
        let connection =
            sqlite::open(path).with_context(|| format!("Failed to open sqlite db {path}"))?;
        Ok(Self { connection })
    }
}

impl Invoker for SqliteInvoker {
    fn invoke(&mut self, statement: &Statement) -> Result<Invocation, Error> {
        let mut output = String::new();

        let result = self.connection.iterate(&statement.text, |pairs| {
            let line = pairs
                .iter()
                .map(|(_, value)| value.unwrap_or("NULL"))
                .collect::<Vec<_>>()
                .join("|");
            output.push_str(&line);
            output.push('\n');
            true
        });

        Ok(match result {
            Ok(()) => Invocation::succeeded(output),
            Err(err) => Invocation {
                exit_code: Some(1),
                output: err.to_string(),
            },
        })
    }
}

/// Dry run: writes every statement on its own line.
pub struct PrintInvoker<W: Write> {
    out: W,
}

impl<W: Write> PrintInvoker<W> {
    #[must_use]
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    #[must_use]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Invoker for PrintInvoker<W> {
    fn invoke(&mut self, statement: &Statement) -> Result<Invocation, Error> {
        writeln!(self.out, "{statement}")?;
        self.out.flush()?;
        Ok(Invocation::succeeded(String::new()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::statement::StatementKind;

    fn statement(text: &str) -> Statement {
        Statement {
            kind: StatementKind::Insert,
            text: text.into(),
        }
    }

    #[test]
    fn test_print_invoker() {
        let mut invoker = PrintInvoker::new(vec![]);
        assert!(invoker.invoke(&statement("SELECT * FROM a;")).unwrap().success());
        assert!(invoker.invoke(&statement("SELECT * FROM b;")).unwrap().success());

        assert_eq!(
            "SELECT * FROM a;\nSELECT * FROM b;\n",
            String::from_utf8(invoker.into_inner()).unwrap()
        );
    }

    #[test]
    fn test_sqlite_invoker() {
        let mut invoker = SqliteInvoker::open(":memory:").unwrap();

        let created = invoker
            .invoke(&statement("CREATE TABLE t (a INT NOT NULL, b STRING(10));"))
            .unwrap();
        assert!(created.success());

        assert!(invoker
            .invoke(&statement("INSERT INTO t VALUES (1, 'x');"))
            .unwrap()
            .success());
        assert!(invoker
            .invoke(&statement("INSERT INTO t VALUES (2, NULL);"))
            .unwrap()
            .success());

        let selected = invoker.invoke(&statement("SELECT * FROM t;")).unwrap();
        assert!(selected.success());
        assert_eq!("1|x\n2|NULL\n", selected.output);
    }

    #[test]
    fn test_sqlite_invoker_failure() {
        let mut invoker = SqliteInvoker::open(":memory:").unwrap();
        invoker
            .invoke(&statement("CREATE TABLE t (a INT NOT NULL);"))
            .unwrap();

        let failed = invoker.invoke(&statement("INSERT INTO t VALUES (NULL);")).unwrap();
        assert!(!failed.success());
        assert_eq!(Some(1), failed.exit_code);
        assert!(!failed.output.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_process_invoker_exit_codes() {
        let mut ok = ProcessInvoker::new("sh".into(), vec!["-c".into(), "exit 0".into()]);
        assert!(ok.invoke(&statement("SELECT * FROM t;")).unwrap().success());

        let mut failing = ProcessInvoker::new("sh".into(), vec!["-c".into(), "exit 3".into()]);
        let invocation = failing.invoke(&statement("SELECT * FROM t;")).unwrap();
        assert!(!invocation.success());
        assert_eq!(Some(3), invocation.exit_code);
    }

    #[cfg(unix)]
    #[test]
    fn test_process_invoker_passes_statement_as_single_argument() {
        // The statement lands in $0 of the inline script.
        let mut invoker = ProcessInvoker::new(
            "sh".into(),
            vec!["-c".into(), r#"printf '%s' "$0""#.into()],
        );
        let text = "INSERT INTO t VALUES (1, 'a b', NULL);";

        let invocation = invoker.invoke(&statement(text)).unwrap();
        assert!(invocation.success());
        assert_eq!(text, invocation.output);
    }

    #[test]
    fn test_process_invoker_missing_executable() {
        let mut invoker = ProcessInvoker::new("/nonexistent/dbload-collaborator".into(), vec![]);
        assert!(invoker.invoke(&statement("SELECT * FROM t;")).is_err());
    }
}
