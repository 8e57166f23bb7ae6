use std::{
    fs::File,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    batch::FailurePolicy,
    common::{DbLoadError, Error},
    generator::DEFAULT_NULL_PROBABILITY,
    schema::TableSchema,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// External collaborator executable.
    #[default]
    Process,
    /// In-process SQLite.
    Sqlite,
    /// Dry run to stdout.
    Print,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "process" => Ok(Self::Process),
            "sqlite" => Ok(Self::Sqlite),
            "print" => Ok(Self::Print),
            _ => Err(format!("Unknown backend: {s}. Use process, sqlite, or print")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub executable: PathBuf,
    /// Passed before the statement on every invocation.
    pub executable_args: Vec<String>,
    pub backend: Backend,
    pub rows: u32,
    pub seed: Option<u64>,
    pub null_probability: f64,
    /// JSON table schema, the `users` table when unset.
    pub schema: Option<PathBuf>,
    /// Files deleted before the batch starts.
    pub clean_glob: Option<String>,
    pub on_failure: FailurePolicy,
    pub sqlite_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("./target/release/db_project"),
            executable_args: vec![],
            backend: Backend::default(),
            rows: 1000,
            seed: None,
            null_probability: DEFAULT_NULL_PROBABILITY,
            schema: None,
            clean_glob: None,
            on_failure: FailurePolicy::default(),
            sqlite_path: ":memory:".into(),
        }
    }
}

impl Config {
    /// # Errors
    ///
    /// On file operations or malformed JSON.
    pub fn from_json_file(path: &Path) -> Result<Self, Error> {
        let config_file = File::open(path)
            .with_context(|| format!("Failed to open config file {}", path.display()))?;
        let config = serde_json::from_reader(config_file).context("Failed parsing config")?;
        Ok(config)
    }

    /// # Errors
    ///
    /// When a value is out of its allowed range.
    pub fn validate(&self) -> Result<(), Error> {
        if !(0.0..=1.0).contains(&self.null_probability) {
            return Err(DbLoadError::InvalidConfig(format!(
                "null_probability must be within 0..=1, got {}",
                self.null_probability
            ))
            .into());
        }
        if self.backend == Backend::Process && self.executable.as_os_str().is_empty() {
            return Err(DbLoadError::InvalidConfig("executable is empty".into()).into());
        }

        Ok(())
    }

    /// The configured schema file, or the `users` table.
    ///
    /// # Errors
    ///
    /// When the schema file cannot be loaded or fails validation.
    pub fn load_schema(&self) -> Result<TableSchema, Error> {
        let schema = match &self.schema {
            Some(path) => TableSchema::from_json_file(path)?,
            None => TableSchema::users(),
        };
        schema.validate()?;
        Ok(schema)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_config_file() {
        let path = std::env::temp_dir().join(format!("dbload_config_{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{ "rows": 5, "seed": 9, "backend": "sqlite", "on_failure": "continue" }"#,
        )
        .unwrap();

        let config = Config::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(5, config.rows);
        assert_eq!(Some(9), config.seed);
        assert_eq!(Backend::Sqlite, config.backend);
        assert_eq!(FailurePolicy::Continue, config.on_failure);
        assert_eq!(PathBuf::from("./target/release/db_project"), config.executable);
        assert!((config.null_probability - 0.5).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_null_probability() {
        let config = Config {
            null_probability: 1.5,
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DbLoadError>(),
            Some(DbLoadError::InvalidConfig(_))
        ));

        let config = Config {
            null_probability: f64::NAN,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_schema_is_users() {
        let schema = Config::default().load_schema().unwrap();
        assert_eq!(TableSchema::users(), schema);
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!(Ok(Backend::Print), "print".parse());
        assert_eq!(Ok(Backend::Sqlite), "SQLite".parse());
        assert!("mysql".parse::<Backend>().is_err());
    }
}
