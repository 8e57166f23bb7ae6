use log::info;

use crate::statement::StatementKind;

pub type Error = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum DbLoadError {
    #[error("Collaborator failed on {kind} statement (exit code: {exit_code:?}): {statement}")]
    InvocationFailed {
        kind: StatementKind,
        exit_code: Option<i32>,
        statement: String,
    },
    #[error("{0} statement(s) failed")]
    BatchFailed(usize),
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Removes every file matching `pattern`. Returns the number of files deleted.
///
/// # Errors
///
/// On invalid pattern or failed file removal.
pub fn delete_all_files_by_glob(pattern: &str) -> Result<usize, Error> {
    let mut deleted = 0usize;

    for entry in glob::glob(pattern)? {
        let path = entry?;
        if !path.is_file() {
            continue;
        }

        std::fs::remove_file(&path)?;
        info!("Deleted {}", path.display());
        deleted += 1;
    }

    Ok(deleted)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_delete_all_files_by_glob() {
        let dir = std::env::temp_dir().join(format!("dbload_glob_{}", std::process::id()));
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        std::fs::write(dir.join("data_1.bin"), b"x").unwrap();
        std::fs::write(dir.join("data_2.bin"), b"y").unwrap();
        std::fs::write(dir.join("keep.txt"), b"z").unwrap();

        let pattern = format!("{}/*", dir.display());
        let deleted = delete_all_files_by_glob(&format!("{}/data_*", dir.display())).unwrap();
        assert_eq!(2, deleted);

        let remaining: Vec<_> = glob::glob(&pattern).unwrap().flatten().collect();
        assert_eq!(2, remaining.len());
        assert!(dir.join("keep.txt").exists());
        assert!(dir.join("nested").is_dir());

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_delete_all_files_by_glob_bad_pattern() {
        assert!(delete_all_files_by_glob("[").is_err());
    }
}
