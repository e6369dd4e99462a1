use std::env;
use std::path::PathBuf;

use crate::constants::envvars;

/// Loads `./.env`, then `$SOLIS_INGEST_HOME/.env` if that variable is set.
/// Variables already in the environment win over both files.
///
/// Runs before the logger exists, so the files that were read are returned
/// for the caller to log once logging is up.
pub fn load_dotenv() -> Vec<PathBuf> {
    let mut loaded = vec![];
    if let Ok(path) = dotenv::dotenv() {
        loaded.push(path);
    }
    if let Ok(home) = env::var(envvars::HOME_DIR) {
        let home_dotenv = PathBuf::from(home).join(".env");
        if dotenv::from_path(&home_dotenv).is_ok() {
            loaded.push(home_dotenv);
        }
    }
    loaded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_home_dotenv() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "SOLIS_INGEST_DOTENV_TEST=from-home\n").unwrap();

        temp_env::with_vars(
            [
                (envvars::HOME_DIR, Some(dir.path().as_os_str())),
                ("SOLIS_INGEST_DOTENV_TEST", None),
            ],
            || {
                let loaded = load_dotenv();
                assert!(loaded.contains(&dir.path().join(".env")));
                assert_eq!(env::var("SOLIS_INGEST_DOTENV_TEST").as_deref(), Ok("from-home"));
            },
        );
    }

    #[test]
    fn test_missing_home_dotenv_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        temp_env::with_var(envvars::HOME_DIR, Some(dir.path().as_os_str()), || {
            assert!(!load_dotenv().contains(&dir.path().join(".env")));
        });
    }
}
