use crate::error::Error;
use crate::provide::ProvideSharedOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default name of the federation options file, looked up in the cwd.
pub const DEFAULT_CONFIG_FILE: &str = "federation.json";

/// Runtime configuration for the fedshare CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Current working directory.
    pub cwd: PathBuf,

    /// Whether to emit JSON logs.
    pub json_logs: bool,

    /// Verbosity level (0 = INFO, 1 = DEBUG, 2+ = TRACE).
    pub verbosity: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            json_logs: false,
            verbosity: 0,
        }
    }
}

impl Config {
    /// Create a new config with the given working directory.
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            ..Default::default()
        }
    }

    /// Set verbosity level.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set JSON log output.
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }

    /// Path of the federation options file, relative paths taken from `cwd`.
    #[must_use]
    pub fn options_path(&self, explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => self.cwd.join(path),
            None => self.cwd.join(DEFAULT_CONFIG_FILE),
        }
    }
}

/// Read provide options from a JSON file.
///
/// Only the file shape is checked here. Malformed provide entries are
/// reported later by [`crate::normalize_provides`].
pub fn load_provide_options(path: &Path) -> Result<ProvideSharedOptions, Error> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_options_path_defaults_to_cwd() {
        let config = Config::new(PathBuf::from("/project"));
        assert_eq!(
            config.options_path(None),
            PathBuf::from("/project/federation.json")
        );
        assert_eq!(
            config.options_path(Some(Path::new("conf/mf.json"))),
            PathBuf::from("/project/conf/mf.json")
        );
        assert_eq!(
            config.options_path(Some(Path::new("/etc/mf.json"))),
            PathBuf::from("/etc/mf.json")
        );
    }

    #[test]
    fn test_load_provide_options() {
        let dir = tempdir().unwrap();
        let file = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(
            &file,
            r#"{"shareScope": "app", "provides": {"react": "react"}}"#,
        )
        .unwrap();

        let options = load_provide_options(&file).unwrap();
        assert_eq!(options.share_scope.as_deref(), Some("app"));
        assert!(options.provides.is_object());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_provide_options(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempdir().unwrap();
        let file = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&file, "{ not json").unwrap();

        let err = load_provide_options(&file).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
        assert_eq!(err.code(), "CONFIG_PARSE_FAILED");
    }
}
