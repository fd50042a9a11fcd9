use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "speedpace";
const CONFIG_FILE: &str = "config.json";
const DB_FILE: &str = "reading.db";
/// Used when no home directory can be found at all.
const FALLBACK_DIR: &str = ".speedpace";

/// Where speedpace keeps its settings and its reading database.
///
/// Settings go to the platform config dir. The database is state rather
/// than data, so it lives under `$XDG_STATE_HOME/speedpace` on Linux and the
/// local data dir elsewhere. Without a home directory both fall back to
/// `./.speedpace`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    config_dir: PathBuf,
    state_dir: PathBuf,
}

impl AppDirs {
    pub fn resolve() -> Self {
        match ProjectDirs::from("", "", APP_NAME) {
            Some(dirs) => Self::from_project_dirs(&dirs),
            None => Self::rooted_at(FALLBACK_DIR),
        }
    }

    fn from_project_dirs(dirs: &ProjectDirs) -> Self {
        let state_dir = dirs
            .state_dir()
            .unwrap_or_else(|| dirs.data_local_dir())
            .to_path_buf();
        Self {
            config_dir: dirs.config_dir().to_path_buf(),
            state_dir,
        }
    }

    /// Keep everything under one directory.
    pub fn rooted_at<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        Self {
            config_dir: root.to_path_buf(),
            state_dir: root.to_path_buf(),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    pub fn db_path(&self) -> PathBuf {
        self.state_dir.join(DB_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_paths_are_named_for_the_app() {
        let dirs = AppDirs::resolve();
        assert!(dirs.db_path().ends_with(DB_FILE));
        assert!(dirs.config_path().ends_with(CONFIG_FILE));
        assert!(dirs.db_path().to_string_lossy().contains(APP_NAME));
    }

    #[test]
    fn test_rooted_keeps_both_files_together() {
        let dirs = AppDirs::rooted_at("/tmp/reader");
        assert_eq!(dirs.config_path(), PathBuf::from("/tmp/reader/config.json"));
        assert_eq!(dirs.db_path(), PathBuf::from("/tmp/reader/reading.db"));
    }
}
