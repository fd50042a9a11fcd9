use crate::app_dirs::AppDirs;
use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const MIN_WPM: u32 = 100;
pub const MAX_WPM: u32 = 1000;
pub const DEFAULT_WPM: u32 = 250;
pub const CHUNK_SIZE_RANGE: RangeInclusive<usize> = 2..=5;
pub const FONT_SIZE_RANGE: RangeInclusive<u32> = 24..=72;

/// Live pacing parameters. Setters clamp out-of-range input instead of
/// rejecting it, since every value comes from a slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacingConfig {
    wpm: u32,
    chunking_enabled: bool,
    chunk_size: usize,
    font_size: u32,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            wpm: DEFAULT_WPM,
            chunking_enabled: false,
            chunk_size: 2,
            font_size: 48,
        }
    }
}

impl PacingConfig {
    pub fn new(wpm: u32, chunking_enabled: bool, chunk_size: usize, font_size: u32) -> Self {
        let mut cfg = Self::default();
        cfg.set_wpm(wpm);
        cfg.set_chunking_enabled(chunking_enabled);
        cfg.set_chunk_size(chunk_size);
        cfg.set_font_size(font_size);
        cfg
    }

    pub fn wpm(&self) -> u32 {
        self.wpm
    }

    pub fn chunking_enabled(&self) -> bool {
        self.chunking_enabled
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn font_size(&self) -> u32 {
        self.font_size
    }

    /// Words shown per tick: 1 unless chunking is on.
    pub fn effective_chunk_size(&self) -> usize {
        if self.chunking_enabled {
            self.chunk_size
        } else {
            1
        }
    }

    pub fn set_wpm(&mut self, wpm: u32) {
        self.wpm = wpm.clamp(MIN_WPM, MAX_WPM);
        if self.wpm != wpm {
            debug!(requested = wpm, applied = self.wpm, "wpm clamped");
        }
    }

    pub fn set_chunk_size(&mut self, size: usize) {
        self.chunk_size = size.clamp(*CHUNK_SIZE_RANGE.start(), *CHUNK_SIZE_RANGE.end());
    }

    pub fn set_chunking_enabled(&mut self, enabled: bool) {
        self.chunking_enabled = enabled;
    }

    pub fn set_font_size(&mut self, size: u32) {
        self.font_size = size.clamp(*FONT_SIZE_RANGE.start(), *FONT_SIZE_RANGE.end());
    }
}

/// Supplies the pacing parameters a new reading session starts with.
pub trait UserDefaults {
    fn initial_pacing_config(&self) -> PacingConfig;
}

/// Persisted user preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub default_wpm: u32,
    pub font_size: u32,
    pub chunking_enabled: bool,
    pub chunk_size: usize,
    /// measured by the baseline test, if the user took it
    pub baseline_wpm: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_wpm: DEFAULT_WPM,
            font_size: 48,
            chunking_enabled: false,
            chunk_size: 2,
            baseline_wpm: None,
        }
    }
}

impl Config {
    /// A WPM the user picked wins; an untouched default defers to the
    /// baseline measurement when there is one.
    pub fn effective_wpm(&self) -> u32 {
        if self.default_wpm != DEFAULT_WPM {
            self.default_wpm
        } else {
            self.baseline_wpm
                .filter(|&wpm| wpm > 0)
                .unwrap_or(DEFAULT_WPM)
        }
    }

    /// Fold live settings back in so the next session starts from them.
    pub fn remember(&mut self, pacing: &PacingConfig) {
        self.default_wpm = pacing.wpm();
        self.font_size = pacing.font_size();
        self.chunking_enabled = pacing.chunking_enabled();
        self.chunk_size = pacing.chunk_size();
    }
}

impl From<&PacingConfig> for Config {
    fn from(pacing: &PacingConfig) -> Self {
        let mut cfg = Config::default();
        cfg.remember(pacing);
        cfg
    }
}

impl UserDefaults for Config {
    fn initial_pacing_config(&self) -> PacingConfig {
        PacingConfig::new(
            self.effective_wpm(),
            self.chunking_enabled,
            self.chunk_size,
            self.font_size,
        )
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self::with_path(AppDirs::resolve().config_path())
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(path = %self.path.display(), "invalid config json: {err}");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_wpm_is_clamped() {
        let mut cfg = PacingConfig::default();
        cfg.set_wpm(50);
        assert_eq!(cfg.wpm(), 100);
        cfg.set_wpm(5000);
        assert_eq!(cfg.wpm(), 1000);
        cfg.set_wpm(420);
        assert_eq!(cfg.wpm(), 420);
    }

    #[test]
    fn test_chunk_and_font_are_clamped() {
        let mut cfg = PacingConfig::default();
        cfg.set_chunk_size(1);
        assert_eq!(cfg.chunk_size(), 2);
        cfg.set_chunk_size(9);
        assert_eq!(cfg.chunk_size(), 5);
        cfg.set_font_size(8);
        assert_eq!(cfg.font_size(), 24);
        cfg.set_font_size(200);
        assert_eq!(cfg.font_size(), 72);
    }

    #[test]
    fn test_effective_chunk_size() {
        let mut cfg = PacingConfig::new(300, false, 4, 48);
        assert_eq!(cfg.effective_chunk_size(), 1);
        cfg.set_chunking_enabled(true);
        assert_eq!(cfg.effective_chunk_size(), 4);
    }

    #[test]
    fn test_effective_wpm_prefers_user_choice() {
        let cfg = Config {
            default_wpm: 320,
            baseline_wpm: Some(180),
            ..Config::default()
        };
        assert_eq!(cfg.effective_wpm(), 320);
    }

    #[test]
    fn test_effective_wpm_falls_back_to_baseline() {
        let cfg = Config {
            baseline_wpm: Some(180),
            ..Config::default()
        };
        assert_eq!(cfg.effective_wpm(), 180);
        assert_eq!(Config::default().effective_wpm(), DEFAULT_WPM);
        let cfg = Config {
            baseline_wpm: Some(0),
            ..Config::default()
        };
        assert_eq!(cfg.effective_wpm(), DEFAULT_WPM);
    }

    #[test]
    fn test_initial_pacing_config_clamps_stored_values() {
        let cfg = Config {
            baseline_wpm: Some(60),
            chunk_size: 12,
            font_size: 10,
            ..Config::default()
        };
        let pacing = cfg.initial_pacing_config();
        assert_eq!(pacing.wpm(), 100);
        assert_eq!(pacing.chunk_size(), 5);
        assert_eq!(pacing.font_size(), 24);
    }

    #[test]
    fn test_remember_pacing() {
        let pacing = PacingConfig::new(480, true, 3, 60);
        let cfg = Config::from(&pacing);
        assert_eq!(cfg.default_wpm, 480);
        assert!(cfg.chunking_enabled);
        assert_eq!(cfg.chunk_size, 3);
        assert_eq!(cfg.font_size, 60);
        assert_eq!(cfg.initial_pacing_config(), pacing);
    }

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn missing_or_corrupt_file_yields_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"{ not json").unwrap();
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, br#"{ "default_wpm": 400 }"#).unwrap();
        let loaded = FileConfigStore::with_path(&path).load();
        assert_eq!(loaded.default_wpm, 400);
        assert_eq!(loaded.chunk_size, 2);
        assert_eq!(loaded.baseline_wpm, None);
    }
}
