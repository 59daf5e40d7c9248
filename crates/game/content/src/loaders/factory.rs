//! Content factory for loading combat data from a data directory.

use std::path::{Path, PathBuf};

use combat_core::{CombatConfig, CombatEncounter};
use tokio::runtime::Handle;

use crate::loaders::{
    ConfigLoader, ContentLoader, ContentRegistry, EncounterLoader, FileFontSource, LoadResult,
};

/// Content factory that loads all combat content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml        (optional; defaults apply)
/// ├── content.toml
/// └── encounters/
///     ├── skirmish.ron
///     └── bridge.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub const CONFIG_FILE: &'static str = "config.toml";
    pub const CONTENT_FILE: &'static str = "content.toml";
    pub const ENCOUNTER_DIR: &'static str = "encounters";

    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load combat tunables from `config.toml`, falling back to defaults when
    /// the file does not exist.
    pub fn load_config(&self) -> LoadResult<CombatConfig> {
        let path = self.data_dir.join(Self::CONFIG_FILE);
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(CombatConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the sprite/font/class registry from `content.toml`.
    pub fn load_content(&self) -> LoadResult<ContentRegistry> {
        ContentLoader::load(&self.content_manifest())
    }

    /// Load an encounter from `encounters/{name}.ron`.
    pub fn load_encounter(&self, name: &str) -> LoadResult<CombatEncounter> {
        let path = self
            .data_dir
            .join(Self::ENCOUNTER_DIR)
            .join(format!("{}.ron", name));
        EncounterLoader::load(&path)
    }

    /// Names of every encounter file, sorted.
    pub fn encounter_names(&self) -> LoadResult<Vec<String>> {
        let dir = self.data_dir.join(Self::ENCOUNTER_DIR);
        let entries = std::fs::read_dir(&dir)
            .map_err(|e| anyhow::anyhow!("Failed to list {}: {}", dir.display(), e))?;
        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "ron")
                && let Some(stem) = path.file_stem().and_then(|stem| stem.to_str())
            {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Font source reading atlases from this directory's manifest.
    pub fn font_source(&self, runtime: Handle) -> FileFontSource {
        FileFontSource::new(self.content_manifest(), runtime)
    }

    fn content_manifest(&self) -> PathBuf {
        self.data_dir.join(Self::CONTENT_FILE)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
