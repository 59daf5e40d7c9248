//! Combat configuration loader.

use std::path::Path;

use combat_core::CombatConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for combat tunables from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Keys absent from the file keep their defaults.
    pub fn load(path: &Path) -> LoadResult<CombatConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<CombatConfig> {
        let config: CombatConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        if config.zone_alpha_min > config.zone_alpha_max {
            anyhow::bail!(
                "zone_alpha_min ({}) exceeds zone_alpha_max ({})",
                config.zone_alpha_min,
                config.zone_alpha_max
            );
        }
        if config.tile_size == 0 {
            anyhow::bail!("tile_size must be positive");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ConfigLoader::parse("ai_thinking_delay = 0.1\ntile_size = 16\n").unwrap();
        assert_eq!(config.ai_thinking_delay, 0.1);
        assert_eq!(config.tile_size, 16);
        assert_eq!(config.stagger_delay, CombatConfig::DEFAULT_STAGGER_DELAY);
    }

    #[test]
    fn inverted_alpha_range_is_rejected() {
        let err = ConfigLoader::parse("zone_alpha_min = 0.9\nzone_alpha_max = 0.1\n").unwrap_err();
        assert!(err.to_string().contains("zone_alpha_min"));
    }
}
