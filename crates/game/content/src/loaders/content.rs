//! Sprite, font, and class manifest loader.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use combat_core::{CombatEncounter, ContentLookup, EncounterError, FontAtlas, SpriteDef};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Manifest file format (`content.toml`).
///
/// ```toml
/// classes = ["knight", "goblin"]
///
/// [[sprites]]
/// id = "grass"
/// image = "tiles.png"
/// width = 12
/// height = 12
///
/// [[fonts]]
/// id = "pixel"
/// image = "pixel-font.png"
/// glyph_width = 4
/// glyph_height = 6
/// spacing = 1
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentManifest {
    pub classes: Vec<String>,
    pub sprites: Vec<SpriteDef>,
    pub fonts: Vec<FontAtlas>,
}

impl ContentManifest {
    pub fn parse(content: &str) -> LoadResult<Self> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse content TOML: {}", e))
    }
}

/// In-memory table of every known visual asset and unit class.
#[derive(Debug, Clone, Default)]
pub struct ContentRegistry {
    sprites: HashMap<String, SpriteDef>,
    fonts: HashMap<String, FontAtlas>,
    classes: HashSet<String>,
}

impl ContentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry, rejecting duplicate identifiers.
    pub fn from_manifest(manifest: ContentManifest) -> LoadResult<Self> {
        let mut registry = Self::new();
        for sprite in manifest.sprites {
            if registry.sprites.contains_key(&sprite.id) {
                anyhow::bail!("duplicate sprite id '{}'", sprite.id);
            }
            registry.insert_sprite(sprite);
        }
        for font in manifest.fonts {
            if registry.fonts.contains_key(&font.id) {
                anyhow::bail!("duplicate font id '{}'", font.id);
            }
            registry.insert_font(font);
        }
        registry.classes = manifest.classes.into_iter().collect();
        Ok(registry)
    }

    pub fn insert_sprite(&mut self, sprite: SpriteDef) {
        self.sprites.insert(sprite.id.clone(), sprite);
    }

    pub fn insert_font(&mut self, font: FontAtlas) {
        self.fonts.insert(font.id.clone(), font);
    }

    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }

    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    /// An empty class list accepts every class.
    pub fn has_class(&self, class_id: &str) -> bool {
        self.classes.is_empty() || self.classes.contains(class_id)
    }

    /// Identifiers from `ids` that have no sprite, in input order.
    pub fn missing_sprites<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        ids.into_iter()
            .filter(|id| !self.sprites.contains_key(*id))
            .map(str::to_string)
            .collect()
    }

    /// Checks an encounter's map, zones, and unit classes against this content.
    pub fn validate_encounter(&self, encounter: &CombatEncounter) -> Result<(), EncounterError> {
        encounter.validate()?;
        encounter.validate_classes(|class_id| self.has_class(class_id))
    }
}

impl ContentLookup for ContentRegistry {
    fn sprite(&self, id: &str) -> Option<&SpriteDef> {
        self.sprites.get(id)
    }

    fn font(&self, id: &str) -> Option<&FontAtlas> {
        self.fonts.get(id)
    }
}

/// Loader for `content.toml`.
pub struct ContentLoader;

impl ContentLoader {
    pub fn load(path: &Path) -> LoadResult<ContentRegistry> {
        let content = read_file(path)?;
        let manifest = ContentManifest::parse(&content)?;
        let registry = ContentRegistry::from_manifest(manifest)?;
        tracing::debug!(
            sprites = registry.sprite_count(),
            fonts = registry.font_count(),
            path = %path.display(),
            "content manifest loaded"
        );
        Ok(registry)
    }
}
