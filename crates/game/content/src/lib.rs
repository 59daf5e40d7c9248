//! Data-driven combat content and loaders.
//!
//! This crate reads TOML/RON data files into combat-core types:
//! - Combat tunables (`config.toml`)
//! - Sprite, font, and class manifests (`content.toml`)
//! - Encounter definitions (`encounters/*.ron`)
//!
//! Content is consumed by the session and renderers and never appears in
//! combat state.

pub mod loaders;

pub use loaders::{
    ConfigLoader, ContentFactory, ContentLoader, ContentManifest, ContentRegistry, EncounterLoader,
    FileFontSource, LoadResult,
};
