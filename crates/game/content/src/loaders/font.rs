//! Asynchronous font-atlas loading from the content manifest.

use std::path::{Path, PathBuf};

use combat_core::{ContentError, FontAtlas, FontLoad, FontSource};
use tokio::runtime::Handle;
use tokio::sync::oneshot;

use crate::loaders::ContentManifest;

/// Loads font atlases from `content.toml` on a tokio task.
///
/// Each request re-reads the manifest, so fonts added while the game is
/// running become loadable without a restart.
#[derive(Debug, Clone)]
pub struct FileFontSource {
    manifest: PathBuf,
    runtime: Handle,
}

impl FileFontSource {
    pub fn new(manifest: impl Into<PathBuf>, runtime: Handle) -> Self {
        Self {
            manifest: manifest.into(),
            runtime,
        }
    }

    /// Uses the runtime of the calling context.
    pub fn current(manifest: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| anyhow::anyhow!("FileFontSource needs a tokio runtime: {}", e))?;
        Ok(Self::new(manifest, runtime))
    }

    pub fn manifest(&self) -> &Path {
        &self.manifest
    }
}

async fn read_font(manifest: PathBuf, id: String) -> Result<FontAtlas, ContentError> {
    let failed = |reason: String| ContentError::LoadFailed {
        id: id.clone(),
        reason,
    };
    let content = tokio::fs::read_to_string(&manifest)
        .await
        .map_err(|e| failed(format!("{}: {}", manifest.display(), e)))?;
    let parsed = ContentManifest::parse(&content).map_err(|e| failed(e.to_string()))?;
    parsed
        .fonts
        .into_iter()
        .find(|font| font.id == id)
        .ok_or_else(|| ContentError::UnknownFont(id.clone()))
}

impl FontSource for FileFontSource {
    fn load_font(&self, id: &str) -> FontLoad {
        let (tx, rx) = oneshot::channel();
        let manifest = self.manifest.clone();
        let id = id.to_string();
        self.runtime.spawn(async move {
            let result = read_font(manifest, id.clone()).await;
            if let Err(error) = &result {
                tracing::warn!(font = %id, %error, "font load failed");
            }
            if tx.send(result).is_err() {
                tracing::debug!(font = %id, "font receiver dropped before load finished");
            }
        });
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_manifest(dir: &Path) -> PathBuf {
        let path = dir.join("content.toml");
        std::fs::write(
            &path,
            "[[fonts]]\nid = \"pixel\"\nimage = \"font.png\"\nglyph_width = 4\nglyph_height = 6\nspacing = 1\n",
        )
        .unwrap();
        path
    }

    #[tokio::test]
    async fn resolves_known_font() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileFontSource::current(write_manifest(dir.path())).unwrap();
        let atlas = source.load_font("pixel").await.unwrap().unwrap();
        assert_eq!(atlas.glyph_height, 6);
        assert_eq!(atlas.advance(), 5);
    }

    #[tokio::test]
    async fn unknown_font_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileFontSource::current(write_manifest(dir.path())).unwrap();
        let result = source.load_font("serif").await.unwrap();
        assert_eq!(result, Err(ContentError::UnknownFont("serif".to_string())));
    }

    #[tokio::test]
    async fn missing_manifest_is_a_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileFontSource::current(dir.path().join("absent.toml")).unwrap();
        let result = source.load_font("pixel").await.unwrap();
        assert!(matches!(result, Err(ContentError::LoadFailed { .. })));
    }

    #[test]
    fn requires_a_runtime() {
        assert!(FileFontSource::current("content.toml").is_err());
    }
}
