//! Rendering and content-lookup contracts.
//!
//! The combat core never touches pixels. It issues draw calls against a
//! [`RenderSurface`] in device pixel coordinates and resolves sprite/font
//! identifiers through an injected [`ContentLookup`]. A missing identifier is
//! logged and that single draw is skipped.
//!
//! The one piece of pixel math the core does own is the ordered-dither
//! predicate ([`DitherMask::admits`]); backends ask it per pixel when a mask
//! is supplied.

use crate::error::{CombatError, ErrorSeverity};

/// 8-bit RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const GOLD: Self = Self::rgb(255, 215, 0);
    pub const CRIMSON: Self = Self::rgb(200, 30, 45);
    pub const ZONE_BLUE: Self = Self::rgb(60, 120, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same color with alpha scaled to `alpha` in `[0, 1]`.
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }
}

/// Axis-aligned rectangle in device pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of `width` x `height` centered inside `self`.
    pub fn centered(&self, width: u32, height: u32) -> PixelRect {
        PixelRect::new(
            self.x + (self.width as i32 - width as i32) / 2,
            self.y + (self.height as i32 - height as i32) / 2,
            width,
            height,
        )
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x
            && y >= self.y
            && x < self.x + self.width as i32
            && y < self.y + self.height as i32
    }
}

/// Ordered-dither gate for a coarse pixelated fade.
///
/// Pixels are grouped into square blocks; a pixel is drawn iff
/// `alpha > BAYER_4X4[block_y % 4][block_x % 4] / 16`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DitherMask {
    alpha: f32,
    block_size: u32,
}

impl DitherMask {
    pub const BAYER_4X4: [[u8; 4]; 4] = [
        [0, 8, 2, 10],
        [12, 4, 14, 6],
        [3, 11, 1, 9],
        [15, 7, 13, 5],
    ];

    pub fn new(alpha: f32, block_size: u32) -> Self {
        Self {
            alpha,
            block_size: block_size.max(1),
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn admits(&self, px: i32, py: i32) -> bool {
        let block = self.block_size as i32;
        let block_x = px.div_euclid(block).rem_euclid(4) as usize;
        let block_y = py.div_euclid(block).rem_euclid(4) as usize;
        let threshold = f32::from(Self::BAYER_4X4[block_y][block_x]) / 16.0;
        self.alpha > threshold
    }
}

/// Sprite metadata resolved from a visual identifier.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SpriteDef {
    pub id: String,
    /// Source image (sprite sheet) the backend draws from.
    pub image: String,
    #[serde(default)]
    pub x: u32,
    #[serde(default)]
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Fixed-advance bitmap font metrics.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FontAtlas {
    pub id: String,
    /// Atlas image holding the glyphs.
    pub image: String,
    pub glyph_width: u32,
    pub glyph_height: u32,
    #[serde(default)]
    pub spacing: u32,
}

impl FontAtlas {
    pub fn advance(&self) -> u32 {
        self.glyph_width + self.spacing
    }

    /// Pixel width of `glyphs` glyph cells laid out on one line.
    pub fn line_width(&self, glyphs: usize) -> u32 {
        if glyphs == 0 {
            return 0;
        }
        self.advance() * glyphs as u32 - self.spacing
    }

    pub fn text_width(&self, text: &str) -> u32 {
        self.line_width(text.chars().count())
    }
}

/// Errors reported by content-lookup and asset-loading collaborators.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    #[error("sprite '{0}' not found")]
    UnknownSprite(String),

    #[error("font '{0}' not found")]
    UnknownFont(String),

    #[error("failed to load '{id}': {reason}")]
    LoadFailed { id: String, reason: String },
}

impl CombatError for ContentError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            ContentError::UnknownSprite(_) => "CONTENT_UNKNOWN_SPRITE",
            ContentError::UnknownFont(_) => "CONTENT_UNKNOWN_FONT",
            ContentError::LoadFailed { .. } => "CONTENT_LOAD_FAILED",
        }
    }
}

/// Read-only lookup of visual assets by identifier.
pub trait ContentLookup {
    fn sprite(&self, id: &str) -> Option<&SpriteDef>;
    fn font(&self, id: &str) -> Option<&FontAtlas>;
}

/// Pending font load; poll with `try_recv`, never block on it.
pub type FontLoad = tokio::sync::oneshot::Receiver<Result<FontAtlas, ContentError>>;

/// Asynchronous font-atlas loader.
pub trait FontSource: Send + Sync {
    /// Begins loading `id`. The receiver resolves once the atlas is ready.
    fn load_font(&self, id: &str) -> FontLoad;
}

/// 2D raster target addressed in device pixels.
pub trait RenderSurface {
    fn size(&self) -> (u32, u32);

    fn fill_rect(&mut self, rect: PixelRect, color: Rgba);

    fn draw_sprite(
        &mut self,
        sprite: &SpriteDef,
        dest: PixelRect,
        alpha: f32,
        mask: Option<&DitherMask>,
    );

    fn draw_glyph(
        &mut self,
        font: &FontAtlas,
        glyph: char,
        x: i32,
        y: i32,
        color: Rgba,
        mask: Option<&DitherMask>,
    );
}

/// Everything a render pass needs: the target surface and the content table.
pub struct RenderContext<'a> {
    pub surface: &'a mut dyn RenderSurface,
    pub content: &'a dyn ContentLookup,
}

impl<'a> RenderContext<'a> {
    pub fn new(surface: &'a mut dyn RenderSurface, content: &'a dyn ContentLookup) -> Self {
        Self { surface, content }
    }

    pub fn bounds(&self) -> PixelRect {
        let (width, height) = self.surface.size();
        PixelRect::new(0, 0, width, height)
    }

    /// Resolves a sprite, logging a warning on a miss.
    pub fn sprite(&self, id: &str) -> Option<&'a SpriteDef> {
        let content: &'a dyn ContentLookup = self.content;
        let sprite = content.sprite(id);
        if sprite.is_none() {
            tracing::warn!(sprite = id, "sprite not found; skipping draw");
        }
        sprite
    }

    /// Resolves a font, logging a warning on a miss.
    pub fn font(&self, id: &str) -> Option<&'a FontAtlas> {
        let content: &'a dyn ContentLookup = self.content;
        let font = content.font(id);
        if font.is_none() {
            tracing::warn!(font = id, "font not found; skipping draw");
        }
        font
    }

    /// Draws a sprite by identifier; a miss skips the draw.
    pub fn draw_sprite_id(
        &mut self,
        id: &str,
        dest: PixelRect,
        alpha: f32,
        mask: Option<&DitherMask>,
    ) {
        if let Some(sprite) = self.sprite(id) {
            self.surface.draw_sprite(sprite, dest, alpha, mask);
        }
    }

    /// Lays `text` out left to right from `(x, y)`.
    pub fn draw_text(
        &mut self,
        font: &FontAtlas,
        text: &str,
        x: i32,
        y: i32,
        color: Rgba,
        mask: Option<&DitherMask>,
    ) {
        let advance = font.advance() as i32;
        for (index, glyph) in text.chars().enumerate() {
            self.surface
                .draw_glyph(font, glyph, x + index as i32 * advance, y, color, mask);
        }
    }
}
