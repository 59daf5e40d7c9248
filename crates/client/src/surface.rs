//! A render surface that only counts draw calls.

use combat_core::{DitherMask, FontAtlas, PixelRect, RenderSurface, Rgba, SpriteDef};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    width: u32,
    height: u32,
    pub fills: usize,
    pub sprites: usize,
    pub glyphs: usize,
}

impl FrameStats {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn clear(&mut self) {
        *self = Self::new(self.width, self.height);
    }
}

impl RenderSurface for FrameStats {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn fill_rect(&mut self, _rect: PixelRect, _color: Rgba) {
        self.fills += 1;
    }

    fn draw_sprite(
        &mut self,
        _sprite: &SpriteDef,
        _dest: PixelRect,
        _alpha: f32,
        _mask: Option<&DitherMask>,
    ) {
        self.sprites += 1;
    }

    fn draw_glyph(
        &mut self,
        _font: &FontAtlas,
        _glyph: char,
        _x: i32,
        _y: i32,
        _color: Rgba,
        _mask: Option<&DitherMask>,
    ) {
        self.glyphs += 1;
    }
}
