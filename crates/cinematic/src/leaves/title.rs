use combat_core::{DitherMask, RenderContext, Rgba};

use crate::sequence::{CinematicContext, CinematicSequence};
use crate::timing::SequenceClock;

/// Centered title that fades in through a coarse ordered dither.
#[derive(Clone, Debug)]
pub struct TitleRevealSequence {
    title: String,
    font_id: String,
    y: i32,
    block_size: u32,
    color: Rgba,
    clock: SequenceClock,
}

impl TitleRevealSequence {
    pub fn new(
        title: impl Into<String>,
        font_id: impl Into<String>,
        duration: f32,
        y: i32,
        block_size: u32,
    ) -> Self {
        Self {
            title: title.into(),
            font_id: font_id.into(),
            y,
            block_size,
            color: Rgba::GOLD,
            clock: SequenceClock::new(duration),
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    /// Current dither alpha, eased over the sequence duration.
    pub fn alpha(&self) -> f32 {
        self.clock.eased_progress()
    }
}

impl CinematicSequence for TitleRevealSequence {
    fn start(&mut self, _ctx: &CinematicContext) {
        self.clock.reset();
    }

    fn update(&mut self, delta_time: f32) -> bool {
        self.clock.advance(delta_time)
    }

    fn render(&self, ctx: &mut RenderContext<'_>) {
        let alpha = self.alpha();
        if alpha <= 0.0 || self.title.is_empty() {
            return;
        }
        let Some(font) = ctx.font(&self.font_id) else {
            return;
        };

        let width = font.text_width(&self.title);
        let x = ctx.bounds().centered(width, font.glyph_height).x;
        let mask = DitherMask::new(alpha, self.block_size);
        ctx.draw_text(font, &self.title, x, self.y, self.color, Some(&mask));
    }

    fn is_complete(&self) -> bool {
        self.clock.is_complete()
    }

    fn reset(&mut self) {
        self.clock.reset();
    }
}
