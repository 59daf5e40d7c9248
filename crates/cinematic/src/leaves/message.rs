//! Typewriter-style message reveal with inline sprite glyphs.
//!
//! Messages may embed `[sprite:<id>]` references. Each reference counts as one
//! character for pacing and is drawn as a square cell one line high. Text is
//! laid out centered on its fully revealed width, so revealing does not shift
//! already visible characters.

use std::sync::Arc;

use combat_core::{FontAtlas, FontLoad, FontSource, PixelRect, RenderContext, Rgba};
use tokio::sync::oneshot::error::TryRecvError;

use crate::sequence::{CinematicContext, CinematicSequence};
use crate::timing::SequenceClock;

const SPRITE_PREFIX: &str = "[sprite:";

/// One run of a parsed message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessagePart {
    Text(String),
    Sprite(String),
}

impl MessagePart {
    /// Characters this part contributes to reveal pacing.
    pub fn char_count(&self) -> usize {
        match self {
            MessagePart::Text(text) => text.chars().count(),
            MessagePart::Sprite(_) => 1,
        }
    }
}

/// Splits a message into text runs and sprite references, in order.
///
/// An unterminated or empty reference is kept as literal text.
pub fn parse_message(message: &str) -> Vec<MessagePart> {
    let mut parts = Vec::new();
    let mut text = String::new();
    let mut rest = message;

    while let Some(start) = rest.find(SPRITE_PREFIX) {
        let after = &rest[start + SPRITE_PREFIX.len()..];
        match after.find(']') {
            Some(end) if end > 0 => {
                text.push_str(&rest[..start]);
                if !text.is_empty() {
                    parts.push(MessagePart::Text(std::mem::take(&mut text)));
                }
                parts.push(MessagePart::Sprite(after[..end].to_string()));
                rest = &after[end + 1..];
            }
            _ => {
                text.push_str(&rest[..start + SPRITE_PREFIX.len()]);
                rest = after;
            }
        }
    }
    text.push_str(rest);
    if !text.is_empty() {
        parts.push(MessagePart::Text(text));
    }
    parts
}

/// Parsed message plus the reveal arithmetic shared by both variants.
#[derive(Clone, Debug)]
struct RevealText {
    parts: Vec<MessagePart>,
    total_chars: usize,
    y: i32,
    color: Rgba,
}

impl RevealText {
    fn new(message: &str, y: i32) -> Self {
        let parts = parse_message(message);
        let total_chars = parts.iter().map(MessagePart::char_count).sum();
        Self {
            parts,
            total_chars,
            y,
            color: Rgba::WHITE,
        }
    }

    fn visible_chars(&self, progress: f32) -> usize {
        ((self.total_chars as f32) * progress).floor() as usize
    }

    fn sprite_cell(font: &FontAtlas) -> u32 {
        font.glyph_height
    }

    fn full_width(&self, font: &FontAtlas) -> u32 {
        let cells: u32 = self
            .parts
            .iter()
            .map(|part| match part {
                MessagePart::Text(text) => font.advance() * text.chars().count() as u32,
                MessagePart::Sprite(_) => Self::sprite_cell(font) + font.spacing,
            })
            .sum();
        cells.saturating_sub(font.spacing)
    }

    fn render(&self, font: &FontAtlas, progress: f32, ctx: &mut RenderContext<'_>) {
        let mut remaining = self.visible_chars(progress);
        if remaining == 0 {
            return;
        }

        let bounds = ctx.bounds();
        let width = self.full_width(font);
        let mut x = bounds.x + (bounds.width as i32 - width as i32) / 2;

        for part in &self.parts {
            if remaining == 0 {
                break;
            }
            match part {
                MessagePart::Text(text) => {
                    let shown: String = text.chars().take(remaining).collect();
                    let count = shown.chars().count();
                    ctx.draw_text(font, &shown, x, self.y, self.color, None);
                    x += (font.advance() * count as u32) as i32;
                    remaining -= count;
                }
                MessagePart::Sprite(id) => {
                    let cell = Self::sprite_cell(font);
                    ctx.draw_sprite_id(id, PixelRect::new(x, self.y, cell, cell), 1.0, None);
                    x += (cell + font.spacing) as i32;
                    remaining -= 1;
                }
            }
        }
    }
}

/// Message reveal drawn with a font supplied at construction.
#[derive(Clone, Debug)]
pub struct MessageRevealSequence {
    text: RevealText,
    font: FontAtlas,
    clock: SequenceClock,
}

impl MessageRevealSequence {
    pub fn new(message: &str, font: FontAtlas, duration: f32, y: i32) -> Self {
        Self {
            text: RevealText::new(message, y),
            font,
            clock: SequenceClock::new(duration),
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: Rgba) -> Self {
        self.text.color = color;
        self
    }

    pub fn parts(&self) -> &[MessagePart] {
        &self.text.parts
    }

    pub fn total_chars(&self) -> usize {
        self.text.total_chars
    }

    pub fn visible_chars(&self) -> usize {
        self.text.visible_chars(self.clock.progress())
    }
}

impl CinematicSequence for MessageRevealSequence {
    fn start(&mut self, _ctx: &CinematicContext) {
        self.clock.reset();
    }

    fn update(&mut self, delta_time: f32) -> bool {
        self.clock.advance(delta_time)
    }

    fn render(&self, ctx: &mut RenderContext<'_>) {
        self.text.render(&self.font, self.clock.progress(), ctx);
    }

    fn is_complete(&self) -> bool {
        self.clock.is_complete()
    }

    fn reset(&mut self) {
        self.clock.reset();
    }
}

/// Message reveal whose font atlas is loaded lazily on first `start`.
///
/// The load is polled without blocking during `update`; until it resolves
/// the sequence keeps time but draws nothing. Repeated starts reuse the
/// pending or finished load.
pub struct AsyncMessageRevealSequence {
    text: RevealText,
    font_id: String,
    source: Arc<dyn FontSource>,
    pending: Option<FontLoad>,
    font: Option<FontAtlas>,
    clock: SequenceClock,
}

impl AsyncMessageRevealSequence {
    pub fn new(
        message: &str,
        font_id: impl Into<String>,
        source: Arc<dyn FontSource>,
        duration: f32,
        y: i32,
    ) -> Self {
        Self {
            text: RevealText::new(message, y),
            font_id: font_id.into(),
            source,
            pending: None,
            font: None,
            clock: SequenceClock::new(duration),
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: Rgba) -> Self {
        self.text.color = color;
        self
    }

    pub fn is_font_loaded(&self) -> bool {
        self.font.is_some()
    }

    fn poll_font(&mut self) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        match pending.try_recv() {
            Ok(Ok(font)) => {
                tracing::debug!(font = %self.font_id, "font atlas loaded");
                self.font = Some(font);
                self.pending = None;
            }
            Ok(Err(error)) => {
                tracing::warn!(font = %self.font_id, %error, "font atlas failed to load");
                self.pending = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Closed) => {
                tracing::warn!(font = %self.font_id, "font loader dropped the request");
                self.pending = None;
            }
        }
    }
}

impl CinematicSequence for AsyncMessageRevealSequence {
    fn start(&mut self, _ctx: &CinematicContext) {
        self.clock.reset();
        if self.font.is_none() && self.pending.is_none() {
            tracing::debug!(font = %self.font_id, "requesting font atlas");
            self.pending = Some(self.source.load_font(&self.font_id));
        }
    }

    fn update(&mut self, delta_time: f32) -> bool {
        self.poll_font();
        self.clock.advance(delta_time)
    }

    fn render(&self, ctx: &mut RenderContext<'_>) {
        if let Some(font) = &self.font {
            self.text.render(font, self.clock.progress(), ctx);
        }
    }

    fn is_complete(&self) -> bool {
        self.clock.is_complete()
    }

    fn reset(&mut self) {
        // The loaded atlas survives a reset; only timing is rewound.
        self.clock.reset();
    }
}
