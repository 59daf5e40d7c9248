use combat_core::{CombatMap, DitherMask, PixelRect, Position, RenderContext};

use crate::sequence::{CinematicContext, CinematicSequence};
use crate::timing::{SequenceClock, ease_in_out_cubic};

/// Diagonal sweep that fades map tiles in from the top-left corner.
///
/// A tile at `(x, y)` starts fading at `n * duration / 2`, where
/// `n = (x + y) / (width + height - 2)`, and takes `duration / 2` to reach
/// full opacity. The last tile therefore finishes exactly at `duration`.
#[derive(Clone, Debug)]
pub struct MapRevealSequence {
    tile_size: u32,
    origin: (i32, i32),
    dithered: bool,
    block_size: u32,
    map: Option<CombatMap>,
    clock: SequenceClock,
}

impl MapRevealSequence {
    pub fn new(duration: f32, tile_size: u32) -> Self {
        Self {
            tile_size,
            origin: (0, 0),
            dithered: false,
            block_size: 1,
            map: None,
            clock: SequenceClock::new(duration),
        }
    }

    /// Pixel position of the map's top-left tile.
    #[must_use]
    pub fn with_origin(mut self, x: i32, y: i32) -> Self {
        self.origin = (x, y);
        self
    }

    /// Fades through an ordered-dither mask instead of blended alpha.
    #[must_use]
    pub fn dithered(mut self, block_size: u32) -> Self {
        self.dithered = true;
        self.block_size = block_size;
        self
    }

    /// Eased opacity of the tile at `position` at the current time.
    pub fn tile_alpha(&self, position: Position) -> f32 {
        let Some(map) = &self.map else {
            return 0.0;
        };
        let span = (map.width() + map.height()).saturating_sub(2);
        let normalized = if span == 0 {
            0.0
        } else {
            (position.x + position.y) as f32 / span as f32
        };

        let duration = self.clock.duration();
        let half = duration * 0.5;
        if half <= 0.0 {
            return if self.clock.is_complete() { 1.0 } else { 0.0 };
        }
        let fade_start = normalized * half;
        let local = ((self.clock.elapsed() - fade_start) / half).clamp(0.0, 1.0);
        ease_in_out_cubic(local)
    }
}

impl CinematicSequence for MapRevealSequence {
    fn start(&mut self, ctx: &CinematicContext) {
        self.clock.reset();
        self.map = Some(ctx.state.map.clone());
    }

    fn update(&mut self, delta_time: f32) -> bool {
        self.clock.advance(delta_time)
    }

    fn render(&self, ctx: &mut RenderContext<'_>) {
        let Some(map) = &self.map else {
            return;
        };
        let size = self.tile_size as i32;

        for (position, cell) in map.cells() {
            let Some(sprite) = cell.sprite.as_deref() else {
                continue;
            };
            let alpha = self.tile_alpha(position);
            if alpha <= 0.0 {
                continue;
            }
            let dest = PixelRect::new(
                self.origin.0 + position.x * size,
                self.origin.1 + position.y * size,
                self.tile_size,
                self.tile_size,
            );
            if self.dithered {
                let mask = DitherMask::new(alpha, self.block_size);
                ctx.draw_sprite_id(sprite, dest, 1.0, Some(&mask));
            } else {
                ctx.draw_sprite_id(sprite, dest, alpha, None);
            }
        }
    }

    fn is_complete(&self) -> bool {
        self.clock.is_complete()
    }

    fn reset(&mut self) {
        self.clock.reset();
        self.map = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::context;
    use combat_core::testing::{DrawCall, RecordingSurface, sample_content};

    fn started(duration: f32) -> MapRevealSequence {
        let mut reveal = MapRevealSequence::new(duration, 12);
        reveal.start(&context());
        reveal
    }

    #[test]
    fn top_left_tile_leads_the_sweep() {
        let mut reveal = started(2.0);
        reveal.update(0.5);
        assert!(reveal.tile_alpha(Position::new(0, 0)) > 0.0);
        assert_eq!(reveal.tile_alpha(Position::new(5, 5)), 0.0);
    }

    #[test]
    fn last_tile_finishes_at_duration() {
        let mut reveal = started(2.0);
        reveal.update(1.5);
        assert!(reveal.tile_alpha(Position::new(5, 5)) < 1.0);
        assert!(reveal.update(0.5));
        assert_eq!(reveal.tile_alpha(Position::new(5, 5)), 1.0);
        assert_eq!(reveal.tile_alpha(Position::new(0, 0)), 1.0);
    }

    #[test]
    fn renders_only_tiles_that_have_started_fading() {
        let content = sample_content();
        let mut reveal = started(2.0);
        reveal.update(0.1);

        let mut surface = RecordingSurface::new(72, 72);
        reveal.render(&mut RenderContext::new(&mut surface, &content));
        let first = surface.calls.first().cloned();
        assert!(matches!(
            first,
            Some(DrawCall::Sprite { dest, .. }) if dest == PixelRect::new(0, 0, 12, 12)
        ));
        assert!(surface.sprite_ids().len() < 36);
    }

    #[test]
    fn dithered_reveal_draws_opaque_through_mask() {
        let content = sample_content();
        let mut reveal = MapRevealSequence::new(2.0, 12).dithered(4);
        reveal.start(&context());
        reveal.update(2.0);

        let mut surface = RecordingSurface::new(72, 72);
        reveal.render(&mut RenderContext::new(&mut surface, &content));
        assert_eq!(surface.sprite_ids().len(), 36);
        assert!(surface.calls.iter().all(|call| matches!(
            call,
            DrawCall::Sprite { alpha, dither: Some(mask), .. } if *alpha == 1.0 && *mask == 1.0
        )));
    }

    #[test]
    fn reset_forgets_the_captured_map() {
        let mut reveal = started(1.0);
        reveal.update(1.0);
        reveal.reset();
        assert!(!reveal.is_complete());
        assert_eq!(reveal.tile_alpha(Position::new(0, 0)), 0.0);
    }
}
