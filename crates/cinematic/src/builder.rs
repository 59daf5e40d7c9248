//! Builder utilities for ergonomic sequence construction.
//!
//! Instead of writing `Box::new(SequenceChain::new(vec![...]))`, use
//! `chain(vec![...])`. [`IntroBuilder`] assembles the standard encounter intro.

use std::sync::Arc;

use combat_core::{CombatConfig, CombatEncounter, FontAtlas, FontSource};

use crate::composite::{SequenceChain, StaggeredSequenceManager};
use crate::leaves::{
    AsyncMessageRevealSequence, MapRevealSequence, MessageRevealSequence, TitleRevealSequence,
};
use crate::sequence::CinematicSequence;

/// Shorthand for `Box::new(SequenceChain::new(sequences))`.
#[inline]
pub fn chain(sequences: Vec<Box<dyn CinematicSequence>>) -> Box<dyn CinematicSequence> {
    Box::new(SequenceChain::new(sequences))
}

/// Shorthand for `Box::new(StaggeredSequenceManager::new(sequences, delay))`.
#[inline]
pub fn staggered(
    sequences: Vec<Box<dyn CinematicSequence>>,
    stagger_delay: f32,
) -> Box<dyn CinematicSequence> {
    Box::new(StaggeredSequenceManager::new(sequences, stagger_delay))
}

/// Where intro message lines get their font from.
#[derive(Clone)]
pub enum MessageFont {
    /// Font already resolved from the content registry.
    Preloaded(FontAtlas),
    /// Font atlas fetched on first start.
    Lazy(Arc<dyn FontSource>),
}

/// Assembles an encounter intro: title, then map sweep, then staggered lines.
///
/// Layout follows the map grid: the title sits in the first tile row, the
/// map reveal is drawn at the surface origin, and message lines stack below
/// the map.
pub struct IntroBuilder<'a> {
    encounter: &'a CombatEncounter,
    config: &'a CombatConfig,
    font: MessageFont,
}

impl<'a> IntroBuilder<'a> {
    pub fn new(
        encounter: &'a CombatEncounter,
        config: &'a CombatConfig,
        font: MessageFont,
    ) -> Self {
        Self {
            encounter,
            config,
            font,
        }
    }

    pub fn build(self) -> Box<dyn CinematicSequence> {
        let intro = &self.encounter.intro;
        let tile = self.config.tile_size;
        let mut parts: Vec<Box<dyn CinematicSequence>> = Vec::new();

        if !intro.title.is_empty() {
            parts.push(Box::new(TitleRevealSequence::new(
                intro.title.clone(),
                intro.font.clone(),
                self.config.title_reveal_duration,
                (tile / 4) as i32,
                self.config.dither_block_size,
            )));
        }
        parts.push(Box::new(
            MapRevealSequence::new(self.config.map_reveal_duration, tile)
                .dithered(self.config.dither_block_size),
        ));

        if !intro.lines.is_empty() {
            let line_height = match &self.font {
                MessageFont::Preloaded(font) => font.glyph_height + font.glyph_height / 2,
                MessageFont::Lazy(_) => tile,
            };
            let top = (self.encounter.map.height() * tile + tile / 2) as i32;
            let lines = intro
                .lines
                .iter()
                .enumerate()
                .map(|(index, line)| {
                    let y = top + (index as u32 * line_height) as i32;
                    self.message(line, y)
                })
                .collect();
            parts.push(staggered(lines, self.config.stagger_delay));
        }

        chain(parts)
    }

    fn message(&self, line: &str, y: i32) -> Box<dyn CinematicSequence> {
        let duration = self.config.message_reveal_duration;
        match &self.font {
            MessageFont::Preloaded(font) => {
                Box::new(MessageRevealSequence::new(line, font.clone(), duration, y))
            }
            MessageFont::Lazy(source) => Box::new(AsyncMessageRevealSequence::new(
                line,
                self.encounter.intro.font.clone(),
                Arc::clone(source),
                duration,
                y,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::context;
    use combat_core::testing::{ManualFontSource, fake_font, sample_encounter};

    fn run_to_completion(sequence: &mut Box<dyn CinematicSequence>, dt: f32) -> f32 {
        let mut elapsed = 0.0;
        while !sequence.update(dt) {
            elapsed += dt;
            if elapsed > 60.0 {
                break;
            }
        }
        elapsed + dt
    }

    #[test]
    fn intro_runs_title_map_and_lines_in_order() {
        let encounter = sample_encounter();
        let config = CombatConfig::new();
        let mut intro =
            IntroBuilder::new(&encounter, &config, MessageFont::Preloaded(fake_font("pixel", 4, 6)))
                .build();
        intro.start(&context());

        // title 1.0 + map 2.0 + two 1.0s lines, the second starting 0.5s
        // after the first.
        let total = run_to_completion(&mut intro, 0.25);
        assert!((total - 4.5).abs() < 1e-3, "finished after {total}s");
        assert!(intro.is_complete());
    }

    #[test]
    fn lazy_font_is_requested_once_per_line() {
        let encounter = sample_encounter();
        let config = CombatConfig::new();
        let source = Arc::new(ManualFontSource::new());
        let mut intro =
            IntroBuilder::new(&encounter, &config, MessageFont::Lazy(source.clone())).build();
        intro.start(&context());
        run_to_completion(&mut intro, 0.25);

        assert_eq!(source.request_count(), encounter.intro.lines.len());
    }

    #[test]
    fn empty_script_still_reveals_the_map() {
        let mut encounter = sample_encounter();
        encounter.intro = Default::default();
        let config = CombatConfig::new();
        let mut intro =
            IntroBuilder::new(&encounter, &config, MessageFont::Preloaded(fake_font("pixel", 4, 6)))
                .build();
        intro.start(&context());
        let total = run_to_completion(&mut intro, 0.25);
        assert!((total - 2.0).abs() < 1e-3);
    }
}
