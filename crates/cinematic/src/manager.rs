use std::sync::Arc;

use combat_core::{CombatEncounter, CombatState, RenderContext};

use crate::sequence::{CinematicContext, CinematicSequence};

/// Drives at most one active sequence per combat session.
///
/// While a sequence plays, [`is_playing_cinematic`](Self::is_playing_cinematic)
/// is `true` and the orchestrator withholds input from phase handlers.
#[derive(Default)]
pub struct CinematicManager {
    active: Option<Box<dyn CinematicSequence>>,
    is_playing: bool,
}

impl CinematicManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any active sequence and starts `sequence` immediately.
    pub fn play(
        &mut self,
        mut sequence: Box<dyn CinematicSequence>,
        state: &CombatState,
        encounter: &Arc<CombatEncounter>,
    ) {
        if self.active.is_some() {
            tracing::debug!("replacing active cinematic");
        }
        let ctx = CinematicContext::new(Arc::new(state.clone()), Arc::clone(encounter));
        sequence.start(&ctx);
        tracing::debug!(encounter = %encounter.id, "cinematic started");
        self.active = Some(sequence);
        self.is_playing = true;
    }

    /// Advances the active sequence.
    ///
    /// Returns `true` while a cinematic is suppressing interaction, and
    /// `false` once it completes (clearing it) or when nothing is playing.
    pub fn update(&mut self, delta_time: f32) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        if active.update(delta_time) || active.is_complete() {
            tracing::debug!("cinematic finished");
            self.active = None;
            self.is_playing = false;
            return false;
        }
        true
    }

    /// Stops the active sequence without waiting for it to finish.
    ///
    /// The sequence is returned reset, so playing it again behaves like a
    /// first play.
    pub fn skip(&mut self) -> Option<Box<dyn CinematicSequence>> {
        self.is_playing = false;
        let mut sequence = self.active.take()?;
        sequence.reset();
        tracing::debug!("cinematic skipped");
        Some(sequence)
    }

    pub fn render(&self, ctx: &mut RenderContext<'_>) {
        if let Some(active) = &self.active {
            active.render(ctx);
        }
    }

    pub fn is_playing_cinematic(&self) -> bool {
        self.is_playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::{SequenceChain, StaggeredSequenceManager};
    use crate::leaves::{MapRevealSequence, MessageRevealSequence, TitleRevealSequence};
    use crate::test_support::Probe;
    use combat_core::testing::{RecordingSurface, fake_font, sample_content, sample_encounter};

    fn intro() -> Box<dyn CinematicSequence> {
        let lines: Vec<Box<dyn CinematicSequence>> = vec![
            Box::new(MessageRevealSequence::new("Beware [sprite:goblin]", fake_font("pixel", 4, 6), 1.0, 40)),
            Box::new(MessageRevealSequence::new("Hold fast", fake_font("pixel", 4, 6), 1.0, 50)),
        ];
        Box::new(SequenceChain::new(vec![
            Box::new(TitleRevealSequence::new("Skirmish", "pixel", 0.5, 4, 2)),
            Box::new(MapRevealSequence::new(1.0, 12).dithered(4)),
            Box::new(StaggeredSequenceManager::new(lines, 0.5)),
        ]))
    }

    fn frames(manager: &mut CinematicManager, count: usize) -> Vec<RecordingSurface> {
        let content = sample_content();
        (0..count)
            .map(|_| {
                manager.update(0.1);
                let mut surface = RecordingSurface::new(96, 72);
                manager.render(&mut RenderContext::new(&mut surface, &content));
                surface
            })
            .collect()
    }

    #[test]
    fn update_reports_playing_until_completion() {
        let encounter = Arc::new(sample_encounter());
        let state = encounter.initial_state().unwrap();
        let probe = Probe::new("p", 0.25);
        let mut manager = CinematicManager::new();
        assert!(!manager.update(0.1));

        manager.play(Box::new(probe.clone()), &state, &encounter);
        assert!(manager.is_playing_cinematic());
        assert!(manager.update(0.1));
        assert!(manager.update(0.1));
        assert!(!manager.update(0.1));
        assert!(!manager.is_playing_cinematic());
        assert!(!manager.update(0.1));
    }

    #[test]
    fn play_replaces_the_active_sequence() {
        let encounter = Arc::new(sample_encounter());
        let state = encounter.initial_state().unwrap();
        let first = Probe::new("a", 5.0);
        let second = Probe::new("b", 5.0);
        let mut manager = CinematicManager::new();

        manager.play(Box::new(first.clone()), &state, &encounter);
        manager.play(Box::new(second.clone()), &state, &encounter);
        manager.update(0.5);
        assert!((first.elapsed() - 0.0).abs() < 1e-6);
        assert!((second.elapsed() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn skip_clears_and_stops_suppressing_input() {
        let encounter = Arc::new(sample_encounter());
        let state = encounter.initial_state().unwrap();
        let mut manager = CinematicManager::new();
        manager.play(intro(), &state, &encounter);

        assert!(manager.skip().is_some());
        assert!(!manager.is_playing_cinematic());
        assert!(!manager.update(0.1));
        assert!(manager.skip().is_none());
    }

    #[test]
    fn replay_after_skip_matches_a_fresh_play() {
        let encounter = Arc::new(sample_encounter());
        let state = encounter.initial_state().unwrap();

        let mut fresh = CinematicManager::new();
        fresh.play(intro(), &state, &encounter);
        let expected: Vec<_> = frames(&mut fresh, 30).into_iter().map(|s| s.calls).collect();

        let mut replayed = CinematicManager::new();
        replayed.play(intro(), &state, &encounter);
        frames(&mut replayed, 12);
        let sequence = replayed.skip().unwrap();
        replayed.play(sequence, &state, &encounter);
        let actual: Vec<_> = frames(&mut replayed, 30).into_iter().map(|s| s.calls).collect();

        assert_eq!(actual, expected);
    }
}
