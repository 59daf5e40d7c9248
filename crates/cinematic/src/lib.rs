//! Frame-driven cinematic sequencing for tactics combat.
//!
//! Every effect advances only through explicit `update(delta_time)` calls
//! from the host frame loop; nothing here blocks or sleeps. Font atlases are
//! the one asynchronous input and are polled, never awaited.
//!
//! # Architecture
//!
//! - [`CinematicSequence`]: shared interface of leaves and composites
//! - Leaves: [`TitleRevealSequence`], [`MapRevealSequence`],
//!   [`MessageRevealSequence`], [`AsyncMessageRevealSequence`]
//! - Composites: [`SequenceChain`], [`StaggeredSequenceManager`]
//! - [`CinematicManager`]: the per-session driver and input gate

pub mod builder;
pub mod composite;
pub mod leaves;
pub mod manager;
pub mod sequence;
pub mod timing;

pub use builder::{IntroBuilder, MessageFont, chain, staggered};
pub use composite::{SequenceChain, StaggeredSequenceManager};
pub use leaves::{
    AsyncMessageRevealSequence, MapRevealSequence, MessagePart, MessageRevealSequence,
    TitleRevealSequence, parse_message,
};
pub use manager::CinematicManager;
pub use sequence::{CinematicContext, CinematicSequence};
pub use timing::{SequenceClock, ease_in_out_cubic};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::{Arc, Mutex};

    use combat_core::testing::{fake_font, sample_encounter};
    use combat_core::{RenderContext, Rgba};

    use crate::sequence::{CinematicContext, CinematicSequence};
    use crate::timing::SequenceClock;

    pub fn context() -> CinematicContext {
        let encounter = sample_encounter();
        let state = encounter
            .initial_state()
            .expect("sample encounter is valid");
        CinematicContext::new(Arc::new(state), Arc::new(encounter))
    }

    #[derive(Default)]
    struct ProbeState {
        starts: usize,
        resets: usize,
        clock: Option<SequenceClock>,
    }

    /// Timed sequence whose lifecycle calls are observable through clones.
    ///
    /// Renders the first character of its name as a single glyph.
    #[derive(Clone)]
    pub struct Probe {
        glyph: char,
        duration: f32,
        state: Arc<Mutex<ProbeState>>,
    }

    impl Probe {
        pub fn new(name: &str, duration: f32) -> Self {
            Self {
                glyph: name.chars().next().unwrap_or('?'),
                duration,
                state: Arc::default(),
            }
        }

        fn with<R>(&self, f: impl FnOnce(&mut ProbeState) -> R) -> R {
            let mut guard = self.state.lock().expect("probe lock poisoned");
            f(&mut guard)
        }

        pub fn starts(&self) -> usize {
            self.with(|state| state.starts)
        }

        pub fn resets(&self) -> usize {
            self.with(|state| state.resets)
        }

        pub fn elapsed(&self) -> f32 {
            self.with(|state| state.clock.map_or(0.0, |clock| clock.elapsed()))
        }

        pub fn is_complete(&self) -> bool {
            self.with(|state| state.clock.is_some_and(|clock| clock.is_complete()))
        }
    }

    impl CinematicSequence for Probe {
        fn start(&mut self, _ctx: &CinematicContext) {
            let duration = self.duration;
            self.with(|state| {
                state.starts += 1;
                state.clock = Some(SequenceClock::new(duration));
            });
        }

        fn update(&mut self, delta_time: f32) -> bool {
            self.with(|state| {
                state
                    .clock
                    .as_mut()
                    .is_some_and(|clock| clock.advance(delta_time))
            })
        }

        fn render(&self, ctx: &mut RenderContext<'_>) {
            let font = fake_font("probe", 1, 1);
            ctx.surface
                .draw_glyph(&font, self.glyph, 0, 0, Rgba::WHITE, None);
        }

        fn is_complete(&self) -> bool {
            Probe::is_complete(self)
        }

        fn reset(&mut self) {
            self.with(|state| {
                state.resets += 1;
                state.clock = None;
            });
        }
    }
}
