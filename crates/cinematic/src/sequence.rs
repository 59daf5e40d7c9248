//! Core sequence trait.
//!
//! This module defines the [`CinematicSequence`] trait, the shared interface of
//! every leaf effect and every composite. Composites hold boxed children and
//! implement the same trait, so sequences nest arbitrarily.

use std::sync::Arc;

use combat_core::{CombatEncounter, CombatState, RenderContext};

/// Combat data captured when a sequence starts.
///
/// Composites keep a clone so they can start later children without borrowing
/// the orchestrator's state across frames.
#[derive(Clone, Debug)]
pub struct CinematicContext {
    pub state: Arc<CombatState>,
    pub encounter: Arc<CombatEncounter>,
}

impl CinematicContext {
    pub fn new(state: Arc<CombatState>, encounter: Arc<CombatEncounter>) -> Self {
        Self { state, encounter }
    }
}

/// A time-bounded, non-interactive visual effect.
///
/// # Lifecycle
///
/// `start` → `update`* (each advancing elapsed time by exactly `delta_time`)
/// → complete. `update` returns `true` exactly once, on the frame the
/// sequence first completes; later calls return `false` and change nothing.
/// `reset` restores the pre-`start` condition so the next `start` behaves
/// like the first.
pub trait CinematicSequence: Send {
    fn start(&mut self, ctx: &CinematicContext);

    fn update(&mut self, delta_time: f32) -> bool;

    /// Draws the current frame, proportional to progress.
    fn render(&self, ctx: &mut RenderContext<'_>);

    fn is_complete(&self) -> bool;

    fn reset(&mut self);
}

/// Blanket implementation for boxed sequences.
///
/// This allows `Box<dyn CinematicSequence>` to be used wherever a sequence is
/// expected, enabling heterogeneous collections of children.
impl CinematicSequence for Box<dyn CinematicSequence> {
    #[inline]
    fn start(&mut self, ctx: &CinematicContext) {
        (**self).start(ctx)
    }

    #[inline]
    fn update(&mut self, delta_time: f32) -> bool {
        (**self).update(delta_time)
    }

    #[inline]
    fn render(&self, ctx: &mut RenderContext<'_>) {
        (**self).render(ctx)
    }

    #[inline]
    fn is_complete(&self) -> bool {
        (**self).is_complete()
    }

    #[inline]
    fn reset(&mut self) {
        (**self).reset()
    }
}
