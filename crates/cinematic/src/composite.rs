//! Composite sequences.
//!
//! Composites own boxed children and implement [`CinematicSequence`]
//! themselves, so they nest: a chain may hold a staggered group whose
//! members are chains, and so on. This module provides strict ordering
//! ([`SequenceChain`]) and overlapping offsets ([`StaggeredSequenceManager`]).

use combat_core::RenderContext;

use crate::sequence::{CinematicContext, CinematicSequence};

/// Runs children strictly one after another.
///
/// # Semantics
///
/// - `start` starts only the first child
/// - `update` forwards `delta_time` to the current child; when it completes,
///   the next child is started on the same frame
/// - `render` draws every finished child plus the current one, so earlier
///   reveals stay on screen
///
/// An empty chain completes on its first update.
pub struct SequenceChain {
    sequences: Vec<Box<dyn CinematicSequence>>,
    current: usize,
    started: bool,
    complete: bool,
    context: Option<CinematicContext>,
}

impl SequenceChain {
    pub fn new(sequences: Vec<Box<dyn CinematicSequence>>) -> Self {
        Self {
            sequences,
            current: 0,
            started: false,
            complete: false,
            context: None,
        }
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Index of the child currently receiving updates.
    pub fn current_index(&self) -> usize {
        self.current
    }
}

impl CinematicSequence for SequenceChain {
    fn start(&mut self, ctx: &CinematicContext) {
        self.current = 0;
        self.complete = false;
        self.started = true;
        self.context = Some(ctx.clone());
        if let Some(first) = self.sequences.first_mut() {
            first.start(ctx);
        }
    }

    fn update(&mut self, delta_time: f32) -> bool {
        if self.complete {
            return false;
        }
        let Some(current) = self.sequences.get_mut(self.current) else {
            self.complete = true;
            return true;
        };
        if !current.update(delta_time) {
            return false;
        }

        self.current += 1;
        match self.sequences.get_mut(self.current) {
            Some(next) => {
                if let Some(ctx) = &self.context {
                    next.start(ctx);
                }
                false
            }
            None => {
                self.complete = true;
                true
            }
        }
    }

    fn render(&self, ctx: &mut RenderContext<'_>) {
        if !self.started {
            return;
        }
        let visible = (self.current + 1).min(self.sequences.len());
        for sequence in &self.sequences[..visible] {
            sequence.render(ctx);
        }
    }

    fn is_complete(&self) -> bool {
        self.complete
    }

    fn reset(&mut self) {
        for sequence in &mut self.sequences {
            sequence.reset();
        }
        self.current = 0;
        self.started = false;
        self.complete = false;
        self.context = None;
    }
}

struct StaggeredEntry {
    sequence: Box<dyn CinematicSequence>,
    start_time: f32,
    started: bool,
}

/// Starts children at fixed offsets and lets them overlap.
///
/// Child `i` starts once the group's elapsed time reaches `i * stagger_delay`,
/// whether or not earlier children have finished. Every started child is
/// updated each frame; a child that starts partway through a frame only
/// receives the time past its start offset. The group completes when all
/// children have started and completed.
pub struct StaggeredSequenceManager {
    entries: Vec<StaggeredEntry>,
    elapsed: f32,
    complete: bool,
    context: Option<CinematicContext>,
}

impl StaggeredSequenceManager {
    pub fn new(sequences: Vec<Box<dyn CinematicSequence>>, stagger_delay: f32) -> Self {
        let delay = stagger_delay.max(0.0);
        let entries = sequences
            .into_iter()
            .enumerate()
            .map(|(index, sequence)| StaggeredEntry {
                sequence,
                start_time: index as f32 * delay,
                started: false,
            })
            .collect();
        Self {
            entries,
            elapsed: 0.0,
            complete: false,
            context: None,
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn started_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.started).count()
    }

    fn start_due(&mut self) {
        let Some(ctx) = &self.context else {
            return;
        };
        for entry in &mut self.entries {
            if !entry.started && self.elapsed >= entry.start_time {
                entry.sequence.start(ctx);
                entry.started = true;
            }
        }
    }
}

impl CinematicSequence for StaggeredSequenceManager {
    fn start(&mut self, ctx: &CinematicContext) {
        for entry in &mut self.entries {
            entry.started = false;
        }
        self.elapsed = 0.0;
        self.complete = false;
        self.context = Some(ctx.clone());
        self.start_due();
    }

    fn update(&mut self, delta_time: f32) -> bool {
        if self.complete {
            return false;
        }
        self.elapsed += delta_time.max(0.0);
        self.start_due();

        let elapsed = self.elapsed;
        for entry in self.entries.iter_mut().filter(|entry| entry.started) {
            entry
                .sequence
                .update(delta_time.min(elapsed - entry.start_time));
        }

        if self
            .entries
            .iter()
            .all(|entry| entry.started && entry.sequence.is_complete())
        {
            self.complete = true;
            return true;
        }
        false
    }

    fn render(&self, ctx: &mut RenderContext<'_>) {
        for entry in self.entries.iter().filter(|entry| entry.started) {
            entry.sequence.render(ctx);
        }
    }

    fn is_complete(&self) -> bool {
        self.complete
    }

    fn reset(&mut self) {
        for entry in &mut self.entries {
            entry.sequence.reset();
            entry.started = false;
        }
        self.elapsed = 0.0;
        self.complete = false;
        self.context = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Probe, context};
    use combat_core::testing::{FakeContent, RecordingSurface};

    fn boxed(probe: &Probe) -> Box<dyn CinematicSequence> {
        Box::new(probe.clone())
    }

    #[test]
    fn chain_starts_only_the_first_child() {
        let a = Probe::new("a", 1.0);
        let b = Probe::new("b", 1.0);
        let mut chain = SequenceChain::new(vec![boxed(&a), boxed(&b)]);
        chain.start(&context());
        assert_eq!(a.starts(), 1);
        assert_eq!(b.starts(), 0);
    }

    #[test]
    fn chain_never_starts_next_before_current_completes() {
        let a = Probe::new("a", 1.0);
        let b = Probe::new("b", 1.0);
        let mut chain = SequenceChain::new(vec![boxed(&a), boxed(&b)]);
        chain.start(&context());

        assert!(!chain.update(0.5));
        assert_eq!(b.starts(), 0);
        assert!(!chain.update(0.5));
        assert_eq!(b.starts(), 1);
        assert_eq!(chain.current_index(), 1);

        assert!(!chain.update(0.5));
        assert!(chain.update(0.5));
        assert!(chain.is_complete());
        assert!(!chain.update(0.5));
    }

    #[test]
    fn chain_keeps_finished_children_on_screen() {
        let a = Probe::new("a", 0.5);
        let b = Probe::new("b", 0.5);
        let c = Probe::new("c", 0.5);
        let mut chain = SequenceChain::new(vec![boxed(&a), boxed(&b), boxed(&c)]);
        let content = FakeContent::new();
        let mut surface = RecordingSurface::new(10, 10);

        chain.render(&mut RenderContext::new(&mut surface, &content));
        assert!(surface.calls.is_empty());

        chain.start(&context());
        chain.update(0.5);
        chain.render(&mut RenderContext::new(&mut surface, &content));
        assert_eq!(surface.text(), "ab");
    }

    #[test]
    fn empty_chain_completes_on_first_update() {
        let mut chain = SequenceChain::new(Vec::new());
        chain.start(&context());
        assert!(!chain.is_complete());
        assert!(chain.update(0.0));
        assert!(!chain.update(0.0));
    }

    #[test]
    fn chain_reset_rewinds_every_child() {
        let a = Probe::new("a", 0.5);
        let b = Probe::new("b", 0.5);
        let mut chain = SequenceChain::new(vec![boxed(&a), boxed(&b)]);
        chain.start(&context());
        chain.update(0.5);
        chain.update(0.5);
        chain.reset();

        assert_eq!(a.resets(), 1);
        assert_eq!(b.resets(), 1);
        assert!(!chain.is_complete());
        assert_eq!(chain.current_index(), 0);
    }

    #[test]
    fn stagger_starts_on_schedule_regardless_of_completion() {
        let a = Probe::new("a", 1.0);
        let b = Probe::new("b", 1.0);
        let c = Probe::new("c", 1.0);
        let mut group = StaggeredSequenceManager::new(vec![boxed(&a), boxed(&b), boxed(&c)], 0.5);

        group.start(&context());
        assert_eq!(group.started_count(), 1);

        group.update(0.25);
        assert_eq!(b.starts(), 0);
        group.update(0.25);
        assert_eq!(b.starts(), 1);
        assert!(!a.is_complete());

        group.update(0.5);
        assert_eq!(c.starts(), 1);
        assert_eq!(group.started_count(), 3);
    }

    #[test]
    fn stagger_renders_overlapping_children() {
        let a = Probe::new("a", 1.0);
        let b = Probe::new("b", 1.0);
        let mut group = StaggeredSequenceManager::new(vec![boxed(&a), boxed(&b)], 0.5);
        let content = FakeContent::new();
        let mut surface = RecordingSurface::new(10, 10);

        group.start(&context());
        group.update(0.6);
        group.render(&mut RenderContext::new(&mut surface, &content));
        assert_eq!(surface.text(), "ab");
    }

    #[test]
    fn stagger_completes_when_every_child_has_finished() {
        let a = Probe::new("a", 1.0);
        let b = Probe::new("b", 1.0);
        let c = Probe::new("c", 1.0);
        let mut group = StaggeredSequenceManager::new(vec![boxed(&a), boxed(&b), boxed(&c)], 0.5);
        group.start(&context());

        let mut completions = 0;
        let mut frames = 0;
        while frames < 20 {
            if group.update(0.25) {
                completions += 1;
            }
            frames += 1;
        }
        assert_eq!(completions, 1);
        assert!(group.is_complete());
        // The last child starts at 1.0s and runs its full second after that.
        assert!((group.elapsed() - 2.0).abs() < 1e-6);
        assert!(c.is_complete());
    }

    #[test]
    fn stagger_completion_frame_is_the_last_child_finishing() {
        let a = Probe::new("a", 1.0);
        let b = Probe::new("b", 1.0);
        let mut group = StaggeredSequenceManager::new(vec![boxed(&a), boxed(&b)], 0.5);
        group.start(&context());

        // b starts at 0.5 with nothing left of that frame.
        assert!(!group.update(0.5));
        assert!(!group.update(0.5));
        assert!(a.is_complete());
        assert!(!b.is_complete());
        assert!(group.update(0.5));
        assert!(b.is_complete());
    }

    #[test]
    fn stagger_child_starting_mid_frame_gets_only_the_overshoot() {
        let a = Probe::new("a", 1.0);
        let b = Probe::new("b", 1.0);
        let mut group = StaggeredSequenceManager::new(vec![boxed(&a), boxed(&b)], 0.5);
        group.start(&context());

        group.update(0.75);
        assert!((a.elapsed() - 0.75).abs() < 1e-6);
        assert!((b.elapsed() - 0.25).abs() < 1e-6);

        group.update(0.25);
        assert!(a.is_complete());
        assert!((b.elapsed() - 0.5).abs() < 1e-6);
        assert!(!group.is_complete());
    }

    #[test]
    fn nested_composites_compose() {
        let a = Probe::new("a", 0.5);
        let b = Probe::new("b", 0.5);
        let c = Probe::new("c", 0.5);
        let inner = StaggeredSequenceManager::new(vec![boxed(&b), boxed(&c)], 0.25);
        let mut chain = SequenceChain::new(vec![boxed(&a), Box::new(inner)]);

        chain.start(&context());
        chain.update(0.5);
        assert_eq!(b.starts(), 1);
        assert_eq!(c.starts(), 0);
        assert!(!chain.update(0.25));
        assert_eq!(c.starts(), 1);
        assert!(!chain.update(0.25));
        assert!(b.is_complete());
        assert!(chain.update(0.25));
    }
}
