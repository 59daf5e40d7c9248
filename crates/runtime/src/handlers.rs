//! Phase-handler construction.

use combat_core::CombatPhase;
use combat_phases::{CombatPhaseHandler, Controllers, PhaseResources, create_handler};

/// Creates the handler for each phase the session enters.
pub trait HandlerFactory: Send {
    /// Returns `None` if this factory has no handler for `phase`.
    fn create(&self, phase: CombatPhase) -> Option<Box<dyn CombatPhaseHandler>>;
}

/// The stock handlers for every phase.
#[derive(Clone, Debug)]
pub struct StandardHandlers {
    pub resources: PhaseResources,
    pub controllers: Controllers,
}

impl StandardHandlers {
    pub fn new(resources: PhaseResources, controllers: Controllers) -> Self {
        Self {
            resources,
            controllers,
        }
    }
}

impl HandlerFactory for StandardHandlers {
    fn create(&self, phase: CombatPhase) -> Option<Box<dyn CombatPhaseHandler>> {
        Some(create_handler(phase, &self.resources, self.controllers))
    }
}
