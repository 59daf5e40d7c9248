//! Uniform result of phase-handler input dispatch.

use crate::state::{CombatPhase, CombatState};

/// Out-of-band signals a phase handler can raise for the orchestrator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PhaseEventData {
    /// Play the encounter intro cinematic again (after a retry restore).
    ReplayIntro,
    /// Abandon the encounter without a victory.
    SkipEncounter,
    /// A deployment zone was selected or cleared.
    ZoneSelected(Option<usize>),
}

/// What a phase handler did with an input event.
///
/// Handlers communicate with the orchestrator exclusively through this value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PhaseEventResult {
    /// Whether the handler consumed the event.
    pub handled: bool,
    /// Replacement state, e.g. to force a re-render.
    pub new_state: Option<CombatState>,
    /// Phase to enter next.
    pub transition_to: Option<CombatPhase>,
    pub log_message: Option<String>,
    pub data: Option<PhaseEventData>,
}

impl PhaseEventResult {
    pub fn unhandled() -> Self {
        Self::default()
    }

    pub fn handled() -> Self {
        Self {
            handled: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_state(mut self, state: CombatState) -> Self {
        self.new_state = Some(state);
        self
    }

    #[must_use]
    pub fn with_transition(mut self, phase: CombatPhase) -> Self {
        self.transition_to = Some(phase);
        self
    }

    #[must_use]
    pub fn with_log(mut self, message: impl Into<String>) -> Self {
        self.log_message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_data(mut self, data: PhaseEventData) -> Self {
        self.data = Some(data);
        self
    }
}
