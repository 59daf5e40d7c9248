use combat_core::{
    CombatEncounter, CombatPhase, CombatState, PhaseEventData, PhaseEventResult, RenderContext,
    Rgba,
};

use crate::handler::CombatPhaseHandler;
use crate::layout::{ButtonTracker, ModalLayout, PhaseResources};

const TITLE: &str = "Defeat";
const TRY_AGAIN: usize = 0;
const SKIP: usize = 1;
const LABELS: [&str; 2] = ["Try Again", "Skip Encounter"];

/// Defeat modal offering a retry from the encounter's initial snapshot or
/// abandoning the encounter.
pub struct DefeatPhase {
    resources: PhaseResources,
    buttons: ButtonTracker,
}

impl DefeatPhase {
    pub fn new(resources: PhaseResources) -> Self {
        Self {
            resources,
            buttons: ButtonTracker::default(),
        }
    }

    pub fn layout(&self, state: &CombatState) -> ModalLayout {
        ModalLayout::centered(
            &self.resources,
            self.resources.map_bounds(&state.map),
            TITLE,
            &LABELS,
        )
    }

    pub fn hovered_button(&self) -> Option<usize> {
        self.buttons.hovered()
    }

    fn try_again(&self, state: &CombatState) -> PhaseEventResult {
        match state.restore_snapshot() {
            Ok(restored) => PhaseEventResult::handled()
                .with_state(restored)
                .with_transition(CombatPhase::Deployment)
                .with_data(PhaseEventData::ReplayIntro)
                .with_log("Retrying encounter"),
            Err(error) => {
                tracing::error!(%error, "cannot restore the encounter's initial state");
                PhaseEventResult::handled()
            }
        }
    }
}

impl CombatPhaseHandler for DefeatPhase {
    fn phase(&self) -> CombatPhase {
        CombatPhase::Defeat
    }

    fn required_sprites(&self, _state: &CombatState, _encounter: &CombatEncounter) -> Vec<String> {
        Vec::new()
    }

    fn update(
        &mut self,
        state: &CombatState,
        _encounter: &CombatEncounter,
        _delta_time: f32,
    ) -> Option<CombatState> {
        Some(state.clone())
    }

    fn render(&self, state: &CombatState, _encounter: &CombatEncounter, ctx: &mut RenderContext<'_>) {
        self.layout(state)
            .render(&self.resources, self.buttons.hovered(), Rgba::CRIMSON, ctx);
    }

    fn handle_mouse_down(
        &mut self,
        x: i32,
        y: i32,
        state: &CombatState,
        _encounter: &CombatEncounter,
    ) -> PhaseEventResult {
        let hit = self.layout(state).hit(x, y);
        if self.buttons.press(hit) {
            PhaseEventResult::handled()
        } else {
            PhaseEventResult::unhandled()
        }
    }

    fn handle_mouse_up(
        &mut self,
        x: i32,
        y: i32,
        state: &CombatState,
        _encounter: &CombatEncounter,
    ) -> PhaseEventResult {
        let hit = self.layout(state).hit(x, y);
        match self.buttons.release(hit) {
            Some(TRY_AGAIN) => self.try_again(state),
            Some(SKIP) => PhaseEventResult::handled()
                .with_data(PhaseEventData::SkipEncounter)
                .with_log("Encounter skipped"),
            _ => PhaseEventResult::unhandled(),
        }
    }

    fn handle_mouse_move(
        &mut self,
        x: i32,
        y: i32,
        state: &CombatState,
        _encounter: &CombatEncounter,
    ) -> PhaseEventResult {
        let hit = self.layout(state).hit(x, y);
        if self.buttons.hover(hit) {
            PhaseEventResult::handled()
        } else {
            PhaseEventResult::unhandled()
        }
    }

    fn top_panel(&self, state: &CombatState, encounter: &CombatEncounter) -> Option<Vec<String>> {
        Some(vec![
            encounter.name.clone(),
            format!("Defeated on turn {}", state.turn_number),
        ])
    }
}
