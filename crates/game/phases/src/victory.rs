use combat_core::{CombatEncounter, CombatPhase, CombatState, PhaseEventResult, RenderContext, Rgba};

use crate::handler::CombatPhaseHandler;
use crate::layout::{ButtonTracker, ModalLayout, PhaseResources};

const TITLE: &str = "Victory";
const CONTINUE: &str = "Continue";

/// Victory modal. "Continue" makes the next update leave the phase, which
/// ends the session.
pub struct VictoryPhase {
    resources: PhaseResources,
    buttons: ButtonTracker,
    continue_requested: bool,
}

impl VictoryPhase {
    pub fn new(resources: PhaseResources) -> Self {
        Self {
            resources,
            buttons: ButtonTracker::default(),
            continue_requested: false,
        }
    }

    pub fn layout(&self, state: &CombatState) -> ModalLayout {
        ModalLayout::centered(
            &self.resources,
            self.resources.map_bounds(&state.map),
            TITLE,
            &[CONTINUE],
        )
    }
}

impl CombatPhaseHandler for VictoryPhase {
    fn phase(&self) -> CombatPhase {
        CombatPhase::Victory
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
        if self.continue_requested {
            return None;
        }
        Some(state.clone())
    }

    fn render(&self, state: &CombatState, _encounter: &CombatEncounter, ctx: &mut RenderContext<'_>) {
        self.layout(state)
            .render(&self.resources, self.buttons.hovered(), Rgba::GOLD, ctx);
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
            Some(_) => {
                self.continue_requested = true;
                PhaseEventResult::handled().with_log("Victory!")
            }
            None => PhaseEventResult::unhandled(),
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
            format!("Won on turn {}", state.turn_number),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::CombatConfig;
    use combat_core::testing::{RecordingSurface, fake_font, sample_content, sample_encounter};

    fn setup() -> (CombatEncounter, CombatState, VictoryPhase) {
        let encounter = sample_encounter();
        let state = encounter
            .initial_state()
            .unwrap()
            .with_phase(CombatPhase::Victory);
        let phase = VictoryPhase::new(PhaseResources::new(CombatConfig::new(), fake_font("ui", 4, 6)));
        (encounter, state, phase)
    }

    #[test]
    fn remains_until_continue_is_clicked() {
        let (encounter, state, mut phase) = setup();
        assert!(phase.update(&state, &encounter, 1.0).is_some());

        let button = phase.layout(&state).buttons[0].rect;
        assert!(phase.handle_mouse_down(button.x, button.y, &state, &encounter).handled);
        let released = phase.handle_mouse_up(button.x, button.y, &state, &encounter);
        assert_eq!(released.log_message.as_deref(), Some("Victory!"));
        assert!(released.transition_to.is_none());
        assert!(phase.update(&state, &encounter, 0.1).is_none());
    }

    #[test]
    fn renders_modal_with_continue_button() {
        let (encounter, state, phase) = setup();
        let content = sample_content();
        let mut surface = RecordingSurface::new(72, 72);
        phase.render(&state, &encounter, &mut RenderContext::new(&mut surface, &content));
        assert_eq!(surface.text(), "VictoryContinue");
    }
}
