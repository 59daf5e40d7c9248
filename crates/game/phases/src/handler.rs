//! Shared interface of every combat phase.

use combat_core::{
    CombatEncounter, CombatPhase, CombatState, PhaseEventResult, Position, RenderContext,
};

/// One row of the side info panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InfoPanelRow {
    pub text: String,
    /// Whether clicking the row does something right now.
    pub clickable: bool,
    pub hovered: bool,
}

impl InfoPanelRow {
    pub fn label(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            clickable: false,
            hovered: false,
        }
    }

    pub fn button(text: impl Into<String>, enabled: bool) -> Self {
        Self {
            text: text.into(),
            clickable: enabled,
            hovered: false,
        }
    }
}

/// Phase-specific content of the info panel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InfoPanelContent {
    pub title: String,
    pub rows: Vec<InfoPanelRow>,
}

/// A single phase of the combat state machine.
///
/// # Transitions
///
/// There is no central transition table. `update` decides:
///
/// - `None`: leave this phase (the orchestrator moves to its successor)
/// - `Some(state)` with the same phase: remain, re-render with `state`
/// - `Some(state)` with a different phase: enter that phase
///
/// Input handlers report through [`PhaseEventResult`]; the defaults ignore
/// the event.
pub trait CombatPhaseHandler: Send {
    fn phase(&self) -> CombatPhase;

    /// Sprite identifiers this phase draws, for preloading on entry.
    fn required_sprites(&self, state: &CombatState, encounter: &CombatEncounter) -> Vec<String>;

    fn update(
        &mut self,
        state: &CombatState,
        encounter: &CombatEncounter,
        delta_time: f32,
    ) -> Option<CombatState>;

    /// Draws the phase overlay. Map tiles and units are already on the surface.
    fn render(&self, state: &CombatState, encounter: &CombatEncounter, ctx: &mut RenderContext<'_>);

    fn handle_map_click(
        &mut self,
        _tile: Position,
        _state: &CombatState,
        _encounter: &CombatEncounter,
    ) -> PhaseEventResult {
        PhaseEventResult::unhandled()
    }

    fn handle_mouse_down(
        &mut self,
        _x: i32,
        _y: i32,
        _state: &CombatState,
        _encounter: &CombatEncounter,
    ) -> PhaseEventResult {
        PhaseEventResult::unhandled()
    }

    fn handle_mouse_up(
        &mut self,
        _x: i32,
        _y: i32,
        _state: &CombatState,
        _encounter: &CombatEncounter,
    ) -> PhaseEventResult {
        PhaseEventResult::unhandled()
    }

    fn handle_mouse_move(
        &mut self,
        _x: i32,
        _y: i32,
        _state: &CombatState,
        _encounter: &CombatEncounter,
    ) -> PhaseEventResult {
        PhaseEventResult::unhandled()
    }

    fn handle_info_panel_click(
        &mut self,
        _row: usize,
        _state: &CombatState,
        _encounter: &CombatEncounter,
    ) -> PhaseEventResult {
        PhaseEventResult::unhandled()
    }

    fn handle_info_panel_hover(
        &mut self,
        _row: Option<usize>,
        _state: &CombatState,
        _encounter: &CombatEncounter,
    ) -> PhaseEventResult {
        PhaseEventResult::unhandled()
    }

    /// Lines for the top status bar, if this phase has one.
    fn top_panel(&self, _state: &CombatState, _encounter: &CombatEncounter) -> Option<Vec<String>> {
        None
    }

    fn info_panel_content(
        &self,
        _state: &CombatState,
        _encounter: &CombatEncounter,
    ) -> Option<InfoPanelContent> {
        None
    }

    /// Log lines produced during `update`, drained by the orchestrator.
    fn drain_log(&mut self) -> Vec<String> {
        Vec::new()
    }
}
