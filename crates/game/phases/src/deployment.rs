//! Player deployment: place roster units onto deployment zones.

use combat_core::{
    CombatEncounter, CombatPhase, CombatState, CombatUnit, PhaseEventData, PhaseEventResult,
    Position, RenderContext, Rgba, StateError, Team,
};

use crate::handler::{CombatPhaseHandler, InfoPanelContent, InfoPanelRow};
use crate::layout::{ListLayout, PhaseResources};

const START_ROW: usize = 2;

/// Deployment phase.
///
/// Zones breathe with a sine-wave overlay. Clicking a zone selects it (and a
/// second click on the same zone clears the selection); a selected zone opens
/// a character list sized to its content, and picking a character places it
/// there. "Start Battle" in the info panel ends the phase once at least one
/// unit is deployed.
pub struct DeploymentPhase {
    resources: PhaseResources,
    elapsed: f32,
    selected_zone: Option<usize>,
    hovered_row: Option<usize>,
    hovered_panel_row: Option<usize>,
    start_requested: bool,
}

impl DeploymentPhase {
    pub fn new(resources: PhaseResources) -> Self {
        Self {
            resources,
            elapsed: 0.0,
            selected_zone: None,
            hovered_row: None,
            hovered_panel_row: None,
            start_requested: false,
        }
    }

    pub fn get_selected_zone_index(&self) -> Option<usize> {
        self.selected_zone
    }

    /// Current overlay alpha of the breathing zone highlight.
    pub fn zone_alpha(&self) -> f32 {
        self.resources.config.zone_alpha_at(self.elapsed)
    }

    fn available_units<'a>(
        state: &CombatState,
        encounter: &'a CombatEncounter,
    ) -> Vec<&'a CombatUnit> {
        encounter
            .roster
            .iter()
            .filter(|unit| state.unit_manifest.get(&unit.id).is_none())
            .collect()
    }

    fn dialog(&self, state: &CombatState, encounter: &CombatEncounter) -> Option<ListLayout> {
        let zone = *encounter.deployment_zones.get(self.selected_zone?)?;
        let labels: Vec<String> = Self::available_units(state, encounter)
            .iter()
            .map(|unit| unit.name.clone())
            .collect();
        if labels.is_empty() {
            return None;
        }
        Some(ListLayout::beside(
            &self.resources,
            self.resources.map_bounds(&state.map),
            self.resources.tile_rect(zone),
            &labels,
        ))
    }

    fn deploy(
        &mut self,
        row: usize,
        state: &CombatState,
        encounter: &CombatEncounter,
    ) -> PhaseEventResult {
        let Some(zone) = self
            .selected_zone
            .and_then(|index| encounter.deployment_zones.get(index).copied())
        else {
            return PhaseEventResult::unhandled();
        };
        let Some(unit) = Self::available_units(state, encounter).get(row).copied() else {
            return PhaseEventResult::unhandled();
        };

        let mut next = state.clone();
        if let Some(occupant) = next.unit_manifest.unit_at(zone).map(|placed| placed.unit.id.clone()) {
            next.unit_manifest.remove(&occupant);
        }
        if let Err(error) = next.unit_manifest.place(unit.clone(), zone) {
            tracing::warn!(%error, unit = %unit.id, "deployment rejected");
            return PhaseEventResult::handled();
        }

        self.selected_zone = None;
        self.hovered_row = None;
        PhaseEventResult::handled()
            .with_state(next)
            .with_log(format!("{} deployed to {}", unit.name, zone))
            .with_data(PhaseEventData::ZoneSelected(None))
    }
}

/// Places roster units onto deployment zones in order, skipping occupied zones.
pub fn auto_deploy(
    state: &CombatState,
    encounter: &CombatEncounter,
) -> Result<CombatState, StateError> {
    let mut next = state.clone();
    let mut zones = encounter
        .deployment_zones
        .iter()
        .copied()
        .filter(|&zone| state.unit_manifest.unit_at(zone).is_none());
    for unit in &encounter.roster {
        if next.unit_manifest.get(&unit.id).is_some() {
            continue;
        }
        let Some(zone) = zones.next() else {
            break;
        };
        next.unit_manifest.place(unit.clone(), zone)?;
    }
    Ok(next)
}

impl CombatPhaseHandler for DeploymentPhase {
    fn phase(&self) -> CombatPhase {
        CombatPhase::Deployment
    }

    fn required_sprites(&self, _state: &CombatState, encounter: &CombatEncounter) -> Vec<String> {
        encounter.roster.iter().map(|unit| unit.sprite.clone()).collect()
    }

    fn update(
        &mut self,
        state: &CombatState,
        _encounter: &CombatEncounter,
        delta_time: f32,
    ) -> Option<CombatState> {
        self.elapsed += delta_time;
        if self.start_requested {
            return None;
        }
        Some(state.clone())
    }

    fn render(&self, state: &CombatState, encounter: &CombatEncounter, ctx: &mut RenderContext<'_>) {
        let breathing = Rgba::ZONE_BLUE.with_alpha(self.zone_alpha());
        for (index, &zone) in encounter.deployment_zones.iter().enumerate() {
            let color = if self.selected_zone == Some(index) {
                Rgba::GOLD.with_alpha(self.zone_alpha())
            } else {
                breathing
            };
            ctx.surface.fill_rect(self.resources.tile_rect(zone), color);
        }
        if let Some(dialog) = self.dialog(state, encounter) {
            dialog.render(&self.resources, self.hovered_row, ctx);
        }
    }

    fn handle_map_click(
        &mut self,
        tile: Position,
        _state: &CombatState,
        encounter: &CombatEncounter,
    ) -> PhaseEventResult {
        let Some(index) = encounter.zone_index(tile) else {
            if self.selected_zone.take().is_some() {
                return PhaseEventResult::handled().with_data(PhaseEventData::ZoneSelected(None));
            }
            return PhaseEventResult::unhandled();
        };

        self.selected_zone = if self.selected_zone == Some(index) {
            None
        } else {
            Some(index)
        };
        self.hovered_row = None;
        tracing::debug!(zone = ?self.selected_zone, "deployment zone toggled");
        PhaseEventResult::handled().with_data(PhaseEventData::ZoneSelected(self.selected_zone))
    }

    fn handle_mouse_down(
        &mut self,
        x: i32,
        y: i32,
        state: &CombatState,
        encounter: &CombatEncounter,
    ) -> PhaseEventResult {
        match self.dialog(state, encounter).and_then(|dialog| dialog.hit(x, y)) {
            Some(row) => self.deploy(row, state, encounter),
            None => PhaseEventResult::unhandled(),
        }
    }

    fn handle_mouse_move(
        &mut self,
        x: i32,
        y: i32,
        state: &CombatState,
        encounter: &CombatEncounter,
    ) -> PhaseEventResult {
        let hovered = self.dialog(state, encounter).and_then(|dialog| dialog.hit(x, y));
        if hovered == self.hovered_row {
            return PhaseEventResult::unhandled();
        }
        self.hovered_row = hovered;
        PhaseEventResult::handled()
    }

    fn handle_info_panel_click(
        &mut self,
        row: usize,
        state: &CombatState,
        _encounter: &CombatEncounter,
    ) -> PhaseEventResult {
        if row != START_ROW {
            return PhaseEventResult::unhandled();
        }
        if state.unit_manifest.count_living(Team::Player) == 0 {
            return PhaseEventResult::handled().with_log("Deploy at least one unit first");
        }
        self.start_requested = true;
        PhaseEventResult::handled().with_log("Deployment complete")
    }

    fn handle_info_panel_hover(
        &mut self,
        row: Option<usize>,
        _state: &CombatState,
        _encounter: &CombatEncounter,
    ) -> PhaseEventResult {
        self.hovered_panel_row = row;
        PhaseEventResult::handled()
    }

    fn top_panel(&self, _state: &CombatState, encounter: &CombatEncounter) -> Option<Vec<String>> {
        Some(vec![encounter.name.clone(), "Deployment".to_string()])
    }

    fn info_panel_content(
        &self,
        state: &CombatState,
        encounter: &CombatEncounter,
    ) -> Option<InfoPanelContent> {
        let deployed = encounter
            .roster
            .iter()
            .filter(|unit| state.unit_manifest.get(&unit.id).is_some())
            .count();
        let mut rows = vec![
            InfoPanelRow::label("Click a zone, then pick a unit"),
            InfoPanelRow::label(format!("Deployed: {}/{}", deployed, encounter.roster.len())),
            InfoPanelRow::button("Start Battle", deployed > 0),
        ];
        if let Some(row) = self.hovered_panel_row.and_then(|index| rows.get_mut(index)) {
            row.hovered = true;
        }
        Some(InfoPanelContent {
            title: "Deployment".to_string(),
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::CombatConfig;
    use combat_core::testing::{RecordingSurface, fake_font, sample_content, sample_encounter};

    fn phase() -> DeploymentPhase {
        DeploymentPhase::new(PhaseResources::new(CombatConfig::new(), fake_font("ui", 4, 6)))
    }

    #[test]
    fn clicking_the_same_zone_twice_clears_selection() {
        let encounter = sample_encounter();
        let state = encounter.initial_state().unwrap();
        let mut phase = phase();

        let third = encounter.deployment_zones[2];
        let first = phase.handle_map_click(third, &state, &encounter);
        assert!(first.handled);
        assert_eq!(phase.get_selected_zone_index(), Some(2));
        assert_eq!(first.data, Some(PhaseEventData::ZoneSelected(Some(2))));

        phase.handle_map_click(third, &state, &encounter);
        assert_eq!(phase.get_selected_zone_index(), None);
    }

    #[test]
    fn selecting_another_zone_moves_the_selection() {
        let encounter = sample_encounter();
        let state = encounter.initial_state().unwrap();
        let mut phase = phase();
        phase.handle_map_click(encounter.deployment_zones[0], &state, &encounter);
        phase.handle_map_click(encounter.deployment_zones[1], &state, &encounter);
        assert_eq!(phase.get_selected_zone_index(), Some(1));

        let outside = phase.handle_map_click(Position::new(4, 4), &state, &encounter);
        assert!(outside.handled);
        assert_eq!(phase.get_selected_zone_index(), None);
        assert!(!phase.handle_map_click(Position::new(4, 4), &state, &encounter).handled);
    }

    #[test]
    fn picking_from_the_dialog_deploys_the_unit() {
        let encounter = sample_encounter();
        let state = encounter.initial_state().unwrap();
        let mut phase = phase();
        phase.handle_map_click(encounter.deployment_zones[1], &state, &encounter);

        let dialog = phase.dialog(&state, &encounter).unwrap();
        assert_eq!(dialog.rows.len(), 2);
        let second = dialog.rows[1].rect;
        let result = phase.handle_mouse_down(second.x, second.y, &state, &encounter);

        let next = result.new_state.unwrap();
        let ranger = next.unit_manifest.unit_at(Position::new(0, 1)).unwrap();
        assert_eq!(ranger.unit.id.as_str(), "ranger");
        assert_eq!(result.log_message.as_deref(), Some("Ranger deployed to (0, 1)"));
        assert_eq!(phase.get_selected_zone_index(), None);
    }

    #[test]
    fn dialog_shrinks_to_remaining_units() {
        let encounter = sample_encounter();
        let state = auto_deploy(&encounter.initial_state().unwrap(), &encounter).unwrap();
        let mut phase = phase();
        phase.handle_map_click(encounter.deployment_zones[2], &state, &encounter);
        assert!(phase.dialog(&state, &encounter).is_none());
    }

    #[test]
    fn start_requires_a_deployed_unit() {
        let encounter = sample_encounter();
        let empty = encounter.initial_state().unwrap();
        let mut phase = phase();

        let refused = phase.handle_info_panel_click(START_ROW, &empty, &encounter);
        assert!(refused.handled);
        assert!(phase.update(&empty, &encounter, 0.1).is_some());

        let ready = auto_deploy(&empty, &encounter).unwrap();
        assert_eq!(ready.unit_manifest.count_living(Team::Player), 2);
        phase.handle_info_panel_click(START_ROW, &ready, &encounter);
        assert!(phase.update(&ready, &encounter, 0.1).is_none());
    }

    #[test]
    fn zones_breathe_between_configured_alphas() {
        let encounter = sample_encounter();
        let state = encounter.initial_state().unwrap();
        let content = sample_content();
        let mut phase = phase();

        let mut seen = Vec::new();
        for _ in 0..20 {
            phase.update(&state, &encounter, 0.1);
            let mut surface = RecordingSurface::new(72, 72);
            phase.render(&state, &encounter, &mut RenderContext::new(&mut surface, &content));
            let fills = surface.fills();
            assert_eq!(fills.len(), 3);
            seen.push(fills[0].1.a);
        }
        let low = (CombatConfig::DEFAULT_ZONE_ALPHA_MIN * 255.0).floor() as u8;
        let high = (CombatConfig::DEFAULT_ZONE_ALPHA_MAX * 255.0).ceil() as u8;
        assert!(seen.iter().all(|&a| a >= low && a <= high));
        assert!(seen.iter().max() > seen.iter().min());
    }
}
