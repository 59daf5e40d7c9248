//! Battle: round-based turns over every living unit.

use std::collections::HashMap;

use combat_core::{
    ActionMenuItem, CombatEncounter, CombatPhase, CombatState, PhaseEventResult, PixelRect,
    Position, RenderContext, Rgba, Team, TurnAction, UnitId,
};
use strum::IntoEnumIterator;

use crate::handler::{CombatPhaseHandler, InfoPanelContent, InfoPanelRow};
use crate::layout::PhaseResources;
use crate::strategy::{Controller, Controllers, TurnContext, TurnStrategy};

/// Info panel row of the first action-menu entry.
const MENU_OFFSET: usize = 1;

struct TeamControl {
    strategy: Box<dyn TurnStrategy>,
    human: bool,
}

impl TeamControl {
    fn new(controller: Controller, resources: &PhaseResources) -> Self {
        Self {
            strategy: controller.strategy(&resources.config),
            human: controller.is_human(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct ActiveTurn {
    unit: UnitId,
    team: Team,
    origin: Position,
    has_moved: bool,
    has_attacked: bool,
}

/// Battle phase.
///
/// Units act in manifest order. A round ends once every unit in it has
/// acted, at which point the turn counter advances and a fresh order is
/// taken from the survivors. Defeat is checked before victory after every
/// action.
pub struct BattlePhase {
    resources: PhaseResources,
    player: TeamControl,
    enemy: TeamControl,
    round: Vec<UnitId>,
    cursor: usize,
    /// Units that delayed this round, with the turn they set aside.
    delayed: HashMap<UnitId, ActiveTurn>,
    turn: Option<ActiveTurn>,
    hovered_menu: Option<usize>,
    log: Vec<String>,
}

impl BattlePhase {
    pub fn new(resources: PhaseResources, controllers: Controllers) -> Self {
        Self {
            player: TeamControl::new(controllers.player, &resources),
            enemy: TeamControl::new(controllers.enemy, &resources),
            resources,
            round: Vec::new(),
            cursor: 0,
            delayed: HashMap::new(),
            turn: None,
            hovered_menu: None,
            log: Vec::new(),
        }
    }

    /// Replaces the strategy driving `team`.
    #[must_use]
    pub fn with_strategy(mut self, team: Team, strategy: Box<dyn TurnStrategy>, human: bool) -> Self {
        *self.control_mut(team) = TeamControl { strategy, human };
        self
    }

    /// The unit whose turn it is.
    pub fn active_unit(&self) -> Option<&UnitId> {
        self.turn.as_ref().map(|turn| &turn.unit)
    }

    /// Remaining order of the current round, starting with the active unit.
    pub fn round_order(&self) -> &[UnitId] {
        self.round.get(self.cursor..).unwrap_or(&[])
    }

    fn control(&self, team: Team) -> &TeamControl {
        match team {
            Team::Player => &self.player,
            Team::Enemy => &self.enemy,
        }
    }

    fn control_mut(&mut self, team: Team) -> &mut TeamControl {
        match team {
            Team::Player => &mut self.player,
            Team::Enemy => &mut self.enemy,
        }
    }

    /// Skips units that died or vanished and rolls over to a new round when
    /// the current one is exhausted.
    fn settle_round(&mut self, state: &mut CombatState) {
        loop {
            while let Some(id) = self.round.get(self.cursor) {
                if state
                    .unit_manifest
                    .get(id)
                    .is_some_and(|placed| !placed.unit.is_defeated())
                {
                    return;
                }
                self.cursor += 1;
            }

            let finished_round = !self.round.is_empty();
            self.round = state
                .unit_manifest
                .iter()
                .filter(|placed| !placed.unit.is_defeated())
                .map(|placed| placed.unit.id.clone())
                .collect();
            self.cursor = 0;
            self.delayed.clear();
            if finished_round {
                state.advance_turn();
                self.log.push(format!("Turn {} begins", state.turn_number));
            }
            if self.round.is_empty() {
                return;
            }
        }
    }

    /// Opens the turn of the unit under the cursor if it is not yet active.
    fn begin_turn(&mut self, state: &CombatState, encounter: &CombatEncounter) {
        let Some(id) = self.round.get(self.cursor) else {
            self.turn = None;
            return;
        };
        if self.turn.as_ref().is_some_and(|turn| &turn.unit == id) {
            return;
        }
        let Some(placed) = state.unit_manifest.get(id) else {
            return;
        };
        // A delayed unit resumes with what it already did this round.
        let turn = self.delayed.get(id).cloned().unwrap_or_else(|| ActiveTurn {
            unit: id.clone(),
            team: placed.unit.team,
            origin: placed.position,
            has_moved: false,
            has_attacked: false,
        });
        let ctx = TurnContext {
            unit: placed,
            state,
            encounter,
            has_moved: turn.has_moved,
            has_attacked: turn.has_attacked,
        };
        tracing::debug!(unit = %turn.unit, team = %turn.team, "turn started");
        self.control_mut(turn.team).strategy.on_turn_start(&ctx);
        self.turn = Some(turn);
    }

    fn finish_turn(&mut self) {
        if let Some(turn) = self.turn.take() {
            self.control_mut(turn.team).strategy.on_turn_end();
        }
    }

    fn apply(&mut self, action: TurnAction, state: &mut CombatState, encounter: &CombatEncounter) {
        let Some(turn) = self.turn.clone() else {
            return;
        };
        let Some(placed) = state.unit_manifest.get(&turn.unit) else {
            return;
        };
        let name = placed.unit.name.clone();

        match action {
            TurnAction::Move { destination, .. } => {
                let allowed = {
                    let ctx = TurnContext {
                        unit: placed,
                        state,
                        encounter,
                        has_moved: turn.has_moved,
                        has_attacked: turn.has_attacked,
                    };
                    ctx.movement_options().iter().any(|(tile, _)| *tile == destination)
                };
                if !allowed {
                    tracing::warn!(unit = %turn.unit, %destination, "move outside movement range ignored");
                    return;
                }
                if let Err(error) = state.unit_manifest.move_unit(&turn.unit, destination) {
                    tracing::warn!(%error, unit = %turn.unit, "move rejected");
                    return;
                }
                self.set_flags(|turn| turn.has_moved = true);
                self.log.push(format!("{name} moves to {destination}"));
            }
            TurnAction::ResetMove => {
                if !turn.has_moved {
                    return;
                }
                if let Err(error) = state.unit_manifest.move_unit(&turn.unit, turn.origin) {
                    tracing::warn!(%error, unit = %turn.unit, "reset move rejected");
                    return;
                }
                self.set_flags(|turn| turn.has_moved = false);
                self.log.push(format!("{name} returns to {}", turn.origin));
            }
            TurnAction::Attack { target } => {
                if turn.has_attacked {
                    tracing::warn!(unit = %turn.unit, "second attack in one turn ignored");
                    return;
                }
                let stats = placed.unit.stats;
                let from = placed.position;
                let victim = state
                    .unit_manifest
                    .unit_at(target)
                    .filter(|other| other.unit.team != turn.team)
                    .filter(|_| from.distance(target) <= stats.attack_range)
                    .map(|other| other.unit.id.clone());
                let Some(victim) = victim else {
                    tracing::warn!(unit = %turn.unit, %target, "attack without a valid target ignored");
                    return;
                };
                let Some(struck) = state.unit_manifest.get_mut(&victim) else {
                    return;
                };
                let dealt = struck.unit.take_damage(stats.attack_power);
                self.log
                    .push(format!("{name} hits {} for {dealt} damage", struck.unit.name));
                if struck.unit.is_defeated() {
                    self.log.push(format!("{} is defeated", struck.unit.name));
                }
                self.set_flags(|turn| turn.has_attacked = true);
            }
            TurnAction::Delay => {
                let last = self.cursor + 1 >= self.round.len();
                if last || self.delayed.contains_key(&turn.unit) {
                    self.log.push(format!("{name} ends turn"));
                    self.finish_turn();
                    self.cursor += 1;
                    return;
                }
                let id = self.round.remove(self.cursor);
                self.round.push(id.clone());
                self.delayed.insert(id, turn);
                self.log.push(format!("{name} delays"));
                self.finish_turn();
            }
            TurnAction::EndTurn => {
                self.log.push(format!("{name} ends turn"));
                self.finish_turn();
                self.cursor += 1;
            }
        }
    }

    fn set_flags(&mut self, edit: impl FnOnce(&mut ActiveTurn)) {
        if let Some(turn) = self.turn.as_mut() {
            edit(turn);
        }
    }

    fn outcome(&mut self, state: &CombatState, encounter: &CombatEncounter) -> Option<CombatPhase> {
        if encounter.defeat.evaluate(state) {
            self.log.push("Defeat".to_string());
            return Some(CombatPhase::Defeat);
        }
        if encounter.victory.evaluate(state) {
            self.log.push("Victory".to_string());
            return Some(CombatPhase::Victory);
        }
        None
    }

    /// Runs `input` against the active unit's strategy if a human drives it.
    fn with_human_turn<R>(
        &mut self,
        state: &CombatState,
        encounter: &CombatEncounter,
        input: impl FnOnce(&mut dyn TurnStrategy, &TurnContext<'_>) -> R,
    ) -> Option<R> {
        let turn = self.turn.clone()?;
        let placed = state.unit_manifest.get(&turn.unit)?;
        let control = self.control_mut(turn.team);
        if !control.human {
            return None;
        }
        let ctx = TurnContext {
            unit: placed,
            state,
            encounter,
            has_moved: turn.has_moved,
            has_attacked: turn.has_attacked,
        };
        Some(input(control.strategy.as_mut(), &ctx))
    }

    fn menu_rows(&self) -> Vec<InfoPanelRow> {
        let Some(turn) = &self.turn else {
            return Vec::new();
        };
        ActionMenuItem::iter()
            .map(|item| {
                let enabled = match item {
                    ActionMenuItem::Attack => !turn.has_attacked,
                    ActionMenuItem::ResetMove => turn.has_moved,
                    ActionMenuItem::Delay | ActionMenuItem::EndTurn => true,
                };
                InfoPanelRow::button(item.to_string(), enabled)
            })
            .collect()
    }

    fn draw_tiles(&self, tiles: &[Position], color: Rgba, ctx: &mut RenderContext<'_>) {
        for &tile in tiles {
            ctx.surface.fill_rect(self.resources.tile_rect(tile), color);
        }
    }
}

impl CombatPhaseHandler for BattlePhase {
    fn phase(&self) -> CombatPhase {
        CombatPhase::Battle
    }

    fn required_sprites(&self, state: &CombatState, _encounter: &CombatEncounter) -> Vec<String> {
        let mut sprites: Vec<String> = Vec::new();
        for placed in state.unit_manifest.iter() {
            if !sprites.contains(&placed.unit.sprite) {
                sprites.push(placed.unit.sprite.clone());
            }
        }
        sprites
    }

    fn update(
        &mut self,
        state: &CombatState,
        encounter: &CombatEncounter,
        delta_time: f32,
    ) -> Option<CombatState> {
        let mut next = state.clone();
        self.settle_round(&mut next);
        self.begin_turn(&next, encounter);

        let action = self.turn.clone().and_then(|turn| {
            let placed = next.unit_manifest.get(&turn.unit)?;
            let ctx = TurnContext {
                unit: placed,
                state: &next,
                encounter,
                has_moved: turn.has_moved,
                has_attacked: turn.has_attacked,
            };
            self.control_mut(turn.team).strategy.update(&ctx, delta_time)
        });

        if let Some(action) = action {
            tracing::debug!(action = action.label(), "applying turn action");
            self.apply(action, &mut next, encounter);
            self.settle_round(&mut next);
        }

        match self.outcome(&next, encounter) {
            Some(phase) => {
                self.finish_turn();
                Some(next.with_phase(phase))
            }
            None => Some(next),
        }
    }

    fn render(&self, state: &CombatState, _encounter: &CombatEncounter, ctx: &mut RenderContext<'_>) {
        if let Some(turn) = &self.turn
            && let Some(active) = state.unit_manifest.get(&turn.unit)
        {
            let strategy = &self.control(turn.team).strategy;
            self.draw_tiles(strategy.movement_range(), Rgba::ZONE_BLUE.with_alpha(0.3), ctx);
            self.draw_tiles(strategy.attack_range(), Rgba::CRIMSON.with_alpha(0.2), ctx);
            if let Some(path) = strategy.movement_path() {
                self.draw_tiles(path, Rgba::WHITE.with_alpha(0.4), ctx);
            }
            if let Some(target) = strategy
                .targeted_unit()
                .and_then(|id| state.unit_manifest.get(id))
            {
                self.draw_tiles(&[target.position], Rgba::CRIMSON.with_alpha(0.6), ctx);
            }
            self.draw_tiles(&[active.position], Rgba::GOLD.with_alpha(0.35), ctx);
        }

        for placed in state.unit_manifest.iter().filter(|placed| !placed.unit.is_defeated()) {
            let tile = self.resources.tile_rect(placed.position);
            let stats = placed.unit.stats;
            let bar_y = tile.y + tile.height as i32 - 2;
            ctx.surface
                .fill_rect(PixelRect::new(tile.x, bar_y, tile.width, 2), Rgba::BLACK);
            let filled = tile.width * stats.hp / stats.max_hp.max(1);
            let color = match placed.unit.team {
                Team::Player => Rgba::ZONE_BLUE,
                Team::Enemy => Rgba::CRIMSON,
            };
            ctx.surface
                .fill_rect(PixelRect::new(tile.x, bar_y, filled, 2), color);
        }
    }

    fn handle_map_click(
        &mut self,
        tile: Position,
        state: &CombatState,
        encounter: &CombatEncounter,
    ) -> PhaseEventResult {
        match self.with_human_turn(state, encounter, |strategy, ctx| {
            strategy.handle_map_click(tile, ctx)
        }) {
            Some(true) => PhaseEventResult::handled(),
            _ => PhaseEventResult::unhandled(),
        }
    }

    fn handle_mouse_move(
        &mut self,
        x: i32,
        y: i32,
        state: &CombatState,
        encounter: &CombatEncounter,
    ) -> PhaseEventResult {
        let tile = self.resources.tile_at(&state.map, x, y);
        match self.with_human_turn(state, encounter, |strategy, ctx| {
            strategy.handle_mouse_move(tile, ctx)
        }) {
            Some(true) => PhaseEventResult::handled(),
            _ => PhaseEventResult::unhandled(),
        }
    }

    fn handle_info_panel_click(
        &mut self,
        row: usize,
        state: &CombatState,
        encounter: &CombatEncounter,
    ) -> PhaseEventResult {
        let Some(item) = row
            .checked_sub(MENU_OFFSET)
            .and_then(|index| ActionMenuItem::iter().nth(index))
        else {
            return PhaseEventResult::unhandled();
        };
        match self.with_human_turn(state, encounter, |strategy, ctx| {
            strategy.handle_action_selected(item, ctx)
        }) {
            Some(true) => PhaseEventResult::handled(),
            _ => PhaseEventResult::unhandled(),
        }
    }

    fn handle_info_panel_hover(
        &mut self,
        row: Option<usize>,
        _state: &CombatState,
        _encounter: &CombatEncounter,
    ) -> PhaseEventResult {
        self.hovered_menu = row;
        PhaseEventResult::handled()
    }

    fn top_panel(&self, state: &CombatState, _encounter: &CombatEncounter) -> Option<Vec<String>> {
        let mut lines = vec![format!("Turn {}", state.turn_number)];
        if let Some(active) = self
            .active_unit()
            .and_then(|id| state.unit_manifest.get(id))
        {
            lines.push(format!("Active: {}", active.unit.name));
        }
        Some(lines)
    }

    fn info_panel_content(
        &self,
        state: &CombatState,
        encounter: &CombatEncounter,
    ) -> Option<InfoPanelContent> {
        let turn = self.turn.as_ref()?;
        let placed = state.unit_manifest.get(&turn.unit)?;
        let stats = placed.unit.stats;
        let mut rows = vec![InfoPanelRow::label(format!("HP {}/{}", stats.hp, stats.max_hp))];
        if self.control(turn.team).human {
            rows.extend(self.menu_rows());
        } else {
            rows.push(InfoPanelRow::label("Thinking..."));
        }
        rows.push(InfoPanelRow::label(format!("Win: {}", encounter.victory.description())));
        if let Some(row) = self.hovered_menu.and_then(|index| rows.get_mut(index)) {
            row.hovered = true;
        }
        Some(InfoPanelContent {
            title: placed.unit.name.clone(),
            rows,
        })
    }

    fn drain_log(&mut self) -> Vec<String> {
        std::mem::take(&mut self.log)
    }
}
