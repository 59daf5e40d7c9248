use combat_core::{ActionMenuItem, Position, TurnAction, UnitId};

use super::{TurnContext, TurnStrategy};

/// Human control: map clicks and action-menu picks become actions.
///
/// Ranges are recomputed whenever the acting unit's position or one of its
/// turn flags changes, so the previews stay correct after any action.
#[derive(Debug, Default)]
pub struct PlayerTurnStrategy {
    options: Vec<(Position, Vec<Position>)>,
    movement_range: Vec<Position>,
    attack_range: Vec<Position>,
    path: Option<Vec<Position>>,
    target: Option<UnitId>,
    pending: Option<TurnAction>,
    computed_for: Option<(UnitId, Position, bool, bool)>,
}

impl PlayerTurnStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    fn refresh(&mut self, ctx: &TurnContext<'_>) {
        let key = (
            ctx.unit.unit.id.clone(),
            ctx.position(),
            ctx.has_moved,
            ctx.has_attacked,
        );
        if self.computed_for.as_ref() == Some(&key) {
            return;
        }
        self.options = ctx.movement_options();
        self.movement_range = self.options.iter().map(|(tile, _)| *tile).collect();
        self.attack_range = if ctx.has_attacked {
            Vec::new()
        } else {
            ctx.attack_tiles_from(ctx.position())
        };
        self.path = None;
        self.target = None;
        self.computed_for = Some(key);
    }

    fn path_to(&self, tile: Position) -> Option<&Vec<Position>> {
        self.options
            .iter()
            .find(|(candidate, _)| *candidate == tile)
            .map(|(_, path)| path)
    }

    fn enemy_in_range(&self, tile: Position, ctx: &TurnContext<'_>) -> Option<UnitId> {
        if !self.attack_range.contains(&tile) {
            return None;
        }
        ctx.state
            .unit_manifest
            .unit_at(tile)
            .filter(|other| other.unit.team != ctx.unit.unit.team)
            .map(|other| other.unit.id.clone())
    }
}

impl TurnStrategy for PlayerTurnStrategy {
    fn on_turn_start(&mut self, ctx: &TurnContext<'_>) {
        self.pending = None;
        self.computed_for = None;
        self.refresh(ctx);
    }

    fn on_turn_end(&mut self) {
        *self = Self::default();
    }

    fn update(&mut self, ctx: &TurnContext<'_>, _delta_time: f32) -> Option<TurnAction> {
        self.refresh(ctx);
        self.pending.take()
    }

    fn handle_map_click(&mut self, tile: Position, ctx: &TurnContext<'_>) -> bool {
        self.refresh(ctx);
        if let Some(path) = self.path_to(tile) {
            self.pending = Some(TurnAction::move_to(tile, path.clone()));
            return true;
        }
        if self.enemy_in_range(tile, ctx).is_some() {
            self.pending = Some(TurnAction::Attack { target: tile });
            return true;
        }
        false
    }

    fn handle_mouse_move(&mut self, tile: Option<Position>, ctx: &TurnContext<'_>) -> bool {
        self.refresh(ctx);
        let Some(tile) = tile else {
            self.path = None;
            self.target = None;
            return false;
        };
        self.path = self.path_to(tile).cloned();
        self.target = self.enemy_in_range(tile, ctx);
        self.path.is_some() || self.target.is_some()
    }

    fn handle_action_selected(&mut self, item: ActionMenuItem, ctx: &TurnContext<'_>) -> bool {
        self.pending = match item {
            // Targeting is already live; the next enemy click attacks.
            ActionMenuItem::Attack => return !ctx.has_attacked,
            ActionMenuItem::ResetMove if !ctx.has_moved => return false,
            ActionMenuItem::ResetMove => Some(TurnAction::ResetMove),
            ActionMenuItem::Delay => Some(TurnAction::Delay),
            ActionMenuItem::EndTurn => Some(TurnAction::EndTurn),
        };
        true
    }

    fn targeted_unit(&self) -> Option<&UnitId> {
        self.target.as_ref()
    }

    fn movement_range(&self) -> &[Position] {
        &self.movement_range
    }

    fn attack_range(&self) -> &[Position] {
        &self.attack_range
    }

    fn movement_path(&self) -> Option<&[Position]> {
        self.path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::testing::sample_encounter;
    use combat_core::{CombatEncounter, CombatState};

    fn setup(hero_at: Position) -> (CombatEncounter, CombatState) {
        let encounter = sample_encounter();
        let mut state = encounter.initial_state().unwrap();
        state
            .unit_manifest
            .place(encounter.roster[0].clone(), hero_at)
            .unwrap();
        (encounter, state)
    }

    fn ctx<'a>(encounter: &'a CombatEncounter, state: &'a CombatState) -> TurnContext<'a> {
        TurnContext {
            unit: state.unit_manifest.get(&encounter.roster[0].id).unwrap(),
            state,
            encounter,
            has_moved: false,
            has_attacked: false,
        }
    }

    #[test]
    fn waits_for_input() {
        let (encounter, state) = setup(Position::new(0, 0));
        let mut strategy = PlayerTurnStrategy::new();
        strategy.on_turn_start(&ctx(&encounter, &state));
        assert_eq!(strategy.update(&ctx(&encounter, &state), 1.0), None);
        assert!(!strategy.movement_range().is_empty());
    }

    #[test]
    fn click_in_range_emits_move_with_path() {
        let (encounter, state) = setup(Position::new(0, 0));
        let mut strategy = PlayerTurnStrategy::new();
        let turn = ctx(&encounter, &state);
        strategy.on_turn_start(&turn);

        assert!(strategy.handle_map_click(Position::new(2, 0), &turn));
        assert_eq!(
            strategy.update(&turn, 0.0),
            Some(TurnAction::move_to(
                Position::new(2, 0),
                vec![Position::new(1, 0), Position::new(2, 0)]
            ))
        );
        assert_eq!(strategy.update(&turn, 0.0), None);
    }

    #[test]
    fn click_out_of_range_is_ignored() {
        let (encounter, state) = setup(Position::new(0, 0));
        let mut strategy = PlayerTurnStrategy::new();
        let turn = ctx(&encounter, &state);
        strategy.on_turn_start(&turn);
        assert!(!strategy.handle_map_click(Position::new(4, 4), &turn));
        assert_eq!(strategy.update(&turn, 0.0), None);
    }

    #[test]
    fn click_on_adjacent_enemy_attacks() {
        let (encounter, state) = setup(Position::new(5, 4));
        let mut strategy = PlayerTurnStrategy::new();
        let turn = ctx(&encounter, &state);
        strategy.on_turn_start(&turn);

        assert!(strategy.handle_mouse_move(Some(Position::new(5, 5)), &turn));
        assert_eq!(strategy.targeted_unit().map(UnitId::as_str), Some("goblin"));
        assert!(strategy.handle_map_click(Position::new(5, 5), &turn));
        assert_eq!(
            strategy.update(&turn, 0.0),
            Some(TurnAction::Attack {
                target: Position::new(5, 5)
            })
        );
    }

    #[test]
    fn attack_range_clears_after_attacking() {
        let (encounter, state) = setup(Position::new(5, 4));
        let mut strategy = PlayerTurnStrategy::new();
        let turn = ctx(&encounter, &state);
        strategy.on_turn_start(&turn);
        assert!(!strategy.attack_range().is_empty());

        let spent = TurnContext {
            has_attacked: true,
            ..turn
        };
        assert!(!strategy.handle_map_click(Position::new(5, 5), &spent));
        assert!(strategy.attack_range().is_empty());
        assert_eq!(strategy.update(&spent, 0.0), None);
    }

    #[test]
    fn hover_previews_path() {
        let (encounter, state) = setup(Position::new(0, 0));
        let mut strategy = PlayerTurnStrategy::new();
        let turn = ctx(&encounter, &state);
        strategy.on_turn_start(&turn);

        strategy.handle_mouse_move(Some(Position::new(0, 2)), &turn);
        assert_eq!(
            strategy.movement_path(),
            Some(&[Position::new(0, 1), Position::new(0, 2)][..])
        );
        strategy.handle_mouse_move(None, &turn);
        assert_eq!(strategy.movement_path(), None);
    }

    #[test]
    fn menu_maps_to_turn_actions() {
        let (encounter, state) = setup(Position::new(0, 0));
        let mut strategy = PlayerTurnStrategy::new();
        let turn = ctx(&encounter, &state);
        strategy.on_turn_start(&turn);

        assert!(!strategy.handle_action_selected(ActionMenuItem::ResetMove, &turn));
        assert!(strategy.handle_action_selected(ActionMenuItem::Delay, &turn));
        assert_eq!(strategy.update(&turn, 0.0), Some(TurnAction::Delay));

        let moved = TurnContext { has_moved: true, ..turn };
        assert!(strategy.handle_action_selected(ActionMenuItem::ResetMove, &moved));
        assert_eq!(strategy.update(&moved, 0.0), Some(TurnAction::ResetMove));
        assert!(strategy.movement_range().is_empty());

        assert!(strategy.handle_action_selected(ActionMenuItem::EndTurn, &turn));
        assert_eq!(strategy.update(&turn, 0.0), Some(TurnAction::EndTurn));
    }
}
