//! Turn strategies: the policies that turn a unit's turn into actions.
//!
//! The battle handler polls [`TurnStrategy::update`] once per frame until it
//! yields an action. Human strategies wait for input; AI strategies decide
//! after a short thinking delay. Player-only input methods are simply never
//! called for AI-driven units.

mod ai;
mod player;

pub use ai::AiTurnStrategy;
pub use player::PlayerTurnStrategy;

use combat_core::{
    ActionMenuItem, CombatConfig, CombatEncounter, CombatState, PlacedUnit, Position, TurnAction,
    UnitId,
};

/// Who decides for a team.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Controller {
    #[default]
    Human,
    Ai,
}

impl Controller {
    pub fn is_human(self) -> bool {
        self == Controller::Human
    }

    pub fn strategy(self, config: &CombatConfig) -> Box<dyn TurnStrategy> {
        match self {
            Controller::Human => Box::new(PlayerTurnStrategy::new()),
            Controller::Ai => Box::new(AiTurnStrategy::new(config.ai_thinking_delay)),
        }
    }
}

/// Controllers of both teams.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Controllers {
    pub player: Controller,
    pub enemy: Controller,
}

impl Controllers {
    /// Both teams under AI control, for unattended runs.
    pub fn all_ai() -> Self {
        Self {
            player: Controller::Ai,
            enemy: Controller::Ai,
        }
    }
}

impl Default for Controllers {
    fn default() -> Self {
        Self {
            player: Controller::Human,
            enemy: Controller::Ai,
        }
    }
}

/// Everything a strategy may read about the acting unit's situation.
#[derive(Clone, Copy, Debug)]
pub struct TurnContext<'a> {
    pub unit: &'a PlacedUnit,
    pub state: &'a CombatState,
    pub encounter: &'a CombatEncounter,
    pub has_moved: bool,
    pub has_attacked: bool,
}

impl<'a> TurnContext<'a> {
    pub fn position(&self) -> Position {
        self.unit.position
    }

    /// Tiles the unit may walk to this turn, each with its shortest path.
    pub fn movement_options(&self) -> Vec<(Position, Vec<Position>)> {
        if self.has_moved {
            return Vec::new();
        }
        let manifest = &self.state.unit_manifest;
        let me = &self.unit.unit.id;
        self.state.map.reachable(
            self.position(),
            self.unit.unit.stats.movement,
            |tile| manifest.unit_at(tile).is_some_and(|other| &other.unit.id != me),
        )
    }

    /// On-map tiles within attack range of `from`, excluding `from` itself.
    pub fn attack_tiles_from(&self, from: Position) -> Vec<Position> {
        let range = self.unit.unit.stats.attack_range as i32;
        let map = &self.state.map;
        (-range..=range)
            .flat_map(|dy| (-range..=range).map(move |dx| Position::new(from.x + dx, from.y + dy)))
            .filter(|&tile| tile != from && from.distance(tile) <= range as u32 && map.contains(tile))
            .collect()
    }

    /// Living opponents within attack range of `from`.
    pub fn targets_from(&self, from: Position) -> Vec<&'a PlacedUnit> {
        let range = self.unit.unit.stats.attack_range;
        let team = self.unit.unit.team.opponent();
        self.state
            .unit_manifest
            .living(team)
            .filter(|target| from.distance(target.position) <= range)
            .collect()
    }
}

/// A decision-making policy for one team's units.
pub trait TurnStrategy: Send {
    /// Called once when a unit's turn begins.
    fn on_turn_start(&mut self, ctx: &TurnContext<'_>);

    /// Called once when the unit's turn ends (end turn or delay).
    fn on_turn_end(&mut self);

    /// Polled every frame; returns an action once one is decided.
    fn update(&mut self, ctx: &TurnContext<'_>, delta_time: f32) -> Option<TurnAction>;

    /// Returns `true` if the click was consumed.
    fn handle_map_click(&mut self, _tile: Position, _ctx: &TurnContext<'_>) -> bool {
        false
    }

    fn handle_mouse_move(&mut self, _tile: Option<Position>, _ctx: &TurnContext<'_>) -> bool {
        false
    }

    fn handle_action_selected(&mut self, _item: ActionMenuItem, _ctx: &TurnContext<'_>) -> bool {
        false
    }

    fn targeted_unit(&self) -> Option<&UnitId> {
        None
    }

    fn movement_range(&self) -> &[Position] {
        &[]
    }

    fn attack_range(&self) -> &[Position] {
        &[]
    }

    fn movement_path(&self) -> Option<&[Position]> {
        None
    }
}
