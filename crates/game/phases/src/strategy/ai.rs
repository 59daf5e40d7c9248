//! Greedy melee AI.
//!
//! Each decision waits `thinking_delay` seconds, then:
//!
//! 1. attack the weakest opponent in range (if it has not attacked yet)
//! 2. otherwise walk to the reachable tile closest to any opponent
//! 3. otherwise end the turn

use combat_core::{Position, TurnAction, UnitId};

use super::{TurnContext, TurnStrategy};

#[derive(Debug, Clone)]
pub struct AiTurnStrategy {
    thinking_delay: f32,
    elapsed: f32,
    target: Option<UnitId>,
    path: Option<Vec<Position>>,
}

impl AiTurnStrategy {
    pub fn new(thinking_delay: f32) -> Self {
        Self {
            thinking_delay: thinking_delay.max(0.0),
            elapsed: 0.0,
            target: None,
            path: None,
        }
    }

    fn decide(&mut self, ctx: &TurnContext<'_>) -> TurnAction {
        let here = ctx.position();

        if !ctx.has_attacked
            && let Some(victim) = ctx
                .targets_from(here)
                .into_iter()
                .min_by_key(|target| target.unit.stats.hp)
        {
            self.target = Some(victim.unit.id.clone());
            return TurnAction::Attack {
                target: victim.position,
            };
        }

        if !ctx.has_moved {
            let opponents: Vec<Position> = ctx
                .state
                .unit_manifest
                .living(ctx.unit.unit.team.opponent())
                .map(|placed| placed.position)
                .collect();
            let closeness = |tile: Position| {
                opponents
                    .iter()
                    .map(|&opponent| tile.distance(opponent))
                    .min()
                    .unwrap_or(u32::MAX)
            };

            let current = closeness(here);
            let best = ctx
                .movement_options()
                .into_iter()
                .min_by_key(|(tile, _)| closeness(*tile));
            if let Some((tile, path)) = best
                && closeness(tile) < current
            {
                self.path = Some(path.clone());
                return TurnAction::move_to(tile, path);
            }
        }

        TurnAction::EndTurn
    }
}

impl Default for AiTurnStrategy {
    fn default() -> Self {
        Self::new(combat_core::CombatConfig::DEFAULT_AI_THINKING_DELAY)
    }
}

impl TurnStrategy for AiTurnStrategy {
    fn on_turn_start(&mut self, ctx: &TurnContext<'_>) {
        self.elapsed = 0.0;
        self.target = None;
        self.path = None;
        tracing::debug!(unit = %ctx.unit.unit.id, "ai turn started");
    }

    fn on_turn_end(&mut self) {
        self.elapsed = 0.0;
        self.target = None;
        self.path = None;
    }

    fn update(&mut self, ctx: &TurnContext<'_>, delta_time: f32) -> Option<TurnAction> {
        self.elapsed += delta_time.max(0.0);
        if self.elapsed < self.thinking_delay {
            return None;
        }
        self.elapsed = 0.0;
        let action = self.decide(ctx);
        tracing::debug!(unit = %ctx.unit.unit.id, action = action.label(), "ai decided");
        Some(action)
    }

    fn targeted_unit(&self) -> Option<&UnitId> {
        self.target.as_ref()
    }

    fn movement_path(&self) -> Option<&[Position]> {
        self.path.as_deref()
    }
}
