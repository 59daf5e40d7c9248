//! Discrete turn decisions emitted by turn strategies.

use serde::{Deserialize, Serialize};

use crate::state::Position;

/// The closed set of actions a turn strategy may emit for the acting unit.
///
/// A strategy emits at most one action per decision point; emitting ends that
/// decision cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TurnAction {
    /// Push this unit to the back of the current round order.
    Delay,
    /// Finish this unit's turn.
    EndTurn,
    /// Walk to `destination`, optionally along a precomputed path.
    Move {
        destination: Position,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<Vec<Position>>,
    },
    /// Undo this turn's move.
    ResetMove,
    /// Strike whatever stands on `target`.
    Attack { target: Position },
}

impl TurnAction {
    pub fn move_to(destination: Position, path: Vec<Position>) -> Self {
        Self::Move {
            destination,
            path: Some(path),
        }
    }

    /// True for actions that finish the unit's decision cycle for this turn.
    pub fn ends_turn(&self) -> bool {
        matches!(self, TurnAction::EndTurn | TurnAction::Delay)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TurnAction::Delay => "delay",
            TurnAction::EndTurn => "end-turn",
            TurnAction::Move { .. } => "move",
            TurnAction::ResetMove => "reset-move",
            TurnAction::Attack { .. } => "attack",
        }
    }
}

/// Entries of the player's action menu.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr, strum::EnumIter,
)]
#[strum(serialize_all = "title_case")]
pub enum ActionMenuItem {
    Attack,
    ResetMove,
    Delay,
    EndTurn,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_form_is_tagged() {
        let action = TurnAction::Attack {
            target: Position::new(2, 3),
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "attack", "target": {"x": 2, "y": 3}})
        );
    }

    #[test]
    fn only_delay_and_end_turn_finish_the_turn() {
        assert!(TurnAction::EndTurn.ends_turn());
        assert!(TurnAction::Delay.ends_turn());
        assert!(!TurnAction::ResetMove.ends_turn());
        assert!(!TurnAction::move_to(Position::ORIGIN, vec![]).ends_turn());
    }

    #[test]
    fn menu_labels_are_title_case() {
        assert_eq!(ActionMenuItem::EndTurn.to_string(), "End Turn");
        assert_eq!(ActionMenuItem::ResetMove.to_string(), "Reset Move");
    }
}
