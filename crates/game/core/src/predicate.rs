//! Victory/defeat predicate trees.
//!
//! A [`CombatPredicate`] is a boolean expression evaluated against a
//! [`CombatState`]. Leaves read state (turn count, surviving units); the
//! combinators `And`, `Or`, `Not` compose sub-trees of any depth.
//!
//! Evaluation is a pure function of the state, so the orchestrator may
//! evaluate every frame. Empty `And` is vacuously true and empty `Or` is
//! vacuously false, following the usual identities.
//!
//! # Data form
//!
//! Predicates are internally tagged on `type`:
//!
//! ```json
//! {"type": "Or", "predicates": [
//!     {"type": "TurnLimit", "maxTurns": 20},
//!     {"type": "Not", "predicate": {"type": "AlwaysFalse"}}
//! ]}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CombatError, ErrorSeverity};
use crate::state::{CombatState, Team};

/// Errors raised while decoding predicate data. These are content errors and
/// are meant to surface at load time, not to be recovered from mid-combat.
#[derive(Debug, thiserror::Error)]
pub enum PredicateError {
    #[error("predicate at {path} is not an object with a string `type` field")]
    MissingType { path: String },

    #[error("unknown predicate type '{type_name}' at {path}")]
    UnknownType { type_name: String, path: String },

    #[error("malformed '{type_name}' predicate at {path}")]
    Malformed {
        type_name: String,
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode predicate")]
    Encode(#[source] serde_json::Error),
}

impl CombatError for PredicateError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            PredicateError::Encode(_) => ErrorSeverity::Internal,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            PredicateError::MissingType { .. } => "PREDICATE_MISSING_TYPE",
            PredicateError::UnknownType { .. } => "PREDICATE_UNKNOWN_TYPE",
            PredicateError::Malformed { .. } => "PREDICATE_MALFORMED",
            PredicateError::Encode(_) => "PREDICATE_ENCODE",
        }
    }
}

/// A node of a victory/defeat expression tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum CombatPredicate {
    AlwaysTrue,
    AlwaysFalse,
    /// True once `turn_number >= max_turns` (inclusive).
    TurnLimit {
        max_turns: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    /// True when no enemy unit is left standing.
    AllEnemiesDefeated,
    /// True when no player unit is left standing.
    AllPlayersDefeated,
    And {
        predicates: Vec<CombatPredicate>,
    },
    Or {
        predicates: Vec<CombatPredicate>,
    },
    Not {
        predicate: Box<CombatPredicate>,
    },
}

impl CombatPredicate {
    pub const TYPE_NAMES: [&'static str; 8] = [
        "AlwaysTrue",
        "AlwaysFalse",
        "TurnLimit",
        "AllEnemiesDefeated",
        "AllPlayersDefeated",
        "And",
        "Or",
        "Not",
    ];

    pub fn turn_limit(max_turns: u32) -> Self {
        Self::TurnLimit {
            max_turns,
            description: None,
        }
    }

    pub fn and(predicates: Vec<CombatPredicate>) -> Self {
        Self::And { predicates }
    }

    pub fn or(predicates: Vec<CombatPredicate>) -> Self {
        Self::Or { predicates }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(predicate: CombatPredicate) -> Self {
        Self::Not {
            predicate: Box::new(predicate),
        }
    }

    /// The `type` tag of this node.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::AlwaysTrue => "AlwaysTrue",
            Self::AlwaysFalse => "AlwaysFalse",
            Self::TurnLimit { .. } => "TurnLimit",
            Self::AllEnemiesDefeated => "AllEnemiesDefeated",
            Self::AllPlayersDefeated => "AllPlayersDefeated",
            Self::And { .. } => "And",
            Self::Or { .. } => "Or",
            Self::Not { .. } => "Not",
        }
    }

    pub fn evaluate(&self, state: &CombatState) -> bool {
        match self {
            Self::AlwaysTrue => true,
            Self::AlwaysFalse => false,
            Self::TurnLimit { max_turns, .. } => state.turn_number >= *max_turns,
            Self::AllEnemiesDefeated => state.unit_manifest.count_living(Team::Enemy) == 0,
            Self::AllPlayersDefeated => state.unit_manifest.count_living(Team::Player) == 0,
            Self::And { predicates } => predicates.iter().all(|p| p.evaluate(state)),
            Self::Or { predicates } => predicates.iter().any(|p| p.evaluate(state)),
            Self::Not { predicate } => !predicate.evaluate(state),
        }
    }

    /// Human-readable summary for objective panels.
    pub fn description(&self) -> String {
        match self {
            Self::AlwaysTrue => "Always".to_string(),
            Self::AlwaysFalse => "Never".to_string(),
            Self::TurnLimit {
                description: Some(text),
                ..
            } => text.clone(),
            Self::TurnLimit { max_turns, .. } => format!("Turn {max_turns} reached"),
            Self::AllEnemiesDefeated => "Defeat all enemies".to_string(),
            Self::AllPlayersDefeated => "All allies defeated".to_string(),
            Self::And { predicates } => join_descriptions(predicates, " AND ", "Always"),
            Self::Or { predicates } => join_descriptions(predicates, " OR ", "Never"),
            Self::Not { predicate } => format!("NOT {}", predicate.description()),
        }
    }

    pub fn to_json(&self) -> Result<Value, PredicateError> {
        serde_json::to_value(self).map_err(PredicateError::Encode)
    }

    /// Rebuilds a predicate from its tagged data form, dispatching on `type`
    /// and recursing into `And`/`Or`/`Not` children.
    pub fn from_json(value: &Value) -> Result<Self, PredicateError> {
        Self::from_json_at(value, "$")
    }

    fn from_json_at(value: &Value, path: &str) -> Result<Self, PredicateError> {
        let type_name = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| PredicateError::MissingType {
                path: path.to_string(),
            })?;

        let malformed = |source| PredicateError::Malformed {
            type_name: type_name.to_string(),
            path: path.to_string(),
            source,
        };

        match type_name {
            "AlwaysTrue" => Ok(Self::AlwaysTrue),
            "AlwaysFalse" => Ok(Self::AlwaysFalse),
            "AllEnemiesDefeated" => Ok(Self::AllEnemiesDefeated),
            "AllPlayersDefeated" => Ok(Self::AllPlayersDefeated),
            "TurnLimit" => serde_json::from_value(value.clone()).map_err(malformed),
            "And" | "Or" => {
                let children = value
                    .get("predicates")
                    .and_then(Value::as_array)
                    .ok_or_else(|| malformed(missing_field("predicates")))?;
                let predicates = children
                    .iter()
                    .enumerate()
                    .map(|(index, child)| {
                        Self::from_json_at(child, &format!("{path}.predicates[{index}]"))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(if type_name == "And" {
                    Self::And { predicates }
                } else {
                    Self::Or { predicates }
                })
            }
            "Not" => {
                let child = value
                    .get("predicate")
                    .ok_or_else(|| malformed(missing_field("predicate")))?;
                let inner = Self::from_json_at(child, &format!("{path}.predicate"))?;
                Ok(Self::not(inner))
            }
            other => Err(PredicateError::UnknownType {
                type_name: other.to_string(),
                path: path.to_string(),
            }),
        }
    }
}

fn join_descriptions(predicates: &[CombatPredicate], separator: &str, empty: &str) -> String {
    if predicates.is_empty() {
        return empty.to_string();
    }
    predicates
        .iter()
        .map(|p| match p {
            CombatPredicate::And { .. } | CombatPredicate::Or { .. } => {
                format!("({})", p.description())
            }
            _ => p.description(),
        })
        .collect::<Vec<_>>()
        .join(separator)
}

fn missing_field(field: &'static str) -> serde_json::Error {
    <serde_json::Error as serde::de::Error>::missing_field(field)
}
