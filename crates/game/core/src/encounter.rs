//! Static, read-only configuration for one battle.

use serde::{Deserialize, Serialize};

use crate::error::{CombatError, ErrorSeverity};
use crate::predicate::CombatPredicate;
use crate::state::{CombatMap, CombatState, CombatUnit, PlacedUnit, Position, StateError, UnitId};

/// Text shown by the intro cinematic.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroScript {
    pub title: String,
    /// Message lines; may embed `[sprite:<id>]` references.
    pub lines: Vec<String>,
    pub font: String,
}

/// Immutable battle definition. A new encounter means a new combat session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatEncounter {
    pub id: String,
    pub name: String,
    pub tileset_id: String,
    pub map: CombatMap,
    /// Tiles where player units may be placed before battle.
    pub deployment_zones: Vec<Position>,
    /// Player units available for deployment.
    pub roster: Vec<CombatUnit>,
    pub enemies: Vec<PlacedUnit>,
    pub victory: CombatPredicate,
    pub defeat: CombatPredicate,
    #[serde(default)]
    pub intro: IntroScript,
}

/// Data-integrity errors in an encounter definition.
#[derive(Debug, thiserror::Error)]
pub enum EncounterError {
    #[error("deployment zone {0} lies outside the map")]
    ZoneOutOfBounds(Position),

    #[error("deployment zone {0} is not walkable")]
    ZoneNotWalkable(Position),

    #[error("enemy '{unit}' is placed outside the walkable map at {position}")]
    EnemyMisplaced { unit: UnitId, position: Position },

    #[error("unit '{unit}' references unknown class '{class_id}'")]
    UnknownClass { unit: UnitId, class_id: String },

    #[error("invalid enemy placement")]
    Placement(#[source] StateError),
}

impl CombatError for EncounterError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            EncounterError::ZoneOutOfBounds(_) => "ENCOUNTER_ZONE_OUT_OF_BOUNDS",
            EncounterError::ZoneNotWalkable(_) => "ENCOUNTER_ZONE_NOT_WALKABLE",
            EncounterError::EnemyMisplaced { .. } => "ENCOUNTER_ENEMY_MISPLACED",
            EncounterError::UnknownClass { .. } => "ENCOUNTER_UNKNOWN_CLASS",
            EncounterError::Placement(_) => "ENCOUNTER_PLACEMENT",
        }
    }
}

impl CombatEncounter {
    /// Checks zones and enemy placements against the map.
    pub fn validate(&self) -> Result<(), EncounterError> {
        for &zone in &self.deployment_zones {
            if !self.map.contains(zone) {
                return Err(EncounterError::ZoneOutOfBounds(zone));
            }
            if !self.map.is_walkable(zone) {
                return Err(EncounterError::ZoneNotWalkable(zone));
            }
        }
        for placed in &self.enemies {
            if !self.map.is_walkable(placed.position) {
                return Err(EncounterError::EnemyMisplaced {
                    unit: placed.unit.id.clone(),
                    position: placed.position,
                });
            }
        }
        Ok(())
    }

    /// Checks every unit's class against the set of known classes.
    pub fn validate_classes<F>(&self, is_known: F) -> Result<(), EncounterError>
    where
        F: Fn(&str) -> bool,
    {
        self.roster
            .iter()
            .chain(self.enemies.iter().map(|placed| &placed.unit))
            .find(|unit| !is_known(&unit.class_id))
            .map_or(Ok(()), |unit| {
                Err(EncounterError::UnknownClass {
                    unit: unit.id.clone(),
                    class_id: unit.class_id.clone(),
                })
            })
    }

    /// Builds the deployment-phase state: the map with enemies in place.
    pub fn initial_state(&self) -> Result<CombatState, EncounterError> {
        let mut state = CombatState::new(self.map.clone(), self.tileset_id.clone());
        for placed in &self.enemies {
            state
                .unit_manifest
                .place(placed.unit.clone(), placed.position)
                .map_err(EncounterError::Placement)?;
        }
        Ok(state)
    }

    pub fn zone_index(&self, position: Position) -> Option<usize> {
        self.deployment_zones.iter().position(|&zone| zone == position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CombatPhase, MapCell, Team};

    fn encounter() -> CombatEncounter {
        CombatEncounter {
            id: "ambush".into(),
            name: "Ambush".into(),
            tileset_id: "forest".into(),
            map: CombatMap::new(5, 5),
            deployment_zones: vec![Position::new(0, 0), Position::new(0, 1)],
            roster: vec![CombatUnit::new("hero", "Hero", Team::Player).with_class("knight")],
            enemies: vec![PlacedUnit {
                unit: CombatUnit::new("gob", "Goblin", Team::Enemy).with_class("goblin"),
                position: Position::new(4, 4),
            }],
            victory: CombatPredicate::AllEnemiesDefeated,
            defeat: CombatPredicate::AllPlayersDefeated,
            intro: IntroScript::default(),
        }
    }

    #[test]
    fn initial_state_places_enemies_in_deployment_phase() {
        let state = encounter().initial_state().unwrap();
        assert_eq!(state.phase(), CombatPhase::Deployment);
        assert!(state.unit_manifest.unit_at(Position::new(4, 4)).is_some());
        assert_eq!(state.tileset_id, "forest");
    }

    #[test]
    fn validate_rejects_walled_zone() {
        let mut encounter = encounter();
        if let Some(cell) = encounter.map.cell_mut(Position::new(0, 1)) {
            *cell = MapCell::wall("rock");
        }
        assert!(matches!(
            encounter.validate(),
            Err(EncounterError::ZoneNotWalkable(_))
        ));
    }

    #[test]
    fn validate_classes_names_the_offender() {
        let err = encounter()
            .validate_classes(|class| class == "knight")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "unit 'gob' references unknown class 'goblin'"
        );
    }
}
