//! Authoritative combat state representation.
//!
//! [`CombatState`] is the single mutable snapshot of an in-progress encounter.
//! Its phase changes only through values returned by phase handlers; the
//! orchestrator applies them, nothing else writes the phase.
//!
//! The persisted layout is [`CombatStateJson`], which never contains the
//! retry snapshot. Restoring from a snapshot is a two-step process:
//! decode the JSON, then re-attach the snapshot string to the result.
mod grid;
mod units;

pub use grid::{CombatMap, MapCell, Position};
pub use units::{CombatUnit, PlacedUnit, Team, UnitId, UnitManifest, UnitStats};

use serde::{Deserialize, Serialize};

use crate::error::{CombatError, ErrorSeverity};

/// Closed set of combat lifecycle stages.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum CombatPhase {
    #[default]
    Deployment,
    EnemyDeployment,
    Battle,
    Victory,
    Defeat,
}

impl CombatPhase {
    /// Phase entered when a handler exits without naming a target.
    ///
    /// Battle ends through victory/defeat checks; the terminal phases end the
    /// session instead of moving on.
    pub const fn successor(self) -> Option<CombatPhase> {
        match self {
            CombatPhase::Deployment => Some(CombatPhase::EnemyDeployment),
            CombatPhase::EnemyDeployment => Some(CombatPhase::Battle),
            CombatPhase::Battle | CombatPhase::Victory | CombatPhase::Defeat => None,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, CombatPhase::Victory | CombatPhase::Defeat)
    }
}

/// Errors raised while encoding, decoding, or editing combat state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("no initial state snapshot is attached")]
    MissingSnapshot,

    #[error("failed to encode combat state")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode combat state snapshot")]
    Decode(#[source] serde_json::Error),

    #[error("tile {0} is already occupied")]
    OccupiedTile(Position),

    #[error("unit '{0}' is already on the field")]
    DuplicateUnit(UnitId),

    #[error("unit '{0}' not found")]
    UnknownUnit(UnitId),
}

impl CombatError for StateError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            // A failed retry is swallowed; the session keeps running.
            StateError::MissingSnapshot | StateError::Decode(_) => ErrorSeverity::Recoverable,
            StateError::OccupiedTile(_) | StateError::DuplicateUnit(_) => {
                ErrorSeverity::Validation
            }
            StateError::Encode(_) | StateError::UnknownUnit(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            StateError::MissingSnapshot => "STATE_MISSING_SNAPSHOT",
            StateError::Encode(_) => "STATE_ENCODE",
            StateError::Decode(_) => "STATE_DECODE",
            StateError::OccupiedTile(_) => "STATE_OCCUPIED_TILE",
            StateError::DuplicateUnit(_) => "STATE_DUPLICATE_UNIT",
            StateError::UnknownUnit(_) => "STATE_UNKNOWN_UNIT",
        }
    }
}

/// Canonical snapshot of an in-progress encounter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CombatState {
    /// Round counter, starting at 1. Never decreases.
    pub turn_number: u32,
    phase: CombatPhase,
    pub map: CombatMap,
    pub unit_manifest: UnitManifest,
    pub tileset_id: String,
    /// Serialized [`CombatStateJson`] captured at encounter start.
    initial_state_snapshot: Option<String>,
}

/// Persisted layout of [`CombatState`], without the retry snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatStateJson {
    pub turn_number: u32,
    pub phase: CombatPhase,
    pub tileset_id: String,
    pub map: CombatMap,
    pub unit_manifest: UnitManifest,
}

impl CombatState {
    pub fn new(map: CombatMap, tileset_id: impl Into<String>) -> Self {
        Self {
            turn_number: 1,
            phase: CombatPhase::Deployment,
            map,
            unit_manifest: UnitManifest::new(),
            tileset_id: tileset_id.into(),
            initial_state_snapshot: None,
        }
    }

    pub fn phase(&self) -> CombatPhase {
        self.phase
    }

    /// Returns this state moved to `phase`. Phase handlers use this to signal
    /// an explicit transition through their return value.
    #[must_use]
    pub fn with_phase(mut self, phase: CombatPhase) -> Self {
        self.phase = phase;
        self
    }

    #[must_use]
    pub fn with_manifest(mut self, unit_manifest: UnitManifest) -> Self {
        self.unit_manifest = unit_manifest;
        self
    }

    pub fn advance_turn(&mut self) {
        self.turn_number = self.turn_number.saturating_add(1);
    }

    pub fn to_json(&self) -> CombatStateJson {
        CombatStateJson {
            turn_number: self.turn_number,
            phase: self.phase,
            tileset_id: self.tileset_id.clone(),
            map: self.map.clone(),
            unit_manifest: self.unit_manifest.clone(),
        }
    }

    /// Rebuilds a live state from its persisted layout. The snapshot is not
    /// part of the layout; callers re-attach it with [`Self::attach_snapshot`].
    pub fn from_json(json: CombatStateJson) -> Self {
        Self {
            turn_number: json.turn_number,
            phase: json.phase,
            map: json.map,
            unit_manifest: json.unit_manifest,
            tileset_id: json.tileset_id,
            initial_state_snapshot: None,
        }
    }

    pub fn encode(&self) -> Result<String, StateError> {
        serde_json::to_string(&self.to_json()).map_err(StateError::Encode)
    }

    pub fn decode(encoded: &str) -> Result<Self, StateError> {
        let json: CombatStateJson = serde_json::from_str(encoded).map_err(StateError::Decode)?;
        Ok(Self::from_json(json))
    }

    pub fn snapshot(&self) -> Option<&str> {
        self.initial_state_snapshot.as_deref()
    }

    pub fn attach_snapshot(&mut self, snapshot: impl Into<String>) {
        self.initial_state_snapshot = Some(snapshot.into());
    }

    /// Captures the current state as the retry snapshot and attaches it.
    pub fn capture_snapshot(&mut self) -> Result<(), StateError> {
        let encoded = self.encode()?;
        self.initial_state_snapshot = Some(encoded);
        Ok(())
    }

    /// Decodes the attached snapshot and re-attaches it to the restored state,
    /// so the result can be restored again.
    pub fn restore_snapshot(&self) -> Result<CombatState, StateError> {
        let snapshot = self
            .initial_state_snapshot
            .as_deref()
            .ok_or(StateError::MissingSnapshot)?;
        let mut restored = Self::decode(snapshot)?;
        restored.attach_snapshot(snapshot);
        Ok(restored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> CombatState {
        let mut state = CombatState::new(CombatMap::new(4, 4), "dungeon");
        state
            .unit_manifest
            .place(
                CombatUnit::new("hero", "Hero", Team::Player),
                Position::new(1, 1),
            )
            .unwrap();
        state
    }

    #[test]
    fn json_layout_uses_camel_case_and_excludes_snapshot() {
        let mut state = sample_state();
        state.capture_snapshot().unwrap();

        let value = serde_json::to_value(state.to_json()).unwrap();
        let object = value.as_object().unwrap();
        assert!(object.contains_key("turnNumber"));
        assert!(object.contains_key("tilesetId"));
        assert!(object.contains_key("unitManifest"));
        assert!(!object.keys().any(|key| key.contains("napshot")));
        assert_eq!(object["phase"], "deployment");
    }

    #[test]
    fn restore_reattaches_snapshot_for_repeated_retries() {
        let mut state = sample_state();
        state.capture_snapshot().unwrap();

        let mut progressed = state.clone().with_phase(CombatPhase::Defeat);
        progressed.turn_number = 7;

        let first = progressed.restore_snapshot().unwrap();
        assert_eq!(first.phase(), CombatPhase::Deployment);
        assert_eq!(first.turn_number, 1);
        assert_eq!(first.snapshot(), state.snapshot());

        let second = first.restore_snapshot().unwrap();
        assert_eq!(second, first);
    }

    #[test]
    fn restore_without_snapshot_fails_recoverably() {
        let state = sample_state();
        let err = state.restore_snapshot().unwrap_err();
        assert!(matches!(err, StateError::MissingSnapshot));
        assert!(err.severity().is_recoverable());
    }

    #[test]
    fn corrupt_snapshot_reports_decode_error() {
        let mut state = sample_state();
        state.attach_snapshot("{not json");
        let err = state.restore_snapshot().unwrap_err();
        assert_eq!(err.error_code(), "STATE_DECODE");
    }

    #[test]
    fn phase_round_trips_through_strings() {
        assert_eq!(CombatPhase::EnemyDeployment.to_string(), "enemy-deployment");
        assert_eq!(
            "enemy-deployment".parse::<CombatPhase>().unwrap(),
            CombatPhase::EnemyDeployment
        );
        assert_eq!(CombatPhase::Deployment.successor(), Some(CombatPhase::EnemyDeployment));
        assert_eq!(CombatPhase::Defeat.successor(), None);
    }
}
