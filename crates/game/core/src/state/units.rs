use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Position, StateError};

/// Stable identifier for a unit within one encounter.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub String);

impl UnitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Side a unit fights for.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Team {
    Player,
    Enemy,
}

impl Team {
    pub fn opponent(self) -> Team {
        match self {
            Team::Player => Team::Enemy,
            Team::Enemy => Team::Player,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitStats {
    pub max_hp: u32,
    pub hp: u32,
    /// Tiles a unit may walk per turn.
    pub movement: u32,
    /// Manhattan reach of an attack.
    pub attack_range: u32,
    pub attack_power: u32,
}

impl UnitStats {
    pub fn new(max_hp: u32, movement: u32, attack_range: u32, attack_power: u32) -> Self {
        Self {
            max_hp,
            hp: max_hp,
            movement,
            attack_range,
            attack_power,
        }
    }
}

impl Default for UnitStats {
    fn default() -> Self {
        Self::new(10, 3, 1, 3)
    }
}

/// Identity and stats of a combatant. Class data is resolved by `class_id`
/// through external content and never embedded here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatUnit {
    pub id: UnitId,
    pub name: String,
    pub class_id: String,
    pub team: Team,
    pub sprite: String,
    #[serde(default)]
    pub stats: UnitStats,
}

impl CombatUnit {
    pub fn new(id: impl Into<String>, name: impl Into<String>, team: Team) -> Self {
        Self {
            id: UnitId::new(id),
            name: name.into(),
            class_id: String::new(),
            team,
            sprite: String::new(),
            stats: UnitStats::default(),
        }
    }

    pub fn with_class(mut self, class_id: impl Into<String>) -> Self {
        self.class_id = class_id.into();
        self
    }

    pub fn with_sprite(mut self, sprite: impl Into<String>) -> Self {
        self.sprite = sprite.into();
        self
    }

    pub fn with_stats(mut self, stats: UnitStats) -> Self {
        self.stats = stats;
        self
    }

    pub fn is_defeated(&self) -> bool {
        self.stats.hp == 0
    }

    /// Applies damage and returns the hp actually removed.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.stats.hp);
        self.stats.hp -= dealt;
        dealt
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedUnit {
    pub unit: CombatUnit,
    pub position: Position,
}

/// Positions and identities of every unit on the field.
///
/// Serialized form (`ManifestJSON`): `{"units": [{"unit": ..., "position": ...}]}`.
/// Defeated units stay in the manifest (hp 0) but no longer occupy their tile.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitManifest {
    units: Vec<PlacedUnit>,
}

impl UnitManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlacedUnit> {
        self.units.iter()
    }

    /// Places a unit, rejecting duplicate ids and occupied tiles.
    pub fn place(&mut self, unit: CombatUnit, position: Position) -> Result<(), StateError> {
        if self.get(&unit.id).is_some() {
            return Err(StateError::DuplicateUnit(unit.id));
        }
        if self.unit_at(position).is_some() {
            return Err(StateError::OccupiedTile(position));
        }
        self.units.push(PlacedUnit { unit, position });
        Ok(())
    }

    pub fn remove(&mut self, id: &UnitId) -> Option<PlacedUnit> {
        let index = self.units.iter().position(|placed| &placed.unit.id == id)?;
        Some(self.units.remove(index))
    }

    pub fn get(&self, id: &UnitId) -> Option<&PlacedUnit> {
        self.units.iter().find(|placed| &placed.unit.id == id)
    }

    pub fn get_mut(&mut self, id: &UnitId) -> Option<&mut PlacedUnit> {
        self.units.iter_mut().find(|placed| &placed.unit.id == id)
    }

    /// The living unit standing on `position`, if any.
    pub fn unit_at(&self, position: Position) -> Option<&PlacedUnit> {
        self.units
            .iter()
            .find(|placed| placed.position == position && !placed.unit.is_defeated())
    }

    pub fn move_unit(&mut self, id: &UnitId, destination: Position) -> Result<(), StateError> {
        if let Some(occupant) = self.unit_at(destination)
            && &occupant.unit.id != id
        {
            return Err(StateError::OccupiedTile(destination));
        }
        let placed = self
            .get_mut(id)
            .ok_or_else(|| StateError::UnknownUnit(id.clone()))?;
        placed.position = destination;
        Ok(())
    }

    pub fn living(&self, team: Team) -> impl Iterator<Item = &PlacedUnit> {
        self.units
            .iter()
            .filter(move |placed| placed.unit.team == team && !placed.unit.is_defeated())
    }

    pub fn count_living(&self, team: Team) -> usize {
        self.living(team).count()
    }
}
