//! Encounter loader.
//!
//! Encounter files describe the map compactly (a floor sprite plus wall
//! overrides) and write predicates in plain RON enum syntax.

use std::path::Path;

use combat_core::{
    CombatEncounter, CombatMap, CombatPredicate, CombatUnit, IntroScript, MapCell, PlacedUnit,
    Position, Team, UnitStats,
};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Encounter data structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EncounterRon {
    id: String,
    name: String,
    tileset: String,
    size: (u32, u32),
    floor: String,
    #[serde(default)]
    walls: Vec<(i32, i32, String)>, // (x, y, sprite)
    zones: Vec<(i32, i32)>,
    roster: Vec<UnitRon>,
    #[serde(default)]
    enemies: Vec<EnemyRon>,
    #[serde(default = "default_victory")]
    victory: PredicateRon,
    #[serde(default = "default_defeat")]
    defeat: PredicateRon,
    #[serde(default)]
    intro: IntroScript,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UnitRon {
    id: String,
    name: String,
    class: String,
    /// Defaults to the class id.
    #[serde(default)]
    sprite: Option<String>,
    stats: StatsRon,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct StatsRon {
    hp: u32,
    movement: u32,
    range: u32,
    power: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EnemyRon {
    unit: UnitRon,
    at: (i32, i32),
}

/// Predicate syntax for RON files, e.g. `Or([AllPlayersDefeated, TurnLimit(20)])`.
#[derive(Debug, Clone, Serialize, Deserialize)]
enum PredicateRon {
    AlwaysTrue,
    AlwaysFalse,
    TurnLimit(u32),
    AllEnemiesDefeated,
    AllPlayersDefeated,
    And(Vec<PredicateRon>),
    Or(Vec<PredicateRon>),
    Not(Box<PredicateRon>),
}

fn default_victory() -> PredicateRon {
    PredicateRon::AllEnemiesDefeated
}

fn default_defeat() -> PredicateRon {
    PredicateRon::AllPlayersDefeated
}

impl From<PredicateRon> for CombatPredicate {
    fn from(value: PredicateRon) -> Self {
        let convert = |list: Vec<PredicateRon>| list.into_iter().map(CombatPredicate::from).collect();
        match value {
            PredicateRon::AlwaysTrue => CombatPredicate::AlwaysTrue,
            PredicateRon::AlwaysFalse => CombatPredicate::AlwaysFalse,
            PredicateRon::TurnLimit(max_turns) => CombatPredicate::turn_limit(max_turns),
            PredicateRon::AllEnemiesDefeated => CombatPredicate::AllEnemiesDefeated,
            PredicateRon::AllPlayersDefeated => CombatPredicate::AllPlayersDefeated,
            PredicateRon::And(list) => CombatPredicate::and(convert(list)),
            PredicateRon::Or(list) => CombatPredicate::or(convert(list)),
            PredicateRon::Not(inner) => CombatPredicate::not((*inner).into()),
        }
    }
}

impl UnitRon {
    fn into_unit(self, team: Team) -> CombatUnit {
        let sprite = self.sprite.unwrap_or_else(|| self.class.clone());
        let stats = self.stats;
        CombatUnit::new(self.id, self.name, team)
            .with_class(self.class)
            .with_sprite(sprite)
            .with_stats(UnitStats::new(stats.hp, stats.movement, stats.range, stats.power))
    }
}

/// Loader for encounter definitions from RON files.
pub struct EncounterLoader;

impl EncounterLoader {
    /// Load and validate an encounter from a RON file.
    pub fn load(path: &Path) -> LoadResult<CombatEncounter> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Invalid encounter {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<CombatEncounter> {
        let data: EncounterRon = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse encounter RON: {}", e))?;

        let (width, height) = data.size;
        if width == 0 || height == 0 {
            anyhow::bail!("map size must be positive, got {}x{}", width, height);
        }

        // Fill entire map with the floor first, then apply walls
        let rows = (0..height)
            .map(|_| (0..width).map(|_| MapCell::floor(data.floor.clone())).collect())
            .collect();
        let mut map = CombatMap::from_rows(rows)
            .ok_or_else(|| anyhow::anyhow!("map rows have uneven widths"))?;
        for (x, y, sprite) in data.walls {
            let position = Position::new(x, y);
            let cell = map
                .cell_mut(position)
                .ok_or_else(|| anyhow::anyhow!("wall {} lies outside the map", position))?;
            *cell = MapCell::wall(sprite);
        }

        let encounter = CombatEncounter {
            id: data.id,
            name: data.name,
            tileset_id: data.tileset,
            map,
            deployment_zones: data
                .zones
                .into_iter()
                .map(|(x, y)| Position::new(x, y))
                .collect(),
            roster: data
                .roster
                .into_iter()
                .map(|unit| unit.into_unit(Team::Player))
                .collect(),
            enemies: data
                .enemies
                .into_iter()
                .map(|enemy| PlacedUnit {
                    unit: enemy.unit.into_unit(Team::Enemy),
                    position: Position::new(enemy.at.0, enemy.at.1),
                })
                .collect(),
            victory: data.victory.into(),
            defeat: data.defeat.into(),
            intro: data.intro,
        };
        encounter.validate()?;
        Ok(encounter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKIRMISH: &str = r#"
(
    id: "skirmish",
    name: "Skirmish",
    tileset: "meadow",
    size: (4, 3),
    floor: "grass",
    walls: [(2, 1, "rock")],
    zones: [(0, 0), (0, 1)],
    roster: [
        (id: "hero", name: "Hero", class: "knight", stats: (hp: 10, movement: 3, range: 1, power: 4)),
    ],
    enemies: [
        (unit: (id: "goblin", name: "Goblin", class: "goblin", sprite: Some("goblin-red"), stats: (hp: 6, movement: 3, range: 1, power: 2)), at: (3, 2)),
    ],
    defeat: Or([AllPlayersDefeated, TurnLimit(12)]),
    intro: (title: "Skirmish", lines: ["Hold the line"], font: "pixel"),
)
"#;

    #[test]
    fn parses_compact_encounter() {
        let encounter = EncounterLoader::parse(SKIRMISH).unwrap();
        assert_eq!(encounter.map.width(), 4);
        assert!(!encounter.map.is_walkable(Position::new(2, 1)));
        assert!(encounter.map.is_walkable(Position::new(1, 1)));
        assert_eq!(encounter.roster[0].sprite, "knight");
        assert_eq!(encounter.enemies[0].unit.sprite, "goblin-red");
        assert_eq!(encounter.enemies[0].unit.team, Team::Enemy);
        assert_eq!(encounter.victory, CombatPredicate::AllEnemiesDefeated);
        assert_eq!(
            encounter.defeat,
            CombatPredicate::or(vec![
                CombatPredicate::AllPlayersDefeated,
                CombatPredicate::turn_limit(12)
            ])
        );
        assert_eq!(encounter.intro.lines, ["Hold the line"]);
    }

    #[test]
    fn zone_on_a_wall_fails_validation() {
        let broken = SKIRMISH.replace("zones: [(0, 0), (0, 1)]", "zones: [(2, 1)]");
        let err = EncounterLoader::parse(&broken).unwrap_err();
        assert!(err.to_string().contains("not walkable"));
    }

    #[test]
    fn wall_outside_map_is_rejected() {
        let broken = SKIRMISH.replace("(2, 1, \"rock\")", "(9, 9, \"rock\")");
        assert!(EncounterLoader::parse(&broken).is_err());
    }
}
