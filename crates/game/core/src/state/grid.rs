use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Discrete grid position expressed in tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance between two tiles.
    pub fn distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The four orthogonal neighbours, in N/E/S/W order.
    pub fn neighbors(self) -> [Position; 4] {
        [
            Position::new(self.x, self.y - 1),
            Position::new(self.x + 1, self.y),
            Position::new(self.x, self.y + 1),
            Position::new(self.x - 1, self.y),
        ]
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A single grid cell: walkability plus an optional tile visual identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapCell {
    pub walkable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite: Option<String>,
}

impl MapCell {
    pub fn floor(sprite: impl Into<String>) -> Self {
        Self {
            walkable: true,
            sprite: Some(sprite.into()),
        }
    }

    pub fn wall(sprite: impl Into<String>) -> Self {
        Self {
            walkable: false,
            sprite: Some(sprite.into()),
        }
    }
}

/// Row-major combat grid.
///
/// Serialized form (`MapJSON`): `{"width": w, "height": h, "cells": [...]}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatMap {
    width: u32,
    height: u32,
    cells: Vec<MapCell>,
}

impl CombatMap {
    /// Creates a fully walkable map with no tile visuals.
    pub fn new(width: u32, height: u32) -> Self {
        let cells = vec![
            MapCell {
                walkable: true,
                sprite: None,
            };
            (width as usize) * (height as usize)
        ];
        Self {
            width,
            height,
            cells,
        }
    }

    /// Builds a map from explicit rows. Returns `None` when rows are ragged.
    pub fn from_rows(rows: Vec<Vec<MapCell>>) -> Option<Self> {
        let height = rows.len() as u32;
        let width = rows.first().map(|row| row.len()).unwrap_or(0) as u32;
        if rows.iter().any(|row| row.len() as u32 != width) {
            return None;
        }
        Some(Self {
            width,
            height,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x < self.width as i32
            && position.y < self.height as i32
    }

    fn index(&self, position: Position) -> Option<usize> {
        self.contains(position)
            .then(|| position.y as usize * self.width as usize + position.x as usize)
    }

    pub fn cell(&self, position: Position) -> Option<&MapCell> {
        self.index(position).and_then(|index| self.cells.get(index))
    }

    pub fn cell_mut(&mut self, position: Position) -> Option<&mut MapCell> {
        self.index(position)
            .and_then(move |index| self.cells.get_mut(index))
    }

    pub fn is_walkable(&self, position: Position) -> bool {
        self.cell(position).map(|cell| cell.walkable).unwrap_or(false)
    }

    /// Iterates every cell with its position, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (Position, &MapCell)> + '_ {
        let width = self.width.max(1) as usize;
        self.cells.iter().enumerate().map(move |(index, cell)| {
            let position = Position::new((index % width) as i32, (index / width) as i32);
            (position, cell)
        })
    }

    /// Breadth-first flood from `origin` over walkable tiles within `max_steps`.
    ///
    /// `blocked` marks tiles that cannot be entered (e.g. other units). The origin
    /// itself is never part of the result. Each entry carries its shortest path,
    /// excluding the origin and ending at the entry's position.
    pub fn reachable<F>(
        &self,
        origin: Position,
        max_steps: u32,
        blocked: F,
    ) -> Vec<(Position, Vec<Position>)>
    where
        F: Fn(Position) -> bool,
    {
        let mut parents: std::collections::HashMap<Position, Position> =
            std::collections::HashMap::new();
        let mut frontier = VecDeque::from([(origin, 0u32)]);
        let mut order = Vec::new();

        while let Some((current, steps)) = frontier.pop_front() {
            if steps == max_steps {
                continue;
            }
            for next in current.neighbors() {
                if next == origin
                    || parents.contains_key(&next)
                    || !self.is_walkable(next)
                    || blocked(next)
                {
                    continue;
                }
                parents.insert(next, current);
                order.push(next);
                frontier.push_back((next, steps + 1));
            }
        }

        order
            .into_iter()
            .map(|target| {
                let mut path = vec![target];
                let mut cursor = target;
                while let Some(&parent) = parents.get(&cursor) {
                    if parent == origin {
                        break;
                    }
                    path.push(parent);
                    cursor = parent;
                }
                path.reverse();
                (target, path)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_lookup_respects_bounds() {
        let map = CombatMap::new(3, 2);
        assert!(map.cell(Position::new(2, 1)).is_some());
        assert!(map.cell(Position::new(3, 0)).is_none());
        assert!(map.cell(Position::new(-1, 0)).is_none());
    }

    #[test]
    fn from_rows_rejects_ragged_rows() {
        let rows = vec![vec![MapCell::default(); 2], vec![MapCell::default(); 3]];
        assert!(CombatMap::from_rows(rows).is_none());
    }

    #[test]
    fn reachable_routes_around_walls() {
        let mut map = CombatMap::new(3, 3);
        if let Some(cell) = map.cell_mut(Position::new(1, 0)) {
            cell.walkable = false;
        }
        if let Some(cell) = map.cell_mut(Position::new(1, 1)) {
            cell.walkable = false;
        }

        let reachable = map.reachable(Position::new(0, 0), 4, |_| false);
        let (_, path) = reachable
            .iter()
            .find(|(target, _)| *target == Position::new(2, 2))
            .expect("far corner reachable in four steps");
        assert_eq!(
            path,
            &vec![
                Position::new(0, 1),
                Position::new(0, 2),
                Position::new(1, 2),
                Position::new(2, 2)
            ]
        );
        assert!(!reachable.iter().any(|(target, _)| *target == Position::new(2, 0)));
    }

    #[test]
    fn reachable_honours_blockers() {
        let map = CombatMap::new(3, 1);
        let reachable = map.reachable(Position::new(0, 0), 2, |p| p == Position::new(1, 0));
        assert!(reachable.is_empty());
    }
}
