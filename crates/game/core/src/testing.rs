//! Test doubles for the render and content contracts.
//!
//! Enabled for this crate's own tests and, through the `testing` feature, for
//! downstream crates' dev-dependencies.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::oneshot;

use crate::encounter::{CombatEncounter, IntroScript};
use crate::predicate::CombatPredicate;
use crate::render::{
    ContentError, ContentLookup, DitherMask, FontAtlas, FontLoad, FontSource, PixelRect,
    RenderSurface, Rgba, SpriteDef,
};
use crate::state::{CombatMap, CombatUnit, MapCell, PlacedUnit, Position, Team, UnitStats};

/// A single recorded draw call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    Fill {
        rect: PixelRect,
        color: Rgba,
    },
    Sprite {
        id: String,
        dest: PixelRect,
        alpha: f32,
        dither: Option<f32>,
    },
    Glyph {
        font: String,
        glyph: char,
        x: i32,
        y: i32,
        color: Rgba,
        dither: Option<f32>,
    },
}

/// Render surface that records every call instead of drawing.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    pub width: u32,
    pub height: u32,
    pub calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            calls: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    /// Drawn glyphs concatenated in call order.
    pub fn text(&self) -> String {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Glyph { glyph, .. } => Some(*glyph),
                _ => None,
            })
            .collect()
    }

    pub fn sprite_ids(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Sprite { id, .. } => Some(id.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn fills(&self) -> Vec<(PixelRect, Rgba)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Fill { rect, color } => Some((*rect, *color)),
                _ => None,
            })
            .collect()
    }

    pub fn glyph_positions(&self) -> Vec<(char, i32, i32)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Glyph { glyph, x, y, .. } => Some((*glyph, *x, *y)),
                _ => None,
            })
            .collect()
    }
}

impl RenderSurface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Rgba) {
        self.calls.push(DrawCall::Fill { rect, color });
    }

    fn draw_sprite(
        &mut self,
        sprite: &SpriteDef,
        dest: PixelRect,
        alpha: f32,
        mask: Option<&DitherMask>,
    ) {
        self.calls.push(DrawCall::Sprite {
            id: sprite.id.clone(),
            dest,
            alpha,
            dither: mask.map(DitherMask::alpha),
        });
    }

    fn draw_glyph(
        &mut self,
        font: &FontAtlas,
        glyph: char,
        x: i32,
        y: i32,
        color: Rgba,
        mask: Option<&DitherMask>,
    ) {
        self.calls.push(DrawCall::Glyph {
            font: font.id.clone(),
            glyph,
            x,
            y,
            color,
            dither: mask.map(DitherMask::alpha),
        });
    }
}

/// In-memory lookup table.
#[derive(Clone, Debug, Default)]
pub struct FakeContent {
    sprites: HashMap<String, SpriteDef>,
    fonts: HashMap<String, FontAtlas>,
}

impl FakeContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sprite(mut self, id: &str, width: u32, height: u32) -> Self {
        self.sprites.insert(
            id.to_string(),
            SpriteDef {
                id: id.to_string(),
                image: format!("{id}.png"),
                x: 0,
                y: 0,
                width,
                height,
            },
        );
        self
    }

    pub fn with_font(mut self, id: &str, glyph_width: u32, glyph_height: u32) -> Self {
        self.fonts
            .insert(id.to_string(), fake_font(id, glyph_width, glyph_height));
        self
    }
}

impl ContentLookup for FakeContent {
    fn sprite(&self, id: &str) -> Option<&SpriteDef> {
        self.sprites.get(id)
    }

    fn font(&self, id: &str) -> Option<&FontAtlas> {
        self.fonts.get(id)
    }
}

pub fn fake_font(id: &str, glyph_width: u32, glyph_height: u32) -> FontAtlas {
    FontAtlas {
        id: id.to_string(),
        image: format!("{id}.png"),
        glyph_width,
        glyph_height,
        spacing: 0,
    }
}

/// Font source whose loads resolve only when the test says so.
#[derive(Default)]
pub struct ManualFontSource {
    requests: AtomicUsize,
    pending: Mutex<Vec<(String, oneshot::Sender<Result<FontAtlas, ContentError>>)>>,
}

impl ManualFontSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Resolves every pending request with a font of the requested id.
    pub fn resolve_all(&self, glyph_width: u32, glyph_height: u32) {
        let pending = match self.pending.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        for (id, sender) in pending {
            let _ = sender.send(Ok(fake_font(&id, glyph_width, glyph_height)));
        }
    }
}

impl FontSource for ManualFontSource {
    fn load_font(&self, id: &str) -> FontLoad {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let (sender, receiver) = oneshot::channel();
        match self.pending.lock() {
            Ok(mut guard) => guard.push((id.to_string(), sender)),
            Err(poisoned) => poisoned.into_inner().push((id.to_string(), sender)),
        }
        receiver
    }
}

/// A small skirmish: two deployable heroes against one goblin on a 6x6 field.
///
/// Every tile is walkable grass except a rock at (3, 2). Deployment zones
/// are (0, 0), (0, 1) and (1, 0); the goblin stands at (5, 5).
pub fn sample_encounter() -> CombatEncounter {
    let mut rows = vec![vec![MapCell::floor("grass"); 6]; 6];
    rows[2][3] = MapCell::wall("rock");
    let map = CombatMap::from_rows(rows).unwrap_or_else(|| CombatMap::new(6, 6));

    CombatEncounter {
        id: "skirmish".into(),
        name: "Skirmish at the Ford".into(),
        tileset_id: "meadow".into(),
        map,
        deployment_zones: vec![Position::new(0, 0), Position::new(0, 1), Position::new(1, 0)],
        roster: vec![
            CombatUnit::new("hero", "Hero", Team::Player)
                .with_class("knight")
                .with_sprite("knight")
                .with_stats(UnitStats::new(10, 3, 1, 4)),
            CombatUnit::new("ranger", "Ranger", Team::Player)
                .with_class("archer")
                .with_sprite("archer")
                .with_stats(UnitStats::new(8, 2, 3, 3)),
        ],
        enemies: vec![PlacedUnit {
            unit: CombatUnit::new("goblin", "Goblin", Team::Enemy)
                .with_class("goblin")
                .with_sprite("goblin")
                .with_stats(UnitStats::new(6, 3, 1, 2)),
            position: Position::new(5, 5),
        }],
        victory: CombatPredicate::AllEnemiesDefeated,
        defeat: CombatPredicate::AllPlayersDefeated,
        intro: IntroScript {
            title: "Skirmish".into(),
            lines: vec!["Goblins ahead [sprite:goblin]".into(), "Hold the ford".into()],
            font: "pixel".into(),
        },
    }
}

/// Content table holding every visual [`sample_encounter`] references.
pub fn sample_content() -> FakeContent {
    FakeContent::new()
        .with_sprite("grass", 12, 12)
        .with_sprite("rock", 12, 12)
        .with_sprite("knight", 12, 12)
        .with_sprite("archer", 12, 12)
        .with_sprite("goblin", 12, 12)
        .with_font("pixel", 4, 6)
}
