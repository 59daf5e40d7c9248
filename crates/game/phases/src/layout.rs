//! Screen geometry shared by phase overlays: tile mapping, modals, menus.
//!
//! Every hit test is recomputed from the same font metrics the renderer uses,
//! so input and drawing can never disagree about where a button is.

use combat_core::{CombatConfig, CombatMap, FontAtlas, PixelRect, Position, RenderContext, Rgba};

/// Settings every handler is built with.
#[derive(Clone, Debug)]
pub struct PhaseResources {
    pub config: CombatConfig,
    /// Font for modals, dialogs, and labels.
    pub ui_font: FontAtlas,
}

impl PhaseResources {
    pub fn new(config: CombatConfig, ui_font: FontAtlas) -> Self {
        Self { config, ui_font }
    }

    pub fn tile_rect(&self, tile: Position) -> PixelRect {
        let size = self.config.tile_size;
        PixelRect::new(tile.x * size as i32, tile.y * size as i32, size, size)
    }

    pub fn map_bounds(&self, map: &CombatMap) -> PixelRect {
        let size = self.config.tile_size;
        PixelRect::new(0, 0, map.width() * size, map.height() * size)
    }

    /// The map tile under a pixel, if the pixel lies on the map.
    pub fn tile_at(&self, map: &CombatMap, x: i32, y: i32) -> Option<Position> {
        if !self.map_bounds(map).contains(x, y) {
            return None;
        }
        let size = self.config.tile_size.max(1) as i32;
        Some(Position::new(x / size, y / size))
    }

    fn padding(&self) -> u32 {
        self.ui_font.glyph_height.max(1)
    }
}

const PANEL: Rgba = Rgba::rgb(20, 20, 28);
const BUTTON: Rgba = Rgba::rgb(60, 60, 72);
const BUTTON_HOVER: Rgba = Rgba::rgb(110, 40, 50);

/// A labelled clickable rectangle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub rect: PixelRect,
}

/// A centered dialog with a title and stacked buttons.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModalLayout {
    pub frame: PixelRect,
    pub title: String,
    pub title_origin: (i32, i32),
    pub buttons: Vec<Button>,
}

impl ModalLayout {
    /// Lays out `title` over `labels`, centered in `area`.
    pub fn centered(
        resources: &PhaseResources,
        area: PixelRect,
        title: &str,
        labels: &[&str],
    ) -> Self {
        let font = &resources.ui_font;
        let pad = resources.padding();
        let button_height = font.glyph_height + pad;
        let content_width = labels
            .iter()
            .map(|label| font.text_width(label) + 2 * pad)
            .chain(std::iter::once(font.text_width(title)))
            .max()
            .unwrap_or(0);
        let width = content_width + 2 * pad;
        let height = pad + font.glyph_height + labels.len() as u32 * (button_height + pad) + pad;
        let frame = area.centered(width, height);

        let title_origin = (
            frame.x + (width as i32 - font.text_width(title) as i32) / 2,
            frame.y + pad as i32,
        );
        let buttons = labels
            .iter()
            .enumerate()
            .map(|(index, label)| {
                let top = frame.y
                    + (pad + font.glyph_height + pad) as i32
                    + index as i32 * (button_height + pad) as i32;
                Button {
                    label: (*label).to_string(),
                    rect: PixelRect::new(frame.x + pad as i32, top, content_width, button_height),
                }
            })
            .collect();

        Self {
            frame,
            title: title.to_string(),
            title_origin,
            buttons,
        }
    }

    /// Index of the button under `(x, y)`.
    pub fn hit(&self, x: i32, y: i32) -> Option<usize> {
        self.buttons.iter().position(|button| button.rect.contains(x, y))
    }

    pub fn render(
        &self,
        resources: &PhaseResources,
        hovered: Option<usize>,
        title_color: Rgba,
        ctx: &mut RenderContext<'_>,
    ) {
        let font = &resources.ui_font;
        ctx.surface.fill_rect(self.frame, PANEL.with_alpha(0.9));
        ctx.draw_text(
            font,
            &self.title,
            self.title_origin.0,
            self.title_origin.1,
            title_color,
            None,
        );
        for (index, button) in self.buttons.iter().enumerate() {
            let fill = if hovered == Some(index) { BUTTON_HOVER } else { BUTTON };
            ctx.surface.fill_rect(button.rect, fill);
            let text_x =
                button.rect.x + (button.rect.width as i32 - font.text_width(&button.label) as i32) / 2;
            let text_y = button.rect.y + (button.rect.height as i32 - font.glyph_height as i32) / 2;
            ctx.draw_text(font, &button.label, text_x, text_y, Rgba::WHITE, None);
        }
    }
}

/// Hover and press tracking for a set of buttons.
///
/// A button activates on release only if the press started on it too.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonTracker {
    hovered: Option<usize>,
    pressed: Option<usize>,
}

impl ButtonTracker {
    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Updates hover state; returns `true` if it changed.
    pub fn hover(&mut self, hit: Option<usize>) -> bool {
        let changed = self.hovered != hit;
        self.hovered = hit;
        changed
    }

    /// Starts a press; returns `true` if a button was under the cursor.
    pub fn press(&mut self, hit: Option<usize>) -> bool {
        self.pressed = hit;
        hit.is_some()
    }

    /// Ends a press, returning the activated button.
    pub fn release(&mut self, hit: Option<usize>) -> Option<usize> {
        let pressed = self.pressed.take();
        if pressed.is_some() && pressed == hit {
            hit
        } else {
            None
        }
    }
}

/// A vertical list of selectable rows anchored next to a map tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListLayout {
    pub frame: PixelRect,
    pub rows: Vec<Button>,
}

impl ListLayout {
    /// Sizes the list to its longest row and keeps it inside `area`.
    pub fn beside(
        resources: &PhaseResources,
        area: PixelRect,
        anchor: PixelRect,
        labels: &[String],
    ) -> Self {
        let font = &resources.ui_font;
        let pad = resources.padding() / 2;
        let row_height = font.glyph_height + pad;
        let width = labels
            .iter()
            .map(|label| font.text_width(label))
            .max()
            .unwrap_or(0)
            + 2 * pad;
        let height = labels.len() as u32 * row_height + 2 * pad;

        let right_edge = area.x + area.width as i32;
        let bottom_edge = area.y + area.height as i32;
        let mut x = anchor.x + anchor.width as i32;
        if x + width as i32 > right_edge {
            x = anchor.x - width as i32;
        }
        let y = anchor.y.min(bottom_edge - height as i32).max(area.y);
        let frame = PixelRect::new(x.max(area.x), y, width, height);

        let rows = labels
            .iter()
            .enumerate()
            .map(|(index, label)| Button {
                label: label.clone(),
                rect: PixelRect::new(
                    frame.x + pad as i32,
                    frame.y + pad as i32 + index as i32 * row_height as i32,
                    width - 2 * pad,
                    row_height,
                ),
            })
            .collect();

        Self { frame, rows }
    }

    pub fn hit(&self, x: i32, y: i32) -> Option<usize> {
        self.rows.iter().position(|row| row.rect.contains(x, y))
    }

    pub fn render(&self, resources: &PhaseResources, hovered: Option<usize>, ctx: &mut RenderContext<'_>) {
        let font = &resources.ui_font;
        ctx.surface.fill_rect(self.frame, PANEL.with_alpha(0.9));
        for (index, row) in self.rows.iter().enumerate() {
            if hovered == Some(index) {
                ctx.surface.fill_rect(row.rect, BUTTON_HOVER);
            }
            ctx.draw_text(font, &row.label, row.rect.x, row.rect.y, Rgba::WHITE, None);
        }
    }
}
