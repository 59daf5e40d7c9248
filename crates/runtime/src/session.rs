//! The combat session: owns the state and drives the phase machine.
//!
//! A session is created per encounter. Each frame the host calls
//! [`CombatSession::update`] and [`CombatSession::render`], and forwards
//! pointer and key input. While a cinematic plays the active phase is paused
//! and input is withheld; a key press skips the cinematic.

use std::sync::Arc;

use cinematic::{CinematicManager, IntroBuilder, MessageFont};
use combat_core::{
    CombatConfig, CombatEncounter, CombatPhase, CombatState, ContentLookup, FontSource,
    PhaseEventData, PhaseEventResult, Position, RenderContext, RenderSurface, Team,
};
use combat_phases::{
    CombatPhaseHandler, Controllers, InfoPanelContent, PhaseResources, auto_deploy,
};

use crate::error::{Result, SessionError};
use crate::handlers::{HandlerFactory, StandardHandlers};
use crate::log::CombatLog;

/// Content table shared between the session and its renderers.
pub type SharedContent = Arc<dyn ContentLookup + Send + Sync>;

/// How an encounter ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum EncounterOutcome {
    Victory,
    Defeat,
    Skipped,
}

impl EncounterOutcome {
    /// The outcome a terminal phase stands for.
    pub fn from_phase(phase: CombatPhase) -> Option<Self> {
        match phase {
            CombatPhase::Victory => Some(Self::Victory),
            CombatPhase::Defeat => Some(Self::Defeat),
            _ => None,
        }
    }
}

/// Builder for [`CombatSession`].
pub struct SessionBuilder {
    encounter: CombatEncounter,
    content: SharedContent,
    config: CombatConfig,
    controllers: Controllers,
    ui_font: Option<String>,
    font_source: Option<Arc<dyn FontSource>>,
    handlers: Option<Box<dyn HandlerFactory>>,
    play_intro: bool,
    log_capacity: usize,
}

impl SessionBuilder {
    fn new(encounter: CombatEncounter, content: SharedContent) -> Self {
        Self {
            encounter,
            content,
            config: CombatConfig::default(),
            controllers: Controllers::default(),
            ui_font: None,
            font_source: None,
            handlers: None,
            play_intro: true,
            log_capacity: CombatLog::DEFAULT_CAPACITY,
        }
    }

    pub fn config(mut self, config: CombatConfig) -> Self {
        self.config = config;
        self
    }

    pub fn controllers(mut self, controllers: Controllers) -> Self {
        self.controllers = controllers;
        self
    }

    /// Font for phase overlays. Defaults to the encounter's intro font.
    pub fn ui_font(mut self, id: impl Into<String>) -> Self {
        self.ui_font = Some(id.into());
        self
    }

    /// Loader for intro fonts missing from the content table.
    pub fn font_source(mut self, source: Arc<dyn FontSource>) -> Self {
        self.font_source = Some(source);
        self
    }

    /// Replaces the stock phase handlers.
    pub fn handlers(mut self, factory: impl HandlerFactory + 'static) -> Self {
        self.handlers = Some(Box::new(factory));
        self
    }

    /// Whether to play the intro cinematic on start (default: true).
    pub fn play_intro(mut self, play: bool) -> Self {
        self.play_intro = play;
        self
    }

    pub fn log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity;
        self
    }

    pub fn build(self) -> Result<CombatSession> {
        let encounter = self.encounter;
        encounter.validate()?;

        let ui_font_id = self.ui_font.unwrap_or_else(|| encounter.intro.font.clone());
        let Some(ui_font) = self.content.font(&ui_font_id).cloned() else {
            return Err(SessionError::MissingUiFont(ui_font_id));
        };

        let intro_font = match (self.content.font(&encounter.intro.font), self.font_source) {
            (Some(font), _) => MessageFont::Preloaded(font.clone()),
            (None, Some(source)) => MessageFont::Lazy(source),
            (None, None) => {
                tracing::warn!(
                    font = %encounter.intro.font,
                    "intro font not in content and no font source; using the ui font"
                );
                MessageFont::Preloaded(ui_font.clone())
            }
        };

        let resources = PhaseResources::new(self.config.clone(), ui_font);
        let handlers = match self.handlers {
            Some(factory) => factory,
            None => Box::new(StandardHandlers::new(resources.clone(), self.controllers)),
        };

        let mut state = encounter.initial_state()?;
        state.capture_snapshot()?;
        let phase = state.phase();
        let handler = handlers
            .create(phase)
            .ok_or(SessionError::NoHandler(phase))?;

        let mut session = CombatSession {
            encounter: Arc::new(encounter),
            content: self.content,
            config: self.config,
            resources,
            handlers,
            handler,
            state,
            cinematics: CinematicManager::new(),
            intro_font,
            log: CombatLog::with_capacity(self.log_capacity),
            outcome: None,
        };

        tracing::info!(encounter = %session.encounter.id, "encounter started");
        session.push_log(format!("{} begins", session.encounter.name));
        session.warn_missing_sprites();
        if self.play_intro {
            session.play_intro();
        }
        Ok(session)
    }
}

/// Orchestrates one encounter: state, phase handlers, cinematics, and log.
pub struct CombatSession {
    encounter: Arc<CombatEncounter>,
    content: SharedContent,
    config: CombatConfig,
    resources: PhaseResources,
    handlers: Box<dyn HandlerFactory>,
    handler: Box<dyn CombatPhaseHandler>,
    state: CombatState,
    cinematics: CinematicManager,
    intro_font: MessageFont,
    log: CombatLog,
    outcome: Option<EncounterOutcome>,
}

impl CombatSession {
    pub fn builder(encounter: CombatEncounter, content: SharedContent) -> SessionBuilder {
        SessionBuilder::new(encounter, content)
    }

    pub fn state(&self) -> &CombatState {
        &self.state
    }

    pub fn phase(&self) -> CombatPhase {
        self.state.phase()
    }

    pub fn encounter(&self) -> &CombatEncounter {
        &self.encounter
    }

    pub fn resources(&self) -> &PhaseResources {
        &self.resources
    }

    pub fn log(&self) -> &CombatLog {
        &self.log
    }

    pub fn outcome(&self) -> Option<EncounterOutcome> {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn is_playing_cinematic(&self) -> bool {
        self.cinematics.is_playing_cinematic()
    }

    /// (Re)starts the encounter intro from the current state.
    pub fn play_intro(&mut self) {
        let intro = IntroBuilder::new(&self.encounter, &self.config, self.intro_font.clone()).build();
        self.cinematics.play(intro, &self.state, &self.encounter);
    }

    /// Skips the active cinematic. Returns `false` if none was playing.
    pub fn key_pressed(&mut self) -> bool {
        if !self.cinematics.is_playing_cinematic() {
            return false;
        }
        self.cinematics.skip();
        true
    }

    /// Advances one frame. Returns the outcome once the encounter has ended.
    pub fn update(&mut self, delta_time: f32) -> Result<Option<EncounterOutcome>> {
        if self.outcome.is_some() {
            return Ok(self.outcome);
        }
        if self.cinematics.is_playing_cinematic() {
            self.cinematics.update(delta_time);
            return Ok(None);
        }

        let next = self.handler.update(&self.state, &self.encounter, delta_time);
        self.drain_handler_log();
        match next {
            Some(next) => {
                let phase = next.phase();
                let changed = phase != self.state.phase();
                self.state = next;
                if changed {
                    self.enter_phase(phase)?;
                }
            }
            None => {
                let current = self.state.phase();
                match current.successor() {
                    Some(phase) => {
                        self.state = self.state.clone().with_phase(phase);
                        self.enter_phase(phase)?;
                    }
                    None => {
                        let outcome =
                            EncounterOutcome::from_phase(current).unwrap_or(EncounterOutcome::Skipped);
                        self.finish(outcome);
                    }
                }
            }
        }
        Ok(self.outcome)
    }

    /// Places the roster on free deployment zones and leaves deployment.
    pub fn auto_deploy(&mut self) -> Result<()> {
        let actual = self.phase();
        if actual != CombatPhase::Deployment {
            return Err(SessionError::WrongPhase {
                expected: CombatPhase::Deployment,
                actual,
            });
        }
        self.state = auto_deploy(&self.state, &self.encounter)?;
        let deployed = self.state.unit_manifest.count_living(Team::Player);
        self.push_log(format!("{deployed} units deployed"));
        if let Some(next) = actual.successor() {
            self.state = self.state.clone().with_phase(next);
            self.enter_phase(next)?;
        }
        Ok(())
    }

    /// A full click (press and release) at a pixel.
    ///
    /// Overlay widgets see the press and release first; if neither consumes
    /// it and the pixel lies on the map, the handler gets a map click.
    pub fn click(&mut self, x: i32, y: i32) -> Result<bool> {
        if !self.accepts_input() {
            return Ok(false);
        }
        let down = self
            .handler
            .handle_mouse_down(x, y, &self.state, &self.encounter);
        let mut handled = self.apply(down)?;
        if self.accepts_input() {
            let up = self
                .handler
                .handle_mouse_up(x, y, &self.state, &self.encounter);
            handled |= self.apply(up)?;
        }
        if handled || !self.accepts_input() {
            return Ok(handled);
        }
        let Some(tile) = self.resources.tile_at(&self.state.map, x, y) else {
            return Ok(false);
        };
        let result = self
            .handler
            .handle_map_click(tile, &self.state, &self.encounter);
        self.apply(result)
    }

    /// Clicks the center of a map tile.
    pub fn click_tile(&mut self, tile: Position) -> Result<bool> {
        let rect = self.resources.tile_rect(tile);
        self.click(
            rect.x + rect.width as i32 / 2,
            rect.y + rect.height as i32 / 2,
        )
    }

    pub fn mouse_move(&mut self, x: i32, y: i32) -> Result<bool> {
        if !self.accepts_input() {
            return Ok(false);
        }
        let result = self
            .handler
            .handle_mouse_move(x, y, &self.state, &self.encounter);
        self.apply(result)
    }

    pub fn info_panel_click(&mut self, row: usize) -> Result<bool> {
        if !self.accepts_input() {
            return Ok(false);
        }
        let result = self
            .handler
            .handle_info_panel_click(row, &self.state, &self.encounter);
        self.apply(result)
    }

    pub fn info_panel_hover(&mut self, row: Option<usize>) -> Result<bool> {
        if !self.accepts_input() {
            return Ok(false);
        }
        let result = self
            .handler
            .handle_info_panel_hover(row, &self.state, &self.encounter);
        self.apply(result)
    }

    pub fn top_panel(&self) -> Option<Vec<String>> {
        self.handler.top_panel(&self.state, &self.encounter)
    }

    pub fn info_panel_content(&self) -> Option<InfoPanelContent> {
        self.handler.info_panel_content(&self.state, &self.encounter)
    }

    /// Sprites the active phase needs that the content table lacks.
    pub fn missing_sprites(&self) -> Vec<String> {
        self.handler
            .required_sprites(&self.state, &self.encounter)
            .into_iter()
            .filter(|id| self.content.sprite(id).is_none())
            .collect()
    }

    /// Draws the frame: either the active cinematic, or the map with the
    /// phase overlay on top.
    pub fn render(&self, surface: &mut dyn RenderSurface) {
        let mut ctx = RenderContext::new(surface, self.content.as_ref());
        if self.cinematics.is_playing_cinematic() {
            self.cinematics.render(&mut ctx);
            return;
        }
        for (position, cell) in self.state.map.cells() {
            if let Some(sprite) = &cell.sprite {
                ctx.draw_sprite_id(sprite, self.resources.tile_rect(position), 1.0, None);
            }
        }
        for placed in self
            .state
            .unit_manifest
            .iter()
            .filter(|placed| !placed.unit.is_defeated())
        {
            ctx.draw_sprite_id(
                &placed.unit.sprite,
                self.resources.tile_rect(placed.position),
                1.0,
                None,
            );
        }
        self.handler.render(&self.state, &self.encounter, &mut ctx);
    }

    fn accepts_input(&self) -> bool {
        self.outcome.is_none() && !self.cinematics.is_playing_cinematic()
    }

    /// Applies a handler's event result; returns whether it was handled.
    fn apply(&mut self, result: PhaseEventResult) -> Result<bool> {
        self.drain_handler_log();
        let PhaseEventResult {
            handled,
            new_state,
            transition_to,
            log_message,
            data,
        } = result;

        if let Some(message) = log_message {
            self.push_log(message);
        }
        if let Some(state) = new_state {
            self.state = state;
        }
        if let Some(phase) = transition_to {
            if self.state.phase() != phase {
                self.state = self.state.clone().with_phase(phase);
            }
            self.enter_phase(phase)?;
        }
        match data {
            Some(PhaseEventData::ReplayIntro) => self.play_intro(),
            Some(PhaseEventData::SkipEncounter) => self.finish(EncounterOutcome::Skipped),
            Some(PhaseEventData::ZoneSelected(_)) | None => {}
        }
        Ok(handled)
    }

    fn enter_phase(&mut self, phase: CombatPhase) -> Result<()> {
        let handler = self
            .handlers
            .create(phase)
            .ok_or(SessionError::NoHandler(phase))?;
        tracing::debug!(from = %self.handler.phase(), to = %phase, "phase transition");
        self.handler = handler;
        self.warn_missing_sprites();
        Ok(())
    }

    fn warn_missing_sprites(&self) {
        for sprite in self.missing_sprites() {
            tracing::warn!(%sprite, phase = %self.state.phase(), "required sprite missing from content");
        }
    }

    fn drain_handler_log(&mut self) {
        for message in self.handler.drain_log() {
            self.push_log(message);
        }
    }

    fn push_log(&mut self, message: impl Into<String>) {
        self.log
            .push(self.state.turn_number, self.state.phase(), message);
    }

    fn finish(&mut self, outcome: EncounterOutcome) {
        tracing::info!(encounter = %self.encounter.id, %outcome, "encounter ended");
        self.push_log(format!("Encounter ended: {outcome}"));
        self.outcome = Some(outcome);
    }
}
