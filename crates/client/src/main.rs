//! Headless tactics client.
//!
//! Loads an encounter from the content directory, lets AI controllers play
//! both sides, and prints the combat log. Configuration comes from the
//! environment (see [`ClientConfig::from_env`]); a `.env` file is honored.
//!
//! ```bash
//! TACTICS_ENCOUNTER=bridge RUST_LOG=debug cargo run -p tactics-client
//! ```

mod config;
mod surface;

use std::sync::Arc;

use anyhow::{Context, Result};
use combat_content::ContentFactory;
use combat_core::CombatPhase;
use combat_phases::Controllers;
use combat_runtime::{CombatSession, EncounterOutcome};
use tokio::runtime::Handle;

use crate::config::ClientConfig;
use crate::surface::FrameStats;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_env();
    let (session, outcome) = run(&config).await?;

    for entry in session.log().iter() {
        println!("{entry}");
    }
    match outcome {
        Some(outcome) => println!("Outcome: {outcome}"),
        None => tracing::warn!(
            frames = config.max_frames,
            phase = %session.phase(),
            "frame limit reached before the encounter ended"
        ),
    }
    Ok(())
}

/// Plays one encounter until it is decided or the frame limit is hit.
async fn run(config: &ClientConfig) -> Result<(CombatSession, Option<EncounterOutcome>)> {
    let factory = ContentFactory::new(&config.content_dir);
    let combat_config = factory.load_config()?;
    let content = factory.load_content()?;

    let name = match &config.encounter {
        Some(name) => name.clone(),
        None => factory
            .encounter_names()?
            .into_iter()
            .next()
            .with_context(|| format!("no encounters in {}", factory.data_dir().display()))?,
    };
    let encounter = factory.load_encounter(&name)?;
    content
        .validate_encounter(&encounter)
        .with_context(|| format!("encounter '{name}' does not match the content manifest"))?;
    tracing::info!(encounter = %name, "starting encounter");

    let mut session = CombatSession::builder(encounter, Arc::new(content))
        .config(combat_config)
        .controllers(Controllers::all_ai())
        .font_source(Arc::new(factory.font_source(Handle::current())))
        .build()?;

    let bounds = session.resources().map_bounds(&session.state().map);
    let mut surface = FrameStats::new(bounds.width, bounds.height);
    let delta_time = config.frame_seconds();

    let mut decided = None;
    for frame in 0..config.max_frames {
        if config.skip_intro && session.is_playing_cinematic() {
            session.key_pressed();
        }
        if session.phase() == CombatPhase::Deployment && !session.is_playing_cinematic() {
            session.auto_deploy()?;
        }

        let outcome = session.update(delta_time)?;
        surface.clear();
        session.render(&mut surface);
        tracing::trace!(frame, ?surface, "frame rendered");

        // Nobody is around to click through the result screen.
        decided = outcome.or_else(|| EncounterOutcome::from_phase(session.phase()));
        if let Some(outcome) = decided {
            tracing::info!(%outcome, frame, "encounter decided");
            break;
        }
        if let Some(pace) = config.pace() {
            tokio::time::sleep(pace).await;
        }
    }
    Ok((session, decided))
}
