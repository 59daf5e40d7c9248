//! End-to-end encounter flows through the session API.

use std::sync::Arc;

use combat_core::testing::{FakeContent, ManualFontSource, RecordingSurface, sample_content, sample_encounter};
use combat_core::{CombatConfig, CombatEncounter, CombatPhase, CombatPredicate, FontSource, PixelRect, Position};
use combat_phases::{Controllers, DefeatPhase, ListLayout, VictoryPhase};
use combat_runtime::{CombatSession, EncounterOutcome, SessionError};

fn config() -> CombatConfig {
    CombatConfig::new().with_ai_thinking_delay(0.0)
}

fn session(encounter: CombatEncounter, intro: bool) -> CombatSession {
    CombatSession::builder(encounter, Arc::new(sample_content()))
        .config(config())
        .controllers(Controllers::all_ai())
        .ui_font("pixel")
        .play_intro(intro)
        .build()
        .unwrap()
}

fn center(rect: PixelRect) -> (i32, i32) {
    (rect.x + rect.width as i32 / 2, rect.y + rect.height as i32 / 2)
}

fn run_until(session: &mut CombatSession, phase: CombatPhase) {
    for _ in 0..2_000 {
        if session.phase() == phase {
            return;
        }
        session.update(0.1).unwrap();
    }
    panic!("never reached {phase}, stuck in {}", session.phase());
}

fn defeat_button(session: &CombatSession, index: usize) -> (i32, i32) {
    let layout = DefeatPhase::new(session.resources().clone()).layout(session.state());
    center(layout.buttons[index].rect)
}

#[test]
fn intro_withholds_input_until_skipped() {
    let mut session = session(sample_encounter(), true);
    assert!(session.is_playing_cinematic());
    assert_eq!(session.phase(), CombatPhase::Deployment);

    assert!(!session.click_tile(Position::new(0, 0)).unwrap());
    session.update(0.5).unwrap();
    assert_eq!(session.phase(), CombatPhase::Deployment);

    assert!(session.key_pressed());
    assert!(!session.is_playing_cinematic());
    assert!(!session.key_pressed());
    assert!(session.click_tile(Position::new(0, 0)).unwrap());
}

#[test]
fn intro_finishes_on_its_own() {
    let mut session = session(sample_encounter(), true);
    let mut frames = 0;
    while session.is_playing_cinematic() {
        session.update(0.25).unwrap();
        frames += 1;
        assert!(frames < 100, "intro never finished");
    }
    assert_eq!(session.phase(), CombatPhase::Deployment);

    let mut surface = RecordingSurface::new(256, 256);
    session.render(&mut surface);
    assert!(surface.sprite_ids().contains(&"grass"));
    assert!(surface.sprite_ids().contains(&"goblin"));
}

#[test]
fn manual_deployment_reaches_battle() {
    let mut session = session(sample_encounter(), false);
    let zone = Position::new(0, 0);
    assert!(session.click_tile(zone).unwrap());

    let resources = session.resources().clone();
    let dialog = ListLayout::beside(
        &resources,
        resources.map_bounds(&session.state().map),
        resources.tile_rect(zone),
        &["Hero".to_string(), "Ranger".to_string()],
    );
    let (x, y) = center(dialog.rows[0].rect);
    assert!(session.click(x, y).unwrap());
    let hero = session
        .state()
        .unit_manifest
        .iter()
        .find(|placed| placed.unit.name == "Hero")
        .map(|placed| placed.position);
    assert_eq!(hero, Some(zone));

    assert!(session.info_panel_click(2).unwrap());
    session.update(0.1).unwrap();
    assert_eq!(session.phase(), CombatPhase::EnemyDeployment);
    run_until(&mut session, CombatPhase::Battle);

    assert!(session.log().contains("Hero deployed to (0, 0)"));
    assert!(session.log().contains("Deployment complete"));
}

#[test]
fn auto_deploy_only_in_deployment() {
    let mut session = session(sample_encounter(), false);
    session.auto_deploy().unwrap();
    assert_eq!(session.phase(), CombatPhase::EnemyDeployment);
    assert!(session.log().contains("2 units deployed"));

    let err = session.auto_deploy().unwrap_err();
    assert!(matches!(
        err,
        SessionError::WrongPhase {
            expected: CombatPhase::Deployment,
            actual: CombatPhase::EnemyDeployment,
        }
    ));
}

#[test]
fn ai_battle_reaches_a_terminal_phase() {
    let mut session = session(sample_encounter(), false);
    session.auto_deploy().unwrap();
    for _ in 0..5_000 {
        if session.phase().is_terminal() {
            break;
        }
        session.update(0.1).unwrap();
    }
    let outcome = EncounterOutcome::from_phase(session.phase());
    assert!(outcome.is_some(), "battle still running in {}", session.phase());
    assert!(session.log().contains("Victory") || session.log().contains("Defeat"));
}

#[test]
fn victory_continue_ends_the_encounter() {
    let mut encounter = sample_encounter();
    encounter.victory = CombatPredicate::AlwaysTrue;
    let mut session = session(encounter, false);
    session.auto_deploy().unwrap();
    run_until(&mut session, CombatPhase::Victory);
    assert_eq!(session.outcome(), None);

    let layout = VictoryPhase::new(session.resources().clone()).layout(session.state());
    let (x, y) = center(layout.buttons[0].rect);
    assert!(session.click(x, y).unwrap());
    assert_eq!(session.update(0.1).unwrap(), Some(EncounterOutcome::Victory));
    assert!(session.is_finished());
    assert!(!session.click(x, y).unwrap());
}

#[test]
fn defeat_retry_restores_the_encounter() {
    let mut encounter = sample_encounter();
    encounter.defeat = CombatPredicate::AlwaysTrue;
    let mut session = session(encounter.clone(), false);
    let initial = encounter.initial_state().unwrap();

    for _ in 0..2 {
        session.auto_deploy().unwrap();
        run_until(&mut session, CombatPhase::Defeat);
        assert!(session.log().contains("Defeat"));

        let (x, y) = defeat_button(&session, 0);
        assert!(session.click(x, y).unwrap());
        assert_eq!(session.phase(), CombatPhase::Deployment);
        assert_eq!(session.state().turn_number, initial.turn_number);
        assert_eq!(session.state().unit_manifest, initial.unit_manifest);
        assert!(session.is_playing_cinematic());
        assert!(session.key_pressed());
    }
    assert!(session.log().contains("Retrying encounter"));
    assert_eq!(session.outcome(), None);
}

#[test]
fn defeat_skip_abandons_the_encounter() {
    let mut encounter = sample_encounter();
    encounter.defeat = CombatPredicate::AlwaysTrue;
    let mut session = session(encounter, false);
    session.auto_deploy().unwrap();
    run_until(&mut session, CombatPhase::Defeat);

    let (x, y) = defeat_button(&session, 1);
    assert!(session.click(x, y).unwrap());
    assert_eq!(session.outcome(), Some(EncounterOutcome::Skipped));
    assert_eq!(session.update(0.1).unwrap(), Some(EncounterOutcome::Skipped));
    assert!(session.log().contains("Encounter skipped"));
}

#[test]
fn missing_sprites_do_not_stop_the_session() {
    let content = Arc::new(FakeContent::new().with_font("pixel", 4, 6));
    let mut session = CombatSession::builder(sample_encounter(), content)
        .config(config())
        .controllers(Controllers::all_ai())
        .play_intro(false)
        .build()
        .unwrap();
    assert_eq!(session.missing_sprites(), ["knight", "archer"]);

    let mut surface = RecordingSurface::new(256, 256);
    session.render(&mut surface);
    assert!(surface.sprite_ids().is_empty());

    session.auto_deploy().unwrap();
    run_until(&mut session, CombatPhase::Battle);
}

#[test]
fn missing_ui_font_is_rejected() {
    let result = CombatSession::builder(sample_encounter(), Arc::new(FakeContent::new()))
        .ui_font("serif")
        .build();
    assert!(matches!(result, Err(SessionError::MissingUiFont(id)) if id == "serif"));
}

#[test]
fn intro_font_falls_back_to_the_font_source() {
    let source = Arc::new(ManualFontSource::new());
    let content = Arc::new(FakeContent::new().with_font("ui", 4, 6));
    let mut session = CombatSession::builder(sample_encounter(), content)
        .ui_font("ui")
        .font_source(Arc::clone(&source) as Arc<dyn FontSource>)
        .build()
        .unwrap();
    for _ in 0..40 {
        session.update(0.25).unwrap();
    }
    assert_eq!(source.request_count(), 2);
}
