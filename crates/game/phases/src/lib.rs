//! Phase handlers and turn strategies for the combat state machine.
//!
//! Each [`CombatPhase`] has one handler implementing [`CombatPhaseHandler`].
//! Handlers never mutate the state they are given; they return replacement
//! states from `update` and [`combat_core::PhaseEventResult`]s from input
//! callbacks, and the session applies them.
//!
//! Modules are organized by responsibility:
//! - [`handler`] defines the handler contract and info-panel content
//! - [`layout`] holds shared screen geometry (tiles, modals, lists)
//! - [`strategy`] hosts the [`TurnStrategy`] contract plus player and AI policies
//! - one module per phase handler
pub mod battle;
pub mod defeat;
pub mod deployment;
pub mod enemy_deployment;
pub mod handler;
pub mod layout;
pub mod strategy;
pub mod victory;

pub use battle::BattlePhase;
pub use defeat::DefeatPhase;
pub use deployment::{DeploymentPhase, auto_deploy};
pub use enemy_deployment::EnemyDeploymentPhase;
pub use handler::{CombatPhaseHandler, InfoPanelContent, InfoPanelRow};
pub use layout::{Button, ButtonTracker, ListLayout, ModalLayout, PhaseResources};
pub use strategy::{
    AiTurnStrategy, Controller, Controllers, PlayerTurnStrategy, TurnContext, TurnStrategy,
};
pub use victory::VictoryPhase;

use combat_core::CombatPhase;

/// Builds a fresh handler for `phase`.
pub fn create_handler(
    phase: CombatPhase,
    resources: &PhaseResources,
    controllers: Controllers,
) -> Box<dyn CombatPhaseHandler> {
    let resources = resources.clone();
    match phase {
        CombatPhase::Deployment => Box::new(DeploymentPhase::new(resources)),
        CombatPhase::EnemyDeployment => Box::new(EnemyDeploymentPhase::new()),
        CombatPhase::Battle => Box::new(BattlePhase::new(resources, controllers)),
        CombatPhase::Victory => Box::new(VictoryPhase::new(resources)),
        CombatPhase::Defeat => Box::new(DefeatPhase::new(resources)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::CombatConfig;
    use combat_core::testing::fake_font;
    use strum::IntoEnumIterator;

    #[test]
    fn factory_covers_every_phase() {
        let resources = PhaseResources::new(CombatConfig::new(), fake_font("ui", 4, 6));
        for phase in CombatPhase::iter() {
            let handler = create_handler(phase, &resources, Controllers::default());
            assert_eq!(handler.phase(), phase);
        }
    }
}
