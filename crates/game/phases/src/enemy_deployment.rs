use combat_core::{CombatEncounter, CombatPhase, CombatState, RenderContext};

use crate::handler::CombatPhaseHandler;

/// Enemy deployment.
///
/// Enemies are placed by the encounter definition, so this phase hands over
/// to battle on its first update.
#[derive(Debug, Default)]
pub struct EnemyDeploymentPhase;

impl EnemyDeploymentPhase {
    pub fn new() -> Self {
        Self
    }
}

impl CombatPhaseHandler for EnemyDeploymentPhase {
    fn phase(&self) -> CombatPhase {
        CombatPhase::EnemyDeployment
    }

    fn required_sprites(&self, _state: &CombatState, encounter: &CombatEncounter) -> Vec<String> {
        encounter
            .enemies
            .iter()
            .map(|placed| placed.unit.sprite.clone())
            .collect()
    }

    fn update(
        &mut self,
        state: &CombatState,
        _encounter: &CombatEncounter,
        _delta_time: f32,
    ) -> Option<CombatState> {
        Some(state.clone().with_phase(CombatPhase::Battle))
    }

    fn render(&self, _state: &CombatState, _encounter: &CombatEncounter, _ctx: &mut RenderContext<'_>) {}
}
