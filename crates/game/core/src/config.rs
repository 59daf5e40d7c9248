/// Combat tunables: overlay animation, AI pacing, and cinematic timing.
///
/// All durations are in seconds, all sizes in device pixels.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct CombatConfig {
    /// Lowest alpha of the breathing deployment-zone overlay.
    pub zone_alpha_min: f32,
    /// Highest alpha of the breathing deployment-zone overlay.
    pub zone_alpha_max: f32,
    /// Length of one full breathing cycle.
    pub zone_cycle_period: f32,
    /// Delay before an AI strategy commits to an action.
    pub ai_thinking_delay: f32,
    /// Duration of the intro title dither-in.
    pub title_reveal_duration: f32,
    /// Duration of the whole diagonal map tile fade.
    pub map_reveal_duration: f32,
    /// Duration of a single intro message line reveal.
    pub message_reveal_duration: f32,
    /// Offset between consecutive staggered message lines.
    pub stagger_delay: f32,
    /// Edge length of one map tile on screen.
    pub tile_size: u32,
    /// Edge length of one ordered-dither block.
    pub dither_block_size: u32,
}

impl CombatConfig {
    // ===== runtime-tunable defaults =====
    pub const DEFAULT_ZONE_ALPHA_MIN: f32 = 0.2;
    pub const DEFAULT_ZONE_ALPHA_MAX: f32 = 0.6;
    pub const DEFAULT_ZONE_CYCLE_PERIOD: f32 = 2.0;
    pub const DEFAULT_AI_THINKING_DELAY: f32 = 0.5;
    pub const DEFAULT_TITLE_REVEAL_DURATION: f32 = 1.0;
    pub const DEFAULT_MAP_REVEAL_DURATION: f32 = 2.0;
    pub const DEFAULT_MESSAGE_REVEAL_DURATION: f32 = 1.0;
    pub const DEFAULT_STAGGER_DELAY: f32 = 0.5;
    pub const DEFAULT_TILE_SIZE: u32 = 12;
    pub const DEFAULT_DITHER_BLOCK_SIZE: u32 = 4;

    pub fn new() -> Self {
        Self {
            zone_alpha_min: Self::DEFAULT_ZONE_ALPHA_MIN,
            zone_alpha_max: Self::DEFAULT_ZONE_ALPHA_MAX,
            zone_cycle_period: Self::DEFAULT_ZONE_CYCLE_PERIOD,
            ai_thinking_delay: Self::DEFAULT_AI_THINKING_DELAY,
            title_reveal_duration: Self::DEFAULT_TITLE_REVEAL_DURATION,
            map_reveal_duration: Self::DEFAULT_MAP_REVEAL_DURATION,
            message_reveal_duration: Self::DEFAULT_MESSAGE_REVEAL_DURATION,
            stagger_delay: Self::DEFAULT_STAGGER_DELAY,
            tile_size: Self::DEFAULT_TILE_SIZE,
            dither_block_size: Self::DEFAULT_DITHER_BLOCK_SIZE,
        }
    }

    pub fn with_ai_thinking_delay(mut self, seconds: f32) -> Self {
        self.ai_thinking_delay = seconds.max(0.0);
        self
    }

    pub fn with_stagger_delay(mut self, seconds: f32) -> Self {
        self.stagger_delay = seconds.max(0.0);
        self
    }

    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size.max(1);
        self
    }

    /// Breathing overlay alpha at `elapsed` seconds: a sine wave between the
    /// configured min and max over one cycle period.
    pub fn zone_alpha_at(&self, elapsed: f32) -> f32 {
        let period = if self.zone_cycle_period > 0.0 {
            self.zone_cycle_period
        } else {
            Self::DEFAULT_ZONE_CYCLE_PERIOD
        };
        let wave = (elapsed / period * std::f32::consts::TAU).sin() * 0.5 + 0.5;
        self.zone_alpha_min + (self.zone_alpha_max - self.zone_alpha_min) * wave
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_alpha_stays_within_bounds() {
        let config = CombatConfig::default();
        for step in 0..100 {
            let alpha = config.zone_alpha_at(step as f32 * 0.05);
            assert!(alpha >= config.zone_alpha_min - 1e-6);
            assert!(alpha <= config.zone_alpha_max + 1e-6);
        }
    }

    #[test]
    fn zone_alpha_starts_at_midpoint_and_peaks_at_quarter_cycle() {
        let config = CombatConfig::default();
        let mid = (config.zone_alpha_min + config.zone_alpha_max) / 2.0;
        assert!((config.zone_alpha_at(0.0) - mid).abs() < 1e-5);
        let quarter = config.zone_cycle_period / 4.0;
        assert!((config.zone_alpha_at(quarter) - config.zone_alpha_max).abs() < 1e-5);
    }
}
