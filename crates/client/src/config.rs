//! Client configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default data directory, relative to the workspace root.
const DEFAULT_CONTENT_DIR: &str = "crates/game/content/data";

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Directory holding `config.toml`, `content.toml` and `encounters/`.
    pub content_dir: PathBuf,
    /// Encounter to play. The first one by name when unset.
    pub encounter: Option<String>,
    /// Simulated time per frame, in milliseconds.
    pub frame_ms: u64,
    /// Wall-clock pause between frames, in milliseconds. Zero runs flat out.
    pub pace_ms: u64,
    pub max_frames: usize,
    pub skip_intro: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from(DEFAULT_CONTENT_DIR),
            encounter: None,
            frame_ms: 50,
            pace_ms: 0,
            max_frames: 20_000,
            skip_intro: true,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TACTICS_CONTENT_DIR`: data directory
    /// - `TACTICS_ENCOUNTER`: encounter name (file stem under `encounters/`)
    /// - `TACTICS_FRAME_MS`: simulated milliseconds per frame
    /// - `TACTICS_PACE_MS`: real milliseconds to sleep between frames
    /// - `TACTICS_MAX_FRAMES`: frame limit before giving up
    /// - `TACTICS_SKIP_INTRO`: `false` plays the intro through
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("TACTICS_CONTENT_DIR") {
            config.content_dir = PathBuf::from(dir);
        }
        if let Ok(name) = env::var("TACTICS_ENCOUNTER")
            && !name.is_empty()
        {
            config.encounter = Some(name);
        }
        if let Some(ms) = read_env::<u64>("TACTICS_FRAME_MS") {
            config.frame_ms = ms.max(1);
        }
        if let Some(ms) = read_env::<u64>("TACTICS_PACE_MS") {
            config.pace_ms = ms;
        }
        if let Some(frames) = read_env::<usize>("TACTICS_MAX_FRAMES") {
            config.max_frames = frames.max(1);
        }
        if let Some(skip) = read_env_bool("TACTICS_SKIP_INTRO") {
            config.skip_intro = skip;
        }

        config
    }

    pub fn frame_seconds(&self) -> f32 {
        self.frame_ms as f32 / 1000.0
    }

    pub fn pace(&self) -> Option<Duration> {
        (self.pace_ms > 0).then(|| Duration::from_millis(self.pace_ms))
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_env_bool(key: &str) -> Option<bool> {
    match env::var(key).ok()?.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
