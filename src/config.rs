//! Game tuning configuration
//!
//! All round defaults and timing constants live in one `GameConfig` struct
//! so that levels, the board, and the lifecycle controller share a single
//! source of truth. The struct deserializes from JSON (every field is
//! optional and falls back to the default), which makes balance tweaks
//! possible without recompiling.

use serde::Deserialize;

/// Tuning values for a game session.
///
/// Times are in simulation ticks (60 per second) except `round_time`,
/// which is in seconds because the HUD displays it directly.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Round timer in seconds.
    pub round_time: u32,
    /// Lives at the start of a new game.
    pub starting_lives: i32,
    /// Score at the start of a new game.
    pub starting_points: u32,
    /// Ticks from bomb placement to detonation.
    pub bomb_fuse: u32,
    /// Ticks a flame segment stays live after detonation.
    pub flame_lifetime: u32,
    /// Ticks a destroyed brick spends on its break animation before the
    /// layer beneath it is exposed.
    pub brick_burn_ticks: u32,
    /// Player movement in pixels per tick, before speed power-ups.
    pub base_speed: f64,
    /// Blast radius in tiles, before flame power-ups.
    pub bomb_radius: u32,
    /// Simultaneous live bombs per mob, before bomb power-ups.
    pub bomb_rate: u32,
    /// Ticks the change-level interstitial stays up before play resumes.
    pub screen_delay: u32,
    /// Points awarded for destroying an enemy.
    pub enemy_points: u32,
    /// Points awarded for collecting a power-up.
    pub powerup_points: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            round_time: 200,
            starting_lives: 3,
            starting_points: 0,
            bomb_fuse: 120,
            flame_lifetime: 40,
            brick_burn_ticks: 30,
            base_speed: 1.0,
            bomb_radius: 1,
            bomb_rate: 1,
            screen_delay: 180,
            enemy_points: 100,
            powerup_points: 50,
        }
    }
}

impl GameConfig {
    /// Parses a configuration from a JSON string.
    ///
    /// Unknown fields are ignored; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_round() {
        let config = GameConfig::default();
        assert_eq!(config.round_time, 200);
        assert_eq!(config.starting_lives, 3);
        assert_eq!(config.bomb_radius, 1);
        assert_eq!(config.bomb_rate, 1);
    }

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let config = GameConfig::from_json(r#"{"round_time": 90, "bomb_radius": 3}"#).unwrap();
        assert_eq!(config.round_time, 90);
        assert_eq!(config.bomb_radius, 3);
        assert_eq!(config.starting_lives, 3);
        assert_eq!(config.bomb_fuse, 120);
    }

    #[test]
    fn empty_json_is_all_defaults() {
        let config = GameConfig::from_json("{}").unwrap();
        assert_eq!(config.flame_lifetime, GameConfig::default().flame_lifetime);
    }
}
