//! Tunable session parameters.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{PestKind, TileCoord};

/// Every tunable constant consumed by the simulation.
///
/// Durations are stored as whole milliseconds so the structure maps cleanly
/// onto TOML; use the accessor methods to obtain [`Duration`] values. Missing
/// keys fall back to [`SessionConfig::default`] when deserialising.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Total length of a session before it ends.
    pub session_duration_ms: u64,
    /// Number of tile columns in the playfield.
    pub columns: u32,
    /// Number of tile rows in the playfield.
    pub rows: u32,
    /// Side length of a square tile in world units.
    pub tile_size: f32,
    /// Distance the player travels per tick along each held axis.
    pub player_speed: f32,
    /// Side length of a pest hitbox.
    pub pest_size: f32,
    /// Distance a basic pest travels per tick.
    pub basic_pest_speed: f32,
    /// Distance a mutant pest travels per tick.
    pub mutant_pest_speed: f32,
    /// Minimum time between two basic pest spawns.
    pub basic_spawn_delay_ms: u64,
    /// Minimum time between two mutant pest spawns.
    pub mutant_spawn_delay_ms: u64,
    /// Time a pest lingers on its target before departing.
    pub pest_dwell_ms: u64,
    /// Lower bound of the per-pest wobble amplitude.
    pub wobble_amplitude_min: f32,
    /// Upper bound of the per-pest wobble amplitude.
    pub wobble_amplitude_max: f32,
    /// Lower bound of the per-pest wobble frequency.
    pub wobble_frequency_min: f32,
    /// Upper bound of the per-pest wobble frequency.
    pub wobble_frequency_max: f32,
    /// Growth time after which a tree blocks movement.
    pub obstacle_after_ms: u64,
    /// Growth time after which a seed becomes a teen tree.
    pub teen_after_ms: u64,
    /// Growth time after which a tree is adult and may fruit.
    pub adult_after_ms: u64,
    /// Minimum time between two fruit crops of a healthy adult tree.
    pub production_interval_ms: u64,
    /// Score awarded for each successful harvest.
    pub harvest_reward: u32,
    /// Fastest infection progression, reached at the optimal temperature.
    pub infection_rate_fastest_ms: u64,
    /// Slowest infection progression.
    pub infection_rate_slowest_ms: u64,
    /// Temperature at which infection progresses fastest.
    pub optimal_weather: i32,
    /// Temperature distance over which the infection rate relaxes.
    pub weather_tolerance: f32,
    /// Protected dwell before an unhealthy tree recovers to healthy.
    pub recover_unhealthy_ms: u64,
    /// Protected dwell before a sick tree recovers to unhealthy.
    pub recover_sick_ms: u64,
    /// Protected dwell before a dead tree recovers to sick.
    pub recover_dead_ms: u64,
    /// Protections available at the start of a session.
    pub initial_protections: u32,
    /// Time between two weather redraws.
    pub weather_interval_ms: u64,
    /// Lowest reachable temperature.
    pub weather_min: i32,
    /// Highest reachable temperature.
    pub weather_max: i32,
    /// Standard deviation of a single weather step.
    pub weather_sigma: f32,
    /// Length of the watering tool mode.
    pub watering_ms: u64,
    /// Length of the removing tool mode.
    pub removing_ms: u64,
    /// Delay between scheduling a removal and the tree disappearing.
    pub removal_delay_ms: u64,
    /// Seed for every random draw made during the session.
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_duration_ms: 120_000,
            columns: 15,
            rows: 11,
            tile_size: 64.0,
            player_speed: 5.0,
            pest_size: 32.0,
            basic_pest_speed: 0.75,
            mutant_pest_speed: 1.25,
            basic_spawn_delay_ms: 5_000,
            mutant_spawn_delay_ms: 5_000,
            pest_dwell_ms: 2_000,
            wobble_amplitude_min: 2.0,
            wobble_amplitude_max: 5.0,
            wobble_frequency_min: 2.0,
            wobble_frequency_max: 4.0,
            obstacle_after_ms: 2_000,
            teen_after_ms: 4_000,
            adult_after_ms: 10_000,
            production_interval_ms: 3_000,
            harvest_reward: 1_000,
            infection_rate_fastest_ms: 4_000,
            infection_rate_slowest_ms: 10_000,
            optimal_weather: 80,
            weather_tolerance: 40.0,
            recover_unhealthy_ms: 6_000,
            recover_sick_ms: 4_000,
            recover_dead_ms: 2_000,
            initial_protections: 1,
            weather_interval_ms: 10_000,
            weather_min: 50,
            weather_max: 100,
            weather_sigma: 5.0,
            watering_ms: 2_000,
            removing_ms: 4_000,
            removal_delay_ms: 4_000,
            seed: 0x0b1e_5eed_2f4c_9a71,
        }
    }
}

impl SessionConfig {
    /// Checks that the configuration describes a playable session.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session_duration_ms == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        if self.columns == 0 || self.rows == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        if !(self.tile_size > 0.0) {
            return Err(ConfigError::InvalidTileSize(self.tile_size));
        }
        if !(self.pest_size > 0.0) {
            return Err(ConfigError::InvalidPestSize(self.pest_size));
        }
        if !(self.basic_pest_speed > 0.0) || !(self.mutant_pest_speed > 0.0) {
            return Err(ConfigError::InvalidPestSpeed);
        }
        if self.weather_min > self.weather_max {
            return Err(ConfigError::InvertedWeatherBounds {
                min: self.weather_min,
                max: self.weather_max,
            });
        }
        if self.wobble_amplitude_min > self.wobble_amplitude_max
            || self.wobble_frequency_min > self.wobble_frequency_max
        {
            return Err(ConfigError::InvertedWobbleBounds);
        }
        if !(self.weather_sigma >= 0.0) {
            return Err(ConfigError::InvalidWeatherSigma(self.weather_sigma));
        }
        if !(self.weather_tolerance > 0.0) {
            return Err(ConfigError::InvalidWeatherTolerance(self.weather_tolerance));
        }
        Ok(())
    }

    /// Total session length.
    #[must_use]
    pub const fn session_duration(&self) -> Duration {
        Duration::from_millis(self.session_duration_ms)
    }

    /// Width of the playfield in world units.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.tile_size
    }

    /// Height of the playfield in world units.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.tile_size
    }

    /// Reports whether the tile lies inside the configured grid.
    #[must_use]
    pub fn contains_tile(&self, tile: TileCoord) -> bool {
        let columns = i64::from(self.columns);
        let rows = i64::from(self.rows);
        let column = i64::from(tile.column());
        let row = i64::from(tile.row());
        (0..columns).contains(&column) && (0..rows).contains(&row)
    }

    /// Tile the player starts on: the center of the grid.
    #[must_use]
    pub fn player_start_tile(&self) -> TileCoord {
        let column = i32::try_from(self.columns / 2).unwrap_or(i32::MAX);
        let row = i32::try_from(self.rows / 2).unwrap_or(i32::MAX);
        TileCoord::new(column, row)
    }

    /// Top-left position the player starts from.
    #[must_use]
    pub fn player_start(&self) -> Vec2 {
        self.player_start_tile().origin(self.tile_size)
    }

    /// Movement and infection parameters for the provided pest kind.
    #[must_use]
    pub fn pest_profile(&self, kind: PestKind) -> PestProfile {
        match kind {
            PestKind::Basic => PestProfile {
                speed: self.basic_pest_speed,
                spawn_delay: Duration::from_millis(self.basic_spawn_delay_ms),
                respects_protection: true,
            },
            PestKind::Mutant => PestProfile {
                speed: self.mutant_pest_speed,
                spawn_delay: Duration::from_millis(self.mutant_spawn_delay_ms),
                respects_protection: false,
            },
        }
    }
}

/// Constant set distinguishing the two pest kinds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PestProfile {
    /// Distance travelled per tick.
    pub speed: f32,
    /// Minimum time between two spawns of this kind.
    pub spawn_delay: Duration,
    /// Whether a protected tree is immune to this kind's infection.
    pub respects_protection: bool,
}

/// Reasons a [`SessionConfig`] is rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The session would end before it starts.
    #[error("session duration must be greater than zero")]
    ZeroDuration,
    /// The playfield has no tiles.
    #[error("grid must contain at least one column and one row")]
    EmptyGrid,
    /// Tiles must have a positive size.
    #[error("tile size must be positive, got {0}")]
    InvalidTileSize(f32),
    /// Pests must have a positive hitbox.
    #[error("pest size must be positive, got {0}")]
    InvalidPestSize(f32),
    /// Pests must make progress every tick.
    #[error("pest speeds must be positive")]
    InvalidPestSpeed,
    /// The weather range is empty.
    #[error("weather bounds are inverted: min {min} exceeds max {max}")]
    InvertedWeatherBounds {
        /// Configured lower bound.
        min: i32,
        /// Configured upper bound.
        max: i32,
    },
    /// A wobble range is empty.
    #[error("wobble bounds are inverted")]
    InvertedWobbleBounds,
    /// The weather step deviation is negative or not a number.
    #[error("weather sigma must be non-negative, got {0}")]
    InvalidWeatherSigma(f32),
    /// The infection tolerance must be positive.
    #[error("weather tolerance must be positive, got {0}")]
    InvalidWeatherTolerance(f32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_is_valid() {
        assert_eq!(SessionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn default_playfield_matches_fifteen_by_eleven_grid() {
        let config = SessionConfig::default();
        assert!((config.width() - 960.0).abs() < f32::EPSILON);
        assert!((config.height() - 704.0).abs() < f32::EPSILON);
        assert_eq!(config.player_start_tile(), TileCoord::new(7, 5));
        assert_eq!(config.player_start(), Vec2::new(448.0, 320.0));
    }

    #[test]
    fn inverted_weather_bounds_are_rejected() {
        let config = SessionConfig {
            weather_min: 90,
            weather_max: 60,
            ..SessionConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvertedWeatherBounds { min: 90, max: 60 })
        );
    }

    #[test]
    fn zero_tile_size_is_rejected() {
        let config = SessionConfig {
            tile_size: 0.0,
            ..SessionConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidTileSize(0.0)));
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: SessionConfig =
            toml::from_str("session_duration_ms = 60000\nseed = 7\n").expect("parse config");
        assert_eq!(config.session_duration(), Duration::from_secs(60));
        assert_eq!(config.seed, 7);
        assert_eq!(config.columns, SessionConfig::default().columns);
    }

    #[test]
    fn mutant_profile_ignores_protection() {
        let config = SessionConfig::default();
        assert!(config.pest_profile(PestKind::Basic).respects_protection);
        assert!(!config.pest_profile(PestKind::Mutant).respects_protection);
    }

    #[test]
    fn tiles_outside_grid_are_not_contained() {
        let config = SessionConfig::default();
        assert!(config.contains_tile(TileCoord::new(0, 0)));
        assert!(config.contains_tile(TileCoord::new(14, 10)));
        assert!(!config.contains_tile(TileCoord::new(-1, 3)));
        assert!(!config.contains_tile(TileCoord::new(15, 3)));
    }
}
