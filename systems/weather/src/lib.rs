#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Weather system: a clamped Gaussian random walk over the ambient temperature.

use std::time::Duration;

use olive_grove_core::{Command, Event, SessionConfig, Timestamp};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

const WEATHER_STREAM: u64 = 0x7765_6174_6865_7221;

/// Pure system that periodically emits new temperatures.
#[derive(Debug)]
pub struct Weather {
    interval: Duration,
    sigma: f64,
    min: i32,
    max: i32,
    last_update: Timestamp,
    rng: ChaCha8Rng,
}

impl Weather {
    /// Creates a new weather system seeded from the session configuration.
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.weather_interval_ms),
            sigma: f64::from(config.weather_sigma),
            min: config.weather_min,
            max: config.weather_max,
            last_update: Timestamp::ZERO,
            rng: ChaCha8Rng::seed_from_u64(config.seed ^ WEATHER_STREAM),
        }
    }

    /// Consumes clock events and emits at most one temperature change.
    ///
    /// `temperature` is the value currently in effect; each redraw is centered on it.
    pub fn handle(&mut self, events: &[Event], temperature: i32, out: &mut Vec<Command>) {
        let Some(now) = events.iter().rev().find_map(|event| match event {
            Event::TimeAdvanced { now, .. } => Some(*now),
            _ => None,
        }) else {
            return;
        };

        if now.since(self.last_update) < self.interval {
            return;
        }
        self.last_update = now;

        let next = self.draw(temperature);
        debug!(from = temperature, to = next, "weather redrawn");
        out.push(Command::SetWeather { temperature: next });
    }

    fn draw(&mut self, temperature: i32) -> i32 {
        let mean = f64::from(temperature);
        let sample = match Normal::new(mean, self.sigma) {
            Ok(normal) => normal.sample(&mut self.rng),
            Err(_) => mean,
        };
        let rounded = sample.round().clamp(f64::from(self.min), f64::from(self.max));
        rounded as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sigma_keeps_temperature() {
        let config = SessionConfig {
            weather_sigma: 0.0,
            ..SessionConfig::default()
        };
        let mut weather = Weather::new(&config);
        for _ in 0..16 {
            assert_eq!(weather.draw(73), 73);
        }
    }

    #[test]
    fn draws_stay_inside_bounds() {
        let config = SessionConfig {
            weather_sigma: 40.0,
            ..SessionConfig::default()
        };
        let mut weather = Weather::new(&config);
        for _ in 0..1_000 {
            let value = weather.draw(99);
            assert!((50..=100).contains(&value), "draw {value} escaped bounds");
        }
    }
}
