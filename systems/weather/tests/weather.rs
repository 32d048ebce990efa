use std::time::Duration;

use olive_grove_core::{Command, Event, SessionConfig, Timestamp};
use olive_grove_system_weather::Weather;

fn clock(now_ms: u64) -> Event {
    Event::TimeAdvanced {
        dt: Duration::from_millis(100),
        now: Timestamp::from_millis(now_ms),
        remaining: Duration::from_secs(60),
    }
}

fn redraws(weather: &mut Weather, events: &[Event]) -> Vec<Command> {
    let mut commands = Vec::new();
    weather.handle(events, 80, &mut commands);
    commands
}

#[test]
fn redraws_once_per_interval() {
    let config = SessionConfig::default();
    let mut weather = Weather::new(&config);

    assert!(redraws(&mut weather, &[clock(9_900)]).is_empty());
    assert_eq!(redraws(&mut weather, &[clock(10_000)]).len(), 1);
    assert!(redraws(&mut weather, &[clock(19_900)]).is_empty());
    assert_eq!(redraws(&mut weather, &[clock(20_000)]).len(), 1);
}

#[test]
fn ignores_batches_without_clock_events() {
    let config = SessionConfig::default();
    let mut weather = Weather::new(&config);
    let commands = redraws(&mut weather, &[Event::ScoreChanged { score: 1_000 }]);
    assert!(commands.is_empty());
}

#[test]
fn emitted_temperature_stays_in_range() {
    let config = SessionConfig {
        weather_interval_ms: 100,
        ..SessionConfig::default()
    };
    let mut weather = Weather::new(&config);
    for tick in 1..=500 {
        for command in redraws(&mut weather, &[clock(tick * 100)]) {
            match command {
                Command::SetWeather { temperature } => {
                    assert!((50..=100).contains(&temperature));
                }
                other => panic!("unexpected command emitted: {other:?}"),
            }
        }
    }
}

#[test]
fn same_seed_replays_same_walk() {
    let config = SessionConfig {
        weather_interval_ms: 100,
        ..SessionConfig::default()
    };
    let mut first = Weather::new(&config);
    let mut second = Weather::new(&config);
    for tick in 1..=50 {
        let events = [clock(tick * 100)];
        assert_eq!(redraws(&mut first, &events), redraws(&mut second, &events));
    }
}
