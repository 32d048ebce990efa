#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting pest spawn commands.
//!
//! The first half of a session releases basic pests; once half of the
//! session time has elapsed only mutants are released. Each kind keeps its
//! own cadence, measured from the session start.

use std::time::Duration;

use olive_grove_core::{
    Command, Edge, Event, PestKind, SessionConfig, Timestamp, TreeRef, TreeView, Wobble,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

const SPAWN_STREAM: u64 = 0x7370_6177_6e5f_7273;

/// Pure system that emits spawn commands whenever a kind's cadence elapses.
#[derive(Debug)]
pub struct Spawning {
    config: SessionConfig,
    last_basic: Timestamp,
    last_mutant: Timestamp,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system seeded from the session configuration.
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            config: config.clone(),
            last_basic: Timestamp::ZERO,
            last_mutant: Timestamp::ZERO,
            rng: ChaCha8Rng::seed_from_u64(config.seed ^ SPAWN_STREAM),
        }
    }

    /// Consumes clock events and the current trees to emit spawn commands.
    ///
    /// Nothing spawns while the grove is empty.
    pub fn handle(&mut self, events: &[Event], trees: &TreeView, out: &mut Vec<Command>) {
        let Some((now, remaining)) = events.iter().rev().find_map(|event| match event {
            Event::TimeAdvanced { now, remaining, .. } => Some((*now, *remaining)),
            _ => None,
        }) else {
            return;
        };

        if trees.is_empty() {
            return;
        }

        let kind = self.kind_for(remaining);
        let profile = self.config.pest_profile(kind);
        let last = match kind {
            PestKind::Basic => &mut self.last_basic,
            PestKind::Mutant => &mut self.last_mutant,
        };
        if now.since(*last) < profile.spawn_delay {
            return;
        }
        *last = now;

        let edge = Edge::ALL[self.rng.gen_range(0..Edge::ALL.len())];
        let along = self.rng.gen_range(0..=edge.span(&self.config) as i32) as f32;
        let wobble = Wobble::new(
            self.rng
                .gen_range(self.config.wobble_amplitude_min..=self.config.wobble_amplitude_max),
            self.rng
                .gen_range(self.config.wobble_frequency_min..=self.config.wobble_frequency_max),
        );
        let target = self.choose_target(kind, trees);

        debug!(?kind, ?edge, ?target, "spawning pest");
        out.push(Command::SpawnPest {
            kind,
            origin: edge.spawn_point(along, &self.config),
            wobble,
            target,
        });
    }

    fn kind_for(&self, remaining: Duration) -> PestKind {
        if remaining > self.config.session_duration() / 2 {
            PestKind::Basic
        } else {
            PestKind::Mutant
        }
    }

    /// Basic pests only target growing trees; mutants target any tree.
    fn choose_target(&mut self, kind: PestKind, trees: &TreeView) -> Option<TreeRef> {
        let candidates: Vec<TreeRef> = trees
            .iter()
            .filter(|tree| kind == PestKind::Mutant || tree.growth_started)
            .map(|tree| tree.tree)
            .collect();
        if candidates.is_empty() {
            return None;
        }
        Some(candidates[self.rng.gen_range(0..candidates.len())])
    }
}
