//! Flying pests: one motion model shared by every kind, parameterised by profile.

use std::time::Duration;

use olive_grove_core::{
    PestId, PestKind, PestPhase, PestSnapshot, Rect, Timestamp, TreeRef, Vec2, Wobble,
};

#[derive(Clone, Copy, Debug, PartialEq)]
enum Flight {
    Approaching,
    Waiting { arrived_at: Timestamp },
    Departing { since: Timestamp, exit: Vec2 },
}

/// Result of advancing a pest by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PestStep {
    /// The pest moved along its path.
    Flying,
    /// The pest has no live target and hovers in place.
    Stalled,
    /// The pest landed on its target this tick.
    Arrived(TreeRef),
    /// The pest is sitting on its target.
    Waiting,
    /// The dwell elapsed; the caller must pick an exit.
    ReadyToDepart,
    /// The pest reached its exit and must be removed.
    Exited,
}

#[derive(Clone, Debug)]
pub(crate) struct Pest {
    id: PestId,
    kind: PestKind,
    position: Vec2,
    size: f32,
    speed: f32,
    wobble: Wobble,
    born_at: Timestamp,
    target: Option<TreeRef>,
    flight: Flight,
}

impl Pest {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: PestId,
        kind: PestKind,
        origin: Vec2,
        size: f32,
        speed: f32,
        wobble: Wobble,
        born_at: Timestamp,
        target: Option<TreeRef>,
    ) -> Self {
        Self {
            id,
            kind,
            position: origin,
            size,
            speed,
            wobble,
            born_at,
            target,
            flight: Flight::Approaching,
        }
    }

    pub(crate) fn id(&self) -> PestId {
        self.id
    }

    pub(crate) fn kind(&self) -> PestKind {
        self.kind
    }

    pub(crate) fn target(&self) -> Option<TreeRef> {
        self.target
    }

    /// Clickable square anchored at the truncated position.
    pub(crate) fn hitbox(&self) -> Rect {
        Rect::square(self.position.trunc(), self.size)
    }

    /// Advances the pest by one tick.
    ///
    /// `target_center` is the center of the target tree when it still exists;
    /// `None` means the target is gone or was never assigned.
    pub(crate) fn tick(
        &mut self,
        now: Timestamp,
        target_center: Option<Vec2>,
        dwell: Duration,
    ) -> PestStep {
        match self.flight {
            Flight::Approaching => {
                let (Some(target), Some(center)) = (self.target, target_center) else {
                    return PestStep::Stalled;
                };
                let offset = center - self.position;
                let distance = offset.length();
                if distance <= self.speed {
                    self.position = center;
                    self.flight = Flight::Waiting { arrived_at: now };
                    return PestStep::Arrived(target);
                }
                self.fly(offset / distance, now.since(self.born_at));
                PestStep::Flying
            }
            Flight::Waiting { arrived_at } => {
                if now.since(arrived_at) >= dwell {
                    PestStep::ReadyToDepart
                } else {
                    PestStep::Waiting
                }
            }
            Flight::Departing { since, exit } => {
                let offset = exit - self.position;
                let distance = offset.length();
                if distance <= self.speed {
                    return PestStep::Exited;
                }
                self.fly(offset / distance, now.since(since));
                PestStep::Flying
            }
        }
    }

    /// Starts the flight toward `exit`. The wobble keeps the phase it had on arrival.
    pub(crate) fn depart(&mut self, exit: Vec2, now: Timestamp) {
        let since = match self.flight {
            Flight::Waiting { arrived_at } => arrived_at,
            _ => now,
        };
        self.flight = Flight::Departing { since, exit };
    }

    fn fly(&mut self, heading: Vec2, airborne: Duration) {
        let lateral = heading.perp() * self.wobble.offset_at(airborne.as_secs_f32());
        self.position += heading * self.speed + lateral;
    }

    pub(crate) fn snapshot(&self) -> PestSnapshot {
        PestSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            hitbox: self.hitbox(),
            phase: match self.flight {
                Flight::Approaching => PestPhase::Approaching,
                Flight::Waiting { .. } => PestPhase::Waiting,
                Flight::Departing { .. } => PestPhase::Departing,
            },
            target: self.target,
        }
    }
}
