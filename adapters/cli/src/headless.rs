//! Rendering backend that never opens a window.

use std::time::Duration;

use anyhow::{bail, Result as AnyResult};
use olive_grove_core::{SessionConfig, TICK};
use olive_grove_rendering::{FrameInput, Presentation, RenderingBackend, Scene};
use tracing::info;

use crate::autopilot::Autopilot;

/// Steps the scene at a fixed rate with scripted input until it ends.
#[derive(Debug)]
pub(crate) struct HeadlessBackend {
    autopilot: Autopilot,
    frame_limit: u64,
}

impl HeadlessBackend {
    /// Creates a backend that gives up after the configured session length
    /// plus a couple of frames of slack.
    pub(crate) fn new(autopilot: Autopilot, config: &SessionConfig) -> Self {
        let frames = config.session_duration().as_nanos() / TICK.as_nanos();
        Self {
            autopilot,
            frame_limit: u64::try_from(frames)
                .unwrap_or(u64::MAX)
                .saturating_add(2),
        }
    }
}

impl RenderingBackend for HeadlessBackend {
    fn run<F>(mut self, presentation: Presentation, mut update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Presentation {
            window_title,
            mut scene,
            ..
        } = presentation;
        info!(title = %window_title, frame_limit = self.frame_limit, "headless run started");

        let mut frames = 0_u64;
        while !scene.ended {
            if frames >= self.frame_limit {
                bail!("session still running after {frames} frames");
            }
            let input = self.autopilot.next_input(&scene);
            update_scene(TICK, input, &mut scene);
            frames += 1;
        }

        info!(frames, score = scene.hud.score, "headless run finished");
        println!(
            "final score: {} ({} trees standing, {} frames)",
            scene.hud.score,
            scene.trees.len(),
            frames
        );
        Ok(())
    }
}
