//! Attract-mode demo playback, also used for the title map.

use lockstep_core::{
    DemoPlayback, DemoScript, Frame, GameState, LoopPhase, LoopResult, PhaseContext,
};

use super::game::draw_level;

/// Plays one recorded demo on its map.
#[derive(Debug, Clone)]
pub struct DemoPhase {
    script: DemoScript,
    title_map: bool,
}

impl DemoPhase {
    /// An attract-mode demo.
    #[must_use]
    pub fn new(script: DemoScript) -> Self {
        Self {
            script,
            title_map: false,
        }
    }

    /// The title map: a demo shown after the attract loop.
    #[must_use]
    pub fn title_map(script: DemoScript) -> Self {
        Self {
            script,
            title_map: true,
        }
    }

    /// Returns true if this plays the title map.
    #[must_use]
    pub const fn is_title_map(&self) -> bool {
        self.title_map
    }

    /// Name of the demo.
    #[must_use]
    pub fn demo_name(&self) -> &str {
        &self.script.name
    }
}

impl LoopPhase for DemoPhase {
    fn name(&self) -> &'static str {
        if self.title_map {
            "title map"
        } else {
            "demo"
        }
    }

    fn start(&mut self, ctx: &mut PhaseContext<'_>) -> LoopResult<()> {
        ctx.sim.load_level(self.script.map)?;

        let state = &mut *ctx.state;
        state.demo = Some(DemoPlayback::new(self.script.clone()));
        state.flags.demoplayback = true;
        state.flags.usergame = false;
        state.flags.paused = false;
        state.game_state = GameState::Level;
        tracing::info!(demo = %self.script.name, map = self.script.map, "demo playback");
        Ok(())
    }

    fn stop(&mut self, ctx: &mut PhaseContext<'_>) {
        ctx.state.demo = None;
        ctx.state.flags.demoplayback = false;
    }

    fn draw(&self, frame: &mut Frame<'_>) {
        draw_level(frame);
    }
}
