//! # Gameplay
//!
//! Plays the current map. The world itself decides when the map ends by
//! setting [`LoopState::action`](lockstep_core::LoopState::action).

use lockstep_core::{Frame, GameState, LoopPhase, LoopResult, PhaseContext, BLACK};

/// One map being played.
#[derive(Debug, Clone, Copy, Default)]
pub struct GamePhase;

impl GamePhase {
    /// Creates the phase.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LoopPhase for GamePhase {
    fn name(&self) -> &'static str {
        "game"
    }

    fn start(&mut self, ctx: &mut PhaseContext<'_>) -> LoopResult<()> {
        ctx.sim.load_level(ctx.state.map)?;
        tracing::info!(map = ctx.state.map, "level loaded");

        let flags = &mut ctx.state.flags;
        flags.usergame = !flags.demoplayback;
        flags.allow_menu = true;
        flags.menu_active = false;
        flags.paused = false;
        ctx.state.game_state = GameState::Level;
        Ok(())
    }

    fn draw(&self, frame: &mut Frame<'_>) {
        draw_level(frame);
    }
}

/// Renders the world from the local camera.
///
/// Locates the camera's leaf and hands the renderer every leaf nearest
/// first. The visible list and the traversal stack come from the frame's
/// scratch arena; when the budget is exhausted only the camera's own leaf
/// is drawn.
pub fn draw_level(frame: &mut Frame<'_>) {
    frame.presenter.clear(BLACK);
    let view = frame.sim.view_point();

    let Some(tree) = frame.sim.level() else {
        frame.presenter.render_view(&view, 0, &[]);
        return;
    };

    let leaf = tree.locate_leaf(view.x, view.y);
    let buffers = frame
        .arena
        .alloc_vec::<u16>(tree.subsector_count())
        .zip(frame.arena.alloc_vec::<u16>(tree.node_count() + 1));

    match buffers {
        Some((mut visible, mut stack)) => {
            tree.walk_front_to_back_with(view.x, view.y, &mut stack, |id| visible.push(id));
            frame.presenter.render_view(&view, leaf, &visible);
        }
        None => frame.presenter.render_view(&view, leaf, &[leaf]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockstep_bsp::{BspTree, Node, Subsector};
    use lockstep_core::mock::{DrawCall, MockPresenter, MockSimulation};
    use lockstep_core::{
        LoopState, ScratchArena, SessionFlags, Simulation, TicCmd, ViewPoint, MAXPLAYERS,
    };
    use lockstep_math::Fixed;

    /// Two leaves split by the line x = 0: west is leaf 0, east is leaf 1.
    fn split_level() -> BspTree {
        let node = Node::new(
            Fixed::ZERO,
            Fixed::ZERO,
            Fixed::ZERO,
            Fixed::from_int(64),
            Node::leaf(1),
            Node::leaf(0),
        );
        let subsectors = vec![Subsector::default(); 2];
        BspTree::new(vec![node], subsectors).unwrap()
    }

    fn sim_at(x: i32) -> MockSimulation {
        let mut sim = MockSimulation::new()
            .with_level(1, Ok(split_level()))
            .with_view(ViewPoint {
                x: Fixed::from_int(x),
                y: Fixed::from_int(16),
                ..ViewPoint::default()
            });
        sim.load_level(1).unwrap();
        sim
    }

    fn render(sim: &MockSimulation, arena: &ScratchArena) -> DrawCall {
        let state = LoopState::default();
        let mut presenter = MockPresenter::new();
        let mut frame = Frame {
            state: &state,
            sim,
            presenter: &mut presenter,
            arena,
            fraction: Fixed::ONE,
            interpolated: false,
        };
        draw_level(&mut frame);
        presenter.current()[1].clone()
    }

    #[test]
    fn test_nearest_leaf_first() {
        let arena = ScratchArena::new(1024);
        let call = render(&sim_at(-32), &arena);
        assert!(matches!(
            call,
            DrawCall::View { leaf: 0, ref visible, .. } if visible == &[0, 1]
        ));

        arena.reset();
        let call = render(&sim_at(32), &arena);
        assert!(matches!(
            call,
            DrawCall::View { leaf: 1, ref visible, .. } if visible == &[1, 0]
        ));
    }

    #[test]
    fn test_exhausted_arena_draws_own_leaf() {
        let arena = ScratchArena::new(2);
        let call = render(&sim_at(32), &arena);
        assert!(matches!(
            call,
            DrawCall::View { leaf: 1, ref visible, .. } if visible == &[1]
        ));
    }

    #[test]
    fn test_start_loads_current_map() {
        let mut state = LoopState::new(SessionFlags::default());
        state.map = 4;
        let mut sim = MockSimulation::new();
        let mut ctx = PhaseContext {
            state: &mut state,
            sim: &mut sim,
            cmds: [TicCmd::default(); MAXPLAYERS],
            in_game: [true, false, false, false],
        };
        GamePhase::new().start(&mut ctx).unwrap();

        assert_eq!(sim.load_log(), &[4]);
        assert_eq!(state.game_state, GameState::Level);
        assert!(state.flags.usergame);
        assert!(state.flags.allow_menu);
    }
}
