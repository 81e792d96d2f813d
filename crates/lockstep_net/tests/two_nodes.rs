//! Two schedulers sharing a loopback mesh, stepped alternately on one
//! thread.

use lockstep_core::mock::{MockPresenter, MockSimulation, ScriptedInput};
use lockstep_core::{LoopConfig, LoopPhase, ManualClock, NetSync, Scheduler, TicCmd};
use lockstep_net::LoopbackNet;

struct Idle;

impl LoopPhase for Idle {}

type Node = Scheduler<LoopbackNet, ManualClock, MockSimulation, MockPresenter>;

fn node(net: LoopbackNet, script: impl IntoIterator<Item = TicCmd>) -> Node {
    let config = LoopConfig::default();
    let input = ScriptedInput::new();
    input.queue(script);
    Scheduler::new(
        config.clone(),
        net,
        ManualClock::new(config.tic_rate),
        MockSimulation::new(),
        MockPresenter::new(),
        Box::new(input),
    )
}

#[test]
fn test_nodes_simulate_identical_commands() {
    let mut nets = LoopbackNet::mesh(2);
    let second = nets.pop().unwrap();
    let first = nets.pop().unwrap();

    let mut a = node(
        first,
        (1..=20).map(|forward| TicCmd {
            forward,
            ..TicCmd::default()
        }),
    );
    let mut b = node(
        second,
        (1..=20).map(|side| TicCmd {
            side: -side,
            ..TicCmd::default()
        }),
    );
    assert!(a.state().flags.netgame);

    for _ in 0..40 {
        a.step(&mut Idle).unwrap();
        b.step(&mut Idle).unwrap();
    }

    let ran_a = a.sim().ran();
    let ran_b = b.sim().ran();
    let common = ran_a.len().min(ran_b.len());
    assert!(common >= 10, "only {common} tics ran on both nodes");
    assert_eq!(ran_a[..common], ran_b[..common]);

    // Each player's commands arrive in the order they were built.
    assert_eq!(ran_a[0][0].forward, 1);
    assert_eq!(ran_a[0][1].side, -1);
    assert_eq!(ran_a[4][0].forward, 5);

    // Every iteration presented a frame, stalled or not.
    assert_eq!(a.presenter().frames(), 40);
    assert_eq!(b.presenter().frames(), 40);
}

#[test]
fn test_departed_peer_stops_blocking() {
    let mut nets = LoopbackNet::mesh(2);
    let second = nets.pop().unwrap();
    let first = nets.pop().unwrap();
    let mut a = node(first, std::iter::empty());

    a.step(&mut Idle).unwrap();
    assert_eq!(a.state().gametic, 0);

    drop(second);
    for _ in 0..3 {
        a.step(&mut Idle).unwrap();
    }

    assert!(!a.net().player_in_game(1));
    assert!(!a.net().is_netgame());
    assert!(a.state().gametic > 0);
    assert_eq!(a.net().low_tic(), a.net().maketic());
}
