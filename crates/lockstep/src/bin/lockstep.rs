//! Headless driver: runs the title sequence against a stub world.
//!
//! ```text
//! lockstep [config.toml]
//! ```
//!
//! Set `RUST_LOG` to change verbosity.

use std::collections::HashMap;

use lockstep::{KeyboardInput, LockstepResult, MainMenu, PhaseController};
use lockstep_core::mock::{MockPresenter, MockSimulation};
use lockstep_core::{
    DemoScript, LocalSession, LoopConfig, ResponderChain, Scheduler, SystemClock,
};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run() -> LockstepResult<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => LoopConfig::load(path)?,
        None => LoopConfig::default(),
    };
    tracing::info!(
        tic_rate = config.tic_rate,
        ticdup = config.ticdup,
        "starting"
    );

    let clock = SystemClock::new(config.tic_rate);
    let scheduler = Scheduler::new(
        config,
        LocalSession::new(),
        clock,
        MockSimulation::new(),
        MockPresenter::new(),
        Box::new(KeyboardInput::new()),
    )
    .with_responders(ResponderChain::new().with_menu(Box::new(MainMenu)));

    let demos: HashMap<String, DemoScript> = HashMap::new();
    let mut controller = PhaseController::new(scheduler, Box::new(demos));
    match controller.run_forever()? {}
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        tracing::error!(%err, "fatal");
        std::process::exit(1);
    }
}
