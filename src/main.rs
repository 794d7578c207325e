//! Tripoint native runner
//!
//! Plays one headless session with the autopilot at the fixed frame rate
//! and logs how it went. The browser build enters through the library.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use tripoint::consts::SIM_DT;
    use tripoint::minigame::{MinigameOutcome, scripted_provider};
    use tripoint::platform::FixedStep;
    use tripoint::sim::{SessionConfig, SessionEvent, autopilot};
    use tripoint::Settings;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let seed = match args.next().map(|s| s.parse::<u64>()) {
        Some(Ok(seed)) => seed,
        Some(Err(e)) => {
            log::warn!("Ignoring bad seed argument: {}", e);
            0
        }
        None => 0,
    };
    let tutorial = args.next().is_some_and(|a| a == "tutorial");

    let config = if tutorial {
        SessionConfig::tutorial()
    } else {
        SessionConfig::from_settings(&Settings::load())
    }
    .with_seed(seed);
    log::info!("Tripoint (native) starting, seed {}", seed);

    let mut session =
        tripoint::GameSession::new(config, scripted_provider(MinigameOutcome::Success, 1.5));
    session.subscribe(|event: &SessionEvent| match event {
        SessionEvent::TaskCompleted {
            task_id,
            character_id,
        } => log::info!("{} completed {}", character_id, task_id),
        SessionEvent::LowTimeWarning { character_id } => {
            log::info!("{} is running low on time", character_id)
        }
        _ => {}
    });

    let mut clock = FixedStep::new();
    // Ten simulated minutes is far past any session's natural end
    let max_frames = (600.0 / SIM_DT) as u32;
    for _ in 0..max_frames {
        if session.is_finished() {
            break;
        }
        *clock.input_mut() = autopilot::drive(&session);
        clock.advance(&mut session, SIM_DT);
        session.drain_events();
    }

    let state = session.state();
    println!(
        "{:?} after {:.1}s with {}/{} tasks",
        state.phase,
        state.elapsed,
        state.completed_tasks,
        session.config().required_task_count
    );
    for reading in session.timers().snapshot() {
        println!("  {}: {:.1}s left", reading.character_id, reading.time_remaining);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is `platform::web::wasm_start`, this is just to satisfy the compiler
}
