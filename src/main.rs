//! Dice Cup - native entry point
//!
//! The playable build is the wasm library driven by the web page. Natively
//! this runs one scripted round (shake, then drag the cup open) headless and
//! prints the events and the final frame as JSON.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use dice_cup::Settings;
    use dice_cup::sim::GameState;

    env_logger::init();

    // `dice-cup [DICE | SETTINGS.json]`
    let arg = std::env::args().nth(1);
    let settings = match arg.as_deref() {
        Some(a) => match a.parse::<u8>() {
            Ok(dice) => Settings {
                initial_dice_count: dice,
                ..Settings::default()
            },
            Err(_) => Settings::load_from(a),
        },
        None => Settings::default(),
    };

    let mut state = GameState::from_settings(&settings, rand::random());
    log::info!(
        "Dice Cup (native) starting: seed={}, dice={}",
        state.seed,
        state.dice_count()
    );

    play_round(&mut state);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::start, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn play_round(state: &mut dice_cup::sim::GameState) {
    use dice_cup::sim::{GamePhase, InputEvent, TickInput, tick};
    use glam::Vec2;

    const FRAME: f32 = 1.0 / 60.0;
    let on_cup = |_: Vec2| true;
    let idle = TickInput::default();

    state.drain_events();

    // Tap the cup
    let tap = TickInput {
        pointer: vec![
            InputEvent::press(0.0, 300.0, 0.0),
            InputEvent::release(0.0, 300.0, 60.0),
        ],
        ..Default::default()
    };
    tick(state, &tap, FRAME, &on_cup);
    while state.phase == GamePhase::Shaking {
        tick(state, &idle, FRAME, &on_cup);
    }

    // Swipe it open
    let swipe = TickInput {
        pointer: vec![
            InputEvent::press(0.0, 400.0, 1000.0),
            InputEvent::moved(0.0, 250.0, 1100.0),
            InputEvent::release(0.0, 250.0, 1150.0),
        ],
        ..Default::default()
    };
    tick(state, &swipe, FRAME, &on_cup);
    while state.is_cup_animating() {
        tick(state, &idle, FRAME, &on_cup);
    }

    for event in state.drain_events() {
        match serde_json::to_string(&event) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Could not encode event: {}", e),
        }
    }
    match serde_json::to_string_pretty(&state.snapshot()) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Could not encode frame: {}", e),
    }
}
