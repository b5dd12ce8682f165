//! JavaScript bindings
//!
//! The page owns the 3D scene and the DOM. It forwards pointer input here
//! (with its own raycast verdict for the cup), calls `frame` once per
//! animation frame, and draws whatever the returned JSON describes.

use glam::Vec2;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::audio::AudioManager;
use crate::settings::Settings;
use crate::sim::{
    self, GameEvent, GamePhase, GameState, InputEvent, RenderSnapshot, adjust_dice_count,
    cheat_tap, confirm_settings, enter_settings, handle_pointer,
};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialised".into());
    }
    log::info!("Dice Cup starting...");
}

/// One frame for the page: scene state plus the side effects raised since the last frame
#[derive(Serialize)]
struct Frame<'a> {
    snapshot: RenderSnapshot,
    events: &'a [GameEvent],
}

#[wasm_bindgen]
pub struct DiceCup {
    state: GameState,
    settings: Settings,
    audio: AudioManager,
}

#[wasm_bindgen]
impl DiceCup {
    #[wasm_bindgen(constructor)]
    pub fn new() -> DiceCup {
        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let state = GameState::from_settings(&settings, seed);
        let audio = AudioManager::from_settings(&settings);
        Self {
            state,
            settings,
            audio,
        }
    }

    /// Pointer/touch down. Also unlocks audio, which browsers gate on a gesture.
    pub fn press(&mut self, x: f32, y: f32, timestamp_ms: f64, multi_touch: bool) {
        self.audio.resume();
        let event = InputEvent::press(x, y, timestamp_ms).with_multi_touch(multi_touch);
        handle_pointer(&mut self.state, &event, &|_: Vec2| false);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32, timestamp_ms: f64) {
        let event = InputEvent::moved(x, y, timestamp_ms);
        handle_pointer(&mut self.state, &event, &|_: Vec2| false);
    }

    /// Pointer/touch up; `on_cup` is the page's raycast against the cup mesh
    pub fn release(&mut self, x: f32, y: f32, timestamp_ms: f64, on_cup: bool) {
        let event = InputEvent::release(x, y, timestamp_ms);
        handle_pointer(&mut self.state, &event, &|_: Vec2| on_cup);
    }

    pub fn open_settings(&mut self) {
        enter_settings(&mut self.state);
    }

    /// Close the panel and remember the chosen dice count for next time
    pub fn close_settings(&mut self) {
        if self.state.phase != GamePhase::Settings {
            return;
        }
        confirm_settings(&mut self.state);
        let count = self.state.dice_count() as u8;
        if self.settings.initial_dice_count != count {
            self.settings.initial_dice_count = count;
            self.settings.save();
        }
    }

    pub fn add_die(&mut self) {
        adjust_dice_count(&mut self.state, 1);
    }

    pub fn remove_die(&mut self) {
        adjust_dice_count(&mut self.state, -1);
    }

    /// Tap on the status label
    pub fn status_tap(&mut self) {
        cheat_tap(&mut self.state);
    }

    pub fn set_volume(&mut self, master: f32, sfx: f32, muted: bool) {
        self.settings.master_volume = master.clamp(0.0, 1.0);
        self.settings.sfx_volume = sfx.clamp(0.0, 1.0);
        self.settings.muted = muted;
        self.audio.apply_settings(&self.settings);
        self.settings.save();
    }

    /// Advance by `dt` seconds, play queued cues, and return the frame as JSON
    pub fn frame(&mut self, dt: f32) -> Result<String, JsValue> {
        sim::advance(&mut self.state, dt);

        let events = self.state.drain_events();
        for event in &events {
            if let GameEvent::Cue(cue) = event {
                self.audio.play(*cue);
            }
        }

        let frame = Frame {
            snapshot: self.state.snapshot(),
            events: &events,
        };
        serde_json::to_string(&frame).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn status(&self) -> String {
        self.state.status.as_str().to_string()
    }

    pub fn phase(&self) -> String {
        format!("{:?}", self.state.phase)
    }
}

impl Default for DiceCup {
    fn default() -> Self {
        Self::new()
    }
}
