//! Cup state machine and per-frame step
//!
//! Handlers apply one input each and bail out immediately when a guard says
//! something is already in flight (shake running, snap running, settings up).
//! `advance` moves every running animation forward by one frame.

use glam::{EulerRot, Quat, Vec3};
use rand::Rng;
use std::f32::consts::TAU;

use super::gesture::{CupHitTest, Gesture, InputEvent, InputKind, drag_progress};
use super::jackpot;
use super::outcome::roll_all;
use super::placement;
use super::pose::{REST_HEIGHT, resting_rotation};
use super::state::{
    CupTarget, GameEvent, GamePhase, GameState, Roll, ShakeAnimation, SnapAnimation, SoundCue,
    StatusText,
};
use crate::consts::*;
use crate::ease_out_cubic;
use crate::ease_out_quad;

/// Snap animations finish once this close to the end
const SNAP_EPSILON: f32 = 1e-4;

/// Input gathered for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer/touch events in arrival order
    pub pointer: Vec<InputEvent>,
    /// Taps on the status label
    pub cheat_taps: u32,
    /// Requested change to the dice count
    pub dice_delta: i32,
    /// Settings button pressed
    pub enter_settings: bool,
    /// Settings confirm button pressed
    pub confirm_settings: bool,
}

/// Apply one frame of input, then advance animations by `dt` seconds
pub fn tick<H: CupHitTest + ?Sized>(state: &mut GameState, input: &TickInput, dt: f32, hit: &H) {
    for event in &input.pointer {
        handle_pointer(state, event, hit);
    }
    for _ in 0..input.cheat_taps {
        cheat_tap(state);
    }
    if input.dice_delta != 0 {
        adjust_dice_count(state, input.dice_delta);
    }
    if input.enter_settings {
        enter_settings(state);
    }
    if input.confirm_settings {
        confirm_settings(state);
    }

    advance(state, dt);
}

/// Route a pointer event to its handler
pub fn handle_pointer<H: CupHitTest + ?Sized>(state: &mut GameState, event: &InputEvent, hit: &H) {
    match event.kind {
        InputKind::Press => on_press(state, event),
        InputKind::Move => on_move(state, event),
        InputKind::Release => on_release(state, event, hit),
    }
}

fn input_blocked(state: &GameState) -> bool {
    state.is_cup_animating() || state.phase == GamePhase::Shaking
}

fn on_press(state: &mut GameState, event: &InputEvent) {
    if state.phase == GamePhase::Settings || input_blocked(state) {
        return;
    }
    state.gesture.press(event);
}

fn on_move(state: &mut GameState, event: &InputEvent) {
    if state.phase == GamePhase::Settings || input_blocked(state) {
        return;
    }
    if let Some(offset) = state.gesture.motion(event) {
        let base = if state.phase == GamePhase::Idle { 0.0 } else { 1.0 };
        state.apply_progress(drag_progress(base, offset));
    }
}

fn on_release<H: CupHitTest + ?Sized>(state: &mut GameState, event: &InputEvent, hit: &H) {
    if state.phase == GamePhase::Settings {
        return;
    }
    let Some(gesture) = state.gesture.release(event) else {
        return;
    };
    if input_blocked(state) {
        return;
    }

    match gesture {
        Gesture::Tap { position } => {
            if state.phase == GamePhase::Idle && hit.hits_cup(position) {
                start_shake(state);
            }
        }
        Gesture::Hold => {}
        Gesture::Drag => {
            let target = match state.phase {
                GamePhase::Idle if state.drag_progress > OPEN_RELEASE_THRESHOLD => CupTarget::Open,
                GamePhase::Idle => CupTarget::Closed,
                _ if state.drag_progress < CLOSE_RELEASE_THRESHOLD => CupTarget::Closed,
                _ => CupTarget::Open,
            };
            request_snap(state, target);
        }
    }
}

/// Begin a shake. Only allowed from `Idle` with the cup at rest.
pub fn start_shake(state: &mut GameState) -> bool {
    if state.phase != GamePhase::Idle || state.is_cup_animating() {
        log::debug!("Shake ignored in {:?}", state.phase);
        return false;
    }

    state.gesture.cancel();
    state.jackpot_triggered = false;
    state.shake = Some(ShakeAnimation::default());
    for die in &mut state.dice {
        die.value = None;
    }
    state.status = StatusText::Shaking;
    state.set_phase(GamePhase::Shaking);
    true
}

/// Start animating Drag Progress to `target`; dropped if a snap is running
pub fn request_snap(state: &mut GameState, target: CupTarget) -> bool {
    if state.is_cup_animating() {
        log::debug!("Snap to {:?} dropped, cup already animating", target);
        return false;
    }
    state.snap = Some(SnapAnimation {
        target,
        start_progress: state.drag_progress,
        t: 0.0,
    });
    true
}

/// Open the settings panel (from `Idle` or `Opened`), lifting the cup
pub fn enter_settings(state: &mut GameState) {
    if !matches!(state.phase, GamePhase::Idle | GamePhase::Opened) || state.is_cup_animating() {
        return;
    }

    state.gesture.cancel();
    state.set_phase(GamePhase::Settings);
    if state.drag_progress < SETTINGS_OPEN_PROGRESS {
        state.push_event(GameEvent::Cue(SoundCue::CupOpen));
        request_snap(state, CupTarget::Open);
    } else {
        state.apply_progress(1.0);
    }
}

/// Close the settings panel and put the cup back down.
///
/// Always leaves `Settings`. If the cup is still lifting, the close snap is
/// dropped and the lift finishes into `Opened`.
pub fn confirm_settings(state: &mut GameState) {
    if state.phase != GamePhase::Settings {
        return;
    }

    request_snap(state, CupTarget::Closed);
    state.status = StatusText::TapToShake;
    state.set_phase(GamePhase::Idle);
}

/// Add or remove dice (clamped to 1..=8); ignored mid-shake
pub fn adjust_dice_count(state: &mut GameState, delta: i32) {
    if state.phase == GamePhase::Shaking {
        return;
    }
    let current = state.dice_count() as i32;
    let target = super::dice::clamp_count(current.saturating_add(delta));
    if target as i32 == current {
        return;
    }

    let cue = if delta > 0 {
        SoundCue::AddDie
    } else {
        SoundCue::RemoveDie
    };
    state.push_event(GameEvent::Cue(cue));
    state.set_count(target);
}

/// A tap on the status label, feeding the hidden activation gesture
pub fn cheat_tap(state: &mut GameState) {
    if state.phase == GamePhase::Settings {
        return;
    }
    if state.cheat.tap(state.clock_ms) {
        state.cheat_armed = true;
        log::info!("Rigged roll armed");
    }
}

/// Advance every running animation by one frame of `dt` seconds
pub fn advance(state: &mut GameState, dt: f32) {
    let dt = if dt.is_finite() {
        dt.clamp(0.0, MAX_FRAME_DT)
    } else {
        0.0
    };
    state.clock_ms += f64::from(dt) * 1000.0;
    state.cheat.expire(state.clock_ms);

    step_shake(state, dt * 1000.0);
    step_snap(state);
    state.step_dice_tweens();
}

/// Shake motion is driven by elapsed milliseconds, not tick count
fn step_shake(state: &mut GameState, dt_ms: f32) {
    let Some(mut shake) = state.shake.take() else {
        return;
    };
    shake.elapsed_ms += dt_ms;
    if shake.elapsed_ms >= SHAKE_DURATION_MS {
        resolve_roll(state);
        return;
    }

    let elapsed = shake.elapsed_ms;
    let damping = if elapsed > SHAKE_DURATION_MS - SHAKE_FADE_MS {
        ((SHAKE_DURATION_MS - elapsed) / SHAKE_FADE_MS).powi(2)
    } else {
        1.0
    };

    let rng = &mut state.rng;
    let t = elapsed * 0.025;
    let swing = (t * 1.2).sin() * 0.6 * damping;
    let bob = (t * 1.2).sin().abs() * 0.4 * damping;
    let mut jitter = |amount: f32| (rng.random::<f32>() - 0.5) * amount * damping;

    let position = Vec3::new(
        swing + jitter(0.08),
        0.8 * damping + bob + jitter(0.08),
        jitter(0.08),
    );
    let rotation = Vec3::new(jitter(0.1), jitter(0.05), -swing * 0.35);
    state.cup.position = position;
    state.cup.rotation = rotation;

    // At most one rattle per 100 ms, only while the shake is strong
    if damping > SHAKE_CUE_MIN_DAMPING
        && elapsed - shake.last_cue_ms > SHAKE_CUE_INTERVAL_MS
        && state.rng.random_bool(SHAKE_CUE_CHANCE)
    {
        state.push_event(GameEvent::Cue(SoundCue::ShakeHit));
        shake.last_cue_ms = elapsed;
    }

    let range = CUP_RADIUS_OPEN * 0.4 * damping;
    for die in &mut state.dice {
        let tumble = Quat::from_euler(
            EulerRot::XYZ,
            state.rng.random::<f32>() * 0.5 * damping,
            state.rng.random::<f32>() * 0.5 * damping,
            0.0,
        );
        die.rotation = (die.rotation * tumble).normalize();
        die.position = Vec3::new(
            position.x + (state.rng.random::<f32>() - 0.5) * range,
            REST_HEIGHT + (state.rng.random::<f32>() * 2.0 + 0.5) * damping,
            position.z + (state.rng.random::<f32>() - 0.5) * range,
        );
    }

    state.shake = Some(shake);
}

/// End of shake: roll, lay the dice out, judge the jackpot, settle the cup
fn resolve_roll(state: &mut GameState) {
    let count = state.dice_count();
    let rigged = state.cheat_armed && count > 1;
    if state.cheat_armed {
        state.cheat_armed = false;
        log::debug!("Rigged roll consumed (applied: {})", rigged);
    }

    let values = roll_all(count, rigged, &mut state.rng);
    let placements = placement::place_round(count, &mut state.rng);
    for ((die, &value), placement) in state.dice.iter_mut().zip(&values).zip(&placements) {
        let yaw = state.rng.random::<f32>() * TAU;
        die.value = Some(value);
        die.position = placement.position;
        die.rotation = resting_rotation(value, yaw);
    }

    let jackpot = jackpot::evaluate(&values, count);
    log::info!(
        "Rolled {:?} (rigged: {}, jackpot: {})",
        values,
        rigged,
        jackpot
    );
    state.push_event(GameEvent::RollResolved {
        values: values.clone(),
    });
    state.roll = Some(Roll {
        values,
        rigged,
        jackpot,
    });

    state.shake = None;
    state.apply_progress(0.0);
    state.status = StatusText::SwipeUpToOpen;
    state.set_phase(GamePhase::Idle);
}

/// Snap animations advance a fixed step per tick: opening is quicker than closing
fn step_snap(state: &mut GameState) {
    let Some(snap) = state.snap.as_mut() else {
        return;
    };
    let (step, ease) = match snap.target {
        CupTarget::Open => (SNAP_OPEN_STEP, ease_out_quad as fn(f32) -> f32),
        CupTarget::Closed => (SNAP_CLOSE_STEP, ease_out_cubic as fn(f32) -> f32),
    };
    snap.t += step;

    if snap.t >= 1.0 - SNAP_EPSILON {
        if let Some(snap) = state.snap.take() {
            finish_snap(state, &snap);
        }
    } else {
        let start = snap.start_progress;
        let progress = start + (snap.target.progress() - start) * ease(snap.t);
        state.apply_progress(progress);
    }
}

fn finish_snap(state: &mut GameState, snap: &SnapAnimation) {
    state.apply_progress(snap.target.progress());

    match snap.target {
        CupTarget::Open => {
            // Settings lifts the cup without revealing the roll
            if state.phase != GamePhase::Settings {
                state.status = StatusText::DragDownToClose;
                reveal_jackpot(state);
                state.push_event(GameEvent::Cue(SoundCue::CupOpen));
                state.set_phase(GamePhase::Opened);
            }
        }
        CupTarget::Closed => {
            if snap.start_progress > CLOSE_CUE_MIN_PROGRESS {
                state.push_event(GameEvent::Cue(SoundCue::CupClose));
            }
            if state.phase != GamePhase::Settings {
                state.status = StatusText::TapToShake;
                state.set_phase(GamePhase::Idle);
            }
        }
    }
}

/// Fire the celebration for the current roll, at most once per shake
fn reveal_jackpot(state: &mut GameState) {
    if state.jackpot_triggered {
        return;
    }
    if state.roll.as_ref().is_some_and(|roll| roll.jackpot) {
        state.jackpot_triggered = true;
        log::info!("Jackpot!");
        state.push_event(GameEvent::Jackpot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::floor_distance;
    use crate::sim::outcome::face_counts;
    use glam::Vec2;
    use proptest::prelude::*;

    const FRAME: f32 = 1.0 / 60.0;

    fn on_cup(_: Vec2) -> bool {
        true
    }

    fn off_cup(_: Vec2) -> bool {
        false
    }

    fn fresh(seed: u64, dice: u8) -> GameState {
        let mut state = GameState::with_dice(seed, dice);
        state.drain_events();
        state
    }

    fn pointer(state: &mut GameState, events: &[InputEvent]) {
        let input = TickInput {
            pointer: events.to_vec(),
            ..Default::default()
        };
        tick(state, &input, FRAME, &on_cup);
    }

    /// Run frames until no shake or snap is in flight
    fn settle(state: &mut GameState) {
        for _ in 0..600 {
            if state.shake.is_none() && state.snap.is_none() {
                return;
            }
            advance(state, FRAME);
        }
        panic!("animations never settled");
    }

    fn tap_cup(state: &mut GameState) {
        pointer(
            state,
            &[
                InputEvent::press(200.0, 300.0, 0.0),
                InputEvent::release(200.0, 300.0, 80.0),
            ],
        );
    }

    fn drag(state: &mut GameState, dy: f32) {
        pointer(
            state,
            &[
                InputEvent::press(200.0, 400.0, 0.0),
                InputEvent::moved(200.0, 400.0 + dy, 100.0),
                InputEvent::release(200.0, 400.0 + dy, 200.0),
            ],
        );
    }

    fn open(state: &mut GameState) {
        state.apply_progress(1.0);
        state.set_phase(GamePhase::Opened);
    }

    fn count_events(state: &GameState, wanted: &GameEvent) -> usize {
        state.events().iter().filter(|e| *e == wanted).count()
    }

    #[test]
    fn test_tap_on_cup_starts_shake() {
        let mut state = fresh(1, 5);
        tap_cup(&mut state);
        assert_eq!(state.phase, GamePhase::Shaking);
        assert_eq!(state.status, StatusText::Shaking);
        assert!(state.dice.iter().all(|d| d.value.is_none()));
    }

    #[test]
    fn test_tap_off_cup_ignored() {
        let mut state = fresh(1, 5);
        let input = TickInput {
            pointer: vec![
                InputEvent::press(10.0, 10.0, 0.0),
                InputEvent::release(10.0, 10.0, 50.0),
            ],
            ..Default::default()
        };
        tick(&mut state, &input, FRAME, &off_cup);
        assert_eq!(state.phase, GamePhase::Idle);
    }

    #[test]
    fn test_long_press_does_not_shake() {
        let mut state = fresh(1, 5);
        pointer(
            &mut state,
            &[
                InputEvent::press(200.0, 300.0, 0.0),
                InputEvent::release(200.0, 300.0, 650.0),
            ],
        );
        assert_eq!(state.phase, GamePhase::Idle);
    }

    #[test]
    fn test_multi_touch_ignored() {
        let mut state = fresh(1, 5);
        pointer(
            &mut state,
            &[
                InputEvent::press(200.0, 300.0, 0.0).with_multi_touch(true),
                InputEvent::release(200.0, 300.0, 50.0),
            ],
        );
        assert_eq!(state.phase, GamePhase::Idle);
    }

    #[test]
    fn test_shake_resolves_after_duration() {
        let mut state = fresh(2, 5);
        tap_cup(&mut state);
        // Tap frame plus 46 more is ~783 ms: still shaking
        for _ in 0..46 {
            advance(&mut state, FRAME);
        }
        assert_eq!(state.phase, GamePhase::Shaking);
        advance(&mut state, FRAME);
        advance(&mut state, FRAME);
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.status, StatusText::SwipeUpToOpen);
        assert_eq!(state.drag_progress, 0.0);
        assert_eq!(state.cup, crate::sim::CupPose::CLOSED);

        let roll = state.roll.as_ref().unwrap();
        assert_eq!(roll.values.len(), 5);
        assert!(state.dice.iter().all(|d| d.value.is_some()));
    }

    #[test]
    fn test_shake_length_independent_of_frame_rate() {
        for dt in [1.0 / 30.0, 1.0 / 144.0] {
            let mut state = fresh(3, 4);
            start_shake(&mut state);
            let mut elapsed = 0.0;
            while state.phase == GamePhase::Shaking {
                advance(&mut state, dt);
                elapsed += dt;
            }
            assert!((elapsed - 0.8).abs() <= dt + 1e-3, "dt={} took {}", dt, elapsed);
        }
    }

    #[test]
    fn test_shake_cues_are_throttled() {
        let mut state = fresh(4, 5);
        start_shake(&mut state);
        settle(&mut state);
        let hits = count_events(&state, &GameEvent::Cue(SoundCue::ShakeHit));
        // Cues stop once damping falls to 0.2 (~690 ms) and are 100 ms apart
        assert!(hits >= 1);
        assert!(hits <= 6, "got {} shake cues", hits);
    }

    #[test]
    fn test_shake_cue_spacing_and_cutoff() {
        // Damping reaches 0.2 when the remaining time is 250 * sqrt(0.2) ms
        let cutoff = SHAKE_DURATION_MS - SHAKE_FADE_MS * SHAKE_CUE_MIN_DAMPING.sqrt();
        for seed in [4, 40, 400, 4000] {
            let mut state = fresh(seed, 5);
            start_shake(&mut state);
            state.drain_events();

            let mut cue_times: Vec<f32> = Vec::new();
            while let Some(elapsed) = state.shake.as_ref().map(|s| s.elapsed_ms) {
                advance(&mut state, 1.0 / 120.0);
                let now = state.shake.as_ref().map_or(elapsed, |s| s.elapsed_ms);
                let hits = state
                    .drain_events()
                    .into_iter()
                    .filter(|e| *e == GameEvent::Cue(SoundCue::ShakeHit))
                    .count();
                assert!(hits <= 1);
                if hits == 1 {
                    cue_times.push(now);
                }
            }

            assert!(!cue_times.is_empty(), "seed {} never rattled", seed);
            assert!(cue_times[0] > SHAKE_CUE_INTERVAL_MS);
            for pair in cue_times.windows(2) {
                assert!(
                    pair[1] - pair[0] > SHAKE_CUE_INTERVAL_MS,
                    "seed {}: cues at {:?}",
                    seed,
                    cue_times
                );
            }
            assert!(
                cue_times.iter().all(|&t| t < cutoff),
                "seed {}: cue after damping cutoff {:?}",
                seed,
                cue_times
            );
        }
    }

    #[test]
    fn test_confirm_while_cup_lifting_leaves_settings() {
        let mut state = fresh(29, 5);
        enter_settings(&mut state);
        advance(&mut state, 0.016);
        assert!(state.is_cup_animating());

        confirm_settings(&mut state);
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.status, StatusText::TapToShake);
        // The lift was already running, so the close is dropped
        assert_eq!(state.snap.as_ref().unwrap().target, CupTarget::Open);

        settle(&mut state);
        assert_eq!(state.phase, GamePhase::Opened);
        assert_eq!(state.drag_progress, 1.0);

        // Pointer input works again: drag it shut
        drag(&mut state, 200.0);
        settle(&mut state);
        assert_eq!(state.phase, GamePhase::Idle);
    }

    #[test]
    fn test_extreme_dice_delta_clamps() {
        let mut state = fresh(30, 5);
        let input = TickInput {
            dice_delta: i32::MAX,
            ..Default::default()
        };
        tick(&mut state, &input, FRAME, &off_cup);
        assert_eq!(state.dice_count(), MAX_DICE as usize);

        let input = TickInput {
            dice_delta: i32::MIN,
            ..Default::default()
        };
        tick(&mut state, &input, FRAME, &off_cup);
        assert_eq!(state.dice_count(), MIN_DICE as usize);
    }

    #[test]
    fn test_non_finite_dt_is_ignored() {
        let mut state = fresh(32, 5);
        start_shake(&mut state);
        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            advance(&mut state, bad);
        }
        assert_eq!(state.shake.as_ref().unwrap().elapsed_ms, 0.0);
        assert!(state.clock_ms.is_finite());

        settle(&mut state);
        assert_eq!(state.phase, GamePhase::Idle);
        assert!(state.roll.is_some());
    }

    #[test]
    fn test_start_shake_only_from_idle() {
        let mut state = fresh(5, 5);
        open(&mut state);
        assert!(!start_shake(&mut state));
        assert_eq!(state.phase, GamePhase::Opened);

        let mut state = fresh(5, 5);
        assert!(start_shake(&mut state));
        assert!(!start_shake(&mut state));
    }

    #[test]
    fn test_input_ignored_while_shaking() {
        let mut state = fresh(6, 5);
        tap_cup(&mut state);
        drag(&mut state, -200.0);
        assert_eq!(state.drag_progress, 0.0);
        assert!(state.snap.is_none());
        assert!(!state.gesture.is_interacting());
    }

    #[test]
    fn test_resolved_dice_rest_apart_on_floor() {
        let mut state = fresh(7, 8);
        start_shake(&mut state);
        settle(&mut state);
        for (i, a) in state.dice.iter().enumerate() {
            assert!((a.position.y - REST_HEIGHT).abs() < 1e-6);
            for b in &state.dice[i + 1..] {
                assert!(floor_distance(a.position, b.position) >= MIN_DIE_SEPARATION);
            }
        }
    }

    #[test]
    fn test_drag_from_idle_past_threshold_opens() {
        let mut state = fresh(8, 5);
        // 87.5 px up is 0.35 progress
        pointer(
            &mut state,
            &[
                InputEvent::press(200.0, 400.0, 0.0),
                InputEvent::moved(200.0, 312.5, 100.0),
            ],
        );
        assert!((state.drag_progress - 0.35).abs() < 1e-5);
        pointer(&mut state, &[InputEvent::release(200.0, 312.5, 200.0)]);
        assert_eq!(state.snap.as_ref().unwrap().target, CupTarget::Open);
        assert_eq!(state.phase, GamePhase::Idle);

        settle(&mut state);
        assert_eq!(state.phase, GamePhase::Opened);
        assert_eq!(state.drag_progress, 1.0);
        assert_eq!(state.status, StatusText::DragDownToClose);
        assert_eq!(count_events(&state, &GameEvent::Cue(SoundCue::CupOpen)), 1);
    }

    #[test]
    fn test_short_drag_from_idle_falls_back() {
        let mut state = fresh(9, 5);
        drag(&mut state, -50.0);
        assert_eq!(state.snap.as_ref().unwrap().target, CupTarget::Closed);
        settle(&mut state);
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.drag_progress, 0.0);
        // Started at 0.2, above the close-cue floor
        assert_eq!(count_events(&state, &GameEvent::Cue(SoundCue::CupClose)), 1);
    }

    #[test]
    fn test_tiny_close_is_silent() {
        let mut state = fresh(9, 5);
        drag(&mut state, -15.0);
        settle(&mut state);
        assert_eq!(count_events(&state, &GameEvent::Cue(SoundCue::CupClose)), 0);
    }

    #[test]
    fn test_drag_from_opened_below_threshold_closes() {
        let mut state = fresh(10, 5);
        open(&mut state);
        // 87.5 px down from open is 0.65, under the 0.7 close threshold
        drag(&mut state, 87.5);
        assert_eq!(state.snap.as_ref().unwrap().target, CupTarget::Closed);
        settle(&mut state);
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.status, StatusText::TapToShake);
    }

    #[test]
    fn test_small_drag_from_opened_snaps_back() {
        let mut state = fresh(11, 5);
        open(&mut state);
        drag(&mut state, 50.0);
        assert_eq!(state.snap.as_ref().unwrap().target, CupTarget::Open);
        settle(&mut state);
        assert_eq!(state.phase, GamePhase::Opened);
        assert_eq!(state.drag_progress, 1.0);
    }

    #[test]
    fn test_snap_request_dropped_while_animating() {
        let mut state = fresh(12, 5);
        assert!(request_snap(&mut state, CupTarget::Open));
        assert!(!request_snap(&mut state, CupTarget::Closed));
        assert_eq!(state.snap.as_ref().unwrap().target, CupTarget::Open);
    }

    #[test]
    fn test_press_ignored_while_animating() {
        let mut state = fresh(12, 5);
        request_snap(&mut state, CupTarget::Open);
        pointer(&mut state, &[InputEvent::press(200.0, 300.0, 0.0)]);
        assert!(!state.gesture.is_interacting());
    }

    #[test]
    fn test_open_snap_is_faster_than_close() {
        let mut state = fresh(13, 5);
        request_snap(&mut state, CupTarget::Open);
        let mut open_ticks = 0;
        while state.snap.is_some() {
            advance(&mut state, FRAME);
            open_ticks += 1;
        }
        request_snap(&mut state, CupTarget::Closed);
        let mut close_ticks = 0;
        while state.snap.is_some() {
            advance(&mut state, FRAME);
            close_ticks += 1;
        }
        assert_eq!(open_ticks, 17);
        assert_eq!(close_ticks, 29);
    }

    #[test]
    fn test_enter_settings_lifts_cup_without_reveal() {
        let mut state = fresh(14, 5);
        start_shake(&mut state);
        settle(&mut state);
        state.roll.as_mut().unwrap().jackpot = true;
        state.drain_events();

        enter_settings(&mut state);
        assert_eq!(state.phase, GamePhase::Settings);
        assert_eq!(count_events(&state, &GameEvent::Cue(SoundCue::CupOpen)), 1);
        settle(&mut state);
        assert_eq!(state.phase, GamePhase::Settings);
        assert_eq!(state.drag_progress, 1.0);
        assert_eq!(count_events(&state, &GameEvent::Jackpot), 0);
        // Only the entry cue, no completion cue
        assert_eq!(count_events(&state, &GameEvent::Cue(SoundCue::CupOpen)), 1);
    }

    #[test]
    fn test_enter_settings_when_open_pins_progress() {
        let mut state = fresh(15, 5);
        open(&mut state);
        state.drain_events();
        enter_settings(&mut state);
        assert_eq!(state.phase, GamePhase::Settings);
        assert!(state.snap.is_none());
        assert_eq!(count_events(&state, &GameEvent::Cue(SoundCue::CupOpen)), 0);
    }

    #[test]
    fn test_enter_settings_is_idempotent() {
        let mut state = fresh(16, 5);
        enter_settings(&mut state);
        settle(&mut state);
        let before = state.drain_events();
        assert!(!before.is_empty());
        enter_settings(&mut state);
        assert_eq!(state.phase, GamePhase::Settings);
        assert!(state.events().is_empty());
        assert!(state.snap.is_none());
    }

    #[test]
    fn test_enter_settings_refused_while_shaking() {
        let mut state = fresh(17, 5);
        start_shake(&mut state);
        enter_settings(&mut state);
        assert_eq!(state.phase, GamePhase::Shaking);
    }

    #[test]
    fn test_confirm_settings_closes_to_idle() {
        let mut state = fresh(18, 5);
        enter_settings(&mut state);
        settle(&mut state);
        confirm_settings(&mut state);
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.status, StatusText::TapToShake);
        settle(&mut state);
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.drag_progress, 0.0);
        assert_eq!(count_events(&state, &GameEvent::Cue(SoundCue::CupClose)), 1);
    }

    #[test]
    fn test_confirm_outside_settings_is_noop() {
        let mut state = fresh(19, 5);
        open(&mut state);
        confirm_settings(&mut state);
        assert_eq!(state.phase, GamePhase::Opened);
        assert!(state.snap.is_none());
    }

    #[test]
    fn test_pointer_ignored_in_settings() {
        let mut state = fresh(20, 5);
        enter_settings(&mut state);
        settle(&mut state);
        drag(&mut state, 200.0);
        assert_eq!(state.drag_progress, 1.0);
        assert_eq!(state.phase, GamePhase::Settings);
    }

    #[test]
    fn test_adjust_count_cues_and_clamps() {
        let mut state = fresh(21, 7);
        adjust_dice_count(&mut state, 1);
        assert_eq!(state.dice_count(), 8);
        adjust_dice_count(&mut state, 1);
        assert_eq!(state.dice_count(), 8);
        adjust_dice_count(&mut state, -1);
        assert_eq!(state.dice_count(), 7);
        let cues: Vec<GameEvent> = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::Cue(_)))
            .collect();
        assert_eq!(
            cues,
            vec![
                GameEvent::Cue(SoundCue::AddDie),
                GameEvent::Cue(SoundCue::RemoveDie)
            ]
        );
    }

    #[test]
    fn test_adjust_count_refused_mid_shake() {
        let mut state = fresh(22, 5);
        start_shake(&mut state);
        adjust_dice_count(&mut state, 2);
        assert_eq!(state.dice_count(), 5);
    }

    fn arm_cheat(state: &mut GameState) {
        let input = TickInput {
            cheat_taps: 1,
            ..Default::default()
        };
        for _ in 0..10 {
            tick(state, &input, 0.1, &off_cup);
        }
    }

    #[test]
    fn test_ten_status_taps_arm_cheat() {
        let mut state = fresh(23, 5);
        arm_cheat(&mut state);
        assert!(state.cheat_armed);
    }

    #[test]
    fn test_slow_status_taps_do_not_arm() {
        let mut state = fresh(24, 5);
        let input = TickInput {
            cheat_taps: 1,
            ..Default::default()
        };
        for _ in 0..10 {
            tick(&mut state, &input, 0.1, &off_cup);
            // 1.6 s of idle frames between taps lets the window lapse
            for _ in 0..16 {
                advance(&mut state, 0.1);
            }
        }
        assert!(!state.cheat_armed);
    }

    #[test]
    fn test_cheat_survives_until_next_roll() {
        let mut state = fresh(25, 5);
        arm_cheat(&mut state);
        // Opening, closing and count changes do not consume it
        enter_settings(&mut state);
        settle(&mut state);
        confirm_settings(&mut state);
        settle(&mut state);
        adjust_dice_count(&mut state, 1);
        adjust_dice_count(&mut state, -1);
        assert!(state.cheat_armed);

        start_shake(&mut state);
        for _ in 0..10 {
            advance(&mut state, FRAME);
        }
        assert!(state.cheat_armed);
        settle(&mut state);
        assert!(!state.cheat_armed);
        assert!(state.roll.as_ref().unwrap().rigged);

        start_shake(&mut state);
        settle(&mut state);
        assert!(!state.roll.as_ref().unwrap().rigged);
    }

    #[test]
    fn test_single_die_consumes_cheat_without_rigging() {
        let mut state = fresh(26, 1);
        arm_cheat(&mut state);
        start_shake(&mut state);
        settle(&mut state);
        assert!(!state.cheat_armed);
        assert!(!state.roll.as_ref().unwrap().rigged);
    }

    #[test]
    fn test_rigged_five_dice_jackpot_on_reveal() {
        let mut state = fresh(27, 5);
        arm_cheat(&mut state);
        tap_cup(&mut state);
        settle(&mut state);

        let roll = state.roll.clone().unwrap();
        let mut counts: Vec<usize> = face_counts(&roll.values)
            .into_iter()
            .filter(|&c| c > 0)
            .collect();
        counts.sort_unstable();
        assert_eq!(counts, vec![1, 4]);
        assert!(roll.jackpot);
        // Not celebrated until the cup comes off
        assert_eq!(count_events(&state, &GameEvent::Jackpot), 0);

        drag(&mut state, -150.0);
        settle(&mut state);
        assert_eq!(state.phase, GamePhase::Opened);
        assert_eq!(count_events(&state, &GameEvent::Jackpot), 1);

        // Close and reopen: same shake, no second celebration
        drag(&mut state, 200.0);
        settle(&mut state);
        drag(&mut state, -150.0);
        settle(&mut state);
        assert_eq!(state.phase, GamePhase::Opened);
        assert_eq!(count_events(&state, &GameEvent::Jackpot), 1);
    }

    #[test]
    fn test_no_jackpot_when_short_of_threshold() {
        let mut state = fresh(28, 8);
        state.roll = Some(Roll {
            values: vec![2, 2, 2, 2, 1, 3, 4, 5],
            rigged: false,
            jackpot: jackpot::evaluate(&[2, 2, 2, 2, 1, 3, 4, 5], 8),
        });
        drag(&mut state, -150.0);
        settle(&mut state);
        assert_eq!(state.phase, GamePhase::Opened);
        assert_eq!(count_events(&state, &GameEvent::Jackpot), 0);
    }

    #[test]
    fn test_determinism() {
        let mut a = fresh(99999, 6);
        let mut b = fresh(99999, 6);
        for state in [&mut a, &mut b] {
            tap_cup(state);
            settle(state);
            drag(state, -150.0);
            settle(state);
        }
        assert_eq!(a.roll, b.roll);
        assert_eq!(a.dice, b.dice);
        assert_eq!(a.drain_events(), b.drain_events());
    }

    proptest! {
        #[test]
        fn prop_progress_stays_in_unit_range(
            opened in any::<bool>(),
            moves in prop::collection::vec(-900.0f32..900.0, 1..30),
        ) {
            let mut state = fresh(31, 5);
            if opened {
                open(&mut state);
            }
            handle_pointer(&mut state, &InputEvent::press(0.0, 400.0, 0.0), &off_cup);
            for (i, dy) in moves.iter().enumerate() {
                handle_pointer(
                    &mut state,
                    &InputEvent::moved(0.0, 400.0 + dy, i as f64),
                    &off_cup,
                );
                prop_assert!((0.0..=1.0).contains(&state.drag_progress));
            }
            handle_pointer(&mut state, &InputEvent::release(0.0, 0.0, 99.0), &off_cup);
            for _ in 0..40 {
                advance(&mut state, FRAME);
                prop_assert!((0.0..=1.0).contains(&state.drag_progress));
            }
        }
    }
}
