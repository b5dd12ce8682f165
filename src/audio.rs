//! Audio system using Web Audio API
//!
//! Procedurally generated cues from oscillators and a shared brown-noise
//! buffer - no external files needed!

use web_sys::{
    AudioBuffer, AudioContext, BiquadFilterNode, BiquadFilterType, GainNode, OscillatorNode,
    OscillatorType,
};

use crate::settings::Settings;
use crate::sim::SoundCue;

/// Seconds of noise kept for the rattle/thump/whoosh cues
const NOISE_SECONDS: f32 = 2.0;

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    noise: Option<AudioBuffer>,
    settings: Settings,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        let noise = ctx.as_ref().and_then(Self::create_noise_buffer);
        Self {
            ctx,
            noise,
            settings: Settings::default(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let mut audio = Self::new();
        audio.apply_settings(settings);
        audio
    }

    /// Take volume and mute from the player's settings
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.settings = settings.clone();
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Play a cue
    pub fn play(&self, cue: SoundCue) {
        let vol = self.settings.effective_volume();
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match cue {
            SoundCue::AddDie => self.play_ui_blip(ctx, vol, 880.0, 1200.0),
            SoundCue::RemoveDie => self.play_ui_blip(ctx, vol, 440.0, 300.0),
            SoundCue::ShakeHit => self.play_rattle(ctx, vol),
            SoundCue::CupClose => self.play_close(ctx, vol),
            SoundCue::CupOpen => self.play_open(ctx, vol),
        }
    }

    // === Sound generators ===

    /// Integrated white noise, gain-compensated
    fn create_noise_buffer(ctx: &AudioContext) -> Option<AudioBuffer> {
        let rate = ctx.sample_rate();
        let len = (rate * NOISE_SECONDS) as u32;
        let buffer = ctx.create_buffer(1, len, rate).ok()?;

        let mut last = 0.0f32;
        let mut data: Vec<f32> = (0..len)
            .map(|_| {
                let white = rand::random::<f32>() * 2.0 - 1.0;
                last = (last + 0.05 * white) / 1.05;
                last * 3.5
            })
            .collect();
        buffer.copy_to_channel(&mut data, 0).ok()?;
        Some(buffer)
    }

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Start a noise source through a filter and gain into `out`, for `duration` seconds
    fn play_filtered_noise(
        &self,
        ctx: &AudioContext,
        filter_type: BiquadFilterType,
        out: &web_sys::AudioNode,
        start: f64,
        duration: f64,
    ) -> Option<(BiquadFilterNode, GainNode)> {
        let noise = self.noise.as_ref()?;
        let source = ctx.create_buffer_source().ok()?;
        let filter = ctx.create_biquad_filter().ok()?;
        let gain = ctx.create_gain().ok()?;

        source.set_buffer(Some(noise));
        filter.set_type(filter_type);
        source.connect_with_audio_node(&filter).ok()?;
        filter.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(out).ok()?;

        source.start_with_when(start).ok()?;
        source.stop_with_when(start + duration).ok()?;
        Some((filter, gain))
    }

    /// Dice count change - short pitched blip up (add) or down (remove)
    fn play_ui_blip(&self, ctx: &AudioContext, vol: f32, from: f32, to: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, from, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.1, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.08)
            .ok();
        osc.frequency().set_value_at_time(from, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(to, t + 0.08)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.08).ok();
    }

    /// Shake hit - a cluster of band-passed noise clicks
    fn play_rattle(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();
        let Ok(bus) = ctx.create_gain() else { return };
        bus.gain().set_value(vol * 0.5);
        if bus.connect_with_audio_node(&ctx.destination()).is_err() {
            return;
        }

        let hits = 5 + (rand::random::<f32>() * 4.0) as usize;
        for _ in 0..hits {
            let at = t + rand::random::<f64>() * 0.1;
            let Some((filter, gain)) =
                self.play_filtered_noise(ctx, BiquadFilterType::Bandpass, &bus, at, 0.08)
            else {
                return;
            };
            filter
                .frequency()
                .set_value(400.0 + rand::random::<f32>() * 800.0);
            filter.q().set_value(1.5);
            gain.gain().set_value_at_time(0.0, at).ok();
            gain.gain()
                .linear_ramp_to_value_at_time(0.5 + rand::random::<f32>() * 0.3, at + 0.005)
                .ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, at + 0.05)
                .ok();
        }
    }

    /// Cup close - low thump with a muffled noise hit
    fn play_close(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = self.create_osc(ctx, 100.0, OscillatorType::Sine) {
            gain.gain().set_value_at_time(vol * 0.2, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.001, t + 0.15)
                .ok();
            osc.frequency().set_value_at_time(100.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(30.0, t + 0.15)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.2).ok();
        }

        if let Some((filter, gain)) = self.play_filtered_noise(
            ctx,
            BiquadFilterType::Lowpass,
            &ctx.destination(),
            t,
            0.15,
        ) {
            filter.frequency().set_value(500.0);
            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.001, t + 0.1)
                .ok();
        }
    }

    /// Cup open - rising filtered whoosh
    fn play_open(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();
        let Some((filter, gain)) = self.play_filtered_noise(
            ctx,
            BiquadFilterType::Lowpass,
            &ctx.destination(),
            t,
            0.3,
        ) else {
            return;
        };

        filter.q().set_value(0.5);
        filter.frequency().set_value_at_time(200.0, t).ok();
        filter
            .frequency()
            .exponential_ramp_to_value_at_time(1200.0, t + 0.2)
            .ok();
        gain.gain().set_value_at_time(0.0, t).ok();
        gain.gain()
            .linear_ramp_to_value_at_time(vol * 0.15, t + 0.05)
            .ok();
        gain.gain().linear_ramp_to_value_at_time(0.0, t + 0.25).ok();
    }
}
