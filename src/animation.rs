use std::f32::consts::TAU;

use glam::{vec3, Vec3};
use rand::Rng;

use crate::entity::Scene;

/// Starfield angular increments per tick, radians.
const YAW_RATE: f32 = 0.0008;
const PITCH_RATE: f32 = 0.0003;

/// Opacity every meteor loses per tick; a fresh meteor lives 125 ticks.
const FADE_RATE: f32 = 0.008;

/// Wall-clock scales driving the shared hue drift and glow pulse.
const HUE_RATE: f64 = 0.0003;
const PULSE_RATE: f64 = 0.01;

impl Scene {
    /// Advances the scene by one frame tick.
    ///
    /// `now_ms` is wall-clock epoch milliseconds; every meteor observes the
    /// same instant within one tick. Meteors that fade out are respawned in
    /// place from `rng`.
    pub fn tick(&mut self, rng: &mut impl Rng, now_ms: f64) {
        let starfield = &mut self.starfield;
        starfield.yaw = (starfield.yaw + YAW_RATE) % TAU;
        starfield.pitch = (starfield.pitch + PITCH_RATE) % TAU;

        let hue_time = now_ms * HUE_RATE;
        let pulse = ((now_ms * PULSE_RATE).sin() + 1.) / 2.;

        for meteor in &mut self.meteors {
            meteor.position += meteor.velocity;
            meteor.opacity -= FADE_RATE;

            let hue = (hue_time + meteor.hue_offset as f64).fract() as f32;
            meteor.color = hsl_to_rgb(hue, 1., 0.6);

            meteor.scale = 1.5 + pulse as f32 * 0.7;

            if meteor.opacity <= 0. {
                meteor.respawn(rng);
            }
        }
    }
}

/// HSL to RGB, hue in turns [0, 1). Matches the vivid shifting glow of the
/// meteors: full saturation, lightness 0.6.
fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Vec3 {
    let c = (1. - (2. * l - 1.).abs()) * s;
    let h6 = h * 6.;
    let x = c * (1. - (h6 % 2. - 1.).abs());
    let m = l - c / 2.;

    let (r, g, b) = match h6 as u32 {
        0 => (c, x, 0.),
        1 => (x, c, 0.),
        2 => (0., c, x),
        3 => (0., x, c),
        4 => (x, 0., c),
        _ => (c, 0., x),
    };

    vec3(r + m, g + m, b + m)
}
