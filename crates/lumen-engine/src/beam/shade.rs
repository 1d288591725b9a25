//! Width and color evaluation.
//!
//! Pure functions of `(ratio, profile, phase)`. `ratio` is the normalized
//! position along the beam (0 = source, 1 = tip) and `phase` is the frame's
//! wrapped animation time in seconds. Results are always finite: width is
//! non-negative and colors are premultiplied and clamped.

use std::f32::consts::{PI, TAU};

use crate::paint::{palette, Color, SpreadMode};

use super::profile::{non_negative, ColorStyle, Profile, WidthStyle};

/// Tip width of the taper styles, as a fraction of base width.
const TAPER_TIP: f32 = 0.08;

/// Shimmer angular speed (radians per second) and spatial frequency.
const SHIMMER_SPEED: f32 = 9.0;
const SHIMMER_FREQ: f32 = 14.0;

#[inline]
fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
fn bump(ratio: f32) -> f32 {
    (ratio * PI).sin()
}

#[inline]
fn clamp_ratio(ratio: f32) -> f32 {
    if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 }
}

/// Beam width at `ratio` for the body pass (pass multipliers are applied by the compositor).
pub fn width_at(profile: &Profile, ratio: f32, phase: f32) -> f32 {
    let w = profile.width();
    let r = clamp_ratio(ratio);
    let phase = if phase.is_finite() { phase } else { 0.0 };

    let width = match profile.width_style {
        WidthStyle::Constant => w,
        WidthStyle::QuadraticBump => w * bump(r),
        WidthStyle::SourceTaper => lerp(w, w * TAPER_TIP, smoothstep(r)),
        WidthStyle::EndTaper => lerp(w * TAPER_TIP, w, smoothstep(r)),
        WidthStyle::WaveWidth { amplitude, frequency, speed } => {
            let wave = (r * frequency * TAU + phase * speed).sin();
            (w + wave * w * amplitude) * bump(r)
        }
        WidthStyle::PulsingWidth { speed, amount } => {
            let pulse = 1.0 + (phase * speed + r * PI).sin() * amount;
            w * bump(r) * pulse
        }
        WidthStyle::ConstantSoftEnds { fade } => {
            let fade = fade.clamp(0.0, 0.5);
            if fade <= f32::EPSILON {
                w
            } else {
                let edge = r.min(1.0 - r);
                w * (edge / fade).min(1.0)
            }
        }
        WidthStyle::Segmented { segments, gap, gap_width } => {
            let segments = segments.max(1) as f32;
            let local = (r * segments).fract();
            let gap = gap.clamp(0.0, 1.0);
            let scale = if local > 1.0 - gap { gap_width.clamp(0.0, 1.0) } else { 1.0 };
            w * bump(r) * scale
        }
        WidthStyle::Flare { point, sharpness } => {
            let d = (r - point.clamp(0.0, 1.0)) / 0.15;
            let swell = (-d * d * sharpness.max(0.0)).exp();
            w * (0.3 + 0.7 * swell) * bump(r).max(0.0).sqrt()
        }
        WidthStyle::DoublePeak => w * (0.3 * bump(r) + 0.7 * (r * TAU).sin().abs()),
        WidthStyle::MultiBulge { count, depth } => {
            let depth = depth.clamp(0.0, 1.0);
            let bulges = (r * count.max(1) as f32 * PI).sin().abs();
            w * bump(r) * (1.0 - depth + depth * bulges)
        }
        WidthStyle::Ribbon { twists, speed } => {
            let twist = (r * twists * TAU - phase * speed).cos().abs();
            w * bump(r) * twist.max(0.15)
        }
        WidthStyle::ThinNeedle => w * 0.35 * bump(r).max(0.0).sqrt(),
    };

    non_negative(width)
}

/// Beam color at `ratio`.
///
/// The palette is sampled according to the profile's color style, faded to
/// zero towards both ends by `sin(ratio·π)` and modulated by a small shimmer.
/// An empty palette samples as white.
pub fn color_at(profile: &Profile, colors: &[Color], ratio: f32, phase: f32) -> Color {
    let r = clamp_ratio(ratio);
    let phase = if phase.is_finite() { phase } else { 0.0 };

    let base = match profile.color_style {
        ColorStyle::PaletteScroll => {
            let scrolled = r * 0.5 + phase * profile.color_scroll;
            palette::sample(colors, scrolled, SpreadMode::Repeat)
        }
        ColorStyle::PaletteGradient => palette::sample(colors, r, SpreadMode::Pad),
        ColorStyle::Solid => colors.first().copied().unwrap_or(Color::WHITE),
    };

    let envelope = bump(r);
    let wobble = (phase * SHIMMER_SPEED + r * SHIMMER_FREQ).sin();
    let shimmer = 1.0 + wobble * non_negative(profile.shimmer);

    let c = base.scaled(envelope * shimmer);
    if c.is_finite() { c.clamped() } else { Color::transparent() }
}

/// U coordinate offset for the frame.
#[inline]
pub fn scroll_offset(profile: &Profile, phase: f32) -> f32 {
    let s = phase * profile.texture_scroll_speed;
    if s.is_finite() { s.rem_euclid(1.0) } else { 0.0 }
}
