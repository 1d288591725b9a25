use crate::coords::{Rect, Vec2};
use crate::logging::WarnOnce;
use crate::paint::{resolve_palette, Color, PaletteSource};

use super::backend::{BackendState, BlendMode, DrawBackend};
use super::curve;
use super::emit::{EffectSink, EmissionGate};
use super::mesh::{build_strip, StripStyle};
use super::pool::BufferPool;
use super::profile::Profile;
use super::shade;

/// Anchor paths shorter than this are not drawn.
const MIN_BEAM_LENGTH: f32 = 1e-3;

/// Which width multiplier a pass uses.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PassWidth {
    /// `bloom_multiplier · scale`
    Bloom(f32),
    /// Base width.
    Body,
    /// `core_multiplier · scale`
    Core(f32),
}

/// Color source for a pass.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PassTint {
    Palette,
    /// [`Color::HOT`] under the palette's edge envelope.
    Hot,
    /// Pure white under the edge envelope.
    White,
}

/// One row of the pass table.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PassSpec {
    pub label: &'static str,
    pub width: PassWidth,
    pub opacity: f32,
    pub blend: BlendMode,
    pub tint: PassTint,
}

impl PassSpec {
    #[inline]
    pub fn width_multiplier(&self, profile: &Profile) -> f32 {
        match self.width {
            PassWidth::Bloom(s) => profile.bloom() * s,
            PassWidth::Body => 1.0,
            PassWidth::Core(s) => profile.core() * s,
        }
    }
}

/// Outer bloom, mid glow, main body, hot core.
pub static STANDARD_PASSES: [PassSpec; 4] = [
    PassSpec {
        label: "bloom",
        width: PassWidth::Bloom(1.0),
        opacity: 0.15,
        blend: BlendMode::Additive,
        tint: PassTint::Palette,
    },
    PassSpec {
        label: "glow",
        width: PassWidth::Bloom(0.6),
        opacity: 0.35,
        blend: BlendMode::Additive,
        tint: PassTint::Palette,
    },
    PassSpec {
        label: "body",
        width: PassWidth::Body,
        opacity: 0.85,
        blend: BlendMode::Alpha,
        tint: PassTint::Palette,
    },
    PassSpec {
        label: "core",
        width: PassWidth::Core(1.0),
        opacity: 1.0,
        blend: BlendMode::Alpha,
        tint: PassTint::Hot,
    },
];

/// Optional fifth pass drawn when `Profile::white_core` is set.
pub static WHITE_CORE_PASS: PassSpec = PassSpec {
    label: "white core",
    width: PassWidth::Core(0.5),
    opacity: 1.0,
    blend: BlendMode::Alpha,
    tint: PassTint::White,
};

/// What happened to one pass.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum PassOutcome {
    #[default]
    NotRun,
    Drawn,
    /// Geometry would not fit the pool.
    SkippedCapacity,
    /// The pass has zero width or zero opacity.
    SkippedInvisible,
}

/// Per-call summary returned by [`Compositor::render`].
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct RenderReport {
    pub passes: [PassOutcome; 5],
    pub submitted: u32,
    /// Fewer than two anchors, non-finite anchors or a zero-length path.
    pub degenerate: bool,
    /// Outside the cull rectangle.
    pub culled: bool,
    pub particles_emitted: bool,
    pub impact_emitted: bool,
}

impl RenderReport {
    pub fn skipped_capacity(&self) -> usize {
        self.passes.iter().filter(|p| **p == PassOutcome::SkippedCapacity).count()
    }
}

/// Per-frame inputs shared by every beam drawn this frame.
pub struct BeamTarget<'a> {
    pub backend: &'a mut dyn DrawBackend,
    pub effects: &'a mut dyn EffectSink,
    pub palettes: &'a dyn PaletteSource,
    /// Animation phase from `FrameTime::phase`.
    pub phase: f32,
    /// World rectangle to cull against; `None` draws everything.
    pub cull: Option<Rect>,
}

/// A single beam to draw.
#[derive(Debug, Copy, Clone)]
pub struct BeamRequest<'a> {
    /// Path before smoothing: `[start, end]` or a trail, source first.
    pub anchors: &'a [Vec2],
    pub profile: &'a Profile,
    /// 0..1 attenuation of opacity and particle density.
    pub fade: f32,
}

/// Multi-pass beam renderer.
///
/// Resamples the anchors into pooled storage, then for each pass rebuilds the
/// strip at that pass's width and hands it to the backend between a state save
/// and restore. Passes that cannot fit are skipped; the others still draw.
#[derive(Debug, Default)]
pub struct Compositor {
    warned_capacity: WarnOnce,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-arms one-time diagnostics (after a pool capacity change).
    pub fn reset_diagnostics(&mut self) {
        self.warned_capacity.reset();
    }

    pub fn render(
        &mut self,
        pool: &mut BufferPool,
        gate: &mut EmissionGate,
        target: &mut BeamTarget<'_>,
        request: BeamRequest<'_>,
    ) -> RenderReport {
        let mut report = RenderReport::default();
        let BeamRequest { anchors, profile, fade } = request;
        let fade = if fade.is_finite() { fade.clamp(0.0, 1.0) } else { 0.0 };

        if anchors.len() < 2
            || !anchors.iter().all(|a| a.is_finite())
            || curve::path_length(anchors) < MIN_BEAM_LENGTH
        {
            report.degenerate = true;
            return report;
        }

        let start = anchors[0];
        let end = anchors[anchors.len() - 1];
        let colors = resolve_palette(target.palettes, &profile.theme);
        let phase = target.phase;

        let passes = STANDARD_PASSES.iter().chain(profile.white_core.then_some(&WHITE_CORE_PASS));
        let count = profile.segments();

        if !pool.capacity().admits(count) {
            if is_culled(target.cull, anchors, profile) {
                report.culled = true;
                return report;
            }
            for (slot, _) in report.passes.iter_mut().zip(passes) {
                *slot = PassOutcome::SkippedCapacity;
            }
            if self.warned_capacity.first() {
                log::warn!(
                    "beam needs {count} points but the pool holds {}; passes skipped (further occurrences not logged)",
                    pool.capacity().max_points()
                );
            }
        } else {
            let slices = pool.acquire();
            let points = &mut slices.points[..count];
            curve::resample_into(anchors, points);
            let points: &[Vec2] = points;
            // Smoothed path; it can overshoot the anchors.
            if is_culled(target.cull, points, profile) {
                report.culled = true;
                return report;
            }
            let scroll = shade::scroll_offset(profile, phase);

            for (slot, pass) in report.passes.iter_mut().zip(passes) {
                let width_scale = pass.width_multiplier(profile);
                let opacity = pass.opacity * fade;
                if width_scale <= 0.0 || opacity <= 0.0 {
                    *slot = PassOutcome::SkippedInvisible;
                    continue;
                }

                let width = |r: f32| shade::width_at(profile, r, phase) * width_scale;
                let color = |r: f32| pass_color(pass, profile, colors, r, phase, opacity);
                let style = StripStyle { scroll, force_white: pass.tint == PassTint::White };

                let built =
                    build_strip(points, slices.vertices, slices.indices, width, color, style);
                let Some(built) = built else {
                    *slot = PassOutcome::SkippedCapacity;
                    continue;
                };

                let saved = target.backend.save_state();
                target.backend.apply_state(BackendState::for_pass(pass.blend));
                target.backend.submit_triangle_list(
                    &slices.vertices[..built.vertex_count],
                    &slices.indices[..built.index_count],
                    pass.blend,
                );
                target.backend.restore_state(saved);

                log::trace!("beam pass {} drew {} triangles", pass.label, built.triangle_count());
                *slot = PassOutcome::Drawn;
                report.submitted += 1;
            }
        }

        report.particles_emitted =
            gate.along_beam(target.effects, start, end, colors, profile.density() * fade);
        report.impact_emitted =
            gate.impact(target.effects, end, &profile.theme, profile.impact_intensity * fade);

        report
    }
}

/// True when `path`, widened by the beam's widest pass, misses `cull`.
fn is_culled(cull: Option<Rect>, path: &[Vec2], profile: &Profile) -> bool {
    let Some(view) = cull else {
        return false;
    };
    Rect::from_points(path)
        .map(|b| !b.inflate(profile.max_extent() * 0.5).intersects(view))
        .unwrap_or(true)
}

fn pass_color(
    pass: &PassSpec,
    profile: &Profile,
    colors: &[Color],
    r: f32,
    phase: f32,
    opacity: f32,
) -> Color {
    let c = match pass.tint {
        PassTint::Palette => shade::color_at(profile, colors, r, phase),
        // Same edge envelope as the palette, fixed hue.
        PassTint::Hot => shade::color_at(profile, &[Color::HOT], r, phase),
        PassTint::White => shade::color_at(profile, &[Color::WHITE], r, phase),
    };
    let c = c.scaled(opacity);
    match pass.blend {
        BlendMode::Additive => c.without_alpha(),
        BlendMode::Alpha => c,
    }
}
