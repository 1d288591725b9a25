use std::time::Duration;

use anyhow::{Context, Result};
use lumen_engine::beam::{
    BeamTarget, ColorStyle, EffectSink, EntityKey, PositionSource, Profile, TrailHistory,
    WidthStyle,
};
use lumen_engine::coords::Vec2;
use lumen_engine::core::{BeamEngine, EngineConfig};
use lumen_engine::device::{GpuInit, HeadlessGpu};
use lumen_engine::logging::{init_logging, LoggingConfig};
use lumen_engine::paint::{Color, Palette, PaletteBook};
use lumen_engine::render::{BeamRenderer, RenderTarget};
use lumen_engine::time::{FrameClock, StepAccumulator};

const FRAME_DT: Duration = Duration::from_micros(16_667);
/// Horizontal camera sway in world units.
const CAMERA_SWAY: f32 = 24.0;
const DEFAULT_FRAMES: u64 = 600;

const COMET: EntityKey = EntityKey(1);
const EMITTER: EntityKey = EntityKey(2);
const RECEIVER: EntityKey = EntityKey(3);

fn main() -> Result<()> {
    println!();
    println!("  ╔════════════════════════════════════════╗");
    println!("  ║          LUMEN BEAM STUDIO v0.1        ║");
    println!("  ║   wgpu renderer  ·  headless preview   ║");
    println!("  ╚════════════════════════════════════════╝");
    println!();

    init_logging(LoggingConfig::default());

    let frames = parse_frames(std::env::args().skip(1))?;
    let gpu = HeadlessGpu::new_blocking(GpuInit::default())?;
    let adapter = gpu.adapter_info();
    log::info!("adapter: {} ({:?}, {:?})", adapter.name, adapter.device_type, adapter.backend);
    let viewport = gpu.viewport();

    let mut engine = BeamEngine::new(EngineConfig::default());
    engine.initialize_pool();

    let palettes = themes();
    let mut renderer = BeamRenderer::new();
    let mut effects = EffectCounter::default();
    let mut clock = FrameClock::new();
    let mut steps = StepAccumulator::default();
    let mut scene = Orbits::new(viewport.width, viewport.height);
    let mut trail = TrailHistory::<24>::new().with_min_spacing(3.0);

    let rail = Profile::new(10.0)
        .with_width_style(WidthStyle::ConstantSoftEnds { fade: 0.08 })
        .with_theme("arc")
        .with_particles(0.6)
        .with_impact(0.8);
    let comet = Profile::new(18.0)
        .with_width_style(WidthStyle::EndTaper)
        .with_color_style(ColorStyle::PaletteGradient)
        .with_segments(48)
        .with_theme("ember");
    let lance = Profile::new(22.0)
        .with_width_style(WidthStyle::from_key("wave"))
        .with_white_core(true)
        .with_theme("void")
        .with_impact(1.0);

    let mut submitted = 0u64;
    let mut triangles = 0u64;

    for _ in 0..frames {
        let time = clock.tick_by(FRAME_DT);
        let view = viewport.with_origin(Vec2::new((time.phase * 0.5).sin() * CAMERA_SWAY, 0.0));

        for step in steps.advance(time.dt) {
            scene.advance(step);
            trail.sample_from(&scene, COMET);
            engine.sync_positions(&scene);
            engine.tick(step);
            if step % 90 == 1 {
                engine.spawn_attached(&mut effects, &scene, EMITTER, RECEIVER, &lance, 75);
            }
        }

        let mut target = BeamTarget {
            backend: &mut renderer,
            effects: &mut effects,
            palettes: &palettes,
            phase: time.phase,
            cull: engine.cull_rect(view),
        };

        let a = Vec2::new(viewport.width * 0.1, viewport.height * 0.85);
        let b = Vec2::new(viewport.width * 0.9, viewport.height * 0.85);
        let rail_report = engine.draw_beam(&mut target, a, b, &rail, 1.0);
        let comet_report = engine.draw_trail(&mut target, trail.anchors(), &comet, 1.0);
        let managed = engine.render_all(&mut target);

        let mut frame = gpu.begin_frame(wgpu::Color::BLACK);
        let stats = renderer.flush(
            &gpu.render_ctx(view),
            &mut RenderTarget::new(&mut frame.encoder, &frame.view),
        );
        gpu.submit(frame);

        submitted += stats.draw_calls as u64;
        triangles += stats.triangles as u64;

        if time.frame_index % 60 == 0 {
            log::info!(
                "frame {:>5}  phase {:>7.3}s  rail {}  comet {}  managed {}/{}  draws {}  tris {}",
                time.frame_index,
                time.phase,
                rail_report.submitted,
                comet_report.submitted,
                managed.drawn,
                engine.registry().len(),
                stats.draw_calls,
                stats.triangles,
            );
        }
    }

    engine.release_pooled_resources();

    println!();
    println!("  frames rendered   {frames}");
    println!("  draw calls        {submitted}");
    println!("  triangles         {triangles}");
    println!("  particle bursts   {}", effects.along_beam);
    println!("  impacts           {}", effects.impacts);
    println!("  startups          {}", effects.startups);
    println!();
    Ok(())
}

/// `--frames N`; anything else is rejected.
fn parse_frames(mut args: impl Iterator<Item = String>) -> Result<u64> {
    let mut frames = DEFAULT_FRAMES;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--frames" => {
                let value = args.next().context("--frames needs a value")?;
                frames = value.parse().with_context(|| format!("invalid frame count {value:?}"))?;
            }
            other => anyhow::bail!("unknown argument {other:?} (usage: lumen-studio [--frames N])"),
        }
    }
    Ok(frames)
}

fn themes() -> PaletteBook {
    let mut book = PaletteBook::new();
    book.insert("arc", Palette::from_hex(&[0x3ad6ff, 0x9b6bff, 0xe9f6ff]))
        .insert("ember", Palette::from_hex(&[0xff3b1f, 0xffa22b, 0xfff1b8]))
        .insert(
            "void",
            Palette::new(vec![
                Color::from_srgb_u8(120, 40, 255, 255),
                Color::from_srgb_u8(20, 0, 60, 255),
            ]),
        );
    book
}

/// Three entities on circular paths, advanced once per simulation step.
struct Orbits {
    center: Vec2,
    radius: f32,
    angle: f32,
}

impl Orbits {
    fn new(width: f32, height: f32) -> Self {
        Self { center: Vec2::new(width * 0.5, height * 0.4), radius: height * 0.3, angle: 0.0 }
    }

    fn advance(&mut self, step: u64) {
        self.angle = step as f32 * 0.035;
    }

    fn at(&self, angle: f32, scale: f32) -> Vec2 {
        self.center + Vec2::new(angle.cos(), angle.sin()) * (self.radius * scale)
    }
}

impl PositionSource for Orbits {
    fn interpolated_center(&self, entity: EntityKey) -> Option<Vec2> {
        match entity {
            COMET => Some(self.at(self.angle * 1.7, 1.0)),
            EMITTER => Some(self.at(-self.angle, 0.35)),
            RECEIVER => Some(self.at(-self.angle + 2.4, 0.9)),
            _ => None,
        }
    }
}

/// Counts effect requests; the studio has no particle system.
#[derive(Debug, Default)]
struct EffectCounter {
    along_beam: u64,
    impacts: u64,
    startups: u64,
}

impl EffectSink for EffectCounter {
    fn emit_along_beam(&mut self, _start: Vec2, _end: Vec2, _palette: &[Color], _density: f32) {
        self.along_beam += 1;
    }

    fn create_impact_effect(&mut self, position: Vec2, theme: &str, _intensity: f32) {
        log::trace!("impact {theme} at ({:.0}, {:.0})", position.x, position.y);
        self.impacts += 1;
    }

    fn create_startup_effect(&mut self, position: Vec2, theme: &str, _intensity: f32) {
        log::debug!("startup {theme} at ({:.0}, {:.0})", position.x, position.y);
        self.startups += 1;
    }
}
