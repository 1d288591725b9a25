use crate::beam::{
    BeamId, BeamRegistry, BeamRequest, BeamTarget, BufferPool, Compositor, EffectSink,
    EmissionConfig, EmissionGate, EntityKey, ManagedBeam, PoolCapacity, PositionSource, Profile,
    RenderAllReport, RenderReport, TickOutcome,
};
use crate::coords::{Rect, Vec2, Viewport};

/// Intensity handed to startup effects when a managed beam is spawned.
const STARTUP_INTENSITY: f32 = 1.0;

/// Engine construction parameters.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub pool: PoolCapacity,
    pub emission: EmissionConfig,
    /// Managed beam slots reserved up front.
    pub registry_capacity: usize,
    /// World units added around the viewport before culling; `None` disables culling.
    pub cull_margin: Option<f32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pool: PoolCapacity::default(),
            emission: EmissionConfig::default(),
            registry_capacity: 64,
            cull_margin: Some(64.0),
        }
    }
}

/// Beam subsystem context.
///
/// Owns the one buffer pool every draw shares, the compositor, the managed
/// beam registry and the emission gate. The host loop threads it through its
/// frame: `sync_positions` and `tick` on simulation steps, then the immediate
/// draws and `render_all` while rendering.
#[derive(Debug)]
pub struct BeamEngine {
    config: EngineConfig,
    pool: BufferPool,
    compositor: Compositor,
    registry: BeamRegistry,
    gate: EmissionGate,
}

impl BeamEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            pool: BufferPool::new(config.pool),
            compositor: Compositor::new(),
            registry: BeamRegistry::with_capacity(config.registry_capacity),
            gate: EmissionGate::new(config.emission),
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    /// Allocates the pooled geometry now instead of on the first draw.
    pub fn initialize_pool(&mut self) {
        self.pool.initialize();
    }

    /// Frees the pooled geometry; the next draw allocates it again.
    /// Managed beams are kept.
    pub fn release_pooled_resources(&mut self) {
        self.pool.release();
        self.compositor.reset_diagnostics();
    }

    #[inline]
    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    /// Culling rectangle for `viewport`, or `None` when culling is off.
    pub fn cull_rect(&self, viewport: Viewport) -> Option<Rect> {
        let margin = self.config.cull_margin?;
        viewport.is_valid().then(|| viewport.world_rect().inflate(margin.max(0.0)))
    }

    // ── immediate beams ───────────────────────────────────────────────────

    /// Draws a straight beam for this frame only.
    pub fn draw_beam(
        &mut self,
        target: &mut BeamTarget<'_>,
        start: Vec2,
        end: Vec2,
        profile: &Profile,
        fade: f32,
    ) -> RenderReport {
        self.draw_trail(target, &[start, end], profile, fade)
    }

    /// Draws a beam through `anchors` (source first) for this frame only.
    pub fn draw_trail(
        &mut self,
        target: &mut BeamTarget<'_>,
        anchors: &[Vec2],
        profile: &Profile,
        fade: f32,
    ) -> RenderReport {
        self.compositor.render(
            &mut self.pool,
            &mut self.gate,
            target,
            BeamRequest { anchors, profile, fade },
        )
    }

    // ── managed beams ─────────────────────────────────────────────────────

    /// Creates a managed beam and fires its (gated) startup effect.
    pub fn spawn(
        &mut self,
        effects: &mut dyn EffectSink,
        start: Vec2,
        end: Vec2,
        profile: &Profile,
        lifetime: u32,
    ) -> BeamId {
        let id = self.registry.create(start, end, profile, lifetime);
        self.gate.startup(effects, start, &profile.theme, STARTUP_INTENSITY);
        id
    }

    /// Creates a managed beam that follows two entities.
    pub fn spawn_attached(
        &mut self,
        effects: &mut dyn EffectSink,
        source: &dyn PositionSource,
        from: EntityKey,
        to: EntityKey,
        profile: &Profile,
        lifetime: u32,
    ) -> Option<BeamId> {
        let start = source.interpolated_center(from)?;
        let end = source.interpolated_center(to)?;
        let id = self.spawn(effects, start, end, profile, lifetime);
        self.registry.attach(id, from, to);
        Some(id)
    }

    pub fn update_position(&mut self, id: BeamId, start: Vec2, end: Vec2) -> bool {
        self.registry.update_position(id, start, end)
    }

    pub fn remove(&mut self, id: BeamId) -> Option<ManagedBeam> {
        self.registry.remove(id)
    }

    pub fn sync_positions(&mut self, source: &dyn PositionSource) {
        self.registry.sync_positions(source);
    }

    /// Ages managed beams for simulation step `step`.
    pub fn tick(&mut self, step: u64) -> TickOutcome {
        self.registry.tick(step)
    }

    /// Draws every managed beam with its fade.
    pub fn render_all(&mut self, target: &mut BeamTarget<'_>) -> RenderAllReport {
        self.registry.render_all(&mut self.compositor, &mut self.pool, &mut self.gate, target)
    }

    #[inline]
    pub fn registry(&self) -> &BeamRegistry {
        &self.registry
    }
}

impl Default for BeamEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beam::{
        curve, BlendMode, EffectEvent, NoEffects, RecordingBackend, RecordingEffects, WidthStyle,
    };
    use crate::paint::{NoPalettes, PaletteSource};

    fn quiet() -> EngineConfig {
        EngineConfig { emission: EmissionConfig::never(), ..EngineConfig::default() }
    }

    fn profile() -> Profile {
        Profile::new(14.0).with_width_style(WidthStyle::Constant).with_segments(20)
    }

    fn target<'a>(
        backend: &'a mut RecordingBackend,
        effects: &'a mut dyn EffectSink,
        palettes: &'a dyn PaletteSource,
    ) -> BeamTarget<'a> {
        BeamTarget { backend, effects, palettes, phase: 1.25, cull: None }
    }

    // ── scenarios ─────────────────────────────────────────────────────────

    #[test]
    fn straight_beam_resamples_evenly() {
        let pts = curve::resample(&[Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0)], 4);
        let expected = [0.0, 33.3, 66.6, 100.0];
        for (p, x) in pts.iter().zip(expected) {
            assert!((p.x - x).abs() <= 0.5, "{pts:?}");
            assert_eq!(p.y, 0.0);
        }
    }

    #[test]
    fn degenerate_beam_submits_nothing() {
        let mut engine = BeamEngine::new(quiet());
        let mut backend = RecordingBackend::new();
        let mut effects = NoEffects;
        let mut t = target(&mut backend, &mut effects, &NoPalettes);
        let p = Vec2::new(5.0, 5.0);
        let report = engine.draw_beam(&mut t, p, p, &profile(), 1.0);
        assert!(report.degenerate);
        assert_eq!(backend.submissions(), 0);
    }

    #[test]
    fn capacity_overflow_skips_all_passes() {
        let mut engine = BeamEngine::new(EngineConfig { pool: PoolCapacity::new(128), ..quiet() });
        let mut backend = RecordingBackend::new();
        let mut effects = NoEffects;
        let mut t = target(&mut backend, &mut effects, &NoPalettes);
        let huge = profile().with_segments(1000);
        let report = engine.draw_beam(&mut t, Vec2::zero(), Vec2::new(300.0, 0.0), &huge, 1.0);
        assert_eq!(report.skipped_capacity(), 4);
        assert_eq!(report.submitted, 0);
        assert_eq!(backend.submissions(), 0);
    }

    #[test]
    fn fade_out_over_lifetime() {
        let mut engine = BeamEngine::new(quiet());
        let id = engine.spawn(&mut NoEffects, Vec2::zero(), Vec2::new(80.0, 0.0), &profile(), 10);
        for step in 1..=5 {
            engine.tick(step);
        }
        assert_eq!(engine.registry().get(id).map(ManagedBeam::fade), Some(0.5));
        for step in 6..=10 {
            engine.tick(step);
        }
        assert!(engine.registry().get(id).is_none());
    }

    #[test]
    fn repeated_tick_within_step_counts_once() {
        let mut engine = BeamEngine::new(quiet());
        let id = engine.spawn(&mut NoEffects, Vec2::zero(), Vec2::X, &profile(), 10);
        engine.tick(1);
        engine.tick(1);
        assert_eq!(engine.registry().get(id).map(|b| b.age), Some(1));
    }

    // ── frame flow ────────────────────────────────────────────────────────

    #[test]
    fn immediate_and_managed_beams_share_the_pool() {
        let mut engine = BeamEngine::new(quiet());
        engine.spawn(&mut NoEffects, Vec2::zero(), Vec2::new(50.0, 50.0), &profile(), 3);

        let mut backend = RecordingBackend::new();
        let mut effects = NoEffects;
        let mut t = target(&mut backend, &mut effects, &NoPalettes);
        engine.draw_beam(&mut t, Vec2::zero(), Vec2::new(100.0, 0.0), &profile(), 1.0);
        let all = engine.render_all(&mut t);

        assert_eq!(all.drawn, 1);
        assert_eq!(backend.submissions(), 8);
        assert!(backend.is_balanced());
        assert_eq!(backend.draws[4].blend, BlendMode::Additive);
        assert!(engine.pool().is_initialized());
    }

    #[test]
    fn release_then_draw_reallocates() {
        let mut engine = BeamEngine::new(quiet());
        engine.initialize_pool();
        assert!(engine.pool().is_initialized());
        engine.release_pooled_resources();
        assert!(!engine.pool().is_initialized());

        let mut backend = RecordingBackend::new();
        let mut effects = NoEffects;
        let mut t = target(&mut backend, &mut effects, &NoPalettes);
        let report = engine.draw_beam(&mut t, Vec2::zero(), Vec2::new(10.0, 10.0), &profile(), 1.0);
        assert_eq!(report.submitted, 4);
        assert!(engine.pool().is_initialized());
    }

    #[test]
    fn spawn_fires_startup_effect() {
        let config =
            EngineConfig { emission: EmissionConfig::always(), ..EngineConfig::default() };
        let mut engine = BeamEngine::new(config);
        let mut effects = RecordingEffects::default();
        let start = Vec2::new(3.0, 4.0);
        engine.spawn(&mut effects, start, Vec2::new(90.0, 4.0), &profile().with_theme("plasma"), 5);
        assert_eq!(
            effects.events,
            [EffectEvent::Startup { position: start, theme: "plasma".into(), intensity: 1.0 }]
        );
    }

    struct Entities;

    impl PositionSource for Entities {
        fn interpolated_center(&self, entity: EntityKey) -> Option<Vec2> {
            match entity.0 {
                1 => Some(Vec2::new(10.0, 10.0)),
                2 => Some(Vec2::new(40.0, 70.0)),
                _ => None,
            }
        }
    }

    #[test]
    fn spawn_attached_needs_both_entities() {
        let mut engine = BeamEngine::new(quiet());
        assert!(engine
            .spawn_attached(&mut NoEffects, &Entities, EntityKey(1), EntityKey(9), &profile(), 5)
            .is_none());
        let id = engine
            .spawn_attached(&mut NoEffects, &Entities, EntityKey(1), EntityKey(2), &profile(), 5)
            .unwrap();
        engine.update_position(id, Vec2::zero(), Vec2::zero());
        engine.sync_positions(&Entities);
        let b = engine.registry().get(id).unwrap();
        assert_eq!((b.start, b.end), (Vec2::new(10.0, 10.0), Vec2::new(40.0, 70.0)));
    }

    #[test]
    fn cull_rect_follows_config() {
        let vp = Viewport::new(100.0, 50.0);
        let engine = BeamEngine::new(EngineConfig { cull_margin: Some(10.0), ..quiet() });
        assert_eq!(engine.cull_rect(vp), Some(Rect::new(-10.0, -10.0, 120.0, 70.0)));
        assert_eq!(engine.cull_rect(Viewport::new(0.0, 10.0)), None);

        let off = BeamEngine::new(EngineConfig { cull_margin: None, ..quiet() });
        assert_eq!(off.cull_rect(vp), None);
    }
}
