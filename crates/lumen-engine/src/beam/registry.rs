//! Beams that outlive a single draw call.
//!
//! A managed beam is drawn every frame by [`BeamRegistry::render_all`] until its
//! age reaches its lifetime. Age advances once per simulation step, no matter
//! how many times the host calls [`BeamRegistry::tick`] for that step.

use slotmap::{new_key_type, SlotMap};

use crate::coords::Vec2;

use super::compositor::{BeamRequest, BeamTarget, Compositor};
use super::emit::EmissionGate;
use super::pool::BufferPool;
use super::profile::Profile;
use super::trail::{EntityKey, PositionSource};

new_key_type! {
    /// Generation-checked handle to a managed beam.
    pub struct BeamId;
}

/// Where a managed beam takes its endpoints from.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum BeamAnchor {
    /// Endpoints only change through `update_position`.
    #[default]
    Fixed,
    /// Endpoints follow two entities on `sync_positions`.
    Entities { from: EntityKey, to: EntityKey },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManagedBeam {
    pub start: Vec2,
    pub end: Vec2,
    pub profile: Profile,
    /// Steps elapsed since creation.
    pub age: u32,
    /// Steps the beam lives for (at least 1).
    pub lifetime: u32,
    pub anchor: BeamAnchor,
}

impl ManagedBeam {
    /// `1 - age / lifetime`, in `0..=1`.
    #[inline]
    pub fn fade(&self) -> f32 {
        let lifetime = self.lifetime.max(1) as f32;
        (1.0 - self.age as f32 / lifetime).clamp(0.0, 1.0)
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.age >= self.lifetime
    }
}

/// Result of one [`BeamRegistry::tick`] call.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TickOutcome {
    /// Ages advanced; `expired` beams were removed.
    Advanced { expired: usize },
    /// This step was already applied.
    AlreadyTicked,
}

/// Totals for one [`BeamRegistry::render_all`] call.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct RenderAllReport {
    /// Beams that reached at least one submission.
    pub drawn: usize,
    pub submissions: u32,
    pub culled: usize,
    pub degenerate: usize,
}

/// Arena of managed beams.
#[derive(Debug, Default)]
pub struct BeamRegistry {
    beams: SlotMap<BeamId, ManagedBeam>,
    /// Last step applied by `tick`.
    last_step: Option<u64>,
}

impl BeamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { beams: SlotMap::with_capacity_and_key(capacity), last_step: None }
    }

    /// Adds an active beam. `lifetime` is clamped to at least one step.
    pub fn create(&mut self, start: Vec2, end: Vec2, profile: &Profile, lifetime: u32) -> BeamId {
        let lifetime = lifetime.max(1);
        let id = self.beams.insert(ManagedBeam {
            start,
            end,
            profile: profile.sanitized(),
            age: 0,
            lifetime,
            anchor: BeamAnchor::Fixed,
        });
        log::debug!("managed beam {id:?} created (lifetime {lifetime})");
        id
    }

    /// Moves a beam. Returns `false` (and does nothing) for a stale id.
    pub fn update_position(&mut self, id: BeamId, start: Vec2, end: Vec2) -> bool {
        match self.beams.get_mut(id) {
            Some(beam) => {
                beam.start = start;
                beam.end = end;
                true
            }
            None => false,
        }
    }

    /// Makes a beam follow two entities on [`sync_positions`](Self::sync_positions).
    pub fn attach(&mut self, id: BeamId, from: EntityKey, to: EntityKey) -> bool {
        match self.beams.get_mut(id) {
            Some(beam) => {
                beam.anchor = BeamAnchor::Entities { from, to };
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: BeamId) -> Option<ManagedBeam> {
        let removed = self.beams.remove(id);
        if removed.is_some() {
            log::debug!("managed beam {id:?} removed");
        }
        removed
    }

    /// Refreshes entity-anchored endpoints. An entity the source no longer
    /// knows leaves that endpoint where it was.
    pub fn sync_positions(&mut self, source: &dyn PositionSource) {
        for beam in self.beams.values_mut() {
            if let BeamAnchor::Entities { from, to } = beam.anchor {
                if let Some(p) = source.interpolated_center(from) {
                    beam.start = p;
                }
                if let Some(p) = source.interpolated_center(to) {
                    beam.end = p;
                }
            }
        }
    }

    /// Ages every beam by one step and removes the expired ones.
    ///
    /// Only a step number greater than the last applied one advances ages;
    /// repeated calls for the same step are no-ops.
    pub fn tick(&mut self, step: u64) -> TickOutcome {
        if self.last_step.is_some_and(|last| step <= last) {
            return TickOutcome::AlreadyTicked;
        }
        self.last_step = Some(step);

        let before = self.beams.len();
        self.beams.retain(|id, beam| {
            beam.age = beam.age.saturating_add(1);
            let keep = !beam.is_expired();
            if !keep {
                log::debug!("managed beam {id:?} expired after {} steps", beam.age);
            }
            keep
        });
        TickOutcome::Advanced { expired: before - self.beams.len() }
    }

    /// Step last applied by [`tick`](Self::tick).
    #[inline]
    pub fn last_step(&self) -> Option<u64> {
        self.last_step
    }

    /// Draws every active beam with its fade applied.
    pub fn render_all(
        &self,
        compositor: &mut Compositor,
        pool: &mut BufferPool,
        gate: &mut EmissionGate,
        target: &mut BeamTarget<'_>,
    ) -> RenderAllReport {
        let mut totals = RenderAllReport::default();
        for beam in self.beams.values().filter(|b| !b.is_expired()) {
            let anchors = [beam.start, beam.end];
            let report = compositor.render(
                pool,
                gate,
                target,
                BeamRequest { anchors: &anchors, profile: &beam.profile, fade: beam.fade() },
            );
            totals.submissions += report.submitted;
            totals.drawn += usize::from(report.submitted > 0);
            totals.culled += usize::from(report.culled);
            totals.degenerate += usize::from(report.degenerate);
        }
        totals
    }

    #[inline]
    pub fn get(&self, id: BeamId) -> Option<&ManagedBeam> {
        self.beams.get(id)
    }

    #[inline]
    pub fn contains(&self, id: BeamId) -> bool {
        self.beams.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BeamId, &ManagedBeam)> {
        self.beams.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.beams.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.beams.is_empty()
    }

    /// Drops every beam and forgets the step marker.
    pub fn clear(&mut self) {
        self.beams.clear();
        self.last_step = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beam::backend::RecordingBackend;
    use crate::beam::emit::{EmissionConfig, NoEffects};
    use crate::beam::profile::WidthStyle;
    use crate::paint::NoPalettes;

    fn profile() -> Profile {
        Profile::new(10.0).with_width_style(WidthStyle::Constant).with_segments(16)
    }

    fn beam(reg: &mut BeamRegistry, lifetime: u32) -> BeamId {
        reg.create(Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0), &profile(), lifetime)
    }

    fn render(reg: &BeamRegistry) -> (RenderAllReport, RecordingBackend) {
        let mut backend = RecordingBackend::new();
        let mut effects = NoEffects;
        let mut target = BeamTarget {
            backend: &mut backend,
            effects: &mut effects,
            palettes: &NoPalettes,
            phase: 0.0,
            cull: None,
        };
        let report = reg.render_all(
            &mut Compositor::new(),
            &mut BufferPool::default(),
            &mut EmissionGate::new(EmissionConfig::never()),
            &mut target,
        );
        (report, backend)
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn expires_after_lifetime_ticks() {
        let mut reg = BeamRegistry::new();
        let id = beam(&mut reg, 30);
        let (_, fresh) = render(&reg);

        for step in 1..=29 {
            reg.tick(step);
        }
        let b = reg.get(id).unwrap();
        assert!((b.fade() - 1.0 / 30.0).abs() < 1e-6);
        let (report, last) = render(&reg);
        assert_eq!(report.drawn, 1);
        let full = fresh.draws[2].max_alpha();
        let faded = last.draws[2].max_alpha();
        assert!((faded - full / 30.0).abs() < 1e-4, "{full} {faded}");

        assert_eq!(reg.tick(30), TickOutcome::Advanced { expired: 1 });
        assert!(!reg.contains(id));
        let (report, backend) = render(&reg);
        assert_eq!(report.drawn, 0);
        assert_eq!(backend.submissions(), 0);
    }

    #[test]
    fn fade_halfway() {
        let mut reg = BeamRegistry::new();
        let id = beam(&mut reg, 10);
        for step in 1..=5 {
            reg.tick(step);
        }
        assert_eq!(reg.get(id).unwrap().age, 5);
        assert_eq!(reg.get(id).unwrap().fade(), 0.5);
        for step in 6..=10 {
            reg.tick(step);
        }
        assert!(reg.is_empty());
    }

    #[test]
    fn tick_is_idempotent_per_step() {
        let mut reg = BeamRegistry::new();
        let id = beam(&mut reg, 10);
        assert_eq!(reg.tick(7), TickOutcome::Advanced { expired: 0 });
        assert_eq!(reg.tick(7), TickOutcome::AlreadyTicked);
        assert_eq!(reg.get(id).unwrap().age, 1);

        // An older step number does not rewind or advance anything.
        assert_eq!(reg.tick(3), TickOutcome::AlreadyTicked);
        assert_eq!(reg.get(id).unwrap().age, 1);
        assert_eq!(reg.last_step(), Some(7));
    }

    #[test]
    fn zero_lifetime_is_clamped() {
        let mut reg = BeamRegistry::new();
        let id = beam(&mut reg, 0);
        assert_eq!(reg.get(id).unwrap().lifetime, 1);
        assert_eq!(render(&reg).0.drawn, 1);
        reg.tick(1);
        assert!(!reg.contains(id));
    }

    #[test]
    fn profile_is_sanitized_on_create() {
        let mut reg = BeamRegistry::new();
        let id = reg.create(Vec2::zero(), Vec2::X, &Profile::new(f32::NAN).with_segments(0), 5);
        let p = &reg.get(id).unwrap().profile;
        assert_eq!(p.base_width, 0.0);
        assert_eq!(p.segment_count, 2);
    }

    // ── handles ───────────────────────────────────────────────────────────

    #[test]
    fn stale_handles_are_noops() {
        let mut reg = BeamRegistry::new();
        let id = beam(&mut reg, 5);
        assert!(reg.remove(id).is_some());
        assert!(reg.remove(id).is_none());
        assert!(!reg.update_position(id, Vec2::X, Vec2::X));
        assert!(!reg.attach(id, EntityKey(1), EntityKey(2)));

        // A new beam reusing the slot does not answer to the old handle.
        let fresh = beam(&mut reg, 5);
        assert_ne!(fresh, id);
        assert!(reg.get(id).is_none());
        assert!(reg.get(fresh).is_some());
    }

    #[test]
    fn update_position_moves_beam() {
        let mut reg = BeamRegistry::new();
        let id = beam(&mut reg, 5);
        assert!(reg.update_position(id, Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0)));
        let b = reg.get(id).unwrap();
        assert_eq!((b.start, b.end), (Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0)));
    }

    // ── entity anchors ────────────────────────────────────────────────────

    struct Positions(Vec<(EntityKey, Vec2)>);

    impl PositionSource for Positions {
        fn interpolated_center(&self, entity: EntityKey) -> Option<Vec2> {
            self.0.iter().find(|(k, _)| *k == entity).map(|(_, p)| *p)
        }
    }

    #[test]
    fn attached_beams_follow_entities() {
        let mut reg = BeamRegistry::new();
        let id = beam(&mut reg, 5);
        let fixed = beam(&mut reg, 5);
        reg.attach(id, EntityKey(1), EntityKey(2));

        let source = Positions(vec![
            (EntityKey(1), Vec2::new(5.0, 5.0)),
            (EntityKey(2), Vec2::new(50.0, 9.0)),
        ]);
        reg.sync_positions(&source);
        assert_eq!(reg.get(id).unwrap().start, Vec2::new(5.0, 5.0));
        assert_eq!(reg.get(id).unwrap().end, Vec2::new(50.0, 9.0));
        assert_eq!(reg.get(fixed).unwrap().end, Vec2::new(100.0, 0.0));
    }

    #[test]
    fn missing_entity_keeps_last_endpoint() {
        let mut reg = BeamRegistry::new();
        let id = beam(&mut reg, 5);
        reg.attach(id, EntityKey(1), EntityKey(2));
        reg.sync_positions(&Positions(vec![(EntityKey(2), Vec2::new(7.0, 7.0))]));
        let b = reg.get(id).unwrap();
        assert_eq!(b.start, Vec2::new(0.0, 0.0));
        assert_eq!(b.end, Vec2::new(7.0, 7.0));
    }

    // ── rendering ─────────────────────────────────────────────────────────

    #[test]
    fn render_all_applies_fade() {
        let mut reg = BeamRegistry::new();
        beam(&mut reg, 4);
        let (_, fresh) = render(&reg);
        reg.tick(1);
        reg.tick(2);
        let (report, faded) = render(&reg);
        assert_eq!(report.submissions, 4);
        let a = fresh.draws[2].max_alpha();
        let b = faded.draws[2].max_alpha();
        assert!((b - a * 0.5).abs() < 1e-4, "{a} {b}");
    }

    #[test]
    fn degenerate_managed_beam_is_counted_not_drawn() {
        let mut reg = BeamRegistry::new();
        reg.create(Vec2::new(5.0, 5.0), Vec2::new(5.0, 5.0), &profile(), 5);
        let (report, backend) = render(&reg);
        assert_eq!(report.degenerate, 1);
        assert_eq!(backend.submissions(), 0);
    }
}
