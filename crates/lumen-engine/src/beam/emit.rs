//! Particle and impact effect hooks.
//!
//! The engine calls out to the VFX layer through [`EffectSink`]; it does not
//! simulate particles. Every call-out is behind an [`EmissionGate`] roll, so
//! most frames emit nothing.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::coords::Vec2;
use crate::paint::Color;

/// VFX layer entry points.
pub trait EffectSink {
    fn emit_along_beam(&mut self, start: Vec2, end: Vec2, palette: &[Color], density: f32);

    fn create_impact_effect(&mut self, position: Vec2, theme: &str, intensity: f32);

    fn create_startup_effect(&mut self, position: Vec2, theme: &str, intensity: f32);
}

/// Sink that drops everything.
#[derive(Debug, Copy, Clone, Default)]
pub struct NoEffects;

impl EffectSink for NoEffects {
    fn emit_along_beam(&mut self, _start: Vec2, _end: Vec2, _palette: &[Color], _density: f32) {}

    fn create_impact_effect(&mut self, _position: Vec2, _theme: &str, _intensity: f32) {}

    fn create_startup_effect(&mut self, _position: Vec2, _theme: &str, _intensity: f32) {}
}

/// One call captured by [`RecordingEffects`].
#[derive(Debug, Clone, PartialEq)]
pub enum EffectEvent {
    AlongBeam { start: Vec2, end: Vec2, colors: usize, density: f32 },
    Impact { position: Vec2, theme: String, intensity: f32 },
    Startup { position: Vec2, theme: String, intensity: f32 },
}

/// Sink that records calls, for tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingEffects {
    pub events: Vec<EffectEvent>,
}

impl EffectSink for RecordingEffects {
    fn emit_along_beam(&mut self, start: Vec2, end: Vec2, palette: &[Color], density: f32) {
        self.events.push(EffectEvent::AlongBeam { start, end, colors: palette.len(), density });
    }

    fn create_impact_effect(&mut self, position: Vec2, theme: &str, intensity: f32) {
        self.events.push(EffectEvent::Impact { position, theme: theme.to_owned(), intensity });
    }

    fn create_startup_effect(&mut self, position: Vec2, theme: &str, intensity: f32) {
        self.events.push(EffectEvent::Startup { position, theme: theme.to_owned(), intensity });
    }
}

/// Emission probabilities. These are presentation tuning, not invariants.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EmissionConfig {
    /// Chance per rendered beam of emitting particles along it.
    pub along_beam_chance: f32,
    /// Chance per rendered beam of an impact effect at its end.
    pub impact_chance: f32,
    /// Chance per spawned managed beam of a startup effect at its start.
    pub startup_chance: f32,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for EmissionConfig {
    fn default() -> Self {
        Self {
            along_beam_chance: 0.25,
            impact_chance: 0.2,
            startup_chance: 1.0,
            seed: None,
        }
    }
}

impl EmissionConfig {
    /// Every gate always open; deterministic tests use this.
    pub fn always() -> Self {
        Self { along_beam_chance: 1.0, impact_chance: 1.0, startup_chance: 1.0, seed: Some(0) }
    }

    /// Every gate closed.
    pub fn never() -> Self {
        Self { along_beam_chance: 0.0, impact_chance: 0.0, startup_chance: 0.0, seed: Some(0) }
    }
}

/// Probability gate in front of an [`EffectSink`].
#[derive(Debug, Clone)]
pub struct EmissionGate {
    config: EmissionConfig,
    rng: SmallRng,
}

impl EmissionGate {
    pub fn new(config: EmissionConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self { config, rng }
    }

    #[inline]
    pub fn config(&self) -> &EmissionConfig {
        &self.config
    }

    fn roll(&mut self, chance: f32) -> bool {
        if !(chance > 0.0) {
            return false;
        }
        if chance >= 1.0 {
            return true;
        }
        self.rng.gen_bool(chance as f64)
    }

    /// Emits particles along `start → end` if `density > 0` and the roll passes.
    pub fn along_beam(
        &mut self,
        sink: &mut dyn EffectSink,
        start: Vec2,
        end: Vec2,
        palette: &[Color],
        density: f32,
    ) -> bool {
        if !(density > 0.0) || !density.is_finite() || !self.roll(self.config.along_beam_chance) {
            return false;
        }
        sink.emit_along_beam(start, end, palette, density);
        true
    }

    pub fn impact(
        &mut self,
        sink: &mut dyn EffectSink,
        position: Vec2,
        theme: &str,
        intensity: f32,
    ) -> bool {
        if !(intensity > 0.0) || !self.roll(self.config.impact_chance) {
            return false;
        }
        sink.create_impact_effect(position, theme, intensity);
        true
    }

    pub fn startup(
        &mut self,
        sink: &mut dyn EffectSink,
        position: Vec2,
        theme: &str,
        intensity: f32,
    ) -> bool {
        if !(intensity > 0.0) || !self.roll(self.config.startup_chance) {
            return false;
        }
        sink.create_startup_effect(position, theme, intensity);
        true
    }
}

impl Default for EmissionGate {
    fn default() -> Self {
        Self::new(EmissionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_gate_never_emits() {
        let mut gate = EmissionGate::new(EmissionConfig::never());
        let mut sink = RecordingEffects::default();
        for _ in 0..100 {
            gate.along_beam(&mut sink, Vec2::zero(), Vec2::X, &[], 1.0);
            gate.impact(&mut sink, Vec2::X, "t", 1.0);
        }
        assert!(sink.events.is_empty());
    }

    #[test]
    fn zero_density_never_emits() {
        let mut gate = EmissionGate::new(EmissionConfig::always());
        let mut sink = RecordingEffects::default();
        assert!(!gate.along_beam(&mut sink, Vec2::zero(), Vec2::X, &[], 0.0));
        assert!(!gate.along_beam(&mut sink, Vec2::zero(), Vec2::X, &[], f32::NAN));
        assert!(sink.events.is_empty());
    }

    #[test]
    fn partial_gate_emits_some_of_the_time() {
        let config = EmissionConfig {
            along_beam_chance: 0.25,
            seed: Some(42),
            ..EmissionConfig::default()
        };
        let mut gate = EmissionGate::new(config);
        let mut sink = NoEffects;
        let hits = (0..2000)
            .filter(|_| gate.along_beam(&mut sink, Vec2::zero(), Vec2::X, &[], 1.0))
            .count();
        assert!(hits > 350 && hits < 650, "hits = {hits}");
    }

    #[test]
    fn seeded_gates_agree() {
        let config =
            EmissionConfig { impact_chance: 0.5, seed: Some(7), ..EmissionConfig::default() };
        let mut a = EmissionGate::new(config);
        let mut b = EmissionGate::new(config);
        let mut sink = NoEffects;
        for _ in 0..64 {
            assert_eq!(
                a.impact(&mut sink, Vec2::zero(), "x", 1.0),
                b.impact(&mut sink, Vec2::zero(), "x", 1.0)
            );
        }
    }
}
