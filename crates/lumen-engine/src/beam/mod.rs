//! Procedural beam pipeline.
//!
//! Flow, leaf first:
//! - `curve` smooths an anchor sequence into `Profile::segment_count` points
//! - `shade` evaluates width and color along the beam
//! - `mesh` writes a quad-chain ribbon into the `BufferPool`
//! - `compositor` runs the ribbon through the bloom/glow/body/core passes
//!   and hands each pass to a `DrawBackend`
//! - `registry` keeps beams alive across frames and fades them out

pub mod backend;
pub mod compositor;
pub mod curve;
pub mod emit;
pub mod mesh;
pub mod pool;
pub mod profile;
pub mod registry;
pub mod shade;
pub mod trail;

pub use backend::{BackendState, BlendMode, CullMode, DrawBackend, RecordedDraw, RecordingBackend};
pub use compositor::{BeamRequest, BeamTarget, Compositor, PassOutcome, RenderReport};
pub use emit::{EffectEvent, EffectSink, EmissionConfig, EmissionGate, NoEffects, RecordingEffects};
pub use pool::{capacity_for, BeamVertex, BufferPool, PoolCapacity};
pub use profile::{ColorStyle, Profile, WidthStyle};
pub use registry::{BeamAnchor, BeamId, BeamRegistry, ManagedBeam, RenderAllReport, TickOutcome};
pub use trail::{EntityKey, PositionSource, TrailHistory};
