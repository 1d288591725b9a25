//! Draw backend seam.
//!
//! The compositor never talks to a GPU API directly. It saves the backend
//! state, selects a blend mode, submits an indexed triangle list and restores
//! the saved state, once per pass.

use super::pool::BeamVertex;

/// Blend equation used by a pass.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum BlendMode {
    /// `dst + src`. Colors submitted for additive passes carry zero alpha.
    Additive,
    /// Premultiplied-alpha over.
    #[default]
    Alpha,
}

/// Rasterizer state a pass may touch.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum CullMode {
    #[default]
    None,
    Back,
}

/// Snapshot of backend state, as returned by [`DrawBackend::save_state`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct BackendState {
    pub blend: BlendMode,
    pub cull: CullMode,
    pub depth_test: bool,
}

impl BackendState {
    /// State every beam pass draws with, apart from the blend mode.
    pub const fn for_pass(blend: BlendMode) -> Self {
        Self { blend, cull: CullMode::None, depth_test: false }
    }
}

/// Consumer of pass geometry.
///
/// `vertices` and `indices` are only valid for the duration of the call; the
/// pooled storage behind them is overwritten by the next pass.
pub trait DrawBackend {
    fn save_state(&mut self) -> BackendState;

    fn apply_state(&mut self, state: BackendState);

    /// Draws `indices.len() / 3` triangles.
    fn submit_triangle_list(&mut self, vertices: &[BeamVertex], indices: &[u16], blend: BlendMode);

    fn restore_state(&mut self, state: BackendState);
}

/// One call recorded by [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub blend: BlendMode,
    pub vertices: Vec<BeamVertex>,
    pub indices: Vec<u16>,
}

impl RecordedDraw {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Largest vertex alpha in the draw.
    pub fn max_alpha(&self) -> f32 {
        self.vertices.iter().map(|v| v.color[3]).fold(0.0, f32::max)
    }

    /// Largest distance between the two vertices of any pair.
    pub fn max_width(&self) -> f32 {
        self.vertices
            .chunks_exact(2)
            .map(|p| {
                let dx = p[0].pos[0] - p[1].pos[0];
                let dy = p[0].pos[1] - p[1].pos[1];
                (dx * dx + dy * dy).sqrt()
            })
            .fold(0.0, f32::max)
    }
}

/// Backend that copies every submission, for tests and offline inspection.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub draws: Vec<RecordedDraw>,
    state: BackendState,
    /// Pass-state balance: incremented by `save_state`, decremented by `restore_state`.
    depth: i32,
    /// Set when a submission happens with a state that does not match its blend.
    pub mismatched_submits: usize,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submissions(&self) -> usize {
        self.draws.len()
    }

    pub fn current_state(&self) -> BackendState {
        self.state
    }

    /// True when every saved state has been restored.
    pub fn is_balanced(&self) -> bool {
        self.depth == 0
    }

    pub fn clear(&mut self) {
        self.draws.clear();
    }
}

impl DrawBackend for RecordingBackend {
    fn save_state(&mut self) -> BackendState {
        self.depth += 1;
        self.state
    }

    fn apply_state(&mut self, state: BackendState) {
        self.state = state;
    }

    fn submit_triangle_list(&mut self, vertices: &[BeamVertex], indices: &[u16], blend: BlendMode) {
        if self.state.blend != blend {
            self.mismatched_submits += 1;
        }
        self.draws.push(RecordedDraw {
            blend,
            vertices: vertices.to_vec(),
            indices: indices.to_vec(),
        });
    }

    fn restore_state(&mut self, state: BackendState) {
        self.depth -= 1;
        self.state = state;
    }
}
