//! Blend states for the two beam pipelines.

use crate::beam::BlendMode;

/// Premultiplied-alpha over.
pub(super) fn premul_alpha_blend() -> wgpu::BlendState {
    let over = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState { color: over, alpha: over }
}

/// `dst + src`. Additive passes submit zero alpha, so destination alpha is kept.
pub(super) fn additive_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::Zero,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

pub(super) fn blend_state(mode: BlendMode) -> wgpu::BlendState {
    match mode {
        BlendMode::Additive => additive_blend(),
        BlendMode::Alpha => premul_alpha_blend(),
    }
}
