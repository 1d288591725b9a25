use anyhow::Result;

/// Initialization parameters for the headless GPU context.
///
/// Keep this structure small. Add configuration flags only when a concrete
/// backend requirement exists.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Offscreen target size in pixels.
    pub size: (u32, u32),

    /// Offscreen target format.
    ///
    /// Beam colors are linear; an sRGB target encodes them on write.
    pub format: wgpu::TextureFormat,

    pub power_preference: wgpu::PowerPreference,

    /// Use a software adapter (CI machines without a GPU).
    pub force_fallback_adapter: bool,

    /// Required wgpu features.
    ///
    /// Favor an empty set for portability unless a feature is strictly necessary.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            size: (1280, 720),
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
        }
    }
}

impl GpuInit {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    /// Rejects configurations no adapter can satisfy.
    pub fn validate(&self) -> Result<()> {
        let (w, h) = self.size;
        anyhow::ensure!(w > 0 && h > 0, "offscreen target has zero size ({w}x{h})");
        let max = self.required_limits.max_texture_dimension_2d;
        anyhow::ensure!(
            w <= max && h <= max,
            "offscreen target {w}x{h} exceeds max texture dimension {max}"
        );
        Ok(())
    }
}
