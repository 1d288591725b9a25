//! Declarative beam appearance.
//!
//! A [`Profile`] describes how a beam looks independent of where it is. Per-weapon
//! customization is profile construction; the render pipeline is shared.

/// Width envelope along the beam. Style parameters live in the variant.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum WidthStyle {
    /// Same width everywhere.
    Constant,
    /// `sin(ratio·π)`: zero at both ends, widest in the middle.
    QuadraticBump,
    /// Thick at the source, thinning to 8% at the tip.
    SourceTaper,
    /// Thin at the source, widening to full width at the tip.
    EndTaper,
    /// Travelling oscillation under the bump envelope.
    WaveWidth { amplitude: f32, frequency: f32, speed: f32 },
    /// Whole-beam breathing on top of the bump envelope.
    PulsingWidth { speed: f32, amount: f32 },
    /// Full width except for linear ramps over `fade` of each end.
    ConstantSoftEnds { fade: f32 },
    /// Dashes: each of `segments` pieces narrows to `gap_width` over its last `gap` fraction.
    Segmented { segments: u32, gap: f32, gap_width: f32 },
    /// Gaussian swell centred on `point` (0..1) over a thin base.
    Flare { point: f32, sharpness: f32 },
    /// Two swells at one and three quarters.
    DoublePeak,
    /// `count` evenly spaced swells under the bump envelope.
    MultiBulge { count: u32, depth: f32 },
    /// Twisting flat ribbon: width follows `|cos|` of a travelling angle.
    Ribbon { twists: f32, speed: f32 },
    /// Narrow, nearly constant line with soft ends.
    ThinNeedle,
}

impl WidthStyle {
    pub const DEFAULT: WidthStyle = WidthStyle::QuadraticBump;

    /// Parses a style key with default parameters.
    ///
    /// Unknown keys fall back to [`WidthStyle::QuadraticBump`].
    pub fn from_key(key: &str) -> WidthStyle {
        Self::parse(key).unwrap_or_else(|| {
            log::debug!("unknown width style {key:?}; using quadratic bump");
            Self::DEFAULT
        })
    }

    /// Strict variant of [`from_key`](Self::from_key).
    pub fn parse(key: &str) -> Option<WidthStyle> {
        let style = match key.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "constant" => WidthStyle::Constant,
            "quadratic_bump" | "bump" => WidthStyle::QuadraticBump,
            "source_taper" => WidthStyle::SourceTaper,
            "end_taper" => WidthStyle::EndTaper,
            "wave" | "wave_width" => {
                WidthStyle::WaveWidth { amplitude: 0.25, frequency: 3.0, speed: 6.0 }
            }
            "pulse" | "pulsing_width" => WidthStyle::PulsingWidth { speed: 8.0, amount: 0.2 },
            "constant_soft_ends" | "soft_ends" => WidthStyle::ConstantSoftEnds { fade: 0.1 },
            "segmented" => WidthStyle::Segmented { segments: 6, gap: 0.3, gap_width: 0.2 },
            "flare" => WidthStyle::Flare { point: 0.85, sharpness: 1.0 },
            "double_peak" => WidthStyle::DoublePeak,
            "multi_bulge" => WidthStyle::MultiBulge { count: 4, depth: 0.4 },
            "ribbon" => WidthStyle::Ribbon { twists: 2.0, speed: 4.0 },
            "thin_needle" | "needle" => WidthStyle::ThinNeedle,
            _ => return None,
        };
        Some(style)
    }
}

impl Default for WidthStyle {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// How palette colors are laid along the beam.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum ColorStyle {
    /// Palette scrolls along the beam over time.
    #[default]
    PaletteScroll,
    /// Palette stretched once from source to tip, no scrolling.
    PaletteGradient,
    /// First palette color only.
    Solid,
}

impl ColorStyle {
    /// Parses a style key; unknown keys fall back to [`ColorStyle::PaletteScroll`].
    pub fn from_key(key: &str) -> ColorStyle {
        match key.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "palette_scroll" | "scroll" => ColorStyle::PaletteScroll,
            "palette_gradient" | "gradient" => ColorStyle::PaletteGradient,
            "solid" => ColorStyle::Solid,
            other => {
                log::debug!("unknown color style {other:?}; using palette scroll");
                ColorStyle::PaletteScroll
            }
        }
    }
}

/// Visual description of a beam.
///
/// Construct with [`Profile::new`] and the `with_*` builders. All evaluation
/// goes through [`sanitized`](Self::sanitized) values, so a malformed profile
/// renders as an invisible beam instead of failing.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub base_width: f32,
    pub width_style: WidthStyle,
    pub color_style: ColorStyle,
    /// Width scale for the outer bloom pass (the mid glow uses 60% of it).
    pub bloom_multiplier: f32,
    /// Width scale for the hot core pass.
    pub core_multiplier: f32,
    /// Speed of the U coordinate scroll.
    pub texture_scroll_speed: f32,
    /// Speed of the palette scroll (`ColorStyle::PaletteScroll`).
    pub color_scroll: f32,
    /// Amplitude of the multiplicative color shimmer.
    pub shimmer: f32,
    /// Number of smoothed samples along the beam (at least 2).
    pub segment_count: usize,
    /// Adds a pure white pass inside the hot core.
    pub white_core: bool,
    pub emit_particles: bool,
    pub particle_density: f32,
    /// Intensity handed to impact effects at the beam end (0 disables them).
    pub impact_intensity: f32,
    /// Opaque palette key resolved through a `PaletteSource`.
    pub theme: String,
}

impl Profile {
    pub fn new(base_width: f32) -> Self {
        Self {
            base_width,
            width_style: WidthStyle::DEFAULT,
            color_style: ColorStyle::PaletteScroll,
            bloom_multiplier: 2.5,
            core_multiplier: 0.35,
            texture_scroll_speed: 1.5,
            color_scroll: 0.4,
            shimmer: 0.08,
            segment_count: 32,
            white_core: false,
            emit_particles: false,
            particle_density: 0.0,
            impact_intensity: 0.0,
            theme: String::new(),
        }
    }

    pub fn with_width_style(mut self, style: WidthStyle) -> Self {
        self.width_style = style;
        self
    }

    pub fn with_color_style(mut self, style: ColorStyle) -> Self {
        self.color_style = style;
        self
    }

    pub fn with_multipliers(mut self, bloom: f32, core: f32) -> Self {
        self.bloom_multiplier = bloom;
        self.core_multiplier = core;
        self
    }

    pub fn with_segments(mut self, segment_count: usize) -> Self {
        self.segment_count = segment_count;
        self
    }

    pub fn with_scroll(mut self, texture: f32, color: f32) -> Self {
        self.texture_scroll_speed = texture;
        self.color_scroll = color;
        self
    }

    pub fn with_white_core(mut self, enabled: bool) -> Self {
        self.white_core = enabled;
        self
    }

    pub fn with_particles(mut self, density: f32) -> Self {
        self.emit_particles = density > 0.0;
        self.particle_density = density;
        self
    }

    pub fn with_impact(mut self, intensity: f32) -> Self {
        self.impact_intensity = intensity;
        self
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    /// Sample count actually used: never below 2.
    #[inline]
    pub fn segments(&self) -> usize {
        self.segment_count.max(2)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        non_negative(self.base_width)
    }

    #[inline]
    pub fn bloom(&self) -> f32 {
        non_negative(self.bloom_multiplier)
    }

    #[inline]
    pub fn core(&self) -> f32 {
        non_negative(self.core_multiplier)
    }

    #[inline]
    pub fn density(&self) -> f32 {
        if self.emit_particles { non_negative(self.particle_density) } else { 0.0 }
    }

    /// Copy with every numeric field forced into its valid range.
    pub fn sanitized(&self) -> Profile {
        Profile {
            base_width: self.width(),
            bloom_multiplier: self.bloom(),
            core_multiplier: self.core(),
            segment_count: self.segments(),
            particle_density: self.density(),
            texture_scroll_speed: finite_or_zero(self.texture_scroll_speed),
            color_scroll: finite_or_zero(self.color_scroll),
            shimmer: non_negative(self.shimmer),
            impact_intensity: non_negative(self.impact_intensity),
            ..self.clone()
        }
    }

    /// Widest extent any pass can reach, for culling.
    pub fn max_extent(&self) -> f32 {
        self.width() * self.bloom().max(self.core()).max(1.0) * WAVE_HEADROOM
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new(16.0)
    }
}

/// Room for style envelopes that exceed base width (waves, pulses).
const WAVE_HEADROOM: f32 = 1.5;

#[inline]
pub(crate) fn non_negative(v: f32) -> f32 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}

#[inline]
fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() { v } else { 0.0 }
}
