use std::collections::HashMap;

use super::Color;

/// Sampling behavior outside the [0, 1] range.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SpreadMode {
    /// Clamp to edge colors.
    Pad,
    /// Wrap around (`t mod 1`).
    Repeat,
}

impl SpreadMode {
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        if !t.is_finite() {
            return 0.0;
        }
        match self {
            SpreadMode::Pad => t.clamp(0.0, 1.0),
            SpreadMode::Repeat => t.rem_euclid(1.0),
        }
    }
}

/// Neutral two-color palette substituted when a theme key has no palette.
pub const DEFAULT_PALETTE: [Color; 2] = [
    Color::from_premul(1.0, 1.0, 1.0, 1.0),
    Color::from_premul(0.78, 0.84, 0.95, 1.0),
];

/// Samples an ordered palette whose colors are evenly spaced over [0, 1].
///
/// An empty slice yields white; a single color is returned as-is.
pub fn sample(colors: &[Color], t: f32, spread: SpreadMode) -> Color {
    match colors {
        [] => Color::WHITE,
        [only] => *only,
        _ => {
            let t = spread.apply(t);
            let scaled = t * (colors.len() - 1) as f32;
            let i = (scaled.floor() as usize).min(colors.len() - 2);
            colors[i].lerp(colors[i + 1], scaled - i as f32)
        }
    }
}

/// Ordered list of premultiplied colors a beam cycles through.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    pub fn new(colors: Vec<Color>) -> Self {
        Self { colors }
    }

    /// Builds a palette from straight-alpha sRGB hex triples (`0xRRGGBB`).
    pub fn from_hex(hex: &[u32]) -> Self {
        let colors = hex
            .iter()
            .map(|&h| Color::from_srgb_u8((h >> 16) as u8, (h >> 8) as u8, h as u8, 255))
            .collect();
        Self { colors }
    }

    #[inline]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Palette lookup by theme key.
///
/// Theme keys are opaque to the engine. Returning `None` (or an empty slice)
/// makes the engine fall back to [`DEFAULT_PALETTE`].
pub trait PaletteSource {
    fn palette(&self, theme_key: &str) -> Option<&[Color]>;
}

/// Resolves a theme key, substituting the default palette when missing or empty.
#[inline]
pub fn resolve<'a>(source: &'a dyn PaletteSource, theme_key: &str) -> &'a [Color] {
    match source.palette(theme_key) {
        Some(colors) if !colors.is_empty() => colors,
        _ => &DEFAULT_PALETTE,
    }
}

/// Map-backed [`PaletteSource`].
#[derive(Debug, Clone, Default)]
pub struct PaletteBook {
    entries: HashMap<String, Palette>,
}

impl PaletteBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, theme_key: impl Into<String>, palette: Palette) -> &mut Self {
        self.entries.insert(theme_key.into(), palette);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PaletteSource for PaletteBook {
    fn palette(&self, theme_key: &str) -> Option<&[Color]> {
        self.entries.get(theme_key).map(Palette::colors)
    }
}

/// Source with no themes; every lookup resolves to the default palette.
#[derive(Debug, Copy, Clone, Default)]
pub struct NoPalettes;

impl PaletteSource for NoPalettes {
    fn palette(&self, _theme_key: &str) -> Option<&[Color]> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> Color {
        Color::from_premul(1.0, 0.0, 0.0, 1.0)
    }

    fn blue() -> Color {
        Color::from_premul(0.0, 0.0, 1.0, 1.0)
    }

    // ── spread ────────────────────────────────────────────────────────────

    #[test]
    fn repeat_wraps_negative() {
        assert!((SpreadMode::Repeat.apply(-0.25) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn non_finite_maps_to_zero() {
        assert_eq!(SpreadMode::Repeat.apply(f32::INFINITY), 0.0);
    }

    // ── sample ────────────────────────────────────────────────────────────

    #[test]
    fn sample_empty_is_white() {
        assert_eq!(sample(&[], 0.3, SpreadMode::Pad), Color::WHITE);
    }

    #[test]
    fn sample_endpoints_and_middle() {
        let p = [red(), blue()];
        assert_eq!(sample(&p, 0.0, SpreadMode::Pad), red());
        assert_eq!(sample(&p, 1.0, SpreadMode::Pad), blue());
        let mid = sample(&p, 0.5, SpreadMode::Pad);
        assert!((mid.r - 0.5).abs() < 1e-6 && (mid.b - 0.5).abs() < 1e-6);
    }

    #[test]
    fn sample_three_stops_hits_center_color() {
        let green = Color::from_premul(0.0, 1.0, 0.0, 1.0);
        let p = [red(), green, blue()];
        assert_eq!(sample(&p, 0.5, SpreadMode::Pad), green);
    }

    // ── lookup ────────────────────────────────────────────────────────────

    #[test]
    fn resolve_missing_key_uses_default() {
        let book = PaletteBook::new();
        assert_eq!(resolve(&book, "nope"), &DEFAULT_PALETTE);
    }

    #[test]
    fn resolve_empty_palette_uses_default() {
        let mut book = PaletteBook::new();
        book.insert("void", Palette::new(Vec::new()));
        assert_eq!(resolve(&book, "void"), &DEFAULT_PALETTE);
    }

    #[test]
    fn resolve_known_key() {
        let mut book = PaletteBook::new();
        book.insert("ember", Palette::from_hex(&[0xff0000, 0x0000ff]));
        assert_eq!(resolve(&book, "ember"), &[red(), blue()]);
    }
}
