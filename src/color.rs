use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Diverging scale for correlations
// ---------------------------------------------------------------------------

const NEGATIVE: (f32, f32, f32) = (0.13, 0.40, 0.67);
const NEUTRAL: (f32, f32, f32) = (0.97, 0.97, 0.97);
const POSITIVE: (f32, f32, f32) = (0.70, 0.09, 0.17);

/// Blue → white → red scale over `[-1, 1]`; out-of-range input is clamped.
pub fn diverging(value: f64) -> Color32 {
    let t = value.clamp(-1.0, 1.0) as f32;
    let (end, factor) = if t < 0.0 { (NEGATIVE, -t) } else { (POSITIVE, t) };
    let from: LinSrgb = Srgb::new(NEUTRAL.0, NEUTRAL.1, NEUTRAL.2).into_linear();
    let to: LinSrgb = Srgb::new(end.0, end.1, end.2).into_linear();
    to_color32(Srgb::from_linear(from.mix(to, factor)))
}

// ---------------------------------------------------------------------------
// Color mapping: series name → Color32
// ---------------------------------------------------------------------------

/// Maps chart series (colour groups) to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map for the given series names, in order.
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let names: Vec<&str> = names.into_iter().collect();
        let mapping = names
            .iter()
            .zip(generate_palette(names.len()))
            .map(|(name, c)| ((*name).to_owned(), c))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::LIGHT_BLUE,
        }
    }

    /// Look up the colour for a series.
    pub fn color_for(&self, name: &str) -> Color32 {
        self.mapping
            .get(name)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size_and_distinct_colours() {
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        assert_ne!(p[0], p[1]);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn diverging_endpoints() {
        let neutral = diverging(0.0);
        assert_eq!(neutral, diverging(-0.0));
        let hot = diverging(1.0);
        let cold = diverging(-1.0);
        assert!(hot.r() > hot.b());
        assert!(cold.b() > cold.r());
        assert_eq!(diverging(5.0), hot);
    }

    #[test]
    fn color_map_falls_back_to_default() {
        let map = ColorMap::new(["a", "b"]);
        assert_ne!(map.color_for("a"), map.color_for("b"));
        assert_eq!(map.color_for("zzz"), Color32::LIGHT_BLUE);
    }
}
