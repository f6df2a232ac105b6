use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

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
            // Offset so the first series is blue rather than red.
            let hue = 210.0 + (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Curve colours: series name → Color32
// ---------------------------------------------------------------------------

/// Fixed colour per series name, so "Train" looks the same in every plot.
#[derive(Debug, Clone)]
pub struct CurveColors {
    mapping: BTreeMap<&'static str, Color32>,
    default_color: Color32,
}

impl CurveColors {
    pub fn new(names: &[&'static str]) -> Self {
        let mapping = names
            .iter()
            .copied()
            .zip(generate_palette(names.len()))
            .collect();
        CurveColors {
            mapping,
            default_color: Color32::GRAY,
        }
    }

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
    fn palette_colours_are_distinct() {
        let colours = generate_palette(4);
        assert_eq!(colours.len(), 4);
        for (i, a) in colours.iter().enumerate() {
            for b in &colours[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn unknown_series_gets_default() {
        let colors = CurveColors::new(&["Train", "Validation"]);
        assert_ne!(colors.color_for("Train"), colors.color_for("Validation"));
        assert_eq!(colors.color_for("Test"), Color32::GRAY);
    }
}
