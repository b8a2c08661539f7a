use image::Rgb;
use palette::{FromColor, Hsl, Srgb};

/// Hue the outline palette starts from. Green keeps the first outlines apart
/// from the red tint used for mask overlays.
pub(crate) const OUTLINE_START_HUE: f32 = 120.0;

/// Spreads `n` fully saturated colors evenly around the hue circle, starting
/// at `start_hue` degrees.
pub(crate) fn generate_contrasting_colors(n: usize, start_hue: f32) -> Vec<Rgb<u8>> {
    (0..n)
        .map(|i| {
            let hue = (start_hue + (i as f32 * 360.0) / n as f32) % 360.0;
            let srgb: Srgb<u8> = Srgb::from_color(Hsl::new(hue, 0.9, 0.5)).into_format();
            Rgb([srgb.red, srgb.green, srgb.blue])
        })
        .collect()
}
