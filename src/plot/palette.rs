//! Colour palettes for the charts

use plotters::style::RGBColor;

/// Darkest and lightest ends of the reversed sequential red palette
const RED_DARK: (f64, f64, f64) = (103.0, 0.0, 13.0);
const RED_LIGHT: (f64, f64, f64) = (252.0, 160.0, 130.0);

/// Qualitative colours for unordered groups (cohort, sex)
pub const CATEGORICAL: [RGBColor; 6] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
];

/// `n` reds running from dark to light, so the first (youngest) group is darkest
#[must_use]
pub fn reds_reversed(n: usize) -> Vec<RGBColor> {
    let lerp = |a: f64, b: f64, t: f64| (a + (b - a) * t).round() as u8;
    (0..n)
        .map(|i| {
            let t = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 };
            RGBColor(
                lerp(RED_DARK.0, RED_LIGHT.0, t),
                lerp(RED_DARK.1, RED_LIGHT.1, t),
                lerp(RED_DARK.2, RED_LIGHT.2, t),
            )
        })
        .collect()
}

/// Qualitative colour for group `i`, cycling when there are many groups
#[must_use]
pub fn categorical(i: usize) -> RGBColor {
    CATEGORICAL[i % CATEGORICAL.len()]
}
