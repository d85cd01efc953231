use crate::error::SimError;
use crate::grid::{Cell, Grid};
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// Gain applied to B² before blending.
pub const INTENSITY_GAIN: f32 = 15.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (the `#` is optional, hex digits in either case).
    pub fn from_hex(s: &str) -> Result<Self, SimError> {
        let hex = s.trim().trim_start_matches('#');
        let bad = || SimError::InvalidColor(s.to_string());
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(bad());
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|_| bad())
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{r:02X}{g:02X}{b:02X}")
    }

    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        Rgb::new(
            lerp(self.r, other.r, t),
            lerp(self.g, other.g, t),
            lerp(self.b, other.b, t),
        )
    }

    pub fn to_rgb8(self) -> [u8; 3] {
        [to_u8(self.r), to_u8(self.g), to_u8(self.b)]
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Endpoint colors of the display ramp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayColors {
    /// Shown where the pattern intensity is near zero (background).
    pub low: Rgb,
    /// Shown where the pattern intensity saturates.
    pub high: Rgb,
}

impl DisplayColors {
    pub fn new(low: Rgb, high: Rgb) -> Self {
        Self { low, high }
    }

    pub fn from_hex(low: &str, high: &str) -> Result<Self, SimError> {
        Ok(Self::new(Rgb::from_hex(low)?, Rgb::from_hex(high)?))
    }

    pub fn swapped(self) -> Self {
        Self::new(self.high, self.low)
    }
}

impl Default for DisplayColors {
    fn default() -> Self {
        Self::new(Rgb::WHITE, Rgb::BLACK)
    }
}

/// Pattern intensity of a cell: B² scaled by [`INTENSITY_GAIN`], clamped
/// to [0, 1] so the blend never leaves the segment between the endpoints.
#[inline]
pub fn intensity(cell: &Cell) -> f32 {
    (cell.b * cell.b * INTENSITY_GAIN).clamp(0.0, 1.0)
}

#[inline]
pub fn map_color(cell: &Cell, colors: &DisplayColors) -> Rgb {
    colors.high.lerp(colors.low, 1.0 - intensity(cell))
}

/// Map a whole grid into an RGB image of the same size.
pub fn render(grid: &Grid, colors: &DisplayColors) -> RgbImage {
    let (w, h) = grid.dimensions();
    let mut img = RgbImage::new(w as u32, h as u32);
    render_into(grid, colors, &mut img);
    img
}

/// Like [`render`] but reuses `img`, reallocating only on a size change.
pub fn render_into(grid: &Grid, colors: &DisplayColors, img: &mut RgbImage) {
    let (w, h) = grid.dimensions();
    if img.dimensions() != (w as u32, h as u32) {
        *img = RgbImage::new(w as u32, h as u32);
    }
    for (px, cell) in img.pixels_mut().zip(grid.cells()) {
        px.0 = map_color(cell, colors).to_rgb8();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn parses_hex_with_and_without_hash() {
        assert_eq!(Rgb::from_hex("#FFFFFF").unwrap(), Rgb::WHITE);
        assert_eq!(Rgb::from_hex("000000").unwrap(), Rgb::BLACK);
        let c = Rgb::from_hex("#ff8000").unwrap();
        assert_eq!(c.r, 1.0);
        assert_abs_diff_eq!(c.g, 128.0 / 255.0);
        assert_eq!(c.b, 0.0);
    }

    #[test]
    fn rejects_malformed_hex() {
        for s in ["", "#FFF", "#GGGGGG", "#1234567", "12345", "#ÿÿÿ"] {
            assert!(
                matches!(Rgb::from_hex(s), Err(SimError::InvalidColor(_))),
                "{s:?}"
            );
        }
    }

    #[test]
    fn hex_round_trip() {
        assert_eq!(Rgb::from_hex("#1A2B3C").unwrap().to_hex(), "#1A2B3C");
    }

    #[test]
    fn zero_b_maps_to_low_color() {
        let colors = DisplayColors::default();
        let c = map_color(&Cell::new(1.0, 0.0, 0.0), &colors);
        assert_eq!(c, colors.low);
    }

    #[test]
    fn intensity_is_squared_and_scaled() {
        let cell = Cell::new(0.0, 0.2, 0.0);
        assert_abs_diff_eq!(intensity(&cell), 0.6, epsilon = 1e-6);
        let c = map_color(&cell, &DisplayColors::default());
        // white -> black at 60%
        assert_abs_diff_eq!(c.r, 0.4, epsilon = 1e-6);
    }

    #[test]
    fn saturated_intensity_stays_at_high_color() {
        let colors = DisplayColors::new(Rgb::new(1.0, 0.0, 0.0), Rgb::new(0.5, 0.5, 0.0));
        for b in [0.26, 0.5, 1.0] {
            assert_eq!(map_color(&Cell::new(0.0, b, 0.0), &colors), colors.high);
        }
    }

    #[test]
    fn render_matches_grid_size() {
        let mut g = Grid::filled(5, 3, Cell::new(0.0, 1.0, 0.0)).unwrap();
        g.set(0, 0, Cell::new(1.0, 0.0, 0.0));
        let img = render(&g, &DisplayColors::default());
        assert_eq!(img.dimensions(), (5, 3));
        assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(img.get_pixel(4, 2).0, [0, 0, 0]);
    }

    #[test]
    fn render_into_reallocates_on_resize() {
        let g = Grid::clear(4, 4).unwrap();
        let mut img = RgbImage::new(1, 1);
        render_into(&g, &DisplayColors::default(), &mut img);
        assert_eq!(img.dimensions(), (4, 4));
    }
}
