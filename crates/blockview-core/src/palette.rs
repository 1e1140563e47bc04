//! Colors and materials: [`Color`], [`ColorId`], [`Material`], [`Palette`].
//!
//! The engine speaks in small integers. [`ColorId::from_raw`] is the only
//! way to turn one of those into an index, so a bad value from the engine
//! can never reach the palette table.

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use crate::error::ColorError;

/// Number of palette slots. Valid raw identifiers are `1..=PALETTE_SIZE`.
pub const PALETTE_SIZE: usize = 8;

/// Raw value the engine uses for "no block here".
pub const EMPTY_RAW: i32 = -1;

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// An RGB colour packed into a `u32` (0x00RRGGBB).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color(pub u32);

impl Color {
    /// Construct from individual RGB components.
    #[inline]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | (b as u32))
    }

    /// Red component.
    #[inline]
    pub const fn r(self) -> u8 {
        ((self.0 >> 16) & 0xFF) as u8
    }

    /// Green component.
    #[inline]
    pub const fn g(self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    /// Blue component.
    #[inline]
    pub const fn b(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// Multiply each channel by `factor` (clamped to `0.0..=1.0`).
    pub fn shade(self, factor: f32) -> Self {
        let f = factor.clamp(0.0, 1.0);
        let ch = |c: u8| (c as f32 * f).round() as u8;
        Self::from_rgb(ch(self.r()), ch(self.g()), ch(self.b()))
    }
}

// ---------------------------------------------------------------------------
// ColorId
// ---------------------------------------------------------------------------

/// A validated palette identifier, always in `1..=PALETTE_SIZE`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColorId(u8);

impl ColorId {
    /// Build an identifier, or `None` if `id` is not a palette slot.
    pub const fn new(id: u8) -> Option<Self> {
        if id >= 1 && id as usize <= PALETTE_SIZE {
            Some(Self(id))
        } else {
            None
        }
    }

    /// Decode a raw engine value. [`EMPTY_RAW`] decodes to `Ok(None)`.
    pub fn from_raw(raw: i32) -> Result<Option<Self>, ColorError> {
        if raw == EMPTY_RAW {
            return Ok(None);
        }
        u8::try_from(raw)
            .ok()
            .and_then(Self::new)
            .map(Some)
            .ok_or(ColorError::OutOfPalette(raw))
    }

    /// The raw engine value.
    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Zero-based slot in the palette table.
    #[inline]
    pub const fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

// ---------------------------------------------------------------------------
// Material / Palette
// ---------------------------------------------------------------------------

/// Surface description for a rendered block.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Material {
    pub color: Color,
}

/// Where the palette colours come from.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PaletteSource {
    /// The light-to-dark gray ramp `#CCCCCC` .. `#555555`.
    #[default]
    Fixed,
    /// Eight random colours drawn from a seeded generator.
    Random { seed: u64 },
}

/// Fixed mapping from [`ColorId`] to [`Material`]. Read-only once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    materials: [Material; PALETTE_SIZE],
}

impl Palette {
    pub fn new(source: &PaletteSource) -> Self {
        match source {
            PaletteSource::Fixed => Self::gray_ramp(),
            PaletteSource::Random { seed } => Self::random(*seed),
        }
    }

    /// The gray ramp: id 1 is `#CCCCCC`, each next id is 0x11 darker.
    pub fn gray_ramp() -> Self {
        let materials = std::array::from_fn(|i| {
            let level = 0xCC - 0x11 * i as u8;
            Material {
                color: Color::from_rgb(level, level, level),
            }
        });
        Self { materials }
    }

    pub fn random(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let materials = std::array::from_fn(|_| Material {
            color: Color::from_rgb(
                rng.random_range(0..=255u8),
                rng.random_range(0..=255u8),
                rng.random_range(0..=255u8),
            ),
        });
        Self { materials }
    }

    #[inline]
    pub fn material(&self, id: ColorId) -> Material {
        self.materials[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColorId, Material)> + '_ {
        self.materials
            .iter()
            .enumerate()
            .filter_map(|(i, m)| ColorId::new(i as u8 + 1).map(|id| (id, *m)))
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::gray_ramp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_decoding() {
        assert_eq!(ColorId::from_raw(EMPTY_RAW), Ok(None));
        assert_eq!(ColorId::from_raw(1).map(|c| c.map(ColorId::get)), Ok(Some(1)));
        assert_eq!(ColorId::from_raw(8).map(|c| c.map(ColorId::get)), Ok(Some(8)));
        assert_eq!(ColorId::from_raw(0), Err(ColorError::OutOfPalette(0)));
        assert_eq!(ColorId::from_raw(9), Err(ColorError::OutOfPalette(9)));
        assert_eq!(ColorId::from_raw(-7), Err(ColorError::OutOfPalette(-7)));
        assert_eq!(ColorId::from_raw(300), Err(ColorError::OutOfPalette(300)));
    }

    #[test]
    fn gray_ramp_matches_reference_shades() {
        let p = Palette::gray_ramp();
        let first = ColorId::new(1).unwrap();
        let last = ColorId::new(8).unwrap();
        assert_eq!(p.material(first).color, Color(0xCCCCCC));
        assert_eq!(p.material(last).color, Color(0x555555));
        assert_eq!(p.iter().count(), PALETTE_SIZE);
    }

    #[test]
    fn random_palette_is_seeded() {
        assert_eq!(Palette::random(7), Palette::random(7));
        assert_eq!(Palette::new(&PaletteSource::Random { seed: 3 }), Palette::random(3));
    }

    #[test]
    fn shade_scales_channels() {
        let c = Color::from_rgb(200, 100, 0);
        assert_eq!(c.shade(0.5), Color::from_rgb(100, 50, 0));
        assert_eq!(c.shade(2.0), c);
    }
}
