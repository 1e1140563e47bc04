//! Demo settings read from the environment.
//!
//! | variable            | values              | default          |
//! |---------------------|---------------------|------------------|
//! | `BLOCKVIEW_PALETTE` | `fixed` / `random`  | `fixed`          |
//! | `BLOCKVIEW_SEED`    | unsigned integer    | clock-derived    |
//! | `BLOCKVIEW_BOARD_ONLY` | `1` / `true`     | off              |
//! | `BLOCKVIEW_GRAVITY` | steps per row drop  | `10`             |

use std::num::ParseIntError;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use blockview_core::{PaletteSource, ViewConfig};

use crate::sandbox::DEFAULT_STEP_INTERVAL;

pub const PALETTE_VAR: &str = "BLOCKVIEW_PALETTE";
pub const SEED_VAR: &str = "BLOCKVIEW_SEED";
pub const BOARD_ONLY_VAR: &str = "BLOCKVIEW_BOARD_ONLY";
pub const GRAVITY_VAR: &str = "BLOCKVIEW_GRAVITY";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("BLOCKVIEW_PALETTE must be `fixed` or `random`, got `{0}`")]
    Palette(String),
    #[error("BLOCKVIEW_SEED must be an unsigned integer: {0}")]
    Seed(#[from] ParseIntError),
    #[error("BLOCKVIEW_GRAVITY must be a positive step count: {0}")]
    Gravity(ParseIntError),
}

/// Everything a demo binary needs to start.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub view: ViewConfig,
    /// Seeds both the engine and, when random, the palette.
    pub seed: u64,
    /// Engine steps between gravity moves.
    pub gravity: u32,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let seed = match get(SEED_VAR) {
            Some(s) => s.trim().parse()?,
            None => clock_seed(),
        };

        let palette = match get(PALETTE_VAR).as_deref().map(str::trim) {
            None | Some("fixed") => PaletteSource::Fixed,
            Some("random") => PaletteSource::Random { seed },
            Some(other) => return Err(SettingsError::Palette(other.to_string())),
        };

        let gravity = match get(GRAVITY_VAR) {
            Some(s) => s.trim().parse().map_err(SettingsError::Gravity)?,
            None => DEFAULT_STEP_INTERVAL,
        };

        let mut view = ViewConfig::default().with_palette(palette);
        if matches!(get(BOARD_ONLY_VAR).as_deref(), Some("1" | "true")) {
            view = view.board_only();
        }
        Ok(Self {
            view,
            seed,
            gravity,
        })
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
