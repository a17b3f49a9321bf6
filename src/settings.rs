//! Gameplay settings
//!
//! Loaded from a JSON file by the host; every field falls back to its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Enemy fire odds (1 in N per frontmost enemy per tick)
    pub fn enemy_fire_odds(&self) -> u32 {
        match self {
            Difficulty::Easy => 900,
            Difficulty::Normal => ENEMY_FIRE_ODDS,
            Difficulty::Hard => 250,
        }
    }

    pub fn starting_lives(&self) -> u8 {
        match self {
            Difficulty::Easy => 5,
            Difficulty::Normal => STARTING_LIVES,
            Difficulty::Hard => 2,
        }
    }

    /// Speed multiplier gained per cleared wave
    pub fn speed_step(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.25,
            Difficulty::Normal => SPEED_STEP,
            Difficulty::Hard => 0.75,
        }
    }
}

/// Gameplay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Difficulty the tunables below were derived from
    pub difficulty: Difficulty,

    // === Field ===
    pub field_width: f32,
    pub field_height: f32,

    // === Formation ===
    pub rows: usize,
    pub cols: usize,
    /// 1 in N chance per tick that a frontmost enemy fires (0 disables)
    pub enemy_fire_odds: u32,
    pub speed_step: f32,

    // === Player ===
    pub starting_lives: u8,

    // === Barricades ===
    pub barricades: bool,
    pub barricade_count: usize,

    /// Run seed for reproducibility
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,

            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,

            rows: GRID_ROWS,
            cols: GRID_COLS,
            enemy_fire_odds: ENEMY_FIRE_ODDS,
            speed_step: SPEED_STEP,

            starting_lives: STARTING_LIVES,

            barricades: true,
            barricade_count: BARRICADE_COUNT,

            seed: 0,
        }
    }
}

impl Settings {
    /// Create settings from a difficulty preset (applies preset defaults)
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        let mut settings = Self::default();
        settings.apply_difficulty(difficulty);
        settings
    }

    /// Apply a difficulty preset (updates difficulty-dependent settings)
    pub fn apply_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.enemy_fire_odds = difficulty.enemy_fire_odds();
        self.starting_lives = difficulty.starting_lives();
        self.speed_step = difficulty.speed_step();
    }

    /// Number of barricades actually placed on the field
    pub fn effective_barricades(&self) -> usize {
        if self.barricades { self.barricade_count } else { 0 }
    }

    /// Clamp values the simulation cannot work with
    pub fn sanitized(mut self) -> Self {
        self.rows = self.rows.max(1);
        self.cols = self.cols.max(1);
        self.starting_lives = self.starting_lives.max(1);
        if self.field_width.is_nan() || self.field_width <= 0.0 {
            self.field_width = FIELD_WIDTH;
        }
        if self.field_height.is_nan() || self.field_height <= 0.0 {
            self.field_height = FIELD_HEIGHT;
        }
        if self.speed_step.is_nan() || self.speed_step < 0.0 {
            self.speed_step = SPEED_STEP;
        }
        self
    }

    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    return settings;
                }
                Err(e) => log::warn!("Invalid settings in {}: {}", path.display(), e),
            },
            Err(e) => log::warn!("Could not read {}: {}", path.display(), e),
        }

        log::info!("Using default settings");
        Self::default()
    }
}
