//! Grid Invaders - a frame-driven arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, formation, collisions, game state)
//! - `session`: Owned game session with queued input intents and render snapshots
//! - `settings`: Data-driven gameplay configuration

pub mod session;
pub mod settings;
pub mod sim;

pub use session::{Session, Snapshot};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Default playfield dimensions (pixels)
    pub const FIELD_WIDTH: f32 = 640.0;
    pub const FIELD_HEIGHT: f32 = 480.0;

    /// Default formation shape
    pub const GRID_ROWS: usize = 5;
    pub const GRID_COLS: usize = 11;
    /// Fraction of the field width covered by the formation
    pub const GRID_WIDTH_FRACTION: f32 = 0.75;
    /// Gap between the top of the field and the first enemy row
    pub const GRID_TOP: f32 = 32.0;

    /// Player ship horizontal step per move intent
    pub const PLAYER_STEP: f32 = 10.0;
    /// Player can fire once this many ticks have passed since the last shot
    pub const SHOT_COOLDOWN_TICKS: u32 = 20;
    pub const STARTING_LIVES: u8 = 3;

    /// Ticks of invulnerability after losing a life
    pub const INVULNERABILITY_TICKS: u32 = 120;
    /// Blink half-period while invulnerable
    pub const BLINK_PERIOD_TICKS: u32 = 8;

    /// Missile defaults
    pub const MISSILE_WIDTH: f32 = 4.0;
    pub const MISSILE_SPEED: f32 = 8.0;

    /// Base horizontal enemy speed, scaled by the wave multiplier
    pub const ENEMY_SPEED: f32 = 0.5;
    /// An enemy that has reached this far below the player's top edge has landed
    pub const LANDING_MARGIN: f32 = 4.0;
    /// Denominator of the per-tick enemy fire chance (1 in N)
    pub const ENEMY_FIRE_ODDS: u32 = 500;

    /// Wave speed multiplier at the first wave and its per-wave increase
    pub const BASE_SPEED: f32 = 1.0;
    pub const SPEED_STEP: f32 = 0.5;

    /// Barricade defaults
    pub const BARRICADE_COUNT: usize = 4;
    pub const BARRICADE_WIDTH: f32 = 64.0;
    pub const BARRICADE_HEIGHT: f32 = 32.0;
    /// Distance from the barricade top edge to the player's top edge
    pub const BARRICADE_LIFT: f32 = 80.0;
    pub const BARRICADE_HEALTH: i32 = 24;
    /// Damage taken when an enemy rams a barricade
    pub const BARRICADE_RAM_DAMAGE: i32 = 8;
    /// Damage taken from a single enemy missile
    pub const BARRICADE_MISSILE_DAMAGE: i32 = 1;

    /// Base points per row counted from the back of the formation
    pub const POINTS_PER_ROW: f32 = 10.0;
}
