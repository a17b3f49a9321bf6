//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Tick-counted timers only
//! - Seeded RNG only
//! - Stable iteration order (row-major over the formation, slot order over missiles)
//! - No rendering or platform dependencies

pub mod collision;
pub mod formation;
pub mod state;
pub mod tick;

pub use collision::{Rect, overlaps};
pub use formation::{Formation, GridLayout};
pub use state::{
    Barricade, EndReason, Enemy, GameEvent, GamePhase, GameState, Missile, MissileKind, Missiles,
    Player, layout_barricades,
};
pub use tick::{TickInput, autopilot_input, tick};
