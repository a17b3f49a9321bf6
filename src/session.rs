//! Game session facade
//!
//! Owns the simulation state for one run and is the only way hosts touch
//! it: input handlers queue intents, the scheduler calls [`Session::step`],
//! and renderers read a [`Snapshot`] between steps.

use serde::Serialize;

use crate::settings::Settings;
use crate::sim::{
    Barricade, EndReason, Enemy, GameEvent, GamePhase, GameState, Missile, Player, TickInput, tick,
};

/// Read-only view of everything a renderer draws
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    pub phase: GamePhase,
    pub end_reason: Option<EndReason>,
    pub score: u64,
    pub lives: u8,
    /// 1-based wave number
    pub wave: u32,
    pub speed: f32,
    pub tick: u64,
    pub player: &'a Player,
    /// False during the off half of the invulnerability blink
    pub player_visible: bool,
    pub enemies: Vec<&'a Enemy>,
    pub missiles: Vec<&'a Missile>,
    pub barricades: &'a [Barricade],
}

/// One run of the game plus the intents queued for its next step
#[derive(Debug, Clone)]
pub struct Session {
    state: GameState,
    pending: TickInput,
    restarts: u64,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        log::info!(
            "New session: {}x{} grid, seed {}, {}",
            settings.rows,
            settings.cols,
            settings.seed,
            settings.difficulty.as_str()
        );
        Self {
            state: GameState::new(settings),
            pending: TickInput::default(),
            restarts: 0,
        }
    }

    /// Queue horizontal movement; positive is right
    pub fn move_player(&mut self, direction: i32) {
        if self.accepts_input() {
            self.pending.move_dir = self.pending.move_dir.saturating_add(direction.signum());
        }
    }

    pub fn shoot(&mut self) {
        if self.accepts_input() {
            self.pending.fire = true;
        }
    }

    pub fn pause(&mut self) {
        if self.accepts_input() {
            self.pending.pause = true;
            self.pending.resume = false;
        }
    }

    pub fn resume(&mut self) {
        if self.accepts_input() {
            self.pending.resume = true;
            self.pending.pause = false;
        }
    }

    pub fn quit(&mut self) {
        if self.accepts_input() {
            self.pending.quit = true;
        }
    }

    /// Let the autopilot drive (demo mode)
    pub fn set_idle(&mut self, idle: bool) {
        self.pending.idle_mode = idle;
    }

    pub fn is_idle(&self) -> bool {
        self.pending.idle_mode
    }

    fn accepts_input(&self) -> bool {
        !self.state.is_over()
    }

    /// Run one simulation tick, consuming the queued intents
    ///
    /// Returns the events raised by this tick.
    pub fn step(&mut self) -> &[GameEvent] {
        let idle_mode = self.pending.idle_mode;
        let input = std::mem::take(&mut self.pending);
        self.pending.idle_mode = idle_mode;

        tick(&mut self.state, &input);
        &self.state.events
    }

    /// Start a fresh run with the same settings
    ///
    /// Each restart derives a new seed so runs differ but stay reproducible.
    pub fn restart(&mut self) {
        self.restarts += 1;
        let seed = self.state.settings.seed.wrapping_add(self.restarts);
        log::info!("Restarting session (seed {})", seed);
        self.state = GameState::with_seed(self.state.settings.clone(), seed);
        let idle_mode = self.pending.idle_mode;
        self.pending = TickInput {
            idle_mode,
            ..Default::default()
        };
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Events raised by the latest step
    pub fn events(&self) -> &[GameEvent] {
        &self.state.events
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    pub fn player(&self) -> &Player {
        &self.state.player
    }

    pub fn enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.state.formation.iter()
    }

    pub fn missiles(&self) -> impl Iterator<Item = &Missile> {
        self.state.missiles.iter().map(|(_, m)| m)
    }

    pub fn barricades(&self) -> &[Barricade] {
        &self.state.barricades
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        let state = &self.state;
        Snapshot {
            phase: state.phase,
            end_reason: state.end_reason,
            score: state.score,
            lives: state.lives,
            wave: state.wave_index + 1,
            speed: state.speed,
            tick: state.time_ticks,
            player: &state.player,
            player_visible: state.player.visible,
            enemies: self.enemies().collect(),
            missiles: self.missiles().collect(),
            barricades: &state.barricades,
        }
    }
}
