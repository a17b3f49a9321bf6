//! Game state and core simulation types
//!
//! Entities (player, enemies, missiles, barricades) and the session-wide
//! `GameState` that owns them. Everything a renderer needs lives here.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::formation::Formation;
use crate::consts::*;
use crate::settings::Settings;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Running,
    /// Simulation frozen, input still accepted
    Paused,
    /// Run ended; only a restart leaves this phase
    GameOver,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Last life lost to an enemy missile
    LivesExhausted,
    /// The formation descended onto the player's row
    EnemiesLanded,
    /// Host asked to quit
    Quit,
}

/// Something that happened during a tick, for hosts (audio, effects, logs)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PlayerFired,
    EnemyFired { row: usize, col: usize },
    EnemyDestroyed { row: usize, col: usize, points: u64 },
    BarricadeDamaged { index: usize, health: i32 },
    BarricadeDestroyed { index: usize },
    PlayerHit { lives: u8 },
    FormationAdvanced,
    WaveCleared { wave: u32, speed: f32 },
    Paused,
    Resumed,
    GameOver { reason: EndReason },
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub size: Vec2,
    /// Horizontal distance covered per move step
    pub speed: f32,
    /// Enemy missiles cannot take a life while set
    pub invulnerable: bool,
    /// Blink state while invulnerable (renderers skip the ship when false)
    pub visible: bool,
}

impl Player {
    /// Ship centred at the bottom of the field
    pub fn new(field_width: f32, field_height: f32) -> Self {
        let height = field_height / 10.0;
        let width = height * 1.1;
        Self {
            pos: Vec2::new((field_width - width) / 2.0, field_height - height * 1.2),
            size: Vec2::new(width, height),
            speed: PLAYER_STEP,
            invulnerable: false,
            visible: true,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    /// Move `direction` steps (-1 left, +1 right), keeping the whole ship on the field
    pub fn move_horizontal(&mut self, direction: i32, field_width: f32) {
        let max_x = (field_width - self.size.x).max(0.0);
        self.pos.x = (self.pos.x + direction as f32 * self.speed).clamp(0.0, max_x);
    }

    /// Launch a missile from the nose of the ship
    pub fn shoot(&self, missiles: &mut Missiles) {
        let size = Vec2::new(MISSILE_WIDTH, self.size.y / 2.0);
        let pos = Vec2::new(self.pos.x + self.size.x / 2.0 - size.x / 2.0, self.pos.y);
        missiles.push(Missile::new(MissileKind::Player, pos, size));
    }
}

/// A member of the formation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub row: usize,
    pub col: usize,
    pub pos: Vec2,
    pub size: Vec2,
    /// Signed horizontal velocity factor (±1 times the wave speed)
    pub direction: f32,
}

impl Enemy {
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    /// Whether this enemy has reached the side of the field it is heading for
    ///
    /// Does not move the enemy; the formation applies motion separately.
    pub fn update(&self, field_width: f32) -> bool {
        (self.pos.x <= 0.0 && self.direction < 0.0)
            || (self.pos.x + self.size.x >= field_width && self.direction > 0.0)
    }

    /// Roll the 1-in-`odds` fire chance and drop a missile on success
    pub fn shoot<R: Rng>(&self, rng: &mut R, odds: u32, missiles: &mut Missiles) -> bool {
        if odds == 0 || !rng.random_ratio(1, odds) {
            return false;
        }
        let size = Vec2::new(MISSILE_WIDTH, self.size.y / 2.0);
        let pos = Vec2::new(
            self.pos.x + self.size.x / 2.0 - size.x / 2.0,
            self.pos.y + self.size.y,
        );
        missiles.push(Missile::new(MissileKind::Enemy, pos, size));
        true
    }

    /// Reverse and drop half a body height; true once the bottom edge reaches `threshold_y`
    pub fn advance(&mut self, threshold_y: f32) -> bool {
        self.direction = -self.direction;
        self.pos.y += self.size.y / 2.0;
        self.pos.y + self.size.y >= threshold_y
    }
}

/// Who fired a missile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissileKind {
    /// Fired by the player, travels up
    Player,
    /// Fired by an enemy, travels down
    Enemy,
}

impl MissileKind {
    /// +1 for upward travel, -1 for downward
    pub fn sign(&self) -> f32 {
        match self {
            MissileKind::Player => 1.0,
            MissileKind::Enemy => -1.0,
        }
    }
}

/// A projectile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Missile {
    pub kind: MissileKind,
    pub pos: Vec2,
    pub size: Vec2,
}

impl Missile {
    pub fn new(kind: MissileKind, pos: Vec2, size: Vec2) -> Self {
        Self { kind, pos, size }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    /// Move one tick; false once the missile has left the field
    pub fn update(&mut self, field_height: f32) -> bool {
        self.pos.y -= self.kind.sign() * MISSILE_SPEED;
        match self.kind {
            MissileKind::Player => self.pos.y > -self.size.y,
            MissileKind::Enemy => self.pos.y < field_height,
        }
    }
}

/// Sparse missile storage
///
/// Removal empties a slot in place so indices stay valid for the rest of a
/// tick; empty slots are compacted away on the next insertion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Missiles {
    slots: Vec<Option<Missile>>,
}

impl Missiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, missile: Missile) {
        self.slots.retain(Option::is_some);
        self.slots.push(Some(missile));
    }

    pub fn get(&self, index: usize) -> Option<&Missile> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Empty a slot, returning the missile that was there
    pub fn remove(&mut self, index: usize) -> Option<Missile> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    /// Number of slots, live or empty
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of live missiles
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live missiles with their slot index
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Missile)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|m| (i, m)))
    }

    /// First live missile of `kind` that satisfies `hit`
    pub fn find(&self, kind: MissileKind, mut hit: impl FnMut(&Missile) -> bool) -> Option<usize> {
        self.iter()
            .find(|(_, m)| m.kind == kind && hit(*m))
            .map(|(i, _)| i)
    }

    /// Advance every missile, emptying slots of those that left the field
    pub fn update_all(&mut self, field_height: f32) {
        for slot in &mut self.slots {
            let in_field = slot.as_mut().is_some_and(|m| m.update(field_height));
            if !in_field {
                *slot = None;
            }
        }
    }
}

/// A destructible shield between the player and the formation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Barricade {
    pub pos: Vec2,
    pub size: Vec2,
    pub health: i32,
    pub destroyed: bool,
}

impl Barricade {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            size,
            health: BARRICADE_HEALTH,
            destroyed: false,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    /// Health span of one visual damage tier
    pub fn damage_increment() -> i32 {
        BARRICADE_HEALTH / 3
    }

    /// Apply damage. Returns true if this call destroyed the barricade.
    pub fn lose_durability(&mut self, amount: i32) -> bool {
        if self.destroyed {
            return false;
        }
        self.health -= amount;
        if self.health <= 0 {
            self.destroyed = true;
        }
        self.destroyed
    }

    /// Health for display, never negative
    pub fn display_health(&self) -> i32 {
        self.health.max(0)
    }

    /// Damage tier: 0 intact, 1-2 worn, 3 destroyed
    pub fn tier(&self) -> u8 {
        if self.destroyed {
            return 3;
        }
        let lost = BARRICADE_HEALTH - self.display_health();
        (lost / Self::damage_increment()).clamp(0, 2) as u8
    }

    pub fn reset(&mut self) {
        self.health = BARRICADE_HEALTH;
        self.destroyed = false;
    }
}

/// Spread `count` barricades evenly across the field, above the player
pub fn layout_barricades(count: usize, field_width: f32, player_y: f32) -> Vec<Barricade> {
    if count == 0 {
        return Vec::new();
    }
    let size = Vec2::new(BARRICADE_WIDTH, BARRICADE_HEIGHT);
    let spacing = field_width / count as f32;
    let y = player_y - BARRICADE_LIFT;
    (0..count)
        .map(|i| {
            let x = (i as f32 + 0.5) * spacing - size.x / 2.0;
            Barricade::new(Vec2::new(x, y), size)
        })
        .collect()
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub settings: Settings,
    /// Run seed for reproducibility
    pub seed: u64,
    /// Drives enemy fire; the only source of randomness
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub end_reason: Option<EndReason>,
    pub score: u64,
    pub lives: u8,
    /// Current wave index (0-based)
    pub wave_index: u32,
    /// Wave speed multiplier
    pub speed: f32,
    /// Simulation tick counter (running ticks only)
    pub time_ticks: u64,
    /// Ticks since the player last fired
    pub shot_timer: u32,
    /// Remaining invulnerability ticks
    pub invulnerable_ticks: u32,
    pub player: Player,
    pub formation: Formation,
    pub missiles: Missiles,
    pub barricades: Vec<Barricade>,
    /// Events raised by the latest tick
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game using the seed from `settings`
    pub fn new(settings: Settings) -> Self {
        let seed = settings.seed;
        Self::with_seed(settings, seed)
    }

    pub fn with_seed(settings: Settings, seed: u64) -> Self {
        let settings = settings.sanitized();
        let player = Player::new(settings.field_width, settings.field_height);
        let formation = Formation::new(
            settings.rows,
            settings.cols,
            settings.field_width,
            BASE_SPEED,
        );
        let barricades = layout_barricades(
            settings.effective_barricades(),
            settings.field_width,
            player.pos.y,
        );

        Self {
            lives: settings.starting_lives,
            settings,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Running,
            end_reason: None,
            score: 0,
            wave_index: 0,
            speed: BASE_SPEED,
            time_ticks: 0,
            // Ready to fire on the first tick
            shot_timer: SHOT_COOLDOWN_TICKS,
            invulnerable_ticks: 0,
            player,
            formation,
            missiles: Missiles::new(),
            barricades,
            events: Vec::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// An enemy whose bottom edge reaches this y has landed
    pub fn landing_threshold(&self) -> f32 {
        self.player.pos.y + LANDING_MARGIN
    }

    /// Points for destroying an enemy in `row` at the current speed
    ///
    /// Back rows (low indices) are worth more.
    pub fn points_for_row(&self, row: usize) -> u64 {
        let rows_from_front = self.formation.rows().saturating_sub(row) as f32;
        (rows_from_front * self.speed * POINTS_PER_ROW).round() as u64
    }

    /// Remove an enemy from the grid and award its points
    pub fn destroy_enemy(&mut self, row: usize, col: usize) -> Option<u64> {
        self.formation.remove(row, col)?;
        let points = self.points_for_row(row);
        self.score += points;
        self.events.push(GameEvent::EnemyDestroyed { row, col, points });
        Some(points)
    }

    pub fn can_shoot(&self) -> bool {
        self.shot_timer >= SHOT_COOLDOWN_TICKS
    }

    /// Fire if the cooldown has elapsed
    pub fn try_player_shoot(&mut self) -> bool {
        if !self.can_shoot() {
            return false;
        }
        self.shot_timer = 0;
        self.player.shoot(&mut self.missiles);
        self.events.push(GameEvent::PlayerFired);
        true
    }

    /// Apply an enemy missile hit. Returns true if a life was lost.
    pub fn hit_player(&mut self) -> bool {
        if self.player.invulnerable {
            return false;
        }
        self.lives = self.lives.saturating_sub(1);
        self.events.push(GameEvent::PlayerHit { lives: self.lives });
        if self.lives == 0 {
            self.end(EndReason::LivesExhausted);
        } else {
            self.invulnerable_ticks = INVULNERABILITY_TICKS;
            self.player.invulnerable = true;
            self.player.visible = false;
        }
        true
    }

    /// Age the shot cooldown and invulnerability window by one tick
    pub fn advance_timers(&mut self) {
        self.shot_timer = self.shot_timer.saturating_add(1).min(SHOT_COOLDOWN_TICKS);

        if self.invulnerable_ticks > 0 {
            self.invulnerable_ticks -= 1;
            if self.invulnerable_ticks == 0 {
                self.player.invulnerable = false;
                self.player.visible = true;
            } else {
                self.player.visible = (self.invulnerable_ticks / BLINK_PERIOD_TICKS) % 2 == 0;
            }
        }
    }

    /// Start the next wave: faster, full grid, fresh barricades
    ///
    /// Score, lives and missiles in flight carry over.
    pub fn next_wave(&mut self) {
        self.wave_index += 1;
        self.speed += self.settings.speed_step;
        self.formation.repopulate(self.speed);
        for barricade in &mut self.barricades {
            barricade.reset();
        }
        log::info!("Wave {} starting at speed {:.2}", self.wave_index + 1, self.speed);
        self.events.push(GameEvent::WaveCleared {
            wave: self.wave_index,
            speed: self.speed,
        });
    }

    /// Enter GameOver. Only the first call has any effect.
    pub fn end(&mut self, reason: EndReason) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.end_reason = Some(reason);
        log::info!(
            "Game over ({:?}): score {}, wave {}",
            reason,
            self.score,
            self.wave_index + 1
        );
        self.events.push(GameEvent::GameOver { reason });
    }
}
