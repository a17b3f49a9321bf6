//! The enemy formation
//!
//! A rows×cols grid of optional enemy slots that sweeps sideways as one
//! body, steps down when any member reaches a side of the field, and is
//! refilled when every slot is empty.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::Enemy;
use crate::consts::*;

/// Where each grid slot sits on a fresh wave
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    /// Left edge of column 0
    pub origin_x: f32,
    /// Top edge of row 0
    pub top: f32,
    /// Cell pitch (enemy size plus padding)
    pub cell: Vec2,
    pub enemy_size: Vec2,
}

impl GridLayout {
    /// The grid spans three quarters of the field width, centred
    pub fn new(field_width: f32, cols: usize) -> Self {
        let box_width = field_width * GRID_WIDTH_FRACTION;
        let cell_w = box_width / cols.max(1) as f32;
        let cell = Vec2::new(cell_w, cell_w * 0.9);
        let padding = cell_w / 7.0;
        Self {
            origin_x: (field_width - box_width) / 2.0,
            top: GRID_TOP,
            cell,
            enemy_size: cell - Vec2::splat(padding),
        }
    }

    pub fn slot_position(&self, row: usize, col: usize) -> Vec2 {
        Vec2::new(
            self.origin_x + self.cell.x * col as f32,
            self.top + self.cell.y * row as f32,
        )
    }

    /// Fresh enemy for a slot, initially heading left at `speed`
    pub fn spawn(&self, row: usize, col: usize, speed: f32) -> Enemy {
        Enemy {
            row,
            col,
            pos: self.slot_position(row, col),
            size: self.enemy_size,
            direction: -speed,
        }
    }
}

/// Row-major grid of enemy slots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Formation {
    rows: usize,
    cols: usize,
    layout: GridLayout,
    slots: Vec<Option<Enemy>>,
    /// Enemies destroyed this wave
    kills: u32,
}

impl Formation {
    pub fn new(rows: usize, cols: usize, field_width: f32, speed: f32) -> Self {
        let mut formation = Self {
            rows,
            cols,
            layout: GridLayout::new(field_width, cols),
            slots: Vec::with_capacity(rows * cols),
            kills: 0,
        };
        formation.repopulate(speed);
        formation
    }

    /// Fill every slot with a fresh enemy and reset the kill counter
    pub fn repopulate(&mut self, speed: f32) {
        self.slots.clear();
        for row in 0..self.rows {
            for col in 0..self.cols {
                self.slots.push(Some(self.layout.spawn(row, col, speed)));
            }
        }
        self.kills = 0;
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn kills(&self) -> u32 {
        self.kills
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then_some(row * self.cols + col)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Enemy> {
        self.index(row, col)
            .and_then(|i| self.slots[i].as_ref())
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut Enemy> {
        let i = self.index(row, col)?;
        self.slots[i].as_mut()
    }

    /// Empty a slot; it stays empty until the next repopulate
    pub fn remove(&mut self, row: usize, col: usize) -> Option<Enemy> {
        let i = self.index(row, col)?;
        let enemy = self.slots[i].take()?;
        self.kills += 1;
        Some(enemy)
    }

    /// Live enemies in row-major order
    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.slots.iter().flatten()
    }

    pub fn live_count(&self) -> usize {
        self.iter().count()
    }

    pub fn is_cleared(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Slide every live enemy along its direction
    pub fn apply_physics(&mut self) {
        for enemy in self.slots.iter_mut().flatten() {
            enemy.pos.x += enemy.direction * ENEMY_SPEED;
        }
    }

    /// Row of the surviving enemy closest to the player in `col`
    pub fn frontmost_row(&self, col: usize) -> Option<usize> {
        (0..self.rows)
            .rev()
            .find(|&row| self.get(row, col).is_some())
    }

    pub fn is_frontmost(&self, row: usize, col: usize) -> bool {
        self.frontmost_row(col) == Some(row)
    }

    /// Reverse and descend every live enemy; true if any reached `threshold_y`
    pub fn advance_all(&mut self, threshold_y: f32) -> bool {
        let mut landed = false;
        for enemy in self.slots.iter_mut().flatten() {
            landed |= enemy.advance(threshold_y);
        }
        landed
    }
}
