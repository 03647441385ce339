use std::hash::{Hash, Hasher};

use rand::Rng;
use rustc_hash::FxHasher;

use super::error::RulesError;
use super::tile::{TileColor, TileCounts};
use crate::azul_move::Source;

pub const PATTERN_LINE_COUNT: usize = 5;
pub const WALL_SIZE: usize = 5;
pub const FLOOR_CAPACITY: usize = 7;
pub const FLOOR_PENALTIES: [i32; FLOOR_CAPACITY] = [1, 1, 2, 2, 2, 3, 3];
pub const TILES_PER_FACTORY: u32 = 4;
pub const TILES_PER_COLOR: u8 = 20;
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;

/// Column of the standard wall where `color` sits in `row`.
pub fn wall_column(row: usize, color: TileColor) -> usize {
    (color.index() + row) % WALL_SIZE
}

/// Color printed on the standard wall at `(row, column)`.
pub fn wall_color(row: usize, column: usize) -> TileColor {
    TileColor::ALL[(column + WALL_SIZE - row) % WALL_SIZE]
}

pub fn factory_count(player_count: usize) -> usize {
    player_count * 2 + 1
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct PatternLine {
    pub color: Option<TileColor>,
    pub count: u8,
}

impl PatternLine {
    pub fn capacity(row: usize) -> u8 {
        (row + 1) as u8
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct PlayerBoard {
    pub score: i32,
    pub pattern_lines: [PatternLine; PATTERN_LINE_COUNT],
    pub wall: [[bool; WALL_SIZE]; WALL_SIZE],
    pub floor: TileCounts,
    pub has_first_player_token: bool,
}

impl PlayerBoard {
    pub fn remaining_capacity(&self, row: usize) -> u8 {
        PatternLine::capacity(row) - self.pattern_lines[row].count
    }

    pub fn wall_has(&self, row: usize, color: TileColor) -> bool {
        self.wall[row][wall_column(row, color)]
    }

    /// Whether `color` may be added to pattern line `row`.
    pub fn can_place(&self, row: usize, color: TileColor) -> bool {
        if row >= PATTERN_LINE_COUNT || self.wall_has(row, color) {
            return false;
        }
        let line = &self.pattern_lines[row];
        match line.color {
            Some(existing) if existing != color => false,
            _ => line.count < PatternLine::capacity(row),
        }
    }

    /// Floor slots in use, counting the first player token.
    pub fn floor_len(&self) -> usize {
        self.floor.total() as usize + self.has_first_player_token as usize
    }

    pub fn floor_penalty(&self) -> i32 {
        FLOOR_PENALTIES
            .iter()
            .take(self.floor_len().min(FLOOR_CAPACITY))
            .sum()
    }

    pub fn wall_tile_count(&self) -> usize {
        self.wall.iter().flatten().filter(|&&filled| filled).count()
    }

    pub fn row_tile_count(&self, row: usize) -> usize {
        self.wall[row].iter().filter(|&&filled| filled).count()
    }

    pub fn completed_rows(&self) -> usize {
        (0..WALL_SIZE)
            .filter(|&row| self.row_tile_count(row) == WALL_SIZE)
            .count()
    }

    pub fn completed_columns(&self) -> usize {
        (0..WALL_SIZE)
            .filter(|&column| (0..WALL_SIZE).all(|row| self.wall[row][column]))
            .count()
    }

    pub fn completed_colors(&self) -> usize {
        TileColor::ALL
            .iter()
            .filter(|&&color| (0..WALL_SIZE).all(|row| self.wall_has(row, color)))
            .count()
    }

    /// Points scored by a tile newly placed at `(row, column)`.
    pub fn adjacency_points(&self, row: usize, column: usize) -> i32 {
        let run = |dr: isize, dc: isize| {
            let mut length = 0;
            let (mut r, mut c) = (row as isize + dr, column as isize + dc);
            while (0..WALL_SIZE as isize).contains(&r)
                && (0..WALL_SIZE as isize).contains(&c)
                && self.wall[r as usize][c as usize]
            {
                length += 1;
                r += dr;
                c += dc;
            }
            length
        };

        let horizontal = 1 + run(0, -1) + run(0, 1);
        let vertical = 1 + run(-1, 0) + run(1, 0);
        match (horizontal > 1, vertical > 1) {
            (true, true) => horizontal + vertical,
            (true, false) => horizontal,
            (false, true) => vertical,
            (false, false) => 1,
        }
    }

    /// Puts up to `count` tiles on the floor, spilling the excess into `lid`.
    pub fn add_to_floor(&mut self, color: TileColor, count: u8, lid: &mut TileCounts) {
        let free = FLOOR_CAPACITY.saturating_sub(self.floor_len()) as u8;
        let kept = count.min(free);
        self.floor.add(color, kept);
        lid.add(color, count - kept);
    }
}

/// A complete Azul position at a decision point.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct AzulState {
    pub factories: Vec<TileCounts>,
    pub center: TileCounts,
    pub first_player_token_in_center: bool,
    pub players: Vec<PlayerBoard>,
    pub current_player: usize,
    pub round: u32,
    pub bag: TileCounts,
    pub lid: TileCounts,
    pub game_over: bool,
}

impl AzulState {
    /// An empty table for `player_count` players, before the factories are filled.
    pub fn empty(player_count: usize) -> Result<Self, RulesError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count) {
            return Err(RulesError::InvalidPlayerCount { player_count });
        }
        Ok(Self {
            factories: vec![TileCounts::default(); factory_count(player_count)],
            center: TileCounts::default(),
            first_player_token_in_center: true,
            players: vec![PlayerBoard::default(); player_count],
            current_player: 0,
            round: 1,
            bag: TileCounts::full_bag(TILES_PER_COLOR),
            lid: TileCounts::default(),
            game_over: false,
        })
    }

    /// Starts a new game, drawing the first round's factories at random.
    pub fn new_game<R: Rng>(player_count: usize, rng: &mut R) -> Result<Self, RulesError> {
        let mut state = Self::empty(player_count)?;
        state.fill_factories(|bag| {
            let total = bag.total();
            if total == 0 {
                return None;
            }
            let mut pick = rng.gen_range(0..total);
            for color in TileColor::ALL.iter() {
                let available = bag.get(*color) as u32;
                if pick < available {
                    return Some(*color);
                }
                pick -= available;
            }
            None
        });
        Ok(state)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn current_board(&self) -> &PlayerBoard {
        &self.players[self.current_player]
    }

    pub fn source_tiles(&self, source: Source) -> Option<&TileCounts> {
        match source {
            Source::Factory(index) => self.factories.get(index as usize),
            Source::Center => Some(&self.center),
        }
    }

    pub fn tiles_at(&self, source: Source, color: TileColor) -> u8 {
        self.source_tiles(source)
            .map(|tiles| tiles.get(color))
            .unwrap_or(0)
    }

    /// Every non-empty source, factories first, then the center.
    pub fn sources(&self) -> Vec<(Source, TileCounts)> {
        self.factories
            .iter()
            .enumerate()
            .map(|(index, tiles)| (Source::Factory(index as u8), *tiles))
            .chain(std::iter::once((Source::Center, self.center)))
            .filter(|(_, tiles)| !tiles.is_empty())
            .collect()
    }

    pub fn tiles_on_table(&self) -> u32 {
        self.factories.iter().map(TileCounts::total).sum::<u32>() + self.center.total()
    }

    pub fn round_over(&self) -> bool {
        self.tiles_on_table() == 0
    }

    pub fn position_hash(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Fills every factory with up to four tiles, recycling the lid into the
    /// bag when it runs dry. `draw` picks a color from the current bag.
    pub(crate) fn fill_factories<F>(&mut self, mut draw: F)
    where
        F: FnMut(&TileCounts) -> Option<TileColor>,
    {
        for factory_index in 0..self.factories.len() {
            for _ in 0..TILES_PER_FACTORY {
                if self.bag.is_empty() {
                    if self.lid.is_empty() {
                        return;
                    }
                    self.bag.add_all(&self.lid);
                    self.lid.clear();
                }
                let color = match draw(&self.bag) {
                    Some(color) => color,
                    None => return,
                };
                if self.bag.remove_one(color) {
                    self.factories[factory_index].add(color, 1);
                }
            }
        }
    }
}
