//! Exhaustive candidate move generation for a position.

use log::debug;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::game::state::PATTERN_LINE_COUNT;
use crate::game::{AzulState, PlayerBoard, Rules};

use super::move_orderer::{HeuristicMoveOrderer, MoveOrderer, NoOpMoveOrderer};
use super::{AzulMove, Destination};

/// Enumeration stages. With everything off the enumeration is exhaustive and
/// in insertion order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumeratorConfig {
    /// Drop moves that send strictly more tiles to the floor than an
    /// otherwise identical move.
    pub filter_dominated: bool,
    /// Reorder (never drop) moves by a cheap heuristic, before the cap.
    pub prioritize: bool,
    /// Keep at most this many moves, after prioritization.
    pub max_moves: Option<usize>,
}

impl EnumeratorConfig {
    pub fn exhaustive() -> Self {
        Self::default()
    }
}

pub struct MoveEnumerator<'a> {
    rules: &'a dyn Rules,
    config: EnumeratorConfig,
    orderer: &'a dyn MoveOrderer,
}

impl<'a> MoveEnumerator<'a> {
    /// Orders with [`HeuristicMoveOrderer`] when `config.prioritize` is set.
    pub fn new(rules: &'a dyn Rules, config: EnumeratorConfig) -> Self {
        let orderer: &'a dyn MoveOrderer = if config.prioritize {
            &HeuristicMoveOrderer
        } else {
            &NoOpMoveOrderer
        };
        Self {
            rules,
            config,
            orderer,
        }
    }

    pub fn with_orderer(mut self, orderer: &'a dyn MoveOrderer) -> Self {
        self.orderer = orderer;
        self
    }

    /// Every candidate move for the player to act. Terminal or malformed
    /// positions yield no moves.
    pub fn enumerate(&self, state: &AzulState) -> Vec<AzulMove> {
        if let Err(err) = self.rules.validate(state) {
            debug!("Not enumerating malformed position: {}", err);
            return Vec::new();
        }
        if self.rules.is_terminal(state) {
            return Vec::new();
        }

        let player = state.current_player;
        let board = &state.players[player];
        let mut seen = FxHashSet::default();
        let mut moves = Vec::new();

        for take in self.rules.legal_moves(state, player) {
            let available = state.tiles_at(take.source, take.color);
            let max_count = match take.destination {
                Destination::PatternLine(line) if (line as usize) < PATTERN_LINE_COUNT => {
                    available.min(board.remaining_capacity(line as usize))
                }
                Destination::PatternLine(_) => 0,
                Destination::Floor => available,
            };
            for count in 1..=max_count {
                let candidate = AzulMove::new(take.source, take.color, count, take.destination);
                if seen.insert(candidate) {
                    moves.push(candidate);
                }
            }
        }

        if self.config.filter_dominated {
            moves.retain(|candidate| !is_dominated(state, board, candidate));
        }
        self.orderer.order_moves(&mut moves, state);
        if let Some(max_moves) = self.config.max_moves {
            moves.truncate(max_moves);
        }

        debug!("Enumerated {} moves", moves.len());
        moves
    }
}

/// A move is dominated when the same draft could keep more tiles off the
/// floor: a partial floor move, or a pattern-line move that stops short of
/// the line's remaining room.
fn is_dominated(state: &AzulState, board: &PlayerBoard, candidate: &AzulMove) -> bool {
    let available = state.tiles_at(candidate.source(), candidate.color());
    match candidate.destination() {
        Destination::Floor => candidate.count() < available,
        Destination::PatternLine(line) => {
            candidate.count() < available.min(board.remaining_capacity(line as usize))
        }
    }
}
