//! Where a session's positions come from.

use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::azul_move::{EnumeratorConfig, MoveEnumerator};
use crate::game::{AzulRules, AzulState, GamePhase, Rules};

use super::error::SessionError;

/// One encoded position and, optionally, the phase to analyze it under.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionInput {
    pub encoding: String,
    pub phase: Option<GamePhase>,
}

impl PositionInput {
    pub fn new(encoding: &str) -> Self {
        Self {
            encoding: encoding.to_string(),
            phase: None,
        }
    }

    pub fn of(state: &AzulState) -> Self {
        Self {
            encoding: state.to_string(),
            phase: None,
        }
    }

    pub fn with_phase(mut self, phase: GamePhase) -> Self {
        self.phase = Some(phase);
        self
    }
}

/// Consumed lazily, one position at a time, by the session thread.
pub type PositionSource = Box<dyn Iterator<Item = PositionInput> + Send>;

/// A description of a source that can be reopened to resume a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceSpec {
    Random {
        seed: u64,
        player_count: usize,
        max_plies: u32,
    },
    File {
        path: PathBuf,
    },
}

impl SourceSpec {
    pub fn open(&self) -> Result<PositionSource, SessionError> {
        match self {
            SourceSpec::Random {
                seed,
                player_count,
                max_plies,
            } => Ok(Box::new(RandomPositions::new(*seed, *player_count, *max_plies))),
            SourceSpec::File { path } => Ok(Box::new(FilePositions::load(path)?.into_iter())),
        }
    }
}

/// Endless stream of positions reached by random play from seeded new games.
pub struct RandomPositions {
    rng: StdRng,
    player_count: usize,
    max_plies: u32,
}

impl RandomPositions {
    pub fn new(seed: u64, player_count: usize, max_plies: u32) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            player_count,
            max_plies,
        }
    }

    fn play_out(&mut self) -> Option<AzulState> {
        let rules = AzulRules;
        let enumerator = MoveEnumerator::new(
            &rules,
            EnumeratorConfig {
                filter_dominated: true,
                ..EnumeratorConfig::default()
            },
        );
        let mut state = AzulState::new_game(self.player_count, &mut self.rng).ok()?;
        let plies = self.rng.gen_range(0..=self.max_plies);
        for _ in 0..plies {
            let moves = enumerator.enumerate(&state);
            if moves.is_empty() {
                break;
            }
            let chosen = moves[self.rng.gen_range(0..moves.len())];
            match rules.apply(&state, &chosen) {
                Ok(next) if !next.game_over => state = next,
                _ => break,
            }
        }
        Some(state)
    }
}

impl Iterator for RandomPositions {
    type Item = PositionInput;

    fn next(&mut self) -> Option<Self::Item> {
        self.play_out().map(|state| PositionInput::of(&state))
    }
}

/// Positions read from a text file, one per line, optionally followed by a
/// tab and a phase name. Blank lines and `#` comments are skipped.
pub struct FilePositions;

impl FilePositions {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<PositionInput>, SessionError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|err| {
            SessionError::Fatal(format!("could not read {}: {}", path.display(), err))
        })?;
        Ok(Self::parse(&contents))
    }

    pub fn parse(contents: &str) -> Vec<PositionInput> {
        contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| {
                let mut fields = line.splitn(2, '\t');
                let encoding = fields.next().unwrap_or_default();
                let input = PositionInput::new(encoding.trim());
                match fields.next().map(str::trim) {
                    Some(phase) if !phase.is_empty() => {
                        input.with_phase(phase.parse().unwrap_or(GamePhase::Unknown))
                    }
                    _ => input,
                }
            })
            .collect()
    }
}
