use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Debug, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileColor {
    Blue = 0,
    Yellow = 1,
    Red = 2,
    Black = 3,
    White = 4,
}

impl TileColor {
    pub const ALL: [TileColor; 5] = [
        TileColor::Blue,
        TileColor::Yellow,
        TileColor::Red,
        TileColor::Black,
        TileColor::White,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Single-letter code used by the position notation.
    pub fn letter(self) -> char {
        match self {
            TileColor::Blue => 'b',
            TileColor::Yellow => 'y',
            TileColor::Red => 'r',
            TileColor::Black => 'k',
            TileColor::White => 'w',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'b' => Some(TileColor::Blue),
            'y' => Some(TileColor::Yellow),
            'r' => Some(TileColor::Red),
            'k' => Some(TileColor::Black),
            'w' => Some(TileColor::White),
            _ => None,
        }
    }
}

impl fmt::Display for TileColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let color_str = match self {
            TileColor::Blue => "blue",
            TileColor::Yellow => "yellow",
            TileColor::Red => "red",
            TileColor::Black => "black",
            TileColor::White => "white",
        };
        write!(f, "{}", color_str)
    }
}

// used for parsing cli args
type ParseError = &'static str;
impl FromStr for TileColor {
    type Err = ParseError;
    fn from_str(color: &str) -> Result<Self, Self::Err> {
        match color {
            "blue" | "b" => Ok(TileColor::Blue),
            "yellow" | "y" => Ok(TileColor::Yellow),
            "red" | "r" => Ok(TileColor::Red),
            "black" | "k" => Ok(TileColor::Black),
            "white" | "w" => Ok(TileColor::White),
            _ => Err("invalid tile color; options are: blue, yellow, red, black, white"),
        }
    }
}

/// Multiset of tiles, one counter per color.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct TileCounts([u8; 5]);

impl TileCounts {
    pub fn new(counts: [u8; 5]) -> Self {
        Self(counts)
    }

    pub fn full_bag(per_color: u8) -> Self {
        Self([per_color; 5])
    }

    pub fn get(&self, color: TileColor) -> u8 {
        self.0[color.index()]
    }

    pub fn add(&mut self, color: TileColor, count: u8) {
        self.0[color.index()] = self.0[color.index()].saturating_add(count);
    }

    pub fn add_all(&mut self, other: &TileCounts) {
        for color in TileColor::ALL.iter() {
            self.add(*color, other.get(*color));
        }
    }

    /// Removes every tile of `color`, returning how many were removed.
    pub fn take_all(&mut self, color: TileColor) -> u8 {
        let taken = self.0[color.index()];
        self.0[color.index()] = 0;
        taken
    }

    pub fn remove_one(&mut self, color: TileColor) -> bool {
        let slot = &mut self.0[color.index()];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    pub fn total(&self) -> u32 {
        self.0.iter().map(|&count| count as u32).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn clear(&mut self) {
        self.0 = [0; 5];
    }

    /// Colors with at least one tile, in color order.
    pub fn colors(&self) -> impl Iterator<Item = TileColor> + '_ {
        TileColor::ALL
            .iter()
            .copied()
            .filter(move |color| self.get(*color) > 0)
    }

    pub fn as_array(&self) -> [u8; 5] {
        self.0
    }
}

impl fmt::Display for TileCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for color in TileColor::ALL.iter() {
            for _ in 0..self.get(*color) {
                write!(f, "{}", color.letter())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_round_trip() {
        for color in TileColor::ALL.iter() {
            assert_eq!(Some(*color), TileColor::from_letter(color.letter()));
        }
        assert_eq!(None, TileColor::from_letter('x'));
    }

    #[test]
    fn test_parse_color_names() {
        assert_eq!(TileColor::Black, TileColor::from_str("black").unwrap());
        assert_eq!(TileColor::Black, TileColor::from_str("k").unwrap());
        assert!(TileColor::from_str("green").is_err());
    }

    #[test]
    fn test_take_all_empties_color() {
        let mut counts = TileCounts::new([2, 0, 3, 0, 1]);
        assert_eq!(3, counts.take_all(TileColor::Red));
        assert_eq!(0, counts.get(TileColor::Red));
        assert_eq!(3, counts.total());
    }

    #[test]
    fn test_display_is_color_ordered() {
        let counts = TileCounts::new([1, 0, 2, 1, 0]);
        assert_eq!("brrk", counts.to_string());
        let colors: Vec<TileColor> = counts.colors().collect();
        assert_eq!(vec![TileColor::Blue, TileColor::Red, TileColor::Black], colors);
    }
}
