use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the five MTG pip colors, or colorless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
    Colorless,
}

impl Color {
    pub fn symbol(&self) -> &'static str {
        match self {
            Color::White => "W",
            Color::Blue => "U",
            Color::Black => "B",
            Color::Red => "R",
            Color::Green => "G",
            Color::Colorless => "C",
        }
    }

    /// The basic land that produces this color's mana.
    pub fn basic_land(&self) -> &'static str {
        match self {
            Color::White => "Plains",
            Color::Blue => "Island",
            Color::Black => "Swamp",
            Color::Red => "Mountain",
            Color::Green => "Forest",
            Color::Colorless => "Wastes",
        }
    }

    pub fn from_symbol(s: &str) -> Option<Color> {
        match s.to_uppercase().as_str() {
            "W" => Some(Color::White),
            "U" => Some(Color::Blue),
            "B" => Some(Color::Black),
            "R" => Some(Color::Red),
            "G" => Some(Color::Green),
            "C" => Some(Color::Colorless),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_symbol() {
        for c in [
            Color::White,
            Color::Blue,
            Color::Black,
            Color::Red,
            Color::Green,
            Color::Colorless,
        ] {
            assert_eq!(Color::from_symbol(c.symbol()), Some(c));
        }
    }

    #[test]
    fn basic_land_names() {
        assert_eq!(Color::Red.basic_land(), "Mountain");
        assert_eq!(Color::Colorless.basic_land(), "Wastes");
    }
}
