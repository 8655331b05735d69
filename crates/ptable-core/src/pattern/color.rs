use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::PatternError;
use crate::Color;

/// Named colors accepted by the generator.
///
/// Each selector maps to a triple in stored `(G, R, B)` order, so `rg`
/// lights the green and red positions.
///
/// # Examples
/// ```
/// use ptable_core::{Color, ColorSelector};
///
/// let selector: ColorSelector = "RG".parse().unwrap();
/// assert_eq!(selector.color(), Color::new(255, 255, 0));
/// assert!("purple".parse::<ColorSelector>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ColorSelector {
    G,
    R,
    B,
    Rg,
    Gb,
    Rb,
    #[default]
    W,
}

impl ColorSelector {
    pub const ALL: [ColorSelector; 7] = [
        ColorSelector::G,
        ColorSelector::R,
        ColorSelector::B,
        ColorSelector::Rg,
        ColorSelector::Gb,
        ColorSelector::Rb,
        ColorSelector::W,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ColorSelector::G => "g",
            ColorSelector::R => "r",
            ColorSelector::B => "b",
            ColorSelector::Rg => "rg",
            ColorSelector::Gb => "gb",
            ColorSelector::Rb => "rb",
            ColorSelector::W => "w",
        }
    }

    pub fn color(self) -> Color {
        match self {
            ColorSelector::G => Color::new(255, 0, 0),
            ColorSelector::R => Color::new(0, 255, 0),
            ColorSelector::B => Color::new(0, 0, 255),
            ColorSelector::Rg => Color::new(255, 255, 0),
            ColorSelector::Gb => Color::new(255, 0, 255),
            ColorSelector::Rb => Color::new(0, 255, 255),
            ColorSelector::W => Color::new(255, 255, 255),
        }
    }
}

impl FromStr for ColorSelector {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|selector| selector.key() == key)
            .ok_or(PatternError::InvalidColorSelector {
                selector: s.to_string(),
            })
    }
}

impl TryFrom<String> for ColorSelector {
    type Error = PatternError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ColorSelector> for String {
    fn from(value: ColorSelector) -> Self {
        value.key().to_string()
    }
}

impl fmt::Display for ColorSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
