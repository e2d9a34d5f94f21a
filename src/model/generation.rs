use std::convert::TryFrom;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RandomizerError;

/// A main-series game generation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8")]
#[serde(try_from = "u8")]
pub enum Generation {
    Gen1,
    Gen2,
    Gen3,
    Gen4,
    Gen5,
    Gen6,
    Gen7,
}

impl Generation {
    pub const ALL: [Generation; 7] = [
        Generation::Gen1,
        Generation::Gen2,
        Generation::Gen3,
        Generation::Gen4,
        Generation::Gen5,
        Generation::Gen6,
        Generation::Gen7,
    ];

    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    /// Zero-based position, used to index per-generation tables.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl From<Generation> for u8 {
    fn from(gen: Generation) -> Self {
        gen.number()
    }
}

impl TryFrom<u8> for Generation {
    type Error = RandomizerError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1..=7 => Ok(Generation::ALL[value as usize - 1]),
            _ => Err(RandomizerError::InvalidGeneration(value)),
        }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen{}", self.number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_round_trip() {
        for gen in Generation::ALL {
            assert_eq!(Generation::try_from(gen.number()).unwrap(), gen);
        }
        assert!(Generation::try_from(0).is_err());
        assert!(Generation::try_from(8).is_err());
    }
}
