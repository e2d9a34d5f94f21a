use thiserror::Error;

use crate::model::SpeciesId;

/// Failures raised by the randomization engine.
///
/// `NoCandidates` is recoverable: most call sites retry against a coarser
/// pool before giving up. `ConstraintsExhausted` is fatal to the run.
#[derive(Debug, Error)]
pub enum RandomizerError {
    #[error("no candidates available: {0}")]
    NoCandidates(String),

    #[error("{what} could not be satisfied after {attempts} attempts; reduce filtering and try again")]
    ConstraintsExhausted { what: String, attempts: u32 },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown species id {0}")]
    UnknownSpecies(SpeciesId),

    #[error("generation must be in range 1..=7, got {0}")]
    InvalidGeneration(u8),
}

impl RandomizerError {
    pub fn no_candidates(what: impl Into<String>) -> Self {
        RandomizerError::NoCandidates(what.into())
    }

    pub fn exhausted(what: impl Into<String>, attempts: u32) -> Self {
        RandomizerError::ConstraintsExhausted {
            what: what.into(),
            attempts,
        }
    }

    pub fn is_no_candidates(&self) -> bool {
        matches!(self, RandomizerError::NoCandidates(_))
    }
}

pub type Result<T, E = RandomizerError> = std::result::Result<T, E>;
