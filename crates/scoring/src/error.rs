use std::fmt;

use thiserror::Error;

/// Where in the request an invalid record was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryLocation {
    Question { question: usize, entry: usize },
    Section { section: usize, entry: usize },
}

impl fmt::Display for EntryLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 1-based
        match self {
            Self::Question { question, entry } => {
                write!(f, "question {}, entry {}", question + 1, entry + 1)
            }
            Self::Section { section, entry } => {
                write!(f, "section {}, entry {}", section + 1, entry + 1)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("{location}: missing field '{field}'")]
    MissingField {
        location: EntryLocation,
        field: &'static str,
    },

    #[error("{location}: field '{field}' is not a valid ISO-8601 timestamp: '{value}'")]
    InvalidTimestamp {
        location: EntryLocation,
        field: &'static str,
        value: String,
    },

    #[error("{location}: field '{field}' must be a finite number")]
    NonFiniteScore {
        location: EntryLocation,
        field: &'static str,
    },

    #[error("Computation error: {0}")]
    Computation(String),
}

pub type Result<T> = std::result::Result<T, RankingError>;

impl RankingError {
    /// True for errors caused by the caller's input rather than the computation.
    pub fn is_validation(&self) -> bool {
        !matches!(self, RankingError::Computation(_))
    }
}
