pub mod dto;
pub mod error;
pub mod models;
pub mod services;

pub use error::{RankingError, Result};
pub use services::leaderboard::{finalize_across_sections, normalize_and_rank};
