pub mod leaderboard;
pub mod normalization;
