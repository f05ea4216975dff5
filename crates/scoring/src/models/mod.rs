mod accumulated;
mod score_entry;
mod timestamp;

pub use accumulated::AccumulatedResult;
pub use score_entry::{QuestionBlock, ScoreEntry};
pub use timestamp::Timestamp;
