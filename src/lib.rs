//! Cross-team interaction analysis
//!
//! Questions, answers and comments from a Q&A forum are reduced to a weighted
//! directed graph of how much each team interacts with every other team.

pub mod domain;
pub use domain::{
    Config, ExtractError, Extraction, InteractionMatrix, InteractionRecord, Question, Team,
    Untracked, User, UserDirectory, UserId, aggregate, extract,
};

/// Loading inputs from and exporting results to the filesystem.
pub mod storage;
pub use storage::{Export, load_questions, load_users};
