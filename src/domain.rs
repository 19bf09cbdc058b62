//! Domain models for interaction analysis.
//!
//! This module contains the content tree, the user directory, interaction
//! records and the team matrix they aggregate into.

/// The forum content tree.
pub mod content;
pub use content::{Answer, Comment, Owner, Post, PostId, PostKind, Question};

mod config;
pub use config::Config;

/// The user directory index.
pub mod directory;
pub use directory::{DirectoryOptions, TeamLookup, UserDirectory};

/// Interaction record extraction.
pub mod extract;
pub use extract::{ExtractError, Extraction, extract};

/// Team matrix aggregation.
pub mod matrix;
pub use matrix::{Edge, InteractionMatrix, aggregate};

mod record;
pub use record::InteractionRecord;

mod untracked;
pub use untracked::Untracked;

/// Users, user ids and team labels.
pub mod user;
pub use user::{EmptyTeamError, Team, TeamNormalization, User, UserId};
