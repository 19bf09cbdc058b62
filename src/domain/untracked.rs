use std::{
    iter::Sum,
    ops::{Add, AddAssign},
};

use serde::Serialize;

/// Interactions that exist in the content tree but cannot be attributed to a
/// pair of teams.
///
/// The breakdown is kept for diagnostics; [`Untracked::total`] is the single
/// figure reported for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Untracked {
    /// Answers and direct comments under a post whose author was deleted.
    pub orphaned: usize,

    /// Answers or comments whose own author was deleted.
    pub deleted_participants: usize,

    /// Participants whose id is not in the user directory.
    pub unknown_users: usize,

    /// Participants in the directory without a team.
    pub missing_teams: usize,
}

impl Untracked {
    /// The total number of untracked interactions.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.orphaned + self.deleted_participants + self.unknown_users + self.missing_teams
    }
}

impl AddAssign for Untracked {
    fn add_assign(&mut self, other: Self) {
        self.orphaned += other.orphaned;
        self.deleted_participants += other.deleted_participants;
        self.unknown_users += other.unknown_users;
        self.missing_teams += other.missing_teams;
    }
}

impl Add for Untracked {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl Sum for Untracked {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}
