//! The user directory index.
//!
//! The [`UserDirectory`] is built once from the upstream user list and maps
//! each user id to a normalized team. It is never mutated afterwards.

use std::collections::{BTreeMap, HashMap, hash_map::Entry};

use crate::domain::{Team, TeamNormalization, User, UserId};

/// Users with ids below this are platform accounts (the community user and
/// user groups) and are never indexed.
pub const DEFAULT_MIN_USER_ID: i64 = 2;

/// Options controlling how the directory is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryOptions {
    /// Users with an id below this are excluded.
    pub min_user_id: i64,

    /// An additional, higher threshold used against staging sites whose
    /// early ids belong to seeded demo accounts.
    pub staging_min_user_id: Option<i64>,

    /// How raw team strings are normalized.
    pub normalization: TeamNormalization,
}

impl Default for DirectoryOptions {
    fn default() -> Self {
        Self {
            min_user_id: DEFAULT_MIN_USER_ID,
            staging_min_user_id: None,
            normalization: TeamNormalization::default(),
        }
    }
}

impl DirectoryOptions {
    fn admits(&self, id: UserId) -> bool {
        id.get() >= self.min_user_id
            && self
                .staging_min_user_id
                .is_none_or(|threshold| id.get() >= threshold)
    }
}

/// The result of looking up a user's team.
///
/// "Unknown user" and "known user without a team" are kept apart here, even
/// though extraction treats both as untracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamLookup<'a> {
    /// The id is not in the directory, typically a deleted or excluded user.
    UnknownUser,
    /// The user is known but has no team on file.
    NoTeam,
    /// The user's team.
    Team(&'a Team),
}

impl<'a> TeamLookup<'a> {
    /// Returns the team, if there is one.
    #[must_use]
    pub const fn team(self) -> Option<&'a Team> {
        match self {
            Self::Team(team) => Some(team),
            Self::UnknownUser | Self::NoTeam => None,
        }
    }
}

/// An index from user id to resolved team.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDirectory {
    teams: HashMap<UserId, Option<Team>>,
}

impl UserDirectory {
    /// Builds the directory from the raw user list.
    ///
    /// Users below the configured thresholds are dropped before indexing, and
    /// each remaining user's team is normalized. If the same id appears more
    /// than once, the first entry wins.
    #[must_use]
    pub fn build(users: impl IntoIterator<Item = User>, options: &DirectoryOptions) -> Self {
        let mut teams = HashMap::new();
        let mut excluded = 0_usize;

        for user in users {
            if !options.admits(user.id) {
                excluded += 1;
                continue;
            }

            let team = options.normalization.apply(user.team.as_deref());
            match teams.entry(user.id) {
                Entry::Vacant(entry) => {
                    entry.insert(team);
                }
                Entry::Occupied(_) => {
                    tracing::warn!("Duplicate user id {} in user list, keeping first", user.id);
                }
            }
        }

        tracing::debug!(
            indexed = teams.len(),
            excluded,
            "Built user directory"
        );

        Self { teams }
    }

    /// Looks up a user, distinguishing unknown users from users without a
    /// team.
    #[must_use]
    pub fn lookup(&self, id: UserId) -> TeamLookup<'_> {
        match self.teams.get(&id) {
            None => TeamLookup::UnknownUser,
            Some(None) => TeamLookup::NoTeam,
            Some(Some(team)) => TeamLookup::Team(team),
        }
    }

    /// Returns the user's team, or `None` if the user is unknown or has no
    /// team.
    #[must_use]
    pub fn team_of(&self, id: UserId) -> Option<&Team> {
        self.lookup(id).team()
    }

    /// Whether the user is in the directory.
    #[must_use]
    pub fn contains(&self, id: UserId) -> bool {
        self.teams.contains_key(&id)
    }

    /// Number of indexed users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.teams.len()
    }

    /// Whether the directory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// The indexed users with their normalized teams, ordered by id.
    #[must_use]
    pub fn users(&self) -> Vec<User> {
        let mut users: Vec<User> = self
            .teams
            .iter()
            .map(|(id, team)| User {
                id: *id,
                team: team.as_ref().map(ToString::to_string),
            })
            .collect();
        users.sort_by_key(|user| user.id);
        users
    }

    /// Counts users per team. Users without a team are counted under `None`.
    #[must_use]
    pub fn team_sizes(&self) -> BTreeMap<Option<&Team>, usize> {
        let mut sizes = BTreeMap::new();
        for team in self.teams.values() {
            *sizes.entry(team.as_ref()).or_insert(0) += 1;
        }
        sizes
    }
}
