use indexmap::IndexSet;
use serde::Serialize;

use crate::domain::{PostId, PostKind, Team, UserId};

/// The interactions attracted by a single post.
///
/// A record states that the post's author engaged with the listed users and
/// teams. The author never appears among the interacting users, and neither
/// users nor teams repeat. Both sets keep the order in which participants were
/// first seen.
///
/// Records are produced by [`extract`](crate::domain::extract::extract) and are
/// not modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionRecord {
    source_user: UserId,
    source_team: Option<Team>,
    interacting_users: IndexSet<UserId>,
    interacting_teams: IndexSet<Team>,
    #[serde(rename = "post_type")]
    kind: PostKind,
    #[serde(rename = "id")]
    post_id: PostId,
    tags: Vec<String>,
}

impl InteractionRecord {
    pub(crate) fn new(
        source_user: UserId,
        source_team: Option<Team>,
        kind: PostKind,
        post_id: PostId,
        tags: Vec<String>,
    ) -> Self {
        Self {
            source_user,
            source_team,
            interacting_users: IndexSet::new(),
            interacting_teams: IndexSet::new(),
            kind,
            post_id,
            tags,
        }
    }

    /// Adds a participant. Returns `false` if the participant is the author or
    /// has already been added.
    pub(crate) fn add_user(&mut self, user: UserId) -> bool {
        user != self.source_user && self.interacting_users.insert(user)
    }

    pub(crate) fn add_team(&mut self, team: &Team) {
        if !self.interacting_teams.contains(team) {
            self.interacting_teams.insert(team.clone());
        }
    }

    /// The post's author.
    #[must_use]
    pub const fn source_user(&self) -> UserId {
        self.source_user
    }

    /// The author's team, if known.
    #[must_use]
    pub const fn source_team(&self) -> Option<&Team> {
        self.source_team.as_ref()
    }

    /// Users who answered or commented, excluding the author.
    #[must_use]
    pub const fn interacting_users(&self) -> &IndexSet<UserId> {
        &self.interacting_users
    }

    /// Teams of the interacting users that could be resolved.
    #[must_use]
    pub const fn interacting_teams(&self) -> &IndexSet<Team> {
        &self.interacting_teams
    }

    /// Whether the post is a question or an answer.
    #[must_use]
    pub const fn kind(&self) -> PostKind {
        self.kind
    }

    /// The post's id.
    #[must_use]
    pub const fn post_id(&self) -> PostId {
        self.post_id
    }

    /// The question's tags (inherited, for answers).
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}
