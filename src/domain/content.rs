//! The forum content tree: questions, their answers, and comments.
//!
//! The shapes follow the upstream API export. Lists that are missing from a
//! node deserialize as empty, and an owner without a `user_id` (or no owner at
//! all) marks an account that no longer exists.

use serde::{Deserialize, Serialize};

use crate::domain::UserId;

/// Identifier of a question or an answer.
pub type PostId = u64;

/// The author of a post or comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    /// The author's id. Absent when the account has been deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,

    /// Upstream account type, e.g. `registered` or `does_not_exist`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,

    /// Display name at the time of export.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Owner {
    /// An owner referring to an existing user.
    #[must_use]
    pub fn user(id: i64) -> Self {
        Self {
            user_id: Some(UserId::new(id)),
            user_type: Some("registered".to_string()),
            display_name: None,
        }
    }

    /// An owner whose account no longer exists.
    #[must_use]
    pub fn deleted() -> Self {
        Self {
            user_id: None,
            user_type: Some("does_not_exist".to_string()),
            display_name: None,
        }
    }
}

fn author_of(owner: Option<&Owner>) -> Option<UserId> {
    owner.and_then(|owner| owner.user_id)
}

/// A comment on a question or an answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// The commenter.
    #[serde(default)]
    pub owner: Option<Owner>,
}

impl Comment {
    /// Creates a comment by the given owner.
    #[must_use]
    pub const fn by(owner: Owner) -> Self {
        Self { owner: Some(owner) }
    }

    /// The commenter's id, if the account still exists.
    #[must_use]
    pub fn author(&self) -> Option<UserId> {
        author_of(self.owner.as_ref())
    }
}

/// An answer to a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// The answer's id.
    pub answer_id: PostId,

    /// The id of the question this answers.
    pub question_id: PostId,

    /// The answerer.
    #[serde(default)]
    pub owner: Option<Owner>,

    /// Comments on the answer.
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Answer {
    /// The answerer's id, if the account still exists.
    #[must_use]
    pub fn author(&self) -> Option<UserId> {
        author_of(self.owner.as_ref())
    }
}

/// A question, the root of each content tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// The question's id.
    pub question_id: PostId,

    /// The asker.
    #[serde(default)]
    pub owner: Option<Owner>,

    /// The question's tags. Answers inherit these.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Answers to the question, in upstream order.
    #[serde(default)]
    pub answers: Vec<Answer>,

    /// Comments directly on the question.
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Question {
    /// The asker's id, if the account still exists.
    #[must_use]
    pub fn author(&self) -> Option<UserId> {
        author_of(self.owner.as_ref())
    }
}

/// Whether a post is a question or an answer.
///
/// Determines the direction of edges during aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    /// A question.
    Question,
    /// An answer.
    Answer,
}

/// A borrowed view over either kind of post.
#[derive(Debug, Clone, Copy)]
pub enum Post<'a> {
    /// A question.
    Question(&'a Question),
    /// An answer.
    Answer(&'a Answer),
}

impl<'a> Post<'a> {
    /// The kind of post.
    #[must_use]
    pub const fn kind(self) -> PostKind {
        match self {
            Self::Question(_) => PostKind::Question,
            Self::Answer(_) => PostKind::Answer,
        }
    }

    /// The post's own id.
    #[must_use]
    pub const fn id(self) -> PostId {
        match self {
            Self::Question(question) => question.question_id,
            Self::Answer(answer) => answer.answer_id,
        }
    }

    /// The author's id, if the account still exists.
    #[must_use]
    pub fn author(self) -> Option<UserId> {
        match self {
            Self::Question(question) => question.author(),
            Self::Answer(answer) => answer.author(),
        }
    }

    /// Answers beneath the post. Always empty for an answer.
    #[must_use]
    pub fn answers(self) -> &'a [Answer] {
        match self {
            Self::Question(question) => &question.answers,
            Self::Answer(_) => &[],
        }
    }

    /// Comments directly on the post.
    #[must_use]
    pub fn comments(self) -> &'a [Comment] {
        match self {
            Self::Question(question) => &question.comments,
            Self::Answer(answer) => &answer.comments,
        }
    }
}
