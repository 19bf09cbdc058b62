//! Extraction of interaction records from the content tree.
//!
//! Questions are walked in order. Each question's answers are extracted as a
//! list of their own with the same rules, so that answers that attracted
//! comments get a record of their own.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, instrument, trace};

use crate::domain::{
    InteractionRecord, PostId, Question, TeamLookup, Untracked, UserDirectory, UserId,
    content::Post,
};

/// Errors that abort extraction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// An answer points at a question that is not in the question list, so its
    /// tags and asker cannot be resolved.
    #[error("answer {answer_id} belongs to question {question_id}, which is not in the question list")]
    MissingQuestion {
        /// The answer's id.
        answer_id: PostId,
        /// The question id the answer refers to.
        question_id: PostId,
    },
}

/// The output of a run of the extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// One record per eligible post.
    pub records: Vec<InteractionRecord>,

    /// Interactions that could not be attributed.
    pub untracked: Untracked,
}

impl Extraction {
    fn absorb(&mut self, other: Self) {
        self.records.extend(other.records);
        self.untracked += other.untracked;
    }
}

/// Extracts interaction records from a list of questions.
///
/// # Errors
///
/// Returns [`ExtractError::MissingQuestion`] if an answer refers to a question
/// that is not in `questions`.
#[instrument(level = "debug", skip_all, fields(questions = questions.len()))]
pub fn extract(
    questions: &[Question],
    directory: &UserDirectory,
) -> Result<Extraction, ExtractError> {
    let extractor = Extractor::new(questions, directory);
    let extraction = extractor.extract_posts(questions.iter().map(Post::Question))?;

    debug!(
        records = extraction.records.len(),
        untracked = extraction.untracked.total(),
        "Extraction complete"
    );

    Ok(extraction)
}

struct Extractor<'a> {
    directory: &'a UserDirectory,
    questions: HashMap<PostId, &'a Question>,
}

impl<'a> Extractor<'a> {
    fn new(questions: &'a [Question], directory: &'a UserDirectory) -> Self {
        let mut by_id = HashMap::with_capacity(questions.len());
        for question in questions {
            by_id.entry(question.question_id).or_insert(question);
        }
        Self {
            directory,
            questions: by_id,
        }
    }

    fn extract_posts(
        &self,
        posts: impl IntoIterator<Item = Post<'a>>,
    ) -> Result<Extraction, ExtractError> {
        let mut extraction = Extraction::default();
        for post in posts {
            extraction.absorb(self.extract_post(post)?);
        }
        Ok(extraction)
    }

    fn extract_post(&self, post: Post<'a>) -> Result<Extraction, ExtractError> {
        let mut extraction = Extraction::default();

        let Some(source_user) = post.author() else {
            // Only direct children are counted; comments on the answers of an
            // orphaned question are not visited.
            let orphaned = post.answers().len() + post.comments().len();
            trace!(post = post.id(), orphaned, "Author deleted, skipping post");
            extraction.untracked.orphaned += orphaned;
            return Ok(extraction);
        };

        let question = self.question_of(post)?;
        let mut record = InteractionRecord::new(
            source_user,
            self.directory.team_of(source_user).cloned(),
            post.kind(),
            post.id(),
            question.tags.clone(),
        );

        let answers = post.answers();
        for answer in answers {
            self.attribute(&mut record, answer.author(), &mut extraction.untracked);
        }
        if !answers.is_empty() {
            extraction.absorb(self.extract_posts(answers.iter().map(Post::Answer))?);
        }

        let comments = post.comments();
        if matches!(post, Post::Answer(_)) && comments.is_empty() {
            trace!(post = post.id(), "Answer without comments, no record");
            return Ok(extraction);
        }

        let asker = question.author();
        for comment in comments {
            let commenter = comment.author();
            if commenter.is_some() && commenter == asker {
                continue;
            }
            self.attribute(&mut record, commenter, &mut extraction.untracked);
        }

        extraction.records.push(record);
        Ok(extraction)
    }

    /// The question a post belongs to: itself, or an answer's parent.
    fn question_of(&self, post: Post<'a>) -> Result<&'a Question, ExtractError> {
        match post {
            Post::Question(question) => Ok(question),
            Post::Answer(answer) => self
                .questions
                .get(&answer.question_id)
                .copied()
                .ok_or(ExtractError::MissingQuestion {
                    answer_id: answer.answer_id,
                    question_id: answer.question_id,
                }),
        }
    }

    fn attribute(
        &self,
        record: &mut InteractionRecord,
        participant: Option<UserId>,
        untracked: &mut Untracked,
    ) {
        let Some(user) = participant else {
            untracked.deleted_participants += 1;
            return;
        };

        if !record.add_user(user) {
            return;
        }

        match self.directory.lookup(user) {
            TeamLookup::Team(team) => record.add_team(team),
            TeamLookup::NoTeam => untracked.missing_teams += 1,
            TeamLookup::UnknownUser => untracked.unknown_users += 1,
        }
    }
}
