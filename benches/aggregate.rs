//! This bench extracts and aggregates interactions from a synthetic forum
//! with a few thousand questions spread across a dozen teams.

#![allow(missing_docs)]

use criterion::{Criterion, criterion_group, criterion_main};
use interactions::{
    UserDirectory, aggregate,
    domain::{Answer, Comment, DirectoryOptions, Owner, Question, User},
    extract,
};

const USERS: i64 = 500;
const TEAMS: i64 = 12;
const QUESTIONS: u64 = 5_000;

fn user_for(seed: u64) -> i64 {
    i64::try_from(seed % USERS.unsigned_abs()).unwrap_or(0) + 2
}

fn directory() -> UserDirectory {
    let users = (2..USERS + 2).map(|id| {
        let team = (id % 7 != 0).then(|| format!("Team {}", id % TEAMS));
        User::new(id, team.as_deref())
    });
    UserDirectory::build(users, &DirectoryOptions::default())
}

fn questions() -> Vec<Question> {
    (1..=QUESTIONS)
        .map(|id| {
            let answers = (0..id % 4)
                .map(|n| Answer {
                    answer_id: QUESTIONS + id * 4 + n,
                    question_id: id,
                    owner: Some(Owner::user(user_for(id * 7 + n))),
                    comments: (0..n)
                        .map(|c| Comment::by(Owner::user(user_for(id * 13 + c))))
                        .collect(),
                })
                .collect();
            let owner = if id % 50 == 0 {
                Owner::deleted()
            } else {
                Owner::user(user_for(id))
            };
            Question {
                question_id: id,
                owner: Some(owner),
                tags: vec!["bench".to_string()],
                answers,
                comments: (0..id % 3)
                    .map(|c| Comment::by(Owner::user(user_for(id * 31 + c))))
                    .collect(),
            }
        })
        .collect()
}

fn extract_and_aggregate(c: &mut Criterion) {
    let directory = directory();
    let questions = questions();

    c.bench_function("extract", |b| {
        b.iter(|| extract(&questions, &directory).unwrap());
    });

    let records = extract(&questions, &directory).unwrap().records;
    c.bench_function("aggregate", |b| {
        b.iter(|| aggregate(&records));
    });
}

criterion_group!(benches, extract_and_aggregate);
criterion_main!(benches);
