use std::{
    borrow::Borrow,
    collections::BTreeMap,
    fmt,
    hash::{Hash, Hasher},
    ops::Deref,
    str::FromStr,
};

use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};

/// Identifier of a forum user.
///
/// Platform accounts such as the community user have ids below 1, so ids are
/// signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wraps a raw numeric user id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw numeric id.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A resolved team label.
///
/// Team labels are never empty. A user whose team string is empty (either
/// upstream or after normalization) has no team at all.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Team(NonEmptyString);

impl Team {
    /// Creates a team label, returning `None` for an empty string.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        NonEmptyString::new(name.into()).ok().map(Self)
    }

    /// Returns the label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Error returned when parsing an empty team label.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("team labels must not be empty")]
pub struct EmptyTeamError;

impl TryFrom<String> for Team {
    type Error = EmptyTeamError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(EmptyTeamError)
    }
}

impl FromStr for Team {
    type Err = EmptyTeamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_string())
    }
}

impl From<Team> for String {
    fn from(team: Team) -> Self {
        team.as_str().to_owned()
    }
}

// Hashes like `str` so that `Borrow<str>` lookups work in hashed collections.
impl Hash for Team {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl Deref for Team {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl AsRef<str> for Team {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for Team {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user as exported by the upstream user directory.
///
/// The upstream export calls the team field `department`; both names are
/// accepted. Any other fields in the export are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// The user's id.
    pub id: UserId,

    /// The raw team string, if any.
    #[serde(default, alias = "department")]
    pub team: Option<String>,
}

impl User {
    /// Creates a user with an optional raw team string.
    #[must_use]
    pub fn new(id: i64, team: Option<&str>) -> Self {
        Self {
            id: UserId::new(id),
            team: team.map(ToString::to_string),
        }
    }
}

/// How raw team strings are normalized while the directory is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TeamNormalization {
    /// Team strings are used as-is.
    #[default]
    PassThrough,

    /// Team strings found in the mapping are replaced by the mapped value.
    /// Unmapped teams are kept unchanged.
    Rename(BTreeMap<String, String>),

    /// Trailing non-alphabetic characters are removed, so `PM63` becomes `PM`
    /// and `Engineering 2.1` becomes `Engineering`.
    StripTrailingNumber,
}

impl TeamNormalization {
    /// Normalizes a raw team string into a team label.
    ///
    /// Returns `None` if there is no raw team, or if normalization leaves an
    /// empty string.
    #[must_use]
    pub fn apply(&self, raw: Option<&str>) -> Option<Team> {
        let raw = raw?;
        match self {
            Self::PassThrough => Team::new(raw),
            Self::Rename(mapping) => Team::new(mapping.get(raw).map_or(raw, String::as_str)),
            Self::StripTrailingNumber => Team::new(strip_trailing_number(raw)),
        }
    }
}

/// Removes trailing characters from a team name until the last character is
/// alphabetic.
#[must_use]
pub fn strip_trailing_number(team: &str) -> &str {
    team.trim_end_matches(|c: char| !c.is_alphabetic())
}
