//! Device group names

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Characters the management service accepts in a group name
const GROUP_PATTERN: &str = r"^[A-Za-z0-9_-]+$";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupError {
    #[error("group name must not be empty")]
    Empty,

    #[error("invalid group name '{0}': only letters, digits, '-' and '_' are allowed")]
    InvalidCharacters(String),
}

/// A validated device group name, immutable once constructed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Group(String);

impl Group {
    pub fn new(name: impl Into<String>) -> Result<Self, GroupError> {
        let name = name.into();
        if name.is_empty() {
            return Err(GroupError::Empty);
        }
        if !group_regex().is_match(&name) {
            return Err(GroupError::InvalidCharacters(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn group_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(GROUP_PATTERN).expect("group pattern is a valid regex"))
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Group {
    type Error = GroupError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Group::new(value)
    }
}

impl From<Group> for String {
    fn from(group: Group) -> Self {
        group.0
    }
}

impl AsRef<str> for Group {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
