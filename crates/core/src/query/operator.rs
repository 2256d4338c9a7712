use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ForgeError;

/// String comparison used by a query clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryOperator {
    /// Exact match.
    StringEquals,
    /// Substring containment; no wildcard syntax.
    StringLike,
}

impl QueryOperator {
    pub const ALL: [QueryOperator; 2] = [QueryOperator::StringEquals, QueryOperator::StringLike];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryOperator::StringEquals => "StringEquals",
            QueryOperator::StringLike => "StringLike",
        }
    }

    pub fn matches(&self, actual: &str, expected: &str) -> bool {
        match self {
            QueryOperator::StringEquals => actual == expected,
            QueryOperator::StringLike => actual.contains(expected),
        }
    }
}

impl fmt::Display for QueryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryOperator {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QueryOperator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| ForgeError::UnsupportedOperator(s.to_string()))
    }
}
