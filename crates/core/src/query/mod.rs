//! Tag query engine: filter records by their `tags` mapping.
//!
//! A query maps operator names to conditions:
//!
//! ```json
//! {"StringEquals": {"type": "text"}, "StringLike": {"tests": "test_"}}
//! ```
//!
//! Every condition of every operator must hold (AND). A list-valued tag
//! satisfies a condition when any of its items does (OR).

mod operator;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ForgeError, Result};
use crate::record::{Record, TAGS_KEY};

pub use self::operator::QueryOperator;

/// One operator and its tag-key -> expected-value conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryClause {
    pub operator: QueryOperator,
    pub conditions: Vec<(String, String)>,
}

/// A validated tag query. Holds at least one clause.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Value")]
pub struct Query {
    clauses: Vec<QueryClause>,
}

impl Query {
    pub fn new(clauses: Vec<QueryClause>) -> Result<Self> {
        if clauses.is_empty() {
            return Err(ForgeError::MissingOperator);
        }
        Ok(Self { clauses })
    }

    /// Single-clause query using `StringEquals`.
    pub fn string_equals<I, K, V>(conditions: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::single(QueryOperator::StringEquals, conditions)
    }

    /// Single-clause query using `StringLike`.
    pub fn string_like<I, K, V>(conditions: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::single(QueryOperator::StringLike, conditions)
    }

    fn single<I, K, V>(operator: QueryOperator, conditions: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            clauses: vec![QueryClause {
                operator,
                conditions: conditions
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            }],
        }
    }

    /// Add another clause; the query stays a conjunction.
    pub fn and(mut self, other: Query) -> Self {
        self.clauses.extend(other.clauses);
        self
    }

    pub fn clauses(&self) -> &[QueryClause] {
        &self.clauses
    }

    /// Parse and validate a dynamic query mapping.
    pub fn from_value(value: &Value) -> Result<Self> {
        let operators = match value {
            Value::Object(map) => map,
            Value::Null => return Err(ForgeError::MissingOperator),
            _ => return Err(ForgeError::UnsupportedOperator(value.to_string())),
        };

        let mut clauses = Vec::with_capacity(operators.len());
        for (name, condition) in operators {
            let operator: QueryOperator = name.parse()?;
            let condition = condition.as_object().ok_or_else(|| ForgeError::InvalidCondition {
                operator: name.clone(),
            })?;

            let conditions = condition
                .iter()
                .map(|(tag, expected)| match expected {
                    Value::String(s) => Ok((tag.clone(), s.clone())),
                    _ => Err(ForgeError::InvalidConditionValue {
                        operator: name.clone(),
                        tag: tag.clone(),
                    }),
                })
                .collect::<Result<Vec<_>>>()?;

            clauses.push(QueryClause {
                operator,
                conditions,
            });
        }

        Self::new(clauses)
    }

    /// Return copies of the records whose tags satisfy every condition.
    ///
    /// The candidate set only ever shrinks; tag type errors are raised for
    /// records still in the set when their tag is inspected.
    pub fn filter(&self, records: &[Record]) -> Result<Vec<Record>> {
        let mut candidates: Vec<&Record> = records.iter().collect();

        for clause in &self.clauses {
            for (tag, expected) in &clause.conditions {
                let mut survivors = Vec::with_capacity(candidates.len());
                for record in candidates {
                    if tag_matches(record, clause.operator, tag, expected)? {
                        survivors.push(record);
                    }
                }
                debug!(
                    operator = %clause.operator,
                    tag = %tag,
                    remaining = survivors.len(),
                    "applied tag condition"
                );
                candidates = survivors;
            }
        }

        Ok(candidates.into_iter().cloned().collect())
    }
}

impl TryFrom<Value> for Query {
    type Error = ForgeError;

    fn try_from(value: Value) -> Result<Self> {
        Query::from_value(&value)
    }
}

impl TryFrom<&Query> for Value {
    type Error = ForgeError;

    /// Clauses sharing an operator are merged into one condition mapping. A
    /// tag bound to two different expected values under the same operator
    /// cannot be expressed that way and is refused.
    fn try_from(query: &Query) -> Result<Value> {
        let mut operators = Map::new();
        for clause in &query.clauses {
            let entry = operators
                .entry(clause.operator.as_str())
                .or_insert_with(|| Value::Object(Map::new()));
            let Value::Object(conditions) = entry else {
                continue;
            };
            for (tag, expected) in &clause.conditions {
                match conditions.get(tag) {
                    Some(Value::String(existing)) if existing != expected => {
                        return Err(ForgeError::ConflictingCondition {
                            operator: clause.operator.to_string(),
                            tag: tag.clone(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        conditions.insert(tag.clone(), Value::String(expected.clone()));
                    }
                }
            }
        }
        Ok(Value::Object(operators))
    }
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        Value::try_from(self)
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

/// Apply an optional query; `None` returns every record.
pub fn filter_records(query: Option<&Query>, records: &[Record]) -> Result<Vec<Record>> {
    match query {
        Some(q) => q.filter(records),
        None => Ok(records.to_vec()),
    }
}

fn tag_matches(record: &Record, operator: QueryOperator, tag: &str, expected: &str) -> Result<bool> {
    let tags = match record.get(TAGS_KEY) {
        None | Some(Value::Null) => return Ok(false),
        Some(Value::Object(tags)) => tags,
        Some(_) => return Err(ForgeError::InvalidTags),
    };

    match tags.get(tag) {
        None => Ok(false),
        Some(Value::String(actual)) => Ok(operator.matches(actual, expected)),
        Some(Value::Array(items)) => {
            let mut matched = false;
            for item in items {
                let actual = item.as_str().ok_or_else(|| ForgeError::InvalidTagItem {
                    tag: tag.to_string(),
                })?;
                matched |= operator.matches(actual, expected);
            }
            Ok(matched)
        }
        Some(_) => Err(ForgeError::InvalidTagValue {
            tag: tag.to_string(),
        }),
    }
}
