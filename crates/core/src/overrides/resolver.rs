//! Key-path resolution with implicit fan-out over lists of mappings.

use serde_json::Value;

use crate::error::{ForgeError, Result};
use crate::record::Record;

/// Walk `segments` through `record` and call `mutate(leaf_key, container)` on
/// every mapping that holds the final segment.
///
/// When an intermediate value is a list, the remaining suffix is applied to
/// each element and the walk ends there. An empty list applies nothing.
pub(crate) fn resolve_and_apply<F>(record: &mut Record, segments: &[String], mutate: &mut F) -> Result<()>
where
    F: FnMut(&str, &mut Record) -> Result<()>,
{
    let Some((leaf, parents)) = segments.split_last() else {
        return Ok(());
    };

    let mut current = record;
    for (depth, segment) in parents.iter().enumerate() {
        match current.get_mut(segment) {
            Some(Value::Array(items)) => {
                let rest = &segments[depth + 1..];
                for item in items.iter_mut() {
                    let Value::Object(inner) = item else {
                        return Err(ForgeError::NotAListOfMappings {
                            key: segment.clone(),
                        });
                    };
                    resolve_and_apply(inner, rest, mutate)?;
                }
                return Ok(());
            }
            Some(Value::Object(inner)) => current = inner,
            _ => {
                return Err(ForgeError::NotAMapping {
                    key: segment.clone(),
                })
            }
        }
    }

    if !current.contains_key(leaf) {
        return Err(ForgeError::KeyNotFound { key: leaf.clone() });
    }

    mutate(leaf.as_str(), current)
}
