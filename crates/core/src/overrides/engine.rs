//! Applies ordered override rules to ordered records.

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::SuppressionPolicy;
use crate::error::{ForgeError, Result};
use crate::record::{records_from_value, Record};

use super::callbacks::CallbackRegistry;
use super::format::format_positional;
use super::resolver::resolve_and_apply;
use super::rule::{parse_rules, OverrideAction, OverrideRule};

/// Stateless override applier.
///
/// The only setting is the [`SuppressionPolicy`], consulted each time a key
/// path cannot be resolved on a record.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverrideEngine {
    policy: SuppressionPolicy,
}

impl OverrideEngine {
    pub fn new(policy: SuppressionPolicy) -> Self {
        Self { policy }
    }

    /// Apply `rules` to a copy of `records`; the inputs are left untouched.
    pub fn apply(&self, rules: &[OverrideRule], records: &[Record]) -> Result<Vec<Record>> {
        let mut data = records.to_vec();
        self.apply_in_place(rules, &mut data)?;
        Ok(data)
    }

    /// Apply `rules` directly to `records`.
    ///
    /// Order is rule, then key path within the rule, then record.
    pub fn apply_in_place(&self, rules: &[OverrideRule], records: &mut [Record]) -> Result<()> {
        for rule in rules {
            debug!(
                override_type = %rule.override_type(),
                key_paths = rule.key_paths.len(),
                forge_id = rule.forge_id.as_deref().unwrap_or("*"),
                "applying override rule"
            );

            for key_path in &rule.key_paths {
                for (index, record) in records.iter_mut().enumerate() {
                    let outcome = resolve_and_apply(record, key_path.segments(), &mut |leaf: &str, container: &mut Record| {
                        mutate_leaf(&rule.action, leaf, container)
                    });

                    match outcome {
                        Ok(()) => {}
                        Err(e) if e.is_suppressible() && self.policy.suppresses() => {
                            warn!(
                                key_path = %key_path,
                                record = index,
                                error = %e,
                                "skipping key path"
                            );
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
        }
        Ok(())
    }

    /// Apply dynamically configured rules to dynamic data.
    ///
    /// Rules are shape-checked before the data. With no rules the data is
    /// only validated and copied.
    pub fn apply_value(
        &self,
        rules: &Value,
        data: &Value,
        registry: &CallbackRegistry,
    ) -> Result<Vec<Record>> {
        let no_rules = match rules {
            Value::Null => true,
            Value::Array(items) => items.is_empty(),
            _ => false,
        };
        if no_rules {
            return records_from_value(data);
        }

        let rules = parse_rules(rules, registry)?;
        let records = records_from_value(data)?;
        self.apply(&rules, &records)
    }
}

fn mutate_leaf(action: &OverrideAction, leaf: &str, container: &mut Record) -> Result<()> {
    let replacement = match action {
        OverrideAction::Replace(value) => value.clone(),
        OverrideAction::Format(args) => {
            let Some(Value::String(template)) = container.get(leaf) else {
                return Err(ForgeError::FormatTarget {
                    key: leaf.to_string(),
                });
            };
            let formatted = format_positional(template, args).map_err(|source| ForgeError::Format {
                key: leaf.to_string(),
                source,
            })?;
            Value::String(formatted)
        }
        OverrideAction::Call(callback) => {
            let current = container.get(leaf).unwrap_or(&Value::Null);
            callback.invoke(leaf, current, container)
        }
    };

    if let Some(slot) = container.get_mut(leaf) {
        *slot = replacement;
    }
    Ok(())
}

/// Rules for one forge: unscoped rules plus those scoped to `forge_id`,
/// in their original order.
pub fn scoped_rules(rules: &[OverrideRule], forge_id: &str) -> Vec<OverrideRule> {
    rules
        .iter()
        .filter(|rule| rule.applies_to(forge_id))
        .cloned()
        .collect()
}
