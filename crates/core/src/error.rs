use thiserror::Error;

use crate::overrides::FormatError;

/// Errors raised by the override and tag-query engines.
///
/// Only the path variants (`NotAMapping`, `NotAListOfMappings`, `KeyNotFound`)
/// are subject to the suppression policy; see [`ForgeError::is_suppressible`].
#[derive(Error, Debug)]
pub enum ForgeError {
    // ── Shape errors ──────────────────────────────────────────
    #[error("overrides must be a list of override rules")]
    InvalidRules,

    #[error("the provided data must be a list of mappings")]
    InvalidData,

    #[error("key_paths must be a string or a list of strings")]
    InvalidKeyPaths,

    #[error("invalid override rule: {0}")]
    InvalidRule(String),

    // ── Path errors ───────────────────────────────────────────
    #[error("the key:{key} does not exist or its value is not a mapping")]
    NotAMapping { key: String },

    #[error("the key:{key} must be a list of mappings")]
    NotAListOfMappings { key: String },

    #[error("the key:{key} does not exist")]
    KeyNotFound { key: String },

    // ── Type errors ───────────────────────────────────────────
    #[error("the value for key:{key} must be a string for FORMAT_VALUE")]
    FormatTarget { key: String },

    #[error("failed to format value for key:{key}: {source}")]
    Format {
        key: String,
        #[source]
        source: FormatError,
    },

    #[error("tags must be a mapping of tag keys to values")]
    InvalidTags,

    #[error("the tag:{tag} must be a string or a list of strings")]
    InvalidTagValue { tag: String },

    #[error("the tag:{tag} contains a non-string item")]
    InvalidTagItem { tag: String },

    // ── Configuration errors ──────────────────────────────────
    #[error("unsupported override type - {0}")]
    UnsupportedOverrideType(String),

    #[error("no callback registered under the name '{0}'")]
    UnknownCallback(String),

    #[error("query is missing an operator")]
    MissingOperator,

    #[error("unsupported query operator - {0}")]
    UnsupportedOperator(String),

    #[error("the condition for operator {operator} must be a mapping")]
    InvalidCondition { operator: String },

    #[error("the expected value for tag:{tag} under {operator} must be a string")]
    InvalidConditionValue { operator: String, tag: String },

    #[error("the tag:{tag} has conflicting expected values under {operator}")]
    ConflictingCondition { operator: String, tag: String },
}

impl ForgeError {
    /// Whether the suppression policy may swallow this error.
    ///
    /// True only for key-path traversal mismatches; shape, type and
    /// configuration errors always reach the caller.
    pub fn is_suppressible(&self) -> bool {
        matches!(
            self,
            ForgeError::NotAMapping { .. }
                | ForgeError::NotAListOfMappings { .. }
                | ForgeError::KeyNotFound { .. }
        )
    }
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, ForgeError>;
