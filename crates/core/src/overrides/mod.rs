//! Override engine: declarative mutations applied to records before load.
//!
//! A rule names one or more key paths and one of three actions:
//! - `REPLACE_VALUE`: overwrite the leaf with a literal
//! - `FORMAT_VALUE`: treat the leaf as a positional template
//! - `CALL_FUNCTION`: compute the leaf from a callback
//!
//! Key paths fan out implicitly when they cross a list of mappings.

mod callbacks;
mod engine;
mod format;
mod resolver;
mod rule;


pub use self::callbacks::{Callback, CallbackFn, CallbackRegistry};
pub use self::engine::{scoped_rules, OverrideEngine};
pub use self::format::{format_positional, FormatError};
pub use self::rule::{parse_rules, OverrideAction, OverrideRule, OverrideType};
