use std::env;

use serde::{Deserialize, Serialize};

/// Env var holding the key-path error suppression flag.
pub const SUPPRESS_KEY_PATH_ERRORS_ENV: &str = "DATA_FORGE_SUPPRESS_KEY_PATH_ERRORS";

/// Env var selecting the active profile (e.g. `CI`).
pub const PROFILE_ENV: &str = "DATA_FORGE_PROFILE";

/// Textual values that switch suppression off.
const FALSY_VALUES: &[&str] = &["0", "false", "no", "off"];

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn active_profile() -> String {
    env_opt(PROFILE_ENV).unwrap_or_default().to_uppercase()
}

/// Interpret a raw suppression flag. Absent or unrecognised values suppress.
pub fn parse_suppress_flag(raw: Option<&str>) -> bool {
    match raw {
        Some(v) => {
            let v = v.trim().to_ascii_lowercase();
            !FALSY_VALUES.contains(&v.as_str())
        }
        None => true,
    }
}

/// Read the suppression flag from the environment right now.
pub fn suppress_from_env() -> bool {
    let profile = active_profile();
    parse_suppress_flag(profiled_env_opt(&profile, SUPPRESS_KEY_PATH_ERRORS_ENV).as_deref())
}

// ── Suppression policy ────────────────────────────────────────

/// Decides whether key-path errors are skipped or raised.
///
/// `Environment` re-reads [`SUPPRESS_KEY_PATH_ERRORS_ENV`] every time an
/// error is encountered, so a test can toggle the variable between runs of
/// the same engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressionPolicy {
    #[default]
    Environment,
    Suppress,
    Raise,
}

impl SuppressionPolicy {
    /// Pin the policy from a boolean flag.
    pub fn from_flag(suppress: bool) -> Self {
        if suppress {
            SuppressionPolicy::Suppress
        } else {
            SuppressionPolicy::Raise
        }
    }

    pub fn suppresses(&self) -> bool {
        match self {
            SuppressionPolicy::Suppress => true,
            SuppressionPolicy::Raise => false,
            SuppressionPolicy::Environment => suppress_from_env(),
        }
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgeConfig {
    /// Active profile name (empty = default).
    pub profile: String,
    pub suppression: SuppressionPolicy,
}

impl ForgeConfig {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            profile: active_profile(),
            suppression: SuppressionPolicy::Environment,
        }
    }

    /// Replace the dynamic policy with a fixed one.
    pub fn with_suppression(mut self, suppress: Option<bool>) -> Self {
        if let Some(flag) = suppress {
            self.suppression = SuppressionPolicy::from_flag(flag);
        }
        self
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!(
            profile = self.profile_label(),
            suppression = ?self.suppression,
            suppresses_now = self.suppression.suppresses(),
            "data forge config loaded"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falsy_values_disable_suppression() {
        for raw in ["0", "false", "FALSE", "no", "Off", " off "] {
            assert!(!parse_suppress_flag(Some(raw)), "{raw} should raise");
        }
    }

    #[test]
    fn absent_or_other_values_suppress() {
        assert!(parse_suppress_flag(None));
        for raw in ["1", "true", "yes", "on", "", "maybe"] {
            assert!(parse_suppress_flag(Some(raw)), "{raw} should suppress");
        }
    }

    #[test]
    fn fixed_policies_ignore_environment() {
        assert!(SuppressionPolicy::Suppress.suppresses());
        assert!(!SuppressionPolicy::Raise.suppresses());
        assert_eq!(SuppressionPolicy::from_flag(true), SuppressionPolicy::Suppress);
        assert_eq!(SuppressionPolicy::from_flag(false), SuppressionPolicy::Raise);
    }

    #[test]
    fn with_suppression_overrides_only_when_set() {
        let config = ForgeConfig {
            profile: String::new(),
            suppression: SuppressionPolicy::Environment,
        };
        assert_eq!(config.profile_label(), "default");
        let unchanged = config.clone().with_suppression(None);
        assert_eq!(unchanged.suppression, SuppressionPolicy::Environment);
        let pinned = config.with_suppression(Some(false));
        assert_eq!(pinned.suppression, SuppressionPolicy::Raise);
    }
}
