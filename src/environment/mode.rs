use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use super::EnvironmentMatcher;

const MODE_VAR: &str = "APP_ENV";
const DEFAULT_MODE: &str = "development";

/// A shared "current mode" value, e.g. `production` or `test`.
///
/// Clones share the same underlying value, so a matcher built from one
/// handle observes every later [`set`](Self::set) made through another.
#[derive(Debug, Clone)]
pub struct CurrentMode {
    inner: Arc<RwLock<String>>,
}

impl CurrentMode {
    pub fn new(mode: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(mode.into())),
        }
    }

    /// Seeds the mode from `var`, falling back to `development`.
    pub fn from_env(var: &str) -> Self {
        let mode = std::env::var(var)
            .ok()
            .filter(|mode| !mode.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODE.to_string());
        Self::new(mode)
    }

    /// Process-wide mode, seeded from `APP_ENV` on first use.
    pub fn global() -> &'static CurrentMode {
        static GLOBAL: OnceLock<CurrentMode> = OnceLock::new();
        GLOBAL.get_or_init(|| CurrentMode::from_env(MODE_VAR))
    }

    pub fn get(&self) -> String {
        self.inner.read().clone()
    }

    pub fn set(&self, mode: impl Into<String>) {
        let mode = mode.into();
        tracing::debug!(mode = %mode, "switching current mode");
        *self.inner.write() = mode;
    }

    fn is(&self, candidate: &str) -> bool {
        normalize(&self.inner.read()).eq_ignore_ascii_case(normalize(candidate))
    }
}

/// Matches a candidate against a [`CurrentMode`], ignoring case and a
/// leading `:`.
#[derive(Debug, Clone)]
pub struct ModeMatcher {
    mode: CurrentMode,
}

impl ModeMatcher {
    pub fn new(mode: CurrentMode) -> Self {
        Self { mode }
    }

    pub fn global() -> Self {
        Self::new(CurrentMode::global().clone())
    }
}

impl EnvironmentMatcher for ModeMatcher {
    fn matches(&self, candidate: &str) -> bool {
        self.mode.is(candidate)
    }
}

fn normalize(name: &str) -> &str {
    let name = name.trim();
    name.strip_prefix(':').unwrap_or(name)
}
