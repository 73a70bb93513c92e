//! Environment matchers decide which deployment environment is active.
//!
//! A [`Namespace`](crate::Namespace) never reads ambient state itself; it is
//! handed a matcher through `use_environment` and passes it down to every
//! deferred setting and child namespace declared after that point.

mod env;
mod mode;

use std::fmt;
use std::sync::Arc;

use crate::ConfigError;

pub use env::EnvVarMatcher;
pub use mode::{CurrentMode, ModeMatcher};

/// Decides whether a named environment is currently active.
///
/// Implementations may read ambient state but must not mutate it.
pub trait EnvironmentMatcher: Send + Sync + fmt::Debug {
    fn matches(&self, candidate: &str) -> bool;
}

/// Shared handle to a matcher, as stored on namespaces and deferred values.
pub type SharedMatcher = Arc<dyn EnvironmentMatcher>;

/// Wraps a closure as an [`EnvironmentMatcher`].
///
/// ```
/// use envtree::environment::{from_fn, EnvironmentMatcher};
///
/// let test_only = from_fn(|name| name == "test");
/// assert!(test_only.matches("test"));
/// assert!(!test_only.matches("production"));
/// ```
pub fn from_fn<F>(f: F) -> FnMatcher<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    FnMatcher(f)
}

pub struct FnMatcher<F>(F);

impl<F> fmt::Debug for FnMatcher<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnMatcher(<closure>)")
    }
}

impl<F> EnvironmentMatcher for FnMatcher<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn matches(&self, candidate: &str) -> bool {
        (self.0)(candidate)
    }
}

/// Argument accepted by `Namespace::use_environment`.
#[derive(Debug, Clone, Default)]
pub enum EnvironmentRef {
    /// Leaves the current matcher untouched.
    #[default]
    None,
    /// Short name of a built-in adapter, see [`adapter`].
    Named(String),
    Matcher(SharedMatcher),
}

impl EnvironmentRef {
    /// Turns the reference into a matcher handle; `None` yields `Ok(None)`.
    pub fn resolve(self) -> Result<Option<SharedMatcher>, ConfigError> {
        match self {
            EnvironmentRef::None => Ok(None),
            EnvironmentRef::Named(name) => adapter(&name).map(Some),
            EnvironmentRef::Matcher(matcher) => Ok(Some(matcher)),
        }
    }
}

impl From<&str> for EnvironmentRef {
    fn from(name: &str) -> Self {
        EnvironmentRef::Named(name.to_string())
    }
}

impl From<String> for EnvironmentRef {
    fn from(name: String) -> Self {
        EnvironmentRef::Named(name)
    }
}

impl From<SharedMatcher> for EnvironmentRef {
    fn from(matcher: SharedMatcher) -> Self {
        EnvironmentRef::Matcher(matcher)
    }
}

impl<T: Into<EnvironmentRef>> From<Option<T>> for EnvironmentRef {
    fn from(value: Option<T>) -> Self {
        value.map_or(EnvironmentRef::None, Into::into)
    }
}

/// Wraps any concrete matcher as an [`EnvironmentRef`].
pub fn matcher<M: EnvironmentMatcher + 'static>(matcher: M) -> EnvironmentRef {
    EnvironmentRef::Matcher(Arc::new(matcher))
}

/// Looks up a built-in adapter by short name (case-insensitive).
///
/// | name   | adapter                     |
/// |--------|-----------------------------|
/// | `env`  | [`EnvVarMatcher::new`]      |
/// | `mode` | [`ModeMatcher::global`]     |
pub fn adapter(name: &str) -> Result<SharedMatcher, ConfigError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidEnvironment(
            "adapter name must not be blank".to_string(),
        ));
    }

    match trimmed.to_ascii_lowercase().as_str() {
        "env" => Ok(Arc::new(EnvVarMatcher::new())),
        "mode" => Ok(Arc::new(ModeMatcher::global())),
        _ => Err(ConfigError::UnknownEnvironmentAdapter(trimmed.to_string())),
    }
}
