//! Deferred setting values and the `environment(...)` short-circuit.
//!
//! A deferred body runs on every read. Inside it, each
//! [`Scope::environment`] declaration either falls through (`Ok(())`) or
//! ends the evaluation with [`Exit::Done`], which the body forwards with `?`:
//!
//! ```
//! use envtree::{configure, environment};
//!
//! let config = configure(|c| {
//!     c.use_environment(environment::matcher(environment::from_fn(|n| n == "qa")))?;
//!     c.set_with("host", |env| {
//!         env.environment(["qa", "staging"], "qa.internal")?;
//!         env.environment("production", "example.com")?;
//!         Ok("localhost".into())
//!     })?;
//!     Ok(())
//! })?;
//!
//! assert_eq!(config.get("host")?, "qa.internal");
//! # Ok::<(), envtree::ConfigError>(())
//! ```

use std::fmt;

use serde_json::Value;

use crate::environment::{EnvironmentMatcher, SharedMatcher};
use crate::ConfigError;

/// Early exit from a deferred body.
#[derive(Debug)]
pub enum Exit {
    /// An `environment(...)` declaration matched; this is the setting's value.
    Done(Value),
    Failed(ConfigError),
}

impl From<ConfigError> for Exit {
    fn from(error: ConfigError) -> Self {
        Exit::Failed(error)
    }
}

/// What a deferred body returns: its fall-through value, or an early [`Exit`].
pub type Resolution = Result<Value, Exit>;

type Body = dyn Fn(&Scope<'_>) -> Resolution + Send + Sync;

/// One or more environment names, checked in order.
pub trait Candidates {
    fn into_candidates(self) -> Vec<String>;
}

impl Candidates for &str {
    fn into_candidates(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl Candidates for String {
    fn into_candidates(self) -> Vec<String> {
        vec![self]
    }
}

impl Candidates for &String {
    fn into_candidates(self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl<const N: usize> Candidates for [&str; N] {
    fn into_candidates(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl Candidates for &[&str] {
    fn into_candidates(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl Candidates for Vec<&str> {
    fn into_candidates(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

impl Candidates for Vec<String> {
    fn into_candidates(self) -> Vec<String> {
        self
    }
}

/// The view a deferred body gets of the active environment.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    matcher: Option<&'a dyn EnvironmentMatcher>,
}

impl<'a> Scope<'a> {
    pub fn new(matcher: Option<&'a dyn EnvironmentMatcher>) -> Self {
        Self { matcher }
    }

    /// Returns the first candidate the matcher accepts, if any.
    ///
    /// Without a matcher nothing ever matches.
    pub fn active(&self, names: impl Candidates) -> Option<String> {
        let matcher = self.matcher?;
        names
            .into_candidates()
            .into_iter()
            .find(|name| matcher.matches(name))
    }

    pub fn matches(&self, names: impl Candidates) -> bool {
        self.active(names).is_some()
    }

    /// Ends the evaluation with `value` when one of `names` is active.
    pub fn environment(&self, names: impl Candidates, value: impl Into<Value>) -> Result<(), Exit> {
        self.environment_with(names, || Ok(value.into()))
    }

    /// Like [`environment`](Self::environment), but only computes the value
    /// once a candidate has matched.
    pub fn environment_with<F>(&self, names: impl Candidates, body: F) -> Result<(), Exit>
    where
        F: FnOnce() -> Result<Value, ConfigError>,
    {
        match self.active(names) {
            Some(name) => {
                tracing::trace!(environment = %name, "environment matched");
                Err(Exit::Done(body()?))
            }
            None => Ok(()),
        }
    }
}

/// A setting body evaluated lazily, with the matcher captured at declaration.
pub struct DeferredValue {
    body: Box<Body>,
    matcher: Option<SharedMatcher>,
}

impl DeferredValue {
    pub fn new<F>(matcher: Option<SharedMatcher>, body: F) -> Self
    where
        F: Fn(&Scope<'_>) -> Resolution + Send + Sync + 'static,
    {
        Self {
            body: Box::new(body),
            matcher,
        }
    }

    /// Runs the body once and returns the matched or fall-through value.
    pub fn call(&self) -> Result<Value, ConfigError> {
        let scope = Scope::new(self.matcher.as_deref());
        match (self.body)(&scope) {
            Ok(value) | Err(Exit::Done(value)) => Ok(value),
            Err(Exit::Failed(error)) => Err(error),
        }
    }
}

impl fmt::Debug for DeferredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredValue")
            .field("matcher", &self.matcher)
            .field("body", &"<closure>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::environment::from_fn;

    fn only(name: &'static str) -> Option<SharedMatcher> {
        Some(Arc::new(from_fn(move |candidate| candidate == name)))
    }

    #[test]
    fn test_falls_through_without_matcher() {
        let value = DeferredValue::new(None, |env| {
            env.environment("test", "matched")?;
            Ok("default".into())
        });
        assert_eq!(value.call().unwrap(), json!("default"));
    }

    #[test]
    fn test_first_matching_declaration_wins() {
        let value = DeferredValue::new(only("production"), |env| {
            env.environment(["qa", "staging"], "qa_or_staging")?;
            env.environment("production", "production")?;
            env.environment("production", "shadowed")?;
            Ok("default".into())
        });
        assert_eq!(value.call().unwrap(), json!("production"));
    }

    #[test]
    fn test_list_candidates_match_any() {
        let value = DeferredValue::new(only("staging"), |env| {
            env.environment(vec!["qa", "staging"], 1)?;
            Ok(0.into())
        });
        assert_eq!(value.call().unwrap(), json!(1));
    }

    #[test]
    fn test_code_after_match_is_skipped() {
        let after = Arc::new(AtomicUsize::new(0));
        let counter = after.clone();
        let value = DeferredValue::new(only("test"), move |env| {
            env.environment("test", true)?;
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(false.into())
        });

        assert_eq!(value.call().unwrap(), json!(true));
        assert_eq!(after.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_lazy_value_only_runs_on_match() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let value = DeferredValue::new(only("test"), move |env| {
            let counter = counter.clone();
            env.environment_with("production", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok("production".into())
            })?;
            env.environment_with("test", || Ok(json!({ "pool": 2 })))?;
            Ok(Value::Null)
        });

        assert_eq!(value.call().unwrap(), json!({ "pool": 2 }));
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_body_error_propagates() {
        let value = DeferredValue::new(None, |_env| {
            Err(ConfigError::custom("database url missing").into())
        });
        let err = value.call().unwrap_err();
        assert!(matches!(err, ConfigError::Custom(_)));
        assert_eq!(err.to_string(), "database url missing");
    }

    #[test]
    fn test_reevaluates_on_every_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let value = DeferredValue::new(None, move |_env| {
            Ok(counter.fetch_add(1, Ordering::SeqCst).into())
        });

        assert_eq!(value.call().unwrap(), json!(0));
        assert_eq!(value.call().unwrap(), json!(1));
    }

    #[test]
    fn test_scope_active_reports_first_match() {
        let matcher = from_fn(|candidate| candidate == "b" || candidate == "c");
        let scope = Scope::new(Some(&matcher));
        assert_eq!(scope.active(["a", "b", "c"]), Some("b".to_string()));
        assert!(!scope.matches("a"));
    }
}
