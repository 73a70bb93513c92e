//! Lazily built, memoized configuration for a host type.

use std::fmt;
use std::sync::OnceLock;

use crate::{configure, ConfigError, Namespace};

/// Builder function describing a root namespace.
pub type ConfigSpec = fn(&mut Namespace) -> Result<(), ConfigError>;

/// A configuration tree built on first access and kept for the process lifetime.
///
/// Declare one `static` per host type to get one tree per host.
///
/// ## Example
///
/// ```
/// use envtree::{ConfigError, LazyConfig, Namespace};
///
/// struct Mailer;
///
/// impl Mailer {
///     fn settings() -> Result<&'static Namespace, ConfigError> {
///         static SETTINGS: LazyConfig = LazyConfig::new(|c| {
///             c.set("from", "noreply@example.com")?;
///             c.set_with("deliver", |env| {
///                 env.environment("production", true)?;
///                 Ok(false.into())
///             })?;
///             Ok(())
///         });
///         SETTINGS.get()
///     }
/// }
///
/// assert_eq!(Mailer::settings()?.get("from")?, "noreply@example.com");
/// assert!(!Mailer::settings()?.get_bool("deliver")?);
/// # Ok::<(), ConfigError>(())
/// ```
pub struct LazyConfig {
    spec: ConfigSpec,
    root: OnceLock<Namespace>,
}

impl LazyConfig {
    pub const fn new(spec: ConfigSpec) -> Self {
        Self {
            spec,
            root: OnceLock::new(),
        }
    }

    /// Returns the tree, building it on first call.
    ///
    /// A failed build is not memoized; the next call tries again.
    pub fn get(&self) -> Result<&Namespace, ConfigError> {
        if let Some(root) = self.root.get() {
            return Ok(root);
        }

        let root = configure(self.spec)?;
        tracing::debug!("built lazy configuration");
        Ok(self.root.get_or_init(|| root))
    }

    pub fn is_built(&self) -> bool {
        self.root.get().is_some()
    }
}

impl fmt::Debug for LazyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyConfig")
            .field("root", &self.root.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;

    static BUILDS: AtomicUsize = AtomicUsize::new(0);

    fn counted(c: &mut Namespace) -> Result<(), ConfigError> {
        BUILDS.fetch_add(1, Ordering::SeqCst);
        c.set("key", "value")?;
        Ok(())
    }

    #[test]
    fn test_builds_once() {
        let config = LazyConfig::new(counted);
        assert!(!config.is_built());

        let first = config.get().unwrap();
        let second = config.get().unwrap();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.get("key").unwrap(), json!("value"));
        assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
        assert!(config.is_built());
    }

    #[test]
    fn test_failed_build_is_not_memoized() {
        let config = LazyConfig::new(|c| {
            c.use_environment("unknown")?;
            Ok(())
        });

        assert!(matches!(
            config.get(),
            Err(ConfigError::UnknownEnvironmentAdapter(_))
        ));
        assert!(!config.is_built());
    }
}
