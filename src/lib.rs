//! Hierarchical configuration trees whose values can depend on the active
//! deployment environment.
//!
//! ```
//! use envtree::environment::{self, CurrentMode, ModeMatcher};
//! use envtree::configure;
//!
//! let mode = CurrentMode::new("staging");
//! let config = configure(|c| {
//!     c.use_environment(environment::matcher(ModeMatcher::new(mode.clone())))?;
//!     c.namespace("database", |db| {
//!         db.set_with("pool", |env| {
//!             env.environment(["staging", "production"], 20)?;
//!             Ok(5.into())
//!         })?;
//!         Ok(())
//!     })?;
//!     Ok(())
//! })?;
//!
//! assert_eq!(config.lookup("database.pool")?, 20);
//! mode.set("test");
//! assert_eq!(config.lookup("database.pool")?, 5);
//! # Ok::<(), envtree::ConfigError>(())
//! ```

pub mod config;
pub mod context;
pub mod environment;

pub use config::{configure, ConfigError, Namespace, Scope};
pub use context::LazyConfig;
pub use environment::{EnvironmentMatcher, EnvironmentRef};
