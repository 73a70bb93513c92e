//! Configuration trees: namespaces, settings, and deferred values.

mod deferred;
mod error;
mod namespace;
mod setting;

pub use deferred::{Candidates, DeferredValue, Exit, Resolution, Scope};
pub use error::ConfigError;
pub use namespace::Namespace;
pub use setting::Setting;

/// Builds a root namespace by running `body` against it once.
///
/// The root has no name, so its [`to_map`](Namespace::to_map) output is its
/// contents rather than a single-key wrapper. Any error returned by a builder
/// call aborts the whole build.
pub fn configure<F>(body: F) -> Result<Namespace, ConfigError>
where
    F: FnOnce(&mut Namespace) -> Result<(), ConfigError>,
{
    Namespace::build(None, None, body)
}
