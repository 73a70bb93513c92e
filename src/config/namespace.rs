use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::deferred::{DeferredValue, Resolution, Scope};
use super::setting::Setting;
use super::ConfigError;
use crate::environment::{EnvironmentRef, SharedMatcher};

/// A node of the configuration tree: settings plus nested namespaces.
///
/// Namespaces are only ever assembled by running a builder closure against a
/// fresh node, either through [`configure`](crate::configure) for the root or
/// [`Namespace::namespace`] for children. Once built, the structure is fixed;
/// only the values of deferred settings change between reads.
///
/// ## Example
///
/// ```
/// use envtree::configure;
///
/// let config = configure(|c| {
///     c.set("name", "billing")?;
///     c.namespace("database", |db| {
///         db.set("host", "localhost")?.set("port", 5432)?;
///         Ok(())
///     })?;
///     Ok(())
/// })?;
///
/// assert_eq!(config.get("name")?, "billing");
/// assert_eq!(config.child("database")?.get("port")?, 5432);
/// assert_eq!(config.lookup("database.host")?, "localhost");
/// # Ok::<(), envtree::ConfigError>(())
/// ```
#[derive(Debug)]
pub struct Namespace {
    name: Option<String>,
    matcher: Option<SharedMatcher>,
    settings: Vec<Setting>,
    children: Vec<Namespace>,
}

impl Namespace {
    pub(crate) fn build<F>(
        name: Option<String>,
        matcher: Option<SharedMatcher>,
        body: F,
    ) -> Result<Self, ConfigError>
    where
        F: FnOnce(&mut Namespace) -> Result<(), ConfigError>,
    {
        let mut namespace = Self {
            name,
            matcher,
            settings: Vec::new(),
            children: Vec::new(),
        };
        body(&mut namespace)?;
        Ok(namespace)
    }

    /// The namespace's key in its parent; `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The matcher in effect at the end of this namespace's builder body.
    pub fn environment(&self) -> Option<&SharedMatcher> {
        self.matcher.as_ref()
    }

    /// Sets the matcher for declarations that follow.
    ///
    /// Accepts an adapter name (`"env"`, `"mode"`), a matcher handle, or
    /// `None`, which leaves the current matcher in place.
    pub fn use_environment(
        &mut self,
        environment: impl Into<EnvironmentRef>,
    ) -> Result<&mut Self, ConfigError> {
        if let Some(matcher) = environment.into().resolve()? {
            tracing::debug!(
                namespace = self.label(),
                matcher = ?matcher,
                "using environment"
            );
            self.matcher = Some(matcher);
        }
        Ok(self)
    }

    /// Declares a literal setting.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<&mut Self, ConfigError> {
        let key = self.claim(key.into())?;
        tracing::debug!(namespace = self.label(), key = %key, "declared setting");
        self.settings.push(Setting::literal(key, value.into()));
        Ok(self)
    }

    /// Declares a setting whose value is computed by `body` on every read.
    ///
    /// The body sees the matcher that is current at this call.
    pub fn set_with<F>(&mut self, key: impl Into<String>, body: F) -> Result<&mut Self, ConfigError>
    where
        F: Fn(&Scope<'_>) -> Resolution + Send + Sync + 'static,
    {
        let key = self.claim(key.into())?;
        tracing::debug!(namespace = self.label(), key = %key, "declared deferred setting");
        let value = DeferredValue::new(self.matcher.clone(), body);
        self.settings.push(Setting::deferred(key, value));
        Ok(self)
    }

    /// Declares a child namespace and runs `body` against it.
    ///
    /// The child starts out with this namespace's current matcher; later
    /// changes on either side are not shared.
    pub fn namespace<F>(&mut self, key: impl Into<String>, body: F) -> Result<&mut Self, ConfigError>
    where
        F: FnOnce(&mut Namespace) -> Result<(), ConfigError>,
    {
        let key = self.claim(key.into())?;
        tracing::debug!(namespace = self.label(), key = %key, "declared namespace");
        let child = Namespace::build(Some(key), self.matcher.clone(), body)?;
        self.children.push(child);
        Ok(self)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.setting(key).is_some() || self.find_child(key).is_some()
    }

    /// Declared keys: settings first, then namespaces, each in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.settings
            .iter()
            .map(Setting::key)
            .chain(self.children.iter().filter_map(Namespace::name))
    }

    pub fn settings(&self) -> &[Setting] {
        &self.settings
    }

    pub fn children(&self) -> &[Namespace] {
        &self.children
    }

    /// Resolves the setting declared under `key`.
    pub fn get(&self, key: &str) -> Result<Value, ConfigError> {
        self.setting(key)
            .ok_or_else(|| self.no_such_member(key))?
            .resolved_value()
    }

    /// Whether the setting under `key` currently resolves to a truthy value.
    pub fn get_bool(&self, key: &str) -> Result<bool, ConfigError> {
        self.setting(key)
            .ok_or_else(|| self.no_such_member(key))?
            .is_truthy()
    }

    pub fn child(&self, key: &str) -> Result<&Namespace, ConfigError> {
        self.find_child(key).ok_or_else(|| self.no_such_member(key))
    }

    /// Resolves a dotted path such as `database.replica.host`.
    ///
    /// A path ending at a namespace yields that namespace's resolved contents.
    pub fn lookup(&self, path: &str) -> Result<Value, ConfigError> {
        let parts: Vec<&str> = path.split('.').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(ConfigError::InvalidPath(path.to_string()));
        }

        let not_found = || ConfigError::NoSuchMember(path.to_string());

        let (last, parents) = parts.split_last().ok_or_else(not_found)?;
        let mut current = self;
        for part in parents {
            current = current.find_child(part).ok_or_else(not_found)?;
        }

        if let Some(setting) = current.setting(last) {
            return setting.resolved_value();
        }
        let namespace = current.find_child(last).ok_or_else(not_found)?;
        namespace.contents().map(Value::Object)
    }

    /// Serializes the resolved tree.
    ///
    /// A named namespace produces `{ name: { ... } }`; the root produces its
    /// contents directly. Deferred settings are evaluated at call time.
    pub fn to_map(&self) -> Result<Map<String, Value>, ConfigError> {
        let contents = self.contents()?;
        match &self.name {
            Some(name) => {
                let mut map = Map::new();
                map.insert(name.clone(), Value::Object(contents));
                Ok(map)
            }
            None => Ok(contents),
        }
    }

    /// Resolved contents as a TOML table; fails on values TOML cannot hold, such as null.
    pub fn to_toml(&self) -> Result<toml::Table, ConfigError> {
        Ok(toml::Table::try_from(self.contents()?)?)
    }

    /// Deserializes the resolved contents of this namespace into `T`.
    pub fn extract<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        let value = Value::Object(self.contents()?);
        serde_json::from_value(value).map_err(ConfigError::Deserialize)
    }

    fn contents(&self) -> Result<Map<String, Value>, ConfigError> {
        let mut contents = Map::new();
        for setting in &self.settings {
            contents.extend(setting.to_map()?);
        }
        for child in &self.children {
            contents.extend(child.to_map()?);
        }
        Ok(contents)
    }

    fn setting(&self, key: &str) -> Option<&Setting> {
        self.settings.iter().find(|s| s.key() == key)
    }

    fn find_child(&self, key: &str) -> Option<&Namespace> {
        self.children.iter().find(|c| c.name() == Some(key))
    }

    /// Validates a new key against the namespace's shared key space.
    fn claim(&self, key: String) -> Result<String, ConfigError> {
        if key.is_empty() || key.contains('.') {
            return Err(ConfigError::InvalidKey(key));
        }
        if self.contains(&key) {
            return Err(ConfigError::DuplicateKey {
                namespace: self.label().to_string(),
                key,
            });
        }
        Ok(key)
    }

    fn no_such_member(&self, key: &str) -> ConfigError {
        match &self.name {
            Some(name) => ConfigError::NoSuchMember(format!("{name}.{key}")),
            None => ConfigError::NoSuchMember(key.to_string()),
        }
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<root>")
    }
}
