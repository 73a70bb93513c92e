use serde_json::{Map, Value};

use super::deferred::DeferredValue;
use super::ConfigError;

#[derive(Debug)]
enum SettingValue {
    Literal(Value),
    Deferred(DeferredValue),
}

/// A single named leaf of the configuration tree.
#[derive(Debug)]
pub struct Setting {
    key: String,
    value: SettingValue,
}

impl Setting {
    pub(crate) fn literal(key: String, value: Value) -> Self {
        Self {
            key,
            value: SettingValue::Literal(value),
        }
    }

    pub(crate) fn deferred(key: String, value: DeferredValue) -> Self {
        Self {
            key,
            value: SettingValue::Deferred(value),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self.value, SettingValue::Deferred(_))
    }

    /// Returns the literal as-is, or runs the deferred body again.
    pub fn resolved_value(&self) -> Result<Value, ConfigError> {
        match &self.value {
            SettingValue::Literal(value) => Ok(value.clone()),
            SettingValue::Deferred(deferred) => deferred.call(),
        }
    }

    /// Only `null` and `false` count as falsy.
    pub fn is_truthy(&self) -> Result<bool, ConfigError> {
        self.resolved_value().map(|value| truthy(&value))
    }

    pub fn to_map(&self) -> Result<Map<String, Value>, ConfigError> {
        let mut map = Map::new();
        map.insert(self.key.clone(), self.resolved_value()?);
        Ok(map)
    }
}

pub(crate) fn truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_literal_value() {
        let setting = Setting::literal("port".to_string(), json!(8080));
        assert_eq!(setting.resolved_value().unwrap(), json!(8080));
        assert!(setting.is_truthy().unwrap());
        assert!(!setting.is_deferred());
    }

    #[test]
    fn test_truthiness() {
        for value in [json!(null), json!(false)] {
            assert!(!truthy(&value));
        }
        for value in [json!(true), json!(0), json!(""), json!([]), json!({})] {
            assert!(truthy(&value));
        }
    }

    #[test]
    fn test_deferred_value() {
        let setting = Setting::deferred(
            "debug".to_string(),
            DeferredValue::new(None, |_env| Ok(Value::Bool(false))),
        );
        assert!(setting.is_deferred());
        assert!(!setting.is_truthy().unwrap());
    }

    #[test]
    fn test_to_map_is_single_entry() {
        let setting = Setting::literal("name".to_string(), json!("envtree"));
        let map = setting.to_map().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["name"], json!("envtree"));
    }
}
