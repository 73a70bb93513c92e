use super::EnvironmentMatcher;

/// Matches a candidate when an environment variable of the same name is set
/// to a truthy indicator.
///
/// With a prefix, candidate `STAGING` is looked up as `{prefix}STAGING`.
/// Unset, empty, `0`, `false`, `no`, and `off` (case-insensitive) do not match.
#[derive(Debug, Clone, Default)]
pub struct EnvVarMatcher {
    prefix: String,
}

impl EnvVarMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl EnvironmentMatcher for EnvVarMatcher {
    fn matches(&self, candidate: &str) -> bool {
        let key = format!("{}{}", self.prefix, candidate);
        std::env::var(&key).is_ok_and(|value| is_truthy_indicator(&value))
    }
}

fn is_truthy_indicator(s: &str) -> bool {
    let s = s.trim();
    if s.is_empty() {
        return false;
    }

    if ["false", "no", "off"]
        .iter()
        .any(|falsy| s.eq_ignore_ascii_case(falsy))
    {
        return false;
    }

    // Any spelling of zero ("0", "00", "-0") is off
    if looks_like_integer(s) {
        return s.trim_start_matches('-').chars().any(|c| c != '0');
    }

    true
}

fn looks_like_integer(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthy_indicators() {
        for value in ["1", "true", "yes", "on", "anything", "42", "-3"] {
            assert!(is_truthy_indicator(value), "{value} should be truthy");
        }
        for value in ["", " ", "0", "00", "-0", "false", "FALSE", "No", "off"] {
            assert!(!is_truthy_indicator(value), "{value} should be falsy");
        }
    }

    #[test]
    fn test_matches_set_variable() {
        std::env::set_var("ENVTREE_ENV_MATCHER_SET", "1");
        assert!(EnvVarMatcher::new().matches("ENVTREE_ENV_MATCHER_SET"));
    }

    #[test]
    fn test_unset_variable_does_not_match() {
        std::env::remove_var("ENVTREE_ENV_MATCHER_UNSET");
        assert!(!EnvVarMatcher::new().matches("ENVTREE_ENV_MATCHER_UNSET"));
    }

    #[test]
    fn test_falsy_variable_does_not_match() {
        std::env::set_var("ENVTREE_ENV_MATCHER_FALSY", "false");
        assert!(!EnvVarMatcher::new().matches("ENVTREE_ENV_MATCHER_FALSY"));
    }

    #[test]
    fn test_prefix_is_prepended() {
        std::env::set_var("ENVTREE_PREFIXED_STAGING", "yes");
        let matcher = EnvVarMatcher::with_prefix("ENVTREE_PREFIXED_");
        assert!(matcher.matches("STAGING"));
        assert!(!matcher.matches("PRODUCTION"));
    }
}
