use std::fmt;

use serde_json::json;

use super::RuleObject;

/// Guard placed on objects that do not allow unknown properties
///
/// Carries the declared property names so the consuming engine can reject
/// input keys outside that list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownPropertiesOnly {
    allowed_properties: Vec<String>,
}

impl KnownPropertiesOnly {
    pub const NAME: &'static str = "known_properties_only";

    pub fn new<I, S>(allowed_properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_properties: allowed_properties.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allowed_properties(&self) -> &[String] {
        &self.allowed_properties
    }

    pub fn allows(&self, property: &str) -> bool {
        self.allowed_properties.iter().any(|p| p == property)
    }
}

impl fmt::Display for KnownPropertiesOnly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", Self::NAME, self.allowed_properties.join(","))
    }
}

impl RuleObject for KnownPropertiesOnly {
    fn to_value(&self) -> serde_json::Value {
        json!({
            "rule": Self::NAME,
            "allowed_properties": self.allowed_properties,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_value() {
        let guard = KnownPropertiesOnly::new(["name", "age"]);
        assert_eq!(guard.to_string(), "known_properties_only:name,age");
        assert_eq!(
            guard.to_value(),
            json!({"rule": "known_properties_only", "allowed_properties": ["name", "age"]})
        );
        assert!(guard.allows("age"));
        assert!(!guard.allows("email"));
    }
}
