//! # Key Rename Rules
//!
//! Record-level schemes that derive a field's serialized key from its
//! internal key. Internal keys are snake_case identifiers; each rule maps
//! them to one target convention.
//!
//! A rule is the fallback only: an explicit per-field rename always takes
//! precedence over the record's rule, regardless of declaration order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A key renaming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenameRule {
    /// Keep the internal key unchanged.
    #[default]
    None,
    /// `lowercase`
    LowerCase,
    /// `UPPERCASE`
    UpperCase,
    /// `camelCase`
    CamelCase,
    /// `PascalCase`
    PascalCase,
    /// `snake_case`
    SnakeCase,
    /// `SCREAMING_SNAKE_CASE`
    ScreamingSnakeCase,
    /// `kebab-case`
    KebabCase,
    /// `SCREAMING-KEBAB-CASE`
    ScreamingKebabCase,
}

/// Every rule with the spelling it parses from.
const RULES: &[(&str, RenameRule)] = &[
    ("none", RenameRule::None),
    ("lowercase", RenameRule::LowerCase),
    ("UPPERCASE", RenameRule::UpperCase),
    ("camelCase", RenameRule::CamelCase),
    ("PascalCase", RenameRule::PascalCase),
    ("snake_case", RenameRule::SnakeCase),
    ("SCREAMING_SNAKE_CASE", RenameRule::ScreamingSnakeCase),
    ("kebab-case", RenameRule::KebabCase),
    ("SCREAMING-KEBAB-CASE", RenameRule::ScreamingKebabCase),
];

impl RenameRule {
    /// Apply the rule to a snake_case internal key.
    pub fn apply(self, key: &str) -> String {
        match self {
            Self::None | Self::SnakeCase => key.to_string(),
            Self::LowerCase => key.to_ascii_lowercase(),
            Self::UpperCase | Self::ScreamingSnakeCase => key.to_ascii_uppercase(),
            Self::PascalCase => key.split('_').map(capitalize).collect(),
            Self::CamelCase => {
                let pascal = Self::PascalCase.apply(key);
                let mut chars = pascal.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                    None => pascal,
                }
            }
            Self::KebabCase => key.replace('_', "-"),
            Self::ScreamingKebabCase => key.to_ascii_uppercase().replace('_', "-"),
        }
    }

    /// The canonical spelling of this rule.
    pub fn as_str(self) -> &'static str {
        RULES
            .iter()
            .find(|(_, rule)| *rule == self)
            .map_or("none", |(name, _)| name)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// An unrecognized rename rule spelling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown rename rule `{0}`")]
pub struct ParseRenameRuleError(pub String);

impl FromStr for RenameRule {
    type Err = ParseRenameRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RULES
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, rule)| *rule)
            .ok_or_else(|| ParseRenameRuleError(s.to_string()))
    }
}

impl fmt::Display for RenameRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RenameRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RenameRule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_rule() {
        let key = "first_part_id";
        assert_eq!(RenameRule::None.apply(key), "first_part_id");
        assert_eq!(RenameRule::LowerCase.apply("Mixed_Key"), "mixed_key");
        assert_eq!(RenameRule::UpperCase.apply(key), "FIRST_PART_ID");
        assert_eq!(RenameRule::CamelCase.apply(key), "firstPartId");
        assert_eq!(RenameRule::PascalCase.apply(key), "FirstPartId");
        assert_eq!(RenameRule::SnakeCase.apply(key), "first_part_id");
        assert_eq!(RenameRule::ScreamingSnakeCase.apply(key), "FIRST_PART_ID");
        assert_eq!(RenameRule::KebabCase.apply(key), "first-part-id");
        assert_eq!(RenameRule::ScreamingKebabCase.apply(key), "FIRST-PART-ID");
    }

    #[test]
    fn test_single_word() {
        assert_eq!(RenameRule::CamelCase.apply("value"), "value");
        assert_eq!(RenameRule::PascalCase.apply("value"), "Value");
    }

    #[test]
    fn test_parse_round_trip() {
        for (name, rule) in RULES {
            assert_eq!(name.parse::<RenameRule>().unwrap(), *rule);
            assert_eq!(rule.to_string(), *name);
        }
    }

    #[test]
    fn test_parse_unknown() {
        let err = "Title Case".parse::<RenameRule>().unwrap_err();
        assert_eq!(err.to_string(), "unknown rename rule `Title Case`");
    }

    #[test]
    fn test_deserialize() {
        let rule: RenameRule = serde_json::from_str(r#""kebab-case""#).unwrap();
        assert_eq!(rule, RenameRule::KebabCase);
        assert!(serde_json::from_str::<RenameRule>(r#""bogus""#).is_err());
    }
}
