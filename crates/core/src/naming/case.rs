//! Case styles applied to candidate display names.

use std::fmt;

use heck::{ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use serde::{Deserialize, Serialize};

/// How a raw entity name is cased before it becomes a display name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseStyle {
    /// `userProfile`
    #[serde(rename = "camelCase")]
    Camel,
    /// `UserProfile`
    #[default]
    #[serde(rename = "PascalCase")]
    Pascal,
    /// `user_profile`
    #[serde(rename = "snake_case")]
    Snake,
    /// `USER_PROFILE`
    #[serde(rename = "SCREAMING_SNAKE_CASE")]
    ScreamingSnake,
    /// Leave the name untouched.
    #[serde(rename = "preserve")]
    Preserve,
}

impl CaseStyle {
    /// Apply this style to `value`.
    pub fn apply(self, value: &str) -> String {
        match self {
            CaseStyle::Camel => value.to_lower_camel_case(),
            CaseStyle::Pascal => value.to_upper_camel_case(),
            CaseStyle::Snake => value.to_snake_case(),
            CaseStyle::ScreamingSnake => value.to_shouty_snake_case(),
            CaseStyle::Preserve => value.to_string(),
        }
    }

    /// The configuration spelling of this style.
    pub fn as_str(self) -> &'static str {
        match self {
            CaseStyle::Camel => "camelCase",
            CaseStyle::Pascal => "PascalCase",
            CaseStyle::Snake => "snake_case",
            CaseStyle::ScreamingSnake => "SCREAMING_SNAKE_CASE",
            CaseStyle::Preserve => "preserve",
        }
    }
}

impl fmt::Display for CaseStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
