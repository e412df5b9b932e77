/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::ApiError;

/// Numeric user identifier, parsed at the HTTP boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct UserId(pub i32);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid user id '{0}': must be a positive integer")]
pub struct InvalidUserId(pub String);

impl FromStr for UserId {
    type Err = InvalidUserId;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        // Plain decimal digits only; no sign, whitespace or exponent
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidUserId(raw.to_string()));
        }
        match raw.parse::<i32>() {
            Ok(id) if id > 0 => Ok(UserId(id)),
            _ => Err(InvalidUserId(raw.to_string())),
        }
    }
}

impl From<InvalidUserId> for ApiError {
    fn from(err: InvalidUserId) -> Self {
        ApiError::field_error("id", err.to_string())
    }
}

/// JSON truthiness: `false`, `null`, `0`, `""` and absence are false
pub fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Accepts either a single object or a list of them
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_positive_ids() {
        assert_eq!("42".parse::<UserId>(), Ok(UserId(42)));
        assert_eq!("2147483647".parse::<UserId>(), Ok(UserId(i32::MAX)));
    }

    #[test]
    fn rejects_malformed_ids() {
        for raw in ["", "0", "-3", "+3", "abc", "12abc", " 7", "1e3", "2147483648"] {
            assert!(raw.parse::<UserId>().is_err(), "accepted {raw:?}");
        }
    }

    #[test]
    fn truthiness_matches_json_semantics() {
        assert!(truthy(Some(&json!(true))));
        assert!(truthy(Some(&json!(1))));
        assert!(truthy(Some(&json!("false"))));
        assert!(truthy(Some(&json!([]))));
        assert!(truthy(Some(&json!({}))));

        assert!(!truthy(None));
        assert!(!truthy(Some(&json!(null))));
        assert!(!truthy(Some(&json!(false))));
        assert!(!truthy(Some(&json!(0))));
        assert!(!truthy(Some(&json!(0.0))));
        assert!(!truthy(Some(&json!(""))));
    }

    #[test]
    fn one_or_many_accepts_both_shapes() {
        let one: OneOrMany<u8> = serde_json::from_value(json!(5)).unwrap();
        assert_eq!(one.into_vec(), vec![5]);

        let many: OneOrMany<u8> = serde_json::from_value(json!([1, 2])).unwrap();
        assert_eq!(many.into_vec(), vec![1, 2]);
    }
}
