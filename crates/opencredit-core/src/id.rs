//! Strongly-typed record identifiers.
//!
//! Sources disagree on whether keys are text or numbers, so identifiers are
//! kept as text and compared by equality. Numeric keys from typed sources go
//! through [`canonical_number`] first so `7.0` and `"7"` meet.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! new_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Ord, PartialOrd,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(v: impl Into<String>) -> Self {
                Self(v.into())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(v: &str) -> Self {
                Self(v.to_string())
            }
        }

        impl From<String> for $name {
            fn from(v: String) -> Self {
                Self(v)
            }
        }
    };
}

new_id!(OrderId);
new_id!(EmployeeId);

/// Render a number the way a text source would have spelled the same key:
/// integral values lose their fraction (`7.0` -> `"7"`).
pub fn canonical_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_numbers_drop_fraction() {
        assert_eq!(canonical_number(7.0), "7");
        assert_eq!(canonical_number(-3.0), "-3");
        assert_eq!(canonical_number(2.5), "2.5");
    }

    #[test]
    fn ids_compare_by_text() {
        assert_eq!(OrderId::from("O1"), OrderId::new(String::from("O1")));
        assert_ne!(EmployeeId::from("1"), EmployeeId::from("01"));
        assert_eq!(EmployeeId::from("E1").to_string(), "E1");
    }
}
