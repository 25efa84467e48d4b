use std::fmt;

use serde::{Deserialize, Serialize};

/// Selects one of the three class slots of a [`Profile`](crate::Profile).
///
/// Parsing is total: `"10"` and `"11"` select their grades and every other
/// string selects grade 12.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassLevel {
    Ten,
    Eleven,
    Twelve,
}

impl ClassLevel {
    /// All levels in slot order.
    pub const ALL: [ClassLevel; 3] = [ClassLevel::Ten, ClassLevel::Eleven, ClassLevel::Twelve];

    /// Resolve a level selector string.
    pub fn from_selector(selector: &str) -> Self {
        match selector {
            "10" => Self::Ten,
            "11" => Self::Eleven,
            _ => Self::Twelve,
        }
    }

    /// Canonical selector string for this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ten => "10",
            Self::Eleven => "11",
            Self::Twelve => "12",
        }
    }

    /// JSON key of the slot this level addresses.
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Ten => "class_10",
            Self::Eleven => "class_11",
            Self::Twelve => "class_12",
        }
    }
}

impl From<&str> for ClassLevel {
    fn from(selector: &str) -> Self {
        Self::from_selector(selector)
    }
}

impl fmt::Display for ClassLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
