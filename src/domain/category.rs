//! Known spending categories offered to callers.
//!
//! Stored records keep their category as free text; this enumeration is only
//! used by callers that want to validate input before appending.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Fixed set of spending categories presented to the user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Food,
    Travel,
    Study,
    Entertainment,
    Others,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Travel,
        Category::Study,
        Category::Entertainment,
        Category::Others,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Travel => "Travel",
            Category::Study => "Study",
            Category::Entertainment => "Entertainment",
            Category::Others => "Others",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "food" => Ok(Category::Food),
            "travel" => Ok(Category::Travel),
            "study" => Ok(Category::Study),
            "entertainment" => Ok(Category::Entertainment),
            "other" | "others" => Ok(Category::Others),
            _ => Err(ValidationError::UnknownCategory(value.to_string())),
        }
    }
}
