use serde::{Deserialize, Serialize};

use crate::resolver::ResolveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealPeriod {
    Breakfast,  // 0
    Lunch,      // 1
    Dinner,     // 2
    Brunch,     // 3
}

impl MealPeriod {
    pub const ALL: [MealPeriod; 4] = [
        MealPeriod::Breakfast,
        MealPeriod::Lunch,
        MealPeriod::Dinner,
        MealPeriod::Brunch,
    ];

    pub fn from_code(code: i64) -> Result<Self, ResolveError> {
        Ok(match code {
            0 => Self::Breakfast,
            1 => Self::Lunch,
            2 => Self::Dinner,
            3 => Self::Brunch,
            _ => return Err(ResolveError::InvalidMeal(code)),
        })
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Breakfast => 0,
            Self::Lunch => 1,
            Self::Dinner => 2,
            Self::Brunch => 3,
        }
    }

    /// period id used by the upstream menu endpoints
    pub fn period_id(self) -> u32 {
        match self {
            Self::Breakfast => 49,
            Self::Lunch => 106,
            Self::Dinner => 107,
            Self::Brunch => 2651,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Brunch => "brunch",
        }
    }
}

impl std::fmt::Display for MealPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
