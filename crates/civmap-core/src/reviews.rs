use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single user review as shown in the detail panel's reviews tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub reviewer: String,
    /// Star rating, 1 through 5.
    pub rating: u8,
    pub text: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub like_count: u32,
    #[serde(default)]
    pub reply_count: u32,
}

impl Review {
    #[must_use]
    pub fn is_valid_rating(&self) -> bool {
        (1..=5).contains(&self.rating)
    }
}
