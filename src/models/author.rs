//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::constants::CHAR_MAX_LEN;

/// Author model from database.
/// Listings order by last name, then first name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    /// Date of death ("died")
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// Canonical path for this author's detail page
    pub fn absolute_url(&self) -> String {
        format!("/author/{}", self.id)
    }
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.last_name, self.first_name)
    }
}

/// Create author request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAuthor {
    #[validate(length(min = 1, max = CHAR_MAX_LEN))]
    pub first_name: String,
    #[validate(length(min = 1, max = CHAR_MAX_LEN))]
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

/// Update author request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAuthor {
    #[validate(length(min = 1, max = CHAR_MAX_LEN))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = CHAR_MAX_LEN))]
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_last_name_first() {
        let author = Author {
            id: 1,
            first_name: "J.R.R.".to_string(),
            last_name: "Tolkien".to_string(),
            date_of_birth: None,
            date_of_death: None,
        };
        assert_eq!(author.to_string(), "Tolkien, J.R.R.");
        assert_eq!(author.absolute_url(), "/author/1");
    }
}
