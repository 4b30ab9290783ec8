//! Genre (book category) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::constants::CHAR_MAX_LEN;

/// Genre model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

impl Genre {
    /// Canonical path for this genre's detail page
    pub fn absolute_url(&self) -> String {
        format!("/genre/{}", self.id)
    }
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Create genre request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateGenre {
    #[validate(length(min = 1, max = CHAR_MAX_LEN))]
    pub name: String,
}

/// Update genre request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateGenre {
    #[validate(length(min = 1, max = CHAR_MAX_LEN))]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_as_name() {
        let genre = Genre {
            id: 7,
            name: "Science Fiction".to_string(),
        };
        assert_eq!(genre.to_string(), "Science Fiction");
        assert_eq!(genre.absolute_url(), "/genre/7");
    }
}
