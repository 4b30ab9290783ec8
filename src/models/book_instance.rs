//! Book instance (physical copy) model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::constants::CHAR_MAX_LEN;

/// Loan status of a physical copy. Stored as a single-character code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum LoanStatus {
    Maintenance,
    OnLoan,
    Available,
    Reserved,
}

impl LoanStatus {
    /// Return the single-character code stored in the database
    pub fn as_code(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "m",
            LoanStatus::OnLoan => "o",
            LoanStatus::Available => "a",
            LoanStatus::Reserved => "r",
        }
    }

    /// Parse a status code; anything outside the closed set is rejected
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "m" => Some(LoanStatus::Maintenance),
            "o" => Some(LoanStatus::OnLoan),
            "a" => Some(LoanStatus::Available),
            "r" => Some(LoanStatus::Reserved),
            _ => None,
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::OnLoan => "On loan",
            LoanStatus::Available => "Available",
            LoanStatus::Reserved => "Reserved",
        }
    }
}

impl Default for LoanStatus {
    fn default() -> Self {
        LoanStatus::Maintenance
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LoanStatus::parse(s)
            .ok_or_else(|| format!("Invalid status code '{s}' (expected one of m, o, a, r)"))
    }
}

/// Full book instance model from database.
/// The id is a random UUID assigned at creation, unique across the whole
/// library. Listings order by due_back ascending, copies without a due date
/// first.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstance {
    pub id: Uuid,
    pub book_id: Option<i32>,
    pub imprint: String,
    /// Set while the copy is on loan, normally absent otherwise
    pub due_back: Option<NaiveDate>,
    /// Status code: m=Maintenance, o=On loan, a=Available, r=Reserved
    pub status: String,
    pub borrower_id: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    // Populated when queried with a JOIN on books, None otherwise
    #[sqlx(default)]
    #[serde(default)]
    pub book_title: Option<String>,
}

impl std::fmt::Display for BookInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({})",
            self.id,
            self.book_title.as_deref().unwrap_or("-")
        )
    }
}

/// Create book instance request. The owning book comes from the route.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookInstance {
    #[validate(length(min = 1, max = CHAR_MAX_LEN))]
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    /// Status code; defaults to "m" (Maintenance)
    pub status: Option<String>,
    pub borrower_id: Option<i32>,
}

/// Update book instance request. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBookInstance {
    #[validate(length(min = 1, max = CHAR_MAX_LEN))]
    pub imprint: Option<String>,
    pub due_back: Option<NaiveDate>,
    pub status: Option<String>,
    pub borrower_id: Option<i32>,
}

/// Instance listing filters (admin console)
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct InstanceQuery {
    /// Filter by status code
    pub status: Option<String>,
    /// Only instances due on or before this date
    pub due_before: Option<NaiveDate>,
    /// Only instances due on or after this date
    pub due_after: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_round_trip() {
        for status in [
            LoanStatus::Maintenance,
            LoanStatus::OnLoan,
            LoanStatus::Available,
            LoanStatus::Reserved,
        ] {
            assert_eq!(LoanStatus::parse(status.as_code()), Some(status));
        }
    }

    #[test]
    fn unknown_status_code_is_rejected() {
        assert_eq!(LoanStatus::parse("x"), None);
        assert_eq!(LoanStatus::parse(""), None);
        assert!("x".parse::<LoanStatus>().is_err());
    }

    #[test]
    fn default_status_is_maintenance() {
        assert_eq!(LoanStatus::default(), LoanStatus::Maintenance);
        assert_eq!(LoanStatus::default().as_code(), "m");
    }

    #[test]
    fn status_labels() {
        assert_eq!(LoanStatus::OnLoan.to_string(), "On loan");
        assert_eq!(LoanStatus::Available.to_string(), "Available");
    }

    #[test]
    fn instance_displays_id_and_title() {
        let instance = BookInstance {
            id: Uuid::nil(),
            book_id: Some(1),
            imprint: "Unwin Hyman, 1988".to_string(),
            due_back: None,
            status: "a".to_string(),
            borrower_id: None,
            created_at: None,
            updated_at: None,
            book_title: Some("The Hobbit".to_string()),
        };
        assert_eq!(
            instance.to_string(),
            "00000000-0000-0000-0000-000000000000 (The Hobbit)"
        );
    }
}
