//! Book (catalog entry) model and related types.
//!
//! A Book is the catalog record for a title, independent of the physical
//! copies tracked as [`super::book_instance::BookInstance`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::constants::{CHAR_MAX_LEN, GENRE_DISPLAY_LIMIT, ISBN_MAX_LEN, TEXT_MAX_LEN};

use super::author::Author;
use super::book_instance::BookInstance;
use super::genre::Genre;

/// Full book model (DB + API). Relations are loaded separately by the
/// repository and left empty on bare row fetches.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    pub summary: String,
    pub isbn: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    // Relations (loaded separately)
    #[sqlx(skip)]
    #[serde(default)]
    pub author: Option<Author>,
    #[sqlx(skip)]
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[sqlx(skip)]
    #[serde(default)]
    pub instances: Vec<BookInstance>,
    /// Derived genre display string, filled in once genres are loaded
    #[sqlx(skip)]
    #[serde(default)]
    pub display_genre: String,
}

impl Book {
    /// Canonical path for this book's detail page
    pub fn absolute_url(&self) -> String {
        format!("/book/{}", self.id)
    }

    /// Join the names of up to the first three loaded genres, in relation
    /// order. Truncates silently; not authoritative for the genre count.
    pub fn display_genre(&self) -> String {
        self.genres
            .iter()
            .take(GENRE_DISPLAY_LIMIT)
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Short book representation for the paginated catalog list
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookListEntry {
    pub id: i32,
    pub title: String,
    /// Author formatted "last, first", absent when the book has no author
    pub author: Option<String>,
    /// Derived genre display string (up to three names)
    pub genre: String,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = CHAR_MAX_LEN))]
    pub title: String,
    pub author_id: Option<i32>,
    #[validate(length(max = TEXT_MAX_LEN))]
    pub summary: String,
    #[validate(length(min = 10, max = ISBN_MAX_LEN))]
    pub isbn: String,
    /// Genres to attach, by id
    #[serde(default)]
    pub genre_ids: Vec<i32>,
}

/// Update book request. Absent fields are left unchanged; `genre_ids`
/// replaces the full genre set when present.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = CHAR_MAX_LEN))]
    pub title: Option<String>,
    pub author_id: Option<i32>,
    #[validate(length(max = TEXT_MAX_LEN))]
    pub summary: Option<String>,
    #[validate(length(min = 10, max = ISBN_MAX_LEN))]
    pub isbn: Option<String>,
    pub genre_ids: Option<Vec<i32>>,
}

/// Catalog list query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Page number (default: 1)
    pub page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book_with_genres(names: &[&str]) -> Book {
        Book {
            id: 1,
            title: "The Hobbit".to_string(),
            author_id: None,
            summary: String::new(),
            isbn: "9780345339683".to_string(),
            created_at: None,
            updated_at: None,
            author: None,
            genres: names
                .iter()
                .enumerate()
                .map(|(i, name)| Genre {
                    id: i as i32 + 1,
                    name: name.to_string(),
                })
                .collect(),
            instances: Vec::new(),
            display_genre: String::new(),
        }
    }

    #[test]
    fn display_genre_joins_up_to_three_names() {
        let book = book_with_genres(&["Fantasy", "Adventure", "Classics", "Epic", "Children"]);
        assert_eq!(book.display_genre(), "Fantasy, Adventure, Classics");
    }

    #[test]
    fn display_genre_with_fewer_genres() {
        assert_eq!(book_with_genres(&["Fantasy"]).display_genre(), "Fantasy");
        assert_eq!(book_with_genres(&[]).display_genre(), "");
    }

    #[test]
    fn displays_as_title() {
        let book = book_with_genres(&[]);
        assert_eq!(book.to_string(), "The Hobbit");
        assert_eq!(book.absolute_url(), "/book/1");
    }
}
