//! Books repository for database operations.
//!
//! The Book <-> Genre relation goes through the book_genres join table,
//! replaced wholesale on writes (same pattern as author sync in catalog
//! imports). Relations are loaded separately on detail fetches.

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookListEntry, CreateBook, UpdateBook},
        genre::Genre,
    },
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// Get book by ID with author, genres and instances loaded
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        let mut book = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, author_id, summary, isbn, created_at, updated_at
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        if let Some(author_id) = book.author_id {
            book.author = sqlx::query_as(
                "SELECT id, first_name, last_name, date_of_birth, date_of_death FROM authors WHERE id = $1",
            )
            .bind(author_id)
            .fetch_optional(&self.pool)
            .await?;
        }

        book.genres = self.get_genres(id).await?;
        book.display_genre = book.display_genre();

        book.instances = sqlx::query_as(
            r#"
            SELECT bi.id, bi.book_id, bi.imprint, bi.due_back, bi.status,
                   bi.borrower_id, bi.created_at, bi.updated_at,
                   b.title as book_title
            FROM book_instances bi
            LEFT JOIN books b ON bi.book_id = b.id
            WHERE bi.book_id = $1
            ORDER BY bi.due_back ASC NULLS FIRST, bi.id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(book)
    }

    /// Load all genres attached to a book, in relation order
    pub async fn get_genres(&self, book_id: i32) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>(
            r#"
            SELECT g.id, g.name
            FROM book_genres bg
            JOIN genres g ON g.id = bg.genre_id
            WHERE bg.book_id = $1
            ORDER BY bg.genre_id
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(genres)
    }

    /// List books with pagination, primary-key order. Each entry carries the
    /// formatted author name and the derived genre display string.
    pub async fn list(&self, page: i64, per_page: i64) -> AppResult<(Vec<BookListEntry>, i64)> {
        let offset = (page - 1) * per_page;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;

        let entries = sqlx::query_as::<_, BookListEntry>(
            r#"
            SELECT b.id, b.title,
                   CASE WHEN a.id IS NULL THEN NULL
                        ELSE a.last_name || ', ' || a.first_name
                   END AS author,
                   COALESCE((
                       SELECT string_agg(g.name, ', ')
                       FROM (
                           SELECT g2.name
                           FROM book_genres bg
                           JOIN genres g2 ON g2.id = bg.genre_id
                           WHERE bg.book_id = b.id
                           ORDER BY bg.genre_id
                           LIMIT 3
                       ) g
                   ), '') AS genre
            FROM books b
            LEFT JOIN authors a ON b.author_id = a.id
            ORDER BY b.id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((entries, total))
    }

    // =========================================================================
    // CREATE / UPDATE
    // =========================================================================

    /// Create a new book and attach its genres
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO books (title, author_id, summary, isbn, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            RETURNING id
            "#,
        )
        .bind(&book.title)
        .bind(book.author_id)
        .bind(&book.summary)
        .bind(&book.isbn)
        .fetch_one(&self.pool)
        .await?;

        self.replace_genres(id, &book.genre_ids).await?;

        self.get_by_id(id).await
    }

    /// Update an existing book. Absent fields are left unchanged; a present
    /// genre_ids replaces the full genre set.
    pub async fn update(&self, id: i32, book: &UpdateBook) -> AppResult<Book> {
        let result = sqlx::query(
            r#"
            UPDATE books SET
                title = COALESCE($1, title),
                author_id = COALESCE($2, author_id),
                summary = COALESCE($3, summary),
                isbn = COALESCE($4, isbn),
                updated_at = NOW()
            WHERE id = $5
            "#,
        )
        .bind(book.title.as_deref())
        .bind(book.author_id)
        .bind(book.summary.as_deref())
        .bind(book.isbn.as_deref())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        if let Some(ref genre_ids) = book.genre_ids {
            self.replace_genres(id, genre_ids).await?;
        }

        self.get_by_id(id).await
    }

    /// Replace all genre links for a book: delete existing rows then insert
    /// the new set.
    pub async fn replace_genres(&self, book_id: i32, genre_ids: &[i32]) -> AppResult<()> {
        let known: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM genres WHERE id = ANY($1)")
                .bind(genre_ids)
                .fetch_one(&self.pool)
                .await?;
        if known != genre_ids.len() as i64 {
            return Err(AppError::NotFound(
                "One or more genre ids do not exist".to_string(),
            ));
        }

        sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
            .bind(book_id)
            .execute(&self.pool)
            .await?;

        for genre_id in genre_ids {
            sqlx::query(
                r#"
                INSERT INTO book_genres (book_id, genre_id)
                VALUES ($1, $2)
                ON CONFLICT (book_id, genre_id) DO NOTHING
                "#,
            )
            .bind(book_id)
            .bind(genre_id)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    // =========================================================================
    // DELETE
    // =========================================================================

    /// Delete a book. Refused while any instance references it; the FK
    /// RESTRICT backs this check if a copy appears concurrently. Genre links
    /// go with the book (join-table CASCADE).
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let referencing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE book_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        if referencing > 0 {
            return Err(AppError::Restrict(format!(
                "Book {} is referenced by {} book instance(s)",
                id, referencing
            )));
        }

        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    /// Check if ISBN already exists
    pub async fn isbn_exists(&self, isbn: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1 AND id != $2)")
                .bind(isbn)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1)")
                .bind(isbn)
                .fetch_one(&self.pool)
                .await?
        };

        Ok(exists)
    }

    /// Count all books
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
