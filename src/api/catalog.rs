//! Public catalog views: index aggregates, book list/detail, borrowed books

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    constants::CATALOG_PAGE_SIZE,
    error::AppResult,
    models::{
        book::{Book, BookListEntry, BookQuery},
        book_instance::BookInstance,
    },
    services::catalog::LibraryCounts,
};

use super::AuthenticatedUser;

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// List of items
    pub items: Vec<T>,
    /// Total number of items
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Items per page
    pub per_page: i64,
}

/// Landing-page aggregates
#[utoipa::path(
    get,
    path = "/",
    tag = "catalog",
    responses(
        (status = 200, description = "Library aggregate counts", body = LibraryCounts)
    )
)]
pub async fn index(State(state): State<crate::AppState>) -> AppResult<Json<LibraryCounts>> {
    let counts = state.services.catalog.counts().await?;
    Ok(Json(counts))
}

/// List books, two per page
#[utoipa::path(
    get,
    path = "/books/",
    tag = "catalog",
    params(
        ("page" = Option<i64>, Query, description = "Page number (default: 1)")
    ),
    responses(
        (status = 200, description = "Paginated book list", body = PaginatedResponse<BookListEntry>)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<PaginatedResponse<BookListEntry>>> {
    let page = query.page.unwrap_or(1);
    let (items, total) = state.services.catalog.list_books(page).await?;

    Ok(Json(PaginatedResponse {
        items,
        total,
        page,
        per_page: CATALOG_PAGE_SIZE,
    }))
}

/// Book detail with author, genres and copies
#[utoipa::path(
    get,
    path = "/book/{id}",
    tag = "catalog",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Copies currently on loan to the authenticated patron, soonest due first
#[utoipa::path(
    get,
    path = "/mybooks/",
    tag = "catalog",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Borrowed copies", body = Vec<BookInstance>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BookInstance>>> {
    let instances = state.services.circulation.borrowed_by(claims.sub).await?;
    Ok(Json(instances))
}
