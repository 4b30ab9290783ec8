//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{admin, catalog, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Libris API",
        version = "0.1.0",
        description = "Library catalog server",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Catalog
        catalog::index,
        catalog::list_books,
        catalog::get_book,
        catalog::my_books,
        // Admin console
        admin::get_schema,
        admin::list_genres,
        admin::create_genre,
        admin::update_genre,
        admin::delete_genre,
        admin::list_authors,
        admin::create_author,
        admin::get_author,
        admin::update_author,
        admin::delete_author,
        admin::create_book,
        admin::update_book,
        admin::delete_book,
        admin::list_book_instances,
        admin::create_book_instance,
        admin::list_instances,
        admin::get_instance,
        admin::update_instance,
        admin::delete_instance,
    ),
    components(
        schemas(
            // Catalog
            crate::models::genre::Genre,
            crate::models::genre::CreateGenre,
            crate::models::genre::UpdateGenre,
            crate::models::author::Author,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            crate::models::book::Book,
            crate::models::book::BookListEntry,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book_instance::BookInstance,
            crate::models::book_instance::CreateBookInstance,
            crate::models::book_instance::UpdateBookInstance,
            crate::models::book_instance::LoanStatus,
            crate::services::catalog::LibraryCounts,
            // Errors
            crate::error::ErrorResponse,
            // Health
            health::HealthResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Public catalog views"),
        (name = "admin", description = "Librarian console")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
