//! Circulation service: physical copies and the borrowed-books view.
//!
//! Status changes are plain librarian edits; there is no transition legality
//! check and no borrow/return workflow here.

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book_instance::{
        BookInstance, CreateBookInstance, InstanceQuery, LoanStatus, UpdateBookInstance,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CirculationService {
    repository: Repository,
}

impl CirculationService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List instances, optionally filtered by status and due date
    pub async fn list_instances(&self, filter: &InstanceQuery) -> AppResult<Vec<BookInstance>> {
        if let Some(ref status) = filter.status {
            validate_status(status)?;
        }
        self.repository.instances.list(filter).await
    }

    /// List all instances of a book
    pub async fn instances_of_book(&self, book_id: i32) -> AppResult<Vec<BookInstance>> {
        // Verify book exists
        self.repository.books.get_by_id(book_id).await?;
        self.repository.instances.list_for_book(book_id).await
    }

    /// Get a single instance
    pub async fn get_instance(&self, id: Uuid) -> AppResult<BookInstance> {
        self.repository.instances.get_by_id(id).await
    }

    /// Create an instance of a book
    pub async fn create_instance(
        &self,
        book_id: i32,
        instance: CreateBookInstance,
    ) -> AppResult<BookInstance> {
        instance
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if let Some(ref status) = instance.status {
            validate_status(status)?;
        }

        // Verify book exists
        self.repository.books.get_by_id(book_id).await?;

        self.repository.instances.create(book_id, &instance).await
    }

    /// Update an instance
    pub async fn update_instance(
        &self,
        id: Uuid,
        instance: UpdateBookInstance,
    ) -> AppResult<BookInstance> {
        instance
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if let Some(ref status) = instance.status {
            validate_status(status)?;
        }

        self.repository.instances.update(id, &instance).await
    }

    /// Delete an instance
    pub async fn delete_instance(&self, id: Uuid) -> AppResult<()> {
        self.repository.instances.delete(id).await
    }

    /// Instances currently on loan to the given patron, soonest due first
    pub async fn borrowed_by(&self, patron_id: i32) -> AppResult<Vec<BookInstance>> {
        self.repository.instances.borrowed_by(patron_id).await
    }
}

fn validate_status(code: &str) -> AppResult<()> {
    code.parse::<LoanStatus>()
        .map(|_| ())
        .map_err(AppError::Validation)
}
