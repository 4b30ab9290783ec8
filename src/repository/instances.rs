//! Book instances repository.
//!
//! Instance ids are random UUIDs assigned here at creation. All listings use
//! the declared ordering: due_back ascending, NULLs (no due date) first.

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book_instance::{BookInstance, CreateBookInstance, InstanceQuery, LoanStatus, UpdateBookInstance},
};

const INSTANCE_COLUMNS: &str = r#"
    bi.id, bi.book_id, bi.imprint, bi.due_back, bi.status,
    bi.borrower_id, bi.created_at, bi.updated_at,
    b.title as book_title
"#;

#[derive(Clone)]
pub struct InstancesRepository {
    pool: Pool<Postgres>,
}

impl InstancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get instance by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<BookInstance> {
        let query = format!(
            r#"
            SELECT {INSTANCE_COLUMNS}
            FROM book_instances bi
            LEFT JOIN books b ON bi.book_id = b.id
            WHERE bi.id = $1
            "#
        );

        sqlx::query_as::<_, BookInstance>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    /// List instances with optional status / due-date filters
    pub async fn list(&self, filter: &InstanceQuery) -> AppResult<Vec<BookInstance>> {
        let mut conditions = vec!["1=1".to_string()];
        let mut idx = 0;

        if filter.status.is_some() {
            idx += 1;
            conditions.push(format!("bi.status = ${idx}"));
        }
        if filter.due_before.is_some() {
            idx += 1;
            conditions.push(format!("bi.due_back <= ${idx}"));
        }
        if filter.due_after.is_some() {
            idx += 1;
            conditions.push(format!("bi.due_back >= ${idx}"));
        }

        let query = format!(
            r#"
            SELECT {INSTANCE_COLUMNS}
            FROM book_instances bi
            LEFT JOIN books b ON bi.book_id = b.id
            WHERE {}
            ORDER BY bi.due_back ASC NULLS FIRST, bi.id
            "#,
            conditions.join(" AND ")
        );

        let mut q = sqlx::query_as::<_, BookInstance>(&query);
        if let Some(ref status) = filter.status {
            q = q.bind(status.clone());
        }
        if let Some(due_before) = filter.due_before {
            q = q.bind(due_before);
        }
        if let Some(due_after) = filter.due_after {
            q = q.bind(due_after);
        }

        let instances = q.fetch_all(&self.pool).await?;
        Ok(instances)
    }

    /// List all instances of a book
    pub async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BookInstance>> {
        let query = format!(
            r#"
            SELECT {INSTANCE_COLUMNS}
            FROM book_instances bi
            LEFT JOIN books b ON bi.book_id = b.id
            WHERE bi.book_id = $1
            ORDER BY bi.due_back ASC NULLS FIRST, bi.id
            "#
        );

        let instances = sqlx::query_as::<_, BookInstance>(&query)
            .bind(book_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(instances)
    }

    /// Instances currently on loan to a patron, soonest due first
    pub async fn borrowed_by(&self, patron_id: i32) -> AppResult<Vec<BookInstance>> {
        let query = format!(
            r#"
            SELECT {INSTANCE_COLUMNS}
            FROM book_instances bi
            LEFT JOIN books b ON bi.book_id = b.id
            WHERE bi.borrower_id = $1 AND bi.status = $2
            ORDER BY bi.due_back ASC NULLS FIRST, bi.id
            "#
        );

        let instances = sqlx::query_as::<_, BookInstance>(&query)
            .bind(patron_id)
            .bind(LoanStatus::OnLoan.as_code())
            .fetch_all(&self.pool)
            .await?;
        Ok(instances)
    }

    /// Create an instance for a book. The id is generated here, not by the
    /// store, so it is random rather than sequential.
    pub async fn create(&self, book_id: i32, instance: &CreateBookInstance) -> AppResult<BookInstance> {
        let id = Uuid::new_v4();
        let status = instance
            .status
            .as_deref()
            .unwrap_or(LoanStatus::default().as_code());

        sqlx::query(
            r#"
            INSERT INTO book_instances
                (id, book_id, imprint, due_back, status, borrower_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
            "#,
        )
        .bind(id)
        .bind(book_id)
        .bind(&instance.imprint)
        .bind(instance.due_back)
        .bind(status)
        .bind(instance.borrower_id)
        .execute(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Update an instance. Absent fields are left unchanged.
    pub async fn update(&self, id: Uuid, instance: &UpdateBookInstance) -> AppResult<BookInstance> {
        let result = sqlx::query(
            r#"
            UPDATE book_instances SET
                imprint = COALESCE($1, imprint),
                due_back = COALESCE($2, due_back),
                status = COALESCE($3, status),
                borrower_id = COALESCE($4, borrower_id),
                updated_at = NOW()
            WHERE id = $5
            "#,
        )
        .bind(instance.imprint.as_deref())
        .bind(instance.due_back)
        .bind(instance.status.as_deref())
        .bind(instance.borrower_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book instance {} not found", id)));
        }

        self.get_by_id(id).await
    }

    /// Delete an instance
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book instance {} not found", id)));
        }
        Ok(())
    }

    /// Count all instances
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count instances with the given status
    pub async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = $1")
                .bind(status.as_code())
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
