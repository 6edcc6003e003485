//! Book instances (copies) repository

use sqlx::{postgres::PgRow, Pool, Postgres, Row};

use super::{check_id, new_id};
use crate::{
    error::{AppError, AppResult},
    models::{BookInstance, BookInstanceData, InstanceStatus},
};

const INSTANCE_COLUMNS: &str = "id, book_id, imprint, status, due_back";

/// Map a `book_instances` row; the status column holds the status label
fn instance_from_row(row: &PgRow) -> AppResult<BookInstance> {
    let status: String = row.try_get("status")?;
    Ok(BookInstance {
        id: row.try_get("id")?,
        book: row.try_get("book_id")?,
        imprint: row.try_get("imprint")?,
        status: status
            .parse::<InstanceStatus>()
            .map_err(|_| AppError::Store(format!("Unknown copy status in store: {}", status)))?,
        due_back: row.try_get("due_back")?,
    })
}

#[derive(Clone)]
pub struct BookInstancesRepository {
    pool: Pool<Postgres>,
}

impl BookInstancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<BookInstance>> {
        let query = format!("SELECT {} FROM book_instances ORDER BY imprint", INSTANCE_COLUMNS);
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        rows.iter().map(instance_from_row).collect()
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<Option<BookInstance>> {
        check_id(id)?;
        let query = format!("SELECT {} FROM book_instances WHERE id = $1", INSTANCE_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(instance_from_row).transpose()
    }

    /// Copies of a book
    pub async fn by_book(&self, book_id: &str) -> AppResult<Vec<BookInstance>> {
        check_id(book_id)?;
        let query = format!(
            "SELECT {} FROM book_instances WHERE book_id = $1 ORDER BY imprint",
            INSTANCE_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(book_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(instance_from_row).collect()
    }

    pub async fn count(&self, status: Option<InstanceStatus>) -> AppResult<i64> {
        let count: i64 = match status {
            Some(status) => {
                sqlx::query_scalar("SELECT COUNT(*)::bigint FROM book_instances WHERE status = $1")
                    .bind(status.as_str())
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*)::bigint FROM book_instances")
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(count)
    }

    pub async fn create(&self, data: &BookInstanceData) -> AppResult<BookInstance> {
        let query = format!(
            "INSERT INTO book_instances ({}) VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            INSTANCE_COLUMNS, INSTANCE_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(new_id())
            .bind(&data.book)
            .bind(&data.imprint)
            .bind(data.status.as_str())
            .bind(data.due_back)
            .fetch_one(&self.pool)
            .await?;
        instance_from_row(&row)
    }

    pub async fn update(&self, id: &str, data: &BookInstanceData) -> AppResult<BookInstance> {
        check_id(id)?;
        let query = format!(
            "UPDATE book_instances SET book_id = $2, imprint = $3, status = $4, due_back = $5 \
             WHERE id = $1 RETURNING {}",
            INSTANCE_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(id)
            .bind(&data.book)
            .bind(&data.imprint)
            .bind(data.status.as_str())
            .bind(data.due_back)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book copy {} not found", id)))?;
        instance_from_row(&row)
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        check_id(id)?;
        let result = sqlx::query("DELETE FROM book_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book copy {} not found", id)));
        }
        Ok(())
    }
}
