//! Books repository

use sqlx::{Pool, Postgres};

use super::{check_id, new_id};
use crate::{
    error::{AppError, AppResult},
    models::{Book, BookData, BookTitle},
};

const BOOK_COLUMNS: &str = "id, title, author_id, summary, isbn, genre_ids";

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all books ordered by title
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let query = format!("SELECT {} FROM books ORDER BY title", BOOK_COLUMNS);
        let rows = sqlx::query_as::<_, Book>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Titles only, for copy forms
    pub async fn titles(&self) -> AppResult<Vec<BookTitle>> {
        let rows = sqlx::query_as::<_, BookTitle>("SELECT id, title FROM books ORDER BY title")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<Option<Book>> {
        check_id(id)?;
        let query = format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS);
        let book = sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(book)
    }

    /// Books referencing an author
    pub async fn by_author(&self, author_id: &str) -> AppResult<Vec<Book>> {
        check_id(author_id)?;
        let query = format!("SELECT {} FROM books WHERE author_id = $1 ORDER BY title", BOOK_COLUMNS);
        let rows = sqlx::query_as::<_, Book>(&query)
            .bind(author_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Books referencing a genre
    pub async fn by_genre(&self, genre_id: &str) -> AppResult<Vec<Book>> {
        check_id(genre_id)?;
        let query = format!("SELECT {} FROM books WHERE $1 = ANY(genre_ids) ORDER BY title", BOOK_COLUMNS);
        let rows = sqlx::query_as::<_, Book>(&query)
            .bind(genre_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*)::bigint FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn create(&self, data: &BookData) -> AppResult<Book> {
        let query = format!(
            "INSERT INTO books ({}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            BOOK_COLUMNS, BOOK_COLUMNS
        );
        let book = sqlx::query_as::<_, Book>(&query)
            .bind(new_id())
            .bind(&data.title)
            .bind(&data.author)
            .bind(&data.summary)
            .bind(&data.isbn)
            .bind(&data.genre)
            .fetch_one(&self.pool)
            .await?;
        Ok(book)
    }

    pub async fn update(&self, id: &str, data: &BookData) -> AppResult<Book> {
        check_id(id)?;
        let query = format!(
            "UPDATE books SET title = $2, author_id = $3, summary = $4, isbn = $5, genre_ids = $6 \
             WHERE id = $1 RETURNING {}",
            BOOK_COLUMNS
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .bind(&data.title)
            .bind(&data.author)
            .bind(&data.summary)
            .bind(&data.isbn)
            .bind(&data.genre)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        check_id(id)?;
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        Ok(())
    }
}
