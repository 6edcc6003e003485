//! Document store boundary.
//!
//! [`CatalogStore`] lists the operations the services need on the four collections:
//! find-by-id (a missing record is `Ok(None)`, never an error), filtered finds and
//! projections, counts, insert, update-by-id and delete-by-id. Two backends implement
//! it: [`Repository`] over PostgreSQL and [`memory::InMemoryStore`].
//!
//! References between records are plain identifiers with no foreign keys, so a book
//! may point at an author or genre that no longer exists.

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod genres;
pub mod memory;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        Author, AuthorData, Book, BookData, BookInstance, BookInstanceData, BookTitle, Genre,
        GenreData, InstanceStatus,
    },
};

/// Issue a fresh record identifier
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Reject identifiers the store could never have issued
pub fn check_id(id: &str) -> AppResult<()> {
    Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|_| AppError::InvalidId(id.to_string()))
}

/// Operations on the catalog collections
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    // --- authors ---
    /// All authors, by family name
    async fn authors_list(&self) -> AppResult<Vec<Author>>;
    async fn authors_get(&self, id: &str) -> AppResult<Option<Author>>;
    async fn authors_count(&self) -> AppResult<i64>;
    async fn authors_insert(&self, data: &AuthorData) -> AppResult<Author>;
    async fn authors_update(&self, id: &str, data: &AuthorData) -> AppResult<Author>;
    async fn authors_delete(&self, id: &str) -> AppResult<()>;

    // --- genres ---
    /// All genres, by name
    async fn genres_list(&self) -> AppResult<Vec<Genre>>;
    async fn genres_get(&self, id: &str) -> AppResult<Option<Genre>>;
    /// Genres among `ids`; unknown identifiers are skipped
    async fn genres_by_ids(&self, ids: Vec<String>) -> AppResult<Vec<Genre>>;
    async fn genres_find_by_name(&self, name: &str) -> AppResult<Option<Genre>>;
    async fn genres_count(&self) -> AppResult<i64>;
    async fn genres_insert(&self, data: &GenreData) -> AppResult<Genre>;
    async fn genres_update(&self, id: &str, data: &GenreData) -> AppResult<Genre>;
    async fn genres_delete(&self, id: &str) -> AppResult<()>;

    // --- books ---
    /// All books, by title
    async fn books_list(&self) -> AppResult<Vec<Book>>;
    /// Titles of all books, by title
    async fn books_titles(&self) -> AppResult<Vec<BookTitle>>;
    async fn books_get(&self, id: &str) -> AppResult<Option<Book>>;
    async fn books_by_author(&self, author_id: &str) -> AppResult<Vec<Book>>;
    async fn books_by_genre(&self, genre_id: &str) -> AppResult<Vec<Book>>;
    async fn books_count(&self) -> AppResult<i64>;
    async fn books_insert(&self, data: &BookData) -> AppResult<Book>;
    async fn books_update(&self, id: &str, data: &BookData) -> AppResult<Book>;
    async fn books_delete(&self, id: &str) -> AppResult<()>;

    // --- book instances ---
    async fn instances_list(&self) -> AppResult<Vec<BookInstance>>;
    async fn instances_get(&self, id: &str) -> AppResult<Option<BookInstance>>;
    async fn instances_by_book(&self, book_id: &str) -> AppResult<Vec<BookInstance>>;
    /// Count copies, optionally only those with `status`
    async fn instances_count(&self, status: Option<InstanceStatus>) -> AppResult<i64>;
    async fn instances_insert(&self, data: &BookInstanceData) -> AppResult<BookInstance>;
    async fn instances_update(&self, id: &str, data: &BookInstanceData) -> AppResult<BookInstance>;
    async fn instances_delete(&self, id: &str) -> AppResult<()>;
}

/// PostgreSQL-backed store holding the connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub authors: authors::AuthorsRepository,
    pub genres: genres::GenresRepository,
    pub books: books::BooksRepository,
    pub instances: book_instances::BookInstancesRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            authors: authors::AuthorsRepository::new(pool.clone()),
            genres: genres::GenresRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            instances: book_instances::BookInstancesRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl CatalogStore for Repository {
    async fn authors_list(&self) -> AppResult<Vec<Author>> {
        self.authors.list().await
    }

    async fn authors_get(&self, id: &str) -> AppResult<Option<Author>> {
        self.authors.get_by_id(id).await
    }

    async fn authors_count(&self) -> AppResult<i64> {
        self.authors.count().await
    }

    async fn authors_insert(&self, data: &AuthorData) -> AppResult<Author> {
        self.authors.create(data).await
    }

    async fn authors_update(&self, id: &str, data: &AuthorData) -> AppResult<Author> {
        self.authors.update(id, data).await
    }

    async fn authors_delete(&self, id: &str) -> AppResult<()> {
        self.authors.delete(id).await
    }

    async fn genres_list(&self) -> AppResult<Vec<Genre>> {
        self.genres.list().await
    }

    async fn genres_get(&self, id: &str) -> AppResult<Option<Genre>> {
        self.genres.get_by_id(id).await
    }

    async fn genres_by_ids(&self, ids: Vec<String>) -> AppResult<Vec<Genre>> {
        self.genres.get_by_ids(&ids).await
    }

    async fn genres_find_by_name(&self, name: &str) -> AppResult<Option<Genre>> {
        self.genres.find_by_name(name).await
    }

    async fn genres_count(&self) -> AppResult<i64> {
        self.genres.count().await
    }

    async fn genres_insert(&self, data: &GenreData) -> AppResult<Genre> {
        self.genres.create(data).await
    }

    async fn genres_update(&self, id: &str, data: &GenreData) -> AppResult<Genre> {
        self.genres.update(id, data).await
    }

    async fn genres_delete(&self, id: &str) -> AppResult<()> {
        self.genres.delete(id).await
    }

    async fn books_list(&self) -> AppResult<Vec<Book>> {
        self.books.list().await
    }

    async fn books_titles(&self) -> AppResult<Vec<BookTitle>> {
        self.books.titles().await
    }

    async fn books_get(&self, id: &str) -> AppResult<Option<Book>> {
        self.books.get_by_id(id).await
    }

    async fn books_by_author(&self, author_id: &str) -> AppResult<Vec<Book>> {
        self.books.by_author(author_id).await
    }

    async fn books_by_genre(&self, genre_id: &str) -> AppResult<Vec<Book>> {
        self.books.by_genre(genre_id).await
    }

    async fn books_count(&self) -> AppResult<i64> {
        self.books.count().await
    }

    async fn books_insert(&self, data: &BookData) -> AppResult<Book> {
        self.books.create(data).await
    }

    async fn books_update(&self, id: &str, data: &BookData) -> AppResult<Book> {
        self.books.update(id, data).await
    }

    async fn books_delete(&self, id: &str) -> AppResult<()> {
        self.books.delete(id).await
    }

    async fn instances_list(&self) -> AppResult<Vec<BookInstance>> {
        self.instances.list().await
    }

    async fn instances_get(&self, id: &str) -> AppResult<Option<BookInstance>> {
        self.instances.get_by_id(id).await
    }

    async fn instances_by_book(&self, book_id: &str) -> AppResult<Vec<BookInstance>> {
        self.instances.by_book(book_id).await
    }

    async fn instances_count(&self, status: Option<InstanceStatus>) -> AppResult<i64> {
        self.instances.count(status).await
    }

    async fn instances_insert(&self, data: &BookInstanceData) -> AppResult<BookInstance> {
        self.instances.create(data).await
    }

    async fn instances_update(&self, id: &str, data: &BookInstanceData) -> AppResult<BookInstance> {
        self.instances.update(id, data).await
    }

    async fn instances_delete(&self, id: &str) -> AppResult<()> {
        self.instances.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ids_are_valid() {
        let id = new_id();
        assert!(check_id(&id).is_ok());
        assert_ne!(id, new_id());
    }

    #[test]
    fn test_malformed_id_rejected() {
        assert!(matches!(check_id("not-an-id"), Err(AppError::InvalidId(_))));
    }
}
