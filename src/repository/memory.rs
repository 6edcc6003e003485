//! In-memory catalog store for tests and development.
//!
//! Same contract as the PostgreSQL backend: identifiers are issued here, malformed
//! identifiers are rejected, a missing record is `Ok(None)` on lookup and `NotFound`
//! on update or delete.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use indexmap::IndexMap;

use super::{check_id, new_id, CatalogStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        Author, AuthorData, Book, BookData, BookInstance, BookInstanceData, BookTitle, Genre,
        GenreData, InstanceStatus,
    },
};

#[derive(Default)]
struct Collections {
    authors: IndexMap<String, Author>,
    genres: IndexMap<String, Genre>,
    books: IndexMap<String, Book>,
    instances: IndexMap<String, BookInstance>,
}

/// Insertion-ordered collections behind a lock
#[derive(Clone, Default)]
pub struct InMemoryStore {
    collections: Arc<RwLock<Collections>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, Collections>> {
        self.collections
            .read()
            .map_err(|e| AppError::Store(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, Collections>> {
        self.collections
            .write()
            .map_err(|e| AppError::Store(format!("Failed to acquire write lock: {}", e)))
    }
}

fn not_found(kind: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} {} not found", kind, id))
}

fn sorted_by<T: Clone, K: Ord>(records: &IndexMap<String, T>, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut out: Vec<T> = records.values().cloned().collect();
    out.sort_by_key(|r| key(r));
    out
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn authors_list(&self) -> AppResult<Vec<Author>> {
        let c = self.read()?;
        Ok(sorted_by(&c.authors, |a| (a.family_name.clone(), a.first_name.clone())))
    }

    async fn authors_get(&self, id: &str) -> AppResult<Option<Author>> {
        check_id(id)?;
        Ok(self.read()?.authors.get(id).cloned())
    }

    async fn authors_count(&self) -> AppResult<i64> {
        Ok(self.read()?.authors.len() as i64)
    }

    async fn authors_insert(&self, data: &AuthorData) -> AppResult<Author> {
        let author = Author {
            id: new_id(),
            first_name: data.first_name.clone(),
            family_name: data.family_name.clone(),
            date_of_birth: data.date_of_birth,
            date_of_death: data.date_of_death,
        };
        self.write()?.authors.insert(author.id.clone(), author.clone());
        Ok(author)
    }

    async fn authors_update(&self, id: &str, data: &AuthorData) -> AppResult<Author> {
        check_id(id)?;
        let mut c = self.write()?;
        let author = c.authors.get_mut(id).ok_or_else(|| not_found("Author", id))?;
        author.first_name = data.first_name.clone();
        author.family_name = data.family_name.clone();
        author.date_of_birth = data.date_of_birth;
        author.date_of_death = data.date_of_death;
        Ok(author.clone())
    }

    async fn authors_delete(&self, id: &str) -> AppResult<()> {
        check_id(id)?;
        self.write()?
            .authors
            .shift_remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found("Author", id))
    }

    async fn genres_list(&self) -> AppResult<Vec<Genre>> {
        Ok(sorted_by(&self.read()?.genres, |g| g.name.clone()))
    }

    async fn genres_get(&self, id: &str) -> AppResult<Option<Genre>> {
        check_id(id)?;
        Ok(self.read()?.genres.get(id).cloned())
    }

    async fn genres_by_ids(&self, ids: Vec<String>) -> AppResult<Vec<Genre>> {
        let c = self.read()?;
        let mut genres: Vec<Genre> = c
            .genres
            .values()
            .filter(|g| ids.contains(&g.id))
            .cloned()
            .collect();
        genres.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(genres)
    }

    async fn genres_find_by_name(&self, name: &str) -> AppResult<Option<Genre>> {
        Ok(self.read()?.genres.values().find(|g| g.name == name).cloned())
    }

    async fn genres_count(&self) -> AppResult<i64> {
        Ok(self.read()?.genres.len() as i64)
    }

    async fn genres_insert(&self, data: &GenreData) -> AppResult<Genre> {
        let genre = Genre {
            id: new_id(),
            name: data.name.clone(),
        };
        self.write()?.genres.insert(genre.id.clone(), genre.clone());
        Ok(genre)
    }

    async fn genres_update(&self, id: &str, data: &GenreData) -> AppResult<Genre> {
        check_id(id)?;
        let mut c = self.write()?;
        let genre = c.genres.get_mut(id).ok_or_else(|| not_found("Genre", id))?;
        genre.name = data.name.clone();
        Ok(genre.clone())
    }

    async fn genres_delete(&self, id: &str) -> AppResult<()> {
        check_id(id)?;
        self.write()?
            .genres
            .shift_remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found("Genre", id))
    }

    async fn books_list(&self) -> AppResult<Vec<Book>> {
        Ok(sorted_by(&self.read()?.books, |b| b.title.clone()))
    }

    async fn books_titles(&self) -> AppResult<Vec<BookTitle>> {
        let c = self.read()?;
        Ok(sorted_by(&c.books, |b| b.title.clone())
            .iter()
            .map(BookTitle::from)
            .collect())
    }

    async fn books_get(&self, id: &str) -> AppResult<Option<Book>> {
        check_id(id)?;
        Ok(self.read()?.books.get(id).cloned())
    }

    async fn books_by_author(&self, author_id: &str) -> AppResult<Vec<Book>> {
        check_id(author_id)?;
        let c = self.read()?;
        let mut books: Vec<Book> = c
            .books
            .values()
            .filter(|b| b.author == author_id)
            .cloned()
            .collect();
        books.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(books)
    }

    async fn books_by_genre(&self, genre_id: &str) -> AppResult<Vec<Book>> {
        check_id(genre_id)?;
        let c = self.read()?;
        let mut books: Vec<Book> = c
            .books
            .values()
            .filter(|b| b.genre.iter().any(|g| g == genre_id))
            .cloned()
            .collect();
        books.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(books)
    }

    async fn books_count(&self) -> AppResult<i64> {
        Ok(self.read()?.books.len() as i64)
    }

    async fn books_insert(&self, data: &BookData) -> AppResult<Book> {
        let book = Book {
            id: new_id(),
            title: data.title.clone(),
            author: data.author.clone(),
            summary: data.summary.clone(),
            isbn: data.isbn.clone(),
            genre: data.genre.clone(),
        };
        self.write()?.books.insert(book.id.clone(), book.clone());
        Ok(book)
    }

    async fn books_update(&self, id: &str, data: &BookData) -> AppResult<Book> {
        check_id(id)?;
        let mut c = self.write()?;
        let book = c.books.get_mut(id).ok_or_else(|| not_found("Book", id))?;
        book.title = data.title.clone();
        book.author = data.author.clone();
        book.summary = data.summary.clone();
        book.isbn = data.isbn.clone();
        book.genre = data.genre.clone();
        Ok(book.clone())
    }

    async fn books_delete(&self, id: &str) -> AppResult<()> {
        check_id(id)?;
        self.write()?
            .books
            .shift_remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found("Book", id))
    }

    async fn instances_list(&self) -> AppResult<Vec<BookInstance>> {
        Ok(sorted_by(&self.read()?.instances, |i| i.imprint.clone()))
    }

    async fn instances_get(&self, id: &str) -> AppResult<Option<BookInstance>> {
        check_id(id)?;
        Ok(self.read()?.instances.get(id).cloned())
    }

    async fn instances_by_book(&self, book_id: &str) -> AppResult<Vec<BookInstance>> {
        check_id(book_id)?;
        let c = self.read()?;
        let mut copies: Vec<BookInstance> = c
            .instances
            .values()
            .filter(|i| i.book == book_id)
            .cloned()
            .collect();
        copies.sort_by(|a, b| a.imprint.cmp(&b.imprint));
        Ok(copies)
    }

    async fn instances_count(&self, status: Option<InstanceStatus>) -> AppResult<i64> {
        let c = self.read()?;
        let count = c
            .instances
            .values()
            .filter(|i| status.map_or(true, |s| i.status == s))
            .count();
        Ok(count as i64)
    }

    async fn instances_insert(&self, data: &BookInstanceData) -> AppResult<BookInstance> {
        let instance = BookInstance {
            id: new_id(),
            book: data.book.clone(),
            imprint: data.imprint.clone(),
            status: data.status,
            due_back: data.due_back,
        };
        self.write()?
            .instances
            .insert(instance.id.clone(), instance.clone());
        Ok(instance)
    }

    async fn instances_update(&self, id: &str, data: &BookInstanceData) -> AppResult<BookInstance> {
        check_id(id)?;
        let mut c = self.write()?;
        let instance = c
            .instances
            .get_mut(id)
            .ok_or_else(|| not_found("Book copy", id))?;
        instance.book = data.book.clone();
        instance.imprint = data.imprint.clone();
        instance.status = data.status;
        instance.due_back = data.due_back;
        Ok(instance.clone())
    }

    async fn instances_delete(&self, id: &str) -> AppResult<()> {
        check_id(id)?;
        self.write()?
            .instances
            .shift_remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found("Book copy", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn book(title: &str, author: &str, genre: Vec<String>) -> BookData {
        BookData {
            title: title.into(),
            author: author.into(),
            summary: "s".into(),
            isbn: "i".into(),
            genre,
        }
    }

    #[tokio::test]
    async fn test_find_by_id_missing_is_none() {
        let store = InMemoryStore::new();
        let found = assert_ok!(store.genres_get(&new_id()).await);
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_malformed_id_is_error() {
        let store = InMemoryStore::new();
        let err = assert_err!(store.books_get("nope").await);
        assert!(matches!(err, AppError::InvalidId(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let store = InMemoryStore::new();
        let err = assert_err!(store.authors_delete(&new_id()).await);
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_filtered_finds_and_counts() {
        let store = InMemoryStore::new();
        let fantasy = store.genres_insert(&GenreData { name: "Fantasy".into() }).await.unwrap();
        let author = new_id();
        store.books_insert(&book("B", &author, vec![fantasy.id.clone()])).await.unwrap();
        store.books_insert(&book("A", &author, vec![])).await.unwrap();
        store.books_insert(&book("C", &new_id(), vec![fantasy.id.clone()])).await.unwrap();

        let by_author: Vec<String> = store
            .books_by_author(&author)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(by_author, vec!["A", "B"]);
        assert_eq!(store.books_by_genre(&fantasy.id).await.unwrap().len(), 2);
        assert_eq!(store.books_count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_instance_count_by_status() {
        let store = InMemoryStore::new();
        let book_id = new_id();
        for status in [InstanceStatus::Available, InstanceStatus::Available, InstanceStatus::Loaned] {
            store
                .instances_insert(&BookInstanceData {
                    book: book_id.clone(),
                    imprint: "x".into(),
                    status,
                    due_back: None,
                })
                .await
                .unwrap();
        }
        assert_eq!(store.instances_count(None).await.unwrap(), 3);
        assert_eq!(store.instances_count(Some(InstanceStatus::Available)).await.unwrap(), 2);
        assert_eq!(store.instances_by_book(&book_id).await.unwrap().len(), 3);
    }
}
