//! Referential integrity guard for deletions.
//!
//! A record may only be deleted while nothing references it: an author or a genre
//! while no book points at it, a book while it has no copies. The guard fetches the
//! target and its dependents concurrently; a non-empty dependent set refuses the
//! deletion and is handed back as the blocking set. The check and the delete are
//! separate store operations with no lock in between.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;

use super::aggregate::Aggregator;
use crate::{
    error::AppResult,
    models::{Author, Book, BookInstance, EntityKind, Genre, Record},
    repository::CatalogStore,
};

/// A record considered for deletion together with the records that reference it
#[derive(Debug, Clone, Serialize)]
pub struct DeleteReview<T, D> {
    /// `None` when the identifier matches no record
    pub target: Option<T>,
    pub dependents: Vec<D>,
}

impl<T, D: Record> DeleteReview<T, D> {
    pub fn is_blocked(&self) -> bool {
        !self.dependents.is_empty()
    }

    /// Identifiers of the blocking dependents
    pub fn blocking_ids(&self) -> Vec<&str> {
        self.dependents.iter().map(Record::id).collect()
    }
}

/// Outcome of a guarded deletion
#[derive(Debug, Clone)]
pub enum Verdict<T, D> {
    /// Refused; nothing was written
    Blocked(DeleteReview<T, D>),
    Deleted,
}

impl<T, D> Verdict<T, D> {
    pub fn is_deleted(&self) -> bool {
        matches!(self, Verdict::Deleted)
    }
}

#[derive(Clone)]
pub struct IntegrityGuard {
    store: Arc<dyn CatalogStore>,
}

impl IntegrityGuard {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// An author and the books written by them
    pub async fn review_author(&self, id: &str) -> AppResult<DeleteReview<Author, Book>> {
        let mut results = Aggregator::new()
            .add("author", self.store.authors_get(id))
            .add("author_books", self.store.books_by_author(id))
            .run()
            .await?;
        Ok(DeleteReview {
            target: results.take("author")?,
            dependents: results.take("author_books")?,
        })
    }

    /// A genre and the books filed under it
    pub async fn review_genre(&self, id: &str) -> AppResult<DeleteReview<Genre, Book>> {
        let mut results = Aggregator::new()
            .add("genre", self.store.genres_get(id))
            .add("genre_books", self.store.books_by_genre(id))
            .run()
            .await?;
        Ok(DeleteReview {
            target: results.take("genre")?,
            dependents: results.take("genre_books")?,
        })
    }

    /// A book and its copies
    pub async fn review_book(&self, id: &str) -> AppResult<DeleteReview<Book, BookInstance>> {
        let mut results = Aggregator::new()
            .add("book", self.store.books_get(id))
            .add("book_instances", self.store.instances_by_book(id))
            .run()
            .await?;
        Ok(DeleteReview {
            target: results.take("book")?,
            dependents: results.take("book_instances")?,
        })
    }

    pub async fn delete_author(&self, id: &str) -> AppResult<Verdict<Author, Book>> {
        let review = self.review_author(id).await?;
        settle(EntityKind::Author, id, review, || self.store.authors_delete(id)).await
    }

    pub async fn delete_genre(&self, id: &str) -> AppResult<Verdict<Genre, Book>> {
        let review = self.review_genre(id).await?;
        settle(EntityKind::Genre, id, review, || self.store.genres_delete(id)).await
    }

    pub async fn delete_book(&self, id: &str) -> AppResult<Verdict<Book, BookInstance>> {
        let review = self.review_book(id).await?;
        settle(EntityKind::Book, id, review, || self.store.books_delete(id)).await
    }
}

/// Delete unless the review found dependents. Store failures, including a target
/// that no longer exists, are returned as they are.
async fn settle<T, D, F, Fut>(
    kind: EntityKind,
    id: &str,
    review: DeleteReview<T, D>,
    delete: F,
) -> AppResult<Verdict<T, D>>
where
    D: Record,
    F: FnOnce() -> Fut,
    Fut: Future<Output = AppResult<()>>,
{
    if review.is_blocked() {
        tracing::info!(
            entity = %kind,
            id,
            dependents = review.dependents.len(),
            "Deletion refused: record still referenced"
        );
        return Ok(Verdict::Blocked(review));
    }

    delete().await?;
    tracing::info!(entity = %kind, id, "Record deleted");
    Ok(Verdict::Deleted)
}
