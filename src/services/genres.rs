//! Genre pages and form processing

use std::sync::Arc;

use serde::Serialize;

use super::{
    aggregate::Aggregator,
    integrity::{IntegrityGuard, Verdict},
    DeleteOutcome, FormOutcome,
};
use crate::{
    error::{AppError, AppResult},
    forms::{FieldError, RawForm},
    models::{linked, Book, EntityKind, Genre, GenreForm, Linked, Record},
    repository::CatalogStore,
};

#[derive(Debug, Serialize)]
pub struct GenreListPage {
    pub title: String,
    pub genre_list: Vec<Linked<Genre>>,
}

#[derive(Debug, Serialize)]
pub struct GenreDetailPage {
    pub title: String,
    pub genre: Linked<Genre>,
    pub genre_books: Vec<Linked<Book>>,
}

#[derive(Debug, Serialize)]
pub struct GenreFormPage {
    pub title: String,
    pub genre: Option<GenreForm>,
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Serialize)]
pub struct GenreDeletePage {
    pub title: String,
    pub genre: Option<Linked<Genre>>,
    pub genre_books: Vec<Linked<Book>>,
}

#[derive(Clone)]
pub struct GenresService {
    store: Arc<dyn CatalogStore>,
    guard: IntegrityGuard,
}

impl GenresService {
    pub fn new(store: Arc<dyn CatalogStore>, guard: IntegrityGuard) -> Self {
        Self { store, guard }
    }

    pub async fn list(&self) -> AppResult<GenreListPage> {
        Ok(GenreListPage {
            title: "Genre List".to_string(),
            genre_list: linked(self.store.genres_list().await?),
        })
    }

    /// A genre and the books filed under it
    pub async fn detail(&self, id: &str) -> AppResult<GenreDetailPage> {
        let mut results = Aggregator::new()
            .add("genre", self.store.genres_get(id))
            .add("genre_books", self.store.books_by_genre(id))
            .run()
            .await?;
        let genre: Genre = results
            .take::<Option<Genre>>("genre")?
            .ok_or_else(|| AppError::NotFound(format!("Genre {} not found", id)))?;

        Ok(GenreDetailPage {
            title: "Genre Detail".to_string(),
            genre: genre.into(),
            genre_books: linked(results.take("genre_books")?),
        })
    }

    pub fn create_form(&self) -> GenreFormPage {
        GenreFormPage {
            title: "Create Genre".to_string(),
            genre: None,
            errors: Vec::new(),
        }
    }

    /// Create a genre unless one with the same name exists, in which case the
    /// existing genre is reused.
    pub async fn create(&self, form: &RawForm) -> AppResult<FormOutcome<GenreFormPage>> {
        let submission = GenreForm::rules().apply(form);
        let candidate = GenreForm::from_submission(&submission, None);
        if !submission.is_valid() {
            return Ok(FormOutcome::Rejected(GenreFormPage {
                title: "Create Genre".to_string(),
                genre: Some(candidate),
                errors: submission.into_errors(),
            }));
        }

        if let Some(existing) = self.store.genres_find_by_name(&candidate.name).await? {
            tracing::info!(id = %existing.id, name = %existing.name, "Genre already exists");
            return Ok(FormOutcome::Saved { redirect: existing.url() });
        }

        let genre = self.store.genres_insert(&candidate.to_data()).await?;
        tracing::info!(id = %genre.id, "Genre created");
        Ok(FormOutcome::Saved { redirect: genre.url() })
    }

    pub async fn update_form(&self, id: &str) -> AppResult<GenreFormPage> {
        let genre = self
            .store
            .genres_get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Genre {} not found", id)))?;
        Ok(GenreFormPage {
            title: "Update Genre".to_string(),
            genre: Some(GenreForm::from(&genre)),
            errors: Vec::new(),
        })
    }

    pub async fn update(&self, id: &str, form: &RawForm) -> AppResult<FormOutcome<GenreFormPage>> {
        let submission = GenreForm::rules().apply(form);
        let candidate = GenreForm::from_submission(&submission, Some(id));
        if !submission.is_valid() {
            return Ok(FormOutcome::Rejected(GenreFormPage {
                title: "Update Genre".to_string(),
                genre: Some(candidate),
                errors: submission.into_errors(),
            }));
        }

        let genre = self.store.genres_update(id, &candidate.to_data()).await?;
        tracing::info!(id = %genre.id, "Genre updated");
        Ok(FormOutcome::Saved { redirect: genre.url() })
    }

    /// Confirmation page; `None` when the genre does not exist
    pub async fn delete_page(&self, id: &str) -> AppResult<Option<GenreDeletePage>> {
        let review = self.guard.review_genre(id).await?;
        Ok(review.target.map(|genre| GenreDeletePage {
            title: "Delete Genre".to_string(),
            genre: Some(genre.into()),
            genre_books: linked(review.dependents),
        }))
    }

    pub async fn delete(&self, id: &str) -> AppResult<DeleteOutcome<GenreDeletePage>> {
        match self.guard.delete_genre(id).await? {
            Verdict::Deleted => Ok(DeleteOutcome::Deleted {
                redirect: EntityKind::Genre.listing_url(),
            }),
            Verdict::Blocked(review) => Ok(DeleteOutcome::Blocked(GenreDeletePage {
                title: "Delete Genre".to_string(),
                genre: review.target.map(Linked::from),
                genre_books: linked(review.dependents),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GenreData;
    use crate::repository::{memory::InMemoryStore, MockCatalogStore};

    fn service(store: Arc<dyn CatalogStore>) -> GenresService {
        GenresService::new(store.clone(), IntegrityGuard::new(store))
    }

    #[tokio::test]
    async fn test_existing_name_is_reused() {
        let store = Arc::new(InMemoryStore::new());
        let existing = store.genres_insert(&GenreData { name: "Fantasy".into() }).await.unwrap();

        let form = RawForm::from_pairs([("name", "  Fantasy ")]);
        match service(store.clone()).create(&form).await.unwrap() {
            FormOutcome::Saved { redirect } => assert_eq!(redirect, existing.url()),
            FormOutcome::Rejected(_) => panic!("valid genre rejected"),
        }
        assert_eq!(store.genres_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_blank_name_rejected_without_lookup() {
        let mut store = MockCatalogStore::new();
        store.expect_genres_find_by_name().never();
        store.expect_genres_insert().never();

        let form = RawForm::from_pairs([("name", "   ")]);
        match service(Arc::new(store)).create(&form).await.unwrap() {
            FormOutcome::Rejected(page) => {
                assert_eq!(page.errors.len(), 1);
                assert_eq!(page.errors[0].message, "Genre name required");
                assert_eq!(page.genre.unwrap().name, "");
            }
            FormOutcome::Saved { .. } => panic!("blank genre saved"),
        }
    }

    #[tokio::test]
    async fn test_update_renames() {
        let store = Arc::new(InMemoryStore::new());
        let genre = store.genres_insert(&GenreData { name: "Sci-fi".into() }).await.unwrap();

        let form = RawForm::from_pairs([("name", "Science Fiction")]);
        let outcome = service(store.clone()).update(&genre.id, &form).await.unwrap();
        assert!(matches!(outcome, FormOutcome::Saved { .. }));
        let renamed = store.genres_get(&genre.id).await.unwrap().unwrap();
        assert_eq!(renamed.name, "Science Fiction");
    }

    #[tokio::test]
    async fn test_delete_page_for_missing_genre() {
        let store = Arc::new(InMemoryStore::new());
        let page = service(store).delete_page(&crate::repository::new_id()).await.unwrap();
        assert!(page.is_none());
    }
}
