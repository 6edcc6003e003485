//! Author pages and form processing

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
    models::{linked, Author, AuthorForm, AuthorView, Book, EntityKind, Linked, Record},
    repository::CatalogStore,
};

#[derive(Debug, Serialize)]
pub struct AuthorListPage {
    pub title: String,
    pub author_list: Vec<AuthorView>,
}

#[derive(Debug, Serialize)]
pub struct AuthorDetailPage {
    pub title: String,
    pub author: AuthorView,
    pub author_books: Vec<Linked<Book>>,
}

#[derive(Debug, Serialize)]
pub struct AuthorFormPage {
    pub title: String,
    pub author: Option<AuthorForm>,
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Serialize)]
pub struct AuthorDeletePage {
    pub title: String,
    pub author: Option<AuthorView>,
    pub author_books: Vec<Linked<Book>>,
}

#[derive(Clone)]
pub struct AuthorsService {
    store: Arc<dyn CatalogStore>,
    guard: IntegrityGuard,
}

impl AuthorsService {
    pub fn new(store: Arc<dyn CatalogStore>, guard: IntegrityGuard) -> Self {
        Self { store, guard }
    }

    pub async fn list(&self) -> AppResult<AuthorListPage> {
        let authors = self.store.authors_list().await?;
        Ok(AuthorListPage {
            title: "Author List".to_string(),
            author_list: authors.into_iter().map(AuthorView::from).collect(),
        })
    }

    /// An author and the books they wrote
    pub async fn detail(&self, id: &str) -> AppResult<AuthorDetailPage> {
        let mut results = Aggregator::new()
            .add("author", self.store.authors_get(id))
            .add("author_books", self.store.books_by_author(id))
            .run()
            .await?;
        let author: Author = results
            .take::<Option<Author>>("author")?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))?;

        Ok(AuthorDetailPage {
            title: "Author Detail".to_string(),
            author: author.into(),
            author_books: linked(results.take("author_books")?),
        })
    }

    pub fn create_form(&self) -> AuthorFormPage {
        AuthorFormPage {
            title: "Create Author".to_string(),
            author: None,
            errors: Vec::new(),
        }
    }

    pub async fn create(&self, form: &RawForm) -> AppResult<FormOutcome<AuthorFormPage>> {
        let submission = AuthorForm::rules().apply(form);
        let candidate = AuthorForm::from_submission(&submission, None);
        if !submission.is_valid() {
            return Ok(FormOutcome::Rejected(AuthorFormPage {
                title: "Create Author".to_string(),
                author: Some(candidate),
                errors: submission.into_errors(),
            }));
        }

        let author = self.store.authors_insert(&candidate.to_data()).await?;
        tracing::info!(id = %author.id, "Author created");
        Ok(FormOutcome::Saved { redirect: author.url() })
    }

    pub async fn update_form(&self, id: &str) -> AppResult<AuthorFormPage> {
        let author = self
            .store
            .authors_get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))?;
        Ok(AuthorFormPage {
            title: "Update Author".to_string(),
            author: Some(AuthorForm::from(&author)),
            errors: Vec::new(),
        })
    }

    pub async fn update(&self, id: &str, form: &RawForm) -> AppResult<FormOutcome<AuthorFormPage>> {
        let submission = AuthorForm::rules().apply(form);
        let candidate = AuthorForm::from_submission(&submission, Some(id));
        if !submission.is_valid() {
            return Ok(FormOutcome::Rejected(AuthorFormPage {
                title: "Update Author".to_string(),
                author: Some(candidate),
                errors: submission.into_errors(),
            }));
        }

        let author = self.store.authors_update(id, &candidate.to_data()).await?;
        tracing::info!(id = %author.id, "Author updated");
        Ok(FormOutcome::Saved { redirect: author.url() })
    }

    /// Confirmation page; `None` when the author does not exist
    pub async fn delete_page(&self, id: &str) -> AppResult<Option<AuthorDeletePage>> {
        let review = self.guard.review_author(id).await?;
        Ok(review.target.map(|author| AuthorDeletePage {
            title: "Delete Author".to_string(),
            author: Some(author.into()),
            author_books: linked(review.dependents),
        }))
    }

    pub async fn delete(&self, id: &str) -> AppResult<DeleteOutcome<AuthorDeletePage>> {
        match self.guard.delete_author(id).await? {
            Verdict::Deleted => Ok(DeleteOutcome::Deleted {
                redirect: EntityKind::Author.listing_url(),
            }),
            Verdict::Blocked(review) => Ok(DeleteOutcome::Blocked(AuthorDeletePage {
                title: "Delete Author".to_string(),
                author: review.target.map(AuthorView::from),
                author_books: linked(review.dependents),
            })),
        }
    }
}
