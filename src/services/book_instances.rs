//! Book copy pages and form processing

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use super::{aggregate::Aggregator, DeleteOutcome, FormOutcome};
use crate::{
    error::{AppError, AppResult},
    forms::{FieldError, RawForm},
    models::{
        BookInstance, BookInstanceForm, BookInstanceView, BookTitle, EntityKind, InstanceStatus,
        Record,
    },
    repository::{check_id, CatalogStore},
};

#[derive(Debug, Serialize)]
pub struct BookInstanceListPage {
    pub title: String,
    pub bookinstance_list: Vec<BookInstanceView>,
}

#[derive(Debug, Serialize)]
pub struct BookInstanceDetailPage {
    pub title: String,
    pub bookinstance: BookInstanceView,
}

#[derive(Debug, Serialize)]
pub struct BookInstanceFormPage {
    pub title: String,
    pub book_list: Vec<BookTitle>,
    /// Book preselected in the dropdown
    pub selected_book: Option<String>,
    pub statuses: &'static [&'static str],
    pub bookinstance: Option<BookInstanceForm>,
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Serialize)]
pub struct BookInstanceDeletePage {
    pub title: String,
    pub bookinstance: BookInstanceView,
}

#[derive(Clone)]
pub struct BookInstancesService {
    store: Arc<dyn CatalogStore>,
}

impl BookInstancesService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<BookInstanceListPage> {
        let mut results = Aggregator::new()
            .add("instances", self.store.instances_list())
            .add("titles", self.store.books_titles())
            .run()
            .await?;
        let instances: Vec<BookInstance> = results.take("instances")?;
        let titles: HashMap<String, BookTitle> = results
            .take::<Vec<BookTitle>>("titles")?
            .into_iter()
            .map(|title| (title.id.clone(), title))
            .collect();

        Ok(BookInstanceListPage {
            title: "Book Instance List".to_string(),
            bookinstance_list: instances
                .into_iter()
                .map(|instance| {
                    let book = titles.get(&instance.book);
                    BookInstanceView::new(instance, book)
                })
                .collect(),
        })
    }

    pub async fn detail(&self, id: &str) -> AppResult<BookInstanceDetailPage> {
        let instance = self
            .store
            .instances_get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book copy {} not found", id)))?;
        let view = self.populate(instance).await?;
        Ok(BookInstanceDetailPage {
            title: format!("Copy: {}", view.book_title.as_deref().unwrap_or_default()),
            bookinstance: view,
        })
    }

    pub async fn create_form(&self) -> AppResult<BookInstanceFormPage> {
        self.form_page("Create BookInstance", None, Vec::new()).await
    }

    pub async fn create(&self, form: &RawForm) -> AppResult<FormOutcome<BookInstanceFormPage>> {
        let submission = BookInstanceForm::rules().apply(form);
        let candidate = BookInstanceForm::from_submission(&submission, None);
        if !submission.is_valid() {
            let page = self
                .form_page("Create BookInstance", Some(candidate), submission.into_errors())
                .await?;
            return Ok(FormOutcome::Rejected(page));
        }

        let instance = self.store.instances_insert(&candidate.to_data()?).await?;
        tracing::info!(id = %instance.id, book = %instance.book, "Book copy created");
        Ok(FormOutcome::Saved { redirect: instance.url() })
    }

    pub async fn update_form(&self, id: &str) -> AppResult<BookInstanceFormPage> {
        let mut results = Aggregator::new()
            .add("instance", self.store.instances_get(id))
            .add("titles", self.store.books_titles())
            .run()
            .await?;
        let instance: BookInstance = results
            .take::<Option<BookInstance>>("instance")?
            .ok_or_else(|| AppError::NotFound(format!("Book copy {} not found", id)))?;

        Ok(BookInstanceFormPage {
            title: "Update BookInstance".to_string(),
            book_list: results.take("titles")?,
            selected_book: Some(instance.book.clone()),
            statuses: &InstanceStatus::LABELS,
            bookinstance: Some(BookInstanceForm::from(&instance)),
            errors: Vec::new(),
        })
    }

    pub async fn update(
        &self,
        id: &str,
        form: &RawForm,
    ) -> AppResult<FormOutcome<BookInstanceFormPage>> {
        let submission = BookInstanceForm::rules().apply(form);
        let candidate = BookInstanceForm::from_submission(&submission, Some(id));
        if !submission.is_valid() {
            let page = self
                .form_page("Update BookInstance", Some(candidate), submission.into_errors())
                .await?;
            return Ok(FormOutcome::Rejected(page));
        }

        let instance = self.store.instances_update(id, &candidate.to_data()?).await?;
        tracing::info!(id = %instance.id, status = %instance.status, "Book copy updated");
        Ok(FormOutcome::Saved { redirect: instance.url() })
    }

    /// Confirmation page; `None` when the copy does not exist
    pub async fn delete_page(&self, id: &str) -> AppResult<Option<BookInstanceDeletePage>> {
        let Some(instance) = self.store.instances_get(id).await? else {
            return Ok(None);
        };
        Ok(Some(BookInstanceDeletePage {
            title: "Delete BookInstance".to_string(),
            bookinstance: self.populate(instance).await?,
        }))
    }

    /// Copies are never referenced, so the delete is never blocked
    pub async fn delete(&self, id: &str) -> AppResult<DeleteOutcome<BookInstanceDeletePage>> {
        self.store.instances_delete(id).await?;
        tracing::info!(entity = %EntityKind::BookInstance, id, "Record deleted");
        Ok(DeleteOutcome::Deleted {
            redirect: EntityKind::BookInstance.listing_url(),
        })
    }

    /// Resolve the copy's book; a dangling reference leaves the title empty
    async fn populate(&self, instance: BookInstance) -> AppResult<BookInstanceView> {
        let book = if check_id(&instance.book).is_ok() {
            self.store.books_get(&instance.book).await?
        } else {
            None
        };
        let title = book.as_ref().map(BookTitle::from);
        Ok(BookInstanceView::new(instance, title.as_ref()))
    }

    async fn form_page(
        &self,
        title: &str,
        bookinstance: Option<BookInstanceForm>,
        errors: Vec<FieldError>,
    ) -> AppResult<BookInstanceFormPage> {
        Ok(BookInstanceFormPage {
            title: title.to_string(),
            book_list: self.store.books_titles().await?,
            selected_book: bookinstance
                .as_ref()
                .map(|b| b.book.clone())
                .filter(|book| !book.is_empty()),
            statuses: &InstanceStatus::LABELS,
            bookinstance,
            errors,
        })
    }
}
