//! Business logic services

pub mod aggregate;
pub mod authors;
pub mod book_instances;
pub mod books;
pub mod catalog;
pub mod genres;
pub mod integrity;
pub mod selection;

use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{Author, Genre},
    repository::{check_id, CatalogStore},
};

/// Result of processing a create/update form
#[derive(Debug)]
pub enum FormOutcome<P> {
    /// Written; continue at the record's identity path
    Saved { redirect: String },
    /// Rejected; show the form again with its errors
    Rejected(P),
}

/// Result of a delete request
#[derive(Debug)]
pub enum DeleteOutcome<P> {
    /// Removed; continue at the collection listing
    Deleted { redirect: String },
    /// Refused because other records still reference the target
    Blocked(P),
}

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub authors: authors::AuthorsService,
    pub genres: genres::GenresService,
    pub books: books::BooksService,
    pub book_instances: book_instances::BookInstancesService,
}

impl Services {
    /// Create all services over the given store
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        let guard = integrity::IntegrityGuard::new(store.clone());
        Self {
            catalog: catalog::CatalogService::new(store.clone()),
            authors: authors::AuthorsService::new(store.clone(), guard.clone()),
            genres: genres::GenresService::new(store.clone(), guard.clone()),
            books: books::BooksService::new(store.clone(), guard),
            book_instances: book_instances::BookInstancesService::new(store),
        }
    }
}

/// Look up a referenced author; a reference that cannot resolve reads as absent
pub(crate) async fn resolve_author(store: &dyn CatalogStore, id: &str) -> AppResult<Option<Author>> {
    if check_id(id).is_err() {
        return Ok(None);
    }
    store.authors_get(id).await
}

/// Look up referenced genres, skipping references that cannot resolve
pub(crate) async fn resolve_genres(store: &dyn CatalogStore, ids: &[String]) -> AppResult<Vec<Genre>> {
    let ids: Vec<String> = ids.iter().filter(|id| check_id(id).is_ok()).cloned().collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    store.genres_by_ids(ids).await
}
