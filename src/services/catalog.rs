//! Catalog dashboard service

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use super::aggregate::Aggregator;
use crate::{
    error::AppResult,
    models::InstanceStatus,
    repository::CatalogStore,
};

/// Record counts shown on the home page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CatalogCounts {
    pub book_count: i64,
    pub book_instance_count: i64,
    pub book_instance_available_count: i64,
    pub author_count: i64,
    pub genre_count: i64,
}

#[derive(Debug, Serialize)]
pub struct IndexPage {
    pub title: String,
    pub data: CatalogCounts,
}

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Count every collection concurrently
    pub async fn counts(&self) -> AppResult<CatalogCounts> {
        let store = self.store.as_ref();
        let mut results = Aggregator::new()
            .add("book_count", store.books_count())
            .add("book_instance_count", store.instances_count(None))
            .add(
                "book_instance_available_count",
                store.instances_count(Some(InstanceStatus::Available)),
            )
            .add("author_count", store.authors_count())
            .add("genre_count", store.genres_count())
            .run()
            .await?;

        Ok(CatalogCounts {
            book_count: results.take("book_count")?,
            book_instance_count: results.take("book_instance_count")?,
            book_instance_available_count: results.take("book_instance_available_count")?,
            author_count: results.take("author_count")?,
            genre_count: results.take("genre_count")?,
        })
    }

    pub async fn index(&self) -> AppResult<IndexPage> {
        Ok(IndexPage {
            title: "Local Library Home".to_string(),
            data: self.counts().await?,
        })
    }
}
