//! Catalog home page

use axum::extract::State;

use super::Page;
use crate::{error::AppResult, services::catalog::IndexPage, AppState};

/// Record counts for the home page
#[utoipa::path(
    get,
    path = "/catalog",
    tag = "catalog",
    responses(
        (status = 200, description = "Home page with the number of records per collection"),
        (status = 500, description = "Store failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn index(State(state): State<AppState>) -> AppResult<Page<IndexPage>> {
    let page = state.services.catalog.index().await?;
    Ok(Page::new("index", page))
}
