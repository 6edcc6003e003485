//! Author endpoints

use axum::{
    extract::{Path, State},
    response::Response,
    Form,
};

use super::{confirm_response, delete_response, form_response, Page};
use crate::{
    error::AppResult,
    forms::RawForm,
    models::EntityKind,
    services::authors::{AuthorDetailPage, AuthorFormPage, AuthorListPage},
    AppState,
};

/// List all authors, sorted by family name
#[utoipa::path(
    get,
    path = "/catalog/authors",
    tag = "authors",
    responses(
        (status = 200, description = "Author list")
    )
)]
pub async fn author_list(State(state): State<AppState>) -> AppResult<Page<AuthorListPage>> {
    let page = state.services.authors.list().await?;
    Ok(Page::new("author_list", page))
}

/// Author details with their books
#[utoipa::path(
    get,
    path = "/catalog/author/{id}",
    tag = "authors",
    params(
        ("id" = String, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author details"),
        (status = 400, description = "Malformed ID", body = crate::error::ErrorResponse),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn author_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Page<AuthorDetailPage>> {
    let page = state.services.authors.detail(&id).await?;
    Ok(Page::new("author_detail", page))
}

/// Empty author form
#[utoipa::path(
    get,
    path = "/catalog/author/create",
    tag = "authors",
    responses(
        (status = 200, description = "Author form")
    )
)]
pub async fn author_create_get(State(state): State<AppState>) -> Page<AuthorFormPage> {
    Page::new("author_form", state.services.authors.create_form())
}

/// Create an author
#[utoipa::path(
    post,
    path = "/catalog/author/create",
    tag = "authors",
    request_body(content = crate::models::AuthorForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Created; redirects to the new author"),
        (status = 422, description = "Form shown again with its errors")
    )
)]
pub async fn author_create_post(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let outcome = state.services.authors.create(&RawForm::from_pairs(pairs)).await?;
    Ok(form_response("author_form", outcome))
}

/// Author form filled with the current record
#[utoipa::path(
    get,
    path = "/catalog/author/{id}/update",
    tag = "authors",
    params(
        ("id" = String, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author form"),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn author_update_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Page<AuthorFormPage>> {
    let page = state.services.authors.update_form(&id).await?;
    Ok(Page::new("author_form", page))
}

/// Update an author
#[utoipa::path(
    post,
    path = "/catalog/author/{id}/update",
    tag = "authors",
    params(
        ("id" = String, Path, description = "Author ID")
    ),
    request_body(content = crate::models::AuthorForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Updated; redirects to the author"),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Form shown again with its errors")
    )
)]
pub async fn author_update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let outcome = state
        .services
        .authors
        .update(&id, &RawForm::from_pairs(pairs))
        .await?;
    Ok(form_response("author_form", outcome))
}

/// Delete confirmation, listing the author's books
#[utoipa::path(
    get,
    path = "/catalog/author/{id}/delete",
    tag = "authors",
    params(
        ("id" = String, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Delete confirmation"),
        (status = 303, description = "No such author; redirects to the author list")
    )
)]
pub async fn author_delete_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let page = state.services.authors.delete_page(&id).await?;
    Ok(confirm_response("author_delete", page, EntityKind::Author.listing_url()))
}

/// Delete an author that has no books
#[utoipa::path(
    post,
    path = "/catalog/author/{id}/delete",
    tag = "authors",
    params(
        ("id" = String, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Refused; the author still has books"),
        (status = 303, description = "Deleted; redirects to the author list"),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn author_delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let outcome = state.services.authors.delete(&id).await?;
    Ok(delete_response("author_delete", outcome))
}
