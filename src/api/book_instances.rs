//! Book copy endpoints

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
    services::book_instances::{BookInstanceDetailPage, BookInstanceFormPage, BookInstanceListPage},
    AppState,
};

/// List all copies with the titles of their books
#[utoipa::path(
    get,
    path = "/catalog/bookinstances",
    tag = "bookinstances",
    responses(
        (status = 200, description = "Copy list")
    )
)]
pub async fn bookinstance_list(State(state): State<AppState>) -> AppResult<Page<BookInstanceListPage>> {
    let page = state.services.book_instances.list().await?;
    Ok(Page::new("bookinstance_list", page))
}

/// Copy details
#[utoipa::path(
    get,
    path = "/catalog/bookinstance/{id}",
    tag = "bookinstances",
    params(
        ("id" = String, Path, description = "Copy ID")
    ),
    responses(
        (status = 200, description = "Copy details"),
        (status = 400, description = "Malformed ID", body = crate::error::ErrorResponse),
        (status = 404, description = "Copy not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn bookinstance_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Page<BookInstanceDetailPage>> {
    let page = state.services.book_instances.detail(&id).await?;
    Ok(Page::new("bookinstance_detail", page))
}

/// Empty copy form with the book titles to choose from
#[utoipa::path(
    get,
    path = "/catalog/bookinstance/create",
    tag = "bookinstances",
    responses(
        (status = 200, description = "Copy form")
    )
)]
pub async fn bookinstance_create_get(
    State(state): State<AppState>,
) -> AppResult<Page<BookInstanceFormPage>> {
    let page = state.services.book_instances.create_form().await?;
    Ok(Page::new("bookinstance_form", page))
}

/// Create a copy
#[utoipa::path(
    post,
    path = "/catalog/bookinstance/create",
    tag = "bookinstances",
    request_body(content = crate::models::BookInstanceForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Created; redirects to the new copy"),
        (status = 422, description = "Form shown again with its errors")
    )
)]
pub async fn bookinstance_create_post(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let outcome = state
        .services
        .book_instances
        .create(&RawForm::from_pairs(pairs))
        .await?;
    Ok(form_response("bookinstance_form", outcome))
}

/// Copy form filled with the current record
#[utoipa::path(
    get,
    path = "/catalog/bookinstance/{id}/update",
    tag = "bookinstances",
    params(
        ("id" = String, Path, description = "Copy ID")
    ),
    responses(
        (status = 200, description = "Copy form"),
        (status = 404, description = "Copy not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn bookinstance_update_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Page<BookInstanceFormPage>> {
    let page = state.services.book_instances.update_form(&id).await?;
    Ok(Page::new("bookinstance_form", page))
}

/// Update a copy
#[utoipa::path(
    post,
    path = "/catalog/bookinstance/{id}/update",
    tag = "bookinstances",
    params(
        ("id" = String, Path, description = "Copy ID")
    ),
    request_body(content = crate::models::BookInstanceForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Updated; redirects to the copy"),
        (status = 404, description = "Copy not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Form shown again with its errors")
    )
)]
pub async fn bookinstance_update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let outcome = state
        .services
        .book_instances
        .update(&id, &RawForm::from_pairs(pairs))
        .await?;
    Ok(form_response("bookinstance_form", outcome))
}

/// Delete confirmation
#[utoipa::path(
    get,
    path = "/catalog/bookinstance/{id}/delete",
    tag = "bookinstances",
    params(
        ("id" = String, Path, description = "Copy ID")
    ),
    responses(
        (status = 200, description = "Delete confirmation"),
        (status = 303, description = "No such copy; redirects to the copy list")
    )
)]
pub async fn bookinstance_delete_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let page = state.services.book_instances.delete_page(&id).await?;
    Ok(confirm_response(
        "bookinstance_delete",
        page,
        EntityKind::BookInstance.listing_url(),
    ))
}

/// Delete a copy
#[utoipa::path(
    post,
    path = "/catalog/bookinstance/{id}/delete",
    tag = "bookinstances",
    params(
        ("id" = String, Path, description = "Copy ID")
    ),
    responses(
        (status = 303, description = "Deleted; redirects to the copy list"),
        (status = 404, description = "Copy not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn bookinstance_delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let outcome = state.services.book_instances.delete(&id).await?;
    Ok(delete_response("bookinstance_delete", outcome))
}
