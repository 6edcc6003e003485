//! Genre endpoints

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
    services::genres::{GenreDetailPage, GenreFormPage, GenreListPage},
    AppState,
};

/// List all genres, sorted by name
#[utoipa::path(
    get,
    path = "/catalog/genres",
    tag = "genres",
    responses(
        (status = 200, description = "Genre list")
    )
)]
pub async fn genre_list(State(state): State<AppState>) -> AppResult<Page<GenreListPage>> {
    let page = state.services.genres.list().await?;
    Ok(Page::new("genre_list", page))
}

/// Genre details with its books
#[utoipa::path(
    get,
    path = "/catalog/genre/{id}",
    tag = "genres",
    params(
        ("id" = String, Path, description = "Genre ID")
    ),
    responses(
        (status = 200, description = "Genre details"),
        (status = 400, description = "Malformed ID", body = crate::error::ErrorResponse),
        (status = 404, description = "Genre not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn genre_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Page<GenreDetailPage>> {
    let page = state.services.genres.detail(&id).await?;
    Ok(Page::new("genre_detail", page))
}

/// Empty genre form
#[utoipa::path(
    get,
    path = "/catalog/genre/create",
    tag = "genres",
    responses(
        (status = 200, description = "Genre form")
    )
)]
pub async fn genre_create_get(State(state): State<AppState>) -> Page<GenreFormPage> {
    Page::new("genre_form", state.services.genres.create_form())
}

/// Create a genre, or reuse the one with the same name
#[utoipa::path(
    post,
    path = "/catalog/genre/create",
    tag = "genres",
    request_body(content = crate::models::GenreForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Created; redirects to the genre"),
        (status = 422, description = "Form shown again with its errors")
    )
)]
pub async fn genre_create_post(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let outcome = state.services.genres.create(&RawForm::from_pairs(pairs)).await?;
    Ok(form_response("genre_form", outcome))
}

/// Genre form filled with the current record
#[utoipa::path(
    get,
    path = "/catalog/genre/{id}/update",
    tag = "genres",
    params(
        ("id" = String, Path, description = "Genre ID")
    ),
    responses(
        (status = 200, description = "Genre form"),
        (status = 404, description = "Genre not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn genre_update_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Page<GenreFormPage>> {
    let page = state.services.genres.update_form(&id).await?;
    Ok(Page::new("genre_form", page))
}

/// Update a genre
#[utoipa::path(
    post,
    path = "/catalog/genre/{id}/update",
    tag = "genres",
    params(
        ("id" = String, Path, description = "Genre ID")
    ),
    request_body(content = crate::models::GenreForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Updated; redirects to the genre"),
        (status = 404, description = "Genre not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Form shown again with its errors")
    )
)]
pub async fn genre_update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let outcome = state
        .services
        .genres
        .update(&id, &RawForm::from_pairs(pairs))
        .await?;
    Ok(form_response("genre_form", outcome))
}

/// Delete confirmation, listing the genre's books
#[utoipa::path(
    get,
    path = "/catalog/genre/{id}/delete",
    tag = "genres",
    params(
        ("id" = String, Path, description = "Genre ID")
    ),
    responses(
        (status = 200, description = "Delete confirmation"),
        (status = 303, description = "No such genre; redirects to the genre list")
    )
)]
pub async fn genre_delete_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let page = state.services.genres.delete_page(&id).await?;
    Ok(confirm_response("genre_delete", page, EntityKind::Genre.listing_url()))
}

/// Delete a genre no book is filed under
#[utoipa::path(
    post,
    path = "/catalog/genre/{id}/delete",
    tag = "genres",
    params(
        ("id" = String, Path, description = "Genre ID")
    ),
    responses(
        (status = 200, description = "Refused; books are still filed under the genre"),
        (status = 303, description = "Deleted; redirects to the genre list"),
        (status = 404, description = "Genre not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn genre_delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let outcome = state.services.genres.delete(&id).await?;
    Ok(delete_response("genre_delete", outcome))
}
