//! Book endpoints

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
    services::books::{BookDetailPage, BookFormPage, BookListPage},
    AppState,
};

/// List all books with their authors
#[utoipa::path(
    get,
    path = "/catalog/books",
    tag = "books",
    responses(
        (status = 200, description = "Book list")
    )
)]
pub async fn book_list(State(state): State<AppState>) -> AppResult<Page<BookListPage>> {
    let page = state.services.books.list().await?;
    Ok(Page::new("book_list", page))
}

/// Book details with author, genres and copies
#[utoipa::path(
    get,
    path = "/catalog/book/{id}",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details"),
        (status = 400, description = "Malformed ID", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn book_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Page<BookDetailPage>> {
    let page = state.services.books.detail(&id).await?;
    Ok(Page::new("book_detail", page))
}

/// Empty book form with author choices and unchecked genres
#[utoipa::path(
    get,
    path = "/catalog/book/create",
    tag = "books",
    responses(
        (status = 200, description = "Book form")
    )
)]
pub async fn book_create_get(State(state): State<AppState>) -> AppResult<Page<BookFormPage>> {
    let page = state.services.books.create_form().await?;
    Ok(Page::new("book_form", page))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/catalog/book/create",
    tag = "books",
    request_body(content = crate::models::BookForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Created; redirects to the new book"),
        (status = 422, description = "Form shown again with its errors and selected genres")
    )
)]
pub async fn book_create_post(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let outcome = state.services.books.create(&RawForm::from_pairs(pairs)).await?;
    Ok(form_response("book_form", outcome))
}

/// Book form filled with the current record, its genres checked
#[utoipa::path(
    get,
    path = "/catalog/book/{id}/update",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book form"),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn book_update_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Page<BookFormPage>> {
    let page = state.services.books.update_form(&id).await?;
    Ok(Page::new("book_form", page))
}

/// Update a book
#[utoipa::path(
    post,
    path = "/catalog/book/{id}/update",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    request_body(content = crate::models::BookForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Updated; redirects to the book"),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Form shown again with its errors and selected genres")
    )
)]
pub async fn book_update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    let outcome = state
        .services
        .books
        .update(&id, &RawForm::from_pairs(pairs))
        .await?;
    Ok(form_response("book_form", outcome))
}

/// Delete confirmation, listing the book's copies
#[utoipa::path(
    get,
    path = "/catalog/book/{id}/delete",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Delete confirmation"),
        (status = 303, description = "No such book; redirects to the book list")
    )
)]
pub async fn book_delete_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let page = state.services.books.delete_page(&id).await?;
    Ok(confirm_response("book_delete", page, EntityKind::Book.listing_url()))
}

/// Delete a book that has no copies
#[utoipa::path(
    post,
    path = "/catalog/book/{id}/delete",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Refused; copies of the book still exist"),
        (status = 303, description = "Deleted; redirects to the book list"),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn book_delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let outcome = state.services.books.delete(&id).await?;
    Ok(delete_response("book_delete", outcome))
}
