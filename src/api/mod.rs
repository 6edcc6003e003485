//! HTTP handlers for the catalog pages

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod catalog;
pub mod genres;
pub mod health;
pub mod openapi;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    services::{DeleteOutcome, FormOutcome},
    AppState,
};

/// Data handed to the view renderer: serialized as the page's fields plus the
/// name of the template that renders them
pub struct Page<T> {
    pub template: &'static str,
    pub status: StatusCode,
    pub data: T,
}

impl<T: Serialize> Page<T> {
    pub fn new(template: &'static str, data: T) -> Self {
        Self {
            template,
            status: StatusCode::OK,
            data,
        }
    }

    /// A form shown again with its validation errors
    pub fn rejected(template: &'static str, data: T) -> Self {
        Self {
            template,
            status: StatusCode::UNPROCESSABLE_ENTITY,
            data,
        }
    }
}

#[derive(Serialize)]
struct PageBody<'a, T> {
    template: &'a str,
    #[serde(flatten)]
    data: &'a T,
}

impl<T: Serialize> IntoResponse for Page<T> {
    fn into_response(self) -> Response {
        let body = PageBody {
            template: self.template,
            data: &self.data,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Redirect after a successful write, or the rejected form page
pub(crate) fn form_response<P: Serialize>(template: &'static str, outcome: FormOutcome<P>) -> Response {
    match outcome {
        FormOutcome::Saved { redirect } => Redirect::to(&redirect).into_response(),
        FormOutcome::Rejected(page) => Page::rejected(template, page).into_response(),
    }
}

/// Redirect after a delete, or the delete page listing what blocks it
pub(crate) fn delete_response<P: Serialize>(template: &'static str, outcome: DeleteOutcome<P>) -> Response {
    match outcome {
        DeleteOutcome::Deleted { redirect } => Redirect::to(&redirect).into_response(),
        DeleteOutcome::Blocked(page) => Page::new(template, page).into_response(),
    }
}

/// Delete confirmation page; a missing record sends the user back to `listing`
pub(crate) fn confirm_response<P: Serialize>(
    template: &'static str,
    page: Option<P>,
    listing: String,
) -> Response {
    match page {
        Some(page) => Page::new(template, page).into_response(),
        None => Redirect::to(&listing).into_response(),
    }
}

fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::index))
        // Books
        .route("/books", get(books::book_list))
        .route("/book/create", get(books::book_create_get).post(books::book_create_post))
        .route("/book/:id", get(books::book_detail))
        .route("/book/:id/delete", get(books::book_delete_get).post(books::book_delete_post))
        .route("/book/:id/update", get(books::book_update_get).post(books::book_update_post))
        // Authors
        .route("/authors", get(authors::author_list))
        .route("/author/create", get(authors::author_create_get).post(authors::author_create_post))
        .route("/author/:id", get(authors::author_detail))
        .route("/author/:id/delete", get(authors::author_delete_get).post(authors::author_delete_post))
        .route("/author/:id/update", get(authors::author_update_get).post(authors::author_update_post))
        // Genres
        .route("/genres", get(genres::genre_list))
        .route("/genre/create", get(genres::genre_create_get).post(genres::genre_create_post))
        .route("/genre/:id", get(genres::genre_detail))
        .route("/genre/:id/delete", get(genres::genre_delete_get).post(genres::genre_delete_post))
        .route("/genre/:id/update", get(genres::genre_update_get).post(genres::genre_update_post))
        // Book copies
        .route("/bookinstances", get(book_instances::bookinstance_list))
        .route(
            "/bookinstance/create",
            get(book_instances::bookinstance_create_get).post(book_instances::bookinstance_create_post),
        )
        .route("/bookinstance/:id", get(book_instances::bookinstance_detail))
        .route(
            "/bookinstance/:id/delete",
            get(book_instances::bookinstance_delete_get).post(book_instances::bookinstance_delete_post),
        )
        .route(
            "/bookinstance/:id/update",
            get(book_instances::bookinstance_update_get).post(book_instances::bookinstance_update_post),
        )
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/catalog", catalog_routes())
        .with_state(state);

    Router::new()
        .merge(app)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::header::LOCATION;
    use serde_json::Value;

    #[derive(Serialize)]
    struct Greeting {
        title: String,
    }

    #[tokio::test]
    async fn test_page_flattens_data_next_to_template() {
        let page = Page::new("index", Greeting { title: "Home".into() });
        let response = page.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["template"], "index");
        assert_eq!(json["title"], "Home");
    }

    #[test]
    fn test_rejected_form_is_unprocessable() {
        let outcome = FormOutcome::Rejected(Greeting { title: "Create".into() });
        let response = form_response("genre_form", outcome);
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_saved_form_redirects_with_see_other() {
        let outcome: FormOutcome<Greeting> = FormOutcome::Saved {
            redirect: "/catalog/genre/abc".into(),
        };
        let response = form_response("genre_form", outcome);
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/catalog/genre/abc");
    }

    #[test]
    fn test_missing_delete_target_goes_to_listing() {
        let response = confirm_response::<Greeting>("genre_delete", None, "/catalog/genres".into());
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/catalog/genres");
    }
}
