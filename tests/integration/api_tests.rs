//! Catalog routes over the in-memory store

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{
        header::{ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_TYPE, LOCATION},
        Request, StatusCode,
    },
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use locallibrary_server::{
    api,
    models::{AuthorData, BookData, BookInstanceData, GenreData, InstanceStatus},
    repository::{memory::InMemoryStore, new_id, CatalogStore},
    services::Services,
    AppConfig, AppState,
};

struct TestApp {
    router: Router,
    store: Arc<InMemoryStore>,
}

struct Reply {
    status: StatusCode,
    location: Option<String>,
    body: Value,
}

impl TestApp {
    fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let state = AppState {
            config: Arc::new(AppConfig::default()),
            services: Arc::new(Services::new(store.clone())),
        };
        Self {
            router: api::create_router(state),
            store,
        }
    }

    async fn send(&self, request: Request<Body>) -> Reply {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Reply { status, location, body }
    }

    async fn get(&self, uri: &str) -> Reply {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn post_form(&self, uri: &str, body: &str) -> Reply {
        let request = Request::post(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn genre(&self, name: &str) -> String {
        self.store
            .genres_insert(&GenreData { name: name.into() })
            .await
            .unwrap()
            .id
    }

    async fn author(&self, first: &str, family: &str) -> String {
        self.store
            .authors_insert(&AuthorData {
                first_name: first.into(),
                family_name: family.into(),
                date_of_birth: None,
                date_of_death: None,
            })
            .await
            .unwrap()
            .id
    }

    async fn book(&self, title: &str, author: &str, genre: Vec<String>) -> String {
        self.store
            .books_insert(&BookData {
                title: title.into(),
                author: author.into(),
                summary: "summary".into(),
                isbn: "9780000000000".into(),
                genre,
            })
            .await
            .unwrap()
            .id
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let reply = app.get("/health").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["status"], "healthy");

    let reply = app.get("/ready").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["status"], "ready");
}

#[tokio::test]
async fn test_index_counts_every_collection() {
    let app = TestApp::new();
    let author = app.author("Jane", "Austen").await;
    app.genre("Classics").await;
    let book = app.book("Emma", &author, vec![]).await;
    for status in [InstanceStatus::Available, InstanceStatus::Loaned, InstanceStatus::Available] {
        app.store
            .instances_insert(&BookInstanceData {
                book: book.clone(),
                imprint: "Penguin".into(),
                status,
                due_back: None,
            })
            .await
            .unwrap();
    }

    let reply = app.get("/catalog").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["template"], "index");
    let data = &reply.body["data"];
    assert_eq!(data["book_count"], 1);
    assert_eq!(data["book_instance_count"], 3);
    assert_eq!(data["book_instance_available_count"], 2);
    assert_eq!(data["author_count"], 1);
    assert_eq!(data["genre_count"], 1);
}

#[tokio::test]
async fn test_genre_create_reuses_existing_name() {
    let app = TestApp::new();

    let first = app.post_form("/catalog/genre/create", "name=Fantasy").await;
    assert_eq!(first.status, StatusCode::SEE_OTHER);
    let location = first.location.unwrap();
    assert!(location.starts_with("/catalog/genre/"));

    let second = app.post_form("/catalog/genre/create", "name=+Fantasy+").await;
    assert_eq!(second.status, StatusCode::SEE_OTHER);
    assert_eq!(second.location.unwrap(), location);

    let list = app.get("/catalog/genres").await;
    assert_eq!(list.body["genre_list"].as_array().unwrap().len(), 1);
    assert_eq!(list.body["genre_list"][0]["url"], location);
}

#[tokio::test]
async fn test_genre_form_rejects_blank_name() {
    let app = TestApp::new();
    let reply = app.post_form("/catalog/genre/create", "name=").await;

    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(reply.body["template"], "genre_form");
    assert_eq!(reply.body["errors"][0]["field"], "name");
    assert_eq!(reply.body["errors"][0]["message"], "Genre name required");
    assert_eq!(app.store.genres_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_rejected_book_keeps_values_and_selection() {
    let app = TestApp::new();
    let classics = app.genre("Classics").await;
    let romance = app.genre("Romance").await;
    let author = app.author("Jane", "Austen").await;

    let body = format!(
        "title=&author={author}&summary=Courtship&isbn=9780141439587&genre={romance}"
    );
    let reply = app.post_form("/catalog/book/create", &body).await;

    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(reply.body["template"], "book_form");
    let errors = reply.body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["message"], "Title must not be empty.");
    assert_eq!(reply.body["book"]["author"], author.as_str());
    assert_eq!(reply.body["book"]["summary"], "Courtship");

    let genres = reply.body["genres"].as_array().unwrap();
    let flag = |id: &str| {
        genres
            .iter()
            .find(|g| g["id"] == id)
            .map(|g| g["checked"].as_bool().unwrap())
            .unwrap()
    };
    assert!(!flag(&classics));
    assert!(flag(&romance));
    assert_eq!(app.store.books_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_book_with_several_genres_round_trip() {
    let app = TestApp::new();
    let classics = app.genre("Classics").await;
    let romance = app.genre("Romance").await;
    let author = app.author("Jane", "Austen").await;

    let body = format!(
        "title=Persuasion&author={author}&summary=Second+chances&isbn=9780141439686\
         &genre%5B%5D={classics}&genre%5B%5D={romance}"
    );
    let created = app.post_form("/catalog/book/create", &body).await;
    assert_eq!(created.status, StatusCode::SEE_OTHER);

    let detail = app.get(&created.location.unwrap()).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.body["template"], "book_detail");
    assert_eq!(detail.body["book"]["author"]["name"], "Austen, Jane");
    assert_eq!(detail.body["book"]["genres"].as_array().unwrap().len(), 2);
    assert_eq!(detail.body["book"]["summary"], "Second chances");

    let book_id = detail.body["book"]["id"].as_str().unwrap().to_string();
    let edit = app.get(&format!("/catalog/book/{book_id}/update")).await;
    let checked: Vec<&Value> = edit.body["genres"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|g| g["checked"] == true)
        .collect();
    assert_eq!(checked.len(), 2);
}

#[tokio::test]
async fn test_genre_delete_blocked_while_books_reference_it() {
    let app = TestApp::new();
    let author = app.author("Ursula", "LeGuin").await;
    let genre = app.genre("Fantasy").await;
    app.book("A Wizard of Earthsea", &author, vec![genre.clone()]).await;
    app.book("The Farthest Shore", &author, vec![genre.clone()]).await;

    let reply = app.post_form(&format!("/catalog/genre/{genre}/delete"), "").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["template"], "genre_delete");
    assert_eq!(reply.body["genre_books"].as_array().unwrap().len(), 2);
    assert_eq!(app.store.genres_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_genre_chosen_with_upper_case_id_still_blocks_delete() {
    let app = TestApp::new();
    let author = app.author("Emily", "Dickinson").await;
    let genre = app.genre("Poetry").await;

    let body = format!(
        "title=Poems&author={}&summary=Verse&isbn=9780316184137&genre={}",
        author.to_uppercase(),
        genre.to_uppercase()
    );
    let created = app.post_form("/catalog/book/create", &body).await;
    assert_eq!(created.status, StatusCode::SEE_OTHER);

    let book = app.get(created.location.as_deref().unwrap()).await;
    assert_eq!(book.body["book"]["author"]["name"], "Dickinson, Emily");
    assert_eq!(book.body["book"]["genres"].as_array().unwrap().len(), 1);

    let reply = app.post_form(&format!("/catalog/genre/{genre}/delete"), "").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["template"], "genre_delete");
    assert_eq!(reply.body["genre_books"].as_array().unwrap().len(), 1);
    assert_eq!(app.store.genres_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_unreferenced_author_deleted() {
    let app = TestApp::new();
    let author = app.author("Anne", "Bronte").await;

    let confirm = app.get(&format!("/catalog/author/{author}/delete")).await;
    assert_eq!(confirm.status, StatusCode::OK);
    assert_eq!(confirm.body["author"]["name"], "Bronte, Anne");

    let reply = app.post_form(&format!("/catalog/author/{author}/delete"), "").await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location.as_deref(), Some("/catalog/authors"));
    assert_eq!(app.store.authors_count().await.unwrap(), 0);

    let gone = app.get(&format!("/catalog/author/{author}/delete")).await;
    assert_eq!(gone.status, StatusCode::SEE_OTHER);
    assert_eq!(gone.location.as_deref(), Some("/catalog/authors"));
}

#[tokio::test]
async fn test_copy_with_invalid_due_date_rejected() {
    let app = TestApp::new();
    let book = app.book("Emma", &new_id(), vec![]).await;

    let body = format!("book={book}&imprint=Penguin&status=Loaned&due_back=not-a-date");
    let reply = app.post_form("/catalog/bookinstance/create", &body).await;

    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(reply.body["template"], "bookinstance_form");
    assert_eq!(reply.body["errors"][0]["message"], "Invalid date");
    assert_eq!(reply.body["selected_book"], book.as_str());
    assert_eq!(reply.body["statuses"].as_array().unwrap().len(), 4);
    assert_eq!(app.store.instances_count(None).await.unwrap(), 0);
}

#[tokio::test]
async fn test_copy_created_and_shown_with_title() {
    let app = TestApp::new();
    let book = app.book("Emma", &new_id(), vec![]).await;

    let body = format!("book={book}&imprint=Penguin&status=Loaned&due_back=2025-03-04");
    let created = app.post_form("/catalog/bookinstance/create", &body).await;
    assert_eq!(created.status, StatusCode::SEE_OTHER);

    let detail = app.get(&created.location.unwrap()).await;
    assert_eq!(detail.status, StatusCode::OK);
    let copy = &detail.body["bookinstance"];
    assert_eq!(copy["book_title"], "Emma");
    assert_eq!(copy["status"], "Loaned");
    assert_eq!(copy["due_back"], "2025-03-04");
    assert_eq!(copy["due_back_formatted"], "Mar 4, 2025");
}

#[tokio::test]
async fn test_author_update_flow() {
    let app = TestApp::new();
    let author = app.author("Mary", "Shelly").await;

    let form = app.get(&format!("/catalog/author/{author}/update")).await;
    assert_eq!(form.body["author"]["family_name"], "Shelly");

    let reply = app
        .post_form(
            &format!("/catalog/author/{author}/update"),
            "first_name=Mary&family_name=Shelley&date_of_birth=1797-08-30",
        )
        .await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location.unwrap(), format!("/catalog/author/{author}"));

    let detail = app.get(&format!("/catalog/author/{author}")).await;
    assert_eq!(detail.body["author"]["name"], "Shelley, Mary");
    assert_eq!(detail.body["author"]["date_of_birth"], "1797-08-30");
}

#[tokio::test]
async fn test_missing_and_malformed_identifiers() {
    let app = TestApp::new();

    let missing = app.get(&format!("/catalog/book/{}", new_id())).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["error"], "NoSuchRecord");

    let malformed = app.get("/catalog/genre/not-an-id").await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert_eq!(malformed.body["code"], 22);

    let update = app
        .post_form(&format!("/catalog/genre/{}/update", new_id()), "name=Horror")
        .await;
    assert_eq!(update.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_responses_compressed_when_accepted() {
    let app = TestApp::new();
    app.genre("Classics").await;

    let request = Request::get("/catalog/genres")
        .header(ACCEPT_ENCODING, "gzip")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get(CONTENT_ENCODING).unwrap(), "gzip");

    let plain = app.get("/catalog/genres").await;
    assert_eq!(plain.body["template"], "genre_list");
}
