//! Book pages and form processing

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use super::{
    aggregate::Aggregator,
    integrity::{IntegrityGuard, Verdict},
    resolve_author, resolve_genres,
    selection::{reconcile, GenreChoice},
    DeleteOutcome, FormOutcome,
};
use crate::{
    error::{AppError, AppResult},
    forms::{FieldError, RawForm},
    models::{
        linked, Author, AuthorView, Book, BookForm, BookInstance, BookInstanceView, BookTitle,
        EntityKind, Genre, Linked, Record,
    },
    repository::CatalogStore,
};

/// Row of the book listing
#[derive(Debug, Serialize)]
pub struct BookListEntry {
    pub id: String,
    pub title: String,
    pub url: String,
    /// `None` when the referenced author does not exist
    pub author: Option<AuthorView>,
}

#[derive(Debug, Serialize)]
pub struct BookListPage {
    pub title: String,
    pub book_list: Vec<BookListEntry>,
}

/// A book with its author and genre references resolved
#[derive(Debug, Serialize)]
pub struct BookDetail {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub url: String,
    /// `None` when the referenced author does not exist
    pub author: Option<AuthorView>,
    pub genres: Vec<Linked<Genre>>,
}

#[derive(Debug, Serialize)]
pub struct BookDetailPage {
    pub title: String,
    pub book: BookDetail,
    pub book_instances: Vec<BookInstanceView>,
}

#[derive(Debug, Serialize)]
pub struct BookFormPage {
    pub title: String,
    pub book: Option<BookForm>,
    pub authors: Vec<AuthorView>,
    pub genres: Vec<GenreChoice>,
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Serialize)]
pub struct BookDeletePage {
    pub title: String,
    pub book: Option<Linked<Book>>,
    pub book_instances: Vec<BookInstanceView>,
}

#[derive(Clone)]
pub struct BooksService {
    store: Arc<dyn CatalogStore>,
    guard: IntegrityGuard,
}

impl BooksService {
    pub fn new(store: Arc<dyn CatalogStore>, guard: IntegrityGuard) -> Self {
        Self { store, guard }
    }

    pub async fn list(&self) -> AppResult<BookListPage> {
        let mut results = Aggregator::new()
            .add("books", self.store.books_list())
            .add("authors", self.store.authors_list())
            .run()
            .await?;
        let books: Vec<Book> = results.take("books")?;
        let authors: HashMap<String, Author> = results
            .take::<Vec<Author>>("authors")?
            .into_iter()
            .map(|author| (author.id.clone(), author))
            .collect();

        let book_list = books
            .into_iter()
            .map(|book| BookListEntry {
                url: book.url(),
                author: authors.get(&book.author).cloned().map(AuthorView::from),
                id: book.id,
                title: book.title,
            })
            .collect();

        Ok(BookListPage {
            title: "Book List".to_string(),
            book_list,
        })
    }

    /// A book with its author and genres, plus its copies
    pub async fn detail(&self, id: &str) -> AppResult<BookDetailPage> {
        let mut results = Aggregator::new()
            .add("book", self.store.books_get(id))
            .add("book_instances", self.store.instances_by_book(id))
            .run()
            .await?;
        let book: Book = results
            .take::<Option<Book>>("book")?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;
        let instances: Vec<BookInstance> = results.take("book_instances")?;

        let store = self.store.as_ref();
        let mut refs = Aggregator::new()
            .add("author", resolve_author(store, &book.author))
            .add("genres", resolve_genres(store, &book.genre))
            .run()
            .await?;
        let author: Option<Author> = refs.take("author")?;
        let genres: Vec<Genre> = refs.take("genres")?;

        let title = BookTitle::from(&book);
        Ok(BookDetailPage {
            title: title.title.clone(),
            book_instances: instances
                .into_iter()
                .map(|instance| BookInstanceView::new(instance, Some(&title)))
                .collect(),
            book: BookDetail {
                url: book.url(),
                id: book.id,
                title: book.title,
                summary: book.summary,
                isbn: book.isbn,
                author: author.map(AuthorView::from),
                genres: linked(genres),
            },
        })
    }

    pub async fn create_form(&self) -> AppResult<BookFormPage> {
        self.form_page("Create Book", None, Vec::new()).await
    }

    pub async fn create(&self, form: &RawForm) -> AppResult<FormOutcome<BookFormPage>> {
        let submission = BookForm::rules().apply(form);
        let candidate = BookForm::from_submission(&submission, None);
        if !submission.is_valid() {
            let page = self
                .form_page("Create Book", Some(candidate), submission.into_errors())
                .await?;
            return Ok(FormOutcome::Rejected(page));
        }

        let book = self.store.books_insert(&candidate.to_data()).await?;
        tracing::info!(id = %book.id, genres = book.genre.len(), "Book created");
        Ok(FormOutcome::Saved { redirect: book.url() })
    }

    pub async fn update_form(&self, id: &str) -> AppResult<BookFormPage> {
        let book = self
            .store
            .books_get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;
        self.form_page("Update Book", Some(BookForm::from(&book)), Vec::new())
            .await
    }

    pub async fn update(&self, id: &str, form: &RawForm) -> AppResult<FormOutcome<BookFormPage>> {
        let submission = BookForm::rules().apply(form);
        let candidate = BookForm::from_submission(&submission, Some(id));
        if !submission.is_valid() {
            let page = self
                .form_page("Update Book", Some(candidate), submission.into_errors())
                .await?;
            return Ok(FormOutcome::Rejected(page));
        }

        let book = self.store.books_update(id, &candidate.to_data()).await?;
        tracing::info!(id = %book.id, "Book updated");
        Ok(FormOutcome::Saved { redirect: book.url() })
    }

    /// Confirmation page; `None` when the book does not exist
    pub async fn delete_page(&self, id: &str) -> AppResult<Option<BookDeletePage>> {
        let review = self.guard.review_book(id).await?;
        Ok(review.target.map(|book| BookDeletePage {
            title: "Delete Book".to_string(),
            book_instances: copies(&book, review.dependents),
            book: Some(book.into()),
        }))
    }

    pub async fn delete(&self, id: &str) -> AppResult<DeleteOutcome<BookDeletePage>> {
        match self.guard.delete_book(id).await? {
            Verdict::Deleted => Ok(DeleteOutcome::Deleted {
                redirect: EntityKind::Book.listing_url(),
            }),
            Verdict::Blocked(review) => {
                let book_instances = match &review.target {
                    Some(book) => copies(book, review.dependents),
                    None => review
                        .dependents
                        .into_iter()
                        .map(|instance| BookInstanceView::new(instance, None))
                        .collect(),
                };
                Ok(DeleteOutcome::Blocked(BookDeletePage {
                    title: "Delete Book".to_string(),
                    book: review.target.map(Linked::from),
                    book_instances,
                }))
            }
        }
    }

    /// Form page with the author choices and genre checkboxes. The checkboxes are
    /// reconciled against the candidate's genres, so an edit and a rejected
    /// submission both show the same selection they carry.
    async fn form_page(
        &self,
        title: &str,
        book: Option<BookForm>,
        errors: Vec<FieldError>,
    ) -> AppResult<BookFormPage> {
        let mut results = Aggregator::new()
            .add("authors", self.store.authors_list())
            .add("genres", self.store.genres_list())
            .run()
            .await?;
        let authors: Vec<Author> = results.take("authors")?;
        let genres: Vec<Genre> = results.take("genres")?;

        let chosen: &[String] = book.as_ref().map(|b| b.genre.as_slice()).unwrap_or_default();
        Ok(BookFormPage {
            title: title.to_string(),
            genres: reconcile(&genres, chosen),
            authors: authors.into_iter().map(AuthorView::from).collect(),
            book,
            errors,
        })
    }
}

fn copies(book: &Book, instances: Vec<BookInstance>) -> Vec<BookInstanceView> {
    let title = BookTitle::from(book);
    instances
        .into_iter()
        .map(|instance| BookInstanceView::new(instance, Some(&title)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuthorData, BookData, BookInstanceData, GenreData, InstanceStatus};
    use crate::repository::{memory::InMemoryStore, new_id, MockCatalogStore};

    fn service(store: Arc<dyn CatalogStore>) -> BooksService {
        BooksService::new(store.clone(), IntegrityGuard::new(store))
    }

    async fn seed_genres(store: &InMemoryStore, names: &[&str]) -> Vec<Genre> {
        let mut genres = Vec::new();
        for name in names {
            genres.push(
                store
                    .genres_insert(&GenreData { name: name.to_string() })
                    .await
                    .unwrap(),
            );
        }
        genres
    }

    async fn austen(store: &InMemoryStore) -> Author {
        store
            .authors_insert(&AuthorData {
                first_name: "Jane".into(),
                family_name: "Austen".into(),
                date_of_birth: None,
                date_of_death: None,
            })
            .await
            .unwrap()
    }

    fn checked(choices: &[GenreChoice]) -> Vec<String> {
        choices.iter().filter(|c| c.checked).map(|c| c.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_empty_title_redisplays_form_with_selection() {
        let store = Arc::new(InMemoryStore::new());
        let genres = seed_genres(&store, &["Classics", "Romance", "Satire"]).await;
        let author = austen(&store).await;

        let form = RawForm::from_pairs([
            ("title", ""),
            ("author", author.id.as_str()),
            ("summary", "A novel"),
            ("isbn", "9780141439518"),
            ("genre", genres[1].id.as_str()),
        ]);
        let page = match service(store.clone()).create(&form).await.unwrap() {
            FormOutcome::Rejected(page) => page,
            FormOutcome::Saved { .. } => panic!("book without title saved"),
        };

        assert_eq!(page.errors.len(), 1);
        assert_eq!(page.errors[0].field, "title");
        assert_eq!(page.errors[0].message, "Title must not be empty.");
        assert_eq!(page.book.as_ref().unwrap().author, author.id);
        assert_eq!(page.authors.len(), 1);
        assert_eq!(checked(&page.genres), vec![genres[1].id.clone()]);
        assert_eq!(store.books_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_edit_and_rejection_reconcile_alike() {
        let store = Arc::new(InMemoryStore::new());
        let genres = seed_genres(&store, &["Classics", "Romance", "Satire"]).await;
        let author = austen(&store).await;
        let book = store
            .books_insert(&BookData {
                title: "Emma".into(),
                author: author.id.clone(),
                summary: "s".into(),
                isbn: "i".into(),
                genre: vec![genres[0].id.clone(), genres[2].id.clone()],
            })
            .await
            .unwrap();
        let svc = service(store.clone());

        let edit = svc.update_form(&book.id).await.unwrap();

        let form = RawForm::from_pairs([
            ("title", "Emma"),
            ("author", author.id.as_str()),
            ("summary", ""),
            ("isbn", "i"),
            ("genre", genres[2].id.as_str()),
            ("genre", genres[0].id.as_str()),
        ]);
        let rejected = match svc.update(&book.id, &form).await.unwrap() {
            FormOutcome::Rejected(page) => page,
            FormOutcome::Saved { .. } => panic!("book without summary saved"),
        };

        assert_eq!(edit.genres, rejected.genres);
        let mut expected = vec![genres[0].id.clone(), genres[2].id.clone()];
        expected.sort();
        let mut got = checked(&edit.genres);
        got.sort();
        assert_eq!(got, expected);
    }

    #[tokio::test]
    async fn test_create_form_has_nothing_checked() {
        let store = Arc::new(InMemoryStore::new());
        seed_genres(&store, &["Classics", "Romance"]).await;
        let page = service(store).create_form().await.unwrap();
        assert!(page.book.is_none());
        assert_eq!(page.genres.len(), 2);
        assert!(checked(&page.genres).is_empty());
    }

    #[tokio::test]
    async fn test_rejected_create_never_writes() {
        let mut store = MockCatalogStore::new();
        store.expect_authors_list().returning(|| Ok(vec![]));
        store.expect_genres_list().returning(|| Ok(vec![]));
        store.expect_books_insert().never();

        let form = RawForm::from_pairs([("title", "Emma")]);
        let outcome = service(Arc::new(store)).create(&form).await.unwrap();
        match outcome {
            FormOutcome::Rejected(page) => {
                let fields: Vec<&str> = page.errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["author", "summary", "isbn"]);
            }
            FormOutcome::Saved { .. } => panic!("incomplete book saved"),
        }
    }

    #[tokio::test]
    async fn test_detail_tolerates_dangling_references() {
        let store = Arc::new(InMemoryStore::new());
        let genres = seed_genres(&store, &["Classics"]).await;
        let book = store
            .books_insert(&BookData {
                title: "Emma".into(),
                author: new_id(),
                summary: "s".into(),
                isbn: "i".into(),
                genre: vec![genres[0].id.clone(), new_id(), "not-an-id".into()],
            })
            .await
            .unwrap();
        store
            .instances_insert(&BookInstanceData {
                book: book.id.clone(),
                imprint: "Penguin".into(),
                status: InstanceStatus::Loaned,
                due_back: None,
            })
            .await
            .unwrap();

        let page = service(store).detail(&book.id).await.unwrap();
        assert!(page.book.author.is_none());
        assert_eq!(page.book.genres.len(), 1);
        assert_eq!(page.book.genres[0].record.name, "Classics");
        assert_eq!(page.book_instances.len(), 1);
        assert_eq!(page.book_instances[0].book_title.as_deref(), Some("Emma"));
    }

    #[tokio::test]
    async fn test_list_joins_authors() {
        let store = Arc::new(InMemoryStore::new());
        let author = austen(&store).await;
        store
            .books_insert(&BookData {
                title: "Persuasion".into(),
                author: author.id.clone(),
                summary: "s".into(),
                isbn: "i".into(),
                genre: vec![],
            })
            .await
            .unwrap();

        let page = service(store).list().await.unwrap();
        assert_eq!(page.book_list.len(), 1);
        assert_eq!(page.book_list[0].author.as_ref().unwrap().name, "Austen, Jane");
    }
}
