//! Book model and related types

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::{EntityKind, Record};
use crate::forms::{FieldRule, FormRules, Submission};

/// Book record. `author` and `genre` hold identifiers of the referenced records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: String,
    pub title: String,
    #[sqlx(rename = "author_id")]
    pub author: String,
    pub summary: String,
    pub isbn: String,
    #[sqlx(rename = "genre_ids")]
    pub genre: Vec<String>,
}

impl Record for Book {
    const KIND: EntityKind = EntityKind::Book;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Projection of a book onto its title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookTitle {
    pub id: String,
    pub title: String,
}

impl Record for BookTitle {
    const KIND: EntityKind = EntityKind::Book;

    fn id(&self) -> &str {
        &self.id
    }
}

impl From<&Book> for BookTitle {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            title: book.title.clone(),
        }
    }
}

/// Write payload for insert/update
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BookData {
    pub title: String,
    pub author: String,
    pub summary: String,
    pub isbn: String,
    pub genre: Vec<String>,
}

static BOOK_RULES: Lazy<FormRules> = Lazy::new(|| {
    FormRules::new(vec![
        FieldRule::scalar("title")
            .length(1, None, "Title must not be empty.")
            .trim()
            .escape(),
        FieldRule::scalar("author")
            .length(1, None, "Author must not be empty.")
            .trim()
            .canonical_id()
            .escape(),
        FieldRule::scalar("summary")
            .length(1, None, "Summary must not be empty.")
            .trim()
            .escape(),
        FieldRule::scalar("isbn")
            .length(1, None, "ISBN must not be empty.")
            .trim()
            .escape(),
        FieldRule::list("genre").trim().canonical_id().escape(),
    ])
});

/// Candidate book built from a form submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct BookForm {
    pub id: Option<String>,
    pub title: String,
    pub author: String,
    pub summary: String,
    pub isbn: String,
    pub genre: Vec<String>,
}

impl BookForm {
    pub fn rules() -> &'static FormRules {
        &BOOK_RULES
    }

    pub fn from_submission(submission: &Submission, id: Option<&str>) -> Self {
        Self {
            id: id.map(str::to_string),
            title: submission.text_or_empty("title"),
            author: submission.text_or_empty("author"),
            summary: submission.text_or_empty("summary"),
            isbn: submission.text_or_empty("isbn"),
            genre: submission.list("genre"),
        }
    }

    pub fn to_data(&self) -> BookData {
        BookData {
            title: self.title.clone(),
            author: self.author.clone(),
            summary: self.summary.clone(),
            isbn: self.isbn.clone(),
            genre: self.genre.clone(),
        }
    }
}

impl From<&Book> for BookForm {
    fn from(book: &Book) -> Self {
        Self {
            id: Some(book.id.clone()),
            title: book.title.clone(),
            author: book.author.clone(),
            summary: book.summary.clone(),
            isbn: book.isbn.clone(),
            genre: book.genre.clone(),
        }
    }
}
