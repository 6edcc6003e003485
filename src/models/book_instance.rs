//! Book instance (physical copy) model and related types

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{BookTitle, EntityKind, InstanceStatus, Record};
use crate::{
    error::AppResult,
    forms::{sanitize, FieldRule, FormRules, Submission},
};

/// Physical copy of a book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookInstance {
    pub id: String,
    /// Identifier of the book this is a copy of
    pub book: String,
    pub imprint: String,
    pub status: InstanceStatus,
    /// Only meaningful when the copy is not available
    pub due_back: Option<NaiveDate>,
}

impl BookInstance {
    /// Due date for display, e.g. "Mar 4, 2025"
    pub fn due_back_formatted(&self) -> Option<String> {
        self.due_back.map(|d| d.format("%b %-d, %Y").to_string())
    }
}

impl Record for BookInstance {
    const KIND: EntityKind = EntityKind::BookInstance;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Copy populated with the title of its book
#[derive(Debug, Clone, Serialize)]
pub struct BookInstanceView {
    #[serde(flatten)]
    pub instance: BookInstance,
    pub url: String,
    pub due_back_formatted: Option<String>,
    /// `None` when the referenced book no longer exists
    pub book_title: Option<String>,
    pub book_url: String,
}

impl BookInstanceView {
    pub fn new(instance: BookInstance, book: Option<&BookTitle>) -> Self {
        Self {
            url: instance.url(),
            due_back_formatted: instance.due_back_formatted(),
            book_title: book.map(|b| b.title.clone()),
            book_url: EntityKind::Book.record_url(&instance.book),
            instance,
        }
    }
}

/// Write payload for insert/update
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BookInstanceData {
    pub book: String,
    pub imprint: String,
    pub status: InstanceStatus,
    pub due_back: Option<NaiveDate>,
}

static INSTANCE_RULES: Lazy<FormRules> = Lazy::new(|| {
    FormRules::new(vec![
        FieldRule::scalar("book")
            .length(1, None, "Book must be specified")
            .trim()
            .canonical_id()
            .escape(),
        FieldRule::scalar("imprint")
            .length(1, None, "Imprint must be specified")
            .trim()
            .escape(),
        FieldRule::scalar("status")
            .default_value("Maintenance")
            .one_of(&InstanceStatus::LABELS, "Invalid status")
            .trim()
            .escape(),
        FieldRule::scalar("due_back")
            .optional()
            .iso_date("Invalid date")
            .trim()
            .to_date(),
    ])
});

/// Candidate copy built from a form submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct BookInstanceForm {
    pub id: Option<String>,
    pub book: String,
    pub imprint: String,
    pub status: String,
    pub due_back: Option<String>,
}

impl BookInstanceForm {
    pub fn rules() -> &'static FormRules {
        &INSTANCE_RULES
    }

    pub fn from_submission(submission: &Submission, id: Option<&str>) -> Self {
        Self {
            id: id.map(str::to_string),
            book: submission.text_or_empty("book"),
            imprint: submission.text_or_empty("imprint"),
            status: submission.text_or_empty("status"),
            due_back: submission.optional_text("due_back"),
        }
    }

    /// Write payload. Fails only for a candidate that did not pass validation.
    pub fn to_data(&self) -> AppResult<BookInstanceData> {
        Ok(BookInstanceData {
            book: self.book.clone(),
            imprint: self.imprint.clone(),
            status: self.status.parse()?,
            due_back: self.due_back.as_deref().and_then(sanitize::parse_iso_date),
        })
    }
}

impl From<&BookInstance> for BookInstanceForm {
    fn from(instance: &BookInstance) -> Self {
        Self {
            id: Some(instance.id.clone()),
            book: instance.book.clone(),
            imprint: instance.imprint.clone(),
            status: instance.status.to_string(),
            due_back: instance.due_back.map(|d| d.format("%Y-%m-%d").to_string()),
        }
    }
}
