//! Data models for the catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod enums;
pub mod genre;

// Re-export commonly used types
pub use author::{Author, AuthorData, AuthorForm, AuthorView};
pub use book::{Book, BookData, BookForm, BookTitle};
pub use book_instance::{BookInstance, BookInstanceData, BookInstanceForm, BookInstanceView};
pub use enums::{EntityKind, InstanceStatus};
pub use genre::{Genre, GenreData, GenreForm};

use serde::Serialize;

/// A persisted catalog record
pub trait Record {
    const KIND: EntityKind;

    fn id(&self) -> &str;

    /// Identity path of the record, e.g. `/catalog/book/{id}`
    fn url(&self) -> String {
        Self::KIND.record_url(self.id())
    }
}

/// A record paired with its identity path, as rendered in listings
#[derive(Debug, Clone, Serialize)]
pub struct Linked<T> {
    #[serde(flatten)]
    pub record: T,
    pub url: String,
}

impl<T: Record> From<T> for Linked<T> {
    fn from(record: T) -> Self {
        let url = record.url();
        Self { record, url }
    }
}

/// Attach identity paths to a list of records
pub fn linked<T: Record>(records: Vec<T>) -> Vec<Linked<T>> {
    records.into_iter().map(Linked::from).collect()
}
