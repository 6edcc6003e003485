//! Genre model

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::{EntityKind, Record};
use crate::forms::{FieldRule, FormRules, Submission};

/// Genre record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Genre {
    pub id: String,
    pub name: String,
}

impl Record for Genre {
    const KIND: EntityKind = EntityKind::Genre;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Write payload for insert/update
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenreData {
    pub name: String,
}

static GENRE_RULES: Lazy<FormRules> = Lazy::new(|| {
    FormRules::new(vec![FieldRule::scalar("name")
        .length(1, Some(100), "Genre name required")
        .trim()
        .escape()])
});

/// Candidate genre built from a form submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct GenreForm {
    pub id: Option<String>,
    pub name: String,
}

impl GenreForm {
    pub fn rules() -> &'static FormRules {
        &GENRE_RULES
    }

    pub fn from_submission(submission: &Submission, id: Option<&str>) -> Self {
        Self {
            id: id.map(str::to_string),
            name: submission.text_or_empty("name"),
        }
    }

    pub fn to_data(&self) -> GenreData {
        GenreData {
            name: self.name.clone(),
        }
    }
}

impl From<&Genre> for GenreForm {
    fn from(genre: &Genre) -> Self {
        Self {
            id: Some(genre.id.clone()),
            name: genre.name.clone(),
        }
    }
}
