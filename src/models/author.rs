//! Author model and related types

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::{EntityKind, Record};
use crate::forms::{FieldRule, FormRules, Submission};

/// Full author record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: String,
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// Display name, "family, first"
    pub fn name(&self) -> String {
        format!("{}, {}", self.family_name, self.first_name)
    }

    /// "birth - death", each side blank when unknown
    pub fn lifespan(&self) -> String {
        let fmt = |d: Option<NaiveDate>| d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
        format!("{} - {}", fmt(self.date_of_birth), fmt(self.date_of_death))
    }
}

impl Record for Author {
    const KIND: EntityKind = EntityKind::Author;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Author with its derived display fields
#[derive(Debug, Clone, Serialize)]
pub struct AuthorView {
    #[serde(flatten)]
    pub author: Author,
    pub name: String,
    pub lifespan: String,
    pub url: String,
}

impl From<Author> for AuthorView {
    fn from(author: Author) -> Self {
        Self {
            name: author.name(),
            lifespan: author.lifespan(),
            url: author.url(),
            author,
        }
    }
}

/// Write payload for insert/update
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthorData {
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

static AUTHOR_RULES: Lazy<FormRules> = Lazy::new(|| {
    FormRules::new(vec![
        FieldRule::scalar("first_name")
            .length(1, Some(100), "First name must be specified.")
            .alphanumeric("First name has non-alphanumeric characters.")
            .trim()
            .escape(),
        FieldRule::scalar("family_name")
            .length(1, Some(100), "Family name must be specified.")
            .alphanumeric("Family name has non-alphanumeric characters.")
            .trim()
            .escape(),
        FieldRule::scalar("date_of_birth")
            .optional()
            .iso_date("Invalid date of birth")
            .trim()
            .to_date(),
        FieldRule::scalar("date_of_death")
            .optional()
            .iso_date("Invalid date of death")
            .trim()
            .to_date(),
    ])
});

/// Candidate author built from a form submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct AuthorForm {
    pub id: Option<String>,
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<String>,
    pub date_of_death: Option<String>,
}

impl AuthorForm {
    pub fn rules() -> &'static FormRules {
        &AUTHOR_RULES
    }

    pub fn from_submission(submission: &Submission, id: Option<&str>) -> Self {
        Self {
            id: id.map(str::to_string),
            first_name: submission.text_or_empty("first_name"),
            family_name: submission.text_or_empty("family_name"),
            date_of_birth: submission.optional_text("date_of_birth"),
            date_of_death: submission.optional_text("date_of_death"),
        }
    }

    /// Write payload; only meaningful for a valid submission
    pub fn to_data(&self) -> AuthorData {
        let date = |value: &Option<String>| value.as_deref().and_then(crate::forms::sanitize::parse_iso_date);
        AuthorData {
            first_name: self.first_name.clone(),
            family_name: self.family_name.clone(),
            date_of_birth: date(&self.date_of_birth),
            date_of_death: date(&self.date_of_death),
        }
    }
}

impl From<&Author> for AuthorForm {
    fn from(author: &Author) -> Self {
        let date = |d: Option<NaiveDate>| d.map(|d| d.format("%Y-%m-%d").to_string());
        Self {
            id: Some(author.id.clone()),
            first_name: author.first_name.clone(),
            family_name: author.family_name.clone(),
            date_of_birth: date(author.date_of_birth),
            date_of_death: date(author.date_of_death),
        }
    }
}
