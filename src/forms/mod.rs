//! Form submission pipeline.
//!
//! A [`RawForm`] holds the submitted key/value pairs. A [`FormRules`] set describes,
//! per field, the checks a value must pass and the transforms that clean it.
//! [`FormRules::apply`] evaluates every field independently and always returns a
//! [`Submission`]: the sanitized values plus the full, ordered list of errors.
//! Nothing short-circuits, and sanitized values are kept whether or not the
//! submission is valid so a rejected form can be shown again as typed.

pub mod rules;
pub mod sanitize;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;
use utoipa::ToSchema;

pub use rules::{Check, FieldRule, Shape, Transform};

/// A submitted field: missing, given once, or given several times
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    #[default]
    Absent,
    Single(String),
    List(Vec<String>),
}

impl FieldValue {
    /// First submitted value, if any
    pub fn first(&self) -> Option<&str> {
        match self {
            FieldValue::Absent => None,
            FieldValue::Single(value) => Some(value),
            FieldValue::List(values) => values.first().map(String::as_str),
        }
    }

    /// Normalize to an explicit list of zero or more values
    pub fn to_list(&self) -> Vec<String> {
        match self {
            FieldValue::Absent => Vec::new(),
            FieldValue::Single(value) => vec![value.clone()],
            FieldValue::List(values) => values.clone(),
        }
    }

    fn push(&mut self, value: String) {
        *self = match std::mem::take(self) {
            FieldValue::Absent => FieldValue::Single(value),
            FieldValue::Single(first) => FieldValue::List(vec![first, value]),
            FieldValue::List(mut values) => {
                values.push(value);
                FieldValue::List(values)
            }
        };
    }
}

/// Submitted form fields, in submission order
#[derive(Debug, Clone, Default)]
pub struct RawForm {
    fields: IndexMap<String, FieldValue>,
}

impl RawForm {
    /// Build from urlencoded pairs. Repeated keys accumulate; a trailing `[]` on a
    /// key is ignored (`genre[]=a&genre[]=b` is the same as `genre=a&genre=b`).
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut fields: IndexMap<String, FieldValue> = IndexMap::new();
        for (key, value) in pairs {
            let key: String = key.into();
            let key = key.strip_suffix("[]").map(str::to_string).unwrap_or(key);
            fields.entry(key).or_default().push(value.into());
        }
        Self { fields }
    }

    pub fn get(&self, name: &str) -> &FieldValue {
        static ABSENT: FieldValue = FieldValue::Absent;
        self.fields.get(name).unwrap_or(&ABSENT)
    }
}

/// A field-scoped validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    /// The submitted value the check looked at
    pub value: Option<String>,
}

/// A sanitized field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sanitized {
    Text(Option<String>),
    List(Vec<String>),
}

/// Result of running a form through its rules
#[derive(Debug, Clone, Default)]
pub struct Submission {
    values: IndexMap<&'static str, Sanitized>,
    errors: Vec<FieldError>,
}

impl Submission {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    /// Sanitized text of a scalar field; `None` when absent
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(Sanitized::Text(value)) => value.as_deref(),
            Some(Sanitized::List(values)) => values.first().map(String::as_str),
            None => None,
        }
    }

    /// Sanitized text of a scalar field, empty when absent
    pub fn text_or_empty(&self, name: &str) -> String {
        self.text(name).unwrap_or_default().to_string()
    }

    /// Sanitized text of an optional field; blank counts as absent
    pub fn optional_text(&self, name: &str) -> Option<String> {
        self.text(name)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    /// Sanitized values of a list field
    pub fn list(&self, name: &str) -> Vec<String> {
        match self.values.get(name) {
            Some(Sanitized::List(values)) => values.clone(),
            Some(Sanitized::Text(Some(value))) => vec![value.clone()],
            _ => Vec::new(),
        }
    }

    /// Date value of a field, when it holds a valid date
    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        self.text(name).and_then(sanitize::parse_iso_date)
    }
}

/// Ordered rule set for one form
#[derive(Debug, Clone)]
pub struct FormRules {
    fields: Vec<FieldRule>,
}

impl FormRules {
    pub fn new(fields: Vec<FieldRule>) -> Self {
        Self { fields }
    }

    /// Validate and sanitize every field of `form`
    pub fn apply(&self, form: &RawForm) -> Submission {
        let mut submission = Submission::default();
        for rule in &self.fields {
            let raw = form.get(rule.name);
            let value = match rule.shape {
                Shape::Scalar => {
                    let given = raw
                        .first()
                        .filter(|v| rule.default.is_none() || !v.trim().is_empty())
                        .map(str::to_string)
                        .or_else(|| rule.default.map(str::to_string));
                    submission.errors.extend(evaluate(rule, given.as_deref()));
                    Sanitized::Text(given.map(|v| rule.sanitize(&v)))
                }
                Shape::List => {
                    let items = raw.to_list();
                    for item in &items {
                        submission.errors.extend(evaluate(rule, Some(item)));
                    }
                    Sanitized::List(items.iter().map(|v| rule.sanitize(v)).collect())
                }
            };
            submission.values.insert(rule.name, value);
        }
        submission
    }
}

fn evaluate(rule: &FieldRule, value: Option<&str>) -> Vec<FieldError> {
    let checked = value.map(|v| rule.checked_value(v)).unwrap_or_default();
    if rule.optional && checked.is_empty() {
        return Vec::new();
    }
    rule.checks
        .iter()
        .filter(|check| !check.passes(checked))
        .map(|check| FieldError {
            field: rule.name.to_string(),
            message: check.message().to_string(),
            value: value.map(str::to_string),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book_like_rules() -> FormRules {
        FormRules::new(vec![
            FieldRule::scalar("title")
                .length(1, None, "Title must not be empty.")
                .trim()
                .escape(),
            FieldRule::scalar("author")
                .length(1, None, "Author must not be empty.")
                .trim()
                .escape(),
            FieldRule::list("genre").trim().escape(),
            FieldRule::scalar("due_back")
                .optional()
                .iso_date("Invalid date")
                .to_date(),
        ])
    }

    #[test]
    fn test_repeated_keys_accumulate() {
        let form = RawForm::from_pairs([("genre", "a"), ("title", "t"), ("genre[]", "b")]);
        assert_eq!(form.get("genre"), &FieldValue::List(vec!["a".into(), "b".into()]));
        assert_eq!(form.get("title"), &FieldValue::Single("t".into()));
        assert_eq!(form.get("missing"), &FieldValue::Absent);
    }

    #[test]
    fn test_list_normalization() {
        assert!(FieldValue::Absent.to_list().is_empty());
        assert_eq!(FieldValue::Single("x".into()).to_list(), vec!["x".to_string()]);
        assert_eq!(
            FieldValue::List(vec!["x".into(), "y".into()]).to_list(),
            vec!["x".to_string(), "y".to_string()]
        );
    }

    #[test]
    fn test_all_fields_checked_without_short_circuit() {
        let form = RawForm::from_pairs([("title", "  "), ("due_back", "soon")]);
        let submission = book_like_rules().apply(&form);

        let fields: Vec<&str> = submission.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "author", "due_back"]);
        assert!(!submission.is_valid());
    }

    #[test]
    fn test_sanitized_values_survive_failure() {
        let form = RawForm::from_pairs([
            ("title", ""),
            ("author", " Jane <Austen> "),
            ("genre", " g1 "),
        ]);
        let submission = book_like_rules().apply(&form);

        assert_eq!(submission.errors().len(), 1);
        assert_eq!(submission.errors()[0].message, "Title must not be empty.");
        assert_eq!(submission.text("author"), Some("Jane &lt;Austen&gt;"));
        assert_eq!(submission.list("genre"), vec!["g1".to_string()]);
    }

    #[test]
    fn test_optional_field_skips_checks_when_blank() {
        let form = RawForm::from_pairs([("title", "t"), ("author", "a"), ("due_back", "")]);
        let submission = book_like_rules().apply(&form);
        assert!(submission.is_valid());
        assert_eq!(submission.optional_text("due_back"), None);
        assert_eq!(submission.date("due_back"), None);
    }

    #[test]
    fn test_invalid_date_is_kept_for_redisplay() {
        let form = RawForm::from_pairs([("title", "t"), ("author", "a"), ("due_back", "not-a-date")]);
        let submission = book_like_rules().apply(&form);
        assert_eq!(submission.errors().len(), 1);
        assert_eq!(submission.errors()[0].field, "due_back");
        assert_eq!(submission.text("due_back"), Some("not-a-date"));
        assert_eq!(submission.date("due_back"), None);
    }

    #[test]
    fn test_default_value_applies_to_blank_input() {
        let rules = FormRules::new(vec![FieldRule::scalar("status")
            .default_value("Maintenance")
            .one_of(&["Available", "Maintenance"], "Invalid status")
            .trim()]);
        let submission = rules.apply(&RawForm::from_pairs([("status", " ")]));
        assert!(submission.is_valid());
        assert_eq!(submission.text("status"), Some("Maintenance"));

        let submission = rules.apply(&RawForm::default());
        assert_eq!(submission.text("status"), Some("Maintenance"));
    }

    #[test]
    fn test_sanitization_is_idempotent() {
        let rules = book_like_rules();
        let form = RawForm::from_pairs([
            ("title", "  War & Peace  "),
            ("author", "<Tolstoy>"),
            ("genre", " 'novel' "),
            ("due_back", "2024-01-02T03:04:05Z"),
        ]);
        let once = rules.apply(&form);
        let again = rules.apply(&RawForm::from_pairs(
            ["title", "author", "due_back"]
                .into_iter()
                .map(|name| (name, once.text_or_empty(name)))
                .chain(once.list("genre").into_iter().map(|g| ("genre", g))),
        ));

        for name in ["title", "author", "due_back"] {
            assert_eq!(once.text(name), again.text(name));
        }
        assert_eq!(once.list("genre"), again.list("genre"));
    }
}
