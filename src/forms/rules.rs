//! Declarative per-field rules: checks and transforms

use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidateLength;

use super::sanitize;

static ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}\p{N}]+$").expect("valid alphanumeric pattern"));

/// A validation check on a single (trimmed) value
#[derive(Debug, Clone)]
pub enum Check {
    /// Character count within `min..=max`
    Length {
        min: u64,
        max: Option<u64>,
        message: &'static str,
    },
    /// Letters and digits only
    Alphanumeric { message: &'static str },
    /// ISO-8601 date or timestamp
    IsoDate { message: &'static str },
    /// One of a closed set of values
    OneOf {
        allowed: &'static [&'static str],
        message: &'static str,
    },
}

impl Check {
    pub fn passes(&self, value: &str) -> bool {
        match self {
            Check::Length { min, max, .. } => {
                value.validate_length(Some(*min), *max, None)
            }
            Check::Alphanumeric { .. } => ALPHANUMERIC.is_match(value),
            Check::IsoDate { .. } => sanitize::parse_iso_date(value).is_some(),
            Check::OneOf { allowed, .. } => allowed.contains(&value),
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Check::Length { message, .. }
            | Check::Alphanumeric { message }
            | Check::IsoDate { message }
            | Check::OneOf { message, .. } => *message,
        }
    }
}

/// A sanitizing transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Trim,
    Escape,
    ToDate,
    CanonicalId,
}

impl Transform {
    pub fn apply(&self, value: &str) -> String {
        match self {
            Transform::Trim => sanitize::trim(value),
            Transform::Escape => sanitize::escape(value),
            Transform::ToDate => sanitize::to_date(value),
            Transform::CanonicalId => sanitize::canonical_id(value),
        }
    }
}

/// Whether a field carries one value or a multi-select list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Scalar,
    List,
}

/// Rules for one form field
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub name: &'static str,
    pub shape: Shape,
    /// Empty or absent values skip every check
    pub optional: bool,
    /// Substituted when the value is absent or blank
    pub default: Option<&'static str>,
    pub checks: Vec<Check>,
    pub transforms: Vec<Transform>,
}

impl FieldRule {
    pub fn scalar(name: &'static str) -> Self {
        Self {
            name,
            shape: Shape::Scalar,
            optional: false,
            default: None,
            checks: Vec::new(),
            transforms: Vec::new(),
        }
    }

    pub fn list(name: &'static str) -> Self {
        Self {
            shape: Shape::List,
            ..Self::scalar(name)
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn default_value(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    /// Require `min..=max` characters
    pub fn length(self, min: u64, max: Option<u64>, message: &'static str) -> Self {
        self.check(Check::Length { min, max, message })
    }

    pub fn alphanumeric(self, message: &'static str) -> Self {
        self.check(Check::Alphanumeric { message })
    }

    pub fn iso_date(self, message: &'static str) -> Self {
        self.check(Check::IsoDate { message })
    }

    pub fn one_of(self, allowed: &'static [&'static str], message: &'static str) -> Self {
        self.check(Check::OneOf { allowed, message })
    }

    pub fn check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    pub fn trim(self) -> Self {
        self.transform(Transform::Trim)
    }

    pub fn escape(self) -> Self {
        self.transform(Transform::Escape)
    }

    pub fn to_date(self) -> Self {
        self.transform(Transform::ToDate)
    }

    /// Normalize record identifiers so stored references match stored ids
    pub fn canonical_id(self) -> Self {
        self.transform(Transform::CanonicalId)
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.transforms.push(transform);
        self
    }

    pub(crate) fn trims(&self) -> bool {
        self.transforms.contains(&Transform::Trim)
    }

    /// Value the checks look at: trimmed when the field trims
    pub(crate) fn checked_value<'v>(&self, value: &'v str) -> &'v str {
        if self.trims() {
            value.trim()
        } else {
            value
        }
    }

    /// Run every transform in declaration order
    pub(crate) fn sanitize(&self, value: &str) -> String {
        self.transforms
            .iter()
            .fold(value.to_string(), |acc, transform| transform.apply(&acc))
    }
}
