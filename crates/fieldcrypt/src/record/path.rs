//! Sensitive field paths and the named field sets built from them.

use std::collections::HashMap;

use thiserror::Error;

/// Fields holding an employee's bank account details.
pub const BANK_DETAIL_FIELDS: &[&str] = &["bank_name", "bank_account_number", "ifsc_code"];

/// Fields holding identity document numbers.
pub const DOCUMENT_FIELDS: &[&str] = &["document_number"];

/// Errors raised while building a [`FieldSet`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    /// A field set was given no paths.
    #[error("field set is empty")]
    NoFields,

    /// A path has an empty segment (`""`, `"a..b"`, `"[]"`).
    #[error("field path {0:?} has an empty segment")]
    EmptySegment(String),

    /// A path ends in `[]` and therefore names an array, not a field.
    #[error("field path {0:?} must end in a field name")]
    EndsInArray(String),
}

/// One step of a dot-notation field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PathSegment {
    /// Navigate into an object property by name.
    Key(String),
    /// Expand into every element of a JSON array.
    ArrayItem,
}

/// A parsed field path such as `"documents[].document_number"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    pub(crate) segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Parse a dot-notation path.
    ///
    /// Array fields use the `[]` suffix before the dot separator, e.g.
    /// `"orders[].card_number"` → `[Key("orders"), ArrayItem, Key("card_number")]`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] for empty segments or a trailing `[]`.
    pub fn parse(raw: &str) -> Result<Self, RecordError> {
        let mut segments = Vec::new();
        for part in raw.split('.') {
            let (key, is_array) = match part.strip_suffix("[]") {
                Some(key) => (key, true),
                None => (part, false),
            };
            if key.is_empty() {
                return Err(RecordError::EmptySegment(raw.to_owned()));
            }
            segments.push(PathSegment::Key(key.to_owned()));
            if is_array {
                segments.push(PathSegment::ArrayItem);
            }
        }
        if matches!(segments.last(), Some(PathSegment::ArrayItem)) {
            return Err(RecordError::EndsInArray(raw.to_owned()));
        }
        Ok(Self {
            raw: raw.to_owned(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// The fixed list of sensitive fields for one kind of record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSet {
    paths: Vec<FieldPath>,
}

impl FieldSet {
    /// Build a field set from dot-notation paths. Duplicate paths are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NoFields`] for an empty list, or the first path
    /// parse error.
    pub fn new<I, S>(paths: I) -> Result<Self, RecordError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed: Vec<FieldPath> = Vec::new();
        for p in paths {
            let path = FieldPath::parse(p.as_ref())?;
            if !parsed.contains(&path) {
                parsed.push(path);
            }
        }
        if parsed.is_empty() {
            return Err(RecordError::NoFields);
        }
        Ok(Self { paths: parsed })
    }

    /// `bank_name`, `bank_account_number`, `ifsc_code`.
    pub fn bank_details() -> Self {
        Self::from_static(BANK_DETAIL_FIELDS.iter().copied())
    }

    /// `document_number`.
    pub fn employee_document() -> Self {
        Self::from_static(DOCUMENT_FIELDS.iter().copied())
    }

    /// Bank details plus `document_number` inside every `documents[]` entry.
    pub fn employee() -> Self {
        Self::from_static(
            BANK_DETAIL_FIELDS
                .iter()
                .copied()
                .chain(["documents[].document_number"]),
        )
    }

    // Only for the compiled-in lists above, which are known to parse.
    fn from_static<'a>(paths: impl Iterator<Item = &'a str>) -> Self {
        Self {
            paths: paths
                .filter_map(|p| FieldPath::parse(p).ok())
                .collect(),
        }
    }

    pub fn paths(&self) -> &[FieldPath] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// The profiles available when no profile file is configured.
pub fn builtin_profiles() -> HashMap<String, FieldSet> {
    HashMap::from([
        ("bank_details".to_owned(), FieldSet::bank_details()),
        ("employee_document".to_owned(), FieldSet::employee_document()),
        ("employee".to_owned(), FieldSet::employee()),
    ])
}
