//! Object-level helpers: apply the codec to every sensitive field of a record.
//!
//! # Policy
//!
//! - **Write:** every present, non-empty string field in the [`FieldSet`] is
//!   encrypted. Whitespace-only values become `null`. Any encryption failure
//!   aborts the whole record so nothing is persisted half-encrypted.
//! - **Read:** envelopes are replaced by their plaintext, legacy values are
//!   kept, and values that fail to authenticate are removed from the record.
//!   A failing field never stops its siblings from being read.
//!
//! Missing fields, non-string values, and paths that run into the wrong JSON
//! type are skipped silently.

pub mod bank;
pub mod path;

pub use bank::BankDetails;
pub use path::{builtin_profiles, FieldPath, FieldSet, RecordError};

use std::convert::Infallible;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::codec::{CodecError, FieldCodec, Opened};
use path::PathSegment;

/// What [`decrypt_record`] did to a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecryptReport {
    /// Envelopes that authenticated and were replaced by plaintext.
    pub decrypted: usize,
    /// Values left untouched because they were never encrypted.
    pub legacy: usize,
    /// Concrete paths (array indices filled in) removed because they failed
    /// to authenticate.
    pub omitted: Vec<String>,
}

/// Encrypt every sensitive field of `record` in place.
///
/// # Errors
///
/// Returns [`CodecError`] on the first field that fails to encrypt. The record
/// may then be partially encrypted and must be discarded by the caller.
pub fn encrypt_record(
    codec: &FieldCodec,
    record: &mut Value,
    fields: &FieldSet,
) -> Result<(), CodecError> {
    let mut seal_leaf = |map: &mut Map<String, Value>,
                         key: &str,
                         _at: String|
     -> Result<(), CodecError> {
        let sealed = match map.get(key) {
            Some(Value::String(s)) if !s.is_empty() => codec.encrypt(Some(s.as_str()))?,
            _ => return Ok(()),
        };
        map.insert(key.to_owned(), sealed.map_or(Value::Null, Value::String));
        Ok(())
    };

    for path in fields.paths() {
        visit(record, &path.segments, "", &mut seal_leaf)?;
    }
    Ok(())
}

/// Decrypt every sensitive field of `record` in place. Never fails.
pub fn decrypt_record(codec: &FieldCodec, record: &mut Value, fields: &FieldSet) -> DecryptReport {
    let mut report = DecryptReport::default();
    let mut open_leaf = |map: &mut Map<String, Value>,
                         key: &str,
                         at: String|
     -> Result<(), Infallible> {
        let opened = match map.get(key) {
            Some(Value::String(s)) if !s.is_empty() => codec.open(s),
            _ => return Ok(()),
        };
        match opened {
            Opened::Decrypted(plain) => {
                map.insert(key.to_owned(), Value::String(plain));
                report.decrypted += 1;
            }
            Opened::Legacy(_) => report.legacy += 1,
            Opened::Failed => {
                map.remove(key);
                report.omitted.push(at);
            }
        }
        Ok(())
    };

    for path in fields.paths() {
        if let Err(never) = visit(record, &path.segments, "", &mut open_leaf) {
            match never {}
        }
    }
    report
}

/// Follow `segments` through `value` and call `leaf` with the parent object
/// and key of every field the path reaches. `at` is the concrete path so far.
fn visit<E>(
    value: &mut Value,
    segments: &[PathSegment],
    at: &str,
    leaf: &mut dyn FnMut(&mut Map<String, Value>, &str, String) -> Result<(), E>,
) -> Result<(), E> {
    match segments {
        [] => Ok(()),
        [PathSegment::Key(key)] => match value {
            Value::Object(map) => leaf(map, key.as_str(), join(at, key)),
            _ => Ok(()),
        },
        [PathSegment::Key(key), rest @ ..] => {
            if let Some(child) = value.as_object_mut().and_then(|m| m.get_mut(key)) {
                visit(child, rest, &join(at, key), leaf)?;
            }
            Ok(())
        }
        [PathSegment::ArrayItem, rest @ ..] => {
            if let Value::Array(items) = value {
                for (i, item) in items.iter_mut().enumerate() {
                    visit(item, rest, &format!("{at}[{i}]"), leaf)?;
                }
            }
            Ok(())
        }
    }
}

fn join(at: &str, key: &str) -> String {
    if at.is_empty() {
        key.to_owned()
    } else {
        format!("{at}.{key}")
    }
}
