//! Field-by-field decoding of note metadata documents.
//!
//! The full-note endpoint returns a loosely shaped JSON object. Each field is
//! checked individually so that a wrong-shaped response produces an error
//! naming the offending field instead of a generic deserialization failure.

use jiff::Timestamp;
use serde_json::{Map, Value};

use crate::error::{JournalError, Result};
use crate::types::{Attachment, AttachmentKind};

/// Metadata of a single note, without its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteMetadata {
    pub id: String,
    pub tags: Vec<String>,
    pub created_at: Timestamp,
    pub attachments: Vec<Attachment>,
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn malformed(message: String) -> JournalError {
    JournalError::MalformedResponse(message)
}

fn required_str<'a>(obj: &'a Map<String, Value>, field: &str, context: &str) -> Result<&'a str> {
    match obj.get(field) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(malformed(format!(
            "{context}: field `{field}` must be a string, found {}",
            kind_of(other)
        ))),
        None => Err(malformed(format!("{context}: missing field `{field}`"))),
    }
}

fn optional_str(obj: &Map<String, Value>, field: &str, context: &str) -> Result<Option<String>> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(malformed(format!(
            "{context}: field `{field}` must be a string, found {}",
            kind_of(other)
        ))),
    }
}

fn optional_array<'a>(
    obj: &'a Map<String, Value>,
    field: &str,
    context: &str,
) -> Result<&'a [Value]> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(malformed(format!(
            "{context}: field `{field}` must be an array, found {}",
            kind_of(other)
        ))),
    }
}

fn decode_tags(obj: &Map<String, Value>, context: &str) -> Result<Vec<String>> {
    optional_array(obj, "tags", context)?
        .iter()
        .enumerate()
        .map(|(i, tag)| match tag {
            Value::String(s) => Ok(s.clone()),
            other => Err(malformed(format!(
                "{context}: tags[{i}] must be a string, found {}",
                kind_of(other)
            ))),
        })
        .collect()
}

fn decode_attachments(
    obj: &Map<String, Value>,
    field: &str,
    text_field: &str,
    kind: AttachmentKind,
    context: &str,
) -> Result<Vec<Attachment>> {
    optional_array(obj, field, context)?
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let item_context = format!("{context}: {field}[{i}]");
            let Value::Object(item) = item else {
                return Err(malformed(format!(
                    "{item_context} must be an object, found {}",
                    kind_of(item)
                )));
            };
            Ok(Attachment {
                kind,
                url: required_str(item, "url", &item_context)?.to_string(),
                text: optional_str(item, text_field, &item_context)?,
            })
        })
        .collect()
}

/// Decode a note metadata document.
pub fn decode_note(value: &Value) -> Result<NoteMetadata> {
    let Value::Object(obj) = value else {
        return Err(malformed(format!(
            "note must be an object, found {}",
            kind_of(value)
        )));
    };

    let id = required_str(obj, "id", "note")?.to_string();
    let context = format!("note {id}");

    let created_raw = required_str(obj, "created_at", &context)?;
    let created_at: Timestamp = created_raw.parse().map_err(|e| {
        malformed(format!(
            "{context}: field `created_at` is not a timestamp ({created_raw}): {e}"
        ))
    })?;

    let tags = decode_tags(obj, &context)?;

    let mut attachments = decode_attachments(
        obj,
        "images",
        "extracted_text",
        AttachmentKind::Image,
        &context,
    )?;
    attachments.extend(decode_attachments(
        obj,
        "audios",
        "transcribed_text",
        AttachmentKind::Audio,
        &context,
    )?);

    Ok(NoteMetadata {
        id,
        tags,
        created_at,
        attachments,
    })
}
