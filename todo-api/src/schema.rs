/// Request body validation
///
/// Bodies go through three checks before a handler sees a typed request:
///
/// 1. the body must be a JSON object
/// 2. every known field that is present must have the right JSON type
///    (explicit `null` is rejected, text is trimmed and must not be blank)
/// 3. the typed request is checked with its `validator` rules
///
/// All failures come back as [`FieldErrors`], so clients get every problem
/// with a request in one response.

use crate::error::FieldErrors;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use validator::{Validate, ValidationErrors};

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const NULL_MESSAGE: &str = "This field may not be null.";
pub const BLANK_MESSAGE: &str = "This field may not be blank.";

/// JSON type expected for a body field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Non-blank string, stored without surrounding whitespace
    Text,
    Boolean,
}

impl FieldKind {
    fn check(self, value: &Value) -> Option<&'static str> {
        match (self, value) {
            (_, Value::Null) => Some(NULL_MESSAGE),
            (FieldKind::Text, Value::String(s)) if s.is_empty() => Some(BLANK_MESSAGE),
            (FieldKind::Text, Value::String(_)) => None,
            (FieldKind::Text, _) => Some("Not a valid string."),
            (FieldKind::Boolean, Value::Bool(_)) => None,
            (FieldKind::Boolean, _) => Some("Must be a valid boolean."),
        }
    }
}

/// A typed request body with a field table for shape checks
pub trait RequestSchema: DeserializeOwned + Validate {
    /// Known fields and their expected JSON types
    const FIELDS: &'static [(&'static str, FieldKind)];
}

/// Validates `body` and converts it into `T`.
pub fn parse<T: RequestSchema>(body: Value) -> Result<T, FieldErrors> {
    let mut object = match body {
        Value::Object(object) => object,
        other => {
            let mut errors = FieldErrors::new();
            errors.insert(
                "non_field_errors".to_string(),
                vec![format!(
                    "Invalid data. Expected a dictionary, but got {}.",
                    json_kind(&other)
                )],
            );
            return Err(errors);
        }
    };

    trim_text_fields(&mut object, T::FIELDS);

    let errors = check_fields(&object, T::FIELDS);
    if !errors.is_empty() {
        return Err(errors);
    }

    let request: T = serde_json::from_value(Value::Object(object)).map_err(|e| {
        let mut errors = FieldErrors::new();
        errors.insert("non_field_errors".to_string(), vec![e.to_string()]);
        errors
    })?;

    request.validate().map_err(collect_validation_errors)?;
    Ok(request)
}

/// Length and blank checks apply to the trimmed value.
fn trim_text_fields(object: &mut Map<String, Value>, fields: &[(&'static str, FieldKind)]) {
    for (name, kind) in fields {
        if *kind != FieldKind::Text {
            continue;
        }
        if let Some(Value::String(text)) = object.get_mut(*name) {
            let trimmed = text.trim();
            if trimmed.len() != text.len() {
                *text = trimmed.to_string();
            }
        }
    }
}

fn check_fields(object: &Map<String, Value>, fields: &[(&'static str, FieldKind)]) -> FieldErrors {
    let mut errors = FieldErrors::new();

    for (name, kind) in fields {
        if let Some(message) = object.get(*name).and_then(|value| kind.check(value)) {
            errors
                .entry(name.to_string())
                .or_default()
                .push(message.to_string());
        }
    }

    errors
}

fn collect_validation_errors(errors: ValidationErrors) -> FieldErrors {
    let mut collected = FieldErrors::new();

    for (field, field_errors) in errors.field_errors() {
        let messages = collected.entry(field.to_string()).or_default();
        for error in field_errors.iter() {
            messages.push(
                error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Invalid value.".to_string()),
            );
        }
    }

    collected
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
