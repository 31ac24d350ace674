//! Request body validation.
//!
//! Bodies derive [`validator::Validate`] and are checked by the extractors in
//! [`crate::api::extract`] right after deserialization, so handlers only ever
//! see well-formed input. Every rule carries its own message naming the wire
//! field, which is what ends up in the `validation_error` response.

use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// Rejects values that are empty or whitespace only.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Flatten nested [`ValidationErrors`] into one stable, human-readable line.
pub fn describe(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect(errors, &mut messages);
    messages.sort();
    messages.dedup();
    messages.join("; ")
}

fn collect(errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(errs) => {
                out.extend(errs.iter().map(|err| match &err.message {
                    Some(message) => message.to_string(),
                    None => format!("{field} is invalid"),
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, out),
            ValidationErrorsKind::List(items) => {
                for inner in items.values() {
                    collect(inner, out);
                }
            }
        }
    }
}
