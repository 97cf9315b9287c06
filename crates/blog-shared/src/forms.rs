//! Reader-submitted forms and their field-level validation.
//!
//! Every field defaults to empty so a missing field surfaces as a
//! "required" error on that field instead of a rejected request.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

const REQUIRED: &str = "required";

fn required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(REQUIRED).with_message("This field is required.".into()));
    }
    Ok(())
}

/// Share a post by email.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct EmailPostForm {
    #[serde(default)]
    #[validate(
        custom(function = "required"),
        length(max = 25, message = "Ensure this value has at most 25 characters.")
    )]
    pub name: String,

    #[serde(default)]
    #[validate(
        custom(function = "required"),
        email(message = "Enter a valid email address.")
    )]
    pub email: String,

    #[serde(default)]
    #[validate(
        custom(function = "required"),
        email(message = "Enter a valid email address.")
    )]
    pub to: String,

    #[serde(default)]
    pub comments: String,
}

impl EmailPostForm {
    pub fn cleaned(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            to: self.to.trim().to_string(),
            comments: self.comments.trim().to_string(),
        }
    }
}

/// Comment on a post.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CommentForm {
    #[serde(default)]
    #[validate(
        custom(function = "required"),
        length(max = 80, message = "Ensure this value has at most 80 characters.")
    )]
    pub name: String,

    #[serde(default)]
    #[validate(
        custom(function = "required"),
        email(message = "Enter a valid email address.")
    )]
    pub email: String,

    #[serde(default)]
    #[validate(custom(function = "required"))]
    pub body: String,
}

impl CommentForm {
    pub fn cleaned(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            body: self.body.trim().to_string(),
        }
    }
}

/// Full-text search query.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SearchForm {
    #[serde(default)]
    #[validate(custom(function = "required"))]
    pub query: String,
}

impl SearchForm {
    pub fn cleaned(self) -> Self {
        Self {
            query: self.query.trim().to_string(),
        }
    }
}

/// Error messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, name: &str) -> &[String] {
        self.0.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, name: &str) -> bool {
        !self.field(name).is_empty()
    }
}

impl From<&ValidationErrors> for FormErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut fields = BTreeMap::new();

        for (field, errs) in errors.field_errors() {
            // A missing value only reports that it is required.
            let messages: Vec<String> = match errs.iter().find(|e| e.code == REQUIRED) {
                Some(err) => vec![message_of(err)],
                None => errs.iter().map(message_of).collect(),
            };
            fields.insert(field.to_string(), messages);
        }

        FormErrors(fields)
    }
}

fn message_of(error: &ValidationError) -> String {
    error
        .message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| format!("Invalid value ({})", error.code))
}

/// Trim and validate a form, returning the cleaned form or its field errors.
pub fn clean<F, C>(form: F, cleaned: C) -> Result<F, (F, FormErrors)>
where
    F: Validate,
    C: FnOnce(F) -> F,
{
    let form = cleaned(form);
    match form.validate() {
        Ok(()) => Ok(form),
        Err(errors) => {
            let errors = FormErrors::from(&errors);
            Err((form, errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(name: &str, email: &str, body: &str) -> CommentForm {
        CommentForm {
            name: name.into(),
            email: email.into(),
            body: body.into(),
        }
    }

    #[test]
    fn valid_comment_passes_after_trimming() {
        let form = clean(comment("  Ann ", " ann@example.com ", " Nice post "), CommentForm::cleaned)
            .unwrap();
        assert_eq!(form.name, "Ann");
        assert_eq!(form.email, "ann@example.com");
        assert_eq!(form.body, "Nice post");
    }

    #[test]
    fn missing_email_reports_only_required() {
        let (_, errors) = clean(comment("Ann", "", "Nice"), CommentForm::cleaned).unwrap_err();
        assert_eq!(errors.field("email"), ["This field is required."]);
        assert!(!errors.has("name"));
        assert!(!errors.has("body"));
    }

    #[test]
    fn comment_name_is_bounded() {
        let long = "n".repeat(81);
        let (_, errors) = clean(comment(&long, "a@b.io", "x"), CommentForm::cleaned).unwrap_err();
        assert!(errors.has("name"));
    }

    #[test]
    fn share_form_checks_both_addresses() {
        let form = EmailPostForm {
            name: "Ann".into(),
            email: "not-an-address".into(),
            to: "".into(),
            comments: "".into(),
        };
        let (_, errors) = clean(form, EmailPostForm::cleaned).unwrap_err();
        assert_eq!(errors.field("email"), ["Enter a valid email address."]);
        assert_eq!(errors.field("to"), ["This field is required."]);
        assert!(!errors.has("comments"));
    }

    #[test]
    fn share_name_is_limited_to_25_characters() {
        let form = EmailPostForm {
            name: "x".repeat(26),
            email: "a@b.io".into(),
            to: "c@d.io".into(),
            comments: String::new(),
        };
        assert!(clean(form, EmailPostForm::cleaned).is_err());
    }

    #[test]
    fn blank_search_query_is_invalid() {
        let form = SearchForm { query: "   ".into() };
        let (form, errors) = clean(form, SearchForm::cleaned).unwrap_err();
        assert_eq!(form.query, "");
        assert!(errors.has("query"));
    }

    #[test]
    fn missing_fields_deserialize_as_empty() {
        let form: CommentForm = serde_json::from_str(r#"{"name": "Ann"}"#).unwrap();
        assert_eq!(form.email, "");
        assert_eq!(form.body, "");
    }
}
