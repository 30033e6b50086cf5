//! Input forms for sharing, commenting and searching.
//!
//! Forms deserialize leniently (missing fields become empty strings) so that
//! every problem is reported as a field error instead of a rejected request.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// Field name to error messages, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn into_map(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }

    /// Merge validator output, skipping fields already reported as missing.
    fn absorb(&mut self, errors: ValidationErrors) {
        for (field, field_errors) in errors.field_errors() {
            if self.has(&field) {
                continue;
            }
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({}).", error.code));
                self.add(field.to_string(), message);
            }
        }
    }
}

/// A form whose cleaned value is a trimmed copy of itself.
pub trait Form: Validate + Clone {
    /// Names of fields that must be non-empty after trimming.
    const REQUIRED: &'static [&'static str];

    fn trimmed(&self) -> Self;

    fn field(&self, name: &str) -> &str;

    /// Trim, check required fields, then run the declarative validators.
    fn clean(&self) -> Result<Self, FormErrors> {
        let cleaned = self.trimmed();
        let mut errors = FormErrors::default();

        for name in Self::REQUIRED {
            if cleaned.field(name).is_empty() {
                errors.add(*name, REQUIRED_MESSAGE);
            }
        }
        if let Err(validation) = cleaned.validate() {
            errors.absorb(validation);
        }

        if errors.is_empty() {
            Ok(cleaned)
        } else {
            Err(errors)
        }
    }
}

/// Recommend a post to someone by email.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct EmailPostForm {
    #[serde(default)]
    #[validate(length(max = 25, message = "Ensure this value has at most 25 characters."))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address."))]
    pub to: String,
    #[serde(default)]
    pub comments: String,
}

impl Form for EmailPostForm {
    const REQUIRED: &'static [&'static str] = &["name", "email", "to"];

    fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            to: self.to.trim().to_string(),
            comments: self.comments.trim().to_string(),
        }
    }

    fn field(&self, name: &str) -> &str {
        match name {
            "name" => &self.name,
            "email" => &self.email,
            "to" => &self.to,
            "comments" => &self.comments,
            _ => "",
        }
    }
}

/// A reader's comment on a post.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct CommentForm {
    #[serde(default)]
    #[validate(length(max = 80, message = "Ensure this value has at most 80 characters."))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[serde(default)]
    pub body: String,
}

impl Form for CommentForm {
    const REQUIRED: &'static [&'static str] = &["name", "email", "body"];

    fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            body: self.body.trim().to_string(),
        }
    }

    fn field(&self, name: &str) -> &str {
        match name {
            "name" => &self.name,
            "email" => &self.email,
            "body" => &self.body,
            _ => "",
        }
    }
}

/// Full-text search box.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct SearchForm {
    #[serde(default)]
    pub query: String,
}

impl Form for SearchForm {
    const REQUIRED: &'static [&'static str] = &["query"];

    fn trimmed(&self) -> Self {
        Self {
            query: self.query.trim().to_string(),
        }
    }

    fn field(&self, name: &str) -> &str {
        match name {
            "query" => &self.query,
            _ => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn share_form() -> EmailPostForm {
        EmailPostForm {
            name: " Ann ".to_string(),
            email: "ann@example.com".to_string(),
            to: "bob@example.com".to_string(),
            comments: String::new(),
        }
    }

    #[test]
    fn test_share_form_valid_and_trimmed() {
        let cleaned = share_form().clean().unwrap();
        assert_eq!(cleaned.name, "Ann");
        assert!(cleaned.comments.is_empty());
    }

    #[test]
    fn test_share_form_reports_each_field() {
        let form = EmailPostForm {
            name: "x".repeat(26),
            email: String::new(),
            to: "not-an-address".to_string(),
            comments: "hi".to_string(),
        };
        let errors = form.clean().unwrap_err();
        assert_eq!(
            errors.get("name"),
            ["Ensure this value has at most 25 characters."]
        );
        assert_eq!(errors.get("email"), [REQUIRED_MESSAGE]);
        assert_eq!(errors.get("to"), ["Enter a valid email address."]);
        assert!(!errors.has("comments"));
    }

    #[test]
    fn test_comment_form_requires_body() {
        let form = CommentForm {
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
            body: "   ".to_string(),
        };
        let errors = form.clean().unwrap_err();
        assert_eq!(errors.get("body"), [REQUIRED_MESSAGE]);
    }

    #[test]
    fn test_search_form_rejects_blank_query() {
        assert!(SearchForm::default().clean().is_err());
        let cleaned = SearchForm {
            query: " rust ".to_string(),
        }
        .clean()
        .unwrap();
        assert_eq!(cleaned.query, "rust");
    }
}
