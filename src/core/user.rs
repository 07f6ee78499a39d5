//! # User
//!
//! The single domain value that flows through the gateway, the repository
//! and the reconciler. Users are immutable: "editing" one means building a
//! new value with the `with_*` methods.
//!
//! Two users are the *same entity* when their `id`s match, and *unchanged*
//! only when every field matches. The reconciler relies on both notions.

use serde::{Deserialize, Serialize};

/// Label shown when a user has no name.
pub const UNKNOWN_USER: &str = "Unknown User";

/// Label shown when a user has no phone number.
pub const NO_PHONE: &str = "No phone number";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Server-assigned identifier. `0` means "not assigned yet".
    #[serde(default)]
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl User {
    /// Builds a user that has not been saved yet (`id` stays `0` until the
    /// server assigns one on create).
    pub fn create(name: impl Into<String>, email: impl Into<String>, phone: Option<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            email: email.into(),
            phone,
        }
    }

    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    pub fn with_email(self, email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..self
        }
    }

    pub fn with_phone(self, phone: Option<String>) -> Self {
        Self { phone, ..self }
    }

    /// The name, or a fallback label when the name is empty.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            UNKNOWN_USER
        } else {
            &self.name
        }
    }

    /// Loose check: the address contains both an `@` and a `.`.
    /// This is not RFC 5322 validation and is not meant to be.
    pub fn is_valid_email(&self) -> bool {
        self.email.contains('@') && self.email.contains('.')
    }

    /// Formats a 10-character phone as `(XXX) XXX-XXXX`.
    /// Any other length is returned unchanged.
    pub fn formatted_phone(&self) -> String {
        let Some(phone) = self.phone.as_deref() else {
            return NO_PHONE.to_string();
        };

        let chars: Vec<char> = phone.chars().collect();
        if chars.len() != 10 {
            return phone.to_string();
        }

        let area: String = chars[..3].iter().collect();
        let prefix: String = chars[3..6].iter().collect();
        let line: String = chars[6..].iter().collect();
        format!("({area}) {prefix}-{line}")
    }
}
