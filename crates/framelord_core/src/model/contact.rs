//! Contact payload.

use crate::model::note::{deserialize_tags, normalize_tags};
use crate::model::payload::Payload;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Free-form label such as `client` or `family`.
    #[serde(default)]
    pub relationship: String,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ContactPatch {
    pub name: Option<String>,
    pub email: Option<Option<String>>,
    pub relationship: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactValidationError {
    EmptyName,
}

impl Display for ContactValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "contact name cannot be empty"),
        }
    }
}

impl Error for ContactValidationError {}

impl Contact {
    /// Builds a contact with normalized tags.
    pub fn new(name: impl Into<String>, relationship: impl Into<String>, tags: &[&str]) -> Self {
        Self {
            name: name.into(),
            email: None,
            relationship: relationship.into(),
            tags: normalize_tags(tags),
        }
    }

    pub fn validate(&self) -> Result<(), ContactValidationError> {
        if self.name.trim().is_empty() {
            return Err(ContactValidationError::EmptyName);
        }
        Ok(())
    }
}

impl Payload for Contact {
    const ID_PREFIX: &'static str = "contact";
    type Patch = ContactPatch;

    fn apply_patch(&mut self, patch: Self::Patch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(relationship) = patch.relationship {
            self.relationship = relationship;
        }
        if let Some(tags) = patch.tags {
            self.tags = normalize_tags(&tags);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Contact, ContactPatch, ContactValidationError};
    use crate::model::payload::Payload;

    #[test]
    fn patched_tags_are_normalized() {
        let mut contact = Contact::new("Dana", "client", &["VIP"]);
        assert_eq!(contact.tags, vec!["vip"]);

        contact.apply_patch(ContactPatch {
            tags: Some(vec!["Lead".to_string(), "lead ".to_string()]),
            ..ContactPatch::default()
        });
        assert_eq!(contact.tags, vec!["lead"]);
        assert_eq!(contact.name, "Dana");
    }

    #[test]
    fn blank_name_fails_validation() {
        let contact = Contact::new(" ", "", &[]);
        assert_eq!(contact.validate(), Err(ContactValidationError::EmptyName));
    }
}
