//! Note payload and tag normalization rules.
//!
//! # Invariants
//! - `tags` are lowercase, trimmed, deduplicated, and sorted.
//! - `preview_text` / `preview_image` are derived from `content` by the note
//!   service; the payload itself never recomputes them.

use crate::model::payload::Payload;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// How the note came into existence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteSource {
    #[default]
    Manual,
    /// Converted from analysis output.
    AiConversion,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(default)]
    pub title: String,
    /// Markdown body.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub preview_text: Option<String>,
    #[serde(default)]
    pub preview_image: Option<String>,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub source: NoteSource,
}

/// `preview_*` fields use a nested option: `Some(None)` clears the value.
#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub preview_text: Option<Option<String>>,
    pub preview_image: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub source: Option<NoteSource>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    EmptyNote,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyNote => write!(f, "note needs a title or content"),
        }
    }
}

impl Error for NoteValidationError {}

impl Note {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    /// A note needs a title or some content.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.title.trim().is_empty() && self.content.trim().is_empty() {
            return Err(NoteValidationError::EmptyNote);
        }
        Ok(())
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|value| value == tag)
    }
}

impl Payload for Note {
    const ID_PREFIX: &'static str = "note";
    type Patch = NotePatch;

    fn apply_patch(&mut self, patch: Self::Patch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(preview_text) = patch.preview_text {
            self.preview_text = preview_text;
        }
        if let Some(preview_image) = patch.preview_image {
            self.preview_image = preview_image;
        }
        if let Some(tags) = patch.tags {
            self.tags = normalize_tags(&tags);
        }
        if let Some(source) = patch.source {
            self.source = source;
        }
    }
}

/// Normalizes one tag value. Blank input yields `None`.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes, deduplicates, and sorts tag values.
pub fn normalize_tags<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    tags.iter()
        .filter_map(|tag| normalize_tag(tag.as_ref()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Decodes a tag list and normalizes it, so imported data obeys the same rules.
pub(crate) fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    Ok(normalize_tags(&raw))
}

#[cfg(test)]
mod tests {
    use super::{normalize_tag, normalize_tags, Note, NotePatch, NoteValidationError};
    use crate::model::payload::Payload;

    #[test]
    fn normalize_tags_lowercases_and_dedupes() {
        let tags = normalize_tags(&[" Work ", "work", "", "Family"]);
        assert_eq!(tags, vec!["family", "work"]);
        assert_eq!(normalize_tag("   "), None);
    }

    #[test]
    fn blank_note_fails_validation() {
        assert_eq!(
            Note::new(" ", "\n").validate(),
            Err(NoteValidationError::EmptyNote)
        );
        assert!(Note::new("", "body").validate().is_ok());
    }

    #[test]
    fn patched_and_decoded_tags_are_normalized() {
        let mut note = Note::new("t", "body");
        note.apply_patch(NotePatch {
            tags: Some(vec!["Work".to_string(), " zeta".to_string()]),
            ..NotePatch::default()
        });
        assert_eq!(note.tags, vec!["work", "zeta"]);

        let decoded: Note =
            serde_json::from_str(r#"{"content": "x", "tags": ["B", "a ", "b"]}"#).unwrap();
        assert_eq!(decoded.tags, vec!["a", "b"]);
    }

    #[test]
    fn patch_can_clear_preview() {
        let mut note = Note::new("t", "body");
        note.preview_text = Some("body".to_string());
        note.apply_patch(NotePatch {
            preview_text: Some(None),
            ..NotePatch::default()
        });
        assert_eq!(note.preview_text, None);
        assert_eq!(note.content, "body");
    }
}
