//! Note use-case service.
//!
//! # Responsibility
//! - Create notes by hand or from analysis output.
//! - Derive markdown previews (`preview_text`, `preview_image`) on every
//!   content write.
//! - Replace tag sets with normalized values.
//!
//! # Invariants
//! - Content updates are full replacements and always recompute previews.
//! - Tags are lowercase, deduplicated, and sorted.

use crate::model::note::{normalize_tag, normalize_tags, Note, NotePatch, NoteSource};
use crate::model::record::{NewRecord, Record, RecordPatch};
use crate::store::NoteStore;
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const PREVIEW_MAX_CHARS: usize = 100;
const TITLE_MAX_CHARS: usize = 80;
const UNTITLED_NOTE: &str = "Untitled note";

static MARKDOWN_IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*]\(([^)]+)\)").expect("valid image regex"));
static MARKDOWN_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid link regex"));
static MARKDOWN_SYMBOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\*_`#>~\-\[\]\(\)!]+"#).expect("valid markdown symbol regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteServiceError {
    EmptyContent,
    InvalidTag(String),
    NoteNotFound(String),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyContent => write!(f, "note content cannot be empty"),
            Self::InvalidTag(value) => write!(f, "invalid tag: `{value}`"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
        }
    }
}

impl Error for NoteServiceError {}

/// Markdown-derived preview projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownPreview {
    pub preview_text: Option<String>,
    pub preview_image: Option<String>,
}

pub struct NoteService<'store> {
    store: &'store NoteStore,
}

impl<'store> NoteService<'store> {
    pub fn new(store: &'store NoteStore) -> Self {
        Self { store }
    }

    /// Creates a manual note with a derived preview.
    ///
    /// # Errors
    /// - `EmptyContent` when both title and content are blank.
    pub fn create_note(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
        owner_refs: &[&str],
    ) -> Result<Record<Note>, NoteServiceError> {
        let mut note = Note::new(title, content);
        note.validate().map_err(|_| NoteServiceError::EmptyContent)?;
        apply_preview(&mut note);
        Ok(self
            .store
            .add(NewRecord::new(note).with_owner_refs(owner_refs.iter().copied())))
    }

    /// Converts free-form analysis output into a note.
    ///
    /// The title is the first non-blank line with markdown stripped.
    pub fn create_from_ai_output(
        &self,
        text: &str,
        owner_refs: &[&str],
    ) -> Result<Record<Note>, NoteServiceError> {
        if text.trim().is_empty() {
            return Err(NoteServiceError::EmptyContent);
        }

        let mut note = Note::new(derive_title(text), text.trim());
        note.source = NoteSource::AiConversion;
        apply_preview(&mut note);
        let record = self
            .store
            .add(NewRecord::new(note).with_owner_refs(owner_refs.iter().copied()));
        info!(
            "event=note_convert module=service status=ok id={} owners={}",
            record.id,
            record.owner_refs.len()
        );
        Ok(record)
    }

    /// Replaces note content and recomputes its preview.
    ///
    /// # Errors
    /// - `NoteNotFound` when no note has `id`.
    /// - `EmptyContent` when the note would end up with a blank title and
    ///   blank content; the stored note is left unchanged.
    pub fn update_content(
        &self,
        id: &str,
        content: impl Into<String>,
    ) -> Result<Record<Note>, NoteServiceError> {
        let content = content.into();
        let mut candidate = self
            .store
            .get_by_id(id)
            .ok_or_else(|| NoteServiceError::NoteNotFound(id.to_string()))?
            .payload;
        candidate.content = content.clone();
        candidate
            .validate()
            .map_err(|_| NoteServiceError::EmptyContent)?;

        let preview = derive_markdown_preview(&content);
        let patch = NotePatch {
            content: Some(content),
            preview_text: Some(preview.preview_text),
            preview_image: Some(preview.preview_image),
            ..NotePatch::default()
        };
        self.store
            .update(id, RecordPatch::payload(patch))
            .ok_or_else(|| NoteServiceError::NoteNotFound(id.to_string()))
    }

    /// Replaces the full tag set of one note.
    pub fn set_tags(&self, id: &str, tags: &[&str]) -> Result<Record<Note>, NoteServiceError> {
        if let Some(blank) = tags.iter().find(|tag| tag.trim().is_empty()) {
            return Err(NoteServiceError::InvalidTag((*blank).to_string()));
        }
        let patch = NotePatch {
            tags: Some(normalize_tags(tags)),
            ..NotePatch::default()
        };
        self.store
            .update(id, RecordPatch::payload(patch))
            .ok_or_else(|| NoteServiceError::NoteNotFound(id.to_string()))
    }

    /// Notes carrying `tag`, most recent first. Blank tags match nothing.
    pub fn list_by_tag(&self, tag: &str) -> Vec<Record<Note>> {
        match normalize_tag(tag) {
            Some(tag) => self.store.filter(|record| record.payload.has_tag(&tag)),
            None => Vec::new(),
        }
    }

    /// Every tag in use, sorted.
    pub fn list_tags(&self) -> Vec<String> {
        self.store
            .get_all()
            .into_iter()
            .flat_map(|record| record.payload.tags)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn notes_for_owner(&self, owner: &str) -> Vec<Record<Note>> {
        self.store.get_by_owner_ref(owner)
    }
}

fn apply_preview(note: &mut Note) {
    let preview = derive_markdown_preview(&note.content);
    note.preview_text = preview.preview_text;
    note.preview_image = preview.preview_image;
}

/// Derives preview fields from markdown.
///
/// - `preview_image`: first markdown image path.
/// - `preview_text`: images removed, links unwrapped, markdown symbols
///   stripped, whitespace collapsed, first 100 chars.
pub fn derive_markdown_preview(content: &str) -> MarkdownPreview {
    let preview_image = MARKDOWN_IMAGE_RE
        .captures(content)
        .and_then(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
        .filter(|value| !value.is_empty());

    let plain = strip_markdown(content);
    let preview_text = if plain.is_empty() {
        None
    } else {
        Some(plain.chars().take(PREVIEW_MAX_CHARS).collect())
    };

    MarkdownPreview {
        preview_text,
        preview_image,
    }
}

/// First non-blank line of `text` as plain text, or a placeholder.
pub fn derive_title(text: &str) -> String {
    text.lines()
        .map(strip_markdown)
        .find(|line| !line.is_empty())
        .map(|line| line.chars().take(TITLE_MAX_CHARS).collect())
        .unwrap_or_else(|| UNTITLED_NOTE.to_string())
}

fn strip_markdown(content: &str) -> String {
    let without_images = MARKDOWN_IMAGE_RE.replace_all(content, " ");
    let without_links = MARKDOWN_LINK_RE.replace_all(&without_images, "$1");
    let without_symbols = MARKDOWN_SYMBOL_RE.replace_all(&without_links, " ");
    WHITESPACE_RE
        .replace_all(&without_symbols, " ")
        .trim()
        .to_string()
}
