use serde::{Deserialize, Serialize};

/// Lifecycle state of a catalog entry.
///
/// `Finished` is the default state and is not written to disk; the other
/// three map to the `type` attribute of the `<translation>` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStatus {
    Unfinished,
    Finished,
    Obsolete,
    Vanished,
}

impl MessageStatus {
    pub(crate) fn from_type_attr(value: &str) -> Option<Self> {
        match value {
            "unfinished" => Some(Self::Unfinished),
            "obsolete" => Some(Self::Obsolete),
            "vanished" => Some(Self::Vanished),
            _ => None,
        }
    }

    pub(crate) fn type_attr(self) -> Option<&'static str> {
        match self {
            Self::Unfinished => Some("unfinished"),
            Self::Finished => None,
            Self::Obsolete => Some("obsolete"),
            Self::Vanished => Some("vanished"),
        }
    }

    /// Retired entries are kept for round-trips and reuse but are invisible
    /// to runtime lookups.
    pub fn is_retired(self) -> bool {
        matches!(self, Self::Obsolete | Self::Vanished)
    }
}

/// Reference back to the place in the host sources where a string was seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl Location {
    pub fn new(filename: impl Into<String>, line: u32) -> Self {
        Self {
            filename: filename.into(),
            line: Some(line),
        }
    }
}

/// Translation payload: a plain string, or one form per plural category of
/// the catalog language (in form-index order).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    Single(String),
    Plural(Vec<String>),
}

impl Translation {
    pub fn is_plural(&self) -> bool {
        matches!(self, Self::Plural(_))
    }

    /// True when no translator text has been entered yet.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(text) => text.is_empty(),
            Self::Plural(forms) => forms.iter().all(|form| form.is_empty()),
        }
    }

    pub(crate) fn empty_plural(form_count: usize) -> Self {
        Self::Plural(vec![String::new(); form_count])
    }
}

/// One translatable unit.
///
/// Identity within a context is the pair `(source, comment)`; a message with
/// no disambiguating comment and one with an empty comment are distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub source: String,
    /// Disambiguator separating messages with identical source text.
    pub comment: Option<String>,
    pub locations: Vec<Location>,
    /// Developer note for the translator, refreshed on every extraction.
    pub extracomment: Option<String>,
    /// Free text written by the translator, preserved across extractions.
    pub translatorcomment: Option<String>,
    pub status: MessageStatus,
    pub translation: Translation,
    /// Attributes of the `<message>` element this engine does not interpret,
    /// preserved in declaration order for round-trips.
    pub extra: Vec<(String, String)>,
}

impl Message {
    /// Creates an untranslated non-plural message.
    pub fn new(source: impl Into<String>, comment: Option<String>) -> Self {
        Self {
            source: source.into(),
            comment,
            locations: Vec::new(),
            extracomment: None,
            translatorcomment: None,
            status: MessageStatus::Unfinished,
            translation: Translation::Single(String::new()),
            extra: Vec::new(),
        }
    }

    /// Creates an untranslated plural message with `form_count` empty forms.
    pub fn new_plural(
        source: impl Into<String>,
        comment: Option<String>,
        form_count: usize,
    ) -> Self {
        Self {
            translation: Translation::empty_plural(form_count),
            ..Self::new(source, comment)
        }
    }

    pub fn is_plural(&self) -> bool {
        self.translation.is_plural()
    }
}
