use std::collections::HashMap;

use crate::message::Message;

/// Error conditions raised when assembling a catalog.
#[derive(Debug, PartialEq, Eq)]
pub enum CatalogError {
    DuplicateMessage {
        context: String,
        source: String,
        comment: Option<String>,
    },
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::DuplicateMessage {
                context,
                source,
                comment,
            } => write!(
                f,
                "duplicate message {source:?} (disambiguator {comment:?}) in context {context:?}"
            ),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Identity of a message within a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageKey {
    pub context: String,
    pub source: String,
    pub comment: Option<String>,
}

/// Named grouping of messages, usually one per originating UI component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsContext {
    pub name: String,
    pub messages: Vec<Message>,
}

impl TsContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            messages: Vec::new(),
        }
    }
}

/// Immutable, indexed collection of contexts and their messages.
///
/// A catalog never changes once built; language switches and extraction runs
/// publish a fresh catalog instead, so any number of readers may share one
/// through an `Arc` without coordination.
#[derive(Debug, Clone)]
pub struct Catalog {
    language: String,
    source_language: Option<String>,
    version: String,
    contexts: Vec<TsContext>,
    extra: Vec<(String, String)>,
    index: HashMap<MessageKey, (usize, usize)>,
}

impl Catalog {
    /// Creates an empty catalog for the given target language.
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            source_language: None,
            version: "2.1".to_string(),
            contexts: Vec::new(),
            extra: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Assembles a catalog from parsed or merged contexts, rejecting
    /// duplicate identity keys.
    pub fn from_contexts(
        language: impl Into<String>,
        source_language: Option<String>,
        version: impl Into<String>,
        extra: Vec<(String, String)>,
        contexts: Vec<TsContext>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self {
            language: language.into(),
            source_language,
            version: version.into(),
            contexts,
            extra,
            index: HashMap::new(),
        };
        catalog.index = build_index(&catalog.contexts, true)?;
        Ok(catalog)
    }

    /// Same as [`Catalog::from_contexts`] for callers that guarantee key
    /// uniqueness by construction (first entry wins on a collision).
    pub(crate) fn from_contexts_unchecked(
        language: impl Into<String>,
        source_language: Option<String>,
        version: impl Into<String>,
        extra: Vec<(String, String)>,
        contexts: Vec<TsContext>,
    ) -> Self {
        let mut catalog = Self {
            language: language.into(),
            source_language,
            version: version.into(),
            contexts,
            extra,
            index: HashMap::new(),
        };
        catalog.index = build_index(&catalog.contexts, false).unwrap_or_default();
        catalog
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn source_language(&self) -> Option<&str> {
        self.source_language.as_deref()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Attributes of the `<TS>` element this engine does not interpret.
    pub fn extra_attributes(&self) -> &[(String, String)] {
        &self.extra
    }

    /// Contexts in declaration order.
    pub fn contexts(&self) -> &[TsContext] {
        &self.contexts
    }

    pub fn context(&self, name: &str) -> Option<&TsContext> {
        self.contexts.iter().find(|context| context.name == name)
    }

    /// Point lookup by identity key. Retired entries are returned as well;
    /// runtime callers filter on status.
    pub fn lookup(&self, context: &str, source: &str, comment: Option<&str>) -> Option<&Message> {
        let key = MessageKey {
            context: context.to_string(),
            source: source.to_string(),
            comment: comment.map(str::to_string),
        };
        let (context_idx, message_idx) = *self.index.get(&key)?;
        Some(&self.contexts[context_idx].messages[message_idx])
    }

    /// All messages paired with their context name, in declaration order.
    pub fn messages(&self) -> impl Iterator<Item = (&str, &Message)> {
        self.contexts.iter().flat_map(|context| {
            context
                .messages
                .iter()
                .map(move |message| (context.name.as_str(), message))
        })
    }

    pub fn message_count(&self) -> usize {
        self.contexts
            .iter()
            .map(|context| context.messages.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.message_count() == 0
    }
}

fn build_index(
    contexts: &[TsContext],
    reject_duplicates: bool,
) -> Result<HashMap<MessageKey, (usize, usize)>, CatalogError> {
    let mut index = HashMap::new();
    for (context_idx, context) in contexts.iter().enumerate() {
        for (message_idx, message) in context.messages.iter().enumerate() {
            let key = MessageKey {
                context: context.name.clone(),
                source: message.source.clone(),
                comment: message.comment.clone(),
            };
            if index.contains_key(&key) {
                if reject_duplicates {
                    return Err(CatalogError::DuplicateMessage {
                        context: key.context,
                        source: key.source,
                        comment: key.comment,
                    });
                }
                continue;
            }
            index.insert(key, (context_idx, message_idx));
        }
    }
    Ok(index)
}
