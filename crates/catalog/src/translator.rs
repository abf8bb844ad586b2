use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::message::{Message, MessageStatus, Translation};
use crate::placeholder::substitute;
use crate::plurals::{PluralError, PluralRuleSet};
use crate::store::Catalog;

/// Caller contract violations surfaced by [`Translator::translate`].
///
/// Everything else degrades: a missing or empty translation falls back to
/// the source text and is tallied on the missing counter instead of failing
/// the caller.
#[derive(Debug, PartialEq, Eq)]
pub enum TranslateError {
    NegativeCount(i64),
    CountRequired { context: String, source: String },
}

impl std::fmt::Display for TranslateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslateError::NegativeCount(count) => {
                write!(f, "plural count must be non-negative, got {count}")
            }
            TranslateError::CountRequired { context, source } => write!(
                f,
                "message {source:?} in context {context:?} is plural but no count was given"
            ),
        }
    }
}

impl std::error::Error for TranslateError {}

impl From<PluralError> for TranslateError {
    fn from(error: PluralError) -> Self {
        match error {
            PluralError::NegativeCount(count) => Self::NegativeCount(count),
        }
    }
}

/// Completeness summary for one catalog, consumed by maintenance tooling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogStats {
    pub contexts: usize,
    pub messages: usize,
    pub finished: usize,
    pub unfinished: usize,
    pub retired: usize,
    pub plural: usize,
}

/// Runtime lookup engine over one published catalog.
///
/// A translator is immutable and safe to share between reader threads; a
/// language change is a new catalog and a new translator published through
/// the host's own `Arc`, never an in-place mutation. In-flight calls finish
/// against whichever catalog they started with.
#[derive(Debug)]
pub struct Translator {
    catalog: Arc<Catalog>,
    rules: PluralRuleSet,
    missing: AtomicU64,
}

impl Translator {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let rules = PluralRuleSet::for_language(catalog.language());
        Self {
            catalog,
            rules,
            missing: AtomicU64::new(0),
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn plural_rules(&self) -> &PluralRuleSet {
        &self.rules
    }

    /// Resolves a translation, falling back to the source text on a miss.
    /// （取得翻譯字串，若缺少則回退至原始文字。）
    ///
    /// For plural messages `count` is required and selects the form; when no
    /// positional arguments are given the count itself is available as `%1`.
    /// Obsolete and vanished entries are treated as absent.
    pub fn translate(
        &self,
        context: &str,
        source: &str,
        disambiguator: Option<&str>,
        args: &[&str],
        count: Option<i64>,
    ) -> Result<String, TranslateError> {
        if let Some(count) = count {
            if count < 0 {
                return Err(TranslateError::NegativeCount(count));
            }
        }

        let message = self
            .catalog
            .lookup(context, source, disambiguator)
            .filter(|message| !message.status.is_retired());
        let Some(message) = message else {
            self.missing.fetch_add(1, Ordering::Relaxed);
            return Ok(render(source, args, count));
        };

        match &message.translation {
            Translation::Single(text) => {
                let template = if text.is_empty() {
                    self.missing.fetch_add(1, Ordering::Relaxed);
                    source
                } else {
                    text.as_str()
                };
                Ok(render(template, args, count))
            }
            Translation::Plural(forms) => {
                let count = count.ok_or_else(|| TranslateError::CountRequired {
                    context: context.to_string(),
                    source: source.to_string(),
                })?;
                let form = forms
                    .get(self.rules.select_form(count)?)
                    .map(String::as_str)
                    .unwrap_or("");
                let template = if form.is_empty() {
                    self.missing.fetch_add(1, Ordering::Relaxed);
                    source
                } else {
                    form
                };
                Ok(render(template, args, Some(count)))
            }
        }
    }

    /// Number of lookups that fell back to the source text so far.
    /// （回傳回退至原文的查詢次數。）
    pub fn missing_count(&self) -> u64 {
        self.missing.load(Ordering::Relaxed)
    }

    /// Per-catalog completeness statistics.
    /// （回傳翻譯目錄的完成度統計。）
    pub fn stats(&self) -> CatalogStats {
        let mut stats = CatalogStats {
            contexts: self.catalog.contexts().len(),
            messages: 0,
            finished: 0,
            unfinished: 0,
            retired: 0,
            plural: 0,
        };
        for (_, message) in self.catalog.messages() {
            stats.messages += 1;
            if message.is_plural() {
                stats.plural += 1;
            }
            match message.status {
                MessageStatus::Finished => stats.finished += 1,
                MessageStatus::Unfinished => stats.unfinished += 1,
                _ => stats.retired += 1,
            }
        }
        stats
    }

    /// Identity keys that still lack translator text, for reporting.
    pub fn unfinished_messages(&self) -> Vec<(&str, &Message)> {
        self.catalog
            .messages()
            .filter(|(_, message)| {
                message.status == MessageStatus::Unfinished
                    && message.translation.is_empty()
            })
            .collect()
    }
}

fn render(template: &str, args: &[&str], count: Option<i64>) -> String {
    match count {
        Some(count) if args.is_empty() => {
            let count = count.to_string();
            substitute(template, &[count.as_str()]).into_owned()
        }
        _ => substitute(template, args).into_owned(),
    }
}
