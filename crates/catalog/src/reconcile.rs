//! Extraction merge: reconciles a catalog against a fresh scan of the host
//! sources without losing translator work.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::message::{Location, Message, MessageStatus, Translation};
use crate::plurals::PluralRuleSet;
use crate::store::{Catalog, TsContext};

/// One observed use of a source string, produced by the external scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub context: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub plural: bool,
    pub location: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracomment: Option<String>,
}

#[derive(Debug, Default)]
struct PendingMessage {
    plural: bool,
    locations: Vec<Location>,
    extracomment: Option<String>,
}

#[derive(Debug, Default)]
struct PendingContext {
    order: Vec<(String, Option<String>)>,
    entries: HashMap<(String, Option<String>), PendingMessage>,
}

/// Merges freshly scanned occurrences into `prior`, producing the updated
/// catalog. （合併掃描結果並保留既有翻譯。）
///
/// Known keys keep their translation payload and status while locations and
/// extracomments are refreshed; unknown keys become unfinished entries; keys
/// that vanished are kept as obsolete when they carry translator text and
/// dropped otherwise. Retired entries whose key reappears are revived as
/// unfinished with their payload intact. Running the same scan twice yields
/// an identical catalog.
pub fn reconcile(prior: &Catalog, occurrences: &[Occurrence]) -> Catalog {
    let rules = PluralRuleSet::for_language(prior.language());

    // Group by identity key; first-seen order drives the output layout so
    // repeated runs produce minimal diffs.
    let mut context_order: Vec<String> = Vec::new();
    let mut pending: HashMap<String, PendingContext> = HashMap::new();
    for occurrence in occurrences {
        if !pending.contains_key(&occurrence.context) {
            context_order.push(occurrence.context.clone());
        }
        let context = pending.entry(occurrence.context.clone()).or_default();
        let key = (occurrence.source.clone(), occurrence.comment.clone());
        if !context.entries.contains_key(&key) {
            context.order.push(key.clone());
        }
        let entry = context.entries.entry(key).or_default();
        entry.plural |= occurrence.plural;
        if !entry.locations.contains(&occurrence.location) {
            entry.locations.push(occurrence.location.clone());
        }
        if entry.extracomment.is_none() {
            entry.extracomment = occurrence.extracomment.clone();
        }
    }

    let mut contexts: Vec<TsContext> = Vec::new();
    let mut merged_names: HashSet<String> = HashSet::new();
    for name in &context_order {
        let Some(acc) = pending.remove(name) else { continue };
        merged_names.insert(name.clone());
        let mut messages = Vec::new();
        let mut fresh_keys: HashSet<(String, Option<String>)> = HashSet::new();
        for (source, comment) in &acc.order {
            fresh_keys.insert((source.clone(), comment.clone()));
            let entry = &acc.entries[&(source.clone(), comment.clone())];
            let message = match prior.lookup(name, source, comment.as_deref()) {
                Some(previous) => carry_forward(previous, entry, &rules),
                None => fresh_message(source, comment.clone(), entry, &rules),
            };
            messages.push(message);
        }
        if let Some(previous) = prior.context(name) {
            messages.extend(retained_messages(previous, &fresh_keys));
        }
        contexts.push(TsContext {
            name: name.clone(),
            messages,
        });
    }

    // Contexts no longer present in the scan survive through their
    // translated entries alone.
    for previous in prior.contexts() {
        if merged_names.contains(&previous.name) {
            continue;
        }
        let messages = retained_messages(previous, &HashSet::new());
        if !messages.is_empty() {
            contexts.push(TsContext {
                name: previous.name.clone(),
                messages,
            });
        }
    }

    Catalog::from_contexts_unchecked(
        prior.language(),
        prior.source_language().map(str::to_string),
        prior.version(),
        prior.extra_attributes().to_vec(),
        contexts,
    )
}

fn carry_forward(previous: &Message, entry: &PendingMessage, rules: &PluralRuleSet) -> Message {
    let status = if previous.status.is_retired() {
        MessageStatus::Unfinished
    } else {
        previous.status
    };
    let (status, translation) = reshape(previous, entry.plural, status, rules);
    Message {
        source: previous.source.clone(),
        comment: previous.comment.clone(),
        locations: entry.locations.clone(),
        extracomment: entry.extracomment.clone(),
        translatorcomment: previous.translatorcomment.clone(),
        status,
        translation,
        extra: previous.extra.clone(),
    }
}

/// Rebuilds the payload when a message changed plural-ness between scans.
/// Existing text is kept (as the first form, or the first form's text) but
/// the entry drops back to unfinished for review.
fn reshape(
    previous: &Message,
    plural: bool,
    status: MessageStatus,
    rules: &PluralRuleSet,
) -> (MessageStatus, Translation) {
    match (&previous.translation, plural) {
        (Translation::Single(_), false) | (Translation::Plural(_), true) => {
            (status, previous.translation.clone())
        }
        (Translation::Single(text), true) => {
            let mut forms = vec![String::new(); rules.form_count()];
            if let Some(first) = forms.first_mut() {
                *first = text.clone();
            }
            (MessageStatus::Unfinished, Translation::Plural(forms))
        }
        (Translation::Plural(forms), false) => {
            let text = forms.first().cloned().unwrap_or_default();
            (MessageStatus::Unfinished, Translation::Single(text))
        }
    }
}

fn fresh_message(
    source: &str,
    comment: Option<String>,
    entry: &PendingMessage,
    rules: &PluralRuleSet,
) -> Message {
    let mut message = if entry.plural {
        Message::new_plural(source, comment, rules.form_count())
    } else {
        Message::new(source, comment)
    };
    message.locations = entry.locations.clone();
    message.extracomment = entry.extracomment.clone();
    message
}

/// Entries of `previous` missing from the fresh scan: translated ones are
/// kept as obsolete, never-translated ones are dropped.
fn retained_messages(
    previous: &TsContext,
    fresh_keys: &HashSet<(String, Option<String>)>,
) -> Vec<Message> {
    previous
        .messages
        .iter()
        .filter(|message| {
            !fresh_keys.contains(&(message.source.clone(), message.comment.clone()))
        })
        .filter(|message| !message.translation.is_empty())
        .map(|message| {
            let mut retained = (*message).clone();
            retained.status = MessageStatus::Obsolete;
            retained
        })
        .collect()
}
