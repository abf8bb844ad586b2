use std::str::FromStr;

use icu_locid::Locale;
use icu_plurals::{PluralCategory, PluralOperands, PluralRules};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PluralError {
    #[error("plural count must be non-negative, got {0}")]
    NegativeCount(i64),
}

/// Cardinal plural rules for one catalog language.
///
/// Every plural message stores one form per CLDR cardinal category of the
/// catalog language; `select_form` maps a count to the index of the form to
/// display. Selection is total over non-negative counts: every count maps to
/// exactly one index in `0..form_count()`.
#[derive(Debug)]
pub struct PluralRuleSet {
    rules: Option<PluralRules>,
    categories: Vec<PluralCategory>,
    fallback: bool,
}

impl PluralRuleSet {
    /// Builds the rule set for a locale tag (`de_DE` and `de-DE` are both
    /// accepted). A tag that does not parse falls back to the two-form
    /// "one/other" rule; see [`PluralRuleSet::used_fallback`].
    pub fn for_language(tag: &str) -> Self {
        let locale = Locale::from_str(&tag.replace('_', "-")).ok();
        let rules = locale.and_then(|locale| PluralRules::try_new_cardinal(&locale.into()).ok());
        match rules {
            Some(rules) => {
                let mut categories: Vec<PluralCategory> = rules.categories().collect();
                categories.sort_by_key(|category| category_rank(*category));
                Self {
                    rules: Some(rules),
                    categories,
                    fallback: false,
                }
            }
            None => Self {
                rules: None,
                categories: vec![PluralCategory::One, PluralCategory::Other],
                fallback: true,
            },
        }
    }

    /// True when the locale tag was not recognized and the default rule is
    /// in effect. Not an error: lookups still succeed.
    pub fn used_fallback(&self) -> bool {
        self.fallback
    }

    /// Number of plural forms a message of this language carries.
    pub fn form_count(&self) -> usize {
        self.categories.len().max(1)
    }

    /// Maps a count to a form index in `0..form_count()`.
    pub fn select_form(&self, count: i64) -> Result<usize, PluralError> {
        if count < 0 {
            return Err(PluralError::NegativeCount(count));
        }
        let category = match &self.rules {
            Some(rules) => match PluralOperands::from_str(&count.to_string()) {
                Ok(operands) => rules.category_for(operands),
                Err(_) => PluralCategory::Other,
            },
            None if count == 1 => PluralCategory::One,
            None => PluralCategory::Other,
        };
        Ok(self
            .categories
            .iter()
            .position(|candidate| *candidate == category)
            .unwrap_or(0))
    }
}

fn category_rank(category: PluralCategory) -> u8 {
    match category {
        PluralCategory::Zero => 0,
        PluralCategory::One => 1,
        PluralCategory::Two => 2,
        PluralCategory::Few => 3,
        PluralCategory::Many => 4,
        PluralCategory::Other => 5,
    }
}
