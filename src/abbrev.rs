//! Abbreviation extraction from `{{initialism ...}}`-style templates.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;

lazy_static! {
    // Each form is scanned on its own so overlapping templates of different
    // kinds are all picked up. Payload ends at the first `}}` on the same line.
    static ref ABBREVIATION_TEMPLATES: Vec<(&'static str, Regex)> = vec![
        ("initialism", Regex::new(r"\{\{initialism (.*?)\}\}").unwrap()),
        ("abbreviation", Regex::new(r"\{\{abbreviation (.*?)\}\}").unwrap()),
        ("acronym", Regex::new(r"\{\{acronym (.*?)\}\}").unwrap()),
    ];
}

/// Deduplicated expansions for one page.
///
/// Kept sorted so the same page always serializes the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbbreviationSet(BTreeSet<String>);

impl AbbreviationSet {
    pub fn insert(&mut self, value: impl Into<String>) -> bool {
        self.0.insert(value.into())
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.contains(value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for AbbreviationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            f.write_str(value)?;
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<S> for AbbreviationSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        AbbreviationSet(iter.into_iter().map(Into::into).collect())
    }
}

/// First `|` field of a template payload, whitespace-trimmed.
fn first_field(payload: &str) -> &str {
    payload.split('|').next().unwrap_or(payload).trim()
}

pub fn extract(text: &str) -> AbbreviationSet {
    let mut found = AbbreviationSet::default();
    for (template_name, regex) in ABBREVIATION_TEMPLATES.iter() {
        for cap in regex.captures_iter(text) {
            let value = first_field(&cap[1]);
            if found.insert(value) {
                log::trace!("{{{{{}}}}} -> {:?}", template_name, value);
            }
        }
    }
    found
}
