//! Part-of-speech detection from section headers.

use std::fmt;

/// Closed POS vocabulary, declared in canonical output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PosTag {
    Adjective,
    Adverb,
    Noun,
    Verb,
}

impl PosTag {
    pub const ALL: [PosTag; 4] = [PosTag::Adjective, PosTag::Adverb, PosTag::Noun, PosTag::Verb];

    /// Level-3 header that marks this part of speech in wikitext.
    pub fn section_marker(self) -> &'static str {
        match self {
            PosTag::Adjective => "===Adjective===",
            PosTag::Adverb => "===Adverb===",
            PosTag::Noun => "===Noun===",
            PosTag::Verb => "===Verb===",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            PosTag::Adjective => "adj",
            PosTag::Adverb => "adv",
            PosTag::Noun => "noun",
            PosTag::Verb => "verb",
        }
    }
}

impl fmt::Display for PosTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Tags found on one page, always in `PosTag::ALL` order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PosSet(Vec<PosTag>);

impl PosSet {
    pub fn tags(&self) -> &[PosTag] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, tag: PosTag) -> bool {
        self.0.contains(&tag)
    }
}

/// Renders as the `|`-joined codes, e.g. `noun|verb`.
impl fmt::Display for PosSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tag) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            f.write_str(tag.code())?;
        }
        Ok(())
    }
}

/// Plain substring checks; header nesting and position are not inspected.
pub fn classify(text: &str) -> PosSet {
    PosSet(
        PosTag::ALL
            .iter()
            .copied()
            .filter(|tag| text.contains(tag.section_marker()))
            .collect(),
    )
}
