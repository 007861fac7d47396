use crate::abbrev::{self, AbbreviationSet};
use crate::pos::{self, PosSet};

/// One output row: what was found on a single English page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub title: String,
    pub pos: PosSet,
    pub abbreviations: AbbreviationSet,
}

impl ResultRecord {
    /// Runs both extractors over the page body.
    pub fn from_page(title: String, text: &str) -> Self {
        ResultRecord {
            title,
            pos: pos::classify(text),
            abbreviations: abbrev::extract(text),
        }
    }
}
