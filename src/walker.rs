//! Streaming walk over the `<page>` elements of a MediaWiki XML dump.
//!
//! Only one page is held at a time: its title and text are captured while the
//! page is open and handed off (or dropped) on the page's end event. Element
//! names are compared by local name, so `<mw:page>` and `<page>` are the same.

use std::io::BufRead;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{ExtractError, Result};
use crate::record::ResultRecord;

/// Language header a page must contain to produce a record.
pub const ENGLISH_MARKER: &str = "==English==";

/// Counters kept while walking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Every closed `<page>`, whatever happened to it.
    pub pages: usize,
    /// Pages that produced a record.
    pub records: usize,
    pub non_english: usize,
    /// Pages without a title or without `revision/text`.
    pub incomplete: usize,
}

/// Role of an element open inside the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Title,
    Revision,
    Text,
    Other,
}

#[derive(Debug, Default)]
struct PageState {
    /// Elements open below `<page>`, innermost last.
    open: Vec<Slot>,
    title: Option<String>,
    text: Option<String>,
    capture: String,
}

impl PageState {
    fn classify(&self, name: &[u8]) -> Slot {
        match (self.open.last(), name) {
            (None, b"title") if self.title.is_none() => Slot::Title,
            (None, b"revision") => Slot::Revision,
            (Some(Slot::Revision), b"text") if self.text.is_none() => Slot::Text,
            _ => Slot::Other,
        }
    }

    fn open_child(&mut self, name: &[u8]) {
        let slot = self.classify(name);
        if matches!(slot, Slot::Title | Slot::Text) {
            self.capture.clear();
        }
        self.open.push(slot);
    }

    /// `<title/>` or `<text/>`: present but empty.
    fn empty_child(&mut self, name: &[u8]) {
        match self.classify(name) {
            Slot::Title => self.title = Some(String::new()),
            Slot::Text => self.text = Some(String::new()),
            _ => {}
        }
    }

    fn capturing(&self) -> bool {
        matches!(self.open.last(), Some(Slot::Title | Slot::Text))
    }

    /// Returns false once the stack is empty, i.e. the event closes `<page>` itself.
    fn close_child(&mut self) -> bool {
        match self.open.pop() {
            Some(Slot::Title) => self.title = Some(std::mem::take(&mut self.capture)),
            Some(Slot::Text) => self.text = Some(std::mem::take(&mut self.capture)),
            Some(_) => {}
            None => return false,
        }
        true
    }
}

enum Step {
    Continue,
    Record(ResultRecord),
    Done,
}

#[derive(Debug, Default)]
struct WalkState {
    depth: usize,
    seen_root: bool,
    page: Option<PageState>,
    stats: WalkStats,
}

impl WalkState {
    fn start(&mut self, name: &[u8]) {
        self.depth += 1;
        self.seen_root = true;
        match self.page.as_mut() {
            Some(page) => page.open_child(name),
            None if name == b"page" => self.page = Some(PageState::default()),
            None => {}
        }
    }

    fn empty(&mut self, name: &[u8]) {
        self.seen_root = true;
        match self.page.as_mut() {
            Some(page) => page.empty_child(name),
            None if name == b"page" => {
                self.stats.pages += 1;
                self.stats.incomplete += 1;
            }
            None => {}
        }
    }

    fn end(&mut self) -> std::result::Result<Step, String> {
        self.depth = self
            .depth
            .checked_sub(1)
            .ok_or_else(|| "closing tag without an opening tag".to_string())?;
        let Some(page) = self.page.as_mut() else {
            return Ok(Step::Continue);
        };
        if page.close_child() {
            return Ok(Step::Continue);
        }
        match self.page.take() {
            Some(page) => Ok(self.finish_page(page)),
            None => Ok(Step::Continue),
        }
    }

    fn finish_page(&mut self, page: PageState) -> Step {
        self.stats.pages += 1;
        let (title, text) = match (page.title, page.text) {
            (Some(title), Some(text)) if !title.is_empty() => (title, text),
            (title, _) => {
                log::debug!("skipping page {:?}: missing title or text", title);
                self.stats.incomplete += 1;
                return Step::Continue;
            }
        };
        if !text.contains(ENGLISH_MARKER) {
            self.stats.non_english += 1;
            return Step::Continue;
        }
        self.stats.records += 1;
        Step::Record(ResultRecord::from_page(title, &text))
    }

    fn eof(&self) -> std::result::Result<Step, String> {
        if !self.seen_root {
            Err("no root element".to_string())
        } else if self.depth != 0 {
            Err(format!("document ended with {} unclosed element(s)", self.depth))
        } else {
            Ok(Step::Done)
        }
    }
}

/// Lazy, forward-only sequence of records, one per English page.
///
/// Ends after the first error.
pub struct PageWalker<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    state: WalkState,
    finished: bool,
}

impl<R: BufRead> PageWalker<R> {
    pub fn new(reader: R) -> Self {
        PageWalker {
            reader: Reader::from_reader(reader),
            buf: Vec::new(),
            state: WalkState::default(),
            finished: false,
        }
    }

    pub fn stats(&self) -> &WalkStats {
        &self.state.stats
    }

    pub fn into_stats(self) -> WalkStats {
        self.state.stats
    }
}

impl<R: BufRead> Iterator for PageWalker<R> {
    type Item = Result<ResultRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            self.buf.clear();
            let step = match self.reader.read_event_into(&mut self.buf) {
                Ok(Event::Start(e)) => {
                    self.state.start(e.local_name().as_ref());
                    Ok(Step::Continue)
                }
                Ok(Event::Empty(e)) => {
                    self.state.empty(e.local_name().as_ref());
                    Ok(Step::Continue)
                }
                Ok(Event::Text(e)) => match self.state.page.as_mut() {
                    Some(page) if page.capturing() => match e.unescape() {
                        Ok(text) => {
                            page.capture.push_str(&text);
                            Ok(Step::Continue)
                        }
                        Err(source) => Err(ExtractError::Xml {
                            position: self.reader.buffer_position() as u64,
                            source,
                        }),
                    },
                    _ => Ok(Step::Continue),
                },
                Ok(Event::CData(e)) => match self.state.page.as_mut() {
                    Some(page) if page.capturing() => match std::str::from_utf8(&e) {
                        Ok(text) => {
                            page.capture.push_str(text);
                            Ok(Step::Continue)
                        }
                        Err(err) => Err(ExtractError::Malformed {
                            position: self.reader.buffer_position() as u64,
                            message: err.to_string(),
                        }),
                    },
                    _ => Ok(Step::Continue),
                },
                Ok(Event::End(_)) => self.state.end().map_err(|message| ExtractError::Malformed {
                    position: self.reader.buffer_position() as u64,
                    message,
                }),
                Ok(Event::Eof) => self.state.eof().map_err(|message| ExtractError::Malformed {
                    position: self.reader.buffer_position() as u64,
                    message,
                }),
                Ok(_) => Ok(Step::Continue),
                Err(source) => Err(ExtractError::Xml {
                    position: self.reader.buffer_position() as u64,
                    source,
                }),
            };

            match step {
                Ok(Step::Continue) => {}
                Ok(Step::Record(record)) => return Some(Ok(record)),
                Ok(Step::Done) => {
                    self.finished = true;
                    return None;
                }
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(xml: &str) -> (Vec<ResultRecord>, WalkStats) {
        let mut walker = PageWalker::new(xml.as_bytes());
        let records = walker.by_ref().collect::<Result<Vec<_>>>().unwrap();
        (records, walker.into_stats())
    }

    fn page(title: &str, text: &str) -> String {
        format!(
            "<page><title>{}</title><ns>0</ns><revision><id>1</id><text xml:space=\"preserve\">{}</text></revision></page>",
            title, text
        )
    }

    #[test]
    fn yields_english_pages_only() {
        let xml = format!(
            "<mediawiki>{}{}</mediawiki>",
            page("cat", "==English==\n===Noun===\n# animal"),
            page("chat", "==French==\n===Noun===\n# cat"),
        );
        let (records, stats) = walk(&xml);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "cat");
        assert_eq!(stats.pages, 2);
        assert_eq!(stats.records, 1);
        assert_eq!(stats.non_english, 1);
    }

    #[test]
    fn matches_local_names_under_a_namespace_prefix() {
        let xml = "<mw:mediawiki xmlns:mw=\"http://www.mediawiki.org/xml/export-0.11/\">\
            <mw:page><mw:title>run</mw:title><mw:revision>\
            <mw:text>==English==\n===Verb===</mw:text></mw:revision></mw:page></mw:mediawiki>";
        let (records, _) = walk(xml);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "run");
        assert_eq!(records[0].pos.to_string(), "verb");
    }

    #[test]
    fn default_namespace_is_ignored() {
        let xml = format!(
            "<mediawiki xmlns=\"http://www.mediawiki.org/xml/export-0.11/\">{}</mediawiki>",
            page("go", "==English==")
        );
        assert_eq!(walk(&xml).0.len(), 1);
    }

    #[test]
    fn pages_missing_title_or_text_are_skipped() {
        let xml = "<mediawiki>\
            <page><revision><text>==English==</text></revision></page>\
            <page><title>notext</title><revision><id>2</id></revision></page>\
            <page><title>toplevel</title><text>==English==</text></page>\
            <page><title></title><revision><text>==English==</text></revision></page>\
            <page/>\
            </mediawiki>";
        let (records, stats) = walk(xml);
        assert!(records.is_empty());
        assert_eq!(stats.pages, 5);
        assert_eq!(stats.incomplete, 5);
    }

    #[test]
    fn empty_text_element_is_not_english() {
        let xml = "<mediawiki><page><title>x</title><revision><text/></revision></page></mediawiki>";
        let (records, stats) = walk(xml);
        assert!(records.is_empty());
        assert_eq!(stats.non_english, 1);
    }

    #[test]
    fn entities_are_unescaped() {
        let xml = format!(
            "<mediawiki>{}</mediawiki>",
            page("AT&amp;T", "==English==\n{{initialism AT&amp;T|x}} &lt;ref&gt;")
        );
        let (records, _) = walk(&xml);
        assert_eq!(records[0].title, "AT&T");
        assert!(records[0].abbreviations.contains("AT&T"));
    }

    #[test]
    fn cdata_text_is_captured() {
        let xml = "<mediawiki><page><title>x</title><revision>\
            <text><![CDATA[==English==\n===Adverb===]]></text></revision></page></mediawiki>";
        let (records, _) = walk(xml);
        assert_eq!(records[0].pos.to_string(), "adv");
    }

    #[test]
    fn first_revision_text_wins() {
        let xml = "<mediawiki><page><title>x</title>\
            <revision><text>==English==\n===Noun===</text></revision>\
            <revision><text>==English==\n===Verb===</text></revision>\
            </page></mediawiki>";
        let (records, _) = walk(xml);
        assert_eq!(records[0].pos.to_string(), "noun");
    }

    #[test]
    fn siteinfo_title_is_not_a_page_title() {
        let xml = format!(
            "<mediawiki><siteinfo><sitename>Wiktionary</sitename><title>nope</title></siteinfo>{}</mediawiki>",
            page("real", "==English==")
        );
        let (records, stats) = walk(&xml);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "real");
        assert_eq!(stats.pages, 1);
    }

    #[test]
    fn mismatched_end_tag_is_an_error() {
        let xml = "<mediawiki><page><title>x</titel></page></mediawiki>";
        let results: Vec<_> = PageWalker::new(xml.as_bytes()).collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].as_ref().unwrap_err().is_malformed());
    }

    #[test]
    fn truncated_document_is_an_error() {
        let xml = format!("<mediawiki>{}<page><title>y</title>", page("x", "==English=="));
        let results: Vec<_> = PageWalker::new(xml.as_bytes()).collect();
        assert!(results[0].is_ok());
        assert!(results.last().unwrap().as_ref().unwrap_err().is_malformed());
    }

    #[test]
    fn empty_input_is_an_error() {
        let results: Vec<_> = PageWalker::new(&b""[..]).collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }

    #[test]
    fn stops_after_an_error() {
        let mut walker = PageWalker::new(&b"<a></b>"[..]);
        assert!(matches!(walker.next(), Some(Err(_))));
        assert!(walker.next().is_none());
        assert!(walker.next().is_none());
    }

    #[test]
    fn walk_is_lazy() {
        // The second page is broken; the first record is still available first.
        let xml = format!("<mediawiki>{}<page><title>b</x></page></mediawiki>", page("a", "==English=="));
        let mut walker = PageWalker::new(xml.as_bytes());
        assert_eq!(walker.next().unwrap().unwrap().title, "a");
        assert!(walker.next().unwrap().is_err());
    }

    #[test]
    fn many_pages_stream_through() {
        let mut xml = String::from("<mediawiki>");
        for i in 0..5000 {
            xml.push_str(&page(&format!("w{}", i), "==English==\n===Noun==="));
        }
        xml.push_str("</mediawiki>");
        let walker = PageWalker::new(xml.as_bytes());
        let mut count = 0;
        for record in walker {
            assert_eq!(record.unwrap().pos.to_string(), "noun");
            count += 1;
        }
        assert_eq!(count, 5000);
    }

    #[test]
    fn page_state_is_released_between_records() {
        let big = "x".repeat(64 * 1024);
        let mut xml = String::from("<mediawiki>");
        for i in 0..100 {
            xml.push_str(&page(&format!("w{}", i), &format!("==English==\n{}", big)));
        }
        xml.push_str("</mediawiki>");

        let mut walker = PageWalker::new(xml.as_bytes());
        let mut count = 0;
        while let Some(record) = walker.next() {
            record.unwrap();
            count += 1;
            // The yielded page is gone: nothing from it is still held by the walker.
            assert!(walker.state.page.is_none());
            assert_eq!(walker.state.depth, 1);
            assert_eq!(walker.stats().pages, count);
        }
        assert_eq!(count, 100);
        assert_eq!(walker.state.depth, 0);
    }

    #[test]
    fn only_the_open_page_is_held() {
        let xml = format!(
            "<mediawiki>{}<page><title>b</title><revision><text>==English==</text></revision></page></mediawiki>",
            page("a", "==English==\n===Noun===")
        );
        let mut walker = PageWalker::new(xml.as_bytes());
        assert_eq!(walker.next().unwrap().unwrap().title, "a");
        assert!(walker.state.page.is_none());
        assert_eq!(walker.next().unwrap().unwrap().title, "b");
        assert!(walker.state.page.is_none());
        assert!(walker.next().is_none());
    }
}
