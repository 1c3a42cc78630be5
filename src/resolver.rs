//! Turns typed references such as `Gen 1:1` into stored verse text.

use crate::store::BibleStore;
use crate::text::clean;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{BufRead, Write};
use thiserror::Error;
use tracing::debug;

static CHAPTER_VERSE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+):(\d+)$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub book: u32,
    pub chapter: u32,
    pub verse: u32,
}

/// Why a typed line was not a usable reference. The prompt loop swallows these.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("expected \"Book Chapter:Verse\"")]
    MissingParts,
    #[error("no book starts with {0:?}")]
    UnknownBook(String),
    #[error("could not read chapter and verse from {0:?}")]
    BadChapterVerse(String),
}

/// Parses `line` against the ordered book `names`.
///
/// The line is split at its last whitespace run. The left part is matched
/// case-insensitively as a prefix of the book names, first match wins.
pub fn parse_reference(line: &str, names: &[String]) -> Result<Reference, ReferenceError> {
    let line = line.trim();
    let split = line
        .rfind(char::is_whitespace)
        .ok_or(ReferenceError::MissingParts)?;
    let (prefix, pair) = (&line[..split], line[split..].trim_start());

    let prefix = clean(prefix).to_lowercase();
    if prefix.is_empty() {
        return Err(ReferenceError::MissingParts);
    }
    let book = names
        .iter()
        .position(|name| name.to_lowercase().starts_with(&prefix))
        .ok_or_else(|| ReferenceError::UnknownBook(prefix.clone()))?;

    let bad_pair = || ReferenceError::BadChapterVerse(pair.to_string());
    let caps = CHAPTER_VERSE_REGEX.captures(pair).ok_or_else(bad_pair)?;
    let chapter = caps[1].parse().map_err(|_| bad_pair())?;
    let verse = caps[2].parse().map_err(|_| bad_pair())?;

    Ok(Reference {
        book: book as u32 + 1,
        chapter,
        verse,
    })
}

/// Prompt loop over a line source and a console sink.
pub struct Resolver<'a, R, W> {
    names: &'a [String],
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Resolver<'a, R, W> {
    pub fn new(names: &'a [String], input: R, output: W) -> Self {
        Self {
            names,
            input,
            output,
        }
    }

    /// Prompts until a reference resolves against `store`.
    ///
    /// Returns `Ok(None)` when input ends. Malformed lines re-prompt
    /// silently; references missing from the store are reported first.
    pub fn resolve(&mut self, store: &BibleStore) -> anyhow::Result<Option<(Reference, String)>> {
        loop {
            let Some(reference) = self.read_reference()? else {
                return Ok(None);
            };
            match store.lookup(reference.book, reference.chapter, reference.verse) {
                Ok(text) => return Ok(Some((reference, text))),
                Err(e) if e.is_not_found() => {
                    debug!(?reference, "Reference not in store");
                    writeln!(
                        self.output,
                        "ERROR: Reference was parsed but not found in database."
                    )?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn read_reference(&mut self) -> anyhow::Result<Option<Reference>> {
        let mut line = String::new();
        loop {
            writeln!(
                self.output,
                "References should be formatted as \"Book Chapter:Verse\"."
            )?;
            write!(self.output, "Please enter a reference: ")?;
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output, "\nEOF detected; exiting the program.")?;
                return Ok(None);
            }
            match parse_reference(&line, self.names) {
                Ok(reference) => return Ok(Some(reference)),
                Err(e) => debug!(input = line.trim(), reason = %e, "Ignoring reference"),
            }
        }
    }
}

/// Heading, underline, and the verse wrapped to `width` columns.
pub fn render_passage(book_name: &str, reference: Reference, text: &str, width: usize) -> String {
    let heading = format!("{} {}:{}", book_name, reference.chapter, reference.verse);
    let mut out = format!("{}\n{}\n", heading, "=".repeat(heading.chars().count()));
    for line in wrap(text, width) {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Greedy word wrap; words longer than `width` get a line of their own.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bible::{Bible, Event};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn names() -> Vec<String> {
        ["Genesis", "Exodus", "Leviticus", "The Gospel According to Saint John"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn seeded_store(dir: &TempDir) -> BibleStore {
        let mut bible = Bible::new();
        bible.apply(Event::AppendText("In the beginning".into())).unwrap();
        bible.apply(Event::AppendText("And the earth".into())).unwrap();
        for _ in 0..3 {
            bible.apply(Event::BoundaryCrossed).unwrap();
        }
        let store = BibleStore::new(dir.path().join("bible.db"));
        store.ensure_schema().unwrap();
        store.populate(&bible).unwrap();
        store
    }

    #[test]
    fn parses_prefix_and_pair() {
        assert_eq!(
            parse_reference("Gen 1:1", &names()).unwrap(),
            Reference {
                book: 1,
                chapter: 1,
                verse: 1
            }
        );
        assert_eq!(parse_reference("  exo   20:3 \n", &names()).unwrap().book, 2);
    }

    #[test]
    fn multi_word_prefix_is_normalized() {
        let r = parse_reference("the   GOSPEL 3:16", &names()).unwrap();
        assert_eq!((r.book, r.chapter, r.verse), (4, 3, 16));
    }

    #[test]
    fn first_match_wins() {
        let r = parse_reference("e 1:1", &names()).unwrap();
        assert_eq!(r.book, 2);
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(parse_reference("1:1", &names()), Err(ReferenceError::MissingParts));
        assert_eq!(parse_reference("", &names()), Err(ReferenceError::MissingParts));
        assert_eq!(
            parse_reference("Rev 1:1", &names()),
            Err(ReferenceError::UnknownBook("rev".into()))
        );
        assert!(matches!(
            parse_reference("Gen 1-1", &names()),
            Err(ReferenceError::BadChapterVerse(_))
        ));
        assert!(matches!(
            parse_reference("Gen 1:1:1", &names()),
            Err(ReferenceError::BadChapterVerse(_))
        ));
        assert!(matches!(
            parse_reference("Gen 99999999999:1", &names()),
            Err(ReferenceError::BadChapterVerse(_))
        ));
    }

    #[test]
    fn resolve_skips_bad_input_and_missing_verses() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);
        let names = names();
        let input = Cursor::new("nonsense\nRev 1:1\nGen 9:9\nGen 1:2\n");
        let mut output = Vec::new();

        let (reference, text) = Resolver::new(&names, input, &mut output)
            .resolve(&store)
            .unwrap()
            .unwrap();

        assert_eq!((reference.book, reference.chapter, reference.verse), (1, 1, 2));
        assert_eq!(text, "And the earth");
        let console = String::from_utf8(output).unwrap();
        assert_eq!(console.matches("Please enter a reference: ").count(), 4);
        assert_eq!(console.matches("not found in database").count(), 1);
    }

    #[test]
    fn resolve_returns_none_at_end_of_input() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);
        let names = names();
        let mut output = Vec::new();

        let result = Resolver::new(&names, Cursor::new("Gen 5:5\n"), &mut output)
            .resolve(&store)
            .unwrap();

        assert!(result.is_none());
        assert!(String::from_utf8(output).unwrap().contains("EOF detected"));
    }

    #[test]
    fn wrap_breaks_on_words() {
        let lines = wrap("aa bb cc dd", 5);
        assert_eq!(lines, vec!["aa bb", "cc dd"]);
        assert_eq!(wrap("toolongword x", 4), vec!["toolongword", "x"]);
        assert!(wrap("", 10).is_empty());
    }

    #[test]
    fn render_underlines_heading() {
        let r = Reference {
            book: 1,
            chapter: 1,
            verse: 1,
        };
        let out = render_passage("Genesis", r, "In the beginning", 70);
        assert_eq!(out, "Genesis 1:1\n===========\nIn the beginning\n");
    }
}
