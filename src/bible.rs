//! Incremental builder for the book/chapter/verse model.
//!
//! The accumulator starts at 1:1:1 and is driven by two events: verse text
//! for the currently expected reference, or notice that the expected
//! reference does not exist. The latter promotes the accumulated verses into
//! a chapter, the chapters into a book, and finally locks the model.

use crate::error::{Result, VerbumError};
use crate::text::clean;
use tracing::{debug, trace};

/// Input to [`Bible::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Raw text of the currently expected verse.
    AppendText(String),
    /// The currently expected reference was not found.
    BoundaryCrossed,
}

/// 1-indexed position of the next expected verse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coordinates {
    pub book: u32,
    pub chapter: u32,
    pub verse: u32,
}

impl Coordinates {
    /// Encoded tag as it appears in the document, e.g. `01:001:001 `.
    pub fn tag(&self) -> String {
        format!("{:02}:{:03}:{:03} ", self.book, self.chapter, self.verse)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Accumulating(Coordinates),
    Locked,
}

pub type Chapter = Vec<String>;
pub type Book = Vec<Chapter>;

/// One flattened verse: (book, chapter, verse, text).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseRecord<'a> {
    pub book: u32,
    pub chapter: u32,
    pub verse: u32,
    pub text: &'a str,
}

#[derive(Debug)]
pub struct Bible {
    state: State,
    books: Vec<Book>,
    chapters: Vec<Chapter>,
    verses: Chapter,
    size: usize,
}

impl Default for Bible {
    fn default() -> Self {
        Self::new()
    }
}

impl Bible {
    pub fn new() -> Self {
        Self {
            state: State::Accumulating(Coordinates {
                book: 1,
                chapter: 1,
                verse: 1,
            }),
            books: Vec::new(),
            chapters: Vec::new(),
            verses: Vec::new(),
            size: 0,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.state, State::Locked)
    }

    /// Coordinates the next `AppendText` will be stored under.
    pub fn expected(&self) -> Result<Coordinates> {
        match self.state {
            State::Accumulating(at) => Ok(at),
            State::Locked => Err(VerbumError::invalid_state(
                "reference is not available when Bible is locked",
            )),
        }
    }

    /// Tag of the next verse to search for.
    pub fn reference(&self) -> Result<String> {
        self.expected().map(|at| at.tag())
    }

    pub fn apply(&mut self, event: Event) -> Result<State> {
        let State::Accumulating(at) = self.state else {
            return Err(VerbumError::invalid_state(
                "Bible is locked and cannot accept more events",
            ));
        };
        let next = match event {
            Event::AppendText(raw) => {
                let text = clean(&raw);
                if text.is_empty() {
                    return Err(VerbumError::data_integrity(format!(
                        "verse {} has no text",
                        at.tag().trim_end()
                    )));
                }
                trace!(reference = %at.tag(), "Appending verse");
                self.verses.push(text);
                self.size += 1;
                State::Accumulating(Coordinates {
                    verse: at.verse + 1,
                    ..at
                })
            }
            Event::BoundaryCrossed => self.cross_boundary(at)?,
        };
        self.state = next;
        Ok(next)
    }

    fn cross_boundary(&mut self, at: Coordinates) -> Result<State> {
        if at.verse > 1 {
            self.chapters.push(std::mem::take(&mut self.verses));
            Ok(State::Accumulating(Coordinates {
                chapter: at.chapter + 1,
                verse: 1,
                ..at
            }))
        } else if at.chapter > 1 {
            debug!(book = at.book, chapters = self.chapters.len(), "Closed book");
            self.books.push(std::mem::take(&mut self.chapters));
            Ok(State::Accumulating(Coordinates {
                book: at.book + 1,
                chapter: 1,
                verse: 1,
            }))
        } else if at.book > 1 {
            self.books.shrink_to_fit();
            debug!(books = self.books.len(), verses = self.size, "Bible locked");
            Ok(State::Locked)
        } else {
            Err(VerbumError::end_of_input(
                "Bible is empty and parsing may have failed",
            ))
        }
    }

    /// Finished books; only available once locked.
    pub fn books(&self) -> Result<&[Book]> {
        self.ensure_locked("books cannot be retrieved until Bible is complete")?;
        Ok(&self.books)
    }

    /// Number of verses; only available once locked.
    pub fn len(&self) -> Result<usize> {
        self.ensure_locked("size is not available on an incomplete Bible")?;
        Ok(self.size)
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.len().map(|n| n == 0)
    }

    pub fn chapter_count(&self) -> Result<usize> {
        Ok(self.books()?.iter().map(Vec::len).sum())
    }

    /// Every verse in order, 1-indexed on each axis.
    pub fn verses(&self) -> Result<impl Iterator<Item = VerseRecord<'_>>> {
        self.ensure_locked("iteration not possible on incomplete Bible")?;
        Ok(self.books.iter().zip(1..).flat_map(|(chapters, book)| {
            chapters.iter().zip(1..).flat_map(move |(verses, chapter)| {
                verses.iter().zip(1..).map(move |(text, verse)| VerseRecord {
                    book,
                    chapter,
                    verse,
                    text: text.as_str(),
                })
            })
        }))
    }

    fn ensure_locked(&self, msg: &str) -> Result<()> {
        if self.is_locked() {
            Ok(())
        } else {
            Err(VerbumError::invalid_state(msg))
        }
    }
}
