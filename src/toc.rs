//! Book names recovered from the printed table of contents.
//!
//! The contents page lays names out in column-major grids, each described by
//! a [`PivotDescription`]. The table hands out the keys in grid order, accepts
//! one name per key, and locks itself on the first assignment after the key
//! sequence is exhausted. Locking validates that exactly `1..=N` was
//! collected; a mismatch poisons the table for good.

use crate::config::{BOOK_LABEL_PREFIX, BOOK_LABEL_WIDTH, DEFAULT_PIVOTS};
use crate::delimiter::{self, LineDelimiter};
use crate::error::{Result, VerbumError};
use crate::text::{clean, decode_clean, encode};
use crate::view::ByteView;
use anyhow::Context;
use encoding_rs::Encoding;
use rustc_hash::FxHashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// One rectangular, column-major block of names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PivotDescription {
    pub rows: u32,
    pub columns: u32,
    pub start: u32,
}

impl PivotDescription {
    pub const fn new(rows: u32, columns: u32, start: u32) -> Self {
        Self {
            rows,
            columns,
            start,
        }
    }

    pub fn len(&self) -> u32 {
        self.rows * self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys in reading order: across each row, one column at a time.
    pub fn keys(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.columns).map(move |column| self.start + row + column * self.rows)
        })
    }
}

pub fn default_pivots() -> Vec<PivotDescription> {
    DEFAULT_PIVOTS
        .iter()
        .map(|&(rows, columns, start)| PivotDescription::new(rows, columns, start))
        .collect()
}

/// Key handed out by [`TableOfContents::advance`] with its searchable label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocKey {
    pub key: u32,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TocState {
    New,
    Started,
    Stopped,
    Locked,
}

#[derive(Debug)]
enum Names {
    Collecting(FxHashMap<u32, String>),
    Frozen(Vec<String>),
    Poisoned,
}

#[derive(Debug)]
pub struct TableOfContents {
    label_prefix: String,
    label_width: usize,
    pivots: Vec<PivotDescription>,
    plan: Vec<u32>,
    cursor: usize,
    state: TocState,
    names: Names,
}

impl TableOfContents {
    pub fn new(label_prefix: &str, label_width: usize, pivots: Vec<PivotDescription>) -> Self {
        let plan = pivots.iter().flat_map(|p| p.keys()).collect();
        Self {
            label_prefix: label_prefix.to_string(),
            label_width,
            pivots,
            plan,
            cursor: 0,
            state: TocState::New,
            names: Names::Collecting(FxHashMap::default()),
        }
    }

    /// `Book NN` labels over the default grids.
    pub fn for_books() -> Self {
        Self::new(BOOK_LABEL_PREFIX, BOOK_LABEL_WIDTH, default_pivots())
    }

    pub fn state(&self) -> TocState {
        self.state
    }

    pub fn pivots(&self) -> &[PivotDescription] {
        &self.pivots
    }

    /// Total number of keys the grids describe.
    pub fn expected_len(&self) -> usize {
        self.plan.len()
    }

    pub fn label(&self, key: u32) -> String {
        format!("{}{:0width$}", self.label_prefix, key, width = self.label_width)
    }

    /// Next key in grid order; `None` once exhausted.
    ///
    /// The sequence can be walked only once: calling again after it has
    /// reported exhaustion is an invalid-state error.
    pub fn advance(&mut self) -> Result<Option<TocKey>> {
        match self.state {
            TocState::New => self.state = TocState::Started,
            TocState::Started => {}
            TocState::Stopped | TocState::Locked => {
                return Err(VerbumError::invalid_state("iterator may only be run once"));
            }
        }
        match self.plan.get(self.cursor) {
            Some(&key) => {
                self.cursor += 1;
                Ok(Some(TocKey {
                    key,
                    label: self.label(key),
                }))
            }
            None => {
                self.state = TocState::Stopped;
                Ok(None)
            }
        }
    }

    /// Records the name for `key`. The first assignment after the key
    /// sequence is exhausted validates and locks the table.
    pub fn assign(&mut self, key: u32, raw: &str) -> Result<()> {
        if !matches!(self.state, TocState::Started | TocState::Stopped) {
            return Err(VerbumError::invalid_state(
                "chapter name cannot currently be set",
            ));
        }
        let Names::Collecting(map) = &mut self.names else {
            return Err(VerbumError::invalid_state("names are no longer collecting"));
        };
        map.insert(key, clean(raw));
        if self.state == TocState::Stopped {
            self.lock()?;
        }
        Ok(())
    }

    fn lock(&mut self) -> Result<()> {
        self.state = TocState::Locked;
        let Names::Collecting(mut map) = std::mem::replace(&mut self.names, Names::Poisoned) else {
            return Err(VerbumError::invalid_state("names already finalized"));
        };
        let expected = self.expected_len() as u32;
        let complete = map.len() == expected as usize && (1..=expected).all(|k| map.contains_key(&k));
        if !complete {
            warn!(collected = map.len(), expected, "Table of contents is incomplete; poisoning");
            return Err(VerbumError::data_integrity(
                "chapter names were incorrectly constructed",
            ));
        }
        let names: Vec<String> = (1..=expected).filter_map(|k| map.remove(&k)).collect();
        debug!(names = names.len(), "Table of contents locked");
        self.names = Names::Frozen(names);
        Ok(())
    }

    /// All names in key order.
    pub fn names(&self) -> Result<&[String]> {
        if self.state != TocState::Locked {
            return Err(VerbumError::invalid_state("instance must be locked first"));
        }
        match &self.names {
            Names::Frozen(names) => Ok(names.as_slice()),
            _ => Err(VerbumError::data_integrity(
                "chapter names were incorrectly constructed",
            )),
        }
    }

    /// Name for a 1-indexed key.
    pub fn name(&self, key: u32) -> Result<&str> {
        let names = self.names()?;
        key.checked_sub(1)
            .and_then(|i| names.get(i as usize))
            .map(String::as_str)
            .ok_or_else(|| VerbumError::invalid_state(format!("no name for key {key}")))
    }

    pub fn len(&self) -> usize {
        match &self.names {
            Names::Collecting(map) => map.len(),
            Names::Frozen(names) => names.len(),
            Names::Poisoned => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Maps the document at `path` and reads the book names out of its contents page.
pub fn parse_book_names(
    path: &Path,
    encoding: &'static Encoding,
    mut toc: TableOfContents,
) -> anyhow::Result<TableOfContents> {
    let view = ByteView::open(path)
        .with_context(|| format!("Failed to open Bible text at: {}", path.display()))?;
    let next_line = delimiter::sniff(&view)
        .with_context(|| format!("Failed to sniff line delimiter in: {}", path.display()))?;
    read_table_of_contents(&view, next_line, &mut toc, encoding)
        .with_context(|| format!("Failed to read table of contents in: {}", path.display()))?;
    info!(books = toc.names()?.len(), "Book names parsed");
    Ok(toc)
}

/// Fills `toc` from `view`.
///
/// Each name starts after its own label and ends at the nearer of the next
/// label or the end of the line. The last key is bounded by the line end only.
pub fn read_table_of_contents(
    view: &ByteView,
    end_of_line: LineDelimiter,
    toc: &mut TableOfContents,
    encoding: &'static Encoding,
) -> Result<()> {
    let eol = end_of_line.as_bytes();
    let mut start = 0;
    let mut current = toc
        .advance()?
        .ok_or_else(|| VerbumError::end_of_input("table of contents has no keys"))?;

    loop {
        let next = toc.advance()?;

        let label = encode(encoding, &current.label);
        let index = view.find(&label, start).ok_or_else(|| {
            VerbumError::end_of_input(format!("{} could not be found", current.label))
        })?;
        start = index + label.len();

        let next_label = next.as_ref().map(|n| encode(encoding, &n.label));
        let end = [next_label.as_deref(), Some(eol)]
            .into_iter()
            .flatten()
            .filter_map(|needle| view.find(needle, start))
            .min()
            .ok_or_else(|| VerbumError::end_of_input("an expected value could not be found"))?;

        toc.assign(current.key, &decode_clean(encoding, view.slice(start, end)))?;
        start = end;

        match next {
            Some(n) => current = n,
            None => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::resolve_encoding;

    fn name_for(key: u32) -> String {
        format!("Name{key}")
    }

    /// Lays out `Book NN Name` cells row by row, matching the pivots.
    fn render_grid(pivots: &[PivotDescription]) -> String {
        let mut out = String::from("CONTENTS\n\n");
        for p in pivots {
            for row in 0..p.rows {
                let cells: Vec<String> = (0..p.columns)
                    .map(|c| {
                        let key = p.start + row + c * p.rows;
                        format!("Book {key:02} {:<10}", name_for(key))
                    })
                    .collect();
                out.push_str(&cells.join("  "));
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }

    fn build(pivots: Vec<PivotDescription>, doc: &str) -> (TableOfContents, Result<()>) {
        let view = ByteView::from_vec(doc.as_bytes().to_vec());
        let mut toc = TableOfContents::new("Book ", 2, pivots);
        let result = read_table_of_contents(
            &view,
            LineDelimiter::Lf,
            &mut toc,
            resolve_encoding("latin1").unwrap(),
        );
        (toc, result)
    }

    #[test]
    fn pivot_keys_are_column_major() {
        let p = PivotDescription::new(3, 2, 1);
        assert_eq!(p.keys().collect::<Vec<_>>(), vec![1, 4, 2, 5, 3, 6]);
    }

    #[test]
    fn default_pivots_cover_one_to_sixty_six() {
        let pivots = default_pivots();
        let mut keys: Vec<u32> = pivots.iter().flat_map(|p| p.keys()).collect();
        assert_eq!(&keys[..4], &[1, 14, 27, 2]);
        keys.sort_unstable();
        assert_eq!(keys, (1..=66).collect::<Vec<_>>());
    }

    #[test]
    fn reads_default_grid() {
        let pivots = default_pivots();
        let (toc, result) = build(pivots.clone(), &render_grid(&pivots));
        result.unwrap();
        assert_eq!(toc.state(), TocState::Locked);
        let names = toc.names().unwrap();
        assert_eq!(names.len(), 66);
        for (i, name) in names.iter().enumerate() {
            assert_eq!(name, &name_for(i as u32 + 1));
        }
        assert_eq!(toc.name(40).unwrap(), "Name40");
    }

    #[test]
    fn names_with_spaces_are_cleaned() {
        let doc = "Book 01 First  of\tKings  Book 02 Second\nBook 03 Third\n";
        let pivots = vec![PivotDescription::new(1, 2, 1), PivotDescription::new(1, 1, 3)];
        let (toc, result) = build(pivots, doc);
        result.unwrap();
        assert_eq!(toc.names().unwrap(), &["First of Kings", "Second", "Third"]);
    }

    #[test]
    fn grid_missing_key_forty_is_poisoned() {
        // Second grid starts at 41, so every label is present but 40 is never collected.
        let shifted = vec![PivotDescription::new(13, 3, 1), PivotDescription::new(9, 3, 41)];
        let doc = render_grid(&shifted);

        let (toc, result) = build(shifted, &doc);
        assert!(matches!(result, Err(VerbumError::DataIntegrity(_))));
        assert_eq!(toc.state(), TocState::Locked);
        assert!(matches!(toc.names(), Err(VerbumError::DataIntegrity(_))));
        assert!(toc.name(1).is_err());
    }

    #[test]
    fn missing_label_is_end_of_input() {
        let (_, result) = build(vec![PivotDescription::new(2, 1, 1)], "Book 01 Only\n");
        assert!(matches!(result, Err(VerbumError::EndOfInput(_))));
    }

    #[test]
    fn read_before_lock_is_invalid_state() {
        let mut toc = TableOfContents::new("Book ", 2, vec![PivotDescription::new(1, 2, 1)]);
        assert!(matches!(toc.names(), Err(VerbumError::InvalidState(_))));
        toc.advance().unwrap();
        toc.assign(1, "One").unwrap();
        assert!(matches!(toc.names(), Err(VerbumError::InvalidState(_))));
    }

    #[test]
    fn assign_before_start_is_invalid_state() {
        let mut toc = TableOfContents::new("Book ", 2, vec![PivotDescription::new(1, 1, 1)]);
        assert!(matches!(toc.assign(1, "One"), Err(VerbumError::InvalidState(_))));
    }

    #[test]
    fn key_sequence_runs_once() {
        let mut toc = TableOfContents::new("Book ", 2, vec![PivotDescription::new(1, 2, 1)]);
        assert_eq!(toc.advance().unwrap().unwrap().label, "Book 01");
        assert_eq!(toc.advance().unwrap().unwrap().key, 2);
        assert_eq!(toc.advance().unwrap(), None);
        assert_eq!(toc.state(), TocState::Stopped);
        assert!(matches!(toc.advance(), Err(VerbumError::InvalidState(_))));
    }

    #[test]
    fn assignment_after_stop_locks() {
        let mut toc = TableOfContents::new("Book ", 2, vec![PivotDescription::new(2, 1, 1)]);
        toc.advance().unwrap();
        toc.assign(1, "One").unwrap();
        toc.advance().unwrap();
        toc.advance().unwrap();
        toc.assign(2, " Two ").unwrap();
        assert_eq!(toc.state(), TocState::Locked);
        assert_eq!(toc.names().unwrap(), &["One", "Two"]);
        assert!(matches!(toc.assign(3, "Three"), Err(VerbumError::InvalidState(_))));
    }
}
