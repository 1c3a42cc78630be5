//! Verbum: plain-text Bible extraction into SQLite with reference lookup
//!
//! This crate turns a flat text edition of the Bible (Project Gutenberg's King
//! James text, where every verse is introduced by a `BB:CCC:VVV ` tag) into a
//! relational table and answers lookups typed as `Book Chapter:Verse`:
//!
//! 1. **Verse Pass** -- Memory-map the text and search forward for the tag of
//!    the next expected verse; hits append text, misses advance the
//!    chapter/book until the model locks
//! 2. **Store Pass** -- Create the `bible` table if needed and insert every
//!    verse in one transaction, or validate a previous run's row count
//! 3. **Contents Pass** -- Map the text again and read the book names out of
//!    the column-major grids on the contents page
//! 4. **Lookup** -- Prompt for references, prefix-match the book name, and
//!    fetch the verse by primary key
//!
//! # Key Modules
//!
//! - [`view`] -- Read-only memory-mapped byte view with forward search
//! - [`delimiter`] -- Line terminator detection
//! - [`bible`] -- Book/chapter/verse accumulator state machine
//! - [`scanner`] -- Verse pass driving the accumulator
//! - [`toc`] -- Pivot descriptions and the table-of-contents state machine
//! - [`store`] -- SQLite schema, idempotent population, and point lookups
//! - [`resolver`] -- Reference parsing and the prompt loop
//! - [`import`] -- Verse pass plus store pass as one run
//! - [`stats`] -- Import summary counters
//! - [`text`] -- Whitespace normalization and encoding helpers
//! - [`error`] -- Error taxonomy
//! - [`config`] -- Defaults and constants
//!
//! # Example Usage
//!
//! ```bash
//! # Build bible.db from pg30.txt
//! verbum import --text pg30.txt --database bible.db
//!
//! # Look a verse up interactively
//! verbum lookup --text pg30.txt --database bible.db
//! ```

pub mod bible;
pub mod config;
pub mod delimiter;
pub mod error;
pub mod import;
pub mod resolver;
pub mod scanner;
pub mod stats;
pub mod store;
pub mod text;
pub mod toc;
pub mod view;

pub use error::VerbumError;
