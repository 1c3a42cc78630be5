use crate::bible::Bible;
use crate::config::TABLE_NAME;
use crate::error::{Result, VerbumError};
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const SQL_COUNT_TABLE: &str = "SELECT count(*) AS size
  FROM sqlite_master
 WHERE type = 'table'
   AND name = ?1";

const SQL_CREATE_TABLE: &str = "CREATE TABLE bible (
    book    INTEGER NOT NULL CHECK (book > 0),
    chapter INTEGER NOT NULL CHECK (chapter > 0),
    verse   INTEGER NOT NULL CHECK (verse > 0),
    value   TEXT    NOT NULL CHECK (length(value) > 0),
    PRIMARY KEY (book, chapter, verse)
)";

const SQL_COUNT_ROWS: &str = "SELECT count(*) AS size FROM bible";

const SQL_INSERT: &str = "INSERT INTO bible (book, chapter, verse, value) VALUES (?1, ?2, ?3, ?4)";

const SQL_SELECT: &str = "SELECT value
  FROM bible
 WHERE book = ?1
   AND chapter = ?2
   AND verse = ?3";

/// What [`BibleStore::populate`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Population {
    Inserted(usize),
    /// The table already held exactly the expected rows.
    Reused(usize),
}

/// SQLite file holding one row per verse.
///
/// No connection is kept open: every operation opens the file, does its
/// work, and closes it again.
#[derive(Debug, Clone)]
pub struct BibleStore {
    path: PathBuf,
}

impl BibleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        Ok(Connection::open(&self.path)?)
    }

    /// Creates the verse table unless it already exists. Returns whether it was created.
    pub fn ensure_schema(&self) -> Result<bool> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let conn = self.connect()?;
        if table_exists(&conn, TABLE_NAME)? {
            debug!(path = %self.path.display(), "Table already exists");
            return Ok(false);
        }
        conn.execute_batch(SQL_CREATE_TABLE)?;
        if !table_exists(&conn, TABLE_NAME)? {
            return Err(VerbumError::data_integrity(format!(
                "table {TABLE_NAME:?} was not created"
            )));
        }
        info!(path = %self.path.display(), table = TABLE_NAME, "Created table");
        Ok(true)
    }

    pub fn table_exists(&self) -> Result<bool> {
        table_exists(&self.connect()?, TABLE_NAME)
    }

    pub fn row_count(&self) -> Result<usize> {
        row_count(&self.connect()?)
    }

    /// Inserts every verse of `bible` in one transaction if the table is
    /// empty; otherwise checks that the existing row count matches.
    pub fn populate(&self, bible: &Bible) -> Result<Population> {
        let expected = bible.len()?;
        let mut conn = self.connect()?;

        let existing = row_count(&conn)?;
        if existing > 0 {
            check_count(existing, expected)?;
            info!(rows = existing, "Bible already stored; skipping insert");
            return Ok(Population::Reused(existing));
        }

        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(SQL_INSERT)?;
            for record in bible.verses()? {
                stmt.execute(params![record.book, record.chapter, record.verse, record.text])?;
            }
        }
        // A failed check drops `tx` uncommitted, rolling the insert back.
        let stored = row_count(&tx)?;
        check_count(stored, expected)?;
        tx.commit()?;
        info!(rows = stored, "Bible stored");
        Ok(Population::Inserted(stored))
    }

    /// Text of one verse by primary key.
    pub fn lookup(&self, book: u32, chapter: u32, verse: u32) -> Result<String> {
        let conn = self.connect()?;
        conn.query_row(SQL_SELECT, params![book, chapter, verse], |row| row.get(0))
            .optional()?
            .ok_or(VerbumError::NotFound {
                book,
                chapter,
                verse,
            })
    }
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let total: i64 = conn.query_row(SQL_COUNT_TABLE, [name], |row| row.get(0))?;
    match total {
        0 => Ok(false),
        1 => Ok(true),
        n => Err(VerbumError::data_integrity(format!(
            "found {n} tables named {name:?}"
        ))),
    }
}

fn row_count(conn: &Connection) -> Result<usize> {
    let total: i64 = conn.query_row(SQL_COUNT_ROWS, [], |row| row.get(0))?;
    Ok(total as usize)
}

fn check_count(actual: usize, expected: usize) -> Result<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(VerbumError::data_integrity(format!(
            "Bible database has wrong number of rows in it: {actual} (expected {expected})"
        )))
    }
}
