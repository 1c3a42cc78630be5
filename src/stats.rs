use crate::bible::Bible;
use crate::error::Result;
use crate::store::Population;
use std::time::Duration;

/// Statistics collected during one import run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ImportStats {
    pub books: usize,
    pub chapters: usize,
    pub verses: usize,
    pub rows_inserted: usize,
    pub rows_reused: usize,
    pub table_created: bool,
    pub parse_time: Duration,
    pub store_time: Duration,
}

impl ImportStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_bible(&mut self, bible: &Bible) -> Result<()> {
        self.books = bible.books()?.len();
        self.chapters = bible.chapter_count()?;
        self.verses = bible.len()?;
        Ok(())
    }

    pub fn record_population(&mut self, population: Population) {
        match population {
            Population::Inserted(n) => self.rows_inserted = n,
            Population::Reused(n) => self.rows_reused = n,
        }
    }

    pub fn total_time(&self) -> Duration {
        self.parse_time + self.store_time
    }

    pub fn summary(&self) -> String {
        let mut out = String::from("=== Summary ===\n");
        out.push_str(&format!(
            "Parse time:         {:.2}s\n",
            self.parse_time.as_secs_f64()
        ));
        out.push_str(&format!(
            "Store time:         {:.2}s\n",
            self.store_time.as_secs_f64()
        ));
        out.push_str(&format!(
            "Total time:         {:.2}s\n",
            self.total_time().as_secs_f64()
        ));
        out.push_str(&format!("Books parsed:       {}\n", self.books));
        out.push_str(&format!("Chapters parsed:    {}\n", self.chapters));
        out.push_str(&format!("Verses parsed:      {}\n", self.verses));
        out.push_str(&format!(
            "Table created:      {}\n",
            if self.table_created { "yes" } else { "no" }
        ));
        out.push_str(&format!("Rows inserted:      {}\n", self.rows_inserted));
        out.push_str(&format!("Rows reused:        {}\n", self.rows_reused));
        out
    }
}
