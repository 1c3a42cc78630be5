/// Encoding label used when none is given. `encoding_rs` follows WHATWG, where
/// `latin1` names windows-1252 rather than strict ISO-8859-1.
pub const DEFAULT_ENCODING: &str = "latin1";

/// Project Gutenberg King James text
pub const DEFAULT_TEXT_PATH: &str = "pg30.txt";

pub const DEFAULT_DB_PATH: &str = "bible.db";

/// Name of the single table holding every verse
pub const TABLE_NAME: &str = "bible";

/// Book names are located by their table-of-contents label, e.g. `Book 01`
pub const BOOK_LABEL_PREFIX: &str = "Book ";
pub const BOOK_LABEL_WIDTH: usize = 2;

/// Column-major grids of book names as printed in the table of contents:
/// 13 rows by 3 columns starting at book 1, then 9 rows by 3 columns at book 40.
pub const DEFAULT_PIVOTS: [(u32, u32, u32); 2] = [(13, 3, 1), (9, 3, 40)];

/// Progress update interval (tick every N verses)
pub const PROGRESS_INTERVAL: u32 = 1000;

/// Column width for wrapping displayed verse text
pub const WRAP_WIDTH: usize = 70;
