use crate::bible::{Bible, Event};
use crate::config::PROGRESS_INTERVAL;
use crate::delimiter;
use crate::error::{Result, VerbumError};
use crate::text::{decode_clean, encode};
use crate::view::ByteView;
use anyhow::Context;
use encoding_rs::Encoding;
use indicatif::ProgressBar;
use std::path::Path;
use tracing::info;

/// Maps the document at `path` and parses it into a locked [`Bible`].
pub fn parse_bible(path: &Path, encoding: &'static Encoding) -> anyhow::Result<Bible> {
    let view = ByteView::open(path)
        .with_context(|| format!("Failed to open Bible text at: {}", path.display()))?;

    info!(path = %path.display(), encoding = encoding.name(), "Parsing Bible");

    let next_line = delimiter::sniff(&view)
        .with_context(|| format!("Failed to sniff line delimiter in: {}", path.display()))?;
    let mut bible = Bible::new();
    read_until_locked(&view, &next_line.doubled(), &mut bible, encoding)
        .with_context(|| format!("Failed to parse Bible text at: {}", path.display()))?;

    info!(
        books = bible.books()?.len(),
        verses = bible.len()?,
        "Bible parsed successfully"
    );
    Ok(bible)
}

/// Drives `bible` forward through `view` until it locks.
///
/// Each step searches for the tag of the next expected verse from the
/// current cursor. A hit feeds the text up to `end_of_verse`; a miss is a
/// boundary crossing and the next step retries from the same cursor.
pub fn read_until_locked(
    view: &ByteView,
    end_of_verse: &[u8],
    bible: &mut Bible,
    encoding: &'static Encoding,
) -> Result<()> {
    let pb = ProgressBar::new_spinner();
    let result = scan_verses(view, end_of_verse, bible, encoding, &pb);
    pb.finish_and_clear();
    result
}

fn scan_verses(
    view: &ByteView,
    end_of_verse: &[u8],
    bible: &mut Bible,
    encoding: &'static Encoding,
    pb: &ProgressBar,
) -> Result<()> {
    let mut start = 0;
    let mut appended: u32 = 0;

    while !bible.is_locked() {
        let tag = encode(encoding, &bible.reference()?);
        let event = match view.find(&tag, start) {
            Some(index) => {
                let text_start = index + tag.len();
                let end = view.find(end_of_verse, text_start).ok_or_else(|| {
                    VerbumError::end_of_input("could not find the end of the verse")
                })?;
                start = end + end_of_verse.len();
                Event::AppendText(decode_clean(encoding, view.slice(text_start, end)))
            }
            None => Event::BoundaryCrossed,
        };
        if matches!(event, Event::AppendText(_)) {
            appended += 1;
            if appended % PROGRESS_INTERVAL == 0 {
                pb.tick();
            }
        }
        bible.apply(event)?;
    }
    Ok(())
}
