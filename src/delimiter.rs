use crate::error::{Result, VerbumError};
use crate::view::ByteView;
use tracing::debug;

/// Line terminator used by a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDelimiter {
    CrLf,
    Cr,
    Lf,
}

impl LineDelimiter {
    /// Candidates in detection priority order.
    pub const CANDIDATES: [LineDelimiter; 3] =
        [LineDelimiter::CrLf, LineDelimiter::Cr, LineDelimiter::Lf];

    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            LineDelimiter::CrLf => b"\r\n",
            LineDelimiter::Cr => b"\r",
            LineDelimiter::Lf => b"\n",
        }
    }

    /// Two consecutive delimiters, i.e. a blank line.
    pub fn doubled(self) -> Vec<u8> {
        self.as_bytes().repeat(2)
    }
}

/// Returns the first candidate that occurs anywhere in the view.
pub fn sniff(view: &ByteView) -> Result<LineDelimiter> {
    let found = LineDelimiter::CANDIDATES
        .into_iter()
        .find(|d| view.contains(d.as_bytes()))
        .ok_or_else(|| VerbumError::end_of_input("could not find any line delimiters"))?;
    debug!(delimiter = ?found, "Sniffed line delimiter");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sniff_bytes(bytes: &[u8]) -> Result<LineDelimiter> {
        sniff(&ByteView::from_vec(bytes.to_vec()))
    }

    #[test]
    fn lf_only() {
        assert_eq!(sniff_bytes(b"a\nb\n").unwrap(), LineDelimiter::Lf);
    }

    #[test]
    fn crlf_wins_over_later_lf() {
        assert_eq!(sniff_bytes(b"a\r\nb\nc\n").unwrap(), LineDelimiter::CrLf);
    }

    #[test]
    fn crlf_wins_even_when_lf_appears_first() {
        assert_eq!(sniff_bytes(b"a\nb\r\n").unwrap(), LineDelimiter::CrLf);
    }

    #[test]
    fn bare_cr() {
        assert_eq!(sniff_bytes(b"a\rb\r").unwrap(), LineDelimiter::Cr);
    }

    #[test]
    fn no_delimiter_is_end_of_input() {
        let err = sniff_bytes(b"one long line").unwrap_err();
        assert!(matches!(err, VerbumError::EndOfInput(_)));
    }

    #[test]
    fn doubled_delimiter() {
        assert_eq!(LineDelimiter::CrLf.doubled(), b"\r\n\r\n".to_vec());
        assert_eq!(LineDelimiter::Lf.doubled(), b"\n\n".to_vec());
    }
}
