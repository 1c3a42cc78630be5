use crate::error::{Result, VerbumError};
use encoding_rs::Encoding;
use tracing::warn;

/// Collapses runs of whitespace into single spaces and trims both ends.
pub fn clean(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.as_bytes()).ok_or_else(|| VerbumError::Encoding(label.to_string()))
}

/// Encodes `text` for searching the raw document bytes.
pub fn encode(encoding: &'static Encoding, text: &str) -> Vec<u8> {
    let (bytes, _, had_errors) = encoding.encode(text);
    if had_errors {
        warn!(text, encoding = encoding.name(), "Unmappable characters while encoding");
    }
    bytes.into_owned()
}

/// Decodes then normalizes a span of document bytes.
pub fn decode_clean(encoding: &'static Encoding, bytes: &[u8]) -> String {
    let (decoded, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        warn!(encoding = encoding.name(), "Malformed bytes while decoding");
    }
    clean(&decoded)
}
