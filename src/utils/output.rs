/// Decoding of captured process output
use crate::config::types::Result;

/// Decode captured bytes as UTF-8.
///
/// Invalid sequences are an error rather than being replaced, so a check never
/// grades text that differs from what the program printed.
pub fn decode(output: Vec<u8>) -> Result<String> {
    Ok(String::from_utf8(output)?)
}

/// True when the output holds anything besides whitespace
pub fn has_content(text: &str) -> bool {
    !text.trim().is_empty()
}
