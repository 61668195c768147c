use anyhow::{anyhow, Result};
use encoding::label::encoding_from_whatwg_label;
use encoding::DecoderTrap;

const UTF8_BOM: &str = "\u{feff}";

/// decode to utf-8, detecting the char-encoding when the bytes are not
/// already utf-8 (unknown characters are ignored)
/// ref. https://github.com/thuleqaid/rust-chardet
pub fn decode_to_utf8(input: Vec<u8>) -> Result<String> {
    match String::from_utf8(input) {
        Ok(text) => Ok(match text.strip_prefix(UTF8_BOM) {
            Some(stripped) => stripped.to_string(),
            None => text,
        }),
        Err(e) => detect_and_decode(e.as_bytes()),
    }
}

fn detect_and_decode(input: &[u8]) -> Result<String> {
    // (charset, confidence, language)
    let result = chardet::detect(input);

    let coder = encoding_from_whatwg_label(chardet::charset2encoding(&result.0));
    if let Some(c) = coder {
        tracing::debug!(
            "decoding input as {} (confidence {:.2})",
            c.name(),
            result.1
        );
        c.decode(input, DecoderTrap::Ignore)
            .map_err(|e| anyhow!("cannot decode input as {}: {:?}", c.name(), e))
    } else {
        Err(anyhow!("cannot find character encodings: {:?}", &result))
    }
}
