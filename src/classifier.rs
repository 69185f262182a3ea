use serde::Serialize;

/// How a file's content is treated by the matcher. Decided by sniffing the
/// content itself, never by extension or path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    Text,
    Binary,
}

impl std::fmt::Display for SourceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceMode::Text => write!(f, "text"),
            SourceMode::Binary => write!(f, "binary"),
        }
    }
}

/// Classifies raw content: anything that decodes as UTF-8 end to end is
/// Text, everything else Binary. Empty content is vacuously Text.
pub fn classify(content: &[u8]) -> SourceMode {
    match std::str::from_utf8(content) {
        Ok(_) => SourceMode::Text,
        Err(_) => SourceMode::Binary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_content_is_text() {
        assert_eq!(classify(b"plain ascii text\n"), SourceMode::Text);
    }

    #[test]
    fn utf8_content_is_text() {
        assert_eq!(classify("caf\u{e9} \u{1F600}".as_bytes()), SourceMode::Text);
    }

    #[test]
    fn raw_bytes_are_binary() {
        assert_eq!(classify(&[0x00, 0x01, 0xFF]), SourceMode::Binary);
    }

    #[test]
    fn truncated_utf8_sequence_is_binary() {
        // First byte of a two-byte sequence with nothing after it.
        assert_eq!(classify(&[0xC3]), SourceMode::Binary);
    }

    #[test]
    fn empty_content_is_text() {
        assert_eq!(classify(b""), SourceMode::Text);
    }
}
