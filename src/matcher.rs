use crate::classifier::SourceMode;
use crate::results::MatchRecord;
use crate::variants::{PatternVariant, VariantKind, BRACE_LOOKAHEAD};
use memchr::memmem;

/// Characters (text) or bytes (binary) of context kept on each side of a
/// match, clipped at content boundaries.
pub const CONTEXT_WINDOW: usize = 50;
const CONTEXT_LINES: usize = 2;

/// Runs every variant against one file's content with the strategy matching
/// its classification. Hits come back in variant order, leftmost first
/// within each variant, and are not yet deduplicated.
pub fn match_content(
    content: &[u8],
    mode: SourceMode,
    variants: &[PatternVariant],
) -> Vec<MatchRecord> {
    match mode {
        SourceMode::Text => {
            // The classifier only hands us Text for content that decoded
            // cleanly, so this cannot fail for its callers.
            match std::str::from_utf8(content) {
                Ok(text) => match_text(text, variants),
                Err(_) => match_binary(content, variants),
            }
        }
        SourceMode::Binary => match_binary(content, variants),
    }
}

/// Scans decoded text with each variant's regex. Offsets are character
/// indices into the decoded content.
fn match_text(text: &str, variants: &[PatternVariant]) -> Vec<MatchRecord> {
    let mut hits = Vec::new();
    for variant in variants {
        for m in variant.regex.find_iter(text) {
            let char_offset = text[..m.start()].chars().count();
            hits.push(MatchRecord {
                variant: variant.kind,
                case_form: variant.case_form,
                offset: char_offset,
                matched: m.as_str().to_string(),
                context_before: escape_text(&last_chars(&text[..m.start()], CONTEXT_WINDOW)),
                context_after: escape_text(&first_chars(&text[m.end()..], CONTEXT_WINDOW)),
                line_context: Some(line_context(text, m.start())),
                hex_context: None,
                mode: SourceMode::Text,
            });
        }
    }
    hits
}

/// Scans raw bytes with each variant's case-formed literal, extending the
/// span for the capture kinds with the same predicates the text regexes
/// use. Offsets are byte indices.
fn match_binary(content: &[u8], variants: &[PatternVariant]) -> Vec<MatchRecord> {
    let mut hits = Vec::new();
    for variant in variants {
        let needle = variant.literal_bytes();
        if needle.is_empty() {
            continue;
        }
        for start in memmem::find_iter(content, needle) {
            let end = extend_span(content, start + needle.len(), variant.kind);
            let window_start = start.saturating_sub(CONTEXT_WINDOW);
            let window_end = (end + CONTEXT_WINDOW).min(content.len());
            hits.push(MatchRecord {
                variant: variant.kind,
                case_form: variant.case_form,
                offset: start,
                matched: render_bytes(&content[start..end]),
                context_before: render_bytes(&content[window_start..start]),
                context_after: render_bytes(&content[end..window_end]),
                line_context: None,
                hex_context: Some(hex_bytes(&content[window_start..window_end])),
                mode: SourceMode::Binary,
            });
        }
    }
    hits
}

/// Extends a binary hit past the base literal according to the variant
/// kind: through the next `}` (bounded), or across the run of word bytes.
fn extend_span(content: &[u8], base_end: usize, kind: VariantKind) -> usize {
    match kind {
        VariantKind::Exact => base_end,
        VariantKind::UntilBrace => {
            let cap = (base_end + BRACE_LOOKAHEAD).min(content.len());
            let mut pos = base_end;
            while pos < cap && content[pos] != b'}' {
                pos += 1;
            }
            if pos < cap {
                pos += 1; // include the closing brace
            }
            pos
        }
        VariantKind::WordExtension => {
            let mut pos = base_end;
            while pos < content.len() && is_word_byte(content[pos]) {
                pos += 1;
            }
            pos
        }
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Flattens a context slice onto one display line.
fn escape_text(s: &str) -> String {
    s.replace('\n', "\\n").replace('\r', "\\r")
}

fn last_chars(s: &str, n: usize) -> String {
    let total = s.chars().count();
    s.chars().skip(total.saturating_sub(n)).collect()
}

fn first_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

/// Best-effort printable rendering of raw bytes: ASCII printables pass
/// through, everything else becomes `\xNN`.
fn render_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        if (0x20..=0x7e).contains(&b) {
            out.push(b as char);
        } else {
            out.push_str(&format!("\\x{b:02x}"));
        }
    }
    out
}

fn hex_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// The line holding the match plus up to two lines on each side, with the
/// target line marked.
fn line_context(text: &str, byte_pos: usize) -> String {
    let target = text[..byte_pos].matches('\n').count();
    let lines: Vec<&str> = text.split('\n').collect();
    let start = target.saturating_sub(CONTEXT_LINES);
    let end = (target + CONTEXT_LINES + 1).min(lines.len());
    lines[start..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if start + i == target {
                format!(">>> {line}")
            } else {
                (*line).to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variants::{build_variants, CaseForm};

    fn exact_only(pattern: &str, case_sensitive: bool) -> Vec<PatternVariant> {
        build_variants(pattern, case_sensitive)
            .unwrap()
            .into_iter()
            .filter(|v| v.kind == VariantKind::Exact)
            .collect()
    }

    #[test]
    fn exact_text_match_reports_character_offset() {
        let variants = exact_only("HTB{", true);
        let hits = match_text("abc HTB{x} def", &variants);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].offset, 4);
        assert_eq!(hits[0].matched, "HTB{");
    }

    #[test]
    fn character_offsets_account_for_multibyte_prefix() {
        let variants = exact_only("HTB{", true);
        let hits = match_text("\u{e9}\u{e9} HTB{", &variants);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].offset, 3);
    }

    #[test]
    fn until_brace_captures_full_flag() {
        let variants = build_variants("HTB{", true).unwrap();
        let hits = match_text("header HTB{abc} footer", &variants);
        let captured: Vec<_> = hits
            .iter()
            .filter(|h| h.variant == VariantKind::UntilBrace)
            .map(|h| h.matched.as_str())
            .collect();
        assert_eq!(captured, vec!["HTB{abc}"]);
    }

    #[test]
    fn hits_preserve_variant_then_position_order() {
        let variants = build_variants("HTB{", true).unwrap();
        let hits = match_text("HTB{a} then HTB{b}", &variants);
        // All Exact hits first, each leftmost-first.
        assert_eq!(hits[0].variant, VariantKind::Exact);
        assert_eq!(hits[1].variant, VariantKind::Exact);
        assert!(hits[0].offset < hits[1].offset);
        assert_eq!(hits[2].variant, VariantKind::UntilBrace);
    }

    #[test]
    fn matcher_is_idempotent() {
        let variants = build_variants("flag", false).unwrap();
        let content = "FLAG{one} flag_two Flag";
        let first = match_text(content, &variants);
        let second = match_text(content, &variants);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.offset, b.offset);
            assert_eq!(a.matched, b.matched);
            assert_eq!(a.variant, b.variant);
        }
    }

    #[test]
    fn context_is_clipped_at_content_boundaries() {
        let variants = exact_only("HTB{", true);
        let hits = match_text("HTB{x", &variants);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].context_before, "");
        assert_eq!(hits[0].context_after, "x");
    }

    #[test]
    fn context_newlines_are_escaped() {
        let variants = exact_only("HTB{", true);
        let hits = match_text("line1\nHTB{x}\nline3", &variants);
        assert_eq!(hits[0].context_before, "line1\\n");
        assert!(hits[0].context_after.contains("\\n"));
    }

    #[test]
    fn line_context_marks_matching_line() {
        let variants = exact_only("HTB{", true);
        let hits = match_text("one\ntwo\nHTB{x}\nfour\nfive\nsix", &variants);
        let ctx = hits[0].line_context.as_deref().unwrap();
        assert_eq!(ctx, "one\ntwo\n>>> HTB{x}\nfour\nfive");
    }

    #[test]
    fn binary_exact_match_reports_byte_offset() {
        let variants = exact_only("HTB{", true);
        let content = b"\x00\x01HTB{flag}\xff";
        let hits = match_binary(content, &variants);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].offset, 2);
        assert_eq!(hits[0].matched, "HTB{");
        assert_eq!(hits[0].mode, SourceMode::Binary);
    }

    #[test]
    fn binary_until_brace_extends_through_closing_brace() {
        let variants = build_variants("HTB{", true).unwrap();
        let content = b"\x00HTB{abc}\x01rest";
        let hits = match_binary(content, &variants);
        let captured: Vec<_> = hits
            .iter()
            .filter(|h| h.variant == VariantKind::UntilBrace)
            .map(|h| h.matched.as_str())
            .collect();
        assert_eq!(captured, vec!["HTB{abc}"]);
    }

    #[test]
    fn binary_until_brace_is_bounded_without_closing_brace() {
        let variants = build_variants("HTB{", true).unwrap();
        let mut content = b"HTB{".to_vec();
        content.extend(std::iter::repeat(b'a').take(BRACE_LOOKAHEAD * 2));
        let hits = match_binary(&content, &variants);
        let until_brace = hits
            .iter()
            .find(|h| h.variant == VariantKind::UntilBrace)
            .unwrap();
        assert_eq!(until_brace.matched.len(), "HTB{".len() + BRACE_LOOKAHEAD);
    }

    #[test]
    fn binary_word_extension_stops_at_non_word_byte() {
        let variants = build_variants("flag", true).unwrap();
        let content = b"\xffflag_123!more";
        let hits = match_binary(content, &variants);
        let word_ext = hits
            .iter()
            .find(|h| h.variant == VariantKind::WordExtension)
            .unwrap();
        assert_eq!(word_ext.matched, "flag_123");
    }

    #[test]
    fn binary_case_variants_hit_lowercased_content() {
        let variants = exact_only("HTB{", false);
        let content = b"\x00htb{x}\xff";
        let hits = match_binary(content, &variants);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].case_form, CaseForm::Lower);
        assert_eq!(hits[0].offset, 1);
    }

    #[test]
    fn binary_context_renders_unprintable_bytes_escaped() {
        let variants = exact_only("HTB{", true);
        let content = b"\x00\x01HTB{x";
        let hits = match_binary(content, &variants);
        assert_eq!(hits[0].context_before, "\\x00\\x01");
        assert!(hits[0].hex_context.as_deref().unwrap().starts_with("0001"));
    }

    #[test]
    fn empty_content_yields_no_hits() {
        let variants = build_variants("HTB{", false).unwrap();
        assert!(match_text("", &variants).is_empty());
        assert!(match_binary(b"", &variants).is_empty());
    }
}
