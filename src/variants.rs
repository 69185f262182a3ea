use crate::error::{Result, StrfindError};
use regex::Regex;
use serde::Serialize;

/// Cap on how far an `UntilBrace` variant may look ahead for the closing
/// brace. Bounds the scan cost on adversarial content with no `}` at all.
pub const BRACE_LOOKAHEAD: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    /// Literal occurrence of the case-formed pattern.
    Exact,
    /// Pattern plus the shortest run of characters up to and including the
    /// next `}`, bounded by [`BRACE_LOOKAHEAD`].
    UntilBrace,
    /// Pattern plus the longest run of word characters (alphanumeric or `_`).
    WordExtension,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseForm {
    AsGiven,
    Upper,
    Lower,
}

/// One concrete matching rule derived from the base pattern. Built once per
/// scan and reused for every file; carries both the compiled regex used on
/// decoded text and the case-formed literal used on raw bytes.
#[derive(Debug, Clone)]
pub struct PatternVariant {
    pub kind: VariantKind,
    pub case_form: CaseForm,
    pub literal: String,
    pub regex: Regex,
}

impl PatternVariant {
    pub fn literal_bytes(&self) -> &[u8] {
        self.literal.as_bytes()
    }
}

fn compile(kind: VariantKind, literal: &str) -> Result<Regex> {
    let escaped = regex::escape(literal);
    let source = match kind {
        VariantKind::Exact => escaped,
        VariantKind::UntilBrace => {
            format!("{escaped}[^}}]{{0,{BRACE_LOOKAHEAD}}}\\}}?")
        }
        VariantKind::WordExtension => format!("{escaped}\\w*"),
    };
    Regex::new(&source).map_err(StrfindError::Regex)
}

/// Expands the base pattern into the ordered variant set: kind-major
/// (Exact, UntilBrace, WordExtension), each kind once per required case
/// form. Case-insensitive scans add Upper and Lower forms, skipping forms
/// that fold to an already-present string.
pub fn build_variants(pattern: &str, case_sensitive: bool) -> Result<Vec<PatternVariant>> {
    if pattern.is_empty() {
        return Err(StrfindError::InvalidPattern);
    }

    let mut case_forms: Vec<(CaseForm, String)> = vec![(CaseForm::AsGiven, pattern.to_string())];
    if !case_sensitive {
        for (form, cased) in [
            (CaseForm::Upper, pattern.to_uppercase()),
            (CaseForm::Lower, pattern.to_lowercase()),
        ] {
            if !case_forms.iter().any(|(_, existing)| *existing == cased) {
                case_forms.push((form, cased));
            }
        }
    }

    let kinds = [
        VariantKind::Exact,
        VariantKind::UntilBrace,
        VariantKind::WordExtension,
    ];
    let mut variants = Vec::with_capacity(kinds.len() * case_forms.len());
    for kind in kinds {
        for (case_form, literal) in &case_forms {
            variants.push(PatternVariant {
                kind,
                case_form: *case_form,
                literal: literal.clone(),
                regex: compile(kind, literal)?,
            });
        }
    }
    Ok(variants)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insensitive_pattern_yields_three_case_forms_per_kind() {
        let variants = build_variants("HTB{", false).unwrap();
        assert_eq!(variants.len(), 9);
        // Kind-major order, AsGiven first within each kind.
        assert_eq!(variants[0].kind, VariantKind::Exact);
        assert_eq!(variants[0].case_form, CaseForm::AsGiven);
        assert_eq!(variants[2].case_form, CaseForm::Lower);
        assert_eq!(variants[3].kind, VariantKind::UntilBrace);
        assert_eq!(variants[6].kind, VariantKind::WordExtension);
    }

    #[test]
    fn sensitive_pattern_yields_single_case_form() {
        let variants = build_variants("HTB{", true).unwrap();
        assert_eq!(variants.len(), 3);
        assert!(variants.iter().all(|v| v.case_form == CaseForm::AsGiven));
    }

    #[test]
    fn pattern_without_letters_collapses_case_forms() {
        let variants = build_variants("123{", false).unwrap();
        assert_eq!(variants.len(), 3);
        assert!(variants.iter().all(|v| v.case_form == CaseForm::AsGiven));
    }

    #[test]
    fn lowercase_pattern_skips_identical_lower_form() {
        let variants = build_variants("flag{", false).unwrap();
        // AsGiven == Lower, so only AsGiven and Upper survive.
        assert_eq!(variants.len(), 6);
        let forms: Vec<_> = variants.iter().map(|v| v.case_form).collect();
        assert!(!forms.contains(&CaseForm::Lower));
    }

    #[test]
    fn empty_pattern_is_rejected() {
        assert!(matches!(
            build_variants("", false),
            Err(StrfindError::InvalidPattern)
        ));
    }

    #[test]
    fn until_brace_regex_captures_through_closing_brace() {
        let variants = build_variants("HTB{", true).unwrap();
        let until_brace = &variants[1];
        assert_eq!(until_brace.kind, VariantKind::UntilBrace);
        let m = until_brace.regex.find("xx HTB{abc} yy").unwrap();
        assert_eq!(m.as_str(), "HTB{abc}");
    }

    #[test]
    fn until_brace_regex_is_bounded_without_closing_brace() {
        let variants = build_variants("HTB{", true).unwrap();
        let until_brace = &variants[1];
        let haystack = format!("HTB{{{}", "a".repeat(BRACE_LOOKAHEAD * 2));
        let m = until_brace.regex.find(&haystack).unwrap();
        assert_eq!(m.as_str().len(), "HTB{".len() + BRACE_LOOKAHEAD);
    }

    #[test]
    fn word_extension_regex_takes_longest_word_run() {
        let variants = build_variants("flag", true).unwrap();
        let word_ext = &variants[2];
        assert_eq!(word_ext.kind, VariantKind::WordExtension);
        let m = word_ext.regex.find("see flag_2024! here").unwrap();
        assert_eq!(m.as_str(), "flag_2024");
    }
}
