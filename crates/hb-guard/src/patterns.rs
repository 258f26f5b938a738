//! Attack signatures.
//!
//! A hit here is not a validation problem; the request is rejected as
//! suspicious and logged with its origin.

use once_cell::sync::Lazy;
use regex::Regex;

struct Signature {
    name: &'static str,
    pattern: Regex,
}

static SIGNATURES: Lazy<Vec<Signature>> = Lazy::new(|| {
    [
        ("sql-union-select", r"(?i)\bunion\s+(?:all\s+)?select\b"),
        ("sql-drop", r"(?i)\bdrop\s+(?:table|database)\b"),
        ("sql-insert", r"(?i)\binsert\s+into\b"),
        ("sql-delete", r"(?i)\bdelete\s+from\b"),
        ("sql-tautology", r#"(?i)['"]\s*or\s+['"]?\w+['"]?\s*=\s*['"]?\w+"#),
        ("sql-comment", r";\s*--"),
        ("embedded-frame", r"(?i)<\s*(?:iframe|object|embed)\b"),
        ("eval-call", r"(?i)\beval\s*\("),
        ("timer-injection", r"(?i)\bset(?:timeout|interval)\s*\("),
    ]
    .into_iter()
    .map(|(name, pattern)| Signature {
        name,
        pattern: Regex::new(pattern).expect("valid regex"),
    })
    .collect()
});

/// Name of the first signature `text` matches, if any.
pub fn find_signature(text: &str) -> Option<&'static str> {
    SIGNATURES
        .iter()
        .find(|sig| sig.pattern.is_match(text))
        .map(|sig| sig.name)
}
