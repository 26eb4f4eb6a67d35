//! Fixed threat signature sets and the matcher shared by the inspection
//! pipeline and field-level validation.
//!
//! Sets are compiled once on first use and never mutated. All patterns are
//! case-insensitive and run on the `regex` crate's linear-time engine, so scan
//! cost is bounded by input length.

use regex::{Regex, RegexBuilder};
use std::fmt;
use std::sync::LazyLock;

/// Category of attack a signature detects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreatClass {
    Xss,
    SqlInjection,
    GenericSuspicious,
}

impl ThreatClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatClass::Xss => "xss",
            ThreatClass::SqlInjection => "sql-injection",
            ThreatClass::GenericSuspicious => "generic-suspicious",
        }
    }
}

impl fmt::Display for ThreatClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compiled pattern tagged with its class and position in its set.
#[derive(Debug)]
pub struct Signature {
    pub class: ThreatClass,
    pub index: usize,
    pattern: Regex,
}

impl Signature {
    pub fn is_match(&self, input: &str) -> bool {
        self.pattern.is_match(input)
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

/// An ordered, immutable list of signatures of one class.
#[derive(Debug)]
pub struct SignatureSet {
    class: ThreatClass,
    signatures: Vec<Signature>,
}

impl SignatureSet {
    fn compile(class: ThreatClass, patterns: &[&str]) -> Self {
        let signatures = patterns
            .iter()
            .enumerate()
            .map(|(index, p)| Signature {
                class,
                index,
                pattern: RegexBuilder::new(p)
                    .case_insensitive(true)
                    .build()
                    .unwrap_or_else(|e| panic!("invalid built-in signature {p:?}: {e}")),
            })
            .collect();

        Self { class, signatures }
    }

    pub fn class(&self) -> ThreatClass {
        self.class
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Signature> {
        self.signatures.iter()
    }
}

const XSS_PATTERNS: &[&str] = &[
    r"<script[^>]*>.*?</script>",
    r"javascript:",
    r"on\w+\s*=",
    r"<iframe[^>]*>",
    r"<object[^>]*>",
    r"<embed[^>]*>",
    r"<link[^>]*>",
    r"<meta[^>]*>",
    r"<img[^>]*onerror[^>]*>",
    r"vbscript:",
    r"data:",
    r"&#x?[0-9a-f]+;",
    r"&#[0-9]+;",
    r"%3C.*?%3E",
    r"&lt;.*?&gt;",
    r"<.*?>",
];

// Bare OR/AND and the `#` comment marker are deliberately absent: they match
// ordinary prose and fragment links. Boolean tautologies and quoted OR/AND
// sequences are still caught below.
const SQL_INJECTION_PATTERNS: &[&str] = &[
    r"\b(SELECT|INSERT|UPDATE|DELETE|DROP|CREATE|ALTER|EXEC|EXECUTE|UNION)\b",
    r"--|/\*|\*/",
    r"\b(WAITFOR|DELAY|SLEEP)\b",
    r"\b(INFORMATION_SCHEMA|sysobjects|syscolumns)\b|\bsys\.",
    r"\b(xp_|sp_)\w*",
    r"\b(CAST|CONVERT)\s*\(",
    r"\b(CHAR|ASCII|SUBSTRING|LEN)\s*\(",
    r"\b(HAVING|GROUP\s+BY|ORDER\s+BY)\b",
    r"\b(OR|AND)\s+\d+\s*=\s*\d+",
    r"'.*?OR.*?'.*?=.*?'",
    r"'.*?AND.*?'.*?=.*?'",
    r"'.*?UNION.*?SELECT",
    r"'.*?DROP.*?TABLE",
    r"'.*?INSERT.*?INTO",
    r"'.*?UPDATE.*?SET",
    r"'.*?DELETE.*?FROM",
];

const GENERIC_SUSPICIOUS_PATTERNS: &[&str] = &[
    r"<script",
    r"\b(javascript|vbscript|data|file|ftp|gopher|telnet|news|mailto):",
    r"\b(UNION|SELECT|INSERT|UPDATE|DELETE|DROP|CREATE|ALTER)\b",
    r"\b(OR|AND)\s+\d+\s*=\s*\d+",
    r"--|/\*|\*/",
];

static XSS: LazyLock<SignatureSet> =
    LazyLock::new(|| SignatureSet::compile(ThreatClass::Xss, XSS_PATTERNS));

static SQL_INJECTION: LazyLock<SignatureSet> =
    LazyLock::new(|| SignatureSet::compile(ThreatClass::SqlInjection, SQL_INJECTION_PATTERNS));

static GENERIC_SUSPICIOUS: LazyLock<SignatureSet> = LazyLock::new(|| {
    SignatureSet::compile(ThreatClass::GenericSuspicious, GENERIC_SUSPICIOUS_PATTERNS)
});

/// Cross-site scripting signatures.
pub fn xss() -> &'static SignatureSet {
    &XSS
}

/// SQL injection signatures.
pub fn sql_injection() -> &'static SignatureSet {
    &SQL_INJECTION
}

/// Signatures applied to forwarding headers.
pub fn generic_suspicious() -> &'static SignatureSet {
    &GENERIC_SUSPICIOUS
}

/// Returns the first signature in set order that matches anywhere in `input`.
///
/// Empty input never matches.
pub fn matches<'a>(input: &str, set: &'a SignatureSet) -> Option<&'a Signature> {
    if input.is_empty() {
        return None;
    }
    set.iter().find(|s| s.is_match(input))
}
