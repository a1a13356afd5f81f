//! Log sanitization: redact patient identifiers from formatted log output.
//!
//! Redacted patterns:
//! - SSN-like numbers
//! - Medical record numbers (MRNs)
//! - E-mail addresses and phone numbers
//! - Dates of birth written as `DOB: yyyy-mm-dd`
//!
//! History entry ids are random UUIDs and pass through untouched. Services
//! never log lab values; this layer catches identifiers that reach a log line
//! anyway.
//!
//! Input is capped (see `HEPASCORE_SANITIZE_MAX_BYTES`) so a single huge
//! line cannot stall the logger.

use std::io::{self, Write};
use std::sync::OnceLock;

use regex::{Regex, RegexSet};
use tracing_subscriber::fmt::MakeWriter;

static PII_PATTERNS: OnceLock<PiiPatterns> = OnceLock::new();

/// Default cap on bytes scanned per call.
const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

const SANITIZE_MAX_BYTES_ENV: &str = "HEPASCORE_SANITIZE_MAX_BYTES";

struct PiiPattern {
    regex: Regex,
    replacement: &'static str,
}

struct PiiPatterns {
    set: RegexSet,
    patterns: Vec<PiiPattern>,
}

const RULES: [(&str, &str); 5] = [
    (r"\b\d{3}-\d{2}-\d{4}\b", "[REDACTED-SSN]"),
    (r"\bMRN[:\s]?\d{6,10}\b", "[REDACTED-MRN]"),
    (
        r"(?i)\b[a-z0-9](?:[a-z0-9._%+-]{0,62}[a-z0-9])?@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b",
        "[REDACTED-EMAIL]",
    ),
    (
        r"\b(?:\+?1[-.\s]?)?\(?[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}\b",
        "[REDACTED-PHONE]",
    ),
    (
        r"(?i)\b(?:dob|date of birth)\s*[:=]?\s*\d{4}-\d{2}-\d{2}\b",
        "[REDACTED-DOB]",
    ),
];

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }

    let mut end = max_bytes.min(input.len());
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

fn max_sanitize_bytes() -> usize {
    std::env::var(SANITIZE_MAX_BYTES_ENV)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_SANITIZE_MAX_BYTES)
}

fn get_patterns() -> &'static PiiPatterns {
    PII_PATTERNS.get_or_init(|| {
        // The patterns are compile-time constants; failure here is a programming error.
        let set = RegexSet::new(RULES.iter().map(|(p, _)| *p)).expect("Valid regex set");
        let patterns = RULES
            .iter()
            .map(|&(pattern, replacement)| PiiPattern {
                regex: Regex::new(pattern).expect("Valid regex"),
                replacement,
            })
            .collect();

        PiiPatterns { set, patterns }
    })
}

/// Replace identifiers in `input` with redaction markers.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, max_sanitize_bytes())
}

fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let patterns = get_patterns();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut result = prefix.to_string();
    for idx in patterns.set.matches(prefix).into_iter() {
        let pattern = &patterns.patterns[idx];
        result = pattern
            .regex
            .replace_all(&result, pattern.replacement)
            .into_owned();
    }

    if truncated {
        result.push_str(" [TRUNCATED]");
    }
    result
}

/// Check if a string contains a redactable identifier.
#[must_use]
pub fn contains_pii(input: &str) -> bool {
    let (prefix, _) = truncate_to_char_boundary(input, max_sanitize_bytes());
    get_patterns().set.is_match(prefix)
}

/// Wraps a `MakeWriter` so every log event is redacted before it reaches
/// the sink.
#[derive(Debug, Clone)]
pub struct RedactingMakeWriter<M> {
    inner: M,
}

impl<M> RedactingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

impl<'a, M> MakeWriter<'a> for RedactingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = RedactingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter {
            inner: self.inner.make_writer(),
            pending: String::new(),
        }
    }
}

/// Per-event writer. Complete lines are redacted as they arrive; a trailing
/// partial line is redacted on flush or drop.
pub struct RedactingWriter<W: Write> {
    inner: W,
    pending: String,
}

impl<W: Write> RedactingWriter<W> {
    fn emit(&mut self, text: &str) -> io::Result<()> {
        self.inner.write_all(sanitize(text).as_bytes())
    }

    fn emit_complete_lines(&mut self) -> io::Result<()> {
        let Some(last_newline) = self.pending.rfind('\n') else {
            return Ok(());
        };
        let complete: String = self.pending.drain(..=last_newline).collect();
        for line in complete.split_inclusive('\n') {
            self.emit(line)?;
        }
        Ok(())
    }

    fn emit_rest(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let rest = std::mem::take(&mut self.pending);
        self.emit(&rest)
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.push_str(&String::from_utf8_lossy(buf));
        self.emit_complete_lines()?;

        // An unterminated run longer than the scan cap is cut here.
        if self.pending.len() > max_sanitize_bytes() {
            self.emit_rest()?;
            self.inner.write_all(b"\n")?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit_complete_lines()?;
        self.emit_rest()?;
        self.inner.flush()
    }
}

impl<W: Write> Drop for RedactingWriter<W> {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_ids_pass_through() {
        let line = "Assessment complete: level=Medium, score=57, confidence=90, \
                    entry=550e8400-e29b-41d4-a716-446655440000";
        assert!(!contains_pii(line));
        assert_eq!(sanitize(line), line);
    }

    #[test]
    fn test_sanitize_ssn_and_mrn() {
        let sanitized = sanitize("SSN: 123-45-6789, MRN:12345678");
        assert!(sanitized.contains("[REDACTED-SSN]"));
        assert!(sanitized.contains("[REDACTED-MRN]"));
    }

    #[test]
    fn test_sanitize_contact_details() {
        let sanitized = sanitize("Contact: patient@clinic.org or 555-867-5309");
        assert!(sanitized.contains("[REDACTED-EMAIL]"));
        assert!(sanitized.contains("[REDACTED-PHONE]"));
    }

    #[test]
    fn test_sanitize_date_of_birth() {
        let sanitized = sanitize("DOB: 1958-04-12 submitted");
        assert_eq!(sanitized, "[REDACTED-DOB] submitted");
    }

    #[test]
    fn test_sanitize_truncates_large_inputs() {
        let input = "call 555-867-5309 before friday";
        let sanitized = sanitize_with_limit(input, 17);
        assert_eq!(sanitized, "call [REDACTED-PHONE] [TRUNCATED]");
    }

    #[test]
    fn test_writer_redacts_each_line() {
        let mut sink = Vec::new();
        {
            let mut writer = RedactingWriter {
                inner: &mut sink,
                pending: String::new(),
            };
            writer
                .write_all(b"reach me at patient@clinic.org\nSSN 123-45-6789\n")
                .expect("Should write");
        }
        let out = String::from_utf8(sink).expect("Should be utf-8");
        assert_eq!(out, "reach me at [REDACTED-EMAIL]\nSSN [REDACTED-SSN]\n");
    }

    #[test]
    fn test_writer_redacts_partial_line_on_drop() {
        let mut sink = Vec::new();
        {
            let mut writer = RedactingWriter {
                inner: &mut sink,
                pending: String::new(),
            };
            writer.write_all(b"done\nMRN 1234567").expect("Should write");
        }
        let out = String::from_utf8(sink).expect("Should be utf-8");
        assert_eq!(out, "done\n[REDACTED-MRN]");
    }
}
