//! Log sanitization for survey respondent identifiers.
//!
//! Formatted log lines pass through [`SanitizingMakeWriter`] before reaching
//! the sink. Redacted:
//! - e-mail addresses
//! - phone numbers (international, French and 8-digit local formats)
//! - national identity card numbers (CIN)
//! - questionnaire record numbers (`N° 12`, `record=12`)
//!
//! Input is capped at `AGRIRISK_SANITIZE_MAX_BYTES` (default 16 KiB) per call.

use regex::{Regex, RegexSet};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

struct Pattern {
    regex: Regex,
    replacement: &'static str,
}

struct Patterns {
    set: RegexSet,
    rules: Vec<Pattern>,
}

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
    std::env::var("AGRIRISK_SANITIZE_MAX_BYTES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_SANITIZE_MAX_BYTES)
}

fn get_patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| {
        // Order matters: contextual identifiers before the bare 8-digit rule.
        let rules: Vec<(&'static str, &'static str)> = vec![
            (
                r"(?i)\b[a-z0-9](?:[a-z0-9._%+-]{0,62}[a-z0-9])?@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b",
                "[REDACTED-EMAIL]",
            ),
            (r"(?i)\bCIN\s*(?:n°|no|:|=)?\s*\d{8}\b", "[REDACTED-CIN]"),
            (r"N°\s*\d+", "N° [REDACTED]"),
            (
                r#"(?i)\brecord(?:_number)?\s*[=:]\s*"?\d+"?"#,
                "record=[REDACTED]",
            ),
            (
                r"(?:\+|\b00)\d{2,3}[\s.-]?\d{2}[\s.-]?\d{3}[\s.-]?\d{3}\b",
                "[REDACTED-PHONE]",
            ),
            (r"\b0[1-9](?:[\s.-]?\d{2}){4}\b", "[REDACTED-PHONE]"),
            (r"\b\d{2}[\s.-]\d{3}[\s.-]\d{3}\b", "[REDACTED-PHONE]"),
            (r"\b\d{8}\b", "[REDACTED-ID]"),
        ];

        let set = RegexSet::new(rules.iter().map(|(p, _)| *p)).expect("Valid regex set");
        let rules = rules
            .into_iter()
            .map(|(pattern, replacement)| Pattern {
                regex: Regex::new(pattern).expect("Valid regex"),
                replacement,
            })
            .collect();

        Patterns { set, rules }
    })
}

/// Replace respondent identifiers in `input`.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, max_sanitize_bytes())
}

fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let patterns = get_patterns();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut result = prefix.to_string();
    for idx in patterns.set.matches(prefix).into_iter() {
        let pattern = &patterns.rules[idx];
        result = pattern
            .regex
            .replace_all(&result, pattern.replacement)
            .to_string();
    }

    if truncated {
        result.push_str(" [TRUNCATED]");
    }
    result
}

/// A `tracing_subscriber` writer wrapper that sanitizes formatted log output
/// before it is written to the underlying sink.
#[derive(Debug)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

impl<M> Clone for SanitizingMakeWriter<M>
where
    M: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

pub struct SanitizingWriter<W> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W> SanitizingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
        }
    }
}

impl<W> SanitizingWriter<W>
where
    W: std::io::Write,
{
    fn write_sanitized(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let text = String::from_utf8_lossy(bytes);
        self.inner.write_all(sanitize(&text).as_bytes())
    }

    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.write_sanitized(&line)?;
        }
        Ok(())
    }
}

impl<W> std::io::Write for SanitizingWriter<W>
where
    W: std::io::Write,
{
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A formatter that never emits a newline must not grow the buffer forever.
        let hard_cap = max_sanitize_bytes().saturating_mul(2);
        if self.buffer.len() > hard_cap {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
            self.inner.write_all(b"\n[TRUNCATED]\n")?;
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;

        if !self.buffer.is_empty() {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
        }

        self.inner.flush()
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter::new(self.inner.make_writer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sanitize_email() {
        let sanitized = sanitize("Contact: ouvriere.sahel@example.tn");
        assert!(sanitized.contains("[REDACTED-EMAIL]"));
        assert!(!sanitized.contains("example.tn"));
    }

    #[test]
    fn test_sanitize_cin() {
        let sanitized = sanitize("CIN: 08123456 enregistrée");
        assert!(sanitized.contains("[REDACTED-CIN]"));
        assert!(!sanitized.contains("08123456"));
    }

    #[test]
    fn test_sanitize_phone_formats() {
        for input in ["+216 98 123 456", "0033 61 234 567", "06 12 34 56 78", "98 123 456"] {
            let sanitized = sanitize(input);
            assert!(sanitized.contains("[REDACTED-PHONE]"), "not redacted: {input}");
        }
    }

    #[test]
    fn test_sanitize_record_numbers() {
        assert_eq!(sanitize("Dossier N° 12 chargé"), "Dossier N° [REDACTED] chargé");
        let sanitized = sanitize(r#"Skipping row record="42""#);
        assert!(sanitized.contains("record=[REDACTED]"));
        assert!(!sanitized.contains("42"));
    }

    #[test]
    fn test_clean_text_untouched() {
        let input = "Model trained samples=120 mae=4.21";
        assert_eq!(sanitize(input), input);
        assert_ne!(sanitize("CIN 12345678"), "CIN 12345678");
    }

    #[test]
    fn test_sanitize_truncates_large_inputs() {
        let input = "prefix 12345678 suffix and much more text";
        let sanitized = sanitize_with_limit(input, 16);
        assert!(sanitized.contains("[TRUNCATED]"));
        assert!(!sanitized.contains("suffix"));
    }

    #[test]
    fn test_truncate_respects_utf8() {
        let (prefix, truncated) = truncate_to_char_boundary("ééé", 3);
        assert_eq!(prefix, "é");
        assert!(truncated);
    }

    #[test]
    fn test_writer_sanitizes_lines() {
        let mut sink = Vec::new();
        {
            let mut writer = SanitizingWriter::new(&mut sink);
            writer
                .write_all(b"contact a@b.org\nsecond line")
                .expect("Should write");
            writer.flush().expect("Should flush");
        }
        let out = String::from_utf8(sink).expect("Should be UTF-8");
        assert_eq!(out, "contact [REDACTED-EMAIL]\nsecond line");
    }
}
