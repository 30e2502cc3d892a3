//! Indented C++ text writer.
//!
//! Decides how to format; what to emit is decided by the plans built in
//! `interfaces`.

use std::fmt::Write as _;

/// Accumulates lines of C++ with brace-driven indentation.
#[derive(Debug, Clone, Default)]
pub struct CxxWriter {
    out: String,
    indent: usize,
}

impl CxxWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one line at the current indentation.
    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        if text.is_empty() {
            self.out.push('\n');
        } else {
            let _ = writeln!(self.out, "{}{}", "  ".repeat(self.indent), text);
        }
        self
    }

    /// Write several lines.
    pub fn lines<I, S>(&mut self, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for l in lines {
            self.line(l);
        }
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.out.push('\n');
        self
    }

    /// Write `header {` and indent.
    pub fn open(&mut self, header: impl AsRef<str>) -> &mut Self {
        let header = header.as_ref();
        if header.is_empty() {
            self.line("{");
        } else {
            self.line(format!("{} {{", header));
        }
        self.indent += 1;
        self
    }

    /// Dedent and write `}` followed by `suffix`.
    pub fn close(&mut self, suffix: &str) -> &mut Self {
        self.indent = self.indent.saturating_sub(1);
        self.line(format!("}}{}", suffix))
    }

    /// Write a `// comment` line.
    pub fn comment(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.line(format!("// {}", text.as_ref()))
    }

    /// Append another writer's text at the current indentation.
    pub fn append(&mut self, other: &CxxWriter) -> &mut Self {
        for l in other.out.lines() {
            self.line(l);
        }
        self
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// Header guard macro for a generated header path.
pub fn header_guard(path: &str) -> String {
    let mut guard = String::from("LIB_");
    for c in path.chars() {
        if c.is_ascii_alphanumeric() {
            guard.push(c.to_ascii_uppercase());
        } else {
            guard.push('_');
        }
    }
    guard
}

/// C string literal.
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

/// C++ floating point literal.
pub fn real_literal(v: f64) -> String {
    let s = format!("{:?}", v);
    if s.contains('.') || s.contains('e') || s.contains("inf") || s.contains("NaN") {
        s
    } else {
        format!("{}.", s)
    }
}
