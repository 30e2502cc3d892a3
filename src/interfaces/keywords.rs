//! Keyword files.
//!
//! Interface keywords are forwarded by the behaviour front end as
//! `;`-terminated statements:
//!
//! ```text
//! // comments are allowed
//! @AnsysFiniteStrainStrategy "FiniteRotationSmallStrain";
//! @GenerateMTestFileOnFailure[Abaqus,Castem] true;
//! ```
//!
//! This module holds the shared lexer, the statement splitter and the
//! value readers used by [`Interface::treat_keyword`](super::Interface::treat_keyword).

use std::path::Path;

use anyhow::{Context, Result};
use miette::{NamedSource, SourceSpan};

use crate::core::behaviour::AttributeValue;
use crate::core::finite_strain::FiniteStrainStrategy;
use crate::interfaces::errors::GenerationError;
use crate::interfaces::host::KeywordValue;
use crate::util::diagnostic::KeywordSyntaxError;

/// Kind of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `@Name`, the value keeps the `@`.
    Keyword,
    Identifier,
    /// Quoted string, the value is unquoted.
    String,
    Number,
    Semicolon,
    LBracket,
    RBracket,
    Comma,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    /// Byte offset in the source.
    pub offset: usize,
}

impl Token {
    fn new(kind: TokenKind, value: impl Into<String>, offset: usize) -> Self {
        Token {
            kind,
            value: value.into(),
            offset,
        }
    }

    fn describe(&self) -> String {
        match self.kind {
            TokenKind::String => format!("\"{}\"", self.value),
            _ => self.value.clone(),
        }
    }
}

fn syntax_error(name: &str, src: &str, offset: usize, message: impl Into<String>) -> KeywordSyntaxError {
    let len = src[offset..].chars().next().map(|c| c.len_utf8()).unwrap_or(0);
    KeywordSyntaxError {
        message: message.into(),
        src: NamedSource::new(name, src.to_string()),
        span: SourceSpan::from((offset, len)),
    }
}

fn is_identifier_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b':'
}

/// Split a keyword source into tokens.
pub fn tokenize(name: &str, src: &str) -> Result<Vec<Token>, KeywordSyntaxError> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b' ' | b'\t' | b'\r' | b'\n' => i += 1,
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let start = i;
                i += 2;
                loop {
                    if i + 1 >= bytes.len() {
                        return Err(syntax_error(name, src, start, "unterminated comment"));
                    }
                    if bytes[i] == b'*' && bytes[i + 1] == b'/' {
                        i += 2;
                        break;
                    }
                    i += 1;
                }
            }
            b';' => {
                tokens.push(Token::new(TokenKind::Semicolon, ";", i));
                i += 1;
            }
            b'[' => {
                tokens.push(Token::new(TokenKind::LBracket, "[", i));
                i += 1;
            }
            b']' => {
                tokens.push(Token::new(TokenKind::RBracket, "]", i));
                i += 1;
            }
            b',' => {
                tokens.push(Token::new(TokenKind::Comma, ",", i));
                i += 1;
            }
            b'"' => {
                let start = i;
                let mut value = String::new();
                i += 1;
                loop {
                    match bytes.get(i) {
                        None | Some(b'\n') => {
                            return Err(syntax_error(name, src, start, "unterminated string"));
                        }
                        Some(b'"') => {
                            i += 1;
                            break;
                        }
                        Some(b'\\') if i + 1 < bytes.len() => {
                            let ch = src[i + 1..].chars().next().unwrap_or('\u{fffd}');
                            value.push(ch);
                            i += 1 + ch.len_utf8();
                        }
                        Some(_) => {
                            // strings may hold UTF-8, copy whole characters
                            let ch = src[i..].chars().next().unwrap_or('\u{fffd}');
                            value.push(ch);
                            i += ch.len_utf8();
                        }
                    }
                }
                tokens.push(Token::new(TokenKind::String, value, start));
            }
            b'@' => {
                let start = i;
                i += 1;
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                if i == start + 1 {
                    return Err(syntax_error(name, src, start, "expected a keyword name after `@`"));
                }
                tokens.push(Token::new(TokenKind::Keyword, &src[start..i], start));
            }
            b'0'..=b'9' | b'.' | b'+' | b'-' => {
                let start = i;
                i = scan_number(bytes, i);
                if i == start {
                    return Err(syntax_error(name, src, start, "invalid number"));
                }
                tokens.push(Token::new(TokenKind::Number, &src[start..i], start));
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                let start = i;
                while i < bytes.len() && is_identifier_char(bytes[i]) {
                    i += 1;
                }
                tokens.push(Token::new(TokenKind::Identifier, &src[start..i], start));
            }
            _ => {
                let ch = src[i..].chars().next().unwrap_or('?');
                return Err(syntax_error(
                    name,
                    src,
                    i,
                    format!("unexpected character `{}`", ch),
                ));
            }
        }
    }
    Ok(tokens)
}

/// End of the number starting at `start`, `start` if there is none.
fn scan_number(bytes: &[u8], start: usize) -> usize {
    let digits = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };
    let mut i = start;
    if matches!(bytes.get(i), Some(b'+') | Some(b'-')) {
        i += 1;
    }
    let int_end = digits(i);
    let mut end = int_end;
    if bytes.get(end) == Some(&b'.') {
        end = digits(end + 1);
    }
    // a lone sign or dot
    if end == i || (end == i + 1 && bytes[i] == b'.') {
        return start;
    }
    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut j = end + 1;
        if matches!(bytes.get(j), Some(b'+') | Some(b'-')) {
            j += 1;
        }
        let exp_end = digits(j);
        if exp_end > j {
            end = exp_end;
        }
    }
    end
}

/// A `@Key[targets] value;` statement of a keyword file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordStatement {
    pub key: String,
    /// Interfaces the statement is restricted to, empty when unscoped.
    pub targets: Vec<String>,
    /// Index of the first value token.
    pub position: usize,
    /// Index following the closing `;`.
    pub end: usize,
    /// Byte offset of the key.
    pub offset: usize,
}

/// A lexed keyword file.
#[derive(Debug, Clone)]
pub struct KeywordFile {
    pub name: String,
    pub source: String,
    pub tokens: Vec<Token>,
}

impl KeywordFile {
    pub fn parse(name: &str, source: &str) -> Result<Self, KeywordSyntaxError> {
        Ok(KeywordFile {
            name: name.to_string(),
            source: source.to_string(),
            tokens: tokenize(name, source)?,
        })
    }

    /// Load and lex a keyword file.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read keyword file: {}", path.display()))?;
        let name = path.display().to_string();
        KeywordFile::parse(&name, &source).map_err(anyhow::Error::new)
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> KeywordSyntaxError {
        syntax_error(&self.name, &self.source, offset, message)
    }

    /// Split the tokens into statements.
    pub fn statements(&self) -> Result<Vec<KeywordStatement>, KeywordSyntaxError> {
        let tokens = &self.tokens;
        let eof = self.source.len();
        let mut statements = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            let key = &tokens[i];
            if key.kind != TokenKind::Keyword {
                return Err(self.error(
                    key.offset,
                    format!("expected a keyword, found `{}`", key.describe()),
                ));
            }
            i += 1;
            let mut targets = Vec::new();
            if tokens.get(i).map(|t| t.kind) == Some(TokenKind::LBracket) {
                i += 1;
                loop {
                    match tokens.get(i) {
                        Some(t) if matches!(t.kind, TokenKind::Identifier | TokenKind::String) => {
                            targets.push(t.value.clone());
                            i += 1;
                        }
                        Some(t) => {
                            return Err(self.error(t.offset, "expected an interface name"));
                        }
                        None => return Err(self.error(eof, "unterminated interface list")),
                    }
                    match tokens.get(i) {
                        Some(t) if t.kind == TokenKind::Comma => i += 1,
                        Some(t) if t.kind == TokenKind::RBracket => {
                            i += 1;
                            break;
                        }
                        Some(t) => return Err(self.error(t.offset, "expected `,` or `]`")),
                        None => return Err(self.error(eof, "unterminated interface list")),
                    }
                }
            }
            let position = i;
            loop {
                match tokens.get(i) {
                    Some(t) if t.kind == TokenKind::Semicolon => {
                        i += 1;
                        break;
                    }
                    Some(t) if t.kind == TokenKind::Keyword => {
                        return Err(self.error(
                            t.offset,
                            format!("missing `;` after `{}`", key.value),
                        ));
                    }
                    Some(_) => i += 1,
                    None => {
                        return Err(self.error(eof, format!("missing `;` after `{}`", key.value)));
                    }
                }
            }
            statements.push(KeywordStatement {
                key: key.value.clone(),
                targets,
                position,
                end: i,
                offset: key.offset,
            });
        }
        Ok(statements)
    }
}

/// A keyword value read from the token stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedValue {
    Bool(bool),
    Real(f64),
    UnsignedInt(u32),
    Choice(String),
    Strategy(FiniteStrainStrategy),
}

impl ParsedValue {
    /// Behaviour attribute storing the value.
    pub fn to_attribute(&self) -> AttributeValue {
        match self {
            ParsedValue::Bool(b) => AttributeValue::Bool(*b),
            ParsedValue::Real(v) => AttributeValue::Float(*v),
            ParsedValue::UnsignedInt(v) => AttributeValue::Float(f64::from(*v)),
            ParsedValue::Choice(s) => AttributeValue::String(s.clone()),
            ParsedValue::Strategy(s) => AttributeValue::String(s.as_str().to_string()),
        }
    }
}

fn invalid(keyword: &str, found: Option<&Token>, expected: impl Into<String>) -> GenerationError {
    GenerationError::InvalidKeywordValue {
        keyword: keyword.to_string(),
        value: found
            .map(Token::describe)
            .unwrap_or_else(|| "end of file".to_string()),
        expected: expected.into(),
    }
}

fn expected_description(expected: KeywordValue) -> String {
    match expected {
        KeywordValue::Flag | KeywordValue::Bool => "`true` or `false`".to_string(),
        KeywordValue::Real => "a real number".to_string(),
        KeywordValue::UnsignedInt => "an unsigned integer".to_string(),
        KeywordValue::Choice(choices) => format!("one of {}", choices.join(", ")),
        KeywordValue::Strategy => format!(
            "one of {}",
            FiniteStrainStrategy::ALL
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

/// Read the value of `keyword` starting at `tokens[pos]`, followed by `;`.
///
/// Returns the value and the position after the `;`.
pub fn read_value(
    keyword: &str,
    expected: KeywordValue,
    tokens: &[Token],
    pos: usize,
) -> Result<(ParsedValue, usize), GenerationError> {
    let token = tokens.get(pos);
    let word = token
        .filter(|t| matches!(t.kind, TokenKind::Identifier | TokenKind::String))
        .map(|t| t.value.as_str());
    let fail = || invalid(keyword, token, expected_description(expected));
    let value = match expected {
        KeywordValue::Flag if token.map(|t| t.kind) == Some(TokenKind::Semicolon) => {
            return Ok((ParsedValue::Bool(true), pos + 1));
        }
        KeywordValue::Flag | KeywordValue::Bool => match word {
            Some("true") => ParsedValue::Bool(true),
            Some("false") => ParsedValue::Bool(false),
            _ => return Err(fail()),
        },
        KeywordValue::Real => {
            let v = token
                .filter(|t| t.kind == TokenKind::Number)
                .and_then(|t| t.value.parse::<f64>().ok())
                .ok_or_else(fail)?;
            ParsedValue::Real(v)
        }
        KeywordValue::UnsignedInt => {
            let v = token
                .filter(|t| t.kind == TokenKind::Number)
                .and_then(|t| t.value.parse::<u32>().ok())
                .ok_or_else(fail)?;
            ParsedValue::UnsignedInt(v)
        }
        KeywordValue::Choice(choices) => match word {
            Some(w) if choices.contains(&w) => ParsedValue::Choice(w.to_string()),
            _ => return Err(fail()),
        },
        KeywordValue::Strategy => {
            let s = word.ok_or_else(fail)?;
            ParsedValue::Strategy(s.parse::<FiniteStrainStrategy>().map_err(|_| fail())?)
        }
    };
    match tokens.get(pos + 1) {
        Some(t) if t.kind == TokenKind::Semicolon => Ok((value, pos + 2)),
        other => Err(invalid(keyword, other, "`;`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize("test", src)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_tokenize_statement() {
        use TokenKind::*;
        assert_eq!(
            kinds("@AnsysFiniteStrainStrategy \"Native\"; // trailing"),
            vec![Keyword, String, Semicolon]
        );
        assert_eq!(
            kinds("@GenerateMTestFileOnFailure[Abaqus, Castem] true;"),
            vec![Keyword, LBracket, Identifier, Comma, Identifier, RBracket, Identifier, Semicolon]
        );
        assert_eq!(kinds("/* block\ncomment */ 1.e-6 -3 12"), vec![Number, Number, Number]);
    }

    #[test]
    fn test_tokenize_values() {
        let tokens = tokenize("test", "@Key \"a\\\"b\" 2.5e+3 LS-DYNA;").unwrap();
        assert_eq!(tokens[0].value, "@Key");
        assert_eq!(tokens[1].value, "a\"b");
        assert_eq!(tokens[2].value, "2.5e+3");
        assert_eq!(tokens[3].value, "LS-DYNA");
        assert_eq!(tokens[4].offset, 26);
    }

    #[test]
    fn test_tokenize_escaped_multibyte_character() {
        let tokens = tokenize("test", "@Key \"\\é\\ü-x\";").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::String);
        assert_eq!(tokens[1].value, "éü-x");
        assert_eq!(tokens[2].kind, TokenKind::Semicolon);
        assert_eq!(tokens[2].offset, "@Key \"\\é\\ü-x\"".len());
    }

    #[test]
    fn test_tokenize_errors() {
        let err = tokenize("test", "@Key \"open;").unwrap_err();
        assert!(err.message.contains("unterminated string"));
        let err = tokenize("test", "@Key $;").unwrap_err();
        assert!(err.message.contains("unexpected character `$`"));
        assert_eq!(err.span.offset(), 5);
        assert!(tokenize("test", "/* never closed").is_err());
        assert!(tokenize("test", "@ true;").is_err());
    }

    #[test]
    fn test_statements() {
        let file = KeywordFile::parse(
            "kw",
            "@AsterCompareToNumericalTangentOperator;\n@GenerateMTestFileOnFailure[Ansys] false;",
        )
        .unwrap();
        let statements = file.statements().unwrap();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].key, "@AsterCompareToNumericalTangentOperator");
        assert!(statements[0].targets.is_empty());
        assert_eq!(statements[0].position, 1);
        assert_eq!(statements[0].end, 2);
        assert_eq!(statements[1].targets, vec!["Ansys".to_string()]);
        assert_eq!(file.tokens[statements[1].position].value, "false");
    }

    #[test]
    fn test_statements_missing_semicolon() {
        let file = KeywordFile::parse("kw", "@CastemUseTimeSubStepping true\n@Other;").unwrap();
        let err = file.statements().unwrap_err();
        assert!(err.message.contains("missing `;`"));
        let file = KeywordFile::parse("kw", "@CastemUseTimeSubStepping true").unwrap();
        assert!(file.statements().is_err());
        let file = KeywordFile::parse("kw", "true;").unwrap();
        assert!(file.statements().is_err());
    }

    #[test]
    fn test_read_flag() {
        let tokens = tokenize("t", "; true;").unwrap();
        let (v, next) = read_value("@K", KeywordValue::Flag, &tokens, 0).unwrap();
        assert_eq!(v, ParsedValue::Bool(true));
        assert_eq!(next, 1);
        let (v, next) = read_value("@K", KeywordValue::Flag, &tokens, 1).unwrap();
        assert_eq!(v, ParsedValue::Bool(true));
        assert_eq!(next, 3);
    }

    #[test]
    fn test_read_numbers() {
        let tokens = tokenize("t", "1e-7; 12; -1;").unwrap();
        let (v, _) = read_value("@K", KeywordValue::Real, &tokens, 0).unwrap();
        assert_eq!(v, ParsedValue::Real(1e-7));
        let (v, _) = read_value("@K", KeywordValue::UnsignedInt, &tokens, 2).unwrap();
        assert_eq!(v, ParsedValue::UnsignedInt(12));
        let err = read_value("@K", KeywordValue::UnsignedInt, &tokens, 4).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidKeywordValue { .. }));
    }

    #[test]
    fn test_read_choice_and_strategy() {
        let choices = KeywordValue::Choice(&["Native", "MFront"]);
        let tokens = tokenize("t", "\"MFront\"; Other; FiniteRotationSmallStrain;").unwrap();
        let (v, _) = read_value("@K", choices, &tokens, 0).unwrap();
        assert_eq!(v, ParsedValue::Choice("MFront".to_string()));
        assert!(read_value("@K", choices, &tokens, 2).is_err());
        let (v, next) = read_value("@K", KeywordValue::Strategy, &tokens, 4).unwrap();
        assert_eq!(
            v,
            ParsedValue::Strategy(FiniteStrainStrategy::FiniteRotationSmallStrain)
        );
        assert_eq!(next, 6);
    }

    #[test]
    fn test_read_value_requires_semicolon() {
        let tokens = tokenize("t", "true false").unwrap();
        let err = read_value("@AbaqusGenerateMTestFileOnFailure", KeywordValue::Bool, &tokens, 0)
            .unwrap_err();
        match err {
            GenerationError::InvalidKeywordValue { value, expected, .. } => {
                assert_eq!(value, "false");
                assert_eq!(expected, "`;`");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let tokens = tokenize("t", "true").unwrap();
        assert!(read_value("@K", KeywordValue::Bool, &tokens, 0).is_err());
    }
}
