//! Byte-oriented lexer.
//!
//! The lexer never aborts. Malformed input produces an [`TokenKind::Error`]
//! token plus a `LexError` in the diagnostics sink, and scanning resumes at the
//! next byte, so callers decide what to do by checking
//! [`Diagnostics::has_errors`].

use cinder_ast::diagnostics::{Diagnostic, Diagnostics};
use cinder_ast::nodes::Position;

use crate::token::{ONE_CHAR_SYMBOLS, TWO_CHAR_SYMBOLS, Token, TokenKind, directive, keyword};

/// Lexes `source` to completion. The result always ends with an `Eof` token.
pub fn tokenize<'src>(
    source: &'src str,
    file: &str,
    diagnostics: &mut Diagnostics,
) -> Vec<Token<'src>> {
    let mut lexer = Lexer::new(source, file, diagnostics);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        tokens.push(token);
        if token.kind == TokenKind::Eof {
            return tokens;
        }
    }
}

pub struct Lexer<'src, 'd> {
    source: &'src str,
    bytes: &'src [u8],
    file: &'d str,
    index: usize,
    line: u32,
    column: u32,
    diagnostics: &'d mut Diagnostics,
}

impl<'src, 'd> Lexer<'src, 'd> {
    pub fn new(source: &'src str, file: &'d str, diagnostics: &'d mut Diagnostics) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            file,
            index: 0,
            line: 1,
            column: 1,
            diagnostics,
        }
    }

    /// Produces the next token. Once the input is exhausted every call returns `Eof`.
    pub fn next_token(&mut self) -> Token<'src> {
        let leading_whitespace = self.skip_trivia();
        let start = self.index;
        let line = self.line;
        let column = self.column;

        let Some(ch) = self.peek_char() else {
            return self.token(TokenKind::Eof, start, line, column, leading_whitespace);
        };

        let kind = match ch {
            b'@' => self.lex_directive(start, line, column),
            c if is_ident_start(c) => self.lex_ident_or_keyword(start),
            c if c.is_ascii_digit() => self.lex_number(),
            b'"' => self.lex_string(line, column),
            b'\'' => self.lex_char(line, column),
            _ => self.lex_symbol(line, column),
        };
        self.token(kind, start, line, column, leading_whitespace)
    }

    fn token(
        &self,
        kind: TokenKind,
        start: usize,
        line: u32,
        column: u32,
        leading_whitespace: usize,
    ) -> Token<'src> {
        Token {
            kind,
            text: &self.source[start..self.index],
            line,
            column,
            leading_whitespace,
        }
    }

    /// Skips whitespace, `::` line comments and `::* ... *::` block comments.
    /// Returns the number of bytes skipped.
    fn skip_trivia(&mut self) -> usize {
        let start = self.index;
        loop {
            match self.peek_char() {
                Some(c) if is_whitespace(c) => self.consume_char(),
                Some(b':') if self.peek_at(1) == Some(b':') => {
                    if self.peek_at(2) == Some(b'*') {
                        self.skip_block_comment();
                    } else {
                        while self.peek_char().is_some_and(|c| c != b'\n') {
                            self.consume_char();
                        }
                    }
                }
                _ => break,
            }
        }
        self.index - start
    }

    fn skip_block_comment(&mut self) {
        let line = self.line;
        let column = self.column;
        // `::*`
        self.consume_char();
        self.consume_char();
        self.consume_char();
        loop {
            match self.peek_char() {
                None => {
                    self.error(
                        "unterminated block comment",
                        line,
                        column,
                        3,
                        Some("add '*::' to close the comment"),
                    );
                    return;
                }
                Some(b'*') if self.peek_at(1) == Some(b':') && self.peek_at(2) == Some(b':') => {
                    self.consume_char();
                    self.consume_char();
                    self.consume_char();
                    return;
                }
                Some(_) => self.consume_char(),
            }
        }
    }

    fn lex_directive(&mut self, start: usize, line: u32, column: u32) -> TokenKind {
        self.consume_char();
        while self.peek_char().is_some_and(is_ident_continue) {
            self.consume_char();
        }
        let source = self.source;
        let name = &source[start + 1..self.index];
        if name.is_empty() {
            self.error(
                "expected a directive name after '@'",
                line,
                column,
                1,
                None,
            );
            return TokenKind::Error;
        }
        if let Some(kind) = directive(name) {
            kind
        } else {
            let message = format!("unknown directive '@{name}'");
            self.error(
                &message,
                line,
                column,
                name.len() + 1,
                Some("available directives are '@module' and '@use'"),
            );
            TokenKind::Error
        }
    }

    fn lex_ident_or_keyword(&mut self, start: usize) -> TokenKind {
        while self.peek_char().is_some_and(is_ident_continue) {
            self.consume_char();
        }
        keyword(&self.source[start..self.index]).unwrap_or(TokenKind::Ident)
    }

    fn lex_number(&mut self) -> TokenKind {
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.consume_char();
        }
        if self.peek_char() == Some(b'.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.consume_char();
            while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                self.consume_char();
            }
            return TokenKind::FloatLiteral;
        }
        TokenKind::IntLiteral
    }

    fn lex_string(&mut self, line: u32, column: u32) -> TokenKind {
        self.consume_char();
        loop {
            match self.peek_char() {
                None => {
                    self.error(
                        "unterminated string literal",
                        line,
                        column,
                        1,
                        Some("add a closing '\"'"),
                    );
                    return TokenKind::Error;
                }
                Some(b'"') => {
                    self.consume_char();
                    return TokenKind::StringLiteral;
                }
                Some(b'\\') => {
                    let (escape_line, escape_column) = (self.line, self.column);
                    self.consume_char();
                    match self.peek_char() {
                        Some(c) if unescape_byte(c).is_some() => self.consume_char(),
                        Some(_) => {
                            let escaped = self.consume_utf8_char();
                            let message =
                                format!("unknown escape sequence '\\{escaped}'");
                            self.error(&message, escape_line, escape_column, 2, None);
                        }
                        None => {}
                    }
                }
                Some(_) => self.consume_char(),
            }
        }
    }

    fn lex_char(&mut self, line: u32, column: u32) -> TokenKind {
        self.consume_char();
        match self.peek_char() {
            Some(b'\\') => {
                self.consume_char();
                match self.peek_char() {
                    Some(c) if unescape_byte(c).is_some() => self.consume_char(),
                    Some(c) if c != b'\n' => {
                        let escaped = self.consume_utf8_char();
                        let message =
                            format!("unknown escape sequence '\\{escaped}'");
                        self.error(&message, line, column + 1, 2, None);
                    }
                    _ => {}
                }
            }
            Some(b'\'') => {
                self.consume_char();
                self.error("empty character literal", line, column, 2, None);
                return TokenKind::Error;
            }
            Some(c) if c.is_ascii() && c != b'\n' => self.consume_char(),
            Some(c) if !c.is_ascii() => {
                self.consume_utf8_char();
                if self.peek_char() == Some(b'\'') {
                    self.consume_char();
                }
                self.error(
                    "character literals hold a single ASCII byte",
                    line,
                    column,
                    1,
                    None,
                );
                return TokenKind::Error;
            }
            _ => {
                self.error(
                    "character literals hold a single ASCII byte",
                    line,
                    column,
                    1,
                    None,
                );
                return TokenKind::Error;
            }
        }
        if self.peek_char() == Some(b'\'') {
            self.consume_char();
            TokenKind::CharLiteral
        } else {
            self.error(
                "unterminated character literal",
                line,
                column,
                1,
                Some("add a closing '''"),
            );
            TokenKind::Error
        }
    }

    fn lex_symbol(&mut self, line: u32, column: u32) -> TokenKind {
        if let Some(pair) = self.source.get(self.index..self.index + 2)
            && let Some((_, kind)) = TWO_CHAR_SYMBOLS.iter().find(|(text, _)| *text == pair)
        {
            self.consume_char();
            self.consume_char();
            return *kind;
        }
        if let Some(ch) = self.peek_char()
            && let Some((_, kind)) = ONE_CHAR_SYMBOLS.iter().find(|(byte, _)| *byte == ch)
        {
            self.consume_char();
            return *kind;
        }
        let unexpected = self.consume_utf8_char();
        let message = format!("unexpected character '{}'", unexpected.escape_default());
        self.error(&message, line, column, 1, None);
        TokenKind::Error
    }

    fn error(&mut self, message: &str, line: u32, column: u32, length: usize, help: Option<&str>) {
        let mut diagnostic = Diagnostic::lex_error(self.file, message, Position::new(line, column))
            .with_length(length);
        if let Some(source_line) = source_line(self.source, line) {
            diagnostic = diagnostic.with_source_line(source_line);
        }
        if let Some(help) = help {
            diagnostic = diagnostic.with_help(help);
        }
        self.diagnostics.add(diagnostic);
    }

    fn peek_char(&self) -> Option<u8> {
        self.bytes.get(self.index).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.index + offset).copied()
    }

    /// Consumes a whole UTF-8 sequence so token text stays on a `char` boundary.
    fn consume_utf8_char(&mut self) -> char {
        let Some(ch) = self.source[self.index..].chars().next() else {
            return '\0';
        };
        if ch.is_ascii() {
            self.consume_char();
        } else {
            self.index += ch.len_utf8();
            self.column += 1;
        }
        ch
    }

    fn consume_char(&mut self) {
        if let Some(ch) = self.peek_char() {
            self.index += 1;
            if ch == b'\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }
}

/// Text of the one-based `line` of `source`, without its terminator.
#[must_use]
pub fn source_line(source: &str, line: u32) -> Option<&str> {
    let index = usize::try_from(line).ok()?.checked_sub(1)?;
    source.lines().nth(index)
}

/// Byte produced by the escape `\c`, if `c` names a known escape.
#[must_use]
pub fn unescape_byte(c: u8) -> Option<u8> {
    match c {
        b'n' => Some(b'\n'),
        b't' => Some(b'\t'),
        b'r' => Some(b'\r'),
        b'0' => Some(0),
        b'\\' => Some(b'\\'),
        b'"' => Some(b'"'),
        b'\'' => Some(b'\''),
        _ => None,
    }
}

/// Decodes the contents of a string or character token, quotes included.
/// Unknown escapes keep the escaped character; the lexer has already reported them.
#[must_use]
pub fn unquote(text: &str) -> String {
    let inner = text
        .get(1..text.len().saturating_sub(1))
        .unwrap_or_default();
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                match u8::try_from(escaped).ok().and_then(unescape_byte) {
                    Some(byte) => out.push(char::from(byte)),
                    None => out.push(escaped),
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn is_whitespace(ch: u8) -> bool {
    matches!(ch, b' ' | b'\t' | b'\n' | b'\r')
}

fn is_ident_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_'
}

fn is_ident_continue(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_'
}
