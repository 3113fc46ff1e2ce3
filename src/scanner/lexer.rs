//! Minimal PHP tokenizer.
//!
//! Produces only the tokens the declaration scanner cares about: names,
//! variables, braces, statement terminators and member-access operators.
//! Inline HTML, comments, string literals, heredocs and nowdocs are consumed
//! without producing tokens, so keywords inside them are never seen.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Opening of a heredoc (`<<<LABEL`, `<<<"LABEL"`) or nowdoc (`<<<'LABEL'`).
    static ref HEREDOC_START: Regex = Regex::new(
        r#"^<<<[ \t]*(?:"([A-Za-z_\x{80}-\x{10FFFF}][A-Za-z0-9_\x{80}-\x{10FFFF}]*)"|'([A-Za-z_\x{80}-\x{10FFFF}][A-Za-z0-9_\x{80}-\x{10FFFF}]*)'|([A-Za-z_\x{80}-\x{10FFFF}][A-Za-z0-9_\x{80}-\x{10FFFF}]*))\r?\n"#
    ).unwrap();
}

/// Kinds of significant tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword, possibly namespace-qualified (`Foo`, `A\B`, `\A\B`).
    Name,
    /// `$name`
    Variable,
    OpenBrace,
    CloseBrace,
    /// `;` or a closing `?>` tag, which also terminates a statement.
    Semicolon,
    Colon,
    /// `::`
    DoubleColon,
    /// `->` or `?->`
    ObjectOperator,
    /// Any other punctuation or literal we do not interpret.
    Other,
}

/// A significant token with its text and 1-based starting line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub line: usize,
}

impl Token<'_> {
    /// Case-insensitive keyword comparison (PHP keywords ignore case).
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Name && self.text.eq_ignore_ascii_case(keyword)
    }
}

/// Streaming tokenizer over PHP source text.
pub struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    in_php: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            line: 1,
            in_php: false,
        }
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    /// Move to `target`, counting newlines on the way.
    fn advance_to(&mut self, target: usize) {
        let target = target.min(self.bytes.len());
        self.line += self.bytes[self.pos..target]
            .iter()
            .filter(|&&b| b == b'\n')
            .count();
        self.pos = target;
    }

    fn token(&mut self, kind: TokenKind, len: usize) -> Token<'a> {
        let src = self.src;
        let start = self.pos;
        let line = self.line;
        self.advance_to(start + len);
        Token {
            kind,
            text: &src[start..self.pos],
            line,
        }
    }

    /// Skip inline HTML up to and including the next open tag.
    /// Returns false when the input has no further PHP section.
    fn enter_php(&mut self) -> bool {
        let rest = &self.bytes[self.pos..];
        let mut i = 0;
        while i + 1 < rest.len() {
            if rest[i] == b'<' && rest[i + 1] == b'?' {
                if rest.len() >= i + 5 && rest[i + 2..i + 5].eq_ignore_ascii_case(b"php") {
                    self.advance_to(self.pos + i + 5);
                    self.in_php = true;
                    return true;
                }
                if rest.get(i + 2) == Some(&b'=') {
                    self.advance_to(self.pos + i + 3);
                    self.in_php = true;
                    return true;
                }
            }
            i += 1;
        }
        self.advance_to(self.bytes.len());
        false
    }

    fn skip_whitespace(&mut self) {
        let mut end = self.pos;
        while end < self.bytes.len() && self.bytes[end].is_ascii_whitespace() {
            end += 1;
        }
        self.advance_to(end);
    }

    /// `//` and `#` comments run to end of line or to a closing `?>` tag.
    fn skip_line_comment(&mut self) {
        let mut end = self.pos;
        while end < self.bytes.len() {
            match self.bytes[end] {
                b'\n' => break,
                b'?' if self.bytes.get(end + 1) == Some(&b'>') => break,
                _ => end += 1,
            }
        }
        self.advance_to(end);
    }

    fn skip_block_comment(&mut self) {
        let end = find(self.bytes, self.pos + 2, b"*/")
            .map(|i| i + 2)
            .unwrap_or(self.bytes.len());
        self.advance_to(end);
    }

    fn skip_single_quoted(&mut self) {
        let mut end = self.pos + 1;
        while end < self.bytes.len() {
            match self.bytes[end] {
                b'\\' => end += 2,
                b'\'' => {
                    end += 1;
                    break;
                }
                _ => end += 1,
            }
        }
        self.advance_to(end);
    }

    /// Double-quoted and backtick strings, including `{$...}` interpolation
    /// which may itself contain quotes.
    fn skip_interpolated(&mut self, quote: u8) {
        let mut end = self.pos + 1;
        while end < self.bytes.len() {
            match self.bytes[end] {
                b'\\' => end += 2,
                b'{' if self.bytes.get(end + 1) == Some(&b'$') => {
                    end = skip_braces(self.bytes, end);
                }
                b if b == quote => {
                    end += 1;
                    break;
                }
                _ => end += 1,
            }
        }
        self.advance_to(end);
    }

    /// Skip a heredoc or nowdoc if one starts here.
    fn skip_heredoc(&mut self) -> bool {
        let (label, opener_len) = match HEREDOC_START.captures(&self.src[self.pos..]) {
            Some(caps) => {
                let label = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .or_else(|| caps.get(3))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                (label, caps[0].len())
            }
            None => return false,
        };

        let mut line_start = self.pos + opener_len;
        while line_start < self.bytes.len() {
            let mut i = line_start;
            while i < self.bytes.len() && matches!(self.bytes[i], b' ' | b'\t') {
                i += 1;
            }
            let after = i + label.len();
            if self.bytes[i..].starts_with(label.as_bytes())
                && !self.bytes.get(after).copied().is_some_and(is_name_byte)
            {
                self.advance_to(after);
                return true;
            }
            line_start = match find(self.bytes, i, b"\n") {
                Some(nl) => nl + 1,
                None => self.bytes.len(),
            };
        }
        self.advance_to(self.bytes.len());
        true
    }

    fn name_len(&self) -> usize {
        self.bytes[self.pos..]
            .iter()
            .take_while(|&&b| is_name_byte(b) || b == b'\\')
            .count()
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        loop {
            if !self.in_php && !self.enter_php() {
                return None;
            }
            self.skip_whitespace();

            let b = self.peek(0)?;
            let next = self.peek(1);
            match b {
                b'?' if next == Some(b'>') => {
                    let tok = self.token(TokenKind::Semicolon, 2);
                    self.in_php = false;
                    return Some(tok);
                }
                b'?' if next == Some(b'-') && self.peek(2) == Some(b'>') => {
                    return Some(self.token(TokenKind::ObjectOperator, 3));
                }
                b'/' if next == Some(b'/') => self.skip_line_comment(),
                b'/' if next == Some(b'*') => self.skip_block_comment(),
                // `#[` opens an attribute, not a comment.
                b'#' if next == Some(b'[') => return Some(self.token(TokenKind::Other, 1)),
                b'#' => self.skip_line_comment(),
                b'\'' => self.skip_single_quoted(),
                b'"' | b'`' => self.skip_interpolated(b),
                b'<' if self.bytes[self.pos..].starts_with(b"<<<") => {
                    if !self.skip_heredoc() {
                        return Some(self.token(TokenKind::Other, 3));
                    }
                }
                b'$' if next.is_some_and(is_name_start) => {
                    let len = 1 + self.bytes[self.pos + 1..]
                        .iter()
                        .take_while(|&&c| is_name_byte(c))
                        .count();
                    return Some(self.token(TokenKind::Variable, len));
                }
                b':' if next == Some(b':') => return Some(self.token(TokenKind::DoubleColon, 2)),
                b':' => return Some(self.token(TokenKind::Colon, 1)),
                b'-' if next == Some(b'>') => {
                    return Some(self.token(TokenKind::ObjectOperator, 2));
                }
                b'{' => return Some(self.token(TokenKind::OpenBrace, 1)),
                b'}' => return Some(self.token(TokenKind::CloseBrace, 1)),
                b';' => return Some(self.token(TokenKind::Semicolon, 1)),
                b'\\' if next.is_some_and(is_name_start) => {
                    let len = self.name_len();
                    return Some(self.token(TokenKind::Name, len));
                }
                b if is_name_start(b) => {
                    let len = self.name_len();
                    return Some(self.token(TokenKind::Name, len));
                }
                b if b.is_ascii_digit() => {
                    let len = self.bytes[self.pos..]
                        .iter()
                        .take_while(|&&c| c.is_ascii_alphanumeric() || c == b'_' || c == b'.')
                        .count();
                    return Some(self.token(TokenKind::Other, len));
                }
                _ => return Some(self.token(TokenKind::Other, 1)),
            }
        }
    }
}

fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

fn find(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + from)
}

/// Given `start` at a `{`, return the index just past its matching `}`.
fn skip_braces(bytes: &[u8], start: usize) -> usize {
    let mut depth = 0usize;
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    bytes.len()
}
