use super::token::{SelectorToken, TokenKind};

/// Operators that absorb whitespace on both sides, in match order.
///
/// Two-character attribute operators come before the single-character
/// combinators so that `~=` never lexes as `~` followed by `=`.
const SURROUNDED_OPERATORS: &[(&str, TokenKind)] = &[
    ("~=", TokenKind::Includes),
    ("|=", TokenKind::DashMatch),
    ("^=", TokenKind::PrefixMatch),
    ("$=", TokenKind::SuffixMatch),
    ("*=", TokenKind::SubstringMatch),
    ("=", TokenKind::Equal),
];

const SURROUNDED_COMBINATORS: &[(&str, TokenKind)] = &[
    ("+", TokenKind::Plus),
    (">", TokenKind::Greater),
    (",", TokenKind::Comma),
    ("~", TokenKind::Tilde),
];

/// Splits selector text into [`SelectorToken`]s.
///
/// Rules are tried in a fixed order at each position and the first one that
/// matches wins; an unmatched code point becomes a [`TokenKind::Delim`].
/// Tokenizing never fails and the concatenated token texts always reproduce
/// the input exactly.
pub struct SelectorTokenizer {
    input: Vec<char>,
    position: usize,
    tokens: Vec<SelectorToken>,
}

impl SelectorTokenizer {
    /// Create a tokenizer over `input`.
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the whole input.
    pub fn run(&mut self) {
        while self.position < self.input.len() {
            let (kind, len) = self.next_token();
            let text: String = self.input[self.position..self.position + len]
                .iter()
                .collect();
            self.tokens.push(SelectorToken::new(kind, text));
            self.position += len;
        }
    }

    /// Return the collected tokens.
    #[must_use]
    pub fn into_tokens(self) -> Vec<SelectorToken> {
        self.tokens
    }

    fn peek_at(&self, at: usize) -> Option<char> {
        self.input.get(at).copied()
    }

    /// Kind and length (in chars) of the token starting at the current position.
    fn next_token(&self) -> (TokenKind, usize) {
        let at = self.position;

        if let Some(len) = self.ident_len(at) {
            if self.peek_at(at + len) == Some('(') {
                let ws = self.whitespace_len(at + len + 1);
                return (TokenKind::Function, len + 1 + ws);
            }
            return (TokenKind::Ident, len);
        }

        if self.peek_at(at) == Some('#') {
            let len = self.name_len(at + 1);
            if len > 0 {
                return (TokenKind::Hash, len + 1);
            }
        }

        let leading = self.whitespace_len(at);
        for &(literal, kind) in SURROUNDED_OPERATORS {
            if self.literal_at(at + leading, literal) {
                let end = at + leading + literal.chars().count();
                return (kind, end - at + self.whitespace_len(end));
            }
        }

        if self.peek_at(at + leading) == Some(')') {
            return (TokenKind::RightParen, leading + 1);
        }
        if self.peek_at(at) == Some('[') {
            return (TokenKind::LeftSquare, 1 + self.whitespace_len(at + 1));
        }
        if self.peek_at(at + leading) == Some(']') {
            return (TokenKind::RightSquare, leading + 1);
        }

        for &(literal, kind) in SURROUNDED_COMBINATORS {
            if self.literal_at(at + leading, literal) {
                let end = at + leading + 1;
                return (kind, end - at + self.whitespace_len(end));
            }
        }

        if let Some(len) = self.number_len(at) {
            return (TokenKind::Number, len);
        }

        if leading > 0 {
            return (TokenKind::Whitespace, leading);
        }

        if let Some(len) = self.string_len(at) {
            return (TokenKind::String, len);
        }

        (TokenKind::Delim(self.input[at]), 1)
    }

    fn literal_at(&self, at: usize, literal: &str) -> bool {
        literal
            .chars()
            .enumerate()
            .all(|(i, expected)| self.peek_at(at + i) == Some(expected))
    }

    fn whitespace_len(&self, at: usize) -> usize {
        let mut len = 0;
        while self.peek_at(at + len).is_some_and(is_css_whitespace) {
            len += 1;
        }
        len
    }

    /// `\` followed by 1-6 hex digits and one optional whitespace, or by any
    /// code point that is neither a newline nor a hex digit.
    fn escape_len(&self, at: usize) -> Option<usize> {
        if self.peek_at(at) != Some('\\') {
            return None;
        }
        let next = self.peek_at(at + 1)?;
        if next.is_ascii_hexdigit() {
            let mut len = 1;
            while len <= 6 && self.peek_at(at + len).is_some_and(|c| c.is_ascii_hexdigit()) {
                len += 1;
            }
            if self.peek_at(at + len) == Some('\r') && self.peek_at(at + len + 1) == Some('\n') {
                len += 2;
            } else if self.peek_at(at + len).is_some_and(is_css_whitespace) {
                len += 1;
            }
            Some(len)
        } else if matches!(next, '\n' | '\r' | '\x0C') {
            None
        } else {
            Some(2)
        }
    }

    fn name_start_len(&self, at: usize) -> Option<usize> {
        match self.peek_at(at)? {
            c if c.is_ascii_alphabetic() || c == '_' || !c.is_ascii() => Some(1),
            '\\' => self.escape_len(at),
            _ => None,
        }
    }

    fn name_char_len(&self, at: usize) -> Option<usize> {
        match self.peek_at(at)? {
            c if c.is_ascii_digit() || c == '-' => Some(1),
            _ => self.name_start_len(at),
        }
    }

    /// Length of `nmchar*` starting at `at`.
    fn name_len(&self, at: usize) -> usize {
        let mut len = 0;
        while let Some(step) = self.name_char_len(at + len) {
            len += step;
        }
        len
    }

    /// Length of `-?nmstart nmchar*` starting at `at`.
    fn ident_len(&self, at: usize) -> Option<usize> {
        let dash = usize::from(self.peek_at(at) == Some('-'));
        let start = self.name_start_len(at + dash)?;
        Some(dash + start + self.name_len(at + dash + start))
    }

    /// `[0-9]+` or `[0-9]*\.[0-9]+`, first alternative preferred.
    fn number_len(&self, at: usize) -> Option<usize> {
        let digits = |from: usize| {
            let mut len = 0;
            while self.peek_at(from + len).is_some_and(|c| c.is_ascii_digit()) {
                len += 1;
            }
            len
        };
        let integer = digits(at);
        if integer > 0 {
            return Some(integer);
        }
        if self.peek_at(at) == Some('.') {
            let fraction = digits(at + 1);
            if fraction > 0 {
                return Some(1 + fraction);
            }
        }
        None
    }

    /// A single- or double-quoted string. Unterminated strings do not match.
    fn string_len(&self, at: usize) -> Option<usize> {
        let quote = self.peek_at(at).filter(|&c| c == '"' || c == '\'')?;
        let mut len = 1;
        loop {
            match self.peek_at(at + len)? {
                c if c == quote => return Some(len + 1),
                '\\' => len += 2,
                '\n' | '\r' | '\x0C' => return None,
                _ => len += 1,
            }
        }
    }
}

/// Tokenize `selector` in one call.
#[must_use]
pub fn tokenize_selector(selector: &str) -> Vec<SelectorToken> {
    let mut tokenizer = SelectorTokenizer::new(selector);
    tokenizer.run();
    tokenizer.into_tokens()
}

/// Whitespace as CSS defines it: space, tab, and the three newline forms.
#[must_use]
pub const fn is_css_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

/// Trim CSS whitespace (and only CSS whitespace) from both ends.
#[must_use]
pub fn trim_css_whitespace(text: &str) -> &str {
    text.trim_matches(is_css_whitespace)
}
