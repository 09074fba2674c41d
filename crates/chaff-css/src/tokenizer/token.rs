use strum_macros::Display;

use super::tokenizer::trim_css_whitespace;

/// Lexical category of a selector token.
///
/// Combinators, commas, attribute operators and the closing brackets carry
/// the whitespace around them in their text, so [`TokenKind::Whitespace`]
/// only ever appears where whitespace is itself the descendant combinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenKind {
    /// `-?nmstart nmchar*`, e.g. `div`, `nav-item`, `-webkit-foo`.
    Ident,
    /// An identifier followed by `(` and any whitespace: `nth-child( `.
    Function,
    /// `#` followed by one or more name characters.
    Hash,
    /// A quoted string, quotes included.
    String,
    /// `[0-9]+` or `[0-9]*.[0-9]+`.
    Number,
    /// Significant whitespace.
    Whitespace,
    /// ` + `
    Plus,
    /// ` > `
    Greater,
    /// ` ~ `
    Tilde,
    /// ` , `
    Comma,
    /// ` = `
    Equal,
    /// ` ~= `
    Includes,
    /// ` |= `
    DashMatch,
    /// ` ^= `
    PrefixMatch,
    /// ` $= `
    SuffixMatch,
    /// ` *= `
    SubstringMatch,
    /// `[` and the whitespace after it.
    LeftSquare,
    /// `]` and the whitespace before it.
    RightSquare,
    /// `)` and the whitespace before it.
    RightParen,
    /// Any other single code point: `.`, `:`, `*`, `@`, `(`, `|`, ...
    Delim(char),
}

impl TokenKind {
    /// Is this one of the explicit combinators `+`, `>` or `~`?
    #[must_use]
    pub const fn is_explicit_combinator(self) -> bool {
        matches!(self, Self::Plus | Self::Greater | Self::Tilde)
    }

    /// Is this a combinator, including the descendant (whitespace) one?
    #[must_use]
    pub const fn is_combinator(self) -> bool {
        self.is_explicit_combinator() || matches!(self, Self::Whitespace)
    }

    /// Does this token's text include whitespace around it? Trailing
    /// whitespace in any other token (`\31 `, `\ `) is part of an escape.
    #[must_use]
    pub const fn absorbs_whitespace(self) -> bool {
        self.is_explicit_combinator()
            || self.is_attribute_operator()
            || matches!(
                self,
                Self::Comma
                    | Self::Function
                    | Self::LeftSquare
                    | Self::RightSquare
                    | Self::RightParen
            )
    }

    /// Is this an attribute-value operator?
    #[must_use]
    pub const fn is_attribute_operator(self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::Includes
                | Self::DashMatch
                | Self::PrefixMatch
                | Self::SuffixMatch
                | Self::SubstringMatch
        )
    }
}

/// A `(kind, text)` pair. `text` is exactly the source slice it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorToken {
    /// Lexical category.
    pub kind: TokenKind,
    /// Source text, including any absorbed whitespace.
    pub text: String,
}

impl SelectorToken {
    /// Create a token.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// The token text without surrounding CSS whitespace.
    #[must_use]
    pub fn trimmed(&self) -> &str {
        trim_css_whitespace(&self.text)
    }

    /// Is this the delimiter `c`?
    #[must_use]
    pub fn is_delim(&self, c: char) -> bool {
        self.kind == TokenKind::Delim(c)
    }
}
