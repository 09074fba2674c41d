//! Selector parser over the token stream.

use super::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector, Nth,
    ParsedSelector, PseudoClass, SelectorError, SimpleSelector,
};
use crate::tokenizer::{SelectorToken, TokenKind, tokenize_selector};

/// Parse one complex selector.
///
/// # Errors
///
/// Returns a [`SelectorError`] for anything outside the supported subset:
/// dynamic or unknown pseudo-classes, pseudo-elements, namespaces, selector
/// lists, and malformed syntax.
pub fn parse_selector(raw: &str) -> Result<ParsedSelector, SelectorError> {
    let mut parser = SelectorParser::new(tokenize_selector(raw));
    let complex = parser.parse_complex()?;
    let specificity = complex.calculate_specificity();
    Ok(ParsedSelector {
        complex,
        specificity,
    })
}

struct SelectorParser {
    tokens: Vec<SelectorToken>,
    position: usize,
}

impl SelectorParser {
    fn new(mut tokens: Vec<SelectorToken>) -> Self {
        // Leading and trailing whitespace is never a combinator.
        while tokens.last().is_some_and(|t| t.kind == TokenKind::Whitespace) {
            let _ = tokens.pop();
        }
        let start = tokens
            .iter()
            .take_while(|t| t.kind == TokenKind::Whitespace)
            .count();
        Self {
            tokens,
            position: start,
        }
    }

    fn peek(&self) -> Option<&SelectorToken> {
        self.tokens.get(self.position)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn consume(&mut self) -> Option<SelectorToken> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn unexpected(&self) -> SelectorError {
        self.peek().map_or(SelectorError::Unterminated, |t| {
            SelectorError::UnexpectedToken(t.trimmed().to_string())
        })
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        if self.peek().is_none() {
            return Err(SelectorError::Empty);
        }

        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();

        while let Some(kind) = self.peek_kind() {
            let combinator = match kind {
                TokenKind::Whitespace => Combinator::Descendant,
                TokenKind::Greater => Combinator::Child,
                TokenKind::Plus => Combinator::NextSibling,
                TokenKind::Tilde => Combinator::SubsequentSibling,
                TokenKind::Comma => return Err(SelectorError::SelectorList),
                _ => return Err(self.unexpected()),
            };
            self.position += 1;
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }

        let subject = compounds.pop().ok_or(SelectorError::Empty)?;
        let chain = combinators
            .into_iter()
            .rev()
            .zip(compounds.into_iter().rev())
            .collect();
        Ok(ComplexSelector {
            subject,
            combinators: chain,
        })
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut simple_selectors = Vec::new();

        match self.peek_kind() {
            Some(TokenKind::Ident) => {
                let token = self.consume().ok_or(SelectorError::Unterminated)?;
                simple_selectors.push(SimpleSelector::Type(
                    unescape(&token.text).to_ascii_lowercase(),
                ));
            }
            Some(TokenKind::Delim('*')) => {
                self.position += 1;
                simple_selectors.push(SimpleSelector::Universal);
            }
            _ => {}
        }
        if self.peek().is_some_and(|t| t.is_delim('|')) {
            return Err(SelectorError::Namespace);
        }

        loop {
            match self.peek_kind() {
                Some(TokenKind::Hash) => {
                    let token = self.consume().ok_or(SelectorError::Unterminated)?;
                    simple_selectors.push(SimpleSelector::Id(unescape(&token.text[1..])));
                }
                Some(TokenKind::Delim('.')) => {
                    self.position += 1;
                    let name = self.expect_ident()?;
                    simple_selectors.push(SimpleSelector::Class(name));
                }
                Some(TokenKind::LeftSquare) => {
                    self.position += 1;
                    simple_selectors.push(SimpleSelector::Attribute(self.parse_attribute()?));
                }
                Some(TokenKind::Delim(':')) => {
                    self.position += 1;
                    simple_selectors.push(SimpleSelector::PseudoClass(self.parse_pseudo()?));
                }
                _ => break,
            }
        }

        if simple_selectors.is_empty() {
            return Err(self.unexpected());
        }
        Ok(CompoundSelector { simple_selectors })
    }

    fn expect_ident(&mut self) -> Result<String, SelectorError> {
        if self.peek_kind() == Some(TokenKind::Ident) {
            let token = self.consume().ok_or(SelectorError::Unterminated)?;
            Ok(unescape(&token.text))
        } else {
            Err(self.unexpected())
        }
    }

    /// After `[`: `name]`, or `name op value [i|s]]`.
    fn parse_attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        let name = self.expect_ident()?.to_ascii_lowercase();
        if self.peek().is_some_and(|t| t.is_delim('|')) {
            return Err(SelectorError::Namespace);
        }

        let operator = match self.peek_kind() {
            Some(TokenKind::RightSquare) => {
                self.position += 1;
                return Ok(AttributeSelector {
                    name,
                    matcher: AttributeMatcher::Exists,
                    case_insensitive: false,
                });
            }
            Some(kind) if kind.is_attribute_operator() => {
                self.position += 1;
                kind
            }
            _ => return Err(self.unexpected()),
        };

        let value = match self.consume() {
            Some(token) => match token.kind {
                TokenKind::Ident | TokenKind::Number => unescape(&token.text),
                TokenKind::String => unquote(&token.text),
                _ => return Err(SelectorError::UnexpectedToken(token.trimmed().to_string())),
            },
            None => return Err(SelectorError::Unterminated),
        };

        let mut case_insensitive = false;
        if self.peek_kind() == Some(TokenKind::Whitespace) {
            self.position += 1;
            match self.consume() {
                Some(flag) if flag.kind == TokenKind::Ident => {
                    case_insensitive = match flag.text.to_ascii_lowercase().as_str() {
                        "i" => true,
                        "s" => false,
                        _ => return Err(SelectorError::UnexpectedToken(flag.text)),
                    };
                }
                Some(other) => {
                    return Err(SelectorError::UnexpectedToken(other.trimmed().to_string()));
                }
                None => return Err(SelectorError::Unterminated),
            }
        }

        match self.consume() {
            Some(token) if token.kind == TokenKind::RightSquare => {}
            Some(token) => return Err(SelectorError::UnexpectedToken(token.trimmed().to_string())),
            None => return Err(SelectorError::Unterminated),
        }

        let matcher = match operator {
            TokenKind::Equal => AttributeMatcher::Equals(value),
            TokenKind::Includes => AttributeMatcher::Includes(value),
            TokenKind::DashMatch => AttributeMatcher::DashMatch(value),
            TokenKind::PrefixMatch => AttributeMatcher::PrefixMatch(value),
            TokenKind::SuffixMatch => AttributeMatcher::SuffixMatch(value),
            _ => AttributeMatcher::SubstringMatch(value),
        };
        Ok(AttributeSelector {
            name,
            matcher,
            case_insensitive,
        })
    }

    /// After `:`.
    fn parse_pseudo(&mut self) -> Result<PseudoClass, SelectorError> {
        let token = self.consume().ok_or(SelectorError::Unterminated)?;
        match token.kind {
            TokenKind::Delim(':') => {
                let name = self.consume().map(|t| t.text).unwrap_or_default();
                Err(SelectorError::PseudoElement(
                    name.trim_end_matches('(').to_string(),
                ))
            }
            TokenKind::Ident => {
                let name = unescape(&token.text).to_ascii_lowercase();
                Ok(match name.as_str() {
                    "root" => PseudoClass::Root,
                    "first-child" => PseudoClass::FirstChild,
                    "last-child" => PseudoClass::LastChild,
                    "only-child" => PseudoClass::OnlyChild,
                    "first-of-type" => PseudoClass::FirstOfType,
                    "last-of-type" => PseudoClass::LastOfType,
                    "only-of-type" => PseudoClass::OnlyOfType,
                    "empty" => PseudoClass::Empty,
                    "link" | "any-link" => PseudoClass::Link,
                    "enabled" => PseudoClass::Enabled,
                    "disabled" => PseudoClass::Disabled,
                    "checked" => PseudoClass::Checked,
                    _ => return Err(SelectorError::UnsupportedPseudoClass(name)),
                })
            }
            TokenKind::Function => {
                let name = token
                    .trimmed()
                    .trim_end_matches('(')
                    .to_ascii_lowercase();
                match name.as_str() {
                    "not" => {
                        let inner = self.parse_compound()?;
                        self.expect_right_paren()?;
                        Ok(PseudoClass::Not(Box::new(inner)))
                    }
                    "nth-child" => Ok(PseudoClass::NthChild(self.parse_nth_argument()?)),
                    "nth-last-child" => Ok(PseudoClass::NthLastChild(self.parse_nth_argument()?)),
                    "nth-of-type" => Ok(PseudoClass::NthOfType(self.parse_nth_argument()?)),
                    "nth-last-of-type" => {
                        Ok(PseudoClass::NthLastOfType(self.parse_nth_argument()?))
                    }
                    _ => Err(SelectorError::UnsupportedPseudoClass(format!("{name}()"))),
                }
            }
            _ => Err(SelectorError::UnexpectedToken(token.trimmed().to_string())),
        }
    }

    fn expect_right_paren(&mut self) -> Result<(), SelectorError> {
        match self.consume() {
            Some(token) if token.kind == TokenKind::RightParen => Ok(()),
            Some(token) => Err(SelectorError::UnexpectedToken(token.trimmed().to_string())),
            None => Err(SelectorError::Unterminated),
        }
    }

    /// Collect everything up to the closing `)` and read it as `an+b`.
    fn parse_nth_argument(&mut self) -> Result<Nth, SelectorError> {
        let mut argument = String::new();
        loop {
            let token = self.consume().ok_or(SelectorError::Unterminated)?;
            match token.kind {
                TokenKind::RightParen => break,
                TokenKind::Whitespace => {}
                TokenKind::Ident
                | TokenKind::Number
                | TokenKind::Plus
                | TokenKind::Delim('-' | '+') => argument.push_str(token.trimmed()),
                _ => return Err(SelectorError::InvalidNth(token.trimmed().to_string())),
            }
        }
        parse_nth(&argument)
    }
}

/// Parse `odd`, `even`, `b`, `an`, `an+b`, `-n+b`, ... (whitespace already removed).
fn parse_nth(text: &str) -> Result<Nth, SelectorError> {
    let invalid = || SelectorError::InvalidNth(text.to_string());
    let lower = text.to_ascii_lowercase();

    match lower.as_str() {
        "odd" => return Ok(Nth { a: 2, b: 1 }),
        "even" => return Ok(Nth { a: 2, b: 0 }),
        "" => return Err(invalid()),
        _ => {}
    }

    let Some(n_at) = lower.find('n') else {
        let b = lower.parse::<i32>().map_err(|_| invalid())?;
        return Ok(Nth { a: 0, b });
    };

    let a = match &lower[..n_at] {
        "" | "+" => 1,
        "-" => -1,
        coefficient => coefficient.parse::<i32>().map_err(|_| invalid())?,
    };
    let rest = &lower[n_at + 1..];
    let b = if rest.is_empty() {
        0
    } else {
        let digits = rest.strip_prefix('+').unwrap_or(rest);
        if digits.starts_with('+') || digits.is_empty() {
            return Err(invalid());
        }
        digits.parse::<i32>().map_err(|_| invalid())?
    };
    Ok(Nth { a, b })
}

/// Resolve CSS escapes in an identifier.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let mut hex = String::new();
        while hex.len() < 6 && chars.peek().is_some_and(char::is_ascii_hexdigit) {
            if let Some(h) = chars.next() {
                hex.push(h);
            }
        }
        if hex.is_empty() {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            let code = u32::from_str_radix(&hex, 16).unwrap_or(0xFFFD);
            out.push(char::from_u32(code).filter(|&c| c != '\0').unwrap_or('\u{FFFD}'));
            if chars.peek().is_some_and(|&c| crate::tokenizer::is_css_whitespace(c)) {
                let _ = chars.next();
            }
        }
    }
    out
}

/// Strip the quotes from a string token and resolve escapes.
fn unquote(text: &str) -> String {
    let inner = text
        .get(1..text.len().saturating_sub(1))
        .unwrap_or_default();
    unescape(inner)
}
