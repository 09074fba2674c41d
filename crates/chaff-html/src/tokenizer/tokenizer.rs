use super::token::{Attribute, Token};

/// Elements whose content is taken verbatim up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title", "xmp", "noembed"];

/// Named character references recognized in text and attribute values.
///
/// A subset of the full table: the references that actually show up in
/// hand-written and template-generated markup.
const NAMED_REFERENCES: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{a0}'),
    ("copy", '\u{a9}'),
    ("reg", '\u{ae}'),
    ("trade", '\u{2122}'),
    ("hellip", '\u{2026}'),
    ("mdash", '\u{2014}'),
    ("ndash", '\u{2013}'),
    ("laquo", '\u{ab}'),
    ("raquo", '\u{bb}'),
    ("middot", '\u{b7}'),
    ("bull", '\u{2022}'),
    ("times", '\u{d7}'),
    ("euro", '\u{20ac}'),
];

/// Converts markup into a flat list of [`Token`]s.
///
/// Never fails: anything that is not a well-formed tag, comment or doctype is
/// treated as character data.
pub struct HTMLTokenizer {
    input: Vec<char>,
    position: usize,
    text: String,
    tokens: Vec<Token>,
}

impl HTMLTokenizer {
    /// Create a tokenizer over `input`.
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            text: String::new(),
            tokens: Vec::new(),
        }
    }

    /// Tokenize the whole input. The last token is always [`Token::EndOfFile`].
    pub fn run(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                '<' => self.consume_markup(),
                '&' => {
                    self.position += 1;
                    let decoded = self.consume_character_reference();
                    self.text.push_str(&decoded);
                }
                _ => {
                    self.text.push(c);
                    self.position += 1;
                }
            }
        }
        self.flush_text();
        self.tokens.push(Token::EndOfFile);
    }

    /// Consume the tokenizer and return the emitted tokens.
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn starts_with_ignore_case(&self, literal: &str) -> bool {
        literal.chars().enumerate().all(|(i, expected)| {
            self.peek_at(i)
                .is_some_and(|c| c.eq_ignore_ascii_case(&expected))
        })
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(is_html_whitespace) {
            self.position += 1;
        }
    }

    fn emit(&mut self, token: Token) {
        self.flush_text();
        self.tokens.push(token);
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            let data = std::mem::take(&mut self.text);
            self.tokens.push(Token::Character { data });
        }
    }

    /// Dispatch on what follows a `<`.
    fn consume_markup(&mut self) {
        match self.peek_at(1) {
            Some('!') if self.starts_with_ignore_case("<!--") => self.consume_comment(),
            Some('!') if self.starts_with_ignore_case("<!doctype") => self.consume_doctype(),
            Some('!' | '?') => self.consume_bogus_comment(1),
            Some('/') => match self.peek_at(2) {
                Some(c) if c.is_ascii_alphabetic() => self.consume_end_tag(),
                Some('>') => self.position += 3,
                _ => self.consume_bogus_comment(2),
            },
            Some(c) if c.is_ascii_alphabetic() => self.consume_start_tag(),
            _ => {
                self.text.push('<');
                self.position += 1;
            }
        }
    }

    fn consume_comment(&mut self) {
        self.position += 4;
        let start = self.position;
        while self.position < self.input.len() && !self.starts_with_ignore_case("-->") {
            self.position += 1;
        }
        let data: String = self.input[start..self.position].iter().collect();
        self.position = (self.position + 3).min(self.input.len());
        self.emit(Token::Comment { data });
    }

    /// `<!...>`, `<?...>` and `</ ...>`: everything up to the next `>`.
    fn consume_bogus_comment(&mut self, skip: usize) {
        self.position += skip;
        let data = self.consume_until('>');
        self.emit(Token::Comment { data });
    }

    fn consume_doctype(&mut self) {
        self.position += "<!doctype".len();
        let body = self.consume_until('>');
        let name = body
            .split_ascii_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        self.emit(Token::Doctype { name });
    }

    /// Read up to (not including) `terminator` and step past it.
    fn consume_until(&mut self, terminator: char) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            self.position += 1;
            if c == terminator {
                break;
            }
            out.push(c);
        }
        out
    }

    fn consume_tag_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if is_html_whitespace(c) || c == '/' || c == '>' {
                break;
            }
            name.push(c.to_ascii_lowercase());
            self.position += 1;
        }
        name
    }

    fn consume_start_tag(&mut self) {
        self.position += 1;
        let name = self.consume_tag_name();
        let mut attributes: Vec<Attribute> = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some('>') => {
                    self.position += 1;
                    break;
                }
                Some('/') => {
                    self.position += 1;
                    if self.peek() == Some('>') {
                        self_closing = true;
                        self.position += 1;
                        break;
                    }
                }
                Some(_) => {
                    let attribute = self.consume_attribute();
                    if !attributes.iter().any(|a| a.name == attribute.name) {
                        attributes.push(attribute);
                    }
                }
            }
        }

        let raw_text = !self_closing && RAW_TEXT_ELEMENTS.contains(&name.as_str());
        self.emit(Token::StartTag {
            name: name.clone(),
            self_closing,
            attributes,
        });
        if raw_text {
            self.consume_raw_text(&name);
        }
    }

    fn consume_attribute(&mut self) -> Attribute {
        let mut name = String::new();
        // A leading `=` belongs to the name.
        if self.peek() == Some('=') {
            name.push('=');
            self.position += 1;
        }
        while let Some(c) = self.peek() {
            if is_html_whitespace(c) || matches!(c, '/' | '>' | '=') {
                break;
            }
            name.push(c.to_ascii_lowercase());
            self.position += 1;
        }

        self.skip_whitespace();
        if self.peek() != Some('=') {
            return Attribute::new(name, String::new());
        }
        self.position += 1;
        self.skip_whitespace();

        let mut value = String::new();
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.position += 1;
                while let Some(c) = self.peek() {
                    self.position += 1;
                    if c == quote {
                        break;
                    }
                    if c == '&' {
                        value.push_str(&self.consume_character_reference());
                    } else {
                        value.push(c);
                    }
                }
            }
            _ => {
                while let Some(c) = self.peek() {
                    if is_html_whitespace(c) || c == '>' {
                        break;
                    }
                    self.position += 1;
                    if c == '&' {
                        value.push_str(&self.consume_character_reference());
                    } else {
                        value.push(c);
                    }
                }
            }
        }
        Attribute::new(name, value)
    }

    fn consume_end_tag(&mut self) {
        self.position += 2;
        let name = self.consume_tag_name();
        let _ = self.consume_until('>');
        self.emit(Token::EndTag { name });
    }

    /// Everything up to `</name` (case-insensitive) becomes one character token.
    fn consume_raw_text(&mut self, name: &str) {
        let closing = format!("</{name}");
        let start = self.position;
        while self.position < self.input.len() {
            if self.starts_with_ignore_case(&closing)
                && self
                    .peek_at(closing.len())
                    .is_none_or(|c| is_html_whitespace(c) || c == '/' || c == '>')
            {
                break;
            }
            self.position += 1;
        }
        let data: String = self.input[start..self.position].iter().collect();
        if !data.is_empty() {
            self.emit(Token::Character { data });
        }
    }

    /// Called just after a `&`. Returns the decoded text, or `&` itself when
    /// what follows is not a reference we know.
    fn consume_character_reference(&mut self) -> String {
        if self.peek() == Some('#') {
            let hex = matches!(self.peek_at(1), Some('x' | 'X'));
            let digits_start = if hex { 2 } else { 1 };
            let mut len = 0;
            while self.peek_at(digits_start + len).is_some_and(|c| {
                if hex {
                    c.is_ascii_hexdigit()
                } else {
                    c.is_ascii_digit()
                }
            }) {
                len += 1;
            }
            if len == 0 {
                return "&".to_string();
            }
            let digits: String = self.input
                [self.position + digits_start..self.position + digits_start + len]
                .iter()
                .collect();
            let radix = if hex { 16 } else { 10 };
            self.position += digits_start + len;
            if self.peek() == Some(';') {
                self.position += 1;
            }
            return u32::from_str_radix(&digits, radix)
                .ok()
                .and_then(char::from_u32)
                .unwrap_or('\u{fffd}')
                .to_string();
        }

        for (name, decoded) in NAMED_REFERENCES {
            let matches_name = name
                .chars()
                .enumerate()
                .all(|(i, expected)| self.peek_at(i) == Some(expected));
            if matches_name && self.peek_at(name.len()) == Some(';') {
                self.position += name.len() + 1;
                return decoded.to_string();
            }
        }
        "&".to_string()
    }
}

/// ASCII whitespace as HTML defines it.
const fn is_html_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C')
}
