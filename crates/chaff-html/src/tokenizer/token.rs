use core::fmt;

/// An attribute on a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Lowercased attribute name.
    pub name: String,
    /// Value with character references decoded. Empty for bare attributes.
    pub value: String,
}

impl Attribute {
    /// Create a new attribute with the given name and value.
    #[must_use]
    pub const fn new(name: String, value: String) -> Self {
        Self { name, value }
    }
}

/// Tokens handed from the tokenizer to the tree builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `<!DOCTYPE name ...>`.
    Doctype {
        /// Lowercased doctype name, empty if missing.
        name: String,
    },
    /// `<name attr=value ...>`.
    StartTag {
        /// Lowercased tag name.
        name: String,
        /// Whether the tag ended in `/>`.
        self_closing: bool,
        /// Attributes in source order, first occurrence wins.
        attributes: Vec<Attribute>,
    },
    /// `</name>`. Attributes on end tags are discarded.
    EndTag {
        /// Lowercased tag name.
        name: String,
    },
    /// `<!-- data -->`, or a bogus comment such as `<?xml ...>`.
    Comment {
        /// Comment text.
        data: String,
    },
    /// A run of character data.
    Character {
        /// Text with character references decoded.
        data: String,
    },
    /// End of input.
    EndOfFile,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Doctype { name } => write!(f, "<!DOCTYPE {name}>"),
            Self::StartTag {
                name,
                self_closing,
                attributes,
            } => {
                write!(f, "<{name}")?;
                for attr in attributes {
                    write!(f, " {}=\"{}\"", attr.name, attr.value)?;
                }
                if *self_closing {
                    write!(f, " /")?;
                }
                write!(f, ">")
            }
            Self::EndTag { name } => write!(f, "</{name}>"),
            Self::Comment { data } => write!(f, "<!--{data}-->"),
            Self::Character { data } => write!(f, "{data:?}"),
            Self::EndOfFile => write!(f, "EOF"),
        }
    }
}
