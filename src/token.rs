use std::fmt;

/// A structural delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delim {
    ObjectOpen,
    ObjectClose,
    ArrayOpen,
    ArrayClose,
}

impl Delim {
    pub fn as_char(self) -> char {
        match self {
            Delim::ObjectOpen => '{',
            Delim::ObjectClose => '}',
            Delim::ArrayOpen => '[',
            Delim::ArrayClose => ']',
        }
    }

    pub fn is_open(self) -> bool {
        matches!(self, Delim::ObjectOpen | Delim::ArrayOpen)
    }

    /// Quoted form used in error messages.
    pub(crate) fn expected(self) -> &'static str {
        match self {
            Delim::ObjectOpen => "'{'",
            Delim::ObjectClose => "'}'",
            Delim::ArrayOpen => "'['",
            Delim::ArrayClose => "']'",
        }
    }
}

impl fmt::Display for Delim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One structural delimiter or scalar read from the stream.
///
/// Separators (`,` and `:`) never surface as tokens; the lexer checks them.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Delim(Delim),
    /// An object key or string value, already unescaped.
    String(String),
    /// The number lexeme exactly as it appeared in the input.
    Number(String),
    Bool(bool),
    Null,
}

impl Token {
    pub fn as_delim(&self) -> Option<Delim> {
        match self {
            Token::Delim(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Delim(d) => write!(f, "'{}'", d),
            Token::String(s) => write!(f, "string {:?}", s),
            Token::Number(n) => write!(f, "number {}", n),
            Token::Bool(b) => write!(f, "{}", b),
            Token::Null => f.write_str("null"),
        }
    }
}
