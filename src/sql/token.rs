/// Token types for SQL lexer
use phf::phf_map;

// Perfect hash map for O(1) keyword lookup
static KEYWORDS: phf::Map<&'static str, TokenType> = phf_map! {
    "select" => TokenType::Select,
    "from" => TokenType::From,
    "where" => TokenType::Where,
    "and" => TokenType::And,
    "or" => TokenType::Or,
    "as" => TokenType::As,
    "order" => TokenType::Order,
    "by" => TokenType::By,
    "asc" => TokenType::Asc,
    "desc" => TokenType::Desc,
    "group" => TokenType::Group,
    "having" => TokenType::Having,
    "limit" => TokenType::Limit,
    "offset" => TokenType::Offset,
    "distinct" => TokenType::Distinct,
    "join" => TokenType::Join,
    "inner" => TokenType::Inner,
    "left" => TokenType::Left,
    "right" => TokenType::Right,
    "full" => TokenType::Full,
    "outer" => TokenType::Outer,
    "on" => TokenType::On,
};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    // Keywords
    Select,
    From,
    Where,
    And,
    Or,
    As,
    Order,
    By,
    Asc,
    Desc,
    Group,
    Having,   // recognized only to be rejected
    Limit,    // recognized only to be rejected
    Offset,   // recognized only to be rejected
    Distinct, // recognized only to be rejected
    Join,
    Inner,
    Left,
    Right,
    Full,
    Outer,
    On,

    // Operators
    Eq,    // =
    Ne,    // != or <>
    Lt,    // <
    Gt,    // >
    Le,    // <=
    Ge,    // >=
    Plus,  // +
    Minus, // -
    Star,  // *

    // Delimiters
    LParen,    // (
    RParen,    // )
    Comma,     // ,
    Semicolon, // ;
    Dot,       // .

    // Literals
    Number(f64),
    String(String),
    Identifier(String),

    /// Any character the grammar has no use for. Kept as a token so that an
    /// odd WHERE predicate degrades to "unparsable" instead of failing the lexer.
    Unknown(char),

    // Special
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    /// Source text of the token, quotes included for strings
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(token_type: TokenType, lexeme: String, line: usize, column: usize) -> Self {
        Self {
            token_type,
            lexeme,
            line,
            column,
        }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.token_type, TokenType::Eof)
    }
}

impl TokenType {
    /// Check if this token is a keyword (O(1) perfect hash lookup)
    pub fn from_keyword(s: &str) -> Option<Self> {
        // Convert to lowercase for case-insensitive matching
        let lowercase = s.to_lowercase();
        KEYWORDS.get(lowercase.as_str()).cloned()
    }

    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenType::Select
                | TokenType::From
                | TokenType::Where
                | TokenType::And
                | TokenType::Or
                | TokenType::As
                | TokenType::Order
                | TokenType::By
                | TokenType::Asc
                | TokenType::Desc
                | TokenType::Group
                | TokenType::Having
                | TokenType::Limit
                | TokenType::Offset
                | TokenType::Distinct
                | TokenType::Join
                | TokenType::Inner
                | TokenType::Left
                | TokenType::Right
                | TokenType::Full
                | TokenType::Outer
                | TokenType::On
        )
    }
}

/// Render a token run back into normalized text (for messages)
pub fn render(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens.iter().filter(|t| !t.is_eof()) {
        let glue = matches!(token.token_type, TokenType::Dot | TokenType::Comma | TokenType::RParen)
            || out.ends_with('.')
            || out.ends_with('(');
        if !out.is_empty() && !glue {
            out.push(' ');
        }
        out.push_str(&token.lexeme);
    }
    out
}
