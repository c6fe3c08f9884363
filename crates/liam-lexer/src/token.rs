use std::fmt;

use liam_ast::Span;

/// Represents the different kinds of tokens in Liam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    Fn,
    Struct,
    Import,
    Let,
    Return,
    Break,
    Continue,
    For,
    If,
    Else,
    New,
    Own,
    And,
    Or,
    True,
    False,
    Null,
    Zero,

    // Literals
    NumberLiteral,
    StringLiteral,

    // Identifier
    Identifier,

    // Operators
    Plus,              // +
    Minus,             // -
    Star,              // *
    Slash,             // /
    Percent,           // %
    Eq,                // =
    EqEq,              // ==
    BangEq,            // !=
    Lt,                // <
    Gt,                // >
    LtEq,              // <=
    GtEq,              // >=
    Bang,              // !
    Amp,               // &
    Caret,             // ^
    Tilde,             // ~
    DotDot,            // ..

    // Delimiters
    LParen,            // (
    RParen,            // )
    LBrace,            // {
    RBrace,            // }
    LBracket,          // [
    RBracket,          // ]
    Semicolon,         // ;
    Comma,             // ,
    Dot,               // .
    Colon,             // :

    // Special
    Eof,
    Error,
}

impl TokenKind {
    pub fn keyword(text: &str) -> Option<TokenKind> {
        let kind = match text {
            "fn" => TokenKind::Fn,
            "struct" => TokenKind::Struct,
            "import" => TokenKind::Import,
            "let" => TokenKind::Let,
            "return" => TokenKind::Return,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "for" => TokenKind::For,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "new" => TokenKind::New,
            "own" => TokenKind::Own,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            "zero" => TokenKind::Zero,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Fn => "'fn'",
            TokenKind::Struct => "'struct'",
            TokenKind::Import => "'import'",
            TokenKind::Let => "'let'",
            TokenKind::Return => "'return'",
            TokenKind::Break => "'break'",
            TokenKind::Continue => "'continue'",
            TokenKind::For => "'for'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::New => "'new'",
            TokenKind::Own => "'own'",
            TokenKind::And => "'and'",
            TokenKind::Or => "'or'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Null => "'null'",
            TokenKind::Zero => "'zero'",
            TokenKind::NumberLiteral => "number",
            TokenKind::StringLiteral => "string",
            TokenKind::Identifier => "identifier",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Eq => "'='",
            TokenKind::EqEq => "'=='",
            TokenKind::BangEq => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::LtEq => "'<='",
            TokenKind::GtEq => "'>='",
            TokenKind::Bang => "'!'",
            TokenKind::Amp => "'&'",
            TokenKind::Caret => "'^'",
            TokenKind::Tilde => "'~'",
            TokenKind::DotDot => "'..'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::Colon => "':'",
            TokenKind::Eof => "end of file",
            TokenKind::Error => "invalid token",
        };
        write!(f, "{}", s)
    }
}

/// Represents a token with its kind, span, and value.
///
/// For `Error` tokens the value holds the lexer's message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub value: String,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, span: Span, value: String) -> Self {
        Self { kind, span, value }
    }
}
