use liam_ast::Span;
use crate::token::{Token, TokenKind};

/// Tokenizes a whole file, tagging spans with `file_id`.
pub fn tokenize(source: &str, file_id: usize) -> Vec<Token> {
    Lexer::with_file_id(source, file_id).tokenize()
}

/// The lexer/tokenizer for Liam.
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::str::CharIndices<'a>,
    current_pos: usize,
    current_char: Option<char>,
    line: u32,
    column: u32,
    /// Offset, line and column where the token being read began
    token_start: (usize, u32, u32),
    file_id: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer from source code.
    pub fn new(source: &'a str) -> Self {
        Self::with_file_id(source, 0)
    }

    /// Creates a new lexer with a specific file ID.
    pub fn with_file_id(source: &'a str, file_id: usize) -> Self {
        let mut chars = source.char_indices();
        let current_char = chars.next().map(|(_, c)| c);
        Self {
            source,
            chars,
            current_pos: 0,
            current_char,
            line: 1,
            column: 1,
            token_start: (0, 1, 1),
            file_id,
        }
    }

    /// Tokenizes the entire source code and returns all tokens.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    /// Gets the next token from the source.
    pub fn next_token(&mut self) -> Token {
        self.mark_start();
        if let Some(error_token) = self.skip_whitespace_and_comments() {
            return error_token;
        }
        self.mark_start();

        let ch = match self.current_char {
            None => return self.make(TokenKind::Eof, String::new()),
            Some(ch) => ch,
        };

        match ch {
            '"' => self.read_string_literal(),
            '0'..='9' => self.read_number(),
            'a'..='z' | 'A'..='Z' | '_' => self.read_identifier_or_keyword(),

            '=' => self.one_or_two('=', TokenKind::Eq, TokenKind::EqEq),
            '!' => self.one_or_two('=', TokenKind::Bang, TokenKind::BangEq),
            '<' => self.one_or_two('=', TokenKind::Lt, TokenKind::LtEq),
            '>' => self.one_or_two('=', TokenKind::Gt, TokenKind::GtEq),
            '.' => self.one_or_two('.', TokenKind::Dot, TokenKind::DotDot),

            '+' => self.single(TokenKind::Plus),
            '-' => self.single(TokenKind::Minus),
            '*' => self.single(TokenKind::Star),
            '/' => self.single(TokenKind::Slash),
            '%' => self.single(TokenKind::Percent),
            '&' => self.single(TokenKind::Amp),
            '^' => self.single(TokenKind::Caret),
            '~' => self.single(TokenKind::Tilde),
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            ';' => self.single(TokenKind::Semicolon),
            ',' => self.single(TokenKind::Comma),
            ':' => self.single(TokenKind::Colon),

            _ if ch.is_alphabetic() => self.read_identifier_or_keyword(),

            _ => {
                self.advance();
                self.make(TokenKind::Error, format!("Unexpected character: {}", ch))
            }
        }
    }

    // Helper methods

    fn advance(&mut self) {
        if self.current_char == Some('\n') {
            self.line += 1;
            self.column = 1;
        } else if self.current_char.is_some() {
            self.column += 1;
        }
        if let Some((pos, ch)) = self.chars.next() {
            self.current_pos = pos;
            self.current_char = Some(ch);
        } else {
            self.current_pos = self.source.len();
            self.current_char = None;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.clone().next().map(|(_, c)| c)
    }

    fn mark_start(&mut self) {
        self.token_start = (self.current_pos, self.line, self.column);
    }

    fn make(&self, kind: TokenKind, value: String) -> Token {
        let (start, line, column) = self.token_start;
        Token::new(
            kind,
            Span::new(start, self.current_pos, line, column, self.file_id),
            value,
        )
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let start = self.current_pos;
        self.advance();
        let text = self.source[start..self.current_pos].to_string();
        self.make(kind, text)
    }

    /// Reads `kind` or, when followed by `next`, the two-character `long` token.
    fn one_or_two(&mut self, next: char, kind: TokenKind, long: TokenKind) -> Token {
        let start = self.current_pos;
        self.advance();
        let kind = if self.current_char == Some(next) {
            self.advance();
            long
        } else {
            kind
        };
        let text = self.source[start..self.current_pos].to_string();
        self.make(kind, text)
    }

    fn skip_whitespace_and_comments(&mut self) -> Option<Token> {
        loop {
            match self.current_char {
                Some(ch) if ch.is_whitespace() => self.advance(),
                Some('/') if self.peek() == Some('/') => self.skip_single_line_comment(),
                Some('/') if self.peek() == Some('*') => {
                    self.mark_start();
                    if !self.skip_multi_line_comment() {
                        return Some(self.make(
                            TokenKind::Error,
                            "Unterminated multi-line comment".to_string(),
                        ));
                    }
                }
                _ => return None,
            }
        }
    }

    fn skip_single_line_comment(&mut self) {
        while let Some(ch) = self.current_char {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    fn skip_multi_line_comment(&mut self) -> bool {
        // Skip /*
        self.advance();
        self.advance();

        while let Some(ch) = self.current_char {
            if ch == '*' && self.peek() == Some('/') {
                self.advance();
                self.advance();
                return true;
            }
            self.advance();
        }
        false
    }

    fn read_string_literal(&mut self) -> Token {
        self.advance(); // Skip opening quote

        let mut value = String::new();

        while let Some(ch) = self.current_char {
            match ch {
                '"' => {
                    self.advance();
                    return self.make(TokenKind::StringLiteral, value);
                }
                '\\' => {
                    self.advance();
                    let unescaped = match self.current_char {
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('t') => '\t',
                        Some('0') => '\0',
                        Some(other) => other,
                        None => break,
                    };
                    value.push(unescaped);
                    self.advance();
                }
                '\n' => break,
                _ => {
                    value.push(ch);
                    self.advance();
                }
            }
        }

        self.make(TokenKind::Error, "Unterminated string literal".to_string())
    }

    /// Digits, an optional fraction and an optional type suffix (`10u8`, `2.5f32`).
    fn read_number(&mut self) -> Token {
        let mut value = String::new();

        self.read_digits(&mut value);

        // `0..10` is a range, not a decimal
        if self.current_char == Some('.') && self.peek().map_or(false, |c| c.is_ascii_digit()) {
            value.push('.');
            self.advance();
            self.read_digits(&mut value);
        }

        while let Some(ch) = self.current_char {
            if ch.is_ascii_alphanumeric() {
                value.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        self.make(TokenKind::NumberLiteral, value)
    }

    fn read_digits(&mut self, value: &mut String) {
        while let Some(ch) = self.current_char {
            if ch.is_ascii_digit() || ch == '_' {
                if ch != '_' {
                    value.push(ch);
                }
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier_or_keyword(&mut self) -> Token {
        let mut value = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_alphanumeric() || ch == '_' {
                value.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let kind = TokenKind::keyword(&value).unwrap_or(TokenKind::Identifier);
        self.make(kind, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).tokenize().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords() {
        let source = "fn struct import let return break continue for if else new own and or";
        let tokens = Lexer::new(source).tokenize();

        assert_eq!(tokens[0].kind, TokenKind::Fn);
        assert_eq!(tokens[1].kind, TokenKind::Struct);
        assert_eq!(tokens[2].kind, TokenKind::Import);
        assert_eq!(tokens[3].kind, TokenKind::Let);
        assert_eq!(tokens[10].kind, TokenKind::New);
        assert_eq!(tokens[11].kind, TokenKind::Own);
        assert_eq!(tokens[13].kind, TokenKind::Or);
        assert_eq!(tokens[14].kind, TokenKind::Eof);
    }

    #[test]
    fn test_numbers() {
        let source = "123 10u8 2.5f32 1_000 7.25";
        let tokens = Lexer::new(source).tokenize();

        assert_eq!(tokens[0].value, "123");
        assert_eq!(tokens[1].value, "10u8");
        assert_eq!(tokens[2].value, "2.5f32");
        assert_eq!(tokens[3].value, "1000");
        assert_eq!(tokens[4].value, "7.25");
        assert!(tokens[..5].iter().all(|t| t.kind == TokenKind::NumberLiteral));
    }

    #[test]
    fn test_range_is_not_a_decimal() {
        assert_eq!(
            kinds("0..10"),
            vec![
                TokenKind::NumberLiteral,
                TokenKind::DotDot,
                TokenKind::NumberLiteral,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("= == != <= >= ^ ~ & ."),
            vec![
                TokenKind::Eq,
                TokenKind::EqEq,
                TokenKind::BangEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::Caret,
                TokenKind::Tilde,
                TokenKind::Amp,
                TokenKind::Dot,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_line_and_column_tracking() {
        let source = "let a := 1;\n  // note\n  fn";
        let tokens = Lexer::new(source).tokenize();
        let fn_token = tokens.iter().find(|t| t.kind == TokenKind::Fn).unwrap();
        assert_eq!(fn_token.span.line, 3);
        assert_eq!(fn_token.span.column, 3);
        assert_eq!(&source[fn_token.span.start..fn_token.span.end], "fn");
    }

    #[test]
    fn test_string_escapes() {
        let tokens = Lexer::new(r#""a\n\"b""#).tokenize();
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].value, "a\n\"b");
    }

    #[test]
    fn test_unterminated_string() {
        let tokens = Lexer::new("\"abc\nlet").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert!(tokens[0].value.contains("Unterminated"));
    }

    #[test]
    fn test_unexpected_character() {
        let tokens = tokenize("let $x", 3);
        assert_eq!(tokens[1].kind, TokenKind::Error);
        assert_eq!(tokens[1].span.file_id, 3);
    }
}
