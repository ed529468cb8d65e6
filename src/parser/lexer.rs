//! Tokenizer for shell-style query strings
//!
//! Scans `db.collection.operation({...})` commands and bare literals into a
//! flat token stream for the recursive-descent grammar. Unknown characters
//! become `Unknown` tokens and unterminated string or regex literals become
//! `Unterminated` tokens; the grammar rejects both with a syntax error, so
//! the lexer itself never fails.

use std::ops::Range;

/// Token types for the query grammar
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// "db" keyword
    Db,
    /// Identifier (collection name, operation name, constructor, ...)
    Ident(String),
    /// Dot separator
    Dot,
    /// Left parenthesis
    LParen,
    /// Right parenthesis
    RParen,
    /// Left brace
    LBrace,
    /// Right brace
    RBrace,
    /// Left bracket
    LBracket,
    /// Right bracket
    RBracket,
    /// Comma
    Comma,
    /// Colon
    Colon,
    /// Semicolon
    Semicolon,
    /// Minus sign
    Minus,
    /// Plus sign
    Plus,
    /// Exclamation mark
    Bang,
    /// String literal (single or double quoted)
    String(String),
    /// Number literal, kept as source text
    Number(String),
    /// Regex literal: /pattern/flags
    Regex { pattern: String, flags: String },
    /// String or regex literal missing its closing delimiter
    Unterminated(char),
    /// End of input
    EOF,
    /// Unknown character
    Unknown(char),
}

/// Token with position information
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

impl Token {
    pub fn new(kind: TokenKind, span: Range<usize>) -> Self {
        Self { kind, span }
    }
}

/// Character-by-character scanner over the raw command string.
pub struct QueryLexer {
    input: Vec<char>,
    pos: usize,
}

impl QueryLexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
        }
    }

    /// Tokenize the entire input, always ending with an EOF token.
    pub fn tokenize(input: &str) -> Vec<Token> {
        let mut lexer = Self::new(input);
        let mut tokens = Vec::new();

        loop {
            let token = lexer.next_token();
            let is_eof = matches!(token.kind, TokenKind::EOF);
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        tokens
    }

    fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.pos;

        if self.is_at_end() {
            return Token::new(TokenKind::EOF, start..start);
        }

        let ch = self.current_char();

        match ch {
            '.' => self.single(TokenKind::Dot, start),
            '(' => self.single(TokenKind::LParen, start),
            ')' => self.single(TokenKind::RParen, start),
            '{' => self.single(TokenKind::LBrace, start),
            '}' => self.single(TokenKind::RBrace, start),
            '[' => self.single(TokenKind::LBracket, start),
            ']' => self.single(TokenKind::RBracket, start),
            ',' => self.single(TokenKind::Comma, start),
            ':' => self.single(TokenKind::Colon, start),
            ';' => self.single(TokenKind::Semicolon, start),
            '-' => self.single(TokenKind::Minus, start),
            '+' => self.single(TokenKind::Plus, start),
            '!' => self.single(TokenKind::Bang, start),
            '/' => self.scan_regex(start),
            '\'' | '"' => self.scan_string(ch, start),
            '0'..='9' => self.scan_number(start),
            'a'..='z' | 'A'..='Z' | '_' | '$' => self.scan_identifier(start),
            _ => {
                self.advance();
                Token::new(TokenKind::Unknown(ch), start..self.pos)
            }
        }
    }

    /// Consume one character and emit the given token.
    fn single(&mut self, kind: TokenKind, start: usize) -> Token {
        self.advance();
        Token::new(kind, start..self.pos)
    }

    /// Scan a string literal
    fn scan_string(&mut self, quote: char, start: usize) -> Token {
        self.advance(); // Skip opening quote

        let mut value = String::new();

        while !self.is_at_end() && self.current_char() != quote {
            let ch = self.current_char();
            if ch == '\\' {
                self.advance();
                if self.is_at_end() {
                    return Token::new(TokenKind::Unterminated(quote), start..self.pos);
                }
                match self.current_char() {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    '\\' => value.push('\\'),
                    '\'' => value.push('\''),
                    '"' => value.push('"'),
                    other => {
                        value.push('\\');
                        value.push(other);
                    }
                }
            } else {
                value.push(ch);
            }
            self.advance();
        }

        if self.is_at_end() {
            return Token::new(TokenKind::Unterminated(quote), start..self.pos);
        }

        self.advance(); // Skip closing quote
        Token::new(TokenKind::String(value), start..self.pos)
    }

    /// Scan a regex literal: /pattern/flags
    ///
    /// A `/` inside a character class does not terminate the pattern, and a
    /// backslash escapes the next character.
    fn scan_regex(&mut self, start: usize) -> Token {
        self.advance(); // Skip opening slash

        let mut pattern = String::new();
        let mut in_class = false;

        loop {
            if self.is_at_end() {
                return Token::new(TokenKind::Unterminated('/'), start..self.pos);
            }

            let ch = self.current_char();
            match ch {
                '\\' => {
                    pattern.push(ch);
                    self.advance();
                    if self.is_at_end() {
                        return Token::new(TokenKind::Unterminated('/'), start..self.pos);
                    }
                    pattern.push(self.current_char());
                    self.advance();
                }
                '[' => {
                    in_class = true;
                    pattern.push(ch);
                    self.advance();
                }
                ']' => {
                    in_class = false;
                    pattern.push(ch);
                    self.advance();
                }
                '/' if !in_class => {
                    self.advance();
                    break;
                }
                _ => {
                    pattern.push(ch);
                    self.advance();
                }
            }
        }

        let mut flags = String::new();
        while !self.is_at_end() && self.current_char().is_ascii_alphabetic() {
            flags.push(self.current_char());
            self.advance();
        }

        Token::new(TokenKind::Regex { pattern, flags }, start..self.pos)
    }

    /// Scan a number (integer or decimal)
    fn scan_number(&mut self, start: usize) -> Token {
        let mut value = String::new();

        while !self.is_at_end() && self.current_char().is_ascii_digit() {
            value.push(self.current_char());
            self.advance();
        }

        if self.current_char() == '.' && self.peek_char().is_ascii_digit() {
            value.push('.');
            self.advance();
            while !self.is_at_end() && self.current_char().is_ascii_digit() {
                value.push(self.current_char());
                self.advance();
            }
        }

        Token::new(TokenKind::Number(value), start..self.pos)
    }

    /// Scan an identifier or the "db" keyword
    fn scan_identifier(&mut self, start: usize) -> Token {
        let mut value = String::new();

        while !self.is_at_end() {
            let ch = self.current_char();
            if ch.is_alphanumeric() || ch == '_' || ch == '$' {
                value.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let kind = if value == "db" {
            TokenKind::Db
        } else {
            TokenKind::Ident(value)
        };

        Token::new(kind, start..self.pos)
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    fn current_char(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.input[self.pos]
        }
    }

    fn peek_char(&self) -> char {
        if self.pos + 1 >= self.input.len() {
            '\0'
        } else {
            self.input[self.pos + 1]
        }
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_db_call_shape() {
        let tokens = QueryLexer::tokenize("db.movies.find");
        assert!(matches!(tokens[0].kind, TokenKind::Db));
        assert!(matches!(tokens[1].kind, TokenKind::Dot));
        assert!(matches!(tokens[2].kind, TokenKind::Ident(ref s) if s == "movies"));
        assert!(matches!(tokens[3].kind, TokenKind::Dot));
        assert!(matches!(tokens[4].kind, TokenKind::Ident(ref s) if s == "find"));
        assert!(matches!(tokens[5].kind, TokenKind::EOF));
    }

    #[test]
    fn test_tokenize_brackets_and_braces() {
        let tokens = QueryLexer::tokenize("find({a: [1]})");
        assert!(tokens.iter().any(|t| matches!(t.kind, TokenKind::LParen)));
        assert!(tokens.iter().any(|t| matches!(t.kind, TokenKind::LBrace)));
        assert!(tokens.iter().any(|t| matches!(t.kind, TokenKind::LBracket)));
        assert!(tokens.iter().any(|t| matches!(t.kind, TokenKind::RBracket)));
        assert!(tokens.iter().any(|t| matches!(t.kind, TokenKind::RBrace)));
        assert!(tokens.iter().any(|t| matches!(t.kind, TokenKind::RParen)));
    }

    #[test]
    fn test_tokenize_single_quoted_string() {
        let tokens = QueryLexer::tokenize("{title: 'The Matrix'}");
        assert!(
            tokens
                .iter()
                .any(|t| matches!(t.kind, TokenKind::String(ref s) if s == "The Matrix"))
        );
    }

    #[test]
    fn test_tokenize_string_escapes() {
        let tokens = QueryLexer::tokenize(r"'line\nbreak'");
        assert!(matches!(tokens[0].kind, TokenKind::String(ref s) if s == "line\nbreak"));
    }

    #[test]
    fn test_tokenize_unterminated_string() {
        let tokens = QueryLexer::tokenize("'oops");
        assert!(matches!(tokens[0].kind, TokenKind::Unterminated('\'')));
    }

    #[test]
    fn test_tokenize_numbers() {
        let tokens = QueryLexer::tokenize("{year: 1999, rating: 8.7}");
        assert!(
            tokens
                .iter()
                .any(|t| matches!(t.kind, TokenKind::Number(ref s) if s == "1999"))
        );
        assert!(
            tokens
                .iter()
                .any(|t| matches!(t.kind, TokenKind::Number(ref s) if s == "8.7"))
        );
    }

    #[test]
    fn test_tokenize_minus_before_number() {
        let tokens = QueryLexer::tokenize("{order: -1}");
        assert!(tokens.iter().any(|t| matches!(t.kind, TokenKind::Minus)));
        assert!(
            tokens
                .iter()
                .any(|t| matches!(t.kind, TokenKind::Number(ref s) if s == "1"))
        );
    }

    #[test]
    fn test_tokenize_regex_with_flags() {
        let tokens = QueryLexer::tokenize("{title: /matrix/i}");
        assert!(tokens.iter().any(|t| matches!(
            t.kind,
            TokenKind::Regex { ref pattern, ref flags } if pattern == "matrix" && flags == "i"
        )));
    }

    #[test]
    fn test_tokenize_regex_slash_in_class() {
        let tokens = QueryLexer::tokenize("/[/]x/");
        assert!(matches!(
            tokens[0].kind,
            TokenKind::Regex { ref pattern, ref flags } if pattern == "[/]x" && flags.is_empty()
        ));
    }

    #[test]
    fn test_tokenize_regex_escaped_slash() {
        let tokens = QueryLexer::tokenize(r"/a\/b/");
        assert!(matches!(
            tokens[0].kind,
            TokenKind::Regex { ref pattern, .. } if pattern == r"a\/b"
        ));
    }

    #[test]
    fn test_tokenize_unterminated_regex() {
        let tokens = QueryLexer::tokenize("/never-closed");
        assert!(matches!(tokens[0].kind, TokenKind::Unterminated('/')));
    }

    #[test]
    fn test_tokenize_dollar_operator() {
        let tokens = QueryLexer::tokenize("{year: {$gt: 2000}}");
        assert!(
            tokens
                .iter()
                .any(|t| matches!(t.kind, TokenKind::Ident(ref s) if s == "$gt"))
        );
    }

    #[test]
    fn test_tokenize_empty_input() {
        let tokens = QueryLexer::tokenize("");
        assert_eq!(tokens.len(), 1);
        assert!(matches!(tokens[0].kind, TokenKind::EOF));
    }

    #[test]
    fn test_tokenize_unknown_chars() {
        let tokens = QueryLexer::tokenize("db.movies@");
        assert!(
            tokens
                .iter()
                .any(|t| matches!(t.kind, TokenKind::Unknown('@')))
        );
    }
}
