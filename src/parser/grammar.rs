//! Recursive-descent grammar for shell-style query strings
//!
//! Consumes the token stream from [`QueryLexer`](super::lexer::QueryLexer)
//! and produces the expression AST. Nesting is handled by recursion, so
//! bracket and parenthesis balancing falls out of the grammar itself. The
//! whole input must form exactly one expression; trailing tokens are a
//! syntax error.

use super::ast::*;
use super::lexer::{QueryLexer, Token, TokenKind};
use crate::error::{ParseError, Result};

/// Parser over a lexed query string.
pub struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl ExprParser {
    pub fn new(input: &str) -> Self {
        let tokens = QueryLexer::tokenize(input);
        Self { tokens, pos: 0 }
    }

    /// Parse the input as a single expression spanning the whole string.
    pub fn parse(input: &str) -> Result<Expr> {
        let mut parser = Self::new(input);
        let expr = parser.parse_expression()?;

        if !parser.check(&TokenKind::EOF) {
            let found = parser.describe_current();
            return Err(
                ParseError::SyntaxError(format!("Unexpected trailing input: {found}")).into(),
            );
        }

        Ok(expr)
    }

    fn parse_expression(&mut self) -> Result<Expr> {
        self.parse_unary()
    }

    /// Parse unary expression: -x, +x, !x
    fn parse_unary(&mut self) -> Result<Expr> {
        let start = self.current_pos();

        if self.match_token(&TokenKind::Minus) {
            let argument = self.parse_unary()?;
            let end = self.previous_pos();
            return Ok(Expr::Unary(Box::new(UnaryExpr::new(
                UnaryOperator::Minus,
                argument,
                start..end,
            ))));
        }

        if self.match_token(&TokenKind::Plus) {
            let argument = self.parse_unary()?;
            let end = self.previous_pos();
            return Ok(Expr::Unary(Box::new(UnaryExpr::new(
                UnaryOperator::Plus,
                argument,
                start..end,
            ))));
        }

        if self.match_token(&TokenKind::Bang) {
            let argument = self.parse_unary()?;
            let end = self.previous_pos();
            return Ok(Expr::Unary(Box::new(UnaryExpr::new(
                UnaryOperator::Not,
                argument,
                start..end,
            ))));
        }

        self.parse_member_or_call()
    }

    /// Parse member access and call chains: db.movies.find({...})
    fn parse_member_or_call(&mut self) -> Result<Expr> {
        let start = self.current_pos();

        // 'new' prefixes a constructor call
        if let Some(Token {
            kind: TokenKind::Ident(name),
            ..
        }) = self.current()
        {
            if name == "new" {
                self.advance();
                return self.parse_new_expression(start);
            }
        }

        let mut expr = self.parse_primary()?;

        loop {
            if self.match_token(&TokenKind::Dot) {
                let prop_name = self.expect_identifier("Expected property name after '.'")?;
                let end = self.previous_pos();
                expr = Expr::Member(Box::new(MemberExpr::new(
                    expr,
                    MemberProperty::Ident(prop_name),
                    start..end,
                )));
            } else if self.match_token(&TokenKind::LBracket) {
                let property = self.parse_expression()?;
                self.expect_token(&TokenKind::RBracket, "]")?;
                let end = self.previous_pos();
                expr = Expr::Member(Box::new(MemberExpr::new(
                    expr,
                    MemberProperty::Computed(property),
                    start..end,
                )));
            } else if self.match_token(&TokenKind::LParen) {
                let arguments = self.parse_arguments()?;
                self.expect_token(&TokenKind::RParen, ")")?;
                let end = self.previous_pos();
                expr = Expr::Call(Box::new(CallExpr::new(expr, arguments, start..end)));
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Parse new expression: new Ctor(args)
    fn parse_new_expression(&mut self, start: usize) -> Result<Expr> {
        let callee = self.parse_primary()?;

        let arguments = if self.match_token(&TokenKind::LParen) {
            let args = self.parse_arguments()?;
            self.expect_token(&TokenKind::RParen, ")")?;
            args
        } else {
            vec![]
        };

        let end = self.previous_pos();
        Ok(Expr::New(Box::new(NewExpr::new(
            callee,
            arguments,
            start..end,
        ))))
    }

    /// Parse primary expression (literals, identifiers, objects, arrays)
    fn parse_primary(&mut self) -> Result<Expr> {
        let start = self.current_pos();

        match self.current() {
            Some(token) => match &token.kind {
                TokenKind::String(s) => {
                    let value = s.clone();
                    self.advance();
                    Ok(Expr::String(value))
                }
                TokenKind::Number(n) => {
                    let value = n
                        .parse::<f64>()
                        .map_err(|_| ParseError::SyntaxError(format!("Invalid number: {}", n)))?;
                    self.advance();
                    Ok(Expr::Number(value))
                }
                TokenKind::Regex { pattern, flags } => {
                    let expr = Expr::Regex {
                        pattern: pattern.clone(),
                        flags: flags.clone(),
                    };
                    self.advance();
                    Ok(expr)
                }
                TokenKind::Ident(name) => {
                    let name = name.clone();
                    self.advance();

                    match name.as_str() {
                        "true" => Ok(Expr::Boolean(true)),
                        "false" => Ok(Expr::Boolean(false)),
                        "null" | "undefined" => Ok(Expr::Null),
                        "Infinity" => Ok(Expr::Number(f64::INFINITY)),
                        "NaN" => Ok(Expr::Number(f64::NAN)),
                        _ => Ok(Expr::Ident(name)),
                    }
                }
                TokenKind::Db => {
                    self.advance();
                    Ok(Expr::Ident("db".to_string()))
                }
                TokenKind::LBrace => self.parse_object(start),
                TokenKind::LBracket => self.parse_array(start),
                TokenKind::LParen => {
                    self.advance();
                    let expr = self.parse_expression()?;
                    self.expect_token(&TokenKind::RParen, ")")?;
                    Ok(expr)
                }
                TokenKind::Unterminated('/') => {
                    Err(ParseError::SyntaxError("Unterminated regex literal".to_string()).into())
                }
                TokenKind::Unterminated(_) => {
                    Err(ParseError::SyntaxError("Unterminated string literal".to_string()).into())
                }
                other => {
                    Err(ParseError::SyntaxError(format!("Unexpected token: {other:?}")).into())
                }
            },
            None => Err(ParseError::SyntaxError("Unexpected end of input".to_string()).into()),
        }
    }

    /// Parse object literal: { key: value, ... }
    fn parse_object(&mut self, start: usize) -> Result<Expr> {
        self.expect_token(&TokenKind::LBrace, "{")?;

        let mut properties = Vec::new();

        if self.match_token(&TokenKind::RBrace) {
            let end = self.previous_pos();
            return Ok(Expr::Object(ObjectExpr::new(properties, start..end)));
        }

        loop {
            let prop_start = self.current_pos();

            let key = self.parse_property_key()?;
            self.expect_token(&TokenKind::Colon, ":")?;
            let value = self.parse_expression()?;

            let prop_end = self.previous_pos();
            properties.push(Property::new(key, value, prop_start..prop_end));

            // Trailing comma is allowed
            if self.match_token(&TokenKind::Comma) {
                if self.check(&TokenKind::RBrace) {
                    break;
                }
                continue;
            } else if self.check(&TokenKind::RBrace) {
                break;
            } else {
                return Err(ParseError::SyntaxError(
                    "Expected ',' or '}' after property".to_string(),
                )
                .into());
            }
        }

        self.expect_token(&TokenKind::RBrace, "}")?;
        let end = self.previous_pos();

        Ok(Expr::Object(ObjectExpr::new(properties, start..end)))
    }

    /// Parse property key (identifier, string, or number)
    fn parse_property_key(&mut self) -> Result<PropertyKey> {
        match self.current() {
            Some(token) => match &token.kind {
                TokenKind::Ident(name) => {
                    let key = PropertyKey::Ident(name.clone());
                    self.advance();
                    Ok(key)
                }
                TokenKind::String(s) => {
                    let key = PropertyKey::String(s.clone());
                    self.advance();
                    Ok(key)
                }
                TokenKind::Number(n) => {
                    let key = PropertyKey::Number(n.clone());
                    self.advance();
                    Ok(key)
                }
                // "db" is an ordinary key inside an object literal
                TokenKind::Db => {
                    self.advance();
                    Ok(PropertyKey::Ident("db".to_string()))
                }
                _ => Err(ParseError::SyntaxError(
                    "Expected property key (identifier, string, or number)".to_string(),
                )
                .into()),
            },
            None => Err(ParseError::SyntaxError("Unexpected end of input".to_string()).into()),
        }
    }

    /// Parse array literal: [elem1, elem2, ...]
    fn parse_array(&mut self, start: usize) -> Result<Expr> {
        self.expect_token(&TokenKind::LBracket, "[")?;

        let mut elements = Vec::new();

        if self.match_token(&TokenKind::RBracket) {
            let end = self.previous_pos();
            return Ok(Expr::Array(ArrayExpr::new(elements, start..end)));
        }

        loop {
            let element = self.parse_expression()?;
            elements.push(element);

            if self.match_token(&TokenKind::Comma) {
                if self.check(&TokenKind::RBracket) {
                    break;
                }
                continue;
            } else if self.check(&TokenKind::RBracket) {
                break;
            } else {
                return Err(ParseError::SyntaxError(
                    "Expected ',' or ']' after array element".to_string(),
                )
                .into());
            }
        }

        self.expect_token(&TokenKind::RBracket, "]")?;
        let end = self.previous_pos();

        Ok(Expr::Array(ArrayExpr::new(elements, start..end)))
    }

    /// Parse call arguments: arg1, arg2, ...
    fn parse_arguments(&mut self) -> Result<Vec<Expr>> {
        let mut arguments = Vec::new();

        if self.check(&TokenKind::RParen) {
            return Ok(arguments);
        }

        loop {
            let arg = self.parse_expression()?;
            arguments.push(arg);

            if self.match_token(&TokenKind::Comma) {
                if self.check(&TokenKind::RParen) {
                    break;
                }
                continue;
            } else {
                break;
            }
        }

        Ok(arguments)
    }

    // Token manipulation methods

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Check if current token matches the given kind
    fn check(&self, kind: &TokenKind) -> bool {
        if let Some(token) = self.current() {
            std::mem::discriminant(&token.kind) == std::mem::discriminant(kind)
        } else {
            false
        }
    }

    /// Match and consume token if it matches the given kind
    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Expect a specific token kind, naming it in the error on mismatch
    fn expect_token(&mut self, kind: &TokenKind, expected: &str) -> Result<()> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: self.describe_current(),
            }
            .into())
        }
    }

    /// Expect an identifier and return its name
    fn expect_identifier(&mut self, message: &str) -> Result<String> {
        match self.current() {
            Some(token) => match &token.kind {
                TokenKind::Ident(name) => {
                    let name = name.clone();
                    self.advance();
                    Ok(name)
                }
                _ => Err(ParseError::SyntaxError(message.to_string()).into()),
            },
            None => Err(ParseError::SyntaxError(message.to_string()).into()),
        }
    }

    /// Human-readable description of the current token for error messages
    fn describe_current(&self) -> String {
        match self.current().map(|t| &t.kind) {
            Some(TokenKind::Db) => "db".to_string(),
            Some(TokenKind::Ident(name)) => name.clone(),
            Some(TokenKind::Dot) => ".".to_string(),
            Some(TokenKind::LParen) => "(".to_string(),
            Some(TokenKind::RParen) => ")".to_string(),
            Some(TokenKind::LBrace) => "{".to_string(),
            Some(TokenKind::RBrace) => "}".to_string(),
            Some(TokenKind::LBracket) => "[".to_string(),
            Some(TokenKind::RBracket) => "]".to_string(),
            Some(TokenKind::Comma) => ",".to_string(),
            Some(TokenKind::Colon) => ":".to_string(),
            Some(TokenKind::Semicolon) => ";".to_string(),
            Some(TokenKind::Minus) => "-".to_string(),
            Some(TokenKind::Plus) => "+".to_string(),
            Some(TokenKind::Bang) => "!".to_string(),
            Some(TokenKind::String(_)) => "string literal".to_string(),
            Some(TokenKind::Number(n)) => n.clone(),
            Some(TokenKind::Regex { .. }) => "regex literal".to_string(),
            Some(TokenKind::Unterminated(_)) => "unterminated literal".to_string(),
            Some(TokenKind::Unknown(c)) => c.to_string(),
            Some(TokenKind::EOF) | None => "end of input".to_string(),
        }
    }

    fn current_pos(&self) -> usize {
        if let Some(token) = self.current() {
            token.span.start
        } else if let Some(last) = self.tokens.last() {
            last.span.end
        } else {
            0
        }
    }

    fn previous_pos(&self) -> usize {
        if self.pos > 0 {
            if let Some(token) = self.tokens.get(self.pos - 1) {
                return token.span.end;
            }
        }
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GateError;

    #[test]
    fn test_parse_string_literal() {
        let expr = ExprParser::parse("'hello'").unwrap();
        assert!(matches!(expr, Expr::String(s) if s == "hello"));
    }

    #[test]
    fn test_parse_number_literals() {
        let expr = ExprParser::parse("1999").unwrap();
        assert!(matches!(expr, Expr::Number(n) if n == 1999.0));

        let expr = ExprParser::parse("8.7").unwrap();
        assert!(matches!(expr, Expr::Number(n) if (n - 8.7).abs() < 0.001));
    }

    #[test]
    fn test_parse_keywords() {
        assert!(matches!(
            ExprParser::parse("true").unwrap(),
            Expr::Boolean(true)
        ));
        assert!(matches!(ExprParser::parse("null").unwrap(), Expr::Null));
        assert!(matches!(
            ExprParser::parse("undefined").unwrap(),
            Expr::Null
        ));
    }

    #[test]
    fn test_parse_regex_literal() {
        let expr = ExprParser::parse("/^mat/i").unwrap();
        assert!(matches!(
            expr,
            Expr::Regex { ref pattern, ref flags } if pattern == "^mat" && flags == "i"
        ));
    }

    #[test]
    fn test_parse_object_with_unquoted_keys() {
        let expr = ExprParser::parse("{year: 1999, title: 'The Matrix'}").unwrap();
        match expr {
            Expr::Object(obj) => {
                assert_eq!(obj.properties.len(), 2);
                assert_eq!(obj.properties[0].key.as_string(), "year");
                assert_eq!(obj.properties[1].key.as_string(), "title");
            }
            _ => panic!("Expected object expression"),
        }
    }

    #[test]
    fn test_parse_empty_object_and_array() {
        match ExprParser::parse("{}").unwrap() {
            Expr::Object(obj) => assert!(obj.properties.is_empty()),
            _ => panic!("Expected object expression"),
        }
        match ExprParser::parse("[]").unwrap() {
            Expr::Array(arr) => assert!(arr.elements.is_empty()),
            _ => panic!("Expected array expression"),
        }
    }

    #[test]
    fn test_parse_trailing_commas() {
        let expr = ExprParser::parse("{a: 1,}").unwrap();
        assert!(matches!(expr, Expr::Object(ref obj) if obj.properties.len() == 1));

        let expr = ExprParser::parse("[1, 2,]").unwrap();
        assert!(matches!(expr, Expr::Array(ref arr) if arr.elements.len() == 2));
    }

    #[test]
    fn test_parse_nested_brackets_balance() {
        // The argument contains nested arrays and objects and must come
        // back as a single argument.
        let expr = ExprParser::parse("find({a: [1, 2, {b: 3}]})").unwrap();
        match expr {
            Expr::Call(call) => assert_eq!(call.arguments.len(), 1),
            _ => panic!("Expected call expression"),
        }
    }

    #[test]
    fn test_parse_db_call_chain() {
        let expr = ExprParser::parse("db.movies.find({year: 1999})").unwrap();
        match expr {
            Expr::Call(call) => {
                assert_eq!(call.arguments.len(), 1);
                assert!(matches!(*call.callee, Expr::Member(_)));
            }
            _ => panic!("Expected call expression"),
        }
    }

    #[test]
    fn test_parse_computed_member() {
        let expr = ExprParser::parse("db['movies'].find()").unwrap();
        match expr {
            Expr::Call(call) => match *call.callee {
                Expr::Member(member) => {
                    assert!(matches!(member.property, MemberProperty::Ident(ref s) if s == "find"));
                    assert!(matches!(*member.object, Expr::Member(_)));
                }
                _ => panic!("Expected member expression"),
            },
            _ => panic!("Expected call expression"),
        }
    }

    #[test]
    fn test_parse_new_expression() {
        let expr = ExprParser::parse("new Date('2020-01-01T00:00:00Z')").unwrap();
        match expr {
            Expr::New(new_expr) => {
                assert!(matches!(*new_expr.callee, Expr::Ident(ref s) if s == "Date"));
                assert_eq!(new_expr.arguments.len(), 1);
            }
            _ => panic!("Expected new expression"),
        }
    }

    #[test]
    fn test_parse_unary_minus() {
        let expr = ExprParser::parse("-1").unwrap();
        match expr {
            Expr::Unary(unary) => {
                assert_eq!(unary.operator, UnaryOperator::Minus);
                assert!(matches!(*unary.argument, Expr::Number(n) if n == 1.0));
            }
            _ => panic!("Expected unary expression"),
        }
    }

    #[test]
    fn test_reject_trailing_input() {
        let err = ExprParser::parse("{} garbage").unwrap_err();
        assert!(matches!(
            err,
            GateError::Parse(ParseError::SyntaxError(ref msg)) if msg.contains("trailing")
        ));
    }

    #[test]
    fn test_reject_unterminated_string() {
        let err = ExprParser::parse("{title: 'oops}").unwrap_err();
        assert!(matches!(
            err,
            GateError::Parse(ParseError::SyntaxError(ref msg)) if msg.contains("Unterminated")
        ));
    }

    #[test]
    fn test_reject_unbalanced_paren() {
        let err = ExprParser::parse("find({a: 1}").unwrap_err();
        assert!(matches!(
            err,
            GateError::Parse(ParseError::UnexpectedToken { ref expected, .. }) if expected == ")"
        ));
    }

    #[test]
    fn test_reject_missing_colon() {
        assert!(ExprParser::parse("{year 1999}").is_err());
    }
}
