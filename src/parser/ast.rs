//! Expression AST for shell-style query strings
//!
//! The grammar is a JSON superset: object and array literals with unquoted
//! keys, single-quoted strings, regex literals, unary signs, and a small set
//! of constructor calls (`ObjectId(...)`, `ISODate(...)`, ...). Member and
//! call expressions exist so that `db.collection.find(...)` parses into a
//! shape the command extractor can pattern-match.

use std::ops::Range;

/// Span information for source locations
pub type Span = Range<usize>;

/// Root expression type
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Object literal: { key: value, ... }
    Object(ObjectExpr),
    /// Array literal: [1, 2, 3]
    Array(ArrayExpr),
    /// String literal: "hello" or 'world'
    String(String),
    /// Number literal: 42 or 3.14
    Number(f64),
    /// Boolean literal: true or false
    Boolean(bool),
    /// Null literal
    Null,
    /// Regex literal: /pattern/flags
    Regex { pattern: String, flags: String },
    /// Bare identifier
    Ident(String),
    /// Member expression: obj.prop or obj["prop"]
    Member(Box<MemberExpr>),
    /// Call expression: fn(args)
    Call(Box<CallExpr>),
    /// New expression: new Ctor(args)
    New(Box<NewExpr>),
    /// Unary expression: -x, +x, !x
    Unary(Box<UnaryExpr>),
}

/// Object literal with its properties in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectExpr {
    pub properties: Vec<Property>,
    pub span: Span,
}

impl ObjectExpr {
    pub fn new(properties: Vec<Property>, span: Span) -> Self {
        Self { properties, span }
    }
}

/// A single `key: value` pair inside an object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: PropertyKey,
    pub value: Expr,
    pub span: Span,
}

impl Property {
    pub fn new(key: PropertyKey, value: Expr, span: Span) -> Self {
        Self { key, value, span }
    }
}

/// Property key forms: `{name: 1}`, `{"name": 1}`, `{0: 1}`
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
    Ident(String),
    String(String),
    Number(String),
}

impl PropertyKey {
    pub fn as_string(&self) -> String {
        match self {
            PropertyKey::Ident(s) => s.clone(),
            PropertyKey::String(s) => s.clone(),
            PropertyKey::Number(s) => s.clone(),
        }
    }
}

/// Array literal with its elements in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayExpr {
    pub elements: Vec<Expr>,
    pub span: Span,
}

impl ArrayExpr {
    pub fn new(elements: Vec<Expr>, span: Span) -> Self {
        Self { elements, span }
    }
}

/// Member expression: obj.prop or obj[expr]
#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpr {
    pub object: Box<Expr>,
    pub property: MemberProperty,
    pub span: Span,
}

impl MemberExpr {
    pub fn new(object: Expr, property: MemberProperty, span: Span) -> Self {
        Self {
            object: Box::new(object),
            property,
            span,
        }
    }
}

/// Member property (static or computed)
#[derive(Debug, Clone, PartialEq)]
pub enum MemberProperty {
    /// Static: obj.prop
    Ident(String),
    /// Computed: obj[expr]
    Computed(Expr),
}

/// Call expression: fn(arg1, arg2, ...)
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub arguments: Vec<Expr>,
    pub span: Span,
}

impl CallExpr {
    pub fn new(callee: Expr, arguments: Vec<Expr>, span: Span) -> Self {
        Self {
            callee: Box::new(callee),
            arguments,
            span,
        }
    }
}

/// New expression: new Ctor(arg1, arg2, ...)
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpr {
    pub callee: Box<Expr>,
    pub arguments: Vec<Expr>,
    pub span: Span,
}

impl NewExpr {
    pub fn new(callee: Expr, arguments: Vec<Expr>, span: Span) -> Self {
        Self {
            callee: Box::new(callee),
            arguments,
            span,
        }
    }
}

/// Unary expression: -x, +x, !x
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub operator: UnaryOperator,
    pub argument: Box<Expr>,
    pub span: Span,
}

impl UnaryExpr {
    pub fn new(operator: UnaryOperator, argument: Expr, span: Span) -> Self {
        Self {
            operator,
            argument: Box::new(argument),
            span,
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// Negation: -x
    Minus,
    /// Plus: +x
    Plus,
    /// Logical NOT: !x
    Not,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_variants() {
        assert!(matches!(Expr::String("a".to_string()), Expr::String(_)));
        assert!(matches!(Expr::Number(1.5), Expr::Number(_)));
        assert!(matches!(Expr::Boolean(false), Expr::Boolean(false)));
        assert!(matches!(Expr::Null, Expr::Null));

        let re = Expr::Regex {
            pattern: "^mat".to_string(),
            flags: "i".to_string(),
        };
        assert!(matches!(re, Expr::Regex { .. }));
    }

    #[test]
    fn test_property_key_as_string() {
        assert_eq!(PropertyKey::Ident("year".to_string()).as_string(), "year");
        assert_eq!(
            PropertyKey::String("title".to_string()).as_string(),
            "title"
        );
        assert_eq!(PropertyKey::Number("7".to_string()).as_string(), "7");
    }

    #[test]
    fn test_member_chain_shape() {
        // db.movies.find builds Member(Member(Ident, movies), find)
        let inner = MemberExpr::new(
            Expr::Ident("db".to_string()),
            MemberProperty::Ident("movies".to_string()),
            0..9,
        );
        let outer = MemberExpr::new(
            Expr::Member(Box::new(inner)),
            MemberProperty::Ident("find".to_string()),
            0..14,
        );
        assert!(matches!(*outer.object, Expr::Member(_)));
        assert!(matches!(outer.property, MemberProperty::Ident(ref s) if s == "find"));
    }

    #[test]
    fn test_call_holds_arguments() {
        let call = CallExpr::new(
            Expr::Ident("find".to_string()),
            vec![Expr::Object(ObjectExpr::new(vec![], 5..7))],
            0..8,
        );
        assert_eq!(call.arguments.len(), 1);
    }
}
