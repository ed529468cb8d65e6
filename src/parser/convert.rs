//! Expression AST to BSON conversion
//!
//! Turns the parsed expression tree into `bson::Bson` values. This is the
//! only place shell type constructors (`ObjectId`, `ISODate`, `NumberLong`,
//! ...) are interpreted; anything not on that list is an error, never a
//! call into host code.

use mongodb::bson::{Bson, Document};

use super::ast::*;
use crate::error::{ParseError, Result};

/// Converter from shell expressions to BSON
pub struct ExpressionConverter;

impl ExpressionConverter {
    /// Convert an expression to a BSON value
    pub fn expr_to_bson(expr: &Expr) -> Result<Bson> {
        match expr {
            Expr::Object(obj) => Self::object_to_bson(obj).map(Bson::Document),

            Expr::Array(arr) => Self::array_to_bson(arr).map(Bson::Array),

            Expr::String(s) => Ok(Bson::String(s.clone())),

            // Whole numbers in i64 range become Int64, everything else Double
            Expr::Number(n) => {
                if n.fract() == 0.0 && *n >= i64::MIN as f64 && *n <= i64::MAX as f64 {
                    Ok(Bson::Int64(*n as i64))
                } else {
                    Ok(Bson::Double(*n))
                }
            }

            Expr::Boolean(b) => Ok(Bson::Boolean(*b)),

            Expr::Null => Ok(Bson::Null),

            Expr::Regex { pattern, flags } => {
                Ok(Bson::RegularExpression(mongodb::bson::Regex {
                    pattern: pattern.clone(),
                    options: flags.clone(),
                }))
            }

            Expr::Ident(name) => Self::identifier_to_bson(name),

            Expr::Unary(unary) => Self::unary_to_bson(unary),

            // new Date(), new ObjectId(...)
            Expr::New(new_expr) => {
                Self::constructor_to_bson(&new_expr.callee, &new_expr.arguments)
            }

            // ObjectId("..."), ISODate("..."), NumberLong(...)
            Expr::Call(call) => Self::constructor_to_bson(&call.callee, &call.arguments),

            Expr::Member(_) => Err(ParseError::InvalidQuery(
                "Member expressions are not valid inside query literals".to_string(),
            )
            .into()),
        }
    }

    /// Convert an object to a BSON document
    pub fn object_to_bson(obj: &ObjectExpr) -> Result<Document> {
        let mut doc = Document::new();

        for prop in &obj.properties {
            let key = prop.key.as_string();
            let value = Self::expr_to_bson(&prop.value)?;
            doc.insert(key, value);
        }

        Ok(doc)
    }

    /// Convert an array to a BSON array
    pub fn array_to_bson(arr: &ArrayExpr) -> Result<Vec<Bson>> {
        let mut result = Vec::new();

        for element in &arr.elements {
            let value = Self::expr_to_bson(element)?;
            result.push(value);
        }

        Ok(result)
    }

    /// Convert a bare identifier to BSON (e.g. undefined, Infinity)
    fn identifier_to_bson(name: &str) -> Result<Bson> {
        match name {
            "undefined" | "null" => Ok(Bson::Null),
            "Infinity" => Ok(Bson::Double(f64::INFINITY)),
            "NaN" => Ok(Bson::Double(f64::NAN)),
            _ => Err(ParseError::InvalidQuery(format!("Unknown identifier: {}", name)).into()),
        }
    }

    /// Convert unary expression to BSON (e.g. -5, +3)
    fn unary_to_bson(unary: &UnaryExpr) -> Result<Bson> {
        match unary.operator {
            UnaryOperator::Minus => {
                if let Expr::Number(n) = unary.argument.as_ref() {
                    let value = -n;
                    if value.fract() == 0.0 && value >= i64::MIN as f64 && value <= i64::MAX as f64
                    {
                        Ok(Bson::Int64(value as i64))
                    } else {
                        Ok(Bson::Double(value))
                    }
                } else {
                    Err(ParseError::InvalidQuery(
                        "Unary negation only supported for numeric literals".to_string(),
                    )
                    .into())
                }
            }
            UnaryOperator::Plus => {
                if let Expr::Number(n) = unary.argument.as_ref() {
                    if n.fract() == 0.0 && *n >= i64::MIN as f64 && *n <= i64::MAX as f64 {
                        Ok(Bson::Int64(*n as i64))
                    } else {
                        Ok(Bson::Double(*n))
                    }
                } else {
                    Err(ParseError::InvalidQuery(
                        "Unary plus only supported for numeric literals".to_string(),
                    )
                    .into())
                }
            }
            UnaryOperator::Not => {
                let value = Self::expr_to_bson(unary.argument.as_ref())?;
                match value {
                    Bson::Boolean(b) => Ok(Bson::Boolean(!b)),
                    _ => Err(ParseError::InvalidQuery(
                        "Logical NOT requires a boolean value".to_string(),
                    )
                    .into()),
                }
            }
        }
    }

    /// Convert a constructor call to BSON.
    ///
    /// Handles both the call form (`ObjectId("...")`) and the new form
    /// (`new ObjectId("...")`); the shell treats them the same.
    fn constructor_to_bson(callee: &Expr, arguments: &[Expr]) -> Result<Bson> {
        let ctor_name = if let Expr::Ident(name) = callee {
            name.as_str()
        } else {
            return Err(ParseError::InvalidQuery(
                "Constructor call must use a plain identifier".to_string(),
            )
            .into());
        };

        match ctor_name {
            "ObjectId" => {
                if let Some(arg) = arguments.first() {
                    Self::parse_objectid_argument(arg)
                } else {
                    Ok(Bson::ObjectId(mongodb::bson::oid::ObjectId::new()))
                }
            }
            "ISODate" | "Date" => {
                if let Some(arg) = arguments.first() {
                    Self::parse_date_argument(arg)
                } else {
                    Ok(Bson::DateTime(mongodb::bson::DateTime::now()))
                }
            }
            "NumberInt" => {
                if let Some(arg) = arguments.first() {
                    Self::parse_int_argument(arg)
                } else {
                    Err(ParseError::InvalidQuery("NumberInt requires an argument".to_string())
                        .into())
                }
            }
            "NumberLong" | "Long" => {
                if let Some(arg) = arguments.first() {
                    Self::parse_long_argument(arg)
                } else {
                    Err(
                        ParseError::InvalidQuery("NumberLong requires an argument".to_string())
                            .into(),
                    )
                }
            }
            "NumberDecimal" | "Decimal128" => {
                if let Some(arg) = arguments.first() {
                    Self::parse_decimal_argument(arg)
                } else {
                    Err(
                        ParseError::InvalidQuery("NumberDecimal requires an argument".to_string())
                            .into(),
                    )
                }
            }
            "RegExp" => Self::parse_regexp_arguments(arguments),
            _ => Err(
                ParseError::InvalidQuery(format!("Unsupported constructor: {}", ctor_name)).into(),
            ),
        }
    }

    /// Parse Date / ISODate argument
    fn parse_date_argument(expr: &Expr) -> Result<Bson> {
        match expr {
            Expr::String(s) => {
                let datetime = mongodb::bson::DateTime::parse_rfc3339_str(s)
                    .map_err(|e| ParseError::InvalidQuery(format!("Invalid date string: {}", e)))?;
                Ok(Bson::DateTime(datetime))
            }
            Expr::Number(n) => {
                // Timestamp in milliseconds
                let millis = *n as i64;
                Ok(Bson::DateTime(mongodb::bson::DateTime::from_millis(millis)))
            }
            _ => Err(ParseError::InvalidQuery(
                "Date argument must be a string or number".to_string(),
            )
            .into()),
        }
    }

    /// Parse ObjectId argument
    fn parse_objectid_argument(expr: &Expr) -> Result<Bson> {
        if let Expr::String(s) = expr {
            let oid = mongodb::bson::oid::ObjectId::parse_str(s)
                .map_err(|e| ParseError::InvalidQuery(format!("Invalid ObjectId: {}", e)))?;
            Ok(Bson::ObjectId(oid))
        } else {
            Err(ParseError::InvalidQuery("ObjectId argument must be a string".to_string()).into())
        }
    }

    /// Parse NumberInt argument
    fn parse_int_argument(expr: &Expr) -> Result<Bson> {
        match expr {
            Expr::Number(n) => Ok(Bson::Int32(*n as i32)),
            Expr::String(s) => {
                let val = s
                    .parse::<i32>()
                    .map_err(|e| ParseError::InvalidQuery(format!("Invalid int: {}", e)))?;
                Ok(Bson::Int32(val))
            }
            _ => Err(ParseError::InvalidQuery(
                "NumberInt argument must be a number or string".to_string(),
            )
            .into()),
        }
    }

    /// Parse NumberLong argument
    fn parse_long_argument(expr: &Expr) -> Result<Bson> {
        match expr {
            Expr::Number(n) => Ok(Bson::Int64(*n as i64)),
            Expr::String(s) => {
                let val = s
                    .parse::<i64>()
                    .map_err(|e| ParseError::InvalidQuery(format!("Invalid long: {}", e)))?;
                Ok(Bson::Int64(val))
            }
            _ => Err(ParseError::InvalidQuery(
                "NumberLong argument must be a number or string".to_string(),
            )
            .into()),
        }
    }

    /// Parse NumberDecimal argument
    fn parse_decimal_argument(expr: &Expr) -> Result<Bson> {
        match expr {
            Expr::String(s) => {
                let val = s
                    .parse::<mongodb::bson::Decimal128>()
                    .map_err(|e| ParseError::InvalidQuery(format!("Invalid decimal: {}", e)))?;
                Ok(Bson::Decimal128(val))
            }
            Expr::Number(n) => Ok(Bson::Double(*n)),
            _ => Err(ParseError::InvalidQuery(
                "NumberDecimal argument must be a number or string".to_string(),
            )
            .into()),
        }
    }

    /// Parse RegExp("pattern", "flags") arguments
    fn parse_regexp_arguments(arguments: &[Expr]) -> Result<Bson> {
        let pattern = match arguments.first() {
            Some(Expr::String(s)) => s.clone(),
            _ => {
                return Err(ParseError::InvalidQuery(
                    "RegExp pattern must be a string".to_string(),
                )
                .into());
            }
        };

        let options = match arguments.get(1) {
            Some(Expr::String(s)) => s.clone(),
            None => String::new(),
            _ => {
                return Err(ParseError::InvalidQuery(
                    "RegExp flags must be a string".to_string(),
                )
                .into());
            }
        };

        Ok(Bson::RegularExpression(mongodb::bson::Regex {
            pattern,
            options,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::grammar::ExprParser;

    fn parse_and_convert(code: &str) -> Bson {
        let expr = ExprParser::parse(code).unwrap();
        ExpressionConverter::expr_to_bson(&expr).unwrap()
    }

    #[test]
    fn test_simple_object() {
        let bson = parse_and_convert("{title: 'The Matrix', year: 1999}");
        if let Bson::Document(doc) = bson {
            assert_eq!(doc.get_str("title").unwrap(), "The Matrix");
            assert_eq!(doc.get_i64("year").unwrap(), 1999);
        } else {
            panic!("Expected document");
        }
    }

    #[test]
    fn test_nested_operator_object() {
        let bson = parse_and_convert("{year: {$gte: 1990, $lt: 2000}}");
        if let Bson::Document(doc) = bson {
            let year = doc.get_document("year").unwrap();
            assert_eq!(year.get_i64("$gte").unwrap(), 1990);
            assert_eq!(year.get_i64("$lt").unwrap(), 2000);
        } else {
            panic!("Expected document");
        }
    }

    #[test]
    fn test_array_of_stages() {
        let bson = parse_and_convert("[{$match: {year: 2000}}, {$limit: 5}]");
        if let Bson::Array(arr) = bson {
            assert_eq!(arr.len(), 2);
            assert!(arr[0].as_document().unwrap().contains_key("$match"));
            assert!(arr[1].as_document().unwrap().contains_key("$limit"));
        } else {
            panic!("Expected array");
        }
    }

    #[test]
    fn test_fractional_number_stays_double() {
        let bson = parse_and_convert("{rating: 8.7}");
        if let Bson::Document(doc) = bson {
            assert!((doc.get_f64("rating").unwrap() - 8.7).abs() < 0.001);
        } else {
            panic!("Expected document");
        }
    }

    #[test]
    fn test_negative_number() {
        let bson = parse_and_convert("{order: -1}");
        if let Bson::Document(doc) = bson {
            assert_eq!(doc.get_i64("order").unwrap(), -1);
        } else {
            panic!("Expected document");
        }
    }

    #[test]
    fn test_regex_literal() {
        let bson = parse_and_convert("{title: /^mat/i}");
        if let Bson::Document(doc) = bson {
            match doc.get("title") {
                Some(Bson::RegularExpression(re)) => {
                    assert_eq!(re.pattern, "^mat");
                    assert_eq!(re.options, "i");
                }
                other => panic!("Expected regex, got {:?}", other),
            }
        } else {
            panic!("Expected document");
        }
    }

    #[test]
    fn test_regexp_constructor() {
        let bson = parse_and_convert("RegExp('^mat', 'i')");
        assert!(matches!(bson, Bson::RegularExpression(ref re) if re.pattern == "^mat"));
    }

    #[test]
    fn test_objectid_call_and_new() {
        let bson = parse_and_convert("ObjectId('507f1f77bcf86cd799439011')");
        assert!(matches!(bson, Bson::ObjectId(_)));

        let bson = parse_and_convert("new ObjectId('507f1f77bcf86cd799439011')");
        assert!(matches!(bson, Bson::ObjectId(_)));
    }

    #[test]
    fn test_invalid_objectid_rejected() {
        let expr = ExprParser::parse("ObjectId('nope')").unwrap();
        assert!(ExpressionConverter::expr_to_bson(&expr).is_err());
    }

    #[test]
    fn test_isodate() {
        let bson = parse_and_convert("ISODate('2020-06-01T00:00:00Z')");
        assert!(matches!(bson, Bson::DateTime(_)));
    }

    #[test]
    fn test_number_wrappers() {
        assert_eq!(parse_and_convert("NumberInt(42)").as_i32().unwrap(), 42);
        assert_eq!(
            parse_and_convert("NumberLong(123456789)").as_i64().unwrap(),
            123456789
        );
        assert!(matches!(
            parse_and_convert("NumberDecimal('10.99')"),
            Bson::Decimal128(_)
        ));
    }

    #[test]
    fn test_unknown_constructor_rejected() {
        let expr = ExprParser::parse("Sleep(1000)").unwrap();
        assert!(ExpressionConverter::expr_to_bson(&expr).is_err());
    }

    #[test]
    fn test_unknown_identifier_rejected() {
        let expr = ExprParser::parse("{a: banana}").unwrap();
        assert!(ExpressionConverter::expr_to_bson(&expr).is_err());
    }

    #[test]
    fn test_null_and_undefined() {
        assert!(matches!(parse_and_convert("null"), Bson::Null));
        assert!(matches!(parse_and_convert("undefined"), Bson::Null));
    }
}
