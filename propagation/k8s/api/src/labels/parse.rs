use super::{Expression, Operator, Selector};
use crate::validation::{self, NameErrors};
use std::{fmt, iter::Peekable, vec};
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("found '{found}', expected: {expected}")]
    Unexpected {
        found: String,
        expected: &'static str,
    },

    #[error("unexpected end of selector, expected: {0}")]
    UnexpectedEnd(&'static str),

    #[error("'{0}' is not a valid label selector operator")]
    UnsupportedOperator(String),

    #[error("values for '{0}' must not be empty")]
    EmptyValues(&'static str),

    #[error("invalid label key {key:?}: {errors}")]
    InvalidKey { key: String, errors: NameErrors },

    #[error("invalid label value {value:?}: {errors}")]
    InvalidValue { value: String, errors: NameErrors },
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token<'s> {
    Ident(&'s str),
    Not,
    Eq,
    DoubleEq,
    NotEq,
    Gt,
    Lt,
    OpenParen,
    CloseParen,
    Comma,
}

type Tokens<'s> = Peekable<vec::IntoIter<Token<'s>>>;

const OPERATORS: &str = "'=', '==', '!=', 'in', 'notin'";
const KEY: &str = "identifier or '!'";

pub(super) fn parse(s: &str) -> Result<Selector, ParseError> {
    let mut tokens = lex(s).into_iter().peekable();
    if tokens.peek().is_none() {
        return Ok(Selector::default());
    }

    let mut exprs = Vec::new();
    loop {
        exprs.push(requirement(&mut tokens)?);
        match tokens.next() {
            None => break,
            Some(Token::Comma) => {}
            Some(t) => {
                return Err(ParseError::Unexpected {
                    found: t.to_string(),
                    expected: "','",
                })
            }
        }
    }

    Ok(Selector::from_expressions(exprs))
}

fn requirement(tokens: &mut Tokens<'_>) -> Result<Expression, ParseError> {
    let key = match tokens.next() {
        Some(Token::Not) => {
            let key = parse_key(tokens)?;
            return Ok(Expression::does_not_exist(key));
        }
        Some(Token::Ident(key)) => {
            validate_key(key)?;
            key
        }
        Some(t) => {
            return Err(ParseError::Unexpected {
                found: t.to_string(),
                expected: KEY,
            })
        }
        None => return Err(ParseError::UnexpectedEnd(KEY)),
    };

    match tokens.peek() {
        None | Some(Token::Comma) => Ok(Expression::exists(key)),
        Some(Token::Eq | Token::DoubleEq) => {
            tokens.next();
            Ok(Expression::new(key, Operator::In, Some(value(tokens)?)))
        }
        Some(Token::NotEq) => {
            tokens.next();
            Ok(Expression::new(key, Operator::NotIn, Some(value(tokens)?)))
        }
        Some(Token::Ident("in")) => {
            tokens.next();
            Ok(Expression::new(key, Operator::In, values(tokens, "in")?))
        }
        Some(Token::Ident("notin")) => {
            tokens.next();
            Ok(Expression::new(key, Operator::NotIn, values(tokens, "notin")?))
        }
        Some(t @ (Token::Gt | Token::Lt)) => Err(ParseError::UnsupportedOperator(t.to_string())),
        Some(t) => Err(ParseError::Unexpected {
            found: t.to_string(),
            expected: OPERATORS,
        }),
    }
}

fn parse_key<'s>(tokens: &mut Tokens<'s>) -> Result<&'s str, ParseError> {
    match tokens.next() {
        Some(Token::Ident(key)) => {
            validate_key(key)?;
            Ok(key)
        }
        Some(t) => Err(ParseError::Unexpected {
            found: t.to_string(),
            expected: "identifier",
        }),
        None => Err(ParseError::UnexpectedEnd("identifier")),
    }
}

/// Reads the single value following `=`, `==` or `!=`. A missing value is the
/// empty string.
fn value<'s>(tokens: &mut Tokens<'s>) -> Result<&'s str, ParseError> {
    match tokens.peek() {
        None | Some(Token::Comma) => Ok(""),
        Some(Token::Ident(value)) => {
            let value = *value;
            tokens.next();
            validate_value(value)?;
            Ok(value)
        }
        Some(t) => Err(ParseError::Unexpected {
            found: t.to_string(),
            expected: "identifier",
        }),
    }
}

/// Reads a parenthesized, comma-separated value list. A member left empty by a
/// leading, trailing or doubled comma is the empty string.
fn values<'s>(tokens: &mut Tokens<'s>, op: &'static str) -> Result<Vec<&'s str>, ParseError> {
    match tokens.next() {
        Some(Token::OpenParen) => {}
        Some(t) => {
            return Err(ParseError::Unexpected {
                found: t.to_string(),
                expected: "'('",
            })
        }
        None => return Err(ParseError::UnexpectedEnd("'('")),
    }

    let mut values = Vec::new();
    if tokens.next_if_eq(&Token::CloseParen).is_some() {
        return Err(ParseError::EmptyValues(op));
    }
    loop {
        match tokens.peek() {
            Some(Token::Comma | Token::CloseParen) => values.push(""),
            Some(Token::Ident(value)) => {
                let value = *value;
                tokens.next();
                validate_value(value)?;
                values.push(value);
            }
            Some(t) => {
                return Err(ParseError::Unexpected {
                    found: t.to_string(),
                    expected: "identifier",
                })
            }
            None => return Err(ParseError::UnexpectedEnd("identifier")),
        }

        match tokens.next() {
            Some(Token::Comma) => {}
            Some(Token::CloseParen) => return Ok(values),
            Some(t) => {
                return Err(ParseError::Unexpected {
                    found: t.to_string(),
                    expected: "',' or ')'",
                })
            }
            None => return Err(ParseError::UnexpectedEnd("')'")),
        }
    }
}

fn validate_key(key: &str) -> Result<(), ParseError> {
    validation::validate_qualified_name(key).map_err(|errors| ParseError::InvalidKey {
        key: key.to_string(),
        errors,
    })
}

fn validate_value(value: &str) -> Result<(), ParseError> {
    validation::validate_label_value(value).map_err(|errors| ParseError::InvalidValue {
        value: value.to_string(),
        errors,
    })
}

fn is_special(c: char) -> bool {
    matches!(c, '!' | '=' | '>' | '<' | '(' | ')' | ',')
}

fn lex(s: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chars = s.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let token = match c {
            c if c.is_whitespace() => continue,
            '!' if chars.next_if(|&(_, c)| c == '=').is_some() => Token::NotEq,
            '!' => Token::Not,
            '=' if chars.next_if(|&(_, c)| c == '=').is_some() => Token::DoubleEq,
            '=' => Token::Eq,
            '>' => Token::Gt,
            '<' => Token::Lt,
            '(' => Token::OpenParen,
            ')' => Token::CloseParen,
            ',' => Token::Comma,
            _ => {
                let mut end = s.len();
                while let Some(&(j, c)) = chars.peek() {
                    if c.is_whitespace() || is_special(c) {
                        end = j;
                        break;
                    }
                    chars.next();
                }
                Token::Ident(&s[i..end])
            }
        };
        tokens.push(token);
    }

    tokens
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(s) => f.write_str(s),
            Self::Not => f.write_str("!"),
            Self::Eq => f.write_str("="),
            Self::DoubleEq => f.write_str("=="),
            Self::NotEq => f.write_str("!="),
            Self::Gt => f.write_str(">"),
            Self::Lt => f.write_str("<"),
            Self::OpenParen => f.write_str("("),
            Self::CloseParen => f.write_str(")"),
            Self::Comma => f.write_str(","),
        }
    }
}
