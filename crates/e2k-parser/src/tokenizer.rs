// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! E2K line tokenizer using nom combinators
//!
//! A data line is a run of whitespace-separated tokens: `"quoted"` strings,
//! bare numbers and bare keywords.

use e2k_model::FieldValue;
use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, multispace0},
    multi::many0,
    sequence::{delimited, preceded},
    IResult, Parser,
};
use thiserror::Error;

/// Why a data line could not be tokenized
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TokenError {
    #[error("unterminated quote at column {0}")]
    UnterminatedQuote(usize),

    #[error("unexpected input at column {0}")]
    Unexpected(usize),
}

/// Raw token from an E2K data line
#[derive(Clone, Debug, PartialEq)]
pub enum Token<'a> {
    /// `"text"` without the quotes
    Quoted(&'a str),
    /// Bare numeric literal
    Number(f64),
    /// Bare keyword such as `BEAM` or `SECTION`
    Word(&'a str),
}

impl<'a> Token<'a> {
    /// Text of a quoted or bare token; numbers have none
    pub fn text(&self) -> Option<&'a str> {
        match self {
            Token::Quoted(s) | Token::Word(s) => Some(*s),
            Token::Number(_) => None,
        }
    }

    /// Numeric value, parsing quoted text when needed
    pub fn number(&self) -> Option<f64> {
        match self {
            Token::Number(n) => Some(*n),
            Token::Quoted(s) | Token::Word(s) => parse_number(s.trim()),
        }
    }

    /// Convert to an owned field value
    pub fn to_field_value(&self) -> FieldValue {
        match self {
            Token::Quoted(s) => FieldValue::Text((*s).to_string()),
            Token::Number(n) => FieldValue::Number(*n),
            Token::Word(w) => FieldValue::Word((*w).to_string()),
        }
    }
}

// ============================================================================
// Parsing Primitives
// ============================================================================

fn parse_number(text: &str) -> Option<f64> {
    let first = text.as_bytes().first()?;
    if !(first.is_ascii_digit() || matches!(first, b'-' | b'+' | b'.')) {
        return None;
    }
    lexical_core::parse::<f64>(text.as_bytes()).ok()
}

/// Parse a quoted string ("text")
fn quoted(input: &str) -> IResult<&str, Token> {
    let (input, text) = delimited(char('"'), take_while(|c: char| c != '"'), char('"')).parse(input)?;
    Ok((input, Token::Quoted(text)))
}

/// Parse a bare number or keyword
fn bare(input: &str) -> IResult<&str, Token> {
    let (input, text) = take_while1(|c: char| !c.is_whitespace() && c != '"')(input)?;
    let token = match parse_number(text) {
        Some(n) => Token::Number(n),
        None => Token::Word(text),
    };
    Ok((input, token))
}

/// Parse any token
fn token(input: &str) -> IResult<&str, Token> {
    alt((quoted, bare)).parse(input)
}

/// Split a data line into tokens
pub fn tokenize(line: &str) -> Result<Vec<Token<'_>>, TokenError> {
    let (rest, tokens) = many0(preceded(multispace0, token))
        .parse(line)
        .map_err(|_: nom::Err<nom::error::Error<&str>>| TokenError::Unexpected(0))?;

    let trailing = rest.trim_start();
    if trailing.is_empty() {
        return Ok(tokens);
    }

    let column = line.len() - trailing.len() + 1;
    if trailing.starts_with('"') {
        Err(TokenError::UnterminatedQuote(column))
    } else {
        Err(TokenError::Unexpected(column))
    }
}

// ============================================================================
// Token Line
// ============================================================================

/// Tokenized data line with typed positional access
#[derive(Clone, Debug, PartialEq)]
pub struct TokenLine<'a> {
    tokens: Vec<Token<'a>>,
}

impl<'a> TokenLine<'a> {
    pub fn new(tokens: Vec<Token<'a>>) -> Self {
        Self { tokens }
    }

    /// Tokenize a data line
    pub fn parse(line: &'a str) -> Result<Self, TokenError> {
        tokenize(line).map(Self::new)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token<'a>> {
        self.tokens.get(index)
    }

    /// Whether the leading keyword matches, ignoring case
    pub fn has_keyword(&self, keyword: &str) -> bool {
        matches!(self.tokens.first(), Some(Token::Word(w)) if w.eq_ignore_ascii_case(keyword))
    }

    /// Quoted string at `index`
    pub fn quoted(&self, index: usize) -> Option<&'a str> {
        match self.tokens.get(index)? {
            Token::Quoted(s) => Some(*s),
            _ => None,
        }
    }

    /// Quoted or bare text at `index`
    pub fn text(&self, index: usize) -> Option<&'a str> {
        self.tokens.get(index)?.text()
    }

    /// Bare keyword at `index`
    pub fn word(&self, index: usize) -> Option<&'a str> {
        match self.tokens.get(index)? {
            Token::Word(w) => Some(*w),
            _ => None,
        }
    }

    /// Number at `index`
    pub fn number(&self, index: usize) -> Option<f64> {
        self.tokens.get(index)?.number()
    }

    /// Integer at `index`; fractional values are rejected
    pub fn integer(&self, index: usize) -> Option<i64> {
        let n = self.number(index)?;
        (n.fract() == 0.0).then_some(n as i64)
    }

    /// `KEY value` pairs starting at `start`
    ///
    /// Keys must be bare words. Returns `None` when a key is not a word or
    /// the last key has no value.
    pub fn pairs(&self, start: usize) -> Option<Vec<(&'a str, &Token<'a>)>> {
        let rest = self.tokens.get(start..)?;
        if rest.len() % 2 != 0 {
            return None;
        }
        rest.chunks(2)
            .map(|pair| match &pair[0] {
                Token::Word(key) => Some((*key, &pair[1])),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_and_numbers() {
        let tokens = tokenize(r#"POINT "12"  -3.5  1E2"#).unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Word("POINT"),
                Token::Quoted("12"),
                Token::Number(-3.5),
                Token::Number(100.0),
            ]
        );
    }

    #[test]
    fn test_quoted_with_spaces() {
        let tokens = tokenize(r#"LINEASSIGN  "B1"  "Story 2"  SECTION  "W 12X26""#).unwrap();
        assert_eq!(tokens[2], Token::Quoted("Story 2"));
        assert_eq!(tokens[4], Token::Quoted("W 12X26"));
    }

    #[test]
    fn test_words_that_look_numeric() {
        let tokens = tokenize("E5 -  1/2 +x").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Word("E5"),
                Token::Word("-"),
                Token::Word("1/2"),
                Token::Word("+x"),
            ]
        );
    }

    #[test]
    fn test_unterminated_quote() {
        let err = tokenize(r#"POINT "1  0  0"#).unwrap_err();
        assert_eq!(err, TokenError::UnterminatedQuote(7));
    }

    #[test]
    fn test_trailing_whitespace() {
        let tokens = tokenize("  AREA \"F1\"   ").unwrap();
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_token_line_accessors() {
        let line = TokenLine::parse(r#"LINE  "C1"  COLUMN  "3"  "3"  1"#).unwrap();
        assert!(line.has_keyword("line"));
        assert_eq!(line.quoted(1), Some("C1"));
        assert_eq!(line.word(2), Some("COLUMN"));
        assert_eq!(line.quoted(2), None);
        assert_eq!(line.integer(5), Some(1));
        assert_eq!(line.number(9), None);
    }

    #[test]
    fn test_pairs() {
        let line = TokenLine::parse(r#"X "a" "b" SECTION "W12" MAXSTASPC 24"#).unwrap();
        let pairs = line.pairs(3).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, "SECTION");
        assert_eq!(pairs[1].1.number(), Some(24.0));

        let dangling = TokenLine::parse(r#"X "a" "b" SECTION"#).unwrap();
        assert!(dangling.pairs(3).is_none());

        let not_word = TokenLine::parse(r#"X "a" "b" "SECTION" "W12""#).unwrap();
        assert!(not_word.pairs(3).is_none());
    }

    #[test]
    fn test_quoted_number() {
        assert_eq!(Token::Quoted(" 12.5").number(), Some(12.5));
        assert_eq!(Token::Quoted("abc").number(), None);
    }
}
