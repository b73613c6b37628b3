//! Parser for rendered feature terms
//!
//! Reads strings such as `x`, `x^3`, `a*b` or `a^2*b` back into
//! [`FeatureTerm`] values. Whitespace around factors and exponents is
//! ignored; whitespace inside a variable name is kept.

use crate::terms::error::{TermError, TermResult};
use crate::terms::term::Factor;
use crate::terms::{FeatureTerm, INTERACTION_SEPARATOR, POWER_SEPARATOR};
use std::iter::Peekable;
use std::str::Chars;

/// Feature-term parser
pub struct TermParser<'a> {
    chars: Peekable<Chars<'a>>,
    original: &'a str,
    position: usize,
}

impl<'a> TermParser<'a> {
    /// Create a new parser
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            original: input,
            position: 0,
        }
    }

    /// Parse a term
    pub fn parse(input: &str) -> TermResult<FeatureTerm> {
        let mut parser = TermParser::new(input);
        parser.parse_term()
    }

    /// Parse factors separated by the interaction separator
    fn parse_term(&mut self) -> TermResult<FeatureTerm> {
        if self.original.trim().is_empty() {
            return Err(TermError::syntax(self.original, 0, "Empty term"));
        }

        let mut factors = vec![self.parse_factor()?];

        while self.peek_char() == Some(INTERACTION_SEPARATOR) {
            self.next_char();
            factors.push(self.parse_factor()?);
        }

        if let Some(c) = self.peek_char() {
            return Err(TermError::syntax(
                self.original,
                self.position,
                format!("Unexpected character '{}'", c),
            ));
        }

        FeatureTerm::from_factors(factors)
    }

    /// Parse `variable` or `variable^exponent`
    fn parse_factor(&mut self) -> TermResult<Factor> {
        let start = self.position;
        let mut name = String::new();

        while let Some(c) = self.peek_char() {
            if c == INTERACTION_SEPARATOR || c == POWER_SEPARATOR {
                break;
            }
            name.push(c);
            self.next_char();
        }

        let variable = name.trim();
        if variable.is_empty() {
            return Err(TermError::syntax(
                self.original,
                start,
                "Expected variable name",
            ));
        }

        let exponent = if self.peek_char() == Some(POWER_SEPARATOR) {
            self.next_char();
            self.parse_exponent(variable)?
        } else {
            1
        };

        Factor::new(variable, exponent)
    }

    /// Parse the digits after a power separator
    fn parse_exponent(&mut self, variable: &str) -> TermResult<u32> {
        self.skip_whitespace();

        let start = self.position;
        let mut digits = String::new();
        while let Some(c) = self.peek_char() {
            if !c.is_ascii_digit() {
                break;
            }
            digits.push(c);
            self.next_char();
        }

        if digits.is_empty() {
            return Err(TermError::syntax(
                self.original,
                start,
                format!("Expected exponent after '{}'", POWER_SEPARATOR),
            ));
        }

        self.skip_whitespace();

        digits.parse().map_err(|_| TermError::InvalidExponent {
            variable: variable.to_string(),
            exponent: digits.clone(),
        })
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek_char(), Some(c) if c.is_whitespace()) {
            self.next_char();
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c.is_some() {
            self.position += 1;
        }
        c
    }
}
