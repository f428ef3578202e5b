//! Model formulas of the form `y ~ a + b*c + a:b`.
//!
//! `+` separates terms, `:` forms an interaction, and `a*b` expands to
//! `a + b + a:b`. `*` binds tighter than `+`, `:` tighter than `*`.
//! The intercept is implicit. After expansion, duplicate terms are removed
//! and terms are ordered by the number of factors they combine, keeping
//! first-appearance order within the same degree.

use std::fmt;

use itertools::Itertools;
use smallvec::SmallVec;

use crate::error::{BmdError, Result};

/// One model term: a single factor or an interaction of several
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    factors: SmallVec<[String; 2]>,
}

impl Term {
    #[must_use]
    pub fn new<I, S>(factors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            factors: factors.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn factors(&self) -> &[String] {
        &self.factors
    }

    #[must_use]
    pub fn degree(&self) -> usize {
        self.factors.len()
    }

    /// Same set of factors, regardless of order
    fn same_as(&self, other: &Self) -> bool {
        self.degree() == other.degree()
            && self.factors.iter().sorted().eq(other.factors.iter().sorted())
    }

    /// Union of two terms' factors, keeping first-appearance order
    fn interact(&self, other: &Self) -> Self {
        let mut factors = self.factors.clone();
        for f in &other.factors {
            if !factors.contains(f) {
                factors.push(f.clone());
            }
        }
        Self { factors }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.factors.join(":"))
    }
}

/// A parsed model formula
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    pub response: String,
    pub terms: Vec<Term>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Tilde,
    Plus,
    Star,
    Colon,
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some((pos, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '~' => tokens.push(Token::Tilde),
            '+' => tokens.push(Token::Plus),
            '*' => tokens.push(Token::Star),
            ':' => tokens.push(Token::Colon),
            c if c.is_ascii_alphanumeric() || c == '_' => {
                let mut ident = String::from(c);
                while let Some(&(_, next)) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' || next == '.' {
                        ident.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => {
                return Err(BmdError::ModelError(format!(
                    "unexpected character '{other}' at position {pos} in formula '{input}'"
                )));
            }
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    source: &'a str,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn error(&self, message: &str) -> BmdError {
        BmdError::ModelError(format!("{message} in formula '{}'", self.source))
    }

    fn ident(&mut self) -> Result<String> {
        match self.tokens.get(self.pos) {
            Some(Token::Ident(name)) => {
                self.pos += 1;
                Ok(name.clone())
            }
            _ => Err(self.error("expected a variable name")),
        }
    }

    /// inter := ident (':' ident)*
    fn interaction(&mut self) -> Result<Term> {
        let mut factors = vec![self.ident()?];
        while self.peek() == Some(&Token::Colon) {
            self.pos += 1;
            let name = self.ident()?;
            if !factors.contains(&name) {
                factors.push(name);
            }
        }
        Ok(Term::new(factors))
    }

    /// product := inter ('*' inter)*, expanded to every non-empty combination
    fn product(&mut self) -> Result<Vec<Term>> {
        let mut operands = vec![self.interaction()?];
        while self.peek() == Some(&Token::Star) {
            self.pos += 1;
            operands.push(self.interaction()?);
        }

        let mut expanded: Vec<Term> = Vec::new();
        for operand in operands {
            let crossed: Vec<Term> = expanded.iter().map(|t| t.interact(&operand)).collect();
            expanded.push(operand);
            expanded.extend(crossed);
        }
        Ok(expanded)
    }

    /// expr := product ('+' product)*
    fn expression(&mut self) -> Result<Vec<Term>> {
        let mut terms = self.product()?;
        while self.peek() == Some(&Token::Plus) {
            self.pos += 1;
            terms.extend(self.product()?);
        }
        Ok(terms)
    }
}

impl Formula {
    /// Parse a formula string
    pub fn parse(input: &str) -> Result<Self> {
        let tokens = tokenize(input)?;
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            source: input,
        };

        let response = parser.ident()?;
        if parser.peek() != Some(&Token::Tilde) {
            return Err(parser.error("expected '~' after the response"));
        }
        parser.pos += 1;

        let raw = parser.expression()?;
        if parser.pos != tokens.len() {
            return Err(parser.error("unexpected trailing input"));
        }

        // The intercept is always present; an explicit "1" adds nothing
        let mut terms: Vec<Term> = Vec::new();
        for term in raw {
            if term.factors().iter().any(|f| f == "1") {
                if term.degree() == 1 {
                    continue;
                }
                return Err(parser.error("'1' cannot be part of an interaction"));
            }
            if !terms.iter().any(|t| t.same_as(&term)) {
                terms.push(term);
            }
        }
        terms.sort_by_key(Term::degree);

        Ok(Self { response, terms })
    }

    /// Every distinct factor the formula uses, in first-appearance order
    #[must_use]
    pub fn factors(&self) -> Vec<&str> {
        self.terms
            .iter()
            .flat_map(|t| t.factors().iter().map(String::as_str))
            .unique()
            .collect()
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ~ ", self.response)?;
        if self.terms.is_empty() {
            return f.write_str("1");
        }
        let terms: Vec<String> = self.terms.iter().map(ToString::to_string).collect();
        f.write_str(&terms.join(" + "))
    }
}
