//! Call-style mixin reference parsing using `nom`.
//!
//! A reference is either a bare alias (`"events"`) or an alias with
//! literal call arguments (`"paginate(25, true)"`). Arguments exist only
//! in the reference string; the resolver works purely on the parsed
//! `(alias, args)` pair so the grammar can evolve independently.

use mixdep_common::error::{MixdepError, Result};
use mixdep_common::types::Literal;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, multispace0},
    combinator::{all_consuming, opt},
    multi::separated_list0,
    sequence::{delimited, preceded},
};
use serde::{Deserialize, Serialize};

/// A reference string decomposed into its alias and call arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedReference {
    /// The registry alias being referenced.
    pub alias: String,
    /// Literal arguments, empty for a bare alias reference.
    pub args: Vec<Literal>,
}

/// Parses a quoted string argument. Single and double quotes are
/// accepted; quotes are stripped and no escape processing is applied.
fn quoted_arg(input: &str) -> IResult<&str, Literal> {
    let single = delimited(char('\''), take_while(|c| c != '\''), char('\''));
    let double = delimited(char('"'), take_while(|c| c != '"'), char('"'));
    let (input, s) = alt((single, double)).parse(input)?;
    Ok((input, Literal::Str(s.to_owned())))
}

/// Parses an unquoted argument token and classifies it as a boolean,
/// number, or bare string (permissive fallback, never an error).
fn bare_arg(input: &str) -> IResult<&str, Literal> {
    let (input, token) = take_while1(|c| c != ',' && c != ')')(input)?;
    Ok((input, classify(token.trim())))
}

fn classify(token: &str) -> Literal {
    match token {
        "true" => Literal::Bool(true),
        "false" => Literal::Bool(false),
        _ => numeric_literal(token).unwrap_or_else(|| Literal::Str(token.to_owned())),
    }
}

/// Classifies a token matching `["-"] digits ["." digits]`, rejecting
/// anything looser that `str::parse` would otherwise accept (`"inf"`,
/// exponents) so those fall back to string literals.
fn numeric_literal(token: &str) -> Option<Literal> {
    let body = token.strip_prefix('-').unwrap_or(token);
    if body.is_empty() {
        return None;
    }
    match body.split_once('.') {
        None => {
            if body.bytes().all(|b| b.is_ascii_digit()) {
                token.parse().ok().map(Literal::Int)
            } else {
                None
            }
        }
        Some((int, frac)) => {
            let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
            if all_digits(int) && all_digits(frac) {
                token.parse().ok().map(Literal::Float)
            } else {
                None
            }
        }
    }
}

fn argument(input: &str) -> IResult<&str, Literal> {
    delimited(multispace0, alt((quoted_arg, bare_arg)), multispace0).parse(input)
}

fn arg_list(input: &str) -> IResult<&str, Vec<Literal>> {
    separated_list0(char(','), argument).parse(input)
}

fn reference(input: &str) -> IResult<&str, ParsedReference> {
    let (input, alias) = take_while1(|c| c != '(' && c != ')')(input)?;
    let (input, args) = opt(delimited(
        char('('),
        arg_list,
        preceded(multispace0, char(')')),
    ))
    .parse(input)?;
    Ok((
        input,
        ParsedReference {
            alias: alias.trim_end().to_owned(),
            args: args.unwrap_or_default(),
        },
    ))
}

/// Parses a mixin reference string into its alias and call arguments.
///
/// Pure function; no registry access.
///
/// # Errors
///
/// Returns [`MixdepError::MalformedReference`] if the input is empty, has
/// unbalanced parentheses, or carries text after the closing parenthesis.
pub fn parse_reference(text: &str) -> Result<ParsedReference> {
    let (_, parsed) =
        all_consuming(reference)
            .parse(text.trim())
            .map_err(|e| MixdepError::MalformedReference {
                reference: text.to_owned(),
                message: format!("{e}"),
            })?;
    Ok(parsed)
}
