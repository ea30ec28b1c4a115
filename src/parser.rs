//! Parser for the reference surface syntax.
//!
//! A program is four sections, in order:
//!
//! ```text
//! Schemes:
//!   snap(S,N,A,P)
//! Facts:
//!   snap('12345','C. Brown','12 Apple','555-1234').
//! Rules:
//!   csg(C,S,G) :- cp(C,Q),snap(S,N,A,P).
//! Queries:
//!   snap('12345',N,A,P)?
//! ```
//!
//! `#` starts a line comment. Identifiers are alphabetic followed by
//! alphanumerics; constants are single-quoted strings whose quotes are
//! stripped here, at ingestion, so the algebra layer only ever sees final
//! comparable values.

use crate::ast::{DatalogProgram, Parameter, Predicate, Rule};
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while};
use nom::character::complete::{char, multispace1, satisfy};
use nom::combinator::{all_consuming, map, recognize, value};
use nom::multi::{many0, many0_count, separated_list1};
use nom::sequence::{delimited, pair, preceded, terminated};
use nom::IResult;
use thiserror::Error;

/// The program text is not valid surface syntax.
#[derive(Debug, Error, Eq, PartialEq)]
#[error("invalid program: {0}")]
pub struct ParseError(String);

/// Parse a complete program in the reference surface syntax.
///
/// # Errors
///
/// Returns [`ParseError`] if the text is not a well-formed program with
/// all four sections in order.
pub fn parse_program(source: &str) -> Result<DatalogProgram, ParseError> {
    match all_consuming(program)(source) {
        Ok((_, program)) => Ok(program),
        Err(error) => Err(ParseError(error.to_string())),
    }
}

fn program(input: &str) -> IResult<&str, DatalogProgram> {
    let (input, _) = token(tag("Schemes:"))(input)?;
    let (input, schemes) = many0(predicate)(input)?;
    let (input, _) = token(tag("Facts:"))(input)?;
    let (input, facts) = many0(terminated(predicate, token(char('.'))))(input)?;
    let (input, _) = token(tag("Rules:"))(input)?;
    let (input, rules) = many0(rule)(input)?;
    let (input, _) = token(tag("Queries:"))(input)?;
    let (input, queries) = many0(terminated(predicate, token(char('?'))))(input)?;
    let (input, ()) = ws(input)?;
    Ok((
        input,
        DatalogProgram {
            schemes,
            facts,
            rules,
            queries,
        },
    ))
}

fn rule(input: &str) -> IResult<&str, Rule> {
    let (input, head) = predicate(input)?;
    let (input, _) = token(tag(":-"))(input)?;
    let (input, body) = separated_list1(token(char(',')), predicate)(input)?;
    let (input, _) = token(char('.'))(input)?;
    Ok((input, Rule { head, body }))
}

fn predicate(input: &str) -> IResult<&str, Predicate> {
    let (input, name) = token(identifier)(input)?;
    let (input, parameters) = delimited(
        token(char('(')),
        separated_list1(token(char(',')), token(parameter)),
        token(char(')')),
    )(input)?;
    Ok((input, Predicate::new(name, parameters)))
}

fn parameter(input: &str) -> IResult<&str, Parameter> {
    alt((
        map(constant, Parameter::constant),
        map(identifier, Parameter::variable),
    ))(input)
}

fn constant(input: &str) -> IResult<&str, &str> {
    delimited(char('\''), take_while(|c| c != '\''), char('\''))(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c: char| c.is_ascii_alphabetic()),
        take_while(|c: char| c.is_ascii_alphanumeric()),
    ))(input)
}

/// Skip whitespace and `#` line comments before a token.
fn token<'a, O, P>(parser: P) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    P: nom::Parser<&'a str, O, nom::error::Error<&'a str>>,
{
    preceded(ws, parser)
}

fn ws(input: &str) -> IResult<&str, ()> {
    value((), many0_count(alt((value((), multispace1), comment))))(input)
}

fn comment(input: &str) -> IResult<&str, ()> {
    value((), pair(char('#'), take_while(|c| c != '\n')))(input)
}
