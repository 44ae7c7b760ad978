/// Line tokenizer and numeric parsing shared by the OBJ and MTL parsers
use nom::{
    bytes::complete::{is_not, take_while},
    character::complete::{char, i64 as integer, space0, space1},
    combinator::{all_consuming, opt, recognize},
    multi::separated_list0,
    number::complete::float,
    sequence::{delimited, preceded, terminated},
    IResult,
};

use crate::error::{MeshError, MeshResult};

/// One whitespace-delimited line: a leading keyword and its operands.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive<'a> {
    pub line: usize,
    pub keyword: &'a str,
    pub args: Vec<&'a str>,
    /// Everything after the keyword, trimmed. Used for names that may contain spaces.
    pub rest: &'a str,
}

impl<'a> Directive<'a> {
    pub fn arg(&self, i: usize) -> MeshResult<&'a str> {
        self.args
            .get(i)
            .copied()
            .ok_or_else(|| MeshError::MalformedDirective {
                line: self.line,
                directive: self.keyword.to_string(),
            })
    }

    /// Parse the first `N` operands as finite floats.
    pub fn floats<const N: usize>(&self) -> MeshResult<[f32; N]> {
        let mut out = [0.0; N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = parse_float(self.arg(i)?, self.line)?;
        }
        Ok(out)
    }
}

/// Iterate the non-blank lines of `text` as directives.
///
/// `\n`, `\r\n` and a lone `\r` all end a line. Line numbers count `\n`.
pub fn directives(text: &str) -> impl Iterator<Item = Directive<'_>> {
    text.split('\n').enumerate().flat_map(|(i, physical)| {
        physical
            .split('\r')
            .filter_map(move |segment| parse_directive(segment, i + 1))
    })
}

fn parse_directive(segment: &str, line: usize) -> Option<Directive<'_>> {
    let (_, tokens) = tokenize(segment).ok()?;
    let keyword = *tokens.first()?;
    let trimmed = segment.trim_start_matches([' ', '\t']);
    let rest = trimmed[keyword.len()..].trim();
    Some(Directive {
        line,
        keyword,
        args: tokens[1..].to_vec(),
        rest,
    })
}

fn tokenize(input: &str) -> IResult<&str, Vec<&str>> {
    delimited(space0, separated_list0(space1, is_not(" \t")), space0)(input)
}

/// Parse a decimal number. Trailing garbage and non-finite values are rejected.
pub fn parse_float(token: &str, line: usize) -> MeshResult<f32> {
    match all_consuming(float::<&str, nom::error::Error<&str>>)(token) {
        Ok((_, value)) if value.is_finite() => Ok(value),
        _ => Err(MeshError::MalformedNumber {
            line,
            token: token.to_string(),
        }),
    }
}

/// Parse the position index of a face token (`7`, `7/2`, `7//3`, `7/2/3`).
pub fn parse_index(token: &str, line: usize) -> MeshResult<i64> {
    match all_consuming(face_index)(token) {
        Ok((_, value)) => Ok(value),
        Err(_) => Err(MeshError::MalformedNumber {
            line,
            token: token.to_string(),
        }),
    }
}

fn face_index(input: &str) -> IResult<&str, i64> {
    terminated(integer, opt(slash_tail))(input)
}

// texture/normal references after the position index are not used
fn slash_tail(input: &str) -> IResult<&str, &str> {
    recognize(preceded(
        char('/'),
        take_while(|c: char| c == '/' || c == '-' || c.is_ascii_digit()),
    ))(input)
}
