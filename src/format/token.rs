//! Pattern tokenizer
//!
//! Scans a pattern left to right. At each position the longest token that
//! matches wins (`MMMM` before `MMM` before `MM` before `M`); quoted text and
//! runs of characters that cannot start a token become literals.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{anychar, char},
    combinator::{map, value},
    multi::many0,
    sequence::delimited,
    IResult,
};

/// Characters a token (or a quoted literal) can start with
const TOKEN_START: &str = "yMdHhtmsQ'";

/// A date field reference in a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateToken {
    /// `yyyy`
    Year4,
    /// `yy`
    Year2,
    /// `MMMM`
    MonthName,
    /// `MMM`
    MonthAbbrev,
    /// `MM`
    Month2,
    /// `M`
    Month,
    /// `dddd`
    WeekdayName,
    /// `ddd`
    WeekdayAbbrev,
    /// `dd`
    Day2,
    /// `d`
    Day,
    /// `HH`
    Hour24Padded,
    /// `H`
    Hour24,
    /// `hh`
    Hour12Padded,
    /// `h`
    Hour12,
    /// `tt`
    AmPm,
    /// `t`
    AmPmShort,
    /// `mm`
    Minute2,
    /// `m`
    Minute,
    /// `ss`
    Second2,
    /// `s`
    Second,
    /// `QQ`
    Quarter2,
    /// `Q`
    Quarter,
}

/// One piece of a tokenized pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text copied through unchanged
    Literal(&'a str),
    /// A single character that starts no token (a lone `y`, a stray quote)
    Char(char),
    /// A date field
    Token(DateToken),
}

/// Split a pattern into segments
pub fn tokenize(pattern: &str) -> Vec<Segment<'_>> {
    match many0(segment)(pattern) {
        Ok((_, segments)) => segments,
        // many0 stops at the first failure and only errors on a non-consuming
        // parser, which `segment` never is
        Err(_) => vec![Segment::Literal(pattern)],
    }
}

fn segment(input: &str) -> IResult<&str, Segment<'_>> {
    alt((
        map(quoted, quoted_segment),
        map(date_token, Segment::Token),
        map(take_while1(|c| !TOKEN_START.contains(c)), Segment::Literal),
        map(anychar, Segment::Char),
    ))(input)
}

fn quoted_segment(text: &str) -> Segment<'_> {
    if text.is_empty() {
        Segment::Char('\'')
    } else {
        Segment::Literal(text)
    }
}

/// `'literal text'`; an empty pair `''` stands for an apostrophe
fn quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('\''), take_while(|c| c != '\''), char('\''))(input)
}

fn date_token(input: &str) -> IResult<&str, DateToken> {
    alt((
        alt((
            value(DateToken::Year4, tag("yyyy")),
            value(DateToken::Year2, tag("yy")),
            value(DateToken::MonthName, tag("MMMM")),
            value(DateToken::MonthAbbrev, tag("MMM")),
            value(DateToken::Month2, tag("MM")),
            value(DateToken::Month, tag("M")),
            value(DateToken::WeekdayName, tag("dddd")),
            value(DateToken::WeekdayAbbrev, tag("ddd")),
            value(DateToken::Day2, tag("dd")),
            value(DateToken::Day, tag("d")),
        )),
        alt((
            value(DateToken::Hour24Padded, tag("HH")),
            value(DateToken::Hour24, tag("H")),
            value(DateToken::Hour12Padded, tag("hh")),
            value(DateToken::Hour12, tag("h")),
            value(DateToken::AmPm, tag("tt")),
            value(DateToken::AmPmShort, tag("t")),
            value(DateToken::Minute2, tag("mm")),
            value(DateToken::Minute, tag("m")),
            value(DateToken::Second2, tag("ss")),
            value(DateToken::Second, tag("s")),
            value(DateToken::Quarter2, tag("QQ")),
            value(DateToken::Quarter, tag("Q")),
        )),
    ))(input)
}
