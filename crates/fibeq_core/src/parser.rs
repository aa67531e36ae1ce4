//! nom parsers for the textual forms of addresses and prefixes, shared by
//! [Prefix](crate::Prefix)'s `FromStr` and the table loaders.
use nom::branch::alt;
use nom::character::complete::{char, digit1};
use nom::error::{ErrorKind, ParseError};
use nom::sequence::tuple;
use nom::Err::Error;
use nom::IResult;

/// r"[<=255].[<=255].[<=255].[<=255]"
pub fn parse_ipv4_dotted<'a, E: ParseError<&'a str>>(input: &'a str) -> IResult<&'a str, u32, E> {
    fn parse_u8<'a, E: ParseError<&'a str>>(input: &'a str) -> IResult<&'a str, u8, E> {
        let (rest, num) = digit1(input)?;
        if let Ok(num) = num.parse::<u8>() {
            Ok((rest, num))
        } else {
            Err(Error(E::from_error_kind(input, ErrorKind::Digit)))
        }
    }

    let (rest, (o1, _, o2, _, o3, _, o4)) = tuple((
        parse_u8,
        char('.'),
        parse_u8,
        char('.'),
        parse_u8,
        char('.'),
        parse_u8,
    ))(input)?;
    Ok((rest, u32::from_be_bytes([o1, o2, o3, o4])))
}

/// r"[<=u32::MAX]", digits only
pub fn parse_u32<'a, E: ParseError<&'a str>>(input: &'a str) -> IResult<&'a str, u32, E> {
    let (rest, num) = digit1(input)?;
    if let Ok(num) = num.parse::<u32>() {
        Ok((rest, num))
    } else {
        Err(Error(E::from_error_kind(input, ErrorKind::Digit)))
    }
}

/// An address written as a single integer, r"[<=u32::MAX]"
pub fn parse_ipv4_num<'a, E: ParseError<&'a str>>(input: &'a str) -> IResult<&'a str, u32, E> {
    parse_u32(input)
}

/// `<address>/<length>` with the length left unchecked.
pub fn parse_prefix_parts<'a, E: ParseError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, (u32, u32), E> {
    let (rest, (addr, _, len)) = tuple((
        alt((parse_ipv4_dotted, parse_ipv4_num)),
        char('/'),
        parse_u32,
    ))(input)?;
    Ok((rest, (addr, len)))
}
