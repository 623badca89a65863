//! Small nom combinators shared by the framing, sentence and tag block parsers.

use nom::{
    AsChar, Err, Input, Mode, OutputMode, PResult, Parser,
    bytes::complete::take_till,
    error::{ErrorKind, ParseError},
};

/// Runs `f` and fails with `e` unless it used up the whole input.
///
/// ```rust
/// use aivdm_parser::parsing::consumed;
/// use nom::{IResult, Parser, character::complete::hex_digit1, error::ErrorKind};
///
/// let mut checksum = consumed(hex_digit1, ErrorKind::IsA);
///
/// let digits: IResult<_, _> = checksum.parse("5E");
/// assert_eq!(digits, Ok(("", "5E")));
///
/// let trailing: IResult<_, _> = checksum.parse("5E,2");
/// assert!(trailing.is_err());
/// ```
pub fn consumed<I, E: ParseError<I>, F>(
    f: F,
    e: ErrorKind,
) -> impl Parser<I, Output = <F as Parser<I>>::Output, Error = E>
where
    I: Input,
    F: Parser<I, Error = E>,
{
    Consumed { f, e }
}

/// Takes a comma separated field, which may be empty.
///
/// The separator itself is left in the input.
///
/// ```rust
/// use aivdm_parser::parsing::field;
/// use nom::IResult;
///
/// let result: IResult<&str, &str> = field("A,13aEOK");
/// assert_eq!(result, Ok((",13aEOK", "A")));
///
/// let result: IResult<&str, &str> = field(",0");
/// assert_eq!(result, Ok((",0", "")));
/// ```
pub fn field<I, E>(i: I) -> nom::IResult<I, I, E>
where
    I: Input,
    <I as Input>::Item: AsChar,
    E: ParseError<I>,
{
    take_till(|c: <I as Input>::Item| c.as_char() == ',').parse(i)
}

struct Consumed<F> {
    f: F,
    e: ErrorKind,
}

impl<I, F> Parser<I> for Consumed<F>
where
    I: Input,
    F: Parser<I>,
{
    type Output = <F as Parser<I>>::Output;
    type Error = <F as Parser<I>>::Error;

    fn process<OM: OutputMode>(&mut self, input: I) -> PResult<OM, I, Self::Output, Self::Error> {
        let (rest, output) = self.f.process::<OM>(input)?;

        match rest.input_len() {
            0 => Ok((rest, output)),
            _ => Err(Err::Error(OM::Error::bind(|| {
                <Self::Error as ParseError<I>>::from_error_kind(rest, self.e)
            }))),
        }
    }
}
