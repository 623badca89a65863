//! # NMEA 0183 Framing
//!
//! Every AIS sentence, and every tag block in front of one, is framed the same way:
//!
//! ```text
//! !AIVDM,1,1,,B,13AkSB0000PhAmJPoTMoiQFT0D1:,0*5E\r\n
//! ^ start      content                       ^cc ^ line ending
//! ```
//!
//! The functions here check the frame and hand the content to a separate parser, see
//! [`NmeaSentence`](crate::NmeaSentence) for the `VDM`/`VDO` one. Receivers and log
//! files disagree on checksums and line endings, so both can be relaxed through
//! [`ParserConfig`].

use nom::{
    AsBytes, AsChar, Compare, Err, FindSubstring, Input, Parser,
    bytes::complete::{tag, take},
    character::complete::{char, hex_digit0, one_of},
    combinator::opt,
    error::{ErrorKind, ParseError},
    number::complete::hex_u32,
};

use crate::{Error, IResult, parsing::consumed};

/// Whether the `*hh` checksum must be present.
///
/// A checksum that is present is always validated.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumMode {
    #[default]
    Required,
    /// For relays and loggers that strip checksums.
    Optional,
}

/// Whether the sentence must end with `\r\n`.
///
/// On the wire every sentence ends with CRLF, lines read from files or sockets
/// usually do not.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LineEndingMode {
    /// Raw serial data.
    Required,
    Forbidden,
    #[default]
    Optional,
}

/// Framing rules for sentences and tag blocks.
///
/// The default requires a checksum and accepts lines with or without CRLF.
///
/// ```rust
/// use aivdm_parser::{ChecksumMode, IResult, LineEndingMode, ParserConfig};
///
/// fn fields(input: &str) -> IResult<&str, Vec<&str>> {
///     Ok(("", input.split(',').collect()))
/// }
///
/// let mut parser = ParserConfig::new().build(fields);
/// let (_, parsed) = parser("!AIVDM,1,1,,B,00,4*21").unwrap();
/// assert_eq!(parsed, ["AIVDM", "1", "1", "", "B", "00", "4"]);
///
/// let mut serial = ParserConfig::new()
///     .line_ending_mode(LineEndingMode::Required)
///     .build(fields);
/// assert!(serial("!AIVDM,1,1,,B,00,4*21\r\n").is_ok());
/// assert!(serial("!AIVDM,1,1,,B,00,4*21").is_err());
///
/// let mut stripped = ParserConfig::new()
///     .checksum_mode(ChecksumMode::Optional)
///     .line_ending_mode(LineEndingMode::Forbidden)
///     .build(fields);
/// assert!(stripped("!AIVDM,1,1,,B,00,4").is_ok());
/// assert!(stripped("!AIVDM,1,1,,B,00,4*21").is_ok());
/// assert!(stripped("!AIVDM,1,1,,B,00,4*99").is_err());
/// assert!(stripped("!AIVDM,1,1,,B,00,4*21\r\n").is_err());
/// ```
#[must_use]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    pub(crate) checksum_mode: ChecksumMode,
    pub(crate) line_ending_mode: LineEndingMode,
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn checksum_mode(mut self, mode: ChecksumMode) -> Self {
        self.checksum_mode = mode;
        self
    }

    pub fn line_ending_mode(mut self, mode: LineEndingMode) -> Self {
        self.line_ending_mode = mode;
        self
    }

    /// Wraps `content_parser` in the configured framing.
    ///
    /// Non-ASCII input is rejected before anything else. The content parser sees the
    /// text between the `!`/`$` start delimiter and the checksum.
    pub fn build<'a, I, O, F, E>(self, mut content_parser: F) -> impl FnMut(I) -> IResult<I, O, E>
    where
        I: Input + AsBytes + Compare<&'a str> + FindSubstring<&'a str>,
        <I as Input>::Item: AsChar,
        F: Parser<I, Output = O, Error = Error<I, E>>,
        E: ParseError<I>,
    {
        move |i: I| {
            if !i.as_bytes().is_ascii() {
                return Err(Err::Error(Error::NonAscii));
            }

            let (i, _) = one_of("!$").parse(i)?;
            let (_, (content, _)) =
                checksummed(self.checksum_mode, self.line_ending_mode).parse(i)?;

            content_parser.parse(content)
        }
    }
}

/// Splits content from its checksum and line ending and validates both.
///
/// Yields the content with its calculated checksum. Shared by sentences, after the start
/// delimiter, and tag blocks, between their backslashes.
pub(crate) fn checksummed<'a, I, E>(
    cc: ChecksumMode,
    le: LineEndingMode,
) -> impl FnMut(I) -> IResult<I, (I, u8), E>
where
    I: Input + AsBytes + Compare<&'a str> + FindSubstring<&'a str>,
    <I as Input>::Item: AsChar,
    E: ParseError<I>,
{
    move |i: I| {
        let end = i
            .find_substring("*")
            .or_else(|| i.find_substring("\r\n"))
            .unwrap_or_else(|| i.input_len());
        let (trailer, content) = i.take_split(end);

        let (remaining, found) = checksum_crlf::<I, Error<I, E>>(cc, le).parse(trailer)?;
        let (content, calculated) = checksum(content);

        match found {
            Some(found) if found != calculated => Err(Err::Error(Error::ChecksumMismatch {
                expected: calculated,
                found,
            })),
            _ => Ok((remaining, (content, calculated))),
        }
    }
}

/// Parses the sentence trailer: an optional `*hh` checksum and an optional line ending.
///
/// | checksum | line ending | accepts |
/// |---|---|---|
/// | `Required` | `Required` | `*hh\r\n` |
/// | `Required` | `Forbidden` | `*hh` |
/// | `Optional` | `Required` | `\r\n`, `*hh\r\n` |
/// | `Optional` | `Forbidden` | nothing, `*hh` |
///
/// [`LineEndingMode::Optional`] accepts both rows of its checksum mode. Exactly two hex
/// digits must follow `*`, so a second `*hh` group fails.
///
/// ```rust
/// use aivdm_parser::{ChecksumMode, LineEndingMode, checksum_crlf};
/// use nom::{IResult, Parser};
///
/// let mut parser = checksum_crlf(ChecksumMode::Required, LineEndingMode::Required);
/// let result: IResult<_, _> = parser.parse("*5E\r\n");
/// assert_eq!(result, Ok(("", Some(0x5E))));
///
/// let mut parser = checksum_crlf(ChecksumMode::Optional, LineEndingMode::Forbidden);
/// let result: IResult<_, _> = parser.parse("");
/// assert_eq!(result, Ok(("", None)));
/// ```
pub fn checksum_crlf<'a, I, E: ParseError<I>>(
    cc: ChecksumMode,
    le: LineEndingMode,
) -> impl FnMut(I) -> nom::IResult<I, Option<u8>, E>
where
    I: Input + AsBytes + Compare<&'a str> + FindSubstring<&'a str>,
    <I as Input>::Item: AsChar,
{
    move |i: I| {
        let (trailer, ()) = crlf::<I, E>(le).parse(i)?;

        let (digits, star) = match cc {
            ChecksumMode::Required => char::<I, E>('*').map(Some).parse(trailer)?,
            ChecksumMode::Optional => opt(char::<I, E>('*')).parse(trailer)?,
        };

        match star {
            Some(_) => hex_pair(digits).map(|(rest, value)| (rest, Some(value))),
            None if digits.input_len() == 0 => Ok((digits, None)),
            None => Err(Err::Error(E::from_error_kind(digits, ErrorKind::Count))),
        }
    }
}

/// Exactly two hexadecimal digits, upper or lower case.
fn hex_pair<I, E>(i: I) -> nom::IResult<I, u8, E>
where
    I: Input + AsBytes,
    <I as Input>::Item: AsChar,
    E: ParseError<I>,
{
    let (rest, digits) = consumed::<I, E, _>(take(2u8), ErrorKind::Count).parse(i)?;
    let (_, digits) = consumed::<I, E, _>(hex_digit0, ErrorKind::IsA).parse(digits)?;
    let (_, value) = hex_u32::<I, E>(digits)?;

    Ok((rest, value as u8))
}

/// Strips the `\r\n` line ending according to `mode`.
///
/// Yields the text before the line ending. Nothing may follow it.
///
/// ```rust
/// use aivdm_parser::{LineEndingMode, crlf};
/// use nom::{IResult, Parser};
///
/// let result: IResult<_, _> = crlf(LineEndingMode::Required).parse("0*5E\r\n");
/// assert_eq!(result, Ok(("0*5E", ())));
///
/// let result: IResult<_, _> = crlf(LineEndingMode::Optional).parse("0*5E");
/// assert_eq!(result, Ok(("0*5E", ())));
/// ```
pub fn crlf<'a, I, E: ParseError<I>>(mode: LineEndingMode) -> impl Fn(I) -> nom::IResult<I, (), E>
where
    I: Input + Compare<&'a str> + FindSubstring<&'a str>,
{
    move |i: I| match (mode, i.find_substring("\r\n")) {
        (LineEndingMode::Forbidden, Some(_)) | (LineEndingMode::Required, None) => {
            Err(Err::Error(E::from_error_kind(i, ErrorKind::CrLf)))
        }
        (_, Some(end)) => {
            let (ending, line) = i.take_split(end);
            consumed::<I, E, _>(tag("\r\n"), ErrorKind::CrLf).parse(ending)?;
            Ok((line, ()))
        }
        (_, None) => Ok((i, ())),
    }
}

/// XOR of every byte of `input`, which must not include the start delimiter or `*`.
///
/// Yields the input unchanged together with the checksum.
///
/// ```rust
/// use aivdm_parser::checksum;
///
/// let (_, cc) = checksum("AIVDM,1,1,,B,00,4");
/// assert_eq!(cc, 0x21);
/// ```
pub fn checksum<I>(input: I) -> (I, u8)
where
    I: Input + AsBytes,
{
    let cc = input.as_bytes().iter().fold(0, |cc, byte| cc ^ byte);
    (input, cc)
}

/// Two upper-case hexadecimal digits, as written after `*`.
///
/// ```rust
/// use aivdm_parser::format_checksum;
///
/// assert_eq!(format_checksum(0x5E), "5E");
/// assert_eq!(format_checksum(0x0A), "0A");
/// ```
pub fn format_checksum(checksum: u8) -> String {
    format!("{checksum:02X}")
}
