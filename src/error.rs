//! # Error Types
//!
//! This module defines the error types used throughout the AIS decoding library.
//!
//! The nom parsers that handle sentence framing and tag blocks work with the borrowed
//! [`Error`] type. Every public operation returns an owned error instead:
//!
//! - [`NmeaParseError`] for framing, checksum, field, armoring and fragment assembly problems
//! - [`BitError`] for bit extraction outside the payload or with an unusable width
//! - [`InvalidMessage`] for payloads that do not match the layout of their message type
//! - [`DecodeError`] as the umbrella returned by the envelope and the stream decoder

use nom::error::{ErrorKind, FromExternalError, ParseError};

/// Holds the result of parsing functions.
///
/// It depends on the input type `I`, the output type `O`, and the error type `E`
/// (by default `nom::error::Error<I>`).
///
/// The `Ok` side is a pair containing the remainder of the input (the part of the data that
/// was not parsed) and the produced value. The `Err` side contains an instance of `nom::Err`.
pub type IResult<I, O, E = nom::error::Error<I>> = nom::IResult<I, O, Error<I, E>>;

/// Represents all possible errors that can occur while parsing the textual layer.
#[derive(Debug, PartialEq)]
pub enum Error<I, E> {
    /// The provided input contains non-ASCII characters.
    ///
    /// NMEA sentences must be ASCII-only for proper parsing and checksum calculation.
    NonAscii,

    /// The checksum of the sentence was corrupt or incorrect.
    ///
    /// Contains both the expected checksum (calculated from the sentence content)
    /// and the actual checksum found in the sentence.
    ChecksumMismatch {
        /// The checksum calculated from the sentence content
        expected: u8,
        /// The checksum found in the sentence
        found: u8,
    },

    /// The sentence could not be parsed because its format was invalid.
    ///
    /// This wraps nom's standard parsing errors.
    ParsingError(E),

    /// The sentence formatter is not one this parser handles (anything but `VDM` and `VDO`).
    UnrecognizedMessage(I),
}

impl<I, E> ParseError<I> for Error<I, E>
where
    E: ParseError<I>,
{
    fn from_error_kind(input: I, kind: ErrorKind) -> Self {
        Error::ParsingError(E::from_error_kind(input, kind))
    }

    fn append(_: I, _: ErrorKind, other: Self) -> Self {
        other
    }
}

impl<I, E, EX> FromExternalError<I, EX> for Error<I, E>
where
    E: FromExternalError<I, EX>,
{
    fn from_external_error(input: I, kind: ErrorKind, e: EX) -> Self {
        Error::ParsingError(E::from_external_error(input, kind, e))
    }
}

/// Failure to turn raw text into sentences, tag blocks or a complete fragment group.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NmeaParseError {
    #[error("input contains non-ASCII characters")]
    NonAscii,

    #[error("checksum mismatch: calculated {expected:02X}, found {found:02X}")]
    ChecksumMismatch { expected: u8, found: u8 },

    /// The text does not have the structure of a sentence or tag block.
    #[error("malformed input at {input:?} ({kind:?})")]
    Malformed { input: String, kind: ErrorKind },

    #[error("unsupported sentence {0:?}")]
    UnsupportedSentence(String),

    /// A required field is missing or out of range.
    #[error("invalid value {value:?} for field `{field}`")]
    InvalidField { field: &'static str, value: String },

    #[error("invalid payload character {0:?}")]
    InvalidPayloadCharacter(char),

    #[error(
        "fragment count mismatch in sequence {sequence_id:?}: group expects {expected}, fragment declares {found}"
    )]
    FragmentCountMismatch {
        sequence_id: Option<u8>,
        expected: u8,
        found: u8,
    },

    #[error("incomplete fragment group {sequence_id:?}: {received} of {expected} fragments")]
    IncompleteGroup {
        sequence_id: Option<u8>,
        expected: u8,
        received: usize,
    },

    #[error("fragments belong to different sequences")]
    MixedSequences,
}

impl<'a> From<Error<&'a str, nom::error::Error<&'a str>>> for NmeaParseError {
    fn from(error: Error<&'a str, nom::error::Error<&'a str>>) -> Self {
        match error {
            Error::NonAscii => NmeaParseError::NonAscii,
            Error::ChecksumMismatch { expected, found } => {
                NmeaParseError::ChecksumMismatch { expected, found }
            }
            Error::ParsingError(error) => NmeaParseError::Malformed {
                input: error.input.to_string(),
                kind: error.code,
            },
            Error::UnrecognizedMessage(sentence) => {
                NmeaParseError::UnsupportedSentence(sentence.to_string())
            }
        }
    }
}

impl<'a> From<nom::Err<Error<&'a str, nom::error::Error<&'a str>>>> for NmeaParseError {
    fn from(error: nom::Err<Error<&'a str, nom::error::Error<&'a str>>>) -> Self {
        match error {
            nom::Err::Error(error) | nom::Err::Failure(error) => error.into(),
            nom::Err::Incomplete(_) => NmeaParseError::Malformed {
                input: String::new(),
                kind: ErrorKind::Eof,
            },
        }
    }
}

/// Bit extraction failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BitError {
    #[error("bits {start}..{} are outside a payload of {len} bits", .start + .width)]
    OutOfRange {
        start: usize,
        width: usize,
        len: usize,
    },

    #[error("width of {width} bits exceeds the maximum of {max}")]
    InvalidWidth { width: usize, max: usize },

    #[error("text width of {width} bits is not a multiple of 6")]
    UnalignedText { width: usize },
}

/// A payload that does not fit the layout of its message type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidMessage {
    #[error("message type {message_type} needs at least {required} bits, payload has {len}")]
    Truncated {
        message_type: u8,
        len: usize,
        required: usize,
    },

    #[error("message type {message_type}: unexpected value {value} for `{field}`")]
    UnexpectedValue {
        message_type: u8,
        field: &'static str,
        value: u64,
    },
}

/// Any failure on the way from raw text to a decoded [`AisMessage`](crate::AisMessage).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error(transparent)]
    NmeaParse(#[from] NmeaParseError),

    #[error("unsupported message type {0}")]
    UnsupportedMessageType(u8),

    #[error(transparent)]
    InvalidMessage(#[from] InvalidMessage),

    #[error(transparent)]
    Extraction(#[from] BitError),
}
