//! # Tag Blocks
//!
//! IEC 61162-450 tag blocks are prefixed to a sentence by some receivers and relays:
//!
//! ```text
//! \g:1-2-73874,n:157036,s:r003669945,c:1241544035*4A\!AIVDM,1,1,,B,15N4cJ`005Jrek0H@9n`DW5608EP,0*13
//! ```
//!
//! | Key | Meaning |
//! |-----|---------|
//! | `c` | UNIX time of reception, in seconds or milliseconds |
//! | `d` | Destination |
//! | `g` | Sentence grouping, `sentence-total-group` |
//! | `n` | Line count |
//! | `r` | Relative time |
//! | `s` | Source station |
//! | `t`, `i` | Free text |
//!
//! Any other key is kept as is, in order of appearance.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use nom::{
    Parser,
    bytes::complete::take_until,
    character::complete::{alphanumeric1, char},
    error::ErrorKind,
    multi::separated_list1,
    sequence::{delimited, separated_pair},
};
use time::OffsetDateTime;

use crate::{
    IResult, LineEndingMode, NmeaParseError, ParserConfig,
    nmea0183::checksummed,
    parsing::{consumed, field},
};

/// `c` values above this are taken as milliseconds.
const MILLISECOND_THRESHOLD: u64 = 10_000_000_000;

/// Position of a sentence in a tag block group (`g:1-2-73874`).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SentenceGrouping {
    pub sentence_number: u32,
    pub total_sentences: u32,
    pub group_id: u32,
}

/// A parsed tag block.
///
/// Equality covers the exact text of the block.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagBlock {
    raw: String,
    timestamp: Option<OffsetDateTime>,
    source: Option<String>,
    line_count: Option<u32>,
    destination: Option<String>,
    grouping: Option<SentenceGrouping>,
    relative_time: Option<u64>,
    text: Option<String>,
    unknown: Vec<(String, String)>,
    checksum: u8,
}

/// Splits a leading tag block from the rest of the line.
///
/// Lines without a tag block are returned unchanged.
///
/// ```rust
/// use aivdm_parser::split_tag_block;
///
/// let line = "\\s:2573345,c:1671620143*0E\\!AIVDM,1,1,,B,00,4*21";
/// let (tag_block, sentence) = split_tag_block(line).unwrap();
///
/// let tag_block = tag_block.unwrap();
/// assert_eq!(tag_block.source(), Some("2573345"));
/// assert_eq!(tag_block.timestamp().unwrap().unix_timestamp(), 1671620143);
/// assert_eq!(sentence, "!AIVDM,1,1,,B,00,4*21");
///
/// let (tag_block, sentence) = split_tag_block("!AIVDM,1,1,,B,00,4*21").unwrap();
/// assert!(tag_block.is_none());
/// assert_eq!(sentence, "!AIVDM,1,1,,B,00,4*21");
/// ```
pub fn split_tag_block(raw: &str) -> Result<(Option<TagBlock>, &str), NmeaParseError> {
    split_tag_block_with(raw, &ParserConfig::default())
}

/// Like [`split_tag_block`], with the checksum policy of `config`.
///
/// Tag blocks never carry a line ending, so only the checksum mode applies.
pub fn split_tag_block_with<'a>(
    raw: &'a str,
    config: &ParserConfig,
) -> Result<(Option<TagBlock>, &'a str), NmeaParseError> {
    if !raw.starts_with('\\') {
        return Ok((None, raw));
    }

    let (rest, block) = block(raw)?;
    let tag_block = TagBlock::from_content(&raw[..raw.len() - rest.len()], block, config)?;

    Ok((Some(tag_block), rest))
}

impl TagBlock {
    /// Parses a standalone tag block, backslashes included.
    ///
    /// ```rust
    /// use aivdm_parser::TagBlock;
    ///
    /// let tag_block = TagBlock::parse("\\c:1609841515,s:my dearest AIS base station*6E\\").unwrap();
    /// assert_eq!(tag_block.source(), Some("my dearest AIS base station"));
    /// ```
    pub fn parse(text: &str) -> Result<Self, NmeaParseError> {
        Self::parse_with(text, &ParserConfig::default())
    }

    pub fn parse_with(text: &str, config: &ParserConfig) -> Result<Self, NmeaParseError> {
        match split_tag_block_with(text, config)? {
            (Some(tag_block), "") => Ok(tag_block),
            (Some(_), rest) => Err(NmeaParseError::Malformed {
                input: rest.to_string(),
                kind: ErrorKind::Eof,
            }),
            (None, _) => Err(NmeaParseError::Malformed {
                input: text.to_string(),
                kind: ErrorKind::Char,
            }),
        }
    }

    fn from_content(raw: &str, content: &str, config: &ParserConfig) -> Result<Self, NmeaParseError> {
        let (_, (data, checksum)) = checksummed::<_, nom::error::Error<&str>>(
            config.checksum_mode,
            LineEndingMode::Forbidden,
        )
        .parse(content)?;
        let (_, pairs) = pairs(data)?;

        let mut tag_block = Self {
            raw: raw.to_string(),
            timestamp: None,
            source: None,
            line_count: None,
            destination: None,
            grouping: None,
            relative_time: None,
            text: None,
            unknown: Vec::new(),
            checksum,
        };

        for (key, value) in pairs {
            match key {
                "c" => tag_block.timestamp = Some(timestamp(value)?),
                "s" => tag_block.source = Some(value.to_string()),
                "n" => tag_block.line_count = Some(number("n", value)?),
                "d" => tag_block.destination = Some(value.to_string()),
                "g" => tag_block.grouping = Some(grouping(value)?),
                "r" => tag_block.relative_time = Some(number("r", value)?),
                "t" | "i" => tag_block.text = Some(value.to_string()),
                _ => tag_block
                    .unknown
                    .push((key.to_string(), value.to_string())),
            }
        }

        Ok(tag_block)
    }

    /// The exact text of the block, backslashes included.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Time of reception (`c`).
    pub fn timestamp(&self) -> Option<OffsetDateTime> {
        self.timestamp
    }

    /// Source station (`s`).
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn line_count(&self) -> Option<u32> {
        self.line_count
    }

    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    pub fn grouping(&self) -> Option<SentenceGrouping> {
        self.grouping
    }

    pub fn relative_time(&self) -> Option<u64> {
        self.relative_time
    }

    /// Free text (`t` or `i`).
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Unrecognized keys and their values, in order of appearance.
    pub fn unknown(&self) -> &[(String, String)] {
        &self.unknown
    }

    pub fn checksum(&self) -> u8 {
        self.checksum
    }
}

impl fmt::Display for TagBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::str::FromStr for TagBlock {
    type Err = NmeaParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TagBlock {
    type Error = NmeaParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TagBlock> for String {
    fn from(value: TagBlock) -> Self {
        value.raw
    }
}

fn block(i: &str) -> IResult<&str, &str> {
    delimited(char('\\'), take_until("\\"), char('\\')).parse(i)
}

fn pairs(i: &str) -> IResult<&str, Vec<(&str, &str)>> {
    consumed(
        separated_list1(char(','), separated_pair(alphanumeric1, char(':'), field)),
        ErrorKind::SeparatedList,
    )
    .parse(i)
}

fn timestamp(value: &str) -> Result<OffsetDateTime, NmeaParseError> {
    let raw: u64 = number("c", value)?;

    let timestamp = if raw > MILLISECOND_THRESHOLD {
        OffsetDateTime::from_unix_timestamp_nanos(raw as i128 * 1_000_000)
    } else {
        OffsetDateTime::from_unix_timestamp(raw as i64)
    };

    timestamp.map_err(|_| invalid("c", value))
}

fn grouping(value: &str) -> Result<SentenceGrouping, NmeaParseError> {
    let mut parts = value.splitn(3, '-');
    let (Some(sentence_number), Some(total_sentences), Some(group_id)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid("g", value));
    };

    let parse = |part: &str| part.parse().map_err(|_| invalid("g", value));

    Ok(SentenceGrouping {
        sentence_number: parse(sentence_number)?,
        total_sentences: parse(total_sentences)?,
        group_id: parse(group_id)?,
    })
}

fn number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, NmeaParseError> {
    value.parse().map_err(|_| invalid(field, value))
}

fn invalid(field: &'static str, value: &str) -> NmeaParseError {
    NmeaParseError::InvalidField {
        field,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChecksumMode;

    #[test]
    fn test_recognized_keys() {
        let (tag_block, rest) = split_tag_block(
            "\\g:1-2-73874,n:157036,s:r003669945,c:1241544035*4A\\!AIVDM,1,1,,B,00,4*21",
        )
        .unwrap();
        let tag_block = tag_block.unwrap();

        assert_eq!(rest, "!AIVDM,1,1,,B,00,4*21");
        assert_eq!(
            tag_block.grouping(),
            Some(SentenceGrouping {
                sentence_number: 1,
                total_sentences: 2,
                group_id: 73874
            })
        );
        assert_eq!(tag_block.line_count(), Some(157036));
        assert_eq!(tag_block.source(), Some("r003669945"));
        assert_eq!(
            tag_block.timestamp().map(OffsetDateTime::unix_timestamp),
            Some(1241544035)
        );
        assert_eq!(tag_block.checksum(), 0x4A);
        assert_eq!(
            tag_block.raw(),
            "\\g:1-2-73874,n:157036,s:r003669945,c:1241544035*4A\\"
        );
        assert!(tag_block.unknown().is_empty());
    }

    #[test]
    fn test_milliseconds_and_unknown_keys() {
        let tag_block = TagBlock::parse("\\c:1609841515123,x:42,r:15,t:hello*63\\").unwrap();

        let timestamp = tag_block.timestamp().unwrap();
        assert_eq!(timestamp.unix_timestamp(), 1609841515);
        assert_eq!(timestamp.millisecond(), 123);
        assert_eq!(tag_block.relative_time(), Some(15));
        assert_eq!(tag_block.text(), Some("hello"));
        assert_eq!(
            tag_block.unknown(),
            [("x".to_string(), "42".to_string())]
        );
    }

    #[test]
    fn test_checksum() {
        assert_eq!(
            TagBlock::parse("\\c:1609841515,s:my dearest AIS base station*6F\\"),
            Err(NmeaParseError::ChecksumMismatch {
                expected: 0x6E,
                found: 0x6F
            })
        );
        assert!(TagBlock::parse("\\s:2573345,c:1671620143\\").is_err());

        let config = ParserConfig::new().checksum_mode(ChecksumMode::Optional);
        let tag_block = TagBlock::parse_with("\\s:2573345,c:1671620143\\", &config).unwrap();
        assert_eq!(tag_block.source(), Some("2573345"));
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(
            split_tag_block("\\s:2573345*0E!AIVDM,1,1,,B,00,4*21"),
            Err(NmeaParseError::Malformed { .. })
        ));
        assert_eq!(
            TagBlock::parse("\\c:abc*41\\"),
            Err(NmeaParseError::ChecksumMismatch {
                expected: 0x39,
                found: 0x41
            })
        );
        assert_eq!(
            TagBlock::parse("\\c:abc*39\\"),
            Err(NmeaParseError::InvalidField {
                field: "c",
                value: "abc".to_string()
            })
        );
        assert!(matches!(
            TagBlock::parse("\\s:2573345,c:1671620143*0E\\trailing"),
            Err(NmeaParseError::Malformed { .. })
        ));
        assert!(matches!(
            TagBlock::parse("s:2573345,c:1671620143*0E"),
            Err(NmeaParseError::Malformed { .. })
        ));
    }

    #[test]
    fn test_invalid_values() {
        let config = ParserConfig::new().checksum_mode(ChecksumMode::Optional);
        assert_eq!(
            TagBlock::parse_with("\\g:1-2\\", &config),
            Err(NmeaParseError::InvalidField {
                field: "g",
                value: "1-2".to_string()
            })
        );
        assert_eq!(
            TagBlock::parse_with("\\n:many\\", &config),
            Err(NmeaParseError::InvalidField {
                field: "n",
                value: "many".to_string()
            })
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde() {
        let tag_block = TagBlock::parse("\\s:2573345,c:1671620143*0E\\").unwrap();
        let json = serde_json::to_string(&tag_block).unwrap();
        assert_eq!(json, r#""\\s:2573345,c:1671620143*0E\\""#);
        assert_eq!(serde_json::from_str::<TagBlock>(&json).unwrap(), tag_block);
    }
}
