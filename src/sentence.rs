//! # AIVDM/AIVDO Sentences
//!
//! ```text
//!         1 2 3 4 5 6      7
//!         | | | | | |      |
//!  !--VDM,x,x,x,a,s--s,x*hh<CR><LF>
//! ```
//!
//! 1. Total number of fragments carrying the payload
//! 2. Fragment number (1-based)
//! 3. Sequential message id, empty for single fragment payloads
//! 4. Radio channel
//! 5. 6-bit armored payload
//! 6. Number of fill bits (0-5)

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use nom::{
    Parser,
    branch::alt,
    bytes::complete::{tag, take_while_m_n},
    character::complete::char,
    combinator::rest,
    sequence::preceded,
};

use crate::{
    Error, IResult, NmeaParseError, ParserConfig, fragments::Fragment, nmea0183::checksum,
    parsing::field,
};

/// A single `VDM`/`VDO` sentence.
///
/// Immutable once parsed. The original text is kept verbatim and is what
/// equality is based on, together with the decoded fields.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NmeaSentence {
    raw: String,
    talker: String,
    own_vessel: bool,
    fragment_count: u8,
    fragment_number: u8,
    sequence_id: Option<u8>,
    channel: char,
    payload: String,
    fill_bits: u8,
    checksum: u8,
}

/// Fields as they appear in the sentence, before validation.
struct RawFields<'a> {
    talker: &'a str,
    formatter: &'a str,
    fragment_count: &'a str,
    fragment_number: &'a str,
    sequence_id: &'a str,
    channel: &'a str,
    payload: &'a str,
    fill_bits: &'a str,
    checksum: u8,
}

impl NmeaSentence {
    /// Parses a sentence with the default [`ParserConfig`].
    ///
    /// ```rust
    /// use aivdm_parser::NmeaSentence;
    ///
    /// let sentence = NmeaSentence::parse("!AIVDM,1,1,,B,13AkSB0000PhAmJPoTMoiQFT0D1:,0*5E").unwrap();
    /// assert_eq!(sentence.talker(), "AI");
    /// assert_eq!(sentence.channel(), 'B');
    /// assert_eq!(sentence.payload(), "13AkSB0000PhAmJPoTMoiQFT0D1:");
    /// assert_eq!(sentence.checksum(), 0x5E);
    /// ```
    pub fn parse(raw: &str) -> Result<Self, NmeaParseError> {
        Self::parse_with(raw, &ParserConfig::default())
    }

    /// Parses a sentence with a custom framing configuration.
    pub fn parse_with(raw: &str, config: &ParserConfig) -> Result<Self, NmeaParseError> {
        let (_, fields) = config.build(content).parse(raw)?;

        let fragment_count = number("fragment_count", fields.fragment_count)?;
        if fragment_count == 0 {
            return Err(invalid("fragment_count", fields.fragment_count));
        }

        let fragment_number = number("fragment_number", fields.fragment_number)?;
        if fragment_number == 0 || fragment_number > fragment_count {
            return Err(invalid("fragment_number", fields.fragment_number));
        }

        let sequence_id = match fields.sequence_id {
            "" if fragment_count > 1 => return Err(invalid("sequence_id", "")),
            "" => None,
            sequence_id => Some(number("sequence_id", sequence_id)?),
        };

        let mut channel = fields.channel.chars();
        let channel = match (channel.next(), channel.next()) {
            (Some(channel), None) => channel,
            _ => return Err(invalid("channel", fields.channel)),
        };

        if fields.payload.is_empty() {
            return Err(invalid("payload", fields.payload));
        }

        let fill_bits = number("fill_bits", fields.fill_bits)?;
        if fill_bits > 5 {
            return Err(invalid("fill_bits", fields.fill_bits));
        }

        Ok(Self {
            raw: raw.to_string(),
            talker: fields.talker.to_string(),
            own_vessel: fields.formatter == "VDO",
            fragment_count,
            fragment_number,
            sequence_id,
            channel,
            payload: fields.payload.to_string(),
            fill_bits,
            checksum: fields.checksum,
        })
    }

    /// The exact text the sentence was parsed from.
    pub fn raw_message(&self) -> &str {
        &self.raw
    }

    /// Two-character talker id, `AI` for a mobile station, `BS` for a base station...
    pub fn talker(&self) -> &str {
        &self.talker
    }

    /// `true` for `VDO` (own vessel) sentences, `false` for `VDM`.
    pub fn is_own_vessel(&self) -> bool {
        self.own_vessel
    }

    pub fn fragment_count(&self) -> u8 {
        self.fragment_count
    }

    pub fn fragment_number(&self) -> u8 {
        self.fragment_number
    }

    pub fn sequence_id(&self) -> Option<u8> {
        self.sequence_id
    }

    pub fn channel(&self) -> char {
        self.channel
    }

    /// The 6-bit armored payload.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn fill_bits(&self) -> u8 {
        self.fill_bits
    }

    /// The checksum of the sentence content. Equal to the declared one when present.
    pub fn checksum(&self) -> u8 {
        self.checksum
    }
}

impl Fragment for NmeaSentence {
    fn sequence_id(&self) -> Option<u8> {
        self.sequence_id
    }

    fn fragment_count(&self) -> u8 {
        self.fragment_count
    }

    fn fragment_number(&self) -> u8 {
        self.fragment_number
    }
}

impl fmt::Display for NmeaSentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::str::FromStr for NmeaSentence {
    type Err = NmeaParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for NmeaSentence {
    type Error = NmeaParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<NmeaSentence> for String {
    fn from(value: NmeaSentence) -> Self {
        value.raw
    }
}

fn content(i: &str) -> IResult<&str, RawFields<'_>> {
    let (_, checksum) = checksum(i);

    let (i, talker) = take_while_m_n(2, 2, |c: char| c.is_ascii_alphabetic()).parse(i)?;
    let (i, formatter) = alt((tag("VDM"), tag("VDO")))
        .parse(i)
        .map_err(|_: nom::Err<Error<&str, nom::error::Error<&str>>>| {
            nom::Err::Error(Error::UnrecognizedMessage(i))
        })?;

    let (i, (fragment_count, fragment_number, sequence_id, channel, payload, fill_bits)) = (
        preceded(char(','), field),
        preceded(char(','), field),
        preceded(char(','), field),
        preceded(char(','), field),
        preceded(char(','), field),
        preceded(char(','), rest),
    )
        .parse(i)?;

    Ok((
        i,
        RawFields {
            talker,
            formatter,
            fragment_count,
            fragment_number,
            sequence_id,
            channel,
            payload,
            fill_bits,
            checksum,
        },
    ))
}

fn number(field: &'static str, value: &str) -> Result<u8, NmeaParseError> {
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(field, value));
    }
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
    use crate::{ChecksumMode, LineEndingMode};

    #[test]
    fn test_sentence_parsing() {
        let sentence =
            NmeaSentence::parse("!BSVDM,2,1,5,A,5:02Ih01WrRsEH57J20H5P8u8N222222222222167H66663k085QBS1H,0*55")
                .unwrap();

        assert_eq!(sentence.talker(), "BS");
        assert!(!sentence.is_own_vessel());
        assert_eq!(sentence.fragment_count(), 2);
        assert_eq!(sentence.fragment_number(), 1);
        assert_eq!(sentence.sequence_id(), Some(5));
        assert_eq!(sentence.channel(), 'A');
        assert_eq!(sentence.fill_bits(), 0);
        assert_eq!(sentence.checksum(), 0x55);
        assert_eq!(
            sentence.raw_message(),
            "!BSVDM,2,1,5,A,5:02Ih01WrRsEH57J20H5P8u8N222222222222167H66663k085QBS1H,0*55"
        );
    }

    #[test]
    fn test_accepted_variants() {
        let cases = [
            "!AIVDM,1,1,,B,13AkSB0000PhAmJPoTMoiQFT0D1:,0*5E",
            "!AIVDM,1,1,,B,13AkSB0000PhAmJPoTMoiQFT0D1:,0*5E\r\n",
            "!AIVDM,1,1,,B,13AkSB0000PhAmJPoTMoiQFT0D1:,0*5e",
            "$AIVDM,1,1,,B,13AkSB0000PhAmJPoTMoiQFT0D1:,0*5E",
            "!AIVDM,1,1,,B,00,4*21",
            "!BSVDM,2,2,5,A,888888888888880,2*38",
        ];

        for &input in &cases {
            let result = NmeaSentence::parse(input);
            assert!(result.is_ok(), "Failed: {input:?}\n\t{result:?}");
        }
    }

    #[test]
    fn test_own_vessel() {
        let body = "AIVDO,1,1,,A,13AkSB0000PhAmJPoTMoiQFT0D1:,0";
        let (_, cc) = checksum(body);
        let sentence = NmeaSentence::parse(&format!("!{body}*{cc:02X}")).unwrap();
        assert!(sentence.is_own_vessel());
    }

    #[test]
    fn test_framing_errors() {
        assert!(matches!(
            NmeaSentence::parse("!AIVDM,1,1,,B,13K6th002u9@8P0DEVv2M1up02Pl,0*740008,2*09"),
            Err(NmeaParseError::Malformed { .. })
        ));
        assert!(matches!(
            NmeaSentence::parse("!AIVDM,1,1,,B,13AkSB0000PhAmJPoTMoiQFT0D1:,0*5F"),
            Err(NmeaParseError::ChecksumMismatch {
                expected: 0x5E,
                found: 0x5F
            })
        ));
        assert!(matches!(
            NmeaSentence::parse("!AIVDM,1,1,,B,13AkSB0000PhAmJPoTMoiQFT0D1:,0"),
            Err(NmeaParseError::Malformed { .. })
        ));
        assert!(matches!(
            NmeaSentence::parse("AIVDM,1,1,,B,00,4*21"),
            Err(NmeaParseError::Malformed { .. })
        ));
        assert_eq!(
            NmeaSentence::parse("!AIVDM,1,1,,B,0é,4*21"),
            Err(NmeaParseError::NonAscii)
        );
    }

    #[test]
    fn test_unsupported_sentence() {
        let body = "GPGGA,1,1,,B,00,4";
        let (_, cc) = checksum(body);
        assert!(matches!(
            NmeaSentence::parse(&format!("${body}*{cc:02X}")),
            Err(NmeaParseError::UnsupportedSentence(_))
        ));
    }

    #[test]
    fn test_invalid_fields() {
        let cases = [
            ("AIVDM,0,1,,B,00,4", "fragment_count"),
            ("AIVDM,1,0,,B,00,4", "fragment_number"),
            ("AIVDM,1,2,,B,00,4", "fragment_number"),
            ("AIVDM,2,1,,B,00,4", "sequence_id"),
            ("AIVDM,2,1,x,B,00,4", "sequence_id"),
            ("AIVDM,1,1,,,00,4", "channel"),
            ("AIVDM,1,1,,AB,00,4", "channel"),
            ("AIVDM,1,1,,B,,4", "payload"),
            ("AIVDM,1,1,,B,00,6", "fill_bits"),
            ("AIVDM,1,1,,B,00,", "fill_bits"),
            ("AIVDM,x,1,,B,00,4", "fragment_count"),
        ];

        for (body, expected) in cases {
            let (_, cc) = checksum(body);
            let result = NmeaSentence::parse(&format!("!{body}*{cc:02X}"));
            match result {
                Err(NmeaParseError::InvalidField { field, .. }) => {
                    assert_eq!(field, expected, "Failed: {body:?}")
                }
                other => panic!("Unexpected result for {body:?}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_parse_with_config() {
        let config = ParserConfig::new()
            .checksum_mode(ChecksumMode::Optional)
            .line_ending_mode(LineEndingMode::Forbidden);

        let sentence =
            NmeaSentence::parse_with("!AIVDM,1,1,,B,13AkSB0000PhAmJPoTMoiQFT0D1:,0", &config)
                .unwrap();
        assert_eq!(sentence.checksum(), 0x5E);

        assert!(
            NmeaSentence::parse_with("!AIVDM,1,1,,B,13AkSB0000PhAmJPoTMoiQFT0D1:,0*5E\r\n", &config)
                .is_err()
        );
    }

    #[test]
    fn test_display_and_from_str() {
        let raw = "!AIVDM,1,1,,A,13aEOK?P00PD2wVMdLDRhgvL289?,0*26";
        let sentence: NmeaSentence = raw.parse().unwrap();
        assert_eq!(sentence.to_string(), raw);
        assert_eq!(String::from(sentence), raw);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde() {
        let raw = "!AIVDM,1,1,,A,13aEOK?P00PD2wVMdLDRhgvL289?,0*26";
        let sentence = NmeaSentence::parse(raw).unwrap();

        let json = serde_json::to_string(&sentence).unwrap();
        assert_eq!(json, format!("{raw:?}"));

        let back: NmeaSentence = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sentence);
    }
}
