//! # Stream Decoding
//!
//! [`AisDecoder`] turns raw lines, as read from a receiver or a log file, into
//! [`AisMessage`]s. It splits off tag blocks, parses the sentence and buffers
//! fragments until their group is complete.

use std::time::Duration;

use time::OffsetDateTime;
use tracing::{debug, trace};

use crate::{
    AisMessage, DecodeError, FragmentAssembler, Metadata, NmeaSentence, ParserConfig, TagBlock,
    fragments::Fragment, tag_block::split_tag_block_with,
};

/// A sentence with the tag block that preceded it on its line.
struct TaggedSentence {
    sentence: NmeaSentence,
    tag_block: Option<TagBlock>,
}

impl Fragment for TaggedSentence {
    fn sequence_id(&self) -> Option<u8> {
        self.sentence.sequence_id()
    }

    fn fragment_count(&self) -> u8 {
        self.sentence.fragment_count()
    }

    fn fragment_number(&self) -> u8 {
        self.sentence.fragment_number()
    }
}

/// Decodes a stream of lines, assembling multi-sentence messages on the way.
///
/// Lines may come from several threads. A failing line only affects itself, or the
/// group it belongs to, so callers can log the error and carry on.
///
/// ```rust
/// use aivdm_parser::AisDecoder;
///
/// let decoder = AisDecoder::with_source("harbour");
///
/// let first = "!BSVDM,2,1,5,A,5:02Ih01WrRsEH57J20H5P8u8N222222222222167H66663k085QBS1H,0*55";
/// let second = "!BSVDM,2,2,5,A,888888888888880,2*38";
///
/// assert!(decoder.decode(first).unwrap().is_none());
/// let message = decoder.decode(second).unwrap().unwrap();
///
/// assert_eq!(message.message_type(), 5);
/// assert_eq!(message.nmea_messages().len(), 2);
/// assert_eq!(message.metadata().unwrap().source(), "harbour");
/// ```
pub struct AisDecoder {
    assembler: FragmentAssembler<TaggedSentence>,
    source: Option<String>,
    config: ParserConfig,
}

impl AisDecoder {
    /// A decoder that attaches no [`Metadata`].
    pub fn new() -> Self {
        Self {
            assembler: FragmentAssembler::new(),
            source: None,
            config: ParserConfig::default(),
        }
    }

    /// A decoder that attaches [`Metadata`] naming `source`, stamped with the time each
    /// message is completed.
    pub fn with_source(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::new()
        }
    }

    /// Replaces the framing configuration used for sentences and tag blocks.
    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Decodes one line.
    ///
    /// Returns `Ok(None)` for blank lines and while the group of a fragment is still
    /// incomplete. The message carries the first tag block found in fragment order.
    pub fn decode(&self, line: &str) -> Result<Option<AisMessage>, DecodeError> {
        if line.trim().is_empty() {
            return Ok(None);
        }

        let (tag_block, sentence) = split_tag_block_with(line, &self.config)?;
        let sentence = NmeaSentence::parse_with(sentence, &self.config)?;
        trace!(
            sequence_id = sentence.sequence_id(),
            fragment = sentence.fragment_number(),
            total = sentence.fragment_count(),
            "sentence parsed"
        );

        let Some(fragments) = self.assembler.accept(TaggedSentence {
            sentence,
            tag_block,
        })?
        else {
            return Ok(None);
        };

        let mut tag_block = None;
        let sentences = fragments
            .into_iter()
            .map(|fragment| {
                if tag_block.is_none() {
                    tag_block = fragment.tag_block;
                }
                fragment.sentence
            })
            .collect();

        let metadata = self
            .source
            .as_ref()
            .map(|source| Metadata::new(source.clone(), OffsetDateTime::now_utc()));

        let message = AisMessage::decode(metadata, tag_block, sentences)?;
        debug!(
            message_type = message.message_type(),
            mmsi = message.source_mmsi().0,
            "message decoded"
        );

        Ok(Some(message))
    }

    /// Decodes every line, yielding a result for each completed message or failing line.
    ///
    /// ```rust
    /// use aivdm_parser::AisDecoder;
    ///
    /// let lines = [
    ///     "!AIVDM,1,1,,B,13AkSB0000PhAmJPoTMoiQFT0D1:,0*5E",
    ///     "!AIVDM,1,1,,B,13AkSB0000PhAmJPoTMoiQFT0D1:,0*5F",
    ///     "",
    ///     "!AIVDM,1,1,,A,1:02Ih001U0d=V:Op85<2aT>0<0F,0*22",
    /// ];
    ///
    /// let decoder = AisDecoder::new();
    /// let results: Vec<_> = decoder.decode_all(lines).collect();
    ///
    /// assert_eq!(results.len(), 3);
    /// assert!(results[0].is_ok());
    /// assert!(results[1].is_err());
    /// assert!(results[2].is_ok());
    /// ```
    pub fn decode_all<'a, I>(
        &'a self,
        lines: I,
    ) -> impl Iterator<Item = Result<AisMessage, DecodeError>> + 'a
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        I::IntoIter: 'a,
    {
        lines
            .into_iter()
            .filter_map(move |line| self.decode(line.as_ref()).transpose())
    }

    /// Number of fragment groups waiting for more sentences.
    pub fn pending(&self) -> usize {
        self.assembler.pending()
    }

    /// Drops fragment groups that started more than `age` ago.
    ///
    /// The decoder never expires groups on its own; long running callers should call
    /// this periodically.
    pub fn discard_older_than(&self, age: Duration) -> usize {
        self.assembler.discard_older_than(age)
    }
}

impl Default for AisDecoder {
    fn default() -> Self {
        Self::new()
    }
}
