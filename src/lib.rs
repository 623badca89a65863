//! # AIVDM Parser
//!
//! This library decodes AIS (Automatic Identification System) messages carried in
//! NMEA 0183 `!AIVDM`/`!AIVDO` sentences:
//!
//! ```text
//! \s:2573345,c:1671620143*0E\!AIVDM,1,1,,A,1:02Ih001U0d=V:Op85<2aT>0<0F,0*22
//! ```
//!
//! Decoding happens in layers, each of which can be used on its own:
//!
//! - [`TagBlock`] parses the optional `\...\` prefix with receive time and source
//! - [`NmeaSentence`] parses the sentence framing and validates its checksum
//! - [`FragmentGroup`] and [`FragmentAssembler`] put multi-sentence payloads back together
//! - [`BitSequence`] de-armors the 6-bit payload and extracts bit fields
//! - [`AisMessage`] decodes the payload into one of the 27 [`MessageBody`] variants
//!
//! [`AisDecoder`] runs all of them over a stream of lines.
//!
//! ## Usage
//!
//! ```rust
//! use aivdm_parser::{AisDecoder, MessageBody};
//!
//! let decoder = AisDecoder::new();
//! let message = decoder
//!     .decode("!AIVDM,1,1,,A,1:02Ih001U0d=V:Op85<2aT>0<0F,0*22")
//!     .unwrap()
//!     .expect("single sentence messages complete immediately");
//!
//! if let MessageBody::PositionReportScheduled(report) = message.body() {
//!     assert_eq!(report.speed_over_ground, Some(10.1));
//!     assert_eq!(report.true_heading, Some(306));
//! }
//! ```
//!
//! The framing can be relaxed for sources that strip checksums or require CRLF line
//! endings, see [`ParserConfig`].

extern crate self as aivdm_parser;

pub mod ais;
mod bits;
mod decoder;
pub mod error;
mod fragments;
mod nmea0183;
pub mod parsing;
mod sentence;
mod tag_block;

pub use ais::{
    AidType, AisMessage, Area, CommunicationState, Dimensions, Eta, Header, ItdmaState,
    ManeuverIndicator, MessageBody, Metadata, Mmsi, NavigationStatus, PositionFixingDevice,
    ShipCategory, ShipType, SotdmaState, SotdmaSubMessage, StationType, SyncState, TxRxMode,
};
pub use aivdm_derive::BitParse;
pub use bits::{BinaryData, BitParse, BitReader, BitSequence, FromBits};
pub use decoder::AisDecoder;
pub use error::{BitError, DecodeError, Error, IResult, InvalidMessage, NmeaParseError};
pub use fragments::{Fragment, FragmentAssembler, FragmentGroup};
pub use nmea0183::*;
pub use sentence::NmeaSentence;
pub use tag_block::{SentenceGrouping, TagBlock, split_tag_block, split_tag_block_with};

#[cfg(doctest)]
#[doc = include_str!("../README.md")]
struct README;

#[cfg(test)]
mod tests {
    mod envelope;
    mod framing;
}
