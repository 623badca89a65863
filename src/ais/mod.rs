//! # AIS Messages
//!
//! Every AIS payload starts with the same 38-bit header: message type, repeat
//! indicator and the MMSI of the transmitting station. The rest of the payload is laid
//! out according to the message type and decoded into one of the [`MessageBody`]
//! variants.
//!
//! [`AisMessage`] ties the decoded message to the sentences it was carried in and
//! to any [`Metadata`] or [`TagBlock`] supplied with them.
//!
//! ## Supported Message Types
//!
//! | Type | Variant                                          | Description                          |
//! |------|--------------------------------------------------|--------------------------------------|
//! | 1    | [`PositionReportScheduled`](MessageBody::PositionReportScheduled) | Position report class A |
//! | 2    | [`PositionReportAssigned`](MessageBody::PositionReportAssigned)   | Position report class A, assigned schedule |
//! | 3    | [`PositionReportResponse`](MessageBody::PositionReportResponse)   | Position report class A, response to interrogation |
//! | 4    | [`BaseStationReport`](MessageBody::BaseStationReport)             | Base station report |
//! | 5    | [`StaticAndVoyageData`](MessageBody::StaticAndVoyageData)         | Static and voyage related data |
//! | 6    | [`BinaryAddressed`](MessageBody::BinaryAddressed)                 | Binary addressed message |
//! | 7    | [`BinaryAcknowledge`](MessageBody::BinaryAcknowledge)             | Binary acknowledge |
//! | 8    | [`BinaryBroadcast`](MessageBody::BinaryBroadcast)                 | Binary broadcast message |
//! | 9    | [`SarAircraftPosition`](MessageBody::SarAircraftPosition)         | Standard SAR aircraft position report |
//! | 10   | [`UtcInquiry`](MessageBody::UtcInquiry)                           | UTC/date inquiry |
//! | 11   | [`UtcResponse`](MessageBody::UtcResponse)                         | UTC/date response |
//! | 12   | [`AddressedSafety`](MessageBody::AddressedSafety)                 | Addressed safety related message |
//! | 13   | [`SafetyAcknowledge`](MessageBody::SafetyAcknowledge)             | Safety related acknowledge |
//! | 14   | [`SafetyBroadcast`](MessageBody::SafetyBroadcast)                 | Safety related broadcast message |
//! | 15   | [`Interrogation`](MessageBody::Interrogation)                     | Interrogation |
//! | 16   | [`AssignmentModeCommand`](MessageBody::AssignmentModeCommand)     | Assignment mode command |
//! | 17   | [`DgnssBroadcast`](MessageBody::DgnssBroadcast)                   | DGNSS broadcast binary message |
//! | 18   | [`StandardClassBPosition`](MessageBody::StandardClassBPosition)   | Standard class B CS position report |
//! | 19   | [`ExtendedClassBPosition`](MessageBody::ExtendedClassBPosition)   | Extended class B CS position report |
//! | 20   | [`DataLinkManagement`](MessageBody::DataLinkManagement)           | Data link management |
//! | 21   | [`AidToNavigation`](MessageBody::AidToNavigation)                 | Aid-to-navigation report |
//! | 22   | [`ChannelManagement`](MessageBody::ChannelManagement)             | Channel management |
//! | 23   | [`GroupAssignment`](MessageBody::GroupAssignment)                 | Group assignment command |
//! | 24   | [`StaticDataReport`](MessageBody::StaticDataReport)               | Static data report |
//! | 25   | [`SingleSlotBinary`](MessageBody::SingleSlotBinary)               | Single slot binary message |
//! | 26   | [`MultipleSlotBinary`](MessageBody::MultipleSlotBinary)           | Multiple slot binary message |
//! | 27   | [`LongRangeBroadcast`](MessageBody::LongRangeBroadcast)           | Long range AIS broadcast message |
//!
//! Any other type code fails with [`DecodeError::UnsupportedMessageType`].

mod fields;
pub mod messages;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub use fields::{
    AidType, Area, CommunicationState, Dimensions, Eta, ItdmaState, ManeuverIndicator, Mmsi,
    NavigationStatus, PositionFixingDevice, ShipCategory, ShipType, SotdmaState,
    SotdmaSubMessage, StationType, SyncState, TxRxMode,
};
use messages::*;

use crate::{BitParse, BitReader, BitSequence, DecodeError, FragmentGroup, NmeaSentence, TagBlock};

/// Fields shared by every message type.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[ais(min_len(38))]
pub struct Header {
    #[ais(bits(6))]
    pub message_type: u8,
    /// How many times the message has been repeated, 3 means do not repeat
    #[ais(bits(2))]
    pub repeat_indicator: u8,
    #[ais(bits(30))]
    pub source_mmsi: Mmsi,
}

/// The decoded part of a payload that follows the [`Header`], one variant per type code.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, PartialEq)]
#[ais(selector(|bits: &mut BitReader<'_>| bits.peek_unsigned(0, 6)))]
#[ais(selection_error(DecodeError::UnsupportedMessageType(ais_selector as u8)))]
pub enum MessageBody {
    #[ais(selector(1))]
    PositionReportScheduled(PositionReport),
    #[ais(selector(2))]
    PositionReportAssigned(PositionReport),
    #[ais(selector(3))]
    PositionReportResponse(PositionReport),
    #[ais(selector(4))]
    BaseStationReport(BaseStationReport),
    #[ais(selector(5))]
    StaticAndVoyageData(StaticAndVoyageData),
    #[ais(selector(6))]
    BinaryAddressed(BinaryAddressed),
    #[ais(selector(7))]
    BinaryAcknowledge(Acknowledge),
    #[ais(selector(8))]
    BinaryBroadcast(BinaryBroadcast),
    #[ais(selector(9))]
    SarAircraftPosition(SarAircraftPosition),
    #[ais(selector(10))]
    UtcInquiry(UtcInquiry),
    #[ais(selector(11))]
    UtcResponse(BaseStationReport),
    #[ais(selector(12))]
    AddressedSafety(AddressedSafety),
    #[ais(selector(13))]
    SafetyAcknowledge(Acknowledge),
    #[ais(selector(14))]
    SafetyBroadcast(SafetyBroadcast),
    #[ais(selector(15))]
    Interrogation(Interrogation),
    #[ais(selector(16))]
    AssignmentModeCommand(AssignmentModeCommand),
    #[ais(selector(17))]
    DgnssBroadcast(DgnssBroadcast),
    #[ais(selector(18))]
    StandardClassBPosition(StandardClassBPosition),
    #[ais(selector(19))]
    ExtendedClassBPosition(ExtendedClassBPosition),
    #[ais(selector(20))]
    DataLinkManagement(DataLinkManagement),
    #[ais(selector(21))]
    AidToNavigation(AidToNavigation),
    #[ais(selector(22))]
    ChannelManagement(ChannelManagement),
    #[ais(selector(23))]
    GroupAssignment(GroupAssignment),
    #[ais(selector(24))]
    StaticDataReport(StaticDataReport),
    #[ais(selector(25))]
    SingleSlotBinary(SingleSlotBinary),
    #[ais(selector(26))]
    MultipleSlotBinary(MultipleSlotBinary),
    #[ais(selector(27))]
    LongRangeBroadcast(LongRangeBroadcast),
}

/// Where and when a message was received.
///
/// Only attached to messages, it never influences decoding.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Metadata {
    source: String,
    received: OffsetDateTime,
}

impl Metadata {
    pub fn new(source: impl Into<String>, received: OffsetDateTime) -> Self {
        Self {
            source: source.into(),
            received,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn received(&self) -> OffsetDateTime {
        self.received
    }
}

/// A decoded AIS message together with the sentences it was carried in.
///
/// Two messages are equal when their decoded values, the text of their sentences and
/// their [`Metadata`] are equal. The tag block and the assembled bits follow from the
/// rest and take no part in the comparison.
///
/// ```rust
/// use aivdm_parser::{AisMessage, MessageBody, NmeaSentence};
///
/// let sentence = NmeaSentence::parse("!AIVDM,1,1,,B,13AkSB0000PhAmJPoTMoiQFT0D1:,0*5E").unwrap();
/// let message = AisMessage::create(vec![sentence]).unwrap();
///
/// assert_eq!(message.message_type(), 1);
/// assert_eq!(message.source_mmsi().0, 219997000);
///
/// let MessageBody::PositionReportScheduled(report) = message.body() else {
///     panic!("unexpected message type");
/// };
/// assert_eq!(report.true_heading, Some(43));
/// ```
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone)]
pub struct AisMessage {
    header: Header,
    body: MessageBody,
    sentences: Vec<NmeaSentence>,
    #[cfg_attr(feature = "serde", serde(skip))]
    bits: BitSequence,
    metadata: Option<Metadata>,
    tag_block: Option<TagBlock>,
}

impl PartialEq for AisMessage {
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header
            && self.body == other.body
            && self.sentences == other.sentences
            && self.metadata == other.metadata
    }
}

impl AisMessage {
    /// Decodes the message carried by `sentences`, given in any order.
    pub fn create(sentences: Vec<NmeaSentence>) -> Result<Self, DecodeError> {
        Self::decode(None, None, sentences)
    }

    pub fn create_with_metadata(
        metadata: Metadata,
        sentences: Vec<NmeaSentence>,
    ) -> Result<Self, DecodeError> {
        Self::decode(Some(metadata), None, sentences)
    }

    pub fn create_with_tag_block(
        metadata: Metadata,
        tag_block: TagBlock,
        sentences: Vec<NmeaSentence>,
    ) -> Result<Self, DecodeError> {
        Self::decode(Some(metadata), Some(tag_block), sentences)
    }

    pub(crate) fn decode(
        metadata: Option<Metadata>,
        tag_block: Option<TagBlock>,
        sentences: Vec<NmeaSentence>,
    ) -> Result<Self, DecodeError> {
        let group = FragmentGroup::new(sentences)?;
        let bits = BitSequence::from_payload(&group.payload(), group.fill_bits())?;

        let mut reader = bits.reader();
        let header = Header::parse(&mut reader)?;
        let body = MessageBody::parse(&mut reader)?;

        Ok(Self {
            header,
            body,
            sentences: group.into_sentences(),
            bits,
            metadata,
            tag_block,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn message_type(&self) -> u8 {
        self.header.message_type
    }

    pub fn repeat_indicator(&self) -> u8 {
        self.header.repeat_indicator
    }

    pub fn source_mmsi(&self) -> Mmsi {
        self.header.source_mmsi
    }

    pub fn body(&self) -> &MessageBody {
        &self.body
    }

    /// The sentences the message was decoded from, in fragment order.
    pub fn nmea_messages(&self) -> &[NmeaSentence] {
        &self.sentences
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    pub fn tag_block(&self) -> Option<&TagBlock> {
        self.tag_block.as_ref()
    }

    /// The assembled payload bits, header included.
    pub fn bits(&self) -> &BitSequence {
        &self.bits
    }

    /// Slot allocation state of the sender, for message types carrying a radio status.
    pub fn communication_state(&self) -> Option<CommunicationState> {
        match &self.body {
            MessageBody::PositionReportScheduled(report)
            | MessageBody::PositionReportAssigned(report) => {
                Some(CommunicationState::sotdma(report.radio_status))
            }
            MessageBody::PositionReportResponse(report) => {
                Some(CommunicationState::itdma(report.radio_status))
            }
            MessageBody::BaseStationReport(report) | MessageBody::UtcResponse(report) => {
                Some(CommunicationState::sotdma(report.radio_status))
            }
            MessageBody::SarAircraftPosition(report) => Some(report.communication_state()),
            MessageBody::StandardClassBPosition(report) => report.communication_state(),
            MessageBody::MultipleSlotBinary(message) => Some(message.communication_state()),
            _ => None,
        }
    }
}
