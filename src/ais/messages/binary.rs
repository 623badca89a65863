#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    BinaryData, BitError, BitParse, BitReader, DecodeError,
    ais::fields::{CommunicationState, Mmsi},
};

/// Type 6 - Binary Addressed Message
///
/// <https://gpsd.gitlab.io/gpsd/AIVDM.html#_type_6_binary_addressed_message>
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, PartialEq, Eq)]
#[ais(min_len(88))]
pub struct BinaryAddressed {
    #[ais(bits(2))]
    pub sequence_number: u8,
    #[ais(bits(30))]
    pub destination: Mmsi,
    #[ais(bits(1), skip_after(1))]
    pub retransmitted: bool,
    /// Designated area code
    #[ais(bits(10))]
    pub dac: u16,
    /// Functional id
    #[ais(bits(6))]
    pub fid: u8,
    #[ais(parser(BitReader::read_binary_to_end))]
    pub data: BinaryData,
}

/// Type 8 - Binary Broadcast Message
///
/// <https://gpsd.gitlab.io/gpsd/AIVDM.html#_type_8_binary_broadcast_message>
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, PartialEq, Eq)]
#[ais(min_len(56))]
pub struct BinaryBroadcast {
    #[ais(bits(10), skip_before(2))]
    pub dac: u16,
    #[ais(bits(6))]
    pub fid: u8,
    #[ais(parser(BitReader::read_binary_to_end))]
    pub data: BinaryData,
}

/// Types 7 and 13 - Binary Acknowledge and Safety Related Acknowledge
///
/// <https://gpsd.gitlab.io/gpsd/AIVDM.html#_type_7_binary_acknowledge>
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, PartialEq, Eq)]
#[ais(min_len(72))]
pub struct Acknowledge {
    /// One to four acknowledged stations
    #[ais(parser(acknowledgements), skip_before(2))]
    pub acknowledgements: heapless::Vec<Acknowledgement, 4>,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acknowledgement {
    #[ais(bits(30))]
    pub mmsi: Mmsi,
    #[ais(bits(2))]
    pub sequence_number: u8,
}

fn acknowledgements(
    bits: &mut BitReader<'_>,
) -> Result<heapless::Vec<Acknowledgement, 4>, DecodeError> {
    let mut acknowledgements = heapless::Vec::new();
    while !acknowledgements.is_full() && bits.remaining() >= 32 {
        let acknowledgement = Acknowledgement::parse(bits)?;
        if acknowledgements.push(acknowledgement).is_err() {
            break;
        }
    }
    Ok(acknowledgements)
}

/// Type 25 - Single Slot Binary Message
///
/// <https://gpsd.gitlab.io/gpsd/AIVDM.html#_type_25_single_slot_binary_message>
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, PartialEq, Eq)]
#[ais(min_len(40))]
pub struct SingleSlotBinary {
    #[ais(bits(1))]
    pub addressed: bool,
    /// Data starts with a 16-bit application id
    #[ais(bits(1), post_exec(require_flagged(ais_bits, addressed, structured, 0)?;))]
    pub structured: bool,
    #[ais(cond(addressed), bits(30))]
    pub destination: Option<Mmsi>,
    #[ais(cond(structured), bits(16))]
    pub application_id: Option<u16>,
    #[ais(parser(BitReader::read_binary_to_end))]
    pub data: BinaryData,
}

/// Type 26 - Multiple Slot Binary Message
///
/// <https://gpsd.gitlab.io/gpsd/AIVDM.html#_type_26_multiple_slot_binary_message>
///
/// Laid out like type 25, with a 20-bit radio status after the data.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, PartialEq, Eq)]
#[ais(min_len(60))]
pub struct MultipleSlotBinary {
    #[ais(bits(1))]
    pub addressed: bool,
    #[ais(bits(1), post_exec(require_flagged(ais_bits, addressed, structured, 20)?;))]
    pub structured: bool,
    #[ais(cond(addressed), bits(30))]
    pub destination: Option<Mmsi>,
    #[ais(cond(structured), bits(16))]
    pub application_id: Option<u16>,
    #[ais(parser(data_before_radio_status))]
    pub data: BinaryData,
    #[ais(bits(20))]
    pub radio_status: u32,
}

impl MultipleSlotBinary {
    pub fn communication_state(&self) -> CommunicationState {
        CommunicationState::selected(self.radio_status)
    }
}

/// Checks the payload holds the destination and application id its flags announce,
/// followed by `trailer` bits.
fn require_flagged(
    bits: &BitReader<'_>,
    addressed: bool,
    structured: bool,
    trailer: usize,
) -> Result<(), DecodeError> {
    let mut required = bits.position() + trailer;
    if addressed {
        required += 30;
    }
    if structured {
        required += 16;
    }
    bits.require(required)
}

fn data_before_radio_status(bits: &mut BitReader<'_>) -> Result<BinaryData, BitError> {
    bits.read_binary(bits.remaining().saturating_sub(20))
}
