#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{BitParse, BitReader, DecodeError, ais::fields::Mmsi};

/// Type 15 - Interrogation
///
/// <https://gpsd.gitlab.io/gpsd/AIVDM.html#_type_15_interrogation>
///
/// Requests up to two messages from a first station and one message from a second
/// station. Optional requests are present only when the payload is long enough.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, PartialEq, Eq)]
#[ais(min_len(88))]
pub struct Interrogation {
    #[ais(bits(30), skip_before(2))]
    pub interrogated: Mmsi,
    pub first_request: InterrogationRequest,
    #[ais(cond(ais_bits.remaining() >= 20), parser(after_spare::<InterrogationRequest>))]
    pub second_request: Option<InterrogationRequest>,
    #[ais(cond(ais_bits.remaining() >= 50), parser(after_spare::<SecondStation>))]
    pub second_station: Option<SecondStation>,
}

/// A requested message type and the slot offset for the response.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterrogationRequest {
    #[ais(bits(6))]
    pub message_type: u8,
    #[ais(bits(12))]
    pub slot_offset: u16,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecondStation {
    #[ais(bits(30))]
    pub interrogated: Mmsi,
    pub request: InterrogationRequest,
}

/// Skips the 2 spare bits that precede every optional block.
fn after_spare<T: BitParse>(bits: &mut BitReader<'_>) -> Result<T, DecodeError> {
    bits.skip(2)?;
    T::parse(bits)
}
