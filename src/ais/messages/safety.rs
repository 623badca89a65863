#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{BitParse, BitReader, ais::fields::Mmsi};

/// Type 12 - Addressed Safety-Related Message
///
/// <https://gpsd.gitlab.io/gpsd/AIVDM.html#_type_12_addressed_safety_related_message>
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, PartialEq, Eq)]
#[ais(min_len(72))]
pub struct AddressedSafety {
    #[ais(bits(2))]
    pub sequence_number: u8,
    #[ais(bits(30))]
    pub destination: Mmsi,
    #[ais(bits(1), skip_after(1))]
    pub retransmitted: bool,
    #[ais(parser(BitReader::read_text_to_end))]
    pub text: String,
}

/// Type 14 - Safety-Related Broadcast Message
///
/// <https://gpsd.gitlab.io/gpsd/AIVDM.html#_type_14_safety_related_broadcast_message>
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, PartialEq, Eq)]
#[ais(min_len(40))]
pub struct SafetyBroadcast {
    #[ais(parser(BitReader::read_text_to_end), skip_before(2))]
    pub text: String,
}
