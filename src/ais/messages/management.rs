#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    BinaryData, BitParse, BitReader, DecodeError,
    ais::fields::{Area, Mmsi, ShipType, StationType, TxRxMode, coarse_latitude, coarse_longitude},
};

/// Type 16 - Assignment Mode Command
///
/// <https://gpsd.gitlab.io/gpsd/AIVDM.html#_type_16_assignment_mode_command>
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, Copy, PartialEq, Eq)]
#[ais(min_len(92))]
pub struct AssignmentModeCommand {
    #[ais(skip_before(2))]
    pub first: Assignment,
    #[ais(cond(ais_bits.remaining() >= 52))]
    pub second: Option<Assignment>,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    #[ais(bits(30))]
    pub destination: Mmsi,
    #[ais(bits(12))]
    pub offset: u16,
    #[ais(bits(10))]
    pub increment: u16,
}

/// Type 17 - DGNSS Broadcast Binary Message
///
/// <https://gpsd.gitlab.io/gpsd/AIVDM.html#_type_17_dgnss_broadcast_binary_message>
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, PartialEq)]
#[ais(min_len(80))]
pub struct DgnssBroadcast {
    /// Longitude of the reference station in degrees
    #[ais(bits(18), parse_as(i32), map(coarse_longitude), skip_before(2))]
    pub longitude: Option<f64>,
    #[ais(bits(17), parse_as(i32), map(coarse_latitude), skip_after(5))]
    pub latitude: Option<f64>,
    /// DGNSS correction data
    #[ais(parser(BitReader::read_binary_to_end))]
    pub data: BinaryData,
}

/// Type 20 - Data Link Management Message
///
/// <https://gpsd.gitlab.io/gpsd/AIVDM.html#_type_20_data_link_management_message>
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, PartialEq, Eq)]
#[ais(min_len(70))]
pub struct DataLinkManagement {
    /// One to four reserved slot blocks
    #[ais(parser(reservations), skip_before(2))]
    pub reservations: heapless::Vec<SlotReservation, 4>,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotReservation {
    #[ais(bits(12))]
    pub offset: u16,
    #[ais(bits(4))]
    pub number_of_slots: u8,
    /// Minutes
    #[ais(bits(3))]
    pub timeout: u8,
    #[ais(bits(11))]
    pub increment: u16,
}

fn reservations(bits: &mut BitReader<'_>) -> Result<heapless::Vec<SlotReservation, 4>, DecodeError> {
    let mut reservations = heapless::Vec::new();
    while !reservations.is_full() && bits.remaining() >= 30 {
        let reservation = SlotReservation::parse(bits)?;
        if reservations.push(reservation).is_err() {
            break;
        }
    }
    Ok(reservations)
}

/// Type 22 - Channel Management
///
/// <https://gpsd.gitlab.io/gpsd/AIVDM.html#_type_22_channel_management>
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, PartialEq)]
#[ais(min_len(145))]
pub struct ChannelManagement {
    #[ais(bits(12), skip_before(2))]
    pub channel_a: u16,
    #[ais(bits(12))]
    pub channel_b: u16,
    #[ais(bits(4), parse_as(u8), into)]
    pub tx_rx_mode: TxRxMode,
    /// `true` for low power
    #[ais(bits(1))]
    pub power: bool,
    pub target: ChannelTarget,
    /// Channel A bandwidth, `true` for 12.5 kHz
    #[ais(bits(1), skip_before(1))]
    pub band_a: bool,
    #[ais(bits(1))]
    pub band_b: bool,
    /// Size of the transitional zone in nautical miles, minus one
    #[ais(bits(3))]
    pub zone_size: u8,
}

/// Area or stations a channel management message applies to, selected by the
/// addressed flag at bit 139.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, Copy, PartialEq)]
#[ais(selector(|bits: &mut BitReader<'_>| bits.peek_unsigned(139, 1)))]
pub enum ChannelTarget {
    #[ais(selector(0))]
    Area(Area),
    #[ais(selector(1))]
    Addressed {
        #[ais(bits(30), skip_after(5))]
        first: Mmsi,
        #[ais(bits(30), skip_after(5))]
        second: Mmsi,
    },
}

/// Type 23 - Group Assignment Command
///
/// <https://gpsd.gitlab.io/gpsd/AIVDM.html#_type_23_group_assignment_command>
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, PartialEq)]
#[ais(min_len(160))]
pub struct GroupAssignment {
    #[ais(skip_before(2))]
    pub area: Area,
    #[ais(bits(4), parse_as(u8), into)]
    pub station_type: StationType,
    #[ais(bits(8), parse_as(u8), into)]
    pub ship_type: ShipType,
    #[ais(bits(2), parse_as(u8), into, skip_before(22))]
    pub tx_rx_mode: TxRxMode,
    /// Reporting interval code, see ITU-R M.1371 table 77
    #[ais(bits(4))]
    pub interval: u8,
    /// Quiet time in minutes, 0 for none
    #[ais(bits(4), skip_after(6))]
    pub quiet_time: u8,
}
