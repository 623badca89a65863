#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    BitParse, BitReader, DecodeError,
    ais::fields::{Dimensions, Eta, Mmsi, PositionFixingDevice, ShipType, draught, nonzero},
};

/// Type 5 - Static and Voyage Related Data
///
/// <https://gpsd.gitlab.io/gpsd/AIVDM.html#_type_5_static_and_voyage_related_data>
///
/// Usually spans two sentences. Some transponders leave out the trailing DTE and spare
/// bits, so the DTE flag is optional.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, PartialEq)]
#[ais(min_len(422))]
pub struct StaticAndVoyageData {
    /// 0 for ITU-R M.1371-1, 1 for -3, 2 for -4 and 3 for future editions
    #[ais(bits(2))]
    pub ais_version: u8,
    #[ais(bits(30), parse_as(u32), map(nonzero))]
    pub imo_number: Option<u32>,
    #[ais(bits(42))]
    pub call_sign: String,
    #[ais(bits(120))]
    pub vessel_name: String,
    #[ais(bits(8), parse_as(u8), into)]
    pub ship_type: ShipType,
    pub dimensions: Dimensions,
    #[ais(bits(4), parse_as(u8), into)]
    pub position_fixing_device: PositionFixingDevice,
    pub eta: Eta,
    /// Draught in meters
    #[ais(bits(8), parse_as(u8), map(draught))]
    pub draught: Option<f32>,
    #[ais(bits(120))]
    pub destination: String,
    /// Data terminal equipment, `false` when ready
    #[ais(cond(ais_bits.remaining() >= 1), bits(1))]
    pub dte: Option<bool>,
}

/// Type 24 - Static Data Report
///
/// <https://gpsd.gitlab.io/gpsd/AIVDM.html#_type_24_static_data_report>
///
/// Class B stations send their static data in two independent parts.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, PartialEq, Eq)]
#[ais(min_len(40))]
#[ais(selector(|bits: &mut BitReader<'_>| bits.read_unsigned(2)))]
#[ais(selection_error(ais_bits.unexpected_value("part_number", ais_selector)))]
pub enum StaticDataReport {
    #[ais(selector(0))]
    PartA(StaticDataPartA),
    #[ais(selector(1))]
    PartB(StaticDataPartB),
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, PartialEq, Eq)]
#[ais(min_len(160))]
pub struct StaticDataPartA {
    #[ais(bits(120))]
    pub vessel_name: String,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, PartialEq, Eq)]
#[ais(min_len(162))]
pub struct StaticDataPartB {
    #[ais(bits(8), parse_as(u8), into)]
    pub ship_type: ShipType,
    /// Manufacturer mnemonic
    #[ais(bits(18))]
    pub vendor_id: String,
    #[ais(bits(4))]
    pub unit_model_code: u8,
    #[ais(bits(20))]
    pub serial_number: u32,
    #[ais(bits(42))]
    pub call_sign: String,
    pub reference: ShipReference,
}

/// Last field of part B: auxiliary craft report their mothership instead of their size.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, Copy, PartialEq, Eq)]
#[ais(selector(auxiliary_craft))]
pub enum ShipReference {
    #[ais(selector(true))]
    Mothership(#[ais(bits(30))] Mmsi),
    #[ais(selector(_))]
    Dimensions(Dimensions),
}

fn auxiliary_craft(bits: &mut BitReader<'_>) -> Result<bool, DecodeError> {
    let mmsi = bits.peek_unsigned(8, 30)?;
    Ok(Mmsi(mmsi as u32).is_auxiliary_craft())
}

impl StaticDataReport {
    pub fn part_number(&self) -> u8 {
        match self {
            Self::PartA(_) => 0,
            Self::PartB(_) => 1,
        }
    }
}
