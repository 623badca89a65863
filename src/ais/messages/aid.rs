#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    BitParse, BitReader,
    ais::fields::{AidType, Dimensions, PositionFixingDevice, below, latitude, longitude},
};

/// Type 21 - Aid-to-Navigation Report
///
/// <https://gpsd.gitlab.io/gpsd/AIVDM.html#_type_21_aid_to_navigation_report>
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, PartialEq)]
#[ais(min_len(272))]
pub struct AidToNavigation {
    #[ais(bits(5), parse_as(u8), into)]
    pub aid_type: AidType,
    #[ais(bits(120))]
    pub name: String,
    #[ais(bits(1))]
    pub position_accuracy: bool,
    #[ais(bits(28), parse_as(i32), map(longitude))]
    pub longitude: Option<f64>,
    #[ais(bits(27), parse_as(i32), map(latitude))]
    pub latitude: Option<f64>,
    pub dimensions: Dimensions,
    #[ais(bits(4), parse_as(u8), into)]
    pub position_fixing_device: PositionFixingDevice,
    #[ais(bits(6), parse_as(u8), map(below::<60, _>))]
    pub second: Option<u8>,
    /// Only meaningful for floating aids, when `second` is available
    #[ais(bits(1))]
    pub off_position: bool,
    #[ais(bits(8))]
    pub regional_reserved: u8,
    #[ais(bits(1))]
    pub raim: bool,
    /// `true` for a virtual aid, which has no physical presence
    #[ais(bits(1))]
    pub virtual_aid: bool,
    #[ais(bits(1), skip_after(1))]
    pub assigned: bool,
    /// Continuation of names longer than 20 characters
    #[ais(parser(BitReader::read_text_to_end))]
    pub name_extension: String,
}

impl AidToNavigation {
    pub fn full_name(&self) -> String {
        format!("{}{}", self.name, self.name_extension)
    }
}
