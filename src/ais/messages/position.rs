#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    BitParse,
    ais::fields::{
        CommunicationState, Dimensions, ManeuverIndicator, NavigationStatus, PositionFixingDevice,
        ShipType, below, coarse_latitude, coarse_longitude, course, latitude, longitude,
        not_all_ones, rate_of_turn, speed,
    },
};

/// Types 1, 2 and 3 - Position Report Class A
///
/// <https://gpsd.gitlab.io/gpsd/AIVDM.html#_types_1_2_and_3_position_report_class_a>
///
/// Type 1 is a scheduled report, type 2 an assigned scheduled report and type 3 a
/// response to an interrogation. Types 1 and 2 carry a SOTDMA radio status, type 3 an
/// ITDMA one.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, PartialEq)]
#[ais(min_len(168))]
pub struct PositionReport {
    #[ais(bits(4), parse_as(u8), into)]
    pub navigation_status: NavigationStatus,
    /// Rate of turn indicator, `ROT = 4.733 * sqrt(degrees per minute)`.
    ///
    /// ±127 means turning faster than 5° per 30 s without a turn indicator.
    #[ais(bits(8), parse_as(i8), map(rate_of_turn))]
    pub rate_of_turn: Option<i8>,
    /// Speed over ground in knots
    #[ais(bits(10), parse_as(u16), map(speed))]
    pub speed_over_ground: Option<f32>,
    /// `true` for a DGPS-quality fix with an accuracy below 10 m
    #[ais(bits(1))]
    pub position_accuracy: bool,
    /// Longitude in degrees
    #[ais(bits(28), parse_as(i32), map(longitude))]
    pub longitude: Option<f64>,
    /// Latitude in degrees
    #[ais(bits(27), parse_as(i32), map(latitude))]
    pub latitude: Option<f64>,
    /// Course over ground in degrees
    #[ais(bits(12), parse_as(u16), map(course))]
    pub course_over_ground: Option<f32>,
    /// True heading in degrees
    #[ais(bits(9), parse_as(u16), map(not_all_ones::<9, _>))]
    pub true_heading: Option<u16>,
    /// Second of the UTC minute the report was generated
    #[ais(bits(6), parse_as(u8), map(below::<60, _>))]
    pub second: Option<u8>,
    #[ais(bits(2), parse_as(u8), into)]
    pub maneuver_indicator: ManeuverIndicator,
    #[ais(bits(1), skip_before(3))]
    pub raim: bool,
    #[ais(bits(19))]
    pub radio_status: u32,
}

impl PositionReport {
    /// Rate of turn in degrees per minute, signed like the indicator.
    ///
    /// `None` when not available or when the turn rate exceeds what the indicator can
    /// express.
    pub fn rate_of_turn_degrees(&self) -> Option<f32> {
        let indicator = self.rate_of_turn.filter(|rot| rot.unsigned_abs() <= 126)?;
        let rate = (indicator as f32 / 4.733).powi(2);
        Some(rate.copysign(indicator as f32))
    }
}

/// Type 9 - Standard SAR Aircraft Position Report
///
/// <https://gpsd.gitlab.io/gpsd/AIVDM.html#_type_9_standard_sar_aircraft_position_report>
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, PartialEq)]
#[ais(min_len(168))]
pub struct SarAircraftPosition {
    /// Altitude in meters, 4094 for 4094 m or higher
    #[ais(bits(12), parse_as(u16), map(not_all_ones::<12, _>))]
    pub altitude: Option<u16>,
    /// Speed over ground in whole knots, 1022 for 1022 knots or higher
    #[ais(bits(10), parse_as(u16), map(not_all_ones::<10, _>))]
    pub speed_over_ground: Option<u16>,
    #[ais(bits(1))]
    pub position_accuracy: bool,
    #[ais(bits(28), parse_as(i32), map(longitude))]
    pub longitude: Option<f64>,
    #[ais(bits(27), parse_as(i32), map(latitude))]
    pub latitude: Option<f64>,
    #[ais(bits(12), parse_as(u16), map(course))]
    pub course_over_ground: Option<f32>,
    #[ais(bits(6), parse_as(u8), map(below::<60, _>))]
    pub second: Option<u8>,
    #[ais(bits(8))]
    pub regional_reserved: u8,
    /// Data terminal equipment, `false` when ready
    #[ais(bits(1))]
    pub dte: bool,
    #[ais(bits(1), skip_before(3))]
    pub assigned: bool,
    #[ais(bits(1))]
    pub raim: bool,
    /// Radio status, leading bit selects ITDMA over SOTDMA
    #[ais(bits(20))]
    pub radio_status: u32,
}

impl SarAircraftPosition {
    pub fn communication_state(&self) -> CommunicationState {
        CommunicationState::selected(self.radio_status)
    }
}

/// Type 18 - Standard Class B CS Position Report
///
/// <https://gpsd.gitlab.io/gpsd/AIVDM.html#_type_18_standard_class_b_cs_position_report>
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, PartialEq)]
#[ais(min_len(168))]
pub struct StandardClassBPosition {
    #[ais(bits(10), parse_as(u16), map(speed), skip_before(8))]
    pub speed_over_ground: Option<f32>,
    #[ais(bits(1))]
    pub position_accuracy: bool,
    #[ais(bits(28), parse_as(i32), map(longitude))]
    pub longitude: Option<f64>,
    #[ais(bits(27), parse_as(i32), map(latitude))]
    pub latitude: Option<f64>,
    #[ais(bits(12), parse_as(u16), map(course))]
    pub course_over_ground: Option<f32>,
    #[ais(bits(9), parse_as(u16), map(not_all_ones::<9, _>))]
    pub true_heading: Option<u16>,
    #[ais(bits(6), parse_as(u8), map(below::<60, _>))]
    pub second: Option<u8>,
    #[ais(bits(2))]
    pub regional_reserved: u8,
    /// `true` for a carrier sense unit, `false` for a SOTDMA unit
    #[ais(bits(1))]
    pub cs_unit: bool,
    /// Unit has an integrated display
    #[ais(bits(1))]
    pub display: bool,
    /// Unit is attached to a VHF radio with DSC
    #[ais(bits(1))]
    pub dsc: bool,
    /// Unit can use the whole marine band
    #[ais(bits(1))]
    pub band: bool,
    /// Unit accepts channel management (type 22) messages
    #[ais(bits(1))]
    pub message_22: bool,
    #[ais(bits(1))]
    pub assigned: bool,
    #[ais(bits(1))]
    pub raim: bool,
    #[ais(bits(20))]
    pub radio_status: u32,
}

impl StandardClassBPosition {
    /// `None` for carrier sense units, whose radio status is a fixed filler.
    pub fn communication_state(&self) -> Option<CommunicationState> {
        (!self.cs_unit).then(|| CommunicationState::selected(self.radio_status))
    }
}

/// Type 19 - Extended Class B CS Position Report
///
/// <https://gpsd.gitlab.io/gpsd/AIVDM.html#_type_19_extended_class_b_cs_position_report>
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, PartialEq)]
#[ais(min_len(312))]
pub struct ExtendedClassBPosition {
    #[ais(bits(10), parse_as(u16), map(speed), skip_before(8))]
    pub speed_over_ground: Option<f32>,
    #[ais(bits(1))]
    pub position_accuracy: bool,
    #[ais(bits(28), parse_as(i32), map(longitude))]
    pub longitude: Option<f64>,
    #[ais(bits(27), parse_as(i32), map(latitude))]
    pub latitude: Option<f64>,
    #[ais(bits(12), parse_as(u16), map(course))]
    pub course_over_ground: Option<f32>,
    #[ais(bits(9), parse_as(u16), map(not_all_ones::<9, _>))]
    pub true_heading: Option<u16>,
    #[ais(bits(6), parse_as(u8), map(below::<60, _>))]
    pub second: Option<u8>,
    #[ais(bits(4))]
    pub regional_reserved: u8,
    #[ais(bits(120))]
    pub vessel_name: String,
    #[ais(bits(8), parse_as(u8), into)]
    pub ship_type: ShipType,
    pub dimensions: Dimensions,
    #[ais(bits(4), parse_as(u8), into)]
    pub position_fixing_device: PositionFixingDevice,
    #[ais(bits(1))]
    pub raim: bool,
    #[ais(bits(1))]
    pub dte: bool,
    #[ais(bits(1), skip_after(4))]
    pub assigned: bool,
}

/// Type 27 - Long Range AIS Broadcast message
///
/// <https://gpsd.gitlab.io/gpsd/AIVDM.html#_type_27_long_range_ais_broadcast_message>
///
/// Positions are reported in 1/10 minute resolution.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, PartialEq)]
#[ais(min_len(96))]
pub struct LongRangeBroadcast {
    #[ais(bits(1))]
    pub position_accuracy: bool,
    #[ais(bits(1))]
    pub raim: bool,
    #[ais(bits(4), parse_as(u8), into)]
    pub navigation_status: NavigationStatus,
    #[ais(bits(18), parse_as(i32), map(coarse_longitude))]
    pub longitude: Option<f64>,
    #[ais(bits(17), parse_as(i32), map(coarse_latitude))]
    pub latitude: Option<f64>,
    /// Speed over ground in whole knots
    #[ais(bits(6), parse_as(u8), map(not_all_ones::<6, _>))]
    pub speed_over_ground: Option<u8>,
    /// Course over ground in whole degrees
    #[ais(bits(9), parse_as(u16), map(not_all_ones::<9, _>))]
    pub course_over_ground: Option<u16>,
    /// `true` when the reported position is older than 5 seconds
    #[ais(bits(1), skip_after(1))]
    pub position_latency: bool,
}
