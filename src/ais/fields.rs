//! Field types and code tables shared by the message layouts.

use std::fmt;

use crate::{BitError, BitParse, BitReader, FromBits};

/// Value of the longitude field when no position is available (181°).
const LONGITUDE_NOT_AVAILABLE: i32 = 181 * 600_000;
/// Value of the latitude field when no position is available (91°).
const LATITUDE_NOT_AVAILABLE: i32 = 91 * 600_000;

/// Maritime Mobile Service Identity.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Mmsi(pub u32);

impl Mmsi {
    /// Craft associated with a parent ship use MMSIs of the form `98MIDxxxx`.
    pub fn is_auxiliary_craft(&self) -> bool {
        self.0 / 10_000_000 == 98
    }
}

impl fmt::Display for Mmsi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:09}", self.0)
    }
}

impl From<u32> for Mmsi {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Mmsi> for u32 {
    fn from(value: Mmsi) -> Self {
        value.0
    }
}

impl FromBits for Mmsi {
    fn from_bits(bits: &mut BitReader<'_>, width: usize) -> Result<Self, BitError> {
        u32::from_bits(bits, width).map(Mmsi)
    }
}

/// Longitude in 1/10000 minute, `None` for 181°.
pub(crate) fn longitude(raw: i32) -> Option<f64> {
    (raw != LONGITUDE_NOT_AVAILABLE).then(|| raw as f64 / 600_000.0)
}

/// Latitude in 1/10000 minute, `None` for 91°.
pub(crate) fn latitude(raw: i32) -> Option<f64> {
    (raw != LATITUDE_NOT_AVAILABLE).then(|| raw as f64 / 600_000.0)
}

/// Low resolution longitude in 1/10 minute, `None` for 181°.
pub(crate) fn coarse_longitude(raw: i32) -> Option<f64> {
    (raw != LONGITUDE_NOT_AVAILABLE / 1000).then(|| raw as f64 / 600.0)
}

/// Low resolution latitude in 1/10 minute, `None` for 91°.
pub(crate) fn coarse_latitude(raw: i32) -> Option<f64> {
    (raw != LATITUDE_NOT_AVAILABLE / 1000).then(|| raw as f64 / 600.0)
}

/// Speed over ground in 1/10 knot, `None` for 1023.
pub(crate) fn speed(raw: u16) -> Option<f32> {
    (raw != 1023).then(|| raw as f32 / 10.0)
}

/// Course over ground in 1/10 degree, `None` for 3600 and above.
pub(crate) fn course(raw: u16) -> Option<f32> {
    (raw < 3600).then(|| raw as f32 / 10.0)
}

/// Draught in 1/10 meter, `None` for 0.
pub(crate) fn draught(raw: u8) -> Option<f32> {
    (raw != 0).then(|| raw as f32 / 10.0)
}

/// Rate of turn indicator, `None` for -128.
pub(crate) fn rate_of_turn(raw: i8) -> Option<i8> {
    (raw != i8::MIN).then_some(raw)
}

/// `None` for the all-zero value.
pub(crate) fn nonzero<T: Default + PartialEq>(raw: T) -> Option<T> {
    (raw != T::default()).then_some(raw)
}

/// `None` for values of `LIMIT` and above.
pub(crate) fn below<const LIMIT: u16, T: Into<u16> + Copy>(raw: T) -> Option<T> {
    (raw.into() < LIMIT).then_some(raw)
}

/// `None` when all bits of a `WIDTH`-bit field are set.
pub(crate) fn not_all_ones<const WIDTH: u32, T: Into<u16> + Copy>(raw: T) -> Option<T> {
    (raw.into() != (1 << WIDTH) - 1).then_some(raw)
}

/// Dimensions of the ship from the reference point of the reported position, in meters.
///
/// ```text
///          bow
///           ^
///           A
///      <-C--+--D->
///           B
///           v
///         stern
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(BitParse, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    /// A
    #[ais(bits(9))]
    pub to_bow: u16,
    /// B
    #[ais(bits(9))]
    pub to_stern: u16,
    /// C
    #[ais(bits(6))]
    pub to_port: u8,
    /// D
    #[ais(bits(6))]
    pub to_starboard: u8,
}

impl Dimensions {
    pub fn length(&self) -> u16 {
        self.to_bow + self.to_stern
    }

    pub fn beam(&self) -> u16 {
        self.to_port as u16 + self.to_starboard as u16
    }
}

/// Estimated time of arrival, in UTC. The year is not transmitted.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(BitParse, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Eta {
    #[ais(bits(4), parse_as(u8), map(nonzero))]
    pub month: Option<u8>,
    #[ais(bits(5), parse_as(u8), map(nonzero))]
    pub day: Option<u8>,
    #[ais(bits(5), parse_as(u8), map(below::<24, _>))]
    pub hour: Option<u8>,
    #[ais(bits(6), parse_as(u8), map(below::<60, _>))]
    pub minute: Option<u8>,
}

/// Rectangular area in 1/10 minute resolution, used by channel management and group
/// assignment messages.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(BitParse, Debug, Default, Clone, Copy, PartialEq)]
pub struct Area {
    #[ais(bits(18), parse_as(i32), map(coarse_longitude))]
    pub northeast_longitude: Option<f64>,
    #[ais(bits(17), parse_as(i32), map(coarse_latitude))]
    pub northeast_latitude: Option<f64>,
    #[ais(bits(18), parse_as(i32), map(coarse_longitude))]
    pub southwest_longitude: Option<f64>,
    #[ais(bits(17), parse_as(i32), map(coarse_latitude))]
    pub southwest_latitude: Option<f64>,
}

/// Declares a code table read from an unsigned field.
///
/// Codes without a listed variant are kept in `Other`.
macro_rules! ais_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $code:literal => $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )*
            /// Reserved or unassigned code
            Other(u8),
        }

        impl From<u8> for $name {
            fn from(code: u8) -> Self {
                match code {
                    $($code => Self::$variant,)*
                    other => Self::Other(other),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> Self {
                match value {
                    $($name::$variant => $code,)*
                    $name::Other(other) => other,
                }
            }
        }
    };
}

ais_enum! {
    /// Navigational status of a class A station
    pub enum NavigationStatus {
        /// 0 - Under way using engine
        0 => UnderwayUsingEngine,
        /// 1 - At anchor
        1 => AtAnchor,
        /// 2 - Not under command
        2 => NotUnderCommand,
        /// 3 - Restricted manoeuverability
        3 => RestrictedManeuverability,
        /// 4 - Constrained by her draught
        4 => ConstrainedByDraught,
        /// 5 - Moored
        5 => Moored,
        /// 6 - Aground
        6 => Aground,
        /// 7 - Engaged in fishing
        7 => EngagedInFishing,
        /// 8 - Under way sailing
        8 => UnderwaySailing,
        /// 11 - Power-driven vessel towing astern
        11 => TowingAstern,
        /// 12 - Power-driven vessel pushing ahead or towing alongside
        12 => PushingAhead,
        /// 14 - AIS-SART, MOB-AIS or EPIRB-AIS active
        14 => SartActive,
        /// 15 - Not defined (default)
        15 => NotDefined,
    }
}

ais_enum! {
    /// Special manoeuvre indicator
    pub enum ManeuverIndicator {
        /// 0 - Not available (default)
        0 => NotAvailable,
        /// 1 - No special manoeuvre
        1 => NoSpecialManeuver,
        /// 2 - Special manoeuvre, such as regional passing arrangement
        2 => SpecialManeuver,
    }
}

ais_enum! {
    /// Type of electronic position fixing device (EPFD)
    pub enum PositionFixingDevice {
        /// 0 - Undefined (default)
        0 => Undefined,
        /// 1 - GPS
        1 => Gps,
        /// 2 - GLONASS
        2 => Glonass,
        /// 3 - Combined GPS/GLONASS
        3 => GpsGlonass,
        /// 4 - Loran-C
        4 => LoranC,
        /// 5 - Chayka
        5 => Chayka,
        /// 6 - Integrated navigation system
        6 => IntegratedNavigationSystem,
        /// 7 - Surveyed
        7 => Surveyed,
        /// 8 - Galileo
        8 => Galileo,
        /// 15 - Internal GNSS
        15 => InternalGnss,
    }
}

ais_enum! {
    /// Type of aid to navigation
    pub enum AidType {
        /// 0 - Not specified (default)
        0 => Unspecified,
        /// 1 - Reference point
        1 => ReferencePoint,
        /// 2 - RACON (radar transponder marking a navigation hazard)
        2 => Racon,
        /// 3 - Fixed structure off shore, such as oil platforms or wind farms
        3 => FixedStructure,
        /// 5 - Light, without sectors
        5 => Light,
        /// 6 - Light, with sectors
        6 => LightWithSectors,
        /// 7 - Leading light front
        7 => LeadingLightFront,
        /// 8 - Leading light rear
        8 => LeadingLightRear,
        /// 9 - Beacon, cardinal N
        9 => BeaconCardinalNorth,
        /// 10 - Beacon, cardinal E
        10 => BeaconCardinalEast,
        /// 11 - Beacon, cardinal S
        11 => BeaconCardinalSouth,
        /// 12 - Beacon, cardinal W
        12 => BeaconCardinalWest,
        /// 13 - Beacon, port hand
        13 => BeaconPortHand,
        /// 14 - Beacon, starboard hand
        14 => BeaconStarboardHand,
        /// 15 - Beacon, preferred channel port hand
        15 => BeaconPreferredChannelPortHand,
        /// 16 - Beacon, preferred channel starboard hand
        16 => BeaconPreferredChannelStarboardHand,
        /// 17 - Beacon, isolated danger
        17 => BeaconIsolatedDanger,
        /// 18 - Beacon, safe water
        18 => BeaconSafeWater,
        /// 19 - Beacon, special mark
        19 => BeaconSpecialMark,
        /// 20 - Cardinal mark N
        20 => CardinalNorth,
        /// 21 - Cardinal mark E
        21 => CardinalEast,
        /// 22 - Cardinal mark S
        22 => CardinalSouth,
        /// 23 - Cardinal mark W
        23 => CardinalWest,
        /// 24 - Port hand mark
        24 => PortHand,
        /// 25 - Starboard hand mark
        25 => StarboardHand,
        /// 26 - Preferred channel port hand
        26 => PreferredChannelPortHand,
        /// 27 - Preferred channel starboard hand
        27 => PreferredChannelStarboardHand,
        /// 28 - Isolated danger
        28 => IsolatedDanger,
        /// 29 - Safe water
        29 => SafeWater,
        /// 30 - Special mark
        30 => SpecialMark,
        /// 31 - Light vessel, LANBY or rig
        31 => LightVessel,
    }
}

ais_enum! {
    /// Station type addressed by a group assignment
    pub enum StationType {
        /// 0 - All types of mobiles (default)
        0 => All,
        /// 2 - All types of class B mobile stations
        2 => ClassB,
        /// 3 - SAR airborne mobile station
        3 => SarAirborne,
        /// 4 - Aid to navigation station
        4 => AidToNavigation,
        /// 5 - Class B shipborne mobile station
        5 => ClassBShipborne,
        /// 6 - Regional use
        6 => Regional6,
        /// 7 - Regional use
        7 => Regional7,
        /// 8 - Regional use
        8 => Regional8,
        /// 9 - Regional use
        9 => Regional9,
    }
}

ais_enum! {
    /// Transmit/receive mode for channel management and group assignment
    pub enum TxRxMode {
        /// 0 - Tx A/Tx B, Rx A/Rx B (default)
        0 => TxAbRxAb,
        /// 1 - Tx A, Rx A/Rx B
        1 => TxARxAb,
        /// 2 - Tx B, Rx A/Rx B
        2 => TxBRxAb,
    }
}

ais_enum! {
    /// Synchronization state of the transmitting station
    pub enum SyncState {
        /// 0 - UTC direct
        0 => UtcDirect,
        /// 1 - UTC indirect
        1 => UtcIndirect,
        /// 2 - Synchronized to a base station
        2 => BaseStation,
        /// 3 - Synchronized to another station based on the highest number of received stations
        3 => PeerStation,
    }
}

/// Type of ship and cargo, as transmitted.
///
/// ```rust
/// use aivdm_parser::{ShipCategory, ShipType};
///
/// assert_eq!(ShipType(70).category(), ShipCategory::Cargo);
/// assert_eq!(ShipType(84).category(), ShipCategory::Tanker);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShipType(pub u8);

/// Broad category of a [`ShipType`] code.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShipCategory {
    NotAvailable,
    Reserved,
    WingInGround,
    Fishing,
    Towing,
    /// Towing with a tow longer than 200 m or wider than 25 m
    TowingLarge,
    Dredging,
    Diving,
    Military,
    Sailing,
    PleasureCraft,
    HighSpeedCraft,
    PilotVessel,
    SearchAndRescue,
    Tug,
    PortTender,
    AntiPollution,
    LawEnforcement,
    LocalVessel,
    MedicalTransport,
    /// Noncombatant ship according to RR Resolution No. 18
    Noncombatant,
    Passenger,
    Cargo,
    Tanker,
    Other,
}

impl ShipType {
    pub fn category(&self) -> ShipCategory {
        match self.0 {
            0 => ShipCategory::NotAvailable,
            20..=29 => ShipCategory::WingInGround,
            30 => ShipCategory::Fishing,
            31 => ShipCategory::Towing,
            32 => ShipCategory::TowingLarge,
            33 => ShipCategory::Dredging,
            34 => ShipCategory::Diving,
            35 => ShipCategory::Military,
            36 => ShipCategory::Sailing,
            37 => ShipCategory::PleasureCraft,
            40..=49 => ShipCategory::HighSpeedCraft,
            50 => ShipCategory::PilotVessel,
            51 => ShipCategory::SearchAndRescue,
            52 => ShipCategory::Tug,
            53 => ShipCategory::PortTender,
            54 => ShipCategory::AntiPollution,
            55 => ShipCategory::LawEnforcement,
            56 | 57 => ShipCategory::LocalVessel,
            58 => ShipCategory::MedicalTransport,
            59 => ShipCategory::Noncombatant,
            60..=69 => ShipCategory::Passenger,
            70..=79 => ShipCategory::Cargo,
            80..=89 => ShipCategory::Tanker,
            90..=99 => ShipCategory::Other,
            _ => ShipCategory::Reserved,
        }
    }
}

impl From<u8> for ShipType {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

/// State of the TDMA slot allocation of the transmitting station, decoded from the
/// radio status field.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommunicationState {
    Sotdma(SotdmaState),
    Itdma(ItdmaState),
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SotdmaState {
    pub sync_state: SyncState,
    /// Frames left until a new slot is selected
    pub slot_timeout: u8,
    pub sub_message: SotdmaSubMessage,
}

/// Content of the SOTDMA sub message, which depends on the slot timeout.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SotdmaSubMessage {
    /// Timeout 0
    SlotOffset(u16),
    /// Timeout 1
    UtcHourMinute { hour: u8, minute: u8 },
    /// Timeout 2, 4 and 6
    SlotNumber(u16),
    /// Timeout 3, 5 and 7
    ReceivedStations(u16),
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItdmaState {
    pub sync_state: SyncState,
    pub slot_increment: u16,
    pub number_of_slots: u8,
    pub keep_flag: bool,
}

impl CommunicationState {
    /// Decodes a 19-bit SOTDMA state.
    pub fn sotdma(raw: u32) -> Self {
        let sync_state = SyncState::from((raw >> 17 & 0b11) as u8);
        let slot_timeout = (raw >> 14 & 0b111) as u8;
        let sub = (raw & 0x3FFF) as u16;

        let sub_message = match slot_timeout {
            0 => SotdmaSubMessage::SlotOffset(sub),
            1 => SotdmaSubMessage::UtcHourMinute {
                hour: (sub >> 9 & 0x1F) as u8,
                minute: (sub >> 2 & 0x7F) as u8,
            },
            2 | 4 | 6 => SotdmaSubMessage::SlotNumber(sub),
            _ => SotdmaSubMessage::ReceivedStations(sub),
        };

        Self::Sotdma(SotdmaState {
            sync_state,
            slot_timeout,
            sub_message,
        })
    }

    /// Decodes a 19-bit ITDMA state.
    pub fn itdma(raw: u32) -> Self {
        Self::Itdma(ItdmaState {
            sync_state: SyncState::from((raw >> 17 & 0b11) as u8),
            slot_increment: (raw >> 4 & 0x1FFF) as u16,
            number_of_slots: (raw >> 1 & 0b111) as u8,
            keep_flag: raw & 1 == 1,
        })
    }

    /// Decodes a 20-bit radio status whose leading bit selects ITDMA (1) or SOTDMA (0).
    pub fn selected(raw: u32) -> Self {
        let state = raw & 0x7FFFF;
        if raw >> 19 & 1 == 1 {
            Self::itdma(state)
        } else {
            Self::sotdma(state)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mmsi() {
        assert_eq!(Mmsi(3669708).to_string(), "003669708");
        assert!(Mmsi(984123456).is_auxiliary_craft());
        assert!(!Mmsi(219997000).is_auxiliary_craft());
    }

    #[test]
    fn test_sentinels() {
        assert_eq!(longitude(108_600_000), None);
        assert_eq!(latitude(54_600_000), None);
        assert_eq!(longitude(6_000_000), Some(10.0));
        assert_eq!(latitude(-600_000), Some(-1.0));
        assert_eq!(coarse_longitude(108_600), None);
        assert_eq!(coarse_latitude(54_600), None);
        assert_eq!(coarse_longitude(-600), Some(-1.0));
        assert_eq!(speed(1023), None);
        assert_eq!(speed(101), Some(10.1));
        assert_eq!(course(3600), None);
        assert_eq!(course(3082), Some(308.2));
        assert_eq!(rate_of_turn(-128), None);
        assert_eq!(rate_of_turn(-127), Some(-127));
        assert_eq!(below::<24, u8>(24), None);
        assert_eq!(below::<24, u8>(23), Some(23));
        assert_eq!(not_all_ones::<9, u16>(511), None);
        assert_eq!(not_all_ones::<6, u8>(62), Some(62));
        assert_eq!(nonzero(0u32), None);
        assert_eq!(draught(32), Some(3.2));
    }

    #[test]
    fn test_code_tables() {
        assert_eq!(NavigationStatus::from(5), NavigationStatus::Moored);
        assert_eq!(NavigationStatus::from(9), NavigationStatus::Other(9));
        assert_eq!(u8::from(NavigationStatus::NotDefined), 15);
        assert_eq!(u8::from(NavigationStatus::Other(13)), 13);
        assert_eq!(PositionFixingDevice::from(15), PositionFixingDevice::InternalGnss);
        assert_eq!(ShipType(0).category(), ShipCategory::NotAvailable);
        assert_eq!(ShipType(37).category(), ShipCategory::PleasureCraft);
        assert_eq!(ShipType(120).category(), ShipCategory::Reserved);
    }

    #[test]
    fn test_communication_state() {
        assert_eq!(
            CommunicationState::sotdma(81994),
            CommunicationState::Sotdma(SotdmaState {
                sync_state: SyncState::UtcDirect,
                slot_timeout: 5,
                sub_message: SotdmaSubMessage::ReceivedStations(74),
            })
        );

        // Timeout 1 carries the UTC hour and minute.
        let raw = (1 << 14) | (13 << 9) | (45 << 2);
        assert_eq!(
            CommunicationState::sotdma(raw),
            CommunicationState::Sotdma(SotdmaState {
                sync_state: SyncState::UtcDirect,
                slot_timeout: 1,
                sub_message: SotdmaSubMessage::UtcHourMinute {
                    hour: 13,
                    minute: 45
                },
            })
        );

        let raw = (1 << 19) | (2 << 17) | (1000 << 4) | (3 << 1) | 1;
        assert_eq!(
            CommunicationState::selected(raw),
            CommunicationState::Itdma(ItdmaState {
                sync_state: SyncState::BaseStation,
                slot_increment: 1000,
                number_of_slots: 3,
                keep_flag: true,
            })
        );
    }
}
