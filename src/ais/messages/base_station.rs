#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};

use crate::{
    BitParse,
    ais::fields::{Mmsi, PositionFixingDevice, below, latitude, longitude, nonzero},
};

/// Types 4 and 11 - Base Station Report and UTC/Date Response
///
/// <https://gpsd.gitlab.io/gpsd/AIVDM.html#_type_4_base_station_report>
///
/// Both carry the UTC date and time of the transmitting station together with its
/// position, and a SOTDMA radio status.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, PartialEq)]
#[ais(min_len(168))]
pub struct BaseStationReport {
    #[ais(bits(14), parse_as(u16), map(nonzero))]
    pub year: Option<u16>,
    #[ais(bits(4), parse_as(u8), map(nonzero))]
    pub month: Option<u8>,
    #[ais(bits(5), parse_as(u8), map(nonzero))]
    pub day: Option<u8>,
    #[ais(bits(5), parse_as(u8), map(below::<24, _>))]
    pub hour: Option<u8>,
    #[ais(bits(6), parse_as(u8), map(below::<60, _>))]
    pub minute: Option<u8>,
    #[ais(bits(6), parse_as(u8), map(below::<60, _>))]
    pub second: Option<u8>,
    #[ais(bits(1))]
    pub position_accuracy: bool,
    #[ais(bits(28), parse_as(i32), map(longitude))]
    pub longitude: Option<f64>,
    #[ais(bits(27), parse_as(i32), map(latitude))]
    pub latitude: Option<f64>,
    #[ais(bits(4), parse_as(u8), into)]
    pub position_fixing_device: PositionFixingDevice,
    #[ais(bits(1), skip_before(10))]
    pub raim: bool,
    #[ais(bits(19))]
    pub radio_status: u32,
}

impl BaseStationReport {
    /// The reported instant, when every date and time field is available and valid.
    pub fn utc(&self) -> Option<OffsetDateTime> {
        let month = Month::try_from(self.month?).ok()?;
        let date = Date::from_calendar_date(self.year? as i32, month, self.day?).ok()?;
        let time = Time::from_hms(self.hour?, self.minute?, self.second?).ok()?;

        Some(PrimitiveDateTime::new(date, time).assume_utc())
    }
}

/// Type 10 - UTC/Date Inquiry
///
/// <https://gpsd.gitlab.io/gpsd/AIVDM.html#_type_10_utc_date_inquiry>
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(BitParse, Debug, Clone, PartialEq, Eq)]
#[ais(min_len(72))]
pub struct UtcInquiry {
    #[ais(bits(30), skip_before(2), skip_after(2))]
    pub destination: Mmsi,
}
