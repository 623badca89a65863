mod aid;
mod base_station;
mod binary;
mod interrogation;
mod management;
mod position;
mod safety;
mod static_data;

pub use aid::AidToNavigation;
pub use base_station::{BaseStationReport, UtcInquiry};
pub use binary::{
    Acknowledge, Acknowledgement, BinaryAddressed, BinaryBroadcast, MultipleSlotBinary,
    SingleSlotBinary,
};
pub use interrogation::{Interrogation, InterrogationRequest, SecondStation};
pub use management::{
    AssignmentModeCommand, Assignment, ChannelManagement, ChannelTarget, DataLinkManagement,
    DgnssBroadcast, GroupAssignment, SlotReservation,
};
pub use position::{
    ExtendedClassBPosition, LongRangeBroadcast, PositionReport, SarAircraftPosition,
    StandardClassBPosition,
};
pub use safety::{AddressedSafety, SafetyBroadcast};
pub use static_data::{
    ShipReference, StaticAndVoyageData, StaticDataPartA, StaticDataPartB, StaticDataReport,
};
