/// BACnet property identifiers.
///
/// The properties the datatype schema knows about are named variants;
/// vendor-specific or unrecognised identifiers use
/// [`Proprietary`](Self::Proprietary).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PropertyId {
    ActiveText,
    ApplicationSoftwareVersion,
    CovIncrement,
    Description,
    DeviceType,
    EventState,
    FirmwareRevision,
    InactiveText,
    LocalDate,
    LocalTime,
    Location,
    MaxApduLengthAccepted,
    MaxPresValue,
    MinPresValue,
    ModelName,
    NumberOfStates,
    ObjectIdentifier,
    ObjectList,
    ObjectName,
    ObjectType,
    OutOfService,
    Polarity,
    /// Read when a point names no property.
    #[default]
    PresentValue,
    PriorityArray,
    ProtocolVersion,
    Reliability,
    RelinquishDefault,
    Resolution,
    SegmentationSupported,
    StateText,
    StatusFlags,
    SystemStatus,
    Units,
    VendorIdentifier,
    VendorName,
    Proprietary(u32),
}

const KNOWN: [(PropertyId, u32, &str); 35] = [
    (PropertyId::ActiveText, 4, "activeText"),
    (PropertyId::ApplicationSoftwareVersion, 12, "applicationSoftwareVersion"),
    (PropertyId::CovIncrement, 22, "covIncrement"),
    (PropertyId::Description, 28, "description"),
    (PropertyId::DeviceType, 31, "deviceType"),
    (PropertyId::EventState, 36, "eventState"),
    (PropertyId::FirmwareRevision, 44, "firmwareRevision"),
    (PropertyId::InactiveText, 46, "inactiveText"),
    (PropertyId::LocalDate, 56, "localDate"),
    (PropertyId::LocalTime, 57, "localTime"),
    (PropertyId::Location, 58, "location"),
    (PropertyId::MaxApduLengthAccepted, 62, "maxApduLengthAccepted"),
    (PropertyId::MaxPresValue, 65, "maxPresValue"),
    (PropertyId::MinPresValue, 69, "minPresValue"),
    (PropertyId::ModelName, 70, "modelName"),
    (PropertyId::NumberOfStates, 74, "numberOfStates"),
    (PropertyId::ObjectIdentifier, 75, "objectIdentifier"),
    (PropertyId::ObjectList, 76, "objectList"),
    (PropertyId::ObjectName, 77, "objectName"),
    (PropertyId::ObjectType, 79, "objectType"),
    (PropertyId::OutOfService, 81, "outOfService"),
    (PropertyId::Polarity, 84, "polarity"),
    (PropertyId::PresentValue, 85, "presentValue"),
    (PropertyId::PriorityArray, 87, "priorityArray"),
    (PropertyId::ProtocolVersion, 98, "protocolVersion"),
    (PropertyId::Reliability, 103, "reliability"),
    (PropertyId::RelinquishDefault, 104, "relinquishDefault"),
    (PropertyId::Resolution, 106, "resolution"),
    (PropertyId::SegmentationSupported, 107, "segmentationSupported"),
    (PropertyId::StateText, 110, "stateText"),
    (PropertyId::StatusFlags, 111, "statusFlags"),
    (PropertyId::SystemStatus, 112, "systemStatus"),
    (PropertyId::Units, 117, "units"),
    (PropertyId::VendorIdentifier, 120, "vendorIdentifier"),
    (PropertyId::VendorName, 121, "vendorName"),
];

impl PropertyId {
    pub fn to_u32(self) -> u32 {
        if let Self::Proprietary(v) = self {
            return v;
        }
        KNOWN
            .iter()
            .find(|(id, _, _)| *id == self)
            .map_or(u32::MAX, |(_, raw, _)| *raw)
    }

    pub fn from_u32(value: u32) -> Self {
        KNOWN
            .iter()
            .find(|(_, raw, _)| *raw == value)
            .map_or(Self::Proprietary(value), |(id, _, _)| *id)
    }

    /// camelCase name, `None` for identifiers outside the known set.
    pub fn name(self) -> Option<&'static str> {
        KNOWN
            .iter()
            .find(|(id, _, _)| *id == self)
            .map(|(_, _, name)| *name)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        KNOWN
            .iter()
            .find(|(_, _, n)| *n == name)
            .map(|(id, _, _)| *id)
    }
}
