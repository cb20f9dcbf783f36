/// BACnet object type identifiers.
///
/// Known standard types are represented as named variants; proprietary
/// vendor-specific types use the [`Proprietary`](Self::Proprietary) variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    AnalogInput,
    AnalogOutput,
    AnalogValue,
    BinaryInput,
    BinaryOutput,
    BinaryValue,
    Calendar,
    Command,
    Device,
    EventEnrollment,
    File,
    Group,
    Loop,
    MultiStateInput,
    MultiStateOutput,
    NotificationClass,
    Program,
    Schedule,
    Averaging,
    MultiStateValue,
    TrendLog,
    LifeSafetyPoint,
    LifeSafetyZone,
    Accumulator,
    PulseConverter,
    EventLog,
    GlobalGroup,
    TrendLogMultiple,
    LoadControl,
    StructuredView,
    AccessDoor,
    Proprietary(u16),
}

/// Standard object types with their numeric identifier and the camelCase
/// name used in configuration files and rendered identifiers.
const STANDARD: [(ObjectType, u16, &str); 31] = [
    (ObjectType::AnalogInput, 0, "analogInput"),
    (ObjectType::AnalogOutput, 1, "analogOutput"),
    (ObjectType::AnalogValue, 2, "analogValue"),
    (ObjectType::BinaryInput, 3, "binaryInput"),
    (ObjectType::BinaryOutput, 4, "binaryOutput"),
    (ObjectType::BinaryValue, 5, "binaryValue"),
    (ObjectType::Calendar, 6, "calendar"),
    (ObjectType::Command, 7, "command"),
    (ObjectType::Device, 8, "device"),
    (ObjectType::EventEnrollment, 9, "eventEnrollment"),
    (ObjectType::File, 10, "file"),
    (ObjectType::Group, 11, "group"),
    (ObjectType::Loop, 12, "loop"),
    (ObjectType::MultiStateInput, 13, "multiStateInput"),
    (ObjectType::MultiStateOutput, 14, "multiStateOutput"),
    (ObjectType::NotificationClass, 15, "notificationClass"),
    (ObjectType::Program, 16, "program"),
    (ObjectType::Schedule, 17, "schedule"),
    (ObjectType::Averaging, 18, "averaging"),
    (ObjectType::MultiStateValue, 19, "multiStateValue"),
    (ObjectType::TrendLog, 20, "trendLog"),
    (ObjectType::LifeSafetyPoint, 21, "lifeSafetyPoint"),
    (ObjectType::LifeSafetyZone, 22, "lifeSafetyZone"),
    (ObjectType::Accumulator, 23, "accumulator"),
    (ObjectType::PulseConverter, 24, "pulseConverter"),
    (ObjectType::EventLog, 25, "eventLog"),
    (ObjectType::GlobalGroup, 26, "globalGroup"),
    (ObjectType::TrendLogMultiple, 27, "trendLogMultiple"),
    (ObjectType::LoadControl, 28, "loadControl"),
    (ObjectType::StructuredView, 29, "structuredView"),
    (ObjectType::AccessDoor, 30, "accessDoor"),
];

impl ObjectType {
    /// Converts this object type to its numeric BACnet identifier.
    pub fn to_u16(self) -> u16 {
        if let Self::Proprietary(v) = self {
            return v;
        }
        STANDARD
            .iter()
            .find(|(ty, _, _)| *ty == self)
            .map_or(u16::MAX, |(_, id, _)| *id)
    }

    /// Creates an `ObjectType` from its numeric BACnet identifier.
    ///
    /// Values without a known standard mapping become [`Proprietary`](Self::Proprietary).
    pub fn from_u16(value: u16) -> Self {
        STANDARD
            .iter()
            .find(|(_, id, _)| *id == value)
            .map_or(Self::Proprietary(value), |(ty, _, _)| *ty)
    }

    /// camelCase name, `None` for proprietary types.
    pub fn name(self) -> Option<&'static str> {
        STANDARD
            .iter()
            .find(|(ty, _, _)| *ty == self)
            .map(|(_, _, name)| *name)
    }

    /// Looks up a standard type by its camelCase name.
    pub fn from_name(name: &str) -> Option<Self> {
        STANDARD
            .iter()
            .find(|(_, _, n)| *n == name)
            .map(|(ty, _, _)| *ty)
    }
}

#[cfg(test)]
mod tests {
    use super::ObjectType;

    #[test]
    fn numeric_mapping_is_stable() {
        for raw in 0..=30u16 {
            assert_eq!(ObjectType::from_u16(raw).to_u16(), raw);
        }
        assert_eq!(ObjectType::from_u16(8), ObjectType::Device);
        assert_eq!(ObjectType::from_u16(600), ObjectType::Proprietary(600));
    }

    #[test]
    fn names() {
        assert_eq!(ObjectType::from_name("binaryValue"), Some(ObjectType::BinaryValue));
        assert_eq!(ObjectType::MultiStateInput.name(), Some("multiStateInput"));
        assert_eq!(ObjectType::Proprietary(600).name(), None);
        assert_eq!(ObjectType::from_name("BinaryValue"), None);
    }
}
