use crate::types::ObjectType;

/// Enumerated property types whose members decode to names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enumeration {
    BinaryPv,
    DeviceStatus,
    EngineeringUnits,
    EventState,
    ObjectType,
    Polarity,
    Reliability,
    Segmentation,
}

const BINARY_PV: &[(u32, &str)] = &[(0, "inactive"), (1, "active")];

const DEVICE_STATUS: &[(u32, &str)] = &[
    (0, "operational"),
    (1, "operationalReadOnly"),
    (2, "downloadRequired"),
    (3, "downloadInProgress"),
    (4, "nonOperational"),
    (5, "backupInProgress"),
];

// the units that show up on nearly every site; the rest stay numeric
const ENGINEERING_UNITS: &[(u32, &str)] = &[
    (3, "amperes"),
    (5, "volts"),
    (19, "kilowattHours"),
    (27, "hertz"),
    (29, "percentRelativeHumidity"),
    (48, "kilowatts"),
    (53, "pascals"),
    (62, "degreesCelsius"),
    (64, "degreesFahrenheit"),
    (73, "hours"),
    (95, "noUnits"),
    (98, "percent"),
    (118, "partsPerMillion"),
];

const EVENT_STATE: &[(u32, &str)] = &[
    (0, "normal"),
    (1, "fault"),
    (2, "offnormal"),
    (3, "highLimit"),
    (4, "lowLimit"),
    (5, "lifeSafetyAlarm"),
];

const POLARITY: &[(u32, &str)] = &[(0, "normal"), (1, "reverse")];

const RELIABILITY: &[(u32, &str)] = &[
    (0, "noFaultDetected"),
    (1, "noSensor"),
    (2, "overRange"),
    (3, "underRange"),
    (4, "openLoop"),
    (5, "shortedLoop"),
    (6, "noOutput"),
    (7, "unreliableOther"),
    (8, "processError"),
    (9, "multiStateFault"),
    (10, "configurationError"),
    (12, "communicationFailure"),
    (13, "memberFault"),
];

const SEGMENTATION: &[(u32, &str)] = &[
    (0, "segmentedBoth"),
    (1, "segmentedTransmit"),
    (2, "segmentedReceive"),
    (3, "noSegmentation"),
];

impl Enumeration {
    /// Name of `value` within this enumeration, `None` for members outside
    /// the known set (proprietary extensions, newer revisions).
    pub fn name(self, value: u32) -> Option<&'static str> {
        let table = match self {
            Self::BinaryPv => BINARY_PV,
            Self::DeviceStatus => DEVICE_STATUS,
            Self::EngineeringUnits => ENGINEERING_UNITS,
            Self::EventState => EVENT_STATE,
            Self::Polarity => POLARITY,
            Self::Reliability => RELIABILITY,
            Self::Segmentation => SEGMENTATION,
            Self::ObjectType => {
                return u16::try_from(value)
                    .ok()
                    .and_then(|raw| ObjectType::from_u16(raw).name())
            }
        };
        table
            .iter()
            .find(|(raw, _)| *raw == value)
            .map(|(_, name)| *name)
    }
}
